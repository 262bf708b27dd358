//! Tests for trigger interaction controller.

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use bevy::prelude::*;

    use super::super::anchor::TriggerAnchor;
    use super::super::behaviour::{SceneTrigger, TriggerKind};
    use super::super::controller::{
        InteractionContext, InteractionEnd, InteractionListener, InteractionPhase,
        TriggerInteraction,
    };
    use super::super::kinds::{LedgeTrigger, PickupTrigger};
    use crate::components::{
        params, Animator, AnimatorLink, AnimatorStateInfo, AvatarTarget, BodyFlags, BodyState,
        CharacterBody, IkGoal, MovementMode,
    };
    use crate::error::SetupError;
    use crate::ik::{IkSwitch, LegIk};
    use crate::platform::{FrameContext, InteractionInput};

    const DT: f32 = 1.0 / 60.0;

    #[derive(Default)]
    struct RecordingListener {
        started: Vec<(Entity, TriggerKind)>,
        ended: Vec<(Entity, InteractionEnd)>,
        hint: Option<String>,
    }

    impl InteractionListener for RecordingListener {
        fn on_trigger_start(&mut self, trigger: Entity, kind: TriggerKind) {
            self.started.push((trigger, kind));
        }

        fn on_trigger_end(&mut self, trigger: Entity, outcome: InteractionEnd) {
            self.ended.push((trigger, outcome));
        }

        fn on_hint_changed(&mut self, hint: Option<&str>) {
            self.hint = hint.map(str::to_string);
        }
    }

    struct Harness {
        interaction: TriggerInteraction,
        body: BodyState,
        animator: AnimatorLink,
        ik: LegIk,
        listener: RecordingListener,
        triggers: HashMap<Entity, SceneTrigger>,
    }

    const LEDGE: Entity = Entity::from_raw(10);
    const PICKUP: Entity = Entity::from_raw(11);

    fn ledge_rotation() -> Quat {
        Quat::from_rotation_y(30f32.to_radians())
    }

    fn harness() -> Harness {
        let mut triggers = HashMap::new();
        triggers.insert(
            LEDGE,
            SceneTrigger::new(
                TriggerAnchor::new("ClimbUp", AvatarTarget::RightHand).with_transform(
                    Transform::from_xyz(0.0, 1.5, 0.8).with_rotation(ledge_rotation()),
                ),
                LedgeTrigger::default(),
            ),
        );
        triggers.insert(
            PICKUP,
            SceneTrigger::new(
                TriggerAnchor::new("Pickup", AvatarTarget::RightHand)
                    .with_transform(Transform::from_xyz(0.5, 0.0, 0.5)),
                PickupTrigger::new("medkit"),
            ),
        );

        let mut animator = AnimatorLink::with_character_parameters();
        animator.set_float(params::MATCH_START, 0.1);
        animator.set_float(params::MATCH_END, 0.4);

        let mut interaction = TriggerInteraction::default();
        interaction.initialize(&animator).expect("animator has match params");

        Harness {
            interaction,
            body: BodyState::default(),
            animator,
            ik: LegIk::default(),
            listener: RecordingListener::default(),
            triggers,
        }
    }

    impl Harness {
        fn tick_with(&mut self, input: InteractionInput) -> InteractionPhase {
            let frame = FrameContext::new(DT).with_input(input);
            let mut ctx = InteractionContext {
                body: &mut self.body,
                animator: &mut self.animator,
                ik: &mut self.ik,
                listener: &mut self.listener,
                platform: &frame,
            };
            self.interaction.update(&self.triggers, &mut ctx)
        }

        fn tick(&mut self) -> InteractionPhase {
            self.tick_with(InteractionInput::default())
        }

        fn enter(&mut self, trigger: Entity) -> bool {
            self.interaction
                .on_trigger_enter(trigger, &self.triggers, &self.body, &mut self.listener)
        }

        fn complete(&mut self) -> bool {
            let frame = FrameContext::new(DT);
            let mut ctx = InteractionContext {
                body: &mut self.body,
                animator: &mut self.animator,
                ik: &mut self.ik,
                listener: &mut self.listener,
                platform: &frame,
            };
            self.interaction.complete(&self.triggers, &mut ctx)
        }

        fn break_interaction(&mut self) -> bool {
            let frame = FrameContext::new(DT);
            let mut ctx = InteractionContext {
                body: &mut self.body,
                animator: &mut self.animator,
                ik: &mut self.ik,
                listener: &mut self.listener,
                platform: &frame,
            };
            self.interaction.break_interaction(&self.triggers, &mut ctx)
        }

        fn state_exit(&mut self, state: &str) -> bool {
            let frame = FrameContext::new(DT);
            let mut ctx = InteractionContext {
                body: &mut self.body,
                animator: &mut self.animator,
                ik: &mut self.ik,
                listener: &mut self.listener,
                platform: &frame,
            };
            self.interaction.on_state_exit(state, &self.triggers, &mut ctx)
        }

        fn start_ledge(&mut self) {
            assert!(self.enter(LEDGE));
            assert_eq!(self.tick(), InteractionPhase::Interacting);
        }
    }

    #[test]
    fn test_initialize_requires_match_parameters() {
        let mut interaction = TriggerInteraction::default();
        let animator = AnimatorLink::default();

        assert_eq!(
            interaction.initialize(&animator),
            Err(SetupError::MissingParameter(params::MATCH_START.to_string()))
        );
        assert!(!interaction.is_initialized());
    }

    #[test]
    fn test_uninitialized_controller_never_starts() {
        let mut h = harness();
        h.interaction = TriggerInteraction::default();

        h.enter(LEDGE);
        for _ in 0..10 {
            h.tick();
        }
        assert!(h.interaction.active_trigger().is_none());
        assert!(h.listener.started.is_empty());
    }

    #[test]
    fn test_eligible_ledge_starts_interaction() {
        let mut h = harness();
        let before = BodyFlags::capture(&h.body);

        assert!(h.enter(LEDGE));
        assert_eq!(h.interaction.phase(), InteractionPhase::Colliding);
        assert_eq!(h.listener.hint.as_deref(), Some("Climb"));

        assert_eq!(h.tick(), InteractionPhase::Interacting);
        assert_eq!(h.interaction.active_trigger(), Some(LEDGE));
        assert_eq!(h.listener.started, vec![(LEDGE, TriggerKind::Ledge)]);

        assert!(h.body.is_kinematic());
        assert!(!h.body.uses_gravity());
        assert!(h.body.capsule_trigger());
        assert!(h.body.movement_suspended());
        assert!(h.body.ground_check_suspended());
        assert_ne!(BodyFlags::capture(&h.body), before);
        assert!(!h.ik.ik_enabled());

        assert_eq!(h.body.ledge(), Some(LEDGE));
        assert_eq!(h.body.movement_mode(), MovementMode::Climbing);
        assert_eq!(h.animator.bool_param(params::LEDGE), Some(true));
        assert_eq!(h.animator.bool_param(params::CLIMB_UP), Some(true));
    }

    #[test]
    fn test_second_trigger_rejected_while_active() {
        let mut h = harness();
        h.start_ledge();

        assert!(!h.enter(PICKUP));
        for _ in 0..5 {
            h.tick();
        }
        assert_eq!(h.interaction.active_trigger(), Some(LEDGE));
        assert_eq!(h.listener.started.len(), 1);
    }

    #[test]
    fn test_ineligible_trigger_stays_collided_only() {
        let mut h = harness();
        // Спиной к уступу
        h.body.rotation = Quat::from_rotation_y(std::f32::consts::PI);

        assert!(h.enter(LEDGE));
        for _ in 0..120 {
            assert_eq!(h.tick(), InteractionPhase::Colliding);
        }

        assert_eq!(h.interaction.collided_trigger(), Some(LEDGE));
        assert!(h.interaction.active_trigger().is_none());
        assert_eq!(h.listener.hint.as_deref(), Some("Climb"));
        assert!(h.listener.started.is_empty());
    }

    #[test]
    fn test_trigger_exit_clears_hint() {
        let mut h = harness();
        h.body.rotation = Quat::from_rotation_y(std::f32::consts::PI);
        h.enter(LEDGE);
        h.tick();

        h.interaction.on_trigger_exit(LEDGE, &mut h.listener);
        assert_eq!(h.interaction.phase(), InteractionPhase::Idle);
        assert!(h.listener.hint.is_none());
    }

    #[test]
    fn test_diving_or_disallowed_does_not_collide() {
        let mut h = harness();
        h.body.movement_mode = MovementMode::Diving;
        assert!(!h.enter(PICKUP));
        assert_eq!(h.interaction.phase(), InteractionPhase::Idle);

        let mut h = harness();
        h.interaction.set_allowed(false);
        assert!(!h.enter(PICKUP));
        h.tick();
        assert!(h.interaction.active_trigger().is_none());
    }

    #[test]
    fn test_match_target_issued_once_in_target_state() {
        let mut h = harness();
        h.start_ledge();

        // Ещё не в нужном состоянии
        h.animator.enter_state(0, AnimatorStateInfo::new("Locomotion", 1.0));
        h.tick();
        assert!(h.animator.take_match_request().is_none());

        // В нужном состоянии, но идёт переход
        h.animator.enter_state(0, AnimatorStateInfo::new("ClimbUp", 2.0));
        h.animator.set_in_transition(0, true);
        h.tick();
        assert!(h.animator.take_match_request().is_none());

        h.animator.set_in_transition(0, false);
        h.tick();
        let request = h.animator.take_match_request().expect("match request");
        assert_eq!(request.position, Vec3::new(0.0, 1.5, 0.8));
        assert_eq!(request.body_part, AvatarTarget::RightHand);
        assert!((request.start_time - 0.1).abs() < 1e-6);
        assert!((request.end_time - 0.4).abs() < 1e-6);
        assert!(h.interaction.match_issued());

        h.tick();
        assert!(h.animator.take_match_request().is_none());

        // Повторный вход в состояние взводит match заново
        h.interaction.on_state_enter("ClimbUp", &h.triggers);
        h.tick();
        assert!(h.animator.take_match_request().is_some());
    }

    #[test]
    fn test_rotation_aligns_to_anchor_and_stops() {
        let mut h = harness();
        h.start_ledge();
        assert!(h.interaction.is_rotating());

        // Окно match: (0.4 - 0.1) × 2.0s / speed 1.0 = 0.6s
        h.animator.enter_state(0, AnimatorStateInfo::new("ClimbUp", 2.0));
        h.tick();

        let mut ticks = 0;
        while h.interaction.is_rotating() {
            h.tick();
            ticks += 1;
            assert!(ticks < 120, "rotation never stopped");
        }

        assert!(ticks as f32 * DT >= 0.5);
        assert!(h.body.rotation.angle_between(ledge_rotation()) < 1e-3);
    }

    #[test]
    fn test_completion_restores_body() {
        let mut h = harness();
        let before = BodyFlags::capture(&h.body);
        h.start_ledge();

        assert!(h.complete());

        assert_eq!(h.interaction.phase(), InteractionPhase::Idle);
        assert_eq!(BodyFlags::capture(&h.body), before);
        assert_eq!(h.body.capsule_height, h.body.default_capsule_height);
        assert_eq!(h.body.movement_mode(), MovementMode::Walking);
        assert!(h.body.ledge().is_none());
        assert!(h.ik.ik_enabled());
        assert_eq!(h.animator.bool_param(params::LEDGE), Some(false));
        assert_eq!(h.listener.ended, vec![(LEDGE, InteractionEnd::Completed)]);

        // Второй complete — no-op
        assert!(!h.complete());
        assert_eq!(h.listener.ended.len(), 1);
    }

    #[test]
    fn test_cooldown_blocks_immediate_retrigger() {
        let mut h = harness();
        h.start_ledge();
        h.complete();
        assert_eq!(h.interaction.cooldown_elapsed(), 0.0);

        // Всё ещё стоим в триггере
        assert!(!h.enter(LEDGE));
        for _ in 0..30 {
            assert_eq!(h.tick(), InteractionPhase::Idle);
        }

        let mut ticks = 30;
        while h.tick() != InteractionPhase::Interacting {
            ticks += 1;
            assert!(ticks < 120, "never re-triggered");
        }
        assert!((ticks + 1) as f32 * DT >= h.interaction.config.trigger_interval - DT);
        assert_eq!(h.listener.started.len(), 2);
    }

    #[test]
    fn test_break_mid_match_restores_everything() {
        let mut h = harness();
        let before = BodyFlags::capture(&h.body);
        h.start_ledge();
        h.animator.enter_state(0, AnimatorStateInfo::new("ClimbUp", 2.0));
        h.tick();
        assert!(h.animator.is_matching_target());
        h.animator.set_ik_weight(IkGoal::LeftHand, 1.0);

        assert!(h.break_interaction());

        assert!(!h.animator.is_matching_target());
        assert_eq!(h.animator.match_interrupts, 1);
        for flag in params::INTERACTION_FLAGS {
            assert_eq!(h.animator.bool_param(flag), Some(false), "{} still set", flag);
        }
        assert_eq!(h.animator.ik_goal(IkGoal::LeftHand).weight, 0.0);
        assert_eq!(BodyFlags::capture(&h.body), before);
        assert_eq!(h.body.capsule_height, h.body.default_capsule_height);
        assert!(h.ik.ik_enabled());
        assert_eq!(h.listener.ended, vec![(LEDGE, InteractionEnd::Broken)]);

        assert!(!h.break_interaction());
    }

    #[test]
    fn test_missing_trigger_force_releases_body() {
        let mut h = harness();
        let before = BodyFlags::capture(&h.body);
        h.start_ledge();

        h.triggers.remove(&LEDGE);
        assert_eq!(h.tick(), InteractionPhase::Idle);

        assert_eq!(BodyFlags::capture(&h.body), before);
        assert!(h.body.ledge().is_none());
        assert_eq!(h.listener.ended, vec![(LEDGE, InteractionEnd::Released)]);
    }

    #[test]
    fn test_anchor_without_transform_force_releases_body() {
        let mut h = harness();
        h.start_ledge();

        if let Some(trigger) = h.triggers.get_mut(&LEDGE) {
            trigger.anchor.transform = None;
        }
        h.tick();

        assert!(h.interaction.active_trigger().is_none());
        assert!(!h.body.is_kinematic());
    }

    #[test]
    fn test_leaving_anchor_state_completes() {
        let mut h = harness();
        h.start_ledge();

        assert!(!h.state_exit("Locomotion"));
        assert!(h.interaction.is_busy());

        assert!(h.state_exit("ClimbUp"));
        assert_eq!(h.listener.ended, vec![(LEDGE, InteractionEnd::Completed)]);
    }

    #[test]
    fn test_pickup_does_not_change_movement_mode() {
        let mut h = harness();
        assert!(h.enter(PICKUP));
        assert_eq!(h.tick(), InteractionPhase::Interacting);

        assert_eq!(h.body.movement_mode(), MovementMode::Walking);
        assert_eq!(h.animator.bool_param(params::PICKUP), Some(true));

        h.complete();
        assert_eq!(h.animator.bool_param(params::PICKUP), Some(false));
    }
}
