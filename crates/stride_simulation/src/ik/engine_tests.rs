//! Tests for LegIk tick logic (analytic BoxWorld scenes).

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::engine::{IkSwitch, IkTick, LegIk};
    use super::super::foot::Foot;
    use crate::components::{
        Animator, AnimatorLink, BodyFlags, BodyState, Bone, CharacterBody, IkGoal,
    };
    use crate::error::SetupError;
    use crate::physics::layers::{LAYER_STEP, LAYER_WALL};
    use crate::physics::{BoxWorld, SceneBox};
    use crate::platform::FrameContext;

    const DT: f32 = 1.0 / 60.0;

    fn step_world(step_height: f32) -> BoxWorld {
        BoxWorld::new().with_ground(0.0).with_box(SceneBox::solid(
            Vec3::new(-1.0, 0.0, 0.5),
            Vec3::new(1.0, step_height, 2.0),
            LAYER_STEP,
        ))
    }

    /// Левая нога сзади, правая занесена над ступенью
    fn rigged_animator() -> AnimatorLink {
        let mut animator = AnimatorLink::with_character_parameters();
        animator.set_bone(Bone::Hips, Vec3::new(0.0, 0.95, 0.0));
        animator.set_bone(Bone::LeftUpperLeg, Vec3::new(-0.1, 0.9, 0.0));
        animator.set_bone(Bone::RightUpperLeg, Vec3::new(0.1, 0.9, 0.0));
        animator.set_bone(Bone::LeftFoot, Vec3::new(-0.1, 0.05, 0.1));
        animator.set_bone(Bone::RightFoot, Vec3::new(0.1, 0.05, 0.65));
        animator
    }

    fn walking_body(forward_amount: f32) -> BodyState {
        BodyState::at(Vec3::ZERO).with_motion(Vec3::Z, forward_amount)
    }

    /// IK с историей движения: правая нога идёт вперёд
    fn ready_ik(body: &BodyState, animator: &mut AnimatorLink) -> LegIk {
        let mut ik = LegIk::default();
        ik.initialize(animator).expect("rig has all bones");
        ik.track_foot_motion(body, animator);
        animator.set_bone(Bone::RightFoot, Vec3::new(0.1, 0.05, 0.6));
        ik.track_foot_motion(body, animator);
        ik
    }

    #[test]
    fn test_uninitialized_tick_is_inert() {
        let world = step_world(0.3);
        let animator = rigged_animator();
        let mut body = walking_body(0.5);
        let mut ik = LegIk::default();

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::Inert);
        assert_eq!(body.position, Vec3::ZERO);
        assert!(!ik.foot(Foot::Left).ik_active);
    }

    #[test]
    fn test_initialize_reports_missing_bone() {
        let mut animator = rigged_animator();
        animator.bones.remove(&Bone::RightUpperLeg);
        let mut ik = LegIk::default();

        assert_eq!(
            ik.initialize(&animator),
            Err(SetupError::MissingBone(Bone::RightUpperLeg))
        );
        assert!(!ik.is_initialized());

        let animator = rigged_animator();
        assert!(ik.initialize(&animator).is_ok());
        assert!(ik.initialize(&animator).is_ok());
        assert!(ik.is_initialized());
    }

    #[test]
    fn test_walking_onto_step_runs_transition() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.5);
        let before = BodyFlags::capture(&body);
        let mut ik = ready_ik(&body, &mut animator);
        let frame = FrameContext::new(DT);

        let tick = ik.update(&mut body, &world, &animator, &frame);
        assert_eq!(tick, IkTick::StepStarted(Foot::Right));
        assert!(ik.is_stepping());
        assert!(body.is_kinematic());
        assert!(!body.uses_gravity());
        assert!(body.movement_suspended());

        let pinned = ik.foot(Foot::Right).override_point.expect("pinned foot");
        assert!((pinned.y - (0.3 + ik.config.foot_offset)).abs() < 1e-4);

        let mut elapsed = 0.0;
        loop {
            let tick = ik.update(&mut body, &world, &animator, &frame);
            elapsed += DT;
            if tick == IkTick::StepFinished {
                break;
            }
            assert_eq!(tick, IkTick::Stepping);
            assert!(elapsed < 2.0, "step did not finish");
        }

        assert!(elapsed <= 1.35 + DT + 1e-4);
        assert!((body.position - Vec3::new(0.0, 0.3, 0.6)).length() < 1e-4);
        assert_eq!(BodyFlags::capture(&body), before);
        assert!(ik.foot(Foot::Right).override_point.is_none());
    }

    #[test]
    fn test_release_body_cuts_step_short() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.5);
        let before = BodyFlags::capture(&body);
        let mut ik = ready_ik(&body, &mut animator);
        let frame = FrameContext::new(DT);

        assert_eq!(
            ik.update(&mut body, &world, &animator, &frame),
            IkTick::StepStarted(Foot::Right)
        );
        ik.update(&mut body, &world, &animator, &frame);

        assert!(ik.release_body(&mut body));
        assert!(!ik.is_stepping());
        assert_eq!(BodyFlags::capture(&body), before);
        assert!((body.position - Vec3::new(0.0, 0.3, 0.6)).length() < 1e-4);
        assert!(ik.foot(Foot::Right).override_point.is_none());

        // Второй раз отдавать нечего
        assert!(!ik.release_body(&mut body));
    }

    #[test]
    fn test_fast_run_hops_instead_of_stepping() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(1.0);
        let mut ik = ready_ik(&body, &mut animator);
        let frame = FrameContext::new(DT);

        assert_eq!(ik.update(&mut body, &world, &animator, &frame), IkTick::Hop);
        assert!(!ik.is_stepping());
        assert!((body.velocity.y - 2.0).abs() < 1e-4);

        // Уже поднимаемся — второй импульс не добавляется
        assert_eq!(ik.update(&mut body, &world, &animator, &frame), IkTick::Grounded);
        assert!((body.velocity.y - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_wall_ahead_deactivates_feet() {
        let world = BoxWorld::new().with_ground(0.0).with_box(SceneBox::solid(
            Vec3::new(-1.0, 0.0, 0.3),
            Vec3::new(1.0, 2.0, 0.5),
            LAYER_WALL,
        ));
        let mut animator = rigged_animator();
        let mut body = walking_body(0.5);
        let mut ik = ready_ik(&body, &mut animator);

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::WallBlocked);
        assert!(!ik.foot(Foot::Left).ik_active);
        assert!(!ik.foot(Foot::Right).ik_active);
        assert!(!ik.is_stepping());
    }

    #[test]
    fn test_no_contact_under_either_foot_is_noop() {
        // Ступень есть, пола нет: обе стопы висят над пустотой
        let world = BoxWorld::new().with_box(SceneBox::solid(
            Vec3::new(-1.0, 0.0, 0.5),
            Vec3::new(1.0, 0.3, 2.0),
            LAYER_STEP,
        ));
        let mut animator = rigged_animator();
        animator.set_bone(Bone::RightFoot, Vec3::new(0.1, 0.05, 0.2));
        let mut body = walking_body(0.5);
        let mut ik = LegIk::default();
        ik.initialize(&animator).expect("rig has all bones");

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::Grounded);
        assert!(ik.foot(Foot::Left).contact().is_none());
        assert!(ik.foot(Foot::Right).contact().is_none());
        assert!(!ik.is_stepping());
        assert_eq!(body.position, Vec3::ZERO);
    }

    #[test]
    fn test_foot_moving_back_does_not_step() {
        let world = step_world(0.3);
        let animator = rigged_animator();
        let mut body = walking_body(0.5);
        let mut ik = LegIk::default();
        ik.initialize(&animator).expect("rig has all bones");

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::Grounded);
        assert!(ik.foot(Foot::Right).contact().is_some());
        assert!(!ik.is_stepping());
    }

    #[test]
    fn test_step_too_high_is_ignored() {
        let world = step_world(0.7);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.5);
        let mut ik = ready_ik(&body, &mut animator);

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::Grounded);
        assert!(ik.foot(Foot::Right).contact().is_none());
        assert!(!ik.is_stepping());
    }

    #[test]
    fn test_airborne_and_disabled_deactivate_feet() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.5);
        let mut ik = ready_ik(&body, &mut animator);
        let frame = FrameContext::new(DT);

        body.grounded = false;
        assert_eq!(ik.update(&mut body, &world, &animator, &frame), IkTick::Airborne);
        assert!(!ik.foot(Foot::Right).ik_active);

        body.grounded = true;
        ik.set_ik_enabled(false);
        assert_eq!(ik.update(&mut body, &world, &animator, &frame), IkTick::Disabled);
        assert!(!ik.ik_enabled());

        ik.set_ik_enabled(true);
        assert_ne!(ik.update(&mut body, &world, &animator, &frame), IkTick::Disabled);
    }

    #[test]
    fn test_standing_still_adapts_feet_without_stepping() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.0);
        let mut ik = ready_ik(&body, &mut animator);

        let tick = ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        assert_eq!(tick, IkTick::Grounded);
        assert!(ik.foot(Foot::Right).ik_active);
        assert!(!ik.is_stepping());
    }

    #[test]
    fn test_apply_pose_blends_weights_on_pose_layer_only() {
        let world = step_world(0.3);
        let mut animator = rigged_animator();
        let mut body = walking_body(0.0);
        let mut ik = ready_ik(&body, &mut animator);
        ik.update(&mut body, &world, &animator, &FrameContext::new(DT));

        ik.apply_pose(1, &mut animator, 0.1);
        assert_eq!(animator.ik_goal(IkGoal::RightFoot).weight, 0.0);

        ik.apply_pose(0, &mut animator, 0.1);
        let goal = animator.ik_goal(IkGoal::RightFoot);
        assert!((goal.weight - 0.5).abs() < 1e-5);
        assert!((goal.position.y - (0.3 + ik.config.foot_offset)).abs() < 1e-4);

        for _ in 0..10 {
            ik.apply_pose(0, &mut animator, 0.1);
        }
        assert_eq!(animator.ik_goal(IkGoal::RightFoot).weight, 1.0);

        // Выключили IK — вес плавно уходит в 0
        ik.set_ik_enabled(false);
        ik.apply_pose(0, &mut animator, 0.1);
        assert!((animator.ik_goal(IkGoal::RightFoot).weight - 0.5).abs() < 1e-5);
        assert!(body.is_grounded());
    }
}
