//! TriggerInteraction — state machine интеракций персонажа со scene triggers
//!
//! Idle → Colliding → Interacting → Idle (+ break → Idle)
//!
//! Инварианты:
//! - не больше одного active trigger
//! - после конца интеракции новый триггер стартует только через
//!   trigger_interval секунд (таймер стоит пока идёт интеракция)
//! - completion / break / release восстанавливают тело одинаково
//!   (snapshot BodyFlags, capsule, IK, режим движения)

use bevy::prelude::*;
use serde::Deserialize;

use super::behaviour::{EligibilityContext, SceneTrigger, TriggerHookContext, TriggerKind};
use crate::components::{
    params, Animator, BodyFlags, CharacterBody, IkGoal, MatchTargetRequest, MovementMode,
};
use crate::error::SetupError;
use crate::ik::IkSwitch;
use crate::logger;
use crate::platform::Platform;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct TriggerConfig {
    /// Пауза между интеракциями (секунды)
    pub trigger_interval: f32,
    /// Длительность rotation alignment до того как известно окно match-target
    pub default_rotation_time: f32,
    /// Слой animator'а, чьё состояние сравнивается с anchor.animation_state_name
    pub animation_layer: usize,
}

impl Default for TriggerConfig {
    fn default() -> Self {
        Self {
            trigger_interval: 1.0,
            default_rotation_time: 0.3,
            animation_layer: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionPhase {
    Idle,
    Colliding,
    Interacting,
}

/// Чем закончилась интеракция
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionEnd {
    /// Animation event / выход из состояния анимации
    Completed,
    /// Break (cancel input, hit, смерть)
    Broken,
    /// Триггер исчез посреди интеракции
    Released,
}

/// Нотификации наружу: по методу на событие, по умолчанию no-op
pub trait InteractionListener {
    fn on_trigger_start(&mut self, _trigger: Entity, _kind: TriggerKind) {}
    fn on_trigger_end(&mut self, _trigger: Entity, _outcome: InteractionEnd) {}
    fn on_hint_changed(&mut self, _hint: Option<&str>) {}
}

pub struct NoopListener;

impl InteractionListener for NoopListener {}

/// Lookup scene triggers по entity
pub trait TriggerLookup {
    fn trigger(&self, entity: Entity) -> Option<&SceneTrigger>;
}

impl TriggerLookup for std::collections::HashMap<Entity, SceneTrigger> {
    fn trigger(&self, entity: Entity) -> Option<&SceneTrigger> {
        self.get(&entity)
    }
}

impl TriggerLookup for Query<'_, '_, &SceneTrigger> {
    fn trigger(&self, entity: Entity) -> Option<&SceneTrigger> {
        self.get(entity).ok()
    }
}

/// Коллабораторы одного тика
pub struct InteractionContext<'a> {
    pub body: &'a mut dyn CharacterBody,
    pub animator: &'a mut dyn Animator,
    pub ik: &'a mut dyn IkSwitch,
    pub listener: &'a mut dyn InteractionListener,
    pub platform: &'a dyn Platform,
}

/// Поворот тела к target rotation якоря
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAlign {
    start: Quat,
    target: Quat,
    elapsed: f32,
    max_time: f32,
    speed: f32,
}

impl RotationAlign {
    pub fn new(start: Quat, target: Quat, max_time: f32, speed: f32) -> Self {
        Self {
            start,
            target,
            elapsed: 0.0,
            max_time: max_time.max(f32::EPSILON),
            speed,
        }
    }

    pub fn retime(&mut self, max_time: f32) {
        self.max_time = max_time.max(f32::EPSILON);
    }

    /// (rotation, закончили ли)
    pub fn advance(&mut self, delta: f32) -> (Quat, bool) {
        self.elapsed += delta * self.speed;
        let t = (self.elapsed / self.max_time).min(1.0);
        (self.start.slerp(self.target, t), self.elapsed > self.max_time)
    }
}

#[derive(Component, Debug, Clone)]
pub struct TriggerInteraction {
    pub config: TriggerConfig,
    active: Option<Entity>,
    collided: Option<Entity>,
    /// Последний триггер, в котором стоит персонаж (collided ещё может быть None из-за cooldown)
    overlapping: Option<Entity>,
    allowed: bool,
    cooldown_elapsed: f32,
    match_issued: bool,
    rotation: Option<RotationAlign>,
    saved_flags: Option<BodyFlags>,
    initialized: bool,
}

impl Default for TriggerInteraction {
    fn default() -> Self {
        Self::new(TriggerConfig::default())
    }
}

impl TriggerInteraction {
    pub fn new(config: TriggerConfig) -> Self {
        Self {
            // Первая интеракция не ждёт cooldown
            cooldown_elapsed: config.trigger_interval,
            config,
            active: None,
            collided: None,
            overlapping: None,
            allowed: true,
            match_issued: false,
            rotation: None,
            saved_flags: None,
            initialized: false,
        }
    }

    /// Проверка параметров animator'а для match-target окна. Идемпотентно.
    pub fn initialize(&mut self, animator: &dyn Animator) -> Result<(), SetupError> {
        if self.initialized {
            return Ok(());
        }

        for name in [params::MATCH_START, params::MATCH_END] {
            if !animator.has_parameter(name) {
                let error = SetupError::MissingParameter(name.to_string());
                logger::log_error(&format!("TriggerInteraction setup failed: {}", error));
                return Err(error);
            }
        }

        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn phase(&self) -> InteractionPhase {
        if self.active.is_some() {
            InteractionPhase::Interacting
        } else if self.collided.is_some() {
            InteractionPhase::Colliding
        } else {
            InteractionPhase::Idle
        }
    }

    pub fn active_trigger(&self) -> Option<Entity> {
        self.active
    }

    pub fn collided_trigger(&self) -> Option<Entity> {
        self.collided
    }

    pub fn is_busy(&self) -> bool {
        self.active.is_some()
    }

    pub fn cooldown_elapsed(&self) -> f32 {
        self.cooldown_elapsed
    }

    pub fn match_issued(&self) -> bool {
        self.match_issued
    }

    pub fn is_rotating(&self) -> bool {
        self.rotation.is_some()
    }

    /// Внешний запрет интеракций (ragdoll, cutscene)
    pub fn set_allowed(&mut self, allowed: bool) {
        self.allowed = allowed;
    }

    pub fn is_allowed(&self) -> bool {
        self.allowed
    }

    fn cooldown_ready(&self) -> bool {
        self.cooldown_elapsed >= self.config.trigger_interval
    }

    fn can_collide(&self, body: &dyn CharacterBody) -> bool {
        self.allowed
            && !self.is_busy()
            && body.movement_mode() != MovementMode::Diving
            && self.cooldown_ready()
    }

    /// Персонаж вошёл в trigger volume
    pub fn on_trigger_enter(
        &mut self,
        trigger: Entity,
        lookup: &dyn TriggerLookup,
        body: &dyn CharacterBody,
        listener: &mut dyn InteractionListener,
    ) -> bool {
        self.overlapping = Some(trigger);
        self.try_collide(lookup, body, listener)
    }

    pub fn on_trigger_exit(&mut self, trigger: Entity, listener: &mut dyn InteractionListener) {
        if self.overlapping == Some(trigger) {
            self.overlapping = None;
        }
        if self.collided == Some(trigger) && self.active != Some(trigger) {
            self.collided = None;
            listener.on_hint_changed(None);
        }
    }

    fn try_collide(
        &mut self,
        lookup: &dyn TriggerLookup,
        body: &dyn CharacterBody,
        listener: &mut dyn InteractionListener,
    ) -> bool {
        let Some(candidate) = self.overlapping else {
            return false;
        };
        if self.collided == Some(candidate) || !self.can_collide(body) {
            return false;
        }
        let Some(trigger) = lookup.trigger(candidate) else {
            self.overlapping = None;
            return false;
        };

        self.collided = Some(candidate);
        listener.on_hint_changed(Some(trigger.behaviour().hint()));
        true
    }

    pub fn update(
        &mut self,
        lookup: &dyn TriggerLookup,
        ctx: &mut InteractionContext,
    ) -> InteractionPhase {
        if !self.initialized {
            #[cfg(debug_assertions)]
            logger::log_warning("TriggerInteraction::update called before successful initialize");
            return self.phase();
        }

        let delta = ctx.platform.delta_secs();

        if let Some(active) = self.active {
            match lookup.trigger(active) {
                Some(trigger) if trigger.anchor.position().is_some() => {
                    self.drive_match_target(trigger, ctx);
                    self.drive_rotation(ctx, delta);
                }
                _ => {
                    logger::log_warning(&format!(
                        "Active trigger {:?} is gone, releasing body",
                        active
                    ));
                    self.release(ctx, InteractionEnd::Released);
                }
            }
            return self.phase();
        }

        self.cooldown_elapsed = (self.cooldown_elapsed + delta).min(self.config.trigger_interval);

        if self.collided.is_none() {
            self.try_collide(lookup, ctx.body, ctx.listener);
        }

        let Some(collided) = self.collided else {
            return self.phase();
        };
        let Some(trigger) = lookup.trigger(collided) else {
            self.collided = None;
            self.overlapping = self.overlapping.filter(|e| *e != collided);
            ctx.listener.on_hint_changed(None);
            return self.phase();
        };

        if self.can_collide(ctx.body) {
            let eligible = trigger.behaviour().is_eligible(&EligibilityContext {
                body: ctx.body,
                anchor: &trigger.anchor,
                input: ctx.platform.input(),
            });
            if eligible {
                self.begin(collided, trigger, ctx);
            }
        }

        self.phase()
    }

    fn begin(&mut self, entity: Entity, trigger: &SceneTrigger, ctx: &mut InteractionContext) -> bool {
        let flags = BodyFlags::capture(ctx.body);

        let accepted = trigger.behaviour().on_start(&mut TriggerHookContext {
            trigger: entity,
            anchor: &trigger.anchor,
            input: ctx.platform.input(),
            body: &mut *ctx.body,
            animator: &mut *ctx.animator,
        });
        if !accepted {
            return false;
        }

        self.active = Some(entity);
        self.match_issued = false;
        self.saved_flags = Some(flags);

        ctx.body.set_capsule_trigger(true);
        ctx.body.set_kinematic(true);
        ctx.body.set_gravity(false);
        ctx.body.set_velocity(Vec3::ZERO);
        ctx.body.set_movement_suspended(true);
        ctx.body.set_ground_check_suspended(true);
        ctx.ik.set_ik_enabled(false);

        self.rotation = match (trigger.anchor.rotate_to_target, trigger.anchor.target_rotation()) {
            (true, Some(target)) => Some(RotationAlign::new(
                ctx.body.rotation(),
                target,
                self.config.default_rotation_time,
                trigger.anchor.rotation_speed,
            )),
            _ => None,
        };

        ctx.listener.on_trigger_start(entity, trigger.kind());
        logger::log_info(&format!("Interaction started: {:?} {:?}", trigger.kind(), entity));
        true
    }

    /// One-shot match-target когда играет нужное состояние и нет перехода
    fn drive_match_target(&mut self, trigger: &SceneTrigger, ctx: &mut InteractionContext) {
        let anchor = &trigger.anchor;
        if !anchor.match_target || self.match_issued {
            return;
        }

        let layer = self.config.animation_layer;
        let Some(state) = ctx.animator.current_state(layer) else {
            return;
        };
        if state.name != anchor.animation_state_name || ctx.animator.is_in_transition(layer) {
            return;
        }
        let (Some(position), Some(rotation)) = (anchor.position(), anchor.target_rotation()) else {
            return;
        };

        let start_time = ctx.animator.float_param(params::MATCH_START).unwrap_or(0.0);
        let end_time = ctx.animator.float_param(params::MATCH_END).unwrap_or(1.0);

        ctx.animator.match_target(MatchTargetRequest {
            position,
            rotation,
            body_part: anchor.target_body_part,
            weight_mask: anchor.weight_mask,
            start_time,
            end_time,
        });
        self.match_issued = true;

        // Поворот успевает за окно match-target в секундах клипа
        if let Some(rotation) = self.rotation.as_mut() {
            let speed = state.speed.abs().max(f32::EPSILON);
            rotation.retime((end_time - start_time).max(0.0) * state.length / speed);
        }
    }

    fn drive_rotation(&mut self, ctx: &mut InteractionContext, delta: f32) {
        let Some(rotation) = self.rotation.as_mut() else {
            return;
        };

        let (current, done) = rotation.advance(delta);
        ctx.body.set_rotation(current);
        if done {
            self.rotation = None;
        }
    }

    /// Нормальное завершение (animation event)
    pub fn complete(&mut self, lookup: &dyn TriggerLookup, ctx: &mut InteractionContext) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        self.run_end_hook(active, lookup, ctx);
        self.release(ctx, InteractionEnd::Completed);
        true
    }

    /// Принудительный выход: match-target прерывается, все ledge/ladder флаги гасятся
    pub fn break_interaction(
        &mut self,
        lookup: &dyn TriggerLookup,
        ctx: &mut InteractionContext,
    ) -> bool {
        let Some(active) = self.active else {
            return false;
        };

        ctx.animator.interrupt_match_target();
        self.run_end_hook(active, lookup, ctx);

        for flag in params::INTERACTION_FLAGS {
            ctx.animator.set_bool(flag, false);
        }
        ctx.animator.set_ik_weight(IkGoal::LeftHand, 0.0);
        ctx.animator.set_ik_weight(IkGoal::RightHand, 0.0);

        self.release(ctx, InteractionEnd::Broken);
        true
    }

    /// Animation graph: вход в состояние якоря заново взводит match-target
    pub fn on_state_enter(&mut self, state_name: &str, lookup: &dyn TriggerLookup) {
        let Some(trigger) = self.active.and_then(|e| lookup.trigger(e)) else {
            return;
        };
        if trigger.anchor.animation_state_name == state_name {
            self.match_issued = false;
        }
    }

    /// Animation graph: выход из состояния якоря завершает интеракцию
    pub fn on_state_exit(
        &mut self,
        state_name: &str,
        lookup: &dyn TriggerLookup,
        ctx: &mut InteractionContext,
    ) -> bool {
        let matches = self
            .active
            .and_then(|e| lookup.trigger(e))
            .is_some_and(|trigger| trigger.anchor.animation_state_name == state_name);

        matches && self.complete(lookup, ctx)
    }

    fn run_end_hook(&self, active: Entity, lookup: &dyn TriggerLookup, ctx: &mut InteractionContext) {
        if let Some(trigger) = lookup.trigger(active) {
            trigger.behaviour().on_end(&mut TriggerHookContext {
                trigger: active,
                anchor: &trigger.anchor,
                input: ctx.platform.input(),
                body: &mut *ctx.body,
                animator: &mut *ctx.animator,
            });
        }
    }

    /// Общее восстановление для всех путей выхода
    fn release(&mut self, ctx: &mut InteractionContext, outcome: InteractionEnd) {
        let Some(active) = self.active.take() else {
            return;
        };

        if let Some(flags) = self.saved_flags.take() {
            flags.restore(ctx.body);
        }
        ctx.body.restore_capsule();
        if matches!(
            ctx.body.movement_mode(),
            MovementMode::Climbing | MovementMode::Ladder
        ) {
            ctx.body.set_movement_mode(MovementMode::Walking);
        }
        ctx.body.set_ledge(None);
        ctx.ik.set_ik_enabled(true);

        self.collided = None;
        self.match_issued = false;
        self.rotation = None;
        self.cooldown_elapsed = 0.0;

        ctx.listener.on_trigger_end(active, outcome);
        ctx.listener.on_hint_changed(None);
        logger::log_info(&format!("Interaction ended: {:?} ({:?})", active, outcome));
    }
}
