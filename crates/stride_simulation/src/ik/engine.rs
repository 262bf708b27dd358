//! LegIk — per-tick foot placement + step-up решение
//!
//! Порядок тика (physics rate):
//! 1. Идёт step transition → только двигаем тело по кривой
//! 2. IK выключен / тело в воздухе → ноги деактивируются
//! 3. Стена впереди (ближе capsule_radius × 1.25) → ноги деактивируются
//! 4. Ground probe под каждой стопой
//! 5. Bump впереди круче max_slope_angle:
//!    - быстрый бег → вертикальный импульс (hop)
//!    - иначе выбираем более высокую ногу и, если она проходит gate,
//!      начинаем step transition
//!
//! Pose pass (animation rate) отдельно: track_foot_motion + apply_pose.

use bevy::prelude::*;

use super::config::LegIkConfig;
use super::foot::{Foot, FootState};
use super::probe::{probe_ground, ProbeOutcome};
use super::step::{StepProgress, StepTransition};
use crate::components::{Animator, Bone, CharacterBody};
use crate::error::SetupError;
use crate::logger;
use crate::physics::{Hit, PhysicsQuery, QueryTriggers, SphereCast};
use crate::platform::Platform;
use crate::shared::{planar_direction, surface_angle_deg};

/// Кости, без которых IK не работает
pub const REQUIRED_BONES: [Bone; 4] = [
    Bone::LeftUpperLeg,
    Bone::RightUpperLeg,
    Bone::LeftFoot,
    Bone::RightFoot,
];

/// Runtime включение/выключение IK (trigger controller гасит IK на время интеракции)
pub trait IkSwitch {
    fn set_ik_enabled(&mut self, enabled: bool);
    fn ik_enabled(&self) -> bool;
    /// Отдать тело другому владельцу: активный step завершается сразу
    /// (snap в end + восстановление флагов). true — step был.
    fn release_body(&mut self, body: &mut dyn CharacterBody) -> bool;
}

/// Что произошло в тике (логи, тесты)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IkTick {
    /// Не инициализирован
    Inert,
    Disabled,
    Airborne,
    WallBlocked,
    /// Ноги адаптированы к земле, step не нужен
    Grounded,
    Hop,
    StepStarted(Foot),
    Stepping,
    StepFinished,
}

#[derive(Component, Debug, Clone)]
pub struct LegIk {
    pub config: LegIkConfig,
    left: FootState,
    right: FootState,
    step: StepTransition,
    initialized: bool,
    ik_enabled: bool,
}

impl Default for LegIk {
    fn default() -> Self {
        Self::new(LegIkConfig::default())
    }
}

impl LegIk {
    pub fn new(config: LegIkConfig) -> Self {
        let step = StepTransition::new(config.step_max_time);
        Self {
            config,
            left: FootState::default(),
            right: FootState::default(),
            step,
            initialized: false,
            ik_enabled: true,
        }
    }

    /// Проверка костей. Идемпотентно: повторный вызов после успеха — Ok.
    /// При ошибке компонент остаётся inert (update/apply_pose — no-op).
    pub fn initialize(&mut self, animator: &dyn Animator) -> Result<(), SetupError> {
        if self.initialized {
            return Ok(());
        }

        if let Some(bone) = REQUIRED_BONES
            .into_iter()
            .find(|bone| animator.bone_position(*bone).is_none())
        {
            let error = SetupError::MissingBone(bone);
            logger::log_error(&format!("LegIk setup failed: {}", error));
            return Err(error);
        }

        self.initialized = true;
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn foot(&self, foot: Foot) -> &FootState {
        match foot {
            Foot::Left => &self.left,
            Foot::Right => &self.right,
        }
    }

    fn foot_mut(&mut self, foot: Foot) -> &mut FootState {
        match foot {
            Foot::Left => &mut self.left,
            Foot::Right => &mut self.right,
        }
    }

    pub fn step(&self) -> &StepTransition {
        &self.step
    }

    #[cfg(test)]
    pub(crate) fn step_mut(&mut self) -> &mut StepTransition {
        &mut self.step
    }

    pub fn is_stepping(&self) -> bool {
        self.step.is_active()
    }

    pub fn update(
        &mut self,
        body: &mut dyn CharacterBody,
        physics: &dyn PhysicsQuery,
        animator: &dyn Animator,
        platform: &dyn Platform,
    ) -> IkTick {
        if !self.initialized {
            #[cfg(debug_assertions)]
            logger::log_warning("LegIk::update called before successful initialize");
            return IkTick::Inert;
        }

        if self.step.is_active() {
            return match self.step.advance(body, platform.delta_secs()) {
                StepProgress::Finished => {
                    self.left.override_point = None;
                    self.right.override_point = None;
                    logger::log(&format!("Step finished at {:?}", body.position()));
                    IkTick::StepFinished
                }
                _ => IkTick::Stepping,
            };
        }

        if !self.config.enabled || !self.ik_enabled {
            self.deactivate_feet();
            return IkTick::Disabled;
        }
        if !body.is_grounded() {
            self.deactivate_feet();
            return IkTick::Airborne;
        }

        let travel = travel_direction(body);
        let moving = body.forward_amount().abs() > self.config.moving_threshold
            && travel.is_some();

        if let Some(travel) = travel.filter(|_| moving) {
            if self.wall_ahead(body, physics, travel) {
                self.deactivate_feet();
                return IkTick::WallBlocked;
            }
        }

        self.probe_feet(body, physics, animator);

        let Some(travel) = travel.filter(|_| moving) else {
            return IkTick::Grounded;
        };
        if self.bump_ahead(body, physics, travel).is_none() {
            return IkTick::Grounded;
        }

        if body.forward_amount() > self.config.fast_forward_threshold {
            // Уже летим вверх — повторный импульс не нужен
            if body.velocity().y > 0.01 {
                return IkTick::Grounded;
            }
            body.add_impulse(Vec3::Y * self.config.bump_jump_impulse);
            return IkTick::Hop;
        }

        match self.try_begin_step(body, travel) {
            Some(foot) => IkTick::StepStarted(foot),
            None => IkTick::Grounded,
        }
    }

    /// Animation pass: идёт ли каждая нога вперёд (local z уменьшается)
    pub fn track_foot_motion(&mut self, body: &dyn CharacterBody, animator: &dyn Animator) {
        if !self.initialized {
            return;
        }

        for foot in Foot::BOTH {
            if let Some(position) = animator.bone_position(foot.foot_bone()) {
                let local_z = body.inverse_transform_point(position).z;
                self.foot_mut(foot).track_local_z(local_z);
            }
        }
    }

    /// IK pass: пишет goals только для pose_layer, вес сглаживается
    pub fn apply_pose(&mut self, layer: usize, animator: &mut dyn Animator, delta: f32) {
        if !self.initialized || layer != self.config.pose_layer {
            return;
        }

        let weight_speed = self.config.weight_speed;
        for foot in Foot::BOTH {
            let state = self.foot_mut(foot);
            state.update_weight(weight_speed, delta);
            animator.set_ik_position(foot.ik_goal(), state.goal_position());
            animator.set_ik_weight(foot.ik_goal(), state.blend_weight);
        }
    }

    fn deactivate_feet(&mut self) {
        self.left.deactivate();
        self.right.deactivate();
    }

    fn probe_feet(
        &mut self,
        body: &dyn CharacterBody,
        physics: &dyn PhysicsQuery,
        animator: &dyn Animator,
    ) {
        let body_height = body.position().y;

        for foot in Foot::BOTH {
            let bones = animator
                .bone_position(foot.hip_bone())
                .zip(animator.bone_position(foot.foot_bone()));

            let outcome = match bones {
                Some((hip, foot_position)) => {
                    probe_ground(&self.config, physics, hip, foot_position, body_height)
                }
                None => ProbeOutcome::Miss,
            };

            let foot_offset = self.config.foot_offset;
            let state = self.foot_mut(foot);
            match outcome.contact() {
                Some(contact) => state.set_contact(contact.point, contact.normal, foot_offset),
                None => state.clear_contact(),
            }
        }
    }

    fn wall_ahead(&self, body: &dyn CharacterBody, physics: &dyn PhysicsQuery, travel: Vec3) -> bool {
        let radius = self.config.check_radius;
        let cast = SphereCast {
            origin: body.position() + Vec3::Y * (self.config.max_step_height + radius),
            radius,
            direction: travel,
            max_distance: body.capsule_radius() * self.config.wall_check_factor,
            mask: self.config.wall_layers,
            triggers: QueryTriggers::Ignore,
        };
        physics.sphere_cast(&cast).is_some()
    }

    fn bump_ahead(&self, body: &dyn CharacterBody, physics: &dyn PhysicsQuery, travel: Vec3) -> Option<Hit> {
        let cast = SphereCast {
            origin: body.position() + Vec3::Y * self.config.bump_check_height,
            radius: self.config.check_radius,
            direction: travel,
            max_distance: self.config.bump_check_distance,
            mask: self.config.step_layers,
            triggers: QueryTriggers::Ignore,
        };
        physics
            .sphere_cast(&cast)
            .filter(|hit| surface_angle_deg(hit.normal) > self.config.max_slope_angle)
    }

    fn try_begin_step(&mut self, body: &mut dyn CharacterBody, travel: Vec3) -> Option<Foot> {
        // Нет контакта ни под одной ногой — step не начинаем
        let (foot, point) = Foot::BOTH
            .into_iter()
            .filter_map(|foot| self.foot(foot).contact().map(|point| (foot, point)))
            .max_by(|a, b| a.1.y.total_cmp(&b.1.y))?;

        let position = body.position();
        let offset = point - position;
        let forward_distance = travel.dot(offset);
        if forward_distance <= 0.0 {
            return None;
        }

        let local = body.inverse_transform_point(point);
        if local.y <= self.config.min_step_height || local.y > self.config.max_step_height {
            return None;
        }
        if !self.foot(foot).stepping_forward {
            return None;
        }

        let end = position + Vec3::Y * offset.y + travel * forward_distance;
        self.step.begin(body, end);

        let pinned = point + Vec3::Y * self.config.foot_offset;
        self.foot_mut(foot).override_point = Some(pinned);

        logger::log(&format!(
            "Step started: {:?} foot, {:.2}m up, {:.2}m forward",
            foot, offset.y, forward_distance
        ));
        Some(foot)
    }
}

impl IkSwitch for LegIk {
    fn set_ik_enabled(&mut self, enabled: bool) {
        self.ik_enabled = enabled;
        if !enabled {
            self.deactivate_feet();
        }
    }

    fn ik_enabled(&self) -> bool {
        self.ik_enabled
    }

    fn release_body(&mut self, body: &mut dyn CharacterBody) -> bool {
        if !self.step.finish(body) {
            return false;
        }
        self.left.override_point = None;
        self.right.override_point = None;
        logger::log(&format!("Step cut short at {:?}", body.position()));
        true
    }
}

/// Горизонтальное направление движения; без input — forward тела
fn travel_direction(body: &dyn CharacterBody) -> Option<Vec3> {
    planar_direction(body.move_direction()).or_else(|| planar_direction(body.forward()))
}
