//! Headless locomotion: движение тела без физического движка
//!
//! Архитектура:
//! - BoxWorld для коллизий (capsule cast по ходу движения, sphere cast вниз для земли)
//! - Custom velocity integration (forces не моделируем, только импульсы)
//! - Gravity + ground check + ground pull + movement input
//!
//! Kinematic тела (step transition, интеракция) не трогаем: их двигает владелец.
//! В игре всё это делает character controller host'а, системы не регистрируются
//! без BoxWorld.

use bevy::prelude::*;
use serde::Deserialize;

use super::layers::{LayerMask, MASK_FOOT_GROUND, MASK_WALL};
use super::query::{CapsuleCast, PhysicsQuery, QueryTriggers, SphereCast};
use super::BoxWorld;
use crate::components::{AnimatorLink, BodyState, Bone, CharacterBody};
use crate::shared::planar_direction;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Скорость при forward_amount = 1 (m/s)
    pub move_speed: f32,
    /// Скорость поворота к направлению движения (rad/s)
    pub turn_speed: f32,
    /// Ускорение свободного падения (m/s², отрицательное)
    pub gravity: f32,
    /// Насколько ниже капсулы ищем землю (и выше — старт проверки)
    pub ground_check_distance: f32,
    /// Затухание горизонтальной скорости без input'а (ragdoll, после hop)
    pub ground_friction: f32,
    /// Зазор до препятствия при блокировке движения
    pub skin_width: f32,
    /// Слои, блокирующие капсулу
    pub collision_layers: LayerMask,
    /// Длина шага headless рига (метры, вперёд + назад)
    pub stride_length: f32,
    /// Шагов в секунду при forward_amount = 1
    pub cadence: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            move_speed: 4.0,
            turn_speed: 10.0,
            gravity: -9.81,
            ground_check_distance: 0.15,
            ground_friction: 6.0,
            skin_width: 0.02,
            collision_layers: MASK_FOOT_GROUND.union(MASK_WALL),
            stride_length: 0.8,
            cadence: 1.6,
        }
    }
}

/// Per-character параметры locomotion (копия секции конфига)
#[derive(Component, Debug, Clone, Default)]
pub struct Locomotion {
    pub config: LocomotionConfig,
}

/// Один тик движения тела
pub fn step_body(config: &LocomotionConfig, body: &mut BodyState, physics: &dyn PhysicsQuery, delta: f32) {
    if body.is_kinematic() {
        return;
    }

    let mut velocity = body.velocity();

    // Input → горизонтальная скорость + поворот
    let input_direction = planar_direction(body.move_direction()).filter(|_| !body.movement_suspended());
    match input_direction {
        Some(direction) => {
            let speed = config.move_speed * body.forward_amount().clamp(0.0, 1.0);
            velocity.x = direction.x * speed;
            velocity.z = direction.z * speed;

            let target = Quat::from_rotation_y(direction.x.atan2(direction.z));
            let t = (config.turn_speed * delta).min(1.0);
            body.set_rotation(body.rotation().slerp(target, t));
        }
        None if body.is_grounded() => {
            let keep = (1.0 - config.ground_friction * delta).max(0.0);
            velocity.x *= keep;
            velocity.z *= keep;
        }
        None => {}
    }

    if body.uses_gravity() && !body.is_grounded() {
        velocity.y += config.gravity * delta;
    }

    // Горизонталь: капсула останавливается перед препятствием
    let horizontal = Vec3::new(velocity.x, 0.0, velocity.z) * delta;
    let mut position = body.position();
    if let Some(direction) = horizontal.try_normalize() {
        let distance = horizontal.length();
        let radius = body.capsule_radius();
        let cast = CapsuleCast {
            point_a: position + Vec3::Y * (radius + config.skin_width),
            point_b: position + Vec3::Y * (body.capsule_height() - radius).max(radius + config.skin_width),
            radius,
            direction,
            max_distance: distance + config.skin_width,
            mask: config.collision_layers,
            triggers: QueryTriggers::Ignore,
        };

        match physics.capsule_cast(&cast) {
            Some(hit) => {
                position += direction * (hit.distance - config.skin_width).max(0.0);
                velocity.x = 0.0;
                velocity.z = 0.0;
            }
            None => position += horizontal,
        }
    }

    position.y += velocity.y * delta;

    // Земля: сфера чуть уже капсулы вниз (край ступени под капсулой тоже держит)
    let probe_up = config.ground_check_distance;
    let probe_radius = (body.capsule_radius() - config.skin_width).max(0.01);
    let ground = if body.ground_check_suspended() {
        None
    } else {
        physics.sphere_cast(&SphereCast {
            origin: position + Vec3::Y * (probe_radius + probe_up),
            radius: probe_radius,
            direction: Vec3::NEG_Y,
            max_distance: probe_up * 2.0,
            mask: config.collision_layers,
            triggers: QueryTriggers::Ignore,
        })
    };

    if !body.ground_check_suspended() {
        body.grounded = ground.is_some() && velocity.y <= 0.01;
    }

    if let Some(hit) = ground.filter(|_| body.grounded) {
        if !body.ground_pull_suspended() {
            position.y = hit.point.y;
        }
        body.ground_layer = hit.layer;
        velocity.y = velocity.y.max(0.0);
    }

    body.set_position(position);
    body.set_velocity(velocity);
}

/// Процедурная поза для headless прогонов: кости в локальных осях тела,
/// стопы качаются вперёд/назад синусом в такт движению.
#[derive(Component, Debug, Clone)]
pub struct HeadlessRig {
    pub bones: Vec<(Bone, Vec3)>,
    pub phase: f32,
}

impl Default for HeadlessRig {
    fn default() -> Self {
        Self::biped()
    }
}

impl HeadlessRig {
    /// Гуманоид ~1.8м: бёдра на 0.9, стопы на щиколотке (0.05)
    pub fn biped() -> Self {
        Self {
            bones: vec![
                (Bone::Hips, Vec3::new(0.0, 0.95, 0.0)),
                (Bone::LeftUpperLeg, Vec3::new(-0.1, 0.9, 0.0)),
                (Bone::RightUpperLeg, Vec3::new(0.1, 0.9, 0.0)),
                (Bone::LeftFoot, Vec3::new(-0.1, 0.05, 0.0)),
                (Bone::RightFoot, Vec3::new(0.1, 0.05, 0.0)),
                (Bone::LeftHand, Vec3::new(-0.25, 1.0, 0.1)),
                (Bone::RightHand, Vec3::new(0.25, 1.0, 0.1)),
            ],
            phase: 0.0,
        }
    }

    pub fn advance(&mut self, config: &LocomotionConfig, forward_amount: f32, delta: f32) {
        self.phase = (self.phase + config.cadence * forward_amount.abs() * delta * std::f32::consts::TAU)
            % std::f32::consts::TAU;
    }

    /// Локальная позиция кости с учётом фазы шага
    pub fn local_pose(&self, bone: Bone, offset: Vec3, config: &LocomotionConfig) -> Vec3 {
        let swing = self.phase.sin() * config.stride_length * 0.5;
        match bone {
            Bone::LeftFoot => offset + Vec3::Z * swing,
            Bone::RightFoot => offset - Vec3::Z * swing,
            _ => offset,
        }
    }

    /// Записать world позиции костей в AnimatorLink
    pub fn write_bones(&self, body: &dyn CharacterBody, animator: &mut AnimatorLink, config: &LocomotionConfig) {
        let position = body.position();
        let rotation = body.rotation();
        for (bone, offset) in &self.bones {
            let local = self.local_pose(*bone, *offset, config);
            animator.set_bone(*bone, position + rotation * local);
        }
    }
}

/// Система: integration движения для всех тел (headless)
pub fn headless_locomotion(
    time: Res<Time<Fixed>>,
    world: Res<BoxWorld>,
    mut bodies: Query<(&mut BodyState, Option<&Locomotion>)>,
) {
    let delta = time.delta_secs();
    let fallback = LocomotionConfig::default();

    for (mut body, locomotion) in bodies.iter_mut() {
        let config = locomotion.map(|l| &l.config).unwrap_or(&fallback);
        step_body(config, body.as_mut(), world.as_ref(), delta);
    }
}

/// Система: процедурный риг → кости AnimatorLink
pub fn animate_headless_rig(
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut HeadlessRig, &BodyState, &mut AnimatorLink, Option<&Locomotion>)>,
) {
    let delta = time.delta_secs();
    let fallback = LocomotionConfig::default();

    for (mut rig, body, mut animator, locomotion) in query.iter_mut() {
        let config = locomotion.map(|l| &l.config).unwrap_or(&fallback);
        if !body.movement_suspended() {
            rig.advance(config, body.forward_amount(), delta);
        }
        rig.write_bones(body, animator.as_mut(), config);
    }
}

/// Система: BodyState → Transform (для host'а / debug визуализации)
pub fn sync_body_transforms(mut query: Query<(&BodyState, &mut Transform), Changed<BodyState>>) {
    for (body, mut transform) in query.iter_mut() {
        transform.translation = body.position;
        transform.rotation = body.rotation;
    }
}
