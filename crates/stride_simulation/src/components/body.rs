//! Character body facade: капсула, rigid body флаги, movement state
//!
//! Архитектура:
//! - `CharacterBody` — контракт, который IK и trigger controller вызывают
//! - `BodyState` — ECS data-mirror: симуляция пишет флаги, host physics
//!   (Rapier / engine bridge) читает их и синхронизирует позицию обратно
//!
//! Физическое состояние тела мутируют несколько владельцев (stepping,
//! interaction, ragdoll). Каждый владелец снимает `BodyFlags` snapshot при
//! захвате и восстанавливает его при отпускании.

use bevy::prelude::*;

use crate::physics::layers::{LayerMask, LAYER_GROUND, MASK_INTERACTION};

/// Режим движения персонажа
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Reflect)]
pub enum MovementMode {
    #[default]
    Walking,
    /// Висит / лезет на ledge
    Climbing,
    Ladder,
    /// Нырок / перекат — триггеры в это время не ловятся
    Diving,
    Ragdoll,
}

pub trait CharacterBody {
    fn position(&self) -> Vec3;
    fn set_position(&mut self, position: Vec3);
    fn rotation(&self) -> Quat;
    fn set_rotation(&mut self, rotation: Quat);

    fn forward(&self) -> Vec3 {
        self.rotation() * Vec3::Z
    }

    /// World → local space тела
    fn inverse_transform_point(&self, point: Vec3) -> Vec3 {
        self.rotation().inverse() * (point - self.position())
    }

    fn is_grounded(&self) -> bool;
    /// Сколько "вперёд" персонаж сейчас идёт (0..1, из input / анимации)
    fn forward_amount(&self) -> f32;
    /// Направление движения в world space (может быть нулевым)
    fn move_direction(&self) -> Vec3;

    fn capsule_radius(&self) -> f32;
    fn capsule_height(&self) -> f32;
    fn set_capsule(&mut self, height: f32, radius: f32);
    /// Вернуть капсулу к дефолтным размерам
    fn restore_capsule(&mut self);

    fn capsule_trigger(&self) -> bool;
    fn set_capsule_trigger(&mut self, trigger: bool);

    fn is_kinematic(&self) -> bool;
    fn set_kinematic(&mut self, kinematic: bool);
    fn uses_gravity(&self) -> bool;
    fn set_gravity(&mut self, enabled: bool);

    fn velocity(&self) -> Vec3;
    fn set_velocity(&mut self, velocity: Vec3);
    fn mass(&self) -> f32;

    fn add_impulse(&mut self, impulse: Vec3) {
        let mass = self.mass().max(0.001);
        let velocity = self.velocity() + impulse / mass;
        self.set_velocity(velocity);
    }

    fn ground_pull_suspended(&self) -> bool;
    fn set_ground_pull_suspended(&mut self, suspended: bool);
    fn capsule_scaling_suspended(&self) -> bool;
    fn set_capsule_scaling_suspended(&mut self, suspended: bool);
    fn movement_suspended(&self) -> bool;
    fn set_movement_suspended(&mut self, suspended: bool);
    fn ground_check_suspended(&self) -> bool;
    fn set_ground_check_suspended(&mut self, suspended: bool);

    fn ground_layer(&self) -> u32;
    fn movement_mode(&self) -> MovementMode;
    fn set_movement_mode(&mut self, mode: MovementMode);

    fn ledge(&self) -> Option<Entity>;
    fn set_ledge(&mut self, ledge: Option<Entity>);

    /// Слои для general interaction (trigger volumes)
    fn interaction_mask(&self) -> LayerMask;
}

/// Snapshot всех suspendable флагов тела
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BodyFlags {
    pub capsule_trigger: bool,
    pub kinematic: bool,
    pub gravity: bool,
    pub ground_pull_suspended: bool,
    pub capsule_scaling_suspended: bool,
    pub movement_suspended: bool,
    pub ground_check_suspended: bool,
}

impl BodyFlags {
    pub fn capture(body: &dyn CharacterBody) -> Self {
        Self {
            capsule_trigger: body.capsule_trigger(),
            kinematic: body.is_kinematic(),
            gravity: body.uses_gravity(),
            ground_pull_suspended: body.ground_pull_suspended(),
            capsule_scaling_suspended: body.capsule_scaling_suspended(),
            movement_suspended: body.movement_suspended(),
            ground_check_suspended: body.ground_check_suspended(),
        }
    }

    pub fn restore(&self, body: &mut dyn CharacterBody) {
        body.set_capsule_trigger(self.capsule_trigger);
        body.set_kinematic(self.kinematic);
        body.set_gravity(self.gravity);
        body.set_ground_pull_suspended(self.ground_pull_suspended);
        body.set_capsule_scaling_suspended(self.capsule_scaling_suspended);
        body.set_movement_suspended(self.movement_suspended);
        body.set_ground_check_suspended(self.ground_check_suspended);
    }
}

/// Дефолтное состояние тела: динамическое, гравитация, ничего не подавлено
impl Default for BodyFlags {
    fn default() -> Self {
        Self {
            capsule_trigger: false,
            kinematic: false,
            gravity: true,
            ground_pull_suspended: false,
            capsule_scaling_suspended: false,
            movement_suspended: false,
            ground_check_suspended: false,
        }
    }
}

/// ECS состояние тела персонажа
///
/// Position/rotation — authoritative у host physics; симуляция пишет их
/// только пока владеет телом (step transition, rotation alignment).
#[derive(Component, Debug, Clone)]
pub struct BodyState {
    pub position: Vec3,
    pub rotation: Quat,
    pub velocity: Vec3,
    pub mass: f32,

    pub grounded: bool,
    pub forward_amount: f32,
    pub move_direction: Vec3,

    pub capsule_height: f32,
    pub capsule_radius: f32,
    pub default_capsule_height: f32,
    pub default_capsule_radius: f32,

    pub flags: BodyFlags,

    pub ground_layer: u32,
    pub movement_mode: MovementMode,
    pub ledge: Option<Entity>,
    pub interaction_mask: LayerMask,
}

impl Default for BodyState {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            velocity: Vec3::ZERO,
            mass: 70.0,
            grounded: true,
            forward_amount: 0.0,
            move_direction: Vec3::ZERO,
            capsule_height: 1.8,
            capsule_radius: 0.3,
            default_capsule_height: 1.8,
            default_capsule_radius: 0.3,
            flags: BodyFlags::default(),
            ground_layer: LAYER_GROUND,
            movement_mode: MovementMode::Walking,
            ledge: None,
            interaction_mask: MASK_INTERACTION,
        }
    }
}

impl BodyState {
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            ..default()
        }
    }

    /// Задать движение вперёд по world направлению (тесты, input relay)
    pub fn with_motion(mut self, direction: Vec3, forward_amount: f32) -> Self {
        self.move_direction = direction;
        self.forward_amount = forward_amount;
        self
    }
}

impl CharacterBody for BodyState {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Quat {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Quat) {
        self.rotation = rotation;
    }

    fn is_grounded(&self) -> bool {
        self.grounded
    }

    fn forward_amount(&self) -> f32 {
        self.forward_amount
    }

    fn move_direction(&self) -> Vec3 {
        self.move_direction
    }

    fn capsule_radius(&self) -> f32 {
        self.capsule_radius
    }

    fn capsule_height(&self) -> f32 {
        self.capsule_height
    }

    fn set_capsule(&mut self, height: f32, radius: f32) {
        self.capsule_height = height;
        self.capsule_radius = radius;
    }

    fn restore_capsule(&mut self) {
        self.capsule_height = self.default_capsule_height;
        self.capsule_radius = self.default_capsule_radius;
    }

    fn capsule_trigger(&self) -> bool {
        self.flags.capsule_trigger
    }

    fn set_capsule_trigger(&mut self, trigger: bool) {
        self.flags.capsule_trigger = trigger;
    }

    fn is_kinematic(&self) -> bool {
        self.flags.kinematic
    }

    fn set_kinematic(&mut self, kinematic: bool) {
        self.flags.kinematic = kinematic;
    }

    fn uses_gravity(&self) -> bool {
        self.flags.gravity
    }

    fn set_gravity(&mut self, enabled: bool) {
        self.flags.gravity = enabled;
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn set_velocity(&mut self, velocity: Vec3) {
        self.velocity = velocity;
    }

    fn mass(&self) -> f32 {
        self.mass
    }

    fn ground_pull_suspended(&self) -> bool {
        self.flags.ground_pull_suspended
    }

    fn set_ground_pull_suspended(&mut self, suspended: bool) {
        self.flags.ground_pull_suspended = suspended;
    }

    fn capsule_scaling_suspended(&self) -> bool {
        self.flags.capsule_scaling_suspended
    }

    fn set_capsule_scaling_suspended(&mut self, suspended: bool) {
        self.flags.capsule_scaling_suspended = suspended;
    }

    fn movement_suspended(&self) -> bool {
        self.flags.movement_suspended
    }

    fn set_movement_suspended(&mut self, suspended: bool) {
        self.flags.movement_suspended = suspended;
    }

    fn ground_check_suspended(&self) -> bool {
        self.flags.ground_check_suspended
    }

    fn set_ground_check_suspended(&mut self, suspended: bool) {
        self.flags.ground_check_suspended = suspended;
    }

    fn ground_layer(&self) -> u32 {
        self.ground_layer
    }

    fn movement_mode(&self) -> MovementMode {
        self.movement_mode
    }

    fn set_movement_mode(&mut self, mode: MovementMode) {
        self.movement_mode = mode;
    }

    fn ledge(&self) -> Option<Entity> {
        self.ledge
    }

    fn set_ledge(&mut self, ledge: Option<Entity>) {
        self.ledge = ledge;
    }

    fn interaction_mask(&self) -> LayerMask {
        self.interaction_mask
    }
}
