//! Physics query interface (ray / sphere / capsule casts)
//!
//! IK и stepping не владеют physics world — они только задают вопросы.
//! Все casts синхронные (блокирующие относительно тика).
//!
//! Реализации:
//! - `RapierPhysicsQuery` — bevy_rapier3d RapierContext (игра)
//! - `BoxWorld` — аналитический мир из AABB (headless, тесты)

use bevy::prelude::*;

use super::layers::LayerMask;

/// Учитывать ли сенсоры (trigger volumes) в query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueryTriggers {
    #[default]
    Ignore,
    Collide,
}

/// Результат cast'а
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hit {
    /// Точка контакта на поверхности коллайдера
    pub point: Vec3,
    /// Нормаль поверхности в точке контакта
    pub normal: Vec3,
    /// Пройденная дистанция вдоль направления cast'а
    pub distance: f32,
    /// Entity коллайдера (None для аналитической геометрии)
    pub collider: Option<Entity>,
    /// Слой коллайдера (индекс 0-31)
    pub layer: u32,
}

#[derive(Debug, Clone, Copy)]
pub struct RayCast {
    pub origin: Vec3,
    pub direction: Vec3,
    pub max_distance: f32,
    pub mask: LayerMask,
    pub triggers: QueryTriggers,
}

#[derive(Debug, Clone, Copy)]
pub struct SphereCast {
    pub origin: Vec3,
    pub radius: f32,
    pub direction: Vec3,
    pub max_distance: f32,
    pub mask: LayerMask,
    pub triggers: QueryTriggers,
}

/// Capsule cast: сегмент `point_a`..`point_b` с радиусом, сдвигаемый вдоль direction
#[derive(Debug, Clone, Copy)]
pub struct CapsuleCast {
    pub point_a: Vec3,
    pub point_b: Vec3,
    pub radius: f32,
    pub direction: Vec3,
    pub max_distance: f32,
    pub mask: LayerMask,
    pub triggers: QueryTriggers,
}

pub trait PhysicsQuery {
    fn raycast(&self, ray: &RayCast) -> Option<Hit>;
    fn sphere_cast(&self, cast: &SphereCast) -> Option<Hit>;
    fn capsule_cast(&self, cast: &CapsuleCast) -> Option<Hit>;
}
