//! Аналитический physics world из AABB-боксов
//!
//! Используется когда Rapier не подключен (headless симуляция, тесты).
//! Sphere/capsule casts считаются как ray cast по боксу, расширенному на радиус
//! (сумма Минковского). На гранях это точно, на рёбрах и углах бокс
//! "квадратнее" настоящей скруглённой формы — для ступеней и стен достаточно.

use bevy::prelude::*;

use super::layers::{LayerMask, LAYER_GROUND};
use super::query::{CapsuleCast, Hit, PhysicsQuery, QueryTriggers, RayCast, SphereCast};

/// Axis-aligned бокс сцены
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneBox {
    pub min: Vec3,
    pub max: Vec3,
    pub layer: u32,
    /// Сенсор (trigger volume): не участвует в casts без QueryTriggers::Collide
    pub sensor: bool,
    /// Entity которую представляет бокс (для сенсоров триггеров)
    pub entity: Option<Entity>,
}

impl SceneBox {
    pub fn solid(min: Vec3, max: Vec3, layer: u32) -> Self {
        Self {
            min,
            max,
            layer,
            sensor: false,
            entity: None,
        }
    }

    pub fn sensor(min: Vec3, max: Vec3, layer: u32, entity: Entity) -> Self {
        Self {
            min,
            max,
            layer,
            sensor: true,
            entity: Some(entity),
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Пересечение со сферой (ближайшая точка бокса к центру)
    pub fn intersects_sphere(&self, center: Vec3, radius: f32) -> bool {
        let closest = center.clamp(self.min, self.max);
        closest.distance_squared(center) <= radius * radius
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct BoxWorld {
    pub boxes: Vec<SceneBox>,
}

impl BoxWorld {
    pub fn new() -> Self {
        Self::default()
    }

    /// Плоский пол (верхняя грань на `height`), 200x200м
    pub fn with_ground(mut self, height: f32) -> Self {
        self.boxes.push(SceneBox::solid(
            Vec3::new(-100.0, height - 1.0, -100.0),
            Vec3::new(100.0, height, 100.0),
            LAYER_GROUND,
        ));
        self
    }

    pub fn with_box(mut self, scene_box: SceneBox) -> Self {
        self.boxes.push(scene_box);
        self
    }

    pub fn add_box(&mut self, scene_box: SceneBox) {
        self.boxes.push(scene_box);
    }

    /// Сенсоры, пересекающие сферу (для headless trigger detection)
    pub fn sensors_overlapping(&self, center: Vec3, radius: f32) -> Vec<Entity> {
        self.boxes
            .iter()
            .filter(|b| b.sensor && b.intersects_sphere(center, radius))
            .filter_map(|b| b.entity)
            .collect()
    }

    fn cast_expanded(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        radius: f32,
        mask: LayerMask,
        triggers: QueryTriggers,
    ) -> Option<Hit> {
        let direction = direction.try_normalize()?;
        let mut best: Option<Hit> = None;

        for scene_box in &self.boxes {
            if !mask.contains(scene_box.layer) {
                continue;
            }
            if scene_box.sensor && triggers == QueryTriggers::Ignore {
                continue;
            }

            let expanded_min = scene_box.min - Vec3::splat(radius);
            let expanded_max = scene_box.max + Vec3::splat(radius);

            let Some((distance, normal)) = ray_aabb(origin, direction, expanded_min, expanded_max)
            else {
                continue;
            };
            if distance > max_distance {
                continue;
            }
            if best.is_some_and(|b| b.distance <= distance) {
                continue;
            }

            let point = (origin + direction * distance - normal * radius)
                .clamp(scene_box.min, scene_box.max);

            best = Some(Hit {
                point,
                normal,
                distance,
                collider: scene_box.entity,
                layer: scene_box.layer,
            });
        }

        best
    }
}

impl PhysicsQuery for BoxWorld {
    fn raycast(&self, ray: &RayCast) -> Option<Hit> {
        self.cast_expanded(ray.origin, ray.direction, ray.max_distance, 0.0, ray.mask, ray.triggers)
    }

    fn sphere_cast(&self, cast: &SphereCast) -> Option<Hit> {
        self.cast_expanded(
            cast.origin,
            cast.direction,
            cast.max_distance,
            cast.radius,
            cast.mask,
            cast.triggers,
        )
    }

    fn capsule_cast(&self, cast: &CapsuleCast) -> Option<Hit> {
        // Капсула = две сферы на концах сегмента (середина не может удариться раньше
        // концов для выпуклых боксов, кроме рёбер — приближение)
        let a = self.cast_expanded(
            cast.point_a,
            cast.direction,
            cast.max_distance,
            cast.radius,
            cast.mask,
            cast.triggers,
        );
        let b = self.cast_expanded(
            cast.point_b,
            cast.direction,
            cast.max_distance,
            cast.radius,
            cast.mask,
            cast.triggers,
        );

        match (a, b) {
            (Some(a), Some(b)) => Some(if a.distance <= b.distance { a } else { b }),
            (a, b) => a.or(b),
        }
    }
}

/// Slab-метод: (дистанция входа, нормаль грани входа).
/// Луч, стартующий внутри бокса, не считается попаданием.
fn ray_aabb(origin: Vec3, direction: Vec3, min: Vec3, max: Vec3) -> Option<(f32, Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut normal = Vec3::ZERO;

    for axis in 0..3 {
        let o = origin[axis];
        let d = direction[axis];

        if d.abs() < 1e-8 {
            if o < min[axis] || o > max[axis] {
                return None;
            }
            continue;
        }

        let inv = 1.0 / d;
        let mut t0 = (min[axis] - o) * inv;
        let mut t1 = (max[axis] - o) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }

        if t0 > t_enter {
            t_enter = t0;
            normal = Vec3::ZERO;
            normal[axis] = -d.signum();
        }
        t_exit = t_exit.min(t1);

        if t_enter > t_exit {
            return None;
        }
    }

    if t_enter < 0.0 {
        return None;
    }

    Some((t_enter, normal))
}
