//! PhysicsQuery поверх bevy_rapier3d
//!
//! Rapier слои = CollisionGroups: membership бит N ↔ layer N.
//! Слой hit'а берётся из CollisionGroups коллайдера (первый membership бит),
//! коллайдер без CollisionGroups считается LAYER_DEFAULT.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::layers::{LayerMask, LAYER_DEFAULT};
use super::query::{CapsuleCast, Hit, PhysicsQuery, QueryTriggers, RayCast, SphereCast};

pub struct RapierPhysicsQuery<'a, L>
where
    L: Fn(Entity) -> Option<u32>,
{
    context: &'a RapierContext<'a>,
    layer_of: L,
    /// Собственная капсула персонажа (не должна попадать в свои же casts)
    exclude: Option<Entity>,
}

impl<'a, L> RapierPhysicsQuery<'a, L>
where
    L: Fn(Entity) -> Option<u32>,
{
    pub fn new(context: &'a RapierContext<'a>, layer_of: L) -> Self {
        Self {
            context,
            layer_of,
            exclude: None,
        }
    }

    pub fn excluding(mut self, entity: Entity) -> Self {
        self.exclude = Some(entity);
        self
    }

    fn filter(&self, mask: LayerMask, triggers: QueryTriggers) -> QueryFilter<'static> {
        let mut filter = QueryFilter::new().groups(CollisionGroups::new(
            Group::ALL,
            Group::from_bits_truncate(mask.0),
        ));
        if triggers == QueryTriggers::Ignore {
            filter = filter.exclude_sensors();
        }
        if let Some(entity) = self.exclude {
            filter = filter.exclude_collider(entity).exclude_rigid_body(entity);
        }
        filter
    }

    fn layer(&self, entity: Entity) -> u32 {
        (self.layer_of)(entity).unwrap_or(LAYER_DEFAULT)
    }

    fn shape_cast(
        &self,
        position: Vec3,
        shape: &Collider,
        direction: Vec3,
        max_distance: f32,
        mask: LayerMask,
        triggers: QueryTriggers,
    ) -> Option<Hit> {
        let direction = direction.try_normalize()?;
        let (entity, hit) = self.context.cast_shape(
            position,
            Quat::IDENTITY,
            direction,
            &*shape.raw,
            ShapeCastOptions::with_max_time_of_impact(max_distance),
            self.filter(mask, triggers),
        )?;

        // details == None только при стартовом пересечении
        let (point, normal) = match hit.details {
            Some(details) => (details.witness1, details.normal1),
            None => (position + direction * hit.time_of_impact, -direction),
        };

        Some(Hit {
            point,
            normal,
            distance: hit.time_of_impact,
            collider: Some(entity),
            layer: self.layer(entity),
        })
    }
}

/// Слой коллайдера по его CollisionGroups
pub fn layer_from_groups(groups: &CollisionGroups) -> u32 {
    let bits = groups.memberships.bits();
    if bits == 0 || bits == u32::MAX {
        LAYER_DEFAULT
    } else {
        bits.trailing_zeros()
    }
}

/// CollisionGroups для коллайдера сцены на слое `layer`
pub fn groups_for_layer(layer: u32) -> CollisionGroups {
    CollisionGroups::new(Group::from_bits_truncate(1 << layer), Group::ALL)
}

impl<L> PhysicsQuery for RapierPhysicsQuery<'_, L>
where
    L: Fn(Entity) -> Option<u32>,
{
    fn raycast(&self, ray: &RayCast) -> Option<Hit> {
        let direction = ray.direction.try_normalize()?;
        let (entity, intersection) = self.context.cast_ray_and_get_normal(
            ray.origin,
            direction,
            ray.max_distance,
            true,
            self.filter(ray.mask, ray.triggers),
        )?;

        Some(Hit {
            point: intersection.point,
            normal: intersection.normal,
            distance: intersection.time_of_impact,
            collider: Some(entity),
            layer: self.layer(entity),
        })
    }

    fn sphere_cast(&self, cast: &SphereCast) -> Option<Hit> {
        let shape = Collider::ball(cast.radius);
        self.shape_cast(
            cast.origin,
            &shape,
            cast.direction,
            cast.max_distance,
            cast.mask,
            cast.triggers,
        )
    }

    fn capsule_cast(&self, cast: &CapsuleCast) -> Option<Hit> {
        let center = (cast.point_a + cast.point_b) * 0.5;
        let shape = Collider::capsule(cast.point_a - center, cast.point_b - center, cast.radius);
        self.shape_cast(
            center,
            &shape,
            cast.direction,
            cast.max_distance,
            cast.mask,
            cast.triggers,
        )
    }
}
