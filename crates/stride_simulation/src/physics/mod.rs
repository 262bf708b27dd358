//! Physics domain
//!
//! Query интерфейс (ray / sphere / capsule casts), слои, две реализации
//! (Rapier для игры, аналитический BoxWorld для headless) и headless locomotion.

use bevy::prelude::*;

pub mod analytic;
pub mod layers;
pub mod locomotion;
pub mod query;
pub mod rapier;

// Re-export основных типов
pub use analytic::{BoxWorld, SceneBox};
pub use layers::LayerMask;
pub use locomotion::{HeadlessRig, Locomotion, LocomotionConfig};
pub use query::{CapsuleCast, Hit, PhysicsQuery, QueryTriggers, RayCast, SphereCast};
pub use rapier::RapierPhysicsQuery;

use crate::SimulationSet;

/// Plugin headless движения
///
/// Системы работают только при наличии BoxWorld: с Rapier/движком тело двигает host.
pub struct LocomotionPlugin;

impl Plugin for LocomotionPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                locomotion::headless_locomotion,
                locomotion::animate_headless_rig,
            )
                .chain()
                .run_if(resource_exists::<BoxWorld>)
                .in_set(SimulationSet::Locomotion),
        );

        app.add_systems(
            FixedUpdate,
            locomotion::sync_body_transforms.after(SimulationSet::Ragdoll),
        );
    }
}
