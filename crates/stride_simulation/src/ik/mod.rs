//! Leg IK domain — foot placement на неровной земле + step-up на ступени
//!
//! Содержит:
//! - LegIk (per-character state machine тика)
//! - GroundProbe (capsule + refine ray под каждой стопой)
//! - StepTransition (kinematic подъём тела на ступень)
//!
//! Архитектура:
//! - core не знает про ECS: принимает `CharacterBody` / `PhysicsQuery` /
//!   `Animator` / `Platform` trait objects
//! - systems.rs — тонкие ECS обёртки (FixedUpdate tick, PostUpdate pose)

use bevy::prelude::*;

pub mod config;
pub mod engine;
pub mod foot;
pub mod probe;
pub mod step;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod engine_tests;

pub use config::LegIkConfig;
pub use engine::{IkSwitch, IkTick, LegIk, REQUIRED_BONES};
pub use foot::{Foot, FootState, NO_CONTACT};
pub use probe::{probe_ground, GroundContact, ProbeOutcome};
pub use step::{StepProgress, StepTransition};

use crate::physics::BoxWorld;
use crate::SimulationSet;

pub struct LegIkPlugin;

impl Plugin for LegIkPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            FixedUpdate,
            (
                systems::initialize_leg_ik,
                systems::leg_ik_tick_analytic.run_if(resource_exists::<BoxWorld>),
                systems::leg_ik_tick_rapier.run_if(not(resource_exists::<BoxWorld>)),
            )
                .chain()
                .in_set(SimulationSet::Ik),
        );

        app.add_systems(PostUpdate, systems::leg_ik_pose);

        crate::logger::log("LegIkPlugin initialized");
    }
}
