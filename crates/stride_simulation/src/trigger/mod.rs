//! Trigger interaction domain — ledges, ladders, pickups
//!
//! Содержит:
//! - TriggerInteraction (per-character state machine: Idle → Colliding → Interacting)
//! - SceneTrigger + TriggerBehaviour (что делает конкретный триггер)
//! - TriggerAnchor (match-target / rotation alignment цель)
//! - Events (proximity, break, animation callbacks, started/ended)

use bevy::prelude::*;

pub mod anchor;
pub mod behaviour;
pub mod controller;
pub mod events;
pub mod kinds;
pub mod systems;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod controller_tests;

pub use anchor::TriggerAnchor;
pub use behaviour::{
    EligibilityContext, SceneTrigger, TriggerBehaviour, TriggerHookContext, TriggerKind,
};
pub use controller::{
    InteractionContext, InteractionEnd, InteractionListener, InteractionPhase, NoopListener,
    RotationAlign, TriggerConfig, TriggerInteraction, TriggerLookup,
};
pub use events::{AnimationNotify, BreakInteraction, TriggerEnded, TriggerProximity, TriggerStarted};
pub use kinds::{LadderTrigger, LedgeTrigger, PickupTrigger};
pub use systems::{InteractionHint, TriggerOverlaps};

use bevy_rapier3d::prelude::CollisionEvent;

use crate::physics::BoxWorld;
use crate::SimulationSet;

pub struct TriggerPlugin;

impl Plugin for TriggerPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<TriggerProximity>()
            .add_event::<BreakInteraction>()
            .add_event::<AnimationNotify>()
            .add_event::<TriggerStarted>()
            .add_event::<TriggerEnded>()
            // Без RapierPhysicsPlugin событие никто не регистрирует
            .add_event::<CollisionEvent>();

        app.add_systems(
            FixedUpdate,
            (
                systems::initialize_trigger_interaction,
                systems::sync_trigger_anchors,
                systems::detect_box_overlaps.run_if(resource_exists::<BoxWorld>),
                systems::relay_rapier_collisions,
                systems::trigger_interaction_tick,
            )
                .chain()
                .in_set(SimulationSet::Interaction),
        );

        crate::logger::log("TriggerPlugin initialized");
    }
}
