//! Combat domain — hits, смерть, ragdoll
//!
//! Содержит:
//! - Damage (HitReceived → Health, DamageTaken / CharacterDied events)
//! - Ragdoll (отложенная активация, recover таймер, RagdollBlend)
//!
//! Порядок в FixedUpdate:
//! apply_hits (SimulationSet::Damage) → ... → tick_ragdolls (SimulationSet::Ragdoll)

use bevy::prelude::*;

pub mod damage;
pub mod ragdoll;

pub use damage::{apply_hits, resolve_hit, CharacterDied, DamageTaken, Dead, HitOutcome, HitReceived};
pub use ragdoll::{tick_ragdolls, CombatConfig, Ragdoll};

use crate::SimulationSet;

/// Combat plugin
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<HitReceived>()
            .add_event::<DamageTaken>()
            .add_event::<CharacterDied>();

        app.add_systems(FixedUpdate, apply_hits.in_set(SimulationSet::Damage));
        app.add_systems(FixedUpdate, tick_ragdolls.in_set(SimulationSet::Ragdoll));

        crate::logger::log("CombatPlugin initialized");
    }
}
