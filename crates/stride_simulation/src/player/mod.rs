//! Player domain — input relay
//!
//! Только player-controlled персонажи (With<Player>); остальным
//! BodyState.move_direction пишут скрипты / AI host'а.

use bevy::prelude::*;

pub mod input;

pub use input::{movement_from_input, relay_player_input};

use crate::SimulationSet;

pub struct PlayerPlugin;

impl Plugin for PlayerPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, relay_player_input.in_set(SimulationSet::Input));
    }
}
