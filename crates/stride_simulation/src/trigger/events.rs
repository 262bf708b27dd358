//! Trigger events — host ↔ simulation
//!
//! Host → sim: TriggerProximity (sensor overlap), BreakInteraction (cancel),
//! AnimationNotify (animation graph callbacks).
//! Sim → host: TriggerStarted / TriggerEnded (выключить head-look, input и т.п.).

use bevy::prelude::*;

use super::behaviour::TriggerKind;
use super::controller::InteractionEnd;

/// Sensor overlap между капсулой персонажа и scene trigger
#[derive(Event, Debug, Clone, Copy)]
pub enum TriggerProximity {
    Enter {
        /// Entity персонажа
        character: Entity,
        /// Entity со SceneTrigger
        trigger: Entity,
    },

    Exit {
        character: Entity,
        trigger: Entity,
    },
}

/// Принудительно прервать текущую интеракцию (cancel input, hit)
#[derive(Event, Debug, Clone, Copy)]
pub struct BreakInteraction {
    pub character: Entity,
}

/// Callbacks animation graph'а
#[derive(Event, Debug, Clone)]
pub enum AnimationNotify {
    StateEntered { character: Entity, state: String },
    StateExited { character: Entity, state: String },
    /// Animation event в конце клипа интеракции
    InteractionEnd { character: Entity },
}

#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerStarted {
    pub character: Entity,
    pub trigger: Entity,
    pub kind: TriggerKind,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct TriggerEnded {
    pub character: Entity,
    pub trigger: Entity,
    pub outcome: InteractionEnd,
}
