//! TriggerBehaviour — то, что делает конкретный scene trigger
//!
//! Controller решает КОГДА (exclusivity, cooldown, match-target, restore),
//! behaviour решает ЧТО (eligibility, выбор анимации, режим тела).

use bevy::prelude::*;

use super::anchor::TriggerAnchor;
use crate::components::{Animator, CharacterBody};
use crate::platform::InteractionInput;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TriggerKind {
    Ledge,
    Ladder,
    Pickup,
    Custom,
}

/// Что видит eligibility predicate
pub struct EligibilityContext<'a> {
    pub body: &'a dyn CharacterBody,
    pub anchor: &'a TriggerAnchor,
    pub input: InteractionInput,
}

/// Что получают start / end hooks
pub struct TriggerHookContext<'a> {
    pub trigger: Entity,
    pub anchor: &'a TriggerAnchor,
    pub input: InteractionInput,
    pub body: &'a mut dyn CharacterBody,
    pub animator: &'a mut dyn Animator,
}

pub trait TriggerBehaviour: Send + Sync + 'static {
    fn kind(&self) -> TriggerKind;

    /// Текст подсказки для UI пока персонаж в триггере
    fn hint(&self) -> &str;

    fn is_eligible(&self, ctx: &EligibilityContext) -> bool;

    /// false = отказ, интеракция не начинается
    fn on_start(&self, ctx: &mut TriggerHookContext) -> bool;

    fn on_end(&self, ctx: &mut TriggerHookContext);
}

/// Scene trigger: anchor + поведение
#[derive(Component)]
pub struct SceneTrigger {
    pub anchor: TriggerAnchor,
    behaviour: Box<dyn TriggerBehaviour>,
}

impl SceneTrigger {
    pub fn new(anchor: TriggerAnchor, behaviour: impl TriggerBehaviour) -> Self {
        Self {
            anchor,
            behaviour: Box::new(behaviour),
        }
    }

    pub fn behaviour(&self) -> &dyn TriggerBehaviour {
        self.behaviour.as_ref()
    }

    pub fn kind(&self) -> TriggerKind {
        self.behaviour.kind()
    }
}

impl std::fmt::Debug for SceneTrigger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SceneTrigger")
            .field("kind", &self.behaviour.kind())
            .field("anchor", &self.anchor)
            .finish()
    }
}
