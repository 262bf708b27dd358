//! Конкретные scene triggers: ledge, ladder, pickup

use bevy::prelude::*;

use super::behaviour::{EligibilityContext, TriggerBehaviour, TriggerHookContext, TriggerKind};
use crate::components::{params, IkGoal, MovementMode};

/// Персонаж смотрит в сторону якоря (угол между forward тела и facing якоря)
fn is_facing(ctx: &EligibilityContext, tolerance_deg: f32) -> bool {
    let Some(facing) = ctx.anchor.facing() else {
        return false;
    };
    let forward = ctx.body.forward();
    forward.angle_between(facing).to_degrees() <= tolerance_deg
}

/// Край уступа: climb-up или drop-down по вертикальному input
#[derive(Debug, Clone)]
pub struct LedgeTrigger {
    pub facing_tolerance_deg: f32,
    /// Высота капсулы пока висим
    pub hang_capsule_height: f32,
}

impl Default for LedgeTrigger {
    fn default() -> Self {
        Self {
            facing_tolerance_deg: 45.0,
            hang_capsule_height: 1.0,
        }
    }
}

impl TriggerBehaviour for LedgeTrigger {
    fn kind(&self) -> TriggerKind {
        TriggerKind::Ledge
    }

    fn hint(&self) -> &str {
        "Climb"
    }

    fn is_eligible(&self, ctx: &EligibilityContext) -> bool {
        ctx.body.movement_mode() == MovementMode::Walking && is_facing(ctx, self.facing_tolerance_deg)
    }

    fn on_start(&self, ctx: &mut TriggerHookContext) -> bool {
        let direction = if ctx.input.movement.y < -0.5 {
            params::DROP_DOWN
        } else {
            params::CLIMB_UP
        };

        ctx.animator.set_bool(params::LEDGE, true);
        ctx.animator.set_bool(direction, true);

        ctx.body.set_ledge(Some(ctx.trigger));
        ctx.body.set_movement_mode(MovementMode::Climbing);
        let radius = ctx.body.capsule_radius();
        ctx.body.set_capsule(self.hang_capsule_height, radius);
        true
    }

    fn on_end(&self, ctx: &mut TriggerHookContext) {
        ctx.animator.set_bool(params::LEDGE, false);
        ctx.animator.set_bool(params::CLIMB_UP, false);
        ctx.animator.set_bool(params::DROP_DOWN, false);
    }
}

/// Лестница: руки на перекладинах через hand IK
#[derive(Debug, Clone)]
pub struct LadderTrigger {
    pub facing_tolerance_deg: f32,
    /// Расстояние между руками по горизонтали
    pub hand_spacing: f32,
}

impl Default for LadderTrigger {
    fn default() -> Self {
        Self {
            facing_tolerance_deg: 60.0,
            hand_spacing: 0.4,
        }
    }
}

impl TriggerBehaviour for LadderTrigger {
    fn kind(&self) -> TriggerKind {
        TriggerKind::Ladder
    }

    fn hint(&self) -> &str {
        "Use ladder"
    }

    fn is_eligible(&self, ctx: &EligibilityContext) -> bool {
        is_facing(ctx, self.facing_tolerance_deg)
    }

    fn on_start(&self, ctx: &mut TriggerHookContext) -> bool {
        let (Some(grip), Some(rotation)) = (ctx.anchor.position(), ctx.anchor.target_rotation())
        else {
            return false;
        };

        let direction = if ctx.input.movement.y < 0.0 {
            params::LADDER_DOWN
        } else {
            params::LADDER_UP
        };
        ctx.animator.set_bool(params::LADDER, true);
        ctx.animator.set_bool(direction, true);

        let half = rotation * Vec3::X * (self.hand_spacing * 0.5);
        ctx.animator.set_ik_position(IkGoal::LeftHand, grip - half);
        ctx.animator.set_ik_position(IkGoal::RightHand, grip + half);
        ctx.animator.set_ik_weight(IkGoal::LeftHand, 1.0);
        ctx.animator.set_ik_weight(IkGoal::RightHand, 1.0);

        ctx.body.set_movement_mode(MovementMode::Ladder);
        true
    }

    fn on_end(&self, ctx: &mut TriggerHookContext) {
        ctx.animator.set_bool(params::LADDER, false);
        ctx.animator.set_bool(params::LADDER_UP, false);
        ctx.animator.set_bool(params::LADDER_DOWN, false);
        ctx.animator.set_ik_weight(IkGoal::LeftHand, 0.0);
        ctx.animator.set_ik_weight(IkGoal::RightHand, 0.0);
    }
}

/// Предмет на земле
#[derive(Debug, Clone)]
pub struct PickupTrigger {
    pub item: String,
}

impl PickupTrigger {
    pub fn new(item: impl Into<String>) -> Self {
        Self { item: item.into() }
    }
}

impl TriggerBehaviour for PickupTrigger {
    fn kind(&self) -> TriggerKind {
        TriggerKind::Pickup
    }

    fn hint(&self) -> &str {
        "Pick up"
    }

    fn is_eligible(&self, _ctx: &EligibilityContext) -> bool {
        true
    }

    fn on_start(&self, ctx: &mut TriggerHookContext) -> bool {
        ctx.animator.set_bool(params::PICKUP, true);
        crate::logger::log(&format!("Picking up '{}'", self.item));
        true
    }

    fn on_end(&self, ctx: &mut TriggerHookContext) {
        ctx.animator.set_bool(params::PICKUP, false);
    }
}
