//! PlayerInput → BodyState relay
//!
//! Host пишет PlayerInput (уже в world осях: камера — его забота),
//! симуляция превращает его в move_direction / forward_amount тела.

use bevy::prelude::*;

use crate::components::{BodyState, CharacterBody, Player, PlayerInput};
use crate::trigger::{BreakInteraction, TriggerInteraction};

/// Input меньше этого считается нулевым (drift стиков)
const INPUT_DEADZONE: f32 = 0.05;

/// Направление + сила движения из 2D input (x → world X, y → world Z)
pub fn movement_from_input(movement: Vec2) -> (Vec3, f32) {
    let amount = movement.length().min(1.0);
    if amount < INPUT_DEADZONE {
        return (Vec3::ZERO, 0.0);
    }
    (Vec3::new(movement.x, 0.0, movement.y).normalize(), amount)
}

/// Система: PlayerInput → BodyState, cancel → BreakInteraction
///
/// Пока движение приостановлено (step, ragdoll) или идёт интеракция,
/// тело не получает input и стоит (move_direction = 0).
pub fn relay_player_input(
    mut players: Query<(Entity, &PlayerInput, &mut BodyState, Option<&TriggerInteraction>), With<Player>>,
    mut breaks: EventWriter<BreakInteraction>,
) {
    for (entity, input, mut body, interaction) in players.iter_mut() {
        let busy = interaction.is_some_and(|i| i.is_busy());

        if input.cancel && busy {
            breaks.write(BreakInteraction { character: entity });
        }

        let (direction, amount) = if body.movement_suspended() || busy {
            (Vec3::ZERO, 0.0)
        } else {
            movement_from_input(input.movement)
        };

        if body.move_direction != direction || body.forward_amount != amount {
            body.move_direction = direction;
            body.forward_amount = amount;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadzone() {
        let (direction, amount) = movement_from_input(Vec2::new(0.01, 0.02));
        assert_eq!(direction, Vec3::ZERO);
        assert_eq!(amount, 0.0);
    }

    #[test]
    fn test_diagonal_is_clamped() {
        let (direction, amount) = movement_from_input(Vec2::new(1.0, 1.0));
        assert_eq!(amount, 1.0);
        assert!((direction.length() - 1.0).abs() < 1e-5);
        assert!(direction.y.abs() < 1e-6);
    }

    #[test]
    fn test_forward_maps_to_world_z() {
        let (direction, amount) = movement_from_input(Vec2::new(0.0, 0.5));
        assert!((direction - Vec3::Z).length() < 1e-5);
        assert!((amount - 0.5).abs() < 1e-5);
    }
}
