//! Player control marker + input snapshot

use bevy::prelude::*;

/// Marker component для player-controlled персонажа
///
/// Персонажи БЕЗ этого компонента получают BodyState.move_direction от AI / скриптов.
/// Персонажи С этим компонентом получают его из PlayerInput (relay_player_input).
#[derive(Component, Debug, Clone, Copy, Default)]
pub struct Player;

/// Input snapshot текущего кадра (пишет host, device abstraction — на его стороне)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// x = strafe, y = forward (оба в [-1, 1]), в локальных осях тела
    pub movement: Vec2,
    /// Кнопка интеракции (pickup, ledge grab)
    pub interact: bool,
    /// Отмена текущей интеракции (break)
    pub cancel: bool,
}
