//! Platform context: то, что движок обычно отдаёт через глобальные синглтоны
//!
//! Delta time, input текущего кадра, lookup слоёв по имени. Передаётся в
//! каждый tick явно — core логика остаётся функцией (state, input, dt).

use bevy::prelude::*;

use crate::physics::layers::{layer_by_name, LayerMask};

/// Input, который видят trigger hooks (выбор climb-up vs drop-down и т.п.)
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InteractionInput {
    /// x = strafe, y = forward
    pub movement: Vec2,
    pub interact: bool,
    pub cancel: bool,
}

pub trait Platform {
    /// Секунды с прошлого тика
    fn delta_secs(&self) -> f32;
    fn input(&self) -> InteractionInput;

    fn layer_mask(&self, names: &[&str]) -> LayerMask {
        LayerMask::from_layers(&names.iter().filter_map(|n| layer_by_name(n)).collect::<Vec<_>>())
    }
}

/// Контекст одного тика
#[derive(Debug, Clone, Copy, Default)]
pub struct FrameContext {
    pub delta: f32,
    pub input: InteractionInput,
}

impl FrameContext {
    pub fn new(delta: f32) -> Self {
        Self {
            delta,
            input: InteractionInput::default(),
        }
    }

    pub fn with_input(mut self, input: InteractionInput) -> Self {
        self.input = input;
        self
    }
}

impl Platform for FrameContext {
    fn delta_secs(&self) -> f32 {
        self.delta
    }

    fn input(&self) -> InteractionInput {
        self.input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::layers::{LAYER_STEP, LAYER_WALL};

    #[test]
    fn test_layer_mask_lookup_skips_unknown() {
        let frame = FrameContext::new(1.0 / 60.0);
        let mask = frame.layer_mask(&["Step", "Wall", "Nope"]);
        assert!(mask.contains(LAYER_STEP));
        assert!(mask.contains(LAYER_WALL));
        assert_eq!(mask.0.count_ones(), 2);
    }
}
