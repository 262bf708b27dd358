//! ControllerConfig — все designer-tunable секции в одном TOML
//!
//! ```toml
//! [leg_ik]
//! max_step_height = 0.45
//! foot_layers = ["Ground", "Step"]
//!
//! [trigger]
//! trigger_interval = 0.5
//! ```
//!
//! Отсутствующие поля/секции берутся из Default.

use std::path::Path;

use bevy::prelude::*;
use serde::Deserialize;

use crate::combat::CombatConfig;
use crate::error::ConfigError;
use crate::ik::LegIkConfig;
use crate::physics::LocomotionConfig;
use crate::trigger::TriggerConfig;

#[derive(Resource, Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ControllerConfig {
    pub leg_ik: LegIkConfig,
    pub trigger: TriggerConfig,
    pub combat: CombatConfig,
    pub locomotion: LocomotionConfig,
}

impl ControllerConfig {
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::parse(&contents, &path.display().to_string())
    }

    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        Self::parse(contents, "<inline>")
    }

    fn parse(contents: &str, path: &str) -> Result<Self, ConfigError> {
        toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::physics::layers::{LayerMask, LAYER_GROUND, MASK_FOOT_GROUND};

    #[test]
    fn test_empty_config_is_default() {
        let config = ControllerConfig::from_toml_str("").unwrap();
        assert_eq!(config, ControllerConfig::default());
        assert_eq!(config.leg_ik.step_max_time, 1.35);
        assert_eq!(config.trigger.trigger_interval, 1.0);
    }

    #[test]
    fn test_partial_overrides() {
        let config = ControllerConfig::from_toml_str(
            r#"
            [leg_ik]
            max_step_height = 0.45
            foot_layers = ["Ground"]
            step_layers = 6

            [combat]
            recover_after = 3.5
            "#,
        )
        .unwrap();

        assert_eq!(config.leg_ik.max_step_height, 0.45);
        assert_eq!(config.leg_ik.foot_layers, LayerMask::from_layer(LAYER_GROUND));
        assert_eq!(config.leg_ik.step_layers, MASK_FOOT_GROUND);
        // Не указанное — по умолчанию
        assert_eq!(config.leg_ik.foot_offset, 0.08);
        assert_eq!(config.combat.recover_after, 3.5);
        assert_eq!(config.combat.blend_speed, CombatConfig::default().blend_speed);
    }

    #[test]
    fn test_unknown_layer_is_parse_error() {
        let err = ControllerConfig::from_toml_str("[leg_ik]\nfoot_layers = [\"Lava\"]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
        assert!(err.to_string().contains("<inline>"));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = ControllerConfig::from_file("/nonexistent/stride.toml").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert_eq!(path, "/nonexistent/stride.toml"),
            other => panic!("expected Io error, got {other:?}"),
        }
    }
}
