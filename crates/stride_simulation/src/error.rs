//! Ошибки инициализации компонентов
//!
//! Detected once при initialize(), логируются, компонент остаётся inert.
//! Runtime промахи casts — не ошибки (Option).

use crate::components::Bone;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SetupError {
    #[error("missing bone transform: {0:?}")]
    MissingBone(Bone),

    #[error("missing animator parameter '{0}'")]
    MissingParameter(String),
}

/// Ошибки загрузки конфига контроллера (TOML)
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: toml::de::Error,
    },
}
