//! ECS Components персонажа
//!
//! Организация по доменам:
//! - actor: Character, Health
//! - body: CharacterBody контракт + BodyState (капсула, rigid body флаги)
//! - animator: Animator контракт + AnimatorLink (кости, IK goals, параметры)
//! - player: Player marker, PlayerInput

pub mod actor;
pub mod animator;
pub mod body;
pub mod player;

// Re-exports для удобного импорта
pub use actor::*;
pub use animator::*;
pub use body::*;
pub use player::*;
