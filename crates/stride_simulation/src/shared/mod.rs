//! Shared — cross-cutting утилиты
//!
//! Используются в нескольких доменах (ik, trigger, combat):
//! - math: move_towards, eased lerp, planar проекции

pub mod math;

pub use math::*;
