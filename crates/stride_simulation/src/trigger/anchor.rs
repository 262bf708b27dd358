//! TriggerAnchor — куда и как персонаж выравнивается во время интеракции

use bevy::prelude::*;

use crate::components::{AvatarTarget, MatchTargetWeightMask};

#[derive(Debug, Clone, PartialEq)]
pub struct TriggerAnchor {
    /// World placement триггера. None — владелец исчез (despawn / нет Transform).
    /// Обновляется владельцем каждый тик (sync_trigger_anchors).
    pub transform: Option<Transform>,
    pub match_target: bool,
    pub rotate_to_target: bool,
    /// Состояние animator'а, во время которого делается match-target
    pub animation_state_name: String,
    pub target_body_part: AvatarTarget,
    pub weight_mask: MatchTargetWeightMask,
    /// World-space смещение точки захвата от transform
    pub catch_offset: Vec3,
    /// Множитель скорости rotation slerp
    pub rotation_speed: f32,
}

impl Default for TriggerAnchor {
    fn default() -> Self {
        Self {
            transform: None,
            match_target: true,
            rotate_to_target: true,
            animation_state_name: String::new(),
            target_body_part: AvatarTarget::Root,
            weight_mask: MatchTargetWeightMask::default(),
            catch_offset: Vec3::ZERO,
            rotation_speed: 1.0,
        }
    }
}

impl TriggerAnchor {
    pub fn new(state_name: impl Into<String>, body_part: AvatarTarget) -> Self {
        Self {
            animation_state_name: state_name.into(),
            target_body_part: body_part,
            ..default()
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = Some(transform);
        self
    }

    pub fn with_catch_offset(mut self, offset: Vec3) -> Self {
        self.catch_offset = offset;
        self
    }

    /// Точка захвата; None если transform пропал
    pub fn position(&self) -> Option<Vec3> {
        self.transform.map(|t| t.translation + self.catch_offset)
    }

    pub fn target_rotation(&self) -> Option<Quat> {
        self.transform.map(|t| t.rotation)
    }

    /// Направление, в которое должен смотреть персонаж (local +Z якоря)
    pub fn facing(&self) -> Option<Vec3> {
        self.transform.map(|t| t.rotation * Vec3::Z)
    }
}
