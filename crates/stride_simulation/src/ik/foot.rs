//! Per-foot IK state

use bevy::prelude::*;

use crate::components::{Bone, IkGoal};
use crate::shared::move_towards;

/// Sentinel для "нет контакта в этом тике"
pub const NO_CONTACT: Vec3 = Vec3::splat(-10_000.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Foot {
    Left,
    Right,
}

impl Foot {
    pub const BOTH: [Foot; 2] = [Foot::Left, Foot::Right];

    pub fn foot_bone(self) -> Bone {
        match self {
            Foot::Left => Bone::LeftFoot,
            Foot::Right => Bone::RightFoot,
        }
    }

    pub fn hip_bone(self) -> Bone {
        match self {
            Foot::Left => Bone::LeftUpperLeg,
            Foot::Right => Bone::RightUpperLeg,
        }
    }

    pub fn ik_goal(self) -> IkGoal {
        match self {
            Foot::Left => IkGoal::LeftFoot,
            Foot::Right => IkGoal::RightFoot,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FootState {
    /// World позиция для IK solver'а
    pub ik_target: Vec3,
    pub ik_active: bool,
    /// Сглаженный вес [0, 1], живёт между тиками
    pub blend_weight: f32,
    /// Последняя точка контакта или NO_CONTACT
    pub height_offset: Vec3,
    pub ground_normal: Vec3,
    /// Нога идёт вперёд (local z уменьшился с прошлого тика)
    pub stepping_forward: bool,
    /// Закреплённая точка на время step transition (None = брать ik_target)
    pub override_point: Option<Vec3>,
    previous_local_z: Option<f32>,
}

impl Default for FootState {
    fn default() -> Self {
        Self {
            ik_target: Vec3::ZERO,
            ik_active: false,
            blend_weight: 0.0,
            height_offset: NO_CONTACT,
            ground_normal: Vec3::Y,
            stepping_forward: false,
            override_point: None,
            previous_local_z: None,
        }
    }
}

impl FootState {
    pub fn contact(&self) -> Option<Vec3> {
        if self.height_offset == NO_CONTACT {
            None
        } else {
            Some(self.height_offset)
        }
    }

    pub fn set_contact(&mut self, point: Vec3, normal: Vec3, foot_offset: f32) {
        self.height_offset = point;
        self.ground_normal = normal;
        self.ik_target = point + Vec3::Y * foot_offset;
        self.ik_active = true;
    }

    pub fn clear_contact(&mut self) {
        self.height_offset = NO_CONTACT;
        self.ik_active = false;
    }

    /// Target остаётся как был, вес уйдёт в 0
    pub fn deactivate(&mut self) {
        self.ik_active = false;
    }

    pub fn goal_position(&self) -> Vec3 {
        self.override_point.unwrap_or(self.ik_target)
    }

    pub fn update_weight(&mut self, weight_speed: f32, delta: f32) {
        let target = if self.ik_active { 1.0 } else { 0.0 };
        self.blend_weight =
            move_towards(self.blend_weight, target, weight_speed * delta).clamp(0.0, 1.0);
    }

    pub fn track_local_z(&mut self, local_z: f32) {
        self.stepping_forward = self.previous_local_z.is_some_and(|previous| local_z < previous);
        self.previous_local_z = Some(local_z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contact_sentinel() {
        let mut foot = FootState::default();
        assert!(foot.contact().is_none());

        foot.set_contact(Vec3::new(0.0, 0.3, 0.5), Vec3::Y, 0.08);
        assert_eq!(foot.contact(), Some(Vec3::new(0.0, 0.3, 0.5)));
        assert!(foot.ik_active);
        assert!((foot.ik_target.y - 0.38).abs() < 1e-6);

        foot.clear_contact();
        assert!(foot.contact().is_none());
        assert!(!foot.ik_active);
    }

    #[test]
    fn test_stepping_forward_needs_history() {
        let mut foot = FootState::default();
        foot.track_local_z(0.6);
        assert!(!foot.stepping_forward); // Первый тик — сравнивать не с чем

        foot.track_local_z(0.55);
        assert!(foot.stepping_forward);

        foot.track_local_z(0.7);
        assert!(!foot.stepping_forward);
    }

    #[test]
    fn test_override_point_wins() {
        let mut foot = FootState::default();
        foot.set_contact(Vec3::ZERO, Vec3::Y, 0.0);
        assert_eq!(foot.goal_position(), Vec3::ZERO);

        foot.override_point = Some(Vec3::ONE);
        assert_eq!(foot.goal_position(), Vec3::ONE);
    }
}
