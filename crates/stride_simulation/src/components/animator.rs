//! Animator link: контракт с animation/rig evaluator
//!
//! Симуляция не считает позы. Она:
//! - читает позиции костей и state info (что сейчас играет)
//! - пишет IK goals (позиция + вес), параметры, match-target запросы
//!
//! `AnimatorLink` — ECS data-mirror: host evaluator заливает в него кости
//! и state info перед тиком, после тика забирает goals / match запросы.

use std::collections::HashMap;

use bevy::prelude::*;

/// Кости, нужные IK
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bone {
    Hips,
    LeftUpperLeg,
    RightUpperLeg,
    LeftFoot,
    RightFoot,
    LeftHand,
    RightHand,
}

/// IK goals (конечности)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IkGoal {
    LeftFoot,
    RightFoot,
    LeftHand,
    RightHand,
}

impl IkGoal {
    pub const ALL: [IkGoal; 4] = [
        IkGoal::LeftFoot,
        IkGoal::RightFoot,
        IkGoal::LeftHand,
        IkGoal::RightHand,
    ];

    fn index(self) -> usize {
        match self {
            IkGoal::LeftFoot => 0,
            IkGoal::RightFoot => 1,
            IkGoal::LeftHand => 2,
            IkGoal::RightHand => 3,
        }
    }
}

/// Часть тела для match-target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AvatarTarget {
    #[default]
    Root,
    Body,
    LeftFoot,
    RightFoot,
    LeftHand,
    RightHand,
}

/// Что сейчас играет на слое
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorStateInfo {
    pub name: String,
    pub normalized_time: f32,
    /// Playback speed (speed × multiplier)
    pub speed: f32,
    /// Длина клипа (секунды)
    pub length: f32,
}

impl AnimatorStateInfo {
    pub fn new(name: impl Into<String>, length: f32) -> Self {
        Self {
            name: name.into(),
            normalized_time: 0.0,
            speed: 1.0,
            length,
        }
    }
}

/// Per-axis веса match-target (position xyz + rotation)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchTargetWeightMask {
    pub position: Vec3,
    pub rotation: f32,
}

impl Default for MatchTargetWeightMask {
    fn default() -> Self {
        Self {
            position: Vec3::ONE,
            rotation: 0.0,
        }
    }
}

/// One-shot match-target запрос
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchTargetRequest {
    pub position: Vec3,
    pub rotation: Quat,
    pub body_part: AvatarTarget,
    pub weight_mask: MatchTargetWeightMask,
    /// Нормализованное окно клипа [start, end]
    pub start_time: f32,
    pub end_time: f32,
}

/// Имена параметров animator controller'а
pub mod params {
    /// Начало окна match-target (normalized time), выставляется клипом
    pub const MATCH_START: &str = "MatchStart";
    /// Конец окна match-target (normalized time)
    pub const MATCH_END: &str = "MatchEnd";

    pub const LEDGE: &str = "Ledge";
    pub const CLIMB_UP: &str = "ClimbUp";
    pub const DROP_DOWN: &str = "DropDown";
    pub const LADDER: &str = "Ladder";
    pub const LADDER_UP: &str = "LadderUp";
    pub const LADDER_DOWN: &str = "LadderDown";
    pub const PICKUP: &str = "Pickup";

    /// Все ledge/ladder флаги — сбрасываются в false при break
    pub const INTERACTION_FLAGS: [&str; 7] = [
        LEDGE, CLIMB_UP, DROP_DOWN, LADDER, LADDER_UP, LADDER_DOWN, PICKUP,
    ];

    /// Вес ragdoll поверх анимации (0 = анимация, 1 = физика)
    pub const RAGDOLL_BLEND: &str = "RagdollBlend";
    pub const HIT: &str = "Hit";
}

pub trait Animator {
    fn bone_position(&self, bone: Bone) -> Option<Vec3>;

    fn set_ik_position(&mut self, goal: IkGoal, position: Vec3);
    fn set_ik_weight(&mut self, goal: IkGoal, weight: f32);

    fn current_state(&self, layer: usize) -> Option<AnimatorStateInfo>;
    fn previous_state(&self, layer: usize) -> Option<AnimatorStateInfo>;
    fn is_in_transition(&self, layer: usize) -> bool;

    fn has_parameter(&self, name: &str) -> bool;
    fn float_param(&self, name: &str) -> Option<f32>;
    fn set_float(&mut self, name: &str, value: f32);
    fn bool_param(&self, name: &str) -> Option<bool>;
    fn set_bool(&mut self, name: &str, value: bool);

    fn match_target(&mut self, request: MatchTargetRequest);
    fn interrupt_match_target(&mut self);
    fn is_matching_target(&self) -> bool;
}

/// IK goal как его видит evaluator
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct IkGoalState {
    pub position: Vec3,
    pub weight: f32,
}

#[derive(Debug, Clone, Default)]
pub struct LayerPlayback {
    pub current: Option<AnimatorStateInfo>,
    pub previous: Option<AnimatorStateInfo>,
    pub in_transition: bool,
}

/// ECS data-mirror animator'а
#[derive(Component, Debug, Clone, Default)]
pub struct AnimatorLink {
    pub bones: HashMap<Bone, Vec3>,
    pub layers: Vec<LayerPlayback>,
    pub floats: HashMap<String, f32>,
    pub bools: HashMap<String, bool>,
    pub ik_goals: [IkGoalState; 4],

    /// Запрос, который host ещё не забрал
    pub pending_match: Option<MatchTargetRequest>,
    pub matching: bool,
    /// Сколько раз match прерывали (host реагирует на изменение)
    pub match_interrupts: u32,
}

impl AnimatorLink {
    /// Animator со всеми параметрами контроллера персонажа
    pub fn with_character_parameters() -> Self {
        let mut link = Self::default();
        link.floats.insert(params::MATCH_START.to_string(), 0.0);
        link.floats.insert(params::MATCH_END.to_string(), 1.0);
        link.floats.insert(params::RAGDOLL_BLEND.to_string(), 0.0);
        for flag in params::INTERACTION_FLAGS {
            link.bools.insert(flag.to_string(), false);
        }
        link.bools.insert(params::HIT.to_string(), false);
        link
    }

    pub fn set_bone(&mut self, bone: Bone, position: Vec3) {
        self.bones.insert(bone, position);
    }

    /// Host: новое состояние на слое (текущее уходит в previous)
    pub fn enter_state(&mut self, layer: usize, info: AnimatorStateInfo) {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, LayerPlayback::default);
        }
        let playback = &mut self.layers[layer];
        playback.previous = playback.current.take();
        playback.current = Some(info);
    }

    pub fn set_in_transition(&mut self, layer: usize, in_transition: bool) {
        if self.layers.len() <= layer {
            self.layers.resize_with(layer + 1, LayerPlayback::default);
        }
        self.layers[layer].in_transition = in_transition;
    }

    pub fn ik_goal(&self, goal: IkGoal) -> IkGoalState {
        self.ik_goals[goal.index()]
    }

    /// Host забирает match-target запрос
    pub fn take_match_request(&mut self) -> Option<MatchTargetRequest> {
        self.pending_match.take()
    }
}

impl Animator for AnimatorLink {
    fn bone_position(&self, bone: Bone) -> Option<Vec3> {
        self.bones.get(&bone).copied()
    }

    fn set_ik_position(&mut self, goal: IkGoal, position: Vec3) {
        self.ik_goals[goal.index()].position = position;
    }

    fn set_ik_weight(&mut self, goal: IkGoal, weight: f32) {
        self.ik_goals[goal.index()].weight = weight.clamp(0.0, 1.0);
    }

    fn current_state(&self, layer: usize) -> Option<AnimatorStateInfo> {
        self.layers.get(layer).and_then(|l| l.current.clone())
    }

    fn previous_state(&self, layer: usize) -> Option<AnimatorStateInfo> {
        self.layers.get(layer).and_then(|l| l.previous.clone())
    }

    fn is_in_transition(&self, layer: usize) -> bool {
        self.layers.get(layer).is_some_and(|l| l.in_transition)
    }

    fn has_parameter(&self, name: &str) -> bool {
        self.floats.contains_key(name) || self.bools.contains_key(name)
    }

    fn float_param(&self, name: &str) -> Option<f32> {
        self.floats.get(name).copied()
    }

    fn set_float(&mut self, name: &str, value: f32) {
        self.floats.insert(name.to_string(), value);
    }

    fn bool_param(&self, name: &str) -> Option<bool> {
        self.bools.get(name).copied()
    }

    fn set_bool(&mut self, name: &str, value: bool) {
        self.bools.insert(name.to_string(), value);
    }

    fn match_target(&mut self, request: MatchTargetRequest) {
        self.pending_match = Some(request);
        self.matching = true;
    }

    fn interrupt_match_target(&mut self) {
        if self.matching || self.pending_match.is_some() {
            self.match_interrupts += 1;
        }
        self.pending_match = None;
        self.matching = false;
    }

    fn is_matching_target(&self) -> bool {
        self.matching
    }
}
