//! Step transition: тело "поднимается" на ступень по ease-in кривой
//!
//! На время перехода капсула — trigger, тело kinematic, без гравитации, ground pull, capsule
//! scaling и movement. Snapshot флагов снимается в begin() и возвращается
//! ровно один раз (finish() идемпотентен).

use bevy::prelude::*;

use crate::components::{BodyFlags, CharacterBody};
use crate::shared::ease_in_lerp;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepProgress {
    Idle,
    Moving,
    Finished,
}

#[derive(Debug, Clone)]
pub struct StepTransition {
    active: bool,
    elapsed: f32,
    max_duration: f32,
    start: Vec3,
    end: Vec3,
    saved_flags: Option<BodyFlags>,
}

impl StepTransition {
    pub fn new(max_duration: f32) -> Self {
        Self {
            active: false,
            elapsed: 0.0,
            max_duration: max_duration.max(f32::EPSILON),
            start: Vec3::ZERO,
            end: Vec3::ZERO,
            saved_flags: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn max_duration(&self) -> f32 {
        self.max_duration
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// Позиция на кривой для данного elapsed
    pub fn position_at(&self, elapsed: f32) -> Vec3 {
        ease_in_lerp(self.start, self.end, elapsed / self.max_duration)
    }

    /// Начать переход из текущей позиции тела в `end`
    pub fn begin(&mut self, body: &mut dyn CharacterBody, end: Vec3) {
        if self.active {
            return;
        }

        self.saved_flags = Some(BodyFlags::capture(body));
        self.active = true;
        self.elapsed = 0.0;
        self.start = body.position();
        self.end = end;

        body.set_capsule_trigger(true);
        body.set_kinematic(true);
        body.set_gravity(false);
        body.set_velocity(Vec3::ZERO);
        body.set_ground_pull_suspended(true);
        body.set_capsule_scaling_suspended(true);
        body.set_movement_suspended(true);
    }

    pub fn advance(&mut self, body: &mut dyn CharacterBody, delta: f32) -> StepProgress {
        if !self.active {
            return StepProgress::Idle;
        }

        // elapsed == max_duration ещё тик на кривой (позиция уже end)
        self.elapsed += delta;
        if self.elapsed > self.max_duration {
            self.finish(body);
            return StepProgress::Finished;
        }

        body.set_position(self.position_at(self.elapsed));
        StepProgress::Moving
    }

    /// Снап в end + восстановление флагов. Повторный вызов — no-op.
    pub fn finish(&mut self, body: &mut dyn CharacterBody) -> bool {
        let Some(flags) = self.saved_flags.take() else {
            return false;
        };

        body.set_position(self.end);
        flags.restore(body);
        self.active = false;
        true
    }
}
