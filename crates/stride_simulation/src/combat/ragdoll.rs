//! Ragdoll: физика вместо анимации
//!
//! Активация отложенная: apply_hits кладёт запрос, tick_ragdolls применяет
//! его ПОСЛЕ trigger interaction тика. Так break интеракции успевает вернуть
//! тело, и ragdoll снимает snapshot уже чистых флагов. Активный step
//! IK отдаёт сам (IkSwitch::release_body) до snapshot'а.

use bevy::prelude::*;
use serde::Deserialize;

use crate::components::{
    params, Animator, AnimatorLink, BodyFlags, BodyState, CharacterBody, MovementMode,
};
use crate::ik::{IkSwitch, LegIk};
use crate::logger;
use crate::shared::move_towards;
use crate::trigger::TriggerInteraction;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// |impulse| (N·s) от которого нелетальный hit роняет в ragdoll
    pub ragdoll_impulse_threshold: f32,
    /// Через сколько секунд временный ragdoll встаёт
    pub recover_after: f32,
    /// Скорость RagdollBlend (единиц в секунду)
    pub blend_speed: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            ragdoll_impulse_threshold: 300.0,
            recover_after: 2.0,
            blend_speed: 4.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct RagdollRequest {
    impulse: Vec3,
    /// None — навсегда
    duration: Option<f32>,
}

#[derive(Component, Debug, Clone)]
pub struct Ragdoll {
    pub config: CombatConfig,
    active: bool,
    permanent: bool,
    blend: f32,
    recover_timer: f32,
    pending: Option<RagdollRequest>,
    saved_flags: Option<BodyFlags>,
}

impl Default for Ragdoll {
    fn default() -> Self {
        Self::new(CombatConfig::default())
    }
}

impl Ragdoll {
    pub fn new(config: CombatConfig) -> Self {
        Self {
            config,
            active: false,
            permanent: false,
            blend: 0.0,
            recover_timer: 0.0,
            pending: None,
            saved_flags: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_permanent(&self) -> bool {
        self.permanent
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Запрос на следующий tick. Несколько запросов за тик сливаются:
    /// импульсы складываются, "навсегда" побеждает.
    pub fn request(&mut self, impulse: Vec3, duration: Option<f32>) {
        self.pending = Some(match self.pending.take() {
            Some(previous) => RagdollRequest {
                impulse: previous.impulse + impulse,
                duration: previous.duration.zip(duration).map(|(a, b)| a.max(b)),
            },
            None => RagdollRequest { impulse, duration },
        });
    }

    pub fn tick(
        &mut self,
        body: &mut dyn CharacterBody,
        animator: &mut dyn Animator,
        ik: &mut dyn IkSwitch,
        delta: f32,
    ) {
        if let Some(request) = self.pending.take() {
            self.activate(body, ik, request);
        }

        if self.active && !self.permanent {
            self.recover_timer -= delta;
            if self.recover_timer <= 0.0 {
                self.recover(body, ik);
            }
        }

        let target = if self.active { 1.0 } else { 0.0 };
        self.blend = move_towards(self.blend, target, self.config.blend_speed * delta);
        animator.set_float(params::RAGDOLL_BLEND, self.blend);
    }

    fn activate(&mut self, body: &mut dyn CharacterBody, ik: &mut dyn IkSwitch, request: RagdollRequest) {
        if !self.active {
            // Step держит тело suspended: сначала он возвращает свои флаги
            ik.release_body(body);
            self.saved_flags = Some(BodyFlags::capture(body));
            self.active = true;
            self.recover_timer = 0.0;
        }

        match request.duration {
            None => self.permanent = true,
            Some(duration) => self.recover_timer = self.recover_timer.max(duration),
        }

        body.set_kinematic(false);
        body.set_gravity(true);
        body.set_capsule_trigger(false);
        body.set_movement_suspended(true);
        body.set_movement_mode(MovementMode::Ragdoll);
        body.add_impulse(request.impulse);
        ik.set_ik_enabled(false);

        logger::log(&format!(
            "Ragdoll on (impulse {:.0}, permanent: {})",
            request.impulse.length(),
            self.permanent
        ));
    }

    fn recover(&mut self, body: &mut dyn CharacterBody, ik: &mut dyn IkSwitch) {
        if let Some(flags) = self.saved_flags.take() {
            flags.restore(body);
        }
        body.set_movement_mode(MovementMode::Walking);
        ik.set_ik_enabled(true);
        self.active = false;
        logger::log("Ragdoll recovered");
    }
}

/// Система: pending запросы → активация, recover таймер, RagdollBlend
///
/// Пока ragdoll активен, trigger interaction запрещена (set_allowed(false)).
pub fn tick_ragdolls(
    time: Res<Time<Fixed>>,
    mut query: Query<(
        &mut Ragdoll,
        &mut BodyState,
        &mut AnimatorLink,
        &mut LegIk,
        Option<&mut TriggerInteraction>,
    )>,
) {
    let delta = time.delta_secs();

    for (mut ragdoll, mut body, mut animator, mut ik, interaction) in query.iter_mut() {
        if !ragdoll.is_active() && !ragdoll.has_pending() && ragdoll.blend() == 0.0 {
            continue;
        }

        ragdoll.tick(body.as_mut(), animator.as_mut(), ik.as_mut(), delta);

        if let Some(mut interaction) = interaction {
            let allowed = !ragdoll.is_active();
            if interaction.is_allowed() != allowed {
                interaction.set_allowed(allowed);
            }
        }
    }
}
