//! Ground probe: где под стопой можно поставить ногу
//!
//! Капсула стартует на высоте бедра прямо над стопой и идёт вниз сквозь
//! стопу (плюс max_step_height запаса). Кандидат уточняется коротким лучом
//! вниз, чтобы точка лежала на верхней грани, а не на ребре.

use bevy::prelude::*;

use super::config::LegIkConfig;
use crate::physics::{CapsuleCast, PhysicsQuery, QueryTriggers, RayCast};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GroundContact {
    pub point: Vec3,
    pub normal: Vec3,
    pub layer: u32,
}

/// Результат одного probe (для логов и тестов)
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeOutcome {
    Contact(GroundContact),
    Miss,
    /// Hit ближе ray_distance_offset — препятствие на уровне бедра
    TooClose,
    /// Hit по слою, на который нельзя ставить ногу
    NotFootLayer,
    /// Target выше тела больше чем на max_ik_height
    TooHigh,
}

impl ProbeOutcome {
    pub fn contact(self) -> Option<GroundContact> {
        match self {
            ProbeOutcome::Contact(contact) => Some(contact),
            _ => None,
        }
    }
}

pub fn probe_ground(
    config: &LegIkConfig,
    physics: &dyn PhysicsQuery,
    hip: Vec3,
    foot: Vec3,
    body_height: f32,
) -> ProbeOutcome {
    let origin = Vec3::new(foot.x, hip.y, foot.z);
    let reach = (hip.y - foot.y).max(0.0) + config.max_step_height;

    let cast = CapsuleCast {
        point_a: origin + Vec3::Y * config.probe_height,
        point_b: origin,
        radius: config.probe_radius,
        direction: Vec3::NEG_Y,
        max_distance: reach,
        mask: config.step_layers.union(config.foot_layers),
        triggers: QueryTriggers::Ignore,
    };

    let Some(hit) = physics.capsule_cast(&cast) else {
        return ProbeOutcome::Miss;
    };

    if hit.distance < config.ray_distance_offset {
        return ProbeOutcome::TooClose;
    }
    if !config.foot_layers.contains(hit.layer) {
        return ProbeOutcome::NotFootLayer;
    }

    // Уточняющий луч: капсула могла зацепить ребро ступени
    let refine = RayCast {
        origin: hit.point + Vec3::Y * config.refine_height,
        direction: Vec3::NEG_Y,
        max_distance: config.refine_height * 2.0,
        mask: config.foot_layers,
        triggers: QueryTriggers::Ignore,
    };
    let (point, normal, layer) = match physics.raycast(&refine) {
        Some(refined) => (refined.point, refined.normal, refined.layer),
        None => (hit.point, hit.normal, hit.layer),
    };

    if point.y + config.foot_offset - body_height > config.max_ik_height {
        return ProbeOutcome::TooHigh;
    }

    ProbeOutcome::Contact(GroundContact {
        point,
        normal,
        layer,
    })
}
