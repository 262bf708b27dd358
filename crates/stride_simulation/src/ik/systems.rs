//! ECS обёртки над LegIk
//!
//! Physics tick (FixedUpdate): BoxWorld если он есть, иначе Rapier.
//! Pose pass (PostUpdate): track_foot_motion + apply_pose по всем слоям.

use bevy::prelude::*;
use bevy_rapier3d::prelude::*;

use super::engine::LegIk;
use crate::components::{AnimatorLink, BodyState};
use crate::logger;
use crate::physics::rapier::{layer_from_groups, RapierPhysicsQuery};
use crate::physics::BoxWorld;
use crate::platform::FrameContext;

/// Fail-fast setup: один раз при появлении компонента, без повторов
pub fn initialize_leg_ik(mut query: Query<(Entity, &mut LegIk, &AnimatorLink), Added<LegIk>>) {
    for (entity, mut ik, animator) in query.iter_mut() {
        match ik.initialize(animator) {
            Ok(()) => logger::log(&format!("LegIk ready on {:?}", entity)),
            Err(err) => logger::log_error(&format!("{:?}: leg IK stays inert ({})", entity, err)),
        }
    }
}

pub fn leg_ik_tick_analytic(
    world: Res<BoxWorld>,
    time: Res<Time<Fixed>>,
    mut query: Query<(&mut LegIk, &mut BodyState, &AnimatorLink)>,
) {
    let frame = FrameContext::new(time.delta_secs());

    for (mut ik, mut body, animator) in query.iter_mut() {
        ik.update(body.as_mut(), world.as_ref(), animator, &frame);
    }
}

pub fn leg_ik_tick_rapier(
    rapier: ReadRapierContext,
    groups: Query<&CollisionGroups>,
    time: Res<Time<Fixed>>,
    mut query: Query<(Entity, &mut LegIk, &mut BodyState, &AnimatorLink)>,
) {
    let Ok(context) = rapier.single() else {
        return;
    };
    let frame = FrameContext::new(time.delta_secs());

    for (entity, mut ik, mut body, animator) in query.iter_mut() {
        let physics =
            RapierPhysicsQuery::new(&context, |collider| groups.get(collider).ok().map(layer_from_groups))
                .excluding(entity);
        ik.update(body.as_mut(), &physics, animator, &frame);
    }
}

pub fn leg_ik_pose(
    time: Res<Time>,
    mut query: Query<(&mut LegIk, &BodyState, &mut AnimatorLink)>,
) {
    let delta = time.delta_secs();

    for (mut ik, body, mut animator) in query.iter_mut() {
        ik.track_foot_motion(body, animator.as_ref());

        let layers = animator.layers.len().max(1);
        for layer in 0..layers {
            ik.apply_pose(layer, animator.as_mut(), delta);
        }
    }
}
