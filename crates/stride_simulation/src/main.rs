//! Headless демо STRIDE
//!
//! Персонаж идёт по лестнице из случайных (seeded) ступеней, упирается в стену
//! и забирается на неё через ledge trigger. Анимацию изображает простой
//! stand-in host (demo_animation_host) — ровно то, что делает движок в игре.

use std::collections::HashMap;

use bevy::prelude::*;
use rand::Rng;

use stride_simulation::components::{params, AnimatorStateInfo, AvatarTarget, MatchTargetRequest};
use stride_simulation::logger;
use stride_simulation::physics::layers::{LAYER_STEP, LAYER_TRIGGER, LAYER_WALL};
use stride_simulation::trigger::LedgeTrigger;
use stride_simulation::{
    create_headless_app, spawn_character, AnimationNotify, Animator, AnimatorLink, BodyState, BoxWorld,
    ControllerConfig, DeterministicRng, Player, PlayerInput, SceneBox, SceneTrigger, TriggerAnchor,
    TriggerEnded, TriggerInteraction, TriggerStarted,
};

const CLIMB_STATE: &str = "ClimbUp";
const CLIMB_LENGTH: f32 = 1.5;
const WALL_HEIGHT: f32 = 1.6;

fn main() {
    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(42);
    let mut app = create_headless_app(seed);
    logger::log_info(&format!("Starting STRIDE headless simulation (seed: {})", seed));

    let config = match std::env::args().nth(2) {
        Some(path) => match ControllerConfig::from_file(&path) {
            Ok(config) => config,
            Err(err) => {
                logger::log_error(&format!("{}; falling back to defaults", err));
                ControllerConfig::default()
            }
        },
        None => ControllerConfig::default(),
    };
    app.insert_resource(config.clone());

    build_scene(app.world_mut(), &config);

    app.add_systems(Update, (demo_animation_host, log_interactions));

    for tick in 0..1500 {
        app.update();

        if tick % 60 == 0 {
            let world = app.world_mut();
            let mut query = world.query_filtered::<&BodyState, With<Player>>();
            for body in query.iter(world) {
                logger::log(&format!(
                    "Tick {}: position ({:.2}, {:.2}, {:.2}) mode {:?}",
                    tick, body.position.x, body.position.y, body.position.z, body.movement_mode
                ));
            }
        }
    }

    logger::log_info("Simulation complete!");
}

/// Лестница из seeded ступеней + стена с ledge trigger в конце
fn build_scene(world: &mut World, config: &ControllerConfig) {
    let mut scene = BoxWorld::new().with_ground(0.0);

    let (rises, runs): (Vec<f32>, Vec<f32>) = {
        let mut rng = world.resource_mut::<DeterministicRng>();
        (0..4)
            .map(|_| (rng.rng.gen_range(0.12..0.35), rng.rng.gen_range(1.2..2.0)))
            .unzip()
    };

    let mut z = 2.0;
    let mut height = 0.0;
    for (rise, run) in rises.iter().zip(&runs) {
        height += rise;
        // Каждая ступень тянется до стены; верхняя грань — самая высокая
        scene.add_box(SceneBox::solid(
            Vec3::new(-1.5, 0.0, z),
            Vec3::new(1.5, height, 40.0),
            LAYER_STEP,
        ));
        logger::log(&format!("Step at z {:.2}: top {:.2}m", z, height));
        z += run;
    }

    let wall_z = z + 1.0;
    scene.add_box(SceneBox::solid(
        Vec3::new(-1.5, 0.0, wall_z),
        Vec3::new(1.5, height + WALL_HEIGHT, wall_z + 4.0),
        LAYER_WALL,
    ));

    let anchor = TriggerAnchor::new(CLIMB_STATE, AvatarTarget::Root);
    let ledge = world
        .spawn((
            Transform::from_translation(Vec3::new(0.0, height + WALL_HEIGHT, wall_z + 0.4)),
            SceneTrigger::new(anchor, LedgeTrigger::default()),
        ))
        .id();
    scene.add_box(SceneBox::sensor(
        Vec3::new(-1.0, height, wall_z - 0.6),
        Vec3::new(1.0, height + 2.0, wall_z),
        LAYER_TRIGGER,
        ledge,
    ));

    world.insert_resource(scene);

    {
        let mut commands = world.commands();
        let character = spawn_character(&mut commands, config, "Runner", Vec3::ZERO);
        commands.entity(character).insert((
            Player,
            PlayerInput {
                movement: Vec2::new(0.0, 0.5),
                ..default()
            },
        ));
    }
    world.flush();
}

/// Match-target в процессе: откуда тело поехало и куда
struct ClimbMotion {
    request: MatchTargetRequest,
    start: Vec3,
}

/// Stand-in animation graph: Ledge → состояние ClimbUp, match-target
/// двигает корень, конец клипа → StateExited
fn demo_animation_host(
    time: Res<Time>,
    mut characters: Query<(Entity, &mut AnimatorLink, &mut BodyState, &TriggerInteraction)>,
    mut notifies: EventWriter<AnimationNotify>,
    mut motions: Local<HashMap<Entity, ClimbMotion>>,
) {
    let delta = time.delta_secs();

    for (entity, mut animator, mut body, interaction) in characters.iter_mut() {
        let playing = animator
            .current_state(0)
            .is_some_and(|state| state.name == CLIMB_STATE);

        if !playing {
            let climbing = interaction.is_busy()
                && animator.bool_param(params::LEDGE) == Some(true)
                && animator.bool_param(params::CLIMB_UP) == Some(true);
            if climbing {
                animator.enter_state(0, AnimatorStateInfo::new(CLIMB_STATE, CLIMB_LENGTH));
                notifies.write(AnimationNotify::StateEntered {
                    character: entity,
                    state: CLIMB_STATE.to_string(),
                });
            }
            continue;
        }

        if let Some(request) = animator.take_match_request() {
            motions.insert(
                entity,
                ClimbMotion {
                    request,
                    start: body.position,
                },
            );
        }

        let Some(layer) = animator.layers.get_mut(0) else {
            continue;
        };
        let Some(state) = layer.current.as_mut() else {
            continue;
        };
        state.normalized_time += delta * state.speed / state.length;
        let normalized = state.normalized_time;

        if let Some(motion) = motions.get(&entity) {
            let window = (motion.request.end_time - motion.request.start_time).max(f32::EPSILON);
            let t = ((normalized - motion.request.start_time) / window).clamp(0.0, 1.0);
            body.position = motion.start.lerp(motion.request.position, t);
        }

        if normalized >= 1.0 {
            motions.remove(&entity);
            animator.matching = false;
            animator.enter_state(0, AnimatorStateInfo::new("Locomotion", 1.0));
            notifies.write(AnimationNotify::StateExited {
                character: entity,
                state: CLIMB_STATE.to_string(),
            });
        }
    }
}

fn log_interactions(mut started: EventReader<TriggerStarted>, mut ended: EventReader<TriggerEnded>) {
    for event in started.read() {
        logger::log_info(&format!("{:?} started {:?} interaction", event.character, event.kind));
    }
    for event in ended.read() {
        logger::log_info(&format!("{:?} finished interaction: {:?}", event.character, event.outcome));
    }
}
