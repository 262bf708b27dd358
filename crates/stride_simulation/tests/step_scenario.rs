//! Step-up integration test
//!
//! Персонаж идёт на ступень высотой 0.3м (headless App, BoxWorld):
//! - тело поднимается на ступень за одну step transition (≤ 1.35с)
//! - после step все флаги тела восстановлены
//! - слишком высокая ступень не берётся

use bevy::prelude::*;
use stride_simulation::physics::layers::LAYER_STEP;
use stride_simulation::*;

const STEP_TIME_LIMIT: f32 = 1.35;

fn step_app(step_height: f32, forward: f32) -> (App, Entity) {
    let mut app = create_headless_app(7);
    app.insert_resource(BoxWorld::new().with_ground(0.0).with_box(SceneBox::solid(
        Vec3::new(-1.0, 0.0, 0.5),
        Vec3::new(1.0, step_height, 30.0),
        LAYER_STEP,
    )));

    let config = ControllerConfig::default();
    let character = app
        .world_mut()
        .spawn(character_bundle(&config, "Walker", Vec3::ZERO))
        .insert((
            Player,
            PlayerInput {
                movement: Vec2::new(0.0, forward),
                ..default()
            },
        ))
        .id();

    (app, character)
}

fn body(app: &App, entity: Entity) -> BodyState {
    app.world().get::<BodyState>(entity).cloned().expect("character has BodyState")
}

fn is_stepping(app: &App, entity: Entity) -> bool {
    app.world()
        .get::<LegIk>(entity)
        .is_some_and(|ik| ik.is_stepping())
}

#[test]
fn test_walks_up_a_03m_step() {
    let (mut app, character) = step_app(0.3, 0.5);

    let mut stepping_ticks = 0;
    let mut steps_started = 0;
    let mut was_stepping = false;

    for _ in 0..600 {
        app.update();

        let stepping = is_stepping(&app, character);
        if stepping {
            stepping_ticks += 1;
            assert!(body(&app, character).is_kinematic(), "body must be kinematic while stepping");
        }
        if stepping && !was_stepping {
            steps_started += 1;
        }
        was_stepping = stepping;
    }

    let state = body(&app, character);
    assert_eq!(steps_started, 1, "exactly one step transition expected");
    // Тик begin'а идёт с elapsed = 0, кривую отсчитывают остальные
    assert!(
        (stepping_ticks - 1) as f32 / TICK_HZ as f32 <= STEP_TIME_LIMIT + 1.0 / TICK_HZ as f32,
        "step took {} ticks",
        stepping_ticks
    );
    assert!((state.position.y - 0.3).abs() < 1e-3, "body y = {}", state.position.y);
    assert!(state.position.z > 0.5);
    assert_eq!(state.flags, BodyFlags::default());
    assert!(state.is_grounded());
}

#[test]
fn test_too_high_step_is_not_climbed() {
    let (mut app, character) = step_app(0.7, 0.5);

    for _ in 0..300 {
        app.update();
        assert!(!is_stepping(&app, character));
    }

    let state = body(&app, character);
    assert!(state.position.y.abs() < 1e-3);
    assert!(state.position.z < 0.2 + 1e-3);
}

#[test]
fn test_standing_character_never_steps() {
    let (mut app, character) = step_app(0.3, 0.0);

    for _ in 0..120 {
        app.update();
        assert!(!is_stepping(&app, character));
    }

    assert!(body(&app, character).position.length() < 1e-4);
}
