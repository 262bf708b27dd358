//! STRIDE Simulation Core
//!
//! Third-person character controller на Bevy 0.16:
//! - leg IK (стопы на неровной земле) + step-up на ступени
//! - trigger interactions (ledge, ladder, pickup) с match-target и rotation alignment
//! - hits / ragdoll, player input relay, headless locomotion
//!
//! HYBRID ARCHITECTURE:
//! - ECS = правила контроллера (state machines, решения, флаги тела)
//! - Host engine = физика, анимация, рендер (через CharacterBody / Animator / PhysicsQuery)

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod combat;
pub mod components;
pub mod config;
pub mod error;
pub mod ik;
pub mod logger;
pub mod physics;
pub mod platform;
pub mod player;
pub mod shared;
pub mod trigger;

// Re-export базовых типов для удобства
pub use combat::{CharacterDied, CombatConfig, CombatPlugin, DamageTaken, Dead, HitReceived, Ragdoll};
pub use components::*;
pub use config::ControllerConfig;
pub use error::{ConfigError, SetupError};
pub use ik::{IkSwitch, IkTick, LegIk, LegIkConfig, LegIkPlugin};
pub use logger::init_logger;
pub use physics::{BoxWorld, HeadlessRig, Locomotion, LocomotionConfig, LocomotionPlugin, SceneBox};
pub use player::PlayerPlugin;
pub use trigger::{
    AnimationNotify, BreakInteraction, InteractionHint, SceneTrigger, TriggerAnchor, TriggerConfig,
    TriggerEnded, TriggerInteraction, TriggerOverlaps, TriggerPlugin, TriggerProximity, TriggerStarted,
};

/// Частота simulation tick (FixedUpdate)
pub const TICK_HZ: f64 = 60.0;

/// Порядок внутри FixedUpdate тика
///
/// Input → Damage → Interaction → Ik → Locomotion → Ragdoll
/// - Damage до Interaction: BreakInteraction от hit'а обрабатывается в том же тике
/// - Ragdoll последним: активируется уже после того как break вернул тело
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum SimulationSet {
    Input,
    Damage,
    Interaction,
    Ik,
    Locomotion,
    Ragdoll,
}

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.configure_sets(
            FixedUpdate,
            (
                SimulationSet::Input,
                SimulationSet::Damage,
                SimulationSet::Interaction,
                SimulationSet::Ik,
                SimulationSet::Locomotion,
                SimulationSet::Ragdoll,
            )
                .chain(),
        );

        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(tick_duration()))
            .init_resource::<ControllerConfig>()
            .add_plugins((PlayerPlugin, CombatPlugin, TriggerPlugin, LegIkPlugin, LocomotionPlugin));
    }
}

pub fn tick_duration() -> Duration {
    Duration::from_secs_f64(1.0 / TICK_HZ)
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
///
/// Каждый `app.update()` = ровно один FixedUpdate тик (ручной шаг времени).
/// BoxWorld не вставляется: сцену задаёт вызывающий.
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(TimeUpdateStrategy::ManualDuration(tick_duration()))
        .add_plugins(SimulationPlugin);

    app
}

/// Все per-character компоненты контроллера
///
/// Кости AnimatorLink сразу расставлены headless ригом, чтобы initialize
/// в первом тике нашёл их.
pub fn character_bundle(config: &ControllerConfig, name: &str, position: Vec3) -> impl Bundle {
    let body = BodyState::at(position);
    let rig = HeadlessRig::biped();
    let mut animator = AnimatorLink::with_character_parameters();
    rig.write_bones(&body, &mut animator, &config.locomotion);

    (
        Character::new(name),
        Transform::from_translation(position),
        body,
        animator,
        rig,
        Locomotion {
            config: config.locomotion.clone(),
        },
        LegIk::new(config.leg_ik.clone()),
        TriggerInteraction::new(config.trigger.clone()),
        InteractionHint::default(),
        TriggerOverlaps::default(),
        Ragdoll::new(config.combat.clone()),
    )
}

pub fn spawn_character(commands: &mut Commands, config: &ControllerConfig, name: &str, position: Vec3) -> Entity {
    commands.spawn(character_bundle(config, name, position)).id()
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
