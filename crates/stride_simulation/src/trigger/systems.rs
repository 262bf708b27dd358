//! ECS обёртки над TriggerInteraction
//!
//! Порядок в FixedUpdate (SimulationSet::Interaction):
//! 1. sync_trigger_anchors — Transform триггеров → anchor
//! 2. detect_box_overlaps / relay_rapier_collisions — overlap → TriggerProximity
//! 3. trigger_interaction_tick — proximity, break, animation callbacks, update

use std::collections::HashMap;

use bevy::prelude::*;
use bevy_rapier3d::prelude::CollisionEvent;

use super::behaviour::{SceneTrigger, TriggerKind};
use super::controller::{InteractionContext, InteractionEnd, InteractionListener, TriggerInteraction};
use super::events::{AnimationNotify, BreakInteraction, TriggerEnded, TriggerProximity, TriggerStarted};
use crate::components::{AnimatorLink, BodyState, CharacterBody, PlayerInput};
use crate::ik::LegIk;
use crate::logger;
use crate::physics::BoxWorld;
use crate::platform::{FrameContext, InteractionInput};

/// UI подсказка для триггера, в котором стоит персонаж
#[derive(Component, Debug, Clone, Default, PartialEq)]
pub struct InteractionHint(pub Option<String>);

/// Sensors, с которыми капсула пересекалась в прошлом тике (headless overlap)
#[derive(Component, Debug, Clone, Default)]
pub struct TriggerOverlaps(pub Vec<Entity>);

/// InteractionListener → ECS events (пишутся после тика персонажа)
struct EventRelay {
    character: Entity,
    started: Vec<TriggerStarted>,
    ended: Vec<TriggerEnded>,
    hint: Option<Option<String>>,
}

impl EventRelay {
    fn new(character: Entity) -> Self {
        Self {
            character,
            started: Vec::new(),
            ended: Vec::new(),
            hint: None,
        }
    }
}

impl InteractionListener for EventRelay {
    fn on_trigger_start(&mut self, trigger: Entity, kind: TriggerKind) {
        self.started.push(TriggerStarted {
            character: self.character,
            trigger,
            kind,
        });
    }

    fn on_trigger_end(&mut self, trigger: Entity, outcome: InteractionEnd) {
        self.ended.push(TriggerEnded {
            character: self.character,
            trigger,
            outcome,
        });
    }

    fn on_hint_changed(&mut self, hint: Option<&str>) {
        self.hint = Some(hint.map(str::to_string));
    }
}

enum Pending {
    Enter(Entity),
    Exit(Entity),
    Break,
    StateEntered(String),
    StateExited(String),
    End,
}

fn interaction_input(input: &PlayerInput) -> InteractionInput {
    InteractionInput {
        movement: input.movement,
        interact: input.interact,
        cancel: input.cancel,
    }
}

pub fn initialize_trigger_interaction(
    mut query: Query<(Entity, &mut TriggerInteraction, &AnimatorLink), Added<TriggerInteraction>>,
) {
    for (entity, mut interaction, animator) in query.iter_mut() {
        if let Err(err) = interaction.initialize(animator) {
            logger::log_error(&format!("{:?}: trigger interaction stays inert ({})", entity, err));
        }
    }
}

pub fn sync_trigger_anchors(mut triggers: Query<(&mut SceneTrigger, Option<&Transform>)>) {
    for (mut trigger, transform) in triggers.iter_mut() {
        let transform = transform.copied();
        if trigger.anchor.transform != transform {
            trigger.anchor.transform = transform;
        }
    }
}

/// Headless: пересечение капсулы (три сферы вдоль оси) с sensor-боксами BoxWorld
pub fn detect_box_overlaps(
    world: Res<BoxWorld>,
    mut characters: Query<(Entity, &BodyState, &mut TriggerOverlaps)>,
    mut proximity: EventWriter<TriggerProximity>,
) {
    for (character, body, mut overlaps) in characters.iter_mut() {
        let radius = body.capsule_radius();
        let segment = (body.capsule_height() - 2.0 * radius).max(0.0);
        let bottom = body.position() + Vec3::Y * radius;
        let probes = [bottom, bottom + Vec3::Y * (segment * 0.5), bottom + Vec3::Y * segment];
        let mask = body.interaction_mask();

        let current: Vec<Entity> = world
            .boxes
            .iter()
            .filter(|b| b.sensor && mask.contains(b.layer))
            .filter(|b| probes.iter().any(|p| b.intersects_sphere(*p, radius)))
            .filter_map(|b| b.entity)
            .collect();

        for trigger in overlaps.0.iter().filter(|e| !current.contains(e)) {
            proximity.write(TriggerProximity::Exit {
                character,
                trigger: *trigger,
            });
        }
        for trigger in current.iter().filter(|e| !overlaps.0.contains(e)) {
            proximity.write(TriggerProximity::Enter {
                character,
                trigger: *trigger,
            });
        }

        if overlaps.0 != current {
            overlaps.0 = current;
        }
    }
}

/// Rapier sensor events → TriggerProximity (персонаж ↔ SceneTrigger в любом порядке)
pub fn relay_rapier_collisions(
    mut collisions: EventReader<CollisionEvent>,
    characters: Query<(), With<TriggerInteraction>>,
    triggers: Query<(), With<SceneTrigger>>,
    mut proximity: EventWriter<TriggerProximity>,
) {
    for event in collisions.read() {
        let (a, b, entered) = match event {
            CollisionEvent::Started(a, b, _) => (*a, *b, true),
            CollisionEvent::Stopped(a, b, _) => (*a, *b, false),
        };

        let pair = if characters.contains(a) && triggers.contains(b) {
            Some((a, b))
        } else if characters.contains(b) && triggers.contains(a) {
            Some((b, a))
        } else {
            None
        };

        if let Some((character, trigger)) = pair {
            proximity.write(if entered {
                TriggerProximity::Enter { character, trigger }
            } else {
                TriggerProximity::Exit { character, trigger }
            });
        }
    }
}

#[allow(clippy::too_many_arguments)]
pub fn trigger_interaction_tick(
    time: Res<Time<Fixed>>,
    triggers: Query<&SceneTrigger>,
    mut characters: Query<(
        Entity,
        &mut TriggerInteraction,
        &mut BodyState,
        &mut AnimatorLink,
        &mut LegIk,
        Option<&PlayerInput>,
        Option<&mut InteractionHint>,
    )>,
    mut proximity: EventReader<TriggerProximity>,
    mut breaks: EventReader<BreakInteraction>,
    mut notifies: EventReader<AnimationNotify>,
    mut started_events: EventWriter<TriggerStarted>,
    mut ended_events: EventWriter<TriggerEnded>,
) {
    let mut pending: HashMap<Entity, Vec<Pending>> = HashMap::new();

    for event in proximity.read() {
        match *event {
            TriggerProximity::Enter { character, trigger } => {
                pending.entry(character).or_default().push(Pending::Enter(trigger));
            }
            TriggerProximity::Exit { character, trigger } => {
                pending.entry(character).or_default().push(Pending::Exit(trigger));
            }
        }
    }
    for event in notifies.read() {
        match event {
            AnimationNotify::StateEntered { character, state } => {
                pending.entry(*character).or_default().push(Pending::StateEntered(state.clone()));
            }
            AnimationNotify::StateExited { character, state } => {
                pending.entry(*character).or_default().push(Pending::StateExited(state.clone()));
            }
            AnimationNotify::InteractionEnd { character } => {
                pending.entry(*character).or_default().push(Pending::End);
            }
        }
    }
    for event in breaks.read() {
        pending.entry(event.character).or_default().push(Pending::Break);
    }

    let delta = time.delta_secs();

    for (entity, mut interaction, mut body, mut animator, mut ik, input, hint) in characters.iter_mut() {
        let frame = FrameContext::new(delta)
            .with_input(input.map(interaction_input).unwrap_or_default());
        let mut relay = EventRelay::new(entity);

        {
            let mut ctx = InteractionContext {
                body: body.as_mut(),
                animator: animator.as_mut(),
                ik: ik.as_mut(),
                listener: &mut relay,
                platform: &frame,
            };

            for op in pending.remove(&entity).unwrap_or_default() {
                match op {
                    Pending::Enter(trigger) => {
                        interaction.on_trigger_enter(trigger, &triggers, ctx.body, ctx.listener);
                    }
                    Pending::Exit(trigger) => interaction.on_trigger_exit(trigger, ctx.listener),
                    Pending::Break => {
                        interaction.break_interaction(&triggers, &mut ctx);
                    }
                    Pending::StateEntered(state) => interaction.on_state_enter(&state, &triggers),
                    Pending::StateExited(state) => {
                        interaction.on_state_exit(&state, &triggers, &mut ctx);
                    }
                    Pending::End => {
                        interaction.complete(&triggers, &mut ctx);
                    }
                }
            }

            interaction.update(&triggers, &mut ctx);
        }

        for event in relay.started {
            started_events.write(event);
        }
        for event in relay.ended {
            ended_events.write(event);
        }
        if let (Some(text), Some(mut hint)) = (relay.hint, hint) {
            hint.0 = text;
        }
    }
}
