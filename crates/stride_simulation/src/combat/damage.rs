//! Damage система
//!
//! Host (hitbox / projectile collision) шлёт HitReceived, симуляция:
//! - снимает Health (saturating)
//! - генерирует DamageTaken / CharacterDied
//! - запрашивает ragdoll (смерть — навсегда, сильный импульс — временно)
//! - прерывает текущую интеракцию (BreakInteraction)

use bevy::prelude::*;

use super::ragdoll::{CombatConfig, Ragdoll};
use crate::components::{params, Animator, AnimatorLink, Health};
use crate::logger;
use crate::trigger::BreakInteraction;

/// Событие: попадание по персонажу (host → sim)
#[derive(Event, Debug, Clone, Copy)]
pub struct HitReceived {
    pub attacker: Option<Entity>,
    pub target: Entity,
    pub damage: u32,
    /// Импульс удара (N·s), направление — куда толкает
    pub impulse: Vec3,
    pub point: Vec3,
}

/// Событие: урон применён
///
/// Используется для UI, звуков, эффектов.
#[derive(Event, Debug, Clone)]
pub struct DamageTaken {
    pub attacker: Option<Entity>,
    pub target: Entity,
    /// Реально снятый урон (не больше HP до удара)
    pub damage: u32,
    pub target_died: bool,
}

/// Событие: персонаж умер (health <= 0)
#[derive(Event, Debug, Clone)]
pub struct CharacterDied {
    pub entity: Entity,
    pub killer: Option<Entity>,
}

/// Компонент-маркер: персонаж мертв
///
/// Трупы остаются на месте в ragdoll, новые hits игнорируются.
#[derive(Component, Debug)]
pub struct Dead;

/// Что делает hit с персонажем
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HitOutcome {
    pub applied: u32,
    pub died: bool,
    /// Some(None) = ragdoll навсегда, Some(Some(t)) = на t секунд
    pub ragdoll: Option<Option<f32>>,
}

/// Правила: урон, смерть, порог ragdoll'а по импульсу
pub fn resolve_hit(health: &mut Health, hit: &HitReceived, config: &CombatConfig) -> HitOutcome {
    let was_alive = health.is_alive();
    let applied = health.take_damage(hit.damage);
    let died = was_alive && !health.is_alive();

    let ragdoll = if died {
        Some(None)
    } else if hit.impulse.length() >= config.ragdoll_impulse_threshold {
        Some(Some(config.recover_after))
    } else {
        None
    };

    HitOutcome {
        applied,
        died,
        ragdoll,
    }
}

/// Система: HitReceived → Health, события, ragdoll запросы
pub fn apply_hits(
    mut commands: Commands,
    mut hit_events: EventReader<HitReceived>,
    mut damage_events: EventWriter<DamageTaken>,
    mut died_events: EventWriter<CharacterDied>,
    mut break_events: EventWriter<BreakInteraction>,
    mut targets: Query<(&mut Health, &mut Ragdoll, Option<&mut AnimatorLink>), Without<Dead>>,
) {
    for hit in hit_events.read() {
        let Ok((mut health, mut ragdoll, animator)) = targets.get_mut(hit.target) else {
            logger::log_warning(&format!(
                "HitReceived: target {:?} has no Health/Ragdoll or is dead",
                hit.target
            ));
            continue;
        };

        let config = ragdoll.config.clone();
        let outcome = resolve_hit(&mut health, hit, &config);

        // Hit — trigger параметр, host сбрасывает после чтения
        if let Some(mut animator) = animator {
            animator.set_bool(params::HIT, true);
        }

        damage_events.write(DamageTaken {
            attacker: hit.attacker,
            target: hit.target,
            damage: outcome.applied,
            target_died: outcome.died,
        });

        if let Some(duration) = outcome.ragdoll {
            ragdoll.request(hit.impulse, duration);
            break_events.write(BreakInteraction {
                character: hit.target,
            });
        }

        if outcome.died {
            died_events.write(CharacterDied {
                entity: hit.target,
                killer: hit.attacker,
            });
            commands.entity(hit.target).insert(Dead);
            logger::log_info(&format!("Character {:?} killed by {:?}", hit.target, hit.attacker));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(damage: u32, impulse: Vec3) -> HitReceived {
        HitReceived {
            attacker: None,
            target: Entity::PLACEHOLDER,
            damage,
            impulse,
            point: Vec3::ZERO,
        }
    }

    #[test]
    fn test_light_hit_no_ragdoll() {
        let mut health = Health::new(100);
        let outcome = resolve_hit(&mut health, &hit(20, Vec3::Z * 50.0), &CombatConfig::default());

        assert_eq!(outcome.applied, 20);
        assert!(!outcome.died);
        assert!(outcome.ragdoll.is_none());
        assert_eq!(health.current, 80);
    }

    #[test]
    fn test_heavy_hit_temporary_ragdoll() {
        let config = CombatConfig::default();
        let mut health = Health::new(100);
        let impulse = Vec3::Z * (config.ragdoll_impulse_threshold + 1.0);
        let outcome = resolve_hit(&mut health, &hit(10, impulse), &config);

        assert_eq!(outcome.ragdoll, Some(Some(config.recover_after)));
        assert!(!outcome.died);
    }

    #[test]
    fn test_lethal_hit_saturates_and_ragdolls_forever() {
        let mut health = Health::new(30);
        let outcome = resolve_hit(&mut health, &hit(500, Vec3::ZERO), &CombatConfig::default());

        assert_eq!(outcome.applied, 30);
        assert!(outcome.died);
        assert_eq!(outcome.ragdoll, Some(None));
        assert_eq!(health.current, 0);

        // Повторный hit по трупу — не "умирает" второй раз
        let outcome = resolve_hit(&mut health, &hit(10, Vec3::ZERO), &CombatConfig::default());
        assert_eq!(outcome.applied, 0);
        assert!(!outcome.died);
    }
}
