//! Collision layers — централизованные константы и LayerMask
//!
//! ## Архитектура:
//! - **Layer (индекс 0-31):** на каком слое находится коллайдер
//! - **LayerMask (битовая маска):** какие слои учитывает query
//!
//! ## Слои:
//! - 0: Default
//! - 1: Ground (walkable terrain, пол)
//! - 2: Step (низкие препятствия: ступени, бордюры)
//! - 3: Wall (стены — блокируют IK stepping)
//! - 4: Trigger (сенсоры интеракций: ledge, ladder, pickup)
//! - 5: Actor (капсулы персонажей)
//!
//! Имена слоёв нужны конфигу (TOML перечисляет слои строками).

use serde::{Deserialize, Deserializer};

pub const LAYER_DEFAULT: u32 = 0;
pub const LAYER_GROUND: u32 = 1;
pub const LAYER_STEP: u32 = 2;
pub const LAYER_WALL: u32 = 3;
pub const LAYER_TRIGGER: u32 = 4;
pub const LAYER_ACTOR: u32 = 5;

const LAYER_NAMES: [(&str, u32); 6] = [
    ("Default", LAYER_DEFAULT),
    ("Ground", LAYER_GROUND),
    ("Step", LAYER_STEP),
    ("Wall", LAYER_WALL),
    ("Trigger", LAYER_TRIGGER),
    ("Actor", LAYER_ACTOR),
];

/// Название слоя для debug логов
pub fn layer_name(layer: u32) -> &'static str {
    LAYER_NAMES
        .iter()
        .find(|(_, index)| *index == layer)
        .map(|(name, _)| *name)
        .unwrap_or("Unknown")
}

/// Индекс слоя по имени (регистр не важен)
pub fn layer_by_name(name: &str) -> Option<u32> {
    LAYER_NAMES
        .iter()
        .find(|(layer_name, _)| layer_name.eq_ignore_ascii_case(name))
        .map(|(_, index)| *index)
}

/// Битовая маска слоёв
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LayerMask(pub u32);

impl LayerMask {
    pub const NONE: LayerMask = LayerMask(0);
    pub const ALL: LayerMask = LayerMask(u32::MAX);

    pub const fn from_layer(layer: u32) -> Self {
        LayerMask(1 << layer)
    }

    pub fn from_layers(layers: &[u32]) -> Self {
        LayerMask(layers.iter().fold(0, |bits, layer| bits | (1 << layer)))
    }

    /// Маска из имён слоёв. Неизвестные имена возвращаются как Err
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Result<Self, String> {
        let mut bits = 0;
        for name in names {
            let layer = layer_by_name(name.as_ref())
                .ok_or_else(|| format!("unknown layer '{}'", name.as_ref()))?;
            bits |= 1 << layer;
        }
        Ok(LayerMask(bits))
    }

    pub const fn contains(&self, layer: u32) -> bool {
        layer < 32 && self.0 & (1 << layer) != 0
    }

    pub const fn union(self, other: LayerMask) -> LayerMask {
        LayerMask(self.0 | other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }
}

/// Ground + Step: поверхности на которые можно ставить ногу
pub const MASK_FOOT_GROUND: LayerMask = LayerMask((1 << LAYER_GROUND) | (1 << LAYER_STEP));

/// Step + Ground: поиск bump'ов для stepping
pub const MASK_STEP_DETECTION: LayerMask = LayerMask((1 << LAYER_STEP) | (1 << LAYER_GROUND));

pub const MASK_WALL: LayerMask = LayerMask::from_layer(LAYER_WALL);

pub const MASK_INTERACTION: LayerMask = LayerMask::from_layer(LAYER_TRIGGER);

/// В TOML маска задаётся либо числом, либо списком имён слоёв
impl<'de> Deserialize<'de> for LayerMask {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Repr {
            Bits(u32),
            Names(Vec<String>),
        }

        match Repr::deserialize(deserializer)? {
            Repr::Bits(bits) => Ok(LayerMask(bits)),
            Repr::Names(names) => LayerMask::from_names(&names).map_err(serde::de::Error::custom),
        }
    }
}
