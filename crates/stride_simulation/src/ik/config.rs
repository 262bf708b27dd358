//! Designer-tunable параметры leg IK / stepping

use serde::Deserialize;

use crate::physics::layers::{LayerMask, MASK_FOOT_GROUND, MASK_STEP_DETECTION, MASK_WALL};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct LegIkConfig {
    /// IK stepping включен (designer флаг; runtime switch — LegIk::set_ik_enabled)
    pub enabled: bool,

    /// Слои для поиска bump'ов (stepping detection)
    pub step_layers: LayerMask,
    /// Слои, на которые можно ставить ногу
    pub foot_layers: LayerMask,
    /// Слои стен: попадание в них выключает IK/stepping на тик
    pub wall_layers: LayerMask,

    /// Максимальная высота ступени (метры)
    pub max_step_height: f32,
    /// Минимальная высота контакта над origin тела, считающаяся ступенью
    pub min_step_height: f32,
    /// Hits ближе этой дистанции от старта probe игнорируются
    pub ray_distance_offset: f32,
    /// Подъём IK target над точкой контакта (высота щиколотки)
    pub foot_offset: f32,
    /// Поверхность круче этого угла (градусы) — bump, положе — склон
    pub max_slope_angle: f32,
    /// Импульс "подпрыгнуть" через bump на быстром беге (N·s)
    pub bump_jump_impulse: f32,
    /// IK target выше тела больше чем на это — игнорируется
    pub max_ik_height: f32,

    /// Скорость изменения IK веса (единиц в секунду)
    pub weight_speed: f32,
    /// Длительность step transition (секунды)
    pub step_max_time: f32,

    /// forward_amount выше этого — быстрый бег (hop вместо step)
    pub fast_forward_threshold: f32,
    /// forward_amount ниже этого — стоим на месте
    pub moving_threshold: f32,

    /// Радиус probe капсулы под стопой
    pub probe_radius: f32,
    /// Высота probe капсулы
    pub probe_height: f32,
    /// Подъём над кандидатом для уточняющего луча вниз
    pub refine_height: f32,

    /// Высота bump sphere-check над origin тела
    pub bump_check_height: f32,
    /// Дальность bump sphere-check
    pub bump_check_distance: f32,
    /// Дальность wall check = capsule_radius × этот множитель
    pub wall_check_factor: f32,
    /// Радиус сфер для wall / bump checks
    pub check_radius: f32,

    /// Слой animator'а, на котором применяются IK goals
    pub pose_layer: usize,
}

impl Default for LegIkConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            step_layers: MASK_STEP_DETECTION,
            foot_layers: MASK_FOOT_GROUND,
            wall_layers: MASK_WALL,
            max_step_height: 0.5,
            min_step_height: 0.05,
            ray_distance_offset: 0.05,
            foot_offset: 0.08,
            max_slope_angle: 65.0,
            bump_jump_impulse: 140.0, // 70kg → +2 m/s
            max_ik_height: 0.5,
            weight_speed: 5.0,
            step_max_time: 1.35,
            fast_forward_threshold: 0.9,
            moving_threshold: 0.1,
            probe_radius: 0.08,
            probe_height: 0.3,
            refine_height: 0.25,
            bump_check_height: 0.15,
            bump_check_distance: 0.6,
            wall_check_factor: 1.25,
            check_radius: 0.1,
            pose_layer: 0,
        }
    }
}
