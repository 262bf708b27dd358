//! Math helpers для per-tick интерполяций

use bevy::prelude::*;

/// Сдвигает `current` к `target` не больше чем на `max_delta`
///
/// Никогда не перескакивает target (rate-limited сглаживание весов IK).
pub fn move_towards(current: f32, target: f32, max_delta: f32) -> f32 {
    if (target - current).abs() <= max_delta {
        target
    } else {
        current + (target - current).signum() * max_delta
    }
}

/// Квадратичный ease-in: `lerp(start, end, t²)`, t клампится в [0, 1]
pub fn ease_in_lerp(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    let t = t.clamp(0.0, 1.0);
    start.lerp(end, t * t)
}

/// Горизонтальная проекция (y = 0), None если вектор вырожден
pub fn planar_direction(v: Vec3) -> Option<Vec3> {
    let planar = Vec3::new(v.x, 0.0, v.z);
    if planar.length_squared() < 1e-6 {
        None
    } else {
        Some(planar.normalize())
    }
}

/// Угол между нормалью поверхности и world up (градусы)
pub fn surface_angle_deg(normal: Vec3) -> f32 {
    if normal.length_squared() < 1e-6 {
        return 0.0;
    }
    normal.normalize().angle_between(Vec3::Y).to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_move_towards_does_not_overshoot() {
        assert_eq!(move_towards(0.0, 1.0, 0.25), 0.25);
        assert_eq!(move_towards(0.9, 1.0, 0.25), 1.0);
        assert_eq!(move_towards(0.1, 0.0, 0.25), 0.0);
    }

    #[test]
    fn test_ease_in_lerp_endpoints() {
        let start = Vec3::ZERO;
        let end = Vec3::new(0.0, 0.3, 0.5);

        assert_eq!(ease_in_lerp(start, end, 0.0), start);
        assert_eq!(ease_in_lerp(start, end, 1.0), end);

        // t = 0.5 → 0.25 пути
        let mid = ease_in_lerp(start, end, 0.5);
        assert!((mid.y - 0.075).abs() < 1e-5, "mid.y = {}", mid.y);
    }

    #[test]
    fn test_surface_angle() {
        assert!(surface_angle_deg(Vec3::Y) < 0.01);
        assert!((surface_angle_deg(Vec3::NEG_Z) - 90.0).abs() < 0.01);
    }
}
