//! Ready-made emitter configurations.
//!
//! Each preset is a plain [`EmitterConfig`], so builder methods can tweak
//! it further:
//!
//! ```ignore
//! group.attach_emitter(presets::starfield(2500.0).with_size(1.0, 1.0))?;
//! ```

use crate::config::EmitterConfig;
use glam::Vec3;

/// Drifting star field: a large cube of particles that fade in and out
/// while accelerating along +Z.
pub fn starfield(rate: f32) -> EmitterConfig {
    EmitterConfig::cube(Vec3::ZERO, Vec3::splat(100.0))
        .with_rate(rate)
        .with_velocity(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
        .with_acceleration(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
        .with_colors(Vec3::ONE, Vec3::ONE)
        .with_size(2.0, 2.0)
        .with_opacity(0.0, 1.0, 0.0)
}

/// Rising smoke column: slow, growing, gray particles.
pub fn smoke(position: Vec3, rate: f32) -> EmitterConfig {
    EmitterConfig::cube(position, Vec3::new(2.0, 0.0, 2.0))
        .with_rate(rate)
        .with_velocity(Vec3::new(0.0, 4.0, 0.0), Vec3::new(1.0, 1.0, 1.0))
        .with_colors(Vec3::splat(0.4), Vec3::splat(0.15))
        .with_size(4.0, 16.0)
        .with_opacity(0.6, 0.4, 0.0)
}

/// Fireball shell: particles launched outward from a sphere surface.
pub fn fireball(position: Vec3, radius: f32, rate: f32) -> EmitterConfig {
    EmitterConfig::sphere(position, radius)
        .with_rate(rate)
        .with_speed(12.0, 4.0)
        .with_colors(Vec3::new(1.0, 0.9, 0.3), Vec3::new(0.8, 0.2, 0.0))
        .with_color_spread(Vec3::new(0.0, 0.1, 0.1))
        .with_size(6.0, 1.0)
        .with_opacity(1.0, 0.8, 0.0)
}

/// One-shot explosion: emits for `duration` seconds, then switches itself off.
pub fn explosion(position: Vec3, rate: f32, duration: f32) -> EmitterConfig {
    fireball(position, 0.5, rate).with_duration(duration)
}

/// Static cloud of pre-placed particles that never age or respawn.
pub fn dust_cloud(position: Vec3, radius: f32, count: f32) -> EmitterConfig {
    EmitterConfig::sphere(position, radius)
        .with_rate(count)
        .with_max_age(1.0)
        .with_radius_scale(Vec3::new(1.0, 0.4, 1.0))
        .with_colors(Vec3::splat(0.7), Vec3::splat(0.7))
        .with_opacity(0.3, 0.3, 0.3)
        .static_emitter()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EmitterType;

    #[test]
    fn test_starfield_matches_reference_scene() {
        let config = starfield(2500.0);
        assert_eq!(config.kind, EmitterType::Cube);
        assert_eq!(config.position_spread, Vec3::splat(100.0));
        assert_eq!(config.particle_count(2.0), 5000);
        assert_eq!(config.opacity_middle(), 1.0);
    }

    #[test]
    fn test_explosion_has_duration() {
        let config = explosion(Vec3::ZERO, 500.0, 0.2);
        assert_eq!(config.emitter_duration, Some(0.2));
        assert_eq!(config.kind, EmitterType::Sphere);
    }

    #[test]
    fn test_dust_cloud_slot_count_is_count() {
        let config = dust_cloud(Vec3::ZERO, 3.0, 64.0);
        assert!(config.is_static);
        assert_eq!(config.particle_count(10.0), 64);
    }
}
