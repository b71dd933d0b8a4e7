//! Spread-based sampling for particle initialization.
//!
//! All samplers are pure functions of their inputs and a [`RandomSource`],
//! which keeps them testable with a seeded generator.
//!
//! | Sampler | Result |
//! |---------|--------|
//! | [`cube`] | uniform in an axis-aligned box `base ± spread / 2` |
//! | [`sphere`] | uniform on a sphere surface, scaled per axis, translated |
//! | [`spread_scalar`] | `base ± spread / 2` |
//! | [`spread_vec3`] | per-axis `base ± spread / 2` |
//! | [`spread_color`] | like `spread_vec3`, clamped to `[0, 1]` |
//! | [`radial_velocity`] | outward direction from a center times a spread speed |

use crate::random::RandomSource;
use glam::Vec3;
use std::f32::consts::TAU;

/// Sample a position inside the box centered on `base` with edge lengths `spread`.
///
/// A spread of exactly zero returns `base` untouched without consuming
/// random samples.
pub fn cube(base: Vec3, spread: Vec3, rng: &mut impl RandomSource) -> Vec3 {
    if spread == Vec3::ZERO {
        return base;
    }
    spread_vec3(base, spread, rng)
}

/// Sample a position on the surface of a sphere of `radius` around `base`.
///
/// The unit-sphere point is scaled by `radius`, multiplied component-wise by
/// `radius_scale` (ellipsoids) and then translated by `base`. A radius of
/// exactly zero returns `base`.
pub fn sphere(base: Vec3, radius: f32, radius_scale: Vec3, rng: &mut impl RandomSource) -> Vec3 {
    if radius == 0.0 {
        return base;
    }
    unit_sphere_point(rng) * radius * radius_scale + base
}

/// Uniform point on the unit sphere via the z / theta parametrization.
pub fn unit_sphere_point(rng: &mut impl RandomSource) -> Vec3 {
    let z = 2.0 * rng.next_unit() - 1.0;
    let theta = TAU * rng.next_unit();
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

/// `base` offset by a uniform value in `[-spread / 2, spread / 2)`.
#[inline]
pub fn spread_scalar(base: f32, spread: f32, rng: &mut impl RandomSource) -> f32 {
    base + rng.next_unit() * spread - spread * 0.5
}

/// Per-axis [`spread_scalar`].
pub fn spread_vec3(base: Vec3, spread: Vec3, rng: &mut impl RandomSource) -> Vec3 {
    Vec3::new(
        spread_scalar(base.x, spread.x, rng),
        spread_scalar(base.y, spread.y, rng),
        spread_scalar(base.z, spread.z, rng),
    )
}

/// RGB color with per-channel spread, clamped to `[0, 1]`.
pub fn spread_color(base: Vec3, spread: Vec3, rng: &mut impl RandomSource) -> Vec3 {
    if spread == Vec3::ZERO {
        return base;
    }
    spread_vec3(base, spread, rng).clamp(Vec3::ZERO, Vec3::ONE)
}

/// Velocity pointing away from `center` through `position`.
///
/// Magnitude is `speed ± speed_spread / 2`. A position sitting exactly on
/// the center has no direction and yields zero velocity.
pub fn radial_velocity(
    position: Vec3,
    center: Vec3,
    speed: f32,
    speed_spread: f32,
    rng: &mut impl RandomSource,
) -> Vec3 {
    let direction = (position - center).normalize_or_zero();
    direction * spread_scalar(speed, speed_spread, rng)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::SmallRng;
    use rand::SeedableRng;

    #[test]
    fn test_cube_zero_spread_is_exact() {
        let mut rng = SmallRng::seed_from_u64(3);
        let base = Vec3::new(1.5, -2.0, 0.25);
        for _ in 0..100 {
            assert_eq!(cube(base, Vec3::ZERO, &mut rng), base);
        }
    }

    #[test]
    fn test_cube_bounds() {
        let mut rng = SmallRng::seed_from_u64(11);
        let base = Vec3::new(10.0, 0.0, -5.0);
        let spread = Vec3::new(4.0, 0.0, 100.0);
        for _ in 0..10_000 {
            let p = cube(base, spread, &mut rng);
            let lo = base - spread * 0.5;
            let hi = base + spread * 0.5;
            assert!(p.cmpge(lo - 1e-4).all() && p.cmple(hi + 1e-4).all(), "{p} outside box");
        }
    }

    #[test]
    fn test_sphere_surface_norm() {
        let mut rng = SmallRng::seed_from_u64(5);
        for _ in 0..10_000 {
            let p = sphere(Vec3::ZERO, 7.5, Vec3::ONE, &mut rng);
            assert!((p.length() - 7.5).abs() < 1e-3, "norm {}", p.length());
        }
    }

    #[test]
    fn test_sphere_zero_radius_is_exact() {
        let mut rng = SmallRng::seed_from_u64(5);
        let base = Vec3::new(3.0, 4.0, 5.0);
        assert_eq!(sphere(base, 0.0, Vec3::splat(2.0), &mut rng), base);
    }

    #[test]
    fn test_sphere_radius_scale_and_translation() {
        let mut rng = SmallRng::seed_from_u64(9);
        let base = Vec3::new(0.0, 10.0, 0.0);
        let scale = Vec3::new(2.0, 1.0, 0.5);
        for _ in 0..1000 {
            let p = (sphere(base, 1.0, scale, &mut rng) - base) / scale;
            assert!((p.length() - 1.0).abs() < 1e-3);
        }
    }

    #[test]
    fn test_spread_color_clamped() {
        let mut rng = SmallRng::seed_from_u64(1);
        for _ in 0..1000 {
            let c = spread_color(Vec3::ONE, Vec3::splat(1.0), &mut rng);
            assert!(c.cmple(Vec3::ONE).all() && c.cmpge(Vec3::splat(0.5)).all());
        }
    }

    #[test]
    fn test_radial_velocity_direction() {
        let mut rng = SmallRng::seed_from_u64(1);
        let v = radial_velocity(Vec3::new(0.0, 3.0, 0.0), Vec3::ZERO, 2.0, 0.0, &mut rng);
        assert!((v - Vec3::new(0.0, 2.0, 0.0)).length() < 1e-6);

        let still = radial_velocity(Vec3::ZERO, Vec3::ZERO, 2.0, 0.0, &mut rng);
        assert_eq!(still, Vec3::ZERO);
    }
}
