//! Visual attributes derived from particle age.
//!
//! The simulation only owns `age` and `alive`; everything a renderer draws
//! (size, color, opacity, displaced position) is a pure function of the
//! normalized age `t = age / max_age` and the ramps written at attach time.
//! These helpers mirror what a particle shader computes per vertex, for CPU
//! renderers and for tests.
//!
//! | Function | Result at `t = 0` | at `t = 0.5` | at `t = 1` |
//! |----------|-------------------|--------------|------------|
//! | [`size_at`] | start | midpoint | end |
//! | [`opacity_at`] | start | middle | end |
//! | [`color_at`] | start | midpoint | end |

use crate::attributes::ParticleAttributes;
use glam::{Vec2, Vec3};

/// `age / max_age`, clamped to `[0, 1]`. Zero when `max_age` is not positive.
#[inline]
pub fn normalized_age(age: f32, max_age: f32) -> f32 {
    if max_age > 0.0 {
        (age / max_age).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// Linear size ramp; `size` holds (start, end).
#[inline]
pub fn size_at(size: Vec2, t: f32) -> f32 {
    size.x + (size.y - size.x) * t
}

/// Three-point opacity ramp; `opacity` holds (start, middle, end).
///
/// Interpolates start to middle over the first half of life and middle to
/// end over the second.
#[inline]
pub fn opacity_at(opacity: Vec3, t: f32) -> f32 {
    if t < 0.5 {
        opacity.x + (opacity.y - opacity.x) * (t * 2.0)
    } else {
        opacity.y + (opacity.z - opacity.y) * (t * 2.0 - 1.0)
    }
}

/// Linear color ramp.
#[inline]
pub fn color_at(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    start.lerp(end, t)
}

/// Spawn position advanced by constant velocity and acceleration over `age`.
#[inline]
pub fn displaced_position(position: Vec3, velocity: Vec3, acceleration: Vec3, age: f32) -> Vec3 {
    position + velocity * age + acceleration * (0.5 * age * age)
}

/// Everything a renderer needs to draw one particle this frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ParticleSample {
    pub position: Vec3,
    pub size: f32,
    pub color: Vec3,
    pub opacity: f32,
}

/// Evaluate every ramp for slot `index`. Returns `None` for dead slots.
pub fn sample(attrs: &ParticleAttributes, index: usize, max_age: f32) -> Option<ParticleSample> {
    if !attrs.is_alive(index) {
        return None;
    }
    let age = attrs.age()[index];
    let t = normalized_age(age, max_age);
    Some(ParticleSample {
        position: displaced_position(
            attrs.position()[index],
            attrs.velocity()[index],
            attrs.acceleration()[index],
            age,
        ),
        size: size_at(attrs.size()[index], t),
        color: color_at(attrs.color_start()[index], attrs.color_end()[index], t),
        opacity: opacity_at(attrs.opacity()[index], t),
    })
}
