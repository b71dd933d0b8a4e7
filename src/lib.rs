//! # SPE - Shader Particle Engine core
//!
//! Fixed-capacity particle lifecycle simulation for shader-driven particle
//! effects.
//!
//! SPE owns the authoritative `age` / `alive` state of every particle and
//! the flat attribute arrays a renderer uploads each frame. It spawns
//! particles at a timed rate, ages them, and recycles expired slots without
//! allocating per frame. Drawing them is left to whatever renderer you use.
//!
//! ## Quick Start
//!
//! ```ignore
//! use spe::prelude::*;
//!
//! fn main() -> spe::Result<()> {
//!     let mut group = ParticleGroup::new(GroupConfig::new().with_max_age(2.0));
//!     group.attach_emitter(
//!         EmitterConfig::cube(Vec3::ZERO, Vec3::splat(100.0))
//!             .with_velocity(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
//!             .with_opacity(0.0, 1.0, 0.0)
//!             .with_rate(2500.0),
//!     )?;
//!
//!     loop {
//!         group.tick(0.016);
//!         renderer.upload(group.attributes());
//!     }
//! }
//! ```
//!
//! ## Core Concepts
//!
//! ### Groups
//!
//! A [`ParticleGroup`] owns one [`ParticleAttributes`] arena. Attaching an
//! emitter reserves `ceil(particles_per_second * max_age)` contiguous slots
//! for it. The group ticks its emitters in attach order.
//!
//! ### Emitters
//!
//! A [`ParticleEmitter`] animates its own slot range: it ages particles,
//! kills those past `max_age`, and sweeps a fractional spawn cursor across
//! the range to revive dead slots at `particles_per_second`.
//!
//! | Distribution | Spawn position |
//! |--------------|----------------|
//! | [`EmitterType::Cube`] | uniform in `position ± position_spread / 2` |
//! | [`EmitterType::Sphere`] | uniform on a sphere of `radius`, scaled by `radius_scale` |
//!
//! ### Lifecycle control
//!
//! | Call | Effect |
//! |------|--------|
//! | `disable` | stop spawning, let live particles expire |
//! | `enable` | resume spawning |
//! | `reset_emitter(id, false)` | pause and rewind the emitter's age |
//! | `reset_emitter(id, true)` | same, and kill every particle now |
//! | `with_duration(s)` | emitter disables itself after `s` seconds |
//!
//! ### Ramps
//!
//! Size, color and opacity are start/(middle)/end ramps driven by
//! `age / max_age`; see [`ramp`].

pub mod attributes;
pub mod config;
pub mod distribution;
mod emitter;
mod error;
mod group;
pub mod presets;
pub mod ramp;
pub mod random;

pub use attributes::{ParticleAttributes, ParticleVertex, SlotRange};
pub use config::{EmitterConfig, EmitterType, GroupConfig, SceneConfig};
pub use emitter::ParticleEmitter;
pub use error::{ConfigError, Result, SpeError};
pub use glam::{Vec2, Vec3};
pub use group::{EmitterId, ParticleGroup};
pub use random::RandomSource;

pub use bytemuck;

/// Convenient re-exports for common usage.
///
/// ```ignore
/// use spe::prelude::*;
/// ```
pub mod prelude {
    pub use crate::attributes::{ParticleAttributes, ParticleVertex, SlotRange};
    pub use crate::config::{EmitterConfig, EmitterType, GroupConfig, SceneConfig};
    pub use crate::emitter::ParticleEmitter;
    pub use crate::error::{ConfigError, SpeError};
    pub use crate::group::{EmitterId, ParticleGroup};
    pub use crate::presets;
    pub use crate::ramp::ParticleSample;
    pub use crate::random::RandomSource;
    pub use crate::{Vec2, Vec3};
}
