//! Particle emitters.
//!
//! An emitter owns a fixed [`SlotRange`] inside its group's shared
//! [`ParticleAttributes`] and, every tick, ages its particles, recycles the
//! expired ones and spawns new ones at a rate-limited pace.
//!
//! # Tick
//!
//! 1. Static emitters do nothing.
//! 2. Live particles age by `dt`; any slot reaching `max_age` is zeroed and
//!    marked dead. It is only respawned once the spawn cursor comes back
//!    around to it, which may be several ticks later.
//! 3. A disabled emitter stops here and holds its own age at zero.
//! 4. An emitter older than its `emitter_duration` disables itself and stops.
//!    Spawning halts from this tick on; the overshoot is at most one frame.
//! 5. The spawn cursor sweeps `particles_per_second * dt` slots forward,
//!    reviving any dead slot it crosses with a freshly sampled position.
//! 6. The cursor wraps to the start of the range once it passes the end.
//!    Live slots it crosses are skipped, so when the spawn rate outruns
//!    deaths, spawns are dropped instead of stealing particles.
//! 7. The emitter ages by `dt`.
//!
//! The cursor is fractional, so the rate holds across frame times that
//! aren't multiples of the spawn period.

use crate::attributes::{ParticleAttributes, SlotInit, SlotRange};
use crate::config::{EmitterConfig, EmitterType};
use crate::distribution;
use crate::random::RandomSource;
use glam::{Vec2, Vec3};
use log::{info, trace};
use std::ops::Range;

/// A configured particle source bound to a slot range.
#[derive(Clone, Debug)]
pub struct ParticleEmitter {
    config: EmitterConfig,
    slots: SlotRange,
    max_age: f32,

    // Runtime state
    alive: bool,
    age: f32,
    // Absolute slot index; f64 so sub-slot budgets survive past 2^24 slots
    spawn_cursor: f64,
}

impl ParticleEmitter {
    pub(crate) fn new(config: EmitterConfig, slots: SlotRange, max_age: f32) -> Self {
        let alive = config.alive;
        Self {
            config,
            slots,
            max_age,
            alive,
            age: 0.0,
            spawn_cursor: slots.start as f64,
        }
    }

    /// Advance this emitter's particles by `dt` seconds.
    ///
    /// Returns the number of particles spawned this tick.
    pub(crate) fn tick(&mut self, dt: f32, attrs: &mut ParticleAttributes, rng: &mut impl RandomSource) -> usize {
        if self.config.is_static {
            return 0;
        }

        let start = self.slots.start;
        let end = self.slots.end();
        let max_age = self.max_age;

        for i in start..end {
            if attrs.alive[i] == 1.0 {
                attrs.age[i] += dt;
            }
            if attrs.age[i] >= max_age {
                attrs.age[i] = 0.0;
                attrs.alive[i] = 0.0;
            }
        }

        if !self.alive {
            self.age = 0.0;
            return 0;
        }

        if let Some(duration) = self.config.emitter_duration {
            if self.age > duration {
                info!("emitter at slots {}..{} expired after {:.3}s", start, end, self.age);
                self.alive = false;
                self.age = 0.0;
                return 0;
            }
        }

        let mut spawned = 0;
        for i in self.advance_cursor(dt) {
            if attrs.alive[i] != 1.0 {
                attrs.alive[i] = 1.0;
                attrs.age[i] = 0.0;
                attrs.position[i] = self.sample_position(rng);
                spawned += 1;
            }
        }

        self.age += dt;

        trace!("emitter at slots {}..{} spawned {} (cursor {:.2})", start, end, spawned, self.spawn_cursor);
        spawned
    }

    /// Move the spawn cursor by this tick's budget and return the slots it
    /// swept, clipped to the end of the range. Wraps to the start once the
    /// cursor passes the end; the fractional overshoot is dropped.
    fn advance_cursor(&mut self, dt: f32) -> Range<usize> {
        let end = self.slots.end();
        let budget = f64::from(self.config.particles_per_second * dt);
        let swept = sweep(self.spawn_cursor, budget, end);

        self.spawn_cursor += budget;
        if self.spawn_cursor >= end as f64 {
            self.spawn_cursor = self.slots.start as f64;
        }
        swept
    }

    /// Pause emission and rewind the emitter's age.
    ///
    /// With `force`, every particle in range is killed immediately as well;
    /// otherwise live particles run out their lifetime.
    pub(crate) fn reset(&mut self, force: bool, attrs: &mut ParticleAttributes) {
        self.age = 0.0;
        self.alive = false;

        if force {
            attrs.kill_range(self.slots);
        }
    }

    /// Resume spawning on the next tick.
    pub fn enable(&mut self) {
        self.alive = true;
    }

    /// Stop spawning on the next tick. Live particles keep aging.
    pub fn disable(&mut self) {
        self.alive = false;
    }

    /// Sample a spawn position for this emitter's distribution.
    pub fn sample_position(&self, rng: &mut impl RandomSource) -> Vec3 {
        let c = &self.config;
        match c.kind {
            EmitterType::Cube => distribution::cube(c.position, c.position_spread, rng),
            EmitterType::Sphere => distribution::sphere(c.position, c.radius, c.radius_scale, rng),
        }
    }

    /// Initial attribute values for one slot, sampled with the configured spreads.
    pub(crate) fn init_slot(&self, rng: &mut impl RandomSource) -> SlotInit {
        let c = &self.config;
        let position = self.sample_position(rng);
        let velocity = match c.kind {
            EmitterType::Cube => distribution::spread_vec3(c.velocity, c.velocity_spread, rng),
            EmitterType::Sphere => {
                distribution::radial_velocity(position, c.position, c.speed, c.speed_spread, rng)
            }
        };

        SlotInit {
            position,
            velocity,
            acceleration: distribution::spread_vec3(c.acceleration, c.acceleration_spread, rng),
            size: Vec2::new(distribution::spread_scalar(c.size, c.size_spread, rng), c.size_end),
            color_start: distribution::spread_color(c.color_start, c.color_spread, rng),
            color_end: c.color_end,
            opacity: Vec3::new(c.opacity_start, c.opacity_middle(), c.opacity_end),
        }
    }

    // ========== Accessors ==========

    pub fn config(&self) -> &EmitterConfig {
        &self.config
    }

    pub fn slot_range(&self) -> SlotRange {
        self.slots
    }

    /// Number of slots owned by this emitter.
    pub fn particle_count(&self) -> usize {
        self.slots.count
    }

    /// Per-particle lifetime used by this emitter.
    pub fn max_age(&self) -> f32 {
        self.max_age
    }

    /// Whether the emitter is currently spawning.
    pub fn is_alive(&self) -> bool {
        self.alive
    }

    pub fn is_static(&self) -> bool {
        self.config.is_static
    }

    /// Seconds since the emitter was (re)started.
    pub fn age(&self) -> f32 {
        self.age
    }

    /// Absolute, fractional slot index of the next spawn.
    pub fn spawn_cursor(&self) -> f64 {
        self.spawn_cursor
    }

    /// Live particles in this emitter's range.
    pub fn alive_particles(&self, attrs: &ParticleAttributes) -> usize {
        attrs.alive_count(self.slots)
    }
}

/// Whole slots crossed by a cursor moving from `cursor` to `cursor + budget`,
/// never reaching past `end`.
fn sweep(cursor: f64, budget: f64, end: usize) -> Range<usize> {
    let first = cursor as usize;
    let limit = (end as f64).min(cursor + budget);
    let last = (limit.ceil() as usize).clamp(first, end.max(first));
    first..last
}
