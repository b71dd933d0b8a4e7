//! Particle groups: shared storage plus the emitters writing into it.
//!
//! A [`ParticleGroup`] owns the flat [`ParticleAttributes`] arena and hands
//! each attached emitter a contiguous, non-overlapping [`SlotRange`] of it.
//! Ranges are assigned once at attach and never move.
//!
//! # Example
//!
//! ```ignore
//! let mut group = ParticleGroup::new(GroupConfig::new().with_max_age(2.0));
//! let stars = group.attach_emitter(
//!     EmitterConfig::cube(Vec3::ZERO, Vec3::splat(100.0)).with_rate(2500.0),
//! )?;
//!
//! // Once per frame:
//! group.tick(0.016);
//! upload(group.attributes().position_bytes());
//! ```
//!
//! # Capacity
//!
//! With [`GroupConfig::capacity`] set, the arrays are reserved up front and
//! an emitter that does not fit is refused with [`SpeError::Capacity`],
//! leaving the group as it was. Without it, the arrays grow at attach time
//! and existing slots keep their data; a request the allocator cannot
//! satisfy is refused with [`SpeError::Capacity`] and `available: 0`.
//! Ticking never allocates either way.

use crate::attributes::{ParticleAttributes, ParticleVertex, SlotRange};
use crate::config::{EmitterConfig, GroupConfig};
use crate::emitter::ParticleEmitter;
use crate::error::{Result, SpeError};
use crate::ramp::{self, ParticleSample};
use crate::random::{self, RandomSource};
use log::{debug, warn};
use rand::rngs::SmallRng;

/// Handle to an emitter attached to a particular group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct EmitterId(usize);

impl EmitterId {
    /// Position of the emitter in its group's tick order.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Owner of the shared particle arrays and the emitters that animate them.
#[derive(Debug)]
pub struct ParticleGroup<R: RandomSource = SmallRng> {
    config: GroupConfig,
    attributes: ParticleAttributes,
    emitters: Vec<ParticleEmitter>,
    rng: R,
    elapsed: f32,
    frame: u64,
}

impl ParticleGroup<SmallRng> {
    /// Create an empty group using a [`SmallRng`] seeded from `config.seed`.
    pub fn new(config: GroupConfig) -> Self {
        let rng = random::small_rng(config.seed);
        Self::with_rng(config, rng)
    }
}

impl Default for ParticleGroup<SmallRng> {
    fn default() -> Self {
        Self::new(GroupConfig::default())
    }
}

impl<R: RandomSource> ParticleGroup<R> {
    /// Create an empty group sampling from `rng`.
    pub fn with_rng(config: GroupConfig, rng: R) -> Self {
        let attributes = match config.capacity {
            Some(slots) => ParticleAttributes::with_capacity(slots),
            None => ParticleAttributes::new(),
        };
        Self {
            config,
            attributes,
            emitters: Vec::new(),
            rng,
            elapsed: 0.0,
            frame: 0,
        }
    }

    /// Allocate slots for a new emitter and append it to the tick order.
    ///
    /// The emitter gets `ceil(particles_per_second * max_age)` slots, each
    /// initialized with positions, velocities and ramps sampled from its
    /// spreads. Static emitters have every slot spawned immediately.
    pub fn attach_emitter(&mut self, config: EmitterConfig) -> Result<EmitterId> {
        let config = config.sanitized();
        let max_age = config.resolved_max_age(self.config.max_age);
        let count = config.particle_count(self.config.max_age);

        if let Some(capacity) = self.config.capacity {
            let available = capacity.saturating_sub(self.attributes.len());
            if count > available {
                warn!("refusing emitter: needs {count} slots, {available} free of {capacity}");
                return Err(SpeError::Capacity { requested: count, available });
            }
        }

        if let Err(e) = self.attributes.try_reserve(count) {
            warn!("refusing emitter: cannot reserve {count} slots ({e})");
            return Err(SpeError::Capacity { requested: count, available: 0 });
        }

        let emitter = ParticleEmitter::new(config, SlotRange::new(self.attributes.len(), count), max_age);
        let rng = &mut self.rng;
        let range = self.attributes.allocate(count, |_| emitter.init_slot(&mut *rng));
        debug_assert_eq!(range, emitter.slot_range());

        if emitter.is_static() {
            self.attributes.alive[range.indices()].fill(1.0);
        }

        let id = EmitterId(self.emitters.len());
        debug!(
            "attached emitter {} ({:?}) at slots {}..{}, max age {}",
            id.0,
            emitter.config().kind,
            range.start,
            range.end(),
            max_age
        );
        self.emitters.push(emitter);
        Ok(id)
    }

    /// Advance every emitter by `dt` seconds, in attach order.
    ///
    /// Negative or non-finite `dt` is clamped to zero. Returns the number of
    /// particles spawned across all emitters.
    pub fn tick(&mut self, dt: f32) -> usize {
        let dt = if dt.is_finite() && dt >= 0.0 {
            dt
        } else {
            warn!("clamping invalid tick delta {dt} to 0");
            0.0
        };

        let mut spawned = 0;
        for emitter in &mut self.emitters {
            spawned += emitter.tick(dt, &mut self.attributes, &mut self.rng);
        }

        self.elapsed += dt;
        self.frame += 1;
        spawned
    }

    /// Tick with the configured fixed time step.
    pub fn tick_fixed(&mut self) -> usize {
        self.tick(self.config.fixed_time_step)
    }

    // ========== Emitter control ==========

    pub fn emitter(&self, id: EmitterId) -> Result<&ParticleEmitter> {
        self.emitters.get(id.0).ok_or(SpeError::UnknownEmitter(id.0))
    }

    pub fn emitter_mut(&mut self, id: EmitterId) -> Result<&mut ParticleEmitter> {
        self.emitters.get_mut(id.0).ok_or(SpeError::UnknownEmitter(id.0))
    }

    /// Emitters in tick order.
    pub fn emitters(&self) -> &[ParticleEmitter] {
        &self.emitters
    }

    pub fn enable(&mut self, id: EmitterId) -> Result<()> {
        self.emitter_mut(id)?.enable();
        Ok(())
    }

    pub fn disable(&mut self, id: EmitterId) -> Result<()> {
        self.emitter_mut(id)?.disable();
        Ok(())
    }

    /// Pause an emitter; with `force`, also kill all of its particles now.
    pub fn reset_emitter(&mut self, id: EmitterId, force: bool) -> Result<()> {
        let emitter = self.emitters.get_mut(id.0).ok_or(SpeError::UnknownEmitter(id.0))?;
        emitter.reset(force, &mut self.attributes);
        Ok(())
    }

    // ========== Storage access ==========

    /// Read-only view of the shared arrays, valid until the next tick.
    pub fn attributes(&self) -> &ParticleAttributes {
        &self.attributes
    }

    /// Pack every slot into `out` for upload. See
    /// [`ParticleAttributes::write_vertices`].
    pub fn write_vertices(&self, out: &mut [ParticleVertex]) -> usize {
        self.attributes.write_vertices(out)
    }

    /// Pack every slot into `out` and return the written records as bytes,
    /// ready for a vertex buffer write.
    pub fn vertices_bytes<'a>(&self, out: &'a mut [ParticleVertex]) -> &'a [u8] {
        let n = self.write_vertices(out);
        bytemuck::cast_slice(&out[..n])
    }

    /// Evaluate the visual ramps for slot `index` using its emitter's lifetime.
    pub fn sample(&self, index: usize) -> Option<ParticleSample> {
        // Ranges are laid out in attach order, so their ends are sorted
        let at = self.emitters.partition_point(|e| e.slot_range().end() <= index);
        let emitter = self.emitters.get(at).filter(|e| e.slot_range().contains(index))?;
        ramp::sample(&self.attributes, index, emitter.max_age())
    }

    /// Number of allocated slots.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }

    /// Fixed capacity, if the group was created with one.
    pub fn capacity(&self) -> Option<usize> {
        self.config.capacity
    }

    /// Live particles across all emitters.
    pub fn alive_count(&self) -> usize {
        self.attributes.alive_count(SlotRange::new(0, self.attributes.len()))
    }

    /// Default per-particle lifetime.
    pub fn max_age(&self) -> f32 {
        self.config.max_age
    }

    pub fn config(&self) -> &GroupConfig {
        &self.config
    }

    /// Total simulated seconds.
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Number of ticks so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn seeded(config: GroupConfig) -> ParticleGroup {
        ParticleGroup::new(config.with_seed(17))
    }

    #[test]
    fn test_ranges_are_contiguous_and_disjoint() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        let a = group.attach_emitter(EmitterConfig::new().with_rate(10.0)).unwrap();
        let b = group.attach_emitter(EmitterConfig::new().with_rate(5.0)).unwrap();

        assert_eq!(group.emitter(a).unwrap().slot_range(), SlotRange::new(0, 10));
        assert_eq!(group.emitter(b).unwrap().slot_range(), SlotRange::new(10, 5));
        assert_eq!(group.len(), 15);
        assert_eq!(group.emitter(b).unwrap().spawn_cursor(), 10.0);
    }

    #[test]
    fn test_capacity_error_leaves_group_usable() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0).with_capacity(12));
        let a = group.attach_emitter(EmitterConfig::new().with_rate(10.0)).unwrap();

        let err = group.attach_emitter(EmitterConfig::new().with_rate(5.0)).unwrap_err();
        assert_eq!(err, SpeError::Capacity { requested: 5, available: 2 });
        assert_eq!(group.len(), 10);
        assert_eq!(group.emitters().len(), 1);

        group.tick(0.5);
        assert_eq!(group.emitter(a).unwrap().alive_particles(group.attributes()), 5);

        // A smaller emitter still fits
        assert!(group.attach_emitter(EmitterConfig::new().with_rate(2.0)).is_ok());
    }

    #[test]
    fn test_unreservable_emitter_is_refused() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        let a = group.attach_emitter(EmitterConfig::new().with_rate(10.0)).unwrap();

        let err = group.attach_emitter(EmitterConfig::new().with_rate(1e30)).unwrap_err();
        assert!(matches!(err, SpeError::Capacity { available: 0, .. }));
        assert_eq!(group.len(), 10);
        assert_eq!(group.emitters().len(), 1);

        group.tick(0.5);
        assert_eq!(group.emitter(a).unwrap().alive_particles(group.attributes()), 5);
    }

    #[test]
    fn test_growth_preserves_existing_slots() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        group
            .attach_emitter(EmitterConfig::cube(Vec3::ZERO, Vec3::splat(10.0)).with_rate(20.0))
            .unwrap();
        group.tick(0.25);

        let before_alive = group.attributes().alive().to_vec();
        let before_pos = group.attributes().position().to_vec();

        group.attach_emitter(EmitterConfig::new().with_rate(1000.0)).unwrap();

        assert_eq!(&group.attributes().alive()[..20], &before_alive[..]);
        assert_eq!(&group.attributes().position()[..20], &before_pos[..]);
    }

    #[test]
    fn test_static_emitter_is_preplaced() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        let id = group
            .attach_emitter(EmitterConfig::sphere(Vec3::ZERO, 5.0).with_rate(8.0).static_emitter())
            .unwrap();
        assert_eq!(group.alive_count(), 8);

        for _ in 0..100 {
            group.tick(0.1);
        }
        assert_eq!(group.alive_count(), 8);
        assert!(group.attributes().age().iter().all(|&a| a == 0.0));
        assert_eq!(group.emitter(id).unwrap().age(), 0.0);
    }

    #[test]
    fn test_negative_dt_is_clamped() {
        let mut group = seeded(GroupConfig::new());
        group.attach_emitter(EmitterConfig::new()).unwrap();
        assert_eq!(group.tick(-1.0), 0);
        assert_eq!(group.tick(f32::NAN), 0);
        assert_eq!(group.elapsed(), 0.0);
        assert_eq!(group.frame(), 2);
    }

    #[test]
    fn test_tick_fixed_uses_configured_step() {
        let mut group = seeded(GroupConfig::new().with_fixed_time_step(0.5));
        group.attach_emitter(EmitterConfig::new().with_rate(10.0)).unwrap();
        assert_eq!(group.tick_fixed(), 5);
        assert!((group.elapsed() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_same_seed_same_positions() {
        let run = || {
            let mut group = seeded(GroupConfig::new().with_max_age(1.0));
            group
                .attach_emitter(EmitterConfig::cube(Vec3::ZERO, Vec3::splat(4.0)).with_rate(50.0))
                .unwrap();
            group
                .attach_emitter(EmitterConfig::sphere(Vec3::ONE, 2.0).with_rate(50.0))
                .unwrap();
            for _ in 0..30 {
                group.tick(0.016);
            }
            group.attributes().position().to_vec()
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_unknown_emitter() {
        let mut group = seeded(GroupConfig::new());
        let mut other = seeded(GroupConfig::new());
        other.attach_emitter(EmitterConfig::new()).unwrap();
        let foreign = other.attach_emitter(EmitterConfig::new()).unwrap();

        assert_eq!(group.disable(foreign), Err(SpeError::UnknownEmitter(1)));
    }

    #[test]
    fn test_sample_uses_emitter_ramps() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        group
            .attach_emitter(EmitterConfig::new().with_rate(4.0).with_opacity(0.0, 1.0, 0.0))
            .unwrap();
        assert!(group.sample(0).is_none());

        group.tick(1.0);
        group.tick(0.5);
        let sample = group.sample(0).expect("slot 0 alive");
        assert!((sample.opacity - 1.0).abs() < 1e-6);
        assert!(group.sample(99).is_none());
    }

    #[test]
    fn test_sample_finds_owning_emitter() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        group.attach_emitter(EmitterConfig::new().with_rate(4.0)).unwrap();
        group.attach_emitter(EmitterConfig::new().with_rate(0.0)).unwrap();
        group
            .attach_emitter(
                EmitterConfig::new()
                    .with_rate(2.0)
                    .with_max_age(4.0)
                    .with_opacity(0.0, 1.0, 0.0),
            )
            .unwrap();
        assert_eq!(group.len(), 12);

        group.tick(2.0);
        group.tick(2.0);
        // Slot 4 belongs to the 4s emitter: half way through its life
        let sample = group.sample(4).expect("slot 4 alive");
        assert!((sample.opacity - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_vertices_bytes_packs_every_slot() {
        let mut group = seeded(GroupConfig::new().with_max_age(1.0));
        group.attach_emitter(EmitterConfig::new().with_rate(3.0)).unwrap();
        group.tick(1.0);

        let mut vertices = vec![ParticleVertex::default(); 8];
        let bytes = group.vertices_bytes(&mut vertices);
        assert_eq!(bytes.len(), 3 * std::mem::size_of::<ParticleVertex>());
        assert_eq!(vertices[0].alive, 1.0);
    }
}
