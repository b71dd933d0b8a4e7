//! Shared per-particle attribute storage.
//!
//! A [`ParticleGroup`](crate::ParticleGroup) owns one [`ParticleAttributes`]
//! arena laid out as a struct of flat arrays, the same shape a renderer
//! uploads as vertex attributes. Each emitter owns a [`SlotRange`] into it;
//! ranges never overlap, so emitters never see each other's particles.
//!
//! # Layout
//!
//! | Array | Type | Written |
//! |-------|------|---------|
//! | `age` | `f32` | every tick |
//! | `alive` | `f32` | every tick (0.0 = dead, 1.0 = alive) |
//! | `position` | `Vec3` | on spawn |
//! | `velocity` | `Vec3` | at attach |
//! | `acceleration` | `Vec3` | at attach |
//! | `size` | `Vec2` | at attach (start, end) |
//! | `color_start` | `Vec3` | at attach |
//! | `color_end` | `Vec3` | at attach |
//! | `opacity` | `Vec3` | at attach (start, middle, end) |
//!
//! `alive` is stored as a float rather than a `bool` so it can be uploaded
//! verbatim next to `age`.

use glam::{Vec2, Vec3};
use std::collections::TryReserveError;
use std::ops::Range;

/// Contiguous window `[start, start + count)` into the shared arrays.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct SlotRange {
    /// First slot index.
    pub start: usize,
    /// Number of slots.
    pub count: usize,
}

impl SlotRange {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    /// One past the last slot.
    #[inline]
    pub fn end(&self) -> usize {
        self.start + self.count
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    #[inline]
    pub fn contains(&self, index: usize) -> bool {
        index >= self.start && index < self.end()
    }

    /// Slot indices as a `Range`.
    #[inline]
    pub fn indices(&self) -> Range<usize> {
        self.start..self.end()
    }
}

/// Initial values for one slot, written when its range is allocated.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SlotInit {
    pub position: Vec3,
    pub velocity: Vec3,
    pub acceleration: Vec3,
    pub size: Vec2,
    pub color_start: Vec3,
    pub color_end: Vec3,
    pub opacity: Vec3,
}

/// Flat attribute arrays for every particle slot in a group.
#[derive(Clone, Debug, Default)]
pub struct ParticleAttributes {
    pub(crate) age: Vec<f32>,
    pub(crate) alive: Vec<f32>,
    pub(crate) position: Vec<Vec3>,
    pub(crate) velocity: Vec<Vec3>,
    pub(crate) acceleration: Vec<Vec3>,
    pub(crate) size: Vec<Vec2>,
    pub(crate) color_start: Vec<Vec3>,
    pub(crate) color_end: Vec<Vec3>,
    pub(crate) opacity: Vec<Vec3>,
}

impl ParticleAttributes {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty arena with room for `slots` particles, so later allocations
    /// up to that size never reallocate.
    pub fn with_capacity(slots: usize) -> Self {
        Self {
            age: Vec::with_capacity(slots),
            alive: Vec::with_capacity(slots),
            position: Vec::with_capacity(slots),
            velocity: Vec::with_capacity(slots),
            acceleration: Vec::with_capacity(slots),
            size: Vec::with_capacity(slots),
            color_start: Vec::with_capacity(slots),
            color_end: Vec::with_capacity(slots),
            opacity: Vec::with_capacity(slots),
        }
    }

    /// Number of allocated slots.
    #[inline]
    pub fn len(&self) -> usize {
        self.age.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.age.is_empty()
    }

    /// Reserve room for `additional` more slots in every array.
    ///
    /// Fails without aborting when the request overflows or the allocator
    /// refuses it; slot data is untouched either way.
    pub(crate) fn try_reserve(&mut self, additional: usize) -> Result<(), TryReserveError> {
        self.age.try_reserve(additional)?;
        self.alive.try_reserve(additional)?;
        self.position.try_reserve(additional)?;
        self.velocity.try_reserve(additional)?;
        self.acceleration.try_reserve(additional)?;
        self.size.try_reserve(additional)?;
        self.color_start.try_reserve(additional)?;
        self.color_end.try_reserve(additional)?;
        self.opacity.try_reserve(additional)
    }

    /// Append `count` slots, each dead with age zero and initialized by
    /// `init(slot_index)`. Existing slots are untouched.
    pub(crate) fn allocate(&mut self, count: usize, mut init: impl FnMut(usize) -> SlotInit) -> SlotRange {
        let range = SlotRange::new(self.len(), count);
        for index in range.indices() {
            let slot = init(index);
            self.age.push(0.0);
            self.alive.push(0.0);
            self.position.push(slot.position);
            self.velocity.push(slot.velocity);
            self.acceleration.push(slot.acceleration);
            self.size.push(slot.size);
            self.color_start.push(slot.color_start);
            self.color_end.push(slot.color_end);
            self.opacity.push(slot.opacity);
        }
        range
    }

    /// Zero `age` and `alive` for every slot in `range`.
    pub(crate) fn kill_range(&mut self, range: SlotRange) {
        self.age[range.indices()].fill(0.0);
        self.alive[range.indices()].fill(0.0);
    }

    // ========== Read-only views ==========

    pub fn age(&self) -> &[f32] {
        &self.age
    }

    pub fn alive(&self) -> &[f32] {
        &self.alive
    }

    pub fn position(&self) -> &[Vec3] {
        &self.position
    }

    pub fn velocity(&self) -> &[Vec3] {
        &self.velocity
    }

    pub fn acceleration(&self) -> &[Vec3] {
        &self.acceleration
    }

    /// Size ramp per slot as (start, end).
    pub fn size(&self) -> &[Vec2] {
        &self.size
    }

    pub fn color_start(&self) -> &[Vec3] {
        &self.color_start
    }

    pub fn color_end(&self) -> &[Vec3] {
        &self.color_end
    }

    /// Opacity ramp per slot as (start, middle, end).
    pub fn opacity(&self) -> &[Vec3] {
        &self.opacity
    }

    #[inline]
    pub fn is_alive(&self, index: usize) -> bool {
        self.alive[index] == 1.0
    }

    /// Number of live particles inside `range`.
    pub fn alive_count(&self, range: SlotRange) -> usize {
        self.alive[range.indices()].iter().filter(|&&a| a == 1.0).count()
    }

    // ========== Upload helpers ==========

    /// Raw bytes of the `age` array.
    pub fn age_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.age)
    }

    /// Raw bytes of the `alive` array.
    pub fn alive_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.alive)
    }

    /// Raw bytes of the `position` array (12 bytes per slot).
    pub fn position_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.position)
    }

    /// Pack slot `index` into an interleaved upload record.
    pub fn vertex(&self, index: usize) -> ParticleVertex {
        let size = self.size[index];
        let opacity = self.opacity[index];
        ParticleVertex {
            position: self.position[index].to_array(),
            alive: self.alive[index],
            velocity: self.velocity[index].to_array(),
            age: self.age[index],
            acceleration: self.acceleration[index].to_array(),
            size_start: size.x,
            color_start: self.color_start[index].to_array(),
            size_end: size.y,
            color_end: self.color_end[index].to_array(),
            opacity_start: opacity.x,
            opacity_middle: opacity.y,
            opacity_end: opacity.z,
            _padding: [0.0; 2],
        }
    }

    /// Pack every slot into `out`, which must hold at least [`len`](Self::len)
    /// records. Returns the number written. Does not allocate.
    pub fn write_vertices(&self, out: &mut [ParticleVertex]) -> usize {
        let n = self.len().min(out.len());
        for (index, slot) in out[..n].iter_mut().enumerate() {
            *slot = self.vertex(index);
        }
        n
    }
}

/// Interleaved per-particle record for vertex buffer upload.
///
/// 96 bytes, 16-byte multiple, no implicit padding.
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct ParticleVertex {
    pub position: [f32; 3],
    pub alive: f32,
    pub velocity: [f32; 3],
    pub age: f32,
    pub acceleration: [f32; 3],
    pub size_start: f32,
    pub color_start: [f32; 3],
    pub size_end: f32,
    pub color_end: [f32; 3],
    pub opacity_start: f32,
    pub opacity_middle: f32,
    pub opacity_end: f32,
    pub _padding: [f32; 2],
}
