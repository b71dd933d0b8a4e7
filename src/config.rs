//! Configuration types for particle groups and emitters.
//!
//! Every field has a documented default, so an empty options record is a
//! working emitter. Configs can be built in code with the builder methods,
//! deserialized strictly with serde, or read leniently from JSON where any
//! missing or malformed field silently falls back to its default.
//!
//! # Example
//!
//! ```ignore
//! let stars = EmitterConfig::cube(Vec3::ZERO, Vec3::splat(100.0))
//!     .with_rate(2500.0)
//!     .with_velocity(Vec3::new(0.0, 0.0, 10.0), Vec3::ZERO)
//!     .with_opacity(0.0, 1.0, 0.0);
//! ```
//!
//! # JSON
//!
//! Vectors are `[x, y, z]` arrays and `type` is `"cube"` or `"sphere"`:
//!
//! ```json
//! {
//!     "type": "sphere",
//!     "position": [0, 10, 0],
//!     "radius": 5,
//!     "particles_per_second": 400,
//!     "emitter_duration": 2.5
//! }
//! ```

use crate::error::ConfigError;
use glam::Vec3;
use log::warn;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fs;
use std::path::Path;

/// Spatial distribution used when a particle (re)spawns.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum EmitterType {
    /// Uniform inside a box of `position_spread` around the emitter position.
    #[default]
    Cube,
    /// Uniform on a sphere surface of `radius`, scaled by `radius_scale`.
    Sphere,
}

/// Emitter configuration. Immutable once the emitter is attached to a group.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EmitterConfig {
    /// Spawn distribution. Default: cube.
    #[serde(rename = "type")]
    pub kind: EmitterType,
    /// Emission rate. Default: 100.
    pub particles_per_second: f32,

    /// Emitter origin. Default: origin.
    pub position: Vec3,
    /// Cube edge lengths. Default: zero (every particle at `position`).
    pub position_spread: Vec3,
    /// Sphere radius. Default: 10.
    pub radius: f32,
    /// Per-axis sphere scale. Default: (1, 1, 1).
    pub radius_scale: Vec3,

    /// Initial velocity. Default: zero.
    pub velocity: Vec3,
    /// Per-axis velocity spread. Default: zero.
    pub velocity_spread: Vec3,
    /// Constant acceleration. Default: zero.
    pub acceleration: Vec3,
    /// Per-axis acceleration spread. Default: zero.
    pub acceleration_spread: Vec3,
    /// Outward launch speed for sphere emitters. Default: 0.
    pub speed: f32,
    /// Launch speed spread for sphere emitters. Default: 0.
    pub speed_spread: f32,

    /// Size at birth. Default: 10.
    pub size: f32,
    /// Spread applied to the birth size. Default: 0.
    pub size_spread: f32,
    /// Size at death. Default: 10.
    pub size_end: f32,

    /// Color at birth. Default: white.
    pub color_start: Vec3,
    /// Per-channel spread on the birth color. Default: zero.
    pub color_spread: Vec3,
    /// Color at death. Default: blue.
    pub color_end: Vec3,

    /// Opacity at birth. Default: 1.
    pub opacity_start: f32,
    /// Opacity at mid-life. Default: `|opacity_end + opacity_start| / 2`.
    pub opacity_middle: Option<f32>,
    /// Opacity at death. Default: 0.
    pub opacity_end: f32,

    /// Per-particle lifetime. Default: the group's `max_age`.
    pub max_age: Option<f32>,
    /// Emitter lifetime in seconds. Default: unbounded.
    pub emitter_duration: Option<f32>,
    /// Whether the emitter starts enabled. Default: true.
    pub alive: bool,
    /// Static emitters spawn every slot once at attach and never tick. Default: false.
    #[serde(alias = "static")]
    pub is_static: bool,
}

impl Default for EmitterConfig {
    fn default() -> Self {
        Self {
            kind: EmitterType::Cube,
            particles_per_second: 100.0,
            position: Vec3::ZERO,
            position_spread: Vec3::ZERO,
            radius: 10.0,
            radius_scale: Vec3::ONE,
            velocity: Vec3::ZERO,
            velocity_spread: Vec3::ZERO,
            acceleration: Vec3::ZERO,
            acceleration_spread: Vec3::ZERO,
            speed: 0.0,
            speed_spread: 0.0,
            size: 10.0,
            size_spread: 0.0,
            size_end: 10.0,
            color_start: Vec3::ONE,
            color_spread: Vec3::ZERO,
            color_end: Vec3::new(0.0, 0.0, 1.0),
            opacity_start: 1.0,
            opacity_middle: None,
            opacity_end: 0.0,
            max_age: None,
            emitter_duration: None,
            alive: true,
            is_static: false,
        }
    }
}

impl EmitterConfig {
    /// Create a default (cube) emitter configuration.
    pub fn new() -> Self {
        Self::default()
    }

    // =========================================================================
    // BUILDER METHODS
    // =========================================================================

    /// Cube emitter spawning inside `position ± spread / 2`.
    pub fn cube(position: Vec3, spread: Vec3) -> Self {
        Self {
            kind: EmitterType::Cube,
            position,
            position_spread: spread,
            ..Default::default()
        }
    }

    /// Sphere emitter spawning on a sphere of `radius` around `position`.
    pub fn sphere(position: Vec3, radius: f32) -> Self {
        Self {
            kind: EmitterType::Sphere,
            position,
            radius,
            ..Default::default()
        }
    }

    /// Set the emission rate in particles per second.
    pub fn with_rate(mut self, particles_per_second: f32) -> Self {
        self.particles_per_second = particles_per_second;
        self
    }

    /// Stretch a sphere emitter into an ellipsoid.
    pub fn with_radius_scale(mut self, scale: Vec3) -> Self {
        self.radius_scale = scale;
        self
    }

    /// Set base velocity and per-axis spread.
    pub fn with_velocity(mut self, velocity: Vec3, spread: Vec3) -> Self {
        self.velocity = velocity;
        self.velocity_spread = spread;
        self
    }

    /// Set base acceleration and per-axis spread.
    pub fn with_acceleration(mut self, acceleration: Vec3, spread: Vec3) -> Self {
        self.acceleration = acceleration;
        self.acceleration_spread = spread;
        self
    }

    /// Set outward launch speed (sphere emitters).
    pub fn with_speed(mut self, speed: f32, spread: f32) -> Self {
        self.speed = speed;
        self.speed_spread = spread;
        self
    }

    /// Set the size ramp.
    pub fn with_size(mut self, start: f32, end: f32) -> Self {
        self.size = start;
        self.size_end = end;
        self
    }

    /// Randomize the birth size by `± spread / 2`.
    pub fn with_size_spread(mut self, spread: f32) -> Self {
        self.size_spread = spread;
        self
    }

    /// Set the color ramp.
    pub fn with_colors(mut self, start: Vec3, end: Vec3) -> Self {
        self.color_start = start;
        self.color_end = end;
        self
    }

    /// Randomize the birth color per channel.
    pub fn with_color_spread(mut self, spread: Vec3) -> Self {
        self.color_spread = spread;
        self
    }

    /// Set the three-point opacity ramp.
    pub fn with_opacity(mut self, start: f32, middle: f32, end: f32) -> Self {
        self.opacity_start = start;
        self.opacity_middle = Some(middle);
        self.opacity_end = end;
        self
    }

    /// Override the group's particle lifetime for this emitter.
    pub fn with_max_age(mut self, seconds: f32) -> Self {
        self.max_age = Some(seconds);
        self
    }

    /// Stop emitting after `seconds`.
    pub fn with_duration(mut self, seconds: f32) -> Self {
        self.emitter_duration = Some(seconds);
        self
    }

    /// Make this a static, pre-placed emitter.
    pub fn static_emitter(mut self) -> Self {
        self.is_static = true;
        self
    }

    /// Start the emitter disabled.
    pub fn disabled(mut self) -> Self {
        self.alive = false;
        self
    }

    // =========================================================================
    // DERIVED VALUES
    // =========================================================================

    /// Mid-life opacity, derived from start and end when not set.
    pub fn opacity_middle(&self) -> f32 {
        self.opacity_middle
            .unwrap_or_else(|| (self.opacity_end + self.opacity_start).abs() / 2.0)
    }

    /// Particle lifetime for this emitter inside a group with `group_max_age`.
    pub fn resolved_max_age(&self, group_max_age: f32) -> f32 {
        self.max_age.unwrap_or(group_max_age)
    }

    /// Number of slots this emitter needs: `ceil(rate * lifetime)`.
    pub fn particle_count(&self, group_max_age: f32) -> usize {
        let count = (self.particles_per_second * self.resolved_max_age(group_max_age)).ceil();
        if count.is_finite() && count > 0.0 {
            count as usize
        } else {
            0
        }
    }

    /// Replace values that would poison the simulation with their defaults.
    ///
    /// Non-finite numbers fall back to the default; a negative rate or
    /// lifetime is treated as zero.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        if !self.particles_per_second.is_finite() {
            warn!("non-finite particles_per_second, using {}", defaults.particles_per_second);
            self.particles_per_second = defaults.particles_per_second;
        }
        self.particles_per_second = self.particles_per_second.max(0.0);
        if !self.radius.is_finite() {
            self.radius = defaults.radius;
        }
        self.max_age = self.max_age.filter(|a| a.is_finite()).map(|a| a.max(0.0));
        self.emitter_duration = self.emitter_duration.filter(|d| !d.is_nan());
        self
    }

    // =========================================================================
    // LENIENT JSON
    // =========================================================================

    /// Read an emitter from loosely-typed JSON.
    ///
    /// Missing fields take their default. Fields of the wrong type also take
    /// their default, with a warning. Flags accept booleans or numbers
    /// (non-zero is true). Never fails.
    pub fn from_json_lenient(value: &Value) -> Self {
        let mut config = Self::default();
        let Some(fields) = value.as_object() else {
            warn!("emitter options are not an object, using defaults");
            return config;
        };
        let reader = LenientFields { fields };

        reader.read("type", &mut config.kind);
        reader.read("particles_per_second", &mut config.particles_per_second);
        reader.read("position", &mut config.position);
        reader.read("position_spread", &mut config.position_spread);
        reader.read("radius", &mut config.radius);
        reader.read("radius_scale", &mut config.radius_scale);
        reader.read("velocity", &mut config.velocity);
        reader.read("velocity_spread", &mut config.velocity_spread);
        reader.read("acceleration", &mut config.acceleration);
        reader.read("acceleration_spread", &mut config.acceleration_spread);
        reader.read("speed", &mut config.speed);
        reader.read("speed_spread", &mut config.speed_spread);
        reader.read("size", &mut config.size);
        reader.read("size_spread", &mut config.size_spread);
        reader.read("size_end", &mut config.size_end);
        reader.read("color_start", &mut config.color_start);
        reader.read("color_spread", &mut config.color_spread);
        reader.read("color_end", &mut config.color_end);
        reader.read("opacity_start", &mut config.opacity_start);
        reader.read("opacity_middle", &mut config.opacity_middle);
        reader.read("opacity_end", &mut config.opacity_end);
        reader.read("max_age", &mut config.max_age);
        reader.read("emitter_duration", &mut config.emitter_duration);
        reader.flag("alive", &mut config.alive);
        reader.flag("is_static", &mut config.is_static);
        reader.flag("static", &mut config.is_static);

        config.sanitized()
    }
}

/// Particle group configuration.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GroupConfig {
    /// Default per-particle lifetime in seconds. Default: 3.
    pub max_age: f32,
    /// Fixed slot capacity. `None` lets the arrays grow on attach. Default: `None`.
    pub capacity: Option<usize>,
    /// Step used by [`ParticleGroup::tick_fixed`](crate::ParticleGroup::tick_fixed). Default: 0.016.
    pub fixed_time_step: f32,
    /// RNG seed for reproducible runs. Default: `None` (entropy).
    pub seed: Option<u64>,
}

impl Default for GroupConfig {
    fn default() -> Self {
        Self {
            max_age: 3.0,
            capacity: None,
            fixed_time_step: 0.016,
            seed: None,
        }
    }
}

impl GroupConfig {
    /// Create a default group configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the default particle lifetime.
    pub fn with_max_age(mut self, seconds: f32) -> Self {
        self.max_age = seconds;
        self
    }

    /// Pre-size the arrays and refuse emitters that don't fit.
    pub fn with_capacity(mut self, slots: usize) -> Self {
        self.capacity = Some(slots);
        self
    }

    /// Set the step used by `tick_fixed`.
    pub fn with_fixed_time_step(mut self, dt: f32) -> Self {
        self.fixed_time_step = dt;
        self
    }

    /// Seed the group's random source.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Read a group config from loosely-typed JSON, defaulting bad fields.
    pub fn from_json_lenient(value: &Value) -> Self {
        let mut config = Self::default();
        let Some(fields) = value.as_object() else {
            warn!("group options are not an object, using defaults");
            return config;
        };
        let reader = LenientFields { fields };
        reader.read("max_age", &mut config.max_age);
        reader.read("capacity", &mut config.capacity);
        reader.read("fixed_time_step", &mut config.fixed_time_step);
        reader.read("seed", &mut config.seed);

        if !config.max_age.is_finite() || config.max_age < 0.0 {
            warn!("invalid group max_age {}, using 3", config.max_age);
            config.max_age = 3.0;
        }
        config
    }
}

/// A group plus the emitters to attach to it, as loaded from a scene file.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SceneConfig {
    pub group: GroupConfig,
    pub emitters: Vec<EmitterConfig>,
}

impl SceneConfig {
    /// Load a scene from a JSON file, leniently.
    ///
    /// Only unreadable files, invalid JSON, or a non-array `emitters` entry
    /// are errors; everything else falls back to defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path)?;
        let value: Value = serde_json::from_str(&json)?;
        Self::from_json_lenient(&value)
    }

    /// Build a scene from an already parsed JSON value.
    pub fn from_json_lenient(value: &Value) -> Result<Self, ConfigError> {
        let Some(root) = value.as_object() else {
            return Err(ConfigError::Invalid("scene root must be an object".into()));
        };
        let group = root
            .get("group")
            .map(GroupConfig::from_json_lenient)
            .unwrap_or_default();
        let emitters = match root.get("emitters") {
            None => Vec::new(),
            Some(Value::Array(items)) => items.iter().map(EmitterConfig::from_json_lenient).collect(),
            Some(_) => return Err(ConfigError::Invalid("`emitters` must be an array".into())),
        };
        Ok(Self { group, emitters })
    }
}

/// Field reader that keeps the default whenever a value doesn't parse.
struct LenientFields<'a> {
    fields: &'a Map<String, Value>,
}

impl LenientFields<'_> {
    fn read<T: DeserializeOwned>(&self, key: &str, slot: &mut T) {
        let Some(raw) = self.fields.get(key) else {
            return;
        };
        match T::deserialize(raw) {
            Ok(value) => *slot = value,
            Err(e) => warn!("ignoring malformed option `{key}` ({e}), keeping default"),
        }
    }

    fn flag(&self, key: &str, slot: &mut bool) {
        match self.fields.get(key) {
            None => {}
            Some(Value::Bool(b)) => *slot = *b,
            Some(Value::Number(n)) => *slot = n.as_f64().is_some_and(|n| n != 0.0),
            Some(other) => warn!("ignoring malformed flag `{key}` ({other}), keeping default"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_defaults() {
        let config = EmitterConfig::default();
        assert_eq!(config.kind, EmitterType::Cube);
        assert_eq!(config.particles_per_second, 100.0);
        assert_eq!(config.radius, 10.0);
        assert_eq!(config.radius_scale, Vec3::ONE);
        assert_eq!(config.color_end, Vec3::new(0.0, 0.0, 1.0));
        assert!(config.alive);
        assert!(!config.is_static);
        assert!(config.emitter_duration.is_none());
        assert!((config.opacity_middle() - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_particle_count_rounds_up() {
        let config = EmitterConfig::new().with_rate(2500.0);
        assert_eq!(config.particle_count(2.0), 5000);

        let config = EmitterConfig::new().with_rate(10.0);
        assert_eq!(config.particle_count(0.25), 3);

        let config = EmitterConfig::new().with_rate(10.0).with_max_age(1.0);
        assert_eq!(config.particle_count(5.0), 10);
    }

    #[test]
    fn test_builder_chain() {
        let config = EmitterConfig::sphere(Vec3::Y, 2.0)
            .with_rate(50.0)
            .with_speed(3.0, 1.0)
            .with_opacity(0.0, 1.0, 0.0)
            .with_duration(1.5);

        assert_eq!(config.kind, EmitterType::Sphere);
        assert_eq!(config.radius, 2.0);
        assert_eq!(config.opacity_middle(), 1.0);
        assert_eq!(config.emitter_duration, Some(1.5));
    }

    #[test]
    fn test_lenient_json_fills_defaults() {
        let config = EmitterConfig::from_json_lenient(&json!({
            "type": "sphere",
            "radius": 4,
            "position": [1, 2, 3],
        }));
        assert_eq!(config.kind, EmitterType::Sphere);
        assert_eq!(config.radius, 4.0);
        assert_eq!(config.position, Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(config.particles_per_second, 100.0);
    }

    #[test]
    fn test_lenient_json_malformed_falls_back() {
        let config = EmitterConfig::from_json_lenient(&json!({
            "type": "torus",
            "particles_per_second": "lots",
            "position_spread": [1, 2],
            "size": 4.5,
            "static": 1,
            "alive": 0,
        }));
        assert_eq!(config.kind, EmitterType::Cube);
        assert_eq!(config.particles_per_second, 100.0);
        assert_eq!(config.position_spread, Vec3::ZERO);
        assert_eq!(config.size, 4.5);
        assert!(config.is_static);
        assert!(!config.alive);
    }

    #[test]
    fn test_lenient_json_not_an_object() {
        assert_eq!(EmitterConfig::from_json_lenient(&json!(42)), EmitterConfig::default());
    }

    #[test]
    fn test_strict_serde_roundtrip_uses_type_key() {
        let config = EmitterConfig::sphere(Vec3::ZERO, 1.0);
        let json = serde_json::to_value(&config).unwrap();
        assert_eq!(json["type"], "sphere");
        let back: EmitterConfig = serde_json::from_value(json).unwrap();
        assert_eq!(back, config);
    }

    #[test]
    fn test_scene_requires_emitter_array() {
        let err = SceneConfig::from_json_lenient(&json!({ "emitters": 3 }));
        assert!(matches!(err, Err(ConfigError::Invalid(_))));

        let scene = SceneConfig::from_json_lenient(&json!({
            "group": { "max_age": 2, "seed": 9 },
            "emitters": [{ "particles_per_second": 10 }, "junk"],
        }))
        .unwrap();
        assert_eq!(scene.group.max_age, 2.0);
        assert_eq!(scene.group.seed, Some(9));
        assert_eq!(scene.emitters.len(), 2);
        assert_eq!(scene.emitters[1], EmitterConfig::default());
    }
}
