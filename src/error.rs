//! Error types for SPE.
//!
//! Ticking never fails; errors only come out of slot allocation, emitter
//! lookup and configuration loading.

use std::io;
use thiserror::Error;

/// Errors raised by a [`ParticleGroup`](crate::ParticleGroup).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SpeError {
    /// A fixed-capacity group has no room left for the emitter's slots.
    ///
    /// The group is left untouched; previously attached emitters keep working.
    #[error("Not enough particle slots: emitter needs {requested}, group has {available} free")]
    Capacity {
        /// Slots the emitter asked for.
        requested: usize,
        /// Slots still unallocated in the group.
        available: usize,
    },

    /// The emitter id does not belong to this group.
    #[error("Unknown emitter id {0}")]
    UnknownEmitter(usize),
}

/// Errors that can occur while loading configuration files.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the file from disk.
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    /// The file is not valid JSON.
    #[error("Failed to parse config JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The JSON is valid but not shaped like a scene.
    #[error("Invalid scene: {0}")]
    Invalid(String),
}

/// Result type using [`SpeError`].
pub type Result<T> = std::result::Result<T, SpeError>;
