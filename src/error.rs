//! Construction-time error type.
//!
//! Every variant describes a configuration the simulation refuses to start
//! with. The per-tick pipeline never returns errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("track must have at least one cell")]
    ZeroCells,

    #[error("curve length must be positive and finite, got {0}")]
    DegenerateCurve(f32),

    #[error("max velocity must be non-negative, got {0}")]
    NegativeMaxVelocity(f32),

    #[error("slowdown probability must lie in [0, 1], got {0}")]
    SlowdownProbability(f32),

    #[error("{name} must be positive and finite, got {value}")]
    InvalidStep { name: &'static str, value: f32 },

    #[error("vehicle body needs at least one segment")]
    EmptyBody,

    #[error("spawn position must be finite, got {0}")]
    InvalidPosition(f32),

    #[error("scene has no tracks")]
    NoTracks,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("settings parse error: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Shorthand result type for fallible constructors.
pub type SimResult<T> = Result<T, SimError>;
