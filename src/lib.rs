//! NaSch Orbits - concentric-ring traffic for generative visuals
//!
//! Core modules:
//! - `sim`: Deterministic traffic simulation (occupancy grid, NaSch rules, body chains, tracks)
//! - `road`: Closed curves that map arc-length distance to world space
//! - `settings`: Data-driven scene configuration
//! - `error`: Construction-time validation errors

pub mod error;
pub mod road;
pub mod settings;
pub mod sim;

pub use error::{SimError, SimResult};
pub use settings::{Settings, SpeedMode, TrackSettings};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (one tick per 60 Hz frame)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Default cells per track
    pub const DEFAULT_CELL_COUNT: usize = 1500;

    /// Trailing body segments per vehicle (head included)
    pub const BODY_SEGMENTS: usize = 15;
    /// Resting distance between body segments, in cells
    pub const BODY_BASE_SPACING: f32 = 2.0;
    /// Proportional gain of the segment spacing controller
    pub const BODY_SPRING_GAIN: f32 = 0.2;
    /// Backward head jump (as a fraction of the cell count) that resets a body chain
    pub const BODY_RESET_FRACTION: f32 = 1.0 / 6.0;

    /// Rendered car length in cells used by the scene defaults
    pub const CAR_FOOTPRINT: u32 = 25;

    /// Inner margin of the oval road, in world units
    pub const OVAL_MARGIN: f32 = 20.0;
}

/// Wrap a cell-space (or arc-length) position into `[0, len)`.
///
/// Handles negative input and values several laps away.
#[inline]
pub fn wrap_position(pos: f32, len: f32) -> f32 {
    let wrapped = pos.rem_euclid(len);
    // rem_euclid can round up to exactly `len` for tiny negative inputs
    if wrapped >= len { 0.0 } else { wrapped }
}

/// Signed distance from `from` to `to` along the shorter arc of a loop of length `len`.
///
/// Result lies in `[-len/2, len/2]`.
#[inline]
pub fn shortest_arc(from: f32, to: f32, len: f32) -> f32 {
    let mut diff = to - from;
    if diff < -len / 2.0 {
        diff += len;
    } else if diff > len / 2.0 {
        diff -= len;
    }
    diff
}

/// Convert polar (r, theta) to cartesian (x, y) around `center`
#[inline]
pub fn polar_to_cartesian(center: Vec2, r: f32, theta: f32) -> Vec2 {
    center + Vec2::new(r * theta.cos(), r * theta.sin())
}
