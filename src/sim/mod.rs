//! Deterministic traffic simulation
//!
//! This module must stay pure and deterministic:
//! - Fixed timestep; elapsed time is always passed in
//! - Seeded RNG only (one stream per track)
//! - Stable iteration order (spawn order)
//! - No rendering or platform dependencies

pub mod body;
pub mod grid;
pub mod nasch;
pub mod state;
pub mod tick;
pub mod track;
pub mod vehicle;

pub use body::{BodyParams, SegmentChain};
pub use grid::OccupancyGrid;
pub use nasch::NaSchPolicy;
pub use state::{SimPhase, SimSnapshot, SimState};
pub use tick::{TickInput, tick};
pub use track::{Direction, Track, TrackSnapshot, TrackStats};
pub use vehicle::{Vehicle, VehicleId};
