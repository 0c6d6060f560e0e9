//! Scene settings
//!
//! Everything a run needs to build its tracks, loadable from a JSON file.
//! Every field is optional in the file; missing fields take the defaults below.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{CAR_FOOTPRINT, DEFAULT_CELL_COUNT};
use crate::error::{SimError, SimResult};
use crate::road::{Bounds, RoadKind};
use crate::sim::{BodyParams, Direction, NaSchPolicy};

/// Speed cap a track uses in the current speed mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeedMode {
    /// Each track runs at its `max_velocity`
    #[default]
    Cruise,
    /// Each track runs at its `spiral_max_velocity`
    Drift,
}

impl SpeedMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeedMode::Cruise => "Cruise",
            SpeedMode::Drift => "Drift",
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            SpeedMode::Cruise => SpeedMode::Drift,
            SpeedMode::Drift => SpeedMode::Cruise,
        }
    }

    /// Mode a road switch lands in
    pub fn for_road(road: RoadKind) -> Self {
        match road {
            RoadKind::Spiral => SpeedMode::Drift,
            _ => SpeedMode::Cruise,
        }
    }
}

/// One concentric ring
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackSettings {
    pub cell_count: usize,
    pub vehicle_count: usize,
    /// Initial gap between vehicles, in cells
    pub spacing: f32,
    pub max_velocity: f32,
    /// Speed cap in drift mode (default on the spiral road)
    pub spiral_max_velocity: f32,
    pub slowdown_probability: f32,
    pub direction: Direction,
    /// Ring size relative to the arena
    pub scale: f32,
}

impl Default for TrackSettings {
    fn default() -> Self {
        Self {
            cell_count: DEFAULT_CELL_COUNT,
            vehicle_count: 20,
            spacing: 75.0,
            max_velocity: 5.0,
            spiral_max_velocity: 1.5,
            slowdown_probability: 0.03,
            direction: Direction::Forward,
            scale: 1.0,
        }
    }
}

impl TrackSettings {
    pub fn max_velocity_for(&self, mode: SpeedMode) -> f32 {
        match mode {
            SpeedMode::Cruise => self.max_velocity,
            SpeedMode::Drift => self.spiral_max_velocity,
        }
    }
}

/// Whole-scene configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Master seed; each track derives its own stream from it
    pub seed: u64,
    /// Road shape at startup
    pub road: RoadKind,
    /// World-space rectangle the outermost ring is fitted into
    pub arena: Bounds,
    pub body: BodyParams,

    // === NaSch steps shared by every track ===
    pub accel_step: f32,
    pub slowdown_step: f32,
    pub footprint: u32,

    /// Rings, outermost first
    pub tracks: Vec<TrackSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            seed: 42,
            road: RoadKind::Circle,
            arena: Bounds::new(0.0, 0.0, 1024.0, 1024.0),
            body: BodyParams::default(),

            accel_step: 0.4,
            slowdown_step: 0.5,
            footprint: CAR_FOOTPRINT,

            tracks: vec![
                TrackSettings {
                    max_velocity: 20.0,
                    spiral_max_velocity: 0.7,
                    ..Default::default()
                },
                TrackSettings {
                    max_velocity: 6.0,
                    spiral_max_velocity: 1.0,
                    direction: Direction::Reverse,
                    scale: 0.75,
                    ..Default::default()
                },
                TrackSettings {
                    max_velocity: 5.0,
                    spiral_max_velocity: 1.5,
                    scale: 0.5,
                    ..Default::default()
                },
            ],
        }
    }
}

impl Settings {
    /// NaSch policy for `track` under `mode`
    pub fn policy_for(&self, track: &TrackSettings, mode: SpeedMode) -> NaSchPolicy {
        NaSchPolicy {
            max_velocity: track.max_velocity_for(mode),
            slowdown_probability: track.slowdown_probability,
            accel_step: self.accel_step,
            slowdown_step: self.slowdown_step,
            footprint: self.footprint,
        }
    }

    pub fn validate(&self) -> SimResult<()> {
        if self.tracks.is_empty() {
            return Err(SimError::NoTracks);
        }
        self.body.validate()?;
        for track in &self.tracks {
            if track.cell_count == 0 {
                return Err(SimError::ZeroCells);
            }
            for mode in [SpeedMode::Cruise, SpeedMode::Drift] {
                self.policy_for(track, mode).validate()?;
            }
            for (name, value) in [("spacing", track.spacing), ("scale", track.scale)] {
                if !(value >= 0.0 && value.is_finite()) {
                    return Err(SimError::InvalidStep { name, value });
                }
            }
        }
        Ok(())
    }

    /// Read and validate a JSON settings file
    pub fn load(path: &Path) -> SimResult<Self> {
        let json = fs::read_to_string(path)?;
        let settings: Self = serde_json::from_str(&json)?;
        settings.validate()?;
        log::info!(
            "Loaded settings from {} ({} tracks)",
            path.display(),
            settings.tracks.len()
        );
        Ok(settings)
    }

    /// Settings from `path` if given, otherwise the defaults
    pub fn load_or_default(path: Option<&Path>) -> SimResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                log::info!("Using default settings");
                Ok(Self::default())
            }
        }
    }

    pub fn save(&self, path: &Path) -> SimResult<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        log::info!("Settings saved to {}", path.display());
        Ok(())
    }
}
