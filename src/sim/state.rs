//! Simulation state: every ring of the scene plus run control
//!
//! Tracks are independent; nothing here is shared between them except the
//! road kind and the clock.

use serde::{Deserialize, Serialize};

use super::track::{Track, TrackSnapshot};
use crate::error::SimResult;
use crate::road::{Road, RoadKind};
use crate::settings::{Settings, SpeedMode};

/// Per-track seed offset (64-bit golden ratio)
const SEED_STRIDE: u64 = 0x9e37_79b9_7f4a_7c15;

/// Run control
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SimPhase {
    /// Built, waiting for a start command
    Idle,
    Running,
    Paused,
}

/// Complete scene
#[derive(Debug, Clone)]
pub struct SimState {
    /// Rings, outermost first (same order as `settings.tracks`)
    pub tracks: Vec<Track>,
    pub phase: SimPhase,
    pub road: RoadKind,
    pub speed_mode: SpeedMode,
    /// Ticks advanced while running
    pub time_ticks: u64,
    /// Seconds advanced while running; drives the body wave
    pub elapsed: f32,
    settings: Settings,
}

/// Serializable view of the whole scene
#[derive(Debug, Serialize)]
pub struct SimSnapshot<'a> {
    pub time_ticks: u64,
    pub elapsed: f32,
    pub road: RoadKind,
    pub speed_mode: SpeedMode,
    pub tracks: Vec<TrackSnapshot<'a>>,
}

impl SimState {
    /// Build every ring from validated settings, vehicles evenly spread
    pub fn new(settings: Settings) -> SimResult<Self> {
        settings.validate()?;
        let road = settings.road;
        let speed_mode = SpeedMode::for_road(road);

        let mut state = Self {
            tracks: Vec::with_capacity(settings.tracks.len()),
            phase: SimPhase::Idle,
            road,
            speed_mode,
            time_ticks: 0,
            elapsed: 0.0,
            settings,
        };
        for index in 0..state.settings.tracks.len() {
            let track = state.build_track(index)?;
            state.tracks.push(track);
        }

        log::info!(
            "Built {} tracks on the {} road ({} vehicles)",
            state.tracks.len(),
            road.as_str(),
            state.vehicle_count()
        );
        Ok(state)
    }

    #[inline]
    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn vehicle_count(&self) -> usize {
        self.tracks.iter().map(|t| t.vehicles().len()).sum()
    }

    /// RNG seed of track `index`; rebuilt tracks mix in the tick count for a fresh stream
    fn track_seed(&self, index: usize) -> u64 {
        (self.settings.seed ^ self.time_ticks).wrapping_add((index as u64 + 1).wrapping_mul(SEED_STRIDE))
    }

    fn build_road(&self, kind: RoadKind, index: usize) -> SimResult<Road> {
        let ring = &self.settings.tracks[index];
        // Same noise seed on every ring keeps the rings parallel
        Road::generate(kind, self.settings.arena.scaled(ring.scale), self.settings.seed as u32)
    }

    fn build_track(&self, index: usize) -> SimResult<Track> {
        let ring = &self.settings.tracks[index];
        let mut track = Track::new(
            ring.cell_count,
            self.build_road(self.road, index)?,
            self.settings.policy_for(ring, self.speed_mode),
            self.settings.body,
            ring.direction,
            self.track_seed(index),
        )?;
        track.populate_evenly(ring.vehicle_count, ring.spacing)?;
        Ok(track)
    }

    /// Regenerate every ring's curve for `kind`.
    ///
    /// The speed mode follows the road, and rings that lost vehicles to
    /// absorption are rebuilt with a full complement.
    pub fn switch_road(&mut self, kind: RoadKind) -> SimResult<()> {
        self.road = kind;
        self.speed_mode = SpeedMode::for_road(kind);

        for index in 0..self.tracks.len() {
            if self.tracks[index].vehicles().len() < self.settings.tracks[index].vehicle_count {
                let rebuilt = self.build_track(index)?;
                self.tracks[index] = rebuilt;
                log::debug!("Track {} repopulated", index);
                continue;
            }
            let road = self.build_road(kind, index)?;
            let max_velocity = self.settings.tracks[index].max_velocity_for(self.speed_mode);
            let track = &mut self.tracks[index];
            track.set_road(road)?;
            track.set_max_velocity(max_velocity)?;
        }

        log::info!("Road switched to {} ({} mode)", kind.as_str(), self.speed_mode.as_str());
        Ok(())
    }

    /// Apply `mode`'s speed cap to every ring
    pub fn set_speed_mode(&mut self, mode: SpeedMode) -> SimResult<()> {
        for (track, ring) in self.tracks.iter_mut().zip(&self.settings.tracks) {
            track.set_max_velocity(ring.max_velocity_for(mode))?;
        }
        self.speed_mode = mode;
        log::info!("Speed mode: {}", mode.as_str());
        Ok(())
    }

    pub fn snapshot(&self) -> SimSnapshot<'_> {
        SimSnapshot {
            time_ticks: self.time_ticks,
            elapsed: self.elapsed,
            road: self.road,
            speed_mode: self.speed_mode,
            tracks: self.tracks.iter().map(Track::snapshot).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::Curve;

    #[test]
    fn test_new_builds_every_ring() {
        let state = SimState::new(Settings::default()).unwrap();
        assert_eq!(state.phase, SimPhase::Idle);
        assert_eq!(state.tracks.len(), 3);
        assert_eq!(state.vehicle_count(), 60);
        assert_eq!(state.speed_mode, SpeedMode::Cruise);
        for (track, ring) in state.tracks.iter().zip(&state.settings().tracks) {
            assert_eq!(track.cell_count(), ring.cell_count);
            assert_eq!(track.direction(), ring.direction);
            assert_eq!(track.policy().max_velocity, ring.max_velocity);
        }
    }

    #[test]
    fn test_rings_are_concentric() {
        let state = SimState::new(Settings::default()).unwrap();
        let lengths: Vec<f32> = state.tracks.iter().map(|t| t.curve().total_length()).collect();
        assert!(lengths[0] > lengths[1] && lengths[1] > lengths[2]);
        let center = state.settings().arena.center();
        let (head, _) = state.tracks[1].head_pose(0).unwrap();
        assert!(((head - center).length() - 384.0).abs() < 0.5);
    }

    #[test]
    fn test_rings_draw_independent_streams() {
        let state = SimState::new(Settings::default()).unwrap();
        let speeds = |i: usize| -> Vec<f32> {
            state.tracks[i].vehicles().iter().map(|v| v.velocity() / v.policy().max_velocity).collect()
        };
        assert_ne!(speeds(0), speeds(2));
    }

    #[test]
    fn test_invalid_settings_rejected() {
        let mut settings = Settings::default();
        settings.tracks.clear();
        assert!(SimState::new(settings).is_err());
    }

    #[test]
    fn test_switch_to_spiral_drifts() {
        let mut state = SimState::new(Settings::default()).unwrap();
        state.switch_road(RoadKind::Spiral).unwrap();
        assert_eq!(state.road, RoadKind::Spiral);
        assert_eq!(state.speed_mode, SpeedMode::Drift);
        assert_eq!(state.tracks[0].curve().kind(), RoadKind::Spiral);
        assert_eq!(state.tracks[0].policy().max_velocity, 0.7);
        assert!(state.tracks[0].vehicles().iter().all(|v| v.policy().max_velocity == 0.7));

        state.switch_road(RoadKind::Oval).unwrap();
        assert_eq!(state.speed_mode, SpeedMode::Cruise);
        assert_eq!(state.tracks[1].policy().max_velocity, 6.0);
    }

    #[test]
    fn test_switch_repopulates_depleted_rings() {
        let mut state = SimState::new(Settings::default()).unwrap();
        state.tracks[2].request_removal_at(0);
        state.tracks[2].request_removal_at(1);
        for track in &mut state.tracks {
            track.tick(0.0);
        }
        assert_eq!(state.tracks[2].vehicles().len(), 18);

        state.switch_road(RoadKind::Noise).unwrap();
        assert_eq!(state.tracks[2].vehicles().len(), 20);
        assert_eq!(state.tracks[2].curve().kind(), RoadKind::Noise);
        assert_eq!(state.vehicle_count(), 60);
    }

    #[test]
    fn test_speed_mode_toggle() {
        let mut state = SimState::new(Settings::default()).unwrap();
        state.set_speed_mode(SpeedMode::Drift).unwrap();
        assert_eq!(state.tracks[2].policy().max_velocity, 1.5);
        state.set_speed_mode(SpeedMode::Cruise).unwrap();
        assert_eq!(state.tracks[0].policy().max_velocity, 20.0);
    }

    #[test]
    fn test_snapshot_serializes() {
        let state = SimState::new(Settings::default()).unwrap();
        let json = serde_json::to_value(state.snapshot()).unwrap();
        assert_eq!(json["road"], "circle");
        assert_eq!(json["tracks"].as_array().unwrap().len(), 3);
        assert_eq!(json["tracks"][0]["vehicles"].as_array().unwrap().len(), 20);
    }
}
