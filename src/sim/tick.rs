//! Fixed timestep simulation tick
//!
//! Applies queued commands, then advances every track once while running.

use super::state::{SimPhase, SimState};
use crate::road::RoadKind;

/// Commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Leave Idle or Paused
    pub start: bool,
    /// Pause toggle
    pub pause: bool,
    /// Regenerate every ring with this road shape
    pub switch_road: Option<RoadKind>,
    /// Flip between cruise and drift speed caps
    pub toggle_speed_mode: bool,
}

/// Advance the simulation by one fixed timestep
pub fn tick(state: &mut SimState, input: &TickInput, dt: f32) {
    // Commands apply in every phase
    if let Some(kind) = input.switch_road {
        if let Err(e) = state.switch_road(kind) {
            log::warn!("Road switch to {} failed: {}", kind.as_str(), e);
        }
    }
    if input.toggle_speed_mode {
        if let Err(e) = state.set_speed_mode(state.speed_mode.toggled()) {
            log::warn!("Speed mode toggle failed: {}", e);
        }
    }

    if input.start && state.phase != SimPhase::Running {
        state.phase = SimPhase::Running;
        log::info!("Simulation running");
    } else if input.pause {
        state.phase = match state.phase {
            SimPhase::Running => SimPhase::Paused,
            SimPhase::Paused => SimPhase::Running,
            SimPhase::Idle => SimPhase::Idle,
        };
    }

    if state.phase != SimPhase::Running {
        return;
    }

    state.time_ticks += 1;
    state.elapsed += dt;
    let time = state.elapsed;

    for track in &mut state.tracks {
        track.tick(time);
        // Removed at the start of the next tick
        track.flag_absorbed();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::settings::{Settings, SpeedMode};

    fn positions(state: &SimState) -> Vec<f32> {
        state
            .tracks
            .iter()
            .flat_map(|t| t.vehicles().iter().map(|v| v.position()))
            .collect()
    }

    fn started() -> SimState {
        let mut state = SimState::new(Settings::default()).unwrap();
        tick(
            &mut state,
            &TickInput {
                start: true,
                ..Default::default()
            },
            SIM_DT,
        );
        state
    }

    #[test]
    fn test_idle_does_not_advance() {
        let mut state = SimState::new(Settings::default()).unwrap();
        let before = positions(&state);
        for _ in 0..10 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.time_ticks, 0);
        assert_eq!(positions(&state), before);
    }

    #[test]
    fn test_start_advances_clock() {
        let mut state = started();
        for _ in 0..59 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(state.phase, SimPhase::Running);
        assert_eq!(state.time_ticks, 60);
        assert!((state.elapsed - 1.0).abs() < 1e-4);
        assert!(state.tracks.iter().all(|t| t.vehicles()[0].segments().len() > 1));
    }

    #[test]
    fn test_pause_freezes_everything() {
        let mut state = started();
        let pause = TickInput {
            pause: true,
            ..Default::default()
        };
        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, SimPhase::Paused);
        let frozen = positions(&state);
        let ticks = state.time_ticks;
        for _ in 0..20 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert_eq!(positions(&state), frozen);
        assert_eq!(state.time_ticks, ticks);

        tick(&mut state, &pause, SIM_DT);
        assert_eq!(state.phase, SimPhase::Running);
        assert_eq!(state.time_ticks, ticks + 1);
    }

    #[test]
    fn test_pause_ignored_while_idle() {
        let mut state = SimState::new(Settings::default()).unwrap();
        tick(
            &mut state,
            &TickInput {
                pause: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.phase, SimPhase::Idle);
    }

    #[test]
    fn test_road_switch_applies_while_paused() {
        let mut state = SimState::new(Settings::default()).unwrap();
        tick(
            &mut state,
            &TickInput {
                switch_road: Some(RoadKind::Spiral),
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.road, RoadKind::Spiral);
        assert_eq!(state.speed_mode, SpeedMode::Drift);
        assert_eq!(state.time_ticks, 0);
    }

    #[test]
    fn test_toggle_speed_mode() {
        let mut state = started();
        tick(
            &mut state,
            &TickInput {
                toggle_speed_mode: true,
                ..Default::default()
            },
            SIM_DT,
        );
        assert_eq!(state.speed_mode, SpeedMode::Drift);
        for _ in 0..5 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        for (track, ring) in state.tracks.iter().zip(&state.settings().tracks) {
            assert!(track.vehicles().iter().all(|v| v.velocity() <= ring.spiral_max_velocity));
        }
    }

    #[test]
    fn test_same_seed_same_run() {
        let run = || {
            let mut state = started();
            for _ in 0..300 {
                tick(&mut state, &TickInput::default(), SIM_DT);
            }
            positions(&state)
        };
        assert_eq!(run(), run());
    }

    #[test]
    fn test_spiral_drains_over_time() {
        let mut settings = Settings::default();
        settings.road = RoadKind::Spiral;
        for ring in &mut settings.tracks {
            // Five cells per tick cannot skip the six-cell absorption zone
            ring.cell_count = 3000;
            ring.vehicle_count = 4;
            ring.spacing = 900.0;
            ring.spiral_max_velocity = 5.0;
            ring.slowdown_probability = 0.0;
        }
        settings.footprint = 0;
        settings.accel_step = 1.0;
        let mut state = SimState::new(settings).unwrap();
        state.phase = SimPhase::Running;
        let start = state.vehicle_count();
        for _ in 0..200 {
            tick(&mut state, &TickInput::default(), SIM_DT);
        }
        assert!(state.vehicle_count() < start);
    }
}
