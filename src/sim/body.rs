//! Segment-follow body chain ("inchworm" trail)
//!
//! A vehicle's body is a chain of scalar positions in the same cell space as
//! its head. Segment 0 snaps to the head every tick; every other segment
//! chases its leader with a proportional controller on the spacing error:
//!
//! ```text
//! target = base_spacing + amplitude * sin(time * frequency - j * phase_step)
//! diff   = shortest arc from follower to leader
//! seg[j] += (diff - target) * spring_gain
//! ```
//!
//! The sine term travels down the chain and makes the body undulate. There is
//! no velocity state: each tick is a pure positional correction.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::track::Direction;
use crate::consts::{BODY_BASE_SPACING, BODY_RESET_FRACTION, BODY_SEGMENTS, BODY_SPRING_GAIN};
use crate::error::{SimError, SimResult};
use crate::road::Curve;
use crate::{shortest_arc, wrap_position};

/// Shape and dynamics of every body chain on a track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodyParams {
    /// Chain length including the head
    pub segment_count: usize,
    /// Resting spacing between neighbours, in cells
    pub base_spacing: f32,
    /// Peak deviation of the traveling wave, in cells
    pub amplitude: f32,
    /// Wave angular frequency (radians per second)
    pub frequency: f32,
    /// Wave phase lag per segment (radians)
    pub phase_step: f32,
    /// Proportional gain in (0, 1]
    pub spring_gain: f32,
    /// Backward head jump, as a fraction of the cell count, that resets the chain
    pub reset_fraction: f32,
}

impl Default for BodyParams {
    fn default() -> Self {
        Self {
            segment_count: BODY_SEGMENTS,
            base_spacing: BODY_BASE_SPACING,
            amplitude: 0.8,
            frequency: 4.0,
            phase_step: 0.6,
            spring_gain: BODY_SPRING_GAIN,
            reset_fraction: BODY_RESET_FRACTION,
        }
    }
}

impl BodyParams {
    pub fn validate(&self) -> SimResult<()> {
        if self.segment_count == 0 {
            return Err(SimError::EmptyBody);
        }
        if !(self.spring_gain > 0.0 && self.spring_gain <= 1.0) {
            return Err(SimError::InvalidStep {
                name: "spring_gain",
                value: self.spring_gain,
            });
        }
        // Jumps are measured along the shorter arc, so anything >= 0.5 could never trigger
        if !(self.reset_fraction > 0.0 && self.reset_fraction < 0.5) {
            return Err(SimError::InvalidStep {
                name: "reset_fraction",
                value: self.reset_fraction,
            });
        }
        if !(self.base_spacing >= 0.0 && self.base_spacing.is_finite()) {
            return Err(SimError::InvalidStep {
                name: "base_spacing",
                value: self.base_spacing,
            });
        }
        for (name, value) in [
            ("amplitude", self.amplitude),
            ("frequency", self.frequency),
            ("phase_step", self.phase_step),
        ] {
            if !value.is_finite() {
                return Err(SimError::InvalidStep { name, value });
            }
        }
        Ok(())
    }

    /// Target spacing between segment `j` and its leader at `time`
    #[inline]
    pub fn target_spacing(&self, j: usize, time: f32) -> f32 {
        self.base_spacing + self.amplitude * (time * self.frequency - j as f32 * self.phase_step).sin()
    }
}

/// Trailing positions behind one head (index 0 = head)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SegmentChain {
    segments: Vec<f32>,
}

impl SegmentChain {
    /// Chain laid out behind `head` at the resting spacing
    pub fn seeded(head: f32, params: &BodyParams, cell_count: usize) -> Self {
        let mut chain = Self::default();
        chain.seed(head, params, cell_count as f32);
        chain
    }

    #[inline]
    pub fn segments(&self) -> &[f32] {
        &self.segments
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Drop every segment; the next `follow` rebuilds the chain
    pub fn clear(&mut self) {
        self.segments.clear();
    }

    fn seed(&mut self, head: f32, params: &BodyParams, len: f32) {
        self.segments.clear();
        self.segments.extend(
            (0..params.segment_count).map(|i| wrap_position(head - i as f32 * params.base_spacing, len)),
        );
    }

    /// Advance every segment toward the freshly moved `head`.
    ///
    /// `time` is elapsed seconds shared by every vehicle.
    pub fn follow(&mut self, head: f32, time: f32, params: &BodyParams, cell_count: usize) {
        let len = cell_count as f32;

        if let Some(&previous) = self.segments.first() {
            let moved = shortest_arc(previous, head, len);
            if moved < -params.reset_fraction * len {
                log::debug!("Head jumped back {:.1} cells, resetting body", -moved);
                self.segments.clear();
            }
        }
        if self.segments.len() != params.segment_count {
            self.seed(head, params, len);
        }

        self.segments[0] = head;
        for j in 1..self.segments.len() {
            let leader = self.segments[j - 1];
            let follower = self.segments[j];
            let diff = shortest_arc(follower, leader, len);
            let error = diff - params.target_spacing(j, time);
            self.segments[j] = wrap_position(follower + error * params.spring_gain, len);
        }
    }

    /// Map every segment to world space through `curve`, replacing `out`.
    pub fn world_points<C: Curve + ?Sized>(
        &self,
        curve: &C,
        cell_count: usize,
        direction: Direction,
        out: &mut Vec<Vec2>,
    ) {
        let scale = direction.sign() * curve.total_length() / cell_count as f32;
        out.clear();
        out.extend(self.segments.iter().map(|&s| curve.point_at_distance(s * scale)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::road::{Bounds, CircleRoad};

    const CELLS: usize = 300;

    fn still_params() -> BodyParams {
        BodyParams {
            amplitude: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_spacing_uses_shortest_arc() {
        // Leader past the seam, follower before it: the follower chases forward 15 cells
        assert_eq!(shortest_arc(290.0, 5.0, CELLS as f32), 15.0);

        let params = BodyParams {
            segment_count: 2,
            base_spacing: 0.0,
            amplitude: 0.0,
            spring_gain: 1.0,
            ..Default::default()
        };
        let mut chain = SegmentChain {
            segments: vec![4.0, 290.0],
        };
        chain.follow(5.0, 0.0, &params, CELLS);
        // Full gain closes the whole 15-cell gap across the seam
        assert_eq!(chain.segments(), &[5.0, 5.0]);
    }

    #[test]
    fn test_head_snaps_and_chain_settles() {
        let params = still_params();
        let mut chain = SegmentChain::seeded(100.0, &params, CELLS);
        for tick in 0..400 {
            chain.follow(100.0 + tick as f32 * 0.5, tick as f32 / 60.0, &params, CELLS);
        }
        let segs = chain.segments();
        assert_eq!(segs[0], wrap_position(100.0 + 399.0 * 0.5, CELLS as f32));
        for pair in segs.windows(2) {
            let gap = shortest_arc(pair[1], pair[0], CELLS as f32);
            // Steady state lags the resting spacing by speed / gain
            assert!((gap - (params.base_spacing + 0.5 / params.spring_gain)).abs() < 0.05, "gap {gap}");
        }
    }

    #[test]
    fn test_segments_stay_in_range_across_seam() {
        let params = BodyParams::default();
        let mut chain = SegmentChain::seeded(290.0, &params, CELLS);
        let mut head = 290.0;
        for tick in 0..120 {
            head = wrap_position(head + 3.0, CELLS as f32);
            chain.follow(head, tick as f32 * 0.016, &params, CELLS);
            assert!(chain.segments().iter().all(|s| (0.0..CELLS as f32).contains(s)));
        }
    }

    #[test]
    fn test_backward_jump_resets_chain() {
        let params = still_params();
        let mut chain = SegmentChain::seeded(200.0, &params, CELLS);
        chain.follow(201.0, 0.0, &params, CELLS);
        let tail_before = *chain.segments().last().unwrap();
        assert!(tail_before > 150.0);

        // 200 -> 100 is a 100-cell backward jump, beyond 300 / 6
        chain.follow(100.0, 0.1, &params, CELLS);
        let expected_tail = 100.0 - (params.segment_count - 1) as f32 * params.base_spacing;
        let tail = *chain.segments().last().unwrap();
        // Reseeded behind the new head, then nudged once by the controller
        assert!((tail - expected_tail).abs() < 1.0, "tail {tail}");
    }

    #[test]
    fn test_wraparound_is_not_a_jump() {
        let params = still_params();
        let mut chain = SegmentChain::seeded(298.0, &params, CELLS);
        let before: Vec<f32> = chain.segments().to_vec();
        chain.follow(2.0, 0.0, &params, CELLS);
        // Tail moved a little, it was not re-seeded behind cell 2
        let tail = *chain.segments().last().unwrap();
        assert!((tail - before[before.len() - 1]).abs() < 2.0);
    }

    #[test]
    fn test_lazy_rebuild_after_clear() {
        let params = BodyParams::default();
        let mut chain = SegmentChain::seeded(10.0, &params, CELLS);
        chain.clear();
        assert!(chain.is_empty());
        chain.follow(50.0, 0.0, &params, CELLS);
        assert_eq!(chain.segments().len(), params.segment_count);
        assert_eq!(chain.segments()[0], 50.0);
    }

    #[test]
    fn test_world_points_follow_curve() {
        let road = CircleRoad::new(Bounds::around(Vec2::ZERO, 100.0));
        let params = still_params();
        let chain = SegmentChain::seeded(75.0, &params, CELLS);
        let mut out = Vec::new();

        chain.world_points(&road, CELLS, Direction::Forward, &mut out);
        assert_eq!(out.len(), params.segment_count);
        // A quarter of the cells is a quarter of the circle
        assert!((out[0] - Vec2::new(0.0, 100.0)).length() < 1e-2);
        assert!(out.iter().all(|p| (p.length() - 100.0).abs() < 1e-2));

        chain.world_points(&road, CELLS, Direction::Reverse, &mut out);
        assert!((out[0] - Vec2::new(0.0, -100.0)).length() < 1e-2);
    }

    #[test]
    fn test_params_validation() {
        assert!(BodyParams::default().validate().is_ok());
        let empty = BodyParams {
            segment_count: 0,
            ..Default::default()
        };
        assert!(matches!(empty.validate(), Err(SimError::EmptyBody)));
        let unstable = BodyParams {
            spring_gain: 1.5,
            ..Default::default()
        };
        assert!(unstable.validate().is_err());
        let never = BodyParams {
            reset_fraction: 0.6,
            ..Default::default()
        };
        assert!(never.validate().is_err());

        for wave in [
            BodyParams {
                amplitude: f32::NAN,
                ..Default::default()
            },
            BodyParams {
                frequency: f32::INFINITY,
                ..Default::default()
            },
            BodyParams {
                phase_step: f32::NAN,
                ..Default::default()
            },
        ] {
            assert!(matches!(wave.validate(), Err(SimError::InvalidStep { .. })));
        }
        // Zero amplitude (a still chain) is fine
        assert!(
            BodyParams {
                amplitude: 0.0,
                ..Default::default()
            }
            .validate()
            .is_ok()
        );
    }
}
