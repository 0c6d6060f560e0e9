//! Nagel-Schreckenberg motion rules
//!
//! One update per vehicle per tick, always in this order:
//! 1. Accelerate: `v = min(v + accel_step, max_velocity)`
//! 2. Brake: first occupied cell `j` ahead (within `ceil(v) + footprint`)
//!    caps `v` at `j - 1 - footprint`
//! 3. Randomize: with probability `p`, `v = max(v - slowdown_step, 0)`
//! 4. Move: `pos = (pos + v) mod cell_count`
//!
//! With `footprint = 0` this is the classic single-lane NaSch automaton; a
//! positive footprint keeps rendered car bodies from overlapping.

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::grid::OccupancyGrid;
use crate::error::{SimError, SimResult};
use crate::wrap_position;

/// Per-vehicle NaSch parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NaSchPolicy {
    /// Speed cap in cells per tick
    pub max_velocity: f32,
    /// Chance per tick of an extra deceleration
    pub slowdown_probability: f32,
    /// Velocity gained per tick while unobstructed
    pub accel_step: f32,
    /// Velocity lost on a random slowdown
    pub slowdown_step: f32,
    /// Extra cells kept free behind an obstacle
    pub footprint: u32,
}

impl Default for NaSchPolicy {
    fn default() -> Self {
        Self {
            max_velocity: 5.0,
            slowdown_probability: 0.2,
            accel_step: 1.0,
            slowdown_step: 1.0,
            footprint: 0,
        }
    }
}

impl NaSchPolicy {
    pub fn validate(&self) -> SimResult<()> {
        if !(self.max_velocity >= 0.0 && self.max_velocity.is_finite()) {
            return Err(SimError::NegativeMaxVelocity(self.max_velocity));
        }
        if !(0.0..=1.0).contains(&self.slowdown_probability) {
            return Err(SimError::SlowdownProbability(self.slowdown_probability));
        }
        for (name, value) in [
            ("accel_step", self.accel_step),
            ("slowdown_step", self.slowdown_step),
        ] {
            if !(value > 0.0 && value.is_finite()) {
                return Err(SimError::InvalidStep { name, value });
            }
        }
        Ok(())
    }

    /// Rule 1
    #[inline]
    pub fn accelerate(&self, velocity: f32) -> f32 {
        (velocity + self.accel_step).min(self.max_velocity)
    }

    /// Rule 2. Without a grid nothing is visible ahead and `velocity` is returned unchanged.
    ///
    /// `own_index` is skipped so a lookahead that wraps the whole track never
    /// sees the vehicle itself.
    pub fn brake(
        &self,
        position: f32,
        velocity: f32,
        grid: Option<&OccupancyGrid>,
        own_index: usize,
    ) -> f32 {
        let Some(grid) = grid else {
            return velocity;
        };
        let len = grid.len();
        if len == 0 {
            return velocity;
        }

        let footprint = self.footprint as usize;
        // Clamp before adding so huge velocities cannot overflow
        let reach = velocity.max(0.0).ceil().min(len as f32) as usize;
        let look_ahead = reach.saturating_add(footprint).min(len - 1);
        let base = (position.floor() as i64).rem_euclid(len as i64) as usize;

        for j in 1..=look_ahead {
            let cell = (base + j) % len;
            match grid.query(cell) {
                Some(occupant) if occupant != own_index => {
                    let gap = (j - 1).saturating_sub(footprint) as f32;
                    return velocity.min(gap);
                }
                _ => {}
            }
        }
        velocity
    }

    /// Rule 3
    #[inline]
    pub fn randomize<R: Rng + ?Sized>(&self, velocity: f32, rng: &mut R) -> f32 {
        if velocity > 0.0 && rng.random::<f32>() < self.slowdown_probability {
            (velocity - self.slowdown_step).max(0.0)
        } else {
            velocity
        }
    }

    /// Rule 4
    #[inline]
    pub fn advance(position: f32, velocity: f32, cell_count: usize) -> f32 {
        wrap_position(position + velocity, cell_count as f32)
    }

    /// Run all four rules on one vehicle's `(position, velocity)`.
    pub fn update<R: Rng + ?Sized>(
        &self,
        position: &mut f32,
        velocity: &mut f32,
        cell_count: usize,
        grid: Option<&OccupancyGrid>,
        own_index: usize,
        rng: &mut R,
    ) {
        let mut v = self.accelerate(*velocity);
        v = self.brake(*position, v, grid, own_index);
        v = self.randomize(v, rng);
        *velocity = v;
        *position = Self::advance(*position, v, cell_count);
    }
}
