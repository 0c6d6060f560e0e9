//! Traffic agent: scalar NaSch state plus its body chain

use glam::{Vec2, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::body::{BodyParams, SegmentChain};
use super::grid::OccupancyGrid;
use super::nasch::NaSchPolicy;
use super::track::Direction;
use crate::error::{SimError, SimResult};
use crate::road::Curve;
use crate::wrap_position;

/// Stable per-track vehicle identifier (never reused)
pub type VehicleId = u32;

/// One vehicle on a track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vehicle {
    id: VehicleId,
    /// Head position in cells, `[0, cell_count)`
    position: f32,
    /// Cells per tick, `[0, max_velocity]`
    velocity: f32,
    /// RGB in 0-1
    color: Vec3,
    policy: NaSchPolicy,
    body: SegmentChain,
    /// Body chain in world space, refreshed every tick
    #[serde(skip)]
    body_points: Vec<Vec2>,
}

impl Vehicle {
    pub fn new(
        id: VehicleId,
        position: f32,
        velocity: f32,
        color: Vec3,
        policy: NaSchPolicy,
        cell_count: usize,
    ) -> SimResult<Self> {
        if !position.is_finite() {
            return Err(SimError::InvalidPosition(position));
        }
        policy.validate()?;
        Ok(Self {
            id,
            position: wrap_position(position, cell_count as f32),
            velocity: velocity.clamp(0.0, policy.max_velocity),
            color,
            policy,
            body: SegmentChain::default(),
            body_points: Vec::new(),
        })
    }

    #[inline]
    pub fn id(&self) -> VehicleId {
        self.id
    }

    #[inline]
    pub fn position(&self) -> f32 {
        self.position
    }

    #[inline]
    pub fn velocity(&self) -> f32 {
        self.velocity
    }

    #[inline]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    #[inline]
    pub fn policy(&self) -> &NaSchPolicy {
        &self.policy
    }

    /// Scalar body chain, head first
    #[inline]
    pub fn segments(&self) -> &[f32] {
        self.body.segments()
    }

    /// Body chain in world space, head first
    #[inline]
    pub fn body_world_points(&self) -> &[Vec2] {
        &self.body_points
    }

    /// New speed cap; the next accelerate step pulls an over-speed vehicle down to it
    pub fn set_max_velocity(&mut self, max_velocity: f32) -> SimResult<()> {
        if !(max_velocity >= 0.0 && max_velocity.is_finite()) {
            return Err(SimError::NegativeMaxVelocity(max_velocity));
        }
        self.policy.max_velocity = max_velocity;
        Ok(())
    }

    pub fn set_slowdown_probability(&mut self, p: f32) -> SimResult<()> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::SlowdownProbability(p));
        }
        self.policy.slowdown_probability = p;
        Ok(())
    }

    /// Run the NaSch rules once. `index` is this vehicle's slot in the grid.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        index: usize,
        cell_count: usize,
        grid: Option<&OccupancyGrid>,
        rng: &mut R,
    ) {
        self.policy.update(
            &mut self.position,
            &mut self.velocity,
            cell_count,
            grid,
            index,
            rng,
        );
    }

    /// Drag the body chain after the head and refresh its world points
    pub fn update_body<C: Curve + ?Sized>(
        &mut self,
        time: f32,
        params: &BodyParams,
        curve: &C,
        cell_count: usize,
        direction: Direction,
    ) {
        self.body.follow(self.position, time, params, cell_count);
        self.body
            .world_points(curve, cell_count, direction, &mut self.body_points);
    }

    /// Forget the body chain (curve or scale changed); rebuilt on the next update
    pub fn reset_body(&mut self) {
        self.body.clear();
        self.body_points.clear();
    }
}
