//! Track orchestrator: one closed loop, its grid, and its vehicles
//!
//! Per-tick pipeline, strictly ordered:
//! 1. Flush removals requested since the last tick (descending index)
//! 2. Reset the occupancy grid and repopulate it from vehicle positions
//! 3. Lend the grid to every vehicle for this tick only
//! 4. For each vehicle: NaSch update, then body follow and world points

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::body::BodyParams;
use super::grid::OccupancyGrid;
use super::nasch::NaSchPolicy;
use super::vehicle::{Vehicle, VehicleId};
use crate::error::{SimError, SimResult};
use crate::road::{Curve, Road};

/// Which way along the curve increasing cell positions travel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    #[default]
    Forward,
    Reverse,
}

impl Direction {
    #[inline]
    pub fn sign(self) -> f32 {
        match self {
            Direction::Forward => 1.0,
            Direction::Reverse => -1.0,
        }
    }
}

/// Aggregate traffic measures for one track
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct TrackStats {
    pub vehicles: usize,
    pub mean_velocity: f32,
    /// Vehicles with zero velocity (jammed)
    pub stopped: usize,
    /// Vehicles passing a fixed cell per tick (density * mean velocity)
    pub flow: f32,
}

/// Serializable view of a track for dumps
#[derive(Debug, Serialize)]
pub struct TrackSnapshot<'a> {
    pub cell_count: usize,
    pub direction: Direction,
    pub curve_length: f32,
    pub stats: TrackStats,
    pub vehicles: &'a [Vehicle],
}

/// One closed simulation loop
#[derive(Debug, Clone)]
pub struct Track<C = Road> {
    cell_count: usize,
    curve: C,
    grid: OccupancyGrid,
    vehicles: Vec<Vehicle>,
    /// Template for newly spawned vehicles; track-wide setters update it too
    policy: NaSchPolicy,
    body: BodyParams,
    direction: Direction,
    rng: Pcg32,
    pending_removals: Vec<VehicleId>,
    /// Vehicles that ran past the end of an open curve during the last tick
    passed_end: Vec<VehicleId>,
    next_id: VehicleId,
}

impl<C: Curve> Track<C> {
    pub fn new(
        cell_count: usize,
        curve: C,
        policy: NaSchPolicy,
        body: BodyParams,
        direction: Direction,
        seed: u64,
    ) -> SimResult<Self> {
        if cell_count == 0 {
            return Err(SimError::ZeroCells);
        }
        check_curve(&curve)?;
        policy.validate()?;
        body.validate()?;

        Ok(Self {
            cell_count,
            curve,
            grid: OccupancyGrid::new(cell_count),
            vehicles: Vec::new(),
            policy,
            body,
            direction,
            rng: Pcg32::seed_from_u64(seed),
            pending_removals: Vec::new(),
            passed_end: Vec::new(),
            next_id: 1,
        })
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cell_count
    }

    #[inline]
    pub fn curve(&self) -> &C {
        &self.curve
    }

    #[inline]
    pub fn grid(&self) -> &OccupancyGrid {
        &self.grid
    }

    /// Vehicles in spawn order (the order the grid indexes)
    #[inline]
    pub fn vehicles(&self) -> &[Vehicle] {
        &self.vehicles
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        self.direction
    }

    #[inline]
    pub fn policy(&self) -> &NaSchPolicy {
        &self.policy
    }

    #[inline]
    pub fn body_params(&self) -> &BodyParams {
        &self.body
    }

    pub fn vehicle(&self, id: VehicleId) -> Option<&Vehicle> {
        self.vehicles.iter().find(|v| v.id() == id)
    }

    /// Add a vehicle with the track's current policy
    pub fn spawn(&mut self, position: f32, velocity: f32, color: Vec3) -> SimResult<VehicleId> {
        let id = self.next_id;
        let vehicle = Vehicle::new(id, position, velocity, color, self.policy, self.cell_count)?;
        self.next_id += 1;
        self.vehicles.push(vehicle);
        Ok(id)
    }

    /// Spawn `count` vehicles `spacing` cells apart with random speed and color
    pub fn populate_evenly(&mut self, count: usize, spacing: f32) -> SimResult<()> {
        if count as f32 * spacing > self.cell_count as f32 {
            log::warn!(
                "{} vehicles at spacing {} overflow a {}-cell track; positions will wrap",
                count,
                spacing,
                self.cell_count
            );
        }
        for i in 0..count {
            let velocity = self.rng.random_range(0.0..=self.policy.max_velocity);
            let color = Vec3::new(self.rng.random(), self.rng.random(), self.rng.random());
            self.spawn(i as f32 * spacing, velocity, color)?;
        }
        Ok(())
    }

    /// Schedule removal at the start of the next tick
    pub fn request_removal(&mut self, id: VehicleId) {
        if !self.pending_removals.contains(&id) {
            self.pending_removals.push(id);
        }
    }

    /// Schedule removal of the vehicle currently at `index`
    pub fn request_removal_at(&mut self, index: usize) -> Option<VehicleId> {
        let id = self.vehicles.get(index)?.id();
        self.request_removal(id);
        Some(id)
    }

    #[inline]
    pub fn pending_removals(&self) -> &[VehicleId] {
        &self.pending_removals
    }

    /// Remove every pending vehicle, highest index first so earlier indices stay valid
    fn flush_removals(&mut self) -> usize {
        if self.pending_removals.is_empty() {
            return 0;
        }
        let mut indices: Vec<usize> = self
            .pending_removals
            .drain(..)
            .filter_map(|id| self.vehicles.iter().position(|v| v.id() == id))
            .collect();
        indices.sort_unstable_by(|a, b| b.cmp(a));
        indices.dedup();
        for &index in &indices {
            self.vehicles.remove(index);
        }
        log::debug!("Removed {} vehicles, {} remain", indices.len(), self.vehicles.len());
        indices.len()
    }

    /// Change every vehicle's speed cap (e.g. a speed-mode switch)
    pub fn set_max_velocity(&mut self, max_velocity: f32) -> SimResult<()> {
        if !(max_velocity >= 0.0 && max_velocity.is_finite()) {
            return Err(SimError::NegativeMaxVelocity(max_velocity));
        }
        self.policy.max_velocity = max_velocity;
        for vehicle in &mut self.vehicles {
            vehicle.set_max_velocity(max_velocity)?;
        }
        Ok(())
    }

    pub fn set_slowdown_probability(&mut self, p: f32) -> SimResult<()> {
        if !(0.0..=1.0).contains(&p) {
            return Err(SimError::SlowdownProbability(p));
        }
        self.policy.slowdown_probability = p;
        for vehicle in &mut self.vehicles {
            vehicle.set_slowdown_probability(p)?;
        }
        Ok(())
    }

    /// Swap the curve (road switch). Body chains restart since the world scale changed.
    pub fn set_road(&mut self, curve: C) -> SimResult<()> {
        check_curve(&curve)?;
        self.curve = curve;
        for vehicle in &mut self.vehicles {
            vehicle.reset_body();
        }
        Ok(())
    }

    /// Advance one tick. `time` is elapsed seconds and drives the body wave.
    pub fn tick(&mut self, time: f32) {
        self.flush_removals();

        self.grid.reset();
        self.grid.populate(self.vehicles.iter().map(Vehicle::position));

        self.passed_end.clear();
        let open = !self.curve.is_closed();
        let direction = self.travel_direction();
        let len = self.cell_count as f32;

        let grid = Some(&self.grid);
        for (index, vehicle) in self.vehicles.iter_mut().enumerate() {
            let before = vehicle.position();
            vehicle.step(index, self.cell_count, grid, &mut self.rng);
            // A fast vehicle can hop over the absorption zone and wrap to the start
            if open && before + vehicle.velocity() >= len {
                self.passed_end.push(vehicle.id());
            }
            vehicle.update_body(time, &self.body, &self.curve, self.cell_count, direction);
        }
    }

    /// Request removal of every vehicle whose head sits in the curve's absorption
    /// zone, or that ran past the end of an open curve on the last tick.
    ///
    /// Returns how many were newly flagged.
    pub fn flag_absorbed(&mut self) -> usize {
        let absorbed: Vec<VehicleId> = self
            .vehicles
            .iter()
            .filter(|v| {
                self.passed_end.contains(&v.id())
                    || self.curve.in_absorption_zone(self.cell_to_distance(v.position()))
            })
            .map(Vehicle::id)
            .filter(|id| !self.pending_removals.contains(id))
            .collect();
        let count = absorbed.len();
        self.pending_removals.extend(absorbed);
        count
    }

    /// Direction actually driven: open curves always run toward their end
    #[inline]
    pub fn travel_direction(&self) -> Direction {
        if self.curve.is_closed() {
            self.direction
        } else {
            Direction::Forward
        }
    }

    /// Signed arc-length distance for a cell-space position
    #[inline]
    pub fn cell_to_distance(&self, cells: f32) -> f32 {
        self.travel_direction().sign() * cells * self.curve.total_length() / self.cell_count as f32
    }

    /// World position and unit heading of the vehicle at `index`
    pub fn head_pose(&self, index: usize) -> Option<(Vec2, Vec2)> {
        let vehicle = self.vehicles.get(index)?;
        let dist = self.cell_to_distance(vehicle.position());
        let heading = self.curve.tangent_at_distance(dist) * self.travel_direction().sign();
        Some((self.curve.point_at_distance(dist), heading))
    }

    pub fn stats(&self) -> TrackStats {
        let vehicles = self.vehicles.len();
        if vehicles == 0 {
            return TrackStats::default();
        }
        let total: f32 = self.vehicles.iter().map(Vehicle::velocity).sum();
        TrackStats {
            vehicles,
            mean_velocity: total / vehicles as f32,
            stopped: self.vehicles.iter().filter(|v| v.velocity() == 0.0).count(),
            flow: total / self.cell_count as f32,
        }
    }

    pub fn snapshot(&self) -> TrackSnapshot<'_> {
        TrackSnapshot {
            cell_count: self.cell_count,
            direction: self.direction,
            curve_length: self.curve.total_length(),
            stats: self.stats(),
            vehicles: &self.vehicles,
        }
    }
}

fn check_curve<C: Curve>(curve: &C) -> SimResult<()> {
    let len = curve.total_length();
    if !(len.is_finite() && len > 0.0) {
        return Err(SimError::DegenerateCurve(len));
    }
    Ok(())
}
