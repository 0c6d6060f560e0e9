//! Spiral road with a black-hole gap at the center
//!
//! Vehicles orbit the outer edge a few times, then spiral inward toward the
//! gap radius. The innermost stretch is an absorption zone: vehicles that
//! reach it disappear from the simulation.

use glam::Vec2;
use std::f32::consts::TAU;

use super::{Bounds, Curve, Polyline, sampled_tangent};
use crate::{polar_to_cartesian, wrap_position};

/// Circular laps at the outer radius before spiralling in
const ORBIT_ROTATIONS: u32 = 3;
/// Laps taken while spiralling from the outer radius to the gap
const SPIRAL_LOOPS: u32 = 4;
/// Tessellation density
const POINTS_PER_ROTATION: u32 = 90;
/// Gap radius as a fraction of the outer radius
const GAP_FRACTION: f32 = 0.15;
/// Absorption begins slightly outside the gap itself
const ABSORB_MARGIN: f32 = 1.1;

#[derive(Debug, Clone)]
pub struct SpiralRoad {
    pub center: Vec2,
    pub outer_radius: f32,
    pub gap_radius: f32,
    path: Polyline,
}

impl SpiralRoad {
    pub fn new(bounds: Bounds) -> Self {
        let center = bounds.center();
        let outer_radius = bounds.size.x.min(bounds.size.y) / 2.0;
        let gap_radius = outer_radius * GAP_FRACTION;

        let orbit_points = ORBIT_ROTATIONS * POINTS_PER_ROTATION;
        let spiral_points = SPIRAL_LOOPS * POINTS_PER_ROTATION;
        let mut points = Vec::with_capacity((orbit_points + spiral_points + 1) as usize);

        for i in 0..orbit_points {
            let angle = i as f32 / POINTS_PER_ROTATION as f32 * TAU;
            points.push(polar_to_cartesian(center, outer_radius, angle));
        }

        let start_angle = ORBIT_ROTATIONS as f32 * TAU;
        for i in 0..=spiral_points {
            let progress = i as f32 / spiral_points as f32;
            let r = outer_radius - (outer_radius - gap_radius) * progress;
            let angle = start_angle + progress * SPIRAL_LOOPS as f32 * TAU;
            points.push(polar_to_cartesian(center, r, angle));
        }

        Self {
            center,
            outer_radius,
            gap_radius,
            path: Polyline::new(points, false),
        }
    }

    pub fn path(&self) -> &Polyline {
        &self.path
    }
}

impl Curve for SpiralRoad {
    fn total_length(&self) -> f32 {
        self.path.length()
    }

    fn point_at_distance(&self, dist: f32) -> Vec2 {
        self.path.point_at_length(dist)
    }

    fn tangent_at_distance(&self, dist: f32) -> Vec2 {
        sampled_tangent(self, dist)
    }

    fn in_absorption_zone(&self, dist: f32) -> bool {
        let len = self.total_length();
        if len <= 0.0 {
            return false;
        }
        let p = self.point_at_distance(wrap_position(dist, len));
        (p - self.center).length() <= self.gap_radius * ABSORB_MARGIN
    }

    fn is_closed(&self) -> bool {
        false
    }
}
