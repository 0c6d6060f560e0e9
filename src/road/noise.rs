//! Organic loop: a circle whose radius is deformed by layered Perlin noise
//!
//! The noise is static (sampled once at generation). Sampling happens on the
//! unit circle rather than along the raw angle, so the first and last vertex
//! agree and the loop closes without a seam.

use glam::Vec2;
use ::noise::{NoiseFn, Perlin};
use std::f32::consts::TAU;

use super::{Bounds, Curve, Polyline, sampled_tangent};
use crate::polar_to_cartesian;

/// Vertices around the loop (one per degree)
const NUM_POINTS: usize = 360;
/// Noise frequency along the loop
const NOISE_SCALE: f64 = 1.5;
/// Radius variation as a fraction of the base radius
const DEFORM_AMOUNT: f32 = 0.3;
/// (frequency multiplier, weight) per octave
const OCTAVES: [(f64, f64); 3] = [(1.0, 0.5), (2.0, 0.3), (4.0, 0.2)];

#[derive(Debug, Clone)]
pub struct NoiseRoad {
    pub center: Vec2,
    pub base_radius: f32,
    path: Polyline,
}

impl NoiseRoad {
    pub fn new(bounds: Bounds, seed: u32) -> Self {
        let center = bounds.center();
        let base_radius = bounds.size.x.min(bounds.size.y) / 2.0;
        let perlin = Perlin::new(seed);

        let points = (0..NUM_POINTS)
            .map(|i| {
                let angle = i as f32 / NUM_POINTS as f32 * TAU;
                let n = layered_noise(&perlin, angle);
                let radius = base_radius * (1.0 + n * DEFORM_AMOUNT);
                polar_to_cartesian(center, radius, angle)
            })
            .collect();

        Self {
            center,
            base_radius,
            path: Polyline::new(points, true),
        }
    }

    pub fn path(&self) -> &Polyline {
        &self.path
    }
}

/// Weighted octave sum mapped to roughly [-1, 1]
fn layered_noise(perlin: &Perlin, angle: f32) -> f32 {
    let (x, y) = (angle.cos() as f64, angle.sin() as f64);
    let n: f64 = OCTAVES
        .iter()
        .enumerate()
        .map(|(octave, &(freq, weight))| {
            let s = NOISE_SCALE * freq;
            // Perlin output is roughly [-1, 1]; remap to [0, 1] before weighting
            let v = perlin.get([x * s, y * s, octave as f64]);
            (v * 0.5 + 0.5) * weight
        })
        .sum();
    (n * 2.0 - 1.0).clamp(-1.0, 1.0) as f32
}

impl Curve for NoiseRoad {
    fn total_length(&self) -> f32 {
        self.path.length()
    }

    fn point_at_distance(&self, dist: f32) -> Vec2 {
        self.path.point_at_length(dist)
    }

    fn tangent_at_distance(&self, dist: f32) -> Vec2 {
        sampled_tangent(self, dist)
    }
}
