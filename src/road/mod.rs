//! Road geometry
//!
//! A road maps a scalar arc-length distance onto the plane. The simulation
//! never looks at the shape itself, only at the [`Curve`] capability:
//! - `total_length`: length of one lap in world units
//! - `point_at_distance` / `tangent_at_distance`: wrap any real distance, including negatives
//! - `in_absorption_zone`: whether a vehicle at that distance should leave the simulation

pub mod circle;
pub mod noise;
pub mod oval;
pub mod polyline;
pub mod spiral;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::error::{SimError, SimResult};

pub use circle::CircleRoad;
pub use noise::NoiseRoad;
pub use oval::OvalRoad;
pub use polyline::Polyline;
pub use spiral::SpiralRoad;

/// Arc-length parametrised path
pub trait Curve {
    /// Length of one lap (> 0)
    fn total_length(&self) -> f32;

    /// World position at `dist` along the path
    fn point_at_distance(&self, dist: f32) -> Vec2;

    /// Unit direction of travel at `dist`
    fn tangent_at_distance(&self, dist: f32) -> Vec2;

    /// Vehicles reaching this stretch are removed from the simulation
    fn in_absorption_zone(&self, _dist: f32) -> bool {
        false
    }

    /// Whether the last point joins the first. Travel on an open curve always
    /// runs toward its end, and passing the end leaves the simulation.
    fn is_closed(&self) -> bool {
        true
    }
}

/// Tangent by forward difference, for tessellated curves
pub(crate) fn sampled_tangent<C: Curve + ?Sized>(curve: &C, dist: f32) -> Vec2 {
    let p1 = curve.point_at_distance(dist);
    let p2 = curve.point_at_distance(dist + 1.0);
    (p2 - p1).normalize_or_zero()
}

/// Axis-aligned rectangle a road is fitted into
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Bounds {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(width, height),
        }
    }

    /// Square bounds of side `2 * radius` around `center`
    pub fn around(center: Vec2, radius: f32) -> Self {
        Self {
            origin: center - Vec2::splat(radius),
            size: Vec2::splat(radius * 2.0),
        }
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.origin + self.size / 2.0
    }

    /// Same center, both sides multiplied by `factor` (concentric rings)
    pub fn scaled(&self, factor: f32) -> Self {
        let size = self.size * factor;
        Self {
            origin: self.center() - size / 2.0,
            size,
        }
    }
}

/// Road variants selectable at runtime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoadKind {
    #[default]
    Circle,
    Oval,
    Noise,
    Spiral,
}

impl RoadKind {
    pub const ALL: [RoadKind; 4] = [
        RoadKind::Circle,
        RoadKind::Oval,
        RoadKind::Noise,
        RoadKind::Spiral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RoadKind::Circle => "circle",
            RoadKind::Oval => "oval",
            RoadKind::Noise => "noise",
            RoadKind::Spiral => "spiral",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "circle" => Some(RoadKind::Circle),
            "oval" | "curved" => Some(RoadKind::Oval),
            "noise" | "perlin" => Some(RoadKind::Noise),
            "spiral" => Some(RoadKind::Spiral),
            _ => None,
        }
    }

    /// Next variant in cycling order
    pub fn next(&self) -> Self {
        match self {
            RoadKind::Circle => RoadKind::Oval,
            RoadKind::Oval => RoadKind::Noise,
            RoadKind::Noise => RoadKind::Spiral,
            RoadKind::Spiral => RoadKind::Circle,
        }
    }
}

/// Any of the road variants
#[derive(Debug, Clone)]
pub enum Road {
    Circle(CircleRoad),
    Oval(OvalRoad),
    Noise(NoiseRoad),
    Spiral(SpiralRoad),
}

impl Road {
    /// Build a road of `kind` fitted into `bounds`, rejecting degenerate shapes.
    ///
    /// `seed` only affects the noise road.
    pub fn generate(kind: RoadKind, bounds: Bounds, seed: u32) -> SimResult<Self> {
        let road = match kind {
            RoadKind::Circle => Road::Circle(CircleRoad::new(bounds)),
            RoadKind::Oval => Road::Oval(OvalRoad::new(bounds)),
            RoadKind::Noise => Road::Noise(NoiseRoad::new(bounds, seed)),
            RoadKind::Spiral => Road::Spiral(SpiralRoad::new(bounds)),
        };
        let len = road.total_length();
        if !(len.is_finite() && len > 0.0) {
            return Err(SimError::DegenerateCurve(len));
        }
        // Bounds thinner than the margin leave a negative corner radius
        if let Road::Oval(oval) = &road {
            if oval.radius <= 0.0 {
                return Err(SimError::DegenerateCurve(oval.radius));
            }
        }
        log::debug!("Generated {} road, length {:.1}", kind.as_str(), len);
        Ok(road)
    }

    pub fn kind(&self) -> RoadKind {
        match self {
            Road::Circle(_) => RoadKind::Circle,
            Road::Oval(_) => RoadKind::Oval,
            Road::Noise(_) => RoadKind::Noise,
            Road::Spiral(_) => RoadKind::Spiral,
        }
    }

    fn as_curve(&self) -> &dyn Curve {
        match self {
            Road::Circle(r) => r,
            Road::Oval(r) => r,
            Road::Noise(r) => r,
            Road::Spiral(r) => r,
        }
    }
}

impl Curve for Road {
    fn total_length(&self) -> f32 {
        self.as_curve().total_length()
    }

    fn point_at_distance(&self, dist: f32) -> Vec2 {
        self.as_curve().point_at_distance(dist)
    }

    fn tangent_at_distance(&self, dist: f32) -> Vec2 {
        self.as_curve().tangent_at_distance(dist)
    }

    fn in_absorption_zone(&self, dist: f32) -> bool {
        self.as_curve().in_absorption_zone(dist)
    }

    fn is_closed(&self) -> bool {
        self.as_curve().is_closed()
    }
}
