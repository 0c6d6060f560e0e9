//! Rounded-rectangle ("stadium") road
//!
//! Layout, travelled clockwise on screen (y down) from the top-left:
//! top straight -> right half-circle -> bottom straight -> left half-circle.

use glam::Vec2;
use std::f32::consts::{FRAC_PI_2, PI};

use super::{Bounds, Curve};
use crate::consts::OVAL_MARGIN;
use crate::{polar_to_cartesian, wrap_position};

#[derive(Debug, Clone)]
pub struct OvalRoad {
    pub center: Vec2,
    /// Corner radius (half the inner height)
    pub radius: f32,
    /// Half length of each straight
    pub half_straight: f32,
}

impl OvalRoad {
    pub fn new(bounds: Bounds) -> Self {
        let inner = bounds.size - Vec2::splat(2.0 * OVAL_MARGIN);
        let radius = inner.y / 2.0;
        Self {
            center: bounds.center(),
            radius,
            half_straight: (inner.x / 2.0 - radius).max(0.0),
        }
    }

    #[inline]
    fn straight_len(&self) -> f32 {
        2.0 * self.half_straight
    }

    #[inline]
    fn arc_len(&self) -> f32 {
        PI * self.radius
    }

    /// Position and unit tangent at a wrapped distance
    fn sample(&self, dist: f32) -> (Vec2, Vec2) {
        let c = self.center;
        let r = self.radius;
        let s = self.half_straight;
        let straight = self.straight_len();
        let arc = self.arc_len();
        let total = self.total_length();
        if total <= 0.0 {
            return (c, Vec2::X);
        }
        let mut d = wrap_position(dist, total);

        if d < straight {
            return (Vec2::new(c.x - s + d, c.y - r), Vec2::X);
        }
        d -= straight;

        if d < arc {
            // Right cap, from the top (-90 degrees) sweeping to the bottom (+90)
            let theta = -FRAC_PI_2 + d / r;
            let pos = polar_to_cartesian(Vec2::new(c.x + s, c.y), r, theta);
            return (pos, Vec2::new(-theta.sin(), theta.cos()));
        }
        d -= arc;

        if d < straight {
            return (Vec2::new(c.x + s - d, c.y + r), Vec2::NEG_X);
        }
        d -= straight;

        // Left cap, from the bottom (90 degrees) sweeping to the top (270)
        let theta = FRAC_PI_2 + d / r;
        let pos = polar_to_cartesian(Vec2::new(c.x - s, c.y), r, theta);
        (pos, Vec2::new(-theta.sin(), theta.cos()))
    }
}

impl Curve for OvalRoad {
    fn total_length(&self) -> f32 {
        2.0 * self.straight_len() + 2.0 * self.arc_len()
    }

    fn point_at_distance(&self, dist: f32) -> Vec2 {
        self.sample(dist).0
    }

    fn tangent_at_distance(&self, dist: f32) -> Vec2 {
        self.sample(dist).1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn oval() -> OvalRoad {
        // Inner area 400 x 200 -> radius 100, straights 200 long
        OvalRoad::new(Bounds::new(0.0, 0.0, 440.0, 240.0))
    }

    #[test]
    fn test_oval_dimensions() {
        let road = oval();
        assert_eq!(road.radius, 100.0);
        assert_eq!(road.half_straight, 100.0);
        assert!((road.total_length() - (400.0 + 200.0 * PI)).abs() < 1e-3);
    }

    #[test]
    fn test_oval_is_continuous() {
        let road = oval();
        let len = road.total_length();
        let steps = 400;
        let step = len / steps as f32;
        for i in 0..steps {
            let a = road.point_at_distance(i as f32 * step);
            let b = road.point_at_distance((i + 1) as f32 * step);
            assert!((b - a).length() <= step + 1e-2, "gap at step {i}");
        }
    }

    #[test]
    fn test_oval_starts_top_left_heading_right() {
        let road = oval();
        assert_eq!(road.point_at_distance(0.0), Vec2::new(120.0, 20.0));
        assert_eq!(road.tangent_at_distance(10.0), Vec2::X);
        // Bottom straight heads back left
        let bottom = 200.0 + 100.0 * PI + 50.0;
        assert_eq!(road.tangent_at_distance(bottom), Vec2::NEG_X);
    }

    #[test]
    fn test_narrow_bounds_collapse_straights() {
        let road = OvalRoad::new(Bounds::new(0.0, 0.0, 140.0, 240.0));
        assert_eq!(road.half_straight, 0.0);
        assert!((road.total_length() - 200.0 * PI).abs() < 1e-3);
    }
}
