//! Perfect circle road

use glam::Vec2;
use std::f32::consts::TAU;

use super::{Bounds, Curve};
use crate::{polar_to_cartesian, wrap_position};

/// Circle inscribed in its bounds, travelled with increasing angle
#[derive(Debug, Clone)]
pub struct CircleRoad {
    pub center: Vec2,
    pub radius: f32,
}

impl CircleRoad {
    pub fn new(bounds: Bounds) -> Self {
        Self {
            center: bounds.center(),
            radius: bounds.size.x.min(bounds.size.y) / 2.0,
        }
    }

    fn angle_at(&self, dist: f32) -> f32 {
        let len = self.total_length();
        if len <= 0.0 {
            return 0.0;
        }
        wrap_position(dist, len) / len * TAU
    }
}

impl Curve for CircleRoad {
    fn total_length(&self) -> f32 {
        TAU * self.radius
    }

    fn point_at_distance(&self, dist: f32) -> Vec2 {
        polar_to_cartesian(self.center, self.radius, self.angle_at(dist))
    }

    fn tangent_at_distance(&self, dist: f32) -> Vec2 {
        let angle = self.angle_at(dist);
        Vec2::new(-angle.sin(), angle.cos())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::PI;

    #[test]
    fn test_circle_quarter_points() {
        let road = CircleRoad::new(Bounds::around(Vec2::new(100.0, 100.0), 50.0));
        assert!((road.total_length() - 100.0 * PI).abs() < 1e-3);

        let quarter = road.total_length() / 4.0;
        let p0 = road.point_at_distance(0.0);
        let p1 = road.point_at_distance(quarter);
        assert!((p0 - Vec2::new(150.0, 100.0)).length() < 1e-3);
        assert!((p1 - Vec2::new(100.0, 150.0)).length() < 1e-3);
    }

    #[test]
    fn test_circle_tangent_is_perpendicular_to_radius() {
        let road = CircleRoad::new(Bounds::new(0.0, 0.0, 300.0, 200.0));
        assert_eq!(road.radius, 100.0);
        for i in 0..8 {
            let d = road.total_length() * i as f32 / 8.0;
            let radial = road.point_at_distance(d) - road.center;
            let tangent = road.tangent_at_distance(d);
            assert!(radial.dot(tangent).abs() < 1e-2);
        }
    }
}
