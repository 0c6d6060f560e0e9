//! Arc-length lookup over a tessellated path

use glam::Vec2;

use crate::wrap_position;

/// A chain of vertices with cumulative segment lengths.
///
/// `cumulative[i]` is the distance from the first vertex to vertex `i`. A
/// closed polyline has one extra entry for the segment back to the start.
#[derive(Debug, Clone, Default)]
pub struct Polyline {
    points: Vec<Vec2>,
    cumulative: Vec<f32>,
    closed: bool,
}

impl Polyline {
    pub fn new(points: Vec<Vec2>, closed: bool) -> Self {
        let mut cumulative = Vec::with_capacity(points.len() + 1);
        let mut total = 0.0;
        cumulative.push(0.0);
        for pair in points.windows(2) {
            total += (pair[1] - pair[0]).length();
            cumulative.push(total);
        }
        if closed && points.len() > 1 {
            total += (points[0] - points[points.len() - 1]).length();
            cumulative.push(total);
        }
        Self {
            points,
            cumulative,
            closed,
        }
    }

    #[inline]
    pub fn points(&self) -> &[Vec2] {
        &self.points
    }

    #[inline]
    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Total length (perimeter when closed)
    #[inline]
    pub fn length(&self) -> f32 {
        self.cumulative.last().copied().unwrap_or(0.0)
    }

    fn vertex(&self, i: usize) -> Vec2 {
        // index == len only occurs on the closing segment
        self.points[i % self.points.len()]
    }

    /// Point at arc length `dist`, wrapping modulo the total length
    pub fn point_at_length(&self, dist: f32) -> Vec2 {
        match self.points.len() {
            0 => return Vec2::ZERO,
            1 => return self.points[0],
            _ => {}
        }
        let total = self.length();
        if total <= 0.0 {
            return self.points[0];
        }
        let dist = wrap_position(dist, total);

        // First vertex strictly beyond `dist`; the segment ends there
        let end = self
            .cumulative
            .partition_point(|&c| c <= dist)
            .clamp(1, self.cumulative.len() - 1);
        let start = end - 1;
        let seg_len = self.cumulative[end] - self.cumulative[start];
        let t = if seg_len > 0.0 {
            (dist - self.cumulative[start]) / seg_len
        } else {
            0.0
        };
        self.vertex(start).lerp(self.vertex(end), t)
    }
}
