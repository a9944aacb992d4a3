//! Map-based heading resolution.
//!
//! Neither sensor reports a usable per-object heading, so converted
//! obstacles take the heading of the lane nearest to them.  The lookup sits
//! behind the [`HeadingResolver`] trait; [`LaneMap`] is a straight-segment
//! implementation suitable for replay and tests.

use l3p_types::Point3;
use serde::{Deserialize, Serialize};

/// Resolve the heading (radians) an obstacle at `position` should take.
pub trait HeadingResolver: Send + Sync {
    fn resolve_heading(&self, position: &Point3) -> f64;
}

/// Always returns the same heading.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FixedHeading(pub f64);

impl HeadingResolver for FixedHeading {
    fn resolve_heading(&self, _position: &Point3) -> f64 {
        self.0
    }
}

/// A straight lane piece, directed from `start` to `end` (world x, y).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LaneSegment {
    pub start: [f64; 2],
    pub end: [f64; 2],
}

impl LaneSegment {
    pub fn heading(&self) -> f64 {
        (self.end[1] - self.start[1]).atan2(self.end[0] - self.start[0])
    }

    /// Squared planar distance from `(x, y)` to the closest point on the
    /// segment.
    fn distance_sq(&self, x: f64, y: f64) -> f64 {
        let (dx, dy) = (self.end[0] - self.start[0], self.end[1] - self.start[1]);
        let len_sq = dx * dx + dy * dy;
        let t = if len_sq > 0.0 {
            (((x - self.start[0]) * dx + (y - self.start[1]) * dy) / len_sq).clamp(0.0, 1.0)
        } else {
            0.0
        };
        let (px, py) = (self.start[0] + t * dx, self.start[1] + t * dy);
        (x - px).powi(2) + (y - py).powi(2)
    }
}

/// Nearest-lane lookup over a list of straight segments.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LaneMap {
    #[serde(default)]
    pub lanes: Vec<LaneSegment>,
    /// Heading returned when the map holds no lanes.
    #[serde(default)]
    pub fallback_heading: f64,
}

impl LaneMap {
    pub fn new(lanes: Vec<LaneSegment>) -> Self {
        Self {
            lanes,
            fallback_heading: 0.0,
        }
    }

    /// The segment closest to `position`, ignoring height.
    pub fn nearest(&self, position: &Point3) -> Option<&LaneSegment> {
        self.lanes.iter().min_by(|a, b| {
            a.distance_sq(position.x, position.y)
                .total_cmp(&b.distance_sq(position.x, position.y))
        })
    }
}

impl HeadingResolver for LaneMap {
    fn resolve_heading(&self, position: &Point3) -> f64 {
        self.nearest(position)
            .map(LaneSegment::heading)
            .unwrap_or(self.fallback_heading)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    fn two_lane_map() -> LaneMap {
        LaneMap::new(vec![
            // East-bound along y = 0.
            LaneSegment { start: [0.0, 0.0], end: [100.0, 0.0] },
            // North-bound along x = 50, starting at y = 20.
            LaneSegment { start: [50.0, 20.0], end: [50.0, 120.0] },
        ])
    }

    #[test]
    fn fixed_heading_ignores_position() {
        let r = FixedHeading(0.4);
        assert_eq!(r.resolve_heading(&Point3::new(1e6, -1e6, 0.0)), 0.4);
    }

    #[test]
    fn empty_map_uses_fallback() {
        let map = LaneMap {
            lanes: vec![],
            fallback_heading: 1.1,
        };
        assert!(map.nearest(&Point3::zero()).is_none());
        assert_eq!(map.resolve_heading(&Point3::zero()), 1.1);
    }

    #[test]
    fn picks_closest_segment() {
        let map = two_lane_map();
        assert!(map.resolve_heading(&Point3::new(10.0, 1.0, 0.0)).abs() < 1e-12);
        let h = map.resolve_heading(&Point3::new(52.0, 80.0, 0.0));
        assert!((h - FRAC_PI_2).abs() < 1e-12);
    }

    #[test]
    fn distance_clamps_to_segment_ends() {
        let seg = LaneSegment { start: [0.0, 0.0], end: [10.0, 0.0] };
        // Beyond the end the distance is measured to the end point.
        assert!((seg.distance_sq(13.0, 4.0) - 25.0).abs() < 1e-12);
        assert!((seg.distance_sq(-3.0, 0.0) - 9.0).abs() < 1e-12);
    }

    #[test]
    fn degenerate_segment_is_a_point() {
        let seg = LaneSegment { start: [1.0, 1.0], end: [1.0, 1.0] };
        assert!((seg.distance_sq(4.0, 5.0) - 25.0).abs() < 1e-12);
    }
}
