//! Obstacle footprint helpers: default dimensions by class code, and the
//! rectangular ground polygon attached to every [`ObstacleRecord`][l3p_types::ObstacleRecord].

use l3p_types::Point3;
use serde::{Deserialize, Serialize};

/// Class code the radar path uses for every track.
pub const GENERIC_RADAR_CLASS: i32 = 4;

/// Footprint dimensions (metres).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
}

impl Dimensions {
    pub const fn new(length: f64, width: f64) -> Self {
        Self { length, width }
    }
}

/// Dimensions for one class code.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ClassDimensions {
    pub code: i32,
    pub length: f64,
    pub width: f64,
}

/// Fallback length/width lookup for sensors that report no size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTable {
    #[serde(default = "default_classes")]
    pub classes: Vec<ClassDimensions>,
    /// Used for any code not listed in `classes`.
    #[serde(default = "default_fallback")]
    pub fallback: Dimensions,
}

fn default_classes() -> Vec<ClassDimensions> {
    vec![
        ClassDimensions { code: 0, length: 4.0, width: 2.0 }, // car
        ClassDimensions { code: 1, length: 8.0, width: 2.5 }, // truck
        ClassDimensions { code: 2, length: 2.0, width: 0.8 }, // motorbike
        ClassDimensions { code: 3, length: 0.5, width: 0.5 }, // pedestrian
        ClassDimensions { code: 4, length: 2.0, width: 0.8 }, // bicycle
    ]
}

fn default_fallback() -> Dimensions {
    Dimensions::new(1.0, 1.0)
}

impl Default for DimensionTable {
    fn default() -> Self {
        Self {
            classes: default_classes(),
            fallback: default_fallback(),
        }
    }
}

impl DimensionTable {
    pub fn lookup(&self, code: i32) -> Dimensions {
        self.classes
            .iter()
            .find(|c| c.code == code)
            .map(|c| Dimensions::new(c.length, c.width))
            .unwrap_or(self.fallback)
    }

    pub fn default_length(&self, code: i32) -> f64 {
        self.lookup(code).length
    }

    pub fn default_width(&self, code: i32) -> f64 {
        self.lookup(code).width
    }
}

/// Corners of a `length` × `width` rectangle centered on `center` and
/// aligned with `heading`, in the order front-left, front-right, rear-right,
/// rear-left.  All corners lie at the center's height; `height` is accepted
/// so callers can pass the full box and is not used for the footprint.
pub fn ground_polygon(
    center: Point3,
    length: f64,
    width: f64,
    _height: f64,
    heading: f64,
) -> [Point3; 4] {
    let (sin, cos) = heading.sin_cos();
    let half_l = length / 2.0;
    let half_w = width / 2.0;
    let corner = |along: f64, across: f64| {
        Point3::new(
            center.x + along * cos - across * sin,
            center.y + along * sin + across * cos,
            center.z,
        )
    };
    [
        corner(half_l, half_w),
        corner(half_l, -half_w),
        corner(-half_l, -half_w),
        corner(-half_l, half_w),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::FRAC_PI_2;

    #[test]
    fn known_codes_use_table() {
        let table = DimensionTable::default();
        assert_eq!(table.default_length(0), 4.0);
        assert_eq!(table.default_width(1), 2.5);
        assert_eq!(table.lookup(GENERIC_RADAR_CLASS), Dimensions::new(2.0, 0.8));
    }

    #[test]
    fn unknown_codes_use_fallback() {
        let table = DimensionTable::default();
        assert_eq!(table.lookup(-7), Dimensions::new(1.0, 1.0));
        assert_eq!(table.lookup(99), table.fallback);
    }

    #[test]
    fn axis_aligned_polygon() {
        let poly = ground_polygon(Point3::new(10.0, 0.0, 2.0), 4.0, 2.0, 3.0, 0.0);
        let expected = [(12.0, 1.0), (12.0, -1.0), (8.0, -1.0), (8.0, 1.0)];
        for (p, (x, y)) in poly.iter().zip(expected) {
            assert!((p.x - x).abs() < 1e-9 && (p.y - y).abs() < 1e-9, "{p:?}");
            assert!((p.z - 2.0).abs() < 1e-12);
        }
    }

    #[test]
    fn rotated_polygon_follows_heading() {
        let poly = ground_polygon(Point3::zero(), 4.0, 2.0, 3.0, FRAC_PI_2);
        // Front-left of a +Y-facing box sits at (-1, 2).
        assert!((poly[0].x + 1.0).abs() < 1e-9);
        assert!((poly[0].y - 2.0).abs() < 1e-9);
    }

    #[test]
    fn polygon_centroid_is_center() {
        let center = Point3::new(-3.0, 7.5, 0.0);
        let poly = ground_polygon(center, 5.0, 1.8, 3.0, 0.9);
        let cx: f64 = poly.iter().map(|p| p.x).sum::<f64>() / 4.0;
        let cy: f64 = poly.iter().map(|p| p.y).sum::<f64>() / 4.0;
        assert!((cx - center.x).abs() < 1e-9);
        assert!((cy - center.y).abs() < 1e-9);
    }
}
