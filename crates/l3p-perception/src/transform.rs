//! Vehicle-frame to world-frame transforms.
//!
//! Every converter receives detections as a (forward, lateral) offset from
//! the ego vehicle and needs them as world coordinates.  The transform is a
//! planar rotation by the ego heading followed by a translation to the ego
//! world position; height is taken from the ego pose unchanged.
//!
//! # Example
//!
//! ```rust
//! use l3p_perception::transform::EgoFrame;
//! use l3p_types::{Point3, Quaternion, VehiclePose};
//!
//! // Ego at (10, 5) facing +Y.
//! let pose = VehiclePose {
//!     position: Point3::new(10.0, 5.0, 0.0),
//!     orientation: Quaternion::from_yaw(std::f64::consts::FRAC_PI_2),
//!     linear_velocity: Point3::zero(),
//! };
//! let ego = EgoFrame::from_pose(&pose);
//!
//! // 2 m straight ahead of the vehicle is 2 m up the Y axis.
//! let p = ego.to_world(2.0, 0.0);
//! assert!((p.x - 10.0).abs() < 1e-9);
//! assert!((p.y - 7.0).abs() < 1e-9);
//! ```

use l3p_types::{Point3, Quaternion, VehiclePose};

// ────────────────────────────────────────────────────────────────────────────
// Primitive transforms
// ────────────────────────────────────────────────────────────────────────────

/// Extract the yaw angle (radians, counter-clockwise from +X) of an
/// orientation quaternion.
pub fn heading_from_quaternion(q: &Quaternion) -> f64 {
    let siny_cosp = 2.0 * (q.w * q.z + q.x * q.y);
    let cosy_cosp = 1.0 - 2.0 * (q.y * q.y + q.z * q.z);
    siny_cosp.atan2(cosy_cosp)
}

/// Rotate a vehicle-relative (forward, lateral) offset by `heading` into a
/// world-aligned (x, y) offset.
pub fn rotate_offset(forward: f64, lateral: f64, heading: f64) -> (f64, f64) {
    let (sin, cos) = heading.sin_cos();
    (forward * cos - lateral * sin, forward * sin + lateral * cos)
}

// ────────────────────────────────────────────────────────────────────────────
// EgoFrame
// ────────────────────────────────────────────────────────────────────────────

/// The ego pose reduced to what the converters need, computed once per
/// frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EgoFrame {
    pub position: Point3,
    /// Ego yaw in the world frame (radians).
    pub heading: f64,
    /// Magnitude of the ego horizontal velocity (m/s).
    pub speed: f64,
}

impl EgoFrame {
    pub fn from_pose(pose: &VehiclePose) -> Self {
        Self {
            position: pose.position,
            heading: heading_from_quaternion(&pose.orientation),
            speed: pose.speed(),
        }
    }

    /// Map a vehicle-relative (forward, lateral) offset to a world position.
    /// The result's `z` is the ego height.
    pub fn to_world(&self, forward: f64, lateral: f64) -> Point3 {
        let (dx, dy) = rotate_offset(forward, lateral, self.heading);
        Point3::new(self.position.x + dx, self.position.y + dy, self.position.z)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
