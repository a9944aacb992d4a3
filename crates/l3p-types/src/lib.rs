//! `l3p-types` – shared data model for the L3 perception converters.
//!
//! Everything that crosses a crate boundary lives here: the vehicle pose,
//! the generic [`ObstacleRecord`] consumed by planning, the raw sensor frame
//! schemas, and the retained radar track table.
//!
//! # Modules
//!
//! - [`sensor`] – wire schemas for the forward camera and the scanning radar.
//! - [`track`] – [`RadarTrackTable`][track::RadarTrackTable], the per-slot
//!   track state threaded between successive radar frames.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod sensor;
pub mod track;

pub use sensor::{CameraFrame, CameraObstacleReport, PowerGroup, RadarFrame, RadarTrackReport, TrackStatus};
pub use track::{MotionState, RadarTrack, RadarTrackTable, SlotId, MAX_SLOTS};

// ────────────────────────────────────────────────────────────────────────────
// Geometry primitives
// ────────────────────────────────────────────────────────────────────────────

/// A point or vector in 3-D space (metres, or metres per second for
/// velocities).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Point3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Point3 {
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// The zero vector.
    pub fn zero() -> Self {
        Self::default()
    }

    /// Magnitude of the horizontal (x, y) component.
    pub fn planar_norm(&self) -> f64 {
        self.x.hypot(self.y)
    }
}

/// A unit quaternion (w, x, y, z convention) describing an orientation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Quaternion {
    pub w: f64,
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Quaternion {
    /// Create a quaternion.  The caller is responsible for providing a unit
    /// quaternion (|q| = 1).
    pub fn new(w: f64, x: f64, y: f64, z: f64) -> Self {
        Self { w, x, y, z }
    }

    /// The identity rotation (no rotation).
    pub fn identity() -> Self {
        Self::new(1.0, 0.0, 0.0, 0.0)
    }

    /// A pure rotation of `yaw` radians about the vertical axis.
    pub fn from_yaw(yaw: f64) -> Self {
        let half = yaw / 2.0;
        Self::new(half.cos(), 0.0, 0.0, half.sin())
    }
}

impl Default for Quaternion {
    fn default() -> Self {
        Self::identity()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Headers and pose
// ────────────────────────────────────────────────────────────────────────────

/// Message header carried by every sensor frame and copied verbatim onto the
/// converted output.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct Header {
    /// Measurement time of the frame (seconds).
    pub timestamp_sec: f64,
    /// Name of the module that produced the frame, e.g. `"camera"`.
    #[serde(default)]
    pub module_name: String,
    #[serde(default)]
    pub sequence_num: u32,
}

impl Header {
    pub fn at(timestamp_sec: f64) -> Self {
        Self {
            timestamp_sec,
            ..Self::default()
        }
    }
}

/// The ego vehicle's localization estimate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct VehiclePose {
    /// World position of the inertial reference point (metres).
    pub position: Point3,
    /// World orientation.
    #[serde(default)]
    pub orientation: Quaternion,
    /// World linear velocity; only `x` and `y` are consumed (m/s).
    #[serde(default)]
    pub linear_velocity: Point3,
}

impl VehiclePose {
    /// Magnitude of the ego vehicle's horizontal velocity.
    pub fn speed(&self) -> f64 {
        self.linear_velocity.planar_norm()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Obstacles
// ────────────────────────────────────────────────────────────────────────────

/// Obstacle classification understood by planning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ObstacleType {
    Vehicle,
    Bicycle,
    Pedestrian,
    Unknown,
}

impl ObstacleType {
    /// Map a camera class code to an obstacle type.
    ///
    /// The mapping is total: every code outside `0..=4` is `Unknown`.
    pub fn from_camera_code(code: i32) -> Self {
        match code {
            0 | 1 => ObstacleType::Vehicle,
            2 | 4 => ObstacleType::Bicycle,
            3 => ObstacleType::Pedestrian,
            _ => ObstacleType::Unknown,
        }
    }
}

/// A single obstacle in the world frame, as emitted by every converter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ObstacleRecord {
    pub id: i32,
    /// World position of the obstacle's geometric center.
    pub position: Point3,
    /// World velocity; `z` is always zero.
    pub velocity: Point3,
    /// Heading angle in the world frame (radians).
    pub theta: f64,
    pub obstacle_type: ObstacleType,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Rectangular ground footprint.
    pub polygon: [Point3; 4],
    /// Detection confidence in `[0, 1]`.
    pub confidence: f64,
}

/// A list of obstacles stamped with the header of the frame that produced
/// them.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
pub struct PerceptionObstacles {
    pub header: Header,
    pub obstacles: Vec<ObstacleRecord>,
}

// ────────────────────────────────────────────────────────────────────────────
// Errors
// ────────────────────────────────────────────────────────────────────────────

/// Error type shared by the perception crates.
#[derive(Error, Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PerceptionError {
    #[error("Slot {slot} is outside the radar's 0..{max} track range", max = MAX_SLOTS)]
    SlotOutOfRange { slot: usize },

    #[error("No vehicle pose received before the first {sensor} frame")]
    MissingPose { sensor: String },

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Serialization Error: {0}")]
    Serialization(String),
}
