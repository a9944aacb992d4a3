//! Raw sensor frame schemas.
//!
//! These mirror what the camera and radar units put on the wire, before any
//! conversion into the world frame.

use serde::{Deserialize, Serialize};

use crate::Header;

// ────────────────────────────────────────────────────────────────────────────
// Camera
// ────────────────────────────────────────────────────────────────────────────

/// One obstacle as reported by the forward camera unit.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraObstacleReport {
    pub id: i32,
    /// Forward distance from the sensor to the obstacle's rear face (metres).
    pub pos_x: f64,
    /// Lateral offset in the sensor's convention (positive to the right).
    pub pos_y: f64,
    /// Longitudinal velocity relative to the ego vehicle (m/s).
    pub rel_vel_x: f64,
    /// Sensor class code; see `ObstacleType::from_camera_code`.
    pub class_code: i32,
}

/// One camera frame.
///
/// `num_obstacles`, `obstacles` and `widths` arrive in separate messages on
/// the sensor bus and can disagree in length.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CameraFrame {
    pub header: Header,
    /// Obstacle count announced by the sensor.
    pub num_obstacles: u32,
    #[serde(default)]
    pub obstacles: Vec<CameraObstacleReport>,
    /// Measured widths, parallel to `obstacles`; may be shorter or empty.
    #[serde(default)]
    pub widths: Vec<f64>,
}

// ────────────────────────────────────────────────────────────────────────────
// Radar
// ────────────────────────────────────────────────────────────────────────────

/// Track state reported by the radar for one slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackStatus {
    #[default]
    NoTarget,
    NewTarget,
    NewUpdatedTarget,
    UpdatedTarget,
    CoastedTarget,
    MergedTarget,
    InvalidCoastedTarget,
    NewCoastedTarget,
}

impl TrackStatus {
    /// `false` only for an empty slot.
    pub fn has_target(self) -> bool {
        self != TrackStatus::NoTarget
    }
}

/// One per-slot track report.  The slot id is the report's index in
/// [`RadarFrame::tracks`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarTrackReport {
    pub status: TrackStatus,
    /// Distance to the target (metres).
    pub range: f64,
    /// Bearing, counter-clockwise from the sensor's boresight (degrees).
    pub angle_deg: f64,
    /// Rate of change of `range` (m/s).
    pub range_rate: f64,
    /// Lateral rate perpendicular to the line of sight (m/s).
    pub lat_rate: f64,
}

/// Reflectivity powers for a batch of slots.
///
/// Group `g` covers slots `g * 7 .. g * 7 + 7`; the last group (index 9)
/// covers slot 63 only.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PowerGroup {
    pub group: u8,
    /// Power values (dB) in slot order within the group.
    pub powers: Vec<i32>,
}

/// One radar scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarFrame {
    pub header: Header,
    #[serde(default)]
    pub tracks: Vec<RadarTrackReport>,
    #[serde(default)]
    pub power_groups: Vec<PowerGroup>,
}
