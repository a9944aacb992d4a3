//! Radar track fusion.
//!
//! The radar reports up to [`MAX_SLOTS`] tracks per scan, each in a fixed
//! hardware slot that stays with the same physical return from scan to
//! scan.  [`RadarFuser::fuse`] turns one scan into a new
//! [`RadarTrackTable`], using the previous table to:
//!
//! - estimate world velocity by finite difference of world positions,
//! - carry the observation count forward,
//! - advance the moving/static hysteresis ([`MotionState`]).
//!
//! The previous table is read-only; a fresh table is returned.  Slots not
//! reported in the current scan are dropped.
//!
//! # Example
//!
//! ```rust
//! use l3p_perception::config::ConversionConfig;
//! use l3p_perception::radar::RadarFuser;
//! use l3p_types::{Header, RadarFrame, RadarTrackReport, RadarTrackTable, TrackStatus, VehiclePose};
//!
//! let fuser = RadarFuser::new(&ConversionConfig::default());
//! let mut tracks = vec![RadarTrackReport::default(); 64];
//! tracks[5] = RadarTrackReport { status: TrackStatus::NewTarget, range: 20.0, ..Default::default() };
//! let frame = RadarFrame { header: Header::at(1.0), tracks, power_groups: vec![] };
//!
//! let table = fuser.fuse(&frame, &VehiclePose::default(), &RadarTrackTable::default());
//! assert_eq!(table.len(), 1);
//! ```

use l3p_types::{
    MotionState, PowerGroup, Point3, RadarFrame, RadarTrack, RadarTrackTable, SlotId, VehiclePose,
    MAX_SLOTS,
};
use tracing::{debug, warn};

use crate::camera::OBSTACLE_HEIGHT;
use crate::config::ConversionConfig;
use crate::geometry::{Dimensions, GENERIC_RADAR_CLASS};
use crate::transform::EgoFrame;

/// Calibration offset subtracted from the reported power to obtain the RCS.
pub const RCS_POWER_OFFSET: f64 = 10.0;

/// Slots per reflectivity power group.
const POWER_GROUP_WIDTH: usize = 7;
/// Index of the last power group, which carries a single slot.
const LAST_POWER_GROUP: usize = 9;

// ────────────────────────────────────────────────────────────────────────────
// Power unpack
// ────────────────────────────────────────────────────────────────────────────

/// Flatten grouped reflectivity messages into a dense per-slot table.
///
/// Group `g` fills slots `g * 7 ..`, seven per group except the last group
/// (index 9) which fills slot 63 only.  Slots no group reports stay at 0.
/// Groups past the last one are dropped.
pub fn unpack_power(groups: &[PowerGroup]) -> [f64; MAX_SLOTS] {
    let mut powers = [0.0; MAX_SLOTS];
    for group in groups {
        let index = group.group as usize;
        if index > LAST_POWER_GROUP {
            warn!(group = index, "dropping power group past the last slot");
            continue;
        }
        let width = if index < LAST_POWER_GROUP { POWER_GROUP_WIDTH } else { 1 };
        for (offset, power) in group.powers.iter().take(width).enumerate() {
            powers[index * POWER_GROUP_WIDTH + offset] = f64::from(*power);
        }
    }
    powers
}

// ────────────────────────────────────────────────────────────────────────────
// Elapsed time
// ────────────────────────────────────────────────────────────────────────────

/// Time between the previous table and the current scan.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Elapsed {
    /// Strictly positive elapsed time (seconds).
    Advanced(f64),
    /// The scan is not newer than the previous table; velocities cannot be
    /// differenced.
    NonAdvancing,
}

impl Elapsed {
    pub fn between(previous_sec: f64, current_sec: f64) -> Self {
        let dt = current_sec - previous_sec;
        if dt > 0.0 && dt.is_finite() {
            Elapsed::Advanced(dt)
        } else {
            Elapsed::NonAdvancing
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RadarFuser
// ────────────────────────────────────────────────────────────────────────────

/// Stateless radar scan fuser; all cross-frame state lives in the
/// [`RadarTrackTable`] the caller threads through [`RadarFuser::fuse`].
#[derive(Debug, Clone)]
pub struct RadarFuser {
    /// Forward offset from the inertial reference to the radar (metres).
    pos_adjust: f64,
    /// Dimensions of the generic class used for every radar track.
    dimensions: Dimensions,
}

impl RadarFuser {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            pos_adjust: config.radar_pos_adjust,
            dimensions: config.dimensions.lookup(GENERIC_RADAR_CLASS),
        }
    }

    /// Fuse one radar scan against the previous table.
    ///
    /// When the scan is not newer than `previous`, continuing slots keep
    /// their previous world velocity and motion state instead of
    /// differencing over a zero or negative interval.
    pub fn fuse(
        &self,
        frame: &RadarFrame,
        pose: &VehiclePose,
        previous: &RadarTrackTable,
    ) -> RadarTrackTable {
        let ego = EgoFrame::from_pose(pose);
        let powers = unpack_power(&frame.power_groups);
        let elapsed = Elapsed::between(previous.timestamp_sec(), frame.header.timestamp_sec);

        if frame.tracks.len() > MAX_SLOTS {
            warn!(
                reported = frame.tracks.len(),
                "dropping radar track reports beyond the last slot"
            );
        }

        let mut table = RadarTrackTable::new(frame.header.clone());
        let mut held = 0usize;

        for (slot, report) in SlotId::all().zip(&frame.tracks) {
            if !report.status.has_target() {
                continue;
            }

            let angle = report.angle_deg.to_radians();
            let (sin, cos) = angle.sin_cos();

            let relative_position = Point3::new(
                report.range * cos + self.pos_adjust + self.dimensions.length / 2.0,
                report.range * sin,
                0.0,
            );
            let absolute_position = ego.to_world(relative_position.x, relative_position.y);
            let relative_velocity = Point3::new(
                report.range_rate * cos - report.lat_rate * sin,
                report.range_rate * sin + report.lat_rate * cos,
                0.0,
            );

            let theta = ego.heading;
            let (absolute_velocity, count, motion) = match previous.get(slot) {
                None => (Point3::zero(), 0, MotionState::default()),
                Some(prev) => {
                    let count = prev.count.saturating_add(1);
                    match elapsed {
                        Elapsed::Advanced(dt) => {
                            let velocity = Point3::new(
                                (absolute_position.x - prev.absolute_position.x) / dt,
                                (absolute_position.y - prev.absolute_position.y) / dt,
                                0.0,
                            );
                            let deviation = (velocity.y.atan2(velocity.x) - theta).abs();
                            let motion = MotionState::advance(
                                Some(&prev.motion),
                                velocity.planar_norm(),
                                deviation,
                            );
                            (velocity, count, motion)
                        }
                        Elapsed::NonAdvancing => {
                            held += 1;
                            (prev.absolute_velocity, count, prev.motion)
                        }
                    }
                }
            };

            table.insert(RadarTrack {
                slot,
                relative_position,
                relative_velocity,
                absolute_position,
                absolute_velocity,
                theta,
                length: self.dimensions.length,
                width: self.dimensions.width,
                height: OBSTACLE_HEIGHT,
                rcs: powers[slot.index()] - RCS_POWER_OFFSET,
                count,
                motion,
            });
        }

        if held > 0 {
            warn!(
                previous = previous.timestamp_sec(),
                current = frame.header.timestamp_sec,
                held,
                "radar timestamp did not advance; holding previous velocities"
            );
        }
        debug!(
            tracks = table.len(),
            timestamp = frame.header.timestamp_sec,
            "fused radar scan"
        );

        table
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
