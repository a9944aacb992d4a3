//! Caller-side threading of sensor frames through the converters.
//!
//! [`PerceptionPipeline`] is the single owner of the retained
//! [`RadarTrackTable`]: it feeds the previous table into each radar fusion
//! and replaces it with the result.  Camera and radar are converted
//! independently; [`PerceptionPipeline::merged`] concatenates the latest
//! output of each path.
//!
//! The pipeline is not meant to be shared between threads while frames are
//! being processed; frames of one radar stream must be fed in timestamp
//! order.
//!
//! # Example
//!
//! ```rust
//! use l3p_perception::config::ConversionConfig;
//! use l3p_perception::pipeline::PerceptionPipeline;
//! use l3p_types::{CameraFrame, Header, VehiclePose};
//!
//! let mut pipeline = PerceptionPipeline::new(ConversionConfig::default());
//! pipeline.on_localization(VehiclePose::default());
//! pipeline
//!     .on_camera_frame(&CameraFrame { header: Header::at(1.0), ..Default::default() })
//!     .unwrap();
//!
//! assert_eq!(pipeline.merged().header.timestamp_sec, 1.0);
//! ```

use l3p_types::{CameraFrame, PerceptionError, PerceptionObstacles, RadarFrame, RadarTrackTable, VehiclePose};
use tracing::debug;

use crate::camera::CameraConverter;
use crate::config::ConversionConfig;
use crate::flatten::flatten_tracks;
use crate::lane::{HeadingResolver, LaneMap};
use crate::radar::RadarFuser;

// ────────────────────────────────────────────────────────────────────────────
// PerceptionPipeline
// ────────────────────────────────────────────────────────────────────────────

/// Holds the latest pose, the latest camera obstacles and the retained radar
/// track table, and routes each incoming frame through its converter.
pub struct PerceptionPipeline {
    camera: CameraConverter,
    radar: RadarFuser,
    lanes: Box<dyn HeadingResolver>,
    last_pose: Option<VehiclePose>,
    camera_obstacles: PerceptionObstacles,
    radar_tracks: RadarTrackTable,
}

impl PerceptionPipeline {
    /// Build a pipeline whose headings come from the config's lane map.
    pub fn new(config: ConversionConfig) -> Self {
        let lanes: LaneMap = config.lane_map.clone();
        Self::with_resolver(&config, Box::new(lanes))
    }

    /// Build a pipeline with a custom heading resolver.
    pub fn with_resolver(config: &ConversionConfig, lanes: Box<dyn HeadingResolver>) -> Self {
        Self {
            camera: CameraConverter::new(config),
            radar: RadarFuser::new(config),
            lanes,
            last_pose: None,
            camera_obstacles: PerceptionObstacles::default(),
            radar_tracks: RadarTrackTable::default(),
        }
    }

    /// Record the newest localization estimate.
    pub fn on_localization(&mut self, pose: VehiclePose) {
        self.last_pose = Some(pose);
    }

    /// Convert a camera frame against the latest pose and keep the result.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptionError::MissingPose`] before the first
    /// localization message; the frame is discarded.
    pub fn on_camera_frame(&mut self, frame: &CameraFrame) -> Result<&PerceptionObstacles, PerceptionError> {
        let pose = self.pose_for("camera")?;
        self.camera_obstacles = self.camera.convert(frame, &pose, self.lanes.as_ref());
        debug!(obstacles = self.camera_obstacles.obstacles.len(), "camera frame converted");
        Ok(&self.camera_obstacles)
    }

    /// Fuse a radar frame against the retained table and retain the result.
    ///
    /// # Errors
    ///
    /// Returns [`PerceptionError::MissingPose`] before the first
    /// localization message; the frame is discarded and the table kept.
    pub fn on_radar_frame(&mut self, frame: &RadarFrame) -> Result<&RadarTrackTable, PerceptionError> {
        let pose = self.pose_for("radar")?;
        self.radar_tracks = self.radar.fuse(frame, &pose, &self.radar_tracks);
        Ok(&self.radar_tracks)
    }

    /// The retained radar track table.
    pub fn radar_tracks(&self) -> &RadarTrackTable {
        &self.radar_tracks
    }

    /// Camera obstacles followed by flattened radar obstacles, stamped with
    /// the newer of the two headers.
    pub fn merged(&self) -> PerceptionObstacles {
        let radar = flatten_tracks(&self.radar_tracks, self.lanes.as_ref());
        let header = if radar.header.timestamp_sec > self.camera_obstacles.header.timestamp_sec {
            radar.header
        } else {
            self.camera_obstacles.header.clone()
        };
        let mut obstacles = self.camera_obstacles.obstacles.clone();
        obstacles.extend(radar.obstacles);
        PerceptionObstacles { header, obstacles }
    }

    fn pose_for(&self, sensor: &str) -> Result<VehiclePose, PerceptionError> {
        self.last_pose.ok_or_else(|| PerceptionError::MissingPose {
            sensor: sensor.to_string(),
        })
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flatten::RADAR_ID_OFFSET;
    use crate::lane::FixedHeading;
    use l3p_types::{CameraObstacleReport, Header, Point3, RadarTrackReport, SlotId, TrackStatus, MAX_SLOTS};

    fn pose_at(x: f64) -> VehiclePose {
        VehiclePose {
            position: Point3::new(x, 0.0, 0.0),
            ..VehiclePose::default()
        }
    }

    fn camera_frame(t: f64, ids: &[i32]) -> CameraFrame {
        CameraFrame {
            header: Header::at(t),
            num_obstacles: ids.len() as u32,
            obstacles: ids
                .iter()
                .map(|&id| CameraObstacleReport {
                    id,
                    pos_x: 15.0,
                    class_code: 0,
                    ..Default::default()
                })
                .collect(),
            widths: vec![],
        }
    }

    fn radar_frame(t: f64, slots: &[usize]) -> RadarFrame {
        let mut tracks = vec![RadarTrackReport::default(); MAX_SLOTS];
        for &s in slots {
            tracks[s] = RadarTrackReport {
                status: TrackStatus::UpdatedTarget,
                range: 20.0,
                ..Default::default()
            };
        }
        RadarFrame {
            header: Header::at(t),
            tracks,
            power_groups: vec![],
        }
    }

    #[test]
    fn frames_before_pose_are_rejected() {
        let mut p = PerceptionPipeline::new(ConversionConfig::default());
        let err = p.on_radar_frame(&radar_frame(1.0, &[5])).unwrap_err();
        assert_eq!(
            err,
            PerceptionError::MissingPose {
                sensor: "radar".to_string()
            }
        );
        assert!(p.on_camera_frame(&camera_frame(1.0, &[1])).is_err());
        assert!(p.radar_tracks().is_empty());
    }

    #[test]
    fn radar_table_is_threaded_between_frames() {
        let mut p = PerceptionPipeline::new(ConversionConfig::default());
        p.on_localization(pose_at(0.0));
        p.on_radar_frame(&radar_frame(1.0, &[5])).unwrap();
        p.on_localization(pose_at(10.0));
        let table = p.on_radar_frame(&radar_frame(2.0, &[5])).unwrap();

        let track = table.get(SlotId::try_from(5u8).unwrap()).unwrap();
        assert_eq!(track.count, 1);
        assert!((track.absolute_velocity.x - 10.0).abs() < 1e-9);
    }

    #[test]
    fn merged_concatenates_camera_then_radar() {
        let mut p = PerceptionPipeline::with_resolver(&ConversionConfig::default(), Box::new(FixedHeading(0.0)));
        p.on_localization(pose_at(0.0));
        p.on_camera_frame(&camera_frame(1.0, &[1, 2])).unwrap();
        p.on_radar_frame(&radar_frame(1.5, &[7])).unwrap();

        let merged = p.merged();
        let ids: Vec<i32> = merged.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1, 2, RADAR_ID_OFFSET + 7]);
        assert_eq!(merged.header.timestamp_sec, 1.5);
    }

    #[test]
    fn newer_camera_frame_replaces_previous_obstacles() {
        let mut p = PerceptionPipeline::new(ConversionConfig::default());
        p.on_localization(pose_at(0.0));
        p.on_camera_frame(&camera_frame(1.0, &[1, 2, 3])).unwrap();
        p.on_camera_frame(&camera_frame(2.0, &[9])).unwrap();

        let merged = p.merged();
        assert_eq!(merged.obstacles.len(), 1);
        assert_eq!(merged.obstacles[0].id, 9);
        assert_eq!(merged.header.timestamp_sec, 2.0);
    }
}
