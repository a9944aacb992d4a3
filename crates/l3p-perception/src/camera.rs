//! Forward camera to generic obstacle conversion.
//!
//! A [`CameraConverter`] is stateless: each call maps one
//! [`CameraFrame`] plus the current [`VehiclePose`] into a fresh
//! [`PerceptionObstacles`] list.  Iteration stops at the shorter of the
//! announced obstacle count and the delivered detail list; a short or
//! missing width list falls back to the default width per class.

use l3p_types::{CameraFrame, ObstacleRecord, ObstacleType, PerceptionObstacles, Point3, VehiclePose};
use tracing::debug;

use crate::config::ConversionConfig;
use crate::geometry::{ground_polygon, DimensionTable};
use crate::lane::HeadingResolver;
use crate::transform::EgoFrame;

/// Fixed height assigned to every converted obstacle (metres).
pub const OBSTACLE_HEIGHT: f64 = 3.0;
/// Confidence assigned to camera-sourced obstacles.
pub const CAMERA_CONFIDENCE: f64 = 0.75;

/// Converts camera frames into world-frame obstacles.
///
/// # Example
///
/// ```rust
/// use l3p_perception::camera::CameraConverter;
/// use l3p_perception::config::ConversionConfig;
/// use l3p_perception::lane::FixedHeading;
/// use l3p_types::{CameraFrame, CameraObstacleReport, Header, VehiclePose};
///
/// let converter = CameraConverter::new(&ConversionConfig::default());
/// let frame = CameraFrame {
///     header: Header::at(1.0),
///     num_obstacles: 1,
///     obstacles: vec![CameraObstacleReport { id: 7, pos_x: 20.0, class_code: 0, ..Default::default() }],
///     widths: vec![],
/// };
///
/// let out = converter.convert(&frame, &VehiclePose::default(), &FixedHeading(0.0));
/// assert_eq!(out.obstacles.len(), 1);
/// assert_eq!(out.obstacles[0].id, 7);
/// ```
#[derive(Debug, Clone)]
pub struct CameraConverter {
    /// Forward offset from the inertial reference to the camera (metres).
    pos_adjust: f64,
    dimensions: DimensionTable,
}

impl CameraConverter {
    pub fn new(config: &ConversionConfig) -> Self {
        Self {
            pos_adjust: config.camera_pos_adjust,
            dimensions: config.dimensions.clone(),
        }
    }

    /// Convert one camera frame.  The output header is the frame's header.
    pub fn convert(
        &self,
        frame: &CameraFrame,
        pose: &VehiclePose,
        lanes: &dyn HeadingResolver,
    ) -> PerceptionObstacles {
        let ego = EgoFrame::from_pose(pose);
        let announced = frame.num_obstacles as usize;

        let obstacles: Vec<ObstacleRecord> = frame
            .obstacles
            .iter()
            .take(announced)
            .enumerate()
            .map(|(index, report)| {
                let length = self.dimensions.default_length(report.class_code);
                let width = frame
                    .widths
                    .get(index)
                    .copied()
                    .unwrap_or_else(|| self.dimensions.default_width(report.class_code));

                // Shift the reported rear-face point to the object's center.
                let forward = report.pos_x + self.pos_adjust + length / 2.0;
                let lateral = -report.pos_y;
                let position = ego.to_world(forward, lateral);

                let theta = lanes.resolve_heading(&position);
                let speed = ego.speed + report.rel_vel_x;
                let velocity = Point3::new(speed * theta.cos(), speed * theta.sin(), 0.0);

                ObstacleRecord {
                    id: report.id,
                    position,
                    velocity,
                    theta,
                    obstacle_type: ObstacleType::from_camera_code(report.class_code),
                    length,
                    width,
                    height: OBSTACLE_HEIGHT,
                    polygon: ground_polygon(position, length, width, OBSTACLE_HEIGHT, theta),
                    confidence: CAMERA_CONFIDENCE,
                }
            })
            .collect();

        if obstacles.len() != announced || obstacles.len() != frame.obstacles.len() {
            debug!(
                announced,
                delivered = frame.obstacles.len(),
                converted = obstacles.len(),
                "camera frame truncated to shorter obstacle list"
            );
        }

        PerceptionObstacles {
            header: frame.header.clone(),
            obstacles,
        }
    }
}
