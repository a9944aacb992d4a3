//! Replay of recorded sensor streams.
//!
//! Input is newline-delimited JSON, one [`SensorMessage`] per line:
//!
//! ```text
//! {"kind":"localization","payload":{"position":{"x":0.0,"y":0.0,"z":0.0}}}
//! {"kind":"radar","payload":{"header":{"timestamp_sec":1.0},"tracks":[...]}}
//! ```
//!
//! After every camera or radar message the pipeline's merged obstacle list
//! is written to the output as one JSON line.

use std::io::{BufRead, Write};

use l3p_perception::PerceptionPipeline;
use l3p_types::{CameraFrame, PerceptionError, RadarFrame, VehiclePose};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// One recorded message from the vehicle bus.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "snake_case")]
pub enum SensorMessage {
    Localization(VehiclePose),
    Camera(CameraFrame),
    Radar(RadarFrame),
}

/// Counters reported at the end of a replay.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplayStats {
    pub localization: usize,
    pub camera: usize,
    pub radar: usize,
    /// Lines that were malformed or arrived before the first pose.
    pub skipped: usize,
    /// Obstacle lists written to the output.
    pub published: usize,
}

/// Feed every message from `reader` through `pipeline`, writing merged
/// obstacle lists to `out`.
///
/// # Errors
///
/// Fails only on I/O errors; malformed lines are logged and skipped.
pub fn replay<R: BufRead, W: Write>(
    reader: R,
    out: &mut W,
    pipeline: &mut PerceptionPipeline,
) -> Result<ReplayStats, PerceptionError> {
    let mut stats = ReplayStats::default();

    for (index, line) in reader.lines().enumerate() {
        let line_no = index + 1;
        let line = line.map_err(|e| {
            PerceptionError::Serialization(format!("Failed to read line {line_no}: {e}"))
        })?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let message: SensorMessage = match serde_json::from_str(trimmed) {
            Ok(m) => m,
            Err(e) => {
                warn!(line = line_no, error = %e, "skipping malformed message");
                stats.skipped += 1;
                continue;
            }
        };

        let handled = match &message {
            SensorMessage::Localization(pose) => {
                pipeline.on_localization(*pose);
                stats.localization += 1;
                continue;
            }
            SensorMessage::Camera(frame) => pipeline.on_camera_frame(frame).map(|_| ()),
            SensorMessage::Radar(frame) => pipeline.on_radar_frame(frame).map(|_| ()),
        };

        if let Err(e) = handled {
            warn!(line = line_no, error = %e, "skipping sensor frame");
            stats.skipped += 1;
            continue;
        }
        match message {
            SensorMessage::Camera(_) => stats.camera += 1,
            _ => stats.radar += 1,
        }

        let merged = serde_json::to_string(&pipeline.merged())
            .map_err(|e| PerceptionError::Serialization(e.to_string()))?;
        writeln!(out, "{merged}")
            .map_err(|e| PerceptionError::Serialization(format!("Failed to write output: {e}")))?;
        stats.published += 1;
    }

    Ok(stats)
}
