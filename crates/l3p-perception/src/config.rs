//! Conversion configuration – read once from a TOML file at startup.
//!
//! ```toml
//! camera_pos_adjust = 3.0
//! radar_pos_adjust = 3.0
//!
//! [dimensions]
//! fallback = { length = 1.0, width = 1.0 }
//!
//! [[dimensions.classes]]
//! code = 0
//! length = 4.0
//! width = 2.0
//!
//! [lane_map]
//! fallback_heading = 0.0
//!
//! [[lane_map.lanes]]
//! start = [0.0, 0.0]
//! end = [500.0, 0.0]
//! ```
//!
//! Every field is optional; an empty file yields [`ConversionConfig::default`].

use std::fs;
use std::path::Path;

use l3p_types::PerceptionError;
use serde::{Deserialize, Serialize};

use crate::geometry::DimensionTable;
use crate::lane::LaneMap;

/// Calibration and lookup tables shared by all converters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Forward offset from the inertial reference to the camera (metres).
    #[serde(default = "default_camera_pos_adjust")]
    pub camera_pos_adjust: f64,

    /// Forward offset from the inertial reference to the radar (metres).
    #[serde(default = "default_radar_pos_adjust")]
    pub radar_pos_adjust: f64,

    #[serde(default)]
    pub dimensions: DimensionTable,

    #[serde(default)]
    pub lane_map: LaneMap,
}

fn default_camera_pos_adjust() -> f64 {
    3.0
}
fn default_radar_pos_adjust() -> f64 {
    3.0
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            camera_pos_adjust: default_camera_pos_adjust(),
            radar_pos_adjust: default_radar_pos_adjust(),
            dimensions: DimensionTable::default(),
            lane_map: LaneMap::default(),
        }
    }
}

impl ConversionConfig {
    /// Reject values the converters cannot work with.
    pub fn validate(&self) -> Result<(), PerceptionError> {
        for (name, value) in [
            ("camera_pos_adjust", self.camera_pos_adjust),
            ("radar_pos_adjust", self.radar_pos_adjust),
        ] {
            if !value.is_finite() {
                return Err(PerceptionError::Config(format!("{name} must be finite, got {value}")));
            }
        }
        let fallback = std::iter::once((None, self.dimensions.fallback.length, self.dimensions.fallback.width));
        let classes = self.dimensions.classes.iter().map(|c| (Some(c.code), c.length, c.width));
        for (code, length, width) in fallback.chain(classes) {
            if !(length > 0.0 && width > 0.0) {
                let which = code.map_or("fallback".to_string(), |c| format!("class {c}"));
                return Err(PerceptionError::Config(format!(
                    "{which} dimensions must be positive, got {length} x {width}"
                )));
            }
        }
        Ok(())
    }
}

/// Load the config from `path` and apply environment overrides.  Returns
/// `None` if the file does not exist.
pub fn load(path: &Path) -> Result<Option<ConversionConfig>, PerceptionError> {
    let Some(mut cfg) = load_from(path)? else {
        return Ok(None);
    };
    apply_env_overrides(&mut cfg);
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Load the config from `path` as written, without environment overrides.
pub fn load_from(path: &Path) -> Result<Option<ConversionConfig>, PerceptionError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read_to_string(path).map_err(|e| {
        PerceptionError::Config(format!("Failed to read config at {}: {}", path.display(), e))
    })?;
    let cfg: ConversionConfig = toml::from_str(&raw)
        .map_err(|e| PerceptionError::Config(format!("Failed to parse config: {}", e)))?;
    cfg.validate()?;
    Ok(Some(cfg))
}

/// Apply `L3P_*` environment variable overrides to `cfg`.
///
/// | Variable | Config field |
/// |---|---|
/// | `L3P_CAMERA_POS_ADJUST` | `camera_pos_adjust` |
/// | `L3P_RADAR_POS_ADJUST` | `radar_pos_adjust` |
///
/// Values that do not parse as a number are ignored.
pub fn apply_env_overrides(cfg: &mut ConversionConfig) {
    if let Ok(v) = std::env::var("L3P_CAMERA_POS_ADJUST")
        && let Ok(offset) = v.parse::<f64>() {
            cfg.camera_pos_adjust = offset;
        }
    if let Ok(v) = std::env::var("L3P_RADAR_POS_ADJUST")
        && let Ok(offset) = v.parse::<f64>() {
            cfg.radar_pos_adjust = offset;
        }
}

/// Serialize `cfg` as pretty TOML.
pub fn to_toml(cfg: &ConversionConfig) -> Result<String, PerceptionError> {
    toml::to_string_pretty(cfg)
        .map_err(|e| PerceptionError::Serialization(format!("Failed to serialize config: {}", e)))
}
