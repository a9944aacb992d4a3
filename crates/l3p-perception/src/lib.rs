//! `l3p-perception` – sensor-to-obstacle conversion.
//!
//! Turns raw camera and radar reports plus the ego localization into the
//! world-frame obstacle lists consumed by planning.
//!
//! # Modules
//!
//! - [`transform`] – [`EgoFrame`][transform::EgoFrame]: rotates
//!   vehicle-relative offsets into world coordinates.
//! - [`camera`] – [`CameraConverter`][camera::CameraConverter]: stateless
//!   camera frame conversion.
//! - [`radar`] – [`RadarFuser`][radar::RadarFuser]: stateful radar track
//!   fusion with finite-difference velocity and moving/static hysteresis.
//! - [`flatten`] – [`flatten_tracks`][flatten::flatten_tracks]: projects a
//!   radar track table into the generic obstacle list.
//! - [`pipeline`] – [`PerceptionPipeline`][pipeline::PerceptionPipeline]:
//!   owns the retained radar table and merges both sensor paths.
//! - [`geometry`], [`lane`], [`config`] – default dimensions and footprints,
//!   lane heading lookup, and calibration configuration.

pub mod camera;
pub mod config;
pub mod flatten;
pub mod geometry;
pub mod lane;
pub mod pipeline;
pub mod radar;
pub mod transform;

pub use camera::CameraConverter;
pub use config::ConversionConfig;
pub use flatten::flatten_tracks;
pub use lane::{FixedHeading, HeadingResolver, LaneMap, LaneSegment};
pub use pipeline::PerceptionPipeline;
pub use radar::{Elapsed, RadarFuser};
