//! Radar track state retained between frames.
//!
//! The radar assigns each physical return a hardware slot in `0..64` and
//! keeps it stable while the return persists.  A [`RadarTrackTable`] maps
//! validated [`SlotId`]s to the fused [`RadarTrack`] for that slot; the
//! fuser reads the previous table and builds a fresh one for every scan.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Header, PerceptionError, Point3};

/// Number of hardware track slots on the radar.
pub const MAX_SLOTS: usize = 64;

/// Minimum speed (m/s) for a frame to count towards the moving classification.
pub const MOVING_SPEED_THRESHOLD: f64 = 6.7;
/// Maximum deviation (radians) between velocity direction and track heading.
pub const MOVING_HEADING_THRESHOLD: f64 = 1.5;
/// Consecutive qualifying frames before a track is classified movable.
pub const MOVING_FRAMES_TO_MOVABLE: u32 = 5;

// ────────────────────────────────────────────────────────────────────────────
// SlotId
// ────────────────────────────────────────────────────────────────────────────

/// A hardware track slot, guaranteed to be `< MAX_SLOTS`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct SlotId(u8);

impl SlotId {
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// Iterate over every valid slot in ascending order.
    pub fn all() -> impl Iterator<Item = SlotId> {
        (0..MAX_SLOTS as u8).map(SlotId)
    }
}

impl TryFrom<usize> for SlotId {
    type Error = PerceptionError;

    fn try_from(slot: usize) -> Result<Self, Self::Error> {
        if slot < MAX_SLOTS {
            Ok(SlotId(slot as u8))
        } else {
            Err(PerceptionError::SlotOutOfRange { slot })
        }
    }
}

impl TryFrom<u8> for SlotId {
    type Error = PerceptionError;

    fn try_from(slot: u8) -> Result<Self, Self::Error> {
        SlotId::try_from(slot as usize)
    }
}

impl From<SlotId> for u8 {
    fn from(slot: SlotId) -> Self {
        slot.0
    }
}

impl std::fmt::Display for SlotId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// MotionState
// ────────────────────────────────────────────────────────────────────────────

/// Hysteresis state of the moving/static classification for one lineage.
///
/// `movable` is sticky: once set it is carried forward on every later frame
/// of the same slot lineage, even when the counter resets.  Whether it should
/// decay is an open product question; see DESIGN.md.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MotionState {
    /// Consecutive frames that satisfied the speed and heading test.
    pub moving_frames: u32,
    pub movable: bool,
}

impl MotionState {
    /// Advance the state by one observation.
    ///
    /// `previous` is the state of the same slot in the prior frame, or
    /// `None` for a newly appeared slot (which always starts from zero).
    pub fn advance(previous: Option<&MotionState>, speed: f64, heading_deviation: f64) -> Self {
        let qualifies =
            speed > MOVING_SPEED_THRESHOLD && heading_deviation < MOVING_HEADING_THRESHOLD;
        let moving_frames = match previous {
            Some(prev) if qualifies => prev.moving_frames.saturating_add(1),
            _ => 0,
        };
        let was_movable = previous.is_some_and(|prev| prev.movable);
        Self {
            moving_frames,
            movable: was_movable || moving_frames >= MOVING_FRAMES_TO_MOVABLE,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// RadarTrack
// ────────────────────────────────────────────────────────────────────────────

/// A fused radar track for one slot in one frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarTrack {
    pub slot: SlotId,
    /// Position in the vehicle frame (forward, left), corrected to the
    /// object's geometric center.
    pub relative_position: Point3,
    pub relative_velocity: Point3,
    pub absolute_position: Point3,
    /// Finite-difference world velocity; zero on the first observation.
    pub absolute_velocity: Point3,
    /// Heading (radians).  The radar does not resolve object heading, so
    /// this is the ego heading at measurement time.
    pub theta: f64,
    pub length: f64,
    pub width: f64,
    pub height: f64,
    /// Radar cross-section proxy derived from the reported power (dB).
    pub rcs: f64,
    /// Number of consecutive frames this slot has been seen before this one.
    pub count: u32,
    pub motion: MotionState,
}

// ────────────────────────────────────────────────────────────────────────────
// RadarTrackTable
// ────────────────────────────────────────────────────────────────────────────

/// All live radar tracks of one frame, keyed by slot.
///
/// The table is a value: the fuser never mutates the table it is given and
/// returns a new one.  The caller keeps the latest table and feeds it back
/// on the next scan.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RadarTrackTable {
    pub header: Header,
    tracks: BTreeMap<SlotId, RadarTrack>,
}

impl RadarTrackTable {
    /// Create an empty table stamped with `header`.
    pub fn new(header: Header) -> Self {
        Self {
            header,
            tracks: BTreeMap::new(),
        }
    }

    pub fn timestamp_sec(&self) -> f64 {
        self.header.timestamp_sec
    }

    pub fn get(&self, slot: SlotId) -> Option<&RadarTrack> {
        self.tracks.get(&slot)
    }

    /// Insert a track under its own slot, replacing any earlier entry.
    pub fn insert(&mut self, track: RadarTrack) {
        self.tracks.insert(track.slot, track);
    }

    pub fn len(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    /// Tracks in ascending slot order.
    pub fn tracks(&self) -> impl Iterator<Item = &RadarTrack> {
        self.tracks.values()
    }
}
