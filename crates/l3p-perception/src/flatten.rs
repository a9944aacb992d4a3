//! Projects a [`RadarTrackTable`] into the generic obstacle list produced by
//! the camera path.

use l3p_types::{ObstacleRecord, ObstacleType, PerceptionObstacles, RadarTrackTable};

use crate::geometry::ground_polygon;
use crate::lane::HeadingResolver;

/// Added to the radar slot to form the obstacle id, keeping radar ids clear
/// of camera ids.
pub const RADAR_ID_OFFSET: i32 = 1000;
/// Confidence assigned to radar-sourced obstacles.
pub const RADAR_CONFIDENCE: f64 = 0.5;

/// One [`ObstacleRecord`] per track, in slot order.  Headings come from the
/// lane lookup, not the track's own (ego-derived) heading.
pub fn flatten_tracks(table: &RadarTrackTable, lanes: &dyn HeadingResolver) -> PerceptionObstacles {
    let obstacles = table
        .tracks()
        .map(|track| {
            let position = track.absolute_position;
            let theta = lanes.resolve_heading(&position);
            ObstacleRecord {
                id: track.slot.index() as i32 + RADAR_ID_OFFSET,
                position,
                velocity: track.absolute_velocity,
                theta,
                obstacle_type: ObstacleType::Unknown,
                length: track.length,
                width: track.width,
                height: track.height,
                polygon: ground_polygon(position, track.length, track.width, track.height, theta),
                confidence: RADAR_CONFIDENCE,
            }
        })
        .collect();

    PerceptionObstacles {
        header: table.header.clone(),
        obstacles,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConversionConfig;
    use crate::lane::FixedHeading;
    use crate::radar::RadarFuser;
    use l3p_types::{Header, RadarFrame, RadarTrackReport, TrackStatus, VehiclePose, MAX_SLOTS};

    fn table_with_slots(slots: &[usize], t: f64) -> RadarTrackTable {
        let mut tracks = vec![RadarTrackReport::default(); MAX_SLOTS];
        for &s in slots {
            tracks[s] = RadarTrackReport {
                status: TrackStatus::NewTarget,
                range: 20.0,
                ..Default::default()
            };
        }
        let frame = RadarFrame {
            header: Header::at(t),
            tracks,
            power_groups: vec![],
        };
        RadarFuser::new(&ConversionConfig::default()).fuse(
            &frame,
            &VehiclePose::default(),
            &RadarTrackTable::default(),
        )
    }

    #[test]
    fn single_track_becomes_id_1005() {
        let table = table_with_slots(&[5], 1.0);
        let out = flatten_tracks(&table, &FixedHeading(0.0));
        assert_eq!(out.obstacles.len(), 1);
        let ob = &out.obstacles[0];
        assert_eq!(ob.id, 1005);
        assert_eq!(ob.obstacle_type, ObstacleType::Unknown);
        assert_eq!(ob.confidence, RADAR_CONFIDENCE);
        assert_eq!(out.header.timestamp_sec, 1.0);
    }

    #[test]
    fn copies_track_geometry_and_velocity() {
        let table = table_with_slots(&[0, 63], 2.0);
        let out = flatten_tracks(&table, &FixedHeading(0.0));
        for (track, ob) in table.tracks().zip(&out.obstacles) {
            assert_eq!(ob.position, track.absolute_position);
            assert_eq!(ob.velocity, track.absolute_velocity);
            assert_eq!((ob.length, ob.width, ob.height), (track.length, track.width, track.height));
            assert!(ob.id >= RADAR_ID_OFFSET);
        }
        let ids: Vec<i32> = out.obstacles.iter().map(|o| o.id).collect();
        assert_eq!(ids, vec![1000, 1063]);
    }

    #[test]
    fn heading_comes_from_lane_lookup() {
        let table = table_with_slots(&[3], 1.0);
        let out = flatten_tracks(&table, &FixedHeading(0.25));
        let ob = &out.obstacles[0];
        assert_eq!(ob.theta, 0.25);
        assert_ne!(ob.theta, table.tracks().next().unwrap().theta);
        let expected = ground_polygon(ob.position, ob.length, ob.width, ob.height, 0.25);
        assert_eq!(ob.polygon, expected);
    }

    #[test]
    fn empty_table_flattens_to_empty_list() {
        let table = RadarTrackTable::new(Header::at(4.0));
        let out = flatten_tracks(&table, &FixedHeading(0.0));
        assert!(out.obstacles.is_empty());
        assert_eq!(out.header.timestamp_sec, 4.0);
    }
}
