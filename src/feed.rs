//! Decoding and projection of GTFS Realtime vehicle-position feeds.

use anyhow::Result;
use prost::Message;

use crate::gtfs_rt::FeedMessage;

/// One vehicle-position report, projected out of a feed entity.
///
/// Feed floats are f32 on the wire; they are widened to f64 here so the
/// fixed-precision formatting downstream works on one numeric type.
#[derive(Debug, Clone, PartialEq)]
pub struct VehicleUpdate {
    pub vehicle_id: String,
    pub timestamp: u64,
    pub longitude: f64,
    pub latitude: f64,
    pub speed: f64,
    pub label: String,
}

/// Decodes a protobuf-encoded GTFS-RT [`FeedMessage`] from raw bytes.
///
/// # Errors
///
/// Returns an error if the bytes are not valid protobuf for a `FeedMessage`.
pub fn parse_feed(bytes: &[u8]) -> Result<FeedMessage> {
    Ok(FeedMessage::decode(bytes)?)
}

/// Projects feed entities into [`VehicleUpdate`]s.
///
/// Entities without a vehicle sub-message, without a non-empty vehicle id,
/// or without a position are dropped here, so the reducer never sees a
/// record it cannot key or locate. Timestamp, speed, and label fall back to
/// their protobuf defaults when absent.
pub fn extract_updates(feed: &FeedMessage) -> Vec<VehicleUpdate> {
    feed.entity
        .iter()
        .filter_map(|e| {
            let vp = e.vehicle.as_ref()?;
            let pos = vp.position.as_ref()?;
            let id = vp.vehicle.as_ref()?.id.as_deref().filter(|s| !s.is_empty())?;

            Some(VehicleUpdate {
                vehicle_id: id.to_string(),
                timestamp: vp.timestamp.unwrap_or(0),
                longitude: f64::from(pos.longitude),
                latitude: f64::from(pos.latitude),
                speed: pos.speed.map_or(0.0, f64::from),
                label: vp
                    .vehicle
                    .as_ref()
                    .and_then(|d| d.label.clone())
                    .unwrap_or_default(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gtfs_rt::{FeedEntity, FeedHeader, Position, VehicleDescriptor, VehiclePosition};

    fn header() -> FeedHeader {
        FeedHeader {
            gtfs_realtime_version: "2.0".to_string(),
            timestamp: Some(1234567890),
            incrementality: None,
            feed_version: None,
        }
    }

    fn vehicle_entity(entity_id: &str, vehicle_id: Option<&str>, ts: u64) -> FeedEntity {
        FeedEntity {
            id: entity_id.to_string(),
            vehicle: Some(VehiclePosition {
                position: Some(Position {
                    latitude: -33.85,
                    longitude: 151.2093,
                    bearing: None,
                    odometer: None,
                    speed: Some(4.2),
                }),
                timestamp: Some(ts),
                vehicle: Some(VehicleDescriptor {
                    id: vehicle_id.map(str::to_string),
                    label: Some("Ferry".to_string()),
                    license_plate: None,
                }),
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_parse_empty_bytes_returns_default_feed() {
        // An empty byte array decodes to a FeedMessage with default values.
        // This is valid protobuf behavior.
        let feed = parse_feed(&[]).unwrap();
        assert_eq!(feed.header.gtfs_realtime_version, "");
        assert!(feed.entity.is_empty());
    }

    #[test]
    fn test_parse_invalid_bytes() {
        let invalid_bytes = vec![0xFF, 0xFE, 0x00, 0x01];
        assert!(parse_feed(&invalid_bytes).is_err());
    }

    #[test]
    fn test_parse_roundtrips_encoded_feed() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![vehicle_entity("e1", Some("1001"), 1700000000)],
        };
        let parsed = parse_feed(&feed.encode_to_vec()).unwrap();

        assert_eq!(parsed.header.gtfs_realtime_version, "2.0");
        assert_eq!(parsed.entity.len(), 1);
    }

    #[test]
    fn test_extract_projects_vehicle_fields() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![vehicle_entity("e1", Some("1001"), 1700000000)],
        };

        let updates = extract_updates(&feed);
        assert_eq!(updates.len(), 1);

        let u = &updates[0];
        assert_eq!(u.vehicle_id, "1001");
        assert_eq!(u.timestamp, 1700000000);
        assert_eq!(u.label, "Ferry");
        assert!((u.latitude - -33.85).abs() < 1e-4);
        assert!((u.longitude - 151.2093).abs() < 1e-4);
    }

    #[test]
    fn test_extract_drops_entities_without_vehicle_message() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![
                // An alert-style entity with no vehicle sub-message.
                FeedEntity {
                    id: "alert-1".to_string(),
                    ..Default::default()
                },
                vehicle_entity("e2", Some("2002"), 1700000100),
            ],
        };

        let updates = extract_updates(&feed);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].vehicle_id, "2002");
    }

    #[test]
    fn test_extract_drops_entities_without_vehicle_id() {
        let feed = FeedMessage {
            header: header(),
            entity: vec![
                vehicle_entity("e1", None, 1700000000),
                vehicle_entity("e2", Some(""), 1700000000),
            ],
        };

        assert!(extract_updates(&feed).is_empty());
    }

    #[test]
    fn test_extract_drops_entities_without_position() {
        let mut entity = vehicle_entity("e1", Some("1001"), 1700000000);
        entity.vehicle.as_mut().unwrap().position = None;

        let feed = FeedMessage {
            header: header(),
            entity: vec![entity],
        };

        assert!(extract_updates(&feed).is_empty());
    }

    #[test]
    fn test_extract_defaults_for_absent_optionals() {
        let mut entity = vehicle_entity("e1", Some("1001"), 0);
        {
            let vp = entity.vehicle.as_mut().unwrap();
            vp.timestamp = None;
            vp.position.as_mut().unwrap().speed = None;
            vp.vehicle.as_mut().unwrap().label = None;
        }

        let feed = FeedMessage {
            header: header(),
            entity: vec![entity],
        };

        let updates = extract_updates(&feed);
        assert_eq!(updates[0].timestamp, 0);
        assert_eq!(updates[0].speed, 0.0);
        assert_eq!(updates[0].label, "");
    }
}
