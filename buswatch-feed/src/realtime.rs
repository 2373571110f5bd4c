//! GTFS-realtime vehicle-positions JSON shapes.
//!
//! Only the subtree the snapshot builder needs is modeled; unknown fields in
//! the upstream document are ignored by serde.

use serde::Deserialize;

/// Root of the vehicle-positions document.
#[derive(Debug, Clone, Deserialize)]
pub struct VehicleFeed {
    #[serde(default)]
    pub entity: Vec<FeedEntity>,
}

/// One feed entity wrapping a vehicle report.
#[derive(Debug, Clone, Deserialize)]
pub struct FeedEntity {
    pub vehicle: VehiclePosition,
}

/// A single vehicle report.
#[derive(Debug, Clone, Deserialize)]
pub struct VehiclePosition {
    pub trip: TripDescriptor,
    pub vehicle: VehicleDescriptor,
    pub position: RawPosition,
    #[serde(default)]
    pub stop_id: Option<String>,
    #[serde(default)]
    pub current_status: String,
    /// Epoch seconds of the report.
    pub timestamp: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TripDescriptor {
    pub trip_id: String,
    pub route_id: String,
    #[serde(default)]
    pub direction_id: u32,
    #[serde(default)]
    pub schedule_relationship: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct VehicleDescriptor {
    pub label: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RawPosition {
    pub latitude: f64,
    pub longitude: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    // Trimmed from a real vehiclepositions_pb.json payload.
    const SAMPLE: &str = r#"{
        "header": {"gtfs_realtime_version": "1.0", "timestamp": 1700000000},
        "entity": [
            {
                "id": "1",
                "vehicle": {
                    "trip": {
                        "trip_id": "trip-271-e",
                        "route_id": "100162",
                        "direction_id": 0,
                        "schedule_relationship": "SCHEDULED"
                    },
                    "vehicle": {"id": "v1", "label": "271E-1"},
                    "position": {"latitude": 47.61, "longitude": -122.2, "bearing": 90.0},
                    "stop_id": "10912",
                    "current_status": "STOPPED_AT",
                    "timestamp": 1699999980
                }
            }
        ]
    }"#;

    #[test]
    fn decodes_vehicle_subtree_and_ignores_extras() {
        let feed: VehicleFeed = serde_json::from_str(SAMPLE).expect("decode");
        assert_eq!(feed.entity.len(), 1);
        let vehicle = &feed.entity[0].vehicle;
        assert_eq!(vehicle.trip.route_id, "100162");
        assert_eq!(vehicle.vehicle.label, "271E-1");
        assert_eq!(vehicle.position.latitude, 47.61);
        assert_eq!(vehicle.stop_id.as_deref(), Some("10912"));
        assert_eq!(vehicle.timestamp, 1_699_999_980);
    }

    #[test]
    fn empty_document_decodes_to_no_entities() {
        let feed: VehicleFeed = serde_json::from_str("{}").expect("decode");
        assert!(feed.entity.is_empty());
    }
}
