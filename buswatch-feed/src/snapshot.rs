//! Snapshot construction: join realtime vehicle reports against the static
//! tables and keep only active buses on the watched route.

use std::time::Duration;

use buswatch_core::types::{BusId, BusSnapshot, Direction, Position, StopId, TripId};

use crate::gtfs::StaticTables;
use crate::realtime::VehicleFeed;

/// `schedule_relationship` value that marks a report as usable.
const SCHEDULED: &str = "SCHEDULED";

/// Build snapshots from one realtime document, in feed order.
///
/// A report is kept when its trip belongs to `route_id`, is present in the
/// static trips table, is `SCHEDULED`, and its timestamp falls within
/// `active_window` of `now_ms`. Reports from the future (clock skew) count
/// as active.
pub fn build_snapshots(
    feed: &VehicleFeed,
    tables: &StaticTables,
    route_id: &str,
    now_ms: i64,
    active_window: Duration,
) -> Vec<BusSnapshot> {
    let window_ms = active_window.as_millis() as i64;
    let mut snapshots = Vec::new();

    for entity in &feed.entity {
        let vehicle = &entity.vehicle;
        if vehicle.trip.route_id != route_id {
            continue;
        }
        let trip = TripId::from(vehicle.trip.trip_id.as_str());
        if !tables.contains_trip(&trip) {
            continue;
        }

        let reported_ms = vehicle.timestamp * 1000;
        let is_active =
            vehicle.trip.schedule_relationship == SCHEDULED && now_ms - reported_ms < window_ms;
        if !is_active {
            continue;
        }

        let stop_id = vehicle.stop_id.as_deref().map(StopId::from);
        let stop_label = stop_id
            .as_ref()
            .map(|stop| tables.stop_name(stop).to_string())
            .unwrap_or_else(|| crate::gtfs::UNKNOWN_STOP_NAME.to_string());
        let next_stop_id = stop_id
            .as_ref()
            .and_then(|stop| tables.next_stop_after(&trip, stop));

        snapshots.push(BusSnapshot {
            id: BusId::from(vehicle.vehicle.label.as_str()),
            position: Position {
                lat: vehicle.position.latitude,
                lon: vehicle.position.longitude,
            },
            direction: Direction::from_gtfs(vehicle.trip.direction_id),
            stop_label,
            stop_id,
            next_stop_id,
            status: vehicle.current_status.clone(),
            last_updated_ms: reported_ms,
        });
    }

    snapshots
}
