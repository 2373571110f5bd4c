//! Static GTFS tables: trips, stops, and optional per-trip stop sequences.
//!
//! Tables are standard GTFS CSV files; extra columns are ignored. Trips are
//! filtered to a single route at load time so the in-memory tables stay
//! proportional to the watched route, not the whole agency.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::path::Path;

use serde::Deserialize;

use buswatch_core::types::{StopId, TripId};
use buswatch_core::GtfsPaths;

use crate::error::{io_err, FeedError};

/// Stop name used when a report references a stop missing from stops.txt.
pub const UNKNOWN_STOP_NAME: &str = "Unknown";

// ---------------------------------------------------------------------------
// CSV row shapes
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
struct TripRow {
    route_id: String,
    trip_id: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StopRow {
    stop_id: String,
    stop_name: String,
}

#[derive(Debug, Clone, Deserialize)]
struct StopTimeRow {
    trip_id: String,
    stop_id: String,
    stop_sequence: u32,
}

// ---------------------------------------------------------------------------
// StaticTables
// ---------------------------------------------------------------------------

/// In-memory static GTFS data for one route.
#[derive(Debug, Default)]
pub struct StaticTables {
    /// Trip ids belonging to the watched route.
    trips: HashSet<TripId>,
    /// Stop id → stop name, agency-wide.
    stops: HashMap<StopId, String>,
    /// Trip id → stop ids ordered by `stop_sequence`; empty without stop_times.
    sequences: HashMap<TripId, Vec<StopId>>,
}

impl StaticTables {
    /// Load tables from the configured file paths, filtered to `route_id`.
    pub fn load(paths: &GtfsPaths, route_id: &str) -> Result<Self, FeedError> {
        let trips = open(&paths.trips)?;
        let stops = open(&paths.stops)?;
        let stop_times = match &paths.stop_times {
            Some(path) => Some(open(path)?),
            None => None,
        };
        Self::from_readers(trips, stops, stop_times, route_id)
    }

    /// Build tables from raw CSV readers. Used directly by tests and by
    /// [`StaticTables::load`].
    pub fn from_readers<R: Read>(
        trips: R,
        stops: R,
        stop_times: Option<R>,
        route_id: &str,
    ) -> Result<Self, FeedError> {
        let mut tables = StaticTables::default();

        let mut reader = csv::Reader::from_reader(trips);
        for row in reader.deserialize::<TripRow>() {
            let row = row?;
            if row.route_id == route_id {
                tables.trips.insert(TripId::from(row.trip_id));
            }
        }

        let mut reader = csv::Reader::from_reader(stops);
        for row in reader.deserialize::<StopRow>() {
            let row = row?;
            tables.stops.insert(StopId::from(row.stop_id), row.stop_name);
        }

        if let Some(stop_times) = stop_times {
            let mut ordered: HashMap<TripId, Vec<(u32, StopId)>> = HashMap::new();
            let mut reader = csv::Reader::from_reader(stop_times);
            for row in reader.deserialize::<StopTimeRow>() {
                let row = row?;
                let trip = TripId::from(row.trip_id);
                if !tables.trips.contains(&trip) {
                    continue;
                }
                ordered
                    .entry(trip)
                    .or_default()
                    .push((row.stop_sequence, StopId::from(row.stop_id)));
            }
            for (trip, mut entries) in ordered {
                entries.sort_by_key(|(sequence, _)| *sequence);
                tables
                    .sequences
                    .insert(trip, entries.into_iter().map(|(_, stop)| stop).collect());
            }
        }

        Ok(tables)
    }

    /// Whether `trip` belongs to the watched route.
    pub fn contains_trip(&self, trip: &TripId) -> bool {
        self.trips.contains(trip)
    }

    /// Stop name lookup with the `"Unknown"` fallback.
    pub fn stop_name(&self, stop: &StopId) -> &str {
        self.stops
            .get(stop)
            .map(String::as_str)
            .unwrap_or(UNKNOWN_STOP_NAME)
    }

    /// The stop after `current` in `trip`'s ordered stop sequence, if stop
    /// sequence data was loaded and `current` is not the final stop.
    pub fn next_stop_after(&self, trip: &TripId, current: &StopId) -> Option<StopId> {
        let sequence = self.sequences.get(trip)?;
        let index = sequence.iter().position(|stop| stop == current)?;
        sequence.get(index + 1).cloned()
    }

    pub fn trip_count(&self) -> usize {
        self.trips.len()
    }

    pub fn stop_count(&self) -> usize {
        self.stops.len()
    }
}

fn open(path: &Path) -> Result<std::fs::File, FeedError> {
    std::fs::File::open(path).map_err(|e| io_err(path, e))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
