//! Domain types for the buswatch feed.
//!
//! Wire-facing structs serialize to the exact JSON shape of the snapshot
//! feed: `label`, `position.lat` / `position.lon`, `direction`, `stop`,
//! `status`, `stop_id`, `next_stop_id`, `last_updated` (epoch milliseconds).
//! Keep the serde attributes in sync with that shape.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// A strongly-typed bus identifier (the feed's `label` field).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct BusId(pub String);

impl fmt::Display for BusId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for BusId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for BusId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed GTFS stop identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StopId(pub String);

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StopId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StopId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

/// A strongly-typed GTFS trip identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TripId(pub String);

impl fmt::Display for TripId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for TripId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for TripId {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Travel direction of a bus on the route.
///
/// Wire values are capitalized (`"Eastbound"` / `"Westbound"`), matching the
/// snapshot feed, so no serde rename is applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    Eastbound,
    Westbound,
}

impl Direction {
    /// Map a GTFS `direction_id` to a [`Direction`] (`1` is westbound,
    /// everything else eastbound).
    pub fn from_gtfs(direction_id: u32) -> Self {
        if direction_id == 1 {
            Direction::Westbound
        } else {
            Direction::Eastbound
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Eastbound => write!(f, "Eastbound"),
            Direction::Westbound => write!(f, "Westbound"),
        }
    }
}

/// Which stop field of a snapshot an [`AlertRule`] matches against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StopField {
    /// The stop the bus is currently at (`stop_id`).
    Current,
    /// The stop the bus is heading to (`next_stop_id`).
    Next,
}

/// When alert conditions fire relative to repeated poll cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AlertTrigger {
    /// Fire on every poll cycle the condition holds.
    EveryPoll,
    /// Fire once when a bus enters the condition; re-arm when it leaves.
    #[default]
    OnEntry,
}

// ---------------------------------------------------------------------------
// Domain structs
// ---------------------------------------------------------------------------

/// A geographic position as reported by the feed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lon: f64,
}

/// One bus's reported state at a point in time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BusSnapshot {
    /// Stable bus identifier; the feed calls this `label`.
    #[serde(rename = "label")]
    pub id: BusId,
    pub position: Position,
    pub direction: Direction,
    /// Human-readable name of the current stop.
    #[serde(rename = "stop")]
    pub stop_label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_id: Option<StopId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stop_id: Option<StopId>,
    /// Free-form display text, e.g. `IN_TRANSIT_TO`.
    pub status: String,
    /// Epoch milliseconds of the upstream vehicle report.
    #[serde(rename = "last_updated")]
    pub last_updated_ms: i64,
}

impl BusSnapshot {
    /// The report time as a UTC datetime, if the millisecond value is in
    /// chrono's representable range.
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        Utc.timestamp_millis_opt(self.last_updated_ms).single()
    }
}

/// A single alert condition checked against every snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlertRule {
    pub direction: Direction,
    pub field: StopField,
    pub stop_id: StopId,
}

impl AlertRule {
    /// The Route 271 defaults: eastbound buses starting at stop 10912, and
    /// westbound buses whose next stop is 67655.
    pub fn route_271_defaults() -> Vec<AlertRule> {
        vec![
            AlertRule {
                direction: Direction::Eastbound,
                field: StopField::Current,
                stop_id: StopId::from("10912"),
            },
            AlertRule {
                direction: Direction::Westbound,
                field: StopField::Next,
                stop_id: StopId::from("67655"),
            },
        ]
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
