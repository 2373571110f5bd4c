//! Template context — serializable rendering payload built from snapshots.

use chrono::{TimeZone, Utc};
use serde::{Deserialize, Serialize};

use buswatch_core::types::BusSnapshot;

use crate::error::RenderError;

/// Rendering payload for the summary panel.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PanelContext {
    pub heading: String,
    /// One entry per snapshot, in input order.
    pub buses: Vec<BusEntry>,
}

/// One bus block, all fields pre-formatted for templating.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusEntry {
    pub label: String,
    pub direction: String,
    pub status: String,
    pub stop: String,
    pub last_updated: String,
}

impl BusEntry {
    pub fn from_snapshot(snapshot: &BusSnapshot) -> Self {
        BusEntry {
            label: snapshot.id.to_string(),
            direction: snapshot.direction.to_string(),
            status: snapshot.status.clone(),
            stop: snapshot.stop_label.clone(),
            last_updated: format_last_updated(snapshot.last_updated_ms),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

impl PanelContext {
    pub fn from_snapshots(heading: &str, snapshots: &[BusSnapshot]) -> Self {
        PanelContext {
            heading: heading.to_string(),
            buses: snapshots.iter().map(BusEntry::from_snapshot).collect(),
        }
    }

    pub fn to_tera_context(&self) -> Result<tera::Context, RenderError> {
        tera::Context::from_serialize(self).map_err(RenderError::from)
    }
}

/// Human-readable rendering of an epoch-millisecond report time.
///
/// Values outside chrono's representable range fall back to the raw number.
pub fn format_last_updated(ms: i64) -> String {
    match Utc.timestamp_millis_opt(ms).single() {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => format!("{ms} ms"),
    }
}

#[cfg(test)]
mod tests {
    use buswatch_core::types::{BusId, Direction, Position};

    use super::*;

    fn snapshot(label: &str) -> BusSnapshot {
        BusSnapshot {
            id: BusId::from(label),
            position: Position {
                lat: 47.6,
                lon: -122.2,
            },
            direction: Direction::Eastbound,
            stop_label: "Bellevue Transit Center".to_string(),
            stop_id: None,
            next_stop_id: None,
            status: "IN_TRANSIT_TO".to_string(),
            last_updated_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn context_preserves_input_order() {
        let snapshots = vec![snapshot("b"), snapshot("a")];
        let ctx = PanelContext::from_snapshots("Heading", &snapshots);
        assert_eq!(ctx.buses.len(), 2);
        assert_eq!(ctx.buses[0].label, "b");
        assert_eq!(ctx.buses[1].label, "a");
    }

    #[test]
    fn entry_formats_timestamp() {
        let entry = BusEntry::from_snapshot(&snapshot("x"));
        assert_eq!(entry.last_updated, "2023-11-14 22:13:20 UTC");
    }

    #[test]
    fn out_of_range_timestamp_falls_back_to_raw() {
        assert_eq!(format_last_updated(i64::MAX), format!("{} ms", i64::MAX));
    }

    #[test]
    fn to_tera_context_succeeds() {
        let ctx = PanelContext::from_snapshots("Heading", &[snapshot("x")]);
        let tera_ctx = ctx.to_tera_context().expect("context conversion");
        let _ = tera_ctx;
    }
}
