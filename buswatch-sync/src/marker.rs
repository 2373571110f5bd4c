//! Tracked-marker state owned by the synchronizer.

use std::collections::HashMap;

use buswatch_core::types::{BusId, Direction, Position};

/// Last-rendered state for one bus id, used to decide create vs update.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackedMarker {
    pub id: BusId,
    pub position: Position,
    pub direction: Direction,
    pub popup_text: String,
    /// Snapshot `last_updated` from the most recent reconcile containing
    /// this id.
    pub last_seen_ms: i64,
}

/// Mapping from bus id to its tracked marker.
///
/// At most one entry per id; entries are created the first time an id is
/// seen, mutated in place on later cycles, and never evicted.
#[derive(Debug, Default)]
pub struct MarkerStore {
    markers: HashMap<BusId, TrackedMarker>,
}

impl MarkerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    pub fn contains(&self, id: &BusId) -> bool {
        self.markers.contains_key(id)
    }

    pub fn get(&self, id: &BusId) -> Option<&TrackedMarker> {
        self.markers.get(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TrackedMarker> {
        self.markers.values()
    }

    pub(crate) fn get_mut(&mut self, id: &BusId) -> Option<&mut TrackedMarker> {
        self.markers.get_mut(id)
    }

    pub(crate) fn insert(&mut self, marker: TrackedMarker) {
        self.markers.insert(marker.id.clone(), marker);
    }
}
