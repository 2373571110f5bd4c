//! Reconcile snapshots against the tracked-marker mapping.

use serde::Serialize;

use buswatch_core::types::{BusId, BusSnapshot, Position};
use buswatch_render::{MarkerIcon, PanelRenderer};

use crate::alerts::{AlertEngine, AlertSignal};
use crate::error::SyncError;
use crate::marker::{MarkerStore, TrackedMarker};

// ---------------------------------------------------------------------------
// Render instructions
// ---------------------------------------------------------------------------

/// Marker content shared by create and update instructions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerPayload {
    pub id: BusId,
    pub position: Position,
    pub icon: MarkerIcon,
    pub popup_text: String,
}

/// One mutation for the map rendering collaborator.
///
/// Repeated `Update`s with identical payloads must be safe for consumers.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "op", rename_all = "lowercase")]
pub enum RenderInstruction {
    /// First sighting of a bus id: place a new marker.
    Create(MarkerPayload),
    /// Known bus id: move the marker and refresh icon + popup.
    Update(MarkerPayload),
}

impl RenderInstruction {
    pub fn payload(&self) -> &MarkerPayload {
        match self {
            RenderInstruction::Create(payload) | RenderInstruction::Update(payload) => payload,
        }
    }

    pub fn is_create(&self) -> bool {
        matches!(self, RenderInstruction::Create(_))
    }
}

/// Everything one reconcile call produced.
#[derive(Debug)]
pub struct ReconcileOutcome {
    /// One instruction per input snapshot, in input order.
    pub instructions: Vec<RenderInstruction>,
    /// Alert signals fired during this cycle.
    pub alerts: Vec<AlertSignal>,
}

impl ReconcileOutcome {
    pub fn created(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_create()).count()
    }

    pub fn updated(&self) -> usize {
        self.instructions.len() - self.created()
    }
}

// ---------------------------------------------------------------------------
// Synchronizer
// ---------------------------------------------------------------------------

/// Owns the tracked-marker mapping and converts snapshot lists into render
/// instructions.
///
/// The marker mapping is exclusively owned here; collaborators read it via
/// [`Synchronizer::markers`] and never write it.
pub struct Synchronizer {
    markers: MarkerStore,
    alerts: AlertEngine,
    renderer: PanelRenderer,
}

impl Synchronizer {
    pub fn new(alerts: AlertEngine) -> Result<Self, SyncError> {
        Ok(Synchronizer {
            markers: MarkerStore::new(),
            alerts,
            renderer: PanelRenderer::new()?,
        })
    }

    /// Reconcile one snapshot list against the tracked markers.
    ///
    /// For each snapshot, in input order: a `Create` instruction for an
    /// unseen id (inserting its marker) or an `Update` for a known id
    /// (mutating it in place) — exactly one decision per snapshot. Buses
    /// absent from the list keep their markers untouched. An empty list
    /// yields an empty outcome and leaves the mapping unchanged.
    pub fn reconcile(&mut self, snapshots: &[BusSnapshot]) -> Result<ReconcileOutcome, SyncError> {
        let mut instructions = Vec::with_capacity(snapshots.len());
        let mut alerts = Vec::new();

        for snapshot in snapshots {
            let popup_text = self.renderer.render_popup(snapshot)?;
            let payload = MarkerPayload {
                id: snapshot.id.clone(),
                position: snapshot.position,
                icon: MarkerIcon::for_direction(snapshot.direction),
                popup_text: popup_text.clone(),
            };

            if let Some(marker) = self.markers.get_mut(&snapshot.id) {
                marker.position = snapshot.position;
                marker.direction = snapshot.direction;
                marker.popup_text = popup_text;
                marker.last_seen_ms = snapshot.last_updated_ms;
                tracing::debug!("update marker for bus {}", snapshot.id);
                instructions.push(RenderInstruction::Update(payload));
            } else {
                self.markers.insert(TrackedMarker {
                    id: snapshot.id.clone(),
                    position: snapshot.position,
                    direction: snapshot.direction,
                    popup_text,
                    last_seen_ms: snapshot.last_updated_ms,
                });
                tracing::debug!("create marker for bus {}", snapshot.id);
                instructions.push(RenderInstruction::Create(payload));
            }

            alerts.extend(self.alerts.observe(snapshot));
        }
        self.alerts.finish_cycle();

        Ok(ReconcileOutcome {
            instructions,
            alerts,
        })
    }

    /// Read-only view of the tracked markers.
    pub fn markers(&self) -> &MarkerStore {
        &self.markers
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use buswatch_core::types::{AlertRule, AlertTrigger, Direction, StopId};

    use super::*;

    fn make_synchronizer() -> Synchronizer {
        let engine = AlertEngine::new(AlertTrigger::OnEntry, AlertRule::route_271_defaults());
        Synchronizer::new(engine).expect("synchronizer")
    }

    fn snapshot(label: &str, lat: f64) -> BusSnapshot {
        BusSnapshot {
            id: BusId::from(label),
            position: Position { lat, lon: -122.2 },
            direction: Direction::Eastbound,
            stop_label: "Bellevue Transit Center".to_string(),
            stop_id: None,
            next_stop_id: None,
            status: "IN_TRANSIT_TO".to_string(),
            last_updated_ms: 1_700_000_000_000,
        }
    }

    #[test]
    fn first_sighting_creates_then_updates() {
        let mut sync = make_synchronizer();
        let bus = snapshot("271E-1", 47.6);

        let first = sync.reconcile(std::slice::from_ref(&bus)).expect("first");
        assert_eq!(first.instructions.len(), 1);
        assert!(first.instructions[0].is_create());

        let second = sync.reconcile(std::slice::from_ref(&bus)).expect("second");
        assert_eq!(second.instructions.len(), 1);
        assert!(!second.instructions[0].is_create());
        assert_eq!(
            first.instructions[0].payload(),
            second.instructions[0].payload(),
            "identical snapshots must produce identical payloads"
        );
    }

    #[test]
    fn update_mutates_marker_in_place() {
        let mut sync = make_synchronizer();
        sync.reconcile(&[snapshot("271E-1", 47.60)]).expect("first");
        sync.reconcile(&[snapshot("271E-1", 47.65)]).expect("second");

        assert_eq!(sync.markers().len(), 1);
        let marker = sync.markers().get(&BusId::from("271E-1")).expect("tracked");
        assert_eq!(marker.position.lat, 47.65);
    }

    #[test]
    fn empty_input_changes_nothing() {
        let mut sync = make_synchronizer();
        sync.reconcile(&[snapshot("271E-1", 47.6)]).expect("seed");

        let outcome = sync.reconcile(&[]).expect("empty");
        assert!(outcome.instructions.is_empty());
        assert!(outcome.alerts.is_empty());
        assert_eq!(sync.markers().len(), 1, "mapping unchanged");
    }

    #[test]
    fn absent_buses_are_retained() {
        let mut sync = make_synchronizer();
        sync.reconcile(&[snapshot("271E-1", 47.6), snapshot("271E-2", 47.7)])
            .expect("seed");
        sync.reconcile(&[snapshot("271E-2", 47.71)]).expect("partial");

        assert_eq!(sync.markers().len(), 2, "markers are never evicted");
        assert!(sync.markers().contains(&BusId::from("271E-1")));
    }

    #[test]
    fn instruction_order_matches_input_order() {
        let mut sync = make_synchronizer();
        let outcome = sync
            .reconcile(&[
                snapshot("zulu", 47.1),
                snapshot("alpha", 47.2),
                snapshot("mike", 47.3),
            ])
            .expect("reconcile");
        let ids: Vec<String> = outcome
            .instructions
            .iter()
            .map(|i| i.payload().id.to_string())
            .collect();
        assert_eq!(ids, vec!["zulu", "alpha", "mike"]);
    }

    #[test]
    fn duplicate_ids_in_one_call_yield_create_then_update() {
        let mut sync = make_synchronizer();
        let outcome = sync
            .reconcile(&[snapshot("271E-1", 47.60), snapshot("271E-1", 47.65)])
            .expect("reconcile");
        assert_eq!(outcome.instructions.len(), 2);
        assert!(outcome.instructions[0].is_create());
        assert!(!outcome.instructions[1].is_create());
        // The later duplicate wins in the mapping.
        let marker = sync.markers().get(&BusId::from("271E-1")).expect("tracked");
        assert_eq!(marker.position.lat, 47.65);
    }

    #[test]
    fn payload_carries_icon_and_popup() {
        let mut sync = make_synchronizer();
        let outcome = sync.reconcile(&[snapshot("271E-1", 47.6)]).expect("reconcile");
        let payload = outcome.instructions[0].payload();
        assert_eq!(payload.icon, MarkerIcon::Eastbound);
        assert!(payload.popup_text.contains("271E-1"));
        assert!(payload.popup_text.contains("Direction: Eastbound"));
    }

    #[test]
    fn instruction_serializes_with_op_tag() {
        let mut sync = make_synchronizer();
        let outcome = sync.reconcile(&[snapshot("271E-1", 47.6)]).expect("reconcile");
        let json = serde_json::to_value(&outcome.instructions[0]).expect("serialize");
        assert_eq!(json["op"], "create");
        assert_eq!(json["id"], "271E-1");
        assert_eq!(json["icon"], "eastbound");
    }

    #[test]
    fn alert_fires_alongside_create() {
        let mut sync = make_synchronizer();
        let mut bus = snapshot("271E-1", 47.6);
        bus.stop_id = Some(StopId::from("10912"));

        let outcome = sync.reconcile(std::slice::from_ref(&bus)).expect("reconcile");
        assert_eq!(outcome.created(), 1);
        assert_eq!(outcome.alerts.len(), 1);
        assert_eq!(
            outcome.alerts[0].message,
            "Bus 271E-1 is starting at stop 10912 (Eastbound)"
        );
    }
}
