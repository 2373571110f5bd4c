//! End-to-end reconcile scenarios across multiple poll cycles.

use buswatch_core::types::{
    AlertRule, AlertTrigger, BusId, BusSnapshot, Direction, Position, StopId,
};
use buswatch_sync::{AlertEngine, Synchronizer};

fn make_synchronizer(trigger: AlertTrigger) -> Synchronizer {
    Synchronizer::new(AlertEngine::new(trigger, AlertRule::route_271_defaults()))
        .expect("synchronizer")
}

fn snapshot(label: &str, direction: Direction, lat: f64, stop_id: Option<&str>) -> BusSnapshot {
    BusSnapshot {
        id: BusId::from(label),
        position: Position { lat, lon: -122.2 },
        direction,
        stop_label: "Bellevue Transit Center".to_string(),
        stop_id: stop_id.map(StopId::from),
        next_stop_id: None,
        status: "IN_TRANSIT_TO".to_string(),
        last_updated_ms: 1_700_000_000_000,
    }
}

#[test]
fn every_id_seen_across_cycles_has_a_marker_with_its_latest_payload() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    let lists = vec![
        vec![snapshot("a", Direction::Eastbound, 47.10, None)],
        vec![
            snapshot("b", Direction::Westbound, 47.20, None),
            snapshot("a", Direction::Eastbound, 47.11, None),
        ],
        vec![snapshot("c", Direction::Eastbound, 47.30, None)],
    ];

    for list in &lists {
        let outcome = sync.reconcile(list).expect("reconcile");
        // After call i, every id in the list has a marker matching its
        // snapshot from that call.
        for bus in list {
            let marker = sync.markers().get(&bus.id).expect("marker present");
            assert_eq!(marker.position, bus.position);
            assert_eq!(marker.direction, bus.direction);
        }
        assert_eq!(outcome.instructions.len(), list.len());
    }

    assert_eq!(sync.markers().len(), 3);
    // "a" reflects its latest snapshot, not its first.
    let a = sync.markers().get(&BusId::from("a")).expect("a tracked");
    assert_eq!(a.position.lat, 47.11);
}

#[test]
fn create_is_never_emitted_twice_for_the_same_id() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    let mut created = Vec::new();

    let cycles = vec![
        vec![snapshot("a", Direction::Eastbound, 47.1, None)],
        vec![
            snapshot("a", Direction::Eastbound, 47.2, None),
            snapshot("b", Direction::Westbound, 47.3, None),
        ],
        vec![
            snapshot("b", Direction::Westbound, 47.4, None),
            snapshot("a", Direction::Eastbound, 47.5, None),
        ],
    ];
    for cycle in &cycles {
        let outcome = sync.reconcile(cycle).expect("reconcile");
        for instruction in &outcome.instructions {
            if instruction.is_create() {
                created.push(instruction.payload().id.clone());
            }
        }
    }

    created.sort_by(|a, b| a.0.cmp(&b.0));
    assert_eq!(created, vec![BusId::from("a"), BusId::from("b")]);
}

#[test]
fn scenario_a_create_plus_starting_alert() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    let outcome = sync
        .reconcile(&[snapshot("271E-1", Direction::Eastbound, 47.6, Some("10912"))])
        .expect("reconcile");

    assert_eq!(outcome.instructions.len(), 1);
    assert!(outcome.instructions[0].is_create());
    assert_eq!(outcome.alerts.len(), 1);
    assert!(outcome.alerts[0].message.contains("starting at stop 10912"));
}

#[test]
fn scenario_b_identical_calls_yield_create_then_update() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    let bus = snapshot("271E-1", Direction::Eastbound, 47.6, None);

    let first = sync.reconcile(std::slice::from_ref(&bus)).expect("first");
    let second = sync.reconcile(std::slice::from_ref(&bus)).expect("second");

    assert!(first.instructions[0].is_create());
    assert!(!second.instructions[0].is_create());
    assert_eq!(
        first.instructions[0].payload(),
        second.instructions[0].payload()
    );
}

#[test]
fn scenario_c_unseen_id_is_always_a_create() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    sync.reconcile(&[snapshot("a", Direction::Eastbound, 47.1, None)])
        .expect("seed");

    let outcome = sync
        .reconcile(&[
            snapshot("a", Direction::Eastbound, 47.2, None),
            snapshot("brand-new", Direction::Westbound, 47.9, None),
        ])
        .expect("reconcile");

    assert!(!outcome.instructions[0].is_create());
    assert!(outcome.instructions[1].is_create());
}

#[test]
fn scenario_d_empty_list_is_a_no_op() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    sync.reconcile(&[snapshot("a", Direction::Eastbound, 47.1, None)])
        .expect("seed");

    let outcome = sync.reconcile(&[]).expect("empty");
    assert!(outcome.instructions.is_empty());
    assert_eq!(sync.markers().len(), 1);
}

#[test]
fn every_poll_trigger_repeats_alerts_across_cycles() {
    let mut sync = make_synchronizer(AlertTrigger::EveryPoll);
    let bus = snapshot("271E-1", Direction::Eastbound, 47.6, Some("10912"));

    for _ in 0..3 {
        let outcome = sync.reconcile(std::slice::from_ref(&bus)).expect("reconcile");
        assert_eq!(outcome.alerts.len(), 1, "fires every cycle it holds");
    }
}

#[test]
fn on_entry_trigger_fires_once_while_condition_holds() {
    let mut sync = make_synchronizer(AlertTrigger::OnEntry);
    let bus = snapshot("271E-1", Direction::Eastbound, 47.6, Some("10912"));

    let first = sync.reconcile(std::slice::from_ref(&bus)).expect("first");
    assert_eq!(first.alerts.len(), 1);
    for _ in 0..2 {
        let repeat = sync.reconcile(std::slice::from_ref(&bus)).expect("repeat");
        assert!(repeat.alerts.is_empty(), "no repeat while holding");
    }
}
