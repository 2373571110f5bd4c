//! Point-condition alert evaluation.
//!
//! Each rule matches a snapshot's direction plus one of its stop fields.
//! With [`AlertTrigger::EveryPoll`] a matching snapshot fires on every
//! cycle the condition holds; with [`AlertTrigger::OnEntry`] a (bus, rule)
//! pair fires once when the condition first holds and re-arms when the
//! condition stops being observed for that bus.

use std::collections::HashSet;

use serde::Serialize;

use buswatch_core::types::{AlertRule, AlertTrigger, BusId, BusSnapshot, StopField, StopId};
use buswatch_core::AlertConfig;

/// What kind of stop condition an alert came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    /// The bus is at the rule's stop (`stop_id` match).
    StartingAtStop,
    /// The bus is heading to the rule's stop (`next_stop_id` match).
    NextStop,
}

/// One fired alert, ready for logging or event emission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AlertSignal {
    pub bus: BusId,
    pub stop: StopId,
    pub kind: AlertKind,
    pub message: String,
}

/// Evaluates alert rules across poll cycles.
#[derive(Debug)]
pub struct AlertEngine {
    trigger: AlertTrigger,
    rules: Vec<AlertRule>,
    /// (bus, rule index) pairs that matched during the previous cycle.
    previous: HashSet<(BusId, usize)>,
    /// (bus, rule index) pairs observed so far in the current cycle.
    current: HashSet<(BusId, usize)>,
}

impl AlertEngine {
    pub fn new(trigger: AlertTrigger, rules: Vec<AlertRule>) -> Self {
        AlertEngine {
            trigger,
            rules,
            previous: HashSet::new(),
            current: HashSet::new(),
        }
    }

    pub fn from_config(config: &AlertConfig) -> Self {
        Self::new(config.trigger, config.rules.clone())
    }

    /// Evaluate all rules against one snapshot, recording matches for the
    /// current cycle and returning the signals that fire.
    pub fn observe(&mut self, snapshot: &BusSnapshot) -> Vec<AlertSignal> {
        let mut fired = Vec::new();
        for (index, rule) in self.rules.iter().enumerate() {
            if !rule_matches(rule, snapshot) {
                continue;
            }
            let key = (snapshot.id.clone(), index);
            let entered = !self.previous.contains(&key);
            self.current.insert(key);

            let fire = match self.trigger {
                AlertTrigger::EveryPoll => true,
                AlertTrigger::OnEntry => entered,
            };
            if fire {
                fired.push(signal_for(rule, snapshot));
            }
        }
        fired
    }

    /// Close out the cycle: conditions observed now become the baseline the
    /// next cycle's edge detection compares against.
    pub fn finish_cycle(&mut self) {
        self.previous = std::mem::take(&mut self.current);
    }
}

fn rule_matches(rule: &AlertRule, snapshot: &BusSnapshot) -> bool {
    if snapshot.direction != rule.direction {
        return false;
    }
    let field = match rule.field {
        StopField::Current => &snapshot.stop_id,
        StopField::Next => &snapshot.next_stop_id,
    };
    field.as_ref() == Some(&rule.stop_id)
}

fn signal_for(rule: &AlertRule, snapshot: &BusSnapshot) -> AlertSignal {
    let (kind, message) = match rule.field {
        StopField::Current => (
            AlertKind::StartingAtStop,
            format!(
                "Bus {} is starting at stop {} ({})",
                snapshot.id, rule.stop_id, snapshot.direction
            ),
        ),
        StopField::Next => (
            AlertKind::NextStop,
            format!(
                "Bus {} has next stop {} ({})",
                snapshot.id, rule.stop_id, snapshot.direction
            ),
        ),
    };
    AlertSignal {
        bus: snapshot.id.clone(),
        stop: rule.stop_id.clone(),
        kind,
        message,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
