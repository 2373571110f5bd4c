//! Shared daemon state surfaced through the status socket.

use std::collections::VecDeque;

use serde::Serialize;

use buswatch_sync::{AlertSignal, FreshnessReport};

/// How many fired alerts the status payload retains.
pub const ALERT_RING_CAP: usize = 32;

/// Bookkeeping for the most recent successful poll cycle.
#[derive(Debug, Clone, Serialize)]
pub struct PollStats {
    pub cycle: u64,
    pub snapshots: usize,
    pub created: usize,
    pub updated: usize,
    pub completed_at_unix: u64,
}

/// Everything the poll task publishes for the socket server to read.
#[derive(Debug, Default)]
pub struct DaemonState {
    /// Latest rendered summary panel.
    pub panel: String,
    pub last_poll: Option<PollStats>,
    /// Highest cycle number processed so far, successful or not.
    pub poll_cycles: u64,
    pub fetch_failures: u64,
    pub last_error: Option<String>,
    pub tracked_buses: usize,
    pub freshness: FreshnessReport,
    pub recent_alerts: VecDeque<AlertSignal>,
}

impl DaemonState {
    pub fn record_success(
        &mut self,
        stats: PollStats,
        panel: String,
        tracked_buses: usize,
        freshness: FreshnessReport,
        alerts: &[AlertSignal],
    ) {
        self.poll_cycles = stats.cycle;
        self.last_poll = Some(stats);
        self.panel = panel;
        self.tracked_buses = tracked_buses;
        self.freshness = freshness;
        self.last_error = None;
        for alert in alerts {
            if self.recent_alerts.len() == ALERT_RING_CAP {
                self.recent_alerts.pop_front();
            }
            self.recent_alerts.push_back(alert.clone());
        }
    }

    pub fn record_failure(&mut self, cycle: u64, message: String) {
        self.poll_cycles = cycle;
        self.fetch_failures += 1;
        self.last_error = Some(message);
    }
}

#[cfg(test)]
mod tests {
    use buswatch_core::types::{BusId, StopId};
    use buswatch_sync::AlertKind;

    use super::*;

    fn alert(n: usize) -> AlertSignal {
        AlertSignal {
            bus: BusId::from(format!("bus-{n}").as_str()),
            stop: StopId::from("10912"),
            kind: AlertKind::StartingAtStop,
            message: format!("alert {n}"),
        }
    }

    fn stats(cycle: u64) -> PollStats {
        PollStats {
            cycle,
            snapshots: 2,
            created: 1,
            updated: 1,
            completed_at_unix: 1_700_000_000,
        }
    }

    #[test]
    fn success_clears_last_error() {
        let mut state = DaemonState::default();
        state.record_failure(1, "boom".to_string());
        assert_eq!(state.fetch_failures, 1);
        assert!(state.last_error.is_some());

        state.record_success(
            stats(2),
            "panel".to_string(),
            2,
            FreshnessReport::default(),
            &[],
        );
        assert!(state.last_error.is_none());
        assert_eq!(state.poll_cycles, 2);
        assert_eq!(state.fetch_failures, 1, "failure count is cumulative");
    }

    #[test]
    fn alert_ring_is_bounded() {
        let mut state = DaemonState::default();
        let alerts: Vec<AlertSignal> = (0..ALERT_RING_CAP + 10).map(alert).collect();
        state.record_success(
            stats(1),
            String::new(),
            0,
            FreshnessReport::default(),
            &alerts,
        );
        assert_eq!(state.recent_alerts.len(), ALERT_RING_CAP);
        // Oldest entries were dropped.
        assert_eq!(
            state.recent_alerts.front().expect("front").message,
            "alert 10"
        );
    }
}
