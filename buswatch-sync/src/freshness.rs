//! Marker freshness classification.
//!
//! Markers are never evicted, so the store accumulates every bus ever seen.
//! This module reports how current each entry is instead:
//! 1. `Live` — last report within the active window
//! 2. `Aging` — within 3× the active window
//! 3. `Lost` — older than that

use std::time::Duration;

use serde::Serialize;

use buswatch_core::types::BusId;

use crate::marker::MarkerStore;

const AGING_MULTIPLIER: i64 = 3;

/// Freshness classification for one tracked marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FreshnessSignal {
    Live,
    Aging,
    Lost,
}

/// Classify one marker by the age of its last report at `now_ms`.
/// Reports from the future (clock skew) count as live.
pub fn check(last_seen_ms: i64, now_ms: i64, active_window: Duration) -> FreshnessSignal {
    let window_ms = active_window.as_millis() as i64;
    let age_ms = now_ms.saturating_sub(last_seen_ms).max(0);
    if age_ms <= window_ms {
        FreshnessSignal::Live
    } else if age_ms <= window_ms * AGING_MULTIPLIER {
        FreshnessSignal::Aging
    } else {
        FreshnessSignal::Lost
    }
}

pub fn signal_key(signal: &FreshnessSignal) -> &'static str {
    match signal {
        FreshnessSignal::Live => "live",
        FreshnessSignal::Aging => "aging",
        FreshnessSignal::Lost => "lost",
    }
}

/// Freshness of one tracked bus, formatted for status output.
#[derive(Debug, Clone, Serialize)]
pub struct BusFreshness {
    pub bus: BusId,
    pub signal: &'static str,
    pub age: String,
}

/// Store-wide freshness summary.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FreshnessReport {
    pub live: usize,
    pub aging: usize,
    pub lost: usize,
    /// Per-bus rows, sorted by bus id.
    pub buses: Vec<BusFreshness>,
}

/// Summarize every tracked marker at `now_ms`.
pub fn summarize(store: &MarkerStore, now_ms: i64, active_window: Duration) -> FreshnessReport {
    let mut markers: Vec<_> = store.iter().collect();
    markers.sort_by(|a, b| a.id.0.cmp(&b.id.0));

    let mut report = FreshnessReport::default();
    for marker in markers {
        let signal = check(marker.last_seen_ms, now_ms, active_window);
        match signal {
            FreshnessSignal::Live => report.live += 1,
            FreshnessSignal::Aging => report.aging += 1,
            FreshnessSignal::Lost => report.lost += 1,
        }
        let age_secs = (now_ms.saturating_sub(marker.last_seen_ms).max(0) / 1000) as u64;
        report.buses.push(BusFreshness {
            bus: marker.id.clone(),
            signal: signal_key(&signal),
            age: format_age(age_secs),
        });
    }
    report
}

/// Compact age rendering: `42s`, `5m`, `2h`, `3d`.
pub fn format_age(seconds: u64) -> String {
    if seconds < 60 {
        return format!("{seconds}s");
    }
    if seconds < 60 * 60 {
        return format!("{}m", seconds / 60);
    }
    if seconds < 60 * 60 * 24 {
        return format!("{}h", seconds / (60 * 60));
    }
    format!("{}d", seconds / (60 * 60 * 24))
}
