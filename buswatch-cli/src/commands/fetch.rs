//! `buswatch fetch` — one poll, printed as a table or JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use tabled::{settings::Style, Table, Tabled};

use buswatch_core::config;
use buswatch_core::types::{BusSnapshot, Direction};
use buswatch_feed::{unix_millis_now, SnapshotFeed};
use buswatch_sync::freshness::format_age;

/// Arguments for `buswatch fetch`.
#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,
}

#[derive(Tabled)]
struct BusTableRow {
    #[tabled(rename = "bus")]
    bus: String,
    #[tabled(rename = "direction")]
    direction: String,
    #[tabled(rename = "stop")]
    stop: String,
    #[tabled(rename = "status")]
    status: String,
    #[tabled(rename = "position")]
    position: String,
    #[tabled(rename = "updated")]
    updated: String,
}

impl FetchArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
        let config = config::load_at(&home).context("failed to load config")?;

        let feed = SnapshotFeed::from_config(&config).context("failed to build feed")?;
        let now_ms = unix_millis_now();
        let snapshots = feed.poll(now_ms).context("feed fetch failed")?;

        if self.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&snapshots)
                    .context("failed to serialize snapshots")?
            );
            return Ok(());
        }

        print_table(&config.feed.route_id, &snapshots, now_ms);
        Ok(())
    }
}

fn print_table(route_id: &str, snapshots: &[BusSnapshot], now_ms: i64) {
    println!(
        "buswatch v{} | route {} | {} buses",
        env!("CARGO_PKG_VERSION"),
        route_id,
        snapshots.len(),
    );

    if snapshots.is_empty() {
        println!("No active buses in the feed.");
        return;
    }

    let rows: Vec<BusTableRow> = snapshots
        .iter()
        .map(|snapshot| BusTableRow {
            bus: snapshot.id.to_string(),
            direction: direction_cell(snapshot.direction),
            stop: snapshot.stop_label.clone(),
            status: snapshot.status.clone(),
            position: format!("{:.4}, {:.4}", snapshot.position.lat, snapshot.position.lon),
            updated: age_cell(snapshot.last_updated_ms, now_ms),
        })
        .collect();

    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
}

fn direction_cell(direction: Direction) -> String {
    match direction {
        Direction::Eastbound => format!("{} Eastbound", "→".green().bold()),
        Direction::Westbound => format!("{} Westbound", "←".blue().bold()),
    }
}

fn age_cell(last_updated_ms: i64, now_ms: i64) -> String {
    let age_secs = (now_ms.saturating_sub(last_updated_ms).max(0) / 1000) as u64;
    format!("{} ago", format_age(age_secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_cell_is_compact() {
        let now_ms = 1_700_000_000_000;
        assert_eq!(age_cell(now_ms - 42_000, now_ms), "42s ago");
        assert_eq!(age_cell(now_ms - 300_000, now_ms), "5m ago");
        assert_eq!(age_cell(now_ms + 5_000, now_ms), "0s ago");
    }
}
