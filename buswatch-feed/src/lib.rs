//! # buswatch-feed
//!
//! The fetch collaborator: polls the upstream feed over HTTP and resolves it
//! to a flat list of [`BusSnapshot`]s.
//!
//! Two feed modes are supported. *Direct* mode expects the URL to return a
//! JSON array of wire-shaped snapshots. *Realtime* mode expects a
//! GTFS-realtime vehicle-positions document and joins it against static GTFS
//! tables (trips, stops, optional stop sequences) to build the snapshots,
//! filtered to a single route and an activity window.

pub mod client;
pub mod error;
pub mod gtfs;
pub mod realtime;
pub mod snapshot;

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use buswatch_core::types::BusSnapshot;
use buswatch_core::{Config, FeedMode};

pub use client::FeedClient;
pub use error::FeedError;
pub use gtfs::StaticTables;
pub use realtime::VehicleFeed;

/// A configured snapshot source, ready to poll.
#[derive(Debug)]
pub enum SnapshotFeed {
    /// The URL serves ready-made snapshots.
    Direct(FeedClient),
    /// The URL serves GTFS-realtime vehicle positions.
    Realtime {
        client: FeedClient,
        tables: StaticTables,
        route_id: String,
        active_window: Duration,
    },
}

impl SnapshotFeed {
    /// Build a feed from the loaded config. Realtime mode loads the static
    /// GTFS tables eagerly so table errors surface at startup, not per poll.
    pub fn from_config(config: &Config) -> Result<Self, FeedError> {
        let client = FeedClient::new(&config.feed.url);
        match config.feed.mode {
            FeedMode::Direct => Ok(SnapshotFeed::Direct(client)),
            FeedMode::Realtime => {
                let paths = config
                    .feed
                    .gtfs
                    .as_ref()
                    .ok_or(FeedError::MissingGtfsTables)?;
                let tables = StaticTables::load(paths, &config.feed.route_id)?;
                Ok(SnapshotFeed::Realtime {
                    client,
                    tables,
                    route_id: config.feed.route_id.clone(),
                    active_window: Duration::from_secs(config.active_window_secs),
                })
            }
        }
    }

    /// Fetch one poll's worth of snapshots. `now_ms` is the caller's clock,
    /// used for the realtime activity window.
    pub fn poll(&self, now_ms: i64) -> Result<Vec<BusSnapshot>, FeedError> {
        match self {
            SnapshotFeed::Direct(client) => client.fetch_snapshots(),
            SnapshotFeed::Realtime {
                client,
                tables,
                route_id,
                active_window,
            } => {
                let feed = client.fetch_realtime()?;
                Ok(snapshot::build_snapshots(
                    &feed,
                    tables,
                    route_id,
                    now_ms,
                    *active_window,
                ))
            }
        }
    }
}

/// Current wall-clock time as epoch milliseconds.
pub fn unix_millis_now() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as i64
}
