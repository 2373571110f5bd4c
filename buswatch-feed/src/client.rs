//! Blocking HTTP client for the upstream feed.

use std::time::Duration;

use buswatch_core::types::BusSnapshot;

use crate::error::FeedError;
use crate::realtime::VehicleFeed;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Thin wrapper over a [`ureq::Agent`] bound to one feed URL.
///
/// The client is blocking; callers that live on an async runtime run it
/// through `spawn_blocking`.
pub struct FeedClient {
    agent: ureq::Agent,
    url: String,
}

impl std::fmt::Debug for FeedClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedClient").field("url", &self.url).finish()
    }
}

impl FeedClient {
    pub fn new(url: impl Into<String>) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(REQUEST_TIMEOUT)
            .build();
        FeedClient {
            agent,
            url: url.into(),
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// `GET <url>` → JSON array of wire-shaped snapshots (direct mode).
    pub fn fetch_snapshots(&self) -> Result<Vec<BusSnapshot>, FeedError> {
        let response = self.agent.get(&self.url).call()?;
        let snapshots = serde_json::from_reader(response.into_reader())?;
        Ok(snapshots)
    }

    /// `GET <url>` → GTFS-realtime vehicle-positions document (realtime mode).
    pub fn fetch_realtime(&self) -> Result<VehicleFeed, FeedError> {
        let response = self.agent.get(&self.url).call()?;
        let feed = serde_json::from_reader(response.into_reader())?;
        Ok(feed)
    }
}
