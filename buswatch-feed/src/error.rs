//! Error types for buswatch-feed.

use std::path::PathBuf;

use thiserror::Error;

/// All errors that can arise from fetching and decoding the feed.
#[derive(Debug, Error)]
pub enum FeedError {
    /// HTTP transport failure (connection refused, timeout, non-2xx status).
    #[error("feed request failed: {0}")]
    Http(Box<ureq::Error>),

    /// The response body was not the expected JSON shape.
    #[error("feed returned invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A GTFS table failed to parse.
    #[error("GTFS table error: {0}")]
    Csv(#[from] csv::Error),

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Realtime mode was selected but the config names no GTFS tables.
    #[error("realtime feed mode requires gtfs table paths in the config")]
    MissingGtfsTables,
}

impl From<ureq::Error> for FeedError {
    fn from(err: ureq::Error) -> Self {
        FeedError::Http(Box::new(err))
    }
}

/// Convenience constructor for [`FeedError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> FeedError {
    FeedError::Io {
        path: path.into(),
        source,
    }
}
