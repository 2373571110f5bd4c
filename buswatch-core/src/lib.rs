//! Buswatch core library — domain types, configuration persistence, errors.
//!
//! Public API surface:
//! - [`types`] — newtypes and feed-facing domain structs
//! - [`error`] — [`CoreError`]
//! - [`config`] — load / save / init

pub mod config;
pub mod error;
pub mod types;

pub use config::{AlertConfig, Config, FeedConfig, FeedMode, GtfsPaths};
pub use error::CoreError;
pub use types::{
    AlertRule, AlertTrigger, BusId, BusSnapshot, Direction, Position, StopField, StopId, TripId,
};
