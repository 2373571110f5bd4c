//! # buswatch-sync
//!
//! The bus feed synchronizer: owns the tracked-marker mapping and, on each
//! poll cycle, reconciles it against a fresh snapshot list, producing one
//! create-or-update render instruction per snapshot plus any alert signals.
//!
//! Call [`Synchronizer::reconcile`] once per poll with the fetched
//! snapshots; consume the returned [`ReconcileOutcome`].

pub mod alerts;
pub mod error;
pub mod freshness;
pub mod marker;
pub mod synchronizer;

pub use alerts::{AlertEngine, AlertKind, AlertSignal};
pub use error::SyncError;
pub use freshness::{FreshnessReport, FreshnessSignal};
pub use marker::{MarkerStore, TrackedMarker};
pub use synchronizer::{MarkerPayload, ReconcileOutcome, RenderInstruction, Synchronizer};
