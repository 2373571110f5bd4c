//! # buswatch-render
//!
//! Tera-based rendering of the summary panel and per-bus popup text, plus
//! the direction-derived marker icon selector.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use buswatch_render::PanelRenderer;
//! use buswatch_core::types::BusSnapshot;
//!
//! fn print_panel(snapshots: &[BusSnapshot]) {
//!     if let Ok(renderer) = PanelRenderer::new() {
//!         if let Ok(panel) = renderer.render_panel("Route 271 Buses", snapshots) {
//!             println!("{panel}");
//!         }
//!     }
//! }
//! ```

pub mod context;
pub mod engine;
pub mod error;
pub mod icon;

pub use context::{format_last_updated, BusEntry, PanelContext};
pub use engine::PanelRenderer;
pub use error::RenderError;
pub use icon::MarkerIcon;
