//! Tera rendering engine — [`PanelRenderer`].
//!
//! Both templates are baked into the binary at compile time via
//! `include_str!`; there is no template directory to configure.

use tera::Tera;

use buswatch_core::types::BusSnapshot;

use crate::context::{BusEntry, PanelContext};
use crate::error::RenderError;

const TPLS: &[(&str, &str)] = &[
    ("panel.txt.tera", include_str!("templates/panel.txt.tera")),
    ("popup.txt.tera", include_str!("templates/popup.txt.tera")),
];

/// Tera-based renderer for the summary panel and popup text.
///
/// Create once with [`PanelRenderer::new`] and reuse.
pub struct PanelRenderer {
    tera: Tera,
}

impl PanelRenderer {
    /// Construct a new [`PanelRenderer`] with the embedded templates.
    pub fn new() -> Result<Self, RenderError> {
        let mut tera = Tera::default();
        tera.add_raw_templates(TPLS.to_vec())?;
        Ok(PanelRenderer { tera })
    }

    /// Render the summary panel: the heading plus one block per snapshot,
    /// in input order. An empty snapshot list yields the heading only.
    ///
    /// Pure with respect to tracked-marker state — this depends on nothing
    /// but the input list.
    pub fn render_panel(
        &self,
        heading: &str,
        snapshots: &[BusSnapshot],
    ) -> Result<String, RenderError> {
        self.render_panel_context(&PanelContext::from_snapshots(heading, snapshots))
    }

    /// Render the panel from a caller-built [`PanelContext`].
    pub fn render_panel_context(&self, ctx: &PanelContext) -> Result<String, RenderError> {
        let tera_ctx = ctx.to_tera_context()?;
        Ok(self.tera.render("panel.txt.tera", &tera_ctx)?)
    }

    /// Render the popup text for a single snapshot.
    pub fn render_popup(&self, snapshot: &BusSnapshot) -> Result<String, RenderError> {
        let entry = BusEntry::from_snapshot(snapshot);
        let tera_ctx = entry.to_tera_context()?;
        let rendered = self.tera.render("popup.txt.tera", &tera_ctx)?;
        Ok(rendered.trim_end().to_string())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
