//! `buswatch panel` — one poll, printed as the rendered summary panel.

use std::path::PathBuf;

use anyhow::{Context, Result};

use buswatch_core::config;
use buswatch_feed::{unix_millis_now, SnapshotFeed};
use buswatch_render::PanelRenderer;

pub fn run() -> Result<()> {
    let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;
    let config = config::load_at(&home).context("failed to load config")?;

    let feed = SnapshotFeed::from_config(&config).context("failed to build feed")?;
    let snapshots = feed.poll(unix_millis_now()).context("feed fetch failed")?;

    let renderer = PanelRenderer::new().context("failed to build renderer")?;
    let panel = renderer
        .render_panel(&config.panel_heading, &snapshots)
        .context("failed to render panel")?;
    println!("{panel}");
    Ok(())
}
