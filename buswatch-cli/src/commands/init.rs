//! `buswatch init` — write the default config.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use buswatch_core::config::{self, Config};
use buswatch_core::FeedMode;

/// Arguments for `buswatch init`.
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Feed URL to poll.
    #[arg(long)]
    pub url: Option<String>,

    /// GTFS route id to watch.
    #[arg(long)]
    pub route: Option<String>,

    /// Poll cadence in milliseconds.
    #[arg(long)]
    pub interval_ms: Option<u64>,

    /// Treat the URL as a direct snapshot feed instead of GTFS-realtime.
    #[arg(long)]
    pub direct: bool,

    /// Overwrite an existing config.
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    pub fn run(self) -> Result<()> {
        let home: PathBuf = dirs::home_dir().context("could not determine home directory")?;

        let mut config = Config::default();
        if let Some(url) = self.url {
            config.feed.url = url;
        }
        if let Some(route) = self.route {
            config.feed.route_id = route;
        }
        if let Some(interval_ms) = self.interval_ms {
            config.poll_interval_ms = interval_ms;
        }
        if self.direct {
            config.feed.mode = FeedMode::Direct;
        }

        let path = config::config_path_at(&home);
        if self.force {
            config::save_at(&home, &config).context("failed to write config")?;
            println!("wrote {}", path.display());
            return Ok(());
        }

        let existed = path.exists();
        config::init_at(&home, config).context("failed to initialize config")?;
        if existed {
            println!("config already exists at {} (use --force to overwrite)", path.display());
        } else {
            println!("wrote {}", path.display());
        }
        Ok(())
    }
}
