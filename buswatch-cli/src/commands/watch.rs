//! `buswatch watch` — run the polling daemon in the foreground.

use anyhow::{Context, Result};

use buswatch_daemon::start_blocking;

pub fn run() -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;
    start_blocking(&home).context("daemon exited with error")?;
    Ok(())
}
