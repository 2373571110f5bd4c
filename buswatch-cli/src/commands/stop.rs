//! `buswatch stop` — request graceful daemon shutdown.

use anyhow::{Context, Result};

use buswatch_daemon::{request_stop, DaemonError};

pub fn run() -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;

    match request_stop(&home) {
        Ok(()) => println!("daemon stop requested"),
        Err(DaemonError::DaemonNotRunning { .. }) => {
            println!("daemon is not running");
        }
        Err(err) => return Err(err).context("failed to stop daemon"),
    }
    Ok(())
}
