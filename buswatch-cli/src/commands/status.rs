//! `buswatch status` — query the daemon over its Unix socket.

use anyhow::{Context, Result};

use buswatch_daemon::paths::socket_path;
use buswatch_daemon::{request_status, DaemonError};

pub fn run() -> Result<()> {
    let home = dirs::home_dir().context("could not determine home directory")?;

    match request_status(&home) {
        Ok(status) => {
            println!(
                "{}",
                serde_json::to_string_pretty(&status)
                    .context("failed to render daemon status JSON")?
            );
        }
        Err(DaemonError::DaemonNotRunning { .. }) => {
            let payload = serde_json::json!({
                "running": false,
                "socket": socket_path(&home).display().to_string(),
            });
            println!(
                "{}",
                serde_json::to_string_pretty(&payload)
                    .context("failed to render daemon status JSON")?
            );
        }
        Err(err) => return Err(err).context("failed to query daemon status"),
    }
    Ok(())
}
