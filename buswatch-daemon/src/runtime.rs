use std::fs;
use std::io::ErrorKind;
use std::os::unix::net::UnixStream as StdUnixStream;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::unix::OwnedWriteHalf;
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{broadcast, RwLock};
use tokio::time::MissedTickBehavior;

use buswatch_core::config::{self, Config};
use buswatch_feed::{unix_millis_now, SnapshotFeed};
use buswatch_render::PanelRenderer;
use buswatch_sync::{freshness, AlertEngine, ReconcileOutcome, Synchronizer};

use crate::error::{io_err, DaemonError};
use crate::paths::{buswatch_root, socket_path};
use crate::protocol::{DaemonRequest, DaemonResponse};
use crate::state::{DaemonState, PollStats};

pub type SharedState = Arc<RwLock<DaemonState>>;

/// Start the daemon runtime and block the current thread until it exits.
pub fn start_blocking(home: &Path) -> Result<(), DaemonError> {
    init_tracing();
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| io_err("tokio-runtime", e))?;
    runtime.block_on(run(home.to_path_buf()))
}

/// Run the daemon runtime.
pub async fn run(home: PathBuf) -> Result<(), DaemonError> {
    let config = config::load_at(&home)?;
    ensure_runtime_dirs(&home)?;

    let state: SharedState = Arc::new(RwLock::new(DaemonState::default()));
    let started_at_unix = unix_seconds_now();

    let (shutdown_tx, _) = broadcast::channel::<()>(16);

    let poll_handle = {
        let shutdown = shutdown_tx.clone();
        let state = state.clone();
        tokio::spawn(async move {
            let result = poll_task(config, state, shutdown.subscribe()).await;
            let _ = shutdown.send(());
            result
        })
    };

    let socket_handle = {
        let shutdown = shutdown_tx.clone();
        let home = home.clone();
        let state = state.clone();
        tokio::spawn(async move {
            let result = socket_server_task(
                home,
                state,
                shutdown.clone(),
                shutdown.subscribe(),
                started_at_unix,
            )
            .await;
            let _ = shutdown.send(());
            result
        })
    };

    let signal_handle = {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            let mut shutdown_rx = shutdown.subscribe();
            tokio::select! {
                _ = shutdown_rx.recv() => Ok(()),
                signal = tokio::signal::ctrl_c() => {
                    match signal {
                        Ok(()) => {
                            tracing::info!("received ctrl-c, shutting down daemon");
                            let _ = shutdown.send(());
                            Ok(())
                        }
                        Err(err) => Err(DaemonError::Protocol(format!("ctrl-c handler failed: {err}"))),
                    }
                }
            }
        })
    };

    let (poll_result, socket_result, signal_result) =
        tokio::join!(poll_handle, socket_handle, signal_handle);

    handle_join("poll", poll_result)?;
    handle_join("socket_server", socket_result)?;
    handle_join("signal_handler", signal_result)?;
    Ok(())
}

async fn poll_task(
    config: Config,
    state: SharedState,
    mut shutdown_rx: broadcast::Receiver<()>,
) -> Result<(), DaemonError> {
    // Feed construction reads the static GTFS tables from disk.
    let feed = {
        let config = config.clone();
        tokio::task::spawn_blocking(move || SnapshotFeed::from_config(&config))
            .await
            .map_err(|err| DaemonError::Protocol(format!("feed init join error: {err}")))??
    };
    let feed = Arc::new(feed);

    let mut synchronizer = Synchronizer::new(AlertEngine::from_config(&config.alerts))?;
    let panel = PanelRenderer::new()?;
    let active_window = Duration::from_secs(config.active_window_secs);

    let mut interval =
        tokio::time::interval(Duration::from_millis(config.poll_interval_ms.max(1)));
    // An in-flight cycle holds the loop, and Skip drops the ticks that
    // elapsed meanwhile — cycles never overlap and reconcile stays serial.
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let mut cycle: u64 = 0;
    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            _ = interval.tick() => {
                cycle += 1;
                let now_ms = unix_millis_now();
                let fetched = {
                    let feed = feed.clone();
                    tokio::task::spawn_blocking(move || feed.poll(now_ms))
                        .await
                        .map_err(|err| DaemonError::Protocol(format!("poll join error: {err}")))?
                };

                match fetched {
                    Ok(snapshots) => {
                        match process_cycle(&mut synchronizer, &panel, &config, &snapshots) {
                            Ok((outcome, panel_text)) => {
                                for alert in &outcome.alerts {
                                    tracing::info!(
                                        bus = %alert.bus,
                                        stop = %alert.stop,
                                        message = %alert.message,
                                        "bus alert",
                                    );
                                }
                                for instruction in &outcome.instructions {
                                    tracing::debug!(
                                        bus = %instruction.payload().id,
                                        create = instruction.is_create(),
                                        "marker instruction",
                                    );
                                }

                                let report = freshness::summarize(
                                    synchronizer.markers(),
                                    now_ms,
                                    active_window,
                                );
                                let stats = PollStats {
                                    cycle,
                                    snapshots: snapshots.len(),
                                    created: outcome.created(),
                                    updated: outcome.updated(),
                                    completed_at_unix: unix_seconds_now(),
                                };
                                tracing::debug!(
                                    cycle,
                                    snapshots = stats.snapshots,
                                    created = stats.created,
                                    updated = stats.updated,
                                    "poll cycle completed",
                                );

                                let tracked = synchronizer.markers().len();
                                let mut guard = state.write().await;
                                guard.record_success(
                                    stats,
                                    panel_text,
                                    tracked,
                                    report,
                                    &outcome.alerts,
                                );
                            }
                            Err(err) => {
                                tracing::error!(error = %err, cycle, "reconcile failed");
                                state.write().await.record_failure(cycle, err.to_string());
                            }
                        }
                    }
                    Err(err) => {
                        // Every tick is its own retry; no backoff.
                        tracing::warn!(error = %err, cycle, "feed fetch failed");
                        state.write().await.record_failure(cycle, err.to_string());
                    }
                }
            }
        }
    }

    Ok(())
}

fn process_cycle(
    synchronizer: &mut Synchronizer,
    panel: &PanelRenderer,
    config: &Config,
    snapshots: &[buswatch_core::types::BusSnapshot],
) -> Result<(ReconcileOutcome, String), DaemonError> {
    let outcome = synchronizer.reconcile(snapshots)?;
    let panel_text = panel.render_panel(&config.panel_heading, snapshots)?;
    Ok((outcome, panel_text))
}

async fn socket_server_task(
    home: PathBuf,
    state: SharedState,
    shutdown_tx: broadcast::Sender<()>,
    mut shutdown_rx: broadcast::Receiver<()>,
    started_at_unix: u64,
) -> Result<(), DaemonError> {
    let socket = socket_path(&home);
    prepare_socket_for_bind(&socket)?;

    let listener = UnixListener::bind(&socket).map_err(|e| io_err(&socket, e))?;
    set_socket_permissions(&socket)?;

    loop {
        tokio::select! {
            _ = shutdown_rx.recv() => break,
            accepted = listener.accept() => {
                let (stream, _) = accepted.map_err(|e| io_err(&socket, e))?;
                let home = home.clone();
                let state = state.clone();
                let shutdown_tx = shutdown_tx.clone();
                tokio::spawn(async move {
                    if let Err(err) =
                        handle_socket_client(stream, home, state, shutdown_tx, started_at_unix)
                            .await
                    {
                        tracing::error!(error = %err, "socket client error");
                    }
                });
            }
        }
    }

    if socket.exists() {
        let _ = fs::remove_file(&socket);
    }
    Ok(())
}

async fn handle_socket_client(
    stream: UnixStream,
    home: PathBuf,
    state: SharedState,
    shutdown_tx: broadcast::Sender<()>,
    started_at_unix: u64,
) -> Result<(), DaemonError> {
    let (reader, mut writer) = stream.into_split();
    let mut lines = BufReader::new(reader).lines();

    while let Some(line) = lines
        .next_line()
        .await
        .map_err(|e| io_err("daemon socket read", e))?
    {
        if line.trim().is_empty() {
            continue;
        }

        let request: Result<DaemonRequest, _> = serde_json::from_str(&line);
        let request = match request {
            Ok(request) => request,
            Err(err) => {
                write_response(
                    &mut writer,
                    &DaemonResponse::error(format!("invalid request JSON: {err}")),
                )
                .await?;
                continue;
            }
        };

        let response = match request.cmd.as_str() {
            "status" => {
                let payload = build_status_payload(&home, &state, started_at_unix).await;
                DaemonResponse::ok(payload)
            }
            "panel" => {
                let guard = state.read().await;
                DaemonResponse::ok(json!({ "panel": guard.panel }))
            }
            "stop" => {
                let _ = shutdown_tx.send(());
                DaemonResponse::ok(json!({ "stopping": true }))
            }
            other => DaemonResponse::error(format!("unknown command '{other}'")),
        };

        write_response(&mut writer, &response).await?;
        if request.cmd == "stop" {
            break;
        }
    }

    Ok(())
}

async fn build_status_payload(home: &Path, state: &SharedState, started_at_unix: u64) -> Value {
    let guard = state.read().await;
    json!({
        "running": true,
        "started_at_unix": started_at_unix,
        "poll_cycles": guard.poll_cycles,
        "fetch_failures": guard.fetch_failures,
        "last_error": guard.last_error,
        "tracked_buses": guard.tracked_buses,
        "last_poll": guard.last_poll,
        "freshness": guard.freshness,
        "recent_alerts": guard.recent_alerts,
        "socket": socket_path(home).display().to_string(),
    })
}

fn prepare_socket_for_bind(socket: &Path) -> Result<(), DaemonError> {
    if !socket.exists() {
        return Ok(());
    }

    match StdUnixStream::connect(socket) {
        Ok(_) => {
            return Err(DaemonError::Protocol(format!(
                "daemon socket already in use: {}",
                socket.display()
            )));
        }
        Err(err) => {
            tracing::warn!(
                socket = %socket.display(),
                error = %err,
                "removing stale daemon socket before bind",
            );
        }
    }

    match fs::remove_file(socket) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
        Err(err) => Err(io_err(socket, err)),
    }
}

fn ensure_runtime_dirs(home: &Path) -> Result<(), DaemonError> {
    let root = buswatch_root(home);
    if !root.exists() {
        fs::create_dir_all(&root).map_err(|e| io_err(&root, e))?;
    }
    Ok(())
}

async fn write_response(
    writer: &mut OwnedWriteHalf,
    response: &DaemonResponse,
) -> Result<(), DaemonError> {
    let payload = serde_json::to_string(response)?;
    writer
        .write_all(payload.as_bytes())
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .write_all(b"\n")
        .await
        .map_err(|e| io_err("daemon socket write", e))?;
    writer
        .flush()
        .await
        .map_err(|e| io_err("daemon socket flush", e))?;
    Ok(())
}

fn handle_join(
    task: &str,
    result: Result<Result<(), DaemonError>, tokio::task::JoinError>,
) -> Result<(), DaemonError> {
    match result {
        Ok(inner) => inner,
        Err(err) => Err(DaemonError::Protocol(format!(
            "{task} task join failure: {err}"
        ))),
    }
}

fn unix_seconds_now() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = fmt().with_env_filter(filter).with_target(false).try_init();
}

#[cfg(unix)]
fn set_socket_permissions(path: &Path) -> Result<(), DaemonError> {
    use std::os::unix::fs::PermissionsExt;
    fs::set_permissions(path, fs::Permissions::from_mode(0o600)).map_err(|e| io_err(path, e))
}

#[cfg(not(unix))]
fn set_socket_permissions(_path: &Path) -> Result<(), DaemonError> {
    Ok(())
}
