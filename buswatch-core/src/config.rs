//! YAML configuration for the watcher.
//!
//! # Storage layout
//!
//! ```text
//! ~/.buswatch/
//!   config.yaml   (mode 0600, created by `buswatch init`)
//! ```
//!
//! # API pattern
//!
//! Every function touching the filesystem has two forms:
//! - `fn_at(home: &Path, …)` — explicit home; used in tests with `TempDir`
//! - `fn(…)` — derives home from `dirs::home_dir()`, delegates to `_at`
//!
//! Tests must NEVER call the no-arg wrappers; always use `_at`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::{AlertRule, AlertTrigger};

/// Default upstream vehicle-positions feed (King County Metro).
pub const DEFAULT_FEED_URL: &str =
    "https://s3.amazonaws.com/kcm-alerts-realtime-prod/vehiclepositions_pb.json";

/// GTFS route id for Route 271.
pub const DEFAULT_ROUTE_ID: &str = "100162";

/// Poll cadence in milliseconds.
pub const DEFAULT_POLL_INTERVAL_MS: u64 = 1000;

/// A vehicle report older than this is considered inactive.
pub const DEFAULT_ACTIVE_WINDOW_SECS: u64 = 600;

// ---------------------------------------------------------------------------
// Config types
// ---------------------------------------------------------------------------

/// How the upstream feed is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FeedMode {
    /// The URL returns a JSON array of ready-made bus snapshots.
    Direct,
    /// The URL returns a GTFS-realtime vehicle-positions document that is
    /// joined against static GTFS tables.
    #[default]
    Realtime,
}

/// Locations of the static GTFS tables used in realtime mode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GtfsPaths {
    pub trips: PathBuf,
    pub stops: PathBuf,
    /// Optional; enables `next_stop_id` resolution when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_times: Option<PathBuf>,
}

/// Upstream feed settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedConfig {
    #[serde(default)]
    pub mode: FeedMode,
    pub url: String,
    pub route_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gtfs: Option<GtfsPaths>,
}

/// Alert trigger mode and rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertConfig {
    #[serde(default)]
    pub trigger: AlertTrigger,
    #[serde(default)]
    pub rules: Vec<AlertRule>,
}

impl Default for AlertConfig {
    fn default() -> Self {
        AlertConfig {
            trigger: AlertTrigger::default(),
            rules: AlertRule::route_271_defaults(),
        }
    }
}

/// Root of the buswatch YAML config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    pub feed: FeedConfig,
    pub poll_interval_ms: u64,
    pub active_window_secs: u64,
    pub panel_heading: String,
    #[serde(default)]
    pub alerts: AlertConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            feed: FeedConfig {
                mode: FeedMode::Realtime,
                url: DEFAULT_FEED_URL.to_string(),
                route_id: DEFAULT_ROUTE_ID.to_string(),
                gtfs: None,
            },
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            active_window_secs: DEFAULT_ACTIVE_WINDOW_SECS,
            panel_heading: "Route 271 Buses".to_string(),
            alerts: AlertConfig::default(),
        }
    }
}

// ---------------------------------------------------------------------------
// Path helpers
// ---------------------------------------------------------------------------

/// `<home>/.buswatch/` — pure, no I/O.
pub fn buswatch_root_at(home: &Path) -> PathBuf {
    home.join(".buswatch")
}

/// `<home>/.buswatch/config.yaml` — pure, no I/O.
pub fn config_path_at(home: &Path) -> PathBuf {
    buswatch_root_at(home).join("config.yaml")
}

/// Creates `<home>/.buswatch/` (mode `0700`) if it does not yet exist.
pub fn ensure_root_at(home: &Path) -> Result<PathBuf, CoreError> {
    let dir = buswatch_root_at(home);
    if !dir.exists() {
        std::fs::create_dir_all(&dir)?;
        set_dir_permissions(&dir)?;
    }
    Ok(dir)
}

// ---------------------------------------------------------------------------
// Load
// ---------------------------------------------------------------------------

/// Load the config from `<home>/.buswatch/config.yaml`.
///
/// Returns `CoreError::ConfigNotFound` if absent,
/// `CoreError::Parse` (with path + line context) if malformed YAML.
pub fn load_at(home: &Path) -> Result<Config, CoreError> {
    let path = config_path_at(home);
    if !path.exists() {
        return Err(CoreError::ConfigNotFound { path });
    }
    let contents = std::fs::read_to_string(&path)?;
    serde_yaml::from_str(&contents).map_err(|e| CoreError::Parse { path, source: e })
}

/// `load_at` convenience wrapper.
pub fn load() -> Result<Config, CoreError> {
    load_at(&home()?)
}

// ---------------------------------------------------------------------------
// Save (atomic)
// ---------------------------------------------------------------------------

/// Atomically save the config to `<home>/.buswatch/config.yaml`.
///
/// Write flow: serialize → `.yaml.tmp` sibling → `chmod 0600` → `rename`.
/// `.tmp` is always in the same directory as the target (same filesystem).
pub fn save_at(home: &Path, config: &Config) -> Result<(), CoreError> {
    ensure_root_at(home)?;
    let path = config_path_at(home);
    let tmp_path = path.with_file_name("config.yaml.tmp");

    let yaml = serde_yaml::to_string(config)?;
    std::fs::write(&tmp_path, yaml)?;
    set_file_permissions(&tmp_path)?;
    std::fs::rename(&tmp_path, &path)?;
    Ok(())
}

/// `save_at` convenience wrapper.
pub fn save(config: &Config) -> Result<(), CoreError> {
    save_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Init
// ---------------------------------------------------------------------------

/// Write `config` as `<home>/.buswatch/config.yaml`.
///
/// Idempotent: if the file already exists, loads and returns it unchanged.
pub fn init_at(home: &Path, config: Config) -> Result<Config, CoreError> {
    let path = config_path_at(home);
    if path.exists() {
        return load_at(home);
    }
    save_at(home, &config)?;
    Ok(config)
}

/// `init_at` convenience wrapper.
pub fn init(config: Config) -> Result<Config, CoreError> {
    init_at(&home()?, config)
}

// ---------------------------------------------------------------------------
// Private helpers
// ---------------------------------------------------------------------------

fn home() -> Result<PathBuf, CoreError> {
    dirs::home_dir().ok_or(CoreError::HomeNotFound)
}

#[cfg(unix)]
fn set_dir_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_dir_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

#[cfg(unix)]
fn set_file_permissions(path: &Path) -> Result<(), CoreError> {
    use std::os::unix::fs::PermissionsExt;
    std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
    Ok(())
}
#[cfg(not(unix))]
fn set_file_permissions(_path: &Path) -> Result<(), CoreError> {
    Ok(())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn make_home() -> TempDir {
        TempDir::new().expect("tempdir")
    }

    #[test]
    fn config_path_is_correct() {
        let home = make_home();
        let path = config_path_at(home.path());
        assert!(path.ends_with(".buswatch/config.yaml"));
    }

    #[test]
    fn root_created_with_perms() {
        let home = make_home();
        let dir = ensure_root_at(home.path()).expect("ensure_root_at");
        assert!(dir.exists());
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mode = std::fs::metadata(&dir).unwrap().permissions().mode() & 0o777;
            assert_eq!(mode, 0o700);
        }
    }

    #[test]
    fn save_and_load_roundtrip() {
        let home = make_home();
        let mut config = Config::default();
        config.feed.route_id = "100001".to_string();
        config.poll_interval_ms = 2500;
        save_at(home.path(), &config).expect("save");
        let loaded = load_at(home.path()).expect("load");
        assert_eq!(loaded, config);
    }

    #[test]
    fn atomic_write_cleans_up_tmp() {
        let home = make_home();
        save_at(home.path(), &Config::default()).expect("save");
        let tmp = config_path_at(home.path()).with_file_name("config.yaml.tmp");
        assert!(!tmp.exists(), ".tmp must be gone after successful save");
    }

    #[test]
    fn load_missing_config_returns_not_found() {
        let home = make_home();
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, CoreError::ConfigNotFound { .. }));
    }

    #[test]
    fn init_is_idempotent() {
        let home = make_home();
        let mut first = Config::default();
        first.feed.url = "http://example.test/api/buses".to_string();
        init_at(home.path(), first.clone()).expect("first init");

        // A second init with different values must not clobber the file.
        let second = init_at(home.path(), Config::default()).expect("second init");
        assert_eq!(second.feed.url, "http://example.test/api/buses");
        let on_disk = load_at(home.path()).expect("load");
        assert_eq!(on_disk, first);
    }

    #[test]
    fn default_config_carries_route_271_values() {
        let config = Config::default();
        assert_eq!(config.feed.route_id, DEFAULT_ROUTE_ID);
        assert_eq!(config.poll_interval_ms, 1000);
        assert_eq!(config.panel_heading, "Route 271 Buses");
        assert_eq!(config.alerts.rules.len(), 2);
    }

    #[test]
    fn parse_error_carries_path() {
        let home = make_home();
        ensure_root_at(home.path()).expect("root");
        std::fs::write(config_path_at(home.path()), "feed: [not a map").expect("write");
        let err = load_at(home.path()).unwrap_err();
        assert!(matches!(err, CoreError::Parse { .. }));
        assert!(err.to_string().contains("config.yaml"));
    }

    #[test]
    fn home_not_found_error_message() {
        assert!(CoreError::HomeNotFound.to_string().contains("home directory"));
    }
}
