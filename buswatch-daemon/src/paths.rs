use std::path::{Path, PathBuf};

pub const DAEMON_SOCKET: &str = "daemon.sock";

pub fn buswatch_root(home: &Path) -> PathBuf {
    home.join(".buswatch")
}

pub fn socket_path(home: &Path) -> PathBuf {
    buswatch_root(home).join(DAEMON_SOCKET)
}
