use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

/// Endpoint used when neither the command line nor the file names one
pub const DEFAULT_RPC: &str = "http://localhost:8545";

/// Optional settings file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Node endpoint (URL or IPC path)
    pub rpc: Option<String>,

    /// Directory key-file selection starts from
    pub key_dir: Option<String>,

    /// Keep command history between sessions (default true)
    pub history: Option<bool>,
}

impl Config {
    pub fn history_enabled(&self) -> bool {
        self.history.unwrap_or(true)
    }
}

pub fn load() -> Config {
    let Some(path) = config_path() else {
        return Config::default();
    };
    load_from(&path)
}

/// Read `path`; a missing file means defaults, a malformed one is reported
pub fn load_from(path: &Path) -> Config {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(_) => return Config::default(),
    };
    match toml::from_str::<Config>(&content) {
        Ok(config) => {
            tracing::debug!(path = %path.display(), "config loaded");
            config
        }
        Err(err) => {
            tracing::warn!(path = %path.display(), "ignoring malformed config: {err}");
            Config::default()
        }
    }
}

pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os("ABICON_CONFIG").map(PathBuf::from) {
        return Some(path);
    }
    if let Some(xdg) = std::env::var_os("XDG_CONFIG_HOME").map(PathBuf::from) {
        return Some(xdg.join("abicon").join("config.toml"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".config").join("abicon").join("config.toml"));
    }

    directories::ProjectDirs::from("io", "abicon", "abicon")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

pub fn data_dir() -> Option<PathBuf> {
    if let Some(xdg) = std::env::var_os("XDG_DATA_HOME").map(PathBuf::from) {
        return Some(xdg.join("abicon"));
    }
    if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
        return Some(home.join(".local").join("share").join("abicon"));
    }
    directories::ProjectDirs::from("io", "abicon", "abicon")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

pub fn history_path() -> Option<PathBuf> {
    data_dir().map(|dir| dir.join("history.txt"))
}

/// Expand `~/` and make relative paths absolute against the working directory
pub fn expand_path(path: &str) -> Option<PathBuf> {
    let trimmed = path.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(rest) = trimmed.strip_prefix("~/") {
        if let Some(home) = std::env::var_os("HOME").map(PathBuf::from) {
            return Some(home.join(rest));
        }
    }

    let mut buf = PathBuf::from(trimmed);
    if buf.is_relative() {
        if let Ok(cwd) = std::env::current_dir() {
            buf = cwd.join(buf);
        }
    }
    Some(buf)
}
