//! Configuration loading and parsing.
//!
//! Parses `tilde.toml` (or an override path provided by the binary). Every key
//! is optional; absent keys take their defaults and unknown keys are ignored.
//! Out-of-range values are clamped into `Settings` with an `info` log on the
//! `config` target. The raw parsed values are kept in `ConfigFile` untouched.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::time::Duration;
use std::{fs, io, path::PathBuf};
use tracing::{info, warn};

pub const CONFIG_FILE_NAME: &str = "tilde.toml";

pub const TAB_STOP_RANGE: (usize, usize) = (1, 16);
pub const READ_TIMEOUT_RANGE: (u16, u16) = (1, 255);

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    #[serde(default = "EditorConfig::default_tab_stop")]
    pub tab_stop: usize,
    #[serde(default = "EditorConfig::default_quit_times")]
    pub quit_times: u32,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_stop: Self::default_tab_stop(),
            quit_times: Self::default_quit_times(),
        }
    }
}

impl EditorConfig {
    const fn default_tab_stop() -> usize {
        8
    }
    const fn default_quit_times() -> u32 {
        3
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct InputConfig {
    /// Terminal read timeout in deciseconds.
    #[serde(default = "InputConfig::default_read_timeout_ds")]
    pub read_timeout_ds: u16,
    /// Timeouts a partial escape sequence survives before being discarded.
    #[serde(default = "InputConfig::default_escape_pending_reads")]
    pub escape_pending_reads: usize,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            read_timeout_ds: Self::default_read_timeout_ds(),
            escape_pending_reads: Self::default_escape_pending_reads(),
        }
    }
}

impl InputConfig {
    const fn default_read_timeout_ds() -> u16 {
        1
    }
    const fn default_escape_pending_reads() -> usize {
        3
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct StatusConfig {
    #[serde(default = "StatusConfig::default_message_timeout_secs")]
    pub message_timeout_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self {
            message_timeout_secs: Self::default_message_timeout_secs(),
        }
    }
}

impl StatusConfig {
    const fn default_message_timeout_secs() -> u64 {
        5
    }
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ConfigFile {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub input: InputConfig,
    #[serde(default)]
    pub status: StatusConfig,
}

/// Effective values after clamping, consumed by the runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Settings {
    pub tab_stop: usize,
    pub quit_times: u32,
    pub read_timeout_ds: u8,
    pub escape_pending_reads: usize,
    pub message_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::from_file(&ConfigFile::default())
    }
}

impl Settings {
    pub fn from_file(file: &ConfigFile) -> Self {
        let raw_tab = file.editor.tab_stop;
        let tab_stop = raw_tab.clamp(TAB_STOP_RANGE.0, TAB_STOP_RANGE.1);
        if tab_stop != raw_tab {
            info!(target: "config", raw = raw_tab, clamped = tab_stop, "tab_stop_clamped");
        }

        let raw_timeout = file.input.read_timeout_ds;
        let clamped_timeout = raw_timeout.clamp(READ_TIMEOUT_RANGE.0, READ_TIMEOUT_RANGE.1);
        if clamped_timeout != raw_timeout {
            info!(
                target: "config",
                raw = raw_timeout,
                clamped = clamped_timeout,
                "read_timeout_clamped"
            );
        }
        let read_timeout_ds = u8::try_from(clamped_timeout).unwrap_or(u8::MAX);

        let raw_pending = file.input.escape_pending_reads;
        let escape_pending_reads = raw_pending.max(1);
        if escape_pending_reads != raw_pending {
            info!(
                target: "config",
                raw = raw_pending,
                clamped = escape_pending_reads,
                "escape_pending_reads_clamped"
            );
        }

        Self {
            tab_stop,
            quit_times: file.editor.quit_times,
            read_timeout_ds,
            escape_pending_reads,
            message_timeout: Duration::from_secs(file.status.message_timeout_secs),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string
    pub source: Option<PathBuf>,
    pub file: ConfigFile,
    pub settings: Settings,
}

/// Config path: `tilde.toml` in the working directory, then the platform
/// config dir (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from(CONFIG_FILE_NAME);
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("tilde").join(CONFIG_FILE_NAME);
    }
    local
}

/// Load configuration. A missing file or a parse error yields defaults; any
/// other read failure is returned.
pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let content = match fs::read_to_string(&path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            info!(target: "config", path = %path.display(), "config_absent_using_defaults");
            return Ok(Config::default());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("reading config {}", path.display()));
        }
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => {
            let settings = Settings::from_file(&file);
            info!(target: "config", path = %path.display(), "config_loaded");
            Ok(Config {
                raw: Some(content),
                source: Some(path),
                file,
                settings,
            })
        }
        Err(e) => {
            warn!(
                target: "config",
                path = %path.display(),
                error = %e,
                "config_parse_failed_using_defaults"
            );
            Ok(Config::default())
        }
    }
}
