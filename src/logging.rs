//! Log setup.
//!
//! The terminal belongs to the TUI, so records are written to a file instead
//! of stderr. `RUST_LOG` wins over the configured level.

use std::env;
use std::fs::{self, OpenOptions};
use std::path::{Path, PathBuf};

use env_logger::{Env, Target};

use crate::config::LoggingSettings;

/// Default log file under `$XDG_STATE_HOME/mediadeck/` or
/// `~/.local/state/mediadeck/` when `XDG_STATE_HOME` is not set.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("mediadeck").join("mediadeck.log"))
}

fn effective_level(settings: &LoggingSettings, verbose: bool) -> &str {
    if verbose { "debug" } else { settings.level.as_str() }
}

/// Install the global logger, appending to `file_override`, the configured
/// file, or the default path. Returns the file in use.
pub fn init(
    settings: &LoggingSettings,
    file_override: Option<&Path>,
    verbose: bool,
) -> std::io::Result<PathBuf> {
    let path = file_override
        .map(Path::to_path_buf)
        .or_else(|| settings.file.clone())
        .or_else(default_log_path)
        .ok_or_else(|| std::io::Error::other("no log file location (HOME is not set)"))?;

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let file = OpenOptions::new().create(true).append(true).open(&path)?;

    env_logger::Builder::from_env(Env::default().default_filter_or(effective_level(settings, verbose)))
        .target(Target::Pipe(Box::new(file)))
        .format_timestamp_millis()
        .try_init()
        .map_err(std::io::Error::other)?;

    Ok(path)
}
