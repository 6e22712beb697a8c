//! XDG-style locations for the config file and the translation cache.

use std::path::PathBuf;

const APP_DIR: &str = "transgate";

/// Returns the configuration directory.
///
/// `$XDG_CONFIG_HOME/transgate` when set, `~/.config/transgate` otherwise.
pub fn config_dir() -> PathBuf {
    xdg_dir("XDG_CONFIG_HOME", ".config")
}

/// Returns the cache directory.
///
/// `$XDG_CACHE_HOME/transgate` when set, `~/.cache/transgate` otherwise.
pub fn cache_dir() -> PathBuf {
    xdg_dir("XDG_CACHE_HOME", ".cache")
}

fn xdg_dir(env_var: &str, home_fallback: &str) -> PathBuf {
    match std::env::var(env_var) {
        Ok(base) if !base.is_empty() => PathBuf::from(base).join(APP_DIR),
        _ => home_dir().join(home_fallback).join(APP_DIR),
    }
}

// Falls back to the working directory when no home directory is known
// (e.g. minimal containers).
fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}
