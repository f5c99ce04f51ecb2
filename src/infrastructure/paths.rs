//! Platform path resolution.
//!
//! Locations follow the XDG base directory layout with explicit overrides:
//!
//! | What        | Lookup order                                                                        |
//! |-------------|-------------------------------------------------------------------------------------|
//! | data dir    | `$ECOBROWSE_DATA_DIR`, `$XDG_DATA_HOME/ecobrowse`, `~/.local/share/ecobrowse`       |
//! | config file | `$ECOBROWSE_CONFIG`, `$XDG_CONFIG_HOME/ecobrowse/config.toml`, `~/.config/ecobrowse/config.toml` |
//!
//! Each public function has an `*_with` twin taking an environment lookup so the
//! resolution rules can be tested without touching the process environment.

use std::path::PathBuf;

const APP_DIR: &str = "ecobrowse";

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn process_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Expands a leading `~` against `$HOME`.
///
/// Paths without a leading tilde, and tilde paths when `$HOME` is unset, are
/// returned unchanged.
///
/// # Examples
///
/// ```
/// use ecobrowse::infrastructure::expand_tilde;
/// use std::path::PathBuf;
///
/// assert_eq!(expand_tilde("/var/data"), PathBuf::from("/var/data"));
/// ```
#[must_use]
pub fn expand_tilde(path: &str) -> PathBuf {
    expand_tilde_with(path, process_env)
}

pub fn expand_tilde_with(path: &str, env: impl Fn(&str) -> Option<String>) -> PathBuf {
    let Some(home) = non_empty(env("HOME")) else {
        return PathBuf::from(path);
    };

    if path == "~" {
        PathBuf::from(home)
    } else if let Some(rest) = path.strip_prefix("~/") {
        PathBuf::from(home).join(rest)
    } else {
        PathBuf::from(path)
    }
}

/// Default directory holding the record store and trace export.
#[must_use]
pub fn data_dir() -> PathBuf {
    data_dir_with(process_env)
}

pub fn data_dir_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(dir) = non_empty(env("ECOBROWSE_DATA_DIR")) {
        return expand_tilde_with(&dir, &env);
    }
    if let Some(xdg) = non_empty(env("XDG_DATA_HOME")) {
        return PathBuf::from(xdg).join(APP_DIR);
    }
    expand_tilde_with("~/.local/share", &env).join(APP_DIR)
}

/// Location of the configuration file; it may not exist.
#[must_use]
pub fn config_path() -> PathBuf {
    config_path_with(process_env)
}

pub fn config_path_with(env: impl Fn(&str) -> Option<String>) -> PathBuf {
    if let Some(path) = non_empty(env("ECOBROWSE_CONFIG")) {
        return expand_tilde_with(&path, &env);
    }
    let base = non_empty(env("XDG_CONFIG_HOME"))
        .map_or_else(|| expand_tilde_with("~/.config", &env), PathBuf::from);
    base.join(APP_DIR).join("config.toml")
}
