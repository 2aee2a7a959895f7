//! Edit policy configuration.
//!
//! Parses `blockedit.toml` (or an override path provided by the embedding
//! editor) extracting the tab/blank policy consumed by the column arithmetic
//! and the optional arena byte budget:
//!
//! ```toml
//! [edit]
//! use_tabs = true
//! optimal_fill = true
//! remove_trailing_blanks = false
//! tab_size = 8
//!
//! [arena]
//! limit_bytes = 1048576
//! ```
//!
//! The engine never reads these values from globals; an [`EditPolicy`] is a
//! small `Copy` value handed to every call that needs it. Unknown fields are
//! ignored and a file that fails to parse falls back to defaults.

use anyhow::Result;
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::{info, warn};

/// Smallest accepted tab width.
pub const MIN_TAB_SIZE: usize = 1;
/// Largest accepted tab width.
pub const MAX_TAB_SIZE: usize = 32;
/// Tab width used when the config does not name one.
pub const DEFAULT_TAB_SIZE: usize = 8;

/// Tab and blank handling policy for column operations.
///
/// * `use_tabs`: blank padding may contain tab characters.
/// * `optimal_fill`: when padding with tabs, use as many tabs as fit before
///   falling back to spaces (otherwise tabs are only used from a tab stop).
/// * `remove_trailing_blanks`: column deletion trims blanks left dangling at
///   the end of a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EditPolicy {
    #[serde(default)]
    pub use_tabs: bool,
    #[serde(default = "EditPolicy::default_optimal_fill")]
    pub optimal_fill: bool,
    #[serde(default)]
    pub remove_trailing_blanks: bool,
    #[serde(default = "EditPolicy::default_tab_size")]
    pub tab_size: usize,
}

impl Default for EditPolicy {
    fn default() -> Self {
        Self {
            use_tabs: false,
            optimal_fill: Self::default_optimal_fill(),
            remove_trailing_blanks: false,
            tab_size: Self::default_tab_size(),
        }
    }
}

impl EditPolicy {
    const fn default_optimal_fill() -> bool {
        true
    }
    const fn default_tab_size() -> usize {
        DEFAULT_TAB_SIZE
    }

    /// Policy with spaces-only padding and the given tab width.
    pub fn with_tab_size(tab_size: usize) -> Self {
        Self {
            tab_size,
            ..Self::default()
        }
    }

    /// Return a copy whose `tab_size` lies within `MIN_TAB_SIZE..=MAX_TAB_SIZE`.
    pub fn clamped(self) -> Self {
        let tab_size = self.tab_size.clamp(MIN_TAB_SIZE, MAX_TAB_SIZE);
        if tab_size != self.tab_size {
            info!(
                target: "config",
                raw = self.tab_size,
                clamped = tab_size,
                "tab_size_clamped"
            );
        }
        Self { tab_size, ..self }
    }
}

/// Storage arena settings.
#[derive(Debug, Deserialize, Default, Clone, Copy, PartialEq, Eq)]
pub struct ArenaConfig {
    /// Upper bound on live arena bytes; `None` means unbounded.
    #[serde(default)]
    pub limit_bytes: Option<usize>,
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub edit: EditPolicy,
    #[serde(default)]
    pub arena: ArenaConfig,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub raw: Option<String>, // original file string (optional)
    pub file: ConfigFile,    // parsed (or default) data
}

impl Config {
    /// Effective edit policy (tab size clamped).
    pub fn policy(&self) -> EditPolicy {
        self.file.edit.clamped()
    }

    /// Arena byte budget, if any.
    pub fn arena_limit(&self) -> Option<usize> {
        self.file.arena.limit_bytes
    }
}

/// Best-effort config path following platform conventions (XDG / AppData Roaming).
pub fn discover() -> PathBuf {
    let local = PathBuf::from("blockedit.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("blockedit").join("blockedit.toml");
    }
    PathBuf::from("blockedit.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    if let Ok(content) = fs::read_to_string(&path) {
        match toml::from_str::<ConfigFile>(&content) {
            Ok(file) => Ok(Config {
                raw: Some(content),
                file,
            }),
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
    } else {
        Ok(Config::default())
    }
}
