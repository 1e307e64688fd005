//! difflog configuration loading from `.difflogrc.toml`.
//!
//! Configuration is optional. A missing or unreadable file falls back to the
//! defaults with a warning.
//!
//! # Example Configuration
//!
//! ```toml
//! [output]
//! format = "table"
//! color = true
//!
//! [visibility]
//! include_private = false
//! ignore = ["^tests\\.", "\\.legacy_"]
//! ```

use std::path::Path;

use difflog_core::{include_all, is_public, MemberPath};
use regex::Regex;
use serde::Deserialize;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = ".difflogrc.toml";

/// Root configuration structure loaded from `.difflogrc.toml`.
#[derive(Debug, Deserialize, Default)]
pub struct DifflogConfig {
    /// Output formatting preferences.
    #[serde(default)]
    pub output: OutputSettings,

    /// Which members take part in the diff.
    #[serde(default)]
    pub visibility: VisibilitySettings,
}

/// Output formatting preferences.
///
/// Command-line flags (e.g. `--format json`) override these settings.
#[derive(Debug, Deserialize, Default)]
pub struct OutputSettings {
    /// Default output format: `table`, `json` or `csv`.
    #[serde(default)]
    pub format: Option<String>,

    /// Force colored output on or off. Unset means auto-detect.
    #[serde(default)]
    pub color: Option<bool>,
}

#[derive(Debug, Deserialize, Default)]
pub struct VisibilitySettings {
    /// Include `_private` members.
    #[serde(default)]
    pub include_private: bool,

    /// Regular expressions matched against dotted member names, e.g.
    /// `Service.Config.debug`. Matching members are left out of the diff.
    #[serde(default)]
    pub ignore: Vec<String>,
}

impl DifflogConfig {
    /// Load configuration from `.difflogrc.toml` in the given directory.
    pub fn load(root: &Path) -> Self {
        let config_path = root.join(CONFIG_FILE);
        if config_path.exists() {
            match std::fs::read_to_string(&config_path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => return config,
                    Err(e) => {
                        tracing::warn!("Failed to parse {}: {}", CONFIG_FILE, e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read {}: {}", CONFIG_FILE, e);
                }
            }
        }
        Self::default()
    }

    /// Get the default output format, if configured.
    pub fn default_format(&self) -> Option<&str> {
        self.output.format.as_deref()
    }

    /// Returns the configured color preference, or `None` for auto-detection.
    pub fn use_color(&self) -> Option<bool> {
        self.output.color
    }

    /// Build the member filter, with `include_private` from the command line
    /// taking effect when set.
    ///
    /// Invalid ignore patterns are skipped with a warning.
    pub fn visibility_filter(&self, include_private: bool) -> VisibilityFilter {
        let ignore = self
            .visibility
            .ignore
            .iter()
            .filter_map(|pattern| match Regex::new(pattern) {
                Ok(regex) => Some(regex),
                Err(e) => {
                    tracing::warn!("Ignoring invalid pattern '{}': {}", pattern, e);
                    None
                }
            })
            .collect();

        VisibilityFilter {
            include_private: include_private || self.visibility.include_private,
            ignore,
        }
    }
}

/// Decides which members enter the member tree.
#[derive(Debug, Default)]
pub struct VisibilityFilter {
    pub include_private: bool,
    pub ignore: Vec<Regex>,
}

impl VisibilityFilter {
    pub fn allows(&self, path: &MemberPath, name: &str) -> bool {
        let dotted = path.qualified(name);
        if self.ignore.iter().any(|regex| regex.is_match(&dotted)) {
            return false;
        }
        if self.include_private {
            include_all(path, name)
        } else {
            is_public(path, name)
        }
    }
}
