//! Run configuration.
//!
//! All paths a run touches are carried by one [`PipelineConfig`] passed to the
//! pipeline at construction; nothing is read from process-wide state. The
//! config can be loaded from TOML, and any field left out falls back to the
//! defaults below:
//!
//! ```toml
//! input = "data/input/users_raw.csv"
//! trusted_dir = "data/trusted"
//! quarantine_dir = "data/quarantine"
//! alert_dir = "data/alerts"
//! column_mode = "lenient"   # or "strict"
//! ```

use crate::schema::ColumnMode;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Paths and column handling for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PipelineConfig {
    /// Delimited input file.
    pub input: PathBuf,
    /// Directory for trusted-partition files.
    pub trusted_dir: PathBuf,
    /// Directory for quarantine-partition files.
    pub quarantine_dir: PathBuf,
    /// Directory for alert log and failure reports.
    pub alert_dir: PathBuf,
    /// Whether undeclared input columns are rejected.
    pub column_mode: ColumnMode,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input: PathBuf::from("data/input/users_raw.csv"),
            trusted_dir: PathBuf::from("data/trusted"),
            quarantine_dir: PathBuf::from("data/quarantine"),
            alert_dir: PathBuf::from("data/alerts"),
            column_mode: ColumnMode::Lenient,
        }
    }
}

impl PipelineConfig {
    /// Parse a config from TOML text.
    ///
    /// # Errors
    /// Returns an error on malformed TOML or unknown keys.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).context("parse pipeline config")
    }

    /// Load a config from a TOML file.
    ///
    /// # Errors
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text =
            fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
        Self::from_toml_str(&text).with_context(|| format!("load config {}", path.display()))
    }

    /// Re-root every relative path under `base`.
    #[must_use]
    pub fn rooted_at(mut self, base: impl AsRef<Path>) -> Self {
        let base = base.as_ref();
        for path in [
            &mut self.input,
            &mut self.trusted_dir,
            &mut self.quarantine_dir,
            &mut self.alert_dir,
        ] {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
        self
    }
}
