//! Quarantine alerts.
//!
//! When a run quarantines rows, the pipeline builds an [`Alert`] and hands it
//! to a [`Notifier`]. [`FileNotifier`] emits it twice: as one human-readable
//! line appended to `alerts.log`, and as a structured JSON document holding
//! the full failure report.

use crate::sink::artifact_path;
use crate::validation::FailureReport;
use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use serde::Serialize;
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::warn;

/// File the text notifications are appended to.
pub const ALERT_LOG: &str = "alerts.log";

/// Everything a notification needs to say about a quarantining run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Alert {
    pub generated_at: NaiveDateTime,
    /// Where the batch came from (usually the input path).
    pub source: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub message: String,
    pub report: FailureReport,
}

impl Alert {
    #[must_use]
    pub fn new(
        generated_at: NaiveDateTime,
        source: impl Into<String>,
        total_rows: usize,
        valid_rows: usize,
        report: FailureReport,
    ) -> Self {
        let source = source.into();
        let invalid_rows = total_rows.saturating_sub(valid_rows);
        let message = format!(
            "CRITICAL: ETL pipeline quarantined {invalid_rows} of {total_rows} rows from {source}. \
             See quarantine for details."
        );
        Self {
            generated_at,
            source,
            total_rows,
            valid_rows,
            invalid_rows,
            message,
            report,
        }
    }

    /// The single-line text form.
    #[must_use]
    pub fn text_line(&self) -> String {
        format!(
            "[{}] {}",
            self.generated_at.format("%Y-%m-%d %H:%M:%S"),
            self.message
        )
    }
}

/// Emits alerts.
pub trait Notifier {
    /// Deliver `alert`, returning the artifacts written.
    fn notify(&mut self, alert: &Alert) -> Result<Vec<PathBuf>>;
}

/// Writes alerts into a directory.
#[derive(Debug, Clone)]
pub struct FileNotifier {
    dir: PathBuf,
}

impl FileNotifier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn append_line(&self, line: &str) -> Result<PathBuf> {
        let path = self.dir.join(ALERT_LOG);
        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("open {}", path.display()))?;
        writeln!(f, "{line}").with_context(|| format!("append to {}", path.display()))?;
        Ok(path)
    }

    fn write_report(&self, alert: &Alert) -> Result<PathBuf> {
        let path = artifact_path(&self.dir, "failure_report", alert.generated_at, "json");
        let json = serde_json::to_string_pretty(alert).context("serialize alert")?;
        let mut f = OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .with_context(|| format!("create {}", path.display()))?;
        if let Err(e) = f.write_all(json.as_bytes()) {
            let _ = fs::remove_file(&path);
            return Err(e).with_context(|| format!("write {}", path.display()));
        }
        Ok(path)
    }
}

impl Notifier for FileNotifier {
    fn notify(&mut self, alert: &Alert) -> Result<Vec<PathBuf>> {
        fs::create_dir_all(&self.dir).with_context(|| format!("mkdir -p {}", self.dir.display()))?;
        // Log line last: a failed notify must not leave an alert behind.
        let report = self.write_report(alert)?;
        let log = match self.append_line(&alert.text_line()) {
            Ok(log) => log,
            Err(e) => {
                let _ = fs::remove_file(&report);
                return Err(e);
            }
        };
        warn!(
            invalid_rows = alert.invalid_rows,
            report = %report.display(),
            "{}",
            alert.message
        );
        Ok(vec![log, report])
    }
}
