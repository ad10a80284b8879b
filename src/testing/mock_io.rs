//! In-memory collaborators and temp-file helpers for testing runs.
//!
//! [`RecordingSink`] and [`RecordingNotifier`] stand in for the Parquet sink
//! and the file notifier: they keep what they were given and can be told to
//! fail, so routing and rollback can be checked without touching disk.

use crate::notify::{Alert, Notifier};
use crate::sink::Sink;
use crate::table::Table;
use anyhow::{Result, bail};
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};

/// A [`Sink`] that records every table written to it.
#[derive(Debug, Default)]
pub struct RecordingSink {
    name: String,
    writes: Vec<Table>,
    retracted: Vec<PathBuf>,
    fail: bool,
}

impl RecordingSink {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// A sink whose every write fails.
    pub fn failing(name: impl Into<String>) -> Self {
        Self {
            fail: true,
            ..Self::new(name)
        }
    }

    #[must_use]
    pub fn writes(&self) -> &[Table] {
        &self.writes
    }

    #[must_use]
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// Artifacts the pipeline asked this sink to remove.
    #[must_use]
    pub fn retracted(&self) -> &[PathBuf] {
        &self.retracted
    }
}

impl Sink for RecordingSink {
    fn write(&mut self, table: &Table, generated_at: NaiveDateTime) -> Result<PathBuf> {
        if self.fail {
            bail!("{} sink is configured to fail", self.name);
        }
        self.writes.push(table.clone());
        Ok(PathBuf::from(format!(
            "memory://{}/{}/{}",
            self.name,
            generated_at.format("%Y%m%d_%H%M%S"),
            self.writes.len()
        )))
    }

    fn retract(&mut self, artifact: &Path) -> Result<()> {
        self.retracted.push(artifact.to_path_buf());
        Ok(())
    }
}

/// A [`Notifier`] that records every alert.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    alerts: Vec<Alert>,
    fail: bool,
}

impl RecordingNotifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn alerts(&self) -> &[Alert] {
        &self.alerts
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&mut self, alert: &Alert) -> Result<Vec<PathBuf>> {
        if self.fail {
            bail!("notifier is configured to fail");
        }
        self.alerts.push(alert.clone());
        // One text and one structured notification per alert.
        Ok(vec![
            PathBuf::from("memory://alerts/alerts.log"),
            PathBuf::from(format!("memory://alerts/report_{}.json", self.alerts.len())),
        ])
    }
}

/// A temporary directory that is automatically deleted when dropped.
pub struct TempDirPath {
    #[allow(dead_code)]
    temp_dir: TempDir,
    path: PathBuf,
}

impl TempDirPath {
    /// Create a new temporary directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the temporary directory cannot be created.
    pub fn new() -> std::io::Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().to_path_buf();
        Ok(Self { temp_dir, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Create a file path within this directory.
    #[must_use]
    pub fn file_path(&self, filename: &str) -> PathBuf {
        self.path.join(filename)
    }
}

/// Write `contents` to a temporary `.csv` file.
///
/// # Errors
///
/// Returns an error if the temporary file cannot be created or written.
///
/// # Example
///
/// ```
/// use ironsieve::testing::{mock_csv_file, sample_users_csv};
/// use ironsieve::io::csv::read_csv_table;
///
/// let file = mock_csv_file(sample_users_csv()).unwrap();
/// let table = read_csv_table(file.path(), b',').unwrap();
/// assert_eq!(table.len(), 5);
/// ```
pub fn mock_csv_file(contents: &str) -> std::io::Result<NamedTempFile> {
    let mut file = tempfile::Builder::new().suffix(".csv").tempfile()?;
    file.write_all(contents.as_bytes())?;
    file.flush()?;
    Ok(file)
}
