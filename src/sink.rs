//! Destinations for partitioned batches.
//!
//! The pipeline hands each non-empty partition to a [`Sink`]. Sinks are
//! one-shot, blocking writers with no retry; a failed write fails the run.

use crate::table::Table;
use anyhow::Result;
use chrono::NaiveDateTime;
use std::path::{Path, PathBuf};

/// Timestamp format used in generated artifact names.
pub const ARTIFACT_TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S_%3f";

/// Persists a partition.
pub trait Sink {
    /// Write `table`; `generated_at` distinguishes artifacts across runs.
    ///
    /// Returns the location of the written artifact.
    fn write(&mut self, table: &Table, generated_at: NaiveDateTime) -> Result<PathBuf>;

    /// Remove an artifact this sink wrote earlier in the same run.
    fn retract(&mut self, artifact: &Path) -> Result<()>;
}

/// `<dir>/<stem>_<timestamp>.<ext>`
#[must_use]
pub fn artifact_path(dir: &Path, stem: &str, generated_at: NaiveDateTime, ext: &str) -> PathBuf {
    dir.join(format!(
        "{stem}_{}.{ext}",
        generated_at.format(ARTIFACT_TIMESTAMP_FORMAT)
    ))
}

#[cfg(feature = "io-parquet")]
pub use self::parquet_sink::ParquetSink;

#[cfg(feature = "io-parquet")]
mod parquet_sink {
    use super::{Sink, artifact_path};
    use crate::io::parquet::write_parquet_table;
    use crate::table::Table;
    use anyhow::{Context, Result, bail};
    use chrono::NaiveDateTime;
    use std::fs;
    use std::path::{Path, PathBuf};
    use tracing::info;

    /// Writes partitions as timestamped Parquet files in a directory.
    ///
    /// The file is first written under a `.tmp` name and renamed into place,
    /// so a failed write never leaves a truncated `.parquet` behind.
    #[derive(Debug, Clone)]
    pub struct ParquetSink {
        dir: PathBuf,
        stem: String,
        with_source_row: bool,
    }

    impl ParquetSink {
        pub fn new(dir: impl Into<PathBuf>, stem: impl Into<String>) -> Self {
            Self {
                dir: dir.into(),
                stem: stem.into(),
                with_source_row: false,
            }
        }

        /// Sink for trusted rows: `<dir>/users_<ts>.parquet`.
        pub fn trusted(dir: impl Into<PathBuf>) -> Self {
            Self::new(dir, "users")
        }

        /// Sink for quarantined rows: `<dir>/users_quarantine_<ts>.parquet`,
        /// with a `source_row` lineage column.
        pub fn quarantine(dir: impl Into<PathBuf>) -> Self {
            Self::new(dir, "users_quarantine").with_source_row(true)
        }

        #[must_use]
        pub fn with_source_row(mut self, enabled: bool) -> Self {
            self.with_source_row = enabled;
            self
        }

        #[must_use]
        pub fn dir(&self) -> &Path {
            &self.dir
        }
    }

    impl Sink for ParquetSink {
        fn write(&mut self, table: &Table, generated_at: NaiveDateTime) -> Result<PathBuf> {
            fs::create_dir_all(&self.dir)
                .with_context(|| format!("mkdir -p {}", self.dir.display()))?;
            let path = artifact_path(&self.dir, &self.stem, generated_at, "parquet");
            if path.exists() {
                bail!("refusing to overwrite existing artifact {}", path.display());
            }
            let tmp = path.with_extension("parquet.tmp");
            let rows = write_parquet_table(&tmp, table, self.with_source_row)
                .with_context(|| format!("write {}", path.display()));
            if let Err(e) = rows {
                let _ = fs::remove_file(&tmp);
                return Err(e);
            }
            fs::rename(&tmp, &path)
                .with_context(|| format!("rename {} -> {}", tmp.display(), path.display()))?;
            info!(rows = table.len(), path = %path.display(), "wrote parquet partition");
            Ok(path)
        }

        fn retract(&mut self, artifact: &Path) -> Result<()> {
            fs::remove_file(artifact).with_context(|| format!("remove {}", artifact.display()))
        }
    }
}
