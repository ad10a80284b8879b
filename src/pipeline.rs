//! The run controller.
//!
//! A [`Pipeline`] sequences one batch through
//! extract -> structural check -> transform -> validate -> partition -> route.
//! The routing policy:
//!
//! - no invalid rows: the valid partition goes to the trusted sink (when
//!   non-empty) and nothing else happens;
//! - some invalid rows: the valid partition (when non-empty) goes to the
//!   trusted sink, the invalid partition to the quarantine sink, and an
//!   [`Alert`] goes to the notifier.
//!
//! A run is all-or-nothing from the caller's point of view. If any write the
//! outcome requires fails, the artifacts already written in that run are
//! retracted and the error is returned.

use crate::config::PipelineConfig;
use crate::io::csv::read_csv_table;
use crate::notify::{Alert, Notifier};
use crate::schema::Schema;
use crate::sink::Sink;
use crate::table::Table;
use crate::transform::transform_users;
use crate::validation::{FailureReport, ValidationOutcome, Validator};
use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Counts and artifacts of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RunSummary {
    pub source: String,
    pub total_rows: usize,
    pub valid_rows: usize,
    pub invalid_rows: usize,
    pub trusted_artifact: Option<PathBuf>,
    pub quarantine_artifact: Option<PathBuf>,
    pub alert_artifacts: Vec<PathBuf>,
    pub report: FailureReport,
}

/// How a successful run ended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "summary", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Every row passed.
    Clean(RunSummary),
    /// Some rows were quarantined; both writes and the alert succeeded.
    Quarantined(RunSummary),
}

impl RunOutcome {
    #[must_use]
    pub fn summary(&self) -> &RunSummary {
        match self {
            RunOutcome::Clean(s) | RunOutcome::Quarantined(s) => s,
        }
    }

    #[must_use]
    pub fn is_clean(&self) -> bool {
        matches!(self, RunOutcome::Clean(_))
    }
}

enum Written {
    Trusted(PathBuf),
    Quarantine(PathBuf),
}

/// Controller owning the validator and the three collaborators.
pub struct Pipeline<T: Sink, Q: Sink, N: Notifier> {
    validator: Validator,
    trusted: T,
    quarantine: Q,
    notifier: N,
}

#[cfg(feature = "io-parquet")]
impl Pipeline<crate::sink::ParquetSink, crate::sink::ParquetSink, crate::notify::FileNotifier> {
    /// Parquet sinks and file alerts in the directories of `config`.
    #[must_use]
    pub fn from_config(config: &PipelineConfig) -> Self {
        use crate::notify::FileNotifier;
        use crate::sink::ParquetSink;

        Self::new(
            Schema::users().with_mode(config.column_mode),
            ParquetSink::trusted(&config.trusted_dir),
            ParquetSink::quarantine(&config.quarantine_dir),
            FileNotifier::new(&config.alert_dir),
        )
    }
}

impl<T: Sink, Q: Sink, N: Notifier> Pipeline<T, Q, N> {
    pub fn new(schema: Schema, trusted: T, quarantine: Q, notifier: N) -> Self {
        Self {
            validator: Validator::new(schema),
            trusted,
            quarantine,
            notifier,
        }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        self.validator.schema()
    }

    #[must_use]
    pub fn trusted_sink(&self) -> &T {
        &self.trusted
    }

    #[must_use]
    pub fn quarantine_sink(&self) -> &Q {
        &self.quarantine
    }

    #[must_use]
    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    /// Run the configured input file.
    ///
    /// # Errors
    /// Fails if the input cannot be read or is structurally unusable, or if
    /// a required write fails.
    pub fn run(&mut self, config: &PipelineConfig) -> Result<RunOutcome> {
        self.run_file(&config.input)
    }

    /// Extract `input` and run it, stamping artifacts with the current time.
    ///
    /// # Errors
    /// See [`Pipeline::run`].
    pub fn run_file(&mut self, input: &Path) -> Result<RunOutcome> {
        let table = read_csv_table(input, b',')
            .with_context(|| format!("extract {}", input.display()))?;
        info!(rows = table.len(), input = %input.display(), "extracted batch");
        self.run_table(table, &input.display().to_string(), Local::now().naive_local())
    }

    /// Run an already extracted batch.
    ///
    /// # Errors
    /// Structural errors (missing or, in strict mode, unexpected columns) and
    /// sink/notifier failures. Rows failing validation are not errors.
    pub fn run_table(
        &mut self,
        mut table: Table,
        source: &str,
        generated_at: NaiveDateTime,
    ) -> Result<RunOutcome> {
        self.schema().check_columns(&table)?;
        transform_users(&mut table)?;
        let outcome = self.validator.validate(&table)?;
        info!(
            rows = table.len(),
            valid = outcome.valid.len(),
            invalid = outcome.invalid.len(),
            violations = outcome.report.len(),
            "validated batch"
        );
        self.route(outcome, source, generated_at)
    }

    fn route(
        &mut self,
        outcome: ValidationOutcome,
        source: &str,
        generated_at: NaiveDateTime,
    ) -> Result<RunOutcome> {
        let ValidationOutcome {
            valid,
            invalid,
            report,
        } = outcome;
        let mut summary = RunSummary {
            source: source.to_string(),
            total_rows: valid.len() + invalid.len(),
            valid_rows: valid.len(),
            invalid_rows: invalid.len(),
            trusted_artifact: None,
            quarantine_artifact: None,
            alert_artifacts: Vec::new(),
            report,
        };
        let mut written = Vec::new();

        if !valid.is_empty() {
            let path = self
                .trusted
                .write(&valid, generated_at)
                .context("write trusted partition")?;
            written.push(Written::Trusted(path.clone()));
            summary.trusted_artifact = Some(path);
        }

        if invalid.is_empty() {
            info!(rows = summary.valid_rows, "data quality check passed");
            return Ok(RunOutcome::Clean(summary));
        }

        let path = match self.quarantine.write(&invalid, generated_at) {
            Ok(path) => path,
            Err(e) => {
                self.rollback(&written);
                return Err(e.context("write quarantine partition"));
            }
        };
        written.push(Written::Quarantine(path.clone()));
        summary.quarantine_artifact = Some(path);

        let alert = Alert::new(
            generated_at,
            source,
            summary.total_rows,
            summary.valid_rows,
            summary.report.clone(),
        );
        summary.alert_artifacts = match self.notifier.notify(&alert) {
            Ok(paths) => paths,
            Err(e) => {
                self.rollback(&written);
                return Err(e.context("send quarantine alert"));
            }
        };

        warn!(
            invalid = summary.invalid_rows,
            total = summary.total_rows,
            "rows quarantined"
        );
        Ok(RunOutcome::Quarantined(summary))
    }

    /// Best effort; a failed retract is logged, the original error wins.
    fn rollback(&mut self, written: &[Written]) {
        for artifact in written.iter().rev() {
            let (result, path) = match artifact {
                Written::Trusted(path) => (self.trusted.retract(path), path),
                Written::Quarantine(path) => (self.quarantine.retract(path), path),
            };
            if let Err(e) = result {
                error!(path = %path.display(), error = %e, "failed to retract artifact");
            }
        }
    }
}
