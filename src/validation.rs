//! Row-level validation and failure reporting.
//!
//! The [`Validator`] evaluates a [`Schema`] against every row of a canonical
//! batch. Evaluation is exhaustive: every rule is checked on every row, so a
//! single pass surfaces all violations rather than the first one. Uniqueness
//! is checked independently of the field rules and the two failure sets are
//! unioned.
//!
//! Violations are data-quality facts, not errors. They are collected into a
//! [`FailureReport`] which drives routing and doubles as the structured
//! notification payload.
//!
//! # Example
//!
//! ```
//! use ironsieve::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut batch = Table::from_rows(
//!     &["user_id", "username", "email", "age", "signup_date"],
//!     vec![
//!         vec!["1".into(), "Alice".into(), "alice@test.com".into(), "30".into(), "2023-01-15".into()],
//!         vec!["2".into(), "Bob".into(), "not-an-email".into(), "25".into(), "2023-01-16".into()],
//!     ],
//! )?;
//! transform_users(&mut batch)?;
//!
//! let outcome = Validator::new(Schema::users()).validate(&batch)?;
//! assert_eq!(outcome.valid.len(), 1);
//! assert_eq!(outcome.report.violations()[0].field, "email");
//! # Ok(())
//! # }
//! ```

use crate::error::Result;
use crate::partition::partition;
use crate::schema::Schema;
use crate::table::Table;
use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use std::{fmt, io};
use tracing::debug;

/// The rule a row violated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rule {
    NotNull,
    Dtype,
    Between,
    StrMatches,
    DuplicateKey,
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Rule::NotNull => "not_null",
            Rule::Dtype => "dtype",
            Rule::Between => "between",
            Rule::StrMatches => "str_matches",
            Rule::DuplicateKey => "duplicate_key",
        };
        f.write_str(name)
    }
}

/// A single failed rule on a single row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Source index of the offending row.
    pub row: usize,
    /// The field that failed.
    pub field: String,
    pub rule: Rule,
    /// Human-readable explanation.
    pub message: String,
}

impl Violation {
    pub fn new<F: Into<String>, M: Into<String>>(row: usize, field: F, rule: Rule, message: M) -> Self {
        Self {
            row,
            field: field.into(),
            rule,
            message: message.into(),
        }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "row {} [{}] {}: {}", self.row, self.field, self.rule, self.message)
    }
}

/// Ordered collection of violations for a batch.
///
/// Entries are sorted by source row; within a row, field rules come in
/// schema order, followed by duplicate-key entries.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FailureReport {
    violations: Vec<Violation>,
}

impl FailureReport {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, violation: Violation) {
        self.violations.push(violation);
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.violations.is_empty()
    }

    /// Total number of violations (not rows).
    #[must_use]
    pub fn len(&self) -> usize {
        self.violations.len()
    }

    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violations of one row.
    pub fn for_row(&self, row: usize) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.row == row)
    }

    /// Source indices of every row with at least one violation.
    #[must_use]
    pub fn invalid_rows(&self) -> BTreeSet<usize> {
        self.violations.iter().map(|v| v.row).collect()
    }

    /// Export the report as pretty JSON.
    ///
    /// # Errors
    /// Propagates serializer failures.
    pub fn to_json(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&self.violations)
    }

    /// Write the report to a file in JSON format.
    ///
    /// # Errors
    /// Returns an error if serialization or the write fails.
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> io::Result<()> {
        let json = self.to_json().map_err(io::Error::other)?;
        std::fs::write(path, json)
    }

    fn sort(&mut self) {
        self.violations.sort_by_key(|v| v.row);
    }
}

impl fmt::Display for FailureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "FailureReport({} violations across {} rows)",
            self.len(),
            self.invalid_rows().len()
        )
    }
}

/// Result of validating a batch: both partitions plus the report.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationOutcome {
    pub valid: Table,
    pub invalid: Table,
    pub report: FailureReport,
}

impl ValidationOutcome {
    /// Whether every row passed.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Evaluates a [`Schema`] against canonical batches.
#[derive(Debug, Clone)]
pub struct Validator {
    schema: Schema,
}

impl Validator {
    #[must_use]
    pub fn new(schema: Schema) -> Self {
        Self { schema }
    }

    #[must_use]
    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Check every row against every rule and every unique field for
    /// repeated keys.
    ///
    /// # Errors
    /// Only structural: a declared field missing from the batch.
    pub fn evaluate(&self, table: &Table) -> Result<FailureReport> {
        let mut report = FailureReport::new();
        let columns = self
            .schema
            .fields()
            .iter()
            .map(|field| table.require(&field.name).map(|col| (field, col)))
            .collect::<Result<Vec<_>>>()?;

        for (pos, &row) in table.index().iter().enumerate() {
            for (field, col) in &columns {
                let value = &col.values[pos];
                if value.is_null() {
                    if !field.nullable {
                        report.push(Violation::new(row, &field.name, Rule::NotNull, "value is null"));
                    }
                    continue;
                }
                if !value.fits(field.dtype) {
                    report.push(Violation::new(
                        row,
                        &field.name,
                        Rule::Dtype,
                        format!("expected {}, found {}", field.dtype, value.kind()),
                    ));
                    continue;
                }
                for check in &field.checks {
                    if let Some(message) = check.explain_failure(value) {
                        report.push(Violation::new(row, &field.name, check.rule(), message));
                    }
                }
            }
        }

        for (field, col) in columns.iter().filter(|(f, _)| f.unique) {
            for (pos, value) in duplicate_positions(&col.values) {
                report.push(Violation::new(
                    table.index()[pos],
                    &field.name,
                    Rule::DuplicateKey,
                    format!("{value} is duplicated"),
                ));
            }
        }

        report.sort();
        debug!(
            rows = table.len(),
            violations = report.len(),
            "evaluated batch against schema"
        );
        Ok(report)
    }

    /// Evaluate the batch and split it into valid and invalid partitions.
    ///
    /// # Errors
    /// Structural errors from [`Validator::evaluate`] or a failed partition
    /// invariant. Rows failing rules are never an error.
    pub fn validate(&self, table: &Table) -> Result<ValidationOutcome> {
        let report = self.evaluate(table)?;
        let parts = partition(table, &report.invalid_rows())?;
        Ok(ValidationOutcome {
            valid: parts.valid,
            invalid: parts.invalid,
            report,
        })
    }
}

/// Positions of every non-null value that occurs more than once, in row
/// order. All holders of a repeated value are returned, not just the extras.
fn duplicate_positions(values: &[Value]) -> Vec<(usize, &Value)> {
    let mut seen: HashMap<(&'static str, String), usize> = HashMap::new();
    let keys: Vec<Option<(&'static str, String)>> = values
        .iter()
        .map(|v| (!v.is_null()).then(|| (v.kind(), v.to_string())))
        .collect();
    for key in keys.iter().flatten() {
        *seen.entry(key.clone()).or_default() += 1;
    }
    keys.iter()
        .enumerate()
        .filter_map(|(pos, key)| {
            key.as_ref()
                .filter(|k| seen.get(*k).copied().unwrap_or(0) > 1)
                .map(|_| (pos, &values[pos]))
        })
        .collect()
}
