//! Structural errors that abort a run.
//!
//! Anything that prevents reasoning about the *shape* of a batch lands here.
//! Row-level content problems are never errors; they are collected as
//! [`Violation`](crate::validation::Violation)s instead.

use thiserror::Error;

/// Result alias for structural operations.
pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal, non-recoverable conditions for a batch.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PipelineError {
    /// A column the operation needs is absent from the batch.
    #[error("missing column: {column} is not in batch columns")]
    MissingColumn { column: String },

    /// Strict column mode found a column the schema does not declare.
    #[error("unexpected column: {column} is not declared by the schema")]
    UnexpectedColumn { column: String },

    /// The same column name appears more than once.
    #[error("duplicate column: {column} appears more than once")]
    DuplicateColumn { column: String },

    /// The input cannot be read as a rectangular table.
    #[error("input is not tabular: {0}")]
    NotTabular(String),

    /// The partitioner's coverage check failed.
    #[error("partition invariant violated: {0}")]
    PartitionInvariant(String),
}
