//! # Ironsieve
//!
//! Batch ingestion of user records with **schema validation** and
//! **quarantine routing**. One run takes a delimited file, canonicalizes its
//! columns, validates every row against a declarative schema, and splits the
//! batch into a *trusted* partition and a *quarantine* partition. Both are
//! persisted as Parquet; a non-empty quarantine also raises an alert.
//!
//! ## Key Features
//!
//! - **Column rules** - lowercase text, half-to-even integer coercion,
//!   permissive timestamp parsing; blank cells become null
//! - **Declarative schema** - types, nullability, ranges, patterns, unique keys
//! - **Exhaustive validation** - every violation of every row in one pass
//! - **Duplicate propagation** - *all* rows sharing a repeated key are invalid
//! - **Dual write on partial failure** - good rows stay usable when some are bad
//! - **All-or-nothing runs** - artifacts are retracted if a required write fails
//!
//! ## Quick Start
//!
//! ```no_run
//! use ironsieve::*;
//!
//! # fn main() -> anyhow::Result<()> {
//! let config = PipelineConfig::default();
//! let mut pipeline = Pipeline::from_config(&config);
//!
//! match pipeline.run(&config)? {
//!     RunOutcome::Clean(s) => println!("{} rows trusted", s.valid_rows),
//!     RunOutcome::Quarantined(s) => println!("{} rows quarantined", s.invalid_rows),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Building blocks
//!
//! The stages can also be driven by hand:
//!
//! ```
//! use ironsieve::*;
//! use ironsieve::testing::mixed_users;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut batch = mixed_users();
//! transform_users(&mut batch)?;
//!
//! let outcome = Validator::new(Schema::users()).validate(&batch)?;
//! assert_eq!(outcome.valid.len(), 3);
//! assert_eq!(outcome.invalid.index(), &[1, 3]);
//! # Ok(())
//! # }
//! ```
//!
//! ## Feature Flags
//!
//! - `io-parquet` - Parquet sink and reader (requires Arrow)
//! - `compression-gzip` / `compression-zstd` - transparent input decompression
//!
//! ## Module Overview
//!
//! - [`table`] / [`value`] - the in-memory batch
//! - [`transform`] - column canonicalization
//! - [`schema`] - declarative field rules and column mode
//! - [`validation`] - row validation and failure reports
//! - [`partition`] - trusted/quarantine split
//! - [`pipeline`] - the run controller and routing policy
//! - [`sink`] / [`notify`] - output collaborators
//! - [`io`] - CSV extraction, Parquet I/O, decompression
//! - [`config`] / [`logging`] - run configuration and log setup
//! - [`testing`] - fixtures and recording doubles

pub mod config;
pub mod error;
pub mod io;
pub mod logging;
pub mod notify;
pub mod partition;
pub mod pipeline;
pub mod schema;
pub mod sink;
pub mod table;
pub mod testing;
pub mod transform;
pub mod validation;
pub mod value;

// General re-exports
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use notify::{Alert, FileNotifier, Notifier};
pub use partition::{Partitioned, partition};
pub use pipeline::{Pipeline, RunOutcome, RunSummary};
pub use schema::{Check, ColumnMode, FieldSpec, Schema};
pub use sink::Sink;
pub use table::{Column, Table};
pub use transform::{ColumnRule, apply_rule, transform_users};
pub use validation::{FailureReport, Rule, ValidationOutcome, Validator, Violation};
pub use value::{ColumnType, Value};

// Gated re-exports
#[cfg(feature = "io-parquet")]
pub use io::parquet::{read_parquet_table, write_parquet_table};

#[cfg(feature = "io-parquet")]
pub use sink::ParquetSink;
