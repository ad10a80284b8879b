//! Testing utilities for ironsieve runs.
//!
//! - **Fixtures**: raw user batches, as tables and as CSV text
//! - **Mock I/O**: recording sinks and notifiers, temp files and directories
//!
//! # Quick Start
//!
//! ```
//! use ironsieve::*;
//! use ironsieve::testing::*;
//! use chrono::NaiveDate;
//!
//! # fn main() -> anyhow::Result<()> {
//! let mut pipeline = Pipeline::new(
//!     Schema::users(),
//!     RecordingSink::new("trusted"),
//!     RecordingSink::new("quarantine"),
//!     RecordingNotifier::new(),
//! );
//! let at = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//! let outcome = pipeline.run_table(mixed_users(), "fixture", at)?;
//!
//! assert!(!outcome.is_clean());
//! assert_eq!(pipeline.trusted_sink().writes()[0].len(), 3);
//! assert_eq!(pipeline.quarantine_sink().writes()[0].len(), 2);
//! # Ok(())
//! # }
//! ```

pub mod fixtures;
pub mod mock_io;

pub use fixtures::*;
pub use mock_io::*;
