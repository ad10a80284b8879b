//! Splitting a batch into trusted and quarantined rows.

use crate::error::{PipelineError, Result};
use crate::table::Table;
use std::collections::BTreeSet;

/// The two halves of a partitioned batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Partitioned {
    pub valid: Table,
    pub invalid: Table,
}

/// Split `table` by the source indices in `invalid`.
///
/// Row order inside each half follows the input order. Before returning,
/// the halves are checked to be disjoint and to cover every input row
/// exactly once.
///
/// # Errors
/// [`PipelineError::PartitionInvariant`] if `invalid` names a row the batch
/// does not hold, or the coverage check fails.
pub fn partition(table: &Table, invalid: &BTreeSet<usize>) -> Result<Partitioned> {
    let present: BTreeSet<usize> = table.index().iter().copied().collect();
    if let Some(unknown) = invalid.difference(&present).next() {
        return Err(PipelineError::PartitionInvariant(format!(
            "row {unknown} is not part of the batch"
        )));
    }

    let (bad, good): (Vec<usize>, Vec<usize>) =
        (0..table.len()).partition(|&pos| invalid.contains(&table.index()[pos]));
    let parts = Partitioned {
        valid: table.take(&good),
        invalid: table.take(&bad),
    };
    check_coverage(table, &parts)?;
    Ok(parts)
}

fn check_coverage(table: &Table, parts: &Partitioned) -> Result<()> {
    if parts.valid.len() + parts.invalid.len() != table.len() {
        return Err(PipelineError::PartitionInvariant(format!(
            "{} valid + {} invalid rows != {} input rows",
            parts.valid.len(),
            parts.invalid.len(),
            table.len()
        )));
    }
    let valid: BTreeSet<usize> = parts.valid.index().iter().copied().collect();
    if let Some(both) = parts.invalid.index().iter().find(|i| valid.contains(i)) {
        return Err(PipelineError::PartitionInvariant(format!(
            "row {both} landed in both partitions"
        )));
    }
    Ok(())
}
