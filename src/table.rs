//! The in-memory batch.
//!
//! A [`Table`] is column-oriented: each [`Column`] owns one `Vec<Value>`, and
//! every column has the same length. Next to the columns the table keeps the
//! *source index* of each row (its 0-based position in the input), so
//! sub-tables produced by the partitioner can always be traced back to the
//! rows they came from.

use crate::error::{PipelineError, Result};
use crate::value::{ColumnType, Value};
use std::collections::HashSet;

/// A named, typed column of cells.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub dtype: ColumnType,
    pub values: Vec<Value>,
}

impl Column {
    pub fn new<S: Into<String>>(name: S, dtype: ColumnType, values: Vec<Value>) -> Self {
        Self {
            name: name.into(),
            dtype,
            values,
        }
    }

    /// A raw text column, as produced by the extractor.
    pub fn utf8<S: Into<String>>(name: S, values: Vec<Value>) -> Self {
        Self::new(name, ColumnType::Utf8, values)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// An ordered batch of records.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    index: Vec<usize>,
    columns: Vec<Column>,
}

impl Table {
    /// Build a table whose source indices are `0..len`.
    ///
    /// # Errors
    /// [`PipelineError::NotTabular`] if the columns differ in length,
    /// [`PipelineError::DuplicateColumn`] if a name repeats.
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let len = columns.first().map_or(0, Column::len);
        Self::with_index((0..len).collect(), columns)
    }

    /// Build a table with explicit source indices.
    ///
    /// # Errors
    /// See [`Table::new`]; additionally fails when `index` and the columns
    /// disagree on the row count.
    pub fn with_index(index: Vec<usize>, columns: Vec<Column>) -> Result<Self> {
        let mut seen = HashSet::with_capacity(columns.len());
        for col in &columns {
            if !seen.insert(col.name.as_str()) {
                return Err(PipelineError::DuplicateColumn {
                    column: col.name.clone(),
                });
            }
            if col.len() != index.len() {
                return Err(PipelineError::NotTabular(format!(
                    "column {} has {} values, expected {}",
                    col.name,
                    col.len(),
                    index.len()
                )));
            }
        }
        Ok(Self { index, columns })
    }

    /// Build a table from a header and row-major records.
    ///
    /// # Errors
    /// [`PipelineError::NotTabular`] if any row has a different width than
    /// the header.
    pub fn from_rows<S: AsRef<str>>(header: &[S], rows: Vec<Vec<Value>>) -> Result<Self> {
        let mut columns: Vec<Column> = header
            .iter()
            .map(|name| Column::utf8(name.as_ref(), Vec::with_capacity(rows.len())))
            .collect();
        for (i, row) in rows.into_iter().enumerate() {
            if row.len() != columns.len() {
                return Err(PipelineError::NotTabular(format!(
                    "row {i} has {} fields, header has {}",
                    row.len(),
                    columns.len()
                )));
            }
            for (col, value) in columns.iter_mut().zip(row) {
                col.values.push(value);
            }
        }
        Self::new(columns)
    }

    /// Number of rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.index.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// Source index of every row, in row order.
    #[must_use]
    pub fn index(&self) -> &[usize] {
        &self.index
    }

    #[must_use]
    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    #[must_use]
    pub fn has_column(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    #[must_use]
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_mut(&mut self, name: &str) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.name == name)
    }

    pub(crate) fn columns_mut(&mut self) -> impl Iterator<Item = &mut Column> {
        self.columns.iter_mut()
    }

    /// Like [`Table::column`], failing with [`PipelineError::MissingColumn`].
    pub fn require(&self, name: &str) -> Result<&Column> {
        self.column(name).ok_or_else(|| PipelineError::MissingColumn {
            column: name.to_string(),
        })
    }

    /// Cell at row position `row` of column `name`.
    #[must_use]
    pub fn value(&self, row: usize, name: &str) -> Option<&Value> {
        self.column(name).and_then(|c| c.values.get(row))
    }

    /// Copy of the row at position `row` as `(column, value)` pairs.
    #[must_use]
    pub fn row(&self, row: usize) -> Option<Vec<(&str, &Value)>> {
        if row >= self.len() {
            return None;
        }
        Some(
            self.columns
                .iter()
                .map(|c| (c.name.as_str(), &c.values[row]))
                .collect(),
        )
    }

    /// New table holding the rows at `positions`, in the given order.
    ///
    /// Positions are row positions in `self`, not source indices.
    ///
    /// # Panics
    /// If a position is out of bounds.
    #[must_use]
    pub fn take(&self, positions: &[usize]) -> Table {
        let index = positions.iter().map(|&p| self.index[p]).collect();
        let columns = self
            .columns
            .iter()
            .map(|c| Column {
                name: c.name.clone(),
                dtype: c.dtype,
                values: positions.iter().map(|&p| c.values[p].clone()).collect(),
            })
            .collect();
        Table { index, columns }
    }
}
