//! Parquet I/O for [`Table`]s.
//!
//! - [`table_to_record_batch`] maps each [`Column`] to an Arrow array using its
//!   [`ColumnType`]: `Int64` -> Int64, `Float64` -> Float64, `Utf8` -> Utf8,
//!   `Timestamp` -> Timestamp(µs, no zone). Every field is nullable.
//! - [`write_parquet_table`] writes one batch with `parquet::arrow::ArrowWriter`.
//! - [`read_parquet_table`] reads a file back into a [`Table`], used to
//!   inspect sink output.

use crate::table::{Column, Table};
use crate::value::{ColumnType, Value};
use anyhow::{Context, Result, bail};
use arrow::array::{
    Array, ArrayRef, Float64Array, Int64Array, StringArray, TimestampMicrosecondArray, UInt64Array,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::DateTime;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use parquet::arrow::arrow_writer::ArrowWriter;
use parquet::file::properties::WriterProperties;
use std::fs::File;
use std::path::Path;
use std::sync::Arc;

/// Name of the lineage column added by [`write_parquet_table`] when asked to.
pub const SOURCE_ROW_COLUMN: &str = "source_row";

/// Convert a [`Table`] into an Arrow [`RecordBatch`].
///
/// With `with_source_row`, a trailing `UInt64` column carries each row's
/// source index.
///
/// # Errors
/// Returns an error if Arrow rejects the assembled columns.
pub fn table_to_record_batch(table: &Table, with_source_row: bool) -> Result<RecordBatch> {
    let mut fields = Vec::with_capacity(table.columns().len() + 1);
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(table.columns().len() + 1);

    for col in table.columns() {
        fields.push(Field::new(&col.name, arrow_type(col.dtype), true));
        arrays.push(column_to_array(col));
    }
    if with_source_row {
        fields.push(Field::new(SOURCE_ROW_COLUMN, DataType::UInt64, false));
        let index: Vec<u64> = table.index().iter().map(|&i| i as u64).collect();
        arrays.push(Arc::new(UInt64Array::from(index)));
    }

    RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays).context("assemble RecordBatch")
}

/// Write a [`Table`] to a Parquet file.
///
/// # Returns
/// Number of rows written.
///
/// # Errors
/// An error is returned if the conversion, file creation, or writing fails.
pub fn write_parquet_table(
    path: impl AsRef<Path>,
    table: &Table,
    with_source_row: bool,
) -> Result<usize> {
    let path = path.as_ref();
    let batch = table_to_record_batch(table, with_source_row)?;

    let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let props = WriterProperties::builder().build();
    let mut writer =
        ArrowWriter::try_new(file, batch.schema(), Some(props)).context("create ArrowWriter")?;
    writer.write(&batch).context("write batch to parquet")?;
    writer.close().context("close ArrowWriter")?;

    Ok(table.len())
}

/// Read a Parquet file written by [`write_parquet_table`] back into a [`Table`].
///
/// A `source_row` column, when present, becomes the table's source index
/// instead of a data column.
///
/// # Errors
/// Returns an error if the file cannot be read or holds an unsupported
/// column type.
pub fn read_parquet_table(path: impl AsRef<Path>) -> Result<Table> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("open ParquetRecordBatchReader")?
        .build()
        .context("build ParquetRecordBatchReader")?;

    let mut columns: Vec<Column> = Vec::new();
    let mut index: Option<Vec<usize>> = None;
    for batch in reader {
        let batch = batch.context("read next batch")?;
        let schema = batch.schema();
        if columns.is_empty() && index.is_none() {
            for field in schema.fields() {
                if field.name() == SOURCE_ROW_COLUMN {
                    index = Some(Vec::new());
                } else {
                    columns.push(Column::new(field.name(), column_type(field.data_type())?, vec![]));
                }
            }
        }
        for (field, array) in schema.fields().iter().zip(batch.columns()) {
            if field.name() == SOURCE_ROW_COLUMN {
                let rows = downcast::<UInt64Array>(array, field.name())?;
                if let Some(index) = index.as_mut() {
                    index.extend(rows.values().iter().map(|&i| i as usize));
                }
                continue;
            }
            let Some(col) = columns.iter_mut().find(|c| c.name == *field.name()) else {
                bail!("column {} missing from schema of first batch", field.name());
            };
            col.values.extend(array_values(array, field.name())?);
        }
    }

    let table = match index {
        Some(index) => Table::with_index(index, columns)?,
        None => Table::new(columns)?,
    };
    Ok(table)
}

fn arrow_type(dtype: ColumnType) -> DataType {
    match dtype {
        ColumnType::Utf8 => DataType::Utf8,
        ColumnType::Int64 => DataType::Int64,
        ColumnType::Float64 => DataType::Float64,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, None),
    }
}

fn column_type(data_type: &DataType) -> Result<ColumnType> {
    Ok(match data_type {
        DataType::Utf8 => ColumnType::Utf8,
        DataType::Int64 => ColumnType::Int64,
        DataType::Float64 => ColumnType::Float64,
        DataType::Timestamp(TimeUnit::Microsecond, None) => ColumnType::Timestamp,
        other => bail!("unsupported parquet column type {other}"),
    })
}

/// Cells that do not fit the column type are written as null.
fn column_to_array(col: &Column) -> ArrayRef {
    match col.dtype {
        ColumnType::Utf8 => Arc::new(StringArray::from(
            col.values
                .iter()
                .map(|v| (!v.is_null()).then(|| v.to_string()))
                .collect::<Vec<Option<String>>>(),
        )),
        ColumnType::Int64 => Arc::new(Int64Array::from(
            col.values.iter().map(Value::as_int).collect::<Vec<_>>(),
        )),
        ColumnType::Float64 => Arc::new(Float64Array::from(
            col.values
                .iter()
                .map(|v| match v {
                    Value::Float(f) => Some(*f),
                    Value::Int(i) => Some(*i as f64),
                    _ => None,
                })
                .collect::<Vec<_>>(),
        )),
        ColumnType::Timestamp => Arc::new(TimestampMicrosecondArray::from(
            col.values
                .iter()
                .map(|v| v.as_timestamp().map(|ts| ts.and_utc().timestamp_micros()))
                .collect::<Vec<_>>(),
        )),
    }
}

fn array_values(array: &ArrayRef, name: &str) -> Result<Vec<Value>> {
    let values = match array.data_type() {
        DataType::Utf8 => {
            let a = downcast::<StringArray>(array, name)?;
            (0..a.len())
                .map(|i| if a.is_null(i) { Value::Null } else { Value::str(a.value(i)) })
                .collect()
        }
        DataType::Int64 => {
            let a = downcast::<Int64Array>(array, name)?;
            (0..a.len())
                .map(|i| if a.is_null(i) { Value::Null } else { Value::Int(a.value(i)) })
                .collect()
        }
        DataType::Float64 => {
            let a = downcast::<Float64Array>(array, name)?;
            (0..a.len())
                .map(|i| if a.is_null(i) { Value::Null } else { Value::Float(a.value(i)) })
                .collect()
        }
        DataType::Timestamp(TimeUnit::Microsecond, None) => {
            let a = downcast::<TimestampMicrosecondArray>(array, name)?;
            (0..a.len())
                .map(|i| {
                    if a.is_null(i) {
                        return Value::Null;
                    }
                    DateTime::from_timestamp_micros(a.value(i))
                        .map_or(Value::Null, |dt| Value::Timestamp(dt.naive_utc()))
                })
                .collect()
        }
        other => bail!("unsupported parquet column type {other} for {name}"),
    };
    Ok(values)
}

fn downcast<'a, T: 'static>(array: &'a ArrayRef, name: &str) -> Result<&'a T> {
    array
        .as_any()
        .downcast_ref::<T>()
        .with_context(|| format!("column {name} has unexpected array layout"))
}
