//! Delimited-file extraction into a [`Table`].
//!
//! Every cell is read verbatim as text ([`Value::Str`]), empty cells
//! included; canonicalization is the transformer's job. The first record is
//! always the header. Header names are trimmed, and a file without a header,
//! with a repeated header name, or with a row whose width differs from the
//! header is rejected as not tabular.
//!
//! **Compression**: gzip and zstd inputs are decompressed transparently (see
//! [`compression`](crate::io::compression)).

use crate::error::PipelineError;
use crate::io::compression::auto_detect_reader;
use crate::table::Table;
use crate::value::Value;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Read a delimited file into a [`Table`] of raw text columns.
///
/// # Errors
/// Returns an error if the file cannot be opened or decoded, or if its
/// content is not a rectangular table with a header.
pub fn read_csv_table(path: impl AsRef<Path>, delimiter: u8) -> Result<Table> {
    let path = path.as_ref();
    let f = File::open(path).with_context(|| format!("open {}", path.display()))?;
    let rdr = auto_detect_reader(f, path)
        .with_context(|| format!("setup decompression for {}", path.display()))?;
    read_csv_reader(rdr, delimiter).with_context(|| format!("read CSV table {}", path.display()))
}

/// Read delimited text from any reader into a [`Table`].
///
/// # Errors
/// See [`read_csv_table`].
pub fn read_csv_reader<R: Read>(reader: R, delimiter: u8) -> Result<Table> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .flexible(true)
        .from_reader(reader);

    let header: Vec<String> = rdr
        .headers()
        .context("read CSV header")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if header.iter().all(String::is_empty) {
        return Err(PipelineError::NotTabular("input has no header row".into()).into());
    }

    let mut rows = Vec::new();
    for (i, rec) in rdr.records().enumerate() {
        let rec = rec.with_context(|| format!("parse CSV record #{}", i + 1))?;
        rows.push(rec.iter().map(Value::str).collect());
    }
    Ok(Table::from_rows(&header, rows)?)
}
