#![cfg(feature = "io-parquet")]

use chrono::NaiveDate;
use ironsieve::io::parquet::{SOURCE_ROW_COLUMN, table_to_record_batch};
use ironsieve::testing::*;
use ironsieve::*;

fn canonical_mixed() -> Table {
    let mut t = mixed_users();
    transform_users(&mut t).unwrap();
    t
}

#[test]
fn parquet_roundtrip_canonical_batch() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("users.parquet");
    let table = canonical_mixed();

    let n = write_parquet_table(&path, &table, false)?;
    assert_eq!(n, 5);

    let back = read_parquet_table(&path)?;
    assert_eq!(back, table);
    assert_eq!(back.column("signup_date").unwrap().dtype, ColumnType::Timestamp);
    Ok(())
}

#[test]
fn parquet_source_row_becomes_index() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("quarantine.parquet");
    let slice = canonical_mixed().take(&[1, 3]);

    write_parquet_table(&path, &slice, true)?;
    let back = read_parquet_table(&path)?;

    assert_eq!(back.index(), &[1, 3]);
    assert!(!back.has_column(SOURCE_ROW_COLUMN));
    assert_eq!(back.value(1, "age"), Some(&Value::Int(101)));
    Ok(())
}

#[test]
fn parquet_preserves_nulls() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let path = tmp.path().join("nulls.parquet");
    let mut table = users_table(vec![
        user_row("", "", "", "", ""),
        user_row("1", "a", "a@x.io", "20", "2023-01-01"),
    ]);
    transform_users(&mut table)?;

    write_parquet_table(&path, &table, false)?;
    let back = read_parquet_table(&path)?;
    for name in USER_COLUMNS {
        assert_eq!(back.value(0, name), Some(&Value::Null), "{name}");
    }
    assert_eq!(
        back.value(1, "signup_date"),
        Some(&Value::Timestamp(
            NaiveDate::from_ymd_opt(2023, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap()
        ))
    );
    Ok(())
}

#[test]
fn record_batch_schema_matches_column_types() -> anyhow::Result<()> {
    let batch = table_to_record_batch(&canonical_mixed(), true)?;
    let schema = batch.schema();
    let names: Vec<&str> = schema.fields().iter().map(|f| f.name().as_str()).collect();
    assert_eq!(
        names,
        vec!["user_id", "username", "email", "age", "signup_date", SOURCE_ROW_COLUMN]
    );
    assert_eq!(schema.field(0).data_type(), &arrow::datatypes::DataType::Int64);
    assert!(!schema.field(5).is_nullable());
    Ok(())
}

#[test]
fn parquet_sink_names_and_retracts_artifacts() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let at = NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_milli_opt(7, 8, 9, 10)
        .unwrap();
    let mut sink = ParquetSink::trusted(tmp.path().join("trusted"));

    let path = sink.write(&canonical_mixed(), at)?;
    assert_eq!(
        path.file_name().unwrap().to_string_lossy(),
        "users_20240506_070809_010.parquet"
    );
    assert!(path.exists());
    assert_eq!(read_parquet_table(&path)?.len(), 5);
    assert_eq!(std::fs::read_dir(sink.dir())?.count(), 1);

    sink.retract(&path)?;
    assert!(!path.exists());
    Ok(())
}

#[test]
fn parquet_sink_refuses_to_overwrite() -> anyhow::Result<()> {
    let tmp = tempfile::tempdir()?;
    let at = NaiveDate::from_ymd_opt(2024, 5, 6)
        .unwrap()
        .and_hms_milli_opt(7, 8, 9, 10)
        .unwrap();
    let mut sink = ParquetSink::quarantine(tmp.path());

    let path = sink.write(&canonical_mixed().take(&[1, 3]), at)?;
    assert!(sink.write(&canonical_mixed(), at).is_err());

    assert_eq!(read_parquet_table(&path)?.index(), &[1, 3]);
    assert_eq!(std::fs::read_dir(sink.dir())?.count(), 1);
    Ok(())
}
