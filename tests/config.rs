use ironsieve::{ColumnMode, PipelineConfig};
use std::path::{Path, PathBuf};

#[test]
fn config_defaults() {
    let config = PipelineConfig::default();
    assert_eq!(config.input, PathBuf::from("data/input/users_raw.csv"));
    assert_eq!(config.trusted_dir, PathBuf::from("data/trusted"));
    assert_eq!(config.quarantine_dir, PathBuf::from("data/quarantine"));
    assert_eq!(config.alert_dir, PathBuf::from("data/alerts"));
    assert_eq!(config.column_mode, ColumnMode::Lenient);
}

#[test]
fn config_partial_toml_falls_back_to_defaults() -> anyhow::Result<()> {
    let config = PipelineConfig::from_toml_str(
        r#"
        input = "batches/today.csv"
        column_mode = "strict"
        "#,
    )?;
    assert_eq!(config.input, PathBuf::from("batches/today.csv"));
    assert_eq!(config.column_mode, ColumnMode::Strict);
    assert_eq!(config.trusted_dir, PipelineConfig::default().trusted_dir);
    Ok(())
}

#[test]
fn config_empty_toml_is_default() -> anyhow::Result<()> {
    assert_eq!(PipelineConfig::from_toml_str("")?, PipelineConfig::default());
    Ok(())
}

#[test]
fn config_rejects_unknown_keys() {
    let err = PipelineConfig::from_toml_str("input = \"a.csv\"\nretries = 3\n").unwrap_err();
    assert!(format!("{err:#}").contains("retries"));
}

#[test]
fn config_rejects_unknown_column_mode() {
    assert!(PipelineConfig::from_toml_str("column_mode = \"loose\"").is_err());
}

#[test]
fn config_from_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("ironsieve.toml");
    std::fs::write(&path, "alert_dir = \"/var/alerts\"\n")?;

    let config = PipelineConfig::from_file(&path)?;
    assert_eq!(config.alert_dir, PathBuf::from("/var/alerts"));

    let err = PipelineConfig::from_file(dir.path().join("missing.toml")).unwrap_err();
    assert!(format!("{err:#}").contains("missing.toml"));
    Ok(())
}

#[test]
fn config_rooted_at_only_rewrites_relative_paths() -> anyhow::Result<()> {
    let config = PipelineConfig::from_toml_str("alert_dir = \"/var/alerts\"")?.rooted_at("/srv/etl");
    assert_eq!(config.input, Path::new("/srv/etl/data/input/users_raw.csv"));
    assert_eq!(config.trusted_dir, Path::new("/srv/etl/data/trusted"));
    assert_eq!(config.alert_dir, Path::new("/var/alerts"));
    Ok(())
}
