use std::path::PathBuf;

use survey_lens::cli::Args;
use survey_lens::config::{DashboardConfig, DEFAULT_SOURCE};
use tempfile::TempDir;

#[test]
fn test_load_explicit_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[source]
path = "data/nfhs.csv"

[grouping]
hint = "region"

[display]
preview_rows = 10
"#,
    )
    .unwrap();

    let config = DashboardConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.source.path, PathBuf::from("data/nfhs.csv"));
    assert_eq!(config.grouping.hint, "region");
    assert_eq!(config.display.preview_rows, 10);
    assert_eq!(config.display.view.histogram_bins, 10);
}

#[test]
fn test_missing_explicit_file_is_error() {
    let dir = TempDir::new().unwrap();
    let result = DashboardConfig::load(Some(dir.path().join("nope.toml").as_path()));
    assert!(result.is_err());
}

#[test]
fn test_invalid_values_are_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[display]\npreview_rows = 0\n").unwrap();
    let config = DashboardConfig::load(Some(path.as_path())).unwrap();
    let err = config.validate().unwrap_err();
    assert!(err.to_string().contains("preview_rows"));

    std::fs::write(&path, "[display\n").unwrap();
    assert!(DashboardConfig::load(Some(path.as_path())).is_err());
}

#[test]
fn test_args_rescue_invalid_file_values() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[source]\nsheet = 1\n\n[display]\npreview_rows = 0\n").unwrap();

    let mut config = DashboardConfig::load(Some(path.as_path())).unwrap();
    assert_eq!(config.load_options().sheet.as_deref(), Some("1"));

    let args = Args {
        preview_rows: Some(5),
        ..Args::default()
    };
    config.apply_args(&args);
    assert!(config.validate().is_ok());
    assert_eq!(config.display.preview_rows, 5);
}

#[test]
fn test_args_override_file() {
    let mut config = DashboardConfig::default();
    assert_eq!(config.source.path, PathBuf::from(DEFAULT_SOURCE));

    let args = Args {
        path: Some(PathBuf::from("other.xlsx")),
        sheet: Some("2".into()),
        group_column: Some("District".into()),
        bins: Some(25),
        ..Args::default()
    };
    config.apply_args(&args);

    assert_eq!(config.source.path, PathBuf::from("other.xlsx"));
    assert_eq!(config.load_options().sheet.as_deref(), Some("2"));
    assert_eq!(config.grouping.column.as_deref(), Some("District"));
    assert_eq!(config.grouping.hint, "state");
    assert_eq!(config.display.view.histogram_bins, 25);
    assert_eq!(config.display.preview_rows, 5);
}
