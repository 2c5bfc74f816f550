use std::sync::Arc;

use anyhow::Result;
use arrow::array::{ArrayRef, Float64Array, Int32Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;
use rust_xlsxwriter::Workbook;
use survey_lens::data::cache::DatasetCache;
use survey_lens::data::loader::{load_file, LoadError, LoadOptions};
use survey_lens::data::model::{CellValue, ColumnKind};
use tempfile::TempDir;

const SURVEY_CSV: &str = "\
State/UT,Area,Literacy (%),Stunted (%),Notes
Punjab,Urban,81.4,24.5,
Punjab,Rural,72.1,,estimate
Kerala,Urban,96.2,19.0,
,Total,70.0,30.1,unassigned
";

fn write(dir: &TempDir, name: &str, content: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, content).expect("write fixture");
    path
}

#[test]
fn test_csv_types_and_order() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(&dir, "survey.csv", SURVEY_CSV);

    let ds = load_file(&path, &LoadOptions::default())?;
    assert_eq!(ds.len(), 4);
    assert_eq!(
        ds.column_names(),
        vec!["State/UT", "Area", "Literacy (%)", "Stunted (%)", "Notes"]
    );

    let literacy = ds.column("Literacy (%)").unwrap();
    assert_eq!(literacy.kind, ColumnKind::Numeric);
    let stunted = ds.column("Stunted (%)").unwrap();
    assert_eq!(stunted.kind, ColumnKind::Numeric);
    assert!(stunted.values[1].is_null());
    assert_eq!(ds.column("Notes").unwrap().kind, ColumnKind::Categorical);
    assert!(ds.column("State/UT").unwrap().values[3].is_null());
    Ok(())
}

#[test]
fn test_json_records_keep_key_order() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(
        &dir,
        "survey.json",
        r#"[
            {"Zone": "North", "State Name": "Punjab", "Value": 3},
            {"Zone": "South", "State Name": "Kerala", "Value": 4.5, "Extra": true}
        ]"#,
    );

    let ds = load_file(&path, &LoadOptions::default())?;
    assert_eq!(ds.column_names(), vec!["Zone", "State Name", "Value", "Extra"]);
    assert_eq!(ds.column("Value").unwrap().kind, ColumnKind::Numeric);
    assert!(ds.column("Extra").unwrap().values[0].is_null());
    Ok(())
}

#[test]
fn test_parquet_flat_columns() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("survey.parquet");

    let schema = Arc::new(Schema::new(vec![
        Field::new("State", DataType::Utf8, true),
        Field::new("Households", DataType::Int32, false),
        Field::new("Electricity (%)", DataType::Float64, true),
    ]));
    let columns: Vec<ArrayRef> = vec![
        Arc::new(StringArray::from(vec![Some("Goa"), None, Some("Bihar")])),
        Arc::new(Int32Array::from(vec![120, 80, 300])),
        Arc::new(Float64Array::from(vec![Some(99.1), Some(f64::NAN), None])),
    ];
    let batch = RecordBatch::try_new(schema.clone(), columns)?;
    let file = std::fs::File::create(&path)?;
    let mut writer = ArrowWriter::try_new(file, schema, None)?;
    writer.write(&batch)?;
    writer.close()?;

    let ds = load_file(&path, &LoadOptions::default())?;
    assert_eq!(ds.len(), 3);
    assert_eq!(ds.column("State").unwrap().values[0], CellValue::Text("Goa".into()));
    assert!(ds.column("State").unwrap().values[1].is_null());
    assert_eq!(ds.column("Households").unwrap().values[2], CellValue::Integer(300));
    let elec = ds.column("Electricity (%)").unwrap();
    assert_eq!(elec.kind, ColumnKind::Numeric);
    assert!(elec.values[1].is_null());
    assert!(elec.values[2].is_null());
    Ok(())
}

/// Two sheets: "Data" (index 0) with a survey table, "Notes" (index 1).
fn write_workbook(dir: &TempDir) -> Result<std::path::PathBuf> {
    let path = dir.path().join("nfhs.xlsx");
    let mut workbook = Workbook::new();

    let data = workbook.add_worksheet();
    data.set_name("Data")?;
    for (col, header) in ["State/UT", "Area", "Literacy (%)", "Households"]
        .iter()
        .enumerate()
    {
        data.write_string(0, col as u16, *header)?;
    }
    data.write_string(1, 0, "Punjab")?;
    data.write_string(1, 1, "Urban")?;
    data.write_number(1, 2, 81.4)?;
    data.write_number(1, 3, 1200.0)?;
    data.write_string(2, 0, "Kerala")?;
    data.write_string(2, 1, "Rural")?;
    data.write_number(2, 3, 950.0)?;

    let notes = workbook.add_worksheet();
    notes.set_name("Notes")?;
    notes.write_string(0, 0, "Source")?;
    notes.write_string(1, 0, "NFHS-4")?;

    workbook.save(&path)?;
    Ok(path)
}

fn sheet(name: &str) -> LoadOptions {
    LoadOptions {
        sheet: Some(name.to_string()),
    }
}

#[test]
fn test_spreadsheet_first_sheet_by_default() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_workbook(&dir)?;

    let ds = load_file(&path, &LoadOptions::default())?;
    assert_eq!(ds.len(), 2);
    assert_eq!(
        ds.column_names(),
        vec!["State/UT", "Area", "Literacy (%)", "Households"]
    );
    assert_eq!(ds.column("State/UT").unwrap().kind, ColumnKind::Categorical);
    assert_eq!(ds.column("Area").unwrap().kind, ColumnKind::Categorical);

    let literacy = ds.column("Literacy (%)").unwrap();
    assert_eq!(literacy.kind, ColumnKind::Numeric);
    assert_eq!(literacy.number(0), Some(81.4));
    assert!(literacy.values[1].is_null());
    assert_eq!(ds.column("Households").unwrap().kind, ColumnKind::Numeric);
    assert_eq!(
        ds.column("State/UT").unwrap().values[1],
        CellValue::Text("Kerala".into())
    );
    Ok(())
}

#[test]
fn test_spreadsheet_sheet_by_index_or_name() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_workbook(&dir)?;

    let by_name = load_file(&path, &sheet("Data"))?;
    let by_index = load_file(&path, &sheet("0"))?;
    assert_eq!(by_name.column_names(), by_index.column_names());
    assert_eq!(by_name.len(), 2);

    let notes = load_file(&path, &sheet("Notes"))?;
    assert_eq!(notes.column_names(), vec!["Source"]);
    assert_eq!(load_file(&path, &sheet("1"))?.column_names(), vec!["Source"]);
    Ok(())
}

#[test]
fn test_spreadsheet_missing_sheet_is_no_sheet() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write_workbook(&dir)?;

    for missing in ["Summary", "7"] {
        let err = load_file(&path, &sheet(missing)).unwrap_err();
        match err {
            LoadError::NoSheet { sheet, .. } => assert_eq!(sheet, missing),
            other => panic!("expected NoSheet, got {other:?}"),
        }
    }
    Ok(())
}

#[test]
fn test_missing_file_is_load_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("All India National Family Health Survey4.xlsx");
    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Missing(_)));
    assert!(err.to_string().contains("not found"));
}

#[test]
fn test_corrupt_file_is_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = write(&dir, "broken.json", "{ not json");
    let err = load_file(&path, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));

    let xlsx = write(&dir, "broken.xlsx", "this is not a zip archive");
    let err = load_file(&xlsx, &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, LoadError::Parse { .. }));
}

#[test]
fn test_cache_returns_same_dataset() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(&dir, "survey.csv", SURVEY_CSV);
    let mut cache = DatasetCache::new();

    let first = cache.get_or_load(&path, &LoadOptions::default())?;
    let second = cache.get_or_load(&path, &LoadOptions::default())?;
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn test_cache_reloads_changed_file() -> Result<()> {
    let dir = TempDir::new()?;
    let path = write(&dir, "survey.csv", SURVEY_CSV);
    let mut cache = DatasetCache::new();

    let first = cache.get_or_load(&path, &LoadOptions::default())?;
    std::fs::write(&path, format!("{SURVEY_CSV}Goa,Urban,88.8,20.0,\n"))?;
    let second = cache.get_or_load(&path, &LoadOptions::default())?;

    assert!(!Arc::ptr_eq(&first, &second));
    assert_eq!(second.len(), 5);
    assert_eq!(cache.len(), 1);
    Ok(())
}

#[test]
fn test_cache_propagates_missing_file() {
    let mut cache = DatasetCache::new();
    let err = cache
        .get_or_load(
            std::path::Path::new("/definitely/not/here.csv"),
            &LoadOptions::default(),
        )
        .unwrap_err();
    assert!(matches!(err, LoadError::Missing(_)));
    assert!(cache.is_empty());
}
