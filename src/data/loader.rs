use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{
    DataType, Float32Type, Float64Type, Int16Type, Int32Type, Int64Type, Int8Type, UInt16Type,
    UInt32Type, UInt64Type, UInt8Type,
};
use calamine::{open_workbook_auto, Data, Reader};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::Value as JsonValue;
use thiserror::Error;

use super::model::{CellValue, Column, Dataset};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Failure to produce a dataset from a source file. Always fatal for the
/// dashboard: nothing is rendered from a partial load.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("dataset file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("cannot read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported file extension: .{0}")]
    UnsupportedFormat(String),

    #[error("{}: requested sheet '{sheet}' does not exist", .path.display())]
    NoSheet { path: PathBuf, sheet: String },

    #[error("cannot parse {} as a table: {message}", .path.display())]
    Parse { path: PathBuf, message: String },
}

/// Options that influence how a source file is read.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct LoadOptions {
    /// Spreadsheet sheet, by 0-based index or by name. First sheet when unset.
    pub sheet: Option<String>,
}

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a tabular dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.xlsx` / `.xlsm` / `.xlsb` / `.xls` / `.ods` – first row is the header
/// * `.csv`     – header row, cell types guessed per value
/// * `.json`    – `[{ "State": "...", "Indicator": 1.5, ... }, ...]`
/// * `.parquet` – flat columns of strings, numbers, booleans or dates
pub fn load_file(path: &Path, options: &LoadOptions) -> Result<Dataset, LoadError> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => {}
        Ok(_) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "not a regular file"),
            })
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(LoadError::Missing(path.to_path_buf()))
        }
        Err(source) => {
            return Err(LoadError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let parsed = match ext.as_str() {
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => load_spreadsheet(path, options)?,
        "parquet" | "pq" => load_parquet(path),
        "json" => load_json(path),
        "csv" => load_csv(path),
        other => return Err(LoadError::UnsupportedFormat(other.to_string())),
    };

    parsed.map_err(|e| LoadError::Parse {
        path: path.to_path_buf(),
        message: format!("{e:#}"),
    })
}

// ---------------------------------------------------------------------------
// Spreadsheet loader
// ---------------------------------------------------------------------------

/// Reads one worksheet. The outer result carries the sheet-selection
/// failure, the inner one carries parsing problems.
fn load_spreadsheet(path: &Path, options: &LoadOptions) -> Result<Result<Dataset>, LoadError> {
    let parse_err = |message: String| LoadError::Parse {
        path: path.to_path_buf(),
        message,
    };

    let mut workbook = open_workbook_auto(path).map_err(|e| parse_err(e.to_string()))?;
    if workbook.sheet_names().is_empty() {
        return Err(parse_err("workbook has no worksheets".into()));
    }

    let range = match options.sheet.as_deref() {
        Some(sel) => {
            let by_index = sel.parse::<usize>().ok().and_then(|i| workbook.worksheet_range_at(i));
            match by_index {
                Some(range) => range.map_err(|e| parse_err(e.to_string()))?,
                None if workbook.sheet_names().iter().any(|n| n == sel) => workbook
                    .worksheet_range(sel)
                    .map_err(|e| parse_err(e.to_string()))?,
                None => {
                    return Err(LoadError::NoSheet {
                        path: path.to_path_buf(),
                        sheet: sel.to_string(),
                    })
                }
            }
        }
        None => workbook
            .worksheet_range_at(0)
            .ok_or_else(|| parse_err("workbook has no first sheet".into()))?
            .map_err(|e| parse_err(e.to_string()))?,
    };

    let mut rows = range.rows();
    let Some(header_row) = rows.next() else {
        return Ok(Ok(Dataset::default()));
    };
    let headers: Vec<String> = header_row.iter().map(|c| c.to_string()).collect();
    let records: Vec<Vec<CellValue>> = rows
        .map(|r| r.iter().map(spreadsheet_cell).collect())
        .collect();

    Ok(Dataset::from_rows(headers, records).context("assembling worksheet columns"))
}

fn spreadsheet_cell(cell: &Data) -> CellValue {
    match cell {
        Data::Int(i) => CellValue::Integer(*i),
        Data::Float(f) => CellValue::float(*f),
        Data::String(s) if s.trim().is_empty() => CellValue::Null,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Date(s.clone()),
        Data::DateTime(_) => CellValue::Date(cell.to_string()),
        _ => CellValue::Null,
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   { "State": "Punjab", "Area": "Urban", "Literacy (%)": 81.4 },
///   ...
/// ]
/// ```
///
/// Column order follows first appearance of each key.
fn load_json(path: &Path) -> Result<Dataset> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let root: JsonValue = serde_json::from_str(&text).context("parsing JSON")?;

    let records = root
        .as_array()
        .context("Expected top-level JSON array")?;

    let mut headers: Vec<String> = Vec::new();
    for (i, rec) in records.iter().enumerate() {
        let obj = rec
            .as_object()
            .with_context(|| format!("Row {i} is not a JSON object"))?;
        for key in obj.keys() {
            if !headers.contains(key) {
                headers.push(key.clone());
            }
        }
    }

    let rows = records
        .iter()
        .filter_map(|rec| rec.as_object())
        .map(|obj| {
            headers
                .iter()
                .map(|h| obj.get(h).map(json_to_cell).unwrap_or(CellValue::Null))
                .collect()
        })
        .collect();

    Dataset::from_rows(headers, rows)
}

fn json_to_cell(val: &JsonValue) -> CellValue {
    match val {
        JsonValue::String(s) => CellValue::Text(s.clone()),
        JsonValue::Number(n) => {
            if let Some(i) = n.as_i64() {
                CellValue::Integer(i)
            } else if let Some(f) = n.as_f64() {
                CellValue::float(f)
            } else {
                CellValue::Text(n.to_string())
            }
        }
        JsonValue::Bool(b) => CellValue::Bool(*b),
        JsonValue::Null => CellValue::Null,
        other => CellValue::Text(other.to_string()),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// CSV layout: header row with column names, one record per line.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)
        .context("opening CSV")?;
    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV headers")?
        .iter()
        .map(|h| h.to_string())
        .collect();

    let mut rows = Vec::new();
    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {row_no}"))?;
        rows.push(record.iter().map(guess_cell_type).collect());
    }

    Dataset::from_rows(headers, rows)
}

fn guess_cell_type(s: &str) -> CellValue {
    let s = s.trim();
    if s.is_empty() {
        return CellValue::Null;
    }
    if let Ok(i) = s.parse::<i64>() {
        return CellValue::Integer(i);
    }
    if let Ok(f) = s.parse::<f64>() {
        return CellValue::float(f);
    }
    match s {
        "true" | "True" | "TRUE" => CellValue::Bool(true),
        "false" | "False" | "FALSE" => CellValue::Bool(false),
        _ => CellValue::Text(s.to_string()),
    }
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet file with flat columns.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`). Dictionary-encoded strings, dates and
/// other non-primitive columns are cast to text.
fn load_parquet(path: &Path) -> Result<Dataset> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder = ParquetRecordBatchReaderBuilder::try_new(file)
        .context("reading parquet metadata")?;
    let names: Vec<String> = builder
        .schema()
        .fields()
        .iter()
        .map(|f| f.name().clone())
        .collect();
    let reader = builder.build().context("building parquet reader")?;

    let mut values: Vec<Vec<CellValue>> = names.iter().map(|_| Vec::new()).collect();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        for (col_idx, column) in batch.columns().iter().enumerate() {
            let cells = arrow_column_cells(column)
                .with_context(|| format!("column '{}'", names[col_idx]))?;
            values[col_idx].extend(cells);
        }
    }

    Dataset::from_columns(
        names
            .into_iter()
            .zip(values)
            .map(|(name, cells)| Column::new(name, cells))
            .collect(),
    )
}

// -- Arrow helpers --

macro_rules! primitive_cells {
    ($col:expr, $ty:ty, $variant:expr) => {
        $col.as_primitive::<$ty>()
            .iter()
            .map(|v| v.map($variant).unwrap_or(CellValue::Null))
            .collect()
    };
}

/// Convert a whole Arrow column into cells.
fn arrow_column_cells(col: &ArrayRef) -> Result<Vec<CellValue>> {
    let cells = match col.data_type() {
        DataType::Utf8 => text_cells(col.as_string::<i32>().iter(), CellValue::Text),
        DataType::LargeUtf8 => text_cells(col.as_string::<i64>().iter(), CellValue::Text),
        DataType::Boolean => col
            .as_boolean()
            .iter()
            .map(|v| v.map(CellValue::Bool).unwrap_or(CellValue::Null))
            .collect(),
        DataType::Int8 => primitive_cells!(col, Int8Type, |v| CellValue::Integer(v as i64)),
        DataType::Int16 => primitive_cells!(col, Int16Type, |v| CellValue::Integer(v as i64)),
        DataType::Int32 => primitive_cells!(col, Int32Type, |v| CellValue::Integer(v as i64)),
        DataType::Int64 => primitive_cells!(col, Int64Type, CellValue::Integer),
        DataType::UInt8 => primitive_cells!(col, UInt8Type, |v| CellValue::Integer(v as i64)),
        DataType::UInt16 => primitive_cells!(col, UInt16Type, |v| CellValue::Integer(v as i64)),
        DataType::UInt32 => primitive_cells!(col, UInt32Type, |v| CellValue::Integer(v as i64)),
        DataType::UInt64 => primitive_cells!(col, UInt64Type, |v| CellValue::float(v as f64)),
        DataType::Float32 => primitive_cells!(col, Float32Type, |v| CellValue::float(v as f64)),
        DataType::Float64 => primitive_cells!(col, Float64Type, CellValue::float),
        DataType::Date32
        | DataType::Date64
        | DataType::Timestamp(_, _)
        | DataType::Time32(_)
        | DataType::Time64(_) => {
            let as_text = cast(col, &DataType::Utf8).context("casting temporal column to text")?;
            text_cells(as_text.as_string::<i32>().iter(), CellValue::Date)
        }
        DataType::List(_) | DataType::LargeList(_) | DataType::Struct(_) | DataType::Map(_, _) => {
            bail!("nested column type {:?} is not tabular", col.data_type())
        }
        other => {
            let as_text = cast(col, &DataType::Utf8)
                .with_context(|| format!("casting {other:?} column to text"))?;
            if as_text.null_count() == as_text.len() && col.null_count() != col.len() {
                bail!("column type {other:?} cannot be represented as text");
            }
            text_cells(as_text.as_string::<i32>().iter(), CellValue::Text)
        }
    };
    Ok(cells)
}

fn text_cells<'a>(
    iter: impl Iterator<Item = Option<&'a str>>,
    wrap: fn(String) -> CellValue,
) -> Vec<CellValue> {
    iter.map(|v| match v {
        Some(s) if !s.is_empty() => wrap(s.to_string()),
        _ => CellValue::Null,
    })
    .collect()
}
