use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use anyhow::{bail, Result};

// ---------------------------------------------------------------------------
// CellValue – a single cell of the table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value covering what spreadsheets and CSV files hold.
/// Grouping values live in `BTreeSet`s downstream, so `CellValue` must be `Ord`.
#[derive(Debug, Clone)]
pub enum CellValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
    /// Dates and timestamps are kept as their textual rendering.
    Date(String),
    Null,
}

/// Equality follows `Ord` so that `Eq`, `Ord` and `Hash` agree.
impl PartialEq for CellValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == std::cmp::Ordering::Equal
    }
}

impl Eq for CellValue {}

impl PartialOrd for CellValue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for CellValue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use CellValue::*;
        fn discriminant(v: &CellValue) -> u8 {
            match v {
                Null => 0,
                Bool(_) => 1,
                Integer(_) => 2,
                Float(_) => 3,
                Text(_) => 4,
                Date(_) => 5,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Null, Null) => std::cmp::Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Text(a), Text(b)) | (Date(a), Date(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl std::hash::Hash for CellValue {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            CellValue::Text(s) | CellValue::Date(s) => s.hash(state),
            CellValue::Integer(i) => i.hash(state),
            CellValue::Float(f) => f.to_bits().hash(state),
            CellValue::Bool(b) => b.hash(state),
            CellValue::Null => {}
        }
    }
}

/// Nulls render as the empty string; whole floats keep one decimal (`10.0`).
impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) if v.is_finite() && v.fract() == 0.0 => write!(f, "{v:.1}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Date(d) => write!(f, "{d}"),
            CellValue::Null => Ok(()),
        }
    }
}

impl CellValue {
    /// Build a float cell, mapping NaN to `Null` and `-0.0` to `0.0`.
    pub fn float(v: f64) -> Self {
        if v.is_nan() {
            CellValue::Null
        } else if v == 0.0 {
            CellValue::Float(0.0)
        } else {
            CellValue::Float(v)
        }
    }

    /// Interpret the value as an `f64` if it is numeric.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }

    fn is_numeric(&self) -> bool {
        matches!(self, CellValue::Integer(_) | CellValue::Float(_))
    }
}

// ---------------------------------------------------------------------------
// Column
// ---------------------------------------------------------------------------

/// Inferred type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// Every non-null cell is an integer or a float (and at least one exists).
    Numeric,
    /// Anything else: text, booleans, dates, mixed or all-null columns.
    Categorical,
}

#[derive(Debug, Clone)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<CellValue>,
}

impl Column {
    pub fn new(name: impl Into<String>, values: Vec<CellValue>) -> Self {
        let values: Vec<CellValue> = values
            .into_iter()
            .map(|v| match v {
                CellValue::Float(f) => CellValue::float(f),
                other => other,
            })
            .collect();
        let kind = infer_kind(&values);
        Column {
            name: name.into(),
            kind,
            values,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.kind == ColumnKind::Numeric
    }

    /// Numeric value at `row`, `None` for nulls and non-numeric cells.
    pub fn number(&self, row: usize) -> Option<f64> {
        self.values.get(row).and_then(CellValue::as_f64)
    }
}

fn infer_kind(values: &[CellValue]) -> ColumnKind {
    let mut seen_number = false;
    for v in values {
        if v.is_null() {
            continue;
        }
        if !v.is_numeric() {
            return ColumnKind::Categorical;
        }
        seen_number = true;
    }
    if seen_number {
        ColumnKind::Numeric
    } else {
        ColumnKind::Categorical
    }
}

// ---------------------------------------------------------------------------
// Dataset – the complete loaded table
// ---------------------------------------------------------------------------

/// The full parsed table, column-oriented and immutable once built.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    columns: Vec<Column>,
    n_rows: usize,
}

impl Dataset {
    /// Build a dataset from already-typed columns of equal length.
    pub fn from_columns(columns: Vec<Column>) -> Result<Self> {
        let n_rows = columns.first().map(|c| c.values.len()).unwrap_or(0);
        for col in &columns {
            if col.values.len() != n_rows {
                bail!(
                    "column '{}' has {} values but expected {n_rows}",
                    col.name,
                    col.values.len()
                );
            }
        }
        Ok(Dataset { columns, n_rows })
    }

    /// Build a dataset from a header row and row-oriented records.
    ///
    /// Headers are normalised: empty names become `column_<n>` and repeated
    /// names get a `.1`, `.2`, ... suffix. Short rows are padded with nulls,
    /// cells beyond the header are dropped.
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<CellValue>>) -> Result<Self> {
        let names = normalize_headers(headers);
        let mut columns: Vec<Vec<CellValue>> = names
            .iter()
            .map(|_| Vec::with_capacity(rows.len()))
            .collect();

        for row in rows {
            let mut cells = row.into_iter();
            for col in columns.iter_mut() {
                col.push(cells.next().unwrap_or(CellValue::Null));
            }
        }

        Self::from_columns(
            names
                .into_iter()
                .zip(columns)
                .map(|(name, values)| Column::new(name, values))
                .collect(),
        )
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.n_rows
    }

    /// Whether the dataset has no rows.
    pub fn is_empty(&self) -> bool {
        self.n_rows == 0
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    /// Sorted set of distinct non-null values of a column.
    pub fn unique_values(&self, column: &str) -> BTreeSet<CellValue> {
        self.column(column)
            .map(|c| c.values.iter().filter(|v| !v.is_null()).cloned().collect())
            .unwrap_or_default()
    }
}

fn normalize_headers(headers: Vec<String>) -> Vec<String> {
    let originals: HashSet<String> = headers.iter().cloned().collect();
    let mut seen: HashSet<String> = HashSet::new();
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    headers
        .into_iter()
        .enumerate()
        .map(|(i, h)| {
            let base = if h.trim().is_empty() {
                format!("column_{}", i + 1)
            } else {
                h
            };
            let name = if seen.contains(&base) {
                // Generated names must not shadow a real header anywhere in the row.
                let k = next_suffix.entry(base.clone()).or_insert(1);
                let mut candidate = format!("{base}.{k}");
                while seen.contains(&candidate) || originals.contains(&candidate) {
                    *k += 1;
                    candidate = format!("{base}.{k}");
                }
                *k += 1;
                candidate
            } else {
                base
            };
            seen.insert(name.clone());
            name
        })
        .collect()
}
