use std::collections::BTreeSet;

use super::model::{CellValue, Dataset};

// ---------------------------------------------------------------------------
// Selection: which grouping values the user picked
// ---------------------------------------------------------------------------

/// Selected grouping-column values.
///
/// `All` and an empty `Only` set both mean "no filter", so the first render
/// always shows data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Selection {
    #[default]
    All,
    Only(BTreeSet<CellValue>),
}

impl Selection {
    /// Whether this selection leaves the dataset unchanged.
    pub fn is_identity(&self) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.is_empty(),
        }
    }

    pub fn contains(&self, value: &CellValue) -> bool {
        match self {
            Selection::All => true,
            Selection::Only(set) => set.is_empty() || set.contains(value),
        }
    }
}

// ---------------------------------------------------------------------------
// FilteredView: a row subset of a dataset
// ---------------------------------------------------------------------------

/// Read-only row subset of a [`Dataset`]. Holds row indices into the source
/// table, which is never modified.
#[derive(Debug, Clone)]
pub struct FilteredView<'a> {
    dataset: &'a Dataset,
    rows: Vec<usize>,
}

impl<'a> FilteredView<'a> {
    /// View over every row.
    pub fn all(dataset: &'a Dataset) -> Self {
        Self {
            dataset,
            rows: (0..dataset.len()).collect(),
        }
    }

    /// View over the first `n` rows of the dataset.
    pub fn first(dataset: &'a Dataset, n: usize) -> Self {
        Self {
            dataset,
            rows: (0..n.min(dataset.len())).collect(),
        }
    }

    /// View over the given rows. Out-of-range indices are dropped.
    pub fn from_rows(dataset: &'a Dataset, rows: Vec<usize>) -> Self {
        let n = dataset.len();
        Self {
            dataset,
            rows: rows.into_iter().filter(|&r| r < n).collect(),
        }
    }

    pub fn dataset(&self) -> &'a Dataset {
        self.dataset
    }

    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<usize> {
        self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cells of `column` for the rows in this view; empty for unknown columns.
    pub fn values(&self, column: &str) -> Vec<&'a CellValue> {
        let dataset = self.dataset;
        match dataset.column(column) {
            Some(col) => self.rows.iter().map(|&r| &col.values[r]).collect(),
            None => Vec::new(),
        }
    }

    /// Non-null numeric values of `column`, ready for a histogram.
    pub fn numeric_values(&self, column: &str) -> Vec<f64> {
        match self.dataset.column(column) {
            Some(col) => self.rows.iter().filter_map(|&r| col.number(r)).collect(),
            None => Vec::new(),
        }
    }

    /// `(x, y)` pairs for rows where both columns are non-null.
    pub fn paired_values(&self, x: &str, y: &str) -> Vec<[f64; 2]> {
        let (Some(xc), Some(yc)) = (self.dataset.column(x), self.dataset.column(y)) else {
            return Vec::new();
        };
        self.rows
            .iter()
            .filter_map(|&r| Some([xc.number(r)?, yc.number(r)?]))
            .collect()
    }

    /// Rows where any cell's text contains `term`, ignoring case.
    /// An empty term returns the view unchanged.
    pub fn search(&self, term: &str) -> FilteredView<'a> {
        let needle = term.to_lowercase();
        if needle.is_empty() {
            return self.clone();
        }
        let columns = self.dataset.columns();
        let rows = self
            .rows
            .iter()
            .copied()
            .filter(|&r| {
                columns
                    .iter()
                    .any(|c| c.values[r].to_string().to_lowercase().contains(&needle))
            })
            .collect();
        Self {
            dataset: self.dataset,
            rows,
        }
    }
}

// ---------------------------------------------------------------------------
// Filter engine
// ---------------------------------------------------------------------------

/// Apply a grouping selection to `dataset`.
///
/// * No grouping column, or an identity selection → every row.
/// * Otherwise → rows whose grouping value is selected. Rows with a null
///   grouping value never pass a grouped filter.
pub fn apply_filter<'a>(
    dataset: &'a Dataset,
    grouping_column: Option<&str>,
    selection: &Selection,
) -> FilteredView<'a> {
    let Some(name) = grouping_column else {
        return FilteredView::all(dataset);
    };
    if selection.is_identity() {
        return FilteredView::all(dataset);
    }
    let Some(col) = dataset.column(name) else {
        log::warn!("Grouping column '{name}' is not in the dataset; not filtering");
        return FilteredView::all(dataset);
    };

    let rows = col
        .values
        .iter()
        .enumerate()
        .filter(|(_, v)| !v.is_null() && selection.contains(v))
        .map(|(i, _)| i)
        .collect();

    FilteredView { dataset, rows }
}
