use std::collections::BTreeSet;

use super::aggregate::Stat;
use super::filter::FilteredView;

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

pub const SUMMARY_LABELS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

/// One row of the summary table: a statistic across all numeric columns.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryRow {
    pub label: &'static str,
    pub values: Vec<Stat>,
}

/// Summary statistics, one row per statistic and one column per numeric column.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Summary {
    pub columns: Vec<String>,
    pub rows: Vec<SummaryRow>,
}

impl Summary {
    pub fn row(&self, label: &str) -> Option<&SummaryRow> {
        self.rows.iter().find(|r| r.label == label)
    }

    /// Value of statistic `label` for `column`.
    pub fn get(&self, label: &str, column: &str) -> Stat {
        let Some(idx) = self.columns.iter().position(|c| c == column) else {
            return Stat::Undefined;
        };
        self.row(label)
            .and_then(|r| r.values.get(idx).copied())
            .unwrap_or(Stat::Undefined)
    }
}

/// Count, mean, sample std, min, quartiles and max of each column.
pub fn describe(view: &FilteredView<'_>, columns: &[String]) -> Summary {
    let per_column: Vec<[Stat; 8]> = columns
        .iter()
        .map(|c| column_summary(view.numeric_values(c)))
        .collect();

    let rows = SUMMARY_LABELS
        .iter()
        .enumerate()
        .map(|(i, &label)| SummaryRow {
            label,
            values: per_column.iter().map(|s| s[i]).collect(),
        })
        .collect();

    Summary {
        columns: columns.to_vec(),
        rows,
    }
}

fn column_summary(mut values: Vec<f64>) -> [Stat; 8] {
    let n = values.len();
    let count = Stat::Value(n as f64);
    if n == 0 {
        return [
            count,
            Stat::Undefined,
            Stat::Undefined,
            Stat::Undefined,
            Stat::Undefined,
            Stat::Undefined,
            Stat::Undefined,
            Stat::Undefined,
        ];
    }

    values.sort_by(|a, b| a.total_cmp(b));
    let mean = values.iter().sum::<f64>() / n as f64;
    let std = if n < 2 {
        Stat::Undefined
    } else {
        let ss: f64 = values.iter().map(|v| (v - mean).powi(2)).sum();
        Stat::from_f64((ss / (n - 1) as f64).sqrt())
    };

    [
        count,
        Stat::from_f64(mean),
        std,
        Stat::Value(values[0]),
        Stat::from_f64(quantile(&values, 0.25)),
        Stat::from_f64(quantile(&values, 0.50)),
        Stat::from_f64(quantile(&values, 0.75)),
        Stat::Value(values[n - 1]),
    ]
}

/// Linear-interpolated quantile of sorted, non-empty values.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Equal-width bins; `edges` has one more entry than `counts`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Histogram {
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn bin_width(&self) -> f64 {
        match self.edges.as_slice() {
            [a, b, ..] => b - a,
            _ => 0.0,
        }
    }

    /// Centre of each bin, paired with its count.
    pub fn bars(&self) -> impl Iterator<Item = (f64, usize)> + '_ {
        self.edges
            .windows(2)
            .zip(&self.counts)
            .map(|(w, &c)| ((w[0] + w[1]) / 2.0, c))
    }
}

/// Bin `values` into `bins` equal-width buckets over [min, max]; the last
/// bucket includes `max`. A single distinct value is centred in [v-0.5, v+0.5].
pub fn histogram(values: &[f64], bins: usize) -> Histogram {
    if values.is_empty() || bins == 0 {
        return Histogram::default();
    }
    let mut min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let mut max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if min == max {
        min -= 0.5;
        max += 0.5;
    }
    let width = (max - min) / bins as f64;
    let edges: Vec<f64> = (0..=bins).map(|i| min + width * i as f64).collect();

    let mut counts = vec![0usize; bins];
    for &v in values {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }
    Histogram { edges, counts }
}

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Kpis {
    pub rows: usize,
    /// Distinct non-null grouping values present in the view.
    pub groups: usize,
    pub numeric_columns: usize,
    pub total_columns: usize,
}

pub fn kpis(view: &FilteredView<'_>, grouping_column: Option<&str>, numeric_columns: usize) -> Kpis {
    let groups = grouping_column
        .map(|g| {
            view.values(g)
                .into_iter()
                .filter(|v| !v.is_null())
                .collect::<BTreeSet<_>>()
                .len()
        })
        .unwrap_or(0);
    Kpis {
        rows: view.len(),
        groups,
        numeric_columns,
        total_columns: view.dataset().n_columns(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{CellValue, Column, Dataset};

    fn floats(values: &[Option<f64>]) -> Vec<CellValue> {
        values
            .iter()
            .map(|v| v.map(CellValue::Float).unwrap_or(CellValue::Null))
            .collect()
    }

    #[test]
    fn describe_matches_standard_summary() {
        let ds = Dataset::from_columns(vec![Column::new(
            "v",
            floats(&[Some(1.0), Some(2.0), Some(3.0), Some(4.0), None]),
        )])
        .unwrap();
        let summary = describe(&FilteredView::all(&ds), &["v".to_string()]);
        assert_eq!(summary.get("count", "v"), Stat::Value(4.0));
        assert_eq!(summary.get("mean", "v"), Stat::Value(2.5));
        assert_eq!(summary.get("min", "v"), Stat::Value(1.0));
        assert_eq!(summary.get("25%", "v"), Stat::Value(1.75));
        assert_eq!(summary.get("50%", "v"), Stat::Value(2.5));
        assert_eq!(summary.get("75%", "v"), Stat::Value(3.25));
        assert_eq!(summary.get("max", "v"), Stat::Value(4.0));
        let std = summary.get("std", "v").value().unwrap();
        assert!((std - 1.2909944487358056).abs() < 1e-12);
    }

    #[test]
    fn describe_empty_and_single_values() {
        let ds = Dataset::from_columns(vec![Column::new("v", floats(&[Some(5.0)]))]).unwrap();
        let cols = vec!["v".to_string()];

        let single = describe(&FilteredView::all(&ds), &cols);
        assert_eq!(single.get("std", "v"), Stat::Undefined);
        assert_eq!(single.get("50%", "v"), Stat::Value(5.0));

        let empty = describe(&FilteredView::from_rows(&ds, vec![]), &cols);
        assert_eq!(empty.get("count", "v"), Stat::Value(0.0));
        assert_eq!(empty.get("mean", "v"), Stat::Undefined);
        assert_eq!(empty.rows.len(), SUMMARY_LABELS.len());
    }

    #[test]
    fn histogram_bins_cover_range() {
        let h = histogram(&[0.0, 1.0, 2.0, 3.0, 4.0, 10.0], 5);
        assert_eq!(h.edges.len(), 6);
        assert_eq!(h.counts, vec![2, 2, 1, 0, 1]);
        assert_eq!(h.counts.iter().sum::<usize>(), 6);
        assert!((h.bin_width() - 2.0).abs() < 1e-12);
    }

    #[test]
    fn histogram_of_constant_values() {
        let h = histogram(&[3.0, 3.0], 10);
        assert_eq!(h.edges[0], 2.5);
        assert_eq!(*h.edges.last().unwrap(), 3.5);
        assert_eq!(h.counts.iter().sum::<usize>(), 2);
        assert!(histogram(&[], 10).is_empty());
    }

    #[test]
    fn kpis_count_groups_in_view() {
        let ds = Dataset::from_columns(vec![
            Column::new(
                "State",
                vec![
                    CellValue::Text("A".into()),
                    CellValue::Text("A".into()),
                    CellValue::Null,
                ],
            ),
            Column::new("v", floats(&[Some(1.0), Some(2.0), Some(3.0)])),
        ])
        .unwrap();
        let k = kpis(&FilteredView::all(&ds), Some("State"), 1);
        assert_eq!(
            k,
            Kpis {
                rows: 3,
                groups: 1,
                numeric_columns: 1,
                total_columns: 2
            }
        );
        assert_eq!(kpis(&FilteredView::all(&ds), None, 1).groups, 0);
    }
}
