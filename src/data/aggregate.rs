use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::filter::FilteredView;
use super::model::CellValue;

// ---------------------------------------------------------------------------
// Stat – a statistic that may be mathematically undefined
// ---------------------------------------------------------------------------

/// Result of a statistic. `Undefined` covers empty groups, zero-variance
/// columns and too few observations; it is never coerced to a number.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Stat {
    Value(f64),
    #[default]
    Undefined,
}

impl Stat {
    /// Wrap a raw float, treating NaN and infinities as undefined.
    pub fn from_f64(v: f64) -> Self {
        if v.is_finite() {
            Stat::Value(v)
        } else {
            Stat::Undefined
        }
    }

    pub fn value(self) -> Option<f64> {
        match self {
            Stat::Value(v) => Some(v),
            Stat::Undefined => None,
        }
    }

    pub fn is_defined(self) -> bool {
        matches!(self, Stat::Value(_))
    }
}

impl fmt::Display for Stat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stat::Value(v) => write!(f, "{v:.3}"),
            Stat::Undefined => write!(f, "n/a"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Ascending,
    #[default]
    Descending,
}

/// Compare two stats so that undefined values sort last in either order.
fn compare_stats(a: Stat, b: Stat, order: SortOrder) -> Ordering {
    match (a.value(), b.value()) {
        (Some(x), Some(y)) => match order {
            SortOrder::Ascending => x.total_cmp(&y),
            SortOrder::Descending => y.total_cmp(&x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// Group means and ranking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GroupMean {
    pub group: CellValue,
    pub mean: Stat,
    /// Non-null metric values that went into the mean.
    pub count: usize,
}

/// Mean of one metric per distinct grouping value.
#[derive(Debug, Clone, PartialEq)]
pub struct GroupMeans {
    pub group_column: String,
    pub metric: String,
    pub groups: Vec<GroupMean>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RankedGroup {
    pub rank: usize,
    pub group: CellValue,
    pub mean: Stat,
}

/// Mean of `metric` per distinct non-null value of `group_column`.
///
/// Groups come out in key order. Null metric cells are skipped; a group
/// with no numeric values gets an undefined mean.
pub fn group_means(view: &FilteredView<'_>, group_column: &str, metric: &str) -> GroupMeans {
    let dataset = view.dataset();
    let mut acc: BTreeMap<&CellValue, (f64, usize)> = BTreeMap::new();

    if let (Some(groups), Some(values)) = (dataset.column(group_column), dataset.column(metric)) {
        for &row in view.rows() {
            let key = &groups.values[row];
            if key.is_null() {
                continue;
            }
            let entry = acc.entry(key).or_insert((0.0, 0));
            if let Some(v) = values.number(row) {
                entry.0 += v;
                entry.1 += 1;
            }
        }
    }

    let groups = acc
        .into_iter()
        .map(|(group, (sum, count))| GroupMean {
            group: group.clone(),
            mean: if count == 0 {
                Stat::Undefined
            } else {
                Stat::from_f64(sum / count as f64)
            },
            count,
        })
        .collect();

    GroupMeans {
        group_column: group_column.to_string(),
        metric: metric.to_string(),
        groups,
    }
}

impl GroupMeans {
    /// Stable sort by mean; undefined means go last.
    pub fn sorted(mut self, order: SortOrder) -> Self {
        self.groups
            .sort_by(|a, b| compare_stats(a.mean, b.mean, order));
        self
    }

    /// Sort descending and assign ranks 1..N.
    pub fn ranked(self) -> Vec<RankedGroup> {
        rank(&self.sorted(SortOrder::Descending).groups)
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }
}

/// Assign ranks 1..N in the given order. Ties keep distinct ranks.
pub fn rank(sorted: &[GroupMean]) -> Vec<RankedGroup> {
    sorted
        .iter()
        .enumerate()
        .map(|(i, g)| RankedGroup {
            rank: i + 1,
            group: g.group.clone(),
            mean: g.mean,
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Correlation matrix
// ---------------------------------------------------------------------------

/// Square matrix of pairwise-complete Pearson correlations.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    pub cells: Vec<Vec<Stat>>,
    /// Rows where both columns of the pair are non-null.
    pub sample_sizes: Vec<Vec<usize>>,
}

impl CorrelationMatrix {
    pub fn get(&self, i: usize, j: usize) -> Stat {
        self.cells
            .get(i)
            .and_then(|row| row.get(j))
            .copied()
            .unwrap_or(Stat::Undefined)
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Pearson correlation for every pair of `columns` over the view's rows.
///
/// Each pair only uses rows where both columns are non-null. A pair with
/// fewer than two such rows, or where either side is constant, is undefined;
/// that includes the diagonal of a constant column.
pub fn correlation_matrix(view: &FilteredView<'_>, columns: &[String]) -> CorrelationMatrix {
    let n = columns.len();
    let mut cells = vec![vec![Stat::Undefined; n]; n];
    let mut sample_sizes = vec![vec![0usize; n]; n];
    let dataset = view.dataset();

    for i in 0..n {
        for j in i..n {
            let (Some(a), Some(b)) = (dataset.column(&columns[i]), dataset.column(&columns[j]))
            else {
                continue;
            };
            let (xs, ys): (Vec<f64>, Vec<f64>) = view
                .rows()
                .iter()
                .filter_map(|&r| Some((a.number(r)?, b.number(r)?)))
                .unzip();

            let r = if i == j {
                if is_constant(&xs) {
                    Stat::Undefined
                } else {
                    Stat::Value(1.0)
                }
            } else {
                pearson(&xs, &ys)
            };
            cells[i][j] = r;
            cells[j][i] = r;
            sample_sizes[i][j] = xs.len();
            sample_sizes[j][i] = xs.len();
        }
    }

    CorrelationMatrix {
        columns: columns.to_vec(),
        cells,
        sample_sizes,
    }
}

/// True for fewer than two values or when all values are equal.
fn is_constant(values: &[f64]) -> bool {
    match values.first() {
        Some(first) => values.len() < 2 || values.iter().all(|v| v == first),
        None => true,
    }
}

fn pearson(xs: &[f64], ys: &[f64]) -> Stat {
    if xs.len() != ys.len() || is_constant(xs) || is_constant(ys) {
        return Stat::Undefined;
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut cov = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    let denom = (var_x * var_y).sqrt();
    if denom == 0.0 {
        return Stat::Undefined;
    }
    Stat::from_f64((cov / denom).clamp(-1.0, 1.0))
}
