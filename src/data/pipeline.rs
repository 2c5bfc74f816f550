use serde::{Deserialize, Serialize};

use super::aggregate::{
    correlation_matrix, group_means, CorrelationMatrix, GroupMeans, RankedGroup, SortOrder,
};
use super::describe::{describe, histogram, kpis, Histogram, Kpis, Summary};
use super::filter::{apply_filter, FilteredView, Selection};
use super::model::Dataset;
use super::schema::Schema;

// ---------------------------------------------------------------------------
// Request / options / notices
// ---------------------------------------------------------------------------

/// Everything a user can choose in one session.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardRequest {
    pub selection: Selection,
    pub primary_metric: Option<String>,
    pub secondary_metric: Option<String>,
    pub ranking_metric: Option<String>,
    pub search: String,
}

impl DashboardRequest {
    /// Default metric choices: first, second and first numeric column.
    pub fn for_schema(schema: &Schema) -> Self {
        let first = schema.numeric_columns.first().cloned();
        Self {
            selection: Selection::All,
            primary_metric: first.clone(),
            secondary_metric: schema.numeric_columns.get(1).cloned().or_else(|| first.clone()),
            ranking_metric: first,
            search: String::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewOptions {
    pub histogram_bins: usize,
    /// Order of the grouped-mean bar chart.
    pub bar_order: SortOrder,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            histogram_bins: 10,
            bar_order: SortOrder::Descending,
        }
    }
}

/// Recoverable conditions the presentation should tell the user about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// No grouping column: grouping views are unavailable and the filter is a no-op.
    NoGroupingColumn,
    /// The selection matched zero rows.
    EmptySelection,
    /// A requested metric is not one of the numeric columns.
    UnknownMetric(String),
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Notice::NoGroupingColumn => {
                write!(f, "No grouping column detected; showing the full dataset")
            }
            Notice::EmptySelection => write!(f, "No rows match the current selection"),
            Notice::UnknownMetric(m) => write!(f, "'{m}' is not a numeric column"),
        }
    }
}

// ---------------------------------------------------------------------------
// DashboardView – owned output of one recomputation pass
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Default)]
pub struct DashboardView {
    /// Rows of the filtered view, as indices into the dataset.
    pub filtered_rows: Vec<usize>,
    /// Rows of the filtered view matching the search term.
    pub search_rows: Vec<usize>,
    pub summary: Summary,
    /// Distribution of the primary metric.
    pub histogram: Option<Histogram>,
    /// Primary metric averaged per group, in the configured bar order.
    pub group_means: Option<GroupMeans>,
    pub ranking: Option<Vec<RankedGroup>>,
    /// `[primary, secondary]` pairs.
    pub scatter: Option<Vec<[f64; 2]>>,
    pub correlation: Option<CorrelationMatrix>,
    pub kpis: Kpis,
    pub notices: Vec<Notice>,
}

impl DashboardView {
    pub fn filtered<'a>(&self, dataset: &'a Dataset) -> FilteredView<'a> {
        FilteredView::from_rows(dataset, self.filtered_rows.clone())
    }

    pub fn searched<'a>(&self, dataset: &'a Dataset) -> FilteredView<'a> {
        FilteredView::from_rows(dataset, self.search_rows.clone())
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_rows.is_empty()
    }
}

// ---------------------------------------------------------------------------
// The pipeline
// ---------------------------------------------------------------------------

/// Run filter → aggregations for one request. Pure: the dataset is only read.
pub fn compute(
    dataset: &Dataset,
    schema: &Schema,
    request: &DashboardRequest,
    options: &ViewOptions,
) -> DashboardView {
    let mut notices = Vec::new();
    let grouping = schema.grouping_column.as_deref();
    if grouping.is_none() {
        notices.push(Notice::NoGroupingColumn);
    }

    let mut metric = |m: &Option<String>| -> Option<String> {
        let name = m.as_ref()?;
        if schema.is_numeric(name) {
            Some(name.clone())
        } else {
            notices.push(Notice::UnknownMetric(name.clone()));
            None
        }
    };
    let primary = metric(&request.primary_metric);
    let secondary = metric(&request.secondary_metric);
    let ranking_metric = metric(&request.ranking_metric);

    let view = apply_filter(dataset, grouping, &request.selection);
    if view.is_empty() {
        notices.push(Notice::EmptySelection);
    }

    let summary = describe(&view, &schema.numeric_columns);
    let histogram = primary
        .as_deref()
        .map(|m| histogram(&view.numeric_values(m), options.histogram_bins));
    let group_means = match (grouping, primary.as_deref()) {
        (Some(g), Some(m)) => Some(group_means(&view, g, m).sorted(options.bar_order)),
        _ => None,
    };
    let ranking = match (grouping, ranking_metric.as_deref()) {
        (Some(g), Some(m)) => Some(super::aggregate::group_means(&view, g, m).ranked()),
        _ => None,
    };
    let scatter = match (primary.as_deref(), secondary.as_deref()) {
        (Some(x), Some(y)) => Some(view.paired_values(x, y)),
        _ => None,
    };
    let correlation = if schema.numeric_columns.is_empty() {
        None
    } else {
        Some(correlation_matrix(&view, &schema.numeric_columns))
    };
    let kpis = kpis(&view, grouping, schema.numeric_columns.len());
    let search_rows = view.search(&request.search).into_rows();

    log::debug!(
        "Recomputed dashboard: {} of {} rows, {} search hits",
        view.len(),
        dataset.len(),
        search_rows.len()
    );

    DashboardView {
        filtered_rows: view.into_rows(),
        search_rows,
        summary,
        histogram,
        group_means,
        ranking,
        scatter,
        correlation,
        kpis,
        notices,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::aggregate::Stat;
    use crate::data::model::{CellValue, Column};
    use crate::data::schema::GroupingRule;

    fn text(s: &str) -> CellValue {
        CellValue::Text(s.to_string())
    }

    fn scenario() -> Dataset {
        Dataset::from_columns(vec![
            Column::new("State", vec![text("X"), text("X"), text("Y")]),
            Column::new(
                "IndicatorA",
                vec![
                    CellValue::Integer(10),
                    CellValue::Integer(30),
                    CellValue::Integer(20),
                ],
            ),
            Column::new(
                "IndicatorB",
                vec![
                    CellValue::Integer(1),
                    CellValue::Integer(2),
                    CellValue::Integer(3),
                ],
            ),
        ])
        .unwrap()
    }

    #[test]
    fn default_request_computes_every_view() {
        let ds = scenario();
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        let request = DashboardRequest::for_schema(&schema);
        assert_eq!(request.primary_metric.as_deref(), Some("IndicatorA"));
        assert_eq!(request.secondary_metric.as_deref(), Some("IndicatorB"));

        let view = compute(&ds, &schema, &request, &ViewOptions::default());
        assert!(view.notices.is_empty());
        assert_eq!(view.filtered_rows, vec![0, 1, 2]);
        assert_eq!(view.search_rows, vec![0, 1, 2]);
        assert_eq!(view.kpis.groups, 2);
        assert_eq!(view.kpis.total_columns, 3);
        assert_eq!(view.scatter.as_ref().map(Vec::len), Some(3));
        let ranking = view.ranking.unwrap();
        assert_eq!(ranking.iter().map(|r| r.rank).collect::<Vec<_>>(), vec![1, 2]);
        assert_eq!(view.histogram.unwrap().counts.iter().sum::<usize>(), 3);
    }

    #[test]
    fn selection_and_search_narrow_the_view() {
        let ds = scenario();
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        let mut request = DashboardRequest::for_schema(&schema);
        request.selection = Selection::Only([text("X")].into_iter().collect());
        request.search = "30".into();

        let view = compute(&ds, &schema, &request, &ViewOptions::default());
        assert_eq!(view.filtered_rows, vec![0, 1]);
        assert_eq!(view.search_rows, vec![1]);
        let means = view.group_means.unwrap();
        assert_eq!(means.groups.len(), 1);
        assert_eq!(means.groups[0].mean, Stat::Value(20.0));
        assert_eq!(view.kpis.groups, 1);
    }

    #[test]
    fn empty_selection_is_reported_not_an_error() {
        let ds = scenario();
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        let mut request = DashboardRequest::for_schema(&schema);
        request.selection = Selection::Only([text("Nowhere")].into_iter().collect());

        let view = compute(&ds, &schema, &request, &ViewOptions::default());
        assert!(view.is_empty());
        assert!(view.notices.contains(&Notice::EmptySelection));
        assert!(view.group_means.unwrap().is_empty());
        assert_eq!(view.summary.get("mean", "IndicatorA"), Stat::Undefined);
    }

    #[test]
    fn missing_grouping_column_degrades_gracefully() {
        let ds = scenario();
        let rule = GroupingRule {
            column: None,
            hint: "district".into(),
        };
        let schema = Schema::inspect(&ds, &rule);
        let mut request = DashboardRequest::for_schema(&schema);
        request.selection = Selection::Only([text("X")].into_iter().collect());

        let view = compute(&ds, &schema, &request, &ViewOptions::default());
        assert!(view.notices.contains(&Notice::NoGroupingColumn));
        assert_eq!(view.filtered_rows.len(), 3);
        assert!(view.group_means.is_none());
        assert!(view.ranking.is_none());
        assert!(view.histogram.is_some());
    }

    #[test]
    fn unknown_metric_is_ignored() {
        let ds = scenario();
        let schema = Schema::inspect(&ds, &GroupingRule::default());
        let mut request = DashboardRequest::for_schema(&schema);
        request.primary_metric = Some("State".into());

        let view = compute(&ds, &schema, &request, &ViewOptions::default());
        assert!(view
            .notices
            .contains(&Notice::UnknownMetric("State".into())));
        assert!(view.histogram.is_none());
        assert!(view.scatter.is_none());
        assert!(view.ranking.is_some());
    }
}
