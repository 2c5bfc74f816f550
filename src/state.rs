use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::color::ColorMap;
use crate::data::filter::Selection;
use crate::data::model::{CellValue, Dataset};
use crate::data::pipeline::{compute, DashboardRequest, DashboardView, ViewOptions};
use crate::data::schema::{GroupingRule, Schema};

// ---------------------------------------------------------------------------
// Session state
// ---------------------------------------------------------------------------

/// The state of one dashboard session, independent of rendering.
///
/// The dataset is shared read-only; everything else belongs to the session.
pub struct AppState {
    /// Loaded dataset (None until a file loads successfully).
    pub dataset: Option<Arc<Dataset>>,

    /// File the dataset came from.
    pub source: Option<PathBuf>,

    pub schema: Schema,

    /// Distinct grouping values, for the selection widgets.
    pub group_values: BTreeSet<CellValue>,

    /// Current user choices.
    pub request: DashboardRequest,

    /// Output of the last recomputation (cached until the request changes).
    pub view: Option<DashboardView>,

    /// Colour per grouping value.
    pub color_map: Option<ColorMap>,

    /// Fatal load failure; replaces the whole dashboard when set.
    pub load_error: Option<String>,

    pub grouping_rule: GroupingRule,
    pub options: ViewOptions,
    pub preview_rows: usize,
}

impl AppState {
    pub fn new(grouping_rule: GroupingRule, options: ViewOptions, preview_rows: usize) -> Self {
        Self {
            dataset: None,
            source: None,
            schema: Schema::default(),
            group_values: BTreeSet::new(),
            request: DashboardRequest::default(),
            view: None,
            color_map: None,
            load_error: None,
            grouping_rule,
            options,
            preview_rows,
        }
    }

    /// Ingest a newly loaded dataset: inspect it, reset the request, recompute.
    pub fn set_dataset(&mut self, dataset: Arc<Dataset>, source: PathBuf) {
        self.schema = Schema::inspect(&dataset, &self.grouping_rule);
        self.group_values = self
            .schema
            .grouping_column
            .as_deref()
            .map(|col| dataset.unique_values(col))
            .unwrap_or_default();
        self.color_map = self
            .schema
            .grouping_column
            .as_deref()
            .map(|col| ColorMap::new(col, &self.group_values));
        self.request = DashboardRequest::for_schema(&self.schema);

        self.dataset = Some(dataset);
        self.source = Some(source);
        self.load_error = None;
        self.refresh();
    }

    /// Record a fatal load failure. Any previous dataset is dropped so no
    /// stale dashboard is shown next to the error.
    pub fn set_load_error(&mut self, message: String) {
        self.dataset = None;
        self.view = None;
        self.load_error = Some(message);
    }

    /// Recompute the view for the current request.
    pub fn refresh(&mut self) {
        self.view = self
            .dataset
            .as_ref()
            .map(|ds| compute(ds, &self.schema, &self.request, &self.options));
    }

    /// Replace the request, recomputing only when it changed.
    pub fn update_request(&mut self, request: DashboardRequest) {
        if request != self.request {
            self.request = request;
            self.refresh();
        }
    }

    pub fn is_selected(&self, value: &CellValue) -> bool {
        match &self.request.selection {
            Selection::All => true,
            Selection::Only(set) => set.contains(value),
        }
    }

    /// Toggle a single grouping value.
    pub fn toggle_group(&mut self, value: &CellValue) {
        let mut selected = match &self.request.selection {
            Selection::All => self.group_values.clone(),
            Selection::Only(set) => set.clone(),
        };
        if !selected.remove(value) {
            selected.insert(value.clone());
        }
        let selection = if selected.len() == self.group_values.len() {
            Selection::All
        } else {
            Selection::Only(selected)
        };
        let mut request = self.request.clone();
        request.selection = selection;
        self.update_request(request);
    }

    /// Select every grouping value.
    pub fn select_all(&mut self) {
        let mut request = self.request.clone();
        request.selection = Selection::All;
        self.update_request(request);
    }

    /// Untick every grouping value. An empty selection filters nothing.
    pub fn clear_selection(&mut self) {
        let mut request = self.request.clone();
        request.selection = Selection::Only(BTreeSet::new());
        self.update_request(request);
    }

    /// Number of grouping values currently ticked.
    pub fn selected_count(&self) -> usize {
        match &self.request.selection {
            Selection::All => self.group_values.len(),
            Selection::Only(set) => set.len(),
        }
    }
}
