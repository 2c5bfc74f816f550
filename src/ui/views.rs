use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::describe::Kpis;
use crate::data::filter::FilteredView;
use crate::data::model::Dataset;
use crate::data::pipeline::{DashboardView, Notice};
use crate::state::AppState;
use crate::ui::{plot, tables};

// ---------------------------------------------------------------------------
// Central dashboard
// ---------------------------------------------------------------------------

/// Full-screen message shown instead of the dashboard when loading failed.
pub fn load_error(ui: &mut Ui, message: &str) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.vertical_centered(|ui: &mut Ui| {
            ui.heading(RichText::new("Could not load the dataset").color(Color32::RED));
            ui.label(message);
            ui.label("Open another file with File → Open…");
        });
    });
}

pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let mut search_edit = None;
    {
        let state: &AppState = state;
        let (Some(dataset), Some(view)) = (state.dataset.as_deref(), state.view.as_ref()) else {
            ui.centered_and_justified(|ui: &mut Ui| {
                ui.heading("Open a file to explore it  (File → Open…)");
            });
            return;
        };

        ScrollArea::vertical()
            .auto_shrink([false, false])
            .show(ui, |ui: &mut Ui| {
                ui.heading("Health Survey Dashboard");
                notices(ui, &view.notices);
                kpi_row(ui, &view.kpis);
                ui.separator();

                ui.strong("Raw dataset preview");
                tables::rows_table(
                    ui,
                    "preview",
                    &FilteredView::first(dataset, state.preview_rows),
                    ROW_TABLE_SMALL,
                );
                ui.separator();

                let filtered = view.filtered(dataset);
                ui.columns(2, |cols| {
                    cols[0].strong("Filtered data");
                    if filtered.is_empty() {
                        empty_state(&mut cols[0]);
                    } else {
                        tables::rows_table(&mut cols[0], "filtered", &filtered, ROW_TABLE_LARGE);
                    }

                    cols[1].strong("Distribution");
                    distribution(&mut cols[1], state, view);
                });
                ui.separator();

                ui.columns(2, |cols| {
                    grouped_views(&mut cols[0], state, view);
                    cols[1].strong("Comparison");
                    match (
                        &view.scatter,
                        &state.request.primary_metric,
                        &state.request.secondary_metric,
                    ) {
                        (Some(pairs), Some(x), Some(y)) if !pairs.is_empty() => {
                            plot::scatter_plot(&mut cols[1], x, y, pairs)
                        }
                        _ => empty_state(&mut cols[1]),
                    }
                });
                ui.separator();

                ui.strong("Basic statistics");
                if view.summary.columns.is_empty() {
                    ui.label(RichText::new("No numeric columns").italics());
                } else {
                    tables::summary_table(ui, &view.summary);
                }
                ui.separator();

                ui.strong("Correlation matrix");
                match &view.correlation {
                    Some(matrix) if !matrix.is_empty() => tables::correlation_heatmap(ui, matrix),
                    _ => {
                        ui.label(RichText::new("No numeric columns").italics());
                    }
                }
                ui.separator();

                search_edit = data_explorer(ui, state, dataset, view);
            });
    }

    // The view is borrowed above; the search edit lands after rendering.
    if let Some(term) = search_edit {
        let mut request = state.request.clone();
        request.search = term;
        state.update_request(request);
    }
}

const ROW_TABLE_SMALL: f32 = 140.0;
const ROW_TABLE_LARGE: f32 = 300.0;

fn notices(ui: &mut Ui, notices: &[Notice]) {
    for notice in notices {
        ui.label(RichText::new(notice.to_string()).color(Color32::from_rgb(220, 160, 40)));
    }
}

fn kpi_row(ui: &mut Ui, kpis: &Kpis) {
    ui.horizontal(|ui: &mut Ui| {
        kpi(ui, "Rows", kpis.rows);
        kpi(ui, "Groups", kpis.groups);
        kpi(ui, "Numeric columns", kpis.numeric_columns);
        kpi(ui, "Columns", kpis.total_columns);
    });
}

fn kpi(ui: &mut Ui, label: &str, value: usize) {
    ui.group(|ui: &mut Ui| {
        ui.vertical(|ui: &mut Ui| {
            ui.label(RichText::new(label).weak());
            ui.heading(value.to_string());
        });
    });
}

fn empty_state(ui: &mut Ui) {
    ui.label(RichText::new("No data for the current selection").italics());
}

fn distribution(ui: &mut Ui, state: &AppState, view: &DashboardView) {
    match (&view.histogram, &state.request.primary_metric) {
        (Some(hist), Some(metric)) if !hist.is_empty() => plot::histogram_plot(ui, metric, hist),
        _ => empty_state(ui),
    }
}

fn grouped_views(ui: &mut Ui, state: &AppState, view: &DashboardView) {
    let Some(group_col) = state.schema.grouping_column.as_deref() else {
        ui.label(RichText::new("Grouped views need a grouping column").italics());
        return;
    };

    ui.strong(format!("Average by {group_col}"));
    match &view.group_means {
        Some(means) if !means.is_empty() => {
            plot::group_means_plot(ui, means, state.color_map.as_ref())
        }
        _ => empty_state(ui),
    }

    ui.strong("Ranking");
    match (&view.ranking, &state.request.ranking_metric) {
        (Some(ranking), Some(metric)) if !ranking.is_empty() => {
            tables::ranking_table(ui, group_col, metric, ranking)
        }
        _ => empty_state(ui),
    }
}

/// Returns the new search term when the user edited it.
fn data_explorer(
    ui: &mut Ui,
    state: &AppState,
    dataset: &Dataset,
    view: &DashboardView,
) -> Option<String> {
    ui.strong("Data explorer");
    let mut term = state.request.search.clone();
    ui.horizontal(|ui: &mut Ui| {
        ui.label("Search:");
        ui.add(egui::TextEdit::singleline(&mut term).hint_text("any value, any column"));
        ui.label(format!("{} matching rows", view.search_rows.len()));
    });

    let results = view.searched(dataset);
    if results.is_empty() {
        empty_state(ui);
    } else {
        tables::rows_table(ui, "search", &results, ROW_TABLE_LARGE);
    }

    (term != state.request.search).then_some(term)
}
