use std::path::PathBuf;

use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::state::AppState;

// ---------------------------------------------------------------------------
// Left side panel – grouping filter and metric pickers
// ---------------------------------------------------------------------------

/// Render the left filter panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Filters");
    ui.separator();

    if state.dataset.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    // Clone what we need so we can mutate state inside the loop.
    let numeric = state.schema.numeric_columns.clone();
    let groups = state.group_values.clone();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            // ---- Metric selectors ----
            let mut request = state.request.clone();
            metric_combo(ui, "primary_metric", "Metric", &numeric, &mut request.primary_metric);
            metric_combo(
                ui,
                "secondary_metric",
                "Compare with",
                &numeric,
                &mut request.secondary_metric,
            );
            metric_combo(ui, "ranking_metric", "Rank by", &numeric, &mut request.ranking_metric);
            if numeric.is_empty() {
                ui.label(RichText::new("No numeric columns").italics());
            }
            state.update_request(request);
            ui.separator();

            // ---- Grouping filter ----
            let Some(group_col) = state.schema.grouping_column.clone() else {
                ui.label(RichText::new("No grouping column detected").italics());
                return;
            };

            let header_text = format!(
                "{group_col}  ({}/{})",
                state.selected_count(),
                groups.len()
            );
            egui::CollapsingHeader::new(RichText::new(header_text).strong())
                .id_salt("group_filter")
                .default_open(true)
                .show(ui, |ui: &mut Ui| {
                    ui.horizontal(|ui: &mut Ui| {
                        if ui.small_button("All").clicked() {
                            state.select_all();
                        }
                        if ui.small_button("Clear").clicked() {
                            state.clear_selection();
                        }
                    });
                    if state.selected_count() == 0 {
                        ui.label(RichText::new("Nothing ticked: showing all rows").weak());
                    }

                    for val in &groups {
                        let mut text = RichText::new(val.to_string());
                        if let Some(cm) = &state.color_map {
                            text = text.color(cm.color_for(val));
                        }

                        let mut checked = state.is_selected(val);
                        if ui.checkbox(&mut checked, text).changed() {
                            state.toggle_group(val);
                        }
                    }
                });
        });
}

fn metric_combo(
    ui: &mut Ui,
    id: &str,
    label: &str,
    columns: &[String],
    current: &mut Option<String>,
) {
    ui.strong(label);
    let selected_text = current.clone().unwrap_or_default();
    egui::ComboBox::from_id_salt(id)
        .selected_text(selected_text)
        .show_ui(ui, |ui: &mut Ui| {
            for col in columns {
                if ui
                    .selectable_label(current.as_deref() == Some(col.as_str()), col)
                    .clicked()
                {
                    *current = Some(col.clone());
                }
            }
        });
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar. Returns a file the user asked to open.
pub fn top_bar(ui: &mut Ui, state: &AppState) -> Option<PathBuf> {
    let mut picked = None;
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                picked = open_file_dialog();
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(ds), Some(view)) = (&state.dataset, &state.view) {
            ui.label(format!(
                "{} rows loaded, {} visible",
                ds.len(),
                view.filtered_rows.len()
            ));
        }
        if let Some(src) = &state.source {
            ui.separator();
            ui.label(RichText::new(src.display().to_string()).weak());
        }

        if let Some(msg) = &state.load_error {
            ui.separator();
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
    picked
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Open survey data")
        .add_filter(
            "Supported files",
            &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "json", "parquet", "pq"],
        )
        .add_filter("Spreadsheets", &["xlsx", "xlsm", "xlsb", "xls", "ods"])
        .add_filter("CSV", &["csv"])
        .add_filter("JSON", &["json"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file()
}
