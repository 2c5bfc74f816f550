use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column as TableColumn, TableBuilder};

use crate::color::correlation_color;
use crate::data::aggregate::{CorrelationMatrix, RankedGroup};
use crate::data::describe::Summary;
use crate::data::filter::FilteredView;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Row tables
// ---------------------------------------------------------------------------

/// Virtualised table over the rows of a view.
pub fn rows_table(ui: &mut Ui, id: &str, view: &FilteredView<'_>, max_height: f32) {
    let dataset = view.dataset();
    let columns = dataset.columns();
    if columns.is_empty() {
        ui.label(RichText::new("No columns").italics());
        return;
    }
    let rows = view.rows();

    ui.push_id(id, |ui: &mut Ui| {
        ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
            TableBuilder::new(ui)
                .striped(true)
                .resizable(true)
                .max_scroll_height(max_height)
                .columns(TableColumn::auto().at_least(60.0).clip(true), columns.len())
                .header(ROW_HEIGHT + 4.0, |mut header| {
                    for col in columns {
                        header.col(|ui| {
                            ui.strong(col.name.as_str());
                        });
                    }
                })
                .body(|body| {
                    body.rows(ROW_HEIGHT, rows.len(), |mut row| {
                        let r = rows[row.index()];
                        for col in columns {
                            row.col(|ui| {
                                ui.label(col.values[r].to_string());
                            });
                        }
                    });
                });
        });
    });
}

// ---------------------------------------------------------------------------
// Summary statistics
// ---------------------------------------------------------------------------

pub fn summary_table(ui: &mut Ui, summary: &Summary) {
    ScrollArea::horizontal()
        .id_salt("summary_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("summary_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for col in &summary.columns {
                        ui.strong(col.as_str());
                    }
                    ui.end_row();

                    for row in &summary.rows {
                        ui.strong(row.label);
                        for v in &row.values {
                            stat_label(ui, v.to_string(), v.is_defined());
                        }
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Ranking
// ---------------------------------------------------------------------------

pub fn ranking_table(ui: &mut Ui, group_column: &str, metric: &str, ranking: &[RankedGroup]) {
    ScrollArea::vertical()
        .id_salt("ranking_scroll")
        .max_height(260.0)
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("ranking_grid")
                .striped(true)
                .show(ui, |ui: &mut Ui| {
                    ui.strong("Rank");
                    ui.strong(group_column);
                    ui.strong(metric);
                    ui.end_row();

                    for r in ranking {
                        ui.label(r.rank.to_string());
                        ui.label(r.group.to_string());
                        stat_label(ui, r.mean.to_string(), r.mean.is_defined());
                        ui.end_row();
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Correlation heatmap
// ---------------------------------------------------------------------------

pub fn correlation_heatmap(ui: &mut Ui, matrix: &CorrelationMatrix) {
    ScrollArea::horizontal()
        .id_salt("correlation_scroll")
        .show(ui, |ui: &mut Ui| {
            egui::Grid::new("correlation_grid")
                .spacing([2.0, 2.0])
                .show(ui, |ui: &mut Ui| {
                    ui.label("");
                    for col in &matrix.columns {
                        ui.label(RichText::new(col.as_str()).small().strong());
                    }
                    ui.end_row();

                    for (i, row_name) in matrix.columns.iter().enumerate() {
                        ui.label(RichText::new(row_name.as_str()).small().strong());
                        for j in 0..matrix.columns.len() {
                            let value = matrix.get(i, j);
                            let text_color = if value.is_defined() {
                                Color32::BLACK
                            } else {
                                Color32::LIGHT_GRAY
                            };
                            let cell = match value.value() {
                                Some(r) => format!("{r:+.2}"),
                                None => "n/a".to_string(),
                            };
                            ui.label(
                                RichText::new(format!(" {cell} "))
                                    .monospace()
                                    .color(text_color)
                                    .background_color(correlation_color(value)),
                            )
                            .on_hover_text(format!(
                                "{} vs {}: {} (n = {})",
                                row_name,
                                matrix.columns[j],
                                value,
                                matrix.sample_sizes[i][j]
                            ));
                        }
                        ui.end_row();
                    }
                });
        });
}

fn stat_label(ui: &mut Ui, text: String, defined: bool) {
    if defined {
        ui.label(text);
    } else {
        ui.label(RichText::new(text).weak().italics());
    }
}
