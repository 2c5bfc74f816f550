use std::path::Path;

use eframe::egui;

use crate::config::DashboardConfig;
use crate::data::cache::DatasetCache;
use crate::state::AppState;
use crate::ui::{panels, views};

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct SurveyLensApp {
    pub state: AppState,
    pub cache: DatasetCache,
    pub config: DashboardConfig,
}

impl SurveyLensApp {
    /// Build the app and load the configured source.
    pub fn new(config: DashboardConfig) -> Self {
        let state = AppState::new(
            config.grouping.clone(),
            config.display.view,
            config.display.preview_rows,
        );
        let mut app = Self {
            state,
            cache: DatasetCache::new(),
            config,
        };
        let source = app.config.source.path.clone();
        app.open(&source);
        app
    }

    /// Load `path` through the cache. A failure replaces the dashboard.
    pub fn open(&mut self, path: &Path) {
        match self.cache.get_or_load(path, &self.config.load_options()) {
            Ok(dataset) => {
                log::info!(
                    "Opened {} ({} rows, columns {:?})",
                    path.display(),
                    dataset.len(),
                    dataset.column_names()
                );
                self.state.set_dataset(dataset, path.to_path_buf());
            }
            Err(e) => {
                log::error!("Failed to load dataset: {e}");
                self.state.set_load_error(e.to_string());
            }
        }
    }
}

impl eframe::App for SurveyLensApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        // ---- Top panel: menu bar ----
        let mut open_request = None;
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            open_request = panels::top_bar(ui, &self.state);
        });
        if let Some(path) = open_request {
            self.open(&path);
        }

        // A load error replaces the whole dashboard.
        if let Some(message) = &self.state.load_error {
            egui::CentralPanel::default().show(ctx, |ui| {
                views::load_error(ui, message);
            });
            return;
        }

        // ---- Left side panel: filters and metric pickers ----
        egui::SidePanel::left("filter_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: dashboard ----
        egui::CentralPanel::default().show(ctx, |ui| {
            views::dashboard(ui, &mut self.state);
        });
    }
}
