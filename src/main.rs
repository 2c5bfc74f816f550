use anyhow::Result;
use clap::Parser;
use eframe::egui;

use survey_lens::app::SurveyLensApp;
use survey_lens::cli::Args;
use survey_lens::config::DashboardConfig;

fn main() -> Result<()> {
    env_logger::init();

    let args = Args::parse();
    let mut config = DashboardConfig::load(args.config.as_deref())?;
    config.apply_args(&args);
    config.validate()?;

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1400.0, 900.0])
            .with_min_inner_size([800.0, 500.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Survey Lens – Health Survey Dashboard",
        options,
        Box::new(|_cc| Ok(Box::new(SurveyLensApp::new(config)))),
    )
    .map_err(|e| anyhow::anyhow!("{e}"))
}
