use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Legend, Plot, PlotPoints, Points};

use crate::color::ColorMap;
use crate::data::aggregate::GroupMeans;
use crate::data::describe::Histogram;

const PLOT_HEIGHT: f32 = 260.0;

// ---------------------------------------------------------------------------
// Distribution of the primary metric
// ---------------------------------------------------------------------------

pub fn histogram_plot(ui: &mut Ui, metric: &str, hist: &Histogram) {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bars()
        .map(|(centre, count)| Bar::new(centre, count as f64).width(width))
        .collect();

    Plot::new("histogram_plot")
        .height(PLOT_HEIGHT)
        .x_axis_label(metric)
        .y_axis_label("Frequency")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .name(metric)
                    .color(Color32::LIGHT_BLUE),
            );
        });
}

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// One bar per group, coloured by the group's colour. Hover shows the name.
pub fn group_means_plot(ui: &mut Ui, means: &GroupMeans, color_map: Option<&ColorMap>) {
    let bars: Vec<Bar> = means
        .groups
        .iter()
        .enumerate()
        .filter_map(|(i, g)| {
            let mean = g.mean.value()?;
            let color = color_map
                .map(|cm| cm.color_for(&g.group))
                .unwrap_or(Color32::LIGHT_BLUE);
            Some(
                Bar::new(i as f64, mean)
                    .name(g.group.to_string())
                    .fill(color)
                    .width(0.8),
            )
        })
        .collect();

    Plot::new("group_means_plot")
        .height(PLOT_HEIGHT)
        .x_axis_label(means.group_column.as_str())
        .y_axis_label(format!("mean {}", means.metric))
        .show_x(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(means.metric.as_str()));
        });
}

// ---------------------------------------------------------------------------
// Scatter of two metrics
// ---------------------------------------------------------------------------

pub fn scatter_plot(ui: &mut Ui, x: &str, y: &str, pairs: &[[f64; 2]]) {
    let points: PlotPoints = pairs.iter().copied().collect();

    Plot::new("scatter_plot")
        .height(PLOT_HEIGHT)
        .legend(Legend::default())
        .x_axis_label(x)
        .y_axis_label(y)
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.points(
                Points::new(points)
                    .radius(3.0)
                    .color(Color32::from_rgb(230, 120, 60))
                    .name(format!("{x} vs {y}")),
            );
        });
}
