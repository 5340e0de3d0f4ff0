use std::fmt::Display;

use eframe::egui::Ui;
use egui_plot::{Bar, BarChart, Legend, Line, LineStyle, Plot, PlotPoints};

use crate::color;
use crate::data::stats::HistogramBin;
use crate::eval::EvaluationResult;

/// Uniform height for the page plots.
const PLOT_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

/// Render an equal-width histogram as a bar chart.
pub fn histogram_plot(ui: &mut Ui, id: &str, x_label: &str, bins: &[HistogramBin]) {
    let bars: Vec<Bar> = bins
        .iter()
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width())
                .fill(color::ACCENT)
        })
        .collect();

    Plot::new(id)
        .x_axis_label(x_label)
        .y_axis_label("Frequency")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).name(x_label));
        });
}

// ---------------------------------------------------------------------------
// Categorical frequency bars
// ---------------------------------------------------------------------------

/// Render category frequencies as one coloured bar per category.
pub fn frequency_plot<T: Display>(ui: &mut Ui, id: &str, x_label: &str, counts: &[(T, usize)]) {
    let palette = color::generate_palette(counts.len());

    Plot::new(id)
        .x_axis_label(x_label)
        .y_axis_label("Frequency")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (i, (category, count)) in counts.iter().enumerate() {
                let bar = Bar::new(i as f64, *count as f64)
                    .width(0.6)
                    .fill(palette[i]);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(category.to_string()));
            }
        });
}

// ---------------------------------------------------------------------------
// Feature importances
// ---------------------------------------------------------------------------

/// Render normalized per-feature importances, one bar per feature.
pub fn importance_plot(ui: &mut Ui, importances: &[(&str, f64)]) {
    let palette = color::generate_palette(importances.len());

    Plot::new("feature_importances")
        .x_axis_label("Feature")
        .y_axis_label("Importance")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .show(ui, |plot_ui| {
            for (i, (name, importance)) in importances.iter().enumerate() {
                let bar = Bar::new(i as f64, *importance).width(0.6).fill(palette[i]);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(*name));
            }
        });
}

// ---------------------------------------------------------------------------
// ROC curve
// ---------------------------------------------------------------------------

/// Render the ROC curve with the chance diagonal for reference.
pub fn roc_plot(ui: &mut Ui, result: &EvaluationResult) {
    let curve: PlotPoints = result.roc_points.iter().map(|p| [p[0], p[1]]).collect();
    let diagonal: PlotPoints = vec![[0.0, 0.0], [1.0, 1.0]].into();

    Plot::new("roc_curve")
        .x_axis_label("False positive rate")
        .y_axis_label("True positive rate")
        .height(PLOT_HEIGHT)
        .allow_scroll(false)
        .legend(Legend::default())
        .include_x(1.0)
        .include_y(1.0)
        .show(ui, |plot_ui| {
            plot_ui.line(
                Line::new(diagonal)
                    .color(color::DIAGONAL)
                    .style(LineStyle::dashed_loose())
                    .name("chance"),
            );
            plot_ui.line(
                Line::new(curve)
                    .color(color::ACCENT)
                    .width(2.0)
                    .name(format!("ROC (AUC = {:.4})", result.roc_auc)),
            );
        });
}
