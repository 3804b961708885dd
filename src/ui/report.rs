use eframe::egui::{Color32, RichText, ScrollArea, Ui};

use crate::analysis::compare::ComparisonError;
use crate::state::AppState;
use crate::ui::{metrics, plot};

const MIN_PLOT_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Central panel – metrics and charts for the selected date
// ---------------------------------------------------------------------------

pub fn central_panel(ui: &mut Ui, state: &AppState) {
    let Some(comparison) = &state.comparison else {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a weather data file to begin  (File → Open…)");
        });
        return;
    };

    ui.heading("How warm was this day compared to the past?");
    ui.label("Every year on record for the same calendar day, side by side.");
    ui.add_space(8.0);

    let day = match comparison {
        Ok(day) => day,
        Err(e) => {
            let text = match e {
                ComparisonError::MissingTarget { .. } => format!(
                    "{e}. Pick another date, or enter a hypothetical temperature in the side panel."
                ),
                _ => e.to_string(),
            };
            ui.label(RichText::new(text).color(Color32::from_rgb(230, 160, 0)));
            return;
        }
    };

    let bins = state.config.histogram_bins;
    let trend_min_points = state.config.trend_min_points;
    let month_day = day.date.format("%B %-d");
    let plot_height = (ui.available_height() / 2.0 - 80.0).max(MIN_PLOT_HEIGHT);

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            metrics::summary_row(ui, day);
            ui.separator();

            ui.strong(format!(
                "Distribution of {month_day} temperatures over {} years",
                day.result.sample_size
            ));
            plot::histogram_plot(ui, day, bins, plot_height);
            ui.add_space(12.0);

            ui.strong(format!("{month_day}, year by year"));
            plot::scatter_plot(ui, day, trend_min_points, plot_height);
        });
}
