use eframe::egui::{self, Color32, RichText, Ui};

use crate::analysis::compare::{DayComparison, TargetSource};
use crate::color::anomaly_color;

// ---------------------------------------------------------------------------
// Headline numbers
// ---------------------------------------------------------------------------

/// Four metric cards: target, same-day mean, rank, percentile.
pub fn summary_row(ui: &mut Ui, day: &DayComparison) {
    let r = &day.result;
    let target_label = match day.source {
        TargetSource::Recorded => format!("Mean temperature on {}", day.date),
        TargetSource::Hypothetical => format!("Hypothetical value for {}", day.date),
    };
    let delta = format!("{:+.1} °C vs. the same day on record", r.difference);

    ui.columns(4, |cols: &mut [Ui]| {
        metric(
            &mut cols[0],
            &target_label,
            &format!("{:.1} °C", r.target_temperature),
            Some((delta.as_str(), anomaly_color(r.difference))),
        );
        metric(
            &mut cols[1],
            "Same-day mean, all years",
            &format!("{:.1} °C", r.sample_mean),
            None,
        );
        metric(&mut cols[2], "Warmest-day rank", &r.rank_label(), None);
        metric(
            &mut cols[3],
            "Percentile",
            &format!("{:.0}", r.percentile),
            Some(("share of years at or below this value", Color32::GRAY)),
        );
    });
}

fn metric(ui: &mut Ui, label: &str, value: &str, note: Option<(&str, Color32)>) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(ui.available_width());
        ui.label(RichText::new(label).small());
        ui.label(RichText::new(value).size(26.0).strong());
        if let Some((text, color)) = note {
            ui.label(RichText::new(text).color(color));
        }
    });
}
