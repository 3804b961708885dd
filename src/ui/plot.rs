use std::collections::BTreeMap;

use chrono::Datelike;
use eframe::egui::Ui;
use egui_plot::{
    Bar, BarChart, Legend, Line, LineStyle, MarkerShape, Plot, PlotPoint, Points, VLine,
};

use crate::analysis::compare::{DayComparison, TargetSource};
use crate::analysis::histogram::histogram;
use crate::analysis::trend::{lowess, DEFAULT_FRACTION, DEFAULT_ITERATIONS};
use crate::color;
use crate::data::model::Observation;

// ---------------------------------------------------------------------------
// Histogram of the same-day sample
// ---------------------------------------------------------------------------

/// Distribution of the same-day temperatures with the selected value and the
/// same-day mean marked.
pub fn histogram_plot(ui: &mut Ui, day: &DayComparison, bins: usize, height: f32) {
    let bars: Vec<Bar> = histogram(&day.sample_temperatures(), bins)
        .iter()
        .filter(|b| b.count > 0)
        .map(|b| {
            Bar::new(b.center(), b.count as f64)
                .width(b.width())
                .name(format!("{:.1} to {:.1} °C", b.start, b.end))
        })
        .collect();

    let target_name = match day.source {
        TargetSource::Recorded => format!("{}", day.date),
        TargetSource::Hypothetical => "Hypothetical value".to_string(),
    };

    Plot::new("same_day_histogram")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Mean temperature (°C)")
        .y_axis_label("Years")
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(
                BarChart::new(bars)
                    .color(color::HISTOGRAM_BAR)
                    .name("Years in range"),
            );
            plot_ui.vline(
                VLine::new(day.result.target_temperature)
                    .color(color::SELECTED)
                    .width(3.0)
                    .style(LineStyle::dashed_loose())
                    .name(target_name),
            );
            plot_ui.vline(
                VLine::new(day.result.sample_mean)
                    .color(color::MEAN_LINE)
                    .width(2.0)
                    .name("Same-day mean"),
            );
        });
}

// ---------------------------------------------------------------------------
// Year-by-year scatter
// ---------------------------------------------------------------------------

/// Same-day temperature per year. The selected year is red, a hypothetical
/// value is drawn as a diamond, and a LOWESS trend is added once the sample
/// has `trend_min_points` years.
pub fn scatter_plot(ui: &mut Ui, day: &DayComparison, trend_min_points: usize, height: f32) {
    let (selected, history): (Vec<&Observation>, Vec<&Observation>) =
        day.sample.iter().partition(|o| day.is_target_year(o));

    let trend = (day.sample.len() >= trend_min_points).then(|| {
        let all: Vec<&Observation> = day.sample.iter().collect();
        lowess(&year_points(&all), DEFAULT_FRACTION, DEFAULT_ITERATIONS)
    });

    // Hover text looks observations up by year.
    let by_year: BTreeMap<i32, Observation> =
        day.sample.iter().map(|o| (o.date.year(), *o)).collect();

    Plot::new("same_day_scatter")
        .height(height)
        .legend(Legend::default())
        .x_axis_label("Year")
        .y_axis_label("Mean temperature (°C)")
        .x_axis_formatter(|mark, _range| format!("{:.0}", mark.value))
        .label_formatter(move |name: &str, value: &PlotPoint| hover_text(&by_year, name, value))
        .allow_scroll(false)
        .show(ui, |plot_ui| {
            if let Some(fit) = trend {
                plot_ui.line(
                    Line::new(fit)
                        .color(color::TREND)
                        .width(2.0)
                        .name("LOWESS trend"),
                );
            }
            plot_ui.points(
                Points::new(year_points(&history))
                    .radius(4.0)
                    .color(color::HISTORY)
                    .name("History"),
            );
            if !selected.is_empty() {
                plot_ui.points(
                    Points::new(year_points(&selected))
                        .radius(5.0)
                        .color(color::SELECTED)
                        .name(format!("{}", day.date.year())),
                );
            }
            if day.source == TargetSource::Hypothetical {
                plot_ui.points(
                    Points::new(vec![[
                        day.date.year() as f64,
                        day.result.target_temperature,
                    ]])
                    .shape(MarkerShape::Diamond)
                    .radius(6.0)
                    .color(color::SELECTED)
                    .name("Hypothetical value"),
                );
            }
        });
}

fn year_points(obs: &[&Observation]) -> Vec<[f64; 2]> {
    obs.iter()
        .map(|o| [o.date.year() as f64, o.temperature])
        .collect()
}

fn hover_text(by_year: &BTreeMap<i32, Observation>, name: &str, value: &PlotPoint) -> String {
    let year = value.x.round() as i32;
    match by_year.get(&year) {
        Some(obs) if !name.is_empty() && (obs.temperature - value.y).abs() < 1e-9 => {
            let mut text = format!("{}\n{:.1} °C", obs.date, obs.temperature);
            if let Some(lo) = obs.min_temperature {
                text.push_str(&format!("\nmin {lo:.1} °C"));
            }
            if let Some(hi) = obs.max_temperature {
                text.push_str(&format!("\nmax {hi:.1} °C"));
            }
            text
        }
        _ if !name.is_empty() => format!("{name}\n{year}: {:.1} °C", value.y),
        _ => format!("{year}\n{:.1} °C", value.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample() -> BTreeMap<i32, Observation> {
        let date = NaiveDate::from_ymd_opt(1994, 7, 24).unwrap();
        let obs = Observation {
            date,
            temperature: 33.1,
            min_temperature: Some(28.8),
            max_temperature: Some(38.4),
        };
        BTreeMap::from([(1994, obs)])
    }

    #[test]
    fn hover_shows_extremes_for_recorded_points() {
        let text = hover_text(&sample(), "History", &PlotPoint::new(1994.0, 33.1));
        assert_eq!(text, "1994-07-24\n33.1 °C\nmin 28.8 °C\nmax 38.4 °C");
    }

    #[test]
    fn hover_on_trend_line_names_the_series() {
        let text = hover_text(&sample(), "LOWESS trend", &PlotPoint::new(1994.0, 30.0));
        assert_eq!(text, "LOWESS trend\n1994: 30.0 °C");
    }

    #[test]
    fn hover_on_empty_space() {
        let text = hover_text(&sample(), "", &PlotPoint::new(2001.4, 12.04));
        assert_eq!(text, "2001\n12.0 °C");
    }
}
