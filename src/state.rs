use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

use chrono::{Datelike, NaiveDate};

use crate::analysis::compare::{compare_date, compare_hypothetical, ComparisonError, DayComparison};
use crate::config::AppConfig;
use crate::data::filter::lookup;
use crate::data::loader::load_file;
use crate::data::model::HistoricalSeries;

// ---------------------------------------------------------------------------
// Data source
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataSource {
    /// The dataset named by the configuration.
    Bundled(PathBuf),
    /// A file the user picked.
    Uploaded(PathBuf),
}

impl DataSource {
    pub fn path(&self) -> &Path {
        match self {
            DataSource::Bundled(p) | DataSource::Uploaded(p) => p,
        }
    }
}

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: AppConfig,

    /// Loaded series (None until a file loads successfully).
    pub series: Option<HistoricalSeries>,

    /// Where `series` came from.
    pub source: Option<DataSource>,

    /// Date being analysed. Kept inside the series' date range.
    pub selected_date: NaiveDate,

    /// Compare a typed-in value instead of the recorded one.
    pub use_hypothetical: bool,
    pub hypothetical_temperature: f64,

    /// Comparison for the current selection (cached).
    pub comparison: Option<Result<DayComparison, ComparisonError>>,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            series: None,
            source: None,
            selected_date: NaiveDate::default(),
            use_hypothetical: false,
            hypothetical_temperature: 0.0,
            comparison: None,
            status_message: None,
        }
    }

    /// Load the configured default dataset.
    pub fn load_default(&mut self) {
        let path = self.config.default_dataset.clone();
        match load_file(&path) {
            Ok(series) => {
                self.set_series(series, DataSource::Bundled(path));
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load default dataset: {e:#}");
                self.status_message = Some(format!(
                    "Could not load the default dataset {}: {e:#}. \
                     Create one with `cargo run --bin generate_sample -- {}`.",
                    path.display(),
                    path.display()
                ));
            }
        }
    }

    /// Replace the series with a user file. On failure the bundled dataset
    /// is shown instead and the error stays visible.
    pub fn load_upload(&mut self, path: &Path) {
        match load_file(path) {
            Ok(series) => {
                self.set_series(series, DataSource::Uploaded(path.to_path_buf()));
                self.status_message = None;
            }
            Err(e) => {
                log::error!("Failed to load uploaded file: {e:#}");
                let message = format!("Error: {e:#}. Showing the default dataset instead.");
                if !matches!(self.source, Some(DataSource::Bundled(_))) {
                    self.load_default();
                }
                self.status_message = Some(match self.status_message.take() {
                    Some(default_error) => format!("{message}\n{default_error}"),
                    None => message,
                });
            }
        }
    }

    /// Ingest a newly loaded series and select its last recorded date.
    pub fn set_series(&mut self, series: HistoricalSeries, source: DataSource) {
        if let Some(last) = series.last_date() {
            self.selected_date = last;
            if let Some(obs) = lookup(&series, last) {
                self.hypothetical_temperature = obs.temperature;
            }
        }
        self.series = Some(series);
        self.source = Some(source);
        self.recompute();
    }

    /// `(first, last)` recorded dates.
    pub fn date_range(&self) -> Option<(NaiveDate, NaiveDate)> {
        let series = self.series.as_ref()?;
        Some((series.first_date()?, series.last_date()?))
    }

    /// Years the loaded series covers.
    pub fn year_range(&self) -> Option<RangeInclusive<i32>> {
        let (first, last) = self.date_range()?;
        Some(first.year()..=last.year())
    }

    /// Move the selected date to `year`, keeping month and day. Feb 29 falls
    /// back to Feb 28 in common years.
    pub fn set_year(&mut self, year: i32) {
        let current = self.selected_date;
        let moved = current
            .with_year(year)
            .or_else(|| NaiveDate::from_ymd_opt(year, current.month(), 28));
        if let Some(date) = moved {
            self.set_date(date);
        }
    }

    /// Select a date, clamped to the loaded range.
    pub fn set_date(&mut self, date: NaiveDate) {
        self.selected_date = match self.date_range() {
            Some((first, last)) => date.clamp(first, last),
            None => date,
        };
        self.recompute();
    }

    pub fn set_use_hypothetical(&mut self, enabled: bool) {
        self.use_hypothetical = enabled;
        self.recompute();
    }

    pub fn set_hypothetical_temperature(&mut self, temperature: f64) {
        self.hypothetical_temperature = temperature;
        if self.use_hypothetical {
            self.recompute();
        }
    }

    /// Recompute `comparison` after the date, mode or dataset changed.
    pub fn recompute(&mut self) {
        self.comparison = self.series.as_ref().map(|series| {
            if self.use_hypothetical {
                compare_hypothetical(series, self.selected_date, self.hypothetical_temperature)
            } else {
                compare_date(series, self.selected_date)
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    use crate::analysis::compare::TargetSource;

    const CSV: &str = "a\nb\nc\nd\ne\nf\ng\n\
        날짜,지점,평균기온(℃),최저기온(℃),최고기온(℃)\n\
        \t2001-01-01,108,-2.0,-6.0,2.0\n\
        \t2002-01-01,108,1.0,-3.0,4.5\n\
        \t2003-01-01,108,-4.5,-9.0,0.5\n\
        \t2003-01-02,108,-1.0,-5.0,3.0\n\
        \t2003-01-04,108,0.5,-2.0,3.5\n";

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn csv_file(contents: &str) -> tempfile::NamedTempFile {
        let mut tmp = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        tmp.write_all(contents.as_bytes()).unwrap();
        tmp
    }

    fn state_with_default(path: &Path) -> AppState {
        let config = AppConfig {
            default_dataset: path.to_path_buf(),
            ..AppConfig::default()
        };
        let mut state = AppState::new(config);
        state.load_default();
        state
    }

    #[test]
    fn default_dataset_selects_last_date() {
        let file = csv_file(CSV);
        let state = state_with_default(file.path());

        assert!(state.status_message.is_none());
        assert_eq!(state.selected_date, ymd(2003, 1, 4));
        assert_eq!(state.hypothetical_temperature, 0.5);
        assert_eq!(state.date_range(), Some((ymd(2001, 1, 1), ymd(2003, 1, 4))));
        assert!(matches!(state.source, Some(DataSource::Bundled(_))));
        assert!(matches!(state.comparison, Some(Ok(_))));
    }

    #[test]
    fn selecting_a_date_compares_same_day() {
        let file = csv_file(CSV);
        let mut state = state_with_default(file.path());

        state.set_date(ymd(2002, 1, 1));
        let day = state.comparison.clone().unwrap().unwrap();
        assert_eq!(day.source, TargetSource::Recorded);
        assert_eq!(day.result.sample_size, 3);
        assert_eq!(day.result.rank, 1);
    }

    #[test]
    fn dates_outside_the_range_are_clamped() {
        let file = csv_file(CSV);
        let mut state = state_with_default(file.path());

        state.set_date(ymd(1990, 6, 1));
        assert_eq!(state.selected_date, ymd(2001, 1, 1));
        state.set_date(ymd(2030, 6, 1));
        assert_eq!(state.selected_date, ymd(2003, 1, 4));
    }

    #[test]
    fn year_selection_stays_in_range() {
        let file = csv_file(CSV);
        let mut state = state_with_default(file.path());

        assert_eq!(state.year_range(), Some(2001..=2003));
        state.set_year(2002);
        assert_eq!(state.selected_date, ymd(2002, 1, 4));
        state.set_year(1907);
        assert_eq!(state.selected_date, ymd(2001, 1, 1));
    }

    #[test]
    fn leap_day_moves_to_feb_28_in_common_years() {
        let file = csv_file(
            "1\n2\n3\n4\n5\n6\n7\ndate,temperature\n2019-02-28,1.0\n2020-02-29,2.0\n2021-03-01,3.0\n",
        );
        let mut state = state_with_default(file.path());

        state.set_date(ymd(2020, 2, 29));
        state.set_year(2019);
        assert_eq!(state.selected_date, ymd(2019, 2, 28));
    }

    #[test]
    fn unrecorded_date_reports_missing_target() {
        let file = csv_file(CSV);
        let mut state = state_with_default(file.path());

        state.set_date(ymd(2003, 1, 3));
        assert_eq!(
            state.comparison,
            Some(Err(ComparisonError::MissingTarget { date: ymd(2003, 1, 3) }))
        );

        state.set_use_hypothetical(true);
        state.set_hypothetical_temperature(2.0);
        let Some(Err(ComparisonError::EmptySample { month: 1, day: 3 })) = state.comparison else {
            panic!("expected an empty sample, got {:?}", state.comparison);
        };
    }

    #[test]
    fn hypothetical_temperature_is_ranked() {
        let file = csv_file(CSV);
        let mut state = state_with_default(file.path());

        state.set_date(ymd(2003, 1, 1));
        state.set_use_hypothetical(true);
        state.set_hypothetical_temperature(5.0);
        let day = state.comparison.clone().unwrap().unwrap();
        assert_eq!(day.source, TargetSource::Hypothetical);
        assert_eq!(day.result.rank, 1);
        assert_eq!(day.result.percentile, 100.0);
    }

    #[test]
    fn failed_upload_falls_back_to_default() {
        let default = csv_file(CSV);
        let broken = csv_file("only\nthree\nlines\n");
        let mut state = state_with_default(default.path());

        state.load_upload(broken.path());
        assert!(matches!(state.source, Some(DataSource::Bundled(_))));
        assert_eq!(state.series.as_ref().map(|s| s.len()), Some(5));
        let msg = state.status_message.clone().unwrap();
        assert!(msg.contains("metadata lines"), "{msg}");
    }

    #[test]
    fn upload_replaces_series() {
        let default = csv_file(CSV);
        let upload = csv_file(
            "1\n2\n3\n4\n5\n6\n7\ndate,temperature\n1999-07-01,24.0\n2000-07-01,26.0\n",
        );
        let mut state = state_with_default(default.path());

        state.load_upload(upload.path());
        assert!(matches!(state.source, Some(DataSource::Uploaded(_))));
        assert_eq!(state.selected_date, ymd(2000, 7, 1));
        assert_eq!(state.series.as_ref().map(|s| s.len()), Some(2));
    }

    #[test]
    fn missing_default_keeps_running() {
        let state = state_with_default(Path::new("does/not/exist.csv"));
        assert!(state.series.is_none());
        assert!(state.comparison.is_none());
        assert!(state.status_message.unwrap().contains("generate_sample"));
    }
}
