use chrono::{Datelike, NaiveDate};
use thiserror::Error;

use crate::data::filter::{lookup, same_calendar_day};
use crate::data::model::{HistoricalSeries, Observation};

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ComparisonError {
    #[error("no observations for {month:02}-{day:02} in any recorded year")]
    EmptySample { month: u32, day: u32 },

    #[error("no temperature was recorded on {date}")]
    MissingTarget { date: NaiveDate },

    #[error("target temperature {0} is not a finite number")]
    InvalidTemperature(f64),
}

// ---------------------------------------------------------------------------
// ComparisonResult
// ---------------------------------------------------------------------------

/// Where a target temperature sits among every same-day observation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ComparisonResult {
    pub target_temperature: f64,
    /// Mean of the same-day sample.
    pub sample_mean: f64,
    /// `target_temperature - sample_mean`.
    pub difference: f64,
    /// 1 = hottest. Ties share the better rank.
    pub rank: usize,
    pub sample_size: usize,
    /// Share of the sample at or below the target, 0–100.
    pub percentile: f64,
}

impl ComparisonResult {
    /// Human-readable rank, e.g. `"3 of 117 years"`.
    pub fn rank_label(&self) -> String {
        if self.rank > self.sample_size {
            format!("colder than all {} years", self.sample_size)
        } else {
            format!("{} of {} years", self.rank, self.sample_size)
        }
    }
}

/// Compare `target_temperature` against every observation recorded on
/// `target_month`/`target_day`, in any year.
pub fn compare(
    series: &HistoricalSeries,
    target_month: u32,
    target_day: u32,
    target_temperature: f64,
) -> Result<ComparisonResult, ComparisonError> {
    if !target_temperature.is_finite() {
        return Err(ComparisonError::InvalidTemperature(target_temperature));
    }
    let sample = same_calendar_day(series, target_month, target_day);
    if sample.is_empty() {
        return Err(ComparisonError::EmptySample {
            month: target_month,
            day: target_day,
        });
    }

    let n = sample.len();
    let sample_mean = sample.iter().map(|o| o.temperature).sum::<f64>() / n as f64;
    let warmer = sample
        .iter()
        .filter(|o| o.temperature > target_temperature)
        .count();
    let at_or_below = n - warmer;

    Ok(ComparisonResult {
        target_temperature,
        sample_mean,
        difference: target_temperature - sample_mean,
        rank: warmer + 1,
        sample_size: n,
        percentile: at_or_below as f64 / n as f64 * 100.0,
    })
}

// ---------------------------------------------------------------------------
// DayComparison – what the charts need
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    /// The temperature recorded on the selected date.
    Recorded,
    /// A value typed in by the user.
    Hypothetical,
}

/// A comparison together with the sample it was computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct DayComparison {
    pub date: NaiveDate,
    pub source: TargetSource,
    pub result: ComparisonResult,
    /// Same-day observations, in date order.
    pub sample: Vec<Observation>,
}

impl DayComparison {
    /// Whether `obs` belongs to the selected date's year.
    pub fn is_target_year(&self, obs: &Observation) -> bool {
        obs.date.year() == self.date.year()
    }

    pub fn sample_temperatures(&self) -> Vec<f64> {
        self.sample.iter().map(|o| o.temperature).collect()
    }
}

/// Compare the temperature recorded on `date` with the same day in every year.
pub fn compare_date(
    series: &HistoricalSeries,
    date: NaiveDate,
) -> Result<DayComparison, ComparisonError> {
    let recorded = lookup(series, date).ok_or(ComparisonError::MissingTarget { date })?;
    day_comparison(series, date, recorded.temperature, TargetSource::Recorded)
}

/// Compare a user-supplied temperature with the same day as `date` in every year.
pub fn compare_hypothetical(
    series: &HistoricalSeries,
    date: NaiveDate,
    temperature: f64,
) -> Result<DayComparison, ComparisonError> {
    day_comparison(series, date, temperature, TargetSource::Hypothetical)
}

fn day_comparison(
    series: &HistoricalSeries,
    date: NaiveDate,
    temperature: f64,
    source: TargetSource,
) -> Result<DayComparison, ComparisonError> {
    let result = compare(series, date.month(), date.day(), temperature)?;
    let sample: Vec<Observation> = same_calendar_day(series, date.month(), date.day())
        .into_iter()
        .copied()
        .collect();

    Ok(DayComparison {
        date,
        source,
        result,
        sample,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    /// Same calendar day over several years, plus noise on neighbouring days.
    fn series_for(month: u32, day: u32, temps: &[f64]) -> HistoricalSeries {
        let mut obs = Vec::new();
        for (i, &t) in temps.iter().enumerate() {
            let year = 2000 + i as i32;
            let date = ymd(year, month, day);
            obs.push(Observation::new(date, t));
            obs.push(Observation::new(date.succ_opt().unwrap(), 99.0));
        }
        HistoricalSeries::from_observations(obs)
    }

    #[test]
    fn worked_example() {
        let series = series_for(6, 1, &[10.0, 12.0, 15.0, 9.0]);
        let r = compare(&series, 6, 1, 12.0).unwrap();

        assert_eq!(r.sample_size, 4);
        assert!((r.sample_mean - 11.5).abs() < 1e-12);
        assert!((r.difference - 0.5).abs() < 1e-12);
        assert_eq!(r.rank, 2);
        assert!((r.percentile - 75.0).abs() < 1e-12);
        assert_eq!(r.rank_label(), "2 of 4 years");
    }

    #[test]
    fn empty_sample_is_an_error() {
        let series = series_for(6, 1, &[10.0, 12.0]);
        assert_eq!(
            compare(&series, 12, 25, 3.0),
            Err(ComparisonError::EmptySample { month: 12, day: 25 })
        );
    }

    #[test]
    fn non_finite_target_is_rejected() {
        let series = series_for(6, 1, &[10.0]);
        assert!(matches!(
            compare(&series, 6, 1, f64::NAN),
            Err(ComparisonError::InvalidTemperature(_))
        ));
    }

    #[test]
    fn rank_one_means_at_least_the_maximum() {
        let temps = [3.5, -1.0, 7.25, 7.25, 0.0, 5.5];
        let series = series_for(1, 15, &temps);
        for &t in &[-5.0, 0.0, 3.5, 7.25, 7.3, 20.0] {
            let r = compare(&series, 1, 15, t).unwrap();
            if r.rank == 1 {
                assert!(temps.iter().all(|&v| t >= v), "target {t}");
            }
        }
    }

    #[test]
    fn ties_share_the_better_rank() {
        let series = series_for(1, 15, &[5.0, 7.0, 7.0, 1.0]);
        let r = compare(&series, 1, 15, 7.0).unwrap();
        assert_eq!(r.rank, 1);
        assert!((r.percentile - 100.0).abs() < 1e-12);
    }

    #[test]
    fn percentile_stays_in_range() {
        let temps: Vec<f64> = (0..40).map(|i| (i as f64 * 0.37).sin() * 10.0).collect();
        let series = series_for(3, 3, &temps);
        for t in [-100.0, -10.0, -3.3, 0.0, 2.2, 9.99, 100.0] {
            let r = compare(&series, 3, 3, t).unwrap();
            assert!((0.0..=100.0).contains(&r.percentile), "target {t}: {}", r.percentile);
            assert!(r.rank >= 1 && r.rank <= r.sample_size + 1);
        }
    }

    #[test]
    fn colder_than_everything() {
        let series = series_for(1, 1, &[1.0, 2.0, 3.0]);
        let r = compare(&series, 1, 1, -4.0).unwrap();
        assert_eq!(r.rank, 4);
        assert_eq!(r.percentile, 0.0);
        assert_eq!(r.rank_label(), "colder than all 3 years");
    }

    #[test]
    fn compare_date_uses_recorded_value() {
        let series = series_for(8, 15, &[25.0, 27.0, 26.0, 29.0]);
        let day = compare_date(&series, ymd(2002, 8, 15)).unwrap();

        assert_eq!(day.source, TargetSource::Recorded);
        assert_eq!(day.result.target_temperature, 26.0);
        assert_eq!(day.result.rank, 3);
        assert_eq!(day.sample.len(), 4);
        assert!(day.sample.iter().all(|o| o.is_on(8, 15)));
        assert_eq!(day.sample.iter().filter(|o| day.is_target_year(o)).count(), 1);
    }

    #[test]
    fn repeated_date_uses_first_recorded_value() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::new(ymd(2001, 5, 5), 18.0),
            Observation::new(ymd(2001, 5, 5), 30.0),
            Observation::new(ymd(2001, 5, 5), 5.0),
            Observation::new(ymd(2000, 5, 5), 10.0),
        ]);
        let day = compare_date(&series, ymd(2001, 5, 5)).unwrap();
        assert_eq!(day.result.target_temperature, 18.0);
        assert_eq!(day.result.sample_size, 4);
    }

    #[test]
    fn compare_date_without_record() {
        let series = series_for(8, 15, &[25.0, 27.0]);
        let date = ymd(2030, 8, 15);
        assert_eq!(
            compare_date(&series, date).unwrap_err(),
            ComparisonError::MissingTarget { date }
        );
    }

    #[test]
    fn hypothetical_value_for_unrecorded_year() {
        let series = series_for(8, 15, &[25.0, 27.0, 26.0, 29.0]);
        let day = compare_hypothetical(&series, ymd(2030, 8, 15), 30.0).unwrap();

        assert_eq!(day.source, TargetSource::Hypothetical);
        assert_eq!(day.result.rank, 1);
        assert_eq!(day.result.percentile, 100.0);
        assert_eq!(day.sample_temperatures(), vec![25.0, 27.0, 26.0, 29.0]);
    }
}
