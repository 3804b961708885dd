use chrono::NaiveDate;

use super::model::{HistoricalSeries, Observation};

// ---------------------------------------------------------------------------
// Calendar-day selection
// ---------------------------------------------------------------------------

/// All observations recorded on `month`/`day`, one per year, in date order.
///
/// Matching is strict: Feb 29 records only ever join a Feb 29 sample, and a
/// Feb 28 sample never borrows them.
pub fn same_calendar_day(series: &HistoricalSeries, month: u32, day: u32) -> Vec<&Observation> {
    series
        .observations()
        .iter()
        .filter(|o| o.is_on(month, day))
        .collect()
}

/// The observation recorded on exactly `date`, if any.
///
/// When a file repeats a date, the first row for it in file order wins.
pub fn lookup(series: &HistoricalSeries, date: NaiveDate) -> Option<&Observation> {
    let observations = series.observations();
    let first = observations.partition_point(|o| o.date < date);
    observations.get(first).filter(|o| o.date == date)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn series() -> HistoricalSeries {
        HistoricalSeries::from_observations(vec![
            Observation::new(ymd(2019, 2, 28), 1.0),
            Observation::new(ymd(2020, 2, 28), 2.0),
            Observation::new(ymd(2020, 2, 29), 3.0),
            Observation::new(ymd(2020, 3, 1), 4.0),
            Observation::new(ymd(2021, 2, 28), 5.0),
            Observation::new(ymd(2024, 2, 29), 6.0),
        ])
    }

    #[test]
    fn same_day_across_years() {
        let s = series();
        let temps: Vec<f64> = same_calendar_day(&s, 2, 28).iter().map(|o| o.temperature).collect();
        assert_eq!(temps, vec![1.0, 2.0, 5.0]);
    }

    #[test]
    fn leap_day_only_samples_leap_days() {
        let s = series();
        let temps: Vec<f64> = same_calendar_day(&s, 2, 29).iter().map(|o| o.temperature).collect();
        assert_eq!(temps, vec![3.0, 6.0]);
    }

    #[test]
    fn unknown_day_is_empty() {
        let s = series();
        assert!(same_calendar_day(&s, 7, 4).is_empty());
    }

    #[test]
    fn lookup_exact_date() {
        let s = series();
        assert_eq!(lookup(&s, ymd(2020, 3, 1)).map(|o| o.temperature), Some(4.0));
        assert!(lookup(&s, ymd(2022, 2, 28)).is_none());
        assert!(lookup(&s, ymd(2030, 1, 1)).is_none());
    }

    #[test]
    fn lookup_repeated_date_takes_first_row() {
        let s = HistoricalSeries::from_observations(vec![
            Observation::new(ymd(2001, 5, 5), 18.0),
            Observation::new(ymd(2001, 5, 5), 30.0),
            Observation::new(ymd(2000, 5, 5), 10.0),
            Observation::new(ymd(2001, 5, 5), 5.0),
            Observation::new(ymd(2001, 5, 6), 7.0),
        ]);
        assert_eq!(lookup(&s, ymd(2001, 5, 5)).map(|o| o.temperature), Some(18.0));
    }
}
