use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Observation – one row of the station file
// ---------------------------------------------------------------------------

/// A single day's record for the station.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    /// Daily mean temperature in °C.
    pub temperature: f64,
    /// Daily minimum in °C, when the source has the column.
    #[serde(default)]
    pub min_temperature: Option<f64>,
    /// Daily maximum in °C, when the source has the column.
    #[serde(default)]
    pub max_temperature: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, temperature: f64) -> Self {
        Observation {
            date,
            temperature,
            min_temperature: None,
            max_temperature: None,
        }
    }

    /// Whether this record falls on the given calendar day in any year.
    pub fn is_on(&self, month: u32, day: u32) -> bool {
        self.date.month() == month && self.date.day() == day
    }
}

// ---------------------------------------------------------------------------
// HistoricalSeries – the complete loaded dataset
// ---------------------------------------------------------------------------

/// Every observation for one station, sorted by date.
#[derive(Debug, Clone, Default)]
pub struct HistoricalSeries {
    observations: Vec<Observation>,
    /// Station identifier from the source file, if it carried one.
    pub station: Option<String>,
}

impl HistoricalSeries {
    /// Build a series, sorting the observations by date. Rows sharing a date
    /// keep their input order.
    pub fn from_observations(mut observations: Vec<Observation>) -> Self {
        observations.sort_by_key(|o| o.date);
        HistoricalSeries {
            observations,
            station: None,
        }
    }

    pub fn with_station(mut self, station: Option<String>) -> Self {
        self.station = station;
        self
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }

    /// Number of observations.
    pub fn len(&self) -> usize {
        self.observations.len()
    }

    /// Whether the series is empty.
    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.observations.first().map(|o| o.date)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.observations.last().map(|o| o.date)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn series_is_sorted_by_date() {
        let series = HistoricalSeries::from_observations(vec![
            Observation::new(ymd(2020, 3, 1), 5.0),
            Observation::new(ymd(1990, 3, 1), 3.0),
            Observation::new(ymd(2005, 3, 1), 4.0),
        ]);

        let years: Vec<i32> = series.observations().iter().map(|o| o.date.year()).collect();
        assert_eq!(years, vec![1990, 2005, 2020]);
        assert_eq!(series.first_date(), Some(ymd(1990, 3, 1)));
        assert_eq!(series.last_date(), Some(ymd(2020, 3, 1)));
    }

    #[test]
    fn empty_series_has_no_range() {
        let series = HistoricalSeries::default();
        assert!(series.is_empty());
        assert_eq!(series.first_date(), None);
        assert_eq!(series.last_date(), None);
    }

    #[test]
    fn is_on_matches_month_and_day_only() {
        let obs = Observation::new(ymd(1911, 8, 15), 27.3);
        assert!(obs.is_on(8, 15));
        assert!(!obs.is_on(8, 16));
        assert!(!obs.is_on(9, 15));
    }
}
