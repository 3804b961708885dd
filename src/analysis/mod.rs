/// Pure computations over a loaded series.
///
/// * `compare`   – same-day sample, mean, rank and percentile of a target
/// * `histogram` – equal-width bins for the distribution chart
/// * `trend`     – LOWESS line for the year-over-year scatter
pub mod compare;
pub mod histogram;
pub mod trend;
