use std::path::PathBuf;

/// Environment variable naming the default dataset.
pub const DATA_ENV: &str = "TEMP_HISTORY_DATA";
/// Environment variable overriding the histogram bin count.
pub const BINS_ENV: &str = "TEMP_HISTORY_BINS";

pub const DEFAULT_DATASET: &str = "data/sample_ta.csv";
pub const DEFAULT_BINS: usize = 30;
/// The trend line needs more than five points.
pub const DEFAULT_TREND_MIN_POINTS: usize = 6;

// ---------------------------------------------------------------------------
// Startup configuration
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Dataset shown until the user uploads another one.
    pub default_dataset: PathBuf,
    pub histogram_bins: usize,
    pub trend_min_points: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_dataset: PathBuf::from(DEFAULT_DATASET),
            histogram_bins: DEFAULT_BINS,
            trend_min_points: DEFAULT_TREND_MIN_POINTS,
        }
    }
}

impl AppConfig {
    /// Resolve from the command line and environment.
    ///
    /// Dataset: first CLI argument, then `TEMP_HISTORY_DATA`, then the bundled file.
    pub fn from_env() -> Self {
        Self::resolve(
            std::env::args().nth(1),
            std::env::var(DATA_ENV).ok(),
            std::env::var(BINS_ENV).ok(),
        )
    }

    fn resolve(arg: Option<String>, data_env: Option<String>, bins_env: Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = arg.or(data_env).filter(|p| !p.trim().is_empty()) {
            config.default_dataset = PathBuf::from(path);
        }

        if let Some(raw) = bins_env {
            match raw.trim().parse::<usize>() {
                Ok(bins) if bins > 0 => config.histogram_bins = bins,
                _ => log::warn!("Ignoring {BINS_ENV}={raw:?}, using {DEFAULT_BINS} bins"),
            }
        }

        config
    }
}
