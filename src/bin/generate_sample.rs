//! Write a synthetic daily-temperature dataset for one station.
//!
//! ```text
//! generate_sample [OUTPUT] [--cp949] [--years FIRST-LAST] [--seed N]
//! ```
//!
//! `OUTPUT` ending in `.parquet` writes a Parquet table; anything else writes
//! the station CSV export layout (seven metadata lines, then the table).

use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{Date32Array, Float64Array};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Datelike, NaiveDate};
use parquet::arrow::ArrowWriter;

#[cfg(test)]
#[allow(dead_code)]
#[path = "../data/mod.rs"]
mod data;

const STATION: &str = "108";

/// Minimal deterministic PRNG (xoshiro256**)
struct SimpleRng {
    state: [u64; 4],
}

impl SimpleRng {
    fn new(seed: u64) -> Self {
        let mut s = [0u64; 4];
        let mut x = seed;
        for slot in &mut s {
            x = x.wrapping_mul(6364136223846793005).wrapping_add(1);
            *slot = x;
        }
        SimpleRng { state: s }
    }

    fn next_u64(&mut self) -> u64 {
        let result = (self.state[1].wrapping_mul(5))
            .rotate_left(7)
            .wrapping_mul(9);
        let t = self.state[1] << 17;
        self.state[2] ^= self.state[0];
        self.state[3] ^= self.state[1];
        self.state[1] ^= self.state[2];
        self.state[0] ^= self.state[3];
        self.state[2] ^= t;
        self.state[3] = self.state[3].rotate_left(45);
        result
    }

    fn next_f64(&mut self) -> f64 {
        (self.next_u64() >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Box-Muller transform for normal distribution
    fn gauss(&mut self, mean: f64, std_dev: f64) -> f64 {
        let u1 = self.next_f64().max(1e-15);
        let u2 = self.next_f64();
        let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
        mean + std_dev * z
    }
}

// ---------------------------------------------------------------------------
// Climate model
// ---------------------------------------------------------------------------

#[derive(Debug, PartialEq)]
struct Row {
    date: NaiveDate,
    mean: Option<f64>,
    min: Option<f64>,
    max: Option<f64>,
}

/// Mid-latitude seasonal cycle plus a warming trend and AR(1) weather noise.
fn simulate(first_year: i32, last_year: i32, seed: u64) -> Result<Vec<Row>> {
    let first = NaiveDate::from_ymd_opt(first_year, 1, 1).context("invalid first year")?;
    let last = NaiveDate::from_ymd_opt(last_year, 12, 31).context("invalid last year")?;

    let mut rng = SimpleRng::new(seed);
    let mut anomaly = 0.0;
    let mut rows = Vec::new();

    for date in first.iter_days().take_while(|d| *d <= last) {
        let phase = 2.0 * std::f64::consts::PI * (date.ordinal() as f64 - 15.0) / 365.25;
        let climate = 12.5 - 14.5 * phase.cos() + 0.03 * (date.year() - first_year) as f64;
        anomaly = 0.7 * anomaly + rng.gauss(0.0, 2.0);

        let mean = round1(climate + anomaly);
        let min = round1(mean - rng.gauss(4.5, 1.0).abs());
        let max = round1(mean + rng.gauss(5.0, 1.2).abs());

        // About one day in five hundred has a gap in the record.
        let missing = rng.next_f64() < 0.002;
        rows.push(Row {
            date,
            mean: (!missing).then_some(mean),
            min: (!missing).then_some(min),
            max: (!missing).then_some(max),
        });
    }
    Ok(rows)
}

fn round1(v: f64) -> f64 {
    (v * 10.0).round() / 10.0
}

// ---------------------------------------------------------------------------
// Writers
// ---------------------------------------------------------------------------

fn write_station_csv(rows: &[Row], path: &Path, cp949: bool) -> Result<()> {
    let (Some(first), Some(last)) = (rows.first(), rows.last()) else {
        bail!("nothing to write");
    };

    let mut out = Vec::new();
    writeln!(out, "[검색조건]")?;
    writeln!(out, "자료구분 : 일별")?;
    writeln!(out, "자료형태 : 기본")?;
    writeln!(out, "지점번호 : 합성({STATION})")?;
    writeln!(
        out,
        "기간 : {}~{}",
        first.date.format("%Y%m%d"),
        last.date.format("%Y%m%d")
    )?;
    writeln!(out)?;
    writeln!(out)?;

    {
        let mut writer = csv::Writer::from_writer(&mut out);
        writer.write_record(["날짜", "지점", "평균기온(℃)", "최저기온(℃)", "최고기온(℃)"])?;
        for row in rows {
            writer.write_record([
                format!("\t{}", row.date),
                STATION.to_string(),
                cell(row.mean),
                cell(row.min),
                cell(row.max),
            ])?;
        }
        writer.flush()?;
    }

    let bytes = if cp949 {
        let text = String::from_utf8(out).context("assembling CSV text")?;
        encoding_rs::EUC_KR.encode(&text).0.into_owned()
    } else {
        out
    };
    std::fs::write(path, bytes).with_context(|| format!("writing {}", path.display()))
}

fn cell(v: Option<f64>) -> String {
    v.map(|v| format!("{v:.1}")).unwrap_or_default()
}

fn write_parquet(rows: &[Row], path: &Path) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).context("epoch")?;
    let dates = Date32Array::from(
        rows.iter()
            .map(|r| (r.date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let means = Float64Array::from(rows.iter().map(|r| r.mean).collect::<Vec<_>>());
    let mins = Float64Array::from(rows.iter().map(|r| r.min).collect::<Vec<_>>());
    let maxs = Float64Array::from(rows.iter().map(|r| r.max).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("date", DataType::Date32, false),
        Field::new("temperature", DataType::Float64, true),
        Field::new("min_temperature", DataType::Float64, true),
        Field::new("max_temperature", DataType::Float64, true),
    ]));

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(dates),
            Arc::new(means),
            Arc::new(mins),
            Arc::new(maxs),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating output file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating parquet writer")?;
    writer.write(&batch).context("writing batch")?;
    writer.close().context("closing parquet writer")?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

struct Options {
    output: PathBuf,
    cp949: bool,
    first_year: i32,
    last_year: i32,
    seed: u64,
}

fn parse_args() -> Result<Options> {
    let mut options = Options {
        output: PathBuf::from("data/sample_ta.csv"),
        cp949: false,
        first_year: 1975,
        last_year: 2025,
        seed: 42,
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--cp949" => options.cp949 = true,
            "--seed" => {
                let raw = args.next().context("--seed needs a value")?;
                options.seed = raw.parse().with_context(|| format!("bad seed {raw:?}"))?;
            }
            "--years" => {
                let raw = args.next().context("--years needs FIRST-LAST")?;
                let (first, last) = raw
                    .split_once('-')
                    .with_context(|| format!("bad year range {raw:?}"))?;
                options.first_year = first.parse().context("bad first year")?;
                options.last_year = last.parse().context("bad last year")?;
            }
            other if other.starts_with("--") => bail!("unknown option {other}"),
            path => options.output = PathBuf::from(path),
        }
    }

    if options.first_year > options.last_year {
        bail!("first year {} is after last year {}", options.first_year, options.last_year);
    }
    Ok(options)
}

fn main() -> Result<()> {
    env_logger::init();
    let options = parse_args()?;

    let rows = simulate(options.first_year, options.last_year, options.seed)?;
    if let Some(dir) = options.output.parent().filter(|d| !d.as_os_str().is_empty()) {
        std::fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    }

    let is_parquet = options
        .output
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("parquet"));
    if is_parquet {
        write_parquet(&rows, &options.output)?;
    } else {
        write_station_csv(&rows, &options.output, options.cp949)?;
    }

    log::info!("seed {}, years {}-{}", options.seed, options.first_year, options.last_year);
    println!("Wrote {} days to {}", rows.len(), options.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::loader::parse_station_csv;

    #[test]
    fn same_seed_same_data() {
        let a = simulate(2000, 2001, 7).unwrap();
        let b = simulate(2000, 2001, 7).unwrap();
        let c = simulate(2000, 2001, 8).unwrap();

        assert_eq!(a.len(), 731);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn station_csv_loads_back() {
        let rows = simulate(1990, 1994, 42).unwrap();
        let complete: Vec<&Row> = rows.iter().filter(|r| r.mean.is_some()).collect();
        let dir = tempfile::tempdir().unwrap();

        for cp949 in [false, true] {
            let path = dir.path().join(format!("station_{cp949}.csv"));
            write_station_csv(&rows, &path, cp949).unwrap();

            let series = parse_station_csv(&std::fs::read(&path).unwrap()).unwrap();
            assert_eq!(series.len(), complete.len());
            assert_eq!(series.station.as_deref(), Some(STATION));
            assert_eq!(series.first_date(), Some(complete[0].date));
            assert_eq!(series.last_date(), complete.last().map(|r| r.date));

            let first = series.observations()[0];
            assert_eq!(Some(first.temperature), complete[0].mean);
            assert_eq!(first.min_temperature, complete[0].min);
            assert_eq!(first.max_temperature, complete[0].max);
        }
    }
}
