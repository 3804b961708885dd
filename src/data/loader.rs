use std::borrow::Cow;
use std::path::Path;
use std::sync::Arc;

use anyhow::{anyhow, bail, Context, Result};
use arrow::array::{Array, AsArray, Date32Array, Float32Array, Float64Array};
use arrow::datatypes::DataType;
use chrono::{NaiveDate, NaiveDateTime};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use super::model::{HistoricalSeries, Observation};

/// Metadata lines the station export puts above its header row.
pub const PREAMBLE_LINES: usize = 7;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

const DATE_COLUMNS: &[&str] = &["날짜", "일시", "date", "Date", "time"];
const MEAN_COLUMNS: &[&str] = &["평균기온(℃)", "temperature", "avg_temp"];
const MIN_COLUMNS: &[&str] = &["최저기온(℃)", "min_temperature"];
const MAX_COLUMNS: &[&str] = &["최고기온(℃)", "max_temperature"];
const STATION_COLUMNS: &[&str] = &["지점", "station"];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y%m%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S", "%Y/%m/%d %H:%M"];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a temperature series from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – station export: seven metadata lines, then header + rows
/// * `.json`    – `[{ "date": "1907-10-01", "temperature": 13.5, ... }, ...]`
/// * `.parquet` – `date` (Date32 or Utf8) and `temperature` columns
pub fn load_file(path: &Path) -> Result<HistoricalSeries> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let series = match ext.as_str() {
        "csv" => load_csv(path),
        "json" => load_json(path),
        "parquet" | "pq" => load_parquet(path),
        other => bail!("Unsupported file extension: .{other}"),
    }
    .with_context(|| format!("loading {}", path.display()))?;

    log::info!(
        "Loaded {} observations from {} ({:?} to {:?}, station {:?})",
        series.len(),
        path.display(),
        series.first_date(),
        series.last_date(),
        series.station
    );
    Ok(series)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

fn load_csv(path: &Path) -> Result<HistoricalSeries> {
    let bytes = std::fs::read(path).context("reading CSV file")?;
    parse_station_csv(&bytes)
}

/// Parse a station export held in memory.
///
/// Layout:
/// ```text
/// [검색조건]                              ┐
/// 자료구분 : 일별                          │ PREAMBLE_LINES, ignored
/// ...                                     ┘
/// 날짜,지점,평균기온(℃),최저기온(℃),최고기온(℃)
/// \t1907-10-01,108,13.5,7.9,20.7
/// ```
/// Rows whose date does not parse, or whose temperature cells are empty,
/// are dropped.
pub fn parse_station_csv(bytes: &[u8]) -> Result<HistoricalSeries> {
    let text = decode(bytes);
    let body = skip_preamble(&text, PREAMBLE_LINES)?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .context("reading CSV header row")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    let columns = Columns::locate(&headers)?;

    let mut observations = Vec::new();
    let mut station: Option<String> = None;
    let mut bad_dates = 0usize;
    let mut incomplete = 0usize;

    for (row_no, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV row {}", row_no + 1))?;

        let Some(date) = record.get(columns.date).and_then(parse_date) else {
            bad_dates += 1;
            continue;
        };
        let (Some(temperature), Some(min_temperature), Some(max_temperature)) = (
            parse_temperature(record.get(columns.mean)),
            optional_cell(&record, columns.min),
            optional_cell(&record, columns.max),
        ) else {
            incomplete += 1;
            continue;
        };

        if station.is_none() {
            station = columns
                .station
                .and_then(|i| record.get(i))
                .filter(|s| !s.is_empty())
                .map(str::to_string);
        }

        observations.push(Observation {
            date,
            temperature,
            min_temperature,
            max_temperature,
        });
    }

    if bad_dates > 0 {
        log::warn!("Skipped {bad_dates} rows with an unreadable date");
    }
    if incomplete > 0 {
        log::warn!("Dropped {incomplete} rows with missing temperatures");
    }
    if observations.is_empty() {
        bail!("no usable rows after the header (columns: {headers:?})");
    }

    Ok(HistoricalSeries::from_observations(observations).with_station(station))
}

/// UTF-8 first; station exports saved on Windows come as CP949.
fn decode(bytes: &[u8]) -> Cow<'_, str> {
    let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes);
    match std::str::from_utf8(bytes) {
        Ok(text) => Cow::Borrowed(text),
        Err(_) => {
            log::warn!("File is not valid UTF-8, decoding as CP949");
            let (text, _, had_errors) = encoding_rs::EUC_KR.decode(bytes);
            if had_errors {
                log::warn!("CP949 decoding replaced malformed sequences");
            }
            text
        }
    }
}

fn skip_preamble(text: &str, lines: usize) -> Result<&str> {
    let mut rest = text;
    for found in 0..lines {
        match rest.find('\n') {
            Some(i) => rest = &rest[i + 1..],
            None => bail!(
                "expected {lines} metadata lines before the header row, found {found}"
            ),
        }
    }
    Ok(rest)
}

/// Column positions resolved from the header row.
#[derive(Debug)]
struct Columns {
    date: usize,
    mean: usize,
    min: Option<usize>,
    max: Option<usize>,
    station: Option<usize>,
}

impl Columns {
    fn locate(headers: &[String]) -> Result<Self> {
        let find = |aliases: &[&str]| headers.iter().position(|h| aliases.contains(&h.as_str()));

        let date = find(DATE_COLUMNS).with_context(|| {
            format!(
                "no date column found (looked for {DATE_COLUMNS:?}); columns present: {headers:?}. \
                 Is the header row on line {} of the file?",
                PREAMBLE_LINES + 1
            )
        })?;
        let mean = find(MEAN_COLUMNS).with_context(|| {
            format!(
                "no mean temperature column found (looked for {MEAN_COLUMNS:?}); columns present: {headers:?}"
            )
        })?;

        Ok(Columns {
            date,
            mean,
            min: find(MIN_COLUMNS),
            max: find(MAX_COLUMNS),
            station: find(STATION_COLUMNS),
        })
    }
}

/// Parse a date cell, tolerating the tab prefix station exports carry.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let cleaned: String = raw.chars().filter(|c| *c != '\t').collect();
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        return None;
    }

    DATE_FORMATS
        .iter()
        .find_map(|f| NaiveDate::parse_from_str(cleaned, f).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|f| NaiveDateTime::parse_from_str(cleaned, f).ok())
                .map(|dt| dt.date())
        })
}

fn parse_temperature(cell: Option<&str>) -> Option<f64> {
    let value = cell?.trim().parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

/// `Some(None)` when the column is absent, `None` when present but unreadable.
fn optional_cell(record: &csv::StringRecord, idx: Option<usize>) -> Option<Option<f64>> {
    match idx {
        None => Some(None),
        Some(i) => parse_temperature(record.get(i)).map(Some),
    }
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

/// Records-oriented export of the same table:
///
/// ```json
/// [
///   { "date": "1907-10-01", "temperature": 13.5,
///     "min_temperature": 7.9, "max_temperature": 20.7 },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<HistoricalSeries> {
    let text = std::fs::read_to_string(path).context("reading JSON file")?;
    let records: Vec<Observation> = serde_json::from_str(&text).context("parsing JSON")?;

    if records.is_empty() {
        bail!("JSON file contains no records");
    }
    Ok(HistoricalSeries::from_observations(records))
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Expected schema:
/// - `date`: Date32, Utf8 or LargeUtf8
/// - `temperature`: Float64 or Float32
/// - `min_temperature`, `max_temperature`: optional, same types
fn load_parquet(path: &Path) -> Result<HistoricalSeries> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut observations = Vec::new();
    let mut skipped = 0usize;

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();

        let date_idx = schema
            .index_of("date")
            .map_err(|_| anyhow!("Parquet file missing 'date' column"))?;
        let temp_idx = schema
            .index_of("temperature")
            .map_err(|_| anyhow!("Parquet file missing 'temperature' column"))?;
        let min_idx = schema.index_of("min_temperature").ok();
        let max_idx = schema.index_of("max_temperature").ok();

        for row in 0..batch.num_rows() {
            let date = extract_date(batch.column(date_idx), row)
                .with_context(|| format!("Row {row}: failed to read 'date'"))?;
            let temperature = extract_f64(batch.column(temp_idx), row)
                .with_context(|| format!("Row {row}: failed to read 'temperature'"))?;
            let min_temperature = optional_column(&batch, min_idx, row)?;
            let max_temperature = optional_column(&batch, max_idx, row)?;

            let (Some(date), Some(temperature), Some(min_temperature), Some(max_temperature)) =
                (date, temperature, min_temperature, max_temperature)
            else {
                skipped += 1;
                continue;
            };

            observations.push(Observation {
                date,
                temperature,
                min_temperature,
                max_temperature,
            });
        }
    }

    if skipped > 0 {
        log::warn!("Dropped {skipped} parquet rows with null or unreadable values");
    }
    if observations.is_empty() {
        bail!("Parquet file contains no usable rows");
    }
    Ok(HistoricalSeries::from_observations(observations))
}

// -- Parquet / Arrow helpers --

fn optional_column(
    batch: &arrow::record_batch::RecordBatch,
    idx: Option<usize>,
    row: usize,
) -> Result<Option<Option<f64>>> {
    match idx {
        None => Ok(Some(None)),
        Some(i) => Ok(extract_f64(batch.column(i), row)?.map(Some)),
    }
}

fn extract_date(col: &Arc<dyn Array>, row: usize) -> Result<Option<NaiveDate>> {
    if col.is_null(row) {
        return Ok(None);
    }
    match col.data_type() {
        DataType::Date32 => {
            let arr = col
                .as_any()
                .downcast_ref::<Date32Array>()
                .context("expected Date32Array")?;
            Ok(arr.value_as_date(row))
        }
        DataType::Utf8 => Ok(parse_date(col.as_string::<i32>().value(row))),
        DataType::LargeUtf8 => Ok(parse_date(col.as_string::<i64>().value(row))),
        other => bail!("Expected Date32 or Utf8 column, got {other:?}"),
    }
}

fn extract_f64(col: &Arc<dyn Array>, row: usize) -> Result<Option<f64>> {
    if col.is_null(row) {
        return Ok(None);
    }
    let value = match col.data_type() {
        DataType::Float64 => col
            .as_any()
            .downcast_ref::<Float64Array>()
            .context("expected Float64Array")?
            .value(row),
        DataType::Float32 => col
            .as_any()
            .downcast_ref::<Float32Array>()
            .context("expected Float32Array")?
            .value(row) as f64,
        other => bail!("Expected Float64 or Float32 column, got {other:?}"),
    };
    Ok(value.is_finite().then_some(value))
}
