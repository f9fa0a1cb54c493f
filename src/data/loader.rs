use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use arrow::array::{
    Array, AsArray, Date32Array, Float32Array, Float64Array, Int32Array, Int64Array, StringArray,
};
use arrow::datatypes::DataType;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::model::{parse_open_date, Algorithm, StationDataset, StationRecord};

// ---------------------------------------------------------------------------
// Public entry-points
// ---------------------------------------------------------------------------

/// Load a station dataset from a local file.  Dispatch by extension.
///
/// Supported formats:
/// * `.json`    – the same array `/station_data` serves
/// * `.csv`     – an AFDC export, raw or curated
/// * `.parquet` – the curated OpenStations / Predictions tables
pub fn load_file(path: &Path) -> Result<StationDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "parquet" | "pq" => load_parquet(path)?,
        "json" => {
            let text = std::fs::read_to_string(path).context("reading JSON file")?;
            parse_station_json(&text)?
        }
        "csv" => load_csv(path)?,
        other => bail!("Unsupported file extension: .{other}"),
    };
    Ok(StationDataset::from_records(records))
}

/// Parse the body of `/station_data`: a top-level array of station objects.
///
/// Rows without a numeric `Latitude`/`Longitude` are skipped.
pub fn parse_station_json(text: &str) -> Result<Vec<StationRecord>> {
    let root: JsonValue = serde_json::from_str(text).context("parsing JSON")?;
    let rows = root.as_array().context("Expected top-level JSON array")?;

    let mut records = Vec::with_capacity(rows.len());
    let mut skipped = 0usize;
    for (i, row) in rows.iter().enumerate() {
        match StationRecord::deserialize(row) {
            Ok(rec) => records.push(rec),
            Err(e) => {
                log::debug!("Row {i} skipped: {e}");
                skipped += 1;
            }
        }
    }
    if skipped > 0 {
        log::warn!("{skipped} of {} station rows had no usable coordinates", rows.len());
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

/// Columns read from an AFDC export. Everything is optional so that both
/// the raw download and the curated subset load through the same path.
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(rename = "Latitude", default, deserialize_with = "csv::invalid_option")]
    latitude: Option<f64>,
    #[serde(rename = "Longitude", default, deserialize_with = "csv::invalid_option")]
    longitude: Option<f64>,
    #[serde(rename = "Station Name")]
    name: Option<String>,
    #[serde(rename = "Street Address")]
    address: Option<String>,
    #[serde(rename = "City")]
    city: Option<String>,
    #[serde(rename = "State")]
    state: Option<String>,
    #[serde(rename = "Open Date")]
    open_date: Option<String>,
    #[serde(rename = "Year")]
    year: Option<String>,
    #[serde(rename = "Algorithm")]
    algorithm: Option<String>,
    #[serde(rename = "Status Code")]
    status_code: Option<String>,
    #[serde(rename = "Fuel Type Code")]
    fuel_type: Option<String>,
    #[serde(rename = "Groups With Access Code")]
    access: Option<String>,
}

/// Columns that only the raw AFDC download carries.
const RAW_EXPORT_COLUMNS: [&str; 3] = ["Status Code", "Fuel Type Code", "Groups With Access Code"];

impl CsvRow {
    /// Raw exports list every fuel type and planned/closed sites too; keep
    /// open, public, electric stations only. Blank cells never pass.
    fn is_open_public_electric(&self) -> bool {
        self.status_code.as_deref() == Some("E")
            && self.fuel_type.as_deref() == Some("ELEC")
            && self.access.as_deref().is_some_and(|a| a.contains("Public"))
    }

    fn into_record(self) -> Option<StationRecord> {
        let open_date = self.open_date.as_deref().and_then(parse_open_date);
        let open_date_raw = self.open_date;
        let year = self.year.as_deref().and_then(parse_year_cell);
        Some(StationRecord {
            latitude: self.latitude?,
            longitude: self.longitude?,
            name: self.name.unwrap_or_default(),
            address: self.address.unwrap_or_default(),
            city: self.city.unwrap_or_default(),
            state: self.state.unwrap_or_default(),
            open_date_raw,
            open_date,
            year,
            algorithm: self
                .algorithm
                .as_deref()
                .map(Algorithm::from_tag)
                .unwrap_or_default(),
        })
    }
}

/// `"2015"` and `"2015.0"` both read as 2015.
fn parse_year_cell(s: &str) -> Option<i32> {
    let s = s.trim();
    s.parse::<i32>()
        .ok()
        .or_else(|| s.parse::<f64>().ok().map(|f| f as i32))
}

fn load_csv(path: &Path) -> Result<Vec<StationRecord>> {
    let mut reader = csv::Reader::from_path(path).context("opening CSV")?;
    let headers = reader.headers().context("reading CSV header")?;
    let raw_export = RAW_EXPORT_COLUMNS
        .iter()
        .all(|col| headers.iter().any(|h| h == *col));
    if raw_export {
        log::info!("Raw AFDC export detected; keeping open public electric stations");
    }

    let mut records = Vec::new();
    let mut dropped = 0usize;
    for (row_no, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = match result {
            Ok(row) => row,
            Err(e) => {
                log::debug!("CSV row {row_no} skipped: {e}");
                dropped += 1;
                continue;
            }
        };
        if raw_export && !row.is_open_public_electric() {
            continue;
        }
        match row.into_record() {
            Some(rec) => records.push(rec),
            None => dropped += 1,
        }
    }
    if dropped > 0 {
        log::warn!("{dropped} CSV rows had no usable coordinates and were skipped");
    }
    Ok(records)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load a Parquet table of stations.
///
/// Columns are looked up by their AFDC names; `Latitude` and `Longitude`
/// are required, the rest are optional. Works with files written by
/// **fastparquet**, **pyarrow** and **Polars**.
fn load_parquet(path: &Path) -> Result<Vec<StationRecord>> {
    let file = std::fs::File::open(path).context("opening parquet file")?;
    let builder =
        ParquetRecordBatchReaderBuilder::try_new(file).context("reading parquet metadata")?;
    let reader = builder.build().context("building parquet reader")?;

    let mut records = Vec::new();

    for batch_result in reader {
        let batch = batch_result.context("reading parquet record batch")?;
        let schema = batch.schema();
        let column = |name: &str| schema.index_of(name).ok().map(|i| batch.column(i).clone());

        let lat_col = column("Latitude").context("Parquet file missing 'Latitude' column")?;
        let lon_col = column("Longitude").context("Parquet file missing 'Longitude' column")?;
        let name_col = column("Station Name");
        let address_col = column("Street Address");
        let city_col = column("City");
        let state_col = column("State");
        let date_col = column("Open Date");
        let year_col = column("Year");
        let algo_col = column("Algorithm");

        let text = |col: &Option<Arc<dyn Array>>, row: usize| {
            col.as_ref()
                .and_then(|c| cell_string(c, row))
                .unwrap_or_default()
        };

        for row in 0..batch.num_rows() {
            let (Some(latitude), Some(longitude)) =
                (cell_f64(&lat_col, row), cell_f64(&lon_col, row))
            else {
                continue;
            };

            let open_date_raw = date_col.as_ref().and_then(|c| cell_date_text(c, row));
            records.push(StationRecord {
                latitude,
                longitude,
                name: text(&name_col, row),
                address: text(&address_col, row),
                city: text(&city_col, row),
                state: text(&state_col, row),
                open_date: open_date_raw.as_deref().and_then(parse_open_date),
                open_date_raw,
                year: year_col
                    .as_ref()
                    .and_then(|c| cell_f64(c, row))
                    .map(|y| y as i32),
                algorithm: algo_col
                    .as_ref()
                    .and_then(|c| cell_string(c, row))
                    .map(|s| Algorithm::from_tag(&s))
                    .unwrap_or_default(),
            });
        }
    }

    Ok(records)
}

// -- Parquet / Arrow helpers --

/// Read a numeric cell (float or integer column) as `f64`.
fn cell_f64(col: &Arc<dyn Array>, row: usize) -> Option<f64> {
    if col.is_null(row) {
        return None;
    }
    let any = col.as_any();
    let value = match col.data_type() {
        DataType::Float64 => any.downcast_ref::<Float64Array>()?.value(row),
        DataType::Float32 => any.downcast_ref::<Float32Array>()?.value(row) as f64,
        DataType::Int64 => any.downcast_ref::<Int64Array>()?.value(row) as f64,
        DataType::Int32 => any.downcast_ref::<Int32Array>()?.value(row) as f64,
        _ => return None,
    };
    value.is_finite().then_some(value)
}

/// Read a text cell; non-string columns are rendered with their value.
fn cell_string(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Utf8 => col
            .as_any()
            .downcast_ref::<StringArray>()
            .map(|s| s.value(row).to_string()),
        DataType::LargeUtf8 => Some(col.as_string::<i64>().value(row).to_string()),
        _ => cell_f64(col, row).map(|v| v.to_string()),
    }
}

/// `Open Date` may be stored as text or as a native date; native dates are
/// rendered as `YYYY-MM-DD`.
fn cell_date_text(col: &Arc<dyn Array>, row: usize) -> Option<String> {
    if col.is_null(row) {
        return None;
    }
    match col.data_type() {
        DataType::Date32 => col
            .as_any()
            .downcast_ref::<Date32Array>()?
            .value_as_date(row)
            .map(|d| d.format("%Y-%m-%d").to_string()),
        _ => cell_string(col, row),
    }
}
