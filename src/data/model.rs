use std::fmt;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Deserializer};

// ---------------------------------------------------------------------------
// Algorithm – which process produced a record
// ---------------------------------------------------------------------------

/// Tag distinguishing observed stations from algorithmic predictions.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum Algorithm {
    #[default]
    Original,
    Frank,
    NoahC,
    NoahS,
    Other(String),
}

impl Algorithm {
    pub fn from_tag(tag: &str) -> Self {
        match tag.trim() {
            "" | "Original" => Algorithm::Original,
            "Frank" => Algorithm::Frank,
            "Noah_C" => Algorithm::NoahC,
            "Noah_S" => Algorithm::NoahS,
            other => Algorithm::Other(other.to_string()),
        }
    }

    pub fn is_original(&self) -> bool {
        matches!(self, Algorithm::Original)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Algorithm::Original => write!(f, "Original"),
            Algorithm::Frank => write!(f, "Frank"),
            Algorithm::NoahC => write!(f, "Noah_C"),
            Algorithm::NoahS => write!(f, "Noah_S"),
            Algorithm::Other(s) => write!(f, "{s}"),
        }
    }
}

// ---------------------------------------------------------------------------
// StationRecord – one row of /station_data
// ---------------------------------------------------------------------------

/// A single charging station or prediction row.
///
/// Field names follow the upstream AFDC export, so the JSON keys contain
/// spaces (`"Station Name"`, `"Open Date"`, ...).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "StationRow")]
pub struct StationRecord {
    pub latitude: f64,
    pub longitude: f64,
    pub name: String,
    pub address: String,
    pub city: String,
    pub state: String,
    /// `Open Date` exactly as loaded; this is what the model receives.
    pub open_date_raw: Option<String>,
    /// Date part of `open_date_raw`, used for filtering.
    pub open_date: Option<NaiveDate>,
    pub year: Option<i32>,
    pub algorithm: Algorithm,
}

/// Wire shape of a `/station_data` row.
#[derive(Deserialize)]
struct StationRow {
    #[serde(rename = "Latitude")]
    latitude: f64,
    #[serde(rename = "Longitude")]
    longitude: f64,
    #[serde(rename = "Station Name", default, deserialize_with = "lenient_string")]
    name: String,
    #[serde(rename = "Street Address", default, deserialize_with = "lenient_string")]
    address: String,
    #[serde(rename = "City", default, deserialize_with = "lenient_string")]
    city: String,
    #[serde(rename = "State", default, deserialize_with = "lenient_string")]
    state: String,
    #[serde(rename = "Open Date", default, deserialize_with = "lenient_opt_string")]
    open_date: Option<String>,
    #[serde(rename = "Year", default, deserialize_with = "lenient_year")]
    year: Option<i32>,
    #[serde(rename = "Algorithm", default, deserialize_with = "lenient_algorithm")]
    algorithm: Algorithm,
}

impl From<StationRow> for StationRecord {
    fn from(row: StationRow) -> Self {
        StationRecord {
            latitude: row.latitude,
            longitude: row.longitude,
            name: row.name,
            address: row.address,
            city: row.city,
            state: row.state,
            open_date: row.open_date.as_deref().and_then(parse_open_date),
            open_date_raw: row.open_date,
            year: row.year,
            algorithm: row.algorithm,
        }
    }
}

impl StationRecord {
    /// `Year` column if present, otherwise the year of `Open Date`.
    pub fn effective_year(&self) -> Option<i32> {
        self.year.or_else(|| self.open_date.map(|d| d.year()))
    }

    /// `"City, State"` label used by the city dropdown.
    pub fn city_state(&self) -> String {
        format!("{}, {}", self.city, self.state)
    }

    /// Popup text shown for this record's marker.
    pub fn popup_text(&self) -> String {
        let mut lines = Vec::with_capacity(4);
        if !self.name.is_empty() {
            lines.push(self.name.clone());
        }
        if !self.address.is_empty() {
            lines.push(self.address.clone());
        }
        lines.push(self.city_state());
        if !self.algorithm.is_original() {
            lines.push(format!("Algorithm: {}", self.algorithm));
        }
        lines.join("\n")
    }
}

/// Parse the date part of an `Open Date` cell.
///
/// Accepts `YYYY-MM-DD` and anything starting with it (ISO timestamps).
pub fn parse_open_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let head = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(head, "%Y-%m-%d").ok()
}

/// Read a JSON number or a numeric string as `f64`.
///
/// Both the prediction endpoint and Nominatim send coordinates either way.
pub fn number_like(value: &serde_json::Value) -> Option<f64> {
    match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
    .filter(|v: &f64| v.is_finite())
}

// -- serde helpers: missing or oddly typed optional cells never fail a row --

fn lenient_string<'de, D: Deserializer<'de>>(de: D) -> Result<String, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Null => String::new(),
        serde_json::Value::String(s) => s,
        other => other.to_string(),
    })
}

fn lenient_opt_string<'de, D: Deserializer<'de>>(de: D) -> Result<Option<String>, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(s) => Some(s),
        other => Some(other.to_string()),
    })
}

fn lenient_year<'de, D: Deserializer<'de>>(de: D) -> Result<Option<i32>, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(match value {
        serde_json::Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64))
            .and_then(|y| i32::try_from(y).ok()),
        serde_json::Value::String(s) => s.trim().parse().ok(),
        _ => None,
    })
}

fn lenient_algorithm<'de, D: Deserializer<'de>>(de: D) -> Result<Algorithm, D::Error> {
    let value = serde_json::Value::deserialize(de)?;
    Ok(value.as_str().map(Algorithm::from_tag).unwrap_or_default())
}

// ---------------------------------------------------------------------------
// StationDataset – the immutable loaded dataset
// ---------------------------------------------------------------------------

/// The full station list. Cloning shares the same records.
#[derive(Debug, Clone, Default)]
pub struct StationDataset {
    records: Arc<[StationRecord]>,
}

impl StationDataset {
    pub fn from_records(records: Vec<StationRecord>) -> Self {
        StationDataset {
            records: records.into(),
        }
    }

    pub fn records(&self) -> &[StationRecord] {
        &self.records
    }

    pub fn get(&self, idx: usize) -> Option<&StationRecord> {
        self.records.get(idx)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Number of rows tagged with a prediction algorithm.
    pub fn prediction_count(&self) -> usize {
        self.records
            .iter()
            .filter(|r| !r.algorithm.is_original())
            .count()
    }
}
