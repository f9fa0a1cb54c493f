//! Configuration: an optional JSON file overridden by command-line flags.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use serde::Deserialize;

use crate::color::MarkerMode;
use crate::map_view::{GeoBounds, LatLon, MapView};
use crate::time_control::TimeMode;

/// Command-line arguments.
#[derive(Debug, Parser)]
#[command(name = "station-map", version, about = "EV charging station map viewer")]
pub struct Cli {
    /// JSON configuration file; every field is optional.
    #[arg(long)]
    pub config: Option<PathBuf>,
    /// Base URL of the server providing /station_data and /run_model.
    #[arg(long)]
    pub server: Option<String>,
    /// Load stations from a local .json/.csv/.parquet file instead of the server.
    #[arg(long)]
    pub data_file: Option<PathBuf>,
    /// Interpret the time slider as a calendar date or a year.
    #[arg(long, value_enum)]
    pub time_mode: Option<TimeMode>,
    /// Marker styling.
    #[arg(long, value_enum)]
    pub markers: Option<MarkerMode>,
}

/// Viewer configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server_url: String,
    pub station_data_path: String,
    pub run_model_path: String,
    pub geocoder_url: String,
    pub tile_url: String,
    pub attribution: String,
    pub user_agent: String,
    pub time_mode: TimeMode,
    pub marker_mode: MarkerMode,
    pub initial_center: LatLon,
    pub initial_zoom: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub max_bounds: GeoBounds,
    /// Zoom level after a successful location search.
    pub search_zoom: f64,
    /// Zoom levels removed after prediction results arrive.
    pub prediction_zoom_out: u32,
    pub data_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            server_url: "http://127.0.0.1:5000".into(),
            station_data_path: "/station_data".into(),
            run_model_path: "/run_model".into(),
            geocoder_url: "https://nominatim.openstreetmap.org/search".into(),
            tile_url: "https://tile.openstreetmap.org/{z}/{x}/{y}.png".into(),
            attribution: "© OpenStreetMap contributors".into(),
            user_agent: concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")).into(),
            time_mode: TimeMode::Date,
            marker_mode: MarkerMode::Algorithm,
            initial_center: LatLon::new(33.77, -84.40),
            initial_zoom: 10.0,
            min_zoom: 4.0,
            max_zoom: 15.0,
            max_bounds: GeoBounds::CONTINENTAL_US,
            search_zoom: 13.0,
            prediction_zoom_out: 3,
            data_file: None,
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    /// File (if given) first, then command-line overrides.
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let mut config = match &cli.config {
            Some(path) => Config::load(path)?,
            None => Config::default(),
        };
        if let Some(server) = &cli.server {
            config.server_url = server.clone();
        }
        if let Some(path) = &cli.data_file {
            config.data_file = Some(path.clone());
        }
        if let Some(mode) = cli.time_mode {
            config.time_mode = mode;
        }
        if let Some(mode) = cli.markers {
            config.marker_mode = mode;
        }
        Ok(config)
    }

    pub fn station_data_url(&self) -> String {
        join_url(&self.server_url, &self.station_data_path)
    }

    pub fn run_model_url(&self) -> String {
        join_url(&self.server_url, &self.run_model_path)
    }

    pub fn map_view(&self) -> MapView {
        MapView::new(
            self.initial_center,
            self.initial_zoom,
            self.min_zoom,
            self.max_zoom,
            self.max_bounds,
        )
    }
}

fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
