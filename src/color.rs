use eframe::egui::Color32;
use serde::Deserialize;

use crate::data::model::Algorithm;

// ---------------------------------------------------------------------------
// Marker styling
// ---------------------------------------------------------------------------

/// Leaflet's default path blue, used for observed stations.
pub const NEUTRAL: Color32 = Color32::from_rgb(0x33, 0x88, 0xff);
pub const PREDICTION_RESULT: Color32 = Color32::from_rgb(0x00, 0x80, 0x00);
pub const SEARCH_PIN: Color32 = Color32::from_rgb(0x2a, 0x81, 0xcb);

/// How station markers are drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum MarkerMode {
    /// Same pin for every record.
    Flat,
    /// Small circles colored by algorithm tag.
    #[default]
    Algorithm,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MarkerShape {
    Pin,
    Circle { radius: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarkerStyle {
    pub shape: MarkerShape,
    pub color: Color32,
}

impl MarkerStyle {
    pub const fn circle(radius: f32, color: Color32) -> Self {
        MarkerStyle {
            shape: MarkerShape::Circle { radius },
            color,
        }
    }

    pub const fn pin(color: Color32) -> Self {
        MarkerStyle {
            shape: MarkerShape::Pin,
            color,
        }
    }

    /// Style of a suggested location returned by `/run_model`.
    pub const fn prediction_result() -> Self {
        Self::circle(10.0, PREDICTION_RESULT)
    }

    pub const fn search_pin() -> Self {
        Self::pin(SEARCH_PIN)
    }
}

/// Fixed color for each algorithm tag. Unknown algorithms share Frank's red.
pub fn algorithm_color(algorithm: &Algorithm) -> Color32 {
    match algorithm {
        Algorithm::Original => NEUTRAL,
        Algorithm::Frank => Color32::RED,
        Algorithm::NoahC => Color32::GREEN,
        Algorithm::NoahS => Color32::BLACK,
        Algorithm::Other(_) => Color32::RED,
    }
}

/// Style of a viewport marker for a record with the given tag.
pub fn station_style(mode: MarkerMode, algorithm: &Algorithm) -> MarkerStyle {
    match mode {
        MarkerMode::Flat => MarkerStyle::pin(NEUTRAL),
        MarkerMode::Algorithm => MarkerStyle::circle(3.0, algorithm_color(algorithm)),
    }
}

/// Legend entries (label → colour) for the algorithm-colored mode.
pub fn legend_entries() -> Vec<(String, Color32)> {
    [
        Algorithm::Original,
        Algorithm::Frank,
        Algorithm::NoahC,
        Algorithm::NoahS,
    ]
    .iter()
    .map(|a| (a.to_string(), algorithm_color(a)))
    .chain(std::iter::once(("Prediction result".to_string(), PREDICTION_RESULT)))
    .collect()
}
