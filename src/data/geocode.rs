use serde_json::Value as JsonValue;

use super::model::number_like;
use crate::errors::ApiResult;

/// One Nominatim search result.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeHit {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: Option<String>,
}

/// Decode a Nominatim `format=json` search response.
///
/// Nominatim sends `lat`/`lon` as strings. Entries without a usable pair
/// are dropped, so an all-garbage array reads as "no results".
pub fn parse_geocode_response(body: &str) -> ApiResult<Vec<GeocodeHit>> {
    let hits: Vec<JsonValue> = serde_json::from_str(body)?;
    Ok(hits
        .iter()
        .filter_map(|hit| {
            let latitude = number_like(hit.get("lat")?)?;
            let longitude = number_like(hit.get("lon")?)?;
            let display_name = hit
                .get("display_name")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            Some(GeocodeHit {
                latitude,
                longitude,
                display_name,
            })
        })
        .collect())
}
