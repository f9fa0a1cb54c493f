use serde::Serialize;
use serde_json::Value as JsonValue;

use super::model::{number_like, StationDataset};
use crate::errors::{ApiError, ApiResult};

// ---------------------------------------------------------------------------
// Request body
// ---------------------------------------------------------------------------

/// One station as sent to the model: `[Latitude, Longitude, "Open Date"]`.
pub type PayloadRow = (f64, f64, Option<String>);

/// Body of `POST /run_model`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionRequest {
    pub filtered_station_data: Vec<PayloadRow>,
}

impl PredictionRequest {
    /// Project the selected records to positional three-element rows.
    ///
    /// `Open Date` is forwarded as loaded, not re-formatted.
    pub fn from_indices(dataset: &StationDataset, indices: &[usize]) -> Self {
        let filtered_station_data = indices
            .iter()
            .filter_map(|&i| dataset.get(i))
            .map(|rec| {
                (rec.latitude, rec.longitude, rec.open_date_raw.clone())
            })
            .collect();
        PredictionRequest {
            filtered_station_data,
        }
    }

    pub fn len(&self) -> usize {
        self.filtered_station_data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.filtered_station_data.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Response
// ---------------------------------------------------------------------------

/// A suggested location returned by one algorithm.
#[derive(Debug, Clone, PartialEq)]
pub struct Prediction {
    pub algorithm: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Decode `{"<algorithm>": [lat, lon], ...}`.
///
/// Coordinates may be numbers or numeric strings. Any entry without a
/// usable pair rejects the whole response.
pub fn parse_prediction_response(body: &str) -> ApiResult<Vec<Prediction>> {
    let root: serde_json::Map<String, JsonValue> = serde_json::from_str(body)?;

    root.into_iter()
        .map(|(algorithm, value)| {
            let pair = value
                .as_array()
                .filter(|a| a.len() >= 2)
                .and_then(|a| Some((number_like(&a[0])?, number_like(&a[1])?)));
            match pair {
                Some((latitude, longitude)) => Ok(Prediction {
                    algorithm,
                    latitude,
                    longitude,
                }),
                None => Err(ApiError::BadCoordinate {
                    algorithm,
                    value: value.to_string(),
                }),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Distance to the existing network
// ---------------------------------------------------------------------------

const EARTH_RADIUS_MILES: f64 = 3958.8;

/// Great-circle distance in miles between two `(lat, lon)` points.
pub fn haversine_miles(a: (f64, f64), b: (f64, f64)) -> f64 {
    let (lat1, lon1) = (a.0.to_radians(), a.1.to_radians());
    let (lat2, lon2) = (b.0.to_radians(), b.1.to_radians());
    let dlat = lat2 - lat1;
    let dlon = lon2 - lon1;
    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_MILES * h.sqrt().asin()
}

/// Distance from `point` to the closest of the given records, if any.
pub fn nearest_station_miles(
    point: (f64, f64),
    dataset: &StationDataset,
    indices: &[usize],
) -> Option<f64> {
    indices
        .iter()
        .filter_map(|&i| dataset.get(i))
        .map(|rec| haversine_miles(point, (rec.latitude, rec.longitude)))
        .min_by(|a, b| a.total_cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::{parse_open_date, Algorithm, StationRecord};

    fn station(lat: f64, lon: f64, date: Option<&str>) -> StationRecord {
        StationRecord {
            latitude: lat,
            longitude: lon,
            name: "Name".into(),
            address: "Addr".into(),
            city: "Atlanta".into(),
            state: "GA".into(),
            open_date_raw: date.map(str::to_string),
            open_date: date.and_then(parse_open_date),
            year: Some(2015),
            algorithm: Algorithm::Original,
        }
    }

    #[test]
    fn payload_rows_are_positional_triples() {
        let ds = StationDataset::from_records(vec![
            station(34.0, -84.0, Some("2015-01-01")),
            station(33.5, -84.5, None),
            station(10.0, 10.0, Some("2001-02-03")),
        ]);
        let req = PredictionRequest::from_indices(&ds, &[0, 1]);
        assert_eq!(req.len(), 2);

        let body = serde_json::to_value(&req).unwrap();
        let obj = body.as_object().unwrap();
        assert_eq!(obj.len(), 1);
        assert_eq!(
            obj["filtered_station_data"],
            serde_json::json!([[34.0, -84.0, "2015-01-01"], [33.5, -84.5, null]])
        );
    }

    #[test]
    fn payload_forwards_open_date_verbatim() {
        let ds = StationDataset::from_records(vec![
            station(34.0, -84.0, Some("06/15/2012")),
            station(34.0, -84.0, Some("2012-06-15 00:00:00")),
        ]);
        let req = PredictionRequest::from_indices(&ds, &[0, 1]);
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"filtered_station_data":[[34.0,-84.0,"06/15/2012"],[34.0,-84.0,"2012-06-15 00:00:00"]]}"#
        );
    }

    #[test]
    fn empty_selection_sends_empty_array() {
        let ds = StationDataset::from_records(vec![station(34.0, -84.0, None)]);
        let req = PredictionRequest::from_indices(&ds, &[]);
        assert!(req.is_empty());
        assert_eq!(
            serde_json::to_string(&req).unwrap(),
            r#"{"filtered_station_data":[]}"#
        );
    }

    #[test]
    fn response_coerces_string_coordinates() {
        let preds = parse_prediction_response(r#"{"Frank":["34.1","-84.2"],"Noah_C":[33.9,-84.4]}"#)
            .unwrap();
        assert_eq!(
            preds,
            vec![
                Prediction {
                    algorithm: "Frank".into(),
                    latitude: 34.1,
                    longitude: -84.2
                },
                Prediction {
                    algorithm: "Noah_C".into(),
                    latitude: 33.9,
                    longitude: -84.4
                },
            ]
        );
    }

    #[test]
    fn response_with_bad_pair_is_rejected() {
        let err = parse_prediction_response(r#"{"Frank":["north", 1]}"#).unwrap_err();
        assert!(matches!(err, ApiError::BadCoordinate { ref algorithm, .. } if algorithm == "Frank"));
        assert!(matches!(
            parse_prediction_response("<html>oops</html>"),
            Err(ApiError::Decode(_))
        ));
        assert!(matches!(
            parse_prediction_response("[1, 2]"),
            Err(ApiError::Decode(_))
        ));
    }

    #[test]
    fn haversine_known_distance() {
        // Atlanta to Macon is roughly 76 miles.
        let d = haversine_miles((33.749, -84.388), (32.8407, -83.6324));
        assert!((d - 76.4).abs() < 1.0, "got {d}");
        assert_eq!(haversine_miles((34.0, -84.0), (34.0, -84.0)), 0.0);
    }

    #[test]
    fn nearest_station_uses_given_indices_only() {
        let ds = StationDataset::from_records(vec![
            station(34.0, -84.0, None),
            station(34.1, -84.2, None),
        ]);
        let near = nearest_station_miles((34.1, -84.2), &ds, &[0, 1]).unwrap();
        assert!(near < 1e-9);
        let far = nearest_station_miles((34.1, -84.2), &ds, &[0]).unwrap();
        assert!(far > 5.0);
        assert_eq!(nearest_station_miles((34.1, -84.2), &ds, &[]), None);
    }
}
