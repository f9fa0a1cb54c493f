use std::collections::BTreeSet;

use chrono::NaiveDate;

use crate::color::{station_style, MarkerMode, MarkerStyle};
use crate::config::Config;
use crate::data::filter::{filtered_indices, Cutoff, FilterPurpose, Viewport};
use crate::data::geocode::GeocodeHit;
use crate::data::model::StationDataset;
use crate::data::prediction::{nearest_station_miles, Prediction, PredictionRequest};
use crate::errors::ApiResult;
use crate::map_view::{LatLon, MapView};
use crate::markers::{MarkerId, MarkerLayer, MarkerRegistry};
use crate::requests::{Command, DataSource, Generation, Reply, RequestKind, RequestTracker};
use crate::time_control::{TimeControl, TimeMode};

pub const LOCATION_NOT_FOUND: &str = "Location not found";
pub const LOCATION_SEARCH_FAILED: &str = "An error occurred while searching for the location";

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// The map view controller: all UI state, independent of rendering.
///
/// Event handlers mutate it directly; network work is queued as
/// [`Command`]s for the app to dispatch, and the results come back through
/// [`AppState::handle_reply`].
pub struct AppState {
    /// Loaded dataset (None until the one-shot load succeeds).
    pub dataset: Option<StationDataset>,

    pub time: TimeControl,
    pub map: MapView,

    /// Bounds used by the last filter pass.
    pub viewport: Viewport,

    /// Indices of records passing the display filter (cached).
    pub visible_indices: Vec<usize>,

    pub markers: MarkerRegistry,
    pub marker_mode: MarkerMode,

    /// Marker whose popup is open.
    pub open_popup: Option<MarkerId>,

    /// City dropdown (year mode only).
    pub city_options: Vec<String>,
    pub selected_city: Option<String>,

    /// Contents of the location search box.
    pub search_text: String,

    /// Messages waiting to be acknowledged by the user.
    pub alerts: Vec<String>,

    /// Status / error message shown in the top bar.
    pub status_message: Option<String>,

    /// Whether the initial data load is still outstanding.
    pub loading: bool,

    search_zoom: f64,
    prediction_zoom_out: u32,
    requests: RequestTracker,
    outbox: Vec<Command>,
}

impl AppState {
    pub fn new(config: &Config) -> Self {
        let map = config.map_view();
        let viewport = map.viewport();
        Self {
            dataset: None,
            time: TimeControl::new(config.time_mode),
            map,
            viewport,
            visible_indices: Vec::new(),
            markers: MarkerRegistry::default(),
            marker_mode: config.marker_mode,
            open_popup: None,
            city_options: Vec::new(),
            selected_city: None,
            search_text: String::new(),
            alerts: Vec::new(),
            status_message: None,
            loading: false,
            search_zoom: config.search_zoom,
            prediction_zoom_out: config.prediction_zoom_out,
            requests: RequestTracker::default(),
            outbox: Vec::new(),
        }
    }

    /// Commands queued since the last call, for the dispatcher.
    pub fn take_commands(&mut self) -> Vec<Command> {
        std::mem::take(&mut self.outbox)
    }

    pub fn handle_reply(&mut self, reply: Reply) {
        match reply {
            Reply::Stations { generation, result } => self.apply_stations(generation, result),
            Reply::Prediction { generation, result } => self.apply_prediction(generation, result),
            Reply::Geocode {
                generation,
                query,
                result,
            } => self.apply_geocode(generation, &query, result),
        }
    }

    // -- Data loading --

    /// Start the one-shot dataset load.
    pub fn start_load(&mut self, source: DataSource) {
        let generation = self.requests.begin(RequestKind::Stations);
        self.loading = true;
        self.status_message = None;
        self.outbox.push(Command::LoadStations { generation, source });
    }

    fn apply_stations(&mut self, generation: Generation, result: anyhow::Result<StationDataset>) {
        if !self.requests.is_current(RequestKind::Stations, generation) {
            log::debug!("Dropping superseded station data reply");
            return;
        }
        match result {
            Ok(dataset) => {
                if dataset.is_empty() {
                    log::warn!("Station data contained no usable records");
                }
                log::info!(
                    "Loaded {} stations ({} predictions)",
                    dataset.len(),
                    dataset.prediction_count()
                );
                self.set_dataset(dataset);
            }
            Err(e) => {
                log::error!("Failed to load station data: {e:#}");
                self.status_message = Some(format!("Error: {e:#}"));
                self.loading = false;
            }
        }
    }

    /// Ingest a newly loaded dataset and render it.
    pub fn set_dataset(&mut self, dataset: StationDataset) {
        self.dataset = Some(dataset);
        self.status_message = None;
        self.loading = false;
        self.refresh();
        if self.time.mode() == TimeMode::Year {
            self.rebuild_city_options();
        }
    }

    // -- Viewport filter + marker renderer --

    /// The map finished moving: adopt its bounds and re-render.
    pub fn on_map_moved(&mut self) {
        self.refresh();
    }

    /// Recompute `visible_indices` and replace the viewport markers.
    pub fn refresh(&mut self) {
        self.viewport = self.map.viewport();
        let Some(ds) = &self.dataset else {
            return;
        };
        self.visible_indices =
            filtered_indices(ds, &self.viewport, self.time.cutoff(), FilterPurpose::Display);

        let mode = self.marker_mode;
        let markers = self.visible_indices.iter().filter_map(|&i| ds.get(i)).map(|rec| {
            (
                rec.latitude,
                rec.longitude,
                station_style(mode, &rec.algorithm),
                rec.popup_text(),
            )
        });
        self.markers.replace_viewport(markers);

        if let Some(id) = self.open_popup {
            if self.markers.layer_of(id).is_none() {
                self.open_popup = None;
            }
        }
        log::debug!(
            "Filter pass: {} of {} stations visible",
            self.visible_indices.len(),
            ds.len()
        );
    }

    // -- Time control --

    pub fn set_time_value(&mut self, value: i64) {
        self.time.set_value(value);
        self.after_time_change();
    }

    pub fn set_cutoff_date(&mut self, date: NaiveDate) {
        self.time.set_date(date);
        self.after_time_change();
    }

    fn after_time_change(&mut self) {
        self.refresh();
        if self.time.mode() == TimeMode::Year {
            self.rebuild_city_options();
        }
    }

    // -- City dropdown --

    /// Rebuild the dropdown from prediction rows of the selected year and
    /// search for the (possibly new) selection.
    pub fn rebuild_city_options(&mut self) {
        let Cutoff::Year(year) = self.time.cutoff() else {
            return;
        };
        let Some(ds) = &self.dataset else {
            return;
        };
        let options: BTreeSet<String> = ds
            .records()
            .iter()
            .filter(|r| !r.algorithm.is_original() && r.effective_year() == Some(year))
            .map(|r| r.city_state())
            .collect();
        self.city_options = options.into_iter().collect();

        let keep = self
            .selected_city
            .as_ref()
            .is_some_and(|c| self.city_options.contains(c));
        if !keep {
            self.selected_city = self.city_options.first().cloned();
        }
        if let Some(city) = self.selected_city.clone() {
            self.search_location(&city);
        }
    }

    pub fn select_city(&mut self, city: String) {
        self.selected_city = Some(city.clone());
        self.search_location(&city);
    }

    // -- Location search --

    pub fn search_location(&mut self, query: &str) {
        let query = query.trim();
        if query.is_empty() {
            self.alerts.push(LOCATION_NOT_FOUND.to_string());
            return;
        }
        let generation = self.requests.begin(RequestKind::Geocode);
        self.outbox.push(Command::Geocode {
            generation,
            query: query.to_string(),
        });
    }

    fn apply_geocode(&mut self, generation: Generation, query: &str, result: ApiResult<Vec<GeocodeHit>>) {
        if !self.requests.is_current(RequestKind::Geocode, generation) {
            log::debug!("Dropping superseded geocode reply for {query:?}");
            return;
        }
        match result {
            Ok(hits) => match hits.first() {
                Some(hit) => {
                    log::info!(
                        "Geocoded {query:?} to ({}, {}) {}",
                        hit.latitude,
                        hit.longitude,
                        hit.display_name.as_deref().unwrap_or_default()
                    );
                    self.map
                        .set_view(LatLon::new(hit.latitude, hit.longitude), self.search_zoom);
                    let pin = self.markers.add(
                        MarkerLayer::Overlay,
                        hit.latitude,
                        hit.longitude,
                        MarkerStyle::search_pin(),
                        query.to_string(),
                    );
                    self.open_popup = Some(pin);
                    self.refresh();
                }
                None => self.alerts.push(LOCATION_NOT_FOUND.to_string()),
            },
            Err(e) => {
                log::error!("Geocoding {query:?} failed: {e}");
                self.alerts.push(LOCATION_SEARCH_FAILED.to_string());
            }
        }
    }

    // -- Prediction request --

    /// Records that would be sent to the model right now.
    pub fn submission_indices(&self) -> Vec<usize> {
        match &self.dataset {
            Some(ds) => filtered_indices(
                ds,
                &self.map.viewport(),
                self.time.cutoff(),
                FilterPurpose::Submission,
            ),
            None => Vec::new(),
        }
    }

    /// Queue `POST /run_model` with the stations currently in view.
    /// A dataset is loaded and no reload is in flight.
    pub fn can_request_prediction(&self) -> bool {
        self.dataset.is_some() && !self.loading
    }

    pub fn request_prediction(&mut self) {
        if self.loading {
            log::debug!("Station data still loading; prediction request ignored");
            return;
        }
        let Some(ds) = &self.dataset else {
            self.status_message = Some("No station data loaded".into());
            return;
        };
        let request = PredictionRequest::from_indices(ds, &self.submission_indices());
        if request.is_empty() {
            log::warn!("No stations in view; submitting an empty station list");
        }
        let generation = self.requests.begin(RequestKind::Prediction);
        self.outbox.push(Command::RunModel {
            generation,
            request,
        });
    }

    fn apply_prediction(&mut self, generation: Generation, result: ApiResult<Vec<Prediction>>) {
        if !self.requests.is_current(RequestKind::Prediction, generation) {
            log::debug!("Dropping superseded prediction reply");
            return;
        }
        let predictions = match result {
            Ok(p) => p,
            Err(e) => {
                log::error!("Prediction request failed: {e}");
                return;
            }
        };

        let observed: Vec<usize> = match &self.dataset {
            Some(ds) => self
                .visible_indices
                .iter()
                .copied()
                .filter(|&i| ds.get(i).is_some_and(|r| r.algorithm.is_original()))
                .collect(),
            None => Vec::new(),
        };

        self.map.zoom_out(self.prediction_zoom_out);
        for p in predictions {
            let mut popup = format!("Prediction: {}", p.algorithm);
            let nearest = self.dataset.as_ref().and_then(|ds| {
                nearest_station_miles((p.latitude, p.longitude), ds, &observed)
            });
            if let Some(miles) = nearest {
                popup.push_str(&format!("\nNearest station: {miles:.1} mi"));
            }
            self.markers.add(
                MarkerLayer::Overlay,
                p.latitude,
                p.longitude,
                MarkerStyle::prediction_result(),
                popup,
            );
        }
        self.refresh();
    }

    /// Remove prediction results and search pins.
    pub fn clear_overlay(&mut self) {
        self.markers.clear_overlay();
        if let Some(id) = self.open_popup {
            if self.markers.layer_of(id).is_none() {
                self.open_popup = None;
            }
        }
    }

    pub fn dismiss_alert(&mut self) {
        if !self.alerts.is_empty() {
            self.alerts.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::PREDICTION_RESULT;
    use crate::data::model::{parse_open_date, Algorithm, StationRecord};
    use crate::errors::ApiError;

    fn rec(lat: f64, lon: f64, date: Option<&str>, year: Option<i32>, algo: Algorithm) -> StationRecord {
        StationRecord {
            latitude: lat,
            longitude: lon,
            name: "Station".into(),
            address: "1 Main St".into(),
            city: "Atlanta".into(),
            state: "GA".into(),
            open_date_raw: date.map(str::to_string),
            open_date: date.and_then(parse_open_date),
            year,
            algorithm: algo,
        }
    }

    fn city(mut r: StationRecord, city: &str, state: &str) -> StationRecord {
        r.city = city.into();
        r.state = state.into();
        r
    }

    fn state_with(mode: TimeMode, records: Vec<StationRecord>) -> AppState {
        let config = Config {
            time_mode: mode,
            ..Config::default()
        };
        let mut state = AppState::new(&config);
        state.set_dataset(StationDataset::from_records(records));
        state
    }

    fn assert_center(state: &AppState, expected: LatLon) {
        let c = state.map.center();
        assert!(
            (c.lat - expected.lat).abs() < 1e-6 && (c.lon - expected.lon).abs() < 1e-6,
            "center {c:?}, expected {expected:?}"
        );
    }

    fn geocode_generation(state: &mut AppState) -> Generation {
        match state.take_commands().pop() {
            Some(Command::Geocode { generation, .. }) => generation,
            other => panic!("expected geocode command, got {other:?}"),
        }
    }

    #[test]
    fn initial_load_goes_through_outbox() {
        let mut state = AppState::new(&Config::default());
        state.start_load(DataSource::Server);
        assert!(state.loading);
        let cmds = state.take_commands();
        assert!(matches!(
            cmds.as_slice(),
            [Command::LoadStations { source: DataSource::Server, .. }]
        ));
        assert!(state.take_commands().is_empty());
    }

    #[test]
    fn failed_load_leaves_dataset_empty() {
        let mut state = AppState::new(&Config::default());
        state.start_load(DataSource::Server);
        let generation = match state.take_commands().pop() {
            Some(Command::LoadStations { generation, .. }) => generation,
            other => panic!("{other:?}"),
        };
        state.handle_reply(Reply::Stations {
            generation,
            result: Err(anyhow::anyhow!("Response status: 500")),
        });
        assert!(!state.loading);
        assert!(state.dataset.is_none());
        assert!(state.status_message.is_some());
        state.on_map_moved();
        assert_eq!(state.markers.viewport_len(), 0);
    }

    #[test]
    fn viewport_markers_track_latest_filter() {
        let mut state = state_with(
            TimeMode::Date,
            vec![
                rec(33.77, -84.40, Some("2015-01-01"), None, Algorithm::Original),
                rec(33.78, -84.41, Some("2021-01-01"), None, Algorithm::Original),
                rec(40.0, -75.0, Some("2001-01-01"), None, Algorithm::Original),
            ],
        );
        assert_eq!(state.visible_indices, vec![0, 1]);
        assert_eq!(state.markers.viewport_len(), 2);

        state.set_cutoff_date(NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(state.markers.viewport_len(), 1);

        state.map.set_view(LatLon::new(40.0, -75.0), 10.0);
        state.on_map_moved();
        assert_eq!(state.visible_indices, vec![2]);
        assert_eq!(state.markers.viewport_len(), 1);

        state.set_time_value(0);
        assert_eq!(state.markers.viewport_len(), 0);
    }

    #[test]
    fn markers_colored_by_algorithm() {
        let state = state_with(
            TimeMode::Date,
            vec![
                rec(33.77, -84.40, Some("2015-01-01"), None, Algorithm::Original),
                rec(33.78, -84.40, Some("2015-01-01"), None, Algorithm::NoahS),
            ],
        );
        let colors: Vec<_> = state.markers.viewport_markers().map(|m| m.style.color).collect();
        assert_eq!(colors[0], crate::color::NEUTRAL);
        assert_eq!(colors[1], eframe::egui::Color32::BLACK);
        let popups: Vec<_> = state.markers.viewport_markers().map(|m| m.popup.clone()).collect();
        assert!(popups[1].contains("Algorithm: Noah_S"));
        assert!(!popups[0].contains("Algorithm"));
    }

    #[test]
    fn prediction_payload_uses_submission_filter() {
        let mut state = state_with(
            TimeMode::Year,
            vec![
                rec(33.77, -84.40, Some("2012-05-05"), Some(2012), Algorithm::Original),
                rec(33.78, -84.41, Some("2011-05-05"), Some(2011), Algorithm::Original),
            ],
        );
        state.take_commands();
        state.set_time_value(2012);
        state.take_commands();
        // Display excludes 2012, submission includes it.
        assert_eq!(state.visible_indices, vec![1]);

        state.request_prediction();
        match state.take_commands().as_slice() {
            [Command::RunModel { request, .. }] => {
                assert_eq!(
                    request.filtered_station_data,
                    vec![
                        (33.77, -84.40, Some("2012-05-05".to_string())),
                        (33.78, -84.41, Some("2011-05-05".to_string())),
                    ]
                );
            }
            other => panic!("{other:?}"),
        }
    }

    #[test]
    fn prediction_is_blocked_while_loading() {
        let mut state = state_with(
            TimeMode::Date,
            vec![rec(33.77, -84.40, Some("2015-01-01"), None, Algorithm::Original)],
        );
        assert!(state.can_request_prediction());

        state.start_load(DataSource::Server);
        state.take_commands();
        assert!(!state.can_request_prediction());
        state.request_prediction();
        assert!(state.take_commands().is_empty());

        let empty = AppState::new(&Config::default());
        assert!(!empty.can_request_prediction());
    }

    #[test]
    fn prediction_reply_adds_green_marker_and_zooms_out() {
        let mut state = state_with(
            TimeMode::Date,
            vec![rec(33.77, -84.40, Some("2015-01-01"), None, Algorithm::Original)],
        );
        let zoom_before = state.map.zoom();
        state.request_prediction();
        let generation = match state.take_commands().pop() {
            Some(Command::RunModel { generation, .. }) => generation,
            other => panic!("{other:?}"),
        };
        let result = crate::data::prediction::parse_prediction_response(r#"{"Frank":["34.1","-84.2"]}"#);
        state.handle_reply(Reply::Prediction { generation, result });

        assert_eq!(state.map.zoom(), zoom_before - 3.0);
        let overlay: Vec<_> = state.markers.overlay_markers().collect();
        assert_eq!(overlay.len(), 1);
        assert_eq!((overlay[0].latitude, overlay[0].longitude), (34.1, -84.2));
        assert_eq!(overlay[0].style.color, PREDICTION_RESULT);
        assert!(overlay[0].popup.contains("Frank"));
        assert!(overlay[0].popup.contains("Nearest station:"));

        // Later filter passes leave the prediction in place.
        state.set_time_value(0);
        state.on_map_moved();
        assert_eq!(state.markers.overlay_len(), 1);
        state.clear_overlay();
        assert_eq!(state.markers.overlay_len(), 0);
    }

    #[test]
    fn failed_prediction_changes_nothing() {
        let mut state = state_with(
            TimeMode::Date,
            vec![rec(33.77, -84.40, Some("2015-01-01"), None, Algorithm::Original)],
        );
        let zoom_before = state.map.zoom();
        state.request_prediction();
        let generation = match state.take_commands().pop() {
            Some(Command::RunModel { generation, .. }) => generation,
            other => panic!("{other:?}"),
        };
        let result = crate::data::prediction::parse_prediction_response("<html>500</html>");
        assert!(matches!(result, Err(ApiError::Decode(_))));
        state.handle_reply(Reply::Prediction { generation, result });
        assert_eq!(state.map.zoom(), zoom_before);
        assert_eq!(state.markers.overlay_len(), 0);
        assert!(state.alerts.is_empty());
    }

    #[test]
    fn stale_prediction_reply_is_discarded() {
        let mut state = state_with(TimeMode::Date, Vec::new());
        state.request_prediction();
        state.request_prediction();
        let cmds = state.take_commands();
        let gens: Vec<Generation> = cmds
            .iter()
            .map(|c| match c {
                Command::RunModel { generation, .. } => *generation,
                other => panic!("{other:?}"),
            })
            .collect();
        let zoom_before = state.map.zoom();
        state.handle_reply(Reply::Prediction {
            generation: gens[0],
            result: Ok(vec![Prediction {
                algorithm: "Frank".into(),
                latitude: 34.0,
                longitude: -84.0,
            }]),
        });
        assert_eq!(state.markers.overlay_len(), 0);
        assert_eq!(state.map.zoom(), zoom_before);

        state.handle_reply(Reply::Prediction {
            generation: gens[1],
            result: Ok(Vec::new()),
        });
        assert_eq!(state.map.zoom(), zoom_before - 3.0);
    }

    #[test]
    fn geocode_hit_recenters_and_pins() {
        let mut state = state_with(TimeMode::Date, Vec::new());
        state.search_location("Philadelphia");
        let generation = geocode_generation(&mut state);
        let result = crate::data::geocode::parse_geocode_response(r#"[{"lat":"40.0","lon":"-75.0"}]"#);
        state.handle_reply(Reply::Geocode {
            generation,
            query: "Philadelphia".into(),
            result,
        });
        assert_center(&state, LatLon::new(40.0, -75.0));
        assert_eq!(state.map.zoom(), 13.0);
        let pins: Vec<_> = state.markers.overlay_markers().collect();
        assert_eq!(pins.len(), 1);
        assert_eq!(pins[0].popup, "Philadelphia");
        assert_eq!(state.open_popup, Some(pins[0].id));
        assert!(state.viewport.contains(40.0, -75.0));
    }

    #[test]
    fn geocode_miss_alerts_and_keeps_view() {
        let mut state = state_with(TimeMode::Date, Vec::new());
        let (center_before, zoom_before) = (state.map.center(), state.map.zoom());
        state.search_location("Atlantis");
        let generation = geocode_generation(&mut state);
        state.handle_reply(Reply::Geocode {
            generation,
            query: "Atlantis".into(),
            result: Ok(Vec::new()),
        });
        assert_eq!(state.alerts, vec![LOCATION_NOT_FOUND.to_string()]);
        assert_eq!(state.map.center(), center_before);
        assert_eq!(state.map.zoom(), zoom_before);
        assert_eq!(state.markers.overlay_len(), 0);

        state.search_location("Nowhere");
        let generation = geocode_generation(&mut state);
        let result = crate::data::geocode::parse_geocode_response("not json");
        state.handle_reply(Reply::Geocode {
            generation,
            query: "Nowhere".into(),
            result,
        });
        assert_eq!(state.alerts.last().map(String::as_str), Some(LOCATION_SEARCH_FAILED));
        state.dismiss_alert();
        state.dismiss_alert();
        assert!(state.alerts.is_empty());
    }

    #[test]
    fn empty_search_alerts_without_request() {
        let mut state = state_with(TimeMode::Date, Vec::new());
        state.search_location("   ");
        assert!(state.take_commands().is_empty());
        assert_eq!(state.alerts, vec![LOCATION_NOT_FOUND.to_string()]);
    }

    #[test]
    fn late_geocode_reply_is_discarded() {
        let mut state = state_with(TimeMode::Date, Vec::new());
        state.search_location("Boston");
        let old = geocode_generation(&mut state);
        state.search_location("Denver");
        let new = geocode_generation(&mut state);
        state.handle_reply(Reply::Geocode {
            generation: old,
            query: "Boston".into(),
            result: Ok(vec![GeocodeHit {
                latitude: 42.36,
                longitude: -71.06,
                display_name: None,
            }]),
        });
        assert_eq!(state.markers.overlay_len(), 0);
        state.handle_reply(Reply::Geocode {
            generation: new,
            query: "Denver".into(),
            result: Ok(vec![GeocodeHit {
                latitude: 39.74,
                longitude: -104.99,
                display_name: None,
            }]),
        });
        assert_center(&state, LatLon::new(39.74, -104.99));
    }

    #[test]
    fn city_dropdown_lists_predictions_of_the_year() {
        let records = vec![
            city(rec(33.7, -84.4, None, Some(2018), Algorithm::Frank), "Atlanta", "GA"),
            city(rec(32.8, -83.6, None, Some(2018), Algorithm::NoahC), "Macon", "GA"),
            city(rec(32.8, -83.6, None, Some(2018), Algorithm::NoahS), "Macon", "GA"),
            city(rec(30.3, -81.6, None, Some(2019), Algorithm::Frank), "Jacksonville", "FL"),
            city(rec(35.2, -80.8, Some("2018-01-01"), Some(2018), Algorithm::Original), "Charlotte", "NC"),
        ];
        let mut state = state_with(TimeMode::Year, records);
        // Initial cutoff 2024 has no predictions.
        assert!(state.city_options.is_empty());
        assert_eq!(state.selected_city, None);
        assert!(state.take_commands().is_empty());

        state.set_time_value(2018);
        assert_eq!(state.city_options, vec!["Atlanta, GA", "Macon, GA"]);
        assert_eq!(state.selected_city.as_deref(), Some("Atlanta, GA"));
        assert!(matches!(
            state.take_commands().as_slice(),
            [Command::Geocode { query, .. }] if query == "Atlanta, GA"
        ));

        state.select_city("Macon, GA".into());
        state.take_commands();
        state.set_time_value(2018);
        assert_eq!(state.selected_city.as_deref(), Some("Macon, GA"));

        state.set_time_value(2019);
        assert_eq!(state.city_options, vec!["Jacksonville, FL"]);
        assert_eq!(state.selected_city.as_deref(), Some("Jacksonville, FL"));
    }

    #[test]
    fn date_mode_has_no_dropdown() {
        let mut state = state_with(
            TimeMode::Date,
            vec![city(rec(33.7, -84.4, None, Some(2018), Algorithm::Frank), "Atlanta", "GA")],
        );
        state.set_time_value(100);
        assert!(state.city_options.is_empty());
        assert!(state.take_commands().is_empty());
    }
}
