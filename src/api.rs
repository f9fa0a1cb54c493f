//! Blocking HTTP client for the station server and the geocoder.
//!
//! Calls are made from worker threads (see `requests`), never from the UI
//! thread.

use anyhow::Context;
use reqwest::blocking::{Client, Response};

use crate::config::Config;
use crate::data::geocode::{parse_geocode_response, GeocodeHit};
use crate::data::loader::parse_station_json;
use crate::data::model::StationDataset;
use crate::data::prediction::{parse_prediction_response, Prediction, PredictionRequest};
use crate::errors::{ApiError, ApiResult};

#[derive(Debug, Clone)]
pub struct StationApi {
    client: Client,
    station_data_url: String,
    run_model_url: String,
    geocoder_url: String,
}

impl StationApi {
    pub fn new(config: &Config) -> ApiResult<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Client)?;
        Ok(StationApi {
            client,
            station_data_url: config.station_data_url(),
            run_model_url: config.run_model_url(),
            geocoder_url: config.geocoder_url.clone(),
        })
    }

    /// `GET /station_data`.
    pub fn fetch_stations(&self) -> anyhow::Result<StationDataset> {
        let url = &self.station_data_url;
        log::info!("Fetching station data from {url}");
        let response = self.client.get(url).send().map_err(|e| transport(url, e))?;
        let body = read_body(url, response)?;
        let records = parse_station_json(&body).with_context(|| format!("decoding {url}"))?;
        Ok(StationDataset::from_records(records))
    }

    /// `POST /run_model` with the filtered stations.
    pub fn run_model(&self, request: &PredictionRequest) -> ApiResult<Vec<Prediction>> {
        let url = &self.run_model_url;
        log::info!("Submitting {} stations to {url}", request.len());
        let response = self
            .client
            .post(url)
            .json(request)
            .send()
            .map_err(|e| transport(url, e))?;
        parse_prediction_response(&read_body(url, response)?)
    }

    /// Nominatim free-text search.
    pub fn geocode(&self, query: &str) -> ApiResult<Vec<GeocodeHit>> {
        let url = &self.geocoder_url;
        log::info!("Geocoding {query:?}");
        let response = self
            .client
            .get(url)
            .query(&[("format", "json"), ("q", query)])
            .send()
            .map_err(|e| transport(url, e))?;
        parse_geocode_response(&read_body(url, response)?)
    }
}

fn transport(url: &str, source: reqwest::Error) -> ApiError {
    ApiError::Transport {
        url: url.to_string(),
        source,
    }
}

fn read_body(url: &str, response: Response) -> ApiResult<String> {
    let status = response.status();
    if !status.is_success() {
        return Err(ApiError::Status {
            url: url.to_string(),
            status,
        });
    }
    response.text().map_err(|e| transport(url, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::TcpListener;
    use std::thread::JoinHandle;

    /// Serve exactly one HTTP response on a loopback port; the join handle
    /// yields the raw request (head and body) that was received.
    fn serve_once(status: &str, body: &str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let response = format!(
            "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
            body.len()
        );
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream);
            let mut head = String::new();
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if let Some(v) = line.to_ascii_lowercase().strip_prefix("content-length:") {
                    content_length = v.trim().parse().unwrap();
                }
                let done = line == "\r\n";
                head.push_str(&line);
                if done {
                    break;
                }
            }
            let mut body = vec![0u8; content_length];
            reader.read_exact(&mut body).unwrap();
            let mut stream = reader.into_inner();
            stream.write_all(response.as_bytes()).unwrap();
            stream.flush().unwrap();
            head + &String::from_utf8_lossy(&body)
        });
        (format!("http://{addr}"), handle)
    }

    fn api_for(base: &str) -> StationApi {
        let config = Config {
            server_url: base.to_string(),
            geocoder_url: format!("{base}/search"),
            ..Config::default()
        };
        StationApi::new(&config).unwrap()
    }

    #[test]
    fn fetch_stations_ok() {
        let (base, server) = serve_once(
            "200 OK",
            r#"[{"Latitude":34.0,"Longitude":-84.0,"Open Date":"2015-01-01","City":"Atlanta","State":"GA"}]"#,
        );
        let ds = api_for(&base).fetch_stations().unwrap();
        let request = server.join().unwrap();
        assert!(request.starts_with("GET /station_data "));
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records()[0].city, "Atlanta");
    }

    #[test]
    fn fetch_stations_error_status() {
        let (base, server) = serve_once("500 Internal Server Error", "{}");
        let err = api_for(&base).fetch_stations().unwrap_err();
        server.join().unwrap();
        let api_err = err.downcast_ref::<ApiError>().unwrap();
        assert!(matches!(api_err, ApiError::Status { status, .. } if status.as_u16() == 500));
    }

    #[test]
    fn run_model_posts_json_payload() {
        let (base, server) = serve_once("200 OK", r#"{"Frank":["34.1","-84.2"]}"#);
        let request = PredictionRequest {
            filtered_station_data: vec![(34.0, -84.0, Some("2015-01-01".into()))],
        };
        let preds = api_for(&base).run_model(&request).unwrap();
        let raw = server.join().unwrap();
        assert!(raw.starts_with("POST /run_model "));
        assert!(raw.to_ascii_lowercase().contains("content-type: application/json"));
        assert!(raw.ends_with(r#"{"filtered_station_data":[[34.0,-84.0,"2015-01-01"]]}"#));
        assert_eq!(preds.len(), 1);
        assert_eq!(preds[0].algorithm, "Frank");
        assert_eq!(preds[0].latitude, 34.1);
    }

    #[test]
    fn geocode_sends_query() {
        let (base, server) = serve_once("200 OK", r#"[{"lat":"40.0","lon":"-75.0"}]"#);
        let hits = api_for(&base).geocode("Philadelphia PA").unwrap();
        let raw = server.join().unwrap();
        assert!(raw.starts_with("GET /search?format=json&q=Philadelphia+PA "));
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn unreachable_server_is_transport_error() {
        // Bind and drop to get a port nobody is listening on.
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let err = api_for(&format!("http://127.0.0.1:{port}"))
            .geocode("x")
            .unwrap_err();
        assert!(matches!(err, ApiError::Transport { .. }));
    }
}
