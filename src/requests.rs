//! Background requests and their replies.
//!
//! The UI thread never blocks: each [`Command`] runs on its own worker
//! thread and posts a [`Reply`] back over a channel that the app drains once
//! per frame. Every reply carries the [`Generation`] it was issued under so
//! that a late answer to a superseded request can be dropped.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver, Sender};

use eframe::egui;

use crate::api::StationApi;
use crate::data::geocode::GeocodeHit;
use crate::data::loader::load_file;
use crate::data::model::StationDataset;
use crate::data::prediction::{Prediction, PredictionRequest};
use crate::errors::ApiResult;

// ---------------------------------------------------------------------------
// Generations
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    Stations,
    Prediction,
    Geocode,
}

impl RequestKind {
    fn slot(self) -> usize {
        match self {
            RequestKind::Stations => 0,
            RequestKind::Prediction => 1,
            RequestKind::Geocode => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Generation(u64);

/// Latest generation issued per request kind.
#[derive(Debug, Default)]
pub struct RequestTracker {
    latest: [u64; 3],
}

impl RequestTracker {
    /// Issue a new generation, superseding any in-flight request of `kind`.
    pub fn begin(&mut self, kind: RequestKind) -> Generation {
        let slot = &mut self.latest[kind.slot()];
        *slot += 1;
        Generation(*slot)
    }

    pub fn is_current(&self, kind: RequestKind, generation: Generation) -> bool {
        self.latest[kind.slot()] == generation.0
    }
}

// ---------------------------------------------------------------------------
// Commands and replies
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    Server,
    File(PathBuf),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    LoadStations {
        generation: Generation,
        source: DataSource,
    },
    RunModel {
        generation: Generation,
        request: PredictionRequest,
    },
    Geocode {
        generation: Generation,
        query: String,
    },
}

#[derive(Debug)]
pub enum Reply {
    Stations {
        generation: Generation,
        result: anyhow::Result<StationDataset>,
    },
    Prediction {
        generation: Generation,
        result: ApiResult<Vec<Prediction>>,
    },
    Geocode {
        generation: Generation,
        query: String,
        result: ApiResult<Vec<GeocodeHit>>,
    },
}

/// Run a command to completion on the calling thread.
pub fn execute(api: &StationApi, command: Command) -> Reply {
    match command {
        Command::LoadStations { generation, source } => {
            let result = match source {
                DataSource::Server => api.fetch_stations(),
                DataSource::File(path) => load_file(&path),
            };
            Reply::Stations { generation, result }
        }
        Command::RunModel {
            generation,
            request,
        } => Reply::Prediction {
            generation,
            result: api.run_model(&request),
        },
        Command::Geocode { generation, query } => {
            let result = api.geocode(&query);
            Reply::Geocode {
                generation,
                query,
                result,
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

/// Spawns a worker per command and collects the replies.
pub struct Dispatcher {
    api: StationApi,
    tx: Sender<Reply>,
    rx: Receiver<Reply>,
    ctx: egui::Context,
}

impl Dispatcher {
    pub fn new(api: StationApi, ctx: egui::Context) -> Self {
        let (tx, rx) = mpsc::channel();
        Dispatcher { api, tx, rx, ctx }
    }

    pub fn dispatch(&self, command: Command) {
        let api = self.api.clone();
        let tx = self.tx.clone();
        let ctx = self.ctx.clone();
        std::thread::spawn(move || {
            let reply = execute(&api, command);
            // The receiver only goes away when the app is shutting down.
            if tx.send(reply).is_ok() {
                ctx.request_repaint();
            }
        });
    }

    /// Replies that arrived since the last call.
    pub fn drain(&self) -> Vec<Reply> {
        self.rx.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_generation_supersedes_old_one() {
        let mut t = RequestTracker::default();
        let first = t.begin(RequestKind::Geocode);
        assert!(t.is_current(RequestKind::Geocode, first));
        let second = t.begin(RequestKind::Geocode);
        assert!(!t.is_current(RequestKind::Geocode, first));
        assert!(t.is_current(RequestKind::Geocode, second));
    }

    #[test]
    fn kinds_are_tracked_independently() {
        let mut t = RequestTracker::default();
        let geo = t.begin(RequestKind::Geocode);
        let pred = t.begin(RequestKind::Prediction);
        t.begin(RequestKind::Prediction);
        assert!(t.is_current(RequestKind::Geocode, geo));
        assert!(!t.is_current(RequestKind::Prediction, pred));
    }

    #[test]
    fn execute_reads_local_files() {
        let path = std::env::temp_dir().join(format!("station-map-exec-{}.json", std::process::id()));
        std::fs::write(&path, r#"[{"Latitude": 34.0, "Longitude": -84.0}]"#).unwrap();
        let api = StationApi::new(&crate::config::Config::default()).unwrap();
        let mut t = RequestTracker::default();
        let generation = t.begin(RequestKind::Stations);
        let reply = execute(
            &api,
            Command::LoadStations {
                generation,
                source: DataSource::File(path.clone()),
            },
        );
        std::fs::remove_file(&path).ok();
        match reply {
            Reply::Stations { generation: g, result } => {
                assert_eq!(g, generation);
                assert_eq!(result.unwrap().len(), 1);
            }
            other => panic!("unexpected reply {other:?}"),
        }
    }
}
