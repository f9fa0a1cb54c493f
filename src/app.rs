use eframe::egui;
use walkers::HttpTiles;

use crate::api::StationApi;
use crate::config::Config;
use crate::requests::{DataSource, Dispatcher};
use crate::state::AppState;
use crate::ui::map::{station_map, TemplateTiles};
use crate::ui::panels;

// ---------------------------------------------------------------------------
// eframe App implementation
// ---------------------------------------------------------------------------

pub struct StationMapApp {
    pub state: AppState,
    dispatcher: Dispatcher,
    tiles: HttpTiles,
    attribution: &'static str,
}

impl StationMapApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: Config) -> anyhow::Result<Self> {
        let tile_source = TemplateTiles::new(&config.tile_url, &config.attribution);
        let attribution = tile_source.attribution_text();
        let tiles = HttpTiles::new(tile_source, cc.egui_ctx.clone());

        let api = StationApi::new(&config)?;
        let dispatcher = Dispatcher::new(api, cc.egui_ctx.clone());
        let mut state = AppState::new(&config);

        let source = match &config.data_file {
            Some(path) => DataSource::File(path.clone()),
            None => DataSource::Server,
        };
        log::info!("Loading stations from {source:?}");
        state.start_load(source);

        let mut app = Self {
            state,
            dispatcher,
            tiles,
            attribution,
        };
        app.flush_commands();
        Ok(app)
    }

    fn flush_commands(&mut self) {
        for command in self.state.take_commands() {
            self.dispatcher.dispatch(command);
        }
    }
}

impl eframe::App for StationMapApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        for reply in self.dispatcher.drain() {
            self.state.handle_reply(reply);
        }

        // ---- Top panel: menu bar ----
        egui::TopBottomPanel::top("top_bar").show(ctx, |ui| {
            panels::top_bar(ui, &mut self.state);
        });

        // ---- Left side panel: controls ----
        egui::SidePanel::left("control_panel")
            .default_width(240.0)
            .resizable(true)
            .show(ctx, |ui| {
                panels::side_panel(ui, &mut self.state);
            });

        // ---- Central panel: map ----
        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                station_map(ui, &mut self.state, &mut self.tiles, self.attribution);
            });

        panels::loading_overlay(ctx, &self.state);
        panels::alert_window(ctx, &mut self.state);

        self.flush_commands();
    }
}
