mod api;
mod app;
mod color;
mod config;
mod data;
mod errors;
mod map_view;
mod markers;
mod requests;
mod state;
mod time_control;
mod ui;

use app::StationMapApp;
use clap::Parser;
use config::{Cli, Config};
use eframe::egui;

fn main() -> eframe::Result {
    env_logger::init();

    let cli = Cli::parse();
    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            log::error!("Invalid configuration: {e:#}");
            eprintln!("error: {e:#}");
            std::process::exit(2);
        }
    };
    log::info!(
        "Server {} ({} mode, {:?} markers)",
        config.server_url,
        config.time_mode,
        config.marker_mode
    );

    let options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1200.0, 800.0])
            .with_min_inner_size([600.0, 400.0]),
        ..Default::default()
    };

    eframe::run_native(
        "Station Map – EV Charging Stations",
        options,
        Box::new(move |cc| {
            let app = StationMapApp::new(cc, config)?;
            Ok(Box::new(app))
        }),
    )
}
