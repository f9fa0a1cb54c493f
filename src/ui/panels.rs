use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::color::{legend_entries, MarkerMode};
use crate::data::filter::Cutoff;
use crate::requests::DataSource;
use crate::state::AppState;
use crate::time_control::TimeMode;

// ---------------------------------------------------------------------------
// Left side panel – time, search and model controls
// ---------------------------------------------------------------------------

/// Render the left control panel.
pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Stations");
    ui.separator();

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            time_controls(ui, state);
            ui.separator();

            if state.time.mode() == TimeMode::Year {
                city_dropdown(ui, state);
                ui.separator();
            }

            location_search(ui, state);
            ui.separator();

            ui.strong("Model");
            ui.horizontal(|ui: &mut Ui| {
                let ready = state.can_request_prediction();
                if ui
                    .add_enabled(ready, egui::Button::new("Send to model"))
                    .on_hover_text("Submit the stations in view to /run_model")
                    .clicked()
                {
                    state.request_prediction();
                }
                if ui.button("Clear predictions").clicked() {
                    state.clear_overlay();
                }
            });

            if state.marker_mode == MarkerMode::Algorithm {
                ui.separator();
                legend(ui);
            }
        });
}

fn time_controls(ui: &mut Ui, state: &mut AppState) {
    ui.strong(state.time.title());

    let mut value = state.time.value();
    let slider = egui::Slider::new(&mut value, state.time.range())
        .show_value(false)
        .smart_aim(false);
    if ui.add(slider).changed() {
        state.set_time_value(value);
    }
    ui.label(state.time.label());

    if let Cutoff::Date(mut date) = state.time.cutoff() {
        let before = date;
        ui.add(egui_extras::DatePickerButton::new(&mut date).id_salt("cutoff_date"));
        if date != before {
            state.set_cutoff_date(date);
        }
    }
}

fn city_dropdown(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Predicted cities");
    if state.city_options.is_empty() {
        ui.label("No predictions for this year.");
        return;
    }
    let current = state.selected_city.clone().unwrap_or_default();
    let mut picked = None;
    egui::ComboBox::from_id_salt("city_select")
        .selected_text(&current)
        .width(ui.available_width() * 0.9)
        .show_ui(ui, |ui: &mut Ui| {
            for city in &state.city_options {
                if ui.selectable_label(current == *city, city).clicked() {
                    picked = Some(city.clone());
                }
            }
        });
    if let Some(city) = picked {
        state.select_city(city);
    }
}

fn location_search(ui: &mut Ui, state: &mut AppState) {
    ui.strong("Search location");
    let mut submit = false;
    ui.horizontal(|ui: &mut Ui| {
        let edit = ui.add(
            egui::TextEdit::singleline(&mut state.search_text)
                .hint_text("City, address…")
                .desired_width(ui.available_width() - 60.0),
        );
        if edit.lost_focus() && ui.input(|i| i.key_pressed(egui::Key::Enter)) {
            submit = true;
        }
        if ui.button("Search").clicked() {
            submit = true;
        }
    });
    if submit {
        let query = state.search_text.clone();
        state.search_location(&query);
    }
}

fn legend(ui: &mut Ui) {
    ui.strong("Legend");
    for (label, color) in legend_entries() {
        ui.horizontal(|ui: &mut Ui| {
            let (rect, _) = ui.allocate_exact_size(egui::vec2(12.0, 12.0), egui::Sense::hover());
            ui.painter().circle_filled(rect.center(), 5.0, color);
            ui.label(label);
        });
    }
}

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            if ui.button("Reload from server").clicked() {
                state.start_load(DataSource::Server);
                ui.close_menu();
            }
        });

        ui.separator();

        if let Some(ds) = &state.dataset {
            let vp = &state.viewport;
            ui.label(format!(
                "{} stations loaded, {} visible",
                ds.len(),
                state.markers.viewport_len()
            ))
            .on_hover_text(format!(
                "N {:.4}  S {:.4}  E {:.4}  W {:.4}",
                vp.north, vp.south, vp.east, vp.west
            ));
        }
        let overlays = state.markers.overlay_len();
        if overlays > 0 {
            ui.label(format!("{overlays} pinned"));
        }

        ui.separator();

        if ui.button("➕").on_hover_text("Zoom in").clicked() {
            state.map.zoom_by(1.0);
            state.refresh();
        }
        if ui.button("➖").on_hover_text("Zoom out").clicked() {
            state.map.zoom_by(-1.0);
            state.refresh();
        }
        ui.label(format!("zoom {:.1}", state.map.zoom()));

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Modal feedback
// ---------------------------------------------------------------------------

/// Show the oldest pending alert until it is acknowledged.
pub fn alert_window(ctx: &egui::Context, state: &mut AppState) {
    let Some(message) = state.alerts.first().cloned() else {
        return;
    };
    let mut dismissed = false;
    egui::Window::new("Notice")
        .collapsible(false)
        .resizable(false)
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .show(ctx, |ui: &mut Ui| {
            ui.label(message);
            ui.add_space(6.0);
            ui.vertical_centered(|ui: &mut Ui| {
                if ui.button("OK").clicked() {
                    dismissed = true;
                }
            });
        });
    if dismissed {
        state.dismiss_alert();
    }
}

/// Spinner over the map while the dataset is loading.
pub fn loading_overlay(ctx: &egui::Context, state: &AppState) {
    if !state.loading {
        return;
    }
    egui::Area::new(egui::Id::new("loading_overlay"))
        .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
        .order(egui::Order::Foreground)
        .show(ctx, |ui: &mut Ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.spinner();
                    ui.label("Loading station data…");
                });
            });
        });
}

// ---------------------------------------------------------------------------
// File dialog
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open station data")
        .add_filter("Supported files", &["parquet", "pq", "json", "csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .add_filter("JSON", &["json"])
        .add_filter("CSV", &["csv"])
        .pick_file();

    if let Some(path) = file {
        log::info!("Loading stations from {}", path.display());
        state.start_load(DataSource::File(path));
    }
}
