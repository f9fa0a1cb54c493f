use std::sync::{Arc, Mutex};

use eframe::egui::{self, Align2, Color32, Pos2, RichText, Stroke, Ui};
use walkers::sources::{Attribution, TileSource};
use walkers::{lat_lon, HttpTiles, Map, Plugin, Projector, TileId};

use crate::color::{MarkerShape, MarkerStyle};
use crate::markers::{hit_test, Marker, MarkerId};
use crate::state::AppState;

/// Click tolerance around a marker, in screen points.
const HIT_RADIUS_PX: f32 = 8.0;
const PIN_RADIUS: f32 = 6.0;
const PIN_HEIGHT: f32 = 16.0;

/// Raster tiles addressed by a `{z}/{x}/{y}` URL template.
pub struct TemplateTiles {
    url_template: String,
    attribution: &'static str,
}

impl TemplateTiles {
    pub fn new(url_template: &str, attribution: &str) -> Self {
        // `Attribution` wants a 'static string; built once at startup.
        let attribution: &'static str = Box::leak(attribution.to_owned().into_boxed_str());
        TemplateTiles {
            url_template: url_template.to_owned(),
            attribution,
        }
    }

    pub fn attribution_text(&self) -> &'static str {
        self.attribution
    }
}

impl TileSource for TemplateTiles {
    fn tile_url(&self, tile_id: TileId) -> String {
        self.url_template
            .replace("{z}", &tile_id.zoom.to_string())
            .replace("{x}", &tile_id.x.to_string())
            .replace("{y}", &tile_id.y.to_string())
    }

    fn attribution(&self) -> Attribution {
        Attribution {
            text: self.attribution,
            url: "",
            logo_light: None,
            logo_dark: None,
        }
    }
}

// ---------------------------------------------------------------------------
// Map (central panel)
// ---------------------------------------------------------------------------

/// What the marker layer saw during one frame.
#[derive(Default)]
struct MarkerFeedback {
    /// `Some(hit)` when the map was clicked; `hit` is `None` on empty ground.
    clicked: Option<Option<MarkerId>>,
    popup_anchor: Option<Pos2>,
}

/// Draws station and overlay markers through the map's projector.
struct StationMarkers {
    overlay: Vec<Marker>,
    viewport: Vec<Marker>,
    open_popup: Option<MarkerId>,
    feedback: Arc<Mutex<MarkerFeedback>>,
}

impl Plugin for StationMarkers {
    fn run(self: Box<Self>, ui: &mut Ui, response: &egui::Response, projector: &Projector) {
        let to_screen = |m: &Marker| {
            let v = projector.project(lat_lon(m.latitude, m.longitude));
            egui::pos2(v.x, v.y)
        };

        let painter = ui.painter().with_clip_rect(response.rect);
        for m in self.viewport.iter().chain(&self.overlay) {
            paint_marker(&painter, to_screen(m), m.style);
        }

        let mut feedback = MarkerFeedback::default();
        if response.clicked() {
            if let Some(click) = response.interact_pointer_pos() {
                let hit = hit_test(&self.overlay, &self.viewport, click, HIT_RADIUS_PX, to_screen);
                feedback.clicked = Some(hit.map(|m| m.id));
            }
        }
        feedback.popup_anchor = self
            .open_popup
            .and_then(|id| self.overlay.iter().chain(&self.viewport).find(|m| m.id == id))
            .map(to_screen);

        if let Ok(mut slot) = self.feedback.lock() {
            *slot = feedback;
        }
    }
}

fn paint_marker(painter: &egui::Painter, at: Pos2, style: MarkerStyle) {
    match style.shape {
        MarkerShape::Circle { radius } => {
            painter.circle(at, radius, style.color, Stroke::new(1.0, Color32::from_black_alpha(120)));
        }
        MarkerShape::Pin => {
            let head = at - egui::vec2(0.0, PIN_HEIGHT);
            painter.add(egui::Shape::convex_polygon(
                vec![
                    head + egui::vec2(-PIN_RADIUS * 0.8, PIN_RADIUS * 0.5),
                    head + egui::vec2(PIN_RADIUS * 0.8, PIN_RADIUS * 0.5),
                    at,
                ],
                style.color,
                Stroke::NONE,
            ));
            painter.circle_filled(head, PIN_RADIUS, style.color);
            painter.circle_filled(head, PIN_RADIUS * 0.4, Color32::WHITE);
        }
    }
}

/// Render the map with tiles and markers, and feed user pans/zooms and
/// marker clicks back into the state.
pub fn station_map(ui: &mut Ui, state: &mut AppState, tiles: &mut HttpTiles, attribution: &str) {
    let feedback = Arc::new(Mutex::new(MarkerFeedback::default()));
    let markers = StationMarkers {
        overlay: state.markers.overlay_markers().cloned().collect(),
        viewport: state.markers.viewport_markers().cloned().collect(),
        open_popup: state.open_popup,
        feedback: feedback.clone(),
    };

    let home = state.map.home();
    let response = ui.add(Map::new(Some(tiles), state.map.memory_mut(), home).with_plugin(markers));

    let resized = state.map.set_size(response.rect.size());
    state.map.enforce_limits();

    // "moveend": re-filter once a gesture settles on a new viewport.
    let settled = !response.dragged() && !ui.input(|i| i.pointer.any_down());
    if resized || (settled && state.map.viewport() != state.viewport) {
        state.on_map_moved();
    }

    let (clicked, popup_anchor) = feedback
        .lock()
        .map(|f| (f.clicked, f.popup_anchor))
        .unwrap_or_default();
    if let Some(hit) = clicked {
        state.open_popup = hit;
    }
    if let Some(anchor) = popup_anchor {
        marker_popup(ui.ctx(), state, anchor);
    }

    paint_attribution(ui, response.rect, attribution);
}

fn marker_popup(ctx: &egui::Context, state: &mut AppState, anchor: Pos2) {
    let Some(text) = state
        .open_popup
        .and_then(|id| state.markers.get(id))
        .map(|m| m.popup.clone())
    else {
        return;
    };
    let mut close = false;
    egui::Area::new(egui::Id::new("marker_popup"))
        .fixed_pos(anchor + egui::vec2(8.0, -8.0))
        .pivot(Align2::LEFT_BOTTOM)
        .order(egui::Order::Foreground)
        .show(ctx, |ui: &mut Ui| {
            egui::Frame::popup(ui.style()).show(ui, |ui: &mut Ui| {
                ui.horizontal(|ui: &mut Ui| {
                    ui.label(RichText::new(text).strong());
                    if ui.small_button("✕").clicked() {
                        close = true;
                    }
                });
            });
        });
    if close {
        state.open_popup = None;
    }
}

fn paint_attribution(ui: &mut Ui, map_rect: egui::Rect, text: &str) {
    let painter = ui.painter_at(map_rect);
    let pos = map_rect.right_bottom() - egui::vec2(4.0, 4.0);
    let galley = painter.layout_no_wrap(
        text.to_string(),
        egui::FontId::proportional(11.0),
        Color32::from_gray(40),
    );
    let rect = Align2::RIGHT_BOTTOM.anchor_size(pos, galley.size()).expand(2.0);
    painter.rect_filled(rect, 2.0, Color32::from_white_alpha(200));
    painter.galley(rect.min + egui::vec2(2.0, 2.0), galley, Color32::from_gray(40));
}
