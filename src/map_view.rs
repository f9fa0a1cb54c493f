//! Center/zoom state of the map widget.
//!
//! The state itself lives in a `walkers::MapMemory`, which the widget
//! mutates while the user drags and scrolls. `MapView` adds the limits the
//! viewer imposes (zoom range, pannable bounds) and derives the filter
//! viewport through a `walkers::Projector`, so it also works before the
//! first frame is drawn.

use eframe::egui::{Pos2, Rect, Vec2};
use serde::Deserialize;
use walkers::{lat_lon, MapMemory, Position, Projector};

use crate::data::filter::Viewport;

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    pub const fn new(lat: f64, lon: f64) -> Self {
        LatLon { lat, lon }
    }

    pub fn position(self) -> Position {
        lat_lon(self.lat, self.lon)
    }

    /// `Position` is a `(lon, lat)` point.
    pub fn from_position(p: Position) -> Self {
        LatLon::new(p.y(), p.x())
    }
}

/// Rectangle the map center may not leave.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct GeoBounds {
    pub south_west: LatLon,
    pub north_east: LatLon,
}

impl GeoBounds {
    /// Approximate continental-US box.
    pub const CONTINENTAL_US: GeoBounds = GeoBounds {
        south_west: LatLon::new(24.396308, -125.0),
        north_east: LatLon::new(49.384358, -66.93457),
    };

    fn clamp(&self, p: LatLon) -> LatLon {
        LatLon {
            lat: p.lat.clamp(self.south_west.lat, self.north_east.lat),
            lon: p.lon.clamp(self.south_west.lon, self.north_east.lon),
        }
    }
}

pub struct MapView {
    memory: MapMemory,
    /// Position handed to the widget; the view is always detached from it.
    home: Position,
    min_zoom: f64,
    max_zoom: f64,
    max_bounds: GeoBounds,
    /// Widget size in points, as of the last frame.
    size: Vec2,
}

impl MapView {
    pub fn new(center: LatLon, zoom: f64, min_zoom: f64, max_zoom: f64, max_bounds: GeoBounds) -> Self {
        let mut view = MapView {
            memory: MapMemory::default(),
            home: max_bounds.clamp(center).position(),
            min_zoom,
            max_zoom,
            max_bounds,
            size: Vec2::new(1024.0, 768.0),
        };
        view.set_view(center, zoom);
        view
    }

    pub fn home(&self) -> Position {
        self.home
    }

    /// Widget state for `walkers::Map`.
    pub fn memory_mut(&mut self) -> &mut MapMemory {
        &mut self.memory
    }

    pub fn center(&self) -> LatLon {
        LatLon::from_position(self.memory.detached().unwrap_or(self.home))
    }

    pub fn zoom(&self) -> f64 {
        self.memory.zoom()
    }

    /// Recenter and zoom, clamped to the zoom range and pannable bounds.
    pub fn set_view(&mut self, center: LatLon, zoom: f64) {
        self.memory.center_at(self.max_bounds.clamp(center).position());
        self.set_zoom(zoom);
    }

    fn set_zoom(&mut self, zoom: f64) {
        let zoom = zoom.clamp(self.min_zoom, self.max_zoom);
        if let Err(e) = self.memory.set_zoom(zoom) {
            log::warn!("Map rejected zoom {zoom}: {e:?}");
        }
    }

    pub fn zoom_by(&mut self, delta: f64) {
        self.set_zoom(self.zoom() + delta);
    }

    /// Step out `levels` whole zoom levels, stopping at the minimum zoom.
    pub fn zoom_out(&mut self, levels: u32) {
        for _ in 0..levels {
            if let Err(e) = self.memory.zoom_out() {
                log::debug!("Zoom out stopped: {e:?}");
                break;
            }
        }
        self.set_zoom(self.zoom());
    }

    /// Record the widget size; the viewport extent depends on it.
    ///
    /// Returns `true` when the size changed.
    pub fn set_size(&mut self, size: Vec2) -> bool {
        if size.x > 0.0 && size.y > 0.0 && size != self.size {
            self.size = size;
            return true;
        }
        false
    }

    /// Pull the view back inside the zoom range and pannable bounds after
    /// the widget moved it.
    pub fn enforce_limits(&mut self) {
        let zoom = self.zoom();
        if zoom < self.min_zoom || zoom > self.max_zoom {
            self.set_zoom(zoom);
        }
        if let Some(pos) = self.memory.detached() {
            let center = LatLon::from_position(pos);
            let clamped = self.max_bounds.clamp(center);
            if clamped != center {
                self.memory.center_at(clamped.position());
            }
        }
    }

    fn projector(&self) -> Projector {
        Projector::new(Rect::from_min_size(Pos2::ZERO, self.size), &self.memory, self.home)
    }

    /// Geographic rectangle covered by the widget.
    pub fn viewport(&self) -> Viewport {
        let projector = self.projector();
        let north_west = projector.unproject(Vec2::ZERO);
        let south_east = projector.unproject(self.size);
        Viewport {
            north: north_west.y(),
            south: south_east.y(),
            east: south_east.x(),
            west: north_west.x(),
        }
    }
}
