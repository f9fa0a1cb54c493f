use std::collections::BTreeMap;

use eframe::egui::Pos2;

use crate::color::MarkerStyle;

/// Stable identifier handed out by a [`MarkerRegistry`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MarkerId(u64);

/// Which ownership set a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerLayer {
    /// Replaced wholesale on every filter pass.
    Viewport,
    /// Prediction results and search pins; only an explicit reset clears them.
    Overlay,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: MarkerId,
    pub latitude: f64,
    pub longitude: f64,
    pub style: MarkerStyle,
    pub popup: String,
}

/// Markers currently on the map, split into two disjoint sets.
///
/// Ids increase monotonically, so iteration follows insertion order.
#[derive(Debug, Default)]
pub struct MarkerRegistry {
    next_id: u64,
    viewport: BTreeMap<MarkerId, Marker>,
    overlay: BTreeMap<MarkerId, Marker>,
}

impl MarkerRegistry {
    fn allocate(&mut self) -> MarkerId {
        self.next_id += 1;
        MarkerId(self.next_id)
    }

    fn layer_mut(&mut self, layer: MarkerLayer) -> &mut BTreeMap<MarkerId, Marker> {
        match layer {
            MarkerLayer::Viewport => &mut self.viewport,
            MarkerLayer::Overlay => &mut self.overlay,
        }
    }

    /// Add one marker to `layer` and return its id.
    pub fn add(
        &mut self,
        layer: MarkerLayer,
        latitude: f64,
        longitude: f64,
        style: MarkerStyle,
        popup: String,
    ) -> MarkerId {
        let id = self.allocate();
        self.layer_mut(layer).insert(
            id,
            Marker {
                id,
                latitude,
                longitude,
                style,
                popup,
            },
        );
        id
    }

    /// Clear the viewport set, then fill it with `markers`.
    pub fn replace_viewport<I>(&mut self, markers: I)
    where
        I: IntoIterator<Item = (f64, f64, MarkerStyle, String)>,
    {
        self.viewport.clear();
        for (lat, lon, style, popup) in markers {
            self.add(MarkerLayer::Viewport, lat, lon, style, popup);
        }
    }

    /// Remove every overlay marker (prediction results and search pins).
    pub fn clear_overlay(&mut self) {
        self.overlay.clear();
    }

    pub fn get(&self, id: MarkerId) -> Option<&Marker> {
        self.viewport.get(&id).or_else(|| self.overlay.get(&id))
    }

    pub fn layer_of(&self, id: MarkerId) -> Option<MarkerLayer> {
        if self.viewport.contains_key(&id) {
            Some(MarkerLayer::Viewport)
        } else if self.overlay.contains_key(&id) {
            Some(MarkerLayer::Overlay)
        } else {
            None
        }
    }

    pub fn viewport_markers(&self) -> impl Iterator<Item = &Marker> {
        self.viewport.values()
    }

    pub fn overlay_markers(&self) -> impl Iterator<Item = &Marker> {
        self.overlay.values()
    }

    pub fn viewport_len(&self) -> usize {
        self.viewport.len()
    }

    pub fn overlay_len(&self) -> usize {
        self.overlay.len()
    }
}

/// Marker drawn nearest to `click`, at most `max_px` screen points away.
///
/// `overlay` is searched first so prediction popups win over the station
/// underneath.
pub fn hit_test<'a>(
    overlay: &'a [Marker],
    viewport: &'a [Marker],
    click: Pos2,
    max_px: f32,
    to_screen: impl Fn(&Marker) -> Pos2,
) -> Option<&'a Marker> {
    let nearest = |set: &'a [Marker]| {
        set.iter()
            .map(|m| (to_screen(m).distance(click), m))
            .filter(|(d, _)| *d <= max_px)
            .min_by(|a, b| a.0.total_cmp(&b.0))
            .map(|(_, m)| m)
    };
    nearest(overlay).or_else(|| nearest(viewport))
}
