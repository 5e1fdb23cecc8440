use std::collections::BTreeMap;

use crate::entities::coordinate::{Bounds, LatLng};
use crate::error::{AppError, AppResult};
use crate::map::{LayerId, LineStyle, MapWidget, MarkerStyle};

#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    Marker { at: LatLng, style: MarkerStyle },
    Line { path: Vec<LatLng>, style: LineStyle },
}

/// Map widget that keeps its layers in memory.
///
/// Used by the headless host and by tests to observe what is on the map.
#[derive(Debug, Default)]
pub struct RecordingMap {
    layers: BTreeMap<LayerId, Layer>,
    next_id: u64,
    view: Option<(LatLng, u8)>,
    fitted: Option<(Bounds, u32)>,
}

impl RecordingMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(&id)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&LatLng, &MarkerStyle)> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Marker { at, style } => Some((at, style)),
            Layer::Line { .. } => None,
        })
    }

    pub fn lines(&self) -> impl Iterator<Item = (&[LatLng], &LineStyle)> {
        self.layers.values().filter_map(|layer| match layer {
            Layer::Line { path, style } => Some((path.as_slice(), style)),
            Layer::Marker { .. } => None,
        })
    }

    pub fn marker_count(&self) -> usize {
        self.markers().count()
    }

    pub fn line_count(&self) -> usize {
        self.lines().count()
    }

    pub fn view(&self) -> Option<(LatLng, u8)> {
        self.view
    }

    pub fn fitted_bounds(&self) -> Option<(Bounds, u32)> {
        self.fitted
    }

    fn attach(&mut self, layer: Layer) -> LayerId {
        self.next_id += 1;
        let id = LayerId(self.next_id);
        self.layers.insert(id, layer);
        id
    }
}

impl MapWidget for RecordingMap {
    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.view = Some((center, zoom));
    }

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle) -> AppResult<LayerId> {
        if !at.is_valid() {
            return Err(AppError::Render(format!("invalid marker position {:?}", at)));
        }
        let id = self.attach(Layer::Marker {
            at,
            style: style.clone(),
        });
        tracing::trace!(layer = id.0, lat = at.lat, lng = at.lng, "Marker added");
        Ok(id)
    }

    fn add_line(&mut self, path: &[LatLng], style: &LineStyle) -> AppResult<LayerId> {
        if path.len() < 2 {
            return Err(AppError::Render(format!(
                "a line needs at least 2 points, got {}",
                path.len()
            )));
        }
        if let Some(bad) = path.iter().find(|p| !p.is_valid()) {
            return Err(AppError::Render(format!("invalid line point {:?}", bad)));
        }
        let id = self.attach(Layer::Line {
            path: path.to_vec(),
            style: style.clone(),
        });
        tracing::trace!(layer = id.0, points = path.len(), color = %style.color, "Line added");
        Ok(id)
    }

    fn remove_layer(&mut self, id: LayerId) {
        if self.layers.remove(&id).is_some() {
            tracing::trace!(layer = id.0, "Layer removed");
        }
    }

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32) {
        self.fitted = Some((bounds, padding_px));
    }
}
