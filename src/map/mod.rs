//! Adapter seam between the controller and whatever map library draws the
//! markers and lines.

pub mod recording;

use crate::entities::coordinate::{Bounds, LatLng};
use crate::entities::selection::Role;
use crate::error::AppResult;

pub use recording::RecordingMap;

/// Handle to a marker or line attached to the map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LayerId(pub u64);

#[derive(Debug, Clone, PartialEq)]
pub struct Icon {
    pub url: String,
    pub size_px: u32,
}

impl Icon {
    pub fn for_role(role: Role) -> Self {
        match role {
            Role::Driver => Self {
                url: "https://cdn-icons-png.flaticon.com/512/743/743131.png".to_string(),
                size_px: 30,
            },
            Role::Passenger => Self {
                url: "https://cdn-icons-png.flaticon.com/512/1946/1946429.png".to_string(),
                size_px: 30,
            },
        }
    }

    pub fn pickup() -> Self {
        Self {
            url: "https://cdn-icons-png.flaticon.com/512/684/684908.png".to_string(),
            size_px: 35,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MarkerStyle {
    pub icon: Icon,
    pub tooltip: Option<String>,
    pub popup: Option<String>,
}

impl MarkerStyle {
    pub fn endpoint(role: Role) -> Self {
        Self {
            icon: Icon::for_role(role),
            tooltip: Some(role.label().to_string()),
            popup: None,
        }
    }

    pub fn pickup(popup: String) -> Self {
        Self {
            icon: Icon::pickup(),
            tooltip: Some("Pickup Point".to_string()),
            popup: Some(popup),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LineStyle {
    pub color: String,
    pub weight: u32,
    pub opacity: f64,
    /// Leaflet-style dash pattern, e.g. `"5,8"`. `None` draws a solid line.
    pub dash_array: Option<String>,
}

impl LineStyle {
    pub fn for_leg(role: Role) -> Self {
        match role {
            Role::Driver => Self {
                color: "red".to_string(),
                weight: 4,
                opacity: 0.9,
                dash_array: None,
            },
            Role::Passenger => Self {
                color: "green".to_string(),
                weight: 4,
                opacity: 0.9,
                dash_array: Some("5,8".to_string()),
            },
        }
    }
}

/// Capabilities the controller needs from a map widget.
///
/// Click events are not registered here: the host forwards them to
/// [`crate::controller::MapController::handle_click`].
pub trait MapWidget {
    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn add_marker(&mut self, at: LatLng, style: &MarkerStyle) -> AppResult<LayerId>;

    /// Fails if the widget cannot build a line from `path`.
    fn add_line(&mut self, path: &[LatLng], style: &LineStyle) -> AppResult<LayerId>;

    /// Removing an unknown layer is a no-op.
    fn remove_layer(&mut self, id: LayerId);

    fn fit_bounds(&mut self, bounds: Bounds, padding_px: u32);
}
