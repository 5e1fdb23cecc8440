use crate::entities::coordinate::LatLng;

/// Route geometry for one leg after normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Path(Vec<LatLng>),
    Missing,
    Malformed(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RouteLeg {
    pub geometry: Geometry,
    pub distance_km: Option<f64>,
    pub duration_min: Option<f64>,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
}

impl RouteLeg {
    pub fn without_geometry() -> Self {
        Self {
            geometry: Geometry::Missing,
            distance_km: None,
            duration_min: None,
            distance_text: None,
            duration_text: None,
        }
    }

    /// Server-provided text if any, else the numeric value.
    pub fn distance_label(&self) -> Option<String> {
        self.distance_text
            .clone()
            .or_else(|| self.distance_km.map(|km| format!("{:.2} km", km)))
    }

    pub fn duration_label(&self) -> Option<String> {
        self.duration_text
            .clone()
            .or_else(|| self.duration_min.map(|min| format!("{:.1} min", min)))
    }

    /// "12 mins, 3.4 km" style summary, `None` when neither is known.
    pub fn details(&self) -> Option<String> {
        match (self.duration_label(), self.distance_label()) {
            (Some(duration), Some(distance)) => Some(format!("{}, {}", duration, distance)),
            (Some(one), None) | (None, Some(one)) => Some(one),
            (None, None) => None,
        }
    }
}

/// A pickup suggestion from the service.
#[derive(Debug, Clone, PartialEq)]
pub struct PickupResult {
    pub pickup: LatLng,
    pub driver_route: RouteLeg,
    pub passenger_route: RouteLeg,
    pub analysis_text: Option<String>,
    pub message: Option<String>,
}
