use std::fmt;

use crate::entities::coordinate::LatLng;
use crate::entities::pickup::PickupResult;
use crate::utils::geo::format_coord;

/// Popup text for the pickup marker.
pub fn pickup_popup(result: &PickupResult) -> String {
    let mut text = String::from("Pickup Point");
    if let Some(details) = result.driver_route.details() {
        text.push_str(&format!("\nDriver: {}", details));
    }
    if let Some(details) = result.passenger_route.details() {
        text.push_str(&format!("\nPassenger: {}", details));
    }
    text
}

/// What the info panel shows after a pickup has been drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct Summary {
    pub pickup: String,
    pub driver: String,
    pub passenger: String,
    pub driver_route: Option<String>,
    pub passenger_route: Option<String>,
    pub message: Option<String>,
    pub analysis: Option<String>,
}

impl Summary {
    pub fn new(result: &PickupResult, driver: LatLng, passenger: LatLng) -> Self {
        Self {
            pickup: format_coord(result.pickup),
            driver: format_coord(driver),
            passenger: format_coord(passenger),
            driver_route: result.driver_route.details(),
            passenger_route: result.passenger_route.details(),
            message: result.message.clone(),
            analysis: result.analysis_text.clone(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Pickup: {}", self.pickup)?;
        write!(f, "Driver: {}", self.driver)?;
        if let Some(route) = &self.driver_route {
            write!(f, " ({})", route)?;
        }
        write!(f, "\nPassenger: {}", self.passenger)?;
        if let Some(route) = &self.passenger_route {
            write!(f, " ({})", route)?;
        }
        if let Some(message) = &self.message {
            write!(f, "\n{}", message)?;
        }
        if let Some(analysis) = &self.analysis {
            write!(f, "\n\n{}", analysis)?;
        }
        Ok(())
    }
}
