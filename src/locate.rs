use crate::entities::coordinate::LatLng;
use crate::error::{AppError, AppResult};

/// Source of the device's current position.
#[allow(async_fn_in_trait)]
pub trait Geolocator {
    async fn current_location(&self) -> AppResult<LatLng>;
}

/// Reports a position fixed at startup, e.g. from configuration.
#[derive(Debug, Clone, Default)]
pub struct FixedLocator {
    position: Option<LatLng>,
}

impl FixedLocator {
    pub fn new(position: Option<LatLng>) -> Self {
        Self { position }
    }
}

impl Geolocator for FixedLocator {
    async fn current_location(&self) -> AppResult<LatLng> {
        let position = self
            .position
            .ok_or_else(|| AppError::Location("location is not available on this device".to_string()))?;
        if !position.is_valid() {
            return Err(AppError::Location(format!(
                "device reported an invalid position {:?}",
                position
            )));
        }
        Ok(position)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unset_location_fails() {
        let err = FixedLocator::default().current_location().await.unwrap_err();
        assert!(err.to_string().starts_with("Could not get your location"));
    }

    #[tokio::test]
    async fn test_fixed_location() {
        let here = LatLng::new(37.7749, -122.4194);
        assert_eq!(FixedLocator::new(Some(here)).current_location().await.unwrap(), here);
    }
}
