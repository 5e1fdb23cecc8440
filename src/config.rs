use std::env;
use std::str::FromStr;

use crate::entities::coordinate::LatLng;
use crate::entities::selection::IntakeMode;
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct Config {
    pub service_url: String,
    pub intake_mode: IntakeMode,
    pub map_center: LatLng,
    pub map_zoom: u8,
    pub fit_padding_px: u32,
    pub request_timeout_secs: u64,
    pub device_location: Option<LatLng>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service_url: "http://127.0.0.1:5000".to_string(),
            intake_mode: IntakeMode::ClickOrder,
            map_center: LatLng::new(37.76, -122.42),
            map_zoom: 13,
            fit_padding_px: 40,
            request_timeout_secs: 10,
            device_location: None,
        }
    }
}

impl Config {
    pub fn from_env() -> AppResult<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let device_location = match (
            env::var("PICKUP_DEVICE_LAT").ok(),
            env::var("PICKUP_DEVICE_LNG").ok(),
        ) {
            (Some(lat), Some(lng)) => Some(LatLng::new(
                parse_value("PICKUP_DEVICE_LAT", &lat)?,
                parse_value("PICKUP_DEVICE_LNG", &lng)?,
            )),
            (None, None) => None,
            _ => {
                return Err(AppError::Config(
                    "PICKUP_DEVICE_LAT and PICKUP_DEVICE_LNG must be set together".to_string(),
                ));
            }
        };

        Ok(Self {
            service_url: env::var("PICKUP_SERVICE_URL").unwrap_or(defaults.service_url),
            intake_mode: var_or("PICKUP_INTAKE_MODE", defaults.intake_mode)?,
            map_center: LatLng::new(
                var_or("PICKUP_MAP_CENTER_LAT", defaults.map_center.lat)?,
                var_or("PICKUP_MAP_CENTER_LNG", defaults.map_center.lng)?,
            ),
            map_zoom: var_or("PICKUP_MAP_ZOOM", defaults.map_zoom)?,
            fit_padding_px: var_or("PICKUP_FIT_PADDING_PX", defaults.fit_padding_px)?,
            request_timeout_secs: var_or(
                "PICKUP_REQUEST_TIMEOUT_SECS",
                defaults.request_timeout_secs,
            )?,
            device_location,
        })
    }

    pub fn pickup_url(&self) -> String {
        format!("{}/get_pickup", self.service_url.trim_end_matches('/'))
    }

    pub fn confirm_url(&self) -> String {
        format!("{}/confirm_pickup", self.service_url.trim_end_matches('/'))
    }
}

fn var_or<T: FromStr>(key: &str, default: T) -> AppResult<T> {
    match env::var(key) {
        Ok(raw) => parse_value(key, &raw),
        Err(_) => Ok(default),
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> AppResult<T> {
    raw.trim()
        .parse()
        .map_err(|_| AppError::Config(format!("{} has an invalid value: {:?}", key, raw)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_urls_ignore_trailing_slash() {
        let config = Config {
            service_url: "http://localhost:5000/".to_string(),
            ..Config::default()
        };
        assert_eq!(config.pickup_url(), "http://localhost:5000/get_pickup");
        assert_eq!(config.confirm_url(), "http://localhost:5000/confirm_pickup");
    }

    #[test]
    fn test_parse_value_reports_key() {
        let err = parse_value::<u8>("PICKUP_MAP_ZOOM", "high").unwrap_err();
        assert!(err.to_string().contains("PICKUP_MAP_ZOOM"));
    }

    #[test]
    fn test_parse_intake_mode() {
        assert_eq!(
            parse_value::<IntakeMode>("PICKUP_INTAKE_MODE", "role-select").unwrap(),
            IntakeMode::RoleSelect
        );
    }
}
