//! Wire format of the pickup backend and its normalization into
//! [`PickupResult`].
//!
//! Canonical geometry is a list of `{lat, lng}` objects. GeoJSON-style
//! `[lng, lat]` pairs, or a `LineString` object holding them, are converted
//! here so nothing past this module sees the difference.

use serde::Deserialize;
use serde_json::Value;

use crate::entities::coordinate::LatLng;
use crate::entities::pickup::{Geometry, PickupResult, RouteLeg};
use crate::error::{AppError, AppResult};
use crate::service::ConfirmOutcome;

const GENERIC_SERVER_ERROR: &str = "Unknown error from server";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct WireResponse {
    pickup: Option<LatLng>,
    driver_to_pickup: Option<WireRoute>,
    passenger_to_pickup: Option<WireRoute>,
    #[serde(alias = "analysis")]
    analysis_text: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct WireRoute {
    geometry: Option<Value>,
    distance_km: Option<f64>,
    duration_min: Option<f64>,
    distance: Option<Value>,
    duration: Option<Value>,
    text: Option<WireRouteText>,
}

#[derive(Debug, Default, Deserialize)]
struct WireRouteText {
    distance: Option<String>,
    duration: Option<String>,
}

/// Decode the reply to `POST /get_pickup`.
///
/// An `error` field wins regardless of status; a failed status without one
/// gets a generic message.
pub fn decode_pickup_response(status_ok: bool, body: &str) -> AppResult<PickupResult> {
    let value = parse_checked(status_ok, body)?;
    let wire: WireResponse = serde_json::from_value(value)?;
    let pickup = wire
        .pickup
        .ok_or_else(|| AppError::Decode("response has no pickup point".to_string()))?;
    into_result(pickup, wire)
}

/// Decode the reply to `POST /confirm_pickup`.
pub fn decode_confirm_response(status_ok: bool, body: &str) -> AppResult<ConfirmOutcome> {
    if status_ok && body.trim().is_empty() {
        return Ok(ConfirmOutcome::default());
    }
    let value = parse_checked(status_ok, body)?;
    let wire: WireResponse = serde_json::from_value(value)?;
    let message = wire.message.clone();
    let updated = match wire.pickup {
        Some(pickup) => Some(into_result(pickup, wire)?),
        None => None,
    };
    Ok(ConfirmOutcome { message, updated })
}

fn parse_checked(status_ok: bool, body: &str) -> AppResult<Value> {
    let parsed: Result<Value, _> = serde_json::from_str(body);

    if let Ok(value) = &parsed {
        if let Some(error) = value.get("error").and_then(Value::as_str) {
            return Err(AppError::Service(error.to_string()));
        }
    }
    if !status_ok {
        return Err(AppError::Service(GENERIC_SERVER_ERROR.to_string()));
    }
    Ok(parsed?)
}

fn into_result(pickup: LatLng, wire: WireResponse) -> AppResult<PickupResult> {
    if !pickup.is_valid() {
        return Err(AppError::Decode(format!("invalid pickup point {:?}", pickup)));
    }
    Ok(PickupResult {
        pickup,
        driver_route: wire.driver_to_pickup.map(into_leg).unwrap_or_else(RouteLeg::without_geometry),
        passenger_route: wire
            .passenger_to_pickup
            .map(into_leg)
            .unwrap_or_else(RouteLeg::without_geometry),
        analysis_text: wire.analysis_text.filter(|text| !text.trim().is_empty()),
        message: wire.message,
    })
}

fn into_leg(route: WireRoute) -> RouteLeg {
    let text = route.text.unwrap_or_default();
    let (distance_num, distance_str) = split_value(route.distance);
    let (duration_num, duration_str) = split_value(route.duration);

    RouteLeg {
        geometry: normalize_geometry(route.geometry.as_ref()),
        distance_km: route.distance_km.or(distance_num),
        duration_min: route.duration_min.or(duration_num),
        distance_text: text.distance.or(distance_str),
        duration_text: text.duration.or(duration_str),
    }
}

/// A number is a value, a string is display text.
fn split_value(value: Option<Value>) -> (Option<f64>, Option<String>) {
    match value {
        Some(Value::Number(n)) => (n.as_f64(), None),
        Some(Value::String(s)) => (None, Some(s)),
        _ => (None, None),
    }
}

pub fn normalize_geometry(value: Option<&Value>) -> Geometry {
    let points = match value {
        None | Some(Value::Null) => return Geometry::Missing,
        Some(Value::Array(points)) => points,
        Some(Value::Object(obj)) => match obj.get("coordinates") {
            Some(Value::Array(points)) => points,
            _ => return Geometry::Malformed("geometry object has no coordinates".to_string()),
        },
        Some(other) => return Geometry::Malformed(format!("unexpected geometry: {}", other)),
    };

    if points.is_empty() {
        return Geometry::Missing;
    }

    let mut path = Vec::with_capacity(points.len());
    for (idx, point) in points.iter().enumerate() {
        match to_lat_lng(point) {
            Some(latlng) => path.push(latlng),
            None => return Geometry::Malformed(format!("point {} is not a coordinate: {}", idx, point)),
        }
    }
    Geometry::Path(path)
}

fn to_lat_lng(point: &Value) -> Option<LatLng> {
    match point {
        Value::Object(obj) => Some(LatLng::new(
            obj.get("lat")?.as_f64()?,
            obj.get("lng")?.as_f64()?,
        )),
        // GeoJSON order
        Value::Array(pair) if pair.len() == 2 => {
            Some(LatLng::new(pair[1].as_f64()?, pair[0].as_f64()?))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_decode_full_response() {
        let body = json!({
            "pickup": { "lat": 37.77, "lng": -122.41 },
            "driverToPickup": {
                "duration_min": 7.5,
                "distance_km": 3.21,
                "geometry": [{ "lat": 37.76, "lng": -122.42 }, { "lat": 37.77, "lng": -122.41 }],
                "text": { "duration": "8 mins", "distance": "3.2 km" }
            },
            "passengerToPickup": {
                "duration_min": 6.0,
                "distance_km": 0.45,
                "geometry": [[-122.40, 37.75], [-122.41, 37.77]]
            },
            "message": "Best pickup found with max travel time 7.5 min."
        })
        .to_string();

        let result = decode_pickup_response(true, &body).unwrap();
        assert_eq!(result.pickup, LatLng::new(37.77, -122.41));
        assert_eq!(
            result.driver_route.geometry,
            Geometry::Path(vec![LatLng::new(37.76, -122.42), LatLng::new(37.77, -122.41)])
        );
        assert_eq!(
            result.passenger_route.geometry,
            Geometry::Path(vec![LatLng::new(37.75, -122.40), LatLng::new(37.77, -122.41)])
        );
        assert_eq!(result.driver_route.duration_text.as_deref(), Some("8 mins"));
        assert_eq!(result.passenger_route.distance_km, Some(0.45));
        assert_eq!(
            result.message.as_deref(),
            Some("Best pickup found with max travel time 7.5 min.")
        );
    }

    #[test]
    fn test_error_field_wins_over_status() {
        let body = json!({ "error": "No parking spots found near midpoint." }).to_string();
        for ok in [true, false] {
            match decode_pickup_response(ok, &body) {
                Err(AppError::Service(msg)) => {
                    assert_eq!(msg, "No parking spots found near midpoint.")
                }
                other => panic!("expected service error, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_failed_status_without_error_is_generic() {
        match decode_pickup_response(false, "<html>oops</html>") {
            Err(AppError::Service(msg)) => assert_eq!(msg, GENERIC_SERVER_ERROR),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_unparseable_success_is_decode_error() {
        assert!(matches!(
            decode_pickup_response(true, "not json"),
            Err(AppError::Decode(_))
        ));
        assert!(matches!(
            decode_pickup_response(true, "{}"),
            Err(AppError::Decode(_))
        ));
    }

    #[test]
    fn test_leg_geometry_failures_stay_local() {
        let body = json!({
            "pickup": { "lat": 37.77, "lng": -122.41 },
            "driverToPickup": { "geometry": [] },
            "passengerToPickup": { "geometry": ["north", "south"] }
        })
        .to_string();

        let result = decode_pickup_response(true, &body).unwrap();
        assert_eq!(result.driver_route.geometry, Geometry::Missing);
        assert!(matches!(
            result.passenger_route.geometry,
            Geometry::Malformed(_)
        ));
    }

    #[test]
    fn test_missing_legs_decode_as_missing() {
        let body = json!({ "pickup": { "lat": 37.77, "lng": -122.41 } }).to_string();
        let result = decode_pickup_response(true, &body).unwrap();
        assert_eq!(result.driver_route.geometry, Geometry::Missing);
        assert_eq!(result.passenger_route.geometry, Geometry::Missing);
    }

    #[test]
    fn test_geojson_linestring_object() {
        let geometry = json!({ "type": "LineString", "coordinates": [[-122.42, 37.76], [-122.41, 37.77]] });
        assert_eq!(
            normalize_geometry(Some(&geometry)),
            Geometry::Path(vec![LatLng::new(37.76, -122.42), LatLng::new(37.77, -122.41)])
        );
    }

    #[test]
    fn test_distance_duration_aliases() {
        let body = json!({
            "pickup": { "lat": 37.77, "lng": -122.41 },
            "driverToPickup": { "distance": 2.5, "duration": "6 mins" }
        })
        .to_string();
        let leg = decode_pickup_response(true, &body).unwrap().driver_route;
        assert_eq!(leg.distance_km, Some(2.5));
        assert_eq!(leg.duration_text.as_deref(), Some("6 mins"));
    }

    #[test]
    fn test_confirm_message_only() {
        let body = json!({ "message": "Thanks, pickup confirmed." }).to_string();
        let outcome = decode_confirm_response(true, &body).unwrap();
        assert_eq!(outcome.message.as_deref(), Some("Thanks, pickup confirmed."));
        assert!(outcome.updated.is_none());
    }

    #[test]
    fn test_confirm_with_updated_pickup() {
        let body = json!({
            "pickup": { "lat": 37.78, "lng": -122.40 },
            "driverToPickup": { "geometry": [{ "lat": 37.76, "lng": -122.42 }, { "lat": 37.78, "lng": -122.40 }] },
            "analysisText": "Moved closer to the passenger."
        })
        .to_string();
        let outcome = decode_confirm_response(true, &body).unwrap();
        let updated = outcome.updated.unwrap();
        assert_eq!(updated.pickup, LatLng::new(37.78, -122.40));
        assert_eq!(
            updated.analysis_text.as_deref(),
            Some("Moved closer to the passenger.")
        );
    }
}
