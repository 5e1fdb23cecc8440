//! Turning a [`PickupResult`] into map layers.
//!
//! [`RenderPlan::build`] is pure; [`apply`] is the only part that touches the
//! widget.

use crate::entities::coordinate::{Bounds, LatLng};
use crate::entities::pickup::{Geometry, PickupResult};
use crate::entities::selection::Role;
use crate::error::AppResult;
use crate::map::{LayerId, LineStyle, MapWidget, MarkerStyle};
use crate::utils::geo::bounds_of;

use super::summary::pickup_popup;

/// How one leg will be drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct LegPlan {
    /// The route's own geometry, or why it cannot be used.
    pub route: Result<Vec<LatLng>, String>,
    /// Endpoint to pickup point, drawn when `route` is unusable.
    pub fallback: [LatLng; 2],
}

impl LegPlan {
    fn new(geometry: &Geometry, endpoint: LatLng, pickup: LatLng) -> Self {
        let route = match geometry {
            Geometry::Path(points) => Ok(points.clone()),
            Geometry::Missing => Err("route geometry is missing".to_string()),
            Geometry::Malformed(why) => Err(format!("route geometry is malformed: {}", why)),
        };
        Self {
            route,
            fallback: [endpoint, pickup],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderPlan {
    pub pickup: LatLng,
    pub pickup_style: MarkerStyle,
    pub driver_leg: LegPlan,
    pub passenger_leg: LegPlan,
    pub bounds: Bounds,
}

impl RenderPlan {
    pub fn build(result: &PickupResult, driver: LatLng, passenger: LatLng) -> Self {
        let pickup = result.pickup;
        // Three points, never empty.
        let bounds = bounds_of(&[driver, passenger, pickup]).unwrap_or(Bounds {
            south: pickup.lat,
            west: pickup.lng,
            north: pickup.lat,
            east: pickup.lng,
        });

        Self {
            pickup,
            pickup_style: MarkerStyle::pickup(pickup_popup(result)),
            driver_leg: LegPlan::new(&result.driver_route.geometry, driver, pickup),
            passenger_leg: LegPlan::new(&result.passenger_route.geometry, passenger, pickup),
            bounds,
        }
    }
}

/// Layers owned by the controller for the current pickup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedArtifacts {
    pub pickup_marker: Option<LayerId>,
    pub driver_route_line: Option<LayerId>,
    pub passenger_route_line: Option<LayerId>,
}

impl RenderedArtifacts {
    pub fn clear<M: MapWidget>(&mut self, map: &mut M) {
        for slot in [
            &mut self.pickup_marker,
            &mut self.driver_route_line,
            &mut self.passenger_route_line,
        ] {
            if let Some(id) = slot.take() {
                map.remove_layer(id);
            }
        }
    }

    fn leg_mut(&mut self, role: Role) -> &mut Option<LayerId> {
        match role {
            Role::Driver => &mut self.driver_route_line,
            Role::Passenger => &mut self.passenger_route_line,
        }
    }
}

/// Which legs ended up as straight lines.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RenderReport {
    pub driver_fallback: bool,
    pub passenger_fallback: bool,
}

/// Replace whatever `artifacts` holds with the layers described by `plan`.
///
/// If the pickup marker cannot be added, the map and `artifacts` are left as
/// they were.
pub fn apply<M: MapWidget>(
    plan: &RenderPlan,
    map: &mut M,
    artifacts: &mut RenderedArtifacts,
    padding_px: u32,
) -> AppResult<RenderReport> {
    let pickup_marker = map.add_marker(plan.pickup, &plan.pickup_style)?;
    artifacts.clear(map);
    artifacts.pickup_marker = Some(pickup_marker);

    let report = RenderReport {
        driver_fallback: draw_leg(map, artifacts, Role::Driver, &plan.driver_leg),
        passenger_fallback: draw_leg(map, artifacts, Role::Passenger, &plan.passenger_leg),
    };

    map.fit_bounds(plan.bounds, padding_px);
    tracing::debug!(
        south = plan.bounds.south,
        west = plan.bounds.west,
        north = plan.bounds.north,
        east = plan.bounds.east,
        "Map bounds fitted"
    );

    Ok(report)
}

/// Returns true when the straight-line fallback was used.
fn draw_leg<M: MapWidget>(
    map: &mut M,
    artifacts: &mut RenderedArtifacts,
    role: Role,
    leg: &LegPlan,
) -> bool {
    let style = LineStyle::for_leg(role);

    let reason = match &leg.route {
        Ok(path) => match map.add_line(path, &style) {
            Ok(id) => {
                *artifacts.leg_mut(role) = Some(id);
                tracing::debug!(leg = %role, points = path.len(), "Route drawn");
                return false;
            }
            Err(e) => e.to_string(),
        },
        Err(reason) => reason.clone(),
    };

    tracing::warn!(leg = %role, %reason, "Falling back to a straight line");

    match map.add_line(&leg.fallback, &style) {
        Ok(id) => *artifacts.leg_mut(role) = Some(id),
        Err(e) => tracing::error!(leg = %role, error = %e, "Straight line could not be drawn"),
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::pickup::RouteLeg;
    use crate::map::RecordingMap;

    const DRIVER: LatLng = LatLng { lat: 37.76, lng: -122.42 };
    const PASSENGER: LatLng = LatLng { lat: 37.75, lng: -122.40 };
    const PICKUP: LatLng = LatLng { lat: 37.77, lng: -122.41 };

    fn leg(geometry: Geometry) -> RouteLeg {
        RouteLeg {
            geometry,
            ..RouteLeg::without_geometry()
        }
    }

    fn result(driver: Geometry, passenger: Geometry) -> PickupResult {
        PickupResult {
            pickup: PICKUP,
            driver_route: leg(driver),
            passenger_route: leg(passenger),
            analysis_text: None,
            message: None,
        }
    }

    fn full_path(from: LatLng) -> Geometry {
        Geometry::Path(vec![from, PICKUP])
    }

    #[test]
    fn test_redraw_keeps_one_of_each() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        let plan = RenderPlan::build(
            &result(full_path(DRIVER), full_path(PASSENGER)),
            DRIVER,
            PASSENGER,
        );

        apply(&plan, &mut map, &mut artifacts, 40).unwrap();
        let first = artifacts.clone();
        apply(&plan, &mut map, &mut artifacts, 40).unwrap();

        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.line_count(), 2);
        assert!(map.layer(first.pickup_marker.unwrap()).is_none());
        assert!(map.layer(first.driver_route_line.unwrap()).is_none());
        assert!(map.layer(artifacts.passenger_route_line.unwrap()).is_some());
    }

    #[test]
    fn test_missing_driver_geometry_falls_back_alone() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        let passenger_path = vec![PASSENGER, LatLng::new(37.76, -122.405), PICKUP];
        let plan = RenderPlan::build(
            &result(Geometry::Missing, Geometry::Path(passenger_path.clone())),
            DRIVER,
            PASSENGER,
        );

        let report = apply(&plan, &mut map, &mut artifacts, 40).unwrap();
        assert!(report.driver_fallback);
        assert!(!report.passenger_fallback);

        let lines: Vec<_> = map.lines().collect();
        assert_eq!(lines.len(), 2);
        let (driver_path, driver_style) = lines
            .iter()
            .find(|(_, style)| style.color == "red")
            .unwrap();
        assert_eq!(*driver_path, &[DRIVER, PICKUP][..]);
        assert_eq!(driver_style.dash_array, None);
        let (path, style) = lines
            .iter()
            .find(|(_, style)| style.color == "green")
            .unwrap();
        assert_eq!(*path, passenger_path.as_slice());
        assert_eq!(style.dash_array.as_deref(), Some("5,8"));
    }

    #[test]
    fn test_unbuildable_route_falls_back_from_endpoint() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        // One point cannot form a line.
        let plan = RenderPlan::build(
            &result(full_path(DRIVER), Geometry::Path(vec![LatLng::new(37.755, -122.405)])),
            DRIVER,
            PASSENGER,
        );

        let report = apply(&plan, &mut map, &mut artifacts, 40).unwrap();
        assert!(report.passenger_fallback);
        let (path, _) = map.lines().find(|(_, s)| s.color == "green").unwrap();
        assert_eq!(path, &[PASSENGER, PICKUP][..]);
    }

    #[test]
    fn test_bounds_cover_three_points() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        let plan = RenderPlan::build(
            &result(Geometry::Missing, Geometry::Missing),
            DRIVER,
            PASSENGER,
        );
        apply(&plan, &mut map, &mut artifacts, 25).unwrap();

        let (bounds, padding) = map.fitted_bounds().unwrap();
        assert_eq!(padding, 25);
        assert_eq!(
            bounds,
            Bounds {
                south: 37.75,
                west: -122.42,
                north: 37.77,
                east: -122.40,
            }
        );
    }

    #[test]
    fn test_unplaceable_pickup_keeps_previous_layers() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        let good = RenderPlan::build(
            &result(full_path(DRIVER), full_path(PASSENGER)),
            DRIVER,
            PASSENGER,
        );
        apply(&good, &mut map, &mut artifacts, 40).unwrap();
        let before = artifacts.clone();

        let mut bad = result(Geometry::Missing, Geometry::Missing);
        bad.pickup = LatLng::new(95.0, -122.41);
        let plan = RenderPlan::build(&bad, DRIVER, PASSENGER);
        assert!(apply(&plan, &mut map, &mut artifacts, 40).is_err());

        assert_eq!(artifacts, before);
        assert_eq!(map.marker_count(), 1);
        assert_eq!(map.line_count(), 2);
        assert!(map.layer(before.pickup_marker.unwrap()).is_some());
    }

    #[test]
    fn test_clear_on_empty_artifacts() {
        let mut map = RecordingMap::new();
        let mut artifacts = RenderedArtifacts::default();
        artifacts.clear(&mut map);
        assert_eq!(artifacts, RenderedArtifacts::default());
    }
}
