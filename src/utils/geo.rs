use crate::entities::coordinate::{Bounds, LatLng};

/// Smallest box containing every point. `None` for an empty slice.
pub fn bounds_of(points: &[LatLng]) -> Option<Bounds> {
    let (first, rest) = points.split_first()?;
    let mut bounds = Bounds {
        south: first.lat,
        west: first.lng,
        north: first.lat,
        east: first.lng,
    };
    for p in rest {
        bounds.south = bounds.south.min(p.lat);
        bounds.north = bounds.north.max(p.lat);
        bounds.west = bounds.west.min(p.lng);
        bounds.east = bounds.east.max(p.lng);
    }
    Some(bounds)
}

/// Format a coordinate as `"lat, lng"` with 5 decimal places.
pub fn format_coord(point: LatLng) -> String {
    format!("{:.5}, {:.5}", point.lat, point.lng)
}
