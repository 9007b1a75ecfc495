use foundation::coord::LatLng;
use foundation::math::{CLOSED_PATH_EPS_DEG, is_closed_path};

/// How a road path is drawn.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PathStyle {
    /// Closed ring, drawn filled (roundabouts, boundary loops).
    Polygon,
    /// Open line, drawn stroked.
    Polyline,
}

/// Closed rings fill, everything else strokes.
pub fn road_path_style(path: &[LatLng]) -> PathStyle {
    if is_closed_path(path, CLOSED_PATH_EPS_DEG) {
        PathStyle::Polygon
    } else {
        PathStyle::Polyline
    }
}
