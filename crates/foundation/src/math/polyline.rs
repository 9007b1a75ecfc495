use crate::coord::LatLng;

/// Endpoint tolerance in degrees for closed-path detection.
pub const CLOSED_PATH_EPS_DEG: f64 = 0.00002;

/// Arithmetic mean of all finite vertices across all paths.
pub fn polyline_centroid(paths: &[Vec<LatLng>]) -> Option<LatLng> {
    let mut lat_sum = 0.0;
    let mut lon_sum = 0.0;
    let mut count = 0usize;

    for path in paths {
        for point in path {
            if !point.is_finite() {
                continue;
            }
            lat_sum += point.lat_deg;
            lon_sum += point.lon_deg;
            count += 1;
        }
    }

    if count == 0 {
        return None;
    }
    Some(LatLng::new(lat_sum / count as f64, lon_sum / count as f64))
}

/// Where a road name should sit and how it should be rotated.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct RoadLabelAnchor {
    pub position: LatLng,
    /// Rotation in degrees, always in (-90, 90].
    pub angle_deg: f64,
}

/// Anchor a road label on the single longest segment across all paths.
///
/// Segment length is measured in planar degrees with the longitude delta
/// scaled by cos of the segment's mid latitude. The anchor sits at the
/// segment midpoint; the angle is the segment bearing folded into (-90, 90]
/// so the text never reads upside-down. When no segment has positive length
/// the anchor falls back to the polyline centroid at 0 degrees.
pub fn road_label_anchor(paths: &[Vec<LatLng>]) -> Option<RoadLabelAnchor> {
    let mut best_len = 0.0;
    let mut best: Option<(LatLng, LatLng)> = None;

    for path in paths {
        for pair in path.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            if !a.is_finite() || !b.is_finite() {
                continue;
            }
            let mid_lat_rad = ((a.lat_deg + b.lat_deg) / 2.0).to_radians();
            let dx = (b.lon_deg - a.lon_deg) * mid_lat_rad.cos();
            let dy = b.lat_deg - a.lat_deg;
            let len = dx.hypot(dy);
            if len > best_len {
                best_len = len;
                best = Some((a, b));
            }
        }
    }

    let Some((a, b)) = best else {
        return polyline_centroid(paths).map(|position| RoadLabelAnchor {
            position,
            angle_deg: 0.0,
        });
    };

    let mid_lat_rad = ((a.lat_deg + b.lat_deg) / 2.0).to_radians();
    let dx = (b.lon_deg - a.lon_deg) * mid_lat_rad.cos();
    let dy = b.lat_deg - a.lat_deg;
    let mut angle_deg = dy.atan2(dx).to_degrees();
    if angle_deg > 90.0 {
        angle_deg -= 180.0;
    } else if angle_deg <= -90.0 {
        angle_deg += 180.0;
    }

    Some(RoadLabelAnchor {
        position: LatLng::new(
            (a.lat_deg + b.lat_deg) / 2.0,
            (a.lon_deg + b.lon_deg) / 2.0,
        ),
        angle_deg,
    })
}

/// True when the path has at least 3 points and its endpoints agree within
/// `eps_deg` on both axes.
pub fn is_closed_path(path: &[LatLng], eps_deg: f64) -> bool {
    if path.len() < 3 {
        return false;
    }
    let first = path[0];
    let last = path[path.len() - 1];
    (first.lat_deg - last.lat_deg).abs() <= eps_deg
        && (first.lon_deg - last.lon_deg).abs() <= eps_deg
}
