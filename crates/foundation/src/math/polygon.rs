use super::EARTH_RADIUS_M;
use crate::bounds::LatLngBounds;
use crate::coord::LatLng;

/// Extent of all finite vertices across all rings.
///
/// Non-finite vertices are skipped; returns `None` when nothing valid
/// remains.
pub fn polygon_bounds(paths: &[Vec<LatLng>]) -> Option<LatLngBounds> {
    let mut min_lat = f64::INFINITY;
    let mut max_lat = f64::NEG_INFINITY;
    let mut min_lon = f64::INFINITY;
    let mut max_lon = f64::NEG_INFINITY;
    let mut seen = false;

    for path in paths {
        for point in path {
            if !point.is_finite() {
                continue;
            }
            min_lat = min_lat.min(point.lat_deg);
            max_lat = max_lat.max(point.lat_deg);
            min_lon = min_lon.min(point.lon_deg);
            max_lon = max_lon.max(point.lon_deg);
            seen = true;
        }
    }

    if !seen {
        return None;
    }
    Some(LatLngBounds::new(min_lat, max_lat, min_lon, max_lon))
}

/// Midpoint of the polygon bounds.
///
/// Not an area-weighted centroid; strongly concave shapes will be
/// mis-centered. Intended for label placement on typically-convex plots.
pub fn polygon_centroid(paths: &[Vec<LatLng>]) -> Option<LatLng> {
    let bounds = polygon_bounds(paths)?;
    Some(LatLng::new(
        (bounds.min_lat_deg + bounds.max_lat_deg) / 2.0,
        (bounds.min_lon_deg + bounds.max_lon_deg) / 2.0,
    ))
}

/// Planar approximation of the polygon area in square meters.
///
/// Each ring is projected to local meters with an equirectangular projection
/// anchored at the ring's first valid latitude, then measured with the
/// shoelace formula. Open and explicitly-closed rings yield the same area.
/// Rings contribute additively; inner rings are not subtracted, so polygons
/// with true holes overstate. Rings with fewer than 3 finite vertices are
/// skipped; returns `None` when no ring qualifies.
pub fn polygon_approx_area_m2(paths: &[Vec<LatLng>]) -> Option<f64> {
    let mut total = 0.0;
    let mut measured = false;

    for path in paths {
        let ring: Vec<LatLng> = path.iter().copied().filter(LatLng::is_finite).collect();
        if ring.len() < 3 {
            continue;
        }

        let cos_ref = ring[0].lat_deg.to_radians().cos();
        let projected: Vec<(f64, f64)> = ring
            .iter()
            .map(|p| {
                (
                    p.lon_deg.to_radians() * cos_ref * EARTH_RADIUS_M,
                    p.lat_deg.to_radians() * EARTH_RADIUS_M,
                )
            })
            .collect();

        let mut sum = 0.0;
        for i in 0..projected.len() {
            let (x0, y0) = projected[i];
            let (x1, y1) = projected[(i + 1) % projected.len()];
            sum += x0 * y1 - x1 * y0;
        }
        total += sum.abs() / 2.0;
        measured = true;
    }

    if measured { Some(total) } else { None }
}

#[cfg(test)]
mod tests {
    use super::{polygon_approx_area_m2, polygon_bounds, polygon_centroid};
    use crate::coord::LatLng;

    fn assert_close(a: f64, b: f64, eps: f64) {
        let diff = (a - b).abs();
        assert!(diff <= eps, "expected {a} ~= {b} (diff {diff})");
    }

    fn square_ring(origin: LatLng, side_deg: f64) -> Vec<LatLng> {
        vec![
            origin,
            LatLng::new(origin.lat_deg, origin.lon_deg + side_deg),
            LatLng::new(origin.lat_deg + side_deg, origin.lon_deg + side_deg),
            LatLng::new(origin.lat_deg + side_deg, origin.lon_deg),
        ]
    }

    #[test]
    fn bounds_skip_non_finite_vertices() {
        let paths = vec![vec![
            LatLng::new(1.0, 2.0),
            LatLng::new(f64::NAN, 50.0),
            LatLng::new(3.0, f64::INFINITY),
            LatLng::new(2.0, 4.0),
        ]];
        let bounds = polygon_bounds(&paths).unwrap();
        assert_eq!(bounds.min_lat_deg, 1.0);
        assert_eq!(bounds.max_lat_deg, 2.0);
        assert_eq!(bounds.min_lon_deg, 2.0);
        assert_eq!(bounds.max_lon_deg, 4.0);
    }

    #[test]
    fn bounds_of_nothing_valid_is_none() {
        assert_eq!(polygon_bounds(&[]), None);
        let paths = vec![vec![LatLng::new(f64::NAN, f64::NAN)]];
        assert_eq!(polygon_bounds(&paths), None);
    }

    #[test]
    fn centroid_is_bounds_midpoint() {
        let paths = vec![vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(0.0, 2.0),
            LatLng::new(4.0, 2.0),
            LatLng::new(4.0, 0.0),
        ]];
        let centroid = polygon_centroid(&paths).unwrap();
        assert_eq!(centroid, LatLng::new(2.0, 1.0));
    }

    #[test]
    fn area_of_equator_square_matches_projection() {
        // 0.001 deg of latitude is about 111.32 m on this sphere.
        let paths = vec![square_ring(LatLng::new(0.0, 0.0), 0.001)];
        let area = polygon_approx_area_m2(&paths).unwrap();
        assert_close(area, 12392.0, 1.0);
    }

    #[test]
    fn area_treats_open_and_closed_rings_alike() {
        let mut closed = square_ring(LatLng::new(10.0, 20.0), 0.002);
        let open = closed.clone();
        closed.push(closed[0]);
        let a = polygon_approx_area_m2(&[open]).unwrap();
        let b = polygon_approx_area_m2(&[closed]).unwrap();
        assert_close(a, b, 1e-9);
    }

    #[test]
    fn area_sums_disjoint_rings() {
        let ring_a = square_ring(LatLng::new(0.0, 0.0), 0.001);
        let ring_b = square_ring(LatLng::new(0.0, 0.01), 0.001);
        let single = polygon_approx_area_m2(&[ring_a.clone()]).unwrap();
        let both = polygon_approx_area_m2(&[ring_a, ring_b]).unwrap();
        assert_close(both, single * 2.0, 1e-6);
    }

    #[test]
    fn area_needs_three_finite_vertices() {
        let paths = vec![vec![LatLng::new(0.0, 0.0), LatLng::new(0.0, 1.0)]];
        assert_eq!(polygon_approx_area_m2(&paths), None);
        let paths = vec![vec![
            LatLng::new(0.0, 0.0),
            LatLng::new(f64::NAN, 1.0),
            LatLng::new(0.0, 1.0),
        ]];
        assert_eq!(polygon_approx_area_m2(&paths), None);
    }
}
