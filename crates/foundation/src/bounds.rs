use crate::coord::LatLng;

/// Rectangular latitude/longitude extent
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct LatLngBounds {
    pub min_lat_deg: f64,
    pub max_lat_deg: f64,
    pub min_lon_deg: f64,
    pub max_lon_deg: f64,
}

impl LatLngBounds {
    pub fn new(min_lat_deg: f64, max_lat_deg: f64, min_lon_deg: f64, max_lon_deg: f64) -> Self {
        LatLngBounds {
            min_lat_deg,
            max_lat_deg,
            min_lon_deg,
            max_lon_deg,
        }
    }

    pub fn contains(&self, point: LatLng) -> bool {
        point.lat_deg >= self.min_lat_deg
            && point.lat_deg <= self.max_lat_deg
            && point.lon_deg >= self.min_lon_deg
            && point.lon_deg <= self.max_lon_deg
    }
}
