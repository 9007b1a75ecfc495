/// Largest absolute latitude in degrees.
pub const MAX_LAT_DEG: f64 = 90.0;
/// Largest absolute longitude in degrees.
pub const MAX_LON_DEG: f64 = 180.0;

/// A geographic position in degrees.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct LatLng {
    pub lat_deg: f64,
    pub lon_deg: f64,
}

impl LatLng {
    pub fn new(lat_deg: f64, lon_deg: f64) -> Self {
        Self { lat_deg, lon_deg }
    }

    /// Build a coordinate from untrusted values.
    ///
    /// Returns `None` when either component is NaN or infinite; finite values
    /// outside the valid ranges are clamped, not rejected. Applying this to an
    /// already-checked coordinate yields the same coordinate.
    pub fn checked(lat_deg: f64, lon_deg: f64) -> Option<Self> {
        if !lat_deg.is_finite() || !lon_deg.is_finite() {
            return None;
        }
        Some(Self {
            lat_deg: clamp_lat_deg(lat_deg),
            lon_deg: clamp_lon_deg(lon_deg),
        })
    }

    pub fn is_finite(&self) -> bool {
        self.lat_deg.is_finite() && self.lon_deg.is_finite()
    }
}

/// Clamp a latitude to [-90, 90] degrees.
pub fn clamp_lat_deg(lat_deg: f64) -> f64 {
    lat_deg.clamp(-MAX_LAT_DEG, MAX_LAT_DEG)
}

/// Clamp a longitude to [-180, 180] degrees.
pub fn clamp_lon_deg(lon_deg: f64) -> f64 {
    lon_deg.clamp(-MAX_LON_DEG, MAX_LON_DEG)
}
