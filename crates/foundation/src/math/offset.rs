use super::EARTH_RADIUS_M;
use crate::coord::{LatLng, clamp_lat_deg, clamp_lon_deg};

/// Floor for cos(latitude) when converting an east offset; keeps the
/// division defined at the poles.
const MIN_COS_LAT: f64 = 1e-6;

/// Shift a coordinate by a local meter offset.
///
/// Local equirectangular inverse: `dlat = north / R`, `dlon = east / (R *
/// cos(lat))`. Valid only for small offsets near the origin latitude; the
/// result is clamped to the valid coordinate ranges.
pub fn offset_by_meters(origin: LatLng, east_m: f64, north_m: f64) -> LatLng {
    let cos_lat = origin.lat_deg.to_radians().cos().max(MIN_COS_LAT);
    let dlat_deg = (north_m / EARTH_RADIUS_M).to_degrees();
    let dlon_deg = (east_m / (EARTH_RADIUS_M * cos_lat)).to_degrees();
    LatLng::new(
        clamp_lat_deg(origin.lat_deg + dlat_deg),
        clamp_lon_deg(origin.lon_deg + dlon_deg),
    )
}
