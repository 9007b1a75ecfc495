use crate::bounds::LatLngBounds;
use crate::coord::{LatLng, clamp_lat_deg, clamp_lon_deg};

/// Smallest angular span in degrees used when a region is turned into bounds
/// or a zoom level. Prevents zero-size query boxes at extreme zoom.
pub const MIN_SPAN_DEG: f64 = 0.0005;

/// Lowest zoom level the viewer is driven to.
pub const MIN_ZOOM: f64 = 1.0;
/// Highest zoom level the viewer is driven to.
pub const MAX_ZOOM: f64 = 20.0;

/// A map viewport described by its center and angular spans.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Region {
    pub center: LatLng,
    pub lat_span_deg: f64,
    pub lon_span_deg: f64,
}

impl Region {
    pub fn new(center: LatLng, lat_span_deg: f64, lon_span_deg: f64) -> Self {
        Self {
            center,
            lat_span_deg,
            lon_span_deg,
        }
    }

    /// Corner bounds of the region.
    ///
    /// Half-spans are floored at `MIN_SPAN_DEG / 2` per axis and the corners
    /// are clamped to the valid coordinate ranges.
    pub fn bounds(&self) -> LatLngBounds {
        let half_lat = self.lat_span_deg.abs().max(MIN_SPAN_DEG) / 2.0;
        let half_lon = self.lon_span_deg.abs().max(MIN_SPAN_DEG) / 2.0;
        LatLngBounds::new(
            clamp_lat_deg(self.center.lat_deg - half_lat),
            clamp_lat_deg(self.center.lat_deg + half_lat),
            clamp_lon_deg(self.center.lon_deg - half_lon),
            clamp_lon_deg(self.center.lon_deg + half_lon),
        )
    }

    /// Approximate web-map zoom for the region's latitude span, in
    /// [`MIN_ZOOM`, `MAX_ZOOM`].
    ///
    /// Assumes a single global tile scheme and ignores the viewport aspect
    /// ratio. Good enough for threshold-based feature toggling, not for tile
    /// addressing.
    pub fn approx_zoom(&self) -> f64 {
        let span = self.lat_span_deg.abs().max(MIN_SPAN_DEG);
        (360.0 / span).log2().clamp(MIN_ZOOM, MAX_ZOOM)
    }

    /// Region centered on `center` whose latitude span corresponds to `zoom`.
    ///
    /// `aspect_ratio` is viewport width over height; the longitude span is
    /// scaled by it. Both spans are floored at `MIN_SPAN_DEG`.
    pub fn for_zoom(center: LatLng, zoom: f64, aspect_ratio: f64) -> Self {
        let lat_span_deg = (360.0 / 2f64.powf(zoom)).max(MIN_SPAN_DEG);
        let lon_span_deg = (lat_span_deg * aspect_ratio).max(MIN_SPAN_DEG);
        Self {
            center,
            lat_span_deg,
            lon_span_deg,
        }
    }
}
