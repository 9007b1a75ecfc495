/// Zoom levels at which each overlay class switches on.
///
/// A configuration surface: callers may override any threshold, the defaults
/// here match the mobile viewer.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ZoomThresholds {
    /// Properties render as polygons instead of point markers above this.
    pub polygon_detail: f64,
    /// Layout-type properties render as polygons above this lower bar.
    pub layout_polygon: f64,
    pub plot_labels: f64,
    pub amenity_polygons: f64,
    pub amenity_labels: f64,
    pub road_labels: f64,
}

impl Default for ZoomThresholds {
    fn default() -> Self {
        Self {
            polygon_detail: 16.0,
            layout_polygon: 14.0,
            plot_labels: 17.0,
            amenity_polygons: 15.5,
            amenity_labels: 16.0,
            road_labels: 16.5,
        }
    }
}

/// Which overlay classes are shown at one zoom level.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OverlayVisibility {
    pub polygon_detail: bool,
    pub plot_labels: bool,
    pub amenity_polygons: bool,
    pub amenity_labels: bool,
    pub road_labels: bool,
}

impl OverlayVisibility {
    /// Each class toggles independently once zoom crosses its threshold.
    pub fn at_zoom(zoom: f64, thresholds: &ZoomThresholds) -> Self {
        Self {
            polygon_detail: zoom >= thresholds.polygon_detail,
            plot_labels: zoom >= thresholds.plot_labels,
            amenity_polygons: zoom >= thresholds.amenity_polygons,
            amenity_labels: zoom >= thresholds.amenity_labels,
            road_labels: zoom >= thresholds.road_labels,
        }
    }
}

/// Whether a property draws its boundary polygon at this zoom.
///
/// Layout-type properties (subdivision layouts) flip at the lower
/// `layout_polygon` threshold; everything else follows `polygon_detail`.
/// Below the result the property renders as a point marker.
pub fn property_renders_polygon(
    zoom: f64,
    property_type: &str,
    thresholds: &ZoomThresholds,
) -> bool {
    if is_layout_type(property_type) {
        zoom >= thresholds.layout_polygon
    } else {
        zoom >= thresholds.polygon_detail
    }
}

fn is_layout_type(property_type: &str) -> bool {
    property_type.to_ascii_lowercase().contains("layout")
}
