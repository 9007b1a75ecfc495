/// Largest amenity footprint that still scales its label (square meters).
pub const AMENITY_MAX_AREA_M2: f64 = 15_000.0;
/// Smallest amenity label size.
pub const AMENITY_MIN_FONT_PX: f32 = 12.0;
/// Largest amenity label size.
pub const AMENITY_MAX_FONT_PX: f32 = 30.0;

/// Font size in pixels for a plot-number label at the given zoom.
pub fn plot_label_font_px(zoom: f64) -> f32 {
    zoom_band_font_px(zoom)
}

/// Font size in pixels for a road-name label at the given zoom.
pub fn road_label_font_px(zoom: f64) -> f32 {
    zoom_band_font_px(zoom)
}

// Plot and road labels share one band table.
fn zoom_band_font_px(zoom: f64) -> f32 {
    if zoom >= 17.0 && zoom < 17.25 {
        6.0
    } else if zoom >= 17.25 && zoom < 17.5 {
        7.0
    } else if zoom >= 17.5 && zoom < 18.0 {
        8.0
    } else if zoom >= 18.0 && zoom < 19.0 {
        9.0
    } else {
        11.0
    }
}

/// Font size in pixels for an amenity label, eased from its polygon area.
///
/// The area is normalized against [`AMENITY_MAX_AREA_M2`], eased with a
/// square root so small amenities stay legible without large ones exploding,
/// mapped into the 12px to 30px range and rounded to a whole pixel. Missing
/// or non-positive areas get the minimum size.
pub fn amenity_label_font_px(area_m2: Option<f64>) -> f32 {
    let area = match area_m2 {
        Some(area) if area > 0.0 => area,
        _ => return AMENITY_MIN_FONT_PX,
    };
    let eased = (area / AMENITY_MAX_AREA_M2).clamp(0.0, 1.0).sqrt();
    let size =
        AMENITY_MIN_FONT_PX as f64 + eased * (AMENITY_MAX_FONT_PX - AMENITY_MIN_FONT_PX) as f64;
    size.round() as f32
}
