use foundation::coord::LatLng;
use serde_json::Value;

use crate::fields;
use crate::geojson::GeoJson;

const PROPERTIES_KEYS: &[&str] = &["properties", "Properties"];
const PLOTS_KEYS: &[&str] = &["plots", "Plots"];
const ROADS_KEYS: &[&str] = &["roads", "Roads"];
const AMENITIES_KEYS: &[&str] = &["amenities", "Amenities"];

const ID_KEYS: &[&str] = &["id", "Id", "ID"];
const NAME_KEYS: &[&str] = &["name", "Name"];
const TYPE_KEYS: &[&str] = &["propertyType", "PropertyType"];
const PLOT_NUMBER_KEYS: &[&str] = &["plotNumber", "PlotNumber"];
const OWNED_KEYS: &[&str] = &["isOwnedByCurrentUser", "IsOwnedByCurrentUser"];

const CENTER_KEYS: &[&str] = &["centerGeoJson", "CenterGeoJson"];
const BOUNDARY_KEYS: &[&str] = &["boundaryGeoJson", "BoundaryGeoJson"];
const ROAD_GEO_KEYS: &[&str] = &["roadGeoJson", "RoadGeoJson"];

/// A sellable property or development.
///
/// Notes:
/// - `center` is required; the decoder drops features without one.
/// - `polygon_paths` may be empty (point-marker-only properties).
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyFeature {
    pub id: String,
    pub name: String,
    pub property_type: String,
    pub owned: bool,
    pub center: LatLng,
    pub polygon_paths: Vec<Vec<LatLng>>,
}

/// One numbered plot inside a subdivision layout.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotFeature {
    pub id: String,
    pub plot_number: Option<String>,
    /// Label offset reference when the payload carries one.
    pub center: Option<LatLng>,
    pub polygon_paths: Vec<Vec<LatLng>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoadFeature {
    pub id: String,
    pub name: Option<String>,
    pub paths: Vec<Vec<LatLng>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AmenityFeature {
    pub id: String,
    pub name: String,
    pub polygon_paths: Vec<Vec<LatLng>>,
}

/// Everything one viewport response decodes to. Rebuilt wholesale on each
/// successful fetch, never patched in place.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureSet {
    pub properties: Vec<PropertyFeature>,
    pub plots: Vec<PlotFeature>,
    pub roads: Vec<RoadFeature>,
    pub amenities: Vec<AmenityFeature>,
    /// Ids of properties dropped for lacking a derivable center.
    pub missing_center_ids: Vec<String>,
}

impl FeatureSet {
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
            && self.plots.is_empty()
            && self.roads.is_empty()
            && self.amenities.is_empty()
    }
}

/// Decode a raw viewport payload into typed features.
///
/// Infallible: malformed geometry is logged and treated as absent, features
/// that end up without an id, a required center, or any path are dropped.
pub fn decode_viewport_payload(payload: &Value) -> FeatureSet {
    let mut out = FeatureSet::default();

    for raw in feature_array(payload, PROPERTIES_KEYS) {
        let Some(id) = fields::id_string(raw, ID_KEYS) else {
            continue;
        };
        let center = geometry_field(raw, CENTER_KEYS).and_then(|geo| geo.center());
        let Some(center) = center else {
            out.missing_center_ids.push(id);
            continue;
        };
        let polygon_paths = geometry_field(raw, BOUNDARY_KEYS)
            .map(|geo| geo.polygon_paths())
            .unwrap_or_default();

        out.properties.push(PropertyFeature {
            id,
            name: fields::first_str(raw, NAME_KEYS).unwrap_or("Property").to_string(),
            property_type: fields::first_str(raw, TYPE_KEYS).unwrap_or_default().to_string(),
            owned: fields::first_bool(raw, OWNED_KEYS).unwrap_or(false),
            center,
            polygon_paths,
        });
    }

    for raw in feature_array(payload, PLOTS_KEYS) {
        let Some(id) = fields::id_string(raw, ID_KEYS) else {
            continue;
        };
        let Some(geo) = geometry_field(raw, BOUNDARY_KEYS) else {
            continue;
        };
        let polygon_paths = geo.polygon_paths();
        if polygon_paths.is_empty() {
            continue;
        }

        out.plots.push(PlotFeature {
            id,
            plot_number: fields::first_str(raw, PLOT_NUMBER_KEYS).map(str::to_string),
            center: geometry_field(raw, CENTER_KEYS).and_then(|geo| geo.center()),
            polygon_paths,
        });
    }

    for raw in feature_array(payload, ROADS_KEYS) {
        let Some(id) = fields::id_string(raw, ID_KEYS) else {
            continue;
        };
        let Some(geo) = geometry_field(raw, ROAD_GEO_KEYS) else {
            continue;
        };
        let paths = geo.line_paths();
        if paths.is_empty() {
            continue;
        }

        out.roads.push(RoadFeature {
            id,
            name: fields::first_str(raw, NAME_KEYS).map(str::to_string),
            paths,
        });
    }

    for raw in feature_array(payload, AMENITIES_KEYS) {
        let Some(id) = fields::id_string(raw, ID_KEYS) else {
            continue;
        };
        let Some(geo) = geometry_field(raw, BOUNDARY_KEYS) else {
            continue;
        };
        let polygon_paths = geo.polygon_paths();
        if polygon_paths.is_empty() {
            continue;
        }

        out.amenities.push(AmenityFeature {
            id,
            name: fields::first_str(raw, NAME_KEYS).unwrap_or("Amenity").to_string(),
            polygon_paths,
        });
    }

    tracing::debug!(
        "decoded viewport payload: {} properties, {} plots, {} roads, {} amenities, {} missing centers",
        out.properties.len(),
        out.plots.len(),
        out.roads.len(),
        out.amenities.len(),
        out.missing_center_ids.len()
    );
    out
}

fn feature_array<'a>(payload: &'a Value, keys: &[&str]) -> &'a [Value] {
    fields::first_value(payload, keys)
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Geometry fields arrive as embedded JSON text or as an object; both parse
/// to the same tree. Unparseable geometry is logged and treated as absent.
fn geometry_field(raw: &Value, keys: &[&str]) -> Option<GeoJson> {
    let value = fields::first_value(raw, keys)?;
    let parsed = match value {
        Value::String(text) => GeoJson::from_str(text),
        other => GeoJson::from_value(other),
    };
    match parsed {
        Ok(geo) => Some(geo),
        Err(err) => {
            tracing::warn!("dropping unparseable {} geometry: {err}", keys[0]);
            None
        }
    }
}
