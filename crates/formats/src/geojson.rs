use foundation::coord::LatLng;
use serde_json::Value;

/// A parsed GeoJSON document.
///
/// Closed set of the kinds the viewport payload carries. Wire order for
/// positions is `[lon, lat]`; everything past the parser speaks `LatLng`.
#[derive(Debug, Clone, PartialEq)]
pub enum GeoJson {
    Point(LatLng),
    LineString(Vec<LatLng>),
    MultiLineString(Vec<Vec<LatLng>>),
    Polygon(Vec<Vec<LatLng>>),
    MultiPolygon(Vec<Vec<Vec<LatLng>>>),
    Feature { geometry: Option<Box<GeoJson>> },
    FeatureCollection(Vec<GeoJson>),
}

#[derive(Debug)]
pub enum GeoJsonError {
    Parse(String),
    NotAnObject,
    MissingType,
    UnsupportedType(String),
    BadGeometry(String),
}

impl std::fmt::Display for GeoJsonError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            GeoJsonError::Parse(reason) => write!(f, "GeoJSON parse error: {reason}"),
            GeoJsonError::NotAnObject => write!(f, "GeoJSON value must be an object"),
            GeoJsonError::MissingType => write!(f, "GeoJSON object missing type"),
            GeoJsonError::UnsupportedType(ty) => write!(f, "unsupported GeoJSON type: {ty}"),
            GeoJsonError::BadGeometry(reason) => write!(f, "bad geometry: {reason}"),
        }
    }
}

impl std::error::Error for GeoJsonError {}

impl GeoJson {
    pub fn from_str(text: &str) -> Result<Self, GeoJsonError> {
        let value: Value =
            serde_json::from_str(text).map_err(|e| GeoJsonError::Parse(e.to_string()))?;
        Self::from_value(&value)
    }

    pub fn from_value(value: &Value) -> Result<Self, GeoJsonError> {
        let obj = value.as_object().ok_or(GeoJsonError::NotAnObject)?;
        let ty = obj
            .get("type")
            .and_then(|v| v.as_str())
            .ok_or(GeoJsonError::MissingType)?;

        match ty {
            "Point" => {
                let coords = coordinates(value)?;
                let point = position(coords)
                    .ok_or_else(|| GeoJsonError::BadGeometry("Point needs [lon, lat]".into()))?;
                Ok(GeoJson::Point(point))
            }
            "LineString" => Ok(GeoJson::LineString(parse_line(coordinates(value)?)?)),
            "MultiLineString" => {
                let arr = array_of(coordinates(value)?, "MultiLineString")?;
                let lines = arr
                    .iter()
                    .map(parse_line)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GeoJson::MultiLineString(lines))
            }
            "Polygon" => Ok(GeoJson::Polygon(parse_rings(coordinates(value)?)?)),
            "MultiPolygon" => {
                let arr = array_of(coordinates(value)?, "MultiPolygon")?;
                let polys = arr
                    .iter()
                    .map(parse_rings)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GeoJson::MultiPolygon(polys))
            }
            "Feature" => {
                let geometry = match obj.get("geometry") {
                    None | Some(Value::Null) => None,
                    Some(geom) => Some(Box::new(Self::from_value(geom)?)),
                };
                Ok(GeoJson::Feature { geometry })
            }
            "FeatureCollection" => {
                let features = obj
                    .get("features")
                    .and_then(Value::as_array)
                    .ok_or_else(|| {
                        GeoJsonError::BadGeometry("FeatureCollection missing features".into())
                    })?;
                let parsed = features
                    .iter()
                    .map(Self::from_value)
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(GeoJson::FeatureCollection(parsed))
            }
            other => Err(GeoJsonError::UnsupportedType(other.to_string())),
        }
    }

    /// Best-effort center used for markers and labels.
    ///
    /// Points resolve directly; lines and polygons fall back to their first
    /// vertex; a collection takes its first feature with a resolvable center.
    pub fn center(&self) -> Option<LatLng> {
        match self {
            GeoJson::Point(point) => Some(*point),
            GeoJson::LineString(line) => line.first().copied(),
            GeoJson::MultiLineString(_) => None,
            GeoJson::Polygon(rings) => rings.first().and_then(|ring| ring.first()).copied(),
            GeoJson::MultiPolygon(polys) => polys
                .first()
                .and_then(|poly| poly.first())
                .and_then(|ring| ring.first())
                .copied(),
            GeoJson::Feature { geometry } => geometry.as_deref().and_then(GeoJson::center),
            GeoJson::FeatureCollection(features) => features.iter().find_map(GeoJson::center),
        }
    }

    /// One renderable path per outer ring; inner rings are dropped.
    pub fn polygon_paths(&self) -> Vec<Vec<LatLng>> {
        match self {
            GeoJson::Polygon(rings) => rings
                .first()
                .filter(|ring| ring.len() > 2)
                .map(|ring| vec![ring.clone()])
                .unwrap_or_default(),
            GeoJson::MultiPolygon(polys) => polys
                .iter()
                .filter_map(|poly| poly.first())
                .filter(|ring| ring.len() > 2)
                .cloned()
                .collect(),
            GeoJson::Feature { geometry } => geometry
                .as_deref()
                .map(GeoJson::polygon_paths)
                .unwrap_or_default(),
            GeoJson::FeatureCollection(features) => features
                .iter()
                .flat_map(GeoJson::polygon_paths)
                .collect(),
            GeoJson::Point(_) | GeoJson::LineString(_) | GeoJson::MultiLineString(_) => Vec::new(),
        }
    }

    /// Paths drawable as lines. A polygon contributes its outer ring so
    /// closed-loop roads survive.
    pub fn line_paths(&self) -> Vec<Vec<LatLng>> {
        match self {
            GeoJson::LineString(line) => {
                if line.len() > 1 {
                    vec![line.clone()]
                } else {
                    Vec::new()
                }
            }
            GeoJson::MultiLineString(lines) => {
                lines.iter().filter(|line| line.len() > 1).cloned().collect()
            }
            GeoJson::Polygon(rings) => rings
                .first()
                .filter(|ring| ring.len() > 1)
                .map(|ring| vec![ring.clone()])
                .unwrap_or_default(),
            GeoJson::Feature { geometry } => geometry
                .as_deref()
                .map(GeoJson::line_paths)
                .unwrap_or_default(),
            GeoJson::FeatureCollection(features) => {
                features.iter().flat_map(GeoJson::line_paths).collect()
            }
            GeoJson::Point(_) | GeoJson::MultiPolygon(_) => Vec::new(),
        }
    }
}

fn coordinates(value: &Value) -> Result<&Value, GeoJsonError> {
    value
        .get("coordinates")
        .ok_or_else(|| GeoJsonError::BadGeometry("geometry missing coordinates".into()))
}

fn array_of<'a>(coords: &'a Value, kind: &str) -> Result<&'a Vec<Value>, GeoJsonError> {
    coords
        .as_array()
        .ok_or_else(|| GeoJsonError::BadGeometry(format!("{kind} coordinates must be an array")))
}

// The [lon, lat] to LatLng axis swap happens here and nowhere else.
fn position(value: &Value) -> Option<LatLng> {
    let arr = value.as_array()?;
    let lon = arr.first()?.as_f64()?;
    let lat = arr.get(1)?.as_f64()?;
    LatLng::checked(lat, lon)
}

// Vertices that are not a finite [lon, lat] pair are skipped, not fatal.
fn parse_line(coords: &Value) -> Result<Vec<LatLng>, GeoJsonError> {
    let arr = coords
        .as_array()
        .ok_or_else(|| GeoJsonError::BadGeometry("coordinates must be an array".into()))?;
    Ok(arr.iter().filter_map(position).collect())
}

fn parse_rings(coords: &Value) -> Result<Vec<Vec<LatLng>>, GeoJsonError> {
    let rings = coords
        .as_array()
        .ok_or_else(|| GeoJsonError::BadGeometry("Polygon coordinates must be rings".into()))?;
    rings.iter().map(parse_line).collect()
}
