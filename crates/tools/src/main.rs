use std::env;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use foundation::bounds::LatLngBounds;
use foundation::coord::LatLng;
use foundation::math::{
    offset_by_meters, polygon_approx_area_m2, polygon_centroid, road_label_anchor,
};
use foundation::region::Region;
use formats::ingest::FeatureSet;
use layers::labels::{amenity_label_font_px, plot_label_font_px, road_label_font_px};
use layers::symbology::{PathStyle, road_path_style};
use layers::visibility::{OverlayVisibility, ZoomThresholds, property_renders_polygon};
use serde::Serialize;
use tracing::info;
use tracing_subscriber::EnvFilter;
use viewport::client::HttpViewportClient;
use viewport::config::ViewportConfig;
use viewport::fetch::{ViewportFetcher, ViewportQuery};

/// Eastward nudge that keeps plot labels clear of the boundary stroke.
const PLOT_LABEL_NUDGE_EAST_M: f64 = 3.0;

#[derive(Parser, Debug)]
#[command(author, version, about = "Viewport feature fetcher and payload inspector")]
struct Args {
    /// Backend base URL (default: PLOTMAP_BASE_URL)
    #[arg(long)]
    base_url: Option<String>,

    /// Bearer token for authenticated fetches (default: PLOTMAP_TOKEN)
    #[arg(long)]
    token: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Fetch one viewport from the backend and summarize its features
    Fetch {
        /// Viewport center: lat,lng
        #[arg(long, conflicts_with = "bounds")]
        center: Option<String>,

        /// Explicit corner bounds: minLat,minLng,maxLat,maxLng
        #[arg(long)]
        bounds: Option<String>,

        /// Approximate zoom level
        #[arg(long, default_value_t = 17.0)]
        zoom: f64,

        /// Viewport width over height (used with --center)
        #[arg(long, default_value_t = 1.0)]
        aspect: f64,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Summarize a saved viewport payload without touching the network
    Inspect {
        /// Path to a JSON payload file
        payload: PathBuf,

        /// Zoom level for visibility and label sizing
        #[arg(long, default_value_t = 17.0)]
        zoom: f64,

        /// Emit the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    match args.command {
        Command::Fetch {
            center,
            bounds,
            zoom,
            aspect,
            json,
        } => {
            let base_url = args
                .base_url
                .or_else(|| env::var("PLOTMAP_BASE_URL").ok())
                .ok_or("missing base URL: pass --base-url or set PLOTMAP_BASE_URL")?;
            let token = args.token.or_else(|| env::var("PLOTMAP_TOKEN").ok());
            let query = build_query(center.as_deref(), bounds.as_deref(), zoom, aspect)?;

            let mut config = ViewportConfig::new(base_url);
            config.auth_token = token;
            let client = HttpViewportClient::new(config)?;

            info!(zoom = query.zoom, "fetching viewport");
            let payload = client.fetch_viewport(query).await?;
            let features = formats::decode_viewport_payload(&payload);
            emit(&summarize(&features, query.zoom), json)?;
        }
        Command::Inspect { payload, zoom, json } => {
            let text = std::fs::read_to_string(&payload)?;
            let value: serde_json::Value = serde_json::from_str(&text)?;
            let features = formats::decode_viewport_payload(&value);
            emit(&summarize(&features, zoom), json)?;
        }
    }

    Ok(())
}

fn build_query(
    center: Option<&str>,
    bounds: Option<&str>,
    zoom: f64,
    aspect: f64,
) -> Result<ViewportQuery, Box<dyn std::error::Error>> {
    if let Some(bounds) = bounds {
        let parts = parse_floats(bounds, 4, "minLat,minLng,maxLat,maxLng")?;
        return Ok(ViewportQuery {
            bounds: LatLngBounds::new(parts[0], parts[2], parts[1], parts[3]),
            zoom,
        });
    }
    let Some(center) = center else {
        return Err("pass --center lat,lng or --bounds minLat,minLng,maxLat,maxLng".into());
    };
    let parts = parse_floats(center, 2, "lat,lng")?;
    let center = LatLng::checked(parts[0], parts[1]).ok_or("center must be a finite lat,lng pair")?;
    Ok(ViewportQuery::from_region(&Region::for_zoom(
        center, zoom, aspect,
    )))
}

fn parse_floats(
    text: &str,
    count: usize,
    shape: &str,
) -> Result<Vec<f64>, Box<dyn std::error::Error>> {
    let parts: Vec<_> = text.split(',').collect();
    if parts.len() != count {
        return Err(format!("expected {shape}").into());
    }
    let mut values = Vec::with_capacity(count);
    for part in parts {
        let value: f64 = part
            .trim()
            .parse()
            .map_err(|_| format!("expected {shape}"))?;
        values.push(value);
    }
    Ok(values)
}

#[derive(Debug, Serialize)]
struct ViewportSummary {
    zoom: f64,
    property_count: usize,
    plot_count: usize,
    road_count: usize,
    amenity_count: usize,
    visibility: VisibilitySummary,
    plot_label_font_px: f32,
    road_label_font_px: f32,
    missing_center_ids: Vec<String>,
    properties: Vec<PropertySummary>,
    plots: Vec<PlotSummary>,
    roads: Vec<RoadSummary>,
    amenities: Vec<AmenitySummary>,
}

#[derive(Debug, Serialize)]
struct VisibilitySummary {
    polygon_detail: bool,
    plot_labels: bool,
    amenity_polygons: bool,
    amenity_labels: bool,
    road_labels: bool,
}

impl From<OverlayVisibility> for VisibilitySummary {
    fn from(v: OverlayVisibility) -> Self {
        Self {
            polygon_detail: v.polygon_detail,
            plot_labels: v.plot_labels,
            amenity_polygons: v.amenity_polygons,
            amenity_labels: v.amenity_labels,
            road_labels: v.road_labels,
        }
    }
}

#[derive(Debug, Serialize)]
struct PropertySummary {
    id: String,
    name: String,
    property_type: String,
    owned: bool,
    lat: f64,
    lng: f64,
    renders_polygon: bool,
    area_m2: Option<f64>,
}

#[derive(Debug, Serialize)]
struct PlotSummary {
    id: String,
    plot_number: Option<String>,
    area_m2: Option<f64>,
    label_lat: Option<f64>,
    label_lng: Option<f64>,
}

#[derive(Debug, Serialize)]
struct RoadSummary {
    id: String,
    name: Option<String>,
    open_paths: usize,
    closed_paths: usize,
    label_lat: Option<f64>,
    label_lng: Option<f64>,
    label_angle_deg: Option<f64>,
}

#[derive(Debug, Serialize)]
struct AmenitySummary {
    id: String,
    name: String,
    lat: Option<f64>,
    lng: Option<f64>,
    area_m2: Option<f64>,
    label_font_px: f32,
}

fn summarize(features: &FeatureSet, zoom: f64) -> ViewportSummary {
    let thresholds = ZoomThresholds::default();
    let visibility = OverlayVisibility::at_zoom(zoom, &thresholds);

    let properties = features
        .properties
        .iter()
        .map(|p| PropertySummary {
            id: p.id.clone(),
            name: p.name.clone(),
            property_type: p.property_type.clone(),
            owned: p.owned,
            lat: p.center.lat_deg,
            lng: p.center.lon_deg,
            renders_polygon: property_renders_polygon(zoom, &p.property_type, &thresholds),
            area_m2: polygon_approx_area_m2(&p.polygon_paths),
        })
        .collect();

    let plots = features
        .plots
        .iter()
        .map(|p| {
            let anchor = p.center.or_else(|| polygon_centroid(&p.polygon_paths));
            let label = anchor.map(|a| offset_by_meters(a, PLOT_LABEL_NUDGE_EAST_M, 0.0));
            PlotSummary {
                id: p.id.clone(),
                plot_number: p.plot_number.clone(),
                area_m2: polygon_approx_area_m2(&p.polygon_paths),
                label_lat: label.map(|l| l.lat_deg),
                label_lng: label.map(|l| l.lon_deg),
            }
        })
        .collect();

    let roads = features
        .roads
        .iter()
        .map(|r| {
            let anchor = road_label_anchor(&r.paths);
            let closed_paths = r
                .paths
                .iter()
                .filter(|path| road_path_style(path) == PathStyle::Polygon)
                .count();
            RoadSummary {
                id: r.id.clone(),
                name: r.name.clone(),
                open_paths: r.paths.len() - closed_paths,
                closed_paths,
                label_lat: anchor.map(|a| a.position.lat_deg),
                label_lng: anchor.map(|a| a.position.lon_deg),
                label_angle_deg: anchor.map(|a| a.angle_deg),
            }
        })
        .collect();

    let amenities = features
        .amenities
        .iter()
        .map(|a| {
            let center = polygon_centroid(&a.polygon_paths);
            let area = polygon_approx_area_m2(&a.polygon_paths);
            AmenitySummary {
                id: a.id.clone(),
                name: a.name.clone(),
                lat: center.map(|c| c.lat_deg),
                lng: center.map(|c| c.lon_deg),
                area_m2: area,
                label_font_px: amenity_label_font_px(area),
            }
        })
        .collect();

    ViewportSummary {
        zoom,
        property_count: features.properties.len(),
        plot_count: features.plots.len(),
        road_count: features.roads.len(),
        amenity_count: features.amenities.len(),
        visibility: visibility.into(),
        plot_label_font_px: plot_label_font_px(zoom),
        road_label_font_px: road_label_font_px(zoom),
        missing_center_ids: features.missing_center_ids.clone(),
        properties,
        plots,
        roads,
        amenities,
    }
}

fn emit(summary: &ViewportSummary, as_json: bool) -> Result<(), Box<dyn std::error::Error>> {
    if as_json {
        println!("{}", serde_json::to_string_pretty(summary)?);
        return Ok(());
    }

    println!(
        "zoom {:.2}  properties {}  plots {}  roads {}  amenities {}",
        summary.zoom,
        summary.property_count,
        summary.plot_count,
        summary.road_count,
        summary.amenity_count
    );
    let v = &summary.visibility;
    println!(
        "visible: polygons={} plot_labels={} amenity_polygons={} amenity_labels={} road_labels={}",
        v.polygon_detail, v.plot_labels, v.amenity_polygons, v.amenity_labels, v.road_labels
    );
    println!(
        "label px: plot {}  road {}",
        summary.plot_label_font_px, summary.road_label_font_px
    );
    if !summary.missing_center_ids.is_empty() {
        println!(
            "warning: {} properties without a usable center: {}",
            summary.missing_center_ids.len(),
            summary.missing_center_ids.join(", ")
        );
    }

    for p in &summary.properties {
        println!(
            "property\t{}\t{}\t{}\t{:.6},{:.6}\t{}\t{}",
            p.id,
            p.name,
            p.property_type,
            p.lat,
            p.lng,
            if p.renders_polygon { "polygon" } else { "marker" },
            area_cell(p.area_m2)
        );
    }
    for p in &summary.plots {
        println!(
            "plot\t{}\t{}\t{}\t{}",
            p.id,
            p.plot_number.as_deref().unwrap_or("-"),
            coord_cell(p.label_lat, p.label_lng),
            area_cell(p.area_m2)
        );
    }
    for r in &summary.roads {
        println!(
            "road\t{}\t{}\t{} open / {} closed\t{}\t{}",
            r.id,
            r.name.as_deref().unwrap_or("-"),
            r.open_paths,
            r.closed_paths,
            coord_cell(r.label_lat, r.label_lng),
            r.label_angle_deg
                .map(|a| format!("{a:.1} deg"))
                .unwrap_or_else(|| "-".to_string())
        );
    }
    for a in &summary.amenities {
        println!(
            "amenity\t{}\t{}\t{}\t{}\t{}px",
            a.id,
            a.name,
            coord_cell(a.lat, a.lng),
            area_cell(a.area_m2),
            a.label_font_px
        );
    }

    Ok(())
}

fn area_cell(area_m2: Option<f64>) -> String {
    match area_m2 {
        Some(area) => format!("{area:.0} m2"),
        None => "-".to_string(),
    }
}

fn coord_cell(lat: Option<f64>, lng: Option<f64>) -> String {
    match (lat, lng) {
        (Some(lat), Some(lng)) => format!("{lat:.6},{lng:.6}"),
        _ => "-".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounds_flag_maps_to_corner_order() {
        let query = build_query(None, Some("17.39, 78.49, 17.41, 78.51"), 16.0, 1.0).unwrap();
        assert_eq!(query.bounds.min_lat_deg, 17.39);
        assert_eq!(query.bounds.max_lat_deg, 17.41);
        assert_eq!(query.bounds.min_lon_deg, 78.49);
        assert_eq!(query.bounds.max_lon_deg, 78.51);
        assert_eq!(query.zoom, 16.0);
    }

    #[test]
    fn center_flag_builds_a_region_for_the_zoom() {
        let query = build_query(Some("17.4,78.5"), None, 17.0, 1.0).unwrap();
        let expected_span = 360.0 / 2f64.powf(17.0);
        let span = query.bounds.max_lat_deg - query.bounds.min_lat_deg;
        assert!((span - expected_span).abs() < 1e-12);
        assert!((query.zoom - 17.0).abs() < 1e-9);
    }

    #[test]
    fn malformed_inputs_are_rejected() {
        assert!(build_query(None, None, 17.0, 1.0).is_err());
        assert!(build_query(Some("17.4"), None, 17.0, 1.0).is_err());
        assert!(build_query(None, Some("a,b,c,d"), 17.0, 1.0).is_err());
    }

    #[test]
    fn summarize_applies_zoom_policy() {
        let payload = serde_json::json!({
            "properties": [{
                "id": "prop-1",
                "name": "Green Acres",
                "propertyType": "Layout",
                "centerGeoJson": { "type": "Point", "coordinates": [78.5, 17.4] },
            }],
            "amenities": [{
                "id": "am-1",
                "name": "Clubhouse",
                "boundaryGeoJson": {
                    "type": "Polygon",
                    "coordinates": [[
                        [78.5, 17.4],
                        [78.501, 17.4],
                        [78.501, 17.401],
                        [78.5, 17.401],
                        [78.5, 17.4]
                    ]]
                },
            }],
        });
        let features = formats::decode_viewport_payload(&payload);
        let summary = summarize(&features, 17.5);

        assert_eq!(summary.property_count, 1);
        assert_eq!(summary.amenity_count, 1);
        assert_eq!(summary.plot_label_font_px, 8.0);
        assert!(summary.visibility.plot_labels);
        assert!(summary.properties[0].renders_polygon);
        assert!(summary.amenities[0].area_m2.unwrap() > 0.0);
        assert!(summary.amenities[0].label_font_px >= 12.0);
    }
}
