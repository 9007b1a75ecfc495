//! Change detection for regions and decoded feature sets.
//!
//! Region keys stop the session from re-fetching when a camera callback
//! reports an imperceptibly different viewport. Feature diffing stops the
//! session from republishing state when the server returns the same data
//! rebuilt object-by-object.

use std::collections::{HashMap, HashSet};

use foundation::coord::LatLng;
use foundation::region::Region;
use formats::ingest::{FeatureSet, PropertyFeature};

/// Center movement at or below this many degrees counts as no movement.
pub const CENTER_MOVED_EPS_DEG: f64 = 0.00001;

/// Stable identity for a region, each component rounded to 4 decimals
/// (roughly 11 m of latitude). Regions sharing a key are close enough that
/// re-fetching would return the same features.
pub fn region_key(region: &Region) -> String {
    format!(
        "{:.4}:{:.4}:{:.4}:{:.4}",
        region.center.lat_deg, region.center.lon_deg, region.lat_span_deg, region.lon_span_deg
    )
}

/// Whether a freshly decoded feature set differs enough from the current one
/// to be worth publishing.
///
/// Properties compare by id and center; plots, roads and amenities compare
/// by id only. Attribute edits that keep id and center fixed are invisible
/// here, which is accepted: they do not move anything on the map.
pub fn features_changed(current: &FeatureSet, next: &FeatureSet) -> bool {
    properties_changed(&current.properties, &next.properties)
        || ids_changed(
            current.plots.iter().map(|p| p.id.as_str()),
            next.plots.iter().map(|p| p.id.as_str()),
        )
        || ids_changed(
            current.roads.iter().map(|r| r.id.as_str()),
            next.roads.iter().map(|r| r.id.as_str()),
        )
        || ids_changed(
            current.amenities.iter().map(|a| a.id.as_str()),
            next.amenities.iter().map(|a| a.id.as_str()),
        )
}

fn properties_changed(current: &[PropertyFeature], next: &[PropertyFeature]) -> bool {
    if current.len() != next.len() {
        return true;
    }
    let centers: HashMap<&str, LatLng> = current
        .iter()
        .map(|p| (p.id.as_str(), p.center))
        .collect();
    next.iter().any(|p| match centers.get(p.id.as_str()) {
        Some(center) => center_moved(*center, p.center),
        None => true,
    })
}

fn center_moved(a: LatLng, b: LatLng) -> bool {
    (a.lat_deg - b.lat_deg).abs() > CENTER_MOVED_EPS_DEG
        || (a.lon_deg - b.lon_deg).abs() > CENTER_MOVED_EPS_DEG
}

fn ids_changed<'a, I, J>(current: I, mut next: J) -> bool
where
    I: ExactSizeIterator<Item = &'a str>,
    J: ExactSizeIterator<Item = &'a str>,
{
    if current.len() != next.len() {
        return true;
    }
    let seen: HashSet<&str> = current.collect();
    next.any(|id| !seen.contains(id))
}
