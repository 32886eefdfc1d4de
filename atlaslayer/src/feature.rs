//! Feature collection helpers.
//!
//! The decoded data model is the `geojson` crate's `FeatureCollection`;
//! this module adds the small pieces the cache needs around it: empty
//! collections for failed loads, a deterministic byte-size estimate for
//! eviction accounting, and property-bag access.

use geojson::{Feature, FeatureCollection, Geometry, Value};

/// Fixed per-feature overhead in the size estimate (allocation headers,
/// id, bbox slots).
const FEATURE_OVERHEAD_BYTES: usize = 64;

/// Bytes charged per coordinate pair.
const COORD_BYTES: usize = 16;

/// An empty but valid feature collection.
///
/// Cached in place of data that failed to fetch or decode, so the render
/// layer always has something (possibly nothing) to draw.
pub fn empty_collection() -> FeatureCollection {
    FeatureCollection {
        bbox: None,
        features: Vec::new(),
        foreign_members: None,
    }
}

/// Deterministic estimate of a collection's resident size in bytes.
///
/// Charges each coordinate pair and the serialized property bag. The
/// estimate feeds the cache's size ceiling; it does not need to match the
/// allocator exactly, only to be stable and monotone in the data.
pub fn estimate_size(collection: &FeatureCollection) -> usize {
    collection
        .features
        .iter()
        .map(feature_size)
        .sum::<usize>()
        .max(1)
}

fn feature_size(feature: &Feature) -> usize {
    let geometry = feature
        .geometry
        .as_ref()
        .map(|g| coordinate_count(g) * COORD_BYTES)
        .unwrap_or(0);
    let properties = feature
        .properties
        .as_ref()
        .map(|p| serde_json::to_string(p).map(|s| s.len()).unwrap_or(0))
        .unwrap_or(0);
    FEATURE_OVERHEAD_BYTES + geometry + properties
}

/// Number of coordinate pairs in a geometry, recursing into collections.
pub fn coordinate_count(geometry: &Geometry) -> usize {
    match &geometry.value {
        Value::Point(_) => 1,
        Value::MultiPoint(points) => points.len(),
        Value::LineString(line) => line.len(),
        Value::MultiLineString(lines) => lines.iter().map(Vec::len).sum(),
        Value::Polygon(rings) => rings.iter().map(Vec::len).sum(),
        Value::MultiPolygon(polygons) => polygons
            .iter()
            .map(|rings| rings.iter().map(Vec::len).sum::<usize>())
            .sum(),
        Value::GeometryCollection(members) => members.iter().map(coordinate_count).sum(),
    }
}

/// The feature's id from its property bag, if present.
pub fn property_id(feature: &Feature) -> Option<&str> {
    feature
        .properties
        .as_ref()
        .and_then(|props| props.get("id"))
        .and_then(|value| value.as_str())
}
