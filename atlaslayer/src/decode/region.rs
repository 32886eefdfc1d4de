//! Region document normalization and province filtering.
//!
//! Region boundary documents come in two accepted shapes: a GeoJSON
//! FeatureCollection, or a flat `{featureId: Feature}` mapping. The flat
//! shape is normalized by taking the mapping's values and assigning each
//! feature's `properties.id` from its mapping key when absent. Anything
//! else is a [`ParseError`].

use std::collections::HashMap;

use geojson::{Feature, FeatureCollection};
use serde_json::Value as JsonValue;
use tracing::debug;

use super::error::ParseError;
use crate::feature::property_id;

/// Parse a region boundary document.
///
/// # Errors
///
/// [`ParseError::Json`] when the payload is not JSON at all,
/// [`ParseError::UnrecognizedShape`] when the top-level shape is neither
/// accepted form.
pub fn parse_region_document(bytes: &[u8]) -> Result<FeatureCollection, ParseError> {
    let value: JsonValue = serde_json::from_slice(bytes)?;

    if value.get("type").and_then(JsonValue::as_str) == Some("FeatureCollection") {
        let collection: FeatureCollection =
            serde_json::from_value(value).map_err(|_| ParseError::UnrecognizedShape)?;
        return Ok(collection);
    }

    let JsonValue::Object(map) = value else {
        return Err(ParseError::UnrecognizedShape);
    };

    let mut features = Vec::with_capacity(map.len());
    for (id, raw) in map {
        let mut feature: Feature =
            serde_json::from_value(raw).map_err(|_| ParseError::UnrecognizedShape)?;
        ensure_property_id(&mut feature, &id);
        features.push(feature);
    }

    debug!(features = features.len(), "Normalized flat region mapping");
    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Assign `properties.id` from the mapping key when the feature carries
/// no id of its own.
fn ensure_property_id(feature: &mut Feature, id: &str) {
    let properties = feature.properties.get_or_insert_with(Default::default);
    if !properties.contains_key("id") {
        properties.insert("id".to_string(), JsonValue::String(id.to_string()));
    }
}

/// Accepted province id prefixes per country.
///
/// Most countries accept exactly `"{CODE}_"`. Exceptions are data in the
/// override table, not code: France's metropolitan features carry the
/// historical `FXX_` prefix alongside `FRA_`.
#[derive(Debug, Clone)]
pub struct PrefixTable {
    overrides: HashMap<String, Vec<String>>,
}

impl Default for PrefixTable {
    fn default() -> Self {
        let mut overrides = HashMap::new();
        overrides.insert(
            "FRA".to_string(),
            vec!["FRA_".to_string(), "FXX_".to_string()],
        );
        Self { overrides }
    }
}

impl PrefixTable {
    /// An empty table with no exceptions.
    pub fn empty() -> Self {
        Self {
            overrides: HashMap::new(),
        }
    }

    /// Add or replace the accepted prefixes for one country.
    pub fn with_override(mut self, country: &str, prefixes: Vec<String>) -> Self {
        self.overrides
            .insert(country.to_ascii_uppercase(), prefixes);
        self
    }

    /// Accepted prefixes for a country, defaulting to `"{CODE}_"`.
    pub fn accepted_prefixes(&self, country: &str) -> Vec<String> {
        let code = country.to_ascii_uppercase();
        self.overrides
            .get(&code)
            .cloned()
            .unwrap_or_else(|| vec![format!("{}_", code)])
    }
}

/// Keep only features belonging to the given country.
///
/// Matches each feature's `properties.id` (uppercased) against the
/// country's accepted prefixes; features without an id are dropped.
pub fn filter_provinces(
    mut collection: FeatureCollection,
    country: &str,
    table: &PrefixTable,
) -> FeatureCollection {
    let prefixes = table.accepted_prefixes(country);
    collection.features.retain(|feature| {
        property_id(feature)
            .map(|id| {
                let upper = id.to_ascii_uppercase();
                prefixes.iter().any(|prefix| upper.starts_with(prefix))
            })
            .unwrap_or(false)
    });
    collection
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn feature_json(id: Option<&str>) -> JsonValue {
        let mut properties = serde_json::Map::new();
        if let Some(id) = id {
            properties.insert("id".to_string(), json!(id));
        }
        json!({
            "type": "Feature",
            "geometry": { "type": "Point", "coordinates": [4.9, 52.4] },
            "properties": properties,
        })
    }

    #[test]
    fn test_parse_feature_collection_shape() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [feature_json(Some("NLD"))],
        });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        assert_eq!(collection.features.len(), 1);
        assert_eq!(property_id(&collection.features[0]), Some("NLD"));
    }

    #[test]
    fn test_parse_flat_mapping_shape() {
        let doc = json!({
            "NLD_01": feature_json(Some("NLD_01")),
            "NLD_02": feature_json(Some("NLD_02")),
        });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        assert_eq!(collection.features.len(), 2);
    }

    #[test]
    fn test_flat_mapping_assigns_missing_id_from_key() {
        let doc = json!({ "NLD_07": feature_json(None) });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        assert_eq!(property_id(&collection.features[0]), Some("NLD_07"));
    }

    #[test]
    fn test_flat_mapping_keeps_existing_id() {
        let doc = json!({ "mapping-key": feature_json(Some("NLD_09")) });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        assert_eq!(property_id(&collection.features[0]), Some("NLD_09"));
    }

    #[test]
    fn test_parse_rejects_non_json() {
        assert!(matches!(
            parse_region_document(b"not json at all"),
            Err(ParseError::Json(_))
        ));
    }

    #[test]
    fn test_parse_rejects_unrecognized_shapes() {
        for doc in [json!([1, 2, 3]), json!(42), json!({ "a": "not a feature" })] {
            assert!(matches!(
                parse_region_document(doc.to_string().as_bytes()),
                Err(ParseError::UnrecognizedShape)
            ));
        }
    }

    #[test]
    fn test_filter_provinces_by_country_prefix() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                feature_json(Some("USA_TX")),
                feature_json(Some("usa_ca")),
                feature_json(Some("CAN_ON")),
                feature_json(None),
            ],
        });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        let filtered = filter_provinces(collection, "usa", &PrefixTable::default());

        let ids: Vec<_> = filtered.features.iter().filter_map(property_id).collect();
        assert_eq!(ids, vec!["USA_TX", "usa_ca"]);
    }

    #[test]
    fn test_filter_provinces_honors_override_table() {
        let doc = json!({
            "type": "FeatureCollection",
            "features": [
                feature_json(Some("FRA_75")),
                feature_json(Some("FXX_2A")),
                feature_json(Some("DEU_BY")),
            ],
        });
        let collection = parse_region_document(doc.to_string().as_bytes()).unwrap();
        let filtered = filter_provinces(collection, "FRA", &PrefixTable::default());
        assert_eq!(filtered.features.len(), 2);
    }

    #[test]
    fn test_prefix_table_default_prefix() {
        let table = PrefixTable::default();
        assert_eq!(table.accepted_prefixes("deu"), vec!["DEU_".to_string()]);
    }

    #[test]
    fn test_prefix_table_with_override() {
        let table = PrefixTable::empty().with_override("grl", vec!["DNK_".to_string()]);
        assert_eq!(table.accepted_prefixes("GRL"), vec!["DNK_".to_string()]);
    }
}
