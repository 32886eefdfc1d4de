//! Binary tile decoding.
//!
//! A tile is a length-prefixed envelope: the `BTL1` magic, a feature
//! count, then one record per feature (id, property bag JSON, geometry
//! blob). Geometry blobs are WKB and go through `geozero`; the codec is a
//! swappable dependency and only needs to round-trip the six primitive
//! kinds plus GeometryCollection.
//!
//! Tolerance is two-level: an unreadable envelope (bad framing, a blob
//! whose geometry kind the codec does not implement) fails the whole tile
//! with a [`DecodeError`]; after a successful envelope decode, individual
//! features of unsupported kinds are dropped with a warning and
//! GeometryCollection features are unpacked into synthetic features, so a
//! single odd geometry never blanks a whole map region.

use bytes::Buf;
use geo_types::Geometry as GeoGeometry;
use geojson::feature::Id;
use geojson::{Feature, FeatureCollection, Geometry, JsonObject, Value};
use geozero::wkb::Wkb;
use geozero::ToGeo;
use tracing::warn;

use super::error::DecodeError;

/// Envelope magic, first four bytes of every tile file.
pub const TILE_MAGIC: &[u8; 4] = b"BTL1";

/// Decode one binary tile into a feature collection.
///
/// # Errors
///
/// Returns [`DecodeError`] when the envelope itself is unreadable. Per
/// the cache's failure policy the caller caches an empty collection in
/// that case; this function never partially succeeds.
pub fn decode_tile(bytes: &[u8]) -> Result<FeatureCollection, DecodeError> {
    let mut buf = bytes;

    if buf.remaining() < TILE_MAGIC.len() || &buf[..TILE_MAGIC.len()] != TILE_MAGIC {
        return Err(DecodeError::BadMagic);
    }
    buf.advance(TILE_MAGIC.len());

    let count = take_u32(&mut buf, "feature count")?;
    let mut features = Vec::new();

    for _ in 0..count {
        let id = take_string(&mut buf)?;
        let properties = take_properties(&mut buf, &id)?;
        let blob = take_blob(&mut buf, "geometry blob")?;

        let geometry = Wkb(blob).to_geo().map_err(|e| DecodeError::Geometry {
            id: id.clone(),
            message: e.to_string(),
        })?;

        flatten_into(&mut features, &id, &properties, geometry);
    }

    if buf.has_remaining() {
        return Err(DecodeError::TrailingData(buf.remaining()));
    }

    Ok(FeatureCollection {
        bbox: None,
        features,
        foreign_members: None,
    })
}

/// Unpack one decoded geometry into output features.
///
/// GeometryCollections become one synthetic feature per supported member,
/// each carrying the parent's property bag unchanged. Unsupported kinds
/// are dropped with a warning.
fn flatten_into(
    features: &mut Vec<Feature>,
    id: &str,
    properties: &JsonObject,
    geometry: GeoGeometry<f64>,
) {
    match geometry {
        GeoGeometry::GeometryCollection(members) => {
            for member in members {
                match supported_value(&member) {
                    Some(value) => features.push(make_feature(id, properties, value)),
                    None => {
                        warn!(
                            feature = id,
                            kind = kind_name(&member),
                            "Dropping unsupported sub-geometry from collection"
                        );
                    }
                }
            }
        }
        other => match supported_value(&other) {
            Some(value) => features.push(make_feature(id, properties, value)),
            None => {
                warn!(
                    feature = id,
                    kind = kind_name(&other),
                    "Dropping feature with unsupported geometry kind"
                );
            }
        },
    }
}

fn make_feature(id: &str, properties: &JsonObject, value: Value) -> Feature {
    Feature {
        bbox: None,
        geometry: Some(Geometry::new(value)),
        id: Some(Id::String(id.to_string())),
        properties: Some(properties.clone()),
        foreign_members: None,
    }
}

/// Convert a geometry to its GeoJSON value if its kind is one of the six
/// supported primitives; `None` otherwise.
fn supported_value(geometry: &GeoGeometry<f64>) -> Option<Value> {
    match geometry {
        GeoGeometry::Point(_)
        | GeoGeometry::LineString(_)
        | GeoGeometry::Polygon(_)
        | GeoGeometry::MultiPoint(_)
        | GeoGeometry::MultiLineString(_)
        | GeoGeometry::MultiPolygon(_) => Some(Value::from(geometry)),
        _ => None,
    }
}

fn kind_name(geometry: &GeoGeometry<f64>) -> &'static str {
    match geometry {
        GeoGeometry::Point(_) => "Point",
        GeoGeometry::Line(_) => "Line",
        GeoGeometry::LineString(_) => "LineString",
        GeoGeometry::Polygon(_) => "Polygon",
        GeoGeometry::MultiPoint(_) => "MultiPoint",
        GeoGeometry::MultiLineString(_) => "MultiLineString",
        GeoGeometry::MultiPolygon(_) => "MultiPolygon",
        GeoGeometry::GeometryCollection(_) => "GeometryCollection",
        GeoGeometry::Rect(_) => "Rect",
        GeoGeometry::Triangle(_) => "Triangle",
    }
}

fn take_u16(buf: &mut &[u8], context: &'static str) -> Result<u16, DecodeError> {
    if buf.remaining() < 2 {
        return Err(DecodeError::Truncated { context });
    }
    Ok(buf.get_u16())
}

fn take_u32(buf: &mut &[u8], context: &'static str) -> Result<u32, DecodeError> {
    if buf.remaining() < 4 {
        return Err(DecodeError::Truncated { context });
    }
    Ok(buf.get_u32())
}

fn take_string(buf: &mut &[u8]) -> Result<String, DecodeError> {
    let len = take_u16(buf, "feature id length")? as usize;
    if buf.remaining() < len {
        return Err(DecodeError::Truncated {
            context: "feature id",
        });
    }
    let raw = buf[..len].to_vec();
    buf.advance(len);
    String::from_utf8(raw).map_err(|_| DecodeError::InvalidId)
}

fn take_properties(buf: &mut &[u8], id: &str) -> Result<JsonObject, DecodeError> {
    let len = take_u32(buf, "property length")? as usize;
    if buf.remaining() < len {
        return Err(DecodeError::Truncated {
            context: "property bag",
        });
    }
    let raw = &buf[..len];
    let properties = if len == 0 {
        JsonObject::new()
    } else {
        serde_json::from_slice::<JsonObject>(raw).map_err(|e| DecodeError::Properties {
            id: id.to_string(),
            message: e.to_string(),
        })?
    };
    buf.advance(len);
    Ok(properties)
}

fn take_blob<'a>(buf: &mut &'a [u8], context: &'static str) -> Result<&'a [u8], DecodeError> {
    let len = take_u32(buf, context)? as usize;
    if buf.remaining() < len {
        return Err(DecodeError::Truncated { context });
    }
    let blob = &buf[..len];
    buf.advance(len);
    Ok(blob)
}
