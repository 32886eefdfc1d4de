//! Boundary payload decoding.
//!
//! Two payload families reach the cache: JSON region documents
//! (whole-country boundary sets) and binary tile envelopes (gridded
//! cells). Both decode into the same `geojson` feature collection model.

mod error;
mod region;
mod tile;

pub use error::{DecodeError, ParseError};
pub use region::{filter_provinces, parse_region_document, PrefixTable};
pub use tile::{decode_tile, TILE_MAGIC};
