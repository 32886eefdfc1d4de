//! Endpoint layout of the published boundary data set.
//!
//! The offline pipeline emits region documents and binary tiles at fixed
//! paths; this module is the single place that knows them. Tile file
//! names put latitude before longitude, matching the tile key text form.

use crate::coord::{DetailLevel, TileKey};

/// Path of a whole-region boundary document.
pub fn region_path(region_id: &str, level: DetailLevel) -> String {
    format!("boundaries/{}/{}.json", level, region_id)
}

/// Path of a province-subset document.
///
/// Province files are grouped in per-folder subsets shared by several
/// countries; callers filter the parsed result down to one country.
pub fn provinces_path(folder: &str, level: DetailLevel) -> String {
    format!("boundaries/provinces/{}/{}.json", folder, level)
}

/// Path of one binary tile.
pub fn tile_path(key: &TileKey) -> String {
    format!("tiles/{}/{}_{}.pbf", key.level, key.y, key.x)
}
