//! Ancestor/descendant placeholder fallback.
//!
//! Resolution walks exactly one level in each direction, so the cost is
//! bounded at a handful of cache lookups per tile.

use crate::cache::LruCache;
use crate::core::geo::TileCoord;
use crate::grid::record::{Layer, TileRecord};

/// Approximate layers for a tile whose real data is not resident yet.
///
/// Order of preference: the tile's own loaded layers, then the direct
/// parent's layers as-is, then the concatenated layers of whichever of the
/// four children are loaded (possibly none).
pub fn resolve(coord: &TileCoord, cache: &mut LruCache<TileCoord, TileRecord>) -> Vec<Layer> {
    if let Some(record) = cache.get(coord) {
        if record.is_loaded() {
            return record.layers.clone();
        }
    }

    if let Some(parent) = coord.parent() {
        if let Some(record) = cache.get(&parent) {
            if record.is_loaded() {
                return record.layers.clone();
            }
        }
    }

    let mut layers = Vec::new();
    for child in coord.children() {
        if let Some(record) = cache.get(&child) {
            if record.is_loaded() {
                layers.extend(record.layers.iter().cloned());
            }
        }
    }
    layers
}
