//! Tile records and decoded layer data.

use crate::core::geo::TileCoord;
use geo_types::{polygon, Geometry, Polygon};
use once_cell::sync::OnceCell;

/// A decoded feature layer of a tile.
///
/// Byte-format decoding happens inside the fetch workers (see
/// [`crate::source::TileDecoder`]); the engine only moves layers around.
#[derive(Debug, Clone, Default)]
pub struct Layer {
    pub name: String,
    pub features: Vec<Feature>,
}

impl Layer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            features: Vec::new(),
        }
    }
}

/// A single decoded feature with its geometry and raw properties
#[derive(Debug, Clone)]
pub struct Feature {
    pub geometry: Geometry<f64>,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Cached per-coordinate tile state.
///
/// Created with empty layers the instant a fetch is dispatched (the
/// reservation), populated in place when the fetch settles successfully.
#[derive(Debug, Clone)]
pub struct TileRecord {
    pub coord: TileCoord,
    pub layers: Vec<Layer>,
    footprint: OnceCell<Polygon<f64>>,
}

impl TileRecord {
    /// An in-flight reservation: present in the cache, no data yet
    pub fn reserved(coord: TileCoord) -> Self {
        Self {
            coord,
            layers: Vec::new(),
            footprint: OnceCell::new(),
        }
    }

    pub fn loaded(coord: TileCoord, layers: Vec<Layer>) -> Self {
        Self {
            coord,
            layers,
            footprint: OnceCell::new(),
        }
    }

    pub fn is_loaded(&self) -> bool {
        !self.layers.is_empty()
    }

    /// Replace the layers with the final fetched set
    pub fn set_layers(&mut self, layers: Vec<Layer>) {
        self.layers = layers;
    }

    /// Append a partially completed layer
    pub fn push_layer(&mut self, layer: Layer) {
        self.layers.push(layer);
    }

    /// Geographic footprint of the tile, computed once.
    ///
    /// A tile's footprint is fixed by its coordinate, so the polygon is
    /// never invalidated.
    pub fn footprint(&self) -> &Polygon<f64> {
        self.footprint.get_or_init(|| {
            let bounds = self.coord.bounds();
            let (sw, ne) = (bounds.south_west, bounds.north_east);
            polygon![
                (x: sw.lng, y: sw.lat),
                (x: ne.lng, y: sw.lat),
                (x: ne.lng, y: ne.lat),
                (x: sw.lng, y: ne.lat),
                (x: sw.lng, y: sw.lat),
            ]
        })
    }
}
