//! Pure viewport -> tile set computation.

use crate::core::geo::{LatLng, LatLngBounds, TileCoord};
use crate::prelude::HashSet;

/// The tiles a viewport needs
#[derive(Debug, Clone)]
pub struct TileSet {
    /// Tiles intersecting the viewport rectangle at the snapped zoom
    pub in_view: Vec<TileCoord>,
    /// `in_view` expanded by the buffer radius, plus the direct parent of
    /// every buffered tile (pre-warmed so a placeholder is available
    /// instantly on zoom-out)
    pub buffered: Vec<TileCoord>,
}

impl TileSet {
    /// Deduplicated union of `in_view` and `buffered`
    pub fn candidates(&self) -> Vec<TileCoord> {
        let mut seen: HashSet<TileCoord> = HashSet::default();
        self.in_view
            .iter()
            .chain(self.buffered.iter())
            .filter(|coord| seen.insert(**coord))
            .copied()
            .collect()
    }
}

/// Computes the set of tile coordinates a viewport needs resident.
///
/// `zoom` is snapped to `min(floor(zoom), max_zoom)`; the bbox corners are
/// converted to tile indices at that level and the rectangular span between
/// them becomes `in_view`. Coordinates outside the `2^z` grid are filtered,
/// never raised.
pub fn compute_tile_set(
    bounds: &LatLngBounds,
    zoom: f64,
    buffer_radius: u32,
    max_zoom: u8,
) -> TileSet {
    let z = (zoom.floor().max(0.0) as u32).min(max_zoom as u32) as u8;
    let side = 2_i64.pow(z as u32);

    let nw = TileCoord::from_lat_lng(
        &LatLng::new(bounds.north_east.lat, bounds.south_west.lng),
        z,
    );
    let se = TileCoord::from_lat_lng(
        &LatLng::new(bounds.south_west.lat, bounds.north_east.lng),
        z,
    );

    let (min_x, max_x) = (nw.x.min(se.x) as i64, nw.x.max(se.x) as i64);
    let (min_y, max_y) = (nw.y.min(se.y) as i64, nw.y.max(se.y) as i64);

    let mut in_view = Vec::with_capacity(((max_x - min_x + 1) * (max_y - min_y + 1)) as usize);
    for x in min_x..=max_x {
        for y in min_y..=max_y {
            if x >= 0 && y >= 0 && x < side && y < side {
                in_view.push(TileCoord::new(x as u32, y as u32, z));
            }
        }
    }

    let radius = buffer_radius as i64;
    let mut buffered_set: HashSet<TileCoord> = HashSet::default();
    let mut buffered = Vec::new();
    for x in (min_x - radius)..=(max_x + radius) {
        for y in (min_y - radius)..=(max_y + radius) {
            if x < 0 || y < 0 || x >= side || y >= side {
                continue;
            }
            let coord = TileCoord::new(x as u32, y as u32, z);
            if buffered_set.insert(coord) {
                buffered.push(coord);
            }
            if let Some(parent) = coord.parent() {
                if buffered_set.insert(parent) {
                    buffered.push(parent);
                }
            }
        }
    }

    TileSet { in_view, buffered }
}
