pub mod grid;
pub mod indexer;
pub mod placeholder;
pub mod record;

pub use grid::{TileGrid, TileObserver, ViewTile};
