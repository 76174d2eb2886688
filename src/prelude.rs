//! Prelude module for common tilekit types and traits
//!
//! Re-exports the most commonly used types for easy importing with
//! `use tilekit::prelude::*;`

pub use crate::core::{
    config::EngineConfig,
    geo::{LatLng, LatLngBounds, TileCoord},
};

pub use crate::cache::{EvictionObserver, LruCache};

pub use crate::grid::{
    indexer::{compute_tile_set, TileSet},
    record::{Feature, Layer, TileRecord},
    TileGrid, TileObserver, ViewTile,
};

pub use crate::pool::{
    task::{TaskHandle, TaskId, TaskStatus},
    worker::{FetchContext, FetchRequest, TileFetcher},
    PoolEvent, WorkerPool,
};

pub use crate::render::scheduler::{FrameClock, RenderPriority, RenderScheduler};

pub use crate::source::{TileDecoder, TileSource};

pub use crate::{Error as EngineError, Result};

pub use std::{
    sync::Arc,
    time::{Duration, Instant},
};

pub use fxhash::{FxHashMap as HashMap, FxHashSet as HashSet};
