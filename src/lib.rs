//! # tilekit
//!
//! A tile lifecycle and scheduling engine for incrementally loaded map
//! imagery.
//!
//! The engine computes which tiles a viewport needs, dispatches fetch work
//! to a bounded pool of isolated worker threads with cancellation, keeps a
//! capacity-bounded LRU cache with ancestor/descendant placeholder fallback,
//! and paces redraws through a priority-aware, coalescing render scheduler.
//!
//! GPU drawing, projection math beyond slippy-map indexing, tile byte
//! decoding and style compilation are collaborator concerns expressed as
//! traits, not implemented here.

pub mod cache;
pub mod core;
pub mod grid;
pub mod pool;
pub mod prelude;
pub mod render;
pub mod source;

// Re-export public API
pub use crate::core::{
    config::EngineConfig,
    geo::{LatLng, LatLngBounds, TileCoord},
};

pub use cache::{EvictionObserver, LruCache};

pub use grid::{
    indexer::{compute_tile_set, TileSet},
    record::{Feature, Layer, TileRecord},
    TileGrid, TileObserver, ViewTile,
};

pub use pool::{
    task::{TaskHandle, TaskId, TaskStatus},
    worker::{FetchContext, FetchRequest, TileFetcher},
    PoolEvent, WorkerPool,
};

pub use render::{
    scheduler::{FrameClock, ImmediateClock, IntervalClock, RenderPriority, RenderScheduler},
    MinHeap,
};

pub use source::{HttpFetcher, OpenStreetMapSource, TileDecoder, TileSource, UrlTemplateSource};

/// Result type used throughout the library
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Common error types
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    #[error("fetch failed: {0}")]
    Fetch(String),

    #[error("task canceled")]
    Canceled,

    #[error("worker pool closed")]
    PoolClosed,

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid tile coordinate: {0}")]
    InvalidCoordinate(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),
}

/// Error type alias for convenience
pub type Error = EngineError;
