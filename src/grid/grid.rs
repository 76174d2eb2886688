//! The tile grid orchestrator.
//!
//! Owns the cache, the worker pool bookkeeping and the per-coordinate
//! state machine: UNSEEN -> RESERVED (dispatched, empty layers in cache)
//! -> LOADED (layers populated) or UNSET (entry removed, eligible for
//! re-reservation on the next viewport pass).

use crate::cache::LruCache;
use crate::core::config::EngineConfig;
use crate::core::geo::{LatLngBounds, TileCoord};
use crate::grid::indexer::{compute_tile_set, TileSet};
use crate::grid::placeholder;
use crate::grid::record::{Layer, TileRecord};
use crate::pool::task::TaskId;
use crate::pool::worker::TileFetcher;
use crate::pool::{PoolEvent, WorkerPool};
use crate::prelude::HashMap;
use crate::Result;
use std::sync::Arc;

/// Observer for tile lifecycle notifications
pub trait TileObserver: Send {
    /// A tile's full layer set became resident
    fn on_tile_ready(&self, coord: &TileCoord);
}

impl<F: Fn(&TileCoord) + Send> TileObserver for F {
    fn on_tile_ready(&self, coord: &TileCoord) {
        self(coord)
    }
}

/// What the consumer draws for one in-view coordinate
#[derive(Debug, Clone)]
pub struct ViewTile {
    pub coord: TileCoord,
    pub layers: Vec<Layer>,
    /// True when `layers` were substituted from an ancestor or descendant
    pub placeholder: bool,
}

/// Orchestrates the tile lifecycle for a viewport
pub struct TileGrid {
    config: EngineConfig,
    cache: LruCache<TileCoord, TileRecord>,
    pool: WorkerPool,
    /// Outstanding fetch per coordinate; guards against duplicate dispatch
    /// even if the cache reservation was evicted mid-flight
    in_flight: HashMap<TileCoord, TaskId>,
    in_view: Vec<TileCoord>,
    source: serde_json::Value,
    observers: Vec<Box<dyn TileObserver>>,
}

impl TileGrid {
    pub fn new(
        config: EngineConfig,
        fetcher: Arc<dyn TileFetcher>,
        source: serde_json::Value,
    ) -> Result<Self> {
        config.validate()?;
        let cache = LruCache::new(config.cache_capacity);
        let pool = WorkerPool::new(config.max_workers, fetcher);
        Ok(Self {
            config,
            cache,
            pool,
            in_flight: HashMap::default(),
            in_view: Vec::new(),
            source,
            observers: Vec::new(),
        })
    }

    pub fn add_observer(&mut self, observer: Box<dyn TileObserver>) {
        self.observers.push(observer);
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recompute the needed tile set for a viewport and dispatch fetches
    /// for every candidate not already resident or in flight.
    ///
    /// Tiles that left the candidate set are not proactively canceled;
    /// in-flight fetches finish and warm the cache for possible reuse.
    pub fn update_tiles(&mut self, bounds: &LatLngBounds, zoom: f64) -> Result<TileSet> {
        self.pump();

        let set = compute_tile_set(
            bounds,
            zoom,
            self.config.buffer_radius,
            self.config.max_zoom,
        );
        self.in_view = set.in_view.clone();

        for coord in set.candidates() {
            if self.cache.contains(&coord) || self.in_flight.contains_key(&coord) {
                continue;
            }
            // Reserve before dispatch so a second pass cannot double-book
            self.cache.put(coord, TileRecord::reserved(coord));
            let handle = self.pool.execute(&coord.key(), self.source.clone())?;
            self.in_flight.insert(coord, handle.id());
        }

        Ok(set)
    }

    /// Drain worker settlements into the cache and fire notifications
    pub fn pump(&mut self) {
        for event in self.pool.poll_events() {
            match event {
                PoolEvent::LayerReady { tile_id, layer } => {
                    if let Ok(coord) = tile_id.parse::<TileCoord>() {
                        if let Some(record) = self.cache.get_mut(&coord) {
                            record.push_layer(layer);
                        }
                    }
                }
                PoolEvent::TileLoaded { tile_id, layers } => {
                    let Ok(coord) = tile_id.parse::<TileCoord>() else {
                        continue;
                    };
                    self.in_flight.remove(&coord);
                    match self.cache.get_mut(&coord) {
                        Some(record) => record.set_layers(layers),
                        // Reservation was evicted while the fetch ran
                        None => self.cache.put(coord, TileRecord::loaded(coord, layers)),
                    }
                    log::debug!("tile {} ready", coord);
                    for observer in &self.observers {
                        observer.on_tile_ready(&coord);
                    }
                }
                PoolEvent::TileAborted {
                    tile_id, canceled, ..
                } => {
                    let Ok(coord) = tile_id.parse::<TileCoord>() else {
                        continue;
                    };
                    self.in_flight.remove(&coord);
                    // Unset the cache hold; the next viewport pass retries
                    self.cache.pop(&coord);
                    if canceled {
                        log::debug!("tile {} fetch canceled", coord);
                    }
                }
            }
        }
    }

    /// The drawable state of the last computed in-view set, substituting
    /// placeholders for tiles still pending.
    pub fn current_view_tiles(&mut self) -> Vec<ViewTile> {
        self.pump();

        let coords = self.in_view.clone();
        coords
            .into_iter()
            .map(|coord| {
                let loaded = self
                    .cache
                    .get(&coord)
                    .filter(|record| record.is_loaded())
                    .map(|record| record.layers.clone());
                match loaded {
                    Some(layers) => ViewTile {
                        coord,
                        layers,
                        placeholder: false,
                    },
                    None => ViewTile {
                        coord,
                        layers: placeholder::resolve(&coord, &mut self.cache),
                        placeholder: true,
                    },
                }
            })
            .collect()
    }

    /// Cancel the in-flight fetch for one coordinate, if any.
    ///
    /// This is the explicit tile-level cancel (e.g. session teardown);
    /// ordinary viewport changes never cancel.
    pub fn cancel_tile(&mut self, coord: &TileCoord) {
        if let Some(task) = self.in_flight.get(coord) {
            self.pool.cancel(*task);
        }
    }

    /// Cancel everything currently in flight
    pub fn cancel_all(&mut self) {
        let tasks: Vec<TaskId> = self.in_flight.values().copied().collect();
        for task in tasks {
            self.pool.cancel(task);
        }
        self.pump();
    }

    /// Inspect a cached record without touching recency
    pub fn peek_record(&self, coord: &TileCoord) -> Option<&TileRecord> {
        self.cache.peek(coord)
    }

    pub fn is_reserved(&self, coord: &TileCoord) -> bool {
        self.in_flight.contains_key(coord)
    }

    pub fn in_flight_count(&self) -> usize {
        self.in_flight.len()
    }

    pub fn cached_tiles(&self) -> usize {
        self.cache.len()
    }
}
