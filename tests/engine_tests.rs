//! End-to-end tests for the tile lifecycle engine: viewport update through
//! worker dispatch, cache settlement and render scheduling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use tilekit::prelude::*;
use tilekit::render::scheduler::ImmediateClock;

/// Fetcher that decodes nothing but produces one named layer per tile,
/// tracking how many fetches ran.
struct CountingFetcher {
    fetches: AtomicUsize,
}

impl CountingFetcher {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            fetches: AtomicUsize::new(0),
        })
    }
}

impl TileFetcher for CountingFetcher {
    fn fetch(&self, request: &FetchRequest, _ctx: &FetchContext) -> Result<Vec<Layer>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(vec![Layer::new(request.tile_id.clone())])
    }
}

/// Fetcher that emits partial layers before completing
struct IncrementalFetcher;

impl TileFetcher for IncrementalFetcher {
    fn fetch(&self, request: &FetchRequest, ctx: &FetchContext) -> Result<Vec<Layer>> {
        ctx.emit_layer(Layer::new(format!("{}:roads", request.tile_id)));
        ctx.emit_layer(Layer::new(format!("{}:water", request.tile_id)));
        Ok(vec![
            Layer::new(format!("{}:roads", request.tile_id)),
            Layer::new(format!("{}:water", request.tile_id)),
        ])
    }
}

fn world_bounds() -> LatLngBounds {
    LatLngBounds::from_coords(-85.0, -179.9, 85.0, 179.9)
}

fn settle(grid: &mut TileGrid) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while grid.in_flight_count() > 0 && Instant::now() < deadline {
        grid.pump();
        std::thread::sleep(Duration::from_millis(5));
    }
    assert_eq!(grid.in_flight_count(), 0, "fetches did not settle in time");
}

#[test]
fn test_viewport_update_loads_view() {
    let fetcher = CountingFetcher::new();
    let config = EngineConfig {
        cache_capacity: 64,
        max_workers: 4,
        buffer_radius: 1,
        max_zoom: 18,
    };
    let mut grid = TileGrid::new(config, fetcher.clone(), serde_json::Value::Null).unwrap();

    let set = grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);

    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), set.candidates().len());
    let view = grid.current_view_tiles();
    assert_eq!(view.len(), set.in_view.len());
    for tile in &view {
        assert!(!tile.placeholder);
        assert_eq!(tile.layers[0].name, tile.coord.key());
    }

    // A repeat pass over the same viewport fetches nothing new
    grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);
    assert_eq!(fetcher.fetches.load(Ordering::SeqCst), set.candidates().len());
}

#[test]
fn test_partial_layers_accumulate_on_reservation() {
    let config = EngineConfig {
        cache_capacity: 64,
        max_workers: 2,
        buffer_radius: 0,
        max_zoom: 18,
    };
    let mut grid =
        TileGrid::new(config, Arc::new(IncrementalFetcher), serde_json::Value::Null).unwrap();

    grid.update_tiles(&world_bounds(), 0.0).unwrap();
    settle(&mut grid);

    let record = grid.peek_record(&TileCoord::new(0, 0, 0)).unwrap();
    assert!(record.is_loaded());
    // Final settlement replaces the partials with the full layer set
    assert_eq!(record.layers.len(), 2);
    assert_eq!(record.layers[0].name, "0/0/0:roads");
    assert_eq!(record.layers[1].name, "0/0/0:water");
}

#[test]
fn test_cache_eviction_keeps_capacity_bounded() {
    let fetcher = CountingFetcher::new();
    let config = EngineConfig {
        cache_capacity: 3,
        max_workers: 2,
        buffer_radius: 0,
        max_zoom: 18,
    };
    let mut grid = TileGrid::new(config, fetcher, serde_json::Value::Null).unwrap();

    grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);

    assert!(grid.cached_tiles() <= 3);
}

#[test]
fn test_tile_ready_drives_coalesced_render() {
    let fetcher = CountingFetcher::new();
    let config = EngineConfig {
        cache_capacity: 64,
        max_workers: 4,
        buffer_radius: 0,
        max_zoom: 18,
    };
    let mut grid = TileGrid::new(config, fetcher, serde_json::Value::Null).unwrap();

    let scheduler = Arc::new(RenderScheduler::new(Box::new(ImmediateClock)));
    let renders = Arc::new(AtomicUsize::new(0));

    // Every tile arrival enqueues a redraw request
    let queue = scheduler.clone();
    let count = renders.clone();
    grid.add_observer(Box::new(move |_coord: &TileCoord| {
        let count = count.clone();
        queue.push(
            move || {
                count.fetch_add(1, Ordering::SeqCst);
            },
            false,
        );
    }));

    let set = grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);
    assert!(scheduler.len() >= set.in_view.len());

    // One scheduling pass coalesces the whole burst into a single redraw
    assert!(scheduler.next());
    assert_eq!(renders.load(Ordering::SeqCst), 1);
    assert!(scheduler.is_empty());
}

#[test]
fn test_zoom_out_uses_prewarmed_parents() {
    let fetcher = CountingFetcher::new();
    let config = EngineConfig {
        cache_capacity: 64,
        max_workers: 4,
        buffer_radius: 0,
        max_zoom: 18,
    };
    let mut grid = TileGrid::new(config, fetcher, serde_json::Value::Null).unwrap();

    // Loading z=1 pre-warms the z=0 parent tile
    grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);

    let parent = grid.peek_record(&TileCoord::new(0, 0, 0)).unwrap();
    assert!(parent.is_loaded());

    // Zooming out finds the parent already resident
    let set = grid.update_tiles(&world_bounds(), 0.0).unwrap();
    assert_eq!(grid.in_flight_count(), 0);
    assert_eq!(set.in_view, vec![TileCoord::new(0, 0, 0)]);
    let view = grid.current_view_tiles();
    assert!(!view[0].placeholder);
}

#[test]
fn test_observer_sees_every_loaded_tile() {
    let fetcher = CountingFetcher::new();
    let config = EngineConfig {
        cache_capacity: 64,
        max_workers: 2,
        buffer_radius: 0,
        max_zoom: 18,
    };
    let mut grid = TileGrid::new(config, fetcher, serde_json::Value::Null).unwrap();

    let seen = Arc::new(Mutex::new(HashSet::default()));
    let sink = seen.clone();
    grid.add_observer(Box::new(move |coord: &TileCoord| {
        sink.lock().unwrap().insert(*coord);
    }));

    let set = grid.update_tiles(&world_bounds(), 1.0).unwrap();
    settle(&mut grid);

    let seen = seen.lock().unwrap();
    for coord in set.candidates() {
        assert!(seen.contains(&coord), "missing tile-ready for {coord}");
    }
}
