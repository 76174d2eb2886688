//! The worker pool: lazy growth, blocking hand-off, cancellation.

use crate::pool::protocol::{FetchJob, WorkerRequest, WorkerResponse};
use crate::pool::task::{TaskEntry, TaskHandle, TaskId, TaskStatus};
use crate::pool::worker::{worker_main, TileFetcher};
use crate::prelude::HashMap;
use crate::grid::record::Layer;
use crate::{EngineError, Result};
use crossbeam_channel::{unbounded, Receiver, Sender};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SlotStatus {
    Free,
    Busy,
}

/// One worker slot in the pool's arena
struct WorkerSlot {
    requests: Sender<WorkerRequest>,
    join: Option<JoinHandle<()>>,
    status: SlotStatus,
    current: Option<TaskId>,
}

/// Settlement and progress events, drained by the coordinator
#[derive(Debug, Clone)]
pub enum PoolEvent {
    /// Incremental progress for an in-flight tile
    LayerReady { tile_id: String, layer: Layer },
    /// Terminal success
    TileLoaded { tile_id: String, layers: Vec<Layer> },
    /// Terminal failure or cancellation; the tile has no data
    TileAborted {
        tile_id: String,
        canceled: bool,
        error: Option<String>,
    },
}

/// Manages up to `max_workers` isolated fetch threads.
///
/// Slots are created lazily; once the arena is full, `execute` blocks the
/// caller, absorbing settlements until a slot frees (backpressure, not an
/// error). All bookkeeping is owned by the coordinator thread.
pub struct WorkerPool {
    slots: Vec<WorkerSlot>,
    max_workers: usize,
    tasks: HashMap<TaskId, TaskEntry>,
    next_task: TaskId,
    response_tx: Sender<WorkerResponse>,
    response_rx: Receiver<WorkerResponse>,
    pending_events: VecDeque<PoolEvent>,
    fetcher: Arc<dyn TileFetcher>,
}

impl WorkerPool {
    pub fn new(max_workers: usize, fetcher: Arc<dyn TileFetcher>) -> Self {
        let (response_tx, response_rx) = unbounded();
        Self {
            slots: Vec::new(),
            max_workers: max_workers.max(1),
            tasks: HashMap::default(),
            next_task: 0,
            response_tx,
            response_rx,
            pending_events: VecDeque::new(),
            fetcher,
        }
    }

    /// Dispatch a fetch, blocking until a worker slot is available
    pub fn execute(&mut self, tile_id: &str, source: serde_json::Value) -> Result<TaskHandle> {
        let slot = match self.free_slot() {
            Some(index) => index,
            None if self.slots.len() < self.max_workers => self.spawn_slot()?,
            None => self.wait_for_free_slot()?,
        };

        let task = self.next_task;
        self.next_task += 1;
        let cancel = Arc::new(AtomicBool::new(false));

        self.tasks.insert(
            task,
            TaskEntry {
                status: TaskStatus::InProgress,
                tile_id: tile_id.to_string(),
                slot,
                cancel: cancel.clone(),
            },
        );

        let job = FetchJob {
            task,
            tile_id: tile_id.to_string(),
            source,
            cancel,
        };

        log::debug!("dispatching fetch for tile {} on slot {}", tile_id, slot);
        self.slots[slot].status = SlotStatus::Busy;
        self.slots[slot].current = Some(task);
        self.slots[slot]
            .requests
            .send(WorkerRequest::FetchTile(job))
            .map_err(|_| EngineError::PoolClosed)?;

        Ok(TaskHandle::new(task))
    }

    /// Cancel a tracked task.
    ///
    /// Idempotent: canceling an already-terminal task is a no-op. The
    /// owning slot is freed immediately, without waiting for the worker to
    /// acknowledge the abort. A task marked canceled here can never later
    /// be fulfilled: terminal statuses drop all stale worker responses.
    pub fn cancel(&mut self, task: TaskId) {
        let Some(entry) = self.tasks.get_mut(&task) else {
            return;
        };
        if entry.status.is_terminal() {
            return;
        }

        entry.status = TaskStatus::Canceled;
        entry.cancel.store(true, Ordering::SeqCst);
        let slot = entry.slot;
        let tile_id = entry.tile_id.clone();

        let _ = self.slots[slot]
            .requests
            .send(WorkerRequest::CancelTile { task });
        self.release_slot(slot, task);

        log::debug!("canceled fetch for tile {}", tile_id);
        self.pending_events.push_back(PoolEvent::TileAborted {
            tile_id,
            canceled: true,
            error: None,
        });
    }

    /// Drain all worker responses received so far into settlement events
    pub fn poll_events(&mut self) -> Vec<PoolEvent> {
        while let Ok(response) = self.response_rx.try_recv() {
            self.absorb(response);
        }
        self.pending_events.drain(..).collect()
    }

    pub fn task_status(&self, task: TaskId) -> Option<TaskStatus> {
        self.tasks.get(&task).map(|entry| entry.status)
    }

    /// Number of worker slots created so far
    pub fn worker_count(&self) -> usize {
        self.slots.len()
    }

    /// Number of slots currently running a task
    pub fn busy_count(&self) -> usize {
        self.slots
            .iter()
            .filter(|slot| slot.status == SlotStatus::Busy)
            .count()
    }

    fn free_slot(&self) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.status == SlotStatus::Free)
    }

    fn spawn_slot(&mut self) -> Result<usize> {
        let index = self.slots.len();
        let (request_tx, request_rx) = unbounded();
        let responses = self.response_tx.clone();
        let fetcher = self.fetcher.clone();

        let join = std::thread::Builder::new()
            .name(format!("tile-worker-{index}"))
            .spawn(move || worker_main(request_rx, responses, fetcher))?;

        self.slots.push(WorkerSlot {
            requests: request_tx,
            join: Some(join),
            status: SlotStatus::Free,
            current: None,
        });
        Ok(index)
    }

    /// Race all in-flight settlements; the first slot to settle wins
    fn wait_for_free_slot(&mut self) -> Result<usize> {
        loop {
            let response = self
                .response_rx
                .recv()
                .map_err(|_| EngineError::PoolClosed)?;
            self.absorb(response);
            if let Some(index) = self.free_slot() {
                return Ok(index);
            }
        }
    }

    /// Apply one worker response to the task table.
    ///
    /// Responses for terminal tasks are stale (the task was canceled while
    /// the worker was still grinding) and are dropped, which is what makes
    /// cancel-vs-fulfill race-free: only the coordinator assigns statuses.
    fn absorb(&mut self, response: WorkerResponse) {
        let task = response.task();
        let Some(entry) = self.tasks.get_mut(&task) else {
            return;
        };
        if entry.status.is_terminal() {
            return;
        }

        match response {
            WorkerResponse::LayerComplete { tile_id, layer, .. } => {
                self.pending_events
                    .push_back(PoolEvent::LayerReady { tile_id, layer });
            }
            WorkerResponse::FullComplete {
                tile_id, layers, ..
            } => {
                entry.status = TaskStatus::Fulfilled;
                let slot = entry.slot;
                self.release_slot(slot, task);
                self.pending_events
                    .push_back(PoolEvent::TileLoaded { tile_id, layers });
            }
            WorkerResponse::Aborted { tile_id, error, .. } => {
                entry.status = TaskStatus::Failed;
                let slot = entry.slot;
                self.release_slot(slot, task);
                if let Some(ref reason) = error {
                    log::warn!("fetch failed for tile {}: {}", tile_id, reason);
                }
                self.pending_events.push_back(PoolEvent::TileAborted {
                    tile_id,
                    canceled: false,
                    error,
                });
            }
        }
    }

    fn release_slot(&mut self, slot: usize, task: TaskId) {
        // The slot may already be running a newer task if it was freed by
        // an earlier cancel; only release it for its current assignment.
        if self.slots[slot].current == Some(task) {
            self.slots[slot].status = SlotStatus::Free;
            self.slots[slot].current = None;
        }
    }
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        for entry in self.tasks.values() {
            entry.cancel.store(true, Ordering::SeqCst);
        }
        for slot in &self.slots {
            let _ = slot.requests.send(WorkerRequest::Shutdown);
        }
        for slot in &mut self.slots {
            if let Some(join) = slot.join.take() {
                let _ = join.join();
            }
        }
    }
}
