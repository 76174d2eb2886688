//! Messages exchanged between the coordinator and worker threads.
//!
//! Everything crossing the boundary is an owned value; the only shared
//! state is the per-task cancellation token.

use crate::grid::record::Layer;
use crate::pool::task::TaskId;
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// One unit of fetch work handed to a worker
#[derive(Debug, Clone)]
pub struct FetchJob {
    pub task: TaskId,
    pub tile_id: String,
    pub source: serde_json::Value,
    pub cancel: Arc<AtomicBool>,
}

/// Coordinator -> worker
#[derive(Debug, Clone)]
pub enum WorkerRequest {
    FetchTile(FetchJob),
    /// Abort signal for an in-flight fetch; the shared token carries the
    /// actual interrupt, this message lets an idle unit acknowledge early.
    CancelTile {
        task: TaskId,
    },
    Shutdown,
}

/// Worker -> coordinator
#[derive(Debug, Clone)]
pub enum WorkerResponse {
    /// Incremental progress: one layer became ready
    LayerComplete {
        task: TaskId,
        tile_id: String,
        layer: Layer,
    },
    /// Terminal success
    FullComplete {
        task: TaskId,
        tile_id: String,
        layers: Vec<Layer>,
    },
    /// Terminal failure or cancellation acknowledgment: no layers
    Aborted {
        task: TaskId,
        tile_id: String,
        error: Option<String>,
    },
}

impl WorkerResponse {
    pub fn task(&self) -> TaskId {
        match self {
            WorkerResponse::LayerComplete { task, .. }
            | WorkerResponse::FullComplete { task, .. }
            | WorkerResponse::Aborted { task, .. } => *task,
        }
    }
}
