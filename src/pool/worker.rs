//! Worker thread body and the fetch execution contract.

use crate::grid::record::Layer;
use crate::pool::protocol::{FetchJob, WorkerRequest, WorkerResponse};
use crate::pool::task::TaskId;
use crate::Result;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// The fetch work a worker executes for one tile.
///
/// Implementations run on a worker thread and may block. Network or decode
/// errors are returned as `Err`; they never unwind across the worker
/// boundary. Long-running fetches should poll
/// [`FetchContext::is_canceled`] and bail out early.
pub trait TileFetcher: Send + Sync + 'static {
    fn fetch(&self, request: &FetchRequest, ctx: &FetchContext) -> Result<Vec<Layer>>;
}

/// The request payload as seen by a fetcher
#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub tile_id: String,
    /// Opaque source configuration, passed through from the grid
    pub source: serde_json::Value,
}

/// Per-fetch context: cancellation probe and incremental progress channel
pub struct FetchContext {
    task: TaskId,
    tile_id: String,
    cancel: Arc<AtomicBool>,
    progress: Sender<WorkerResponse>,
}

impl FetchContext {
    pub fn is_canceled(&self) -> bool {
        self.cancel.load(Ordering::SeqCst)
    }

    /// Emit a partially completed layer without finishing the fetch
    pub fn emit_layer(&self, layer: Layer) {
        let _ = self.progress.send(WorkerResponse::LayerComplete {
            task: self.task,
            tile_id: self.tile_id.clone(),
            layer,
        });
    }
}

/// Thread body for one worker slot
pub(crate) fn worker_main(
    requests: Receiver<WorkerRequest>,
    responses: Sender<WorkerResponse>,
    fetcher: Arc<dyn TileFetcher>,
) {
    while let Ok(request) = requests.recv() {
        match request {
            WorkerRequest::FetchTile(job) => {
                let response = run_fetch(fetcher.as_ref(), &job, &responses);
                let _ = responses.send(response);
            }
            // The shared token already carries the interrupt; a queued
            // cancel for work we never started needs no reply.
            WorkerRequest::CancelTile { .. } => {}
            WorkerRequest::Shutdown => break,
        }
    }
}

fn run_fetch(
    fetcher: &dyn TileFetcher,
    job: &FetchJob,
    responses: &Sender<WorkerResponse>,
) -> WorkerResponse {
    let aborted = |error: Option<String>| WorkerResponse::Aborted {
        task: job.task,
        tile_id: job.tile_id.clone(),
        error,
    };

    if job.cancel.load(Ordering::SeqCst) {
        return aborted(None);
    }

    let request = FetchRequest {
        tile_id: job.tile_id.clone(),
        source: job.source.clone(),
    };
    let ctx = FetchContext {
        task: job.task,
        tile_id: job.tile_id.clone(),
        cancel: job.cancel.clone(),
        progress: responses.clone(),
    };

    // Panics stop at the worker boundary and become a plain failure
    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        fetcher.fetch(&request, &ctx)
    }));

    match outcome {
        Ok(Ok(layers)) => {
            if job.cancel.load(Ordering::SeqCst) {
                aborted(None)
            } else {
                WorkerResponse::FullComplete {
                    task: job.task,
                    tile_id: job.tile_id.clone(),
                    layers,
                }
            }
        }
        Ok(Err(e)) => aborted(Some(e.to_string())),
        Err(_) => aborted(Some("tile fetch panicked".to_string())),
    }
}
