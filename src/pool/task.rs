use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Unique identifier for fetch tasks
pub type TaskId = u64;

/// Lifecycle of a dispatched task.
///
/// Status is monotonic: once terminal it never changes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    InProgress,
    Fulfilled,
    Canceled,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, TaskStatus::InProgress)
    }
}

/// Coordinator-side bookkeeping for one dispatched task
#[derive(Debug)]
pub(crate) struct TaskEntry {
    pub status: TaskStatus,
    pub tile_id: String,
    pub slot: usize,
    pub cancel: Arc<AtomicBool>,
}

/// Handle to a dispatched task.
///
/// Cancellation goes through [`crate::pool::WorkerPool::cancel`] with this
/// handle's id; the pool owns the task table, so the handle itself stays a
/// plain value.
#[derive(Debug, Clone, Copy)]
pub struct TaskHandle {
    id: TaskId,
}

impl TaskHandle {
    pub(crate) fn new(id: TaskId) -> Self {
        Self { id }
    }

    pub fn id(&self) -> TaskId {
        self.id
    }
}
