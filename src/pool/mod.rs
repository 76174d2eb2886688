//! Bounded pool of isolated fetch workers.
//!
//! Workers are OS threads that share no mutable state with the
//! coordinator; every exchange is a message over a channel, plus one
//! atomic cancellation token per task.

pub mod pool;
pub mod protocol;
pub mod task;
pub mod worker;

pub use pool::{PoolEvent, WorkerPool};
