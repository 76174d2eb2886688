pub mod heap;
pub mod scheduler;

pub use heap::MinHeap;
pub use scheduler::{FrameClock, RenderPriority, RenderScheduler};
