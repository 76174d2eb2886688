pub mod lru;

pub use lru::{EvictionObserver, LruCache};
