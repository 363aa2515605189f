//! Per-video stream resolution and its cache.

pub mod cache;
pub mod models;
pub mod resolver;

pub use cache::{CacheStore, Clock, MemoryStore, ResolutionCache, SystemClock};
pub use models::{CacheEntry, StreamItem};
pub use resolver::StreamResolver;
