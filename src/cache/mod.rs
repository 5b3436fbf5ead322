//! Cache Module
//!
//! Versioned generations of response snapshots backing the offline worker.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::{RequestKey, ResponseSnapshot};
pub use stats::{CacheStats, StatsSnapshot};
pub use store::{CacheStorage, Generation};
