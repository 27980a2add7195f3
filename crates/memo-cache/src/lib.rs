//! # Memo Cache
//!
//! 命名空間快取表與延遲計算

pub mod memo;
pub mod stats;
pub mod store;

// Re-export 主要類型
pub use memo::{Memo, MemoHost};
pub use stats::{CacheStats, CacheStatsSnapshot};
pub use store::{CacheStore, CachedValue};
