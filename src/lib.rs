//! # Memo
//!
//! 不可變記錄與選擇性失效的命名空間快取
//!
//! - [`memo_core`]：錯誤、命名空間、配置
//! - [`memo_cache`]：快取表與具型別的快取計算
//! - [`memo_record`]：動態與具型別的不可變記錄、衍生協定

pub use memo_cache;
pub use memo_core;
pub use memo_record;

// Re-export 主要類型
pub use memo_cache::{CacheStatsSnapshot, CacheStore, Memo, MemoHost};
pub use memo_core::{CacheConfig, MemoError, Namespace, Result, UnscopedPolicy};
pub use memo_record::{derive_cache, field_memo, immutable_record, DataObject, Fields, RecordId, RecordType};
