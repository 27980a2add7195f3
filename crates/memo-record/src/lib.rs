//! # Memo Record
//!
//! 不可變記錄與衍生：每次以 `with_*` 替換欄位都會產生新實例，
//! 並帶著只清除該欄位命名空間的快取副本。

pub mod data_object;
pub mod derive;
pub mod id;
mod macros;

// Re-export 主要類型
pub use data_object::{DataObject, Fields, RecordType};
pub use derive::derive_cache;
pub use id::RecordId;

pub use memo_cache::{CacheStatsSnapshot, CacheStore, Memo, MemoHost};
pub use memo_core::{CacheConfig, MemoError, Namespace, Result, UnscopedPolicy};
