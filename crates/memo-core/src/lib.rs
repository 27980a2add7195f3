//! # Memo Core
//!
//! 核心類型：錯誤、快取命名空間、配置與命名工具

pub mod config;
pub mod namespace;
pub mod naming;

// Re-export 主要類型
pub use config::{CacheConfig, UnscopedPolicy};
pub use namespace::Namespace;
pub use naming::{capitalize, wither_name};

/// Memo 錯誤類型
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MemoError {
    #[error("無法在非可快取類型 {host} 上使用 memoize（計算: {computation}），請確認該類型持有 CacheStore")]
    NotCacheable {
        computation: String,
        host: &'static str,
    },

    #[error("禁止直接設定欄位 {field} 的值，請改用不可變的 with 衍生方法")]
    ImmutableField { field: String },

    #[error("物件不可擴充，無法新增欄位: {field}")]
    NotExtensible { field: String },

    #[error("找不到欄位: {0}")]
    UnknownField(String),

    #[error("找不到衍生方法: {0}")]
    UnknownWither(String),

    #[error("找不到計算: {0}")]
    UnknownComputation(String),

    #[error("無效的欄位名稱: {0:?}")]
    InvalidFieldName(String),

    #[error("衍生方法名稱衝突: {wither}（欄位 {first} 與 {second}）")]
    WitherCollision {
        wither: String,
        first: String,
        second: String,
    },

    #[error("快取型別不符: {namespace}/{key} 並非 {expected}")]
    TypeMismatch {
        namespace: String,
        key: String,
        expected: &'static str,
    },

    #[error("原始資料必須是 JSON 物件，實際為: {0}")]
    InvalidRaw(String),

    #[error("計算失敗: {0}")]
    ComputationFailed(String),

    #[error("配置錯誤: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, MemoError>;
