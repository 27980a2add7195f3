//! 快取配置模型

use serde::{Deserialize, Serialize};

use crate::{MemoError, Result};

/// 快取與衍生行為配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// 未指定命名空間的快取項目在衍生時的處理方式
    pub unscoped_policy: UnscopedPolicy,

    /// 動態記錄衍生方法名稱前綴
    pub wither_prefix: String,

    /// 是否在快取命中時輸出 trace 日誌
    pub trace_hits: bool,
}

impl CacheConfig {
    /// 創建預設配置
    pub fn new() -> Self {
        Self {
            unscoped_policy: UnscopedPolicy::Retain,
            wither_prefix: "with".to_string(),
            trace_hits: false,
        }
    }

    /// 從 JSON 字串載入配置，缺少的欄位使用預設值
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| MemoError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 建構器模式：設置未指定命名空間的處理方式
    pub fn with_unscoped_policy(mut self, policy: UnscopedPolicy) -> Self {
        self.unscoped_policy = policy;
        self
    }

    /// 建構器模式：設置衍生方法名稱前綴
    pub fn with_wither_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.wither_prefix = prefix.into();
        self
    }

    /// 建構器模式：設置是否追蹤快取命中
    pub fn with_trace_hits(mut self, enabled: bool) -> Self {
        self.trace_hits = enabled;
        self
    }

    /// 驗證配置：衍生方法前綴不可為空白
    pub fn validate(&self) -> Result<()> {
        if self.wither_prefix.trim().is_empty() {
            return Err(MemoError::Config("wither_prefix 不可為空".to_string()));
        }
        Ok(())
    }

    /// 衍生時是否一併清除未指定命名空間的項目
    pub fn invalidates_unscoped(&self) -> bool {
        self.unscoped_policy == UnscopedPolicy::InvalidateOnDerive
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// 未指定命名空間的失效策略
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnscopedPolicy {
    /// 保留：任何衍生都不會清除（預設）
    #[default]
    Retain,

    /// 每次衍生都清除
    InvalidateOnDerive,
}
