//! 命名空間快取表
//!
//! 兩層映射 `namespace -> key -> value`，每個記錄實例獨佔一份。
//! 項目一旦寫入就不會被覆寫，只能透過 [`CacheStore::prune_namespace`]
//! 在交給新擁有者之前整組移除。

use std::any::{type_name, Any};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use memo_core::{CacheConfig, MemoError, Namespace, Result};
use once_cell::sync::OnceCell;

use crate::stats::{CacheStats, CacheStatsSnapshot};

/// 快取值，以參考共享、不做深拷貝
pub type CachedValue = Arc<dyn Any + Send + Sync>;

type Slot = Arc<OnceCell<CachedValue>>;

/// 命名空間快取表
pub struct CacheStore {
    entries: RwLock<HashMap<Namespace, HashMap<String, Slot>>>,
    config: Arc<CacheConfig>,
    stats: CacheStats,
}

impl CacheStore {
    /// 創建空的快取表（預設配置）
    pub fn new() -> Self {
        Self::with_config(Arc::new(CacheConfig::default()))
    }

    /// 以指定配置創建空的快取表
    pub fn with_config(config: Arc<CacheConfig>) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            config,
            stats: CacheStats::new(),
        }
    }

    pub fn config(&self) -> &Arc<CacheConfig> {
        &self.config
    }

    /// 取得快取值，不存在時計算並寫入
    pub fn get_or_compute<T, F>(&self, namespace: &Namespace, key: &str, compute: F) -> Result<Arc<T>>
    where
        T: Any + Send + Sync,
        F: FnOnce() -> T,
    {
        self.try_get_or_compute(namespace, key, || Ok::<T, MemoError>(compute()))
    }

    /// 取得快取值，不存在時執行可能失敗的計算
    ///
    /// 計算失敗時錯誤原樣回傳且不寫入任何項目，下次存取會重新計算。
    /// 同一個 `(namespace, key)` 的並行首次存取只會計算一次，其餘呼叫端等待結果。
    ///
    /// # 注意
    /// 在 `compute` 內遞迴存取同一個 `(namespace, key)` 會造成死鎖；
    /// 存取其他項目則不受影響。
    pub fn try_get_or_compute<T, E, F>(
        &self,
        namespace: &Namespace,
        key: &str,
        compute: F,
    ) -> std::result::Result<Arc<T>, E>
    where
        T: Any + Send + Sync,
        E: From<MemoError>,
        F: FnOnce() -> std::result::Result<T, E>,
    {
        let slot = self.slot(namespace, key);

        let mut computed = false;
        let outcome = slot.get_or_try_init(|| {
            computed = true;
            tracing::debug!(%namespace, key, "計算快取項目");
            compute().map(|value| Arc::new(value) as CachedValue)
        });

        let value = match outcome {
            Ok(value) => Arc::clone(value),
            Err(err) => {
                self.stats.record_failure();
                return Err(err);
            }
        };

        if computed {
            self.stats.record_miss();
        } else {
            self.stats.record_hit();
            if self.config.trace_hits {
                tracing::trace!(%namespace, key, "快取命中");
            }
        }

        downcast(namespace, key, value).map_err(E::from)
    }

    /// 讀取已存在的項目，不觸發計算
    pub fn peek<T>(&self, namespace: &Namespace, key: &str) -> Result<Option<Arc<T>>>
    where
        T: Any + Send + Sync,
    {
        let value = {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            entries
                .get(namespace)
                .and_then(|inner| inner.get(key))
                .and_then(|slot| slot.get().cloned())
        };

        value.map(|value| downcast(namespace, key, value)).transpose()
    }

    /// 檢查項目是否已寫入
    pub fn contains(&self, namespace: &Namespace, key: &str) -> bool {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(namespace)
            .and_then(|inner| inner.get(key))
            .is_some_and(|slot| slot.get().is_some())
    }

    /// 已寫入的項目總數
    pub fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.values().map(count_filled).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// 指定命名空間下已寫入的項目數
    pub fn namespace_len(&self, namespace: &Namespace) -> usize {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries.get(namespace).map(count_filled).unwrap_or(0)
    }

    /// 至少有一個已寫入項目的命名空間（已排序）
    pub fn namespaces(&self) -> Vec<Namespace> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let mut namespaces: Vec<Namespace> = entries
            .iter()
            .filter(|(_, inner)| count_filled(inner) > 0)
            .map(|(namespace, _)| namespace.clone())
            .collect();
        namespaces.sort();
        namespaces
    }

    /// 移除整個命名空間，回傳被移除的已寫入項目數
    ///
    /// 需要獨佔存取，只用於剛複製、尚未交給新擁有者的快取表。
    pub fn prune_namespace(&mut self, namespace: &Namespace) -> usize {
        let entries = self.entries.get_mut().unwrap_or_else(PoisonError::into_inner);
        entries
            .remove(namespace)
            .map(|inner| count_filled(&inner))
            .unwrap_or(0)
    }

    /// 獲取命中統計快照
    pub fn stats(&self) -> CacheStatsSnapshot {
        self.stats.snapshot()
    }

    fn slot(&self, namespace: &Namespace, key: &str) -> Slot {
        {
            let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
            if let Some(slot) = entries.get(namespace).and_then(|inner| inner.get(key)) {
                return Arc::clone(slot);
            }
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let slot = entries
            .entry(namespace.clone())
            .or_default()
            .entry(key.to_string())
            .or_default();
        Arc::clone(slot)
    }
}

/// 淺層複製：每個命名空間的內層映射各自複製，快取值以參考共享。
///
/// 只複製已寫入的項目；計算中的槽位不會被帶到新快取表，
/// 因此新舊快取表之後的寫入互不影響。統計從零開始。
impl Clone for CacheStore {
    fn clone(&self) -> Self {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let copied = entries
            .iter()
            .filter_map(|(namespace, inner)| {
                let filled: HashMap<String, Slot> = inner
                    .iter()
                    .filter_map(|(key, slot)| {
                        slot.get()
                            .map(|value| (key.clone(), Arc::new(OnceCell::with_value(Arc::clone(value)))))
                    })
                    .collect();
                (!filled.is_empty()).then(|| (namespace.clone(), filled))
            })
            .collect();

        Self {
            entries: RwLock::new(copied),
            config: Arc::clone(&self.config),
            stats: CacheStats::new(),
        }
    }
}

impl Default for CacheStore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for CacheStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheStore")
            .field("namespaces", &self.namespaces())
            .field("len", &self.len())
            .field("stats", &self.stats())
            .finish()
    }
}

fn count_filled(inner: &HashMap<String, Slot>) -> usize {
    inner.values().filter(|slot| slot.get().is_some()).count()
}

fn downcast<T>(namespace: &Namespace, key: &str, value: CachedValue) -> Result<Arc<T>>
where
    T: Any + Send + Sync,
{
    value.downcast::<T>().map_err(|_| MemoError::TypeMismatch {
        namespace: namespace.to_string(),
        key: key.to_string(),
        expected: type_name::<T>(),
    })
}
