//! 具型別的快取計算描述

use std::any::{type_name, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use memo_core::{MemoError, Namespace, Result};

use crate::store::CacheStore;

/// 可快取能力
///
/// 持有 [`CacheStore`] 的類型回傳 `Some`；回傳 `None` 的類型不具快取能力，
/// 在其上使用 [`Memo`] 會得到 [`MemoError::NotCacheable`]。
pub trait MemoHost {
    fn memo_store(&self) -> Option<&CacheStore>;
}

impl MemoHost for CacheStore {
    fn memo_store(&self) -> Option<&CacheStore> {
        Some(self)
    }
}

/// 快取計算描述
///
/// 以計算名稱為鍵，不考慮參數；依賴某欄位的計算必須宣告在該欄位的命名空間下，
/// 否則衍生後會讀到過期的結果。
///
/// ```
/// use memo_cache::{CacheStore, Memo};
///
/// const NAME_UPPER: Memo<String> = Memo::scoped("nameUpperCase", "name");
///
/// let store = CacheStore::new();
/// let value = NAME_UPPER.get(&store, |_| "FOO".to_string()).unwrap();
/// assert_eq!(*value, "FOO");
/// ```
pub struct Memo<T> {
    key: &'static str,
    namespace: Namespace,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Memo<T> {
    /// 未指定命名空間的計算
    pub const fn new(key: &'static str) -> Self {
        Self {
            key,
            namespace: Namespace::Unscoped,
            _marker: PhantomData,
        }
    }

    /// 綁定到欄位命名空間的計算
    pub const fn scoped(key: &'static str, field: &'static str) -> Self {
        Self {
            key,
            namespace: Namespace::field(field),
            _marker: PhantomData,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }
}

impl<T> Memo<T>
where
    T: Any + Send + Sync,
{
    /// 取得快取結果，首次存取時以 `compute(host)` 計算
    pub fn get<H, F>(&self, host: &H, compute: F) -> Result<Arc<T>>
    where
        H: MemoHost + ?Sized,
        F: FnOnce(&H) -> T,
    {
        let store = self.store_of(host)?;
        store.get_or_compute(&self.namespace, self.key, || compute(host))
    }

    /// 取得快取結果，計算可能失敗；失敗不寫入快取
    pub fn try_get<H, E, F>(&self, host: &H, compute: F) -> std::result::Result<Arc<T>, E>
    where
        H: MemoHost + ?Sized,
        E: From<MemoError>,
        F: FnOnce(&H) -> std::result::Result<T, E>,
    {
        let store = self.store_of(host)?;
        store.try_get_or_compute(&self.namespace, self.key, || compute(host))
    }

    /// 檢查結果是否已快取
    pub fn is_cached<H>(&self, host: &H) -> bool
    where
        H: MemoHost + ?Sized,
    {
        host.memo_store()
            .is_some_and(|store| store.contains(&self.namespace, self.key))
    }

    fn store_of<'h, H>(&self, host: &'h H) -> Result<&'h CacheStore>
    where
        H: MemoHost + ?Sized,
    {
        host.memo_store().ok_or_else(|| MemoError::NotCacheable {
            computation: self.key.to_string(),
            host: type_name::<H>(),
        })
    }
}

impl<T> Clone for Memo<T> {
    fn clone(&self) -> Self {
        Self {
            key: self.key,
            namespace: self.namespace.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Memo<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("key", &self.key)
            .field("namespace", &self.namespace)
            .field("type", &type_name::<T>())
            .finish()
    }
}
