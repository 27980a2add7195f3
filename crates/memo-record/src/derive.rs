//! 衍生協定：複製快取並清除被替換欄位的命名空間

use memo_cache::CacheStore;
use memo_core::Namespace;

/// 為衍生出的新實例準備快取
///
/// 複製來源快取後移除與 `field` 同名的命名空間；其他命名空間的結果原樣保留，
/// 不會重新計算。配置為 `InvalidateOnDerive` 時，未指定命名空間的項目也一併移除。
/// 來源快取不受影響。
pub fn derive_cache(source: &CacheStore, record: &str, field: &str) -> CacheStore {
    let mut cache = source.clone();

    let mut pruned = cache.prune_namespace(&Namespace::owned(field));
    if cache.config().invalidates_unscoped() {
        pruned += cache.prune_namespace(&Namespace::Unscoped);
    }

    tracing::debug!(
        record,
        field,
        pruned,
        retained = cache.len(),
        "衍生記錄，清除欄位命名空間快取"
    );

    cache
}
