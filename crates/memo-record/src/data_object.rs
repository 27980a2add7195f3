//! 以映射為底的動態記錄
//!
//! 欄位在建構時才知道：每個欄位有一個唯讀存取與一個 `withField` 衍生方法，
//! 衍生方法名稱由配置的前綴加上首字母大寫的欄位名稱組成。
//! 計算則註冊在 [`RecordType`] 上，由同一類型衍生出的所有實例共用。

use serde::ser::{Serialize, Serializer};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use memo_cache::{CacheStore, MemoHost};
use memo_core::{wither_name, CacheConfig, MemoError, Namespace, Result};

use crate::derive::derive_cache;
use crate::id::RecordId;

/// 欄位映射，值以 `Arc` 共享
pub type Fields = BTreeMap<String, Arc<Value>>;

type ComputeFn = dyn Fn(&DataObject) -> Result<Value> + Send + Sync;

#[derive(Clone)]
struct Computation {
    namespace: Namespace,
    compute: Arc<ComputeFn>,
}

/// 記錄類型：名稱加上已註冊的快取計算
#[derive(Clone)]
pub struct RecordType {
    name: String,
    computations: BTreeMap<String, Computation>,
}

impl RecordType {
    /// 創建沒有任何計算的類型
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computations: BTreeMap::new(),
        }
    }

    /// 基礎類型
    pub fn base() -> Self {
        Self::new("DataObject")
    }

    /// 以現有類型為基礎建立子類型，繼承所有計算
    pub fn extend(&self, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            computations: self.computations.clone(),
        }
    }

    /// 註冊快取計算；同名計算會被取代
    pub fn memoize<F>(mut self, key: impl Into<String>, namespace: impl Into<Namespace>, compute: F) -> Self
    where
        F: Fn(&DataObject) -> Result<Value> + Send + Sync + 'static,
    {
        self.computations.insert(
            key.into(),
            Computation {
                namespace: namespace.into(),
                compute: Arc::new(compute),
            },
        );
        self
    }

    /// 註冊未指定命名空間的快取計算
    pub fn memoize_unscoped<F>(self, key: impl Into<String>, compute: F) -> Self
    where
        F: Fn(&DataObject) -> Result<Value> + Send + Sync + 'static,
    {
        self.memoize(key, Namespace::Unscoped, compute)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn computation_names(&self) -> impl Iterator<Item = &str> {
        self.computations.keys().map(String::as_str)
    }

    /// 查詢計算所屬的命名空間
    pub fn namespace_of(&self, key: &str) -> Option<&Namespace> {
        self.computations.get(key).map(|computation| &computation.namespace)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

impl fmt::Debug for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let computations: BTreeMap<&str, &Namespace> = self
            .computations
            .iter()
            .map(|(key, computation)| (key.as_str(), &computation.namespace))
            .collect();

        f.debug_struct("RecordType")
            .field("name", &self.name)
            .field("computations", &computations)
            .finish()
    }
}

/// 動態不可變記錄
///
/// 建構後即封閉：沒有任何方法能修改欄位或新增欄位，
/// 唯一取得變更後記錄的方式是衍生新實例。
pub struct DataObject {
    id: RecordId,
    record_type: Arc<RecordType>,
    raw: Fields,
    cache: CacheStore,
}

impl DataObject {
    /// 以基礎類型與預設配置建立記錄
    pub fn new<I, K>(fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::with_type(RecordType::base().into_shared(), fields)
    }

    /// 沒有欄位的記錄
    pub fn empty() -> Self {
        Self::assemble(
            RecordType::base().into_shared(),
            Fields::new(),
            CacheStore::new(),
        )
    }

    /// 以指定類型建立記錄
    pub fn with_type<I, K>(record_type: Arc<RecordType>, fields: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        Self::with_config(record_type, fields, Arc::new(CacheConfig::default()))
    }

    /// 以指定類型與配置建立記錄
    pub fn with_config<I, K>(
        record_type: Arc<RecordType>,
        fields: I,
        config: Arc<CacheConfig>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: Into<String>,
    {
        config.validate()?;

        let raw: Fields = fields
            .into_iter()
            .map(|(key, value)| (key.into(), Arc::new(value)))
            .collect();
        validate_fields(&raw, &config.wither_prefix)?;

        Ok(Self::assemble(record_type, raw, CacheStore::with_config(config)))
    }

    /// 從 JSON 物件建立記錄（預設配置）
    pub fn from_json(record_type: Arc<RecordType>, json: Value) -> Result<Self> {
        Self::from_json_with_config(record_type, json, Arc::new(CacheConfig::default()))
    }

    /// 從 JSON 物件建立記錄並指定配置
    pub fn from_json_with_config(
        record_type: Arc<RecordType>,
        json: Value,
        config: Arc<CacheConfig>,
    ) -> Result<Self> {
        match json {
            Value::Object(map) => Self::with_config(record_type, map, config),
            other => Err(MemoError::InvalidRaw(json_kind(&other).to_string())),
        }
    }

    fn assemble(record_type: Arc<RecordType>, raw: Fields, cache: CacheStore) -> Self {
        Self {
            id: RecordId::new(),
            record_type,
            raw,
            cache,
        }
    }

    pub fn id(&self) -> RecordId {
        self.id
    }

    pub fn record_type(&self) -> &Arc<RecordType> {
        &self.record_type
    }

    pub fn cache(&self) -> &CacheStore {
        &self.cache
    }

    /// 讀取欄位
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.raw.get(field).map(Arc::as_ref)
    }

    /// 讀取欄位，不存在時回傳錯誤
    pub fn field(&self, field: &str) -> Result<&Value> {
        self.get(field)
            .ok_or_else(|| MemoError::UnknownField(field.to_string()))
    }

    /// 讀取欄位的共享參考
    pub fn get_shared(&self, field: &str) -> Option<&Arc<Value>> {
        self.raw.get(field)
    }

    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.raw.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.raw.len()
    }

    pub fn is_empty(&self) -> bool {
        self.raw.is_empty()
    }

    /// 欄位對應的衍生方法名稱，例如 `birthYear` -> `withBirthYear`
    pub fn wither_name(&self, field: &str) -> Option<String> {
        self.raw
            .contains_key(field)
            .then(|| wither_name(&self.cache.config().wither_prefix, field))
    }

    /// 所有衍生方法名稱（依欄位名稱排序）
    pub fn wither_names(&self) -> Vec<String> {
        let prefix = &self.cache.config().wither_prefix;
        self.raw.keys().map(|field| wither_name(prefix, field)).collect()
    }

    /// 衍生新實例並替換單一欄位
    ///
    /// 其他欄位以參考共享；新實例的快取是來源快取的副本，
    /// 只移除與 `field` 同名的命名空間。來源實例不受影響。
    pub fn with_field(&self, field: &str, value: impl Into<Value>) -> Result<Self> {
        if !self.raw.contains_key(field) {
            return Err(MemoError::UnknownField(field.to_string()));
        }

        let mut raw = self.raw.clone();
        raw.insert(field.to_string(), Arc::new(value.into()));
        let cache = derive_cache(&self.cache, self.record_type.name(), field);

        Ok(Self::assemble(Arc::clone(&self.record_type), raw, cache))
    }

    /// 以衍生方法名稱衍生，例如 `call_wither("withBirthYear", 1985)`
    pub fn call_wither(&self, wither: &str, value: impl Into<Value>) -> Result<Self> {
        let prefix = &self.cache.config().wither_prefix;
        let field = self
            .raw
            .keys()
            .find(|field| wither_name(prefix, field) == wither)
            .ok_or_else(|| MemoError::UnknownWither(wither.to_string()))?
            .clone();

        self.with_field(&field, value)
    }

    /// 取得已註冊計算的結果，首次存取時計算並快取
    pub fn compute(&self, key: &str) -> Result<Arc<Value>> {
        let computation = self
            .record_type
            .computations
            .get(key)
            .ok_or_else(|| MemoError::UnknownComputation(key.to_string()))?;

        self.cache
            .try_get_or_compute(&computation.namespace, key, || (computation.compute)(self))
    }

    /// 直接賦值一律失敗：既有欄位為 `ImmutableField`，新欄位為 `NotExtensible`
    pub fn assign(&self, field: &str, _value: impl Into<Value>) -> Result<()> {
        if self.raw.contains_key(field) {
            Err(MemoError::ImmutableField {
                field: field.to_string(),
            })
        } else {
            Err(MemoError::NotExtensible {
                field: field.to_string(),
            })
        }
    }

    /// 記錄永遠是封閉的
    pub fn is_sealed(&self) -> bool {
        true
    }

    /// 匯出欄位為 JSON 物件
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .raw
            .iter()
            .map(|(key, value)| (key.clone(), value.as_ref().clone()))
            .collect();
        Value::Object(map)
    }
}

impl MemoHost for DataObject {
    fn memo_store(&self) -> Option<&CacheStore> {
        Some(&self.cache)
    }
}

/// 逐欄位值相等（並比較類型名稱），不比較實例 ID 與快取
impl PartialEq for DataObject {
    fn eq(&self, other: &Self) -> bool {
        self.record_type.name() == other.record_type.name() && self.raw == other.raw
    }
}

impl fmt::Debug for DataObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct(self.record_type.name())
            .field("id", &self.id)
            .field("fields", &self.raw)
            .field("cache", &self.cache)
            .finish()
    }
}

impl Serialize for DataObject {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_map(self.raw.iter().map(|(key, value)| (key, value.as_ref())))
    }
}

fn validate_fields(raw: &Fields, prefix: &str) -> Result<()> {
    let mut withers: BTreeMap<String, &str> = BTreeMap::new();

    for field in raw.keys() {
        if field.is_empty() {
            return Err(MemoError::InvalidFieldName(field.clone()));
        }

        let wither = wither_name(prefix, field);
        if let Some(first) = withers.insert(wither.clone(), field) {
            return Err(MemoError::WitherCollision {
                wither,
                first: first.to_string(),
                second: field.clone(),
            });
        }
    }

    Ok(())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
