//! 具型別的不可變記錄

/// 宣告具型別的不可變記錄
///
/// 每個欄位產生一個唯讀存取方法與一個指定名稱的衍生方法，沒有任何 setter。
/// 欄位以 `Arc` 保存，衍生時未變更的欄位以參考共享。
/// 衍生方法清除的命名空間就是欄位識別字本身（例如 `birth_year`），
/// 依賴該欄位的 [`Memo`](crate::Memo) 以 [`field_memo!`](crate::field_memo) 宣告，
/// 欄位名稱在編譯期檢查。
///
/// 另外產生 `new`、`new_with_config`、`record_id` 與 `memo_cache`，
/// 這些名稱不可再作為欄位名稱。
///
/// ```
/// use memo_record::{field_memo, immutable_record, Memo, Result};
/// use std::sync::Arc;
///
/// immutable_record! {
///     pub struct Person {
///         id: u64 => with_id,
///         name: String => with_name,
///         birth_year: i32 => with_birth_year,
///     }
/// }
///
/// impl Person {
///     const NAME_UPPER_CASE: Memo<String> = field_memo!(Person, name, "name_upper_case");
///
///     pub fn name_upper_case(&self) -> Result<Arc<String>> {
///         Self::NAME_UPPER_CASE.get(self, |person| person.name().to_uppercase())
///     }
/// }
///
/// let p = Person::new(7, "foo".to_string(), 2000);
/// assert_eq!(*p.name_upper_case().unwrap(), "FOO");
///
/// let p2 = p.with_birth_year(1985);
/// assert!(Person::NAME_UPPER_CASE.is_cached(&p2));
/// assert_eq!(*p2.birth_year(), 1985);
/// assert_eq!(*p2.id(), 7);
/// assert_ne!(p.record_id(), p2.record_id());
/// ```
#[macro_export]
macro_rules! immutable_record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field:ident : $ty:ty => $wither:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $( $field: ::std::sync::Arc<$ty>, )*
            __record_id: $crate::RecordId,
            __cache: $crate::CacheStore,
        }

        #[allow(dead_code)]
        impl $name {
            /// 以欄位值建立新實例（預設快取配置）
            #[allow(clippy::too_many_arguments)]
            pub fn new($( $field: $ty ),*) -> Self {
                Self::new_with_config(
                    ::std::sync::Arc::new($crate::CacheConfig::default()),
                    $( $field ),*
                )
            }

            /// 以欄位值與指定快取配置建立新實例
            #[allow(clippy::too_many_arguments)]
            pub fn new_with_config(
                config: ::std::sync::Arc<$crate::CacheConfig>,
                $( $field: $ty ),*
            ) -> Self {
                Self {
                    $( $field: ::std::sync::Arc::new($field), )*
                    __record_id: $crate::RecordId::new(),
                    __cache: $crate::CacheStore::with_config(config),
                }
            }

            $(
                $(#[$field_meta])*
                pub fn $field(&self) -> &$ty {
                    &self.$field
                }

                #[doc = concat!(
                    "衍生新實例並替換 `", stringify!($field),
                    "`，清除 `", stringify!($field), "` 命名空間的快取"
                )]
                pub fn $wither(&self, value: $ty) -> Self {
                    let mut next = self.__derive(stringify!($field));
                    next.$field = ::std::sync::Arc::new(value);
                    next
                }
            )*

            /// 實例 ID，每次衍生都不同
            pub fn record_id(&self) -> $crate::RecordId {
                self.__record_id
            }

            pub fn memo_cache(&self) -> &$crate::CacheStore {
                &self.__cache
            }

            fn __derive(&self, field: &str) -> Self {
                Self {
                    $( $field: ::std::sync::Arc::clone(&self.$field), )*
                    __record_id: $crate::RecordId::new(),
                    __cache: $crate::derive_cache(&self.__cache, stringify!($name), field),
                }
            }
        }

        impl $crate::MemoHost for $name {
            fn memo_store(&self) -> ::std::option::Option<&$crate::CacheStore> {
                ::std::option::Option::Some(&self.__cache)
            }
        }
    };
}

/// 宣告依賴某個記錄欄位的 [`Memo`](crate::Memo)
///
/// 命名空間取自欄位識別字，與 [`immutable_record!`](crate::immutable_record)
/// 衍生時清除的名稱一致；欄位不存在時無法編譯。
///
/// ```compile_fail
/// use memo_record::{field_memo, immutable_record, Memo};
///
/// immutable_record! {
///     pub struct Person {
///         birth_year: i32 => with_birth_year,
///     }
/// }
///
/// impl Person {
///     const AGE: Memo<i32> = field_memo!(Person, birthYear, "age");
/// }
/// ```
#[macro_export]
macro_rules! field_memo {
    ($record:ty, $field:ident, $key:expr) => {{
        #[allow(dead_code)]
        fn __field_exists(record: &$record) {
            let _ = &record.$field;
        }
        $crate::Memo::scoped($key, stringify!($field))
    }};
}
