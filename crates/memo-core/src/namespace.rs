//! 快取命名空間
//!
//! 命名空間是失效群組：同一命名空間下的計算會在對應欄位被衍生時一起失效。

use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::fmt;

/// 快取命名空間
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Namespace {
    /// 未指定命名空間（預設群組），永遠不等於任何欄位名稱
    #[default]
    Unscoped,

    /// 依附於某個欄位，該欄位被衍生時失效
    Field(Cow<'static, str>),
}

impl Namespace {
    /// 建立綁定欄位的命名空間（可用於 const）
    pub const fn field(name: &'static str) -> Self {
        Namespace::Field(Cow::Borrowed(name))
    }

    /// 以執行期字串建立綁定欄位的命名空間
    pub fn owned(name: impl Into<String>) -> Self {
        Namespace::Field(Cow::Owned(name.into()))
    }

    pub fn is_unscoped(&self) -> bool {
        matches!(self, Namespace::Unscoped)
    }

    /// 檢查是否由指定欄位觸發失效
    pub fn is_field(&self, field: &str) -> bool {
        match self {
            Namespace::Field(name) => name == field,
            Namespace::Unscoped => false,
        }
    }
}

impl From<&'static str> for Namespace {
    fn from(name: &'static str) -> Self {
        Namespace::field(name)
    }
}

impl From<String> for Namespace {
    fn from(name: String) -> Self {
        Namespace::owned(name)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Namespace::Unscoped => f.write_str("<unscoped>"),
            Namespace::Field(name) => f.write_str(name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_unscoped() {
        assert_eq!(Namespace::default(), Namespace::Unscoped);
        assert!(Namespace::default().is_unscoped());
    }

    #[test]
    fn test_borrowed_and_owned_are_equal() {
        const NAME: Namespace = Namespace::field("name");
        assert_eq!(NAME, Namespace::owned("name".to_string()));
        assert_eq!(Namespace::from("name"), NAME);
    }

    #[test]
    fn test_unscoped_never_matches_a_field() {
        // 即使欄位名稱剛好是 "global"，也不會觸發預設群組失效
        assert!(!Namespace::Unscoped.is_field("global"));
        assert!(!Namespace::Unscoped.is_field("<unscoped>"));
        assert!(Namespace::field("global").is_field("global"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Namespace::field("birthYear").to_string(), "birthYear");
        assert_eq!(Namespace::Unscoped.to_string(), "<unscoped>");
    }
}
