//! 衍生方法命名

/// 首字母大寫
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// 由欄位名稱產生衍生方法名稱，例如 `with` + `birthYear` -> `withBirthYear`
pub fn wither_name(prefix: &str, field: &str) -> String {
    format!("{}{}", prefix, capitalize(field))
}
