//! 人員記錄示例：衍生時只清除變更欄位的快取

use anyhow::Context;
use chrono::{Datelike, NaiveDate};
use memo::{field_memo, immutable_record, Memo, Result};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

immutable_record! {
    /// 人員
    #[derive(Debug)]
    pub struct Person {
        name: String => with_name,
        birth_date: NaiveDate => with_birth_date,
    }
}

impl Person {
    const NAME_UPPER_CASE: Memo<String> = field_memo!(Person, name, "name_upper_case");
    const AGE: Memo<i32> = field_memo!(Person, birth_date, "age");

    /// 大寫姓名
    pub fn name_upper_case(&self) -> Result<Arc<String>> {
        Self::NAME_UPPER_CASE.get(self, |person| {
            tracing::info!("計算大寫姓名: {}", person.name());
            person.name().to_uppercase()
        })
    }

    /// 2020 年時的年齡
    pub fn age(&self) -> Result<Arc<i32>> {
        Self::AGE.get(self, |person| {
            tracing::info!("計算年齡: {}", person.birth_date());
            2020 - person.birth_date().year()
        })
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 人員記錄示例 ===\n");

    let born = NaiveDate::from_ymd_opt(2000, 3, 14).context("無效的日期")?;
    let person = Person::new("foo".to_string(), born);

    println!("大寫姓名: {}", person.name_upper_case()?);
    println!("大寫姓名（快取）: {}", person.name_upper_case()?);
    println!("年齡: {}", person.age()?);

    let reborn = NaiveDate::from_ymd_opt(1985, 7, 1).context("無效的日期")?;
    let older = person.with_birth_date(reborn);

    println!("\n衍生後:");
    println!("  大寫姓名（沿用快取）: {}", older.name_upper_case()?);
    println!("  年齡（重新計算）: {}", older.age()?);

    let stats = older.memo_cache().stats();
    println!("\n快取統計: 命中 {} 次，計算 {} 次", stats.hits, stats.misses);

    Ok(())
}
