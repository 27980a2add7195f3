//! 發票示例：以動態記錄快取金額合計

use memo::{DataObject, MemoError, RecordType, Result};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// 發票明細合計
fn lines_total(invoice: &DataObject) -> Result<Value> {
    let lines = invoice
        .field("lines")?
        .as_array()
        .ok_or_else(|| MemoError::ComputationFailed("lines 必須是陣列".to_string()))?;

    let mut total = Decimal::ZERO;
    for line in lines {
        let qty = line["qty"]
            .as_i64()
            .ok_or_else(|| MemoError::ComputationFailed(format!("缺少數量: {line}")))?;
        let unit_price = line["unit_price"]
            .as_str()
            .ok_or_else(|| MemoError::ComputationFailed(format!("缺少單價: {line}")))
            .and_then(|price| {
                Decimal::from_str(price).map_err(|e| MemoError::ComputationFailed(e.to_string()))
            })?;
        total += unit_price * Decimal::from(qty);
    }

    tracing::info!("計算發票合計: {}", total);
    Ok(json!(total.to_string()))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== 發票示例 ===\n");

    let invoice_type = RecordType::new("Invoice")
        .memoize("total", "lines", lines_total)
        .memoize("customerLabel", "customer", |invoice| {
            let customer = invoice.field("customer")?.as_str().unwrap_or("未知客戶");
            Ok(json!(format!("客戶: {customer}")))
        })
        .into_shared();

    let invoice = DataObject::from_json(
        invoice_type,
        json!({
            "customer": "ACME",
            "lines": [
                { "sku": "BOLT-10", "qty": 100, "unit_price": "0.35" },
                { "sku": "NUT-10", "qty": 100, "unit_price": "0.12" }
            ]
        }),
    )?;

    println!("{}", invoice.compute("customerLabel")?);
    println!("合計: {}", invoice.compute("total")?);

    let revised = invoice.call_wither(
        "withLines",
        json!([{ "sku": "BOLT-10", "qty": 250, "unit_price": "0.35" }]),
    )?;

    println!("\n修改明細後:");
    println!("{}（沿用快取）", revised.compute("customerLabel")?);
    println!("合計（重新計算）: {}", revised.compute("total")?);

    println!("\n原發票合計不變: {}", invoice.compute("total")?);

    Ok(())
}
