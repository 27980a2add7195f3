//! 集成測試

use chrono::{Datelike, NaiveDate};
use memo::{
    field_memo, immutable_record, CacheConfig, DataObject, Memo, MemoError, Namespace, RecordType, Result,
};
use rstest::rstest;
use rust_decimal::Decimal;
use serde_json::{json, Value};
use std::str::FromStr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

fn person_type(name_calls: Arc<AtomicUsize>, age_calls: Arc<AtomicUsize>) -> Arc<RecordType> {
    RecordType::new("Person")
        .memoize("nameUpperCase", "name", move |person| {
            name_calls.fetch_add(1, Ordering::SeqCst);
            let name = person.field("name")?.as_str().unwrap_or_default();
            Ok(json!(name.to_uppercase()))
        })
        .memoize("age", "birthYear", move |person| {
            age_calls.fetch_add(1, Ordering::SeqCst);
            let year = person.field("birthYear")?.as_i64().unwrap_or_default();
            Ok(json!(2020 - year))
        })
        .into_shared()
}

#[test]
fn test_person_scenario() {
    // 場景：nameUpperCase 依賴 name，age 依賴 birthYear；修改 birthYear 只重算 age
    let name_calls = Arc::new(AtomicUsize::new(0));
    let age_calls = Arc::new(AtomicUsize::new(0));
    let person = person_type(Arc::clone(&name_calls), Arc::clone(&age_calls));

    let p = DataObject::with_type(person, [("name", json!("foo")), ("birthYear", json!(2000))])
        .unwrap();

    assert_eq!(*p.compute("nameUpperCase").unwrap(), json!("FOO"));
    assert_eq!(name_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*p.compute("nameUpperCase").unwrap(), json!("FOO"));
    assert_eq!(name_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*p.compute("age").unwrap(), json!(20));

    let p2 = p.call_wither("withBirthYear", 1985).unwrap();
    assert_eq!(*p2.compute("nameUpperCase").unwrap(), json!("FOO"));
    assert_eq!(name_calls.load(Ordering::SeqCst), 1);
    assert_eq!(*p2.compute("age").unwrap(), json!(35));
    assert_eq!(age_calls.load(Ordering::SeqCst), 2);

    // 來源實例不受衍生影響
    assert_eq!(p.get("birthYear"), Some(&json!(2000)));
    assert_eq!(*p.compute("age").unwrap(), json!(20));
    assert_eq!(age_calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_sibling_derivations_are_independent() {
    let name_calls = Arc::new(AtomicUsize::new(0));
    let age_calls = Arc::new(AtomicUsize::new(0));
    let person = person_type(Arc::clone(&name_calls), Arc::clone(&age_calls));
    let p = DataObject::with_type(person, [("name", json!("foo")), ("birthYear", json!(2000))])
        .unwrap();
    p.compute("age").unwrap();

    let older = p.with_field("birthYear", 1950).unwrap();
    let younger = p.with_field("birthYear", 2010).unwrap();
    older.compute("nameUpperCase").unwrap();

    assert_eq!(*older.compute("age").unwrap(), json!(70));
    assert_eq!(*younger.compute("age").unwrap(), json!(10));
    assert!(!younger.cache().contains(&Namespace::field("name"), "nameUpperCase"));
    assert!(!p.cache().contains(&Namespace::field("name"), "nameUpperCase"));
    assert_eq!(*p.compute("age").unwrap(), json!(20));
}

#[rstest]
#[case::default_policy("{}", true)]
#[case::invalidate_policy(r#"{ "unscoped_policy": "invalidate_on_derive" }"#, false)]
fn test_unscoped_policy_from_config(#[case] config: &str, #[case] retained: bool) {
    let config = Arc::new(CacheConfig::from_json_str(config).unwrap());
    let record_type = RecordType::new("Tagged")
        .memoize_unscoped("summary", |record| Ok(json!(record.len())))
        .into_shared();

    let record = DataObject::with_config(record_type, [("a", json!(1)), ("b", json!(2))], config)
        .unwrap();
    record.compute("summary").unwrap();

    let derived = record.with_field("a", 10).unwrap();
    assert_eq!(derived.cache().contains(&Namespace::Unscoped, "summary"), retained);
}

#[test]
fn test_field_named_like_default_group() {
    let record_type = RecordType::new("Settings")
        .memoize_unscoped("checksum", |record| Ok(json!(record.to_json().to_string().len())))
        .into_shared();
    let record = DataObject::with_type(record_type, [("global", json!(true))]).unwrap();
    record.compute("checksum").unwrap();

    let derived = record.call_wither("withGlobal", false).unwrap();
    assert!(derived.cache().contains(&Namespace::Unscoped, "checksum"));
}

#[test]
fn test_immutability_errors_are_descriptive() {
    let record = DataObject::new([("foo", json!("foo"))]).unwrap();

    let err = record.assign("foo", "not foo").unwrap_err();
    assert_eq!(
        err,
        MemoError::ImmutableField {
            field: "foo".to_string()
        }
    );
    assert!(err.to_string().contains("foo"));

    let err = record.assign("newproperty", 2).unwrap_err();
    assert!(matches!(err, MemoError::NotExtensible { .. }));
    assert!(record.is_sealed());
}

immutable_record! {
    #[derive(Debug)]
    struct Member {
        name: String => with_name,
        birth_date: NaiveDate => with_birth_date,
        as_of: NaiveDate => with_as_of,
    }
}

impl Member {
    // age 同時依賴 birth_date 與 as_of，但只宣告在 birth_date 下
    const AGE: Memo<i32> = field_memo!(Member, birth_date, "age");
    const INITIAL: Memo<char> = field_memo!(Member, name, "initial");

    fn age(&self) -> Result<Arc<i32>> {
        Self::AGE.get(self, |member| member.as_of().year() - member.birth_date().year())
    }

    fn initial(&self) -> Result<Arc<char>> {
        Self::INITIAL.try_get(self, |member| {
            member
                .name()
                .chars()
                .next()
                .ok_or_else(|| MemoError::ComputationFailed("姓名為空".to_string()))
        })
    }
}

fn date(year: i32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, 1, 1).unwrap()
}

#[test]
fn test_typed_record_selective_invalidation() {
    let member = Member::new("ada".to_string(), date(2000), date(2020));
    assert_eq!(*member.age().unwrap(), 20);
    assert_eq!(*member.initial().unwrap(), 'a');

    let renamed = member.with_name("bea".to_string());
    assert_eq!(*renamed.initial().unwrap(), 'b');
    assert!(Member::AGE.is_cached(&renamed));

    let reborn = renamed.with_birth_date(date(1990));
    assert_eq!(*reborn.age().unwrap(), 30);
}

#[test]
fn test_mis_tagged_computation_goes_stale() {
    let member = Member::new("ada".to_string(), date(2000), date(2020));
    assert_eq!(*member.age().unwrap(), 20);

    // as_of 不是 age 的命名空間，衍生後仍沿用舊結果
    let later = member.with_as_of(date(2030));
    assert_eq!(*later.age().unwrap(), 20);
}

#[test]
fn test_typed_failure_is_not_cached() {
    let member = Member::new(String::new(), date(2000), date(2020));
    assert!(matches!(member.initial(), Err(MemoError::ComputationFailed(_))));
    assert!(!Member::INITIAL.is_cached(&member));

    let named = member.with_name("cy".to_string());
    assert_eq!(*named.initial().unwrap(), 'c');
}

#[test]
fn test_invoice_total_with_decimal() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&calls);
    let invoice_type = RecordType::new("Invoice")
        .memoize("total", "lines", move |invoice| {
            counter.fetch_add(1, Ordering::SeqCst);
            let mut total = Decimal::ZERO;
            for line in invoice.field("lines")?.as_array().into_iter().flatten() {
                let price = line["unit_price"].as_str().unwrap_or("0");
                let price = Decimal::from_str(price)
                    .map_err(|e| MemoError::ComputationFailed(e.to_string()))?;
                total += price * Decimal::from(line["qty"].as_i64().unwrap_or(0));
            }
            Ok(Value::String(total.to_string()))
        })
        .into_shared();

    let invoice = DataObject::from_json(
        invoice_type,
        json!({
            "customer": "ACME",
            "lines": [
                { "qty": 3, "unit_price": "0.10" },
                { "qty": 1, "unit_price": "0.20" }
            ]
        }),
    )
    .unwrap();

    assert_eq!(*invoice.compute("total").unwrap(), json!("0.50"));

    let renamed = invoice.with_field("customer", "Globex").unwrap();
    assert_eq!(*renamed.compute("total").unwrap(), json!("0.50"));
    assert_eq!(calls.load(Ordering::SeqCst), 1);

    let revised = renamed
        .call_wither("withLines", json!([{ "qty": 2, "unit_price": "1.25" }]))
        .unwrap();
    assert_eq!(*revised.compute("total").unwrap(), json!("2.50"));
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[test]
fn test_round_trip_identity() {
    let record = DataObject::new([("foo", json!("foo")), ("bar", json!([1, 2, 3]))]).unwrap();
    let same = record.with_field("bar", record.field("bar").unwrap().clone()).unwrap();

    assert_ne!(same.id(), record.id());
    assert_eq!(same, record);
}
