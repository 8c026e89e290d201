use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::costs::{Cost, CostUpdate, NewCost};
use crate::errors::{Error, ValidationError};
use crate::ledger::{Category, SourceKind};
use crate::records::SourceRecord;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn new_cost() -> NewCost {
    NewCost {
        equipment_id: "truck".to_string(),
        category: Category::Fuel,
        amount: dec!(50),
        date: date(2024, 1, 10),
        description: "Diesel".to_string(),
        receipt_url: None,
        notes: None,
    }
}

#[test]
fn test_new_cost_rejects_negative_amount() {
    let mut cost = new_cost();
    cost.amount = dec!(-1);
    let err = cost.validate().unwrap_err();
    assert!(matches!(
        err,
        Error::Validation(ValidationError::NegativeAmount { .. })
    ));
}

#[test]
fn test_new_cost_rejects_blank_description() {
    let mut cost = new_cost();
    cost.description = " ".to_string();
    assert!(matches!(
        cost.validate(),
        Err(Error::Validation(ValidationError::MissingField(field))) if field == "description"
    ));
}

#[test]
fn test_cost_keeps_its_own_category_in_the_ledger() {
    let mut new = new_cost();
    new.category = Category::Repair;
    let cost = Cost::from_new("c1".to_string(), &new);

    let entry = cost.to_ledger_entry(date(2030, 1, 1));
    assert_eq!(entry.category, Category::Repair);
    assert_eq!(entry.source, SourceKind::Cost);
    assert_eq!(entry.date, date(2024, 1, 10));
    assert_eq!(entry.amount, dec!(50));
    assert_eq!(entry.description, "Diesel");
}

#[test]
fn test_patch_only_touches_set_fields() {
    let cost = Cost::from_new("c1".to_string(), &new_cost());
    let patch = CostUpdate {
        amount: Some(dec!(65.40)),
        notes: Some(Some("Premium".to_string())),
        ..Default::default()
    };

    let updated = cost.apply_patch(&patch);
    assert_eq!(updated.amount, dec!(65.40));
    assert_eq!(updated.notes.as_deref(), Some("Premium"));
    assert_eq!(updated.description, cost.description);
    assert_eq!(updated.id, "c1");

    let cleared = updated.apply_patch(&CostUpdate {
        notes: Some(None),
        ..Default::default()
    });
    assert_eq!(cleared.notes, None);
}

#[test]
fn test_cost_deserializes_from_store_row() {
    let row = r#"{
        "id": "c9",
        "equipment_id": "truck",
        "category": "other",
        "amount": 12.5,
        "date": "2024-03-02",
        "description": "Car wash",
        "receipt_url": null
    }"#;
    let cost: Cost = serde_json::from_str(row).unwrap();
    assert_eq!(cost.category, Category::Other);
    assert_eq!(cost.amount, dec!(12.5));
    assert_eq!(cost.notes, None);
}
