use chrono::NaiveDate;
use rust_decimal_macros::dec;

use crate::ledger::{Category, SourceKind};
use crate::maintenance::{
    MaintenanceRecord, MaintenanceStatus, MaintenanceUpdate, NewMaintenanceRecord,
};
use crate::records::SourceRecord;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn oil_change() -> MaintenanceRecord {
    MaintenanceRecord::from_new(
        "m1".to_string(),
        &NewMaintenanceRecord {
            equipment_id: "truck".to_string(),
            title: "Oil change".to_string(),
            description: None,
            status: MaintenanceStatus::Upcoming,
            due_date: Some(date(2024, 2, 1)),
            completed_date: None,
            cost: dec!(120),
            odometer_reading: Some(82_000),
            service_provider: None,
            notes: None,
        },
    )
}

#[test]
fn test_ledger_date_prefers_completion_date() {
    let record = oil_change();
    let today = date(2024, 6, 1);
    assert_eq!(record.ledger_date(today), date(2024, 2, 1));

    let done = record.apply_patch(&MaintenanceUpdate::completed_on(date(2024, 2, 3)));
    assert_eq!(done.status, MaintenanceStatus::Completed);
    assert_eq!(done.ledger_date(today), date(2024, 2, 3));
}

#[test]
fn test_ledger_date_falls_back_to_today() {
    let mut record = oil_change();
    record.due_date = None;
    assert_eq!(record.ledger_date(date(2024, 6, 1)), date(2024, 6, 1));
}

#[test]
fn test_entry_uses_fixed_category_and_title() {
    let entry = oil_change().to_ledger_entry(date(2024, 6, 1));
    assert_eq!(entry.category, Category::Maintenance);
    assert_eq!(entry.source, SourceKind::Maintenance);
    assert_eq!(entry.description, "Oil change");
    assert_eq!(entry.amount, dec!(120));
}

#[test]
fn test_effective_status_flags_overdue() {
    let record = oil_change();
    assert_eq!(
        record.effective_status(date(2024, 1, 31)),
        MaintenanceStatus::Upcoming
    );
    assert_eq!(
        record.effective_status(date(2024, 2, 2)),
        MaintenanceStatus::Overdue
    );

    let done = record.apply_patch(&MaintenanceUpdate::completed_on(date(2024, 2, 3)));
    assert_eq!(
        done.effective_status(date(2025, 1, 1)),
        MaintenanceStatus::Completed
    );
}

#[test]
fn test_status_serializes_lowercase() {
    let json = serde_json::to_string(&MaintenanceStatus::Overdue).unwrap();
    assert_eq!(json, "\"overdue\"");
}

#[test]
fn test_update_rejects_negative_cost() {
    let patch = MaintenanceUpdate {
        cost: Some(dec!(-5)),
        ..Default::default()
    };
    assert!(patch.validate().is_err());
}
