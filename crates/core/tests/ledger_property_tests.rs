//! Property-based integration tests for the cost ledger.
//!
//! These tests verify that the ledger invariants hold for arbitrary record
//! collections, using the `proptest` crate for random test case generation.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDate;
use gearlog_core::costs::{Cost, NewCost};
use gearlog_core::errors::StoreError;
use gearlog_core::ledger::{
    aggregate, filter, sort, summarize, Category, LedgerEntry, LedgerFilter, SortDirection,
};
use gearlog_core::maintenance::{MaintenanceRecord, MaintenanceStatus};
use gearlog_core::records::{InMemoryRemoteStore, RecordMutator, RecordSource, RecordStore};
use gearlog_core::repairs::{Repair, RepairStatus};
use gearlog_core::upgrades::{Upgrade, UpgradeCategory, UpgradeStatus};
use proptest::prelude::*;
use rust_decimal::Decimal;

// =============================================================================
// Generators
// =============================================================================

fn today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
}

fn arb_date() -> impl Strategy<Value = NaiveDate> {
    (2023i32..=2025, 1u32..=12, 1u32..=28)
        .prop_map(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d).unwrap())
}

/// Non-negative amount with two decimal places.
fn arb_amount() -> impl Strategy<Value = Decimal> {
    (0i64..10_000_000).prop_map(|cents| Decimal::new(cents, 2))
}

fn arb_category() -> impl Strategy<Value = Category> {
    prop_oneof![
        Just(Category::Maintenance),
        Just(Category::Repair),
        Just(Category::Upgrade),
        Just(Category::Fuel),
        Just(Category::Other),
    ]
}

fn arb_equipment() -> impl Strategy<Value = String> {
    prop_oneof![Just("truck"), Just("mower"), Just("boat")].prop_map(str::to_string)
}

fn arb_costs() -> impl Strategy<Value = Vec<Cost>> {
    proptest::collection::vec(
        (arb_equipment(), arb_category(), arb_amount(), arb_date()),
        0..15,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (equipment_id, category, amount, date))| Cost {
                id: format!("c{}", i),
                equipment_id,
                category,
                amount,
                date,
                description: format!("Cost {}", i),
                receipt_url: None,
                notes: None,
            })
            .collect()
    })
}

fn arb_maintenance() -> impl Strategy<Value = Vec<MaintenanceRecord>> {
    proptest::collection::vec(
        (
            arb_equipment(),
            arb_amount(),
            proptest::option::of(arb_date()),
            proptest::option::of(arb_date()),
        ),
        0..10,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (equipment_id, cost, due_date, completed_date))| MaintenanceRecord {
                id: format!("m{}", i),
                equipment_id,
                title: format!("Service {}", i),
                description: None,
                status: if completed_date.is_some() {
                    MaintenanceStatus::Completed
                } else {
                    MaintenanceStatus::Upcoming
                },
                due_date,
                completed_date,
                cost,
                odometer_reading: None,
                service_provider: None,
                notes: None,
            })
            .collect()
    })
}

fn arb_repairs() -> impl Strategy<Value = Vec<Repair>> {
    proptest::collection::vec(
        (
            arb_equipment(),
            arb_amount(),
            proptest::option::of(arb_date()),
        ),
        0..10,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (equipment_id, cost, repair_date))| Repair {
                id: format!("r{}", i),
                equipment_id,
                title: format!("Repair {}", i),
                description: None,
                status: RepairStatus::Pending,
                repair_date,
                completed_date: None,
                cost,
                notes: None,
            })
            .collect()
    })
}

fn arb_upgrades() -> impl Strategy<Value = Vec<Upgrade>> {
    proptest::collection::vec(
        (
            arb_equipment(),
            arb_amount(),
            proptest::option::of(arb_date()),
        ),
        0..10,
    )
    .prop_map(|rows| {
        rows.into_iter()
            .enumerate()
            .map(|(i, (equipment_id, cost, install_date))| Upgrade {
                id: format!("u{}", i),
                equipment_id,
                name: format!("Upgrade {}", i),
                description: None,
                install_date,
                cost,
                installer: None,
                category: UpgradeCategory::Other,
                status: UpgradeStatus::Installed,
                notes: None,
            })
            .collect()
    })
}

type Sources = (Vec<Cost>, Vec<MaintenanceRecord>, Vec<Repair>, Vec<Upgrade>);

fn arb_sources() -> impl Strategy<Value = Sources> {
    (arb_costs(), arb_maintenance(), arb_repairs(), arb_upgrades())
}

fn ledger_of(sources: &Sources) -> Vec<LedgerEntry> {
    let (costs, maintenance, repairs, upgrades) = sources;
    aggregate(costs, maintenance, repairs, upgrades, today())
}

// =============================================================================
// Property Tests
// =============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Aggregating unchanged input twice yields identical output.
    #[test]
    fn prop_aggregation_is_idempotent(sources in arb_sources()) {
        prop_assert_eq!(ledger_of(&sources), ledger_of(&sources));
    }

    /// Every record appears exactly once, identified by source and id.
    #[test]
    fn prop_aggregation_is_complete(sources in arb_sources()) {
        let ledger = ledger_of(&sources);
        let (costs, maintenance, repairs, upgrades) = &sources;

        prop_assert_eq!(
            ledger.len(),
            costs.len() + maintenance.len() + repairs.len() + upgrades.len()
        );

        let keys: HashSet<_> = ledger.iter().map(|e| e.key()).collect();
        prop_assert_eq!(keys.len(), ledger.len());
    }

    /// The ledger is ordered by date, newest first; ascending sort reverses that.
    #[test]
    fn prop_ledger_is_sorted_by_date(sources in arb_sources()) {
        let ledger = ledger_of(&sources);
        for pair in ledger.windows(2) {
            prop_assert!(pair[0].date >= pair[1].date);
        }

        let ascending = sort(&ledger, SortDirection::Asc);
        prop_assert_eq!(ascending.len(), ledger.len());
        for pair in ascending.windows(2) {
            prop_assert!(pair[0].date <= pair[1].date);
        }
    }

    /// The total equals the sum of all amounts and the sum of all subtotals.
    #[test]
    fn prop_summary_adds_up(sources in arb_sources()) {
        let ledger = ledger_of(&sources);
        let summary = summarize(&ledger);

        let amounts: Decimal = ledger.iter().map(|e| e.amount).sum();
        prop_assert_eq!(summary.total, amounts);

        let subtotals: Decimal = summary.by_category.values().copied().sum();
        prop_assert_eq!(summary.total, subtotals);

        for (category, subtotal) in &summary.by_category {
            let expected: Decimal = ledger
                .iter()
                .filter(|e| e.category == *category)
                .map(|e| e.amount)
                .sum();
            prop_assert_eq!(*subtotal, expected);
        }
    }

    /// Filtering keeps exactly the matching entries, in ledger order.
    #[test]
    fn prop_filter_is_exact(
        sources in arb_sources(),
        category in arb_category(),
        equipment_id in arb_equipment(),
    ) {
        let ledger = ledger_of(&sources);

        let by_category = filter(&ledger, &LedgerFilter::new().with_category(category));
        prop_assert!(by_category.iter().all(|e| e.category == category));
        prop_assert_eq!(
            by_category.len(),
            ledger.iter().filter(|e| e.category == category).count()
        );

        let by_equipment = filter(&ledger, &LedgerFilter::new().with_equipment(equipment_id.clone()));
        prop_assert!(by_equipment.iter().all(|e| e.equipment_id == equipment_id));
        let expected: Vec<LedgerEntry> = ledger
            .iter()
            .filter(|e| e.equipment_id == equipment_id)
            .cloned()
            .collect();
        prop_assert_eq!(by_equipment, expected);
    }

    /// A rejected add leaves the record list exactly as it was.
    #[test]
    fn prop_rejected_add_restores_list(
        costs in arb_costs(),
        amount in arb_amount(),
        date in arb_date(),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let (before, after) = runtime.block_on(async {
            let remote = Arc::new(InMemoryRemoteStore::with_records(costs));
            let store = RecordStore::<Cost>::new(remote.clone());
            let before = store.list(None).await.unwrap();

            remote.fail_next_write(StoreError::Rejected("denied".to_string()));
            let result = store
                .add(NewCost {
                    equipment_id: "truck".to_string(),
                    category: Category::Fuel,
                    amount,
                    date,
                    description: "Fill-up".to_string(),
                    receipt_url: None,
                    notes: None,
                })
                .await;
            assert!(result.is_err());

            (before, store.list(None).await.unwrap())
        });

        prop_assert_eq!(before, after);
    }
}
