//! Pure ledger operations: merge, filter, sort and summation.
//!
//! None of these functions touch the record sources; they work on
//! snapshots handed in by the caller and always build fresh output.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use super::ledger_model::{
    Category, CostSummary, EquipmentCostSummary, LedgerEntry, LedgerFilter, SortDirection,
    SourceKind,
};
use crate::costs::Cost;
use crate::maintenance::MaintenanceRecord;
use crate::records::SourceRecord;
use crate::repairs::Repair;
use crate::upgrades::Upgrade;

fn entries_of<'a, R: SourceRecord>(
    records: &'a [R],
    today: NaiveDate,
) -> impl Iterator<Item = LedgerEntry> + 'a {
    records.iter().map(move |record| record.to_ledger_entry(today))
}

/// Merges the four source collections into one ledger sorted by date, newest first.
///
/// Entries are concatenated costs, maintenance, repairs, upgrades (each in
/// source order) and then stable-sorted, so entries sharing a date keep that
/// order and aggregating unchanged input twice yields identical output.
/// `today` is the date of records that carry neither a completion nor a
/// nominal date.
pub fn aggregate(
    costs: &[Cost],
    maintenance: &[MaintenanceRecord],
    repairs: &[Repair],
    upgrades: &[Upgrade],
    today: NaiveDate,
) -> Vec<LedgerEntry> {
    let mut ledger: Vec<LedgerEntry> =
        Vec::with_capacity(costs.len() + maintenance.len() + repairs.len() + upgrades.len());
    ledger.extend(entries_of(costs, today));
    ledger.extend(entries_of(maintenance, today));
    ledger.extend(entries_of(repairs, today));
    ledger.extend(entries_of(upgrades, today));
    sort_in_place(&mut ledger, SortDirection::Desc);
    ledger
}

/// Returns the entries matching every predicate of `filter`, order preserved.
pub fn filter(ledger: &[LedgerEntry], filter: &LedgerFilter) -> Vec<LedgerEntry> {
    ledger
        .iter()
        .filter(|entry| filter.matches(entry))
        .cloned()
        .collect()
}

/// Returns a copy of `ledger` ordered by date in `direction`.
pub fn sort(ledger: &[LedgerEntry], direction: SortDirection) -> Vec<LedgerEntry> {
    let mut sorted = ledger.to_vec();
    sort_in_place(&mut sorted, direction);
    sorted
}

fn sort_in_place(ledger: &mut [LedgerEntry], direction: SortDirection) {
    // `sort_by` is stable; ties keep their relative order.
    match direction {
        SortDirection::Asc => ledger.sort_by(|a, b| a.date.cmp(&b.date)),
        SortDirection::Desc => ledger.sort_by(|a, b| b.date.cmp(&a.date)),
    }
}

/// Total and per-category subtotals. Empty input yields zero and an empty map.
pub fn summarize(ledger: &[LedgerEntry]) -> CostSummary {
    let mut total = Decimal::ZERO;
    let mut by_category: BTreeMap<Category, Decimal> = BTreeMap::new();

    for entry in ledger {
        total += entry.amount;
        *by_category.entry(entry.category).or_insert(Decimal::ZERO) += entry.amount;
    }

    CostSummary { total, by_category }
}

/// Totals per equipment item, keyed by equipment id.
pub fn summarize_by_equipment(ledger: &[LedgerEntry]) -> BTreeMap<String, EquipmentCostSummary> {
    let mut by_equipment: BTreeMap<String, EquipmentCostSummary> = BTreeMap::new();

    for entry in ledger {
        let summary = by_equipment
            .entry(entry.equipment_id.clone())
            .or_insert_with(|| EquipmentCostSummary {
                equipment_id: entry.equipment_id.clone(),
                ..Default::default()
            });
        summary.total += entry.amount;
        summary.entry_count += 1;
        if entry.source == SourceKind::Maintenance {
            summary.maintenance_count += 1;
        }
    }

    by_equipment
}

/// The first `limit` entries of the ledger (the most recent ones in default order).
pub fn recent(ledger: &[LedgerEntry], limit: usize) -> Vec<LedgerEntry> {
    ledger.iter().take(limit).cloned().collect()
}
