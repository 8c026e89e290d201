//! Ledger module - the merged, read-only cost view over all record sources.

mod aggregation;
mod ledger_model;
mod ledger_service;


pub use aggregation::{aggregate, filter, recent, sort, summarize, summarize_by_equipment};
pub use ledger_model::{
    Category, CostSummary, DateRange, EquipmentCostSummary, LedgerEntry, LedgerFilter,
    LedgerState, Period, SortDirection, SourceKind,
};
pub use ledger_service::{AggregatorHandle, CostAggregator};
