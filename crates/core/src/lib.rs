//! Gearlog Core - cost ledger for an equipment maintenance tracker.
//!
//! This crate merges the four record streams of the tracker (direct costs,
//! maintenance, repairs and upgrades) into a single sorted ledger and keeps
//! it current as any source changes. It is backend-agnostic and defines the
//! [`records::RemoteStore`] trait that backing-store adapters implement.

pub mod constants;
pub mod costs;
pub mod errors;
pub mod events;
pub mod ledger;
pub mod maintenance;
pub mod records;
pub mod repairs;
pub mod settings;
pub mod upgrades;
pub mod utils;

// Re-export the types most hosts need
pub use ledger::{
    Category, CostAggregator, CostSummary, LedgerEntry, LedgerFilter, SortDirection, SourceKind,
};
pub use records::{RecordMutator, RecordSource, RecordStore, RemoteStore};

// Re-export error types
pub use errors::Error;
pub use errors::Result;
