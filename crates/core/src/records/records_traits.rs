//! Record source traits.
//!
//! These traits define the contract between the ledger and the four record
//! collections without any backend-specific types.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::errors::{Result, StoreResult};
use crate::events::{ChangeCallback, Unsubscription};
use crate::ledger::{LedgerEntry, SourceKind};

/// A row owned by one of the record sources.
pub trait SourceRecord: Clone + PartialEq + Send + Sync + 'static {
    /// Insert shape accepted by the store.
    type New: Clone + Send + Sync + 'static;
    /// Partial update; unset fields are left untouched.
    type Patch: Clone + Send + Sync + 'static;

    const KIND: SourceKind;

    fn id(&self) -> &str;

    fn equipment_id(&self) -> &str;

    /// Builds the placeholder shown while an insert awaits confirmation.
    fn from_new(id: String, new: &Self::New) -> Self;

    /// Returns a copy of `self` with `patch` merged in.
    fn apply_patch(&self, patch: &Self::Patch) -> Self;

    fn validate_new(new: &Self::New) -> Result<()>;

    fn validate_patch(patch: &Self::Patch) -> Result<()>;

    /// Normalizes the record into a ledger row; `today` backs the date fallback.
    fn to_ledger_entry(&self, today: NaiveDate) -> LedgerEntry;
}

/// The backing store of one record collection (query + mutation).
///
/// Implementations translate these calls into whatever the backend speaks
/// (REST, realtime channel, SQL) and map failures to [`crate::errors::StoreError`].
#[async_trait]
pub trait RemoteStore<R: SourceRecord>: Send + Sync {
    /// Fetches every confirmed record, optionally scoped to one equipment item.
    async fn fetch_all(&self, equipment_id: Option<&str>) -> StoreResult<Vec<R>>;

    /// Inserts a record and returns it as stored (with its store-assigned id).
    async fn insert(&self, new_record: R::New) -> StoreResult<R>;

    /// Applies `patch` to record `id` and returns the stored result.
    async fn update(&self, id: &str, patch: R::Patch) -> StoreResult<R>;

    async fn delete(&self, id: &str) -> StoreResult<()>;
}

/// Read side of a record collection, as consumed by the aggregator.
#[async_trait]
pub trait RecordSource<R: SourceRecord>: Send + Sync {
    /// Returns confirmed records plus locally pending optimistic writes,
    /// optionally scoped to one equipment item.
    async fn list(&self, equipment_id: Option<&str>) -> Result<Vec<R>>;

    /// Current in-memory records, without contacting the store.
    fn snapshot(&self) -> Arc<Vec<R>>;

    /// Registers `callback` to fire whenever the collection changes.
    ///
    /// Delivery is at least once and carries no payload; re-read with
    /// [`RecordSource::list`].
    fn on_change(&self, callback: ChangeCallback) -> Unsubscription;
}

/// Write side of a record collection.
///
/// Writes are applied locally before the store confirms them and reverted
/// if the store rejects them.
#[async_trait]
pub trait RecordMutator<R: SourceRecord>: Send + Sync {
    async fn add(&self, new_record: R::New) -> Result<R>;

    async fn update(&self, id: &str, patch: R::Patch) -> Result<R>;

    async fn delete(&self, id: &str) -> Result<()>;
}
