//! Backing store that keeps rows in memory.
//!
//! Used by tests and by hosts running without a backend. Failures and slow
//! writes can be injected to exercise the optimistic write paths.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::Semaphore;
use uuid::Uuid;

use super::records_traits::{RemoteStore, SourceRecord};
use crate::errors::{StoreError, StoreResult};

#[derive(Default)]
struct Faults {
    next_read: Option<StoreError>,
    next_write: Option<StoreError>,
    offline: bool,
}

/// [`RemoteStore`] over a `Vec` of rows, newest first.
pub struct InMemoryRemoteStore<R: SourceRecord> {
    rows: Mutex<Vec<R>>,
    faults: Mutex<Faults>,
    write_gate: Mutex<Option<Arc<Semaphore>>>,
    reads: AtomicUsize,
}

impl<R: SourceRecord> Default for InMemoryRemoteStore<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: SourceRecord> InMemoryRemoteStore<R> {
    pub fn new() -> Self {
        Self::with_records(Vec::new())
    }

    pub fn with_records(rows: Vec<R>) -> Self {
        Self {
            rows: Mutex::new(rows),
            faults: Mutex::new(Faults::default()),
            write_gate: Mutex::new(None),
            reads: AtomicUsize::new(0),
        }
    }

    /// Current rows as the store sees them.
    pub fn records(&self) -> Vec<R> {
        self.rows().clone()
    }

    /// Replaces a row directly, as if another client had written it.
    pub fn put(&self, record: R) {
        let mut rows = self.rows();
        match rows.iter_mut().find(|r| r.id() == record.id()) {
            Some(slot) => *slot = record,
            None => rows.insert(0, record),
        }
    }

    /// Removes a row directly, as if another client had deleted it.
    pub fn remove(&self, id: &str) {
        self.rows().retain(|r| r.id() != id);
    }

    /// Number of `fetch_all` calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Makes the next `fetch_all` fail with `error`.
    pub fn fail_next_read(&self, error: StoreError) {
        self.faults().next_read = Some(error);
    }

    /// Makes the next insert, update or delete fail with `error`.
    pub fn fail_next_write(&self, error: StoreError) {
        self.faults().next_write = Some(error);
    }

    /// While offline every call fails with `ConnectionFailed`.
    pub fn set_offline(&self, offline: bool) {
        self.faults().offline = offline;
    }

    /// Holds every subsequent write until released.
    pub fn pause_writes(&self) {
        *self.gate() = Some(Arc::new(Semaphore::new(0)));
    }

    /// Lets `count` held writes proceed.
    pub fn release_writes(&self, count: usize) {
        if let Some(gate) = self.gate().as_ref() {
            gate.add_permits(count);
        }
    }

    /// Releases every held write and stops holding new ones.
    pub fn resume_writes(&self) {
        if let Some(gate) = self.gate().take() {
            gate.close();
        }
    }

    fn rows(&self) -> MutexGuard<'_, Vec<R>> {
        self.rows.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn faults(&self) -> MutexGuard<'_, Faults> {
        self.faults.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn gate(&self) -> MutexGuard<'_, Option<Arc<Semaphore>>> {
        self.write_gate.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn check_read(&self) -> StoreResult<()> {
        let mut faults = self.faults();
        if faults.offline {
            return Err(StoreError::ConnectionFailed("store is offline".to_string()));
        }
        match faults.next_read.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn check_write(&self) -> StoreResult<()> {
        let gate = self.gate().clone();
        if let Some(gate) = gate {
            // A closed gate means writes were resumed.
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        let mut faults = self.faults();
        if faults.offline {
            return Err(StoreError::ConnectionFailed("store is offline".to_string()));
        }
        match faults.next_write.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }
}

#[async_trait]
impl<R: SourceRecord> RemoteStore<R> for InMemoryRemoteStore<R> {
    async fn fetch_all(&self, equipment_id: Option<&str>) -> StoreResult<Vec<R>> {
        self.reads.fetch_add(1, Ordering::SeqCst);
        self.check_read()?;
        Ok(self
            .rows()
            .iter()
            .filter(|r| equipment_id.map_or(true, |id| r.equipment_id() == id))
            .cloned()
            .collect())
    }

    async fn insert(&self, new_record: R::New) -> StoreResult<R> {
        self.check_write().await?;
        let record = R::from_new(Uuid::new_v4().to_string(), &new_record);
        self.rows().insert(0, record.clone());
        Ok(record)
    }

    async fn update(&self, id: &str, patch: R::Patch) -> StoreResult<R> {
        self.check_write().await?;
        let mut rows = self.rows();
        let slot = rows
            .iter_mut()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
        *slot = slot.apply_patch(&patch);
        Ok(slot.clone())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.check_write().await?;
        let mut rows = self.rows();
        let before = rows.len();
        rows.retain(|r| r.id() != id);
        if rows.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        Ok(())
    }
}
