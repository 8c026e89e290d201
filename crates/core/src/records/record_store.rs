//! In-memory record collection with optimistic writes.

use std::collections::BTreeMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use async_trait::async_trait;
use log::{debug, warn};

use super::records_traits::{RecordMutator, RecordSource, RemoteStore, SourceRecord};
use super::write_state::{PendingWrite, WriteOperation, WriteState};
use crate::constants::DEFAULT_TEMP_ID_PREFIX;
use crate::errors::{Error, Result, StoreResult};
use crate::events::{ChangeCallback, ChangeNotifier, Unsubscription};
use crate::settings::LedgerSettings;

/// A write that has not yet been folded into `confirmed`.
struct Overlay<R> {
    change: PendingWrite<R>,
    /// The store accepted the write; `change` now holds its answer.
    settled: bool,
}

fn apply_change<R: SourceRecord>(records: &mut Vec<R>, change: &PendingWrite<R>) {
    match change {
        PendingWrite::Insert(record) => {
            match records.iter_mut().find(|r| r.id() == record.id()) {
                Some(slot) => *slot = record.clone(),
                None => records.insert(0, record.clone()),
            }
        }
        PendingWrite::Update(record) => {
            if let Some(slot) = records.iter_mut().find(|r| r.id() == record.id()) {
                *slot = record.clone();
            }
        }
        PendingWrite::Delete(id) => records.retain(|r| r.id() != id),
    }
}

struct StoreState<R> {
    /// Records as last reported by the store, plus settled writes since.
    confirmed: Vec<R>,
    /// Writes keyed by write id, applied in issue order.
    pending: BTreeMap<u64, Overlay<R>>,
    /// `confirmed` with `pending` applied on top.
    snapshot: Arc<Vec<R>>,
    next_write_id: u64,
}

impl<R: SourceRecord> StoreState<R> {
    fn new() -> Self {
        Self {
            confirmed: Vec::new(),
            pending: BTreeMap::new(),
            snapshot: Arc::new(Vec::new()),
            next_write_id: 1,
        }
    }

    fn push_pending(&mut self, change: PendingWrite<R>) -> u64 {
        let write_id = self.next_write_id;
        self.next_write_id += 1;
        self.pending.insert(
            write_id,
            Overlay {
                change,
                settled: false,
            },
        );
        self.rebuild();
        write_id
    }

    /// Records the store's answer for `write_id`, or drops the write when
    /// the store rejected it.
    fn settle(&mut self, write_id: u64, answer: Option<PendingWrite<R>>) {
        match answer {
            Some(change) => {
                if let Some(overlay) = self.pending.get_mut(&write_id) {
                    overlay.change = change;
                    overlay.settled = true;
                }
            }
            None => {
                self.pending.remove(&write_id);
            }
        }
        self.fold_settled();
        self.rebuild();
    }

    /// Moves settled writes into `confirmed`, oldest first, stopping at the
    /// first write still waiting for the store. Leaves the snapshot unchanged.
    fn fold_settled(&mut self) {
        while let Some(entry) = self.pending.first_entry() {
            if !entry.get().settled {
                break;
            }
            let overlay = entry.remove();
            apply_change(&mut self.confirmed, &overlay.change);
        }
    }

    fn unsettled(&self) -> usize {
        self.pending.values().filter(|o| !o.settled).count()
    }

    /// Replaces the rows of one equipment item with `fetched`.
    ///
    /// Known ids keep their position; ids new to the cache go on top.
    fn merge_scope(&mut self, scope: &str, mut fetched: Vec<R>) {
        let mut merged = Vec::with_capacity(self.confirmed.len() + fetched.len());
        for record in std::mem::take(&mut self.confirmed) {
            match fetched.iter().position(|r| r.id() == record.id()) {
                Some(index) => merged.push(fetched.remove(index)),
                None if record.equipment_id() == scope => {}
                None => merged.push(record),
            }
        }
        merged.splice(0..0, fetched);
        self.confirmed = merged;
    }

    /// Recomputes the snapshot. Returns whether it changed.
    fn rebuild(&mut self) -> bool {
        let mut records = self.confirmed.clone();
        for overlay in self.pending.values() {
            apply_change(&mut records, &overlay.change);
        }
        let changed = *self.snapshot != records;
        self.snapshot = Arc::new(records);
        changed
    }
}

/// A record collection backed by a [`RemoteStore`].
///
/// Keeps the last confirmed state in memory, applies writes optimistically
/// and announces every change through [`RecordSource::on_change`].
pub struct RecordStore<R: SourceRecord> {
    remote: Arc<dyn RemoteStore<R>>,
    state: RwLock<StoreState<R>>,
    notifier: ChangeNotifier,
    temp_id_prefix: String,
    next_temp_id: AtomicU64,
}

impl<R: SourceRecord> RecordStore<R> {
    pub fn new(remote: Arc<dyn RemoteStore<R>>) -> Self {
        Self::with_temp_id_prefix(remote, DEFAULT_TEMP_ID_PREFIX)
    }

    pub fn with_settings(remote: Arc<dyn RemoteStore<R>>, settings: &LedgerSettings) -> Self {
        Self::with_temp_id_prefix(remote, &settings.temp_id_prefix)
    }

    fn with_temp_id_prefix(remote: Arc<dyn RemoteStore<R>>, prefix: &str) -> Self {
        Self {
            remote,
            state: RwLock::new(StoreState::new()),
            notifier: ChangeNotifier::new(),
            temp_id_prefix: prefix.to_string(),
            next_temp_id: AtomicU64::new(1),
        }
    }

    /// Forwards a push notification from the backend (row inserted, updated
    /// or deleted elsewhere) to subscribers, who re-read via `list`.
    pub fn notify_remote_change(&self) {
        debug!("Remote change reported for {} records", R::KIND);
        self.notifier.notify();
    }

    /// Number of writes still waiting for the store.
    pub fn pending_writes(&self) -> usize {
        self.read_state().unsettled()
    }

    fn read_state(&self) -> RwLockReadGuard<'_, StoreState<R>> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, StoreState<R>> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn find(&self, id: &str) -> Option<R> {
        self.read_state()
            .snapshot
            .iter()
            .find(|r| r.id() == id)
            .cloned()
    }

    fn next_temp_id(&self) -> String {
        let n = self.next_temp_id.fetch_add(1, Ordering::Relaxed);
        format!("{}{}", self.temp_id_prefix, n)
    }

    /// Runs one write through `Idle -> Pending -> Committed | RolledBack`.
    ///
    /// `request` is not polled until the optimistic change is visible.
    async fn execute<T, F, C>(
        &self,
        operation: WriteOperation,
        change: PendingWrite<R>,
        request: F,
        confirm: C,
    ) -> Result<T>
    where
        T: Send,
        F: Future<Output = StoreResult<T>> + Send,
        C: FnOnce(&T) -> PendingWrite<R> + Send,
    {
        let write_id = self.write_state().push_pending(change);
        let state = WriteState::Idle.begin()?;
        debug!("{} {} #{} is {:?}", R::KIND, operation, write_id, state);
        self.notifier.notify();

        match request.await {
            Ok(value) => {
                self.write_state().settle(write_id, Some(confirm(&value)));
                let state = state.commit()?;
                debug!("{} {} #{} is {:?}", R::KIND, operation, write_id, state);
                self.notifier.notify();
                Ok(value)
            }
            Err(error) => {
                self.write_state().settle(write_id, None);
                let state = state.roll_back()?;
                warn!(
                    "{} {} #{} is {:?}: {}",
                    R::KIND,
                    operation,
                    write_id,
                    state,
                    error
                );
                self.notifier.notify();
                Err(Error::source_write(R::KIND, operation, error))
            }
        }
    }
}

#[async_trait]
impl<R: SourceRecord> RecordSource<R> for RecordStore<R> {
    async fn list(&self, equipment_id: Option<&str>) -> Result<Vec<R>> {
        let fetched = self.remote.fetch_all(equipment_id).await.map_err(|error| {
            warn!("Failed to load {} records: {}", R::KIND, error);
            Error::source_read(R::KIND, error)
        })?;

        let (snapshot, changed) = {
            let mut state = self.write_state();
            match equipment_id {
                None => state.confirmed = fetched,
                Some(scope) => state.merge_scope(scope, fetched),
            }
            let changed = state.rebuild();
            (state.snapshot.clone(), changed)
        };

        if changed {
            debug!("{} records changed after reload", R::KIND);
            self.notifier.notify();
        }

        Ok(snapshot
            .iter()
            .filter(|r| equipment_id.map_or(true, |scope| r.equipment_id() == scope))
            .cloned()
            .collect())
    }

    fn snapshot(&self) -> Arc<Vec<R>> {
        self.read_state().snapshot.clone()
    }

    fn on_change(&self, callback: ChangeCallback) -> Unsubscription {
        self.notifier.subscribe(callback)
    }
}

#[async_trait]
impl<R: SourceRecord> RecordMutator<R> for RecordStore<R> {
    async fn add(&self, new_record: R::New) -> Result<R> {
        R::validate_new(&new_record)?;
        let placeholder = R::from_new(self.next_temp_id(), &new_record);
        let request = self.remote.insert(new_record);
        self.execute(
            WriteOperation::Add,
            PendingWrite::Insert(placeholder),
            request,
            |stored: &R| PendingWrite::Insert(stored.clone()),
        )
        .await
    }

    async fn update(&self, id: &str, patch: R::Patch) -> Result<R> {
        R::validate_patch(&patch)?;
        let current = self.find(id).ok_or_else(|| Error::NotFound {
            kind: R::KIND,
            id: id.to_string(),
        })?;
        let optimistic = current.apply_patch(&patch);
        let request = self.remote.update(id, patch);
        self.execute(
            WriteOperation::Update,
            PendingWrite::Update(optimistic),
            request,
            |stored: &R| PendingWrite::Update(stored.clone()),
        )
        .await
    }

    async fn delete(&self, id: &str) -> Result<()> {
        if self.find(id).is_none() {
            return Err(Error::NotFound {
                kind: R::KIND,
                id: id.to_string(),
            });
        }
        let deleted_id = id.to_string();
        let request = self.remote.delete(id);
        self.execute(
            WriteOperation::Delete,
            PendingWrite::Delete(id.to_string()),
            request,
            move |_: &()| PendingWrite::Delete(deleted_id),
        )
        .await
    }
}
