//! Cost aggregator service.
//!
//! Owns the merged ledger for one scope (all equipment or a single item),
//! re-reads the four record sources whenever one of them changes and serves
//! derived views of the last good ledger.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard, Weak};

use log::{debug, info, warn};
use tokio::sync::Notify;
use tokio::task::JoinHandle;

use super::aggregation::{aggregate, filter, recent, sort, summarize, summarize_by_equipment};
use super::ledger_model::{
    CostSummary, EquipmentCostSummary, LedgerEntry, LedgerFilter, LedgerState, Period,
    SortDirection,
};
use crate::costs::Cost;
use crate::errors::Result;
use crate::events::{ChangeCallback, ChangeNotifier, Unsubscription};
use crate::maintenance::MaintenanceRecord;
use crate::records::RecordSource;
use crate::repairs::Repair;
use crate::settings::LedgerSettings;
use crate::upgrades::Upgrade;
use crate::utils::time_utils::{Clock, SystemClock};

struct AggregatorState {
    ledger: LedgerState,
    /// Sequence number of the refresh whose outcome `ledger` reflects.
    applied_attempt: u64,
}

/// Keeps a merged, date-sorted cost ledger in sync with the record sources.
///
/// Several aggregators (for example a global one and one per equipment
/// item) may share the same sources.
pub struct CostAggregator {
    costs: Arc<dyn RecordSource<Cost>>,
    maintenance: Arc<dyn RecordSource<MaintenanceRecord>>,
    repairs: Arc<dyn RecordSource<Repair>>,
    upgrades: Arc<dyn RecordSource<Upgrade>>,
    equipment_id: Option<String>,
    clock: Arc<dyn Clock>,
    settings: LedgerSettings,
    state: RwLock<AggregatorState>,
    attempts: AtomicU64,
    notifier: ChangeNotifier,
}

impl CostAggregator {
    /// Creates an aggregator over every equipment item, using the system
    /// clock and default settings. The ledger is empty until the first refresh.
    pub fn new(
        costs: Arc<dyn RecordSource<Cost>>,
        maintenance: Arc<dyn RecordSource<MaintenanceRecord>>,
        repairs: Arc<dyn RecordSource<Repair>>,
        upgrades: Arc<dyn RecordSource<Upgrade>>,
    ) -> Self {
        Self {
            costs,
            maintenance,
            repairs,
            upgrades,
            equipment_id: None,
            clock: Arc::new(SystemClock),
            settings: LedgerSettings::default(),
            state: RwLock::new(AggregatorState {
                ledger: LedgerState::default(),
                applied_attempt: 0,
            }),
            attempts: AtomicU64::new(0),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Restricts the ledger to a single equipment item.
    pub fn with_equipment(mut self, equipment_id: impl Into<String>) -> Self {
        self.equipment_id = Some(equipment_id.into());
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_settings(mut self, settings: LedgerSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn equipment_id(&self) -> Option<&str> {
        self.equipment_id.as_deref()
    }

    pub fn settings(&self) -> &LedgerSettings {
        &self.settings
    }

    fn read_state(&self) -> RwLockReadGuard<'_, AggregatorState> {
        self.state
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, AggregatorState> {
        self.state
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Re-reads all four sources and rebuilds the ledger.
    ///
    /// On success the ledger is replaced and any previous error is cleared.
    /// If any source fails, the last good ledger stays in place, the error
    /// is recorded in [`LedgerState::last_error`] and returned. Subscribers
    /// of [`CostAggregator::on_change`] are notified either way.
    pub async fn refresh(&self) -> Result<Arc<Vec<LedgerEntry>>> {
        let attempt = self.attempts.fetch_add(1, Ordering::SeqCst) + 1;
        let scope = self.equipment_id.as_deref();
        debug!("Refreshing ledger (attempt #{})", attempt);

        let (costs, maintenance, repairs, upgrades) = futures::join!(
            self.costs.list(scope),
            self.maintenance.list(scope),
            self.repairs.list(scope),
            self.upgrades.list(scope),
        );

        let today = self.clock.today();
        let outcome = costs.and_then(|costs| {
            let maintenance = maintenance?;
            let repairs = repairs?;
            let upgrades = upgrades?;
            Ok(Arc::new(aggregate(
                &costs,
                &maintenance,
                &repairs,
                &upgrades,
                today,
            )))
        });

        self.apply(attempt, &outcome);
        self.notifier.notify();
        outcome
    }

    fn apply(&self, attempt: u64, outcome: &Result<Arc<Vec<LedgerEntry>>>) {
        let mut state = self.write_state();
        if attempt < state.applied_attempt {
            debug!(
                "Discarding ledger refresh #{} superseded by #{}",
                attempt, state.applied_attempt
            );
            return;
        }
        state.applied_attempt = attempt;

        match outcome {
            Ok(entries) => {
                state.ledger.entries = entries.clone();
                state.ledger.last_error = None;
                state.ledger.refreshed_at = Some(self.clock.now());
                state.ledger.revision += 1;
                debug!(
                    "Ledger refreshed with {} entries (revision {})",
                    entries.len(),
                    state.ledger.revision
                );
            }
            Err(error) => {
                warn!(
                    "Ledger refresh failed, keeping {} entries from revision {}: {}",
                    state.ledger.entries.len(),
                    state.ledger.revision,
                    error
                );
                state.ledger.last_error = Some(error.clone());
            }
        }
    }

    /// Subscribes to all four sources and keeps the ledger current.
    ///
    /// An initial refresh is scheduled right away; after that any source
    /// change triggers a full refresh on a background task. Signals that
    /// arrive while a refresh runs are coalesced into one follow-up refresh.
    /// Must be called from within a Tokio runtime.
    pub fn start(self: &Arc<Self>) -> AggregatorHandle {
        let wake = Arc::new(Notify::new());

        let subscriptions = vec![
            self.costs.on_change(wake_callback(&wake)),
            self.maintenance.on_change(wake_callback(&wake)),
            self.repairs.on_change(wake_callback(&wake)),
            self.upgrades.on_change(wake_callback(&wake)),
        ];

        wake.notify_one();
        let task = tokio::spawn(run_refresh_loop(Arc::downgrade(self), wake));

        info!(
            "Cost aggregator started for {}",
            self.equipment_id.as_deref().unwrap_or("all equipment")
        );

        AggregatorHandle {
            subscriptions,
            task: Some(task),
        }
    }

    /// Current ledger, its freshness and the last refresh error.
    pub fn state(&self) -> LedgerState {
        self.read_state().ledger.clone()
    }

    /// The ledger as stored, date descending.
    pub fn ledger(&self) -> Arc<Vec<LedgerEntry>> {
        self.read_state().ledger.entries.clone()
    }

    /// The ledger ordered by date in `direction`.
    pub fn entries(&self, direction: SortDirection) -> Vec<LedgerEntry> {
        let ledger = self.ledger();
        match direction {
            SortDirection::Desc => ledger.to_vec(),
            SortDirection::Asc => sort(&ledger, direction),
        }
    }

    /// Entries matching `ledger_filter`, in the configured default order.
    pub fn filtered(&self, ledger_filter: &LedgerFilter) -> Vec<LedgerEntry> {
        let matching = filter(&self.ledger(), ledger_filter);
        match self.settings.default_sort {
            SortDirection::Desc => matching,
            SortDirection::Asc => sort(&matching, SortDirection::Asc),
        }
    }

    pub fn summary(&self) -> CostSummary {
        summarize(&self.ledger())
    }

    pub fn summary_for(&self, ledger_filter: &LedgerFilter) -> CostSummary {
        summarize(&filter(&self.ledger(), ledger_filter))
    }

    /// Summary of the current month, year or all time, as of the clock's today.
    pub fn summary_for_period(&self, period: Period) -> CostSummary {
        let ledger_filter = LedgerFilter::new().with_period(period, self.clock.today());
        self.summary_for(&ledger_filter)
    }

    pub fn equipment_totals(&self) -> BTreeMap<String, EquipmentCostSummary> {
        summarize_by_equipment(&self.ledger())
    }

    /// The most recent entries, up to the configured limit.
    pub fn recent(&self) -> Vec<LedgerEntry> {
        recent(&self.ledger(), self.settings.recent_limit)
    }

    /// Registers `callback` to fire after every refresh attempt.
    pub fn on_change(&self, callback: ChangeCallback) -> Unsubscription {
        self.notifier.subscribe(callback)
    }
}

fn wake_callback(wake: &Arc<Notify>) -> ChangeCallback {
    let wake = Arc::clone(wake);
    Arc::new(move || wake.notify_one())
}

async fn run_refresh_loop(weak: Weak<CostAggregator>, wake: Arc<Notify>) {
    loop {
        wake.notified().await;
        let Some(aggregator) = weak.upgrade() else {
            debug!("Cost aggregator dropped, stopping refresh loop");
            break;
        };
        if let Err(error) = aggregator.refresh().await {
            debug!("Background ledger refresh failed: {}", error);
        }
    }
}

/// Keeps an aggregator subscribed to its sources.
///
/// Dropping the handle (or calling [`AggregatorHandle::dispose`]) removes the
/// subscriptions and stops the background refresh task. Source writes that
/// are already in flight are not affected.
#[must_use = "dropping the handle stops the aggregator"]
pub struct AggregatorHandle {
    subscriptions: Vec<Unsubscription>,
    task: Option<JoinHandle<()>>,
}

impl AggregatorHandle {
    pub fn dispose(self) {
        drop(self);
    }

    /// Returns `true` while the background task is alive.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl Drop for AggregatorHandle {
    fn drop(&mut self) {
        self.subscriptions.clear();
        if let Some(task) = self.task.take() {
            task.abort();
            debug!("Cost aggregator stopped");
        }
    }
}
