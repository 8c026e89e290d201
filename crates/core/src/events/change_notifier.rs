//! Listener registry for change signals.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use log::debug;

/// Callback invoked when the observed collection changes.
///
/// Callbacks run synchronously on the notifying task and must be fast and
/// non-blocking: typically they wake a task that performs the re-read.
pub type ChangeCallback = Arc<dyn Fn() + Send + Sync>;

type Listeners = BTreeMap<u64, ChangeCallback>;

#[derive(Default)]
struct NotifierInner {
    next_id: AtomicU64,
    listeners: Mutex<Listeners>,
}

impl NotifierInner {
    fn listeners(&self) -> MutexGuard<'_, Listeners> {
        self.listeners
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fan-out of payload-free change signals to registered callbacks.
///
/// Cloning yields another handle to the same registry.
#[derive(Clone, Default)]
pub struct ChangeNotifier {
    inner: Arc<NotifierInner>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `callback`; it stays registered until the returned guard is dropped.
    pub fn subscribe(&self, callback: ChangeCallback) -> Unsubscription {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners().insert(id, callback);
        debug!("Registered change listener #{}", id);
        Unsubscription {
            id,
            notifier: Arc::downgrade(&self.inner),
        }
    }

    /// Invokes every registered callback.
    pub fn notify(&self) {
        // Snapshot the listeners so callbacks may subscribe or unsubscribe freely.
        let callbacks: Vec<ChangeCallback> = self.inner.listeners().values().cloned().collect();
        for callback in callbacks {
            callback();
        }
    }

    /// Returns the number of registered callbacks.
    pub fn listener_count(&self) -> usize {
        self.inner.listeners().len()
    }
}

/// Guard returned by [`ChangeNotifier::subscribe`].
///
/// Dropping it removes the callback; no further signals reach it afterwards.
#[must_use = "dropping the guard unsubscribes immediately"]
pub struct Unsubscription {
    id: u64,
    notifier: Weak<NotifierInner>,
}

impl Unsubscription {
    /// Removes the callback now. Equivalent to dropping the guard.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl Drop for Unsubscription {
    fn drop(&mut self) {
        if let Some(inner) = self.notifier.upgrade() {
            inner.listeners().remove(&self.id);
            debug!("Removed change listener #{}", self.id);
        }
    }
}

impl std::fmt::Debug for Unsubscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Unsubscription").field("id", &self.id).finish()
    }
}

/// Callback that counts the signals it receives. Useful in tests and diagnostics.
#[derive(Clone, Default)]
pub struct ChangeCounter {
    count: Arc<AtomicU64>,
}

impl ChangeCounter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a callback that increments this counter.
    pub fn callback(&self) -> ChangeCallback {
        let count = self.count.clone();
        Arc::new(move || {
            count.fetch_add(1, Ordering::SeqCst);
        })
    }

    /// Returns the number of signals received so far.
    pub fn count(&self) -> u64 {
        self.count.load(Ordering::SeqCst)
    }
}
