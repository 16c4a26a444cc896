//! Listener bookkeeping for the Store.
//!
//! The registry keeps listeners in subscription order. Notification rounds
//! iterate a snapshot taken when the round starts, so a listener that
//! subscribes or unsubscribes while being notified neither corrupts the list
//! nor changes who hears about the in-flight dispatch.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

/// A store listener. Called with no arguments after every dispatch.
pub type Listener = Arc<dyn Fn() + Send + Sync>;

/// Identifies one registration in a store's listener registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

impl ListenerId {
    /// Returns the raw registration number
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ListenerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "listener-{}", self.0)
    }
}

pub(crate) struct ListenerRegistry {
    store: &'static str,
    entries: Mutex<Vec<(ListenerId, Listener)>>,
    next_id: AtomicU64,
}

impl ListenerRegistry {
    pub(crate) fn with_capacity(store: &'static str, capacity: usize) -> Self {
        Self {
            store,
            entries: Mutex::new(Vec::with_capacity(capacity)),
            next_id: AtomicU64::new(0),
        }
    }

    fn insert(&self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        entries.push((id, listener));

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("store_subscriptions", "store" => self.store).set(entries.len() as f64);
        tracing::trace!(store = self.store, %id, "Listener subscribed");
        id
    }

    fn remove(&self, id: ListenerId) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = entries.iter().position(|(entry, _)| *entry == id) else {
            return false;
        };
        entries.remove(index);

        #[allow(clippy::cast_precision_loss)]
        metrics::gauge!("store_subscriptions", "store" => self.store).set(entries.len() as f64);
        tracing::trace!(store = self.store, %id, "Listener unsubscribed");
        true
    }

    /// Copy of the current listeners, in subscription order
    pub(crate) fn snapshot(&self) -> Vec<Listener> {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}

/// Guard for a registered listener
///
/// Returned by `Store::subscribe`. The listener stays registered until
/// [`Subscription::unsubscribe`] is called or the guard is dropped, whichever
/// comes first. Unsubscribing more than once is a no-op.
///
/// # Example
///
/// ```ignore
/// let subscription = store.subscribe(|| println!("dispatched"));
/// subscription.unsubscribe();
/// subscription.unsubscribe(); // safe
/// ```
#[must_use = "dropping the Subscription unsubscribes the listener immediately"]
pub struct Subscription {
    id: ListenerId,
    registry: Weak<ListenerRegistry>,
    active: AtomicBool,
    detached: bool,
}

impl Subscription {
    pub(crate) fn register(registry: &Arc<ListenerRegistry>, listener: Listener) -> Self {
        let id = registry.insert(listener);
        Self {
            id,
            registry: Arc::downgrade(registry),
            active: AtomicBool::new(true),
            detached: false,
        }
    }

    /// Remove exactly this listener from the store
    ///
    /// Idempotent. Does nothing if the store is already gone.
    pub fn unsubscribe(&self) {
        if !self.active.swap(false, Ordering::AcqRel) {
            return;
        }
        if let Some(registry) = self.registry.upgrade() {
            registry.remove(self.id);
        }
    }

    /// Returns true until this subscription has been unsubscribed
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// The registration this guard controls
    #[must_use]
    pub const fn id(&self) -> ListenerId {
        self.id
    }

    /// Keep the listener registered for the rest of the store's lifetime
    pub fn detach(mut self) {
        self.detached = true;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if !self.detached {
            self.unsubscribe();
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("active", &self.is_active())
            .finish_non_exhaustive()
    }
}
