//! Change notification for the repositories
//!
//! Notifications are level-triggered: a signal carries no payload, it only
//! says "something changed". Subscribers re-read the repository version or
//! take a fresh snapshot. Several mutations may collapse into one observed
//! change.
//!
//! # Delivery
//!
//! Repositories call [`ChangeNotifier::notify`] only after releasing their own
//! lock. Handlers run outside the notifier's lock as well, so a handler may
//! subscribe, unsubscribe, or call straight back into the repository.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;

type Handler = Arc<dyn Fn() + Send + Sync>;

/// Handle returned by [`ChangeNotifier::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Observer list plus a watch channel for async consumers
pub struct ChangeNotifier {
    handlers: Mutex<Vec<(SubscriptionId, Handler)>>,
    next_id: AtomicU64,
    notifications: AtomicU64,
    watch_tx: watch::Sender<()>,
}

impl ChangeNotifier {
    pub fn new() -> Self {
        let (watch_tx, _) = watch::channel(());
        Self {
            handlers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            watch_tx,
        }
    }

    /// Register a zero-argument change handler
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed));
        self.handlers.lock().push((id, Arc::new(handler)));
        id
    }

    /// Remove a handler; returns false if it was not registered
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut handlers = self.handlers.lock();
        let before = handlers.len();
        handlers.retain(|(existing, _)| *existing != id);
        handlers.len() != before
    }

    /// Receiver that wakes on the next change; pending changes coalesce
    pub fn watch(&self) -> watch::Receiver<()> {
        self.watch_tx.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.handlers.lock().len()
    }

    /// Number of notifications dispatched so far
    pub fn notifications(&self) -> u64 {
        self.notifications.load(Ordering::Relaxed)
    }

    /// Signal every subscriber. Must not be called while holding a repository lock.
    pub fn notify(&self) {
        self.notifications.fetch_add(1, Ordering::Relaxed);
        self.watch_tx.send_replace(());

        let handlers: Vec<Handler> = self
            .handlers
            .lock()
            .iter()
            .map(|(_, handler)| Arc::clone(handler))
            .collect();
        for handler in handlers {
            handler();
        }
    }
}

impl Default for ChangeNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeNotifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChangeNotifier")
            .field("subscribers", &self.subscriber_count())
            .field("notifications", &self.notifications())
            .finish()
    }
}
