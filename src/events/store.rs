//! Event Record Store - bounded ring buffer of captured events
//!
//! Keeps the most recent `capacity` records, overwriting the oldest when
//! full. One mutex guards the buffer, its cursors, the posted counter and the
//! version so that a snapshot always reflects a whole number of `add` calls.

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::{debug, warn};

use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::types::{EventAction, EventRecord};

#[derive(Debug)]
struct Ring {
    slots: Vec<Option<Arc<EventRecord>>>,
    /// Index of the oldest record (valid when `count > 0`)
    head: usize,
    /// Index the next `add` writes to
    tail: usize,
    count: usize,
    posted: usize,
    version: u64,
}

impl Ring {
    fn with_capacity(capacity: usize) -> Self {
        Self {
            slots: vec![None; capacity],
            head: 0,
            tail: 0,
            count: 0,
            posted: 0,
            version: 0,
        }
    }

    fn capacity(&self) -> usize {
        self.slots.len()
    }

    fn push(&mut self, record: Arc<EventRecord>) {
        let capacity = self.capacity();

        if self.count == capacity {
            // full: head == tail, the oldest record is the one being replaced
            if let Some(evicted) = self.slots[self.head].take() {
                if evicted.action == EventAction::Posted {
                    self.posted -= 1;
                }
            }
            self.head = (self.head + 1) % capacity;
        } else {
            self.count += 1;
        }

        if record.action == EventAction::Posted {
            self.posted += 1;
        }
        self.slots[self.tail] = Some(record);
        self.tail = (self.tail + 1) % capacity;
        self.version += 1;
    }

    fn clear(&mut self) {
        let capacity = self.capacity();
        for i in 0..self.count {
            self.slots[(self.head + i) % capacity] = None;
        }
        self.head = 0;
        self.tail = 0;
        self.count = 0;
        self.posted = 0;
        self.version = 0;
    }

    fn live(&self) -> impl Iterator<Item = &Arc<EventRecord>> + '_ {
        let capacity = self.capacity();
        (0..self.count).filter_map(move |i| self.slots[(self.head + i) % capacity].as_ref())
    }
}

/// Fixed-capacity, thread-safe store of the most recent event records
#[derive(Debug)]
pub struct EventRecordStore {
    ring: Mutex<Ring>,
    notifier: ChangeNotifier,
}

impl EventRecordStore {
    /// Create a store retaining at most `capacity` records.
    ///
    /// A zero capacity is accepted; such a store ignores every `add`.
    pub fn new(capacity: usize) -> Self {
        if capacity == 0 {
            warn!("event store created with zero capacity; all events will be dropped");
        }
        Self {
            ring: Mutex::new(Ring::with_capacity(capacity)),
            notifier: ChangeNotifier::new(),
        }
    }

    /// Append a record, evicting the oldest when full (O(1))
    pub fn add(&self, record: impl Into<Arc<EventRecord>>) {
        {
            let mut ring = self.ring.lock();
            if ring.capacity() == 0 {
                return;
            }
            ring.push(record.into());
        }
        self.notifier.notify();
    }

    /// Drop every record and reset the version to zero
    pub fn clear(&self) {
        let dropped = {
            let mut ring = self.ring.lock();
            let dropped = ring.count;
            ring.clear();
            dropped
        };
        debug!(dropped, "event store cleared");
        self.notifier.notify();
    }

    /// Copy the live records, oldest first, into `dst` (cleared first)
    pub fn snapshot(&self, dst: &mut Vec<Arc<EventRecord>>) {
        let ring = self.ring.lock();
        dst.clear();
        if ring.count == 0 {
            return;
        }
        dst.reserve(ring.count);
        dst.extend(ring.live().cloned());
    }

    /// Allocating convenience form of [`snapshot`](Self::snapshot)
    pub fn to_vec(&self) -> Vec<Arc<EventRecord>> {
        let mut records = Vec::new();
        self.snapshot(&mut records);
        records
    }

    /// Number of records currently retained
    pub fn len(&self) -> usize {
        self.ring.lock().count
    }

    /// True when no record is retained
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fixed maximum number of retained records
    pub fn capacity(&self) -> usize {
        self.ring.lock().capacity()
    }

    /// Bumped on every add, reset to 0 by [`clear`](Self::clear)
    pub fn version(&self) -> u64 {
        self.ring.lock().version
    }

    /// Count of change notifications sent so far. Unlike the version it is
    /// never reset, so a clear followed by new records is still visible.
    pub fn change_count(&self) -> u64 {
        self.notifier.notifications()
    }

    /// Number of posted (as opposed to received) records currently retained
    pub fn posted_count(&self) -> usize {
        self.ring.lock().posted
    }

    /// Call `handler` after every change. It runs on the mutating thread
    /// with no lock held, so it may read back.
    pub fn subscribe<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn() + Send + Sync + 'static,
    {
        self.notifier.subscribe(handler)
    }

    /// Remove a handler; false if it was already gone
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.notifier.unsubscribe(id)
    }

    /// Receiver woken after changes. Wakeups coalesce, so read a fresh
    /// snapshot on each one.
    pub fn watch(&self) -> watch::Receiver<()> {
        self.notifier.watch()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{CallSite, EventDirection};

    fn posted(name: &str) -> EventRecord {
        EventRecord::posted("t", name, EventDirection::ToModes, CallSite::new("T", "m"), "")
    }

    fn received(name: &str) -> EventRecord {
        EventRecord::received("t", name, CallSite::new("T", "m"))
    }

    fn names(store: &EventRecordStore) -> Vec<String> {
        store.to_vec().iter().map(|r| r.event_name.clone()).collect()
    }

    #[test]
    fn test_overwrites_oldest_when_full() {
        let store = EventRecordStore::new(3);
        for name in ["A", "B", "C", "D"] {
            store.add(posted(name));
        }
        assert_eq!(store.len(), 3);
        assert_eq!(names(&store), vec!["B", "C", "D"]);
    }

    #[test]
    fn test_wraps_many_times() {
        let store = EventRecordStore::new(4);
        for i in 0..103 {
            store.add(posted(&i.to_string()));
        }
        assert_eq!(names(&store), vec!["99", "100", "101", "102"]);
        assert_eq!(store.version(), 103);
    }

    #[test]
    fn test_posted_count_tracks_eviction() {
        let store = EventRecordStore::new(2);
        store.add(posted("A"));
        store.add(received("B"));
        assert_eq!(store.posted_count(), 1);

        // evicts posted A
        store.add(received("C"));
        assert_eq!(store.posted_count(), 0);

        // evicts received B
        store.add(posted("D"));
        assert_eq!(store.posted_count(), 1);
    }

    #[test]
    fn test_zero_capacity_ignores_adds() {
        let store = EventRecordStore::new(0);
        store.add(posted("A"));
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
        assert!(store.to_vec().is_empty());
    }

    #[test]
    fn test_clear_resets_everything() {
        let store = EventRecordStore::new(3);
        let shared = Arc::new(posted("A"));
        store.add(Arc::clone(&shared));
        for name in ["B", "C", "D"] {
            store.add(posted(name));
        }
        // "A" was evicted by the overwrite
        assert_eq!(Arc::strong_count(&shared), 1);

        let kept = Arc::new(posted("E"));
        store.add(Arc::clone(&kept));
        store.add(Arc::clone(&kept));
        assert_eq!(Arc::strong_count(&kept), 3);

        store.clear();
        assert_eq!(Arc::strong_count(&kept), 1);
        assert!(store.is_empty());
        assert_eq!(store.version(), 0);
        assert_eq!(store.posted_count(), 0);

        store.add(posted("F"));
        assert_eq!(names(&store), vec!["F"]);
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_snapshot_replaces_destination_contents() {
        let store = EventRecordStore::new(5);
        store.add(posted("A"));

        let mut dst = vec![Arc::new(posted("stale")), Arc::new(posted("stale"))];
        store.snapshot(&mut dst);
        assert_eq!(dst.len(), 1);
        assert_eq!(dst[0].event_name, "A");
    }

    #[test]
    fn test_snapshot_shares_records() {
        let store = EventRecordStore::new(2);
        let record = Arc::new(posted("A"));
        store.add(Arc::clone(&record));
        let snapshot = store.to_vec();
        assert!(Arc::ptr_eq(&snapshot[0], &record));
    }
}
