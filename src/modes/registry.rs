//! Mode Registry - sorted, thread-safe store of mode state
//!
//! Records live in an insertion-ordered arena; a separate index vector keeps
//! them sorted by priority (descending) then class name (ascending, byte
//! order). The sort keys never change after insertion, so toggling a mode
//! never moves it and the order is maintained incrementally by binary-search
//! insertion.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tokio::sync::watch;
use tracing::debug;

use super::aging::{AgingClock, DEFAULT_AGING_WINDOW};
use crate::notify::{ChangeNotifier, SubscriptionId};
use crate::types::{EntityId, ModeMetadata, ModeRecord};

/// Priority descending, then class name ascending
pub fn compare_modes(a: &ModeRecord, b: &ModeRecord) -> Ordering {
    b.priority
        .cmp(&a.priority)
        .then_with(|| a.class_name.as_bytes().cmp(b.class_name.as_bytes()))
}

#[derive(Debug, Default)]
struct Modes {
    records: Vec<ModeRecord>,
    /// Arena indices in display order
    sorted: Vec<usize>,
    index: HashMap<EntityId, usize>,
    version: u64,
}

impl Modes {
    /// Insert `id` if unseen; returns its arena index and whether it was inserted
    fn ensure(&mut self, id: EntityId, metadata: &ModeMetadata, window: Duration) -> (usize, bool) {
        if let Some(&idx) = self.index.get(&id) {
            return (idx, false);
        }

        let record = ModeRecord::new(id, metadata, AgingClock::new(window));
        // upper bound: equal keys go after existing ones
        let records = &self.records;
        let position = self
            .sorted
            .partition_point(|&i| compare_modes(&records[i], &record) != Ordering::Greater);

        let idx = self.records.len();
        self.records.push(record);
        self.sorted.insert(position, idx);
        self.index.insert(id, idx);
        self.version += 1;
        (idx, true)
    }
}

/// Sorted, thread-safe mapping from entity identity to mode state
#[derive(Debug)]
pub struct ModeRegistry {
    modes: Mutex<Modes>,
    aging_window: Duration,
    notifier: ChangeNotifier,
}

impl ModeRegistry {
    pub fn new() -> Self {
        Self::with_aging_window(DEFAULT_AGING_WINDOW)
    }

    /// Registry whose modes settle `aging_window` after turning on
    pub fn with_aging_window(aging_window: Duration) -> Self {
        Self {
            modes: Mutex::new(Modes::default()),
            aging_window,
            notifier: ChangeNotifier::new(),
        }
    }

    pub fn aging_window(&self) -> Duration {
        self.aging_window
    }

    /// Register a mode if it is unseen. Returns true when it was inserted.
    pub fn upsert(&self, id: EntityId, metadata: &ModeMetadata) -> bool {
        let inserted = {
            let mut modes = self.modes.lock();
            modes.ensure(id, metadata, self.aging_window).1
        };
        if inserted {
            self.notifier.notify();
        }
        inserted
    }

    /// Turn a mode on or off, registering it first if unseen.
    ///
    /// Returns true when anything observable changed.
    pub fn set_enabled(&self, id: EntityId, flag: bool, metadata: &ModeMetadata) -> bool {
        self.set_enabled_at(id, flag, metadata, Instant::now())
    }

    /// [`set_enabled`](Self::set_enabled) with an explicit transition instant
    pub fn set_enabled_at(
        &self,
        id: EntityId,
        flag: bool,
        metadata: &ModeMetadata,
        now: Instant,
    ) -> bool {
        let changed = {
            let mut modes = self.modes.lock();
            let (idx, inserted) = modes.ensure(id, metadata, self.aging_window);

            let record = &mut modes.records[idx];
            if record.is_on == flag {
                inserted
            } else {
                record.is_on = flag;
                if flag {
                    record.aging.turn_on(now);
                } else {
                    record.aging.turn_off();
                }
                modes.version += 1;
                true
            }
        };
        if changed {
            self.notifier.notify();
        }
        changed
    }

    /// Copy every record in display order into `dst` (cleared first).
    ///
    /// Records whose aging window has elapsed are settled in place.
    pub fn snapshot(&self, dst: &mut Vec<ModeRecord>) {
        let now = Instant::now();
        let mut modes = self.modes.lock();
        dst.clear();
        if modes.sorted.is_empty() {
            return;
        }

        for record in modes.records.iter_mut() {
            record.aging.settle(now);
        }
        dst.reserve(modes.sorted.len());
        let Modes { records, sorted, .. } = &*modes;
        dst.extend(sorted.iter().map(|&i| records[i].clone()));
    }

    /// Allocating convenience form of [`snapshot`](Self::snapshot)
    pub fn to_vec(&self) -> Vec<ModeRecord> {
        let mut records = Vec::new();
        self.snapshot(&mut records);
        records
    }

    /// Copy of the record for `id`, unless it was never seen
    pub fn get(&self, id: EntityId) -> Option<ModeRecord> {
        let modes = self.modes.lock();
        modes.index.get(&id).map(|&idx| modes.records[idx].clone())
    }

    /// Remove every mode and reset the version to zero
    pub fn clear(&self) {
        let dropped = {
            let mut modes = self.modes.lock();
            if modes.records.is_empty() {
                return;
            }
            let dropped = modes.records.len();
            *modes = Modes::default();
            dropped
        };
        debug!(dropped, "mode registry cleared");
        self.notifier.notify();
    }

    /// Number of modes seen since the last clear
    pub fn len(&self) -> usize {
        self.modes.lock().sorted.len()
    }

    /// True when no mode has been seen since the last clear
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped on every insert or toggle, reset to 0 by [`clear`](Self::clear)
    pub fn version(&self) -> u64 {
        self.modes.lock().version
    }

    /// Count of change notifications sent so far. Unlike the version it is
    /// never reset, so a clear followed by new records is still visible.
    pub fn change_count(&self) -> u64 {
        self.notifier.notifications()
    }

    /// Every full name ever registered, sorted, one per line
    pub fn modes_used_report(&self) -> String {
        let mut names: Vec<String> = {
            let modes = self.modes.lock();
            modes.records.iter().map(|r| r.full_name.clone()).collect()
        };
        names.sort();

        let mut report = String::new();
        for name in names {
            report.push_str(&name);
            report.push('\n');
        }
        report
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

impl Default for ModeRegistry {
    fn default() -> Self {
        Self::new()
    }
}
