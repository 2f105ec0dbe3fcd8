//! Stable entity identities
//!
//! Entities are keyed by an explicit slot index plus a generation counter
//! instead of by object address. Records live until the whole registry is
//! cleared, so slots are never reused and every id is handed out at
//! generation 0.

use std::sync::atomic::{AtomicU32, Ordering};

use serde::{Deserialize, Serialize};

/// Identity of a tracked entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EntityId {
    slot: u32,
    generation: u32,
}

impl EntityId {
    pub const fn new(slot: u32, generation: u32) -> Self {
        Self { slot, generation }
    }

    pub fn slot(&self) -> u32 {
        self.slot
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}v{}", self.slot, self.generation)
    }
}

/// Hands out distinct [`EntityId`]s, one fresh slot per call
#[derive(Debug, Default)]
pub struct EntityIdAllocator {
    next_slot: AtomicU32,
}

impl EntityIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate a fresh identity
    pub fn allocate(&self) -> EntityId {
        EntityId::new(self.next_slot.fetch_add(1, Ordering::Relaxed), 0)
    }

    /// Number of identities handed out so far
    pub fn allocated(&self) -> u32 {
        self.next_slot.load(Ordering::Relaxed)
    }
}
