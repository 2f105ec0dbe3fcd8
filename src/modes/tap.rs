//! Producer-side entry point for mode lifecycle changes

use std::sync::Arc;

use super::registry::ModeRegistry;
use crate::types::{EntityId, ModeMetadata};

/// Forwards mode added/removed notifications to a [`ModeRegistry`]
#[derive(Debug, Clone)]
pub struct ModeTap {
    registry: Arc<ModeRegistry>,
}

impl ModeTap {
    pub fn new(registry: Arc<ModeRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ModeRegistry> {
        &self.registry
    }

    /// A mode was added to the running set
    pub fn added(&self, id: EntityId, metadata: &ModeMetadata) -> bool {
        self.registry.set_enabled(id, true, metadata)
    }

    /// A mode was removed from the running set. It stays listed, turned off.
    pub fn removed(&self, id: EntityId, metadata: &ModeMetadata) -> bool {
        self.registry.set_enabled(id, false, metadata)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::EntityIdAllocator;

    #[test]
    fn test_added_then_removed() {
        let ids = EntityIdAllocator::new();
        let tap = ModeTap::new(Arc::new(ModeRegistry::new()));
        let id = ids.allocate();
        let meta = ModeMetadata::from_description("AttractMode  pri=20", "Game.AttractMode", 20);

        assert!(tap.added(id, &meta));
        assert!(!tap.added(id, &meta));
        assert!(tap.registry().get(id).is_some_and(|r| r.is_on));

        assert!(tap.removed(id, &meta));
        let record = tap.registry().get(id).unwrap();
        assert!(!record.is_on);
        assert_eq!(record.class_name, "AttractMode");
    }

    #[test]
    fn test_removed_before_added_registers_off() {
        let ids = EntityIdAllocator::new();
        let tap = ModeTap::new(Arc::new(ModeRegistry::new()));
        let id = ids.allocate();

        assert!(tap.removed(id, &ModeMetadata::new("Ghost", "Game.Ghost", 1)));
        assert_eq!(tap.registry().len(), 1);
        assert!(!tap.registry().get(id).unwrap().is_on);
    }
}
