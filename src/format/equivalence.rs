//! Equality policies used to detect consecutive duplicate records

use serde::{Deserialize, Serialize};

use crate::types::{EventAction, EventRecord};

/// Decides whether two records collapse into one consolidated line
pub trait RecordEquivalence {
    fn equivalent(&self, a: &EventRecord, b: &EventRecord) -> bool;
}

/// Built-in policies, selectable from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EquivalencePolicy {
    /// Same action, direction (for posts), event name, payload and call site
    #[default]
    Strict,
    /// Same action, direction (for posts) and event name
    NameOnly,
}

impl RecordEquivalence for EquivalencePolicy {
    fn equivalent(&self, a: &EventRecord, b: &EventRecord) -> bool {
        if a.action != b.action {
            return false;
        }
        if a.action == EventAction::Posted && a.direction != b.direction {
            return false;
        }
        if a.event_name != b.event_name {
            return false;
        }

        match self {
            EquivalencePolicy::NameOnly => true,
            EquivalencePolicy::Strict => {
                a.payload == b.payload
                    && a.type_name == b.type_name
                    && a.method_name == b.method_name
            }
        }
    }
}

impl<F> RecordEquivalence for F
where
    F: Fn(&EventRecord, &EventRecord) -> bool,
{
    fn equivalent(&self, a: &EventRecord, b: &EventRecord) -> bool {
        self(a, b)
    }
}
