//! Mode (entity state) types

use serde::{Deserialize, Serialize};

use super::identity::EntityId;

/// Marker separating the class name from the priority in mode descriptions
const PRIORITY_DELIMITER: &str = "  pri=";

/// Descriptive, immutable facts about a mode, supplied by the producer
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModeMetadata {
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "addedBy", default, skip_serializing_if = "String::is_empty")]
    pub added_by: String,
    pub priority: i32,
}

impl ModeMetadata {
    pub fn new(class_name: impl Into<String>, full_name: impl Into<String>, priority: i32) -> Self {
        Self {
            class_name: class_name.into(),
            full_name: full_name.into(),
            added_by: String::new(),
            priority,
        }
    }

    /// Attach the name of the mode that added this one
    pub fn added_by(mut self, added_by: impl Into<String>) -> Self {
        self.added_by = added_by.into();
        self
    }

    /// Build metadata from a `"<ClassName>  pri=<n>"` style description.
    ///
    /// When the delimiter is missing the whole (trimmed) description is the
    /// class name.
    pub fn from_description(description: &str, full_name: impl Into<String>, priority: i32) -> Self {
        let class_name = match description.find(PRIORITY_DELIMITER) {
            Some(idx) if idx > 0 => description[..idx].trim_end(),
            _ => description.trim(),
        };
        Self::new(class_name, full_name, priority)
    }
}

/// Snapshot view of a registered mode
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModeRecord {
    pub id: EntityId,
    #[serde(rename = "className")]
    pub class_name: String,
    #[serde(rename = "fullName")]
    pub full_name: String,
    #[serde(rename = "addedBy", skip_serializing_if = "String::is_empty")]
    pub added_by: String,
    pub priority: i32,
    #[serde(rename = "isOn")]
    pub is_on: bool,
    #[serde(skip)]
    pub aging: crate::modes::AgingClock,
}

impl ModeRecord {
    pub(crate) fn new(id: EntityId, metadata: &ModeMetadata, aging: crate::modes::AgingClock) -> Self {
        Self {
            id,
            class_name: metadata.class_name.clone(),
            full_name: metadata.full_name.clone(),
            added_by: metadata.added_by.clone(),
            priority: metadata.priority,
            is_on: false,
            aging,
        }
    }

    /// Normalized age of the current on-transition, see [`crate::modes::AgingClock::age`]
    pub fn age(&self) -> f32 {
        self.aging.age()
    }

    pub fn is_settled(&self) -> bool {
        self.aging.is_settled()
    }
}

/// `AddedBy.ClassName_Priority`, or `ClassName_Priority` without an adder
impl std::fmt::Display for ModeRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.added_by.is_empty() {
            write!(f, "{}_{}", self.class_name, self.priority)
        } else {
            write!(f, "{}.{}_{}", self.added_by, self.class_name, self.priority)
        }
    }
}
