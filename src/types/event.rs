//! Event record types
//!
//! An [`EventRecord`] is an immutable capture of one "happened" moment: an
//! event being posted into one of the two event managers, or an event being
//! received by a handler.

use serde::{Deserialize, Serialize};

/// Whether the record describes the post or the handling of an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventAction {
    /// The event was posted by the originating method
    Posted,
    /// The event was received by the originating method
    Received,
}

impl EventAction {
    /// Single-character glyph used in rendered lines
    pub fn glyph(self) -> &'static str {
        match self {
            EventAction::Posted => "<",
            EventAction::Received => ">",
        }
    }
}

impl std::fmt::Display for EventAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Which peer a posted event was sent towards
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventDirection {
    /// Posted to the mode (game logic) side
    #[default]
    ToModes,
    /// Posted to the GUI side
    ToGui,
}

impl EventDirection {
    /// Short label rendered inside the `[..]` direction segment
    pub fn label(self) -> &'static str {
        match self {
            EventDirection::ToModes => "Mode",
            EventDirection::ToGui => "GUI",
        }
    }
}

impl std::fmt::Display for EventDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Explicit identity of the code that posted or handled an event
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct CallSite {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "method")]
    pub method_name: String,
}

impl CallSite {
    pub fn new(type_name: impl Into<String>, method_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            method_name: method_name.into(),
        }
    }

    /// Split a `Namespace.Type.Method` path at its last dot, the inverse of
    /// [`EventRecord::full_method_name`].
    ///
    /// A path without a dot becomes a type with an empty method name.
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((type_name, method_name)) => Self::new(type_name, method_name),
            None => Self::new(path, ""),
        }
    }
}

/// An immutable captured event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    /// Pre-formatted wall clock time
    #[serde(rename = "ts")]
    pub timestamp: String,
    #[serde(rename = "event")]
    pub event_name: String,
    pub action: EventAction,
    /// Only meaningful when `action` is [`EventAction::Posted`]
    pub direction: EventDirection,
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(rename = "method")]
    pub method_name: String,
    #[serde(default)]
    pub payload: String,
}

impl EventRecord {
    /// Create a record for an event that was posted
    pub fn posted(
        timestamp: impl Into<String>,
        event_name: impl Into<String>,
        direction: EventDirection,
        call_site: CallSite,
        payload: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            event_name: event_name.into(),
            action: EventAction::Posted,
            direction,
            type_name: call_site.type_name,
            method_name: call_site.method_name,
            payload: payload.into(),
        }
    }

    /// Create a record for an event that was received by a handler
    pub fn received(
        timestamp: impl Into<String>,
        event_name: impl Into<String>,
        call_site: CallSite,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            event_name: event_name.into(),
            action: EventAction::Received,
            direction: EventDirection::default(),
            type_name: call_site.type_name,
            method_name: call_site.method_name,
            payload: String::new(),
        }
    }

    pub fn is_posted(&self) -> bool {
        self.action == EventAction::Posted
    }

    /// `Type.Method` of the originating call site
    pub fn full_method_name(&self) -> String {
        format!("{}.{}", self.type_name, self.method_name)
    }
}

impl AsRef<EventRecord> for EventRecord {
    fn as_ref(&self) -> &EventRecord {
        self
    }
}

/// Renders the untruncated display line
impl std::fmt::Display for EventRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.action {
            EventAction::Posted => write!(
                f,
                "{} {} [{}] {} {}.{}({})",
                self.timestamp,
                self.event_name,
                self.direction,
                self.action,
                self.type_name,
                self.method_name,
                self.payload
            ),
            EventAction::Received => write!(
                f,
                "{} {} {} {}.{}",
                self.timestamp, self.event_name, self.action, self.type_name, self.method_name
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_posted_display() {
        let record = EventRecord::posted(
            "10:02:04.675",
            "Evt_BallDrained",
            EventDirection::ToGui,
            CallSite::new("Game.TroughMode", "OnSwitch"),
            "3",
        );
        assert_eq!(
            record.to_string(),
            "10:02:04.675 Evt_BallDrained [GUI] < Game.TroughMode.OnSwitch(3)"
        );
    }

    #[test]
    fn test_received_display_has_no_payload() {
        let record = EventRecord::received("t", "Evt_Y", CallSite::new("Handler", "Handle"));
        assert_eq!(record.to_string(), "t Evt_Y > Handler.Handle");
    }

    #[test]
    fn test_call_site_parse() {
        let site = CallSite::parse("Namespace.Type.Handler");
        assert_eq!(site.type_name, "Namespace.Type");
        assert_eq!(site.method_name, "Handler");

        let bare = CallSite::parse("Handler");
        assert_eq!(bare.type_name, "Handler");
        assert!(bare.method_name.is_empty());
    }

    #[test]
    fn test_parse_round_trips_full_method_name() {
        for path in ["Game.Trough.OnSwitch", "Trough.OnSwitch"] {
            let record = EventRecord::received("t", "Evt", CallSite::parse(path));
            assert_eq!(record.full_method_name(), path);
        }

        let record = EventRecord::received("t", "Evt", CallSite::parse("Game.Trough.OnSwitch"));
        assert_eq!(record.type_name, "Game.Trough");
        assert_eq!(record.to_string(), "t Evt > Game.Trough.OnSwitch");
    }

    #[test]
    fn test_serialization_field_names() {
        let record = EventRecord::received("t", "Evt", CallSite::new("A", "b"));
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["event"], "Evt");
        assert_eq!(json["action"], "received");
        assert_eq!(json["type"], "A");
    }
}
