//! Event overlay: the newest events, bottom line first

use std::collections::HashSet;
use std::sync::Arc;

use tracing::warn;

use super::{BoldTokens, OverlayLine, Seen};
use crate::config::EventOverlayConfig;
use crate::events::EventRecordStore;
use crate::format::{ConsolidationFormatter, EquivalencePolicy};
use crate::types::{EventAction, EventDirection, EventRecord};

/// Color role of an event line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventTone {
    #[default]
    PostedToModes,
    PostedToGui,
    Handling,
}

impl EventTone {
    pub fn of(record: &EventRecord) -> Self {
        match (record.action, record.direction) {
            (EventAction::Received, _) => EventTone::Handling,
            (EventAction::Posted, EventDirection::ToModes) => EventTone::PostedToModes,
            (EventAction::Posted, EventDirection::ToGui) => EventTone::PostedToGui,
        }
    }
}

pub struct EventOverlay {
    store: Arc<EventRecordStore>,
    max_chars: usize,
    consolidate: bool,
    ignored: HashSet<String>,
    only_poster: HashSet<String>,
    bold: BoldTokens,
    formatter: ConsolidationFormatter<EquivalencePolicy>,
    snapshot: Vec<Arc<EventRecord>>,
    visible: Vec<Arc<EventRecord>>,
    lines: Vec<OverlayLine<EventTone>>,
    seen: Option<Seen>,
}

impl EventOverlay {
    pub fn new(store: Arc<EventRecordStore>, config: &EventOverlayConfig) -> Self {
        if config.max_chars_per_line == 0 {
            warn!("event overlay configured with zero line width; using 1");
        }
        Self {
            store,
            max_chars: config.max_chars_per_line.max(1),
            consolidate: config.consolidate,
            ignored: name_set(&config.ignored_events),
            only_poster: name_set(&config.only_show_poster_for),
            bold: BoldTokens::new(&config.bold_if_contains),
            formatter: ConsolidationFormatter::with_policy(config.equivalence),
            snapshot: Vec::with_capacity(256),
            visible: Vec::with_capacity(256),
            lines: vec![OverlayLine::blank(); config.lines],
            seen: None,
        }
    }

    pub fn lines(&self) -> &[OverlayLine<EventTone>] {
        &self.lines
    }

    /// Force the next [`refresh`](Self::refresh) to redraw
    pub fn invalidate(&mut self) {
        self.seen = None;
    }

    /// Redraw if the store changed since the last redraw; returns whether
    /// the lines were rebuilt.
    pub fn refresh(&mut self) -> bool {
        // read before the snapshot so a concurrent add is caught next time
        let seen = Seen {
            version: self.store.version(),
            changes: self.store.change_count(),
        };
        if self.seen == Some(seen) {
            return false;
        }
        self.seen = Some(seen);

        self.store.snapshot(&mut self.snapshot);
        self.visible.clear();
        for record in &self.snapshot {
            if self.is_visible(record) {
                self.visible.push(Arc::clone(record));
            }
        }

        let mut remaining = self.visible.len();
        let mut slot = self.lines.len();
        while remaining > 0 && slot > 0 {
            let start = remaining - 1;
            let (text, consumed) = if self.consolidate {
                self.formatter
                    .render_consolidated(&self.visible, start, self.max_chars)
            } else {
                (self.formatter.render(&self.visible[start], self.max_chars), 1)
            };

            slot -= 1;
            let line = &mut self.lines[slot];
            line.tone = EventTone::of(&self.visible[start]);
            line.bold = self.bold.matches(&text);
            line.text = text;
            remaining -= consumed.max(1);
        }

        for line in &mut self.lines[..slot] {
            *line = OverlayLine::blank();
        }
        true
    }

    fn is_visible(&self, record: &EventRecord) -> bool {
        if self.ignored.contains(&record.event_name) {
            return false;
        }
        !(record.action == EventAction::Received && self.only_poster.contains(&record.event_name))
    }
}

fn name_set(names: &[String]) -> HashSet<String> {
    names.iter().filter(|s| !s.is_empty()).cloned().collect()
}

impl std::fmt::Debug for EventOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventOverlay")
            .field("lines", &self.lines.len())
            .field("consolidate", &self.consolidate)
            .field("seen", &self.seen)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::CallSite;

    fn config(lines: usize) -> EventOverlayConfig {
        EventOverlayConfig {
            lines,
            ..EventOverlayConfig::default()
        }
    }

    fn post(name: &str, direction: EventDirection) -> EventRecord {
        EventRecord::posted("t", name, direction, CallSite::new("Src", "Fire"), "1")
    }

    fn received(name: &str) -> EventRecord {
        EventRecord::received("t", name, CallSite::new("Dst", "Handle"))
    }

    fn texts(overlay: &EventOverlay) -> Vec<&str> {
        overlay.lines().iter().map(|l| l.text.as_str()).collect()
    }

    #[test]
    fn test_fills_from_bottom() {
        let store = Arc::new(EventRecordStore::new(16));
        store.add(post("A", EventDirection::ToModes));
        store.add(received("B"));

        let mut overlay = EventOverlay::new(Arc::clone(&store), &config(4));
        assert!(overlay.refresh());
        assert_eq!(
            texts(&overlay),
            vec!["", "", "t A [Mode] < Src.Fire(1)", "t B > Dst.Handle"]
        );
        assert_eq!(overlay.lines()[2].tone, EventTone::PostedToModes);
        assert_eq!(overlay.lines()[3].tone, EventTone::Handling);
    }

    #[test]
    fn test_refresh_is_version_gated() {
        let store = Arc::new(EventRecordStore::new(16));
        let mut overlay = EventOverlay::new(Arc::clone(&store), &config(2));
        assert!(overlay.refresh());
        assert!(!overlay.refresh());

        store.add(post("A", EventDirection::ToGui));
        assert!(overlay.refresh());
        assert!(!overlay.refresh());

        overlay.invalidate();
        assert!(overlay.refresh());
    }

    #[test]
    fn test_clear_then_add_is_redrawn() {
        let store = Arc::new(EventRecordStore::new(16));
        let mut overlay = EventOverlay::new(Arc::clone(&store), &config(2));
        store.add(post("A", EventDirection::ToModes));
        overlay.refresh();

        // version goes 1 -> 0 -> 1
        store.clear();
        store.add(post("B", EventDirection::ToModes));
        assert!(overlay.refresh());
        assert!(overlay.lines()[1].text.contains(" B "));
        assert!(overlay.lines()[0].is_blank());
    }

    #[test]
    fn test_consolidates_runs() {
        let store = Arc::new(EventRecordStore::new(16));
        store.add(post("A", EventDirection::ToModes));
        for _ in 0..3 {
            store.add(post("B", EventDirection::ToGui));
        }

        let mut overlay = EventOverlay::new(Arc::clone(&store), &config(3));
        overlay.refresh();
        assert_eq!(
            texts(&overlay),
            vec![
                "",
                "t A [Mode] < Src.Fire(1)",
                "t B [GUI] < Src.Fire(1) (x3)"
            ]
        );
        assert_eq!(overlay.lines()[2].tone, EventTone::PostedToGui);
    }

    #[test]
    fn test_without_consolidation_one_line_each() {
        let store = Arc::new(EventRecordStore::new(16));
        for _ in 0..3 {
            store.add(post("B", EventDirection::ToGui));
        }
        let mut overlay = EventOverlay::new(
            Arc::clone(&store),
            &EventOverlayConfig {
                lines: 2,
                consolidate: false,
                ..EventOverlayConfig::default()
            },
        );
        overlay.refresh();
        assert!(overlay.lines().iter().all(|l| l.text == "t B [GUI] < Src.Fire(1)"));
    }

    #[test]
    fn test_filters_and_bold() {
        let store = Arc::new(EventRecordStore::new(16));
        store.add(post("Noise", EventDirection::ToModes));
        store.add(post("Drain", EventDirection::ToModes));
        store.add(received("Drain"));
        store.add(received("Score"));

        let mut overlay = EventOverlay::new(
            Arc::clone(&store),
            &EventOverlayConfig {
                lines: 3,
                ignored_events: vec!["Noise".to_string()],
                only_show_poster_for: vec!["Drain".to_string()],
                bold_if_contains: vec!["Score".to_string()],
                ..EventOverlayConfig::default()
            },
        );
        overlay.refresh();
        assert_eq!(
            texts(&overlay),
            vec!["", "t Drain [Mode] < Src.Fire(1)", "t Score > Dst.Handle"]
        );
        assert!(!overlay.lines()[1].bold);
        assert!(overlay.lines()[2].bold);
    }

    #[test]
    fn test_lines_respect_width() {
        let store = Arc::new(EventRecordStore::new(16));
        store.add(EventRecord::posted(
            "10:00:00.000",
            "Evt_Long",
            EventDirection::ToModes,
            CallSite::new("Some.Very.Long.Namespace.TypeName", "Fire"),
            "payload",
        ));
        let mut overlay = EventOverlay::new(
            Arc::clone(&store),
            &EventOverlayConfig {
                lines: 1,
                max_chars_per_line: 50,
                ..EventOverlayConfig::default()
            },
        );
        overlay.refresh();
        let line = &overlay.lines()[0].text;
        assert!(line.chars().count() <= 50);
        assert!(line.contains("...") && line.ends_with(".Fire(payload)"));
    }

    #[test]
    fn test_zero_lines() {
        let store = Arc::new(EventRecordStore::new(4));
        store.add(post("A", EventDirection::ToModes));
        let mut overlay = EventOverlay::new(store, &config(0));
        assert!(overlay.refresh());
        assert!(overlay.lines().is_empty());
    }
}
