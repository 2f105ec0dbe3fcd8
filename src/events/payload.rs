//! Payload rendering for posted events
//!
//! Producers hand over arbitrary payload values; this module turns them into
//! the short text stored on the record. Custom renderers can be registered
//! per event name to fix up or enrich the generic output.

use std::collections::HashMap;
use std::fmt::Display;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::warn;

/// Rendered text for an absent payload
pub const NULL_PAYLOAD: &str = "null";

/// Rendered text for a payload whose display output is empty
pub const EMPTY_PAYLOAD: &str = "\"\"";

type Renderer = Arc<dyn Fn(&dyn Display) -> Option<String> + Send + Sync>;

/// Registry of per-event payload renderers with a generic fallback
#[derive(Default)]
pub struct PayloadRenderers {
    renderers: RwLock<HashMap<String, Renderer>>,
}

impl PayloadRenderers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the renderer for `event_name`.
    ///
    /// Returning `None` or an empty string falls back to generic rendering,
    /// and so does a renderer that panics.
    pub fn register<F>(&self, event_name: impl Into<String>, renderer: F)
    where
        F: Fn(&dyn Display) -> Option<String> + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        if event_name.is_empty() {
            return;
        }
        self.renderers.write().insert(event_name, Arc::new(renderer));
    }

    pub fn unregister(&self, event_name: &str) -> bool {
        self.renderers.write().remove(event_name).is_some()
    }

    pub fn len(&self) -> usize {
        self.renderers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Render `payload` as posted with `event_name`
    pub fn render(&self, event_name: &str, payload: Option<&dyn Display>) -> String {
        let Some(payload) = payload else {
            return NULL_PAYLOAD.to_string();
        };

        let custom = self.renderers.read().get(event_name).cloned();
        if let Some(renderer) = custom {
            match panic::catch_unwind(AssertUnwindSafe(|| renderer(payload))) {
                Ok(Some(text)) if !text.is_empty() => return text,
                Ok(_) => {}
                Err(_) => warn!(event = event_name, "payload renderer panicked, using generic rendering"),
            }
        }

        render_generic(&payload.to_string())
    }
}

impl std::fmt::Debug for PayloadRenderers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let renderers = self.renderers.read();
        let mut names: Vec<&String> = renderers.keys().collect();
        names.sort();
        f.debug_struct("PayloadRenderers").field("events", &names).finish()
    }
}

/// Generic rendering of a payload's display text
pub fn render_generic(text: &str) -> String {
    if text.is_empty() {
        EMPTY_PAYLOAD.to_string()
    } else if looks_like_type_path(text) {
        short_type_name(text).to_string()
    } else {
        text.to_string()
    }
}

/// Heuristic for dotted type paths such as `Game.Modes.Bonus`.
///
/// Every segment must start with a letter or `_` and contain only
/// identifier characters, `[` or `<`; the last segment must start with a
/// letter.
pub fn looks_like_type_path(text: &str) -> bool {
    let Some(last_dot) = text.rfind('.') else {
        return false;
    };
    if last_dot == 0 || last_dot == text.len() - 1 {
        return false;
    }
    if !text[last_dot + 1..].starts_with(|c: char| c.is_alphabetic()) {
        return false;
    }

    text.split('.').all(|part| {
        let mut chars = part.chars();
        match chars.next() {
            Some(first) if first.is_alphabetic() || first == '_' => {
                chars.all(|c| c.is_alphanumeric() || c == '_' || c == '[' || c == '<')
            }
            _ => false,
        }
    })
}

fn short_type_name(text: &str) -> &str {
    match text.rfind('.') {
        Some(idx) => &text[idx + 1..],
        None => text,
    }
}
