//! Fixed-height view-models over the repositories
//!
//! An overlay owns a set of display lines and refreshes them from a
//! repository snapshot when the repository reports a change. Each line
//! carries its text, a tone (the renderer maps it to a color) and a bold
//! flag. Overlays are single-threaded; they only read the shared stores.

mod events;
mod modes;

pub use events::{EventOverlay, EventTone};
pub use modes::{ModeOverlay, ModeTone};

/// One rendered display line
#[derive(Debug, Clone, PartialEq)]
pub struct OverlayLine<T> {
    pub text: String,
    pub tone: T,
    pub bold: bool,
}

impl<T: Default> OverlayLine<T> {
    pub fn blank() -> Self {
        Self {
            text: String::new(),
            tone: T::default(),
            bold: false,
        }
    }
}

impl<T> OverlayLine<T> {
    pub fn is_blank(&self) -> bool {
        self.text.is_empty()
    }
}

/// Substring tokens that mark a line bold
#[derive(Debug, Clone, Default)]
pub(crate) struct BoldTokens(Vec<String>);

impl BoldTokens {
    pub(crate) fn new(tokens: &[String]) -> Self {
        let mut kept: Vec<String> = Vec::with_capacity(tokens.len());
        for token in tokens {
            if !token.is_empty() && !kept.contains(token) {
                kept.push(token.clone());
            }
        }
        Self(kept)
    }

    pub(crate) fn matches(&self, text: &str) -> bool {
        !text.is_empty() && self.0.iter().any(|token| text.contains(token.as_str()))
    }
}

/// Last repository state an overlay rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Seen {
    pub(crate) version: u64,
    pub(crate) changes: u64,
}
