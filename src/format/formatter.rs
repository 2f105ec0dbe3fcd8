//! Budgeted line rendering and duplicate-run consolidation
//!
//! Lines have the shape
//!
//! ```text
//! <timestamp> <event> [<direction>] <glyph> <type>.<method>(<payload>)   posted
//! <timestamp> <event> <glyph> <type>.<method>                            received
//! ```
//!
//! When a line is wider than the budget only the `<type>` segment shrinks:
//! its rightmost characters are kept behind an ellipsis so the method and
//! payload stay readable. All widths are counted in characters.

use std::fmt::Write;

use super::equivalence::{EquivalencePolicy, RecordEquivalence};
use crate::types::EventRecord;

/// Marker placed in front of a truncated type name
pub const ELLIPSIS: &str = "...";

const ELLIPSIS_CHARS: usize = 3;

/// Renders records into width-limited lines. Not shared between threads.
#[derive(Debug, Clone)]
pub struct ConsolidationFormatter<P = EquivalencePolicy> {
    policy: P,
    scratch: String,
}

impl ConsolidationFormatter {
    pub fn new() -> Self {
        Self::with_policy(EquivalencePolicy::default())
    }
}

impl Default for ConsolidationFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: RecordEquivalence> ConsolidationFormatter<P> {
    pub fn with_policy(policy: P) -> Self {
        Self {
            policy,
            scratch: String::with_capacity(256),
        }
    }

    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// Length of the run of equivalent records ending at `start`.
    ///
    /// Scans toward the front of `records` and stops at the first record that
    /// differs. Returns 0 when `start` is out of range, otherwise at least 1.
    pub fn count_backward_duplicates<R: AsRef<EventRecord>>(&self, records: &[R], start: usize) -> usize {
        let Some(head) = records.get(start) else {
            return 0;
        };
        let head = head.as_ref();
        1 + records[..start]
            .iter()
            .rev()
            .take_while(|prev| self.policy.equivalent(head, prev.as_ref()))
            .count()
    }

    /// Render `record` into at most `max_chars` characters.
    ///
    /// When the `.<method>(<payload>)` suffix alone is wider than the budget,
    /// the whole line keeps its rightmost `max_chars` characters, so the
    /// leading characters of the method name are cut before the payload.
    pub fn render(&mut self, record: &EventRecord, max_chars: usize) -> String {
        if max_chars == 0 {
            return String::new();
        }

        let scratch = &mut self.scratch;
        scratch.clear();
        push_prefix(scratch, record);
        let prefix_bytes = scratch.len();
        let prefix_chars = scratch.chars().count();

        scratch.push_str(&record.type_name);
        let class_chars = record.type_name.chars().count();
        let suffix_start = scratch.len();
        push_suffix(scratch, record);
        let suffix_chars = scratch[suffix_start..].chars().count();

        if prefix_chars + class_chars + suffix_chars <= max_chars {
            return scratch.clone();
        }

        let class_budget = max_chars.saturating_sub(prefix_chars + suffix_chars);
        let tail_budget = class_budget.saturating_sub(ELLIPSIS_CHARS);

        scratch.truncate(prefix_bytes);
        scratch.push_str(ELLIPSIS);
        scratch.push_str(tail_chars(&record.type_name, tail_budget));
        push_suffix(scratch, record);

        tail_chars(scratch, max_chars).to_string()
    }

    /// Render the run ending at `start` as one line with an ` (xN)` suffix.
    ///
    /// Returns the line and the number of records it covers (0 when `start`
    /// is out of range).
    pub fn render_consolidated<R: AsRef<EventRecord>>(
        &mut self,
        records: &[R],
        start: usize,
        max_chars: usize,
    ) -> (String, usize) {
        let count = self.count_backward_duplicates(records, start);
        if count == 0 {
            return (String::new(), 0);
        }

        let head = records[start].as_ref();
        if count < 2 {
            return (self.render(head, max_chars), 1);
        }

        let suffix_chars = count_suffix_len(count);
        let mut line = self.render(head, max_chars.saturating_sub(suffix_chars));
        push_count_suffix(&mut line, count);
        (clamp_chars(line, max_chars), count)
    }
}

/// Characters taken by ` (xN)`
pub fn count_suffix_len(count: usize) -> usize {
    4 + count_digits(count)
}

/// Append ` (xN)` to `line`
pub fn push_count_suffix(line: &mut String, count: usize) {
    let _ = write!(line, " (x{})", count);
}

fn count_digits(mut n: usize) -> usize {
    let mut digits = 1;
    while n >= 10 {
        n /= 10;
        digits += 1;
    }
    digits
}

fn push_prefix(out: &mut String, record: &EventRecord) {
    out.push_str(&record.timestamp);
    out.push(' ');
    out.push_str(&record.event_name);
    out.push(' ');
    if record.is_posted() {
        out.push('[');
        out.push_str(record.direction.label());
        out.push_str("] ");
    }
    out.push_str(record.action.glyph());
    out.push(' ');
}

fn push_suffix(out: &mut String, record: &EventRecord) {
    out.push('.');
    out.push_str(&record.method_name);
    if record.is_posted() {
        out.push('(');
        out.push_str(&record.payload);
        out.push(')');
    }
}

/// The last `n` characters of `s`
fn tail_chars(s: &str, n: usize) -> &str {
    if n == 0 {
        return "";
    }
    let total = s.chars().count();
    if total <= n {
        return s;
    }
    match s.char_indices().nth(total - n) {
        Some((idx, _)) => &s[idx..],
        None => "",
    }
}

/// Keep the rightmost `max_chars` characters of `line`
pub(crate) fn clamp_chars(line: String, max_chars: usize) -> String {
    if line.chars().count() <= max_chars {
        line
    } else {
        tail_chars(&line, max_chars).to_string()
    }
}
