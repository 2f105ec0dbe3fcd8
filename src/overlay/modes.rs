//! Mode overlay: registered modes in display order, top line first

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;

use super::{BoldTokens, OverlayLine, Seen};
use crate::config::ModeOverlayConfig;
use crate::modes::ModeRegistry;
use crate::types::ModeRecord;

/// Color role of a mode line
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum ModeTone {
    #[default]
    Inactive,
    /// On, still inside its aging window; carries the age in `[0, 1)`
    Aging(f32),
    Active,
}

impl ModeTone {
    fn of(is_on: bool, aging: Option<f32>) -> Self {
        match (is_on, aging) {
            (false, _) => ModeTone::Inactive,
            (true, Some(age)) => ModeTone::Aging(age),
            (true, None) => ModeTone::Active,
        }
    }
}

#[derive(Debug)]
struct Group {
    head: usize,
    count: usize,
    /// Minimum age among unsettled members
    min_age: Option<f32>,
}

pub struct ModeOverlay {
    registry: Arc<ModeRegistry>,
    consolidate: bool,
    ignored_prefixes: Vec<String>,
    bold: BoldTokens,
    snapshot: Vec<ModeRecord>,
    groups: Vec<Group>,
    lines: Vec<OverlayLine<ModeTone>>,
    seen: Option<Seen>,
    any_aging: bool,
}

impl ModeOverlay {
    pub fn new(registry: Arc<ModeRegistry>, config: &ModeOverlayConfig) -> Self {
        Self {
            registry,
            consolidate: config.consolidate,
            ignored_prefixes: config
                .ignored_prefixes
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
            bold: BoldTokens::new(&config.bold_if_contains),
            snapshot: Vec::with_capacity(256),
            groups: Vec::with_capacity(64),
            lines: vec![OverlayLine::blank(); config.lines],
            seen: None,
            any_aging: false,
        }
    }

    pub fn lines(&self) -> &[OverlayLine<ModeTone>] {
        &self.lines
    }

    /// Whether a displayed mode is still inside its aging window
    pub fn is_animating(&self) -> bool {
        self.any_aging
    }

    pub fn invalidate(&mut self) {
        self.seen = None;
    }

    /// Redraw if the registry changed or a line is still aging
    pub fn refresh(&mut self) -> bool {
        self.refresh_at(Instant::now())
    }

    pub fn refresh_at(&mut self, now: Instant) -> bool {
        let seen = Seen {
            version: self.registry.version(),
            changes: self.registry.change_count(),
        };
        if self.seen == Some(seen) && !self.any_aging {
            return false;
        }
        self.seen = Some(seen);
        self.any_aging = false;

        self.registry.snapshot(&mut self.snapshot);
        for line in &mut self.lines {
            *line = OverlayLine::blank();
        }

        if self.consolidate {
            self.draw_grouped(now);
        } else {
            self.draw_each(now);
        }
        true
    }

    fn draw_each(&mut self, now: Instant) {
        let mut slot = 0;
        for mode in &self.snapshot {
            if slot == self.lines.len() {
                break;
            }
            if is_ignored(&self.ignored_prefixes, &mode.class_name) {
                continue;
            }

            let aging = unsettled_age(mode, now);
            self.any_aging |= aging.is_some();

            let text = mode.to_string();
            let line = &mut self.lines[slot];
            line.tone = ModeTone::of(mode.is_on, aging);
            line.bold = self.bold.matches(&text);
            line.text = text;
            slot += 1;
        }
    }

    fn draw_grouped(&mut self, now: Instant) {
        // (class name, on, priority) -> group index, first appearance wins the slot
        let mut index: HashMap<(&str, bool, i32), usize> = HashMap::new();
        self.groups.clear();

        for (i, mode) in self.snapshot.iter().enumerate() {
            if is_ignored(&self.ignored_prefixes, &mode.class_name) {
                continue;
            }

            let key = (mode.class_name.as_str(), mode.is_on, mode.priority);
            let group_idx = *index.entry(key).or_insert_with(|| {
                self.groups.push(Group {
                    head: i,
                    count: 0,
                    min_age: None,
                });
                self.groups.len() - 1
            });

            let group = &mut self.groups[group_idx];
            group.count += 1;
            if let Some(age) = unsettled_age(mode, now) {
                group.min_age = Some(group.min_age.map_or(age, |min| min.min(age)));
            }
        }

        for (slot, group) in self.groups.iter().take(self.lines.len()).enumerate() {
            let head = &self.snapshot[group.head];
            let mut text = head.to_string();
            if group.count >= 2 {
                crate::format::push_count_suffix(&mut text, group.count);
            }

            let tone = ModeTone::of(head.is_on, group.min_age);
            self.any_aging |= matches!(tone, ModeTone::Aging(_));

            let line = &mut self.lines[slot];
            line.tone = tone;
            line.bold = self.bold.matches(&text);
            line.text = text;
        }
    }
}

impl std::fmt::Debug for ModeOverlay {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeOverlay")
            .field("lines", &self.lines.len())
            .field("consolidate", &self.consolidate)
            .field("any_aging", &self.any_aging)
            .finish()
    }
}

fn is_ignored(prefixes: &[String], class_name: &str) -> bool {
    !class_name.is_empty() && prefixes.iter().any(|p| class_name.starts_with(p.as_str()))
}

fn unsettled_age(mode: &ModeRecord, now: Instant) -> Option<f32> {
    if mode.is_on && !mode.aging.is_settled_at(now) {
        Some(mode.aging.age_at(now))
    } else {
        None
    }
}
