//! # Undo/Redo Stack
//!
//! Bounded, debounced history over content snapshots.
//!
//! ## Design
//!
//! - Each entry records the content before and after one edit
//! - A record arriving within `delay_ms` of the previous one extends the top
//!   entry instead of pushing a new one
//! - Past `max_stack` entries the oldest is evicted (sliding window)
//! - New edits clear the redo side
//! - Undo/redo at either boundary are no-ops
//!
//! Only interactive edits should be recorded; programmatic content
//! replacement goes through [`UndoStack::sync`] so the next edit starts from
//! the right base without becoming an undo step of its own. Synced changes
//! are carried into the recorded snapshots wherever they do not overlap the
//! recorded edit, so undo and redo keep them.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HistoryConfig {
    /// Maximum number of undo levels (0 = unlimited)
    pub max_stack: usize,

    /// Records closer together than this coalesce.
    pub delay_ms: u64,

    /// Only interactive edits enter history.
    pub user_only: bool,
}

impl HistoryConfig {
    pub fn coalesce_window(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            max_stack: 100,
            delay_ms: 500,
            user_only: true,
        }
    }
}

/// One undoable step
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry {
    pub before: String,
    pub after: String,
}

/// Undo/redo stack for document content
#[derive(Debug)]
pub struct UndoStack {
    /// Recorded steps, oldest first
    entries: VecDeque<HistoryEntry>,

    /// Number of entries currently applied; `entries[applied..]` are redoable
    applied: usize,

    /// Snapshot the stack believes the document holds
    current: String,

    last_recorded: Option<Instant>,

    config: HistoryConfig,
}

impl UndoStack {
    /// Create a new undo stack with the default configuration
    pub fn new() -> Self {
        Self::with_config(HistoryConfig::default())
    }

    pub fn with_config(config: HistoryConfig) -> Self {
        Self {
            entries: VecDeque::new(),
            applied: 0,
            current: String::new(),
            last_recorded: None,
            config,
        }
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self::with_config(HistoryConfig {
            max_stack: max_levels,
            ..HistoryConfig::default()
        })
    }

    pub fn config(&self) -> &HistoryConfig {
        &self.config
    }

    /// Record an interactive edit that produced `snapshot`
    pub fn record(&mut self, snapshot: impl Into<String>) -> bool {
        self.record_at(snapshot, Instant::now())
    }

    /// Record with an explicit timestamp. Returns `false` when the snapshot
    /// equals the current content and nothing was recorded.
    pub fn record_at(&mut self, snapshot: impl Into<String>, now: Instant) -> bool {
        let snapshot = snapshot.into();
        if snapshot == self.current {
            return false;
        }

        // New edit invalidates the undone future
        self.entries.truncate(self.applied);

        let coalesce = self.applied > 0
            && self
                .last_recorded
                .map(|at| now.saturating_duration_since(at) < self.config.coalesce_window())
                .unwrap_or(false);

        if coalesce {
            if let Some(top) = self.entries.back_mut() {
                top.after = snapshot.clone();
            }
        } else {
            self.entries.push_back(HistoryEntry {
                before: std::mem::take(&mut self.current),
                after: snapshot.clone(),
            });
            self.applied += 1;

            // Trim if exceeded max levels
            if self.config.max_stack > 0 && self.entries.len() > self.config.max_stack {
                self.entries.pop_front();
                self.applied -= 1;
            }
        }

        self.current = snapshot;
        self.last_recorded = Some(now);
        true
    }

    /// Adopt content that changed outside of history (loads, API inserts)
    /// without creating an undo step.
    ///
    /// The change is rebased through the recorded steps: the step under the
    /// cursor always ends in `content`, and each step's other end takes the
    /// change too unless it overlaps that step's own edit.
    pub fn sync(&mut self, content: impl Into<String>) {
        let old = std::mem::replace(&mut self.current, content.into());
        self.last_recorded = None;

        let Some(splice) = Splice::between(&old, &self.current) else {
            return;
        };
        let (undoable, redoable) = self.entries.make_contiguous().split_at_mut(self.applied);
        carry_through(
            undoable
                .iter_mut()
                .rev()
                .map(|entry| (&mut entry.after, &mut entry.before)),
            &old,
            splice.clone(),
        );
        carry_through(
            redoable
                .iter_mut()
                .map(|entry| (&mut entry.before, &mut entry.after)),
            &old,
            splice,
        );
    }

    /// Drop all history and start over from `base`
    pub fn reset(&mut self, base: impl Into<String>) {
        self.clear();
        self.current = base.into();
    }

    /// Step back one entry, returning the snapshot to restore
    pub fn undo(&mut self) -> Option<&str> {
        if self.applied == 0 {
            return None;
        }

        self.applied -= 1;
        self.current = self.entries[self.applied].before.clone();
        self.last_recorded = None;
        Some(&self.current)
    }

    /// Step forward one entry, returning the snapshot to restore
    pub fn redo(&mut self) -> Option<&str> {
        if self.applied >= self.entries.len() {
            return None;
        }

        self.current = self.entries[self.applied].after.clone();
        self.applied += 1;
        self.last_recorded = None;
        Some(&self.current)
    }

    /// Content as of the current position
    pub fn current(&self) -> &str {
        &self.current
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        self.applied > 0
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.applied < self.entries.len()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.applied
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.entries.len() - self.applied
    }

    /// Total entries held, undoable and redoable
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Clear all undo/redo history
    pub fn clear(&mut self) {
        self.entries.clear();
        self.applied = 0;
        self.last_recorded = None;
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}

/// Replacement of `start..end` by `text`
#[derive(Debug, Clone, PartialEq, Eq)]
struct Splice {
    start: usize,
    end: usize,
    text: String,
}

impl Splice {
    /// The single splice turning `old` into `new`
    fn between(old: &str, new: &str) -> Option<Self> {
        if old == new {
            return None;
        }
        let (prefix, suffix) = common_affixes(old, new);
        Some(Self {
            start: prefix,
            end: old.len() - suffix,
            text: new[prefix..new.len() - suffix].to_string(),
        })
    }

    fn apply(&self, target: &str) -> String {
        let mut out = String::with_capacity(target.len() + self.text.len());
        out.push_str(&target[..self.start]);
        out.push_str(&self.text);
        out.push_str(&target[self.end..]);
        out
    }

    /// This splice, made against `from`, moved onto `to`. `None` when it
    /// overlaps the region where the two differ.
    fn carry(&self, from: &str, to: &str) -> Option<Self> {
        let (prefix, suffix) = common_affixes(from, to);
        if self.end <= prefix {
            Some(self.clone())
        } else if self.start >= from.len() - suffix {
            let shift = |at: usize| at + to.len() - from.len();
            Some(Self {
                start: shift(self.start),
                end: shift(self.end),
                text: self.text.clone(),
            })
        } else {
            None
        }
    }
}

/// Byte lengths of the common prefix and the non-overlapping common suffix,
/// both on char boundaries.
fn common_affixes(a: &str, b: &str) -> (usize, usize) {
    let prefix: usize = a
        .chars()
        .zip(b.chars())
        .take_while(|(x, y)| x == y)
        .map(|(c, _)| c.len_utf8())
        .sum();

    let limit = a.len().min(b.len()) - prefix;
    let mut suffix = 0;
    for (x, y) in a[prefix..].chars().rev().zip(b[prefix..].chars().rev()) {
        if x != y || suffix + x.len_utf8() > limit {
            break;
        }
        suffix += x.len_utf8();
    }
    (prefix, suffix)
}

/// Walks steps outward from the cursor. `near` is the side of each step that
/// equals the text the splice was made against; `far` is rebased when the
/// splice carries over, and becomes the next step's `near`.
fn carry_through<'a>(
    steps: impl Iterator<Item = (&'a mut String, &'a mut String)>,
    old: &str,
    mut splice: Splice,
) {
    let mut old = old.to_string();
    for (near, far) in steps {
        if *near != old {
            return;
        }
        *near = splice.apply(near);

        let Some(next) = splice.carry(&old, far) else {
            return;
        };
        let rebased = next.apply(far);
        old = std::mem::replace(far, rebased);
        splice = next;
    }
}
