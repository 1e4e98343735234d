//! # Media Attachment Tracker
//!
//! Every media identifier that became referenced during one editing session,
//! in upload order, each exactly once.
//!
//! The tracker is append-only and never reconciled against the current
//! markup: images the user later deletes from the content stay recorded so
//! session cleanup can reach everything that was uploaded.

use diary_common::MediaId;
use std::sync::{Arc, Mutex, PoisonError};

/// Shared handle; clones observe the same session record.
#[derive(Debug, Clone, Default)]
pub struct MediaAttachmentTracker {
    ids: Arc<Mutex<Vec<MediaId>>>,
}

impl MediaAttachmentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `id` unless it is already recorded. Returns whether it was new.
    pub fn record(&self, id: MediaId) -> bool {
        let mut ids = self.ids.lock().unwrap_or_else(PoisonError::into_inner);
        if ids.contains(&id) {
            return false;
        }
        ids.push(id);
        true
    }

    pub fn snapshot(&self) -> Vec<MediaId> {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn contains(&self, id: &MediaId) -> bool {
        self.ids
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Recorded identifiers that are not in `keep`, in upload order.
    pub fn orphans(&self, keep: &[MediaId]) -> Vec<MediaId> {
        self.snapshot()
            .into_iter()
            .filter(|id| !keep.contains(id))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_records_in_order_once() {
        let tracker = MediaAttachmentTracker::new();
        assert!(tracker.record(MediaId::new("a.png")));
        assert!(tracker.record(MediaId::new("b.png")));
        assert!(!tracker.record(MediaId::new("a.png")));

        assert_eq!(
            tracker.snapshot(),
            vec![MediaId::new("a.png"), MediaId::new("b.png")]
        );
    }

    #[test]
    fn test_clones_share_state() {
        let tracker = MediaAttachmentTracker::new();
        let other = tracker.clone();
        other.record(MediaId::new("x.png"));

        assert!(tracker.contains(&MediaId::new("x.png")));
        assert_eq!(tracker.len(), 1);
    }

    #[test]
    fn test_orphans() {
        let tracker = MediaAttachmentTracker::new();
        tracker.record(MediaId::new("a.png"));
        tracker.record(MediaId::new("b.png"));
        tracker.record(MediaId::new("c.png"));

        let orphans = tracker.orphans(&[MediaId::new("b.png")]);
        assert_eq!(orphans, vec![MediaId::new("a.png"), MediaId::new("c.png")]);
    }
}
