//! # Entry Deletion
//!
//! Deleting an entry also removes the images it stored. The image list comes
//! from the persisted entry, not from any editing session.
//!
//! Both requests go out together. Entry deletion is authoritative: a failed
//! image cleanup is reported but never blocks or rolls back the entry.

use diary_common::{
    ensure_authorized, AuthorizationGate, DiaryError, DiaryResult, EntryId, EntryStore,
    GatedAction, MediaId, MediaStore, NetworkError, NoticeKind, Notifier,
};
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// What happened besides the entry itself going away.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionReport {
    pub entry_id: EntryId,

    /// Images a cleanup was requested for.
    pub media_requested: usize,

    /// Set when the image cleanup failed.
    pub media_error: Option<NetworkError>,
}

pub struct DeletionCoordinator {
    entries: Arc<dyn EntryStore>,
    media: Arc<dyn MediaStore>,
    gate: Arc<dyn AuthorizationGate>,
    notifier: Arc<dyn Notifier>,
}

impl DeletionCoordinator {
    pub fn new(
        entries: Arc<dyn EntryStore>,
        media: Arc<dyn MediaStore>,
        gate: Arc<dyn AuthorizationGate>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            entries,
            media,
            gate,
            notifier,
        }
    }

    /// Deletes entry `id` and, alongside it, the images in `stored_media`.
    ///
    /// On `Ok` the caller may navigate away, whatever happened to the images.
    #[instrument(skip(self, stored_media), fields(media = stored_media.len()))]
    pub async fn delete(&self, id: &EntryId, stored_media: &[MediaId]) -> DiaryResult<DeletionReport> {
        ensure_authorized(self.gate.as_ref(), GatedAction::Delete)?;

        let cleanup = async {
            if stored_media.is_empty() {
                return Ok(());
            }
            self.media.delete_media(stored_media).await
        };
        let (media_result, entry_result) = tokio::join!(cleanup, self.entries.delete_entry(id));

        let media_error = media_result
            .err()
            .map(|err| NetworkError::from_anyhow("delete_media", &err));
        if let Some(err) = &media_error {
            warn!(entry_id = %id, error = %err, "Image cleanup failed");
            self.notifier
                .notify(NoticeKind::Error, &format!("Could not remove images: {}", err));
        }

        if let Err(err) = entry_result {
            let err = NetworkError::from_anyhow("delete_entry", &err);
            warn!(entry_id = %id, error = %err, "Entry deletion failed");
            self.notifier.notify(NoticeKind::Error, &err.to_string());
            return Err(DiaryError::Network(err));
        }

        info!(entry_id = %id, "Entry deleted");
        self.notifier.notify(NoticeKind::Success, "Diary entry deleted");

        Ok(DeletionReport {
            entry_id: id.clone(),
            media_requested: stored_media.len(),
            media_error,
        })
    }
}
