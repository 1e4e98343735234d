//! Collaborator contracts consumed by the editing and viewing core.
//!
//! Adapters (HTTP, in-memory) live in `diary-client`; the core only ever
//! holds these traits behind `Arc<dyn ...>`.

use crate::error::{AuthorizationError, GatedAction};
use crate::model::{DiaryEntry, EntryId, MediaId, MediaUpload, Submission, UploadedMedia};
use anyhow::Result;
use async_trait::async_trait;

/// Entry persistence.
#[async_trait]
pub trait EntryStore: Send + Sync {
    async fn fetch_entry(&self, id: &EntryId) -> Result<DiaryEntry>;

    async fn create_entry(&self, submission: &Submission) -> Result<EntryId>;

    async fn update_entry(&self, id: &EntryId, submission: &Submission) -> Result<()>;

    async fn delete_entry(&self, id: &EntryId) -> Result<()>;
}

/// Image storage.
#[async_trait]
pub trait MediaStore: Send + Sync {
    async fn upload_media(&self, upload: MediaUpload) -> Result<UploadedMedia>;

    /// Best-effort bulk removal; callers treat failures as advisory.
    async fn delete_media(&self, ids: &[MediaId]) -> Result<()>;
}

/// Capability check consulted before every mutating action. Implementations
/// must re-read their source on each call.
pub trait AuthorizationGate: Send + Sync {
    fn is_authorized(&self) -> bool;
}

impl<F> AuthorizationGate for F
where
    F: Fn() -> bool + Send + Sync,
{
    fn is_authorized(&self) -> bool {
        self()
    }
}

/// Short-circuits `action` unless the gate currently allows it.
pub fn ensure_authorized(
    gate: &dyn AuthorizationGate,
    action: GatedAction,
) -> Result<(), AuthorizationError> {
    if gate.is_authorized() {
        Ok(())
    } else {
        Err(AuthorizationError { action })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Success,
    Error,
}

/// Fire-and-forget user feedback.
pub trait Notifier: Send + Sync {
    fn notify(&self, kind: NoticeKind, message: &str);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_closure_gate_is_reevaluated() {
        let allowed = Arc::new(AtomicBool::new(true));
        let flag = allowed.clone();
        let gate = move || flag.load(Ordering::SeqCst);

        assert!(ensure_authorized(&gate, GatedAction::Submit).is_ok());

        allowed.store(false, Ordering::SeqCst);
        let err = ensure_authorized(&gate, GatedAction::Submit).unwrap_err();
        assert_eq!(err.action, GatedAction::Submit);
    }
}
