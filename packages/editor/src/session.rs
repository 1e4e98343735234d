//! # Edit Session Management
//!
//! One editor mount: the document being written, its history buffer, the
//! cursor, the media uploaded so far and the collaborators needed to save.
//!
//! Every method takes `&self`, so an ingest can be awaited while the user
//! keeps editing through the same session. Shared state sits behind a
//! `std::sync::Mutex` that is never held across an `.await`.

use diary_common::{
    ensure_authorized, AuthorizationError, AuthorizationGate, Category, DiaryEntry, DiaryError,
    DiaryResult, EntryId, EntryStore, GatedAction, MediaId, MediaStore, NetworkError, NoticeKind,
    Notifier, UploadedMedia,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{debug, info, instrument, warn};

use crate::document::DiaryDocument;
use crate::ingest::{EditorHandle, ImageIngestPipeline, Selection};
use crate::media::MediaAttachmentTracker;
use crate::undo_stack::{HistoryConfig, UndoStack};

/// Collaborators an editing session talks to.
#[derive(Clone)]
pub struct EditorPorts {
    pub entries: Arc<dyn EntryStore>,
    pub media: Arc<dyn MediaStore>,
    pub gate: Arc<dyn AuthorizationGate>,
    pub notifier: Arc<dyn Notifier>,
}

/// Document, history and cursor as the editor widget sees them
#[derive(Debug)]
pub struct EditorSurface {
    document: DiaryDocument,
    history: UndoStack,
    selection: Option<Selection>,
}

impl EditorSurface {
    fn new(document: DiaryDocument, config: HistoryConfig) -> Self {
        let mut history = UndoStack::with_config(config);
        history.reset(document.rich_content());
        Self {
            document,
            history,
            selection: None,
        }
    }

    /// Content changed by something other than the user.
    fn apply_programmatic(&mut self) {
        let content = self.document.rich_content().to_string();
        if self.history.config().user_only {
            self.history.sync(content);
        } else {
            self.history.record(content);
        }
    }
}

/// Shared handle to an [`EditorSurface`], handed to the ingest pipeline.
#[derive(Debug, Clone)]
pub struct SurfaceHandle(Arc<Mutex<EditorSurface>>);

impl SurfaceHandle {
    fn lock(&self) -> MutexGuard<'_, EditorSurface> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl EditorHandle for SurfaceHandle {
    fn current_selection(&self) -> Option<Selection> {
        self.lock().selection
    }

    fn insert_embed_at(&self, position: usize, media: &UploadedMedia) {
        let mut surface = self.lock();
        surface.document.insert_embed_at(position, media);
        surface.apply_programmatic();

        // The embed occupies one index; keep the caret after it.
        if let Some(selection) = surface.selection.as_mut() {
            if selection.index >= position {
                selection.index += 1;
            }
        }
    }
}

/// Clears the in-flight flag when a submission ends, however it ends.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self(flag))
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A single editing session for a new or existing entry
pub struct EditSession {
    ports: EditorPorts,
    surface: SurfaceHandle,
    tracker: MediaAttachmentTracker,
    ingest: ImageIngestPipeline,
    submitting: AtomicBool,
}

impl EditSession {
    /// Session for a brand-new entry.
    pub fn new(ports: EditorPorts, history: HistoryConfig) -> Self {
        Self::with_document(ports, history, DiaryDocument::new())
    }

    /// Session editing a persisted entry. The entry is loaded
    /// programmatically, so it is the history base rather than an undo step.
    pub fn for_existing(
        ports: EditorPorts,
        history: HistoryConfig,
        entry: DiaryEntry,
    ) -> Result<Self, AuthorizationError> {
        ensure_authorized(ports.gate.as_ref(), GatedAction::Edit)?;
        debug!(entry_id = ?entry.id, media = entry.img_data.len(), "Loading entry for edit");
        Ok(Self::with_document(
            ports,
            history,
            DiaryDocument::from_entry(entry),
        ))
    }

    fn with_document(ports: EditorPorts, history: HistoryConfig, document: DiaryDocument) -> Self {
        let surface = SurfaceHandle(Arc::new(Mutex::new(EditorSurface::new(document, history))));
        let tracker = MediaAttachmentTracker::new();
        let ingest = ImageIngestPipeline::new(
            ports.media.clone(),
            Arc::new(surface.clone()),
            tracker.clone(),
        );

        Self {
            ports,
            surface,
            tracker,
            ingest,
            submitting: AtomicBool::new(false),
        }
    }

    /// Whether mutating actions should be offered right now.
    pub fn can_mutate(&self) -> bool {
        self.ports.gate.is_authorized()
    }

    /// Snapshot of the document.
    pub fn document(&self) -> DiaryDocument {
        self.surface.lock().document.clone()
    }

    pub fn tracker(&self) -> &MediaAttachmentTracker {
        &self.tracker
    }

    pub fn ingest(&self) -> &ImageIngestPipeline {
        &self.ingest
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting.load(Ordering::Acquire)
    }

    pub fn set_title(&self, title: impl Into<String>) {
        self.surface.lock().document.set_title(title);
    }

    pub fn set_category(&self, category: Category) {
        self.surface.lock().document.set_category(category);
    }

    pub fn selection(&self) -> Option<Selection> {
        self.surface.lock().selection
    }

    /// `None` models an editor without focus.
    pub fn set_selection(&self, selection: Option<Selection>) {
        self.surface.lock().selection = selection;
    }

    /// Interactive edit; enters history.
    pub fn edit_content(&self, markup: impl Into<String>) {
        let mut surface = self.surface.lock();
        surface.document.set_content(markup);
        let content = surface.document.rich_content().to_string();
        surface.history.record(content);
    }

    /// Programmatic replacement; bypasses history unless `userOnly` is off.
    pub fn replace_content(&self, markup: impl Into<String>) {
        let mut surface = self.surface.lock();
        surface.document.set_content(markup);
        surface.apply_programmatic();
    }

    /// Returns whether anything changed.
    pub fn undo(&self) -> bool {
        let mut surface = self.surface.lock();
        let Some(snapshot) = surface.history.undo().map(str::to_string) else {
            return false;
        };
        surface.document.set_content(snapshot);
        true
    }

    /// Returns whether anything changed.
    pub fn redo(&self) -> bool {
        let mut surface = self.surface.lock();
        let Some(snapshot) = surface.history.redo().map(str::to_string) else {
            return false;
        };
        surface.document.set_content(snapshot);
        true
    }

    pub fn can_undo(&self) -> bool {
        self.surface.lock().history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.surface.lock().history.can_redo()
    }

    /// Saves the document, creating the entry or updating it in place.
    ///
    /// Authorization and validation are checked before any network call.
    /// After a successful save, uploads from this session that are no longer
    /// embedded are deleted on a best-effort basis.
    #[instrument(skip(self))]
    pub async fn submit(&self) -> DiaryResult<EntryId> {
        ensure_authorized(self.ports.gate.as_ref(), GatedAction::Submit)?;
        let _in_flight = InFlight::acquire(&self.submitting).ok_or_else(|| {
            debug!("Submit ignored, already in flight");
            DiaryError::SubmissionInProgress
        })?;

        let (submission, existing) = {
            let surface = self.surface.lock();
            (
                surface.document.to_submission()?,
                surface.document.id().cloned(),
            )
        };

        let id = match existing {
            Some(id) => {
                self.ports
                    .entries
                    .update_entry(&id, &submission)
                    .await
                    .map_err(|e| self.network_failure("update_entry", &e))?;
                id
            }
            None => {
                let id = self
                    .ports
                    .entries
                    .create_entry(&submission)
                    .await
                    .map_err(|e| self.network_failure("create_entry", &e))?;
                self.surface.lock().document.assign_id(id.clone());
                id
            }
        };

        info!(entry_id = %id, media = submission.img_data.len(), "Entry saved");
        self.ports
            .notifier
            .notify(NoticeKind::Success, "Diary entry saved");

        let orphans = self.tracker.orphans(&submission.img_data);
        if !orphans.is_empty() {
            self.delete_media_advisory(&orphans).await;
        }

        Ok(id)
    }

    /// Abandons the session, deleting every image uploaded during it.
    /// Returns once navigation away is safe.
    #[instrument(skip(self))]
    pub async fn discard(&self) {
        let uploaded = self.tracker.snapshot();
        if uploaded.is_empty() {
            return;
        }
        self.delete_media_advisory(&uploaded).await;
    }

    async fn delete_media_advisory(&self, ids: &[MediaId]) {
        match self.ports.media.delete_media(ids).await {
            Ok(()) => debug!(media = ids.len(), "Unused uploads deleted"),
            Err(err) => warn!(
                media = ids.len(),
                error = %NetworkError::from_anyhow("delete_media", &err),
                "Unused upload cleanup failed"
            ),
        }
    }

    fn network_failure(&self, operation: &'static str, err: &anyhow::Error) -> DiaryError {
        let err = NetworkError::from_anyhow(operation, err);
        warn!(error = %err, "Save failed");
        self.ports
            .notifier
            .notify(NoticeKind::Error, &err.to_string());
        DiaryError::Network(err)
    }
}
