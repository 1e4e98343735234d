//! # Image Ingest Pipeline
//!
//! Turns a picked file or a dropped/pasted payload into an embedded image.
//!
//! ```text
//! pick_image() ─┐
//!               ├─→ upload ─→ tracker.record(id) ─→ editor.insert_embed_at(cursor)
//! drop payload ─┘
//! ```
//!
//! The cursor is read when the upload resolves, not when ingest starts, so
//! concurrent uploads land wherever the cursor is at that moment and may
//! interleave with typing. A missing selection skips the embed silently; the
//! identifier is still recorded. A failed upload records nothing.

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use diary_common::{IngestError, MediaStore, MediaUpload, NetworkError, UploadedMedia};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

use crate::media::MediaAttachmentTracker;

/// Cursor position in editor indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Selection {
    pub index: usize,
    pub length: usize,
}

impl Selection {
    pub fn caret(index: usize) -> Self {
        Self { index, length: 0 }
    }
}

/// The part of an editor the pipeline is allowed to touch.
pub trait EditorHandle: Send + Sync {
    /// Current selection, or `None` when the editor has no focus.
    fn current_selection(&self) -> Option<Selection>;

    fn insert_embed_at(&self, position: usize, media: &UploadedMedia);
}

/// A file the user chose.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickedFile {
    pub name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// File-selection surface restricted to images.
#[async_trait]
pub trait FilePicker: Send + Sync {
    /// Resolves once with at most one file; `None` means the user cancelled.
    async fn pick_image(&self) -> Result<Option<PickedFile>, IngestError>;
}

/// Raw image handed over by a drag/drop or paste.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DropPayload {
    Bytes { bytes: Vec<u8>, mime: String },
    DataUrl(String),
}

impl DropPayload {
    fn into_upload(self) -> Result<MediaUpload, IngestError> {
        let (bytes, mime) = match self {
            DropPayload::Bytes { bytes, mime } => (bytes, mime),
            DropPayload::DataUrl(url) => decode_data_url(&url)?,
        };

        Ok(MediaUpload {
            file_name: format!("pasted.{}", extension_for(&mime)),
            mime,
            bytes,
        })
    }
}

fn decode_data_url(url: &str) -> Result<(Vec<u8>, String), IngestError> {
    let rest = url
        .strip_prefix("data:")
        .ok_or_else(|| IngestError::InvalidDataUrl("missing data: scheme".to_string()))?;
    let (meta, data) = rest
        .split_once(',')
        .ok_or_else(|| IngestError::InvalidDataUrl("missing ',' separator".to_string()))?;
    let mime = meta
        .strip_suffix(";base64")
        .ok_or_else(|| IngestError::InvalidDataUrl("only base64 payloads are supported".to_string()))?;

    let bytes = STANDARD
        .decode(data.trim())
        .map_err(|e| IngestError::InvalidDataUrl(e.to_string()))?;

    Ok((bytes, mime.to_string()))
}

fn extension_for(mime: &str) -> &str {
    mime.split_once('/')
        .map(|(_, subtype)| subtype.split('+').next().unwrap_or(subtype))
        .filter(|ext| !ext.is_empty())
        .unwrap_or("bin")
}

/// Result of a successful ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IngestOutcome {
    pub media: UploadedMedia,

    /// Where the embed went, or `None` when there was no cursor.
    pub inserted_at: Option<usize>,
}

/// Uploads images and embeds them at the editor cursor
pub struct ImageIngestPipeline {
    media: Arc<dyn MediaStore>,
    editor: Arc<dyn EditorHandle>,
    tracker: MediaAttachmentTracker,
}

impl ImageIngestPipeline {
    pub fn new(
        media: Arc<dyn MediaStore>,
        editor: Arc<dyn EditorHandle>,
        tracker: MediaAttachmentTracker,
    ) -> Self {
        Self {
            media,
            editor,
            tracker,
        }
    }

    pub fn tracker(&self) -> &MediaAttachmentTracker {
        &self.tracker
    }

    /// Ingest from the file picker. Cancelling the picker is not an error and
    /// yields `Ok(None)`.
    pub async fn ingest_from_picker(
        &self,
        picker: &dyn FilePicker,
    ) -> Result<Option<IngestOutcome>, IngestError> {
        let Some(file) = picker.pick_image().await? else {
            debug!("Image selection cancelled");
            return Ok(None);
        };

        if !file.mime.starts_with("image/") {
            return Err(IngestError::NotAnImage(file.name));
        }

        let upload = MediaUpload {
            file_name: file.name,
            mime: file.mime,
            bytes: file.bytes,
        };
        self.ingest(upload).await.map(Some)
    }

    /// Ingest bytes that arrived through drag/drop or paste.
    pub async fn ingest_from_drop(&self, payload: DropPayload) -> Result<IngestOutcome, IngestError> {
        let upload = payload.into_upload().map_err(|e| {
            warn!(error = %e, "Rejected dropped image");
            e
        })?;
        if !upload.mime.starts_with("image/") {
            return Err(IngestError::NotAnImage(upload.mime));
        }
        self.ingest(upload).await
    }

    #[instrument(skip(self, upload), fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    async fn ingest(&self, upload: MediaUpload) -> Result<IngestOutcome, IngestError> {
        if upload.bytes.is_empty() {
            return Err(IngestError::EmptyPayload);
        }

        let media = match self.media.upload_media(upload).await {
            Ok(media) => media,
            Err(err) => {
                let err = IngestError::Upload(NetworkError::from_anyhow("upload_media", &err));
                warn!(error = %err, "Image upload failed");
                return Err(err);
            }
        };

        self.tracker.record(media.storage_id.clone());

        // Cursor as of now, after the upload resolved
        let inserted_at = match self.editor.current_selection() {
            Some(selection) => {
                self.editor.insert_embed_at(selection.index, &media);
                Some(selection.index)
            }
            None => {
                debug!(storage_id = %media.storage_id, "No selection, embed skipped");
                None
            }
        };

        info!(storage_id = %media.storage_id, ?inserted_at, "Image ingested");
        Ok(IngestOutcome { media, inserted_at })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_data_url() {
        let (bytes, mime) = decode_data_url("data:image/png;base64,iVBORw0=").unwrap();
        assert_eq!(mime, "image/png");
        assert_eq!(&bytes[..4], &[0x89, b'P', b'N', b'G']);
    }

    #[test]
    fn test_decode_data_url_rejects_bad_input() {
        assert!(matches!(
            decode_data_url("http://x/a.png"),
            Err(IngestError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png,rawtext"),
            Err(IngestError::InvalidDataUrl(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,@@@"),
            Err(IngestError::InvalidDataUrl(_))
        ));
    }

    #[test]
    fn test_drop_payload_file_name() {
        let upload = DropPayload::Bytes {
            bytes: vec![1, 2, 3],
            mime: "image/svg+xml".to_string(),
        }
        .into_upload()
        .unwrap();
        assert_eq!(upload.file_name, "pasted.svg");
    }
}
