//! # Diary Editor
//!
//! Editing core for diary entries.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditSession                                 │
//! │  - DiaryDocument (title, markup, category)  │
//! │  - UndoStack (debounced, bounded history)   │
//! │  - Selection (editor cursor)                │
//! └─────────────────────────────────────────────┘
//!          ↑ insert_embed_at          ↓ submit
//! ┌──────────────────────┐   ┌──────────────────┐
//! │ ImageIngestPipeline  │   │ EntryStore       │
//! │  upload → tracker    │   │ MediaStore       │
//! └──────────────────────┘   └──────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use diary_editor::{EditSession, EditorPorts, HistoryConfig, Selection};
//!
//! let session = EditSession::new(ports, HistoryConfig::default());
//! session.set_title("Jeju");
//! session.set_category(Category::Travel);
//! session.edit_content("<p>Sunny day</p>");
//! session.set_selection(Some(Selection::caret(5)));
//!
//! session.ingest().ingest_from_picker(&picker).await?;
//! let id = session.submit().await?;
//! ```

mod document;
pub mod highlight;
mod ingest;
mod media;
mod session;
mod undo_stack;

pub use document::DiaryDocument;
pub use highlight::{CodeBlock, HighlightConfig, Highlighter, Language};
pub use ingest::{
    DropPayload, EditorHandle, FilePicker, ImageIngestPipeline, IngestOutcome, PickedFile,
    Selection,
};
pub use media::MediaAttachmentTracker;
pub use session::{EditSession, EditorPorts, EditorSurface, SurfaceHandle};
pub use undo_stack::{HistoryConfig, HistoryEntry, UndoStack};
