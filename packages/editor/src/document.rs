//! # Document Model
//!
//! One diary entry's authorable fields while it is being edited.
//!
//! Setters never validate; validation is deferred to [`DiaryDocument::to_submission`].
//! The plain-text projection is recomputed synchronously on every content
//! change, never lazily.
//!
//! ## Media references
//!
//! The document remembers which storage identifier belongs to each embed URL
//! it inserted. [`DiaryDocument::media_refs`] reports only those whose embed
//! is still present in the markup, plus identifiers carried over from a
//! persisted entry (whose URLs are not known and are therefore kept).

use diary_common::{
    Category, DiaryEntry, EntryId, MediaId, Submission, UploadedMedia, ValidationError,
    MAX_TITLE_LEN,
};
use std::collections::HashSet;

/// Editable diary entry
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiaryDocument {
    id: Option<EntryId>,
    title: String,
    rich_content: String,
    plain_text: String,
    category: Category,
    embeds: Vec<UploadedMedia>,
    carried_media: Vec<MediaId>,
    created_at: Option<String>,

    /// Current version number (increments on each mutation)
    version: u64,
}

impl DiaryDocument {
    /// Empty document for a new entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Document for editing a persisted entry. The stored plain text is
    /// ignored and re-derived from the markup.
    pub fn from_entry(entry: DiaryEntry) -> Self {
        let plain_text = diary_markup::plain_text(&entry.real_content);
        Self {
            id: entry.id,
            title: entry.title,
            rich_content: entry.real_content,
            plain_text,
            category: entry.category,
            embeds: Vec::new(),
            carried_media: entry.img_data,
            created_at: Some(entry.created_at).filter(|s| !s.is_empty()),
            version: 0,
        }
    }

    pub fn id(&self) -> Option<&EntryId> {
        self.id.as_ref()
    }

    /// Records the identifier the persistence service assigned on save.
    pub fn assign_id(&mut self, id: EntryId) {
        self.id = Some(id);
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    /// Title length in characters.
    pub fn title_len(&self) -> usize {
        self.title.chars().count()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    pub fn rich_content(&self) -> &str {
        &self.rich_content
    }

    pub fn plain_text(&self) -> &str {
        &self.plain_text
    }

    pub fn created_at(&self) -> Option<&str> {
        self.created_at.as_deref()
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.version += 1;
    }

    pub fn set_category(&mut self, category: Category) {
        self.category = category;
        self.version += 1;
    }

    pub fn set_content(&mut self, markup: impl Into<String>) {
        self.rich_content = markup.into();
        self.plain_text = diary_markup::plain_text(&self.rich_content);
        self.version += 1;
    }

    /// Splices an embed for `media` in at editor `index` and remembers its
    /// storage identifier.
    pub fn insert_embed_at(&mut self, index: usize, media: &UploadedMedia) {
        let markup = diary_markup::insert_embed(&self.rich_content, index, &media.embed_url);
        if !self.embeds.iter().any(|m| m.storage_id == media.storage_id) {
            self.embeds.push(media.clone());
        }
        self.set_content(markup);
    }

    /// Media identifiers referenced by the current content.
    pub fn media_refs(&self) -> Vec<MediaId> {
        let present: HashSet<String> = diary_markup::embedded_sources(&self.rich_content)
            .into_iter()
            .collect();

        let mut refs: Vec<MediaId> = Vec::new();
        let inserted = self
            .embeds
            .iter()
            .filter(|m| present.contains(&m.embed_url))
            .map(|m| &m.storage_id);

        for id in self.carried_media.iter().chain(inserted) {
            if !refs.contains(id) {
                refs.push(id.clone());
            }
        }
        refs
    }

    /// Checks the fields a submission requires.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.category.is_sentinel() {
            return Err(ValidationError::MissingCategory);
        }

        let len = self.title_len();
        if len > MAX_TITLE_LEN {
            return Err(ValidationError::TitleTooLong {
                len,
                max: MAX_TITLE_LEN,
            });
        }

        Ok(())
    }

    pub fn to_submission(&self) -> Result<Submission, ValidationError> {
        self.validate()?;

        Ok(Submission {
            title: self.title.clone(),
            content: self.plain_text.clone(),
            real_content: self.rich_content.clone(),
            category: self.category,
            img_data: self.media_refs(),
        })
    }
}
