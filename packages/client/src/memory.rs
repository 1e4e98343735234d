use anyhow::{bail, Result};
use async_trait::async_trait;
use diary_common::{
    DiaryEntry, EntryId, EntryStore, MediaId, MediaStore, MediaUpload, Submission, UploadedMedia,
};
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use uuid::Uuid;

#[derive(Default)]
struct Store {
    entries: HashMap<EntryId, DiaryEntry>,
    media: HashMap<MediaId, Vec<u8>>,
}

/// Entries and images kept in process memory.
///
/// Identifiers are random UUIDs; stored images are addressed as
/// `memory://img/<id>`.
#[derive(Default)]
pub struct MemoryBackend {
    store: Mutex<Store>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Store> {
        self.store.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn entry_count(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn has_media(&self, id: &MediaId) -> bool {
        self.lock().media.contains_key(id)
    }

    /// Stored image identifiers, sorted.
    pub fn media_ids(&self) -> Vec<MediaId> {
        let mut ids: Vec<MediaId> = self.lock().media.keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn entry_from(id: EntryId, submission: &Submission, created_at: String) -> DiaryEntry {
    DiaryEntry {
        id: Some(id),
        title: submission.title.clone(),
        content: submission.content.clone(),
        real_content: submission.real_content.clone(),
        category: submission.category,
        img_data: submission.img_data.clone(),
        created_at,
    }
}

#[async_trait]
impl EntryStore for MemoryBackend {
    async fn fetch_entry(&self, id: &EntryId) -> Result<DiaryEntry> {
        match self.lock().entries.get(id) {
            Some(entry) => Ok(entry.clone()),
            None => bail!("entry {} not found", id),
        }
    }

    async fn create_entry(&self, submission: &Submission) -> Result<EntryId> {
        let id = EntryId::new(Uuid::new_v4().simple().to_string());
        let entry = entry_from(id.clone(), submission, chrono::Utc::now().to_rfc3339());
        self.lock().entries.insert(id.clone(), entry);
        Ok(id)
    }

    async fn update_entry(&self, id: &EntryId, submission: &Submission) -> Result<()> {
        let mut store = self.lock();
        let Some(existing) = store.entries.get_mut(id) else {
            bail!("entry {} not found", id);
        };
        // createdAt belongs to the first save
        let created_at = std::mem::take(&mut existing.created_at);
        *existing = entry_from(id.clone(), submission, created_at);
        Ok(())
    }

    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        match self.lock().entries.remove(id) {
            Some(_) => Ok(()),
            None => bail!("entry {} not found", id),
        }
    }
}

#[async_trait]
impl MediaStore for MemoryBackend {
    async fn upload_media(&self, upload: MediaUpload) -> Result<UploadedMedia> {
        if upload.bytes.is_empty() {
            bail!("empty upload");
        }
        let id = MediaId::new(format!("{}_{}", Uuid::new_v4().simple(), upload.file_name));
        let embed_url = format!("memory://img/{}", id);
        self.lock().media.insert(id.clone(), upload.bytes);
        Ok(UploadedMedia {
            embed_url,
            storage_id: id,
        })
    }

    /// Unknown identifiers are ignored.
    async fn delete_media(&self, ids: &[MediaId]) -> Result<()> {
        let mut store = self.lock();
        for id in ids {
            store.media.remove(id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diary_common::Category;

    fn submission(title: &str) -> Submission {
        Submission {
            title: title.to_string(),
            content: "x\n".to_string(),
            real_content: "<p>x</p>".to_string(),
            category: Category::Hobby,
            img_data: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_entry_lifecycle() {
        let backend = MemoryBackend::new();
        let id = backend.create_entry(&submission("first")).await.unwrap();

        let created = backend.fetch_entry(&id).await.unwrap();
        assert_eq!(created.title, "first");
        assert!(!created.created_at.is_empty());

        backend.update_entry(&id, &submission("second")).await.unwrap();
        let updated = backend.fetch_entry(&id).await.unwrap();
        assert_eq!(updated.title, "second");
        assert_eq!(updated.created_at, created.created_at);

        backend.delete_entry(&id).await.unwrap();
        assert!(backend.fetch_entry(&id).await.is_err());
        assert!(backend.delete_entry(&id).await.is_err());
    }

    #[tokio::test]
    async fn test_media_lifecycle() {
        let backend = MemoryBackend::new();
        let uploaded = backend
            .upload_media(MediaUpload {
                file_name: "cat.png".to_string(),
                mime: "image/png".to_string(),
                bytes: vec![1, 2],
            })
            .await
            .unwrap();

        assert!(uploaded.storage_id.as_str().ends_with("_cat.png"));
        assert!(uploaded.embed_url.starts_with("memory://img/"));
        assert!(backend.has_media(&uploaded.storage_id));

        backend
            .delete_media(&[uploaded.storage_id.clone(), MediaId::new("ghost")])
            .await
            .unwrap();
        assert!(backend.media_ids().is_empty());
    }
}
