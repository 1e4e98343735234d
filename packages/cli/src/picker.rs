use async_trait::async_trait;
use diary_common::IngestError;
use diary_editor::{FilePicker, PickedFile};
use std::path::{Path, PathBuf};

/// Picks the image named on the command line.
#[derive(Debug, Clone)]
pub struct FsPicker {
    path: Option<PathBuf>,
}

impl FsPicker {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    /// A picker the user closed without choosing anything.
    pub fn cancelled() -> Self {
        Self { path: None }
    }
}

/// Image mime type for a file name, by extension.
pub fn image_mime(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    let mime = match ext.as_str() {
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "bmp" => "image/bmp",
        "svg" => "image/svg+xml",
        _ => return None,
    };
    Some(mime)
}

#[async_trait]
impl FilePicker for FsPicker {
    async fn pick_image(&self) -> Result<Option<PickedFile>, IngestError> {
        let Some(path) = &self.path else {
            return Ok(None);
        };

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "image".to_string());
        let mime = image_mime(path).ok_or_else(|| IngestError::NotAnImage(name.clone()))?;

        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| IngestError::Read(format!("{}: {}", path.display(), e)))?;

        Ok(Some(PickedFile {
            name,
            mime: mime.to_string(),
            bytes,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_mime() {
        assert_eq!(image_mime(Path::new("a/B.PNG")), Some("image/png"));
        assert_eq!(image_mime(Path::new("x.jpeg")), Some("image/jpeg"));
        assert_eq!(image_mime(Path::new("notes.txt")), None);
        assert_eq!(image_mime(Path::new("README")), None);
    }

    #[tokio::test]
    async fn test_pick_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cat.gif");
        std::fs::write(&path, b"GIF89a").unwrap();

        let picked = FsPicker::new(&path).pick_image().await.unwrap().unwrap();
        assert_eq!(picked.name, "cat.gif");
        assert_eq!(picked.mime, "image/gif");
        assert_eq!(picked.bytes, b"GIF89a");
    }

    #[tokio::test]
    async fn test_pick_rejects_non_images_and_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hi").unwrap();

        assert!(matches!(
            FsPicker::new(&text).pick_image().await,
            Err(IngestError::NotAnImage(_))
        ));
        assert!(matches!(
            FsPicker::new(dir.path().join("gone.png")).pick_image().await,
            Err(IngestError::Read(_))
        ));
        assert_eq!(FsPicker::cancelled().pick_image().await, Ok(None));
    }
}
