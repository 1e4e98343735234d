//! REST adapter for the diary service.
//!
//! | Port call       | Request                                        |
//! |-----------------|------------------------------------------------|
//! | `fetch_entry`   | `GET /diary/read_detail?_id=<id>`              |
//! | `create_entry`  | `POST /diary/write`                            |
//! | `update_entry`  | `POST /diary/update` (submission plus `_id`)   |
//! | `delete_entry`  | `DELETE /diary/delete?_id=<id>`                |
//! | `delete_media`  | `DELETE /delete_files?imgData[]=a&imgData[]=b` |
//! | `upload_media`  | `POST /img`, multipart field `img`             |

use anyhow::{Context, Result};
use async_trait::async_trait;
use diary_common::{
    DiaryEntry, EntryId, EntryStore, MediaId, MediaStore, MediaUpload, Submission, UploadedMedia,
};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, instrument};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Deserialize)]
struct DetailResponse {
    list: DiaryEntry,
}

#[derive(Deserialize)]
struct WriteResponse {
    #[serde(rename = "_id", default)]
    id: Option<String>,
}

#[derive(Serialize)]
struct UpdateRequest<'a> {
    #[serde(rename = "_id")]
    id: &'a EntryId,

    #[serde(flatten)]
    submission: &'a Submission,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UploadResponse {
    url: String,
    real_name: String,
}

/// Talks to the diary service over HTTP
#[derive(Debug, Clone)]
pub struct HttpDiaryBackend {
    client: Client,
    base_url: String,
}

impl HttpDiaryBackend {
    pub fn new(base_url: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .context("failed to build HTTP client")?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// Base URL in the `{host}:{port}` form the service is addressed by.
    pub fn from_host_port(host: &str, port: u16) -> Result<Self> {
        Self::new(format!("{}:{}", host.trim_end_matches('/'), port))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

/// Turns a non-2xx answer into an error that carries the request and body.
async fn check(response: Response, what: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    anyhow::bail!("{} returned {}: {}", what, status, body.trim())
}

#[async_trait]
impl EntryStore for HttpDiaryBackend {
    #[instrument(skip(self))]
    async fn fetch_entry(&self, id: &EntryId) -> Result<DiaryEntry> {
        let response = self
            .client
            .get(self.url("/diary/read_detail"))
            .query(&[("_id", id.as_str())])
            .send()
            .await
            .context("GET /diary/read_detail")?;

        let detail: DetailResponse = check(response, "GET /diary/read_detail")
            .await?
            .json()
            .await
            .context("malformed entry detail")?;

        let mut entry = detail.list;
        entry.id.get_or_insert_with(|| id.clone());
        Ok(entry)
    }

    #[instrument(skip(self, submission), fields(title = %submission.title))]
    async fn create_entry(&self, submission: &Submission) -> Result<EntryId> {
        let response = self
            .client
            .post(self.url("/diary/write"))
            .json(submission)
            .send()
            .await
            .context("POST /diary/write")?;

        let body = check(response, "POST /diary/write").await?.text().await?;

        // Older deployments answer with an empty body.
        let id = serde_json::from_str::<WriteResponse>(&body)
            .ok()
            .and_then(|r| r.id)
            .unwrap_or_default();
        debug!(entry_id = %id, "Entry created");
        Ok(EntryId::new(id))
    }

    #[instrument(skip(self, submission))]
    async fn update_entry(&self, id: &EntryId, submission: &Submission) -> Result<()> {
        let response = self
            .client
            .post(self.url("/diary/update"))
            .json(&UpdateRequest { id, submission })
            .send()
            .await
            .context("POST /diary/update")?;

        check(response, "POST /diary/update").await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_entry(&self, id: &EntryId) -> Result<()> {
        let response = self
            .client
            .delete(self.url("/diary/delete"))
            .query(&[("_id", id.as_str())])
            .send()
            .await
            .context("DELETE /diary/delete")?;

        check(response, "DELETE /diary/delete").await?;
        Ok(())
    }
}

#[async_trait]
impl MediaStore for HttpDiaryBackend {
    #[instrument(skip(self, upload), fields(file = %upload.file_name, bytes = upload.bytes.len()))]
    async fn upload_media(&self, upload: MediaUpload) -> Result<UploadedMedia> {
        let part = Part::bytes(upload.bytes)
            .file_name(upload.file_name)
            .mime_str(&upload.mime)
            .with_context(|| format!("invalid mime type {}", upload.mime))?;
        let form = Form::new().part("img", part);

        let response = self
            .client
            .post(self.url("/img"))
            .multipart(form)
            .send()
            .await
            .context("POST /img")?;

        let uploaded: UploadResponse = check(response, "POST /img")
            .await?
            .json()
            .await
            .context("malformed upload response")?;

        Ok(UploadedMedia {
            embed_url: uploaded.url,
            storage_id: MediaId::new(uploaded.real_name),
        })
    }

    #[instrument(skip(self, ids), fields(media = ids.len()))]
    async fn delete_media(&self, ids: &[MediaId]) -> Result<()> {
        let query: Vec<(&str, &str)> = ids.iter().map(|id| ("imgData[]", id.as_str())).collect();
        let response = self
            .client
            .delete(self.url("/delete_files"))
            .query(&query)
            .send()
            .await
            .context("DELETE /delete_files")?;

        check(response, "DELETE /delete_files").await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_url_from_host_port() {
        let backend = HttpDiaryBackend::from_host_port("http://localhost/", 8080).unwrap();
        assert_eq!(backend.base_url(), "http://localhost:8080");
        assert_eq!(backend.url("/img"), "http://localhost:8080/img");
    }

    #[test]
    fn test_update_request_flattens_submission() {
        let submission = Submission {
            title: "t".to_string(),
            content: "c\n".to_string(),
            real_content: "<p>c</p>".to_string(),
            category: diary_common::Category::Daily,
            img_data: vec![MediaId::new("a.png")],
        };
        let id = EntryId::new("e-1");
        let value = serde_json::to_value(UpdateRequest {
            id: &id,
            submission: &submission,
        })
        .unwrap();

        assert_eq!(value["_id"], "e-1");
        assert_eq!(value["realContent"], "<p>c</p>");
        assert_eq!(value["imgData"][0], "a.png");
    }
}
