//! HTTP adapter against an in-process diary service

use axum::extract::{Multipart, Query, RawQuery, State};
use axum::http::StatusCode;
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use diary_client::HttpDiaryBackend;
use diary_common::{
    Category, EntryId, EntryStore, MediaId, MediaStore, MediaUpload, Submission,
};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

type Log = Arc<Mutex<Vec<String>>>;

async fn read_detail(
    State(log): State<Log>,
    Query(params): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    let id = params.get("_id").cloned().unwrap_or_default();
    log.lock().unwrap().push(format!("read {}", id));
    if id == "missing" {
        return Err(StatusCode::NOT_FOUND);
    }
    Ok(Json(json!({
        "list": {
            "title": "Seoul",
            "content": "night walk\n",
            "realContent": "<p>night walk</p>",
            "category": "Travel",
            "imgData": ["a.png"],
            "createdAt": "2024-03-01T12:00:00Z"
        }
    })))
}

async fn write(State(log): State<Log>, Json(body): Json<Value>) -> Json<Value> {
    log.lock().unwrap().push(format!("write {}", body));
    Json(json!({ "_id": "new-1" }))
}

async fn update(State(log): State<Log>, Json(body): Json<Value>) -> StatusCode {
    log.lock().unwrap().push(format!("update {}", body));
    StatusCode::OK
}

async fn delete_entry(State(log): State<Log>, RawQuery(query): RawQuery) -> StatusCode {
    log.lock().unwrap().push(format!("delete {}", query.unwrap_or_default()));
    StatusCode::OK
}

async fn delete_files(State(log): State<Log>, RawQuery(query): RawQuery) -> StatusCode {
    log.lock()
        .unwrap()
        .push(format!("delete_files {}", query.unwrap_or_default()));
    StatusCode::OK
}

async fn upload(State(log): State<Log>, mut multipart: Multipart) -> Result<Json<Value>, StatusCode> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|_| StatusCode::BAD_REQUEST)?
    {
        if field.name() != Some("img") {
            continue;
        }
        let file_name = field.file_name().unwrap_or("blob").to_string();
        let mime = field.content_type().unwrap_or("").to_string();
        let bytes = field.bytes().await.map_err(|_| StatusCode::BAD_REQUEST)?;
        log.lock()
            .unwrap()
            .push(format!("img {} {} {}", file_name, mime, bytes.len()));

        let stored = format!("1700000000_{}", file_name);
        return Ok(Json(json!({
            "url": format!("http://files.test/img/{}", stored),
            "realName": stored
        })));
    }
    Err(StatusCode::BAD_REQUEST)
}

async fn serve() -> (HttpDiaryBackend, Log) {
    let log = Log::default();
    let app = Router::new()
        .route("/diary/read_detail", get(read_detail))
        .route("/diary/write", post(write))
        .route("/diary/update", post(update))
        .route("/diary/delete", delete(delete_entry))
        .route("/delete_files", delete(delete_files))
        .route("/img", post(upload))
        .with_state(log.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let backend = HttpDiaryBackend::from_host_port("http://127.0.0.1", addr.port()).unwrap();
    (backend, log)
}

fn submission() -> Submission {
    Submission {
        title: "Seoul".to_string(),
        content: "night walk\n".to_string(),
        real_content: "<p>night walk</p>".to_string(),
        category: Category::Travel,
        img_data: vec![MediaId::new("a.png")],
    }
}

fn logged(log: &Log) -> Vec<String> {
    log.lock().unwrap().clone()
}

#[tokio::test]
async fn test_fetch_entry_reads_detail_list() {
    let (backend, log) = serve().await;

    let entry = backend.fetch_entry(&EntryId::new("e-1")).await.unwrap();

    assert_eq!(entry.id, Some(EntryId::new("e-1")));
    assert_eq!(entry.title, "Seoul");
    assert_eq!(entry.category, Category::Travel);
    assert_eq!(entry.img_data, vec![MediaId::new("a.png")]);
    assert_eq!(logged(&log), vec!["read e-1".to_string()]);
}

#[tokio::test]
async fn test_fetch_error_status_is_an_error() {
    let (backend, _log) = serve().await;

    let err = backend
        .fetch_entry(&EntryId::new("missing"))
        .await
        .unwrap_err();

    assert!(format!("{:#}", err).contains("404"));
}

#[tokio::test]
async fn test_create_entry_posts_submission() {
    let (backend, log) = serve().await;

    let id = backend.create_entry(&submission()).await.unwrap();

    assert_eq!(id, EntryId::new("new-1"));
    let line = &logged(&log)[0];
    let body: Value = serde_json::from_str(line.trim_start_matches("write ")).unwrap();
    assert_eq!(body["title"], "Seoul");
    assert_eq!(body["realContent"], "<p>night walk</p>");
    assert_eq!(body["category"], "Travel");
    assert_eq!(body["imgData"], json!(["a.png"]));
}

#[tokio::test]
async fn test_update_entry_sends_id() {
    let (backend, log) = serve().await;

    backend
        .update_entry(&EntryId::new("e-5"), &submission())
        .await
        .unwrap();

    let line = &logged(&log)[0];
    let body: Value = serde_json::from_str(line.trim_start_matches("update ")).unwrap();
    assert_eq!(body["_id"], "e-5");
    assert_eq!(body["title"], "Seoul");
}

#[tokio::test]
async fn test_delete_calls() {
    let (backend, log) = serve().await;

    backend
        .delete_media(&[MediaId::new("a.png"), MediaId::new("b.png")])
        .await
        .unwrap();
    backend.delete_entry(&EntryId::new("e-1")).await.unwrap();

    assert_eq!(
        logged(&log),
        vec![
            "delete_files imgData%5B%5D=a.png&imgData%5B%5D=b.png".to_string(),
            "delete _id=e-1".to_string(),
        ]
    );
}

#[tokio::test]
async fn test_upload_media_multipart() {
    let (backend, log) = serve().await;

    let uploaded = backend
        .upload_media(MediaUpload {
            file_name: "cat.png".to_string(),
            mime: "image/png".to_string(),
            bytes: vec![0x89, b'P', b'N', b'G'],
        })
        .await
        .unwrap();

    assert_eq!(uploaded.storage_id, MediaId::new("1700000000_cat.png"));
    assert_eq!(
        uploaded.embed_url,
        "http://files.test/img/1700000000_cat.png"
    );
    assert_eq!(logged(&log), vec!["img cat.png image/png 4".to_string()]);
}

#[tokio::test]
async fn test_unreachable_service_is_an_error() {
    let backend = HttpDiaryBackend::from_host_port("http://127.0.0.1", 9).unwrap();
    assert!(backend.delete_entry(&EntryId::new("e-1")).await.is_err());
}
