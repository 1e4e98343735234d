//! # Diary Client
//!
//! Adapters for the collaborator ports in `diary-common`:
//!
//! - [`HttpDiaryBackend`]: the diary REST service (entries and images)
//! - [`MemoryBackend`]: process-local storage for tests and offline runs
//! - [`TokenGate`]: authorization from an access token
//! - [`TracingNotifier`] / [`RecordingNotifier`]: user feedback sinks

mod auth;
mod http;
mod memory;
mod notify;

pub use auth::{TokenGate, TOKEN_ENV};
pub use http::HttpDiaryBackend;
pub use memory::MemoryBackend;
pub use notify::{RecordingNotifier, TracingNotifier};
