use std::fmt;
use thiserror::Error;

/// Longest title accepted for submission, in characters.
pub const MAX_TITLE_LEN: usize = 50;

/// Field-level problems found when a document is turned into a submission.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("a category must be selected")]
    MissingCategory,

    #[error("title is {len} characters long, the limit is {max}")]
    TitleTooLong { len: usize, max: usize },
}

/// A collaborator call (fetch, upload, delete, ...) that did not succeed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct NetworkError {
    pub operation: &'static str,
    pub message: String,
}

impl NetworkError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }

    /// Flattens an adapter error chain into a single message.
    pub fn from_anyhow(operation: &'static str, err: &anyhow::Error) -> Self {
        Self::new(operation, format!("{:#}", err))
    }
}

/// Actions that must pass the authorization gate first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GatedAction {
    Submit,
    Edit,
    Delete,
}

impl fmt::Display for GatedAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            GatedAction::Submit => "submit",
            GatedAction::Edit => "edit",
            GatedAction::Delete => "delete",
        };
        f.write_str(name)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("not authorized to {action}")]
pub struct AuthorizationError {
    pub action: GatedAction,
}

/// Failure to turn a picked or dropped image into an embed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IngestError {
    #[error("upload failed: {0}")]
    Upload(#[from] NetworkError),

    #[error("payload contains no bytes")]
    EmptyPayload,

    #[error("invalid data url: {0}")]
    InvalidDataUrl(String),

    #[error("not an image: {0}")]
    NotAnImage(String),

    #[error("failed to read image: {0}")]
    Read(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown category: {0}")]
pub struct ParseCategoryError(pub String);

/// Every error the editing and viewing core can surface.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DiaryError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    #[error("ingest error: {0}")]
    Ingest(#[from] IngestError),

    #[error("authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    #[error("a submission is already in flight")]
    SubmissionInProgress,
}
