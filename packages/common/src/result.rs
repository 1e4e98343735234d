use crate::error::DiaryError;

/// Common Result type alias
pub type DiaryResult<T> = Result<T, DiaryError>;
