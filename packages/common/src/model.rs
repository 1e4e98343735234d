use crate::error::ParseCategoryError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Identifier assigned to an entry by the persistence service.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntryId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Storage identifier of an uploaded media file (the server's stored name).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MediaId(String);

impl MediaId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for MediaId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Closed set of diary categories. `All` is the "nothing chosen" sentinel
/// the editor starts on; it is never a valid submission value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Category {
    #[default]
    All,
    Daily,
    Travel,
    Food,
    Study,
    Coding,
    Hobby,
}

impl Category {
    pub const VALUES: [Category; 7] = [
        Category::All,
        Category::Daily,
        Category::Travel,
        Category::Food,
        Category::Study,
        Category::Coding,
        Category::Hobby,
    ];

    pub fn is_sentinel(self) -> bool {
        self == Category::All
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Category::All => "All",
            Category::Daily => "Daily",
            Category::Travel => "Travel",
            Category::Food => "Food",
            Category::Study => "Study",
            Category::Coding => "Coding",
            Category::Hobby => "Hobby",
        }
    }

    /// Categories a user may actually file an entry under.
    pub fn selectable() -> impl Iterator<Item = Category> {
        Self::VALUES.into_iter().filter(|c| !c.is_sentinel())
    }

    /// Header artwork shown behind the title of an entry.
    pub fn icon_asset(self) -> String {
        format!("{}.svg", self.as_str().to_lowercase())
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = ParseCategoryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::VALUES
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ParseCategoryError(s.to_string()))
    }
}

/// A persisted diary entry as returned by the persistence service.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiaryEntry {
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,

    pub title: String,

    /// Plain-text projection, stored for search.
    #[serde(default)]
    pub content: String,

    /// Rich markup, the form that is rendered.
    #[serde(default)]
    pub real_content: String,

    pub category: Category,

    #[serde(default)]
    pub img_data: Vec<MediaId>,

    #[serde(default)]
    pub created_at: String,
}

/// Validated payload handed to the persistence service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Submission {
    pub title: String,
    pub content: String,
    pub real_content: String,
    pub category: Category,
    pub img_data: Vec<MediaId>,
}

/// Raw image bytes on their way to media storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaUpload {
    pub file_name: String,
    pub mime: String,
    pub bytes: Vec<u8>,
}

/// What media storage answers for a successful upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedMedia {
    pub embed_url: String,
    pub storage_id: MediaId,
}
