use serde::Serialize;

/// A raw highlight or annotation row from the device's `Bookmark` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bookmark {
    pub volume_id: String,
    pub text: String,
    pub annotation: String,
    pub date_created: String,
    pub date_modified: String,
}

/// Book metadata from the device's `content` table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Content {
    pub content_id: String,
    pub title: String,
    pub attribution: String,
}

/// One note as accepted by the Notado import mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Highlight {
    pub content: String,
    pub url: String,
    pub title: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub created: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub author: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Batch {
    pub highlights: Vec<Highlight>,
}

impl Batch {
    pub fn len(&self) -> usize {
        self.highlights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.highlights.is_empty()
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct HighlightCounts {
    pub total: i64,
    pub sideloaded: i64,
    pub official: i64,
}
