use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Image stored inline with its post.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Photo {
    pub data: Vec<u8>,
    pub content_type: String,
}

/// Post entity - a blog post together with its taxonomy references.
///
/// Category and tag ids are part of the value so a post is always persisted
/// with its taxonomy in a single write. The photo never appears in JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: Uuid,
    pub about: String,
    pub author: String,
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    pub meta_title: String,
    pub meta_description: String,
    #[serde(skip)]
    pub photo: Option<Photo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verification: Option<bool>,
    pub categories: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub posted_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Post {
    pub fn has_photo(&self) -> bool {
        self.photo.is_some()
    }

    /// True when the post references at least one of `categories`.
    pub fn shares_category(&self, categories: &[Uuid]) -> bool {
        self.categories.iter().any(|id| categories.contains(id))
    }
}
