use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Category a post can be filed under. Managed outside the post pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

/// Free-form tag attached to posts. Managed outside the post pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}
