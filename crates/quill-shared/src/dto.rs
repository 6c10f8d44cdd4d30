//! Data Transfer Objects - request bodies and query strings of the post API.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use uuid::Uuid;

/// Body of `POST /posts-categories-tags`. Both fields accept numbers or
/// numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListPostsRequest {
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
    #[serde(default, deserialize_with = "lenient_count")]
    pub skip: Option<u64>,
}

/// Body of `POST /posts/related`.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPostsRequest {
    pub post: RelatedPostRef,
    #[serde(default, deserialize_with = "lenient_count")]
    pub limit: Option<u64>,
}

/// The post related posts are computed for, as the client last received it.
#[derive(Debug, Clone, Deserialize)]
pub struct RelatedPostRef {
    #[serde(alias = "_id")]
    pub id: Uuid,
    #[serde(default)]
    pub categories: Vec<ReferenceId>,
}

impl RelatedPostRef {
    pub fn category_ids(&self) -> Vec<Uuid> {
        self.categories.iter().map(ReferenceId::id).collect()
    }
}

/// A reference sent either as a bare id or as a populated summary.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ReferenceId {
    Id(Uuid),
    Populated {
        #[serde(alias = "_id")]
        id: Uuid,
    },
}

impl ReferenceId {
    pub fn id(&self) -> Uuid {
        match self {
            ReferenceId::Id(id) => *id,
            ReferenceId::Populated { id } => *id,
        }
    }
}

/// Query string of `GET /posts/search`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(u64),
    Text(String),
}

fn lenient_count<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<NumberOrText>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrText::Number(n)) => Ok(Some(n)),
        Some(NumberOrText::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrText::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| D::Error::custom(format!("expected a count, got {text:?}"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_accept_numbers_and_strings() {
        let req: ListPostsRequest = serde_json::from_str(r#"{"limit": "5", "skip": 2}"#).unwrap();
        assert_eq!(req.limit, Some(5));
        assert_eq!(req.skip, Some(2));

        let req: ListPostsRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(req.limit, None);

        assert!(serde_json::from_str::<ListPostsRequest>(r#"{"limit": "ten"}"#).is_err());
    }

    #[test]
    fn related_accepts_ids_or_populated_categories() {
        let post = Uuid::new_v4();
        let c1 = Uuid::new_v4();
        let c2 = Uuid::new_v4();
        let raw = format!(
            r#"{{"post": {{"_id": "{post}", "categories": ["{c1}", {{"_id": "{c2}", "name": "Rust"}}]}}}}"#
        );

        let req: RelatedPostsRequest = serde_json::from_str(&raw).unwrap();

        assert_eq!(req.post.id, post);
        assert_eq!(req.post.category_ids(), vec![c1, c2]);
        assert_eq!(req.limit, None);
    }
}
