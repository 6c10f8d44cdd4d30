//! Read models - posts with their references resolved for output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Category, Post, Tag, User};

/// `{id, name, slug}` summary of a category or tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomySummary {
    pub id: Uuid,
    pub name: String,
    pub slug: String,
}

impl From<Category> for TaxonomySummary {
    fn from(category: Category) -> Self {
        Self {
            id: category.id,
            name: category.name,
            slug: category.slug,
        }
    }
}

impl From<Tag> for TaxonomySummary {
    fn from(tag: Tag) -> Self {
        Self {
            id: tag.id,
            name: tag.name,
            slug: tag.slug,
        }
    }
}

/// `{id, name, username}` summary of the posting user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorSummary {
    pub id: Uuid,
    pub name: String,
    pub username: String,
}

impl From<User> for AuthorSummary {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            username: user.username,
        }
    }
}

/// Which post fields a query exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Projection {
    /// Single-post read: everything except the photo.
    Full,
    /// Listings: body and excerpt, no meta fields.
    Listing,
    /// Related and search results: no body.
    Light,
}

/// A post with categories, tags and author populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostView {
    pub id: Uuid,
    pub about: String,
    pub author: String,
    pub slug: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub excerpt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification: Option<bool>,
    pub categories: Vec<TaxonomySummary>,
    pub tags: Vec<TaxonomySummary>,
    pub posted_by: Option<AuthorSummary>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl PostView {
    pub fn project(
        post: &Post,
        projection: Projection,
        categories: Vec<TaxonomySummary>,
        tags: Vec<TaxonomySummary>,
        posted_by: Option<AuthorSummary>,
    ) -> Self {
        let with_body = projection != Projection::Light;
        let with_meta = projection == Projection::Full;
        let with_flags = projection != Projection::Light;

        Self {
            id: post.id,
            about: post.about.clone(),
            author: post.author.clone(),
            slug: post.slug.clone(),
            body: with_body.then(|| post.body.clone()),
            excerpt: Some(post.excerpt.clone()),
            meta_title: with_meta.then(|| post.meta_title.clone()),
            meta_description: with_meta.then(|| post.meta_description.clone()),
            source: post.source.filter(|_| with_flags),
            verification: post.verification.filter(|_| with_flags),
            categories,
            tags,
            posted_by,
            created_at: post.created_at,
            updated_at: post.updated_at,
        }
    }
}

/// Page of posts bundled with the complete category and tag universes.
#[derive(Debug, Clone, Serialize)]
pub struct PostListing {
    pub posts: Vec<PostView>,
    pub categories: Vec<Category>,
    pub tags: Vec<Tag>,
    pub size: usize,
}
