use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    AuthorSummary, Photo, Post, PostListing, PostView, Projection, TaxonomySummary,
};
use crate::error::DomainError;
use crate::ports::{Cache, CategoryRepository, PostRepository, TagRepository, UserRepository};

use super::validator::{self, PostChanges};
use super::{PostSettings, PostSubmission, derive, media};

/// Page size of the taxonomy listing when the client sends none.
pub const DEFAULT_PAGE_LIMIT: u64 = 10;
/// Number of related posts returned when the client sends no limit.
pub const DEFAULT_RELATED_LIMIT: u64 = 3;
/// Larger page sizes are clamped to this.
pub const MAX_PAGE_LIMIT: u64 = 100;
/// Storage binds offsets as signed 64-bit integers.
const MAX_SKIP: u64 = i64::MAX as u64;

/// Create/update pipeline and read-side queries over the post store.
pub struct PostService {
    posts: Arc<dyn PostRepository>,
    categories: Arc<dyn CategoryRepository>,
    tags: Arc<dyn TagRepository>,
    users: Arc<dyn UserRepository>,
    cache: Arc<dyn Cache>,
    settings: PostSettings,
}

impl PostService {
    pub fn new(
        posts: Arc<dyn PostRepository>,
        categories: Arc<dyn CategoryRepository>,
        tags: Arc<dyn TagRepository>,
        users: Arc<dyn UserRepository>,
        cache: Arc<dyn Cache>,
        settings: PostSettings,
    ) -> Self {
        Self {
            posts,
            categories,
            tags,
            users,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &PostSettings {
        &self.settings
    }

    /// Validate, derive, attach the photo and persist in one write.
    ///
    /// `posted_by` is the authenticated principal; the submission cannot set it.
    pub async fn create(
        &self,
        submission: PostSubmission,
        posted_by: Uuid,
    ) -> Result<Post, DomainError> {
        let fields = validator::validate_new(submission)?;

        let slug = derive::slugify(&fields.about);
        if slug.is_empty() {
            return Err(DomainError::Validation(
                "About must contain at least one letter or digit".to_string(),
            ));
        }
        let excerpt = self
            .settings
            .excerpt(&fields.body, self.settings.create_excerpt_len);
        let meta_title = self.settings.meta_title(&fields.about);
        let meta_description = self.settings.meta_description(&fields.body);

        let photo = fields
            .photo
            .map(|upload| media::attach_photo(upload, self.settings.max_photo_bytes))
            .transpose()?;

        let now = Utc::now();
        let post = Post {
            id: Uuid::new_v4(),
            about: fields.about,
            author: fields.author,
            slug,
            body: fields.body,
            excerpt,
            meta_title,
            meta_description,
            photo,
            source: fields.source,
            verification: fields.verification,
            categories: fields.categories,
            tags: fields.tags,
            posted_by,
            created_at: now,
            updated_at: now,
        };

        let saved = self.posts.insert(post).await?;
        tracing::info!(
            post_id = %saved.id,
            slug = %saved.slug,
            has_photo = saved.has_photo(),
            "Post created"
        );
        Ok(saved)
    }

    /// Merge the supplied fields into the stored post. The slug never changes.
    pub async fn update(&self, slug: &str, submission: PostSubmission) -> Result<Post, DomainError> {
        let mut post = self.find(slug).await?;
        let changes = validator::validate_changes(submission)?;

        self.merge(&mut post, changes)?;
        post.updated_at = Utc::now();

        let saved = self.posts.update(post).await?;
        self.invalidate(&saved.slug).await;
        tracing::info!(post_id = %saved.id, slug = %saved.slug, "Post updated");
        Ok(saved)
    }

    /// Field-level merge over the mutable whitelist. `id`, `slug`,
    /// `posted_by` and `created_at` are not part of it.
    fn merge(&self, post: &mut Post, changes: PostChanges) -> Result<(), DomainError> {
        let photo = changes
            .photo
            .map(|upload| media::attach_photo(upload, self.settings.max_photo_bytes))
            .transpose()?;

        if let Some(about) = changes.about {
            post.meta_title = self.settings.meta_title(&about);
            post.about = about;
        }
        if let Some(author) = changes.author {
            post.author = author;
        }
        if let Some(body) = changes.body {
            post.excerpt = self
                .settings
                .excerpt(&body, self.settings.update_excerpt_len);
            post.meta_description = self.settings.meta_description(&body);
            post.body = body;
        }
        if let Some(categories) = changes.categories {
            post.categories = categories;
        }
        if let Some(tags) = changes.tags {
            post.tags = tags;
        }
        if changes.source.is_some() {
            post.source = changes.source;
        }
        if changes.verification.is_some() {
            post.verification = changes.verification;
        }
        if photo.is_some() {
            post.photo = photo;
        }

        Ok(())
    }

    /// Delete by slug. Succeeds whether or not the post existed.
    pub async fn remove(&self, slug: &str) -> Result<(), DomainError> {
        let slug = slug.to_lowercase();
        let existed = self.posts.delete_by_slug(&slug).await?;
        self.invalidate(&slug).await;

        if existed {
            tracing::info!(slug = %slug, "Post deleted");
        } else {
            tracing::debug!(slug = %slug, "Delete requested for missing post");
        }
        Ok(())
    }

    /// Fails with `Forbidden` unless `user_id` posted the post at `slug`.
    pub async fn ensure_owner(&self, slug: &str, user_id: Uuid) -> Result<(), DomainError> {
        let post = self.find(slug).await?;
        if post.posted_by != user_id {
            tracing::warn!(slug = %post.slug, user_id = %user_id, "Ownership check failed");
            return Err(DomainError::Forbidden(
                "You are not authorized to modify this post".to_string(),
            ));
        }
        Ok(())
    }

    pub async fn photo(&self, slug: &str) -> Result<Photo, DomainError> {
        let post = self.find(slug).await?;
        post.photo
            .ok_or_else(|| DomainError::not_found("Photo", post.slug))
    }

    pub async fn list(&self) -> Result<Vec<PostView>, DomainError> {
        let posts = self.posts.list_all().await?;
        self.populate(posts, Projection::Listing).await
    }

    /// A page of posts, newest first, plus every category and tag.
    pub async fn list_with_taxonomy(
        &self,
        limit: u64,
        skip: u64,
    ) -> Result<PostListing, DomainError> {
        if skip > MAX_SKIP {
            return Err(DomainError::Validation("Skip is out of range".to_string()));
        }
        let limit = limit.min(MAX_PAGE_LIMIT);
        let page = self.posts.list_page(skip, limit).await?;
        let posts = self.populate(page, Projection::Listing).await?;
        let categories = self.categories.find_all().await?;
        let tags = self.tags.find_all().await?;

        Ok(PostListing {
            size: posts.len(),
            posts,
            categories,
            tags,
        })
    }

    /// Single post by slug, served from the read cache when possible.
    pub async fn read(&self, slug: &str) -> Result<PostView, DomainError> {
        let slug = slug.to_lowercase();
        let key = cache_key(&slug);

        if let Some(cached) = self.cache.get(&key).await {
            match serde_json::from_str::<PostView>(&cached) {
                Ok(view) => return Ok(view),
                Err(e) => tracing::warn!(slug = %slug, error = %e, "Discarding unreadable cache entry"),
            }
        }

        let post = self.find(&slug).await?;
        let view = self
            .populate(vec![post], Projection::Full)
            .await?
            .pop()
            .ok_or_else(|| DomainError::not_found("Post", slug.as_str()))?;

        match serde_json::to_string(&view) {
            Ok(json) => {
                if let Err(e) = self
                    .cache
                    .set(&key, &json, Some(self.settings.read_cache_ttl))
                    .await
                {
                    tracing::warn!(slug = %slug, error = %e, "Failed to cache post");
                }
            }
            Err(e) => tracing::warn!(slug = %slug, error = %e, "Failed to serialize post view"),
        }

        Ok(view)
    }

    /// Posts sharing a category with `post_id`, never including it.
    pub async fn related(
        &self,
        post_id: Uuid,
        categories: &[Uuid],
        limit: u64,
    ) -> Result<Vec<PostView>, DomainError> {
        if categories.is_empty() || limit == 0 {
            return Ok(Vec::new());
        }
        let limit = limit.min(MAX_PAGE_LIMIT);
        let posts = self.posts.find_related(post_id, categories, limit).await?;
        self.populate(posts, Projection::Light).await
    }

    /// `None` when the term is blank: nothing is queried at all.
    pub async fn search(&self, term: &str) -> Result<Option<Vec<PostView>>, DomainError> {
        let term = term.trim();
        if term.is_empty() {
            tracing::debug!("Empty search term, skipping query");
            return Ok(None);
        }

        let posts = self.posts.search(term).await?;
        tracing::debug!(term = %term, count = posts.len(), "Search completed");
        self.populate(posts, Projection::Light).await.map(Some)
    }

    pub async fn list_by_user(&self, username: &str) -> Result<Vec<PostView>, DomainError> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| DomainError::not_found("User", username))?;

        let posts = self.posts.find_by_author(user.id).await?;
        self.populate(posts, Projection::Listing).await
    }

    async fn find(&self, slug: &str) -> Result<Post, DomainError> {
        let slug = slug.to_lowercase();
        self.posts
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| DomainError::not_found("Post", slug))
    }

    async fn invalidate(&self, slug: &str) {
        if let Err(e) = self.cache.delete(&cache_key(slug)).await {
            tracing::warn!(slug = %slug, error = %e, "Failed to invalidate cached post");
        }
    }

    /// Resolve category, tag and author references for a batch of posts.
    /// References that no longer resolve are dropped from the output.
    async fn populate(
        &self,
        posts: Vec<Post>,
        projection: Projection,
    ) -> Result<Vec<PostView>, DomainError> {
        if posts.is_empty() {
            return Ok(Vec::new());
        }

        let category_ids = distinct(posts.iter().flat_map(|p| p.categories.iter().copied()));
        let tag_ids = distinct(posts.iter().flat_map(|p| p.tags.iter().copied()));
        let user_ids = distinct(posts.iter().map(|p| p.posted_by));

        let categories: HashMap<Uuid, TaxonomySummary> = self
            .categories
            .find_by_ids(&category_ids)
            .await?
            .into_iter()
            .map(|c| (c.id, c.into()))
            .collect();
        let tags: HashMap<Uuid, TaxonomySummary> = self
            .tags
            .find_by_ids(&tag_ids)
            .await?
            .into_iter()
            .map(|t| (t.id, t.into()))
            .collect();
        let users: HashMap<Uuid, AuthorSummary> = self
            .users
            .find_by_ids(&user_ids)
            .await?
            .into_iter()
            .map(|u| (u.id, u.into()))
            .collect();

        let resolve = |ids: &[Uuid], table: &HashMap<Uuid, TaxonomySummary>| {
            ids.iter()
                .filter_map(|id| table.get(id).cloned())
                .collect::<Vec<_>>()
        };

        Ok(posts
            .iter()
            .map(|post| {
                PostView::project(
                    post,
                    projection,
                    resolve(&post.categories, &categories),
                    resolve(&post.tags, &tags),
                    users.get(&post.posted_by).cloned(),
                )
            })
            .collect())
    }
}

fn cache_key(slug: &str) -> String {
    format!("post:{slug}")
}

fn distinct(ids: impl Iterator<Item = Uuid>) -> Vec<Uuid> {
    let mut seen = HashSet::new();
    ids.filter(|id| seen.insert(*id)).collect()
}
