use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{Category, Post, Tag, User};
use crate::error::RepoError;

/// Generic read access shared by every entity store.
#[async_trait]
pub trait BaseRepository<T, ID>: Send + Sync {
    /// Load every entity of this kind.
    async fn find_all(&self) -> Result<Vec<T>, RepoError>;
}

/// Category lookups used to populate posts.
#[async_trait]
pub trait CategoryRepository: BaseRepository<Category, Uuid> {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError>;
}

/// Tag lookups used to populate posts.
#[async_trait]
pub trait TagRepository: BaseRepository<Tag, Uuid> {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError>;
}

/// User lookups: author population and username resolution.
#[async_trait]
pub trait UserRepository: BaseRepository<User, Uuid> {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError>;

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError>;
}

/// Post persistence.
///
/// `insert` and `update` write the post together with its category and tag
/// references as one atomic unit. Slug lookups are case-insensitive.
#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Persist a new post. A taken slug fails with `RepoError::Constraint("slug")`.
    async fn insert(&self, post: Post) -> Result<Post, RepoError>;

    /// Overwrite a stored post, replacing its category and tag sets.
    async fn update(&self, post: Post) -> Result<Post, RepoError>;

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError>;

    /// Returns whether a post was actually removed.
    async fn delete_by_slug(&self, slug: &str) -> Result<bool, RepoError>;

    async fn list_all(&self) -> Result<Vec<Post>, RepoError>;

    /// Newest first.
    async fn list_page(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError>;

    /// Posts sharing at least one of `categories`, never including `exclude`.
    async fn find_related(
        &self,
        exclude: Uuid,
        categories: &[Uuid],
        limit: u64,
    ) -> Result<Vec<Post>, RepoError>;

    /// Case-insensitive literal substring match on `about` or `body`.
    async fn search(&self, term: &str) -> Result<Vec<Post>, RepoError>;

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError>;
}
