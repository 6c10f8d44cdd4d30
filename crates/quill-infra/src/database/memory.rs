//! In-memory store - used when no database is configured, and in tests.
//!
//! Implements every storage port over a single `RwLock`, so each write is
//! atomic with respect to readers just like a database transaction.

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use quill_core::domain::{Category, Post, Tag, User};
use quill_core::error::RepoError;
use quill_core::ports::{
    BaseRepository, CategoryRepository, PostRepository, TagRepository, UserRepository,
};

#[derive(Default)]
struct Tables {
    posts: Vec<Post>,
    categories: Vec<Category>,
    tags: Vec<Tag>,
    users: Vec<User>,
}

/// Process-local implementation of all repositories. Data is lost on restart.
#[derive(Default)]
pub struct InMemoryStore {
    tables: RwLock<Tables>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_category(&self, category: Category) {
        self.tables.write().await.categories.push(category);
    }

    pub async fn add_tag(&self, tag: Tag) {
        self.tables.write().await.tags.push(tag);
    }

    pub async fn add_user(&self, user: User) {
        self.tables.write().await.users.push(user);
    }

    pub async fn post_count(&self) -> usize {
        self.tables.read().await.posts.len()
    }
}

impl Tables {
    /// Same checks the database enforces through foreign keys.
    fn check_references(&self, post: &Post) -> Result<(), RepoError> {
        if !self.users.iter().any(|u| u.id == post.posted_by) {
            return Err(RepoError::Reference("user".to_string()));
        }
        if !post
            .categories
            .iter()
            .all(|id| self.categories.iter().any(|c| c.id == *id))
        {
            return Err(RepoError::Reference("category".to_string()));
        }
        if !post
            .tags
            .iter()
            .all(|id| self.tags.iter().any(|t| t.id == *id))
        {
            return Err(RepoError::Reference("tag".to_string()));
        }
        Ok(())
    }
}

/// Newest first; posts created in the same instant keep reverse insertion order.
fn newest_first<'a>(posts: impl DoubleEndedIterator<Item = &'a Post>) -> Vec<Post> {
    let mut sorted: Vec<Post> = posts.rev().cloned().collect();
    sorted.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    sorted
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables.posts.iter().any(|p| p.slug == post.slug) {
            return Err(RepoError::Constraint("slug".to_string()));
        }
        if tables.posts.iter().any(|p| p.id == post.id) {
            return Err(RepoError::Constraint("id".to_string()));
        }
        tables.check_references(&post)?;
        tables.posts.push(post.clone());
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let mut tables = self.tables.write().await;
        if tables
            .posts
            .iter()
            .any(|p| p.slug == post.slug && p.id != post.id)
        {
            return Err(RepoError::Constraint("slug".to_string()));
        }
        tables.check_references(&post)?;
        let stored = tables
            .posts
            .iter_mut()
            .find(|p| p.id == post.id)
            .ok_or(RepoError::NotFound)?;
        *stored = post.clone();
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let slug = slug.to_lowercase();
        let tables = self.tables.read().await;
        Ok(tables.posts.iter().find(|p| p.slug == slug).cloned())
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, RepoError> {
        let slug = slug.to_lowercase();
        let mut tables = self.tables.write().await;
        let before = tables.posts.len();
        tables.posts.retain(|p| p.slug != slug);
        Ok(tables.posts.len() != before)
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        Ok(self.tables.read().await.posts.clone())
    }

    async fn list_page(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(newest_first(tables.posts.iter())
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn find_related(
        &self,
        exclude: Uuid,
        categories: &[Uuid],
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        let matching = tables
            .posts
            .iter()
            .filter(|p| p.id != exclude && p.shares_category(categories));
        Ok(newest_first(matching)
            .into_iter()
            .take(limit as usize)
            .collect())
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, RepoError> {
        let needle = term.to_lowercase();
        let tables = self.tables.read().await;
        let matching = tables.posts.iter().filter(|p| {
            p.about.to_lowercase().contains(&needle) || p.body.to_lowercase().contains(&needle)
        });
        Ok(newest_first(matching))
    }

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .posts
            .iter()
            .filter(|p| p.posted_by == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Category, Uuid> for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Category>, RepoError> {
        Ok(self.tables.read().await.categories.clone())
    }
}

#[async_trait]
impl CategoryRepository for InMemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .categories
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<Tag, Uuid> for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<Tag>, RepoError> {
        Ok(self.tables.read().await.tags.clone())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .tags
            .iter()
            .filter(|t| ids.contains(&t.id))
            .cloned()
            .collect())
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_all(&self) -> Result<Vec<User>, RepoError> {
        Ok(self.tables.read().await.users.clone())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let tables = self.tables.read().await;
        Ok(tables.users.iter().find(|u| u.username == username).cloned())
    }
}
