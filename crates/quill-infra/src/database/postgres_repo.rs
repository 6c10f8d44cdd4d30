//! PostgreSQL repository implementations.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, Func, LikeExpr, Query};
use sea_orm::{
    ColumnTrait, Condition, ConnectionTrait, DbConn, EntityTrait, QueryFilter, QueryOrder,
    QuerySelect, Set, TransactionTrait,
};
use uuid::Uuid;

use quill_core::domain::{Category, Post, Tag, User};
use quill_core::error::RepoError;
use quill_core::ports::{CategoryRepository, PostRepository, TagRepository, UserRepository};

use super::entity::category::{self, Entity as CategoryEntity};
use super::entity::post::{self, Entity as PostEntity};
use super::entity::post_category::{self, Entity as PostCategoryEntity};
use super::entity::post_tag::{self, Entity as PostTagEntity};
use super::entity::tag::{self, Entity as TagEntity};
use super::entity::user::{self, Entity as UserEntity};
use super::errors::{read_error, write_error};
use super::postgres_base::PostgresBaseRepository;

/// PostgreSQL category repository.
pub type PostgresCategoryRepository = PostgresBaseRepository<CategoryEntity>;

/// PostgreSQL tag repository.
pub type PostgresTagRepository = PostgresBaseRepository<TagEntity>;

/// PostgreSQL user repository.
pub type PostgresUserRepository = PostgresBaseRepository<UserEntity>;

#[async_trait]
impl CategoryRepository for PostgresCategoryRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Category>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = CategoryEntity::find()
            .filter(category::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(read_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl TagRepository for PostgresTagRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<Tag>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = TagEntity::find()
            .filter(tag::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(read_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn find_by_ids(&self, ids: &[Uuid]) -> Result<Vec<User>, RepoError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = UserEntity::find()
            .filter(user::Column::Id.is_in(ids.iter().copied()))
            .all(&self.db)
            .await
            .map_err(read_error)?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        tracing::debug!(username = %username, "Finding user by username");

        let result = UserEntity::find()
            .filter(user::Column::Username.eq(username))
            .one(&self.db)
            .await
            .map_err(read_error)?;

        Ok(result.map(Into::into))
    }
}

/// PostgreSQL post repository. Taxonomy lives in the `post_categories` and
/// `post_tags` join tables and is written in the same transaction as the row.
pub struct PostgresPostRepository {
    db: DbConn,
}

impl PostgresPostRepository {
    pub fn new(db: DbConn) -> Self {
        Self { db }
    }

    /// Attach the ordered category and tag ids to loaded rows.
    async fn hydrate(&self, rows: Vec<post::Model>) -> Result<Vec<Post>, RepoError> {
        if rows.is_empty() {
            return Ok(Vec::new());
        }
        let ids: Vec<Uuid> = rows.iter().map(|row| row.id).collect();

        let category_links = PostCategoryEntity::find()
            .filter(post_category::Column::PostId.is_in(ids.clone()))
            .order_by_asc(post_category::Column::Position)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        let tag_links = PostTagEntity::find()
            .filter(post_tag::Column::PostId.is_in(ids))
            .order_by_asc(post_tag::Column::Position)
            .all(&self.db)
            .await
            .map_err(read_error)?;

        let mut categories: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in category_links {
            categories.entry(link.post_id).or_default().push(link.category_id);
        }
        let mut tags: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for link in tag_links {
            tags.entry(link.post_id).or_default().push(link.tag_id);
        }

        Ok(rows
            .into_iter()
            .map(|row| {
                let post_categories = categories.remove(&row.id).unwrap_or_default();
                let post_tags = tags.remove(&row.id).unwrap_or_default();
                row.into_domain(post_categories, post_tags)
            })
            .collect())
    }

    async fn write_links<C>(conn: &C, post: &Post) -> Result<(), RepoError>
    where
        C: ConnectionTrait,
    {
        if !post.categories.is_empty() {
            let rows = post
                .categories
                .iter()
                .enumerate()
                .map(|(position, id)| post_category::ActiveModel {
                    post_id: Set(post.id),
                    category_id: Set(*id),
                    position: Set(position as i32),
                });
            PostCategoryEntity::insert_many(rows)
                .exec_without_returning(conn)
                .await
                .map_err(write_error)?;
        }

        if !post.tags.is_empty() {
            let rows = post
                .tags
                .iter()
                .enumerate()
                .map(|(position, id)| post_tag::ActiveModel {
                    post_id: Set(post.id),
                    tag_id: Set(*id),
                    position: Set(position as i32),
                });
            PostTagEntity::insert_many(rows)
                .exec_without_returning(conn)
                .await
                .map_err(write_error)?;
        }

        Ok(())
    }
}

/// Escape LIKE wildcards so the term matches literally.
fn like_pattern(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(read_error)?;

        PostEntity::insert(post::ActiveModel::from(&post))
            .exec_without_returning(&txn)
            .await
            .map_err(write_error)?;
        Self::write_links(&txn, &post).await?;

        txn.commit().await.map_err(write_error)?;
        tracing::debug!(post_id = %post.id, "Post row and taxonomy inserted");
        Ok(post)
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        let txn = self.db.begin().await.map_err(read_error)?;

        let result = PostEntity::update_many()
            .set(post::ActiveModel::from(&post))
            .filter(post::Column::Id.eq(post.id))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        if result.rows_affected == 0 {
            return Err(RepoError::NotFound);
        }

        PostCategoryEntity::delete_many()
            .filter(post_category::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        PostTagEntity::delete_many()
            .filter(post_tag::Column::PostId.eq(post.id))
            .exec(&txn)
            .await
            .map_err(write_error)?;
        Self::write_links(&txn, &post).await?;

        txn.commit().await.map_err(write_error)?;
        Ok(post)
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        let row = PostEntity::find()
            .filter(post::Column::Slug.eq(slug.to_lowercase()))
            .one(&self.db)
            .await
            .map_err(read_error)?;

        match row {
            Some(row) => Ok(self.hydrate(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, RepoError> {
        // Join rows go with the post via ON DELETE CASCADE.
        let result = PostEntity::delete_many()
            .filter(post::Column::Slug.eq(slug.to_lowercase()))
            .exec(&self.db)
            .await
            .map_err(write_error)?;
        Ok(result.rows_affected > 0)
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_asc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        self.hydrate(rows).await
    }

    async fn list_page(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .order_by_desc(post::Column::CreatedAt)
            .offset(skip)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        self.hydrate(rows).await
    }

    async fn find_related(
        &self,
        exclude: Uuid,
        categories: &[Uuid],
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        if categories.is_empty() {
            return Ok(Vec::new());
        }

        let sharing = Query::select()
            .column(post_category::Column::PostId)
            .from(PostCategoryEntity)
            .and_where(post_category::Column::CategoryId.is_in(categories.iter().copied()))
            .to_owned();

        let rows = PostEntity::find()
            .filter(post::Column::Id.ne(exclude))
            .filter(post::Column::Id.in_subquery(sharing))
            .order_by_desc(post::Column::CreatedAt)
            .limit(limit)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        self.hydrate(rows).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, RepoError> {
        let pattern = like_pattern(term);
        let matches = |column: post::Column| {
            Expr::expr(Func::lower(Expr::col(column)))
                .like(LikeExpr::new(pattern.clone()).escape('\\'))
        };

        let rows = PostEntity::find()
            .filter(
                Condition::any()
                    .add(matches(post::Column::About))
                    .add(matches(post::Column::Body)),
            )
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        self.hydrate(rows).await
    }

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        let rows = PostEntity::find()
            .filter(post::Column::PostedBy.eq(user_id))
            .order_by_desc(post::Column::CreatedAt)
            .all(&self.db)
            .await
            .map_err(read_error)?;
        self.hydrate(rows).await
    }
}

#[cfg(test)]
mod tests {
    use super::like_pattern;

    #[test]
    fn like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("Rust"), "%rust%");
        assert_eq!(like_pattern("100%_done"), r"%100\%\_done%");
    }
}
