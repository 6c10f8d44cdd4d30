use chrono::Utc;
use quill_core::domain::Post;
use quill_core::ports::{CategoryRepository, PostRepository, UserRepository};
use quill_core::error::RepoError;
use sea_orm::{DatabaseBackend, DbErr, MockDatabase, MockExecResult, RuntimeErr};
use uuid::Uuid;

use crate::database::entity::{category, post, post_category, post_tag, user};
use crate::database::postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresUserRepository,
};

fn post_row(id: Uuid, slug: &str, posted_by: Uuid) -> post::Model {
    let now = Utc::now();
    post::Model {
        id,
        about: "Hello World".to_owned(),
        author: "Jane Doe".to_owned(),
        slug: slug.to_owned(),
        body: "Some body text for the post.".to_owned(),
        excerpt: "Some body text ...".to_owned(),
        meta_title: "Hello World | Quill".to_owned(),
        meta_description: "Some body text for the post.".to_owned(),
        photo_data: Some(vec![1, 2, 3]),
        photo_content_type: Some("image/png".to_owned()),
        source: None,
        verification: Some(true),
        posted_by,
        created_at: now.into(),
        updated_at: now.into(),
    }
}

#[tokio::test]
async fn find_by_slug_attaches_ordered_taxonomy() {
    let post_id = Uuid::new_v4();
    let user_id = Uuid::new_v4();
    let (c1, c2, t1) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());

    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![post_row(post_id, "hello-world", user_id)]])
        .append_query_results([vec![
            post_category::Model {
                post_id,
                category_id: c2,
                position: 0,
            },
            post_category::Model {
                post_id,
                category_id: c1,
                position: 1,
            },
        ]])
        .append_query_results([vec![post_tag::Model {
            post_id,
            tag_id: t1,
            position: 0,
        }]])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let found = repo.find_by_slug("Hello-World").await.unwrap().unwrap();

    assert_eq!(found.id, post_id);
    assert_eq!(found.categories, vec![c2, c1]);
    assert_eq!(found.tags, vec![t1]);
    assert_eq!(found.posted_by, user_id);
    let photo = found.photo.unwrap();
    assert_eq!(photo.content_type, "image/png");
}

#[tokio::test]
async fn find_by_slug_returns_none_without_loading_links() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([Vec::<post::Model>::new()])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.find_by_slug("missing").await.unwrap().is_none());
}

#[tokio::test]
async fn insert_writes_row_and_links_in_one_transaction() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 2,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let row = post_row(Uuid::new_v4(), "hello-world", Uuid::new_v4());
    let post: Post = row.into_domain(vec![Uuid::new_v4(), Uuid::new_v4()], vec![Uuid::new_v4()]);

    let saved = repo.insert(post.clone()).await.unwrap();
    assert_eq!(saved.slug, "hello-world");
    assert_eq!(saved.categories, post.categories);
}

#[tokio::test]
async fn insert_with_unknown_category_reports_the_reference() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 1,
        }])
        .append_exec_errors([DbErr::Exec(RuntimeErr::Internal(
            r#"insert or update on table "post_categories" violates foreign key constraint "fk_post_categories_target""#
                .to_owned(),
        ))])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = post_row(Uuid::new_v4(), "hello-world", Uuid::new_v4())
        .into_domain(vec![Uuid::new_v4()], vec![]);

    let err = repo.insert(post).await.unwrap_err();
    assert!(matches!(err, RepoError::Reference(ref target) if target == "category"));
}

#[tokio::test]
async fn update_of_vanished_row_is_not_found() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([MockExecResult {
            last_insert_id: 0,
            rows_affected: 0,
        }])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    let post = post_row(Uuid::new_v4(), "gone", Uuid::new_v4()).into_domain(vec![], vec![]);

    let err = repo.update(post).await.unwrap_err();
    assert!(matches!(err, RepoError::NotFound));
}

#[tokio::test]
async fn delete_reports_whether_a_row_went_away() {
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_exec_results([
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 1,
            },
            MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            },
        ])
        .into_connection();

    let repo = PostgresPostRepository::new(db);
    assert!(repo.delete_by_slug("hello-world").await.unwrap());
    assert!(!repo.delete_by_slug("hello-world").await.unwrap());
}

#[tokio::test]
async fn related_without_categories_skips_the_query() {
    // No results are queued, so any query would fail.
    let db = MockDatabase::new(DatabaseBackend::Postgres).into_connection();
    let repo = PostgresPostRepository::new(db);

    let related = repo.find_related(Uuid::new_v4(), &[], 3).await.unwrap();
    assert!(related.is_empty());
}

#[tokio::test]
async fn category_lookup_by_ids() {
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![category::Model {
            id,
            name: "Rust".to_owned(),
            slug: "rust".to_owned(),
        }]])
        .into_connection();

    let repo = PostgresCategoryRepository::new(db);
    let found = repo.find_by_ids(&[id]).await.unwrap();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].slug, "rust");
}

#[tokio::test]
async fn user_lookup_by_username() {
    let now = Utc::now();
    let id = Uuid::new_v4();
    let db = MockDatabase::new(DatabaseBackend::Postgres)
        .append_query_results([vec![user::Model {
            id,
            username: "jane".to_owned(),
            name: "Jane Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            role: "user".to_owned(),
            created_at: now.into(),
            updated_at: now.into(),
        }]])
        .into_connection();

    let repo = PostgresUserRepository::new(db);
    let user = repo.find_by_username("jane").await.unwrap().unwrap();
    assert_eq!(user.id, id);
    assert_eq!(user.name, "Jane Doe");
}
