use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use uuid::Uuid;

use quill_core::DomainError;
use quill_core::domain::{Category, Post, Tag, User};
use quill_core::error::RepoError;
use quill_core::ports::{Cache, PostRepository};
use quill_core::posts::{MAX_PAGE_LIMIT, PhotoUpload, PostService, PostSettings, PostSubmission};

use crate::cache::InMemoryCache;
use crate::database::InMemoryStore;

struct Fixture {
    store: Arc<InMemoryStore>,
    cache: Arc<InMemoryCache>,
    service: PostService,
    user: User,
    rust: Category,
    web: Category,
    tag: Tag,
}

async fn fixture() -> Fixture {
    let store = Arc::new(InMemoryStore::new());
    let cache = Arc::new(InMemoryCache::new());

    let user = User::new(
        "jane".to_string(),
        "Jane Doe".to_string(),
        "jane@example.com".to_string(),
        "user".to_string(),
    );
    let rust = Category {
        id: Uuid::new_v4(),
        name: "Rust".to_string(),
        slug: "rust".to_string(),
    };
    let web = Category {
        id: Uuid::new_v4(),
        name: "Web".to_string(),
        slug: "web".to_string(),
    };
    let tag = Tag {
        id: Uuid::new_v4(),
        name: "async".to_string(),
        slug: "async".to_string(),
    };
    store.add_user(user.clone()).await;
    store.add_category(rust.clone()).await;
    store.add_category(web.clone()).await;
    store.add_tag(tag.clone()).await;

    let service = PostService::new(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        cache.clone(),
        PostSettings::default(),
    );

    Fixture {
        store,
        cache,
        service,
        user,
        rust,
        web,
        tag,
    }
}

fn submission(about: &str, categories: Vec<Uuid>, tag: Uuid) -> PostSubmission {
    PostSubmission {
        about: Some(about.to_string()),
        author: Some("Jane Doe".to_string()),
        body: Some("<p>An introduction to the topic at hand, with more words.</p>".to_string()),
        categories: Some(categories),
        tags: Some(vec![tag]),
        ..Default::default()
    }
}

#[tokio::test]
async fn create_derives_slug_excerpt_and_meta() {
    let f = fixture().await;

    let post = f
        .service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    assert_eq!(post.slug, "hello-world");
    assert_eq!(post.meta_title, "Hello World | Quill");
    assert!(!post.excerpt.contains('<'));
    assert_eq!(post.posted_by, f.user.id);

    let view = f.service.read("hello-world").await.unwrap();
    assert_eq!(view.about, "Hello World");
    assert_eq!(view.author, "Jane Doe");
    assert_eq!(
        view.body.as_deref(),
        Some("<p>An introduction to the topic at hand, with more words.</p>")
    );
    assert_eq!(view.categories[0].slug, "rust");
    assert_eq!(view.posted_by.unwrap().username, "jane");
}

#[tokio::test]
async fn invalid_submission_persists_nothing() {
    let f = fixture().await;
    let mut s = submission("Hello World", vec![f.rust.id], f.tag.id);
    s.body = Some("short".to_string());

    let err = f.service.create(s, f.user.id).await.unwrap_err();

    assert!(matches!(err, DomainError::Validation(ref m) if m == "Content is too short"));
    assert_eq!(f.store.post_count().await, 0);
}

#[tokio::test]
async fn duplicate_slug_is_reported_by_field() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    let err = f
        .service
        .create(submission("hello   world!", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "slug already exists");
    assert_eq!(f.store.post_count().await, 1);
}

#[tokio::test]
async fn oversized_photo_is_rejected_before_storage() {
    let f = fixture().await;
    let mut s = submission("With Photo", vec![f.rust.id], f.tag.id);
    s.photo = Some(PhotoUpload {
        data: vec![0u8; 16],
        content_type: Some("image/jpeg".to_string()),
        size: 10_000_001,
    });

    let err = f.service.create(s, f.user.id).await.unwrap_err();

    assert!(matches!(err, DomainError::PayloadTooLarge { .. }));
    assert_eq!(f.store.post_count().await, 0);
}

#[tokio::test]
async fn photo_is_served_with_its_content_type() {
    let f = fixture().await;
    let mut s = submission("With Photo", vec![f.rust.id], f.tag.id);
    s.photo = Some(PhotoUpload::new(
        vec![0xFF, 0xD8],
        Some("image/jpeg".to_string()),
    ));
    f.service.create(s, f.user.id).await.unwrap();

    let photo = f.service.photo("with-photo").await.unwrap();
    assert_eq!(photo.content_type, "image/jpeg");
    assert_eq!(photo.data, vec![0xFF, 0xD8]);

    f.service
        .create(submission("No Photo", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();
    let err = f.service.photo("no-photo").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn update_keeps_slug_and_replaces_taxonomy() {
    let f = fixture().await;
    let created = f
        .service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    let updated = f
        .service
        .update(
            "hello-world",
            PostSubmission {
                about: Some("A Completely New Title".to_string()),
                categories: Some(vec![f.web.id]),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert_eq!(updated.slug, "hello-world");
    assert_eq!(updated.id, created.id);
    assert_eq!(updated.created_at, created.created_at);
    assert_eq!(updated.meta_title, "A Completely New Title | Quill");
    assert_eq!(updated.categories, vec![f.web.id]);
    assert_eq!(updated.tags, vec![f.tag.id]);
    assert_eq!(updated.body, created.body);
}

#[tokio::test]
async fn update_with_new_body_recomputes_excerpt() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    let body = "lorem ipsum ".repeat(50);
    let updated = f
        .service
        .update(
            "hello-world",
            PostSubmission {
                body: Some(body),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    assert!(updated.excerpt.ends_with(" ..."));
    assert!(updated.excerpt.chars().count() <= 320 + 4);
    assert!(updated.meta_description.chars().count() <= 160);
}

#[tokio::test]
async fn update_of_missing_post_is_not_found() {
    let f = fixture().await;
    let err = f
        .service
        .update("missing", PostSubmission::default())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::NotFound { .. }));
}

#[tokio::test]
async fn update_invalidates_cached_read() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    f.service.read("hello-world").await.unwrap();
    assert!(f.cache.get("post:hello-world").await.is_some());

    f.service
        .update(
            "hello-world",
            PostSubmission {
                author: Some("Someone Else".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert!(f.cache.get("post:hello-world").await.is_none());

    let view = f.service.read("hello-world").await.unwrap();
    assert_eq!(view.author, "Someone Else");
}

#[tokio::test]
async fn delete_is_idempotent_and_clears_cache() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();
    f.service.read("hello-world").await.unwrap();

    f.service.remove("Hello-World").await.unwrap();
    f.service.remove("hello-world").await.unwrap();

    assert_eq!(f.store.post_count().await, 0);
    assert!(f.cache.get("post:hello-world").await.is_none());
    assert!(matches!(
        f.service.read("hello-world").await.unwrap_err(),
        DomainError::NotFound { .. }
    ));
}

#[tokio::test]
async fn related_excludes_the_post_itself() {
    let f = fixture().await;
    let a = f
        .service
        .create(submission("Post A", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();
    let b = f
        .service
        .create(
            submission("Post B", vec![f.rust.id, f.web.id], f.tag.id),
            f.user.id,
        )
        .await
        .unwrap();

    let for_a = f.service.related(a.id, &a.categories, 3).await.unwrap();
    assert_eq!(for_a.len(), 1);
    assert_eq!(for_a[0].id, b.id);
    assert!(for_a[0].body.is_none());

    let for_b = f.service.related(b.id, &b.categories, 3).await.unwrap();
    assert_eq!(for_b.len(), 1);
    assert_eq!(for_b[0].id, a.id);

    assert!(f.service.related(a.id, &[], 3).await.unwrap().is_empty());
}

#[tokio::test]
async fn listing_is_newest_first_with_full_taxonomy() {
    let f = fixture().await;
    for title in ["First Post", "Second Post", "Third Post"] {
        f.service
            .create(submission(title, vec![f.rust.id], f.tag.id), f.user.id)
            .await
            .unwrap();
    }

    let page = f.service.list_with_taxonomy(2, 0).await.unwrap();
    assert_eq!(page.size, 2);
    assert_eq!(page.posts[0].slug, "third-post");
    assert_eq!(page.posts[1].slug, "second-post");
    assert_eq!(page.categories.len(), 2);
    assert_eq!(page.tags.len(), 1);
    assert!(page.posts[0].meta_title.is_none());

    let rest = f.service.list_with_taxonomy(10, 2).await.unwrap();
    assert_eq!(rest.size, 1);
    assert_eq!(rest.posts[0].slug, "first-post");
}

#[tokio::test]
async fn listing_bounds_are_enforced() {
    let f = fixture().await;
    for i in 0..(MAX_PAGE_LIMIT + 5) {
        f.service
            .create(
                submission(&format!("Post number {i}"), vec![f.rust.id], f.tag.id),
                f.user.id,
            )
            .await
            .unwrap();
    }

    let page = f.service.list_with_taxonomy(u64::MAX, 0).await.unwrap();
    assert_eq!(page.size as u64, MAX_PAGE_LIMIT);

    let err = f
        .service
        .list_with_taxonomy(10, i64::MAX as u64 + 1)
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Validation(ref m) if m == "Skip is out of range"));

    let empty = f
        .service
        .list_with_taxonomy(10, i64::MAX as u64)
        .await
        .unwrap();
    assert_eq!(empty.size, 0);

    let related = f
        .service
        .related(Uuid::new_v4(), &[f.rust.id], u64::MAX)
        .await
        .unwrap();
    assert_eq!(related.len() as u64, MAX_PAGE_LIMIT);
}

#[tokio::test]
async fn listing_by_unknown_user_is_not_found() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    let posts = f.service.list_by_user("jane").await.unwrap();
    assert_eq!(posts.len(), 1);

    let err = f.service.list_by_user("nobody").await.unwrap_err();
    assert!(matches!(err, DomainError::NotFound { entity_type: "User", .. }));
}

#[tokio::test]
async fn only_the_poster_owns_a_post() {
    let f = fixture().await;
    f.service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    f.service
        .ensure_owner("hello-world", f.user.id)
        .await
        .unwrap();
    let err = f
        .service
        .ensure_owner("hello-world", Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Forbidden(_)));
}

#[tokio::test]
async fn unknown_references_are_rejected_before_storage() {
    let f = fixture().await;

    let err = f
        .service
        .create(
            submission("Hello World", vec![Uuid::new_v4(), f.rust.id], f.tag.id),
            f.user.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence(ref m) if m == "Unknown category reference"));

    let err = f
        .service
        .create(
            submission("Hello World", vec![f.rust.id], Uuid::new_v4()),
            f.user.id,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence(ref m) if m == "Unknown tag reference"));

    let err = f
        .service
        .create(submission("Hello World", vec![f.rust.id], f.tag.id), Uuid::new_v4())
        .await
        .unwrap_err();
    assert!(matches!(err, DomainError::Persistence(ref m) if m == "Unknown user reference"));

    assert_eq!(f.store.post_count().await, 0);
}

/// Post store that counts search calls.
struct CountingSearch {
    inner: Arc<InMemoryStore>,
    searches: AtomicUsize,
}

#[async_trait]
impl PostRepository for CountingSearch {
    async fn insert(&self, post: Post) -> Result<Post, RepoError> {
        self.inner.insert(post).await
    }

    async fn update(&self, post: Post) -> Result<Post, RepoError> {
        self.inner.update(post).await
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Post>, RepoError> {
        self.inner.find_by_slug(slug).await
    }

    async fn delete_by_slug(&self, slug: &str) -> Result<bool, RepoError> {
        self.inner.delete_by_slug(slug).await
    }

    async fn list_all(&self) -> Result<Vec<Post>, RepoError> {
        self.inner.list_all().await
    }

    async fn list_page(&self, skip: u64, limit: u64) -> Result<Vec<Post>, RepoError> {
        self.inner.list_page(skip, limit).await
    }

    async fn find_related(
        &self,
        exclude: Uuid,
        categories: &[Uuid],
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        self.inner.find_related(exclude, categories, limit).await
    }

    async fn search(&self, term: &str) -> Result<Vec<Post>, RepoError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.inner.search(term).await
    }

    async fn find_by_author(&self, user_id: Uuid) -> Result<Vec<Post>, RepoError> {
        self.inner.find_by_author(user_id).await
    }
}

#[tokio::test]
async fn blank_search_never_reaches_the_store() {
    let f = fixture().await;
    let posts = Arc::new(CountingSearch {
        inner: f.store.clone(),
        searches: AtomicUsize::new(0),
    });
    let service = PostService::new(
        posts.clone(),
        f.store.clone(),
        f.store.clone(),
        f.store.clone(),
        f.cache.clone(),
        PostSettings::default(),
    );
    service
        .create(submission("Async Rust", vec![f.rust.id], f.tag.id), f.user.id)
        .await
        .unwrap();

    assert!(service.search("   ").await.unwrap().is_none());
    assert_eq!(posts.searches.load(Ordering::SeqCst), 0);

    let hits = service.search("ASYNC").await.unwrap().unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(posts.searches.load(Ordering::SeqCst), 1);

    let misses = service.search("python").await.unwrap().unwrap();
    assert!(misses.is_empty());
}
