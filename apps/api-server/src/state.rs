//! Application state - shared across all handlers.

use std::sync::Arc;

use quill_core::ports::{Cache, TokenService};
use quill_core::posts::{PostService, PostSettings};
use quill_infra::{InMemoryCache, InMemoryStore, JwtTokenService};

use crate::config::AppConfig;

#[cfg(feature = "postgres")]
use quill_infra::database::{
    DatabasePool, PostgresCategoryRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<PostService>,
    pub tokens: Arc<dyn TokenService>,
    /// `"postgres"` or `"memory"`, reported by the health check.
    pub storage: &'static str,
}

impl AppState {
    /// Wire the post service onto PostgreSQL when it is configured and
    /// reachable, otherwise onto the in-memory store.
    pub async fn new(config: &AppConfig) -> Self {
        let tokens: Arc<dyn TokenService> = Arc::new(JwtTokenService::new(config.jwt.clone()));
        let cache: Arc<dyn Cache> = Arc::new(InMemoryCache::new());

        #[cfg(feature = "postgres")]
        if let Some(db_config) = &config.database {
            match DatabasePool::init(db_config).await {
                Ok(pool) => {
                    let posts = PostService::new(
                        Arc::new(PostgresPostRepository::new(pool.conn.clone())),
                        Arc::new(PostgresCategoryRepository::new(pool.conn.clone())),
                        Arc::new(PostgresTagRepository::new(pool.conn.clone())),
                        Arc::new(PostgresUserRepository::new(pool.conn)),
                        cache,
                        config.posts.clone(),
                    );
                    tracing::info!("Application state initialized on PostgreSQL");
                    return Self {
                        posts: Arc::new(posts),
                        tokens,
                        storage: "postgres",
                    };
                }
                Err(e) => {
                    tracing::error!(error = %e, "Failed to connect to database, using in-memory store");
                }
            }
        } else {
            tracing::warn!("DATABASE_URL not set. Running on the in-memory store.");
        }

        #[cfg(not(feature = "postgres"))]
        tracing::info!("Built without the postgres feature, using the in-memory store");

        Self::in_memory(
            Arc::new(InMemoryStore::new()),
            cache,
            config.posts.clone(),
            tokens,
        )
    }

    pub fn in_memory(
        store: Arc<InMemoryStore>,
        cache: Arc<dyn Cache>,
        settings: PostSettings,
        tokens: Arc<dyn TokenService>,
    ) -> Self {
        let posts = PostService::new(
            store.clone(),
            store.clone(),
            store.clone(),
            store,
            cache,
            settings,
        );

        Self {
            posts: Arc::new(posts),
            tokens,
            storage: "memory",
        }
    }
}
