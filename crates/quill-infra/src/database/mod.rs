//! Storage: PostgreSQL via SeaORM, plus the in-memory fallback.

mod connections;
mod memory;

#[cfg(feature = "postgres")]
mod errors;
#[cfg(feature = "postgres")]
mod postgres_base;
#[cfg(feature = "postgres")]
pub mod postgres_repo;

#[cfg(feature = "postgres")]
pub mod entity;

pub use connections::DatabaseConfig;
pub use memory::InMemoryStore;

#[cfg(feature = "postgres")]
pub use connections::DatabasePool;
#[cfg(feature = "postgres")]
pub use postgres_repo::{
    PostgresCategoryRepository, PostgresPostRepository, PostgresTagRepository,
    PostgresUserRepository,
};

#[cfg(test)]
mod pipeline_tests;

#[cfg(all(test, feature = "postgres"))]
mod tests;
