//! # Quill Core
//!
//! The domain layer of the Quill blogging backend.
//! Entities, read models, storage ports and the post lifecycle pipeline
//! live here, with no infrastructure dependencies.

pub mod domain;
pub mod error;
pub mod ports;
pub mod posts;

pub use error::DomainError;
