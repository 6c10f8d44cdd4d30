//! The post lifecycle pipeline.
//!
//! Submissions flow through the validator, the field deriver and the media
//! attacher before a single repository write. [`PostService`] ties the steps
//! together and also serves the read-side queries.

pub mod derive;
pub mod media;
pub mod validator;

mod service;
mod settings;
mod submission;

pub use service::{DEFAULT_PAGE_LIMIT, DEFAULT_RELATED_LIMIT, MAX_PAGE_LIMIT, PostService};
pub use settings::{DEFAULT_MAX_PHOTO_BYTES, EXCERPT_MAX_CHARS, PostSettings};
pub use submission::{PhotoUpload, PostSubmission};
