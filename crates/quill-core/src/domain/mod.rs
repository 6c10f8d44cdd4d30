//! Domain entities - the core business objects.

mod post;
mod taxonomy;
mod user;
mod view;

pub use post::{Photo, Post};
pub use taxonomy::{Category, Tag};
pub use user::User;
pub use view::{AuthorSummary, PostListing, PostView, Projection, TaxonomySummary};
