use std::time::Duration;

use super::derive;

/// Hard ceiling for a stored excerpt, ellipsis included.
pub const EXCERPT_MAX_CHARS: usize = 1000;

pub const DEFAULT_MAX_PHOTO_BYTES: usize = 10_000_000;

/// Deployment-wide knobs of the pipeline.
///
/// Passed explicitly into [`super::PostService`]; nothing here is read from
/// the process environment.
#[derive(Debug, Clone)]
pub struct PostSettings {
    /// Appended to every meta title.
    pub site_name: String,
    /// Excerpt budget when a post is created.
    pub create_excerpt_len: usize,
    /// Excerpt budget when an update resupplies the body.
    pub update_excerpt_len: usize,
    pub excerpt_boundary: String,
    pub excerpt_ellipsis: String,
    pub meta_description_len: usize,
    pub max_photo_bytes: usize,
    pub read_cache_ttl: Duration,
}

impl Default for PostSettings {
    fn default() -> Self {
        Self {
            site_name: "Quill".to_string(),
            create_excerpt_len: 100,
            update_excerpt_len: 320,
            excerpt_boundary: " ".to_string(),
            excerpt_ellipsis: " ...".to_string(),
            meta_description_len: 160,
            max_photo_bytes: DEFAULT_MAX_PHOTO_BYTES,
            read_cache_ttl: Duration::from_secs(300),
        }
    }
}

impl PostSettings {
    pub fn with_site_name(mut self, site_name: impl Into<String>) -> Self {
        self.site_name = site_name.into();
        self
    }

    pub(crate) fn excerpt(&self, body: &str, budget: usize) -> String {
        let ceiling = EXCERPT_MAX_CHARS.saturating_sub(self.excerpt_ellipsis.chars().count());
        derive::excerpt(
            &derive::strip_html(body),
            budget.min(ceiling),
            &self.excerpt_boundary,
            &self.excerpt_ellipsis,
        )
    }

    pub(crate) fn meta_title(&self, about: &str) -> String {
        derive::meta_title(about, &self.site_name)
    }

    pub(crate) fn meta_description(&self, body: &str) -> String {
        derive::meta_description(body, self.meta_description_len)
    }
}
