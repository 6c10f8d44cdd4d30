//! Post validator: structural checks on incoming submissions.
//!
//! Only presence and length are checked; category and tag ids are not
//! resolved here.

use std::collections::HashSet;

use uuid::Uuid;

use crate::error::DomainError;

use super::{PhotoUpload, PostSubmission};

const TEXT_MIN_CHARS: usize = 3;
const TEXT_MAX_CHARS: usize = 160;
const BODY_MIN_CHARS: usize = 10;

/// A submission that satisfies every create-time rule.
#[derive(Debug, Clone)]
pub struct NewPostFields {
    pub about: String,
    pub author: String,
    pub body: String,
    pub categories: Vec<Uuid>,
    pub tags: Vec<Uuid>,
    pub source: Option<bool>,
    pub verification: Option<bool>,
    pub photo: Option<PhotoUpload>,
}

/// The supplied subset of an update, each present field already checked.
#[derive(Debug, Clone, Default)]
pub struct PostChanges {
    pub about: Option<String>,
    pub author: Option<String>,
    pub body: Option<String>,
    pub categories: Option<Vec<Uuid>>,
    pub tags: Option<Vec<Uuid>>,
    pub source: Option<bool>,
    pub verification: Option<bool>,
    pub photo: Option<PhotoUpload>,
}

/// Check a create submission: every required field present and well-formed.
pub fn validate_new(submission: PostSubmission) -> Result<NewPostFields, DomainError> {
    let about = title_text(submission.about, "About")?;
    let author = title_text(submission.author, "Author")?;
    let body = body_text(submission.body)?;
    let categories = references(submission.categories, "category")?;
    let tags = references(submission.tags, "tag")?;

    Ok(NewPostFields {
        about,
        author,
        body,
        categories,
        tags,
        source: submission.source,
        verification: submission.verification,
        photo: submission.photo,
    })
}

/// Check an update submission: absent fields are fine, supplied ones must
/// pass the same rules as on create.
pub fn validate_changes(submission: PostSubmission) -> Result<PostChanges, DomainError> {
    Ok(PostChanges {
        about: submission
            .about
            .map(|v| title_text(Some(v), "About"))
            .transpose()?,
        author: submission
            .author
            .map(|v| title_text(Some(v), "Author"))
            .transpose()?,
        body: submission.body.map(|v| body_text(Some(v))).transpose()?,
        categories: submission
            .categories
            .map(|v| references(Some(v), "category"))
            .transpose()?,
        tags: submission
            .tags
            .map(|v| references(Some(v), "tag"))
            .transpose()?,
        source: submission.source,
        verification: submission.verification,
        photo: submission.photo,
    })
}

/// Parse a comma-separated id list. Blank segments are skipped and repeated
/// ids keep their first position.
pub fn parse_id_list(raw: &str) -> Result<Vec<Uuid>, DomainError> {
    let mut seen = HashSet::new();
    let mut ids = Vec::new();

    for segment in raw.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        let id = Uuid::parse_str(segment)
            .map_err(|_| DomainError::Validation(format!("Invalid reference id: {segment}")))?;
        if seen.insert(id) {
            ids.push(id);
        }
    }

    Ok(ids)
}

fn title_text(value: Option<String>, label: &str) -> Result<String, DomainError> {
    let value = value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| DomainError::Validation(format!("{label} is required")))?;

    let len = value.chars().count();
    if !(TEXT_MIN_CHARS..=TEXT_MAX_CHARS).contains(&len) {
        return Err(DomainError::Validation(format!(
            "{label} must be between {TEXT_MIN_CHARS} and {TEXT_MAX_CHARS} characters"
        )));
    }

    Ok(value)
}

fn body_text(value: Option<String>) -> Result<String, DomainError> {
    match value {
        Some(body) if body.chars().count() >= BODY_MIN_CHARS => Ok(body),
        _ => Err(DomainError::Validation("Content is too short".to_string())),
    }
}

fn references(value: Option<Vec<Uuid>>, kind: &str) -> Result<Vec<Uuid>, DomainError> {
    match value {
        Some(ids) if !ids.is_empty() => {
            let mut seen = HashSet::new();
            Ok(ids.into_iter().filter(|id| seen.insert(*id)).collect())
        }
        _ => Err(DomainError::Validation(format!(
            "At least one {kind} is required"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete() -> PostSubmission {
        PostSubmission {
            about: Some("Hello World".to_string()),
            author: Some("Jane Doe".to_string()),
            body: Some("A body that is long enough.".to_string()),
            categories: Some(vec![Uuid::new_v4()]),
            tags: Some(vec![Uuid::new_v4()]),
            ..Default::default()
        }
    }

    fn message(result: Result<NewPostFields, DomainError>) -> String {
        match result {
            Err(DomainError::Validation(msg)) => msg,
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn complete_submission_passes() {
        let fields = validate_new(complete()).unwrap();
        assert_eq!(fields.about, "Hello World");
    }

    #[test]
    fn each_missing_field_is_reported() {
        let mut s = complete();
        s.about = None;
        assert_eq!(message(validate_new(s)), "About is required");

        let mut s = complete();
        s.author = Some("   ".to_string());
        assert_eq!(message(validate_new(s)), "Author is required");

        let mut s = complete();
        s.body = Some("too short".to_string());
        assert_eq!(message(validate_new(s)), "Content is too short");

        let mut s = complete();
        s.categories = Some(vec![]);
        assert_eq!(message(validate_new(s)), "At least one category is required");

        let mut s = complete();
        s.tags = None;
        assert_eq!(message(validate_new(s)), "At least one tag is required");
    }

    #[test]
    fn title_length_is_bounded() {
        let mut s = complete();
        s.about = Some("ab".to_string());
        assert!(validate_new(s).is_err());

        let mut s = complete();
        s.about = Some("a".repeat(161));
        assert!(validate_new(s).is_err());

        let mut s = complete();
        s.about = Some(format!("  {}  ", "a".repeat(160)));
        assert_eq!(validate_new(s).unwrap().about.len(), 160);
    }

    #[test]
    fn changes_only_check_supplied_fields() {
        let changes = validate_changes(PostSubmission {
            author: Some("New Author".to_string()),
            ..Default::default()
        })
        .unwrap();
        assert_eq!(changes.author.as_deref(), Some("New Author"));
        assert!(changes.about.is_none());

        let err = validate_changes(PostSubmission {
            tags: Some(vec![]),
            ..Default::default()
        });
        assert!(err.is_err());
    }

    #[test]
    fn id_list_parsing() {
        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let raw = format!(" {a}, ,{b},{a} ");

        assert_eq!(parse_id_list(&raw).unwrap(), vec![a, b]);
        assert!(parse_id_list("").unwrap().is_empty());
        assert!(parse_id_list("not-an-id").is_err());
    }
}
