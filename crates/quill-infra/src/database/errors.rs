//! Mapping of SeaORM errors onto repository errors.

use sea_orm::{DbErr, SqlErr};

use quill_core::error::RepoError;

/// Errors from reads: connection trouble or a failed query.
pub(crate) fn read_error(err: DbErr) -> RepoError {
    match err {
        DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => RepoError::Connection(err.to_string()),
        other => RepoError::Query(other.to_string()),
    }
}

const FOREIGN_KEY_VIOLATION: &str = "violates foreign key constraint";

/// Errors from writes: unique violations are reported by column, foreign key
/// violations by the kind of record that is missing.
pub(crate) fn write_error(err: DbErr) -> RepoError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(detail)) => {
            RepoError::Constraint(unique_field(&detail))
        }
        Some(SqlErr::ForeignKeyConstraintViolation(detail)) => {
            RepoError::Reference(reference_target(&detail).to_string())
        }
        _ if err.to_string().contains(FOREIGN_KEY_VIOLATION) => {
            RepoError::Reference(reference_target(&err.to_string()).to_string())
        }
        _ => read_error(err),
    }
}

/// Record kind behind a violated foreign key, from the constraint names the
/// migration assigns.
pub(crate) fn reference_target(detail: &str) -> &'static str {
    let constraint = detail
        .rsplit_once(FOREIGN_KEY_VIOLATION)
        .map_or(detail, |(_, rest)| rest);
    if constraint.contains("fk_post_categories_target") {
        "category"
    } else if constraint.contains("fk_post_tags_target") {
        "tag"
    } else if constraint.contains("fk_posts_posted_by") {
        "user"
    } else {
        "record"
    }
}

/// Column behind a PostgreSQL unique violation message such as
/// `duplicate key value violates unique constraint "posts_slug_key"`.
pub(crate) fn unique_field(detail: &str) -> String {
    let constraint = detail.split('"').nth(1).unwrap_or_default();
    if constraint.is_empty() {
        return "record".to_string();
    }
    if constraint.ends_with("_pkey") {
        return "id".to_string();
    }

    let constraint = constraint.trim_end_matches("_key");
    match constraint.split_once('_') {
        Some((_table, column)) if !column.is_empty() => column.to_string(),
        _ => constraint.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_column_from_constraint_name() {
        let detail = r#"duplicate key value violates unique constraint "posts_slug_key""#;
        assert_eq!(unique_field(detail), "slug");
    }

    #[test]
    fn foreign_keys_map_to_the_missing_record_kind() {
        let detail = r#"insert or update on table "post_tags" violates foreign key constraint "fk_post_tags_target""#;
        assert_eq!(reference_target(detail), "tag");
        let detail = r#"insert or update on table "posts" violates foreign key constraint "fk_posts_posted_by""#;
        assert_eq!(reference_target(detail), "user");
        assert_eq!(reference_target("foreign key violation"), "record");
    }

    #[test]
    fn unknown_constraint_shapes_fall_back() {
        assert_eq!(unique_field("unique violation"), "record");
        assert_eq!(unique_field(r#"constraint "slug""#), "slug");
        assert_eq!(unique_field(r#"constraint "posts_pkey""#), "id");
    }
}
