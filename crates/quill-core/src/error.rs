//! Domain-level error types.

use thiserror::Error;

/// Domain errors - business logic failures surfaced to callers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// A required field is missing, empty or out of range.
    #[error("{0}")]
    Validation(String),

    #[error("Image should be less than {limit} bytes in size")]
    PayloadTooLarge { size: usize, limit: usize },

    #[error("{entity_type} not found: {key}")]
    NotFound { entity_type: &'static str, key: String },

    /// Storage failure, already sanitized for display.
    #[error("{0}")]
    Persistence(String),

    /// The submission could not be read (malformed multipart body).
    #[error("{0}")]
    Upload(String),

    #[error("{0}")]
    Forbidden(String),
}

impl DomainError {
    pub fn not_found(entity_type: &'static str, key: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            key: key.into(),
        }
    }
}

/// Repository-level errors.
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Database connection failed: {0}")]
    Connection(String),

    #[error("Query execution failed: {0}")]
    Query(String),

    #[error("Entity not found")]
    NotFound,

    /// Unique index violation; carries the offending field name.
    #[error("Unique constraint violated on {0}")]
    Constraint(String),

    /// Foreign key violation; carries the kind of record that does not exist.
    #[error("Unknown {0} reference")]
    Reference(String),
}

/// Storage errors never reach callers verbatim: constraint violations are
/// reported by field, driver failures collapse to a generic message.
impl From<RepoError> for DomainError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::Constraint(field) => {
                DomainError::Persistence(format!("{field} already exists"))
            }
            RepoError::Reference(target) => {
                DomainError::Persistence(format!("Unknown {target} reference"))
            }
            RepoError::NotFound => DomainError::Persistence("Record no longer exists".to_string()),
            RepoError::Connection(msg) => {
                tracing::error!(error = %msg, "Database connection error");
                DomainError::Persistence("Database error".to_string())
            }
            RepoError::Query(msg) => {
                tracing::error!(error = %msg, "Database query error");
                DomainError::Persistence("Database error".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constraint_violation_names_the_field() {
        let err: DomainError = RepoError::Constraint("slug".to_string()).into();
        assert_eq!(err.to_string(), "slug already exists");
    }

    #[test]
    fn missing_reference_names_the_record_kind() {
        let err: DomainError = RepoError::Reference("category".to_string()).into();
        assert!(matches!(err, DomainError::Persistence(ref m) if m == "Unknown category reference"));
    }

    #[test]
    fn driver_errors_are_not_leaked() {
        let err: DomainError =
            RepoError::Query("relation \"posts\" does not exist".to_string()).into();
        assert_eq!(err.to_string(), "Database error");
    }
}
