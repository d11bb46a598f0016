//! Store error types.

use std::time::Duration;
use thiserror::Error;

/// Failures surfaced by the relational store, classified by how a caller may react.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Connection loss, pool exhaustion, deadlock or serialization failure.
    /// Retrying the whole operation is reasonable.
    #[error("Transient store error: {0}")]
    Transient(#[source] sqlx::Error),

    /// The gateway's per-call timeout elapsed
    #[error("Database operation timed out after {0:?}")]
    Timeout(Duration),

    /// Foreign key, unique, check or not-null violation
    #[error("Integrity violation{}: {message}", on_constraint(.constraint))]
    Integrity {
        constraint: Option<String>,
        message: String,
    },

    /// Anything else
    #[error("Database error: {0}")]
    Database(#[source] sqlx::Error),
}

impl StoreError {
    /// Whether a caller-side retry could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_) | StoreError::Timeout(_))
    }

    pub fn is_integrity_violation(&self) -> bool {
        matches!(self, StoreError::Integrity { .. })
    }
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::Io(_)
            | sqlx::Error::Tls(_)
            | sqlx::Error::PoolTimedOut
            | sqlx::Error::PoolClosed
            | sqlx::Error::WorkerCrashed => StoreError::Transient(err),
            sqlx::Error::Database(db_err) => {
                let code = db_err.code().map(|c| c.into_owned());

                // 23502: not_null_violation
                if db_err.is_foreign_key_violation()
                    || db_err.is_unique_violation()
                    || db_err.is_check_violation()
                    || code.as_deref() == Some("23502")
                {
                    return StoreError::Integrity {
                        constraint: db_err.constraint().map(str::to_string),
                        message: db_err.message().to_string(),
                    };
                }

                if code.as_deref().is_some_and(is_transient_sqlstate) {
                    StoreError::Transient(err)
                } else {
                    StoreError::Database(err)
                }
            }
            _ => StoreError::Database(err),
        }
    }
}

fn on_constraint(constraint: &Option<String>) -> String {
    constraint
        .as_deref()
        .map(|name| format!(" on {name}"))
        .unwrap_or_default()
}

/// SQLSTATEs worth retrying: serialization failure, deadlock, connection
/// exceptions (class 08) and operator-initiated shutdowns.
fn is_transient_sqlstate(code: &str) -> bool {
    matches!(code, "40001" | "40P01" | "57P01" | "57P02" | "57P03") || code.starts_with("08")
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pool_errors_are_transient() {
        assert!(StoreError::from(sqlx::Error::PoolTimedOut).is_transient());
        assert!(StoreError::from(sqlx::Error::PoolClosed).is_transient());
    }

    #[test]
    fn test_row_not_found_is_not_transient() {
        let err = StoreError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, StoreError::Database(_)));
        assert!(!err.is_transient());
    }

    #[test]
    fn test_timeout_display() {
        let err = StoreError::Timeout(Duration::from_secs(5));
        assert!(err.is_transient());
        assert!(err.to_string().contains("timed out"));
        assert!(err.to_string().contains("5s"));
    }

    #[test]
    fn test_integrity_display() {
        let err = StoreError::Integrity {
            constraint: Some("transactions_wallet_id_fkey".to_string()),
            message: "insert or update violates foreign key constraint".to_string(),
        };
        assert!(err.is_integrity_violation());
        assert!(err.to_string().contains("transactions_wallet_id_fkey"));

        let err = StoreError::Integrity {
            constraint: None,
            message: "null value".to_string(),
        };
        assert_eq!(err.to_string(), "Integrity violation: null value");
    }

    #[test]
    fn test_transient_sqlstates() {
        assert!(is_transient_sqlstate("40001"));
        assert!(is_transient_sqlstate("40P01"));
        assert!(is_transient_sqlstate("08006"));
        assert!(!is_transient_sqlstate("23505"));
        assert!(!is_transient_sqlstate("42P01"));
    }
}
