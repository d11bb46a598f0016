//! Wallet error types.

use rust_decimal::Decimal;
use thiserror::Error;

use crate::db::StoreError;

/// Wallet errors
#[derive(Debug, Error)]
pub enum WalletError {
    /// Store failure (transient, integrity or other)
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Wallet not found, or soft-deleted
    #[error("Wallet not found: {0}")]
    WalletNotFound(i32),

    /// Applying the delta would make the balance negative
    #[error("Insufficient balance in wallet {wallet_id}: have {available}, need {required}")]
    InsufficientBalance {
        wallet_id: i32,
        available: Decimal,
        required: Decimal,
    },
}

impl From<sqlx::Error> for WalletError {
    fn from(err: sqlx::Error) -> Self {
        WalletError::Store(err.into())
    }
}

impl WalletError {
    /// Whether retrying the operation could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, WalletError::Store(e) if e.is_transient())
    }

    /// Get a client-safe error message that doesn't leak sensitive information
    ///
    /// Store errors are sanitized to prevent information disclosure about
    /// the internal system structure.
    pub fn client_message(&self) -> String {
        match self {
            WalletError::Store(StoreError::Timeout(_) | StoreError::Transient(_)) => {
                "Service temporarily unavailable".to_string()
            }
            WalletError::Store(StoreError::Integrity { .. }) => "Conflicting data".to_string(),
            WalletError::Store(StoreError::Database(_)) => "Internal server error".to_string(),
            WalletError::WalletNotFound(_) => "Wallet not found".to_string(),
            WalletError::InsufficientBalance { .. } => "Insufficient balance".to_string(),
        }
    }
}

/// Result type for wallet operations
pub type WalletResult<T> = Result<T, WalletError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::time::Duration;

    #[test]
    fn test_sqlx_error_goes_through_classifier() {
        let err = WalletError::from(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, WalletError::Store(StoreError::Transient(_))));
        assert!(err.is_transient());
    }

    #[test]
    fn test_client_message_hides_details() {
        let err = WalletError::Store(StoreError::Integrity {
            constraint: Some("transactions_wallet_id_fkey".to_string()),
            message: "secret detail".to_string(),
        });
        assert_eq!(err.client_message(), "Conflicting data");

        let err = WalletError::Store(StoreError::Timeout(Duration::from_secs(5)));
        assert_eq!(err.client_message(), "Service temporarily unavailable");

        let err = WalletError::WalletNotFound(42);
        assert!(!err.client_message().contains("42"));
    }

    #[test]
    fn test_insufficient_balance_display() {
        let err = WalletError::InsufficientBalance {
            wallet_id: 7,
            available: dec!(10.50),
            required: dec!(20.00),
        };
        let msg = err.to_string();
        assert!(msg.contains("10.50"));
        assert!(msg.contains("20.00"));
        assert!(!err.is_transient());
    }
}
