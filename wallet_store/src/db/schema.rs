//! Idempotent schema setup for the `wallets` and `transactions` tables.
//!
//! Timestamps are naive `timestamp` columns holding UTC wall-clock time, so
//! every default and every `deleted_at` write uses `now() AT TIME ZONE 'utc'`.

use super::{Database, StoreResult};

const CREATE_WALLETS: &str = r#"
CREATE TABLE IF NOT EXISTS wallets (
    id          SERIAL PRIMARY KEY,
    name        VARCHAR(255) NOT NULL,
    balance     NUMERIC(12, 2) NOT NULL DEFAULT 0,
    created_at  TIMESTAMP NOT NULL DEFAULT (NOW() AT TIME ZONE 'utc'),
    deleted_at  TIMESTAMP NULL
)
"#;

const CREATE_TRANSACTIONS: &str = r#"
CREATE TABLE IF NOT EXISTS transactions (
    id          SERIAL PRIMARY KEY,
    wallet_id   INTEGER NOT NULL REFERENCES wallets(id),
    amount      NUMERIC(12, 2) NOT NULL,
    description VARCHAR(255) NULL,
    created_at  TIMESTAMP NOT NULL DEFAULT (NOW() AT TIME ZONE 'utc'),
    deleted_at  TIMESTAMP NULL
)
"#;

// Tables created before soft delete existed lack the column.
const ADD_WALLETS_DELETED_AT: &str =
    "ALTER TABLE wallets ADD COLUMN IF NOT EXISTS deleted_at TIMESTAMP NULL";

const ADD_TRANSACTIONS_DELETED_AT: &str =
    "ALTER TABLE transactions ADD COLUMN IF NOT EXISTS deleted_at TIMESTAMP NULL";

const STATEMENTS: [(&str, &str); 4] = [
    ("create_wallets", CREATE_WALLETS),
    ("create_transactions", CREATE_TRANSACTIONS),
    ("add_wallets_deleted_at", ADD_WALLETS_DELETED_AT),
    ("add_transactions_deleted_at", ADD_TRANSACTIONS_DELETED_AT),
];

/// Create both tables and upgrade older ones, in a single transaction.
///
/// Safe to run any number of times.
pub async fn apply_schema(db: &Database) -> StoreResult<()> {
    let mut tx = db.begin_write().await?;

    for (label, sql) in STATEMENTS {
        db.timed(label, sqlx::query(sql).execute(&mut *tx)).await?;
    }

    db.timed("commit_schema", tx.commit()).await?;
    log::info!("Schema applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_statements_are_idempotent() {
        for (label, sql) in STATEMENTS {
            assert!(
                sql.contains("IF NOT EXISTS"),
                "{label} must be safe to re-run"
            );
        }
    }

    #[test]
    fn test_wallets_created_before_transactions() {
        let wallets = STATEMENTS
            .iter()
            .position(|(label, _)| *label == "create_wallets")
            .unwrap();
        let transactions = STATEMENTS
            .iter()
            .position(|(label, _)| *label == "create_transactions")
            .unwrap();
        assert!(wallets < transactions);
    }
}
