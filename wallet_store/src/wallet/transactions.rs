//! PostgreSQL repository for the `transactions` table.

use async_trait::async_trait;
use rust_decimal::Decimal;

use super::{
    errors::WalletResult,
    models::{Transaction, WalletId},
};
use crate::db::{Database, TransactionRepository};

const TRANSACTION_COLUMNS: &str = "id, wallet_id, amount, description, created_at, deleted_at";

fn scope(include_deleted: bool) -> &'static str {
    if include_deleted {
        ""
    } else {
        " AND deleted_at IS NULL"
    }
}

/// Default PostgreSQL implementation of `TransactionRepository`
#[derive(Clone)]
pub struct PgTransactionRepository {
    db: Database,
}

impl PgTransactionRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn create(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        description: Option<&str>,
    ) -> WalletResult<Transaction> {
        let mut tx = self.db.begin_write().await?;
        let row = self
            .db
            .timed(
                "create_transaction",
                sqlx::query(&format!(
                    "INSERT INTO transactions (wallet_id, amount, description)
                     VALUES ($1, $2, $3)
                     RETURNING {TRANSACTION_COLUMNS}"
                ))
                .bind(wallet_id)
                .bind(amount)
                .bind(description)
                .fetch_one(&mut *tx),
            )
            .await?;
        self.db.timed("commit", tx.commit()).await?;

        Ok(Transaction::from_row(&row))
    }

    async fn get_by_id(&self, id: i32, include_deleted: bool) -> WalletResult<Option<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions WHERE id = $1{}",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let row = self
            .db
            .timed(
                "get_transaction",
                sqlx::query(&sql).bind(id).fetch_optional(&mut *conn),
            )
            .await?;

        Ok(row.as_ref().map(Transaction::from_row))
    }

    async fn list_for_wallet(
        &self,
        wallet_id: WalletId,
        include_deleted: bool,
    ) -> WalletResult<Vec<Transaction>> {
        let sql = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM transactions
             WHERE wallet_id = $1{}
             ORDER BY created_at ASC, id ASC",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let rows = self
            .db
            .timed(
                "list_wallet_transactions",
                sqlx::query(&sql).bind(wallet_id).fetch_all(&mut *conn),
            )
            .await?;

        Ok(rows.iter().map(Transaction::from_row).collect())
    }

    async fn soft_delete(&self, id: i32) -> WalletResult<u64> {
        let mut tx = self.db.begin_write().await?;
        let result = self
            .db
            .timed(
                "soft_delete_transaction",
                sqlx::query(
                    "UPDATE transactions SET deleted_at = (NOW() AT TIME ZONE 'utc')
                     WHERE id = $1 AND deleted_at IS NULL",
                )
                .bind(id)
                .execute(&mut *tx),
            )
            .await?;
        self.db.timed("commit", tx.commit()).await?;

        Ok(result.rows_affected())
    }

    async fn restore(&self, id: i32) -> WalletResult<u64> {
        let mut tx = self.db.begin_write().await?;
        let result = self
            .db
            .timed(
                "restore_transaction",
                sqlx::query(
                    "UPDATE transactions SET deleted_at = NULL
                     WHERE id = $1 AND deleted_at IS NOT NULL",
                )
                .bind(id)
                .execute(&mut *tx),
            )
            .await?;
        self.db.timed("commit", tx.commit()).await?;

        Ok(result.rows_affected())
    }
}
