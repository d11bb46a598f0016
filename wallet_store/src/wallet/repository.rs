//! PostgreSQL wallet repository.
//!
//! Reads go through a pooled connection, writes through a transaction that is
//! committed only after the statement succeeded. Balance changes are a single
//! conditional `UPDATE`, so concurrent callers are serialised by the row lock
//! and the non-negativity check can never be bypassed.
#![allow(clippy::needless_raw_string_hashes)]

use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{Postgres, QueryBuilder, Row};

use super::{
    errors::{WalletError, WalletResult},
    models::{Wallet, WalletId, WalletSearch, non_empty_names},
};
use crate::db::{Database, WalletRepository};

const WALLET_COLUMNS: &str = "id, name, balance, created_at, deleted_at";

/// Rows per INSERT in `create_batch`; keeps every statement far below the
/// 65535 bind-parameter limit.
const BATCH_CHUNK_SIZE: usize = 10_000;

/// `AND deleted_at IS NULL` unless deleted rows were asked for
fn scope(include_deleted: bool) -> &'static str {
    if include_deleted {
        ""
    } else {
        " AND deleted_at IS NULL"
    }
}

/// Default PostgreSQL implementation of `WalletRepository`
#[derive(Clone)]
pub struct PgWalletRepository {
    db: Database,
}

impl PgWalletRepository {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Run one mutating statement in its own transaction and return the
    /// affected-row count.
    async fn execute_write(
        &self,
        label: &str,
        query: sqlx::query::Query<'_, Postgres, sqlx::postgres::PgArguments>,
    ) -> WalletResult<u64> {
        let mut tx = self.db.begin_write().await?;
        let result = self.db.timed(label, query.execute(&mut *tx)).await?;
        self.db.timed("commit", tx.commit()).await?;

        log::debug!("{label}: {} row(s) affected", result.rows_affected());
        Ok(result.rows_affected())
    }
}

#[async_trait]
impl WalletRepository for PgWalletRepository {
    async fn exists(&self, id: WalletId, include_deleted: bool) -> WalletResult<bool> {
        let sql = format!(
            "SELECT EXISTS(SELECT 1 FROM wallets WHERE id = $1{})",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let exists: bool = self
            .db
            .timed(
                "wallet_exists",
                sqlx::query_scalar(&sql).bind(id).fetch_one(&mut *conn),
            )
            .await?;

        Ok(exists)
    }

    async fn get_by_id(
        &self,
        id: WalletId,
        include_deleted: bool,
    ) -> WalletResult<Option<Wallet>> {
        let sql = format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE id = $1{}",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let row = self
            .db
            .timed(
                "get_wallet",
                sqlx::query(&sql).bind(id).fetch_optional(&mut *conn),
            )
            .await?;

        Ok(row.as_ref().map(Wallet::from_row))
    }

    async fn get_all(&self, include_deleted: bool) -> WalletResult<Vec<Wallet>> {
        let sql = format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE TRUE{} ORDER BY id ASC",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let rows = self
            .db
            .timed("get_all_wallets", sqlx::query(&sql).fetch_all(&mut *conn))
            .await?;

        Ok(rows.iter().map(Wallet::from_row).collect())
    }

    async fn create(&self, name: &str) -> WalletResult<Wallet> {
        let mut tx = self.db.begin_write().await?;
        let row = self
            .db
            .timed(
                "create_wallet",
                sqlx::query(&format!(
                    "INSERT INTO wallets (name) VALUES ($1) RETURNING {WALLET_COLUMNS}"
                ))
                .bind(name)
                .fetch_one(&mut *tx),
            )
            .await?;
        self.db.timed("commit", tx.commit()).await?;

        let wallet = Wallet::from_row(&row);
        log::debug!("Created wallet {}", wallet.id);
        Ok(wallet)
    }

    async fn update_name(
        &self,
        id: WalletId,
        name: &str,
        include_deleted: bool,
    ) -> WalletResult<u64> {
        let sql = format!(
            "UPDATE wallets SET name = $1 WHERE id = $2{}",
            scope(include_deleted)
        );

        self.execute_write("update_wallet_name", sqlx::query(&sql).bind(name).bind(id))
            .await
    }

    async fn hard_delete(&self, id: WalletId, include_deleted: bool) -> WalletResult<u64> {
        let sql = format!("DELETE FROM wallets WHERE id = $1{}", scope(include_deleted));

        self.execute_write("hard_delete_wallet", sqlx::query(&sql).bind(id))
            .await
    }

    async fn search(&self, search: &WalletSearch) -> WalletResult<Vec<Wallet>> {
        let mut query: QueryBuilder<Postgres> =
            QueryBuilder::new(format!("SELECT {WALLET_COLUMNS} FROM wallets WHERE TRUE"));

        if !search.include_deleted {
            query.push(" AND deleted_at IS NULL");
        }

        if let Some(pattern) = search.name_pattern() {
            query.push(" AND name ILIKE ");
            query.push_bind(pattern);
        }

        if let Some(min_balance) = search.min_balance {
            query.push(" AND balance >= ");
            query.push_bind(min_balance);
        }

        // Column and direction come from closed enums, never from caller text.
        query.push(" ORDER BY ");
        query.push(search.order_by.as_sql());
        query.push(if search.descending { " DESC" } else { " ASC" });
        query.push(", id ASC");

        let mut conn = self.db.acquire_read().await?;
        let rows = self
            .db
            .timed("search_wallets", query.build().fetch_all(&mut *conn))
            .await?;

        Ok(rows.iter().map(Wallet::from_row).collect())
    }

    async fn count(&self, include_deleted: bool) -> WalletResult<i64> {
        let sql = format!(
            "SELECT COUNT(*) FROM wallets WHERE TRUE{}",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let count: i64 = self
            .db
            .timed("count_wallets", sqlx::query_scalar(&sql).fetch_one(&mut *conn))
            .await?;

        Ok(count)
    }

    async fn avg_balance(&self, include_deleted: bool) -> WalletResult<Option<Decimal>> {
        let sql = format!(
            "SELECT AVG(balance) FROM wallets WHERE TRUE{}",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let avg: Option<Decimal> = self
            .db
            .timed("avg_balance", sqlx::query_scalar(&sql).fetch_one(&mut *conn))
            .await?;

        Ok(avg)
    }

    async fn max_balance_wallet(&self, include_deleted: bool) -> WalletResult<Option<Wallet>> {
        let max_sql = format!(
            "SELECT MAX(balance) FROM wallets WHERE TRUE{}",
            scope(include_deleted)
        );
        let row_sql = format!(
            "SELECT {WALLET_COLUMNS} FROM wallets WHERE balance = $1{} ORDER BY id ASC LIMIT 1",
            scope(include_deleted)
        );

        let mut conn = self.db.acquire_read().await?;
        let max: Option<Decimal> = self
            .db
            .timed("max_balance", sqlx::query_scalar(&max_sql).fetch_one(&mut *conn))
            .await?;

        let Some(max) = max else {
            return Ok(None);
        };

        // The holder may have changed since the MAX; filtering on the value
        // keeps the returned balance equal to the computed maximum.
        let row = self
            .db
            .timed(
                "max_balance_wallet",
                sqlx::query(&row_sql).bind(max).fetch_optional(&mut *conn),
            )
            .await?;

        Ok(row.as_ref().map(Wallet::from_row))
    }

    async fn update_balance_if_enough(&self, id: WalletId, delta: Decimal) -> WalletResult<u64> {
        let query = sqlx::query(
            r#"
            UPDATE wallets
            SET balance = balance + $1
            WHERE id = $2 AND deleted_at IS NULL AND balance + $1 >= 0
            "#,
        )
        .bind(delta)
        .bind(id);

        self.execute_write("update_balance_if_enough", query).await
    }

    async fn try_update_balance(&self, id: WalletId, delta: Decimal) -> WalletResult<Decimal> {
        let mut tx = self.db.begin_write().await?;

        let updated = self
            .db
            .timed(
                "try_update_balance",
                sqlx::query(
                    r#"
                    UPDATE wallets
                    SET balance = balance + $1
                    WHERE id = $2 AND deleted_at IS NULL AND balance + $1 >= 0
                    RETURNING balance
                    "#,
                )
                .bind(delta)
                .bind(id)
                .fetch_optional(&mut *tx),
            )
            .await?;

        let new_balance: Decimal = match updated {
            Some(row) => row.get("balance"),
            None => {
                // Either the wallet is missing/deleted or funds are short.
                // The lookup sees the latest committed state, which may already
                // differ from what the UPDATE saw.
                let current: Option<Decimal> = self
                    .db
                    .timed(
                        "classify_balance_rejection",
                        sqlx::query_scalar(
                            "SELECT balance FROM wallets WHERE id = $1 AND deleted_at IS NULL",
                        )
                        .bind(id)
                        .fetch_optional(&mut *tx),
                    )
                    .await?;

                return Err(match current {
                    Some(available) => WalletError::InsufficientBalance {
                        wallet_id: id,
                        available,
                        required: -delta,
                    },
                    None => WalletError::WalletNotFound(id),
                });
            }
        };

        self.db.timed("commit", tx.commit()).await?;
        Ok(new_balance)
    }

    async fn create_batch(&self, names: &[String]) -> WalletResult<u64> {
        let names = non_empty_names(names);
        if names.is_empty() {
            return Ok(0);
        }

        let mut tx = self.db.begin_write().await?;
        let mut created = 0;

        for chunk in names.chunks(BATCH_CHUNK_SIZE) {
            let mut query = QueryBuilder::<Postgres>::new("INSERT INTO wallets (name) ");
            query.push_values(chunk, |mut row, name| {
                row.push_bind(*name);
            });

            let result = self
                .db
                .timed("create_wallets_batch", query.build().execute(&mut *tx))
                .await?;
            created += result.rows_affected();
        }

        self.db.timed("commit", tx.commit()).await?;

        log::debug!("Batch created {created} wallet(s)");
        Ok(created)
    }

    async fn soft_delete(&self, id: WalletId) -> WalletResult<u64> {
        let query = sqlx::query(
            "UPDATE wallets SET deleted_at = (NOW() AT TIME ZONE 'utc')
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id);

        self.execute_write("soft_delete_wallet", query).await
    }

    async fn restore(&self, id: WalletId) -> WalletResult<u64> {
        let query = sqlx::query(
            "UPDATE wallets SET deleted_at = NULL WHERE id = $1 AND deleted_at IS NOT NULL",
        )
        .bind(id);

        self.execute_write("restore_wallet", query).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scope_clause() {
        assert_eq!(scope(false), " AND deleted_at IS NULL");
        assert_eq!(scope(true), "");
    }
}
