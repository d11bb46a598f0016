//! Repository trait definitions for testability and dependency injection.
//!
//! Every read, search and aggregate takes an `include_deleted` flag; with it
//! unset, soft-deleted rows are invisible. Mutations report the number of
//! affected rows, where `0` means "not found under the current delete-scope"
//! (or, for balance updates, "rejected").

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::wallet::{Transaction, Wallet, WalletId, WalletResult, WalletSearch, WalletStats};

/// Trait for wallet repository operations
#[async_trait]
pub trait WalletRepository: Send + Sync {
    /// Whether a wallet with this id exists under the delete-scope
    async fn exists(&self, id: WalletId, include_deleted: bool) -> WalletResult<bool>;

    /// Find wallet by ID
    async fn get_by_id(&self, id: WalletId, include_deleted: bool)
    -> WalletResult<Option<Wallet>>;

    /// All wallets, ordered by id ascending
    async fn get_all(&self, include_deleted: bool) -> WalletResult<Vec<Wallet>>;

    /// Create a wallet with a zero balance
    async fn create(&self, name: &str) -> WalletResult<Wallet>;

    /// Rename a wallet
    async fn update_name(&self, id: WalletId, name: &str, include_deleted: bool)
    -> WalletResult<u64>;

    /// Permanently remove a wallet
    async fn hard_delete(&self, id: WalletId, include_deleted: bool) -> WalletResult<u64>;

    /// Filtered, ordered search
    async fn search(&self, search: &WalletSearch) -> WalletResult<Vec<Wallet>>;

    /// Number of wallets
    async fn count(&self, include_deleted: bool) -> WalletResult<i64>;

    /// Average balance, `None` when there are no wallets
    async fn avg_balance(&self, include_deleted: bool) -> WalletResult<Option<Decimal>>;

    /// A wallet holding the maximum balance
    async fn max_balance_wallet(&self, include_deleted: bool) -> WalletResult<Option<Wallet>>;

    /// Add `delta` to an active wallet's balance unless that would make it
    /// negative. Missing, deleted and under-funded wallets all yield `0`.
    async fn update_balance_if_enough(&self, id: WalletId, delta: Decimal) -> WalletResult<u64>;

    /// Same mutation as `update_balance_if_enough`, returning the new balance
    /// or a typed reason for the rejection.
    async fn try_update_balance(&self, id: WalletId, delta: Decimal) -> WalletResult<Decimal>;

    /// Insert many wallets at once; empty names are skipped
    async fn create_batch(&self, names: &[String]) -> WalletResult<u64>;

    /// Mark an active wallet as deleted
    async fn soft_delete(&self, id: WalletId) -> WalletResult<u64>;

    /// Bring a soft-deleted wallet back
    async fn restore(&self, id: WalletId) -> WalletResult<u64>;

    /// Count, average and maximum in one call
    async fn stats(&self, include_deleted: bool) -> WalletResult<WalletStats> {
        Ok(WalletStats {
            count: self.count(include_deleted).await?,
            avg_balance: self.avg_balance(include_deleted).await?,
            max_balance_wallet: self.max_balance_wallet(include_deleted).await?,
        })
    }
}

/// Trait for transaction repository operations
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Record a transaction against a wallet
    async fn create(
        &self,
        wallet_id: WalletId,
        amount: Decimal,
        description: Option<&str>,
    ) -> WalletResult<Transaction>;

    /// Find transaction by ID
    async fn get_by_id(&self, id: i32, include_deleted: bool) -> WalletResult<Option<Transaction>>;

    /// Transactions of one wallet, oldest first
    async fn list_for_wallet(
        &self,
        wallet_id: WalletId,
        include_deleted: bool,
    ) -> WalletResult<Vec<Transaction>>;

    /// Mark an active transaction as deleted
    async fn soft_delete(&self, id: i32) -> WalletResult<u64>;

    /// Bring a soft-deleted transaction back
    async fn restore(&self, id: i32) -> WalletResult<u64>;
}
