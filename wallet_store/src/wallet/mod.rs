//! Wallet module: entities, errors and the PostgreSQL repositories.
//!
//! This module implements:
//! - Wallet CRUD, filtered search and aggregates
//! - Soft delete honoured by every read path unless deleted rows are requested
//! - Atomic conditional balance updates that never go negative
//! - Batch creation in a single all-or-nothing transaction
//!
//! ## Example
//!
//! ```no_run
//! use wallet_store::db::{Database, DatabaseConfig, WalletRepository};
//! use wallet_store::wallet::PgWalletRepository;
//! use rust_decimal::Decimal;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let db = Database::new(&DatabaseConfig::from_env()?).await?;
//!     let wallets = PgWalletRepository::new(db);
//!
//!     let wallet = wallets.create("Alpha").await?;
//!     wallets.update_balance_if_enough(wallet.id, Decimal::new(10000, 2)).await?;
//!
//!     // 0 rows: would go negative
//!     let updated = wallets
//!         .update_balance_if_enough(wallet.id, Decimal::new(-1_000_000, 0))
//!         .await?;
//!     assert_eq!(updated, 0);
//!
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod models;
pub mod repository;
pub mod transactions;

pub use errors::{WalletError, WalletResult};
pub use models::{
    SortColumn, Transaction, UnknownSortColumn, Wallet, WalletId, WalletSearch, WalletStats,
};
pub use repository::PgWalletRepository;
pub use transactions::PgTransactionRepository;
