//! # Wallet Store
//!
//! PostgreSQL persistence for monetary wallets and their transactions.
//!
//! The crate is split into a connection gateway and the repositories built on
//! top of it:
//!
//! - [`db`]: pool configuration, the [`db::Database`] gateway (scoped
//!   connections and transactions with per-call timeouts), store error
//!   classification, schema setup and the repository traits.
//! - [`wallet`]: entities (`Wallet`, `Transaction`), wallet errors and the
//!   PostgreSQL repository implementations.
//!
//! Balances are `rust_decimal::Decimal` end to end; no floating-point type is
//! involved at any boundary.

/// Connection gateway, configuration and repository traits.
pub mod db;

/// Wallet and transaction entities and repositories.
pub mod wallet;

pub use db::{Database, DatabaseConfig, TransactionRepository, WalletRepository};
pub use wallet::{PgTransactionRepository, PgWalletRepository, Wallet, WalletError};
