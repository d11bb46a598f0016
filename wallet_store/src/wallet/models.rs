//! Wallet data models.

use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::Row;
use sqlx::postgres::PgRow;
use std::fmt;
use std::str::FromStr;

/// Wallet ID type
pub type WalletId = i32;

/// Wallet model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    pub balance: Decimal,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Wallet {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            name: row.get("name"),
            balance: row.get("balance"),
            created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
            deleted_at: row
                .get::<Option<NaiveDateTime>, _>("deleted_at")
                .map(|dt| dt.and_utc()),
        }
    }
}

/// Money movement recorded against a wallet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: i32,
    pub wallet_id: WalletId,
    pub amount: Decimal,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Transaction {
    pub(crate) fn from_row(row: &PgRow) -> Self {
        Self {
            id: row.get("id"),
            wallet_id: row.get("wallet_id"),
            amount: row.get("amount"),
            description: row.get("description"),
            created_at: row.get::<NaiveDateTime, _>("created_at").and_utc(),
            deleted_at: row
                .get::<Option<NaiveDateTime>, _>("deleted_at")
                .map(|dt| dt.and_utc()),
        }
    }
}

/// Columns a wallet search may be ordered by
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortColumn {
    #[default]
    Id,
    Name,
    Balance,
    CreatedAt,
}

impl SortColumn {
    pub const ALL: [SortColumn; 4] = [
        SortColumn::Id,
        SortColumn::Name,
        SortColumn::Balance,
        SortColumn::CreatedAt,
    ];

    /// The SQL column this variant sorts by. Only these literals ever reach
    /// an ORDER BY clause.
    pub fn as_sql(self) -> &'static str {
        match self {
            SortColumn::Id => "id",
            SortColumn::Name => "name",
            SortColumn::Balance => "balance",
            SortColumn::CreatedAt => "created_at",
        }
    }

    /// Parse a caller-supplied column name, falling back to `Id` for anything
    /// outside the whitelist.
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|e: UnknownSortColumn| {
            log::warn!("{e}, sorting by id");
            SortColumn::Id
        })
    }
}

impl fmt::Display for SortColumn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Returned when a sort column name is not in the whitelist
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown sort column '{0}'")]
pub struct UnknownSortColumn(pub String);

impl FromStr for SortColumn {
    type Err = UnknownSortColumn;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        SortColumn::ALL
            .into_iter()
            .find(|column| column.as_sql() == normalized)
            .ok_or_else(|| UnknownSortColumn(s.to_string()))
    }
}

/// Filters and ordering for [`search`](crate::db::WalletRepository::search)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WalletSearch {
    /// Case-insensitive substring of the name; empty means no filter
    pub name_part: Option<String>,
    /// Inclusive lower bound on balance
    pub min_balance: Option<Decimal>,
    pub order_by: SortColumn,
    pub descending: bool,
    pub include_deleted: bool,
}

impl WalletSearch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name_contains(mut self, part: impl Into<String>) -> Self {
        self.name_part = Some(part.into());
        self
    }

    pub fn min_balance(mut self, min: Decimal) -> Self {
        self.min_balance = Some(min);
        self
    }

    pub fn order_by(mut self, column: SortColumn, descending: bool) -> Self {
        self.order_by = column;
        self.descending = descending;
        self
    }

    pub fn include_deleted(mut self, include: bool) -> Self {
        self.include_deleted = include;
        self
    }

    /// The name filter as an ILIKE pattern, or `None` when there is nothing to
    /// filter on.
    pub(crate) fn name_pattern(&self) -> Option<String> {
        self.name_part
            .as_deref()
            .filter(|part| !part.is_empty())
            .map(|part| format!("%{}%", escape_like(part)))
    }
}

/// Escape LIKE metacharacters so the input matches literally.
pub(crate) fn escape_like(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Names that survive batch filtering. Empty names are dropped.
pub(crate) fn non_empty_names<S: AsRef<str>>(names: &[S]) -> Vec<&str> {
    names
        .iter()
        .map(AsRef::as_ref)
        .filter(|name| !name.is_empty())
        .collect()
}

/// Aggregate figures over the wallets visible in one delete-scope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WalletStats {
    pub count: i64,
    pub avg_balance: Option<Decimal>,
    pub max_balance_wallet: Option<Wallet>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_sort_column_whitelist() {
        assert_eq!("id".parse::<SortColumn>().unwrap(), SortColumn::Id);
        assert_eq!("Name".parse::<SortColumn>().unwrap(), SortColumn::Name);
        assert_eq!(" balance ".parse::<SortColumn>().unwrap(), SortColumn::Balance);
        assert_eq!(
            "created_at".parse::<SortColumn>().unwrap(),
            SortColumn::CreatedAt
        );
        assert_eq!(
            "deleted_at".parse::<SortColumn>(),
            Err(UnknownSortColumn("deleted_at".to_string()))
        );
    }

    #[test]
    fn test_resolve_falls_back_to_id() {
        assert_eq!(SortColumn::resolve("balance"), SortColumn::Balance);
        assert_eq!(SortColumn::resolve("balance; DROP TABLE wallets"), SortColumn::Id);
        assert_eq!(SortColumn::resolve(""), SortColumn::Id);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("Alpha"), "Alpha");
        assert_eq!(escape_like("50%_off"), "50\\%\\_off");
        assert_eq!(escape_like("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_name_pattern() {
        assert_eq!(WalletSearch::new().name_pattern(), None);
        assert_eq!(WalletSearch::new().name_contains("").name_pattern(), None);
        assert_eq!(
            WalletSearch::new().name_contains("a").name_pattern(),
            Some("%a%".to_string())
        );
    }

    #[test]
    fn test_non_empty_names() {
        assert_eq!(non_empty_names(&["X", "Y", ""]), vec!["X", "Y"]);
        assert!(non_empty_names::<&str>(&[]).is_empty());
        assert!(non_empty_names(&["".to_string()]).is_empty());
    }

    #[test]
    fn test_search_builder() {
        let search = WalletSearch::new()
            .name_contains("al")
            .min_balance(Decimal::new(1000, 2))
            .order_by(SortColumn::Balance, true)
            .include_deleted(true);

        assert_eq!(search.name_part.as_deref(), Some("al"));
        assert_eq!(search.min_balance, Some(Decimal::new(10, 0)));
        assert_eq!(search.order_by, SortColumn::Balance);
        assert!(search.descending);
        assert!(search.include_deleted);
    }

    proptest! {
        #[test]
        fn prop_resolve_only_yields_whitelisted_sql(name in ".*") {
            let column = SortColumn::resolve(&name);
            prop_assert!(SortColumn::ALL.contains(&column));
            prop_assert!(["id", "name", "balance", "created_at"].contains(&column.as_sql()));
        }

        #[test]
        fn prop_escaped_pattern_has_no_bare_wildcards(input in ".*") {
            let escaped = escape_like(&input);
            let mut chars = escaped.chars();
            while let Some(c) = chars.next() {
                if c == '\\' {
                    let next = chars.next();
                    prop_assert!(matches!(next, Some('\\' | '%' | '_')));
                } else {
                    prop_assert!(c != '%' && c != '_');
                }
            }
        }
    }
}
