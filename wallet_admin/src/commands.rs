//! Command parsing and execution.
//!
//! Every command calls into the repositories and renders the result as JSON.

use anyhow::{Context, Result, bail};
use pico_args::Arguments;
use rust_decimal::Decimal;
use serde_json::{Value, json};
use wallet_store::db::schema::apply_schema;
use wallet_store::db::{Database, WalletRepository};
use wallet_store::wallet::{PgWalletRepository, SortColumn, WalletId, WalletSearch};

/// Longest wallet name the `name` column holds
const MAX_NAME_CHARS: usize = 255;

/// A parsed CLI command
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Migrate,
    Demo,
    List { include_deleted: bool },
    Get { id: WalletId, include_deleted: bool },
    Create { names: Vec<String> },
    Rename { id: WalletId, name: String },
    Search(WalletSearch),
    Stats { include_deleted: bool },
    Adjust { id: WalletId, delta: Decimal },
    Delete { id: WalletId, hard: bool },
    Restore { id: WalletId },
}

impl Command {
    /// Parse the subcommand and its arguments. Global options must already
    /// have been taken out of `pargs`.
    pub fn parse(pargs: &mut Arguments) -> Result<Self> {
        let Some(name) = pargs.subcommand()? else {
            bail!("Missing command, see --help");
        };

        let command = match name.as_str() {
            "migrate" => Command::Migrate,
            "demo" => Command::Demo,
            "list" => Command::List {
                include_deleted: pargs.contains("--deleted"),
            },
            "get" => Command::Get {
                include_deleted: pargs.contains("--deleted"),
                id: wallet_id(pargs, "get")?,
            },
            "rename" => Command::Rename {
                id: wallet_id(pargs, "rename")?,
                name: wallet_name(pargs.free_from_str().context("rename requires a new name")?)?,
            },
            "search" => {
                let mut search = WalletSearch::new()
                    .include_deleted(pargs.contains("--deleted"))
                    .order_by(SortColumn::Id, pargs.contains("--desc"));
                if let Some(name_part) = pargs.opt_value_from_str::<_, String>("--name")? {
                    search = search.name_contains(name_part);
                }
                if let Some(min) = pargs.opt_value_from_str::<_, Decimal>("--min-balance")? {
                    search = search.min_balance(min);
                }
                if let Some(column) = pargs.opt_value_from_str::<_, String>("--order-by")? {
                    search.order_by = SortColumn::resolve(&column);
                }
                Command::Search(search)
            }
            "stats" => Command::Stats {
                include_deleted: pargs.contains("--deleted"),
            },
            "adjust" => Command::Adjust {
                id: wallet_id(pargs, "adjust")?,
                delta: pargs
                    .free_from_str()
                    .context("adjust requires a decimal delta")?,
            },
            "delete" => Command::Delete {
                hard: pargs.contains("--hard"),
                id: wallet_id(pargs, "delete")?,
            },
            "restore" => Command::Restore {
                id: wallet_id(pargs, "restore")?,
            },
            "create" => {
                let mut names = Vec::new();
                while let Some(raw) = pargs.opt_free_from_str::<String>()? {
                    names.push(wallet_name(raw)?);
                }
                if names.is_empty() {
                    bail!("create requires at least one name");
                }
                Command::Create { names }
            }
            other => bail!("Unknown command '{other}', see --help"),
        };

        Ok(command)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Command::Migrate => "migrate",
            Command::Demo => "demo",
            Command::List { .. } => "list",
            Command::Get { .. } => "get",
            Command::Create { .. } => "create",
            Command::Rename { .. } => "rename",
            Command::Search(_) => "search",
            Command::Stats { .. } => "stats",
            Command::Adjust { .. } => "adjust",
            Command::Delete { .. } => "delete",
            Command::Restore { .. } => "restore",
        }
    }
}

fn wallet_id(pargs: &mut Arguments, command: &str) -> Result<WalletId> {
    pargs
        .free_from_str()
        .with_context(|| format!("{command} requires a wallet ID"))
}

/// Names must hold between 1 and 255 characters.
fn wallet_name(raw: String) -> Result<String> {
    let chars = raw.chars().count();
    if chars == 0 {
        bail!("Wallet name must not be empty");
    }
    if chars > MAX_NAME_CHARS {
        bail!("Wallet name has {chars} characters, the limit is {MAX_NAME_CHARS}");
    }
    Ok(raw)
}

/// Execute a command and return its JSON result
pub async fn run(command: Command, db: &Database) -> Result<Value> {
    let wallets = PgWalletRepository::new(db.clone());

    let value = match command {
        Command::Migrate => {
            apply_schema(db).await?;
            json!({ "migrated": true })
        }
        Command::Demo => demo(&wallets).await?,
        Command::List { include_deleted } => json!(wallets.get_all(include_deleted).await?),
        Command::Get {
            id,
            include_deleted,
        } => match wallets.get_by_id(id, include_deleted).await? {
            Some(wallet) => json!(wallet),
            None => bail!("Wallet {id} not found"),
        },
        Command::Create { names } => {
            if let [name] = names.as_slice() {
                json!(wallets.create(name).await?)
            } else {
                json!({ "created": wallets.create_batch(&names).await? })
            }
        }
        Command::Rename { id, name } => {
            json!({ "rows_affected": wallets.update_name(id, &name, false).await? })
        }
        Command::Search(search) => json!(wallets.search(&search).await?),
        Command::Stats { include_deleted } => json!(wallets.stats(include_deleted).await?),
        Command::Adjust { id, delta } => {
            let balance = wallets.try_update_balance(id, delta).await?;
            json!({ "id": id, "balance": balance })
        }
        Command::Delete { id, hard: false } => {
            json!({ "rows_affected": wallets.soft_delete(id).await? })
        }
        Command::Delete { id, hard: true } => {
            json!({ "rows_affected": wallets.hard_delete(id, true).await? })
        }
        Command::Restore { id } => json!({ "rows_affected": wallets.restore(id).await? }),
    };

    Ok(value)
}

/// Scripted walkthrough of the repository: batch create, search, aggregates,
/// guarded balance updates, then soft delete and its effect on reads.
async fn demo(wallets: &PgWalletRepository) -> Result<Value> {
    let names = ["Alpha", "Beta", "Gamma"].map(String::from);
    let created = wallets.create_batch(&names).await?;
    tracing::info!(created, "Batch created demo wallets");

    let matching = wallets
        .search(
            &WalletSearch::new()
                .name_contains("a")
                .order_by(SortColumn::Name, false),
        )
        .await?;
    let stats_before = wallets.stats(false).await?;

    let Some(first) = wallets.get_all(false).await?.into_iter().next() else {
        bail!("No wallets to run the demo against");
    };
    let id = first.id;
    tracing::info!(wallet_id = id, "Running balance updates");

    let deposit = wallets.update_balance_if_enough(id, Decimal::from(100)).await?;
    let withdraw = wallets.update_balance_if_enough(id, Decimal::from(-30)).await?;
    let overdraw = wallets
        .update_balance_if_enough(id, Decimal::from(-1_000_000))
        .await?;

    let soft_delete = wallets.soft_delete(id).await?;
    let soft_delete_again = wallets.soft_delete(id).await?;

    Ok(json!({
        "batch_created": created,
        "search_name_part_a": matching,
        "stats_before_delete": stats_before,
        "wallet_id": id,
        "deposit_100": deposit,
        "withdraw_30": withdraw,
        "withdraw_1000000": overdraw,
        "soft_delete": soft_delete,
        "soft_delete_again": soft_delete_again,
        "all_including_deleted": wallets.get_all(true).await?,
        "search_after_delete": wallets.search(&WalletSearch::new()).await?,
        "count_after_delete": wallets.count(false).await?,
    }))
}
