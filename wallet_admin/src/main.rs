//! Operator CLI for the wallet store.
//!
//! Connects to PostgreSQL, runs a single command against the wallet
//! repositories and prints the result as JSON on stdout.

mod commands;
mod config;
mod logging;

use std::time::Instant;

use anyhow::{Context, Error};
use pico_args::Arguments;
use wallet_store::Database;

use commands::Command;
use config::AdminConfig;

const HELP: &str = "\
Manage wallets stored in PostgreSQL

USAGE:
  wallet_admin [OPTIONS] <COMMAND>

OPTIONS:
  --db-url     URL         Database connection string  [default: env DATABASE_URL]

FLAGS:
  -h, --help               Print help information

COMMANDS:
  migrate                  Create tables and columns if missing
  demo                     Run a scripted walkthrough against the store
  list [--deleted]         List wallets ordered by id
  get ID [--deleted]       Show one wallet
  create NAME...           Create one wallet, or a batch (empty names skipped)
  rename ID NAME           Rename a live wallet
  search [--name S] [--min-balance D] [--order-by COL] [--desc] [--deleted]
                           Filter and sort wallets (COL: id, name, balance, created_at)
  stats [--deleted]        Count, average balance and richest wallet
  adjust ID DELTA          Apply a balance delta, refusing to go negative
  delete ID [--hard]       Soft delete a wallet, or remove it with --hard
  restore ID               Undo a soft delete

ENVIRONMENT:
  DATABASE_URL             PostgreSQL connection string
  DB_MAX_CONNECTIONS       Pool size  [default: 20]
  DB_QUERY_TIMEOUT         Per-operation timeout in seconds  [default: 5]
  WALLET_ADMIN_COMPACT     Print single-line JSON when set to true
  RUST_LOG                 Log filter  [default: info,sqlx=warn]
";

#[tokio::main]
async fn main() -> Result<(), Error> {
    // Load .env file if it exists
    let _ = dotenvy::dotenv();

    let mut pargs = Arguments::from_env();

    // Help has a higher priority and should be handled separately.
    if pargs.contains(["-h", "--help"]) {
        print!("{HELP}");
        std::process::exit(0);
    }

    let database_url: Option<String> = pargs.opt_value_from_str("--db-url")?;
    let command = Command::parse(&mut pargs)?;

    logging::init();

    let config = AdminConfig::from_env(database_url).context("Invalid configuration")?;
    let db = Database::new(&config.database)
        .await
        .context("Failed to connect to database")?;
    tracing::debug!("Database connected successfully");

    let name = command.name();
    let started = Instant::now();
    let result = commands::run(command, &db).await;
    let elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
    logging::log_command(name, elapsed_ms, result.is_ok());

    db.close().await;

    let value = result?;
    let rendered = if config.compact_output {
        serde_json::to_string(&value)?
    } else {
        serde_json::to_string_pretty(&value)?
    };
    println!("{rendered}");

    Ok(())
}
