//! lakeops CLI - run the create / merge / delete example against a Delta table
//!
//! Usage:
//!   lakeops
//!   lakeops --table-path <PATH> [--merge-key KEY] [--delete-predicate SQL]

use clap::Parser;
use lakeops::demo::{
    run, DemoConfig, DEFAULT_DELETE_PREDICATE, DEFAULT_MERGE_KEY, DEFAULT_TABLE_PATH,
};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// lakeops - Delta Lake create / upsert / delete example
#[derive(Parser)]
#[command(name = "lakeops")]
#[command(version = "0.1.0")]
#[command(about = "Create a Delta table, merge updates into it, then delete rows", long_about = None)]
struct Cli {
    /// Directory of the Delta table (created if missing)
    #[arg(long, value_name = "PATH", default_value = DEFAULT_TABLE_PATH)]
    table_path: PathBuf,

    /// Column used to match source and target rows
    #[arg(long, value_name = "COLUMN", default_value = DEFAULT_MERGE_KEY)]
    merge_key: String,

    /// SQL condition selecting the rows to delete
    #[arg(long, value_name = "SQL", default_value = DEFAULT_DELETE_PREDICATE)]
    delete_predicate: String,
}

impl From<Cli> for DemoConfig {
    fn from(cli: Cli) -> Self {
        DemoConfig {
            table_path: cli.table_path,
            merge_key: cli.merge_key,
            delete_predicate: cli.delete_predicate,
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Logs go to stderr; stdout carries the example output
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = DemoConfig::from(Cli::parse());
    let mut stdout = std::io::stdout();

    // Failures are reported, not signalled through the exit status
    run(&config, &mut stdout).await;
}
