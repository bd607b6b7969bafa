//! Terminal driver for the to-do core.
//!
//! # Responsibility
//! - Run one list operation per invocation against the on-device database.
//! - Print the resulting newest-first list for quick local checks.

use clap::{Parser, Subcommand};
use std::process::ExitCode;
use std::sync::Arc;
use todo_core::{
    resolve_db_path, InitOutcome, ItemCollection, ItemId, ItemStore, SqliteKeyValueStore,
    StoreConfig, WritePolicy,
};

#[derive(Debug, Parser)]
#[command(name = "todo", version, about = "Manage the to-do list from a terminal")]
struct Cli {
    /// Database file; defaults to `TODO_DB_PATH` or the temp directory.
    #[arg(long, global = true)]
    db: Option<std::path::PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage information.
    Ping,
    /// Show all items, newest first.
    List,
    /// Add an item.
    Add { text: String },
    /// Mark an item completed.
    Done { id: String },
    /// Mark an item open again.
    Undo { id: String },
    /// Delete one item.
    Rm { id: String },
    /// Delete every item.
    Clear,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Command::Ping = cli.command {
        println!("todo_core ping={}", todo_core::ping());
        println!("todo_core version={}", todo_core::core_version());
        return ExitCode::SUCCESS;
    }

    let db_path = cli.db.unwrap_or_else(resolve_db_path);
    let storage = match SqliteKeyValueStore::open(&db_path) {
        Ok(storage) => Arc::new(storage),
        Err(err) => {
            eprintln!("cannot open `{}`: {err}", db_path.display());
            return ExitCode::FAILURE;
        }
    };
    let config = StoreConfig::default().with_write_policy(WritePolicy::Await);
    let mut store = match ItemStore::new(storage, config) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{err}");
            return ExitCode::FAILURE;
        }
    };

    store.initialize();
    if let InitOutcome::Degraded(fault) = store.init_outcome() {
        eprintln!("warning: previous items unavailable ({fault})");
    }

    let items = match cli.command {
        Command::Ping | Command::List => store.snapshot(),
        Command::Add { text } => store.add(&text),
        Command::Done { id } => store.complete(&ItemId::from(id)),
        Command::Undo { id } => store.incomplete(&ItemId::from(id)),
        Command::Rm { id } => store.delete(&ItemId::from(id)),
        Command::Clear => store.clear(),
    };

    print_items(&items);
    if store.persist_stats().failed > 0 {
        eprintln!("warning: changes were not saved");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn print_items(items: &ItemCollection) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    for item in items.newest_first() {
        let mark = if item.is_completed { "x" } else { " " };
        println!("[{mark}] {}  {}", item.id, item.text);
    }
}
