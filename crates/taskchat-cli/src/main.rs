//! CLI entry point for taskchat.
//!
//! This binary provides the `taskchat` command with subcommands for the
//! interactive chat REPL and a status view over the task store.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

mod helpers;
mod repl;

use taskchat_store::{Database, SqliteAuditLog, SqliteTaskStore, StatusFilter, TaskStore};

use helpers::{init_tracing, load_config};

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

/// taskchat — manage your tasks by chatting.
#[derive(Parser)]
#[command(
    name = "taskchat",
    version,
    about = "taskchat — natural-language task management",
    long_about = "A chat assistant that turns plain-English messages into task \
                  operations: add, list, complete, update, and delete."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the interactive chat REPL.
    Run {
        /// User id the session acts as.
        #[arg(long, default_value = "local")]
        user: String,

        /// Database path (overrides config).
        #[arg(long)]
        db: Option<PathBuf>,
    },

    /// Show task counts and recent activity for a user.
    Status {
        /// User id to inspect.
        #[arg(long, default_value = "local")]
        user: String,

        /// Database path (overrides config).
        #[arg(long)]
        db: Option<PathBuf>,
    },
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run { user, db } => repl::cmd_run(user, db).await,
        Commands::Status { user, db } => cmd_status(user, db).await,
    }
}

// ---------------------------------------------------------------------------
// Subcommand: status
// ---------------------------------------------------------------------------

async fn cmd_status(user: String, db_override: Option<PathBuf>) -> Result<()> {
    init_tracing("warn");

    let config = load_config();
    let db_path = db_override.unwrap_or(config.db_path);
    let db = Database::open_and_migrate(db_path.clone())
        .await
        .context("failed to open database")?;

    let store = SqliteTaskStore::new(db.clone());
    let audit = SqliteAuditLog::new(db);

    let all = store.list(&user, StatusFilter::All).await?;
    let pending = all.iter().filter(|t| !t.completed).count();

    println!("User:      {user}");
    println!("Database:  {}", db_path.display());
    println!(
        "Tasks:     {} total, {} pending, {} completed",
        all.len(),
        pending,
        all.len() - pending
    );

    let entries = audit.recent(&user, 5).await?;
    if !entries.is_empty() {
        println!("Recent activity:");
        for entry in entries {
            println!(
                "  {} -> {}",
                entry.intent,
                entry.outcome["status"].as_str().unwrap_or("?")
            );
        }
    }

    Ok(())
}
