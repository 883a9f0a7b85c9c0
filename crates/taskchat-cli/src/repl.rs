//! Subcommand: `taskchat run` — interactive chat REPL.
//!
//! Reads messages from stdin, runs each through the engine, and prints
//! the reply. One engine instance serves the whole session.

use std::io::{self, BufRead, Write as _};
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info};

use taskchat_engine::Engine;
use taskchat_store::{Database, SqliteAuditLog, SqliteTaskStore};

use crate::helpers::{init_tracing, load_config};

/// Run the interactive REPL as `user`.
pub async fn cmd_run(user: String, db_override: Option<PathBuf>) -> Result<()> {
    // 1. Initialize tracing.
    init_tracing("info");

    info!("starting taskchat");

    // 2. Load config and resolve the database path.
    let config = load_config();
    let db_path = db_override.unwrap_or(config.db_path);
    if let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
        && !parent.exists()
    {
        std::fs::create_dir_all(parent).context("failed to create data directory")?;
    }

    // 3. Open the store and build the engine.
    let db = Database::open_and_migrate(db_path.clone())
        .await
        .context("failed to open database")?;
    info!(path = %db_path.display(), "store initialized");

    let store = Arc::new(SqliteTaskStore::new(db.clone()));
    let audit = Arc::new(SqliteAuditLog::new(db));
    let engine = Engine::new(store, audit, config.engine).context("failed to build engine")?;
    info!("engine ready");

    // 4. Enter the REPL loop.
    println!();
    println!("  taskchat v{}", env!("CARGO_PKG_VERSION"));
    println!("  Chatting as '{user}'. Type a message, or 'quit' to exit.");
    println!();

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("> ");
        stdout.flush().context("failed to flush stdout")?;

        let mut line = String::new();
        let read = stdin
            .lock()
            .read_line(&mut line)
            .context("failed to read input")?;
        if read == 0 {
            // EOF.
            break;
        }

        let message = line.trim();
        if message.is_empty() {
            continue;
        }
        if message == "quit" || message == "exit" {
            info!("user requested exit");
            break;
        }

        let reply = engine.process(&user, message).await;
        for call in &reply.tool_calls {
            debug!(
                tool = call.intent,
                outcome = %call.outcome["status"],
                "tool call"
            );
        }
        println!("{}", reply.response);
        println!();
    }

    println!("Goodbye.");
    Ok(())
}
