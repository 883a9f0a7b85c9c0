//! Shared helper functions used across CLI subcommands.
//!
//! Includes tracing initialization and configuration loading.

use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::EnvFilter;

use taskchat_engine::EngineConfig;

// ---------------------------------------------------------------------------
// Tracing
// ---------------------------------------------------------------------------

/// Initialize the tracing subscriber with the given default log level.
pub fn init_tracing(default_level: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Settings loaded from the `[engine]` section of `config/default.toml`.
pub struct CliConfig {
    /// Where the SQLite database lives.
    pub db_path: PathBuf,
    /// Engine tunables.
    pub engine: EngineConfig,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("data/taskchat.db"),
            engine: EngineConfig::default(),
        }
    }
}

/// Load configuration from `config/default.toml`.
///
/// Falls back to defaults if the file is missing or the `[engine]`
/// section is absent.
pub fn load_config() -> CliConfig {
    let defaults = CliConfig::default();

    let content = match std::fs::read_to_string("config/default.toml") {
        Ok(c) => c,
        Err(_) => return defaults,
    };

    let table: toml::Table = match content.parse() {
        Ok(t) => t,
        Err(e) => {
            tracing::warn!(error = %e, "config/default.toml is not valid TOML, using defaults");
            return defaults;
        }
    };

    let engine = match table.get("engine") {
        Some(toml::Value::Table(section)) => section,
        _ => return defaults,
    };

    CliConfig {
        db_path: engine
            .get("db_path")
            .and_then(|v| v.as_str())
            .map(PathBuf::from)
            .unwrap_or(defaults.db_path),
        engine: EngineConfig {
            store_timeout: engine
                .get("store_timeout_ms")
                .and_then(|v| v.as_integer())
                .map(|v| Duration::from_millis(v.max(1) as u64))
                .unwrap_or(defaults.engine.store_timeout),
            max_title_len: engine
                .get("max_title_len")
                .and_then(|v| v.as_integer())
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.engine.max_title_len),
            max_description_len: engine
                .get("max_description_len")
                .and_then(|v| v.as_integer())
                .map(|v| v.max(1) as usize)
                .unwrap_or(defaults.engine.max_description_len),
        },
    }
}
