//! Audit trail for dispatched tool calls.
//!
//! The engine hands every dispatched action to an [`AuditSink`]
//! fire-and-forget; the sink's return value is ignored by the caller, so
//! a failing sink can never break message processing.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::StoreResult;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// One dispatched action: who asked for what, and how it went.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The user the action was performed for.
    pub user_id: String,
    /// Tool name of the dispatched intent (e.g. `add_task`).
    pub intent: String,
    /// Arguments the tool was invoked with.
    pub arguments: serde_json::Value,
    /// Normalized outcome, including errors.
    pub outcome: serde_json::Value,
}

/// Receives one entry per dispatched action.
#[async_trait]
pub trait AuditSink: Send + Sync {
    /// Record an entry. Callers ignore the result.
    async fn record(&self, entry: AuditEntry) -> StoreResult<()>;
}

// ═══════════════════════════════════════════════════════════════════════
//  Implementations
// ═══════════════════════════════════════════════════════════════════════

/// SQLite-backed audit log (`audit_log` table).
#[derive(Clone)]
pub struct SqliteAuditLog {
    db: Database,
}

impl SqliteAuditLog {
    /// Create an audit log backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Return the most recent `limit` entries for `user`, newest first.
    #[instrument(skip(self))]
    pub async fn recent(&self, user: &str, limit: i64) -> StoreResult<Vec<AuditEntry>> {
        let user = user.to_string();
        self.db
            .execute(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT user_id, intent, arguments, outcome FROM audit_log \
                     WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
                )?;
                let rows = stmt
                    .query_map(rusqlite::params![user, limit], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, String>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;

                rows.into_iter()
                    .map(|(user_id, intent, arguments, outcome)| {
                        Ok(AuditEntry {
                            user_id,
                            intent,
                            arguments: serde_json::from_str(&arguments)?,
                            outcome: serde_json::from_str(&outcome)?,
                        })
                    })
                    .collect()
            })
            .await
    }
}

#[async_trait]
impl AuditSink for SqliteAuditLog {
    #[instrument(skip(self, entry))]
    async fn record(&self, entry: AuditEntry) -> StoreResult<()> {
        let now = Utc::now().timestamp();
        self.db
            .execute(move |conn| {
                conn.execute(
                    "INSERT INTO audit_log (user_id, intent, arguments, outcome, created_at) \
                     VALUES (?1, ?2, ?3, ?4, ?5)",
                    rusqlite::params![
                        entry.user_id,
                        entry.intent,
                        serde_json::to_string(&entry.arguments)?,
                        serde_json::to_string(&entry.outcome)?,
                        now
                    ],
                )?;
                Ok(())
            })
            .await?;

        debug!("audit entry recorded");
        Ok(())
    }
}

/// Sink that drops everything — for tests and audit-less deployments.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAudit;

#[async_trait]
impl AuditSink for NoopAudit {
    async fn record(&self, _entry: AuditEntry) -> StoreResult<()> {
        Ok(())
    }
}

// ── tests ────────────────────────────────────────────────────────────
