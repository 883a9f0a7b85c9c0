//! Per-user task persistence.
//!
//! Defines the [`TaskStore`] contract consumed by the dispatch engine and
//! the SQLite-backed [`SqliteTaskStore`] implementation. Every operation is
//! keyed by `(user, ...)` and the store filters on ownership in SQL, so a
//! caller can never reach another user's tasks through any code path above
//! this module.

use async_trait::async_trait;
use chrono::Utc;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::db::Database;
use crate::error::{StoreError, StoreResult};

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A persisted task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Numeric identifier, unique within the owning user.
    pub id: i64,
    /// Opaque identifier of the owning user.
    pub user_id: String,
    /// Short description of what has to be done.
    pub title: String,
    /// Optional longer free-text description.
    pub description: Option<String>,
    /// Whether the task has been completed.
    pub completed: bool,
    /// Unix timestamp when the task was created.
    pub created_at: i64,
    /// Unix timestamp when the task was last mutated.
    pub updated_at: i64,
}

impl Task {
    /// Human-readable status label, matching the list filter vocabulary.
    pub fn status(&self) -> &'static str {
        if self.completed { "completed" } else { "pending" }
    }

    /// Compact summary used in tool-call records and audit rows.
    pub fn summary(&self) -> serde_json::Value {
        serde_json::json!({
            "task_id": self.id,
            "title": self.title,
            "status": self.status(),
        })
    }
}

/// Restricts which tasks a `list` call returns.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    /// Every task regardless of state.
    #[default]
    All,
    /// Only tasks not yet completed.
    Pending,
    /// Only completed tasks.
    Completed,
}

impl StatusFilter {
    /// The filter's wire/database string representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::All => "all",
            Self::Pending => "pending",
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Partial-update fields for [`TaskStore::update`].
///
/// `None` fields are left untouched. An all-`None` patch is a successful
/// no-op returning the unchanged task.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    /// Replacement title, if any. Must be non-empty.
    pub title: Option<String>,
    /// Replacement description, if any.
    pub description: Option<String>,
}

impl TaskPatch {
    /// Whether the patch changes nothing.
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.description.is_none()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Contract
// ═══════════════════════════════════════════════════════════════════════

/// Per-user CRUD operations over tasks.
///
/// Implementations must guarantee atomic per-user id generation: two
/// concurrent `create` calls for the same user must never hand out the
/// same id. Ids are assigned `max(existing) + 1` (1 for the first task);
/// gaps left by deletions are never refilled.
#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Create and persist a new task owned by `user`.
    async fn create(
        &self,
        user: &str,
        title: &str,
        description: Option<&str>,
    ) -> StoreResult<Task>;

    /// Return `user`'s tasks matching `filter`, ordered by id.
    async fn list(&self, user: &str, filter: StatusFilter) -> StoreResult<Vec<Task>>;

    /// Fetch a single task owned by `user`.
    async fn get(&self, user: &str, id: i64) -> StoreResult<Task>;

    /// Apply `patch` to a task and return the updated row.
    ///
    /// An empty patch returns the task unchanged without touching
    /// `updated_at`.
    async fn update(&self, user: &str, id: i64, patch: TaskPatch) -> StoreResult<Task>;

    /// Remove a task and return its last-known state.
    async fn delete(&self, user: &str, id: i64) -> StoreResult<Task>;

    /// Mark a task completed and return it.
    ///
    /// Idempotent: completing an already-completed task returns the current
    /// state without a further mutation (`updated_at` stays put).
    async fn complete(&self, user: &str, id: i64) -> StoreResult<Task>;
}

// ═══════════════════════════════════════════════════════════════════════
//  SqliteTaskStore
// ═══════════════════════════════════════════════════════════════════════

/// SQLite-backed [`TaskStore`].
#[derive(Clone)]
pub struct SqliteTaskStore {
    db: Database,
}

impl SqliteTaskStore {
    /// Create a new task store backed by `db`.
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

const TASK_COLUMNS: &str = "user_id, id, title, description, completed, created_at, updated_at";

/// Map one `tasks` row to a [`Task`].
fn task_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Task> {
    Ok(Task {
        user_id: row.get(0)?,
        id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        completed: row.get(4)?,
        created_at: row.get(5)?,
        updated_at: row.get(6)?,
    })
}

/// Fetch a task inside a store closure, mapping no-rows to `NotFound`.
fn fetch_task(conn: &Connection, user: &str, id: i64) -> StoreResult<Task> {
    let result = conn.query_row(
        &format!("SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND id = ?2"),
        rusqlite::params![user, id],
        task_from_row,
    );
    match result {
        Ok(task) => Ok(task),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(StoreError::NotFound {
            user: user.to_string(),
            id,
        }),
        Err(e) => Err(StoreError::Sqlite(e)),
    }
}

#[async_trait]
impl TaskStore for SqliteTaskStore {
    #[instrument(skip(self, description))]
    async fn create(
        &self,
        user: &str,
        title: &str,
        description: Option<&str>,
    ) -> StoreResult<Task> {
        let title = title.trim().to_string();
        if title.is_empty() {
            return Err(StoreError::Validation("a task title cannot be empty".into()));
        }
        let user = user.to_string();
        let description = description.map(|d| d.trim().to_string());
        let now = Utc::now().timestamp();

        let task = self
            .db
            .execute_mut(move |conn| {
                // Read-max-then-append runs as one transaction on the
                // store's single serialized connection, so concurrent
                // creates for the same user cannot race the id.
                let tx = conn.transaction()?;
                let next_id: i64 = tx.query_row(
                    "SELECT COALESCE(MAX(id), 0) + 1 FROM tasks WHERE user_id = ?1",
                    rusqlite::params![user],
                    |row| row.get(0),
                )?;
                tx.execute(
                    "INSERT INTO tasks (user_id, id, title, description, completed, created_at, updated_at) \
                     VALUES (?1, ?2, ?3, ?4, 0, ?5, ?5)",
                    rusqlite::params![user, next_id, title, description, now],
                )?;
                tx.commit()?;

                Ok(Task {
                    id: next_id,
                    user_id: user,
                    title,
                    description,
                    completed: false,
                    created_at: now,
                    updated_at: now,
                })
            })
            .await?;

        debug!(user = %task.user_id, task_id = task.id, "task created");
        Ok(task)
    }

    #[instrument(skip(self))]
    async fn list(&self, user: &str, filter: StatusFilter) -> StoreResult<Vec<Task>> {
        let user = user.to_string();
        self.db
            .execute(move |conn| {
                let sql = match filter {
                    StatusFilter::All => format!(
                        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 ORDER BY id ASC"
                    ),
                    StatusFilter::Pending => format!(
                        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND completed = 0 ORDER BY id ASC"
                    ),
                    StatusFilter::Completed => format!(
                        "SELECT {TASK_COLUMNS} FROM tasks WHERE user_id = ?1 AND completed = 1 ORDER BY id ASC"
                    ),
                };
                let mut stmt = conn.prepare(&sql)?;
                let tasks = stmt
                    .query_map(rusqlite::params![user], task_from_row)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(tasks)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn get(&self, user: &str, id: i64) -> StoreResult<Task> {
        let user = user.to_string();
        self.db
            .execute(move |conn| fetch_task(conn, &user, id))
            .await
    }

    #[instrument(skip(self, patch))]
    async fn update(&self, user: &str, id: i64, patch: TaskPatch) -> StoreResult<Task> {
        let user = user.to_string();
        let now = Utc::now().timestamp();

        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(StoreError::Validation("a task title cannot be empty".into()));
        }

        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                let mut task = fetch_task(&tx, &user, id)?;

                if patch.is_empty() {
                    tx.commit()?;
                    return Ok(task);
                }

                if let Some(title) = patch.title {
                    task.title = title.trim().to_string();
                }
                if let Some(description) = patch.description {
                    task.description = Some(description.trim().to_string());
                }
                task.updated_at = now;

                tx.execute(
                    "UPDATE tasks SET title = ?3, description = ?4, updated_at = ?5 \
                     WHERE user_id = ?1 AND id = ?2",
                    rusqlite::params![user, id, task.title, task.description, now],
                )?;
                tx.commit()?;

                debug!(user = %user, task_id = id, "task updated");
                Ok(task)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn delete(&self, user: &str, id: i64) -> StoreResult<Task> {
        let user = user.to_string();
        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                let task = fetch_task(&tx, &user, id)?;
                tx.execute(
                    "DELETE FROM tasks WHERE user_id = ?1 AND id = ?2",
                    rusqlite::params![user, id],
                )?;
                tx.commit()?;

                debug!(user = %user, task_id = id, "task deleted");
                Ok(task)
            })
            .await
    }

    #[instrument(skip(self))]
    async fn complete(&self, user: &str, id: i64) -> StoreResult<Task> {
        let user = user.to_string();
        let now = Utc::now().timestamp();
        self.db
            .execute_mut(move |conn| {
                let tx = conn.transaction()?;
                let mut task = fetch_task(&tx, &user, id)?;

                // Already done: report current state, leave timestamps alone.
                if task.completed {
                    tx.commit()?;
                    return Ok(task);
                }

                tx.execute(
                    "UPDATE tasks SET completed = 1, updated_at = ?3 \
                     WHERE user_id = ?1 AND id = ?2",
                    rusqlite::params![user, id, now],
                )?;
                tx.commit()?;

                task.completed = true;
                task.updated_at = now;
                debug!(user = %user, task_id = id, "task completed");
                Ok(task)
            })
            .await
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
#[path = "task_store_tests.rs"]
mod tests;
