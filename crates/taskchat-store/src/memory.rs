//! In-memory [`TaskStore`] for tests and ephemeral sessions.
//!
//! Same contract and id-assignment rules as the SQLite store, backed by a
//! mutex-guarded map. The mutex is the critical section that keeps
//! read-max-then-append atomic per user.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use tracing::debug;

use crate::error::{StoreError, StoreResult};
use crate::task_store::{StatusFilter, Task, TaskPatch, TaskStore};

/// Mutex-guarded, per-user task map.
#[derive(Debug, Default)]
pub struct MemoryTaskStore {
    inner: Mutex<HashMap<String, Vec<Task>>>,
}

impl MemoryTaskStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn with_tasks<T>(
        &self,
        f: impl FnOnce(&mut HashMap<String, Vec<Task>>) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|e| StoreError::TaskJoin(format!("mutex poisoned: {e}")))?;
        f(&mut guard)
    }
}

fn not_found(user: &str, id: i64) -> StoreError {
    StoreError::NotFound {
        user: user.to_string(),
        id,
    }
}

#[async_trait]
impl TaskStore for MemoryTaskStore {
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
        let now = Utc::now().timestamp();

        self.with_tasks(|tasks| {
            let user_tasks = tasks.entry(user.to_string()).or_default();
            let next_id = user_tasks.iter().map(|t| t.id).max().unwrap_or(0) + 1;
            let task = Task {
                id: next_id,
                user_id: user.to_string(),
                title,
                description: description.map(|d| d.trim().to_string()),
                completed: false,
                created_at: now,
                updated_at: now,
            };
            user_tasks.push(task.clone());
            debug!(user, task_id = task.id, "task created");
            Ok(task)
        })
    }

    async fn list(&self, user: &str, filter: StatusFilter) -> StoreResult<Vec<Task>> {
        self.with_tasks(|tasks| {
            let mut matching: Vec<Task> = tasks
                .get(user)
                .map(|user_tasks| {
                    user_tasks
                        .iter()
                        .filter(|t| match filter {
                            StatusFilter::All => true,
                            StatusFilter::Pending => !t.completed,
                            StatusFilter::Completed => t.completed,
                        })
                        .cloned()
                        .collect()
                })
                .unwrap_or_default();
            matching.sort_by_key(|t| t.id);
            Ok(matching)
        })
    }

    async fn get(&self, user: &str, id: i64) -> StoreResult<Task> {
        self.with_tasks(|tasks| {
            tasks
                .get(user)
                .and_then(|user_tasks| user_tasks.iter().find(|t| t.id == id))
                .cloned()
                .ok_or_else(|| not_found(user, id))
        })
    }

    async fn update(&self, user: &str, id: i64, patch: TaskPatch) -> StoreResult<Task> {
        if let Some(title) = &patch.title
            && title.trim().is_empty()
        {
            return Err(StoreError::Validation("a task title cannot be empty".into()));
        }
        let now = Utc::now().timestamp();

        self.with_tasks(|tasks| {
            let task = tasks
                .get_mut(user)
                .and_then(|user_tasks| user_tasks.iter_mut().find(|t| t.id == id))
                .ok_or_else(|| not_found(user, id))?;

            if patch.is_empty() {
                return Ok(task.clone());
            }

            if let Some(title) = patch.title {
                task.title = title.trim().to_string();
            }
            if let Some(description) = patch.description {
                task.description = Some(description.trim().to_string());
            }
            task.updated_at = now;
            Ok(task.clone())
        })
    }

    async fn delete(&self, user: &str, id: i64) -> StoreResult<Task> {
        self.with_tasks(|tasks| {
            let user_tasks = tasks.get_mut(user).ok_or_else(|| not_found(user, id))?;
            let position = user_tasks
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| not_found(user, id))?;
            Ok(user_tasks.remove(position))
        })
    }

    async fn complete(&self, user: &str, id: i64) -> StoreResult<Task> {
        let now = Utc::now().timestamp();
        self.with_tasks(|tasks| {
            let task = tasks
                .get_mut(user)
                .and_then(|user_tasks| user_tasks.iter_mut().find(|t| t.id == id))
                .ok_or_else(|| not_found(user, id))?;

            if !task.completed {
                task.completed = true;
                task.updated_at = now;
            }
            Ok(task.clone())
        })
    }
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn create_list_roundtrip() {
        let store = MemoryTaskStore::new();

        store.create("alice", "Buy milk", None).await.unwrap();
        let tasks = store.list("alice", StatusFilter::All).await.unwrap();
        assert_eq!(tasks.len(), 1);
        assert_eq!(tasks[0].title, "Buy milk");
        assert_eq!(tasks[0].id, 1);
    }

    #[tokio::test]
    async fn ids_grow_per_user_without_reuse() {
        let store = MemoryTaskStore::new();

        store.create("alice", "one", None).await.unwrap();
        store.create("alice", "two", None).await.unwrap();
        store.delete("alice", 1).await.unwrap();
        let next = store.create("alice", "three", None).await.unwrap();
        assert_eq!(next.id, 3);

        let bob = store.create("bob", "own sequence", None).await.unwrap();
        assert_eq!(bob.id, 1);
    }

    #[tokio::test]
    async fn complete_is_idempotent() {
        let store = MemoryTaskStore::new();

        store.create("alice", "x", None).await.unwrap();
        let first = store.complete("alice", 1).await.unwrap();
        let second = store.complete("alice", 1).await.unwrap();
        assert!(second.completed);
        assert_eq!(second.updated_at, first.updated_at);
    }

    #[tokio::test]
    async fn cross_user_isolation() {
        let store = MemoryTaskStore::new();

        store.create("alice", "mine", None).await.unwrap();
        assert!(store.get("bob", 1).await.is_err());
    }

    #[tokio::test]
    async fn empty_patch_is_noop() {
        let store = MemoryTaskStore::new();

        let created = store.create("alice", "same", None).await.unwrap();
        let updated = store
            .update("alice", 1, TaskPatch::default())
            .await
            .unwrap();
        assert_eq!(updated.title, "same");
        assert_eq!(updated.updated_at, created.updated_at);
    }
}
