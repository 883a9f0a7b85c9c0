//! Tool dispatch — maps a resolved intent onto one task-store operation.
//!
//! The dispatcher owns the sanitizer and the store handle. Exactly one
//! store operation runs per dispatched intent; its result is normalized
//! into a [`DispatchOutcome`] so that nothing the store does (including
//! hanging past the timeout) can escape as an error.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};

use taskchat_store::{StatusFilter, StoreError, StoreResult, Task, TaskPatch, TaskStore};

use crate::intent::Intent;
use crate::sanitize::Sanitizer;

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// What a successful dispatch produced.
#[derive(Debug, Clone)]
pub enum DispatchPayload {
    /// A task was created.
    Created(Task),
    /// Tasks were listed under the given filter.
    Listing {
        filter: StatusFilter,
        tasks: Vec<Task>,
    },
    /// A task was marked completed (or already was).
    Completed(Task),
    /// A task was removed; this is its last-known state.
    Deleted(Task),
    /// A task was renamed (or the update was an explicit no-op).
    Updated(Task),
}

/// Normalized result of dispatching one intent.
#[derive(Debug, Clone)]
pub enum DispatchOutcome {
    /// The store operation succeeded.
    Ok(DispatchPayload),
    /// The task does not exist for this user.
    NotFound { task_id: i64 },
    /// An extracted field failed validation.
    Invalid { reason: String },
    /// The store was unreachable, timed out, or failed unexpectedly.
    Failed { error: String },
}

impl DispatchOutcome {
    /// JSON form attached to tool-call records and audit entries.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Self::Ok(payload) => match payload {
                DispatchPayload::Created(task)
                | DispatchPayload::Completed(task)
                | DispatchPayload::Deleted(task)
                | DispatchPayload::Updated(task) => {
                    serde_json::json!({"status": "success", "task": task.summary()})
                }
                DispatchPayload::Listing { filter, tasks } => serde_json::json!({
                    "status": "success",
                    "filter": filter.as_str(),
                    "count": tasks.len(),
                    "tasks": tasks.iter().map(Task::summary).collect::<Vec<_>>(),
                }),
            },
            Self::NotFound { task_id } => {
                serde_json::json!({"status": "not_found", "task_id": task_id})
            }
            Self::Invalid { reason } => {
                serde_json::json!({"status": "invalid", "reason": reason})
            }
            Self::Failed { error } => {
                serde_json::json!({"status": "error", "error": error})
            }
        }
    }
}

/// Structured record of one dispatched action, returned to the caller.
#[derive(Debug, Clone, Serialize)]
pub struct ToolCallRecord {
    /// Tool name (e.g. `add_task`).
    pub intent: &'static str,
    /// Arguments the tool was invoked with, including the user id.
    pub arguments: serde_json::Value,
    /// Normalized outcome, including errors.
    pub outcome: serde_json::Value,
}

impl ToolCallRecord {
    /// Build the record for an intent dispatched on behalf of `user`.
    pub fn new(intent: &Intent, user: &str, outcome: &DispatchOutcome) -> Self {
        Self {
            intent: intent.tool_name(),
            arguments: intent.arguments(user),
            outcome: outcome.to_json(),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  ToolDispatcher
// ═══════════════════════════════════════════════════════════════════════

/// Executes resolved intents against the task store.
pub struct ToolDispatcher {
    store: Arc<dyn TaskStore>,
    sanitizer: Sanitizer,
    store_timeout: Duration,
}

impl ToolDispatcher {
    /// Create a dispatcher over `store`.
    pub fn new(store: Arc<dyn TaskStore>, sanitizer: Sanitizer, store_timeout: Duration) -> Self {
        Self {
            store,
            sanitizer,
            store_timeout,
        }
    }

    /// Dispatch one intent. Never fails — every fault becomes an outcome.
    pub async fn dispatch(&self, user: &str, intent: &Intent) -> DispatchOutcome {
        debug!(user, tool = intent.tool_name(), "dispatching");
        match intent {
            Intent::AddTask { title } => self.add(user, title).await,
            Intent::ListTasks { filter } => self.list(user, *filter).await,
            Intent::CompleteTask { task_id } => self.complete(user, *task_id).await,
            Intent::DeleteTask { task_id } => self.delete(user, *task_id).await,
            Intent::UpdateTask { task_id, title } => {
                self.update(user, *task_id, title.as_deref()).await
            }
            // The engine never dispatches this variant.
            Intent::Unrecognized => DispatchOutcome::Failed {
                error: "nothing to dispatch for an unrecognized intent".into(),
            },
        }
    }

    async fn add(&self, user: &str, title: &str) -> DispatchOutcome {
        let title = match self.sanitizer.title(title) {
            Ok(title) => title,
            Err(e) => return DispatchOutcome::Invalid { reason: e.to_string() },
        };
        match self.run(self.store.create(user, &title, None)).await {
            Ok(task) => DispatchOutcome::Ok(DispatchPayload::Created(task)),
            Err(outcome) => outcome,
        }
    }

    async fn list(&self, user: &str, filter: StatusFilter) -> DispatchOutcome {
        match self.run(self.store.list(user, filter)).await {
            Ok(tasks) => DispatchOutcome::Ok(DispatchPayload::Listing { filter, tasks }),
            Err(outcome) => outcome,
        }
    }

    async fn complete(&self, user: &str, task_id: i64) -> DispatchOutcome {
        if task_id <= 0 {
            return DispatchOutcome::NotFound { task_id };
        }
        match self.run(self.store.complete(user, task_id)).await {
            Ok(task) => DispatchOutcome::Ok(DispatchPayload::Completed(task)),
            Err(outcome) => outcome,
        }
    }

    async fn delete(&self, user: &str, task_id: i64) -> DispatchOutcome {
        if task_id <= 0 {
            return DispatchOutcome::NotFound { task_id };
        }
        match self.run(self.store.delete(user, task_id)).await {
            Ok(task) => DispatchOutcome::Ok(DispatchPayload::Deleted(task)),
            Err(outcome) => outcome,
        }
    }

    async fn update(&self, user: &str, task_id: i64, title: Option<&str>) -> DispatchOutcome {
        if task_id <= 0 {
            return DispatchOutcome::NotFound { task_id };
        }
        // An empty replacement title collapses to None, which the store
        // treats as a successful no-op.
        let title = match self.sanitizer.optional_title(title) {
            Ok(title) => title,
            Err(e) => return DispatchOutcome::Invalid { reason: e.to_string() },
        };
        let patch = TaskPatch {
            title,
            description: None,
        };
        match self.run(self.store.update(user, task_id, patch)).await {
            Ok(task) => DispatchOutcome::Ok(DispatchPayload::Updated(task)),
            Err(outcome) => outcome,
        }
    }

    /// Run one store future under the timeout, normalizing errors.
    async fn run<T>(
        &self,
        fut: impl Future<Output = StoreResult<T>> + Send,
    ) -> Result<T, DispatchOutcome> {
        match tokio::time::timeout(self.store_timeout, fut).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(StoreError::NotFound { id, .. })) => {
                Err(DispatchOutcome::NotFound { task_id: id })
            }
            Ok(Err(StoreError::Validation(reason))) => Err(DispatchOutcome::Invalid { reason }),
            Ok(Err(e)) => {
                warn!(error = %e, "store operation failed");
                Err(DispatchOutcome::Failed {
                    error: e.to_string(),
                })
            }
            Err(_) => {
                warn!(
                    timeout_ms = self.store_timeout.as_millis() as u64,
                    "store operation timed out"
                );
                Err(DispatchOutcome::Failed {
                    error: format!(
                        "store call timed out after {}ms",
                        self.store_timeout.as_millis()
                    ),
                })
            }
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
