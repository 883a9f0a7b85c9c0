//! Natural-language response rendering.
//!
//! Deterministic templates keyed by the dispatch outcome (whose payload
//! variant carries the intent). No randomness, no state — the same
//! outcome always renders the same string.

use crate::dispatch::{DispatchOutcome, DispatchPayload};

use taskchat_store::{StatusFilter, Task};

/// Fixed help message for messages nothing could classify.
const HELP: &str = "I can help you manage your tasks. Try one of these:\n\
                    - 'Add a task to buy groceries'\n\
                    - 'Show my tasks'\n\
                    - 'Complete task 1'\n\
                    - 'Update task 2 to water the plants'\n\
                    - 'Delete task 3'";

/// Generic apology for operational failures.
const TROUBLE: &str = "Sorry, something went wrong while handling that. Please try again.";

/// Renders replies from dispatch outcomes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseGenerator;

impl ResponseGenerator {
    /// Render the reply for one dispatched intent.
    pub fn render(&self, outcome: &DispatchOutcome) -> String {
        match outcome {
            DispatchOutcome::Ok(payload) => self.render_success(payload),
            DispatchOutcome::NotFound { task_id } => format!(
                "Sorry, I couldn't find task {task_id}. Please check the task ID and try again."
            ),
            DispatchOutcome::Invalid { reason } => format!("That didn't work: {reason}."),
            DispatchOutcome::Failed { .. } => TROUBLE.to_string(),
        }
    }

    /// The fixed help message (no intent, no keyword fallback).
    pub fn help(&self) -> &'static str {
        HELP
    }

    /// The generic operational apology.
    pub fn trouble(&self) -> &'static str {
        TROUBLE
    }

    fn render_success(&self, payload: &DispatchPayload) -> String {
        match payload {
            DispatchPayload::Created(task) => format!(
                "Task '{}' has been added with ID {}.",
                task.title, task.id
            ),
            DispatchPayload::Listing { filter, tasks } => render_listing(*filter, tasks),
            DispatchPayload::Completed(task) => {
                format!("Task '{}' has been marked as completed.", task.title)
            }
            DispatchPayload::Deleted(task) => {
                format!("Task '{}' has been deleted.", task.title)
            }
            DispatchPayload::Updated(task) => {
                format!("Task '{}' has been updated.", task.title)
            }
        }
    }
}

/// One line per task, prefixed with the active filter name when not All.
fn render_listing(filter: StatusFilter, tasks: &[Task]) -> String {
    if tasks.is_empty() {
        return match filter {
            StatusFilter::All => "You don't have any tasks at the moment.".to_string(),
            other => format!("You don't have any {other} tasks at the moment."),
        };
    }

    let mut out = match filter {
        StatusFilter::All => "Here are your tasks:".to_string(),
        other => format!("Here are your {other} tasks:"),
    };
    for task in tasks {
        let marker = if task.completed { "[x]" } else { "[ ]" };
        out.push_str(&format!("\n- {marker} {} (ID: {})", task.title, task.id));
    }
    out
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
