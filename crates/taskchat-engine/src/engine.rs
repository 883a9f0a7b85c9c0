//! Engine composition root.
//!
//! Wires the classifiers, sanitizer, dispatcher, and response generator
//! into the single `process` entry point. The engine holds only
//! immutable compiled tables, so one instance behind an `Arc` serves any
//! number of concurrent messages without locking.

use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde::Serialize;
use tracing::{debug, error, warn};

use taskchat_store::{AuditEntry, AuditSink, TaskStore};

use crate::dispatch::{ToolCallRecord, ToolDispatcher};
use crate::error::EngineResult;
use crate::fallback::KeywordFallbackClassifier;
use crate::intent::{Intent, IntentClassifier};
use crate::respond::ResponseGenerator;
use crate::sanitize::Sanitizer;

// ═══════════════════════════════════════════════════════════════════════
//  Configuration
// ═══════════════════════════════════════════════════════════════════════

/// Engine tunables.
#[derive(Debug, Clone, Copy)]
pub struct EngineConfig {
    /// Upper bound on any single task-store call.
    pub store_timeout: Duration,
    /// Maximum title length in characters.
    pub max_title_len: usize,
    /// Maximum description length in characters.
    pub max_description_len: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            store_timeout: Duration::from_secs(5),
            max_title_len: 255,
            max_description_len: 1000,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Engine
// ═══════════════════════════════════════════════════════════════════════

/// Reply to one processed message.
#[derive(Debug, Clone, Serialize)]
pub struct EngineReply {
    /// Natural-language response text.
    pub response: String,
    /// Zero or one records of the action that was dispatched.
    pub tool_calls: Vec<ToolCallRecord>,
}

/// The task-management intent engine.
pub struct Engine {
    classifier: IntentClassifier,
    fallback: KeywordFallbackClassifier,
    dispatcher: ToolDispatcher,
    responder: ResponseGenerator,
    audit: Arc<dyn AuditSink>,
}

impl Engine {
    /// Build the engine over a task store and an audit sink.
    ///
    /// Compiles the pattern and keyword tables once; the result is
    /// `Send + Sync` and meant to be shared behind an `Arc`.
    pub fn new(
        store: Arc<dyn TaskStore>,
        audit: Arc<dyn AuditSink>,
        config: EngineConfig,
    ) -> EngineResult<Self> {
        let sanitizer = Sanitizer::new(config.max_title_len, config.max_description_len);
        Ok(Self {
            classifier: IntentClassifier::new()?,
            fallback: KeywordFallbackClassifier::new()?,
            dispatcher: ToolDispatcher::new(store, sanitizer, config.store_timeout),
            responder: ResponseGenerator,
            audit,
        })
    }

    /// Process one user message.
    ///
    /// Always returns a reply: classification misses yield the help
    /// message, store faults yield an apology, and even a panic anywhere
    /// in the pipeline is caught here and converted to the generic
    /// operational response.
    pub async fn process(&self, user_id: &str, message: &str) -> EngineReply {
        let result = AssertUnwindSafe(self.process_inner(user_id, message))
            .catch_unwind()
            .await;

        match result {
            Ok(reply) => reply,
            Err(_) => {
                error!(user = user_id, "message processing panicked");
                EngineReply {
                    response: self.responder.trouble().to_string(),
                    tool_calls: Vec::new(),
                }
            }
        }
    }

    async fn process_inner(&self, user_id: &str, message: &str) -> EngineReply {
        // 1. Pattern classification, then keyword fallback.
        let intent = match self.classifier.classify(message) {
            Intent::Unrecognized => match self.fallback.classify(message) {
                Some(intent) => intent,
                None => {
                    debug!(user = user_id, "no intent recognized, sending help");
                    return EngineReply {
                        response: self.responder.help().to_string(),
                        tool_calls: Vec::new(),
                    };
                }
            },
            intent => intent,
        };

        // 2. One store operation, normalized.
        let outcome = self.dispatcher.dispatch(user_id, &intent).await;
        let record = ToolCallRecord::new(&intent, user_id, &outcome);

        // 3. Fire-and-forget audit.
        self.emit_audit(user_id, &record);

        // 4. Render the reply.
        EngineReply {
            response: self.responder.render(&outcome),
            tool_calls: vec![record],
        }
    }

    /// Hand the record to the audit sink on a detached task.
    fn emit_audit(&self, user_id: &str, record: &ToolCallRecord) {
        let entry = AuditEntry {
            user_id: user_id.to_string(),
            intent: record.intent.to_string(),
            arguments: record.arguments.clone(),
            outcome: record.outcome.clone(),
        };
        let audit = Arc::clone(&self.audit);
        tokio::spawn(async move {
            if let Err(e) = audit.record(entry).await {
                warn!(error = %e, "audit sink rejected entry");
            }
        });
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
