//! # taskchat-engine
//!
//! Natural-language task-management engine: converts a free-text message
//! into one structured task operation, executes it against a task store,
//! and returns a natural-language confirmation plus a record of what was
//! done.
//!
//! ## Pipeline
//!
//! ```text
//! message ──► IntentClassifier ──match──► Sanitizer ─► ToolDispatcher ─► ResponseGenerator
//!                │                                          ▲
//!                └──no match──► KeywordFallbackClassifier ──┘
//!                                    │
//!                                    └──no match──► fixed help response
//! ```
//!
//! The engine is stateless across messages; its only mutable collaborator
//! is the task store behind the [`taskchat_store::TaskStore`] trait.
//!
//! ## Quick start
//!
//! ```ignore
//! use std::sync::Arc;
//! use taskchat_engine::{Engine, EngineConfig};
//! use taskchat_store::{MemoryTaskStore, NoopAudit};
//!
//! let engine = Engine::new(
//!     Arc::new(MemoryTaskStore::new()),
//!     Arc::new(NoopAudit),
//!     EngineConfig::default(),
//! )?;
//! let reply = engine.process("alice", "Add a task to buy groceries").await;
//! ```

pub mod dispatch;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod intent;
pub mod respond;
pub mod sanitize;

// ── re-exports ───────────────────────────────────────────────────────

pub use dispatch::{DispatchOutcome, DispatchPayload, ToolCallRecord, ToolDispatcher};
pub use engine::{Engine, EngineConfig, EngineReply};
pub use error::{EngineError, EngineResult};
pub use fallback::KeywordFallbackClassifier;
pub use intent::{Intent, IntentClassifier};
pub use respond::ResponseGenerator;
pub use sanitize::{SanitizeError, Sanitizer};

pub use taskchat_store::StatusFilter;
