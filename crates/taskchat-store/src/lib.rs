//! # taskchat-store
//!
//! Storage engine for taskchat.
//!
//! Provides SQLite-backed persistence (WAL mode, async access via
//! `spawn_blocking`), the [`TaskStore`] contract the dispatch engine
//! consumes, an in-memory implementation for tests, and the audit trail.
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────┐
//! │  TaskStore trait      AuditSink trait      │
//! ├───────────────────────────────────────────┤
//! │  SqliteTaskStore      SqliteAuditLog       │
//! │  MemoryTaskStore      NoopAudit            │
//! ├───────────────────────────────────────────┤
//! │  Database (rusqlite WAL, Arc<Mutex>)       │
//! │  Migrations (versioned, transactional)     │
//! └───────────────────────────────────────────┘
//! ```

pub mod audit;
pub mod db;
pub mod error;
pub mod memory;
pub mod migration;
pub mod task_store;

// ── re-exports ───────────────────────────────────────────────────────

pub use audit::{AuditEntry, AuditSink, NoopAudit, SqliteAuditLog};
pub use db::Database;
pub use error::{StoreError, StoreResult};
pub use memory::MemoryTaskStore;
pub use task_store::{SqliteTaskStore, StatusFilter, Task, TaskPatch, TaskStore};
