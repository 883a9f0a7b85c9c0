//! End-to-end tests over the full message pipeline: classification,
//! sanitization, dispatch against a real store, response rendering, and
//! the returned tool-call records.

use std::sync::Arc;

use taskchat_engine::{Engine, EngineConfig};
use taskchat_store::{
    Database, MemoryTaskStore, NoopAudit, SqliteAuditLog, SqliteTaskStore, StatusFilter, TaskStore,
};

fn memory_engine() -> Engine {
    Engine::new(
        Arc::new(MemoryTaskStore::new()),
        Arc::new(NoopAudit),
        EngineConfig::default(),
    )
    .unwrap()
}

async fn sqlite_engine() -> (Engine, SqliteAuditLog, Arc<SqliteTaskStore>) {
    let db = Database::open_in_memory().unwrap();
    db.run_migrations().await.unwrap();
    let store = Arc::new(SqliteTaskStore::new(db.clone()));
    let audit = SqliteAuditLog::new(db);
    let engine = Engine::new(
        store.clone(),
        Arc::new(audit.clone()),
        EngineConfig::default(),
    )
    .unwrap();
    (engine, audit, store)
}

// ── add round trip ───────────────────────────────────────────────────

#[tokio::test]
async fn add_then_list_round_trip() {
    let engine = memory_engine();

    let reply = engine.process("alice", "Add a task to buy groceries").await;
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].intent, "add_task");
    assert_eq!(reply.tool_calls[0].arguments["title"], "buy groceries");
    assert!(reply.response.contains("buy groceries"));
    assert!(reply.response.contains("ID 1"));

    let reply = engine.process("alice", "Show my tasks").await;
    assert_eq!(reply.tool_calls.len(), 1);
    assert_eq!(reply.tool_calls[0].intent, "list_tasks");
    assert!(reply.response.contains("buy groceries"));
    assert!(reply.response.contains("(ID: 1)"));
}

#[tokio::test]
async fn completed_filter_excludes_until_completed() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to buy milk").await;

    let reply = engine.process("alice", "Show my completed tasks").await;
    assert!(reply.response.contains("don't have any completed tasks"));

    engine.process("alice", "Complete task 1").await;

    let reply = engine.process("alice", "Show my completed tasks").await;
    assert!(reply.response.contains("buy milk"));
    assert!(reply.response.contains("[x]"));
}

#[tokio::test]
async fn pending_filter_lists_only_incomplete() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to buy milk").await;
    engine.process("alice", "Add a task to call mom").await;
    engine.process("alice", "Complete task 1").await;

    let reply = engine.process("alice", "Show my pending tasks").await;
    assert_eq!(reply.tool_calls[0].arguments["status"], "pending");
    assert!(reply.response.contains("call mom"));
    assert!(!reply.response.contains("buy milk"));
}

// ── idempotence ──────────────────────────────────────────────────────

#[tokio::test]
async fn completing_twice_reports_completed_both_times() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to buy milk").await;

    let first = engine.process("alice", "Complete task 1").await;
    assert!(first.response.contains("marked as completed"));

    let second = engine.process("alice", "Complete task 1").await;
    assert!(second.response.contains("marked as completed"));
    assert_eq!(second.tool_calls[0].outcome["status"], "success");
}

// ── cross-user isolation ─────────────────────────────────────────────

#[tokio::test]
async fn users_have_disjoint_task_spaces() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to water plants").await;
    engine.process("bob", "Add a task to fix the sink").await;

    // Both hold a task numbered 1.
    engine.process("alice", "Complete task 1").await;

    let bobs = engine.process("bob", "Show my pending tasks").await;
    assert!(bobs.response.contains("fix the sink"));

    let alices = engine.process("alice", "Show my pending tasks").await;
    assert!(alices.response.contains("don't have any pending tasks"));
}

// ── misses and fallbacks ─────────────────────────────────────────────

#[tokio::test]
async fn gibberish_yields_zero_tool_calls_and_help() {
    let engine = memory_engine();

    let reply = engine.process("alice", "asdkjasd").await;
    assert!(reply.tool_calls.is_empty());
    assert!(reply.response.contains("Add a task to buy groceries"));
    assert!(reply.response.contains("Complete task 1"));
}

#[tokio::test]
async fn complete_missing_task_records_not_found() {
    let engine = memory_engine();

    let reply = engine.process("alice", "Complete task 3").await;
    assert_eq!(reply.tool_calls.len(), 1);
    let record = &reply.tool_calls[0];
    assert_eq!(record.intent, "complete_task");
    assert_eq!(record.arguments["task_id"], 3);
    assert_eq!(record.outcome["status"], "not_found");
    assert!(reply.response.contains("task 3"));
    assert!(reply.response.starts_with("Sorry"));
}

#[tokio::test]
async fn update_renames_a_task() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to buy milk").await;
    let reply = engine
        .process("alice", "Update task 1 to buy oat milk")
        .await;
    assert_eq!(reply.tool_calls[0].intent, "update_task");
    assert!(reply.response.contains("buy oat milk"));

    let listed = engine.process("alice", "Show my tasks").await;
    assert!(listed.response.contains("buy oat milk"));
    assert!(!listed.response.contains("(ID: 2)"));
}

#[tokio::test]
async fn delete_removes_the_task() {
    let engine = memory_engine();

    engine.process("alice", "Add a task to buy milk").await;
    let reply = engine.process("alice", "Delete task 1").await;
    assert!(reply.response.contains("buy milk"));
    assert!(reply.response.contains("deleted"));

    let listed = engine.process("alice", "Show my tasks").await;
    assert!(listed.response.contains("don't have any tasks"));
}

#[tokio::test]
async fn at_most_one_tool_call_per_message() {
    let engine = memory_engine();

    for message in [
        "Add a task to buy milk and delete task 99",
        "complete task 1 and delete task 1",
        "show my tasks",
        "asdkjasd",
    ] {
        let reply = engine.process("alice", message).await;
        assert!(
            reply.tool_calls.len() <= 1,
            "{message:?} produced {} tool calls",
            reply.tool_calls.len()
        );
    }
}

// ── sqlite-backed engine ─────────────────────────────────────────────

#[tokio::test]
async fn sqlite_engine_round_trip_with_audit_trail() {
    let (engine, audit, store) = sqlite_engine().await;

    let reply = engine.process("alice", "Add a task to buy groceries").await;
    assert!(reply.response.contains("ID 1"));

    let reply = engine.process("alice", "Complete task 1").await;
    assert!(reply.response.contains("buy groceries"));

    // The store saw the mutation.
    let task = store.get("alice", 1).await.unwrap();
    assert!(task.completed);

    // The audit sink is fire-and-forget; give the spawned task a moment.
    let mut entries = Vec::new();
    for _ in 0..50 {
        entries = audit.recent("alice", 10).await.unwrap();
        if entries.len() == 2 {
            break;
        }
        tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    }
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].intent, "complete_task");
    assert_eq!(entries[1].intent, "add_task");
}

#[tokio::test]
async fn concurrent_messages_share_one_engine() {
    let (engine, _audit, store) = sqlite_engine().await;
    let engine = Arc::new(engine);

    let mut handles = Vec::new();
    for i in 0..8 {
        let engine = Arc::clone(&engine);
        let user = if i % 2 == 0 { "alice" } else { "bob" };
        handles.push(tokio::spawn(async move {
            engine
                .process(user, &format!("Add a task to errand number {i}"))
                .await
        }));
    }
    for handle in handles {
        let reply = handle.await.unwrap();
        assert_eq!(reply.tool_calls[0].outcome["status"], "success");
    }

    // Four tasks each, ids 1..=4 with no duplicates.
    for user in ["alice", "bob"] {
        let mut ids: Vec<i64> = store
            .list(user, StatusFilter::All)
            .await
            .unwrap()
            .iter()
            .map(|t| t.id)
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
