//! Pattern-based intent classification.
//!
//! Intents are recognized by a declarative table of regex patterns,
//! grouped by intent and tried strictly top to bottom: intents in fixed
//! priority order (add, list, complete, delete, update), and within an
//! intent its variants in declared order. The first row that matches —
//! and whose extractor yields usable parameters — wins, and scanning
//! stops. Matching is case-insensitive (the message is lowercased once
//! up front).

use aho_corasick::AhoCorasick;
use regex::Regex;
use tracing::debug;

use taskchat_store::StatusFilter;

use crate::error::{EngineError, EngineResult};

// ═══════════════════════════════════════════════════════════════════════
//  Types
// ═══════════════════════════════════════════════════════════════════════

/// A classified user request carrying its extracted parameters.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Create a new task with the given title.
    AddTask { title: String },
    /// List tasks, restricted by the status filter.
    ListTasks { filter: StatusFilter },
    /// Mark a task as completed.
    CompleteTask { task_id: i64 },
    /// Remove a task.
    DeleteTask { task_id: i64 },
    /// Rename a task; `None` title means nothing to change.
    UpdateTask {
        task_id: i64,
        title: Option<String>,
    },
    /// Nothing matched.
    Unrecognized,
}

impl Intent {
    /// Tool name used in tool-call records and the audit trail.
    pub fn tool_name(&self) -> &'static str {
        match self {
            Self::AddTask { .. } => "add_task",
            Self::ListTasks { .. } => "list_tasks",
            Self::CompleteTask { .. } => "complete_task",
            Self::DeleteTask { .. } => "delete_task",
            Self::UpdateTask { .. } => "update_task",
            Self::Unrecognized => "unrecognized",
        }
    }

    /// Tool arguments as recorded alongside the dispatch outcome.
    pub fn arguments(&self, user: &str) -> serde_json::Value {
        match self {
            Self::AddTask { title } => {
                serde_json::json!({"user_id": user, "title": title})
            }
            Self::ListTasks { filter } => {
                serde_json::json!({"user_id": user, "status": filter.as_str()})
            }
            Self::CompleteTask { task_id } | Self::DeleteTask { task_id } => {
                serde_json::json!({"user_id": user, "task_id": task_id})
            }
            Self::UpdateTask { task_id, title } => {
                serde_json::json!({"user_id": user, "task_id": task_id, "title": title})
            }
            Self::Unrecognized => serde_json::json!({"user_id": user}),
        }
    }
}

/// Which intent a pattern row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Family {
    Add,
    List,
    Complete,
    Delete,
    Update,
}

// ═══════════════════════════════════════════════════════════════════════
//  Pattern table
// ═══════════════════════════════════════════════════════════════════════

/// The declarative pattern table, in priority order.
///
/// Rows are matched against the lowercased message; each pattern has at
/// most two capture groups: group 1 is the title span (add) or task id
/// (complete/delete/update), group 2 the optional replacement title
/// (update). The update variant carrying a replacement span is declared
/// before the id-only variant so the trailing title is reachable.
const PATTERN_TABLE: &[(Family, &str)] = &[
    // add_task
    (
        Family::Add,
        r"(?:add|create|remember|make|new|put|store|write down|jot down|save)\s+(?:a\s+|an\s+|the\s+)?(?:task|todo|item|thing|note|to-do)\s+(?:to\s+|about\s+|regarding\s+|that\s+)?(.+)",
    ),
    (
        Family::Add,
        r"(?:add|create|remember|make|write down|jot down)\s+(.+?)(?:\.|$|please|now|for me)",
    ),
    (
        Family::Add,
        r"(?:i need to|i want to|let me|can you)\s+(?:add|create|remember|make|write down|jot down)\s+(?:a\s+|an\s+|the\s+)?(?:task|todo|item|thing|note|to-do)\s+(.+)",
    ),
    // list_tasks
    (
        Family::List,
        r"(?:show|list|display|view|see|what.*(?:are|is)|fetch|get|retrieve|tell me|give me|enumerate|print out|show me)\s*(?:my\s+)?(?:tasks|todos|items|things|notes|list|to-dos|todo list|current tasks|outstanding tasks|pending tasks|all tasks)",
    ),
    (
        Family::List,
        r"(?:what|how many|which|do i have)\s*(?:tasks|todos|items|things|notes|to-dos)",
    ),
    (
        Family::List,
        r"(?:show|list|display|view|see|fetch|get|retrieve|tell me)\s*(?:my\s+)?(?:completed|done|finished|closed)\s*(?:tasks|todos|items|things|notes|to-dos)",
    ),
    (
        Family::List,
        r"(?:show|list|display|view|see|fetch|get|retrieve|tell me)\s*(?:my\s+)?(?:pending|incomplete|open|remaining|unfinished)\s*(?:tasks|todos|items|things|notes|to-dos)",
    ),
    // complete_task
    (
        Family::Complete,
        r"(?:complete|done|finish|mark|check|tick off|accomplish|close|resolve)\s+(?:task|item|todo|to-do)\s*(?:#|no\.?|number|id)?\s*(\d+)",
    ),
    (
        Family::Complete,
        r"(?:complete|done|finish|check|tick off|accomplish|close|resolve).*?(?:task|item|todo|to-do).*?(\d+)",
    ),
    (
        Family::Complete,
        r"(?:mark|set|make)\s+(?:task|item|todo|to-do)\s*(?:#|no\.?|number|id)?\s*(\d+)\s*(?:as\s+)?(?:complete|completed|done|finished|closed)",
    ),
    (
        Family::Complete,
        r"(\d+)\s*(?:is\s+)?(?:done|complete|completed|finished|closed|accomplished)",
    ),
    // delete_task
    (
        Family::Delete,
        r"(?:delete|remove|erase|cancel|kill|drop|get rid of|eliminate|trash|clear|purge)\s+(?:task|item|todo|to-do)\s*(?:#|no\.?|number|id)?\s*(\d+)",
    ),
    (
        Family::Delete,
        r"(?:delete|remove|erase|cancel|kill|drop|get rid of|eliminate|trash|clear|purge).*?(?:task|item|todo|to-do).*?(\d+)",
    ),
    // update_task
    (
        Family::Update,
        r"(?:update|change|modify|edit|alter|revise|adjust|fix)\s+(?:task|item|todo|to-do)\s*(?:#|no\.?|number|id)?\s*(\d+)\s+(?:to|with|by)\s+(.+)",
    ),
    (
        Family::Update,
        r"(?:update|change|modify|edit|alter|revise|adjust|fix)\s*(?:task|item|todo|to-do)\s*(?:#|no\.?|number|id)?\s*(\d+)",
    ),
];

/// Filler words stripped from a captured add-task title, wherever they
/// appear.
const TITLE_FILLER: &str = r"\b(?:please|now|add|create|remember|make|for me|to do)\b";

// ═══════════════════════════════════════════════════════════════════════
//  Status filter keywords
// ═══════════════════════════════════════════════════════════════════════

/// Build a substring automaton over a keyword set.
pub(crate) fn keyword_set(words: &[&str]) -> EngineResult<AhoCorasick> {
    AhoCorasick::new(words).map_err(|e| EngineError::KeywordSet {
        reason: e.to_string(),
    })
}

/// Detects the list status filter from keyword presence anywhere in the
/// message. Completed-flavored keywords take precedence over pending ones;
/// neither present means `All`.
pub(crate) struct FilterKeywords {
    completed: AhoCorasick,
    pending: AhoCorasick,
}

impl FilterKeywords {
    pub(crate) fn new() -> EngineResult<Self> {
        Ok(Self {
            completed: keyword_set(&["completed", "done", "finished"])?,
            pending: keyword_set(&["pending", "incomplete", "open", "remaining", "unfinished"])?,
        })
    }

    pub(crate) fn detect(&self, lowered: &str) -> StatusFilter {
        if self.completed.is_match(lowered) {
            StatusFilter::Completed
        } else if self.pending.is_match(lowered) {
            StatusFilter::Pending
        } else {
            StatusFilter::All
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  IntentClassifier
// ═══════════════════════════════════════════════════════════════════════

/// One compiled row of the pattern table.
struct PatternRule {
    family: Family,
    regex: Regex,
}

/// Regex-based intent classifier.
///
/// Compiled once at engine construction; classification itself takes
/// `&self` and is safe for unbounded concurrent use.
pub struct IntentClassifier {
    rules: Vec<PatternRule>,
    filler: Regex,
    filters: FilterKeywords,
}

impl IntentClassifier {
    /// Compile the pattern table.
    pub fn new() -> EngineResult<Self> {
        let rules = PATTERN_TABLE
            .iter()
            .map(|(family, pattern)| {
                let regex = Regex::new(pattern).map_err(|e| EngineError::InvalidPattern {
                    pattern: (*pattern).to_string(),
                    reason: e.to_string(),
                })?;
                Ok(PatternRule {
                    family: *family,
                    regex,
                })
            })
            .collect::<EngineResult<Vec<_>>>()?;

        let filler = Regex::new(TITLE_FILLER).map_err(|e| EngineError::InvalidPattern {
            pattern: TITLE_FILLER.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            rules,
            filler,
            filters: FilterKeywords::new()?,
        })
    }

    /// Classify a raw message.
    ///
    /// Returns [`Intent::Unrecognized`] when no row matches; the caller
    /// then consults the keyword fallback.
    pub fn classify(&self, message: &str) -> Intent {
        let lowered = message.trim().to_lowercase();
        if lowered.is_empty() {
            return Intent::Unrecognized;
        }

        for rule in &self.rules {
            let Some(caps) = rule.regex.captures(&lowered) else {
                continue;
            };

            let intent = match rule.family {
                Family::Add => {
                    let raw = caps.get(1).map(|m| m.as_str()).unwrap_or_default();
                    let title = self.strip_filler(raw);
                    // An all-filler capture means this variant did not
                    // really match; keep scanning.
                    if title.is_empty() {
                        continue;
                    }
                    Intent::AddTask { title }
                }
                Family::List => Intent::ListTasks {
                    filter: self.filters.detect(&lowered),
                },
                Family::Complete => match parse_task_id(&caps) {
                    Some(task_id) => Intent::CompleteTask { task_id },
                    None => continue,
                },
                Family::Delete => match parse_task_id(&caps) {
                    Some(task_id) => Intent::DeleteTask { task_id },
                    None => continue,
                },
                Family::Update => {
                    let Some(task_id) = parse_task_id(&caps) else {
                        continue;
                    };
                    let title = caps
                        .get(2)
                        .map(|m| m.as_str().trim().to_string())
                        .filter(|t| !t.is_empty());
                    Intent::UpdateTask { task_id, title }
                }
            };

            debug!(tool = intent.tool_name(), "intent pattern matched");
            return intent;
        }

        Intent::Unrecognized
    }

    /// Remove filler words from a captured title and collapse whitespace.
    fn strip_filler(&self, raw: &str) -> String {
        let stripped = self.filler.replace_all(raw, " ");
        stripped.split_whitespace().collect::<Vec<_>>().join(" ")
    }
}

/// Parse capture group 1 as a task id; `None` skips the pattern variant.
fn parse_task_id(caps: &regex::Captures<'_>) -> Option<i64> {
    caps.get(1)?.as_str().parse::<i64>().ok()
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;

    fn classifier() -> IntentClassifier {
        IntentClassifier::new().unwrap()
    }

    #[test]
    fn add_with_task_noun_and_connector() {
        let intent = classifier().classify("Add a task to buy groceries");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "buy groceries".into()
            }
        );
    }

    #[test]
    fn add_strips_filler_words() {
        let intent = classifier().classify("remember the note buy milk please now");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "buy milk".into()
            }
        );
    }

    #[test]
    fn add_is_case_insensitive() {
        let intent = classifier().classify("ADD A TASK TO WATER PLANTS");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "water plants".into()
            }
        );
    }

    #[test]
    fn add_with_all_filler_capture_does_not_match() {
        // "add a task to please" captures only filler; the row is skipped
        // and the shorter add variant catches the rest of the phrase.
        let intent = classifier().classify("add a task to please");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "a task to".into()
            }
        );
    }

    #[test]
    fn list_plain() {
        let intent = classifier().classify("show my tasks");
        assert_eq!(
            intent,
            Intent::ListTasks {
                filter: StatusFilter::All
            }
        );
    }

    #[test]
    fn list_detects_pending_filter() {
        let intent = classifier().classify("Show my pending tasks");
        assert_eq!(
            intent,
            Intent::ListTasks {
                filter: StatusFilter::Pending
            }
        );
    }

    #[test]
    fn list_detects_completed_filter() {
        let intent = classifier().classify("list my finished todos");
        assert_eq!(
            intent,
            Intent::ListTasks {
                filter: StatusFilter::Completed
            }
        );
    }

    #[test]
    fn list_interrogative() {
        let intent = classifier().classify("what tasks do I have");
        assert_eq!(
            intent,
            Intent::ListTasks {
                filter: StatusFilter::All
            }
        );
    }

    #[test]
    fn complete_with_id() {
        let intent = classifier().classify("Complete task 3");
        assert_eq!(intent, Intent::CompleteTask { task_id: 3 });
    }

    #[test]
    fn complete_with_hash_prefix() {
        let intent = classifier().classify("finish todo #12");
        assert_eq!(intent, Intent::CompleteTask { task_id: 12 });
    }

    #[test]
    fn complete_mark_as_done() {
        let intent = classifier().classify("mark task 7 as done");
        assert_eq!(intent, Intent::CompleteTask { task_id: 7 });
    }

    #[test]
    fn complete_trailing_is_done() {
        let intent = classifier().classify("2 is done");
        assert_eq!(intent, Intent::CompleteTask { task_id: 2 });
    }

    #[test]
    fn delete_with_id() {
        let intent = classifier().classify("delete task 4");
        assert_eq!(intent, Intent::DeleteTask { task_id: 4 });
    }

    #[test]
    fn delete_with_words_between() {
        let intent = classifier().classify("please get rid of that task number 9");
        assert_eq!(intent, Intent::DeleteTask { task_id: 9 });
    }

    #[test]
    fn update_with_replacement_title() {
        let intent = classifier().classify("update task 2 to water the plants");
        assert_eq!(
            intent,
            Intent::UpdateTask {
                task_id: 2,
                title: Some("water the plants".into())
            }
        );
    }

    #[test]
    fn update_without_replacement_title() {
        let intent = classifier().classify("edit task 5");
        assert_eq!(
            intent,
            Intent::UpdateTask {
                task_id: 5,
                title: None
            }
        );
    }

    #[test]
    fn oversized_id_skips_variant_and_intent() {
        // 25 digits cannot parse as i64; every numeric variant is skipped
        // and the message ends up unrecognized.
        let intent = classifier().classify("complete task 1234567890123456789012345");
        assert_eq!(intent, Intent::Unrecognized);
    }

    #[test]
    fn gibberish_is_unrecognized() {
        assert_eq!(classifier().classify("asdkjasd"), Intent::Unrecognized);
        assert_eq!(classifier().classify(""), Intent::Unrecognized);
        assert_eq!(classifier().classify("   "), Intent::Unrecognized);
    }

    // ── priority order ───────────────────────────────────────────────

    #[test]
    fn add_outranks_list() {
        // Mentions both adding and showing; add is declared first.
        let intent = classifier().classify("add a task to show my tasks");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "show my tasks".into()
            }
        );
    }

    #[test]
    fn add_outranks_complete() {
        let intent = classifier().classify("create a task to complete task 3");
        assert_eq!(
            intent,
            Intent::AddTask {
                title: "complete task 3".into()
            }
        );
    }

    #[test]
    fn complete_outranks_delete() {
        // Both a complete verb and a delete verb are present; complete is
        // tried first.
        let intent = classifier().classify("complete task 1 and delete task 2");
        assert_eq!(intent, Intent::CompleteTask { task_id: 1 });
    }

    #[test]
    fn filter_detection_is_independent_of_the_matched_variant() {
        // The generic list variant matches first, but the filter scan
        // still sees the "completed" keyword.
        let intent = classifier().classify("show my completed tasks please");
        assert_eq!(
            intent,
            Intent::ListTasks {
                filter: StatusFilter::Completed
            }
        );
    }
}
