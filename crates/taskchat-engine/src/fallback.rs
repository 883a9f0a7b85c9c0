//! Keyword-based fallback classification.
//!
//! Consulted only when the pattern classifier returns
//! [`Intent::Unrecognized`]. Categories are checked in a fixed order
//! (add, list, complete, delete); the first category whose keyword set
//! intersects the lowercased message wins. Membership is substring-based
//! via one Aho-Corasick automaton per category.

use aho_corasick::AhoCorasick;
use regex::Regex;
use tracing::debug;

use crate::error::{EngineError, EngineResult};
use crate::intent::{FilterKeywords, Intent, keyword_set};

/// Lead-in phrases stripped from the front of a message before treating
/// the remainder as an add-task title.
const ADD_LEAD_IN: &str = r"^(?:(?:can you|could you|please|pls|add|create|remember|make|i need to|i want to|let me)\b\s*)+";

/// Coarse keyword classifier used when no pattern matched.
pub struct KeywordFallbackClassifier {
    add: AhoCorasick,
    list: AhoCorasick,
    complete: AhoCorasick,
    delete: AhoCorasick,
    lead_in: Regex,
    number: Regex,
    filters: FilterKeywords,
}

impl KeywordFallbackClassifier {
    /// Build the category automata.
    pub fn new() -> EngineResult<Self> {
        let lead_in = Regex::new(ADD_LEAD_IN).map_err(|e| EngineError::InvalidPattern {
            pattern: ADD_LEAD_IN.to_string(),
            reason: e.to_string(),
        })?;
        let number = Regex::new(r"\b(\d+)\b").map_err(|e| EngineError::InvalidPattern {
            pattern: r"\b(\d+)\b".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            add: keyword_set(&["add", "create", "remember", "make", "new"])?,
            list: keyword_set(&["show", "list", "view", "what", "display", "see", "my"])?,
            complete: keyword_set(&["done", "complete", "finish", "check", "mark"])?,
            delete: keyword_set(&["delete", "remove", "erase", "trash"])?,
            lead_in,
            number,
            filters: FilterKeywords::new()?,
        })
    }

    /// Attempt a coarse classification.
    ///
    /// `None` means no category matched, or the matched category could
    /// not extract usable parameters — the caller answers with the help
    /// message either way.
    pub fn classify(&self, message: &str) -> Option<Intent> {
        let lowered = message.trim().to_lowercase();
        if lowered.is_empty() {
            return None;
        }

        let intent = if self.add.is_match(&lowered) {
            let title = self
                .lead_in
                .replace(&lowered, "")
                .trim()
                .to_string();
            if title.is_empty() {
                return None;
            }
            Intent::AddTask { title }
        } else if self.list.is_match(&lowered) {
            Intent::ListTasks {
                filter: self.filters.detect(&lowered),
            }
        } else if self.complete.is_match(&lowered) {
            Intent::CompleteTask {
                task_id: self.first_number(&lowered)?,
            }
        } else if self.delete.is_match(&lowered) {
            Intent::DeleteTask {
                task_id: self.first_number(&lowered)?,
            }
        } else {
            return None;
        };

        debug!(tool = intent.tool_name(), "keyword fallback matched");
        Some(intent)
    }

    /// Extract the first integer literal anywhere in the message.
    fn first_number(&self, lowered: &str) -> Option<i64> {
        self.number
            .captures(lowered)?
            .get(1)?
            .as_str()
            .parse::<i64>()
            .ok()
    }
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════
