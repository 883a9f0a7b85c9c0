//! Text field sanitization.
//!
//! Every string extracted from a message passes through here before it
//! reaches the task store: whitespace is trimmed, non-printable control
//! characters are removed, and over-length values are rejected rather
//! than truncated.

use thiserror::Error;

/// Why a field was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SanitizeError {
    /// The title was empty (or whitespace/control characters only).
    #[error("a task title cannot be empty")]
    EmptyTitle,

    /// The title exceeds the configured bound.
    #[error("the task title is too long ({len} characters; the limit is {max})")]
    TitleTooLong { len: usize, max: usize },

    /// The description exceeds the configured bound.
    #[error("the task description is too long ({len} characters; the limit is {max})")]
    DescriptionTooLong { len: usize, max: usize },
}

/// Validates and normalizes extracted text fields against length bounds.
#[derive(Debug, Clone, Copy)]
pub struct Sanitizer {
    max_title: usize,
    max_description: usize,
}

impl Sanitizer {
    /// Create a sanitizer with the given field bounds (in characters).
    pub fn new(max_title: usize, max_description: usize) -> Self {
        Self {
            max_title,
            max_description,
        }
    }

    /// Sanitize a required title. Empty-after-cleaning is an error.
    pub fn title(&self, raw: &str) -> Result<String, SanitizeError> {
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            return Err(SanitizeError::EmptyTitle);
        }
        let len = cleaned.chars().count();
        if len > self.max_title {
            return Err(SanitizeError::TitleTooLong {
                len,
                max: self.max_title,
            });
        }
        Ok(cleaned)
    }

    /// Sanitize an optional replacement title.
    ///
    /// Absent or empty-after-cleaning collapses to `None` (the caller
    /// treats that as "leave the title alone"); only over-length input is
    /// an error.
    pub fn optional_title(&self, raw: Option<&str>) -> Result<Option<String>, SanitizeError> {
        let Some(raw) = raw else { return Ok(None) };
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            return Ok(None);
        }
        let len = cleaned.chars().count();
        if len > self.max_title {
            return Err(SanitizeError::TitleTooLong {
                len,
                max: self.max_title,
            });
        }
        Ok(Some(cleaned))
    }

    /// Sanitize an optional description. Empty collapses to `None`.
    pub fn description(&self, raw: Option<&str>) -> Result<Option<String>, SanitizeError> {
        let Some(raw) = raw else { return Ok(None) };
        let cleaned = clean(raw);
        if cleaned.is_empty() {
            return Ok(None);
        }
        let len = cleaned.chars().count();
        if len > self.max_description {
            return Err(SanitizeError::DescriptionTooLong {
                len,
                max: self.max_description,
            });
        }
        Ok(Some(cleaned))
    }
}

/// Trim and drop control characters, keeping tab/newline/carriage-return.
fn clean(raw: &str) -> String {
    raw.chars()
        .filter(|c| !c.is_control() || matches!(c, '\t' | '\n' | '\r'))
        .collect::<String>()
        .trim()
        .to_string()
}

// ── tests ────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitizer() -> Sanitizer {
        Sanitizer::new(255, 1000)
    }

    #[test]
    fn trims_and_keeps_content() {
        assert_eq!(sanitizer().title("  buy milk  ").unwrap(), "buy milk");
    }

    #[test]
    fn strips_control_characters() {
        assert_eq!(
            sanitizer().title("buy\u{0} \u{7}milk\u{1b}").unwrap(),
            "buy milk"
        );
    }

    #[test]
    fn keeps_tabs_and_newlines() {
        let cleaned = sanitizer().description(Some("line one\nline\ttwo")).unwrap();
        assert_eq!(cleaned.as_deref(), Some("line one\nline\ttwo"));
    }

    #[test]
    fn empty_title_is_rejected() {
        assert_eq!(sanitizer().title("   "), Err(SanitizeError::EmptyTitle));
        assert_eq!(sanitizer().title("\u{0}\u{1}"), Err(SanitizeError::EmptyTitle));
    }

    #[test]
    fn overlong_title_is_rejected_not_truncated() {
        let long = "x".repeat(256);
        match sanitizer().title(&long) {
            Err(SanitizeError::TitleTooLong { len, max }) => {
                assert_eq!(len, 256);
                assert_eq!(max, 255);
            }
            other => panic!("expected TitleTooLong, got {other:?}"),
        }

        // Exactly at the bound is fine.
        let fits = "x".repeat(255);
        assert_eq!(sanitizer().title(&fits).unwrap(), fits);
    }

    #[test]
    fn length_is_counted_in_chars_not_bytes() {
        // 255 multi-byte characters are within the bound.
        let umlauts = "ü".repeat(255);
        assert!(sanitizer().title(&umlauts).is_ok());
    }

    #[test]
    fn optional_title_collapses_empty_to_none() {
        assert_eq!(sanitizer().optional_title(None).unwrap(), None);
        assert_eq!(sanitizer().optional_title(Some("  ")).unwrap(), None);
        assert_eq!(
            sanitizer().optional_title(Some("new name")).unwrap(),
            Some("new name".to_string())
        );
    }

    #[test]
    fn overlong_description_is_rejected() {
        let long = "d".repeat(1001);
        assert!(matches!(
            sanitizer().description(Some(&long)),
            Err(SanitizeError::DescriptionTooLong { .. })
        ));
    }
}
