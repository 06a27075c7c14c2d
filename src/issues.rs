//! Issues collected during a run.
//!
//! Each issue is self-contained with everything the reporter needs. Issues
//! never stop a run by themselves; they are listed after the per-language
//! summary.

use enum_dispatch::enum_dispatch;

use crate::catalog::{MessageKey, SkippedEntry};
use crate::workflow::Stage;

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    TemplateFailed,
    LanguageFailed,
    SkippedEntry,
    TranslationFailed,
    Untranslated,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::TemplateFailed => write!(f, "template-failed"),
            Rule::LanguageFailed => write!(f, "language-failed"),
            Rule::SkippedEntry => write!(f, "skipped-entry"),
            Rule::TranslationFailed => write!(f, "translation-failed"),
            Rule::Untranslated => write!(f, "untranslated"),
        }
    }
}

// ============================================================
// Issue Types
// ============================================================

/// The extraction template could not be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateFailedIssue {
    pub error: String,
}

/// A language's pipeline stopped at `stage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageFailedIssue {
    pub language: String,
    pub stage: Stage,
    pub error: String,
}

/// An extracted string that could not become a catalog entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedEntryIssue {
    pub entry: SkippedEntry,
}

/// Machine translation gave up on one entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationFailedIssue {
    pub language: String,
    pub key: MessageKey,
    pub reason: String,
    /// Set when the run treats translation failures as language failures.
    pub strict: bool,
}

/// Entries still without a translation at the end of the run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UntranslatedIssue {
    pub language: String,
    pub count: usize,
}

// ============================================================
// Issue Enum
// ============================================================

/// Something worth telling the user about after a run.
#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    TemplateFailed(TemplateFailedIssue),
    LanguageFailed(LanguageFailedIssue),
    SkippedEntry(SkippedEntryIssue),
    TranslationFailed(TranslationFailedIssue),
    Untranslated(UntranslatedIssue),
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Trait for types that can be reported to the CLI.
///
/// Uses `enum_dispatch` for zero-cost dispatch on the `Issue` enum.
#[enum_dispatch]
pub trait Report {
    /// Where the issue belongs: a language code or a source location.
    fn location(&self) -> String;

    /// Primary message to display.
    fn message(&self) -> String;

    fn severity(&self) -> Severity;

    fn rule(&self) -> Rule;

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for TemplateFailedIssue {
    fn location(&self) -> String {
        "template".to_string()
    }

    fn message(&self) -> String {
        "template was not written".to_string()
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::TemplateFailed
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

impl Report for LanguageFailedIssue {
    fn location(&self) -> String {
        self.language.clone()
    }

    fn message(&self) -> String {
        format!("{} stage failed", self.stage)
    }

    fn severity(&self) -> Severity {
        Severity::Error
    }

    fn rule(&self) -> Rule {
        Rule::LanguageFailed
    }

    fn details(&self) -> Option<String> {
        Some(self.error.clone())
    }
}

impl Report for SkippedEntryIssue {
    fn location(&self) -> String {
        self.entry
            .locations
            .first()
            .map(ToString::to_string)
            .unwrap_or_else(|| format!("entry #{}", self.entry.index))
    }

    fn message(&self) -> String {
        self.entry.reason.clone()
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::SkippedEntry
    }
}

impl Report for TranslationFailedIssue {
    fn location(&self) -> String {
        self.language.clone()
    }

    fn message(&self) -> String {
        format!("could not translate \"{}\"", self.key)
    }

    fn severity(&self) -> Severity {
        if self.strict {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    fn rule(&self) -> Rule {
        Rule::TranslationFailed
    }

    fn details(&self) -> Option<String> {
        Some(self.reason.clone())
    }
}

impl Report for UntranslatedIssue {
    fn location(&self) -> String {
        self.language.clone()
    }

    fn message(&self) -> String {
        if self.count == 1 {
            "1 entry has no translation".to_string()
        } else {
            format!("{} entries have no translation", self.count)
        }
    }

    fn severity(&self) -> Severity {
        Severity::Warning
    }

    fn rule(&self) -> Rule {
        Rule::Untranslated
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InvalidState, Location};

    #[test]
    fn test_dispatch_through_enum() {
        let issue: Issue = TranslationFailedIssue {
            language: "de".to_string(),
            key: MessageKey::new("Foo", None),
            reason: "timed out after 10s".to_string(),
            strict: false,
        }
        .into();

        assert_eq!(issue.location(), "de");
        assert_eq!(issue.message(), "could not translate \"Foo\"");
        assert_eq!(issue.severity(), Severity::Warning);
        assert_eq!(issue.rule().to_string(), "translation-failed");
        assert_eq!(issue.details().as_deref(), Some("timed out after 10s"));
    }

    #[test]
    fn test_template_failure_is_error() {
        let issue: Issue = TemplateFailedIssue {
            error: "failed to write locale/messages.pot".to_string(),
        }
        .into();
        assert_eq!(issue.severity(), Severity::Error);
        assert_eq!(issue.rule().to_string(), "template-failed");
        assert_eq!(issue.location(), "template");
    }

    #[test]
    fn test_strict_translation_failure_is_error() {
        let issue = TranslationFailedIssue {
            language: "de".to_string(),
            key: MessageKey::new("Foo", None),
            reason: String::new(),
            strict: true,
        };
        assert_eq!(issue.severity(), Severity::Error);
    }

    #[test]
    fn test_skipped_entry_location() {
        let issue = SkippedEntryIssue {
            entry: SkippedEntry {
                index: 4,
                locations: vec![Location::new("app.py", 7)],
                reason: InvalidState::EmptySource.to_string(),
            },
        };
        assert_eq!(issue.location(), "app.py:7");
        assert!(issue.message().contains("non-empty source"));
    }

    #[test]
    fn test_untranslated_message() {
        let one = UntranslatedIssue {
            language: "fr".to_string(),
            count: 1,
        };
        let many = UntranslatedIssue {
            language: "fr".to_string(),
            count: 3,
        };
        assert_eq!(one.message(), "1 entry has no translation");
        assert_eq!(many.message(), "3 entries have no translation");
    }
}
