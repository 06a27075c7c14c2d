use std::path::PathBuf;

use super::{Stage, WorkflowError};
use crate::catalog::{CatalogStats, ReconcileReport, SkippedEntry};
use crate::issues::{
    Issue, LanguageFailedIssue, SkippedEntryIssue, TemplateFailedIssue, TranslationFailedIssue,
    UntranslatedIssue,
};
use crate::po::PersistenceError;
use crate::review::ReviewSummary;
use crate::translate::TranslationReport;

/// Why one language's pipeline stopped.
#[derive(Debug)]
pub struct LanguageFailure {
    pub stage: Stage,
    pub error: WorkflowError,
}

/// Outcome of the pipeline for one destination language.
#[derive(Debug)]
pub struct LanguageReport {
    pub language: String,
    pub po_path: PathBuf,
    pub reconcile: Option<ReconcileReport>,
    pub translation: Option<TranslationReport>,
    pub review: Option<ReviewSummary>,
    /// Messages written to the MO file.
    pub compiled: Option<usize>,
    /// Obsolete entries purged by `compact`.
    pub compacted: Option<usize>,
    pub stats: CatalogStats,
    pub failure: Option<LanguageFailure>,
    /// Translation failures count as a language failure.
    pub strict: bool,
}

impl LanguageReport {
    pub(crate) fn new(language: &str, po_path: PathBuf, strict: bool) -> Self {
        Self {
            language: language.to_string(),
            po_path,
            reconcile: None,
            translation: None,
            review: None,
            compiled: None,
            compacted: None,
            stats: CatalogStats::default(),
            failure: None,
            strict,
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    pub(crate) fn fail(&mut self, stage: Stage, error: impl Into<WorkflowError>) {
        self.failure = Some(LanguageFailure {
            stage,
            error: error.into(),
        });
    }

    pub fn translation_failures(&self) -> usize {
        self.translation.as_ref().map_or(0, |t| t.failures.len())
    }

    pub fn skipped(&self) -> usize {
        self.reconcile.as_ref().map_or(0, |r| r.skipped.len())
    }

    fn issues(&self) -> Vec<Issue> {
        let mut issues = Vec::new();
        if let Some(failure) = &self.failure {
            issues.push(
                LanguageFailedIssue {
                    language: self.language.clone(),
                    stage: failure.stage,
                    error: failure.error.to_string(),
                }
                .into(),
            );
        }
        if let Some(translation) = &self.translation {
            for failure in &translation.failures {
                issues.push(
                    TranslationFailedIssue {
                        language: self.language.clone(),
                        key: failure.key.clone(),
                        reason: failure.reason.to_string(),
                        strict: self.strict,
                    }
                    .into(),
                );
            }
        }
        if self.stats.untranslated > 0 {
            issues.push(
                UntranslatedIssue {
                    language: self.language.clone(),
                    count: self.stats.untranslated,
                }
                .into(),
            );
        }
        issues
    }
}

/// Outcome of a whole run.
#[derive(Debug, Default)]
pub struct RunReport {
    pub files_scanned: usize,
    pub files_skipped: usize,
    /// Template written by the update stage.
    pub template: Option<PathBuf>,
    /// Why the template could not be written. Catalogs are updated anyway.
    pub template_error: Option<PersistenceError>,
    /// Extracted strings rejected while building the template.
    pub skipped: Vec<SkippedEntry>,
    pub languages: Vec<LanguageReport>,
}

impl RunReport {
    /// True if the template (when due) was written and no language failed.
    pub fn is_success(&self) -> bool {
        self.template_error.is_none() && self.languages.iter().all(LanguageReport::is_success)
    }

    pub fn failed_languages(&self) -> usize {
        self.languages.iter().filter(|l| !l.is_success()).count()
    }

    /// All issues of the run: the template first, then skipped extractions,
    /// then per language.
    pub fn issues(&self) -> Vec<Issue> {
        let mut issues: Vec<Issue> = Vec::new();
        if let Some(error) = &self.template_error {
            issues.push(
                TemplateFailedIssue {
                    error: error.to_string(),
                }
                .into(),
            );
        }
        issues.extend(self.skipped.iter().map(|entry| {
            Issue::from(SkippedEntryIssue {
                entry: entry.clone(),
            })
        }));
        for language in &self.languages {
            issues.extend(language.issues());
        }
        issues
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::MessageKey;
    use crate::issues::{Report, Rule};
    use crate::translate::{TranslationFailure, TranslationUnavailable};
    use std::time::Duration;

    fn report(language: &str) -> LanguageReport {
        LanguageReport::new(language, PathBuf::from("x.po"), false)
    }

    #[test]
    fn test_run_success_requires_every_language() {
        let mut run = RunReport::default();
        run.languages.push(report("de"));
        assert!(run.is_success());

        let mut failed = report("fr");
        failed.fail(Stage::Translate, WorkflowError::StrictTranslation { failures: 2 });
        run.languages.push(failed);

        assert!(!run.is_success());
        assert_eq!(run.failed_languages(), 1);
    }

    #[test]
    fn test_template_failure_fails_run() {
        let mut run = RunReport::default();
        run.languages.push(report("de"));
        run.template_error = Some(PersistenceError::Write {
            path: PathBuf::from("locale/messages.pot"),
            source: std::io::Error::other("read-only file system"),
        });

        assert!(!run.is_success());
        assert_eq!(run.failed_languages(), 0);
        let issues = run.issues();
        assert_eq!(issues[0].rule(), Rule::TemplateFailed);
        assert!(issues[0].details().unwrap().contains("read-only"));
    }

    #[test]
    fn test_issues_listed_per_language() {
        let mut de = report("de");
        de.translation = Some(TranslationReport {
            translated: 0,
            failures: vec![TranslationFailure {
                key: MessageKey::new("Foo", None),
                reason: TranslationUnavailable::Timeout(Duration::from_secs(10)),
            }],
        });
        de.stats.untranslated = 1;

        let run = RunReport {
            languages: vec![de],
            ..Default::default()
        };
        let rules: Vec<Rule> = run.issues().iter().map(|i| i.rule()).collect();
        assert_eq!(rules, vec![Rule::TranslationFailed, Rule::Untranslated]);
        assert_eq!(
            run.issues()[0].details().as_deref(),
            Some("timed out after 10s")
        );
    }
}
