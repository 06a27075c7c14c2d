//! Report formatting and printing utilities.
//!
//! Prints one line per language followed by the issues of the run in
//! cargo-style format. Separate from the workflow so poflow can be used as a
//! library.

use std::io::{self, Write};

use colored::Colorize;
use unicode_width::UnicodeWidthStr;

use crate::issues::{Issue, Report, Severity};
use crate::workflow::{LanguageReport, RunReport};

/// Success mark for consistent output formatting.
pub const SUCCESS_MARK: &str = "\u{2713}"; // ✓

/// Failure mark for consistent output formatting.
pub const FAILURE_MARK: &str = "\u{2718}"; // ✘

/// Print the summary of a run to stdout.
pub fn print_run(run: &RunReport) {
    print_run_to(run, &mut io::stdout().lock());
}

pub fn print_run_to<W: Write>(run: &RunReport, writer: &mut W) {
    if let Some(template) = &run.template {
        let _ = writeln!(
            writer,
            "Scanned {} source {}, wrote {}",
            run.files_scanned,
            if run.files_scanned == 1 { "file" } else { "files" },
            template.display()
        );
    }
    if run.files_skipped > 0 {
        let _ = writeln!(
            writer,
            "{} {} path(s) could not be read (use {} for details)",
            "warning:".bold().yellow(),
            run.files_skipped,
            "-v".cyan()
        );
    }

    let name_width = run
        .languages
        .iter()
        .map(|l| UnicodeWidthStr::width(l.language.as_str()))
        .max()
        .unwrap_or(0);
    for language in &run.languages {
        print_language(language, writer, name_width);
    }

    let issues = run.issues();
    if !issues.is_empty() {
        let _ = writeln!(writer);
        report_to(&issues, writer);
    }

    print_footer(run, writer);
}

/// Print issues in cargo-style format.
pub fn report_to<W: Write>(issues: &[Issue], writer: &mut W) {
    if issues.is_empty() {
        return;
    }

    let mut sorted = issues.to_vec();
    sorted.sort_by_key(|issue| issue.severity());

    for issue in &sorted {
        print_issue(issue, writer);
    }

    print_summary(&sorted, writer);
}

// ============================================================
// Internal Functions
// ============================================================

fn print_language<W: Write>(report: &LanguageReport, writer: &mut W, name_width: usize) {
    let padding = name_width.saturating_sub(UnicodeWidthStr::width(report.language.as_str()));
    let name = format!("{}{}", report.language, " ".repeat(padding));

    if let Some(failure) = &report.failure {
        let _ = writeln!(
            writer,
            "{} {}  {}",
            FAILURE_MARK.red(),
            name.bold(),
            format!("{} failed", failure.stage).red()
        );
        return;
    }

    let stats = &report.stats;
    let mut parts = vec![
        format!("{} translated", stats.translated),
        format!("{} reviewed", stats.reviewed),
    ];
    if stats.fuzzy > 0 {
        parts.push(format!("{} fuzzy", stats.fuzzy));
    }
    if stats.untranslated > 0 {
        parts.push(format!("{} untranslated", stats.untranslated).yellow().to_string());
    }
    if stats.obsolete > 0 {
        parts.push(format!("{} obsolete", stats.obsolete));
    }
    if report.skipped() > 0 {
        parts.push(format!("{} skipped", report.skipped()));
    }
    if let Some(compacted) = report.compacted {
        parts.push(format!("{} purged", compacted));
    }
    if let Some(compiled) = report.compiled {
        parts.push(format!("{} compiled", compiled));
    }

    let _ = writeln!(
        writer,
        "{} {}  {}",
        SUCCESS_MARK.green(),
        name.bold(),
        parts.join(", ")
    );
}

fn print_issue<W: Write>(issue: &Issue, writer: &mut W) {
    let severity_str = match issue.severity() {
        Severity::Error => "error".bold().red(),
        Severity::Warning => "warning".bold().yellow(),
    };

    let _ = writeln!(
        writer,
        "{}: {}  {}",
        severity_str,
        issue.message(),
        issue.rule().to_string().dimmed().cyan()
    );
    let _ = writeln!(writer, "  {} {}", "-->".blue(), issue.location());

    if let Some(details) = issue.details() {
        let _ = writeln!(writer, "  {} {} {}", "=".blue(), "note:".bold(), details);
    }

    let _ = writeln!(writer); // Empty line between issues
}

fn print_summary<W: Write>(issues: &[Issue], writer: &mut W) {
    let total_errors = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let total_warnings = issues.len() - total_errors;

    let _ = writeln!(
        writer,
        "{} {} problems ({} {}, {} {})",
        FAILURE_MARK.red(),
        issues.len(),
        total_errors,
        if total_errors == 1 { "error" } else { "errors" }.red(),
        total_warnings,
        if total_warnings == 1 {
            "warning"
        } else {
            "warnings"
        }
        .yellow()
    );
}

fn print_footer<W: Write>(run: &RunReport, writer: &mut W) {
    let total = run.languages.len();
    let failed = run.failed_languages();
    let plural = if total == 1 { "language" } else { "languages" };

    let msg = if failed == 0 && run.template_error.is_some() {
        format!(
            "{} {}",
            FAILURE_MARK.red(),
            format!("Processed {} {}, template not written", total, plural).red()
        )
    } else if failed == 0 {
        format!(
            "{} {}",
            SUCCESS_MARK.green(),
            format!("Processed {} {}", total, plural).green()
        )
    } else {
        format!(
            "{} {}",
            FAILURE_MARK.red(),
            format!("{} of {} {} failed", failed, total, plural).red()
        )
    };
    let _ = writeln!(writer, "{}", msg);
}

// ============================================================
// Tests
// ============================================================
