//! Babel-style mapping configuration.
//!
//! ```text
//! [python: **.py]
//! encoding = utf-8
//!
//! [ignore: **/migrations/**]
//! ```
//!
//! Sections are tried in order; the first whose pattern matches a file's
//! relative path decides its extraction method. The `ignore` method and
//! files matching no section are not scanned.

use regex::Regex;
use thiserror::Error;

pub const IGNORE_METHOD: &str = "ignore";

pub const DEFAULT_MAPPING: &str = "[python: **.py]\nencoding = utf-8\n";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MappingError {
    #[error("mapping line {line}: expected \"[method: pattern]\", found \"{text}\"")]
    InvalidSection { line: usize, text: String },
    #[error("mapping line {line}: option outside of a section")]
    OrphanOption { line: usize },
    #[error("mapping line {line}: invalid pattern \"{pattern}\"")]
    InvalidPattern { line: usize, pattern: String },
}

#[derive(Debug, Clone)]
pub struct MappingRule {
    pub method: String,
    pub pattern: String,
    matcher: Regex,
    pub options: Vec<(String, String)>,
}

impl MappingRule {
    pub fn matches(&self, relative_path: &str) -> bool {
        self.matcher.is_match(relative_path)
    }

    pub fn option(&self, name: &str) -> Option<&str> {
        self.options
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Debug, Clone, Default)]
pub struct MappingConfig {
    pub rules: Vec<MappingRule>,
}

impl MappingConfig {
    pub fn parse(content: &str) -> Result<Self, MappingError> {
        let mut rules: Vec<MappingRule> = Vec::new();

        for (idx, raw) in content.lines().enumerate() {
            let line = idx + 1;
            let text = raw.trim();
            if text.is_empty() || text.starts_with('#') || text.starts_with(';') {
                continue;
            }

            if let Some(section) = text.strip_prefix('[') {
                let inner = section.strip_suffix(']').ok_or_else(|| {
                    MappingError::InvalidSection {
                        line,
                        text: text.to_string(),
                    }
                })?;
                let (method, pattern) =
                    inner
                        .split_once(':')
                        .ok_or_else(|| MappingError::InvalidSection {
                            line,
                            text: text.to_string(),
                        })?;
                let pattern = pattern.trim().to_string();
                let matcher = pattern_to_regex(&pattern).ok_or_else(|| {
                    MappingError::InvalidPattern {
                        line,
                        pattern: pattern.clone(),
                    }
                })?;
                rules.push(MappingRule {
                    method: method.trim().to_string(),
                    pattern,
                    matcher,
                    options: Vec::new(),
                });
                continue;
            }

            let rule = rules.last_mut().ok_or(MappingError::OrphanOption { line })?;
            if let Some((key, value)) = text.split_once('=') {
                rule.options
                    .push((key.trim().to_string(), value.trim().to_string()));
            }
        }

        Ok(Self { rules })
    }

    /// The rule that decides how `relative_path` is extracted, if any.
    pub fn rule_for(&self, relative_path: &str) -> Option<&MappingRule> {
        self.rules
            .iter()
            .find(|rule| rule.matches(relative_path))
            .filter(|rule| rule.method != IGNORE_METHOD)
    }
}

/// Translate a Babel path pattern into an anchored regex.
///
/// `**/` spans any number of directories, `**` anything, `*` anything but a
/// separator, `?` one non-separator character.
fn pattern_to_regex(pattern: &str) -> Option<Regex> {
    if pattern.is_empty() {
        return None;
    }
    let mut out = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' if chars.peek() == Some(&'*') => {
                chars.next();
                if chars.peek() == Some(&'/') {
                    chars.next();
                    out.push_str("(?:.*/)?");
                } else {
                    out.push_str(".*");
                }
            }
            '*' => out.push_str("[^/]*"),
            '?' => out.push_str("[^/]"),
            other => out.push_str(&regex::escape(&other.to_string())),
        }
    }
    out.push('$');
    Regex::new(&out).ok()
}
