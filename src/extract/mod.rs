//! Source string extraction.
//!
//! ## Module Structure
//!
//! - `mapping`: Babel-style `[method: pattern]` mapping configuration
//! - `scanner`: input path walking with exclusion patterns
//! - `keywords`: keyword call matching inside one file
//!
//! [`Extraction`] ties them together into a lazy, single-pass sequence of
//! [`ExtractedMessage`]s. Create a new one for a fresh scan.

pub mod keywords;
pub mod mapping;
pub mod scanner;

use std::{collections::VecDeque, fs, vec};

use tracing::{debug, warn};

use crate::catalog::Location;
use crate::config::Settings;

pub use keywords::{DEFAULT_KEYWORDS, KeywordMatcher};
pub use mapping::{DEFAULT_MAPPING, MappingConfig, MappingError};
pub use scanner::{SourceFile, scan_sources};

/// One occurrence (or merged occurrences) of a translatable string.
///
/// `msgid` may be empty when the source contains an empty literal; the
/// reconciler rejects such entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedMessage {
    pub msgid: String,
    pub context: Option<String>,
    /// Source of the plural form for `ngettext`-style calls.
    pub plural: Option<String>,
    pub locations: Vec<Location>,
    /// Developer comments for translators (`#.` lines).
    pub comments: Vec<String>,
}

impl ExtractedMessage {
    pub fn new(msgid: impl Into<String>, context: Option<String>, locations: Vec<Location>) -> Self {
        Self {
            msgid: msgid.into(),
            context,
            plural: None,
            locations,
            comments: Vec::new(),
        }
    }

    pub fn with_plural(mut self, plural: impl Into<String>) -> Self {
        self.plural = Some(plural.into());
        self
    }
}

/// Lazy extraction over all mapped source files.
///
/// Files are read one at a time as the iterator is advanced. Unreadable
/// files are logged and counted, never fatal.
pub struct Extraction {
    files: vec::IntoIter<SourceFile>,
    mapping: MappingConfig,
    keywords: KeywordMatcher,
    pending: VecDeque<ExtractedMessage>,
    files_scanned: usize,
    files_skipped: usize,
}

impl Extraction {
    pub fn new(settings: &Settings) -> Result<Self, MappingError> {
        let mapping = MappingConfig::parse(&settings.mapping_file_content)?;

        let mut keywords: Vec<&str> = DEFAULT_KEYWORDS.to_vec();
        keywords.extend(settings.keywords.iter().map(String::as_str));

        let scan = scan_sources(&settings.input_paths, &settings.exclude_patterns);
        debug!(
            files = scan.files.len(),
            skipped = scan.skipped_count,
            "scanned input paths"
        );

        Ok(Self {
            files: scan.files.into_iter(),
            mapping,
            keywords: KeywordMatcher::new(&keywords),
            pending: VecDeque::new(),
            files_scanned: 0,
            files_skipped: scan.skipped_count,
        })
    }

    /// Files read so far.
    pub fn files_scanned(&self) -> usize {
        self.files_scanned
    }

    /// Paths that could not be accessed or read so far.
    pub fn files_skipped(&self) -> usize {
        self.files_skipped
    }

    fn load_next_file(&mut self) -> Option<()> {
        loop {
            let file = self.files.next()?;
            let Some(rule) = self.mapping.rule_for(&file.relative) else {
                continue;
            };

            let content = match fs::read(&file.path) {
                Ok(bytes) => bytes,
                Err(e) => {
                    warn!("Cannot read {}: {}", file.display, e);
                    self.files_skipped += 1;
                    continue;
                }
            };
            if let Some(encoding) = rule.option("encoding")
                && !encoding.eq_ignore_ascii_case("utf-8")
                && !encoding.eq_ignore_ascii_case("utf8")
            {
                warn!(
                    "{}: encoding '{}' is not supported, reading as UTF-8",
                    file.display, encoding
                );
            }
            let content = String::from_utf8_lossy(&content);

            self.files_scanned += 1;
            let messages = self.keywords.extract(&content, &file.display);
            debug!(
                file = %file.display,
                method = %rule.method,
                messages = messages.len(),
                "extracted"
            );
            self.pending.extend(messages);
            return Some(());
        }
    }
}

impl Iterator for Extraction {
    type Item = ExtractedMessage;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(message) = self.pending.pop_front() {
                return Some(message);
            }
            self.load_next_file()?;
        }
    }
}
