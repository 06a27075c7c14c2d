use std::fmt;

use thiserror::Error;

/// Flag marking a translation a human has confirmed.
pub const REVIEWED_FLAG: &str = "reviewed";

/// Flag marking a machine-provided or otherwise uncertain translation.
pub const FUZZY_FLAG: &str = "fuzzy";

/// Translator comment prefix of a reviewer note.
pub const NOTE_PREFIX: &str = "[Note] ";

/// Plural forms used when a catalog header does not say otherwise.
pub const DEFAULT_NPLURALS: usize = 2;

/// Misuse of the entry model or the review session.
///
/// Always returned before any state is touched, so the caller can recover
/// by issuing a different operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidState {
    #[error("a message entry needs a non-empty source string")]
    EmptySource,
    #[error("cannot mark \"{msgid}\" as reviewed: its translation is empty")]
    EmptyTranslation { msgid: String },
    #[error("no entry is currently presented for review")]
    NoCurrentEntry,
}

/// Identity of a message inside a catalog: `msgid` plus optional `msgctxt`.
///
/// Comparison is case-sensitive, and two keys differing only by context are
/// distinct messages.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MessageKey {
    pub msgid: String,
    pub context: Option<String>,
}

impl MessageKey {
    pub fn new(msgid: impl Into<String>, context: Option<String>) -> Self {
        Self {
            msgid: msgid.into(),
            context,
        }
    }
}

impl fmt::Display for MessageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.context {
            Some(ctx) => write!(f, "{}|{}", ctx, self.msgid),
            None => write!(f, "{}", self.msgid),
        }
    }
}

/// A source reference: file path plus optional 1-based line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Location {
    pub file: String,
    pub line: Option<usize>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line: Some(line),
        }
    }

    pub fn file_only(file: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            line: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}

/// `msgid_plural` and the `msgstr[n]` translations of a plural message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralForms {
    pub msgid_plural: String,
    /// One translation per plural form, `msgstr[0]` first.
    pub translations: Vec<String>,
}

/// One translatable message together with its translation and review state.
///
/// Fields that carry invariants are private: `reviewed` can only become true
/// through [`MessageEntry::mark_reviewed`], which refuses empty translations.
/// A plural entry keeps its translations in [`PluralForms`] and counts as
/// translated only when every form is filled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageEntry {
    key: MessageKey,
    translation: String,
    plural: Option<PluralForms>,
    reviewed: bool,
    fuzzy: bool,
    /// Flags other than `reviewed` and `fuzzy`, e.g. `python-format`.
    pub flags: Vec<String>,
    pub locations: Vec<Location>,
    pub obsolete: bool,
    /// `# ` comments written by translators (or by auto-translation).
    pub translator_comments: Vec<String>,
    /// `#.` comments coming from the source code.
    pub extracted_comments: Vec<String>,
}

impl MessageEntry {
    /// Create a fresh, untranslated and unreviewed entry.
    pub fn new(msgid: impl Into<String>, context: Option<String>) -> Result<Self, InvalidState> {
        let msgid = msgid.into();
        if msgid.is_empty() {
            return Err(InvalidState::EmptySource);
        }
        Ok(Self {
            key: MessageKey::new(msgid, context),
            translation: String::new(),
            plural: None,
            reviewed: false,
            fuzzy: false,
            flags: Vec::new(),
            locations: Vec::new(),
            obsolete: false,
            translator_comments: Vec::new(),
            extracted_comments: Vec::new(),
        })
    }

    pub fn with_translation(mut self, translation: impl Into<String>) -> Self {
        self.set_translation(translation);
        self
    }

    pub fn with_locations(mut self, locations: Vec<Location>) -> Self {
        self.locations = locations;
        self
    }

    /// Turn the entry into a plural message with the given translations.
    pub fn with_plural(mut self, msgid_plural: impl Into<String>, translations: Vec<String>) -> Self {
        self.translation.clear();
        self.plural = Some(PluralForms {
            msgid_plural: msgid_plural.into(),
            translations,
        });
        self.drop_review_if_incomplete();
        self
    }

    pub fn key(&self) -> &MessageKey {
        &self.key
    }

    pub fn msgid(&self) -> &str {
        &self.key.msgid
    }

    pub fn context(&self) -> Option<&str> {
        self.key.context.as_deref()
    }

    /// The translation, or `msgstr[0]` of a plural entry.
    pub fn translation(&self) -> &str {
        match &self.plural {
            Some(plural) => plural.translations.first().map_or("", String::as_str),
            None => &self.translation,
        }
    }

    pub fn plural(&self) -> Option<&PluralForms> {
        self.plural.as_ref()
    }

    pub fn is_plural(&self) -> bool {
        self.plural.is_some()
    }

    pub fn is_translated(&self) -> bool {
        match &self.plural {
            Some(plural) => {
                !plural.translations.is_empty()
                    && plural.translations.iter().all(|t| !t.is_empty())
            }
            None => !self.translation.is_empty(),
        }
    }

    pub fn is_reviewed(&self) -> bool {
        self.reviewed
    }

    pub fn is_fuzzy(&self) -> bool {
        self.fuzzy
    }

    /// Untranslated or unreviewed live entries need a human to look at them.
    pub fn needs_attention(&self) -> bool {
        !self.obsolete && (!self.is_translated() || !self.reviewed)
    }

    /// Replace the translation. An empty translation can no longer be
    /// reviewed, so the flag is dropped with it.
    ///
    /// On a plural entry this replaces `msgstr[0]`.
    pub fn set_translation(&mut self, translation: impl Into<String>) {
        let translation = translation.into();
        match &mut self.plural {
            Some(plural) => match plural.translations.first_mut() {
                Some(first) => *first = translation,
                None => plural.translations.push(translation),
            },
            None => self.translation = translation,
        }
        self.drop_review_if_incomplete();
    }

    /// Replace every plural translation. No-op on a singular entry.
    pub fn set_plural_translations(&mut self, translations: Vec<String>) {
        if let Some(plural) = &mut self.plural {
            plural.translations = translations;
            self.drop_review_if_incomplete();
        }
    }

    /// Follow a change of the source's plural form, as seen by a new
    /// extraction. Converting between singular and plural carries the
    /// existing translation over as `msgstr[0]` and back. Any change drops
    /// the review.
    pub fn set_plural_source(&mut self, msgid_plural: Option<String>, nplurals: usize) {
        let current = self.plural.as_ref().map(|p| p.msgid_plural.as_str());
        if current == msgid_plural.as_deref() {
            return;
        }
        match (self.plural.take(), msgid_plural) {
            (Some(mut plural), Some(msgid_plural)) => {
                plural.msgid_plural = msgid_plural;
                self.plural = Some(plural);
            }
            (Some(plural), None) => {
                self.translation = plural.translations.into_iter().next().unwrap_or_default();
            }
            (None, Some(msgid_plural)) => {
                let mut translations = vec![String::new(); nplurals.max(1)];
                translations[0] = std::mem::take(&mut self.translation);
                self.plural = Some(PluralForms {
                    msgid_plural,
                    translations,
                });
            }
            (None, None) => {}
        }
        self.reviewed = false;
        self.drop_review_if_incomplete();
    }

    pub fn set_fuzzy(&mut self, fuzzy: bool) {
        self.fuzzy = fuzzy;
    }

    /// Confirm the current translation. Confirmation supersedes `fuzzy`.
    pub fn mark_reviewed(&mut self) -> Result<(), InvalidState> {
        if !self.is_translated() {
            return Err(InvalidState::EmptyTranslation {
                msgid: self.key.msgid.clone(),
            });
        }
        self.reviewed = true;
        self.fuzzy = false;
        Ok(())
    }

    pub fn clear_reviewed(&mut self) {
        self.reviewed = false;
    }

    /// The reviewer note kept in the translator comments.
    pub fn note(&self) -> Option<&str> {
        self.translator_comments
            .iter()
            .find_map(|c| c.strip_prefix(NOTE_PREFIX))
    }

    /// Replace the reviewer note. Blank text removes it.
    pub fn set_note(&mut self, text: &str) {
        self.translator_comments
            .retain(|c| !c.starts_with(NOTE_PREFIX));
        let text = text.trim();
        if !text.is_empty() {
            // Comments are single lines.
            let note = text.split('\n').map(str::trim).collect::<Vec<_>>().join(" ");
            self.translator_comments.push(format!("{}{}", NOTE_PREFIX, note));
        }
    }

    fn drop_review_if_incomplete(&mut self) {
        if !self.is_translated() {
            self.reviewed = false;
        }
        let all_empty = match &self.plural {
            Some(plural) => plural.translations.iter().all(String::is_empty),
            None => self.translation.is_empty(),
        };
        if all_empty {
            self.fuzzy = false;
        }
    }

    /// All flags as written to a PO file, known flags first.
    pub fn all_flags(&self) -> Vec<&str> {
        let mut flags = Vec::with_capacity(self.flags.len() + 2);
        if self.fuzzy {
            flags.push(FUZZY_FLAG);
        }
        if self.reviewed {
            flags.push(REVIEWED_FLAG);
        }
        flags.extend(self.flags.iter().map(String::as_str));
        flags
    }

    /// Apply a flag read from a PO file.
    ///
    /// A `reviewed` flag on an empty translation is dropped rather than
    /// accepted, keeping the invariant for hand-edited files.
    pub(crate) fn apply_flag(&mut self, flag: &str) {
        match flag {
            FUZZY_FLAG => self.fuzzy = true,
            REVIEWED_FLAG => self.reviewed = self.is_translated(),
            other => {
                if !self.flags.iter().any(|f| f == other) {
                    self.flags.push(other.to_string());
                }
            }
        }
    }
}
