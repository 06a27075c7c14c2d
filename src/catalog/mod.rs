//! Catalog model: message entries for one (domain, language) pair.
//!
//! ## Module Structure
//!
//! - `entry`: a single message and its translation/review state
//! - `reconcile`: merging a fresh extraction into an existing catalog

mod entry;
pub mod reconcile;

use std::collections::HashMap;

pub use entry::{
    DEFAULT_NPLURALS, FUZZY_FLAG, InvalidState, Location, MessageEntry, MessageKey, NOTE_PREFIX,
    PluralForms, REVIEWED_FLAG,
};
pub use reconcile::{ReconcileReport, SkippedEntry, reconcile};

/// Ordered PO header metadata (`Key: Value` lines of the `msgid ""` entry).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Header {
    fields: Vec<(String, String)>,
    /// Comment lines above the header entry, without the leading `# `.
    pub comments: Vec<String>,
}

impl Header {
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set a field, keeping its position if it already exists.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.fields.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((name.to_string(), value)),
        }
    }

    pub fn fields(&self) -> &[(String, String)] {
        &self.fields
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.comments.is_empty()
    }

    /// `nplurals` from the `Plural-Forms` field, if present and sane.
    pub fn nplurals(&self) -> Option<usize> {
        self.get("Plural-Forms")?
            .split(';')
            .filter_map(|part| part.trim().strip_prefix("nplurals="))
            .find_map(|n| n.trim().parse().ok())
            .filter(|&n| n > 0)
    }

    /// Render the fields as the `msgstr` of the header entry.
    pub fn to_msgstr(&self) -> String {
        self.fields
            .iter()
            .map(|(key, value)| format!("{}: {}\n", key, value))
            .collect()
    }

    /// Parse the `msgstr` of a header entry. Lines without a colon are ignored.
    pub fn from_msgstr(msgstr: &str) -> Self {
        let fields = msgstr
            .lines()
            .filter_map(|line| {
                let (key, value) = line.split_once(':')?;
                Some((key.trim().to_string(), value.trim().to_string()))
            })
            .collect();
        Self {
            fields,
            comments: Vec::new(),
        }
    }
}

/// Counts used by reports and the review front-end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogStats {
    pub total: usize,
    pub translated: usize,
    pub reviewed: usize,
    pub fuzzy: usize,
    pub untranslated: usize,
    pub obsolete: usize,
}

/// All message entries for one (domain, language) pair.
///
/// Keys are unique and entries keep their insertion order, which is also the
/// order they are written to disk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    pub domain: String,
    pub language: String,
    pub header: Header,
    entries: Vec<MessageEntry>,
    index: HashMap<MessageKey, usize>,
}

impl Catalog {
    pub fn new(domain: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            language: language.into(),
            ..Default::default()
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[MessageEntry] {
        &self.entries
    }

    /// Mutable access to entries. Keys cannot be changed through an entry,
    /// so the index stays valid.
    pub fn entries_mut(&mut self) -> &mut [MessageEntry] {
        &mut self.entries
    }

    pub fn get(&self, key: &MessageKey) -> Option<&MessageEntry> {
        self.index.get(key).map(|&i| &self.entries[i])
    }

    pub fn get_mut(&mut self, key: &MessageKey) -> Option<&mut MessageEntry> {
        self.index.get(key).map(|&i| &mut self.entries[i])
    }

    pub fn contains(&self, key: &MessageKey) -> bool {
        self.index.contains_key(key)
    }

    /// Insert an entry, replacing any entry with the same key in place.
    ///
    /// Returns the replaced entry, if any.
    pub fn insert(&mut self, entry: MessageEntry) -> Option<MessageEntry> {
        match self.index.get(entry.key()) {
            Some(&i) => Some(std::mem::replace(&mut self.entries[i], entry)),
            None => {
                self.index.insert(entry.key().clone(), self.entries.len());
                self.entries.push(entry);
                None
            }
        }
    }

    /// Take all entries out, leaving the catalog empty but keeping metadata.
    pub(crate) fn take_entries(&mut self) -> Vec<MessageEntry> {
        self.index.clear();
        std::mem::take(&mut self.entries)
    }

    /// Remove obsolete entries for good. Returns how many were purged.
    pub fn compact(&mut self) -> usize {
        let before = self.entries.len();
        let kept: Vec<MessageEntry> = self
            .take_entries()
            .into_iter()
            .filter(|entry| !entry.obsolete)
            .collect();
        for entry in kept {
            self.insert(entry);
        }
        before - self.entries.len()
    }

    /// Positions of entries a reviewer still has to look at, in catalog order.
    ///
    /// Plural entries are left to PO editors and never queued.
    pub fn attention_indices(&self) -> Vec<usize> {
        self.entries
            .iter()
            .enumerate()
            .filter(|(_, entry)| entry.needs_attention() && !entry.is_plural())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats {
            total: self.entries.len(),
            ..Default::default()
        };
        for entry in &self.entries {
            if entry.obsolete {
                stats.obsolete += 1;
                continue;
            }
            if entry.is_translated() {
                stats.translated += 1;
            } else {
                stats.untranslated += 1;
            }
            if entry.is_reviewed() {
                stats.reviewed += 1;
            }
            if entry.is_fuzzy() {
                stats.fuzzy += 1;
            }
        }
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(msgid: &str) -> MessageEntry {
        MessageEntry::new(msgid, None).unwrap()
    }

    #[test]
    fn test_insert_keeps_order_and_uniqueness() {
        let mut catalog = Catalog::new("messages", "de");
        catalog.insert(entry("b"));
        catalog.insert(entry("a"));
        let replaced = catalog.insert(entry("b").with_translation("B"));

        assert!(replaced.is_some());
        let ids: Vec<&str> = catalog.entries().iter().map(|e| e.msgid()).collect();
        assert_eq!(ids, vec!["b", "a"]);
        assert_eq!(
            catalog
                .get(&MessageKey::new("b", None))
                .map(|e| e.translation()),
            Some("B")
        );
    }

    #[test]
    fn test_context_makes_distinct_keys() {
        let mut catalog = Catalog::new("messages", "de");
        catalog.insert(entry("Open"));
        catalog.insert(MessageEntry::new("Open", Some("menu".to_string())).unwrap());
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn test_compact_purges_only_obsolete() {
        let mut catalog = Catalog::new("messages", "de");
        catalog.insert(entry("keep"));
        let mut gone = entry("gone").with_translation("weg");
        gone.obsolete = true;
        catalog.insert(gone);
        catalog.insert(entry("also"));

        assert_eq!(catalog.compact(), 1);
        assert_eq!(catalog.len(), 2);
        assert!(catalog.get(&MessageKey::new("gone", None)).is_none());
        assert!(catalog.get(&MessageKey::new("also", None)).is_some());
    }

    #[test]
    fn test_stats_and_attention() {
        let mut catalog = Catalog::new("messages", "de");
        let mut reviewed = entry("a").with_translation("A");
        reviewed.mark_reviewed().unwrap();
        catalog.insert(reviewed);
        let mut fuzzy = entry("b").with_translation("B");
        fuzzy.set_fuzzy(true);
        catalog.insert(fuzzy);
        catalog.insert(entry("c"));
        let mut obsolete = entry("d");
        obsolete.obsolete = true;
        catalog.insert(obsolete);

        let stats = catalog.stats();
        assert_eq!(stats.total, 4);
        assert_eq!(stats.translated, 2);
        assert_eq!(stats.reviewed, 1);
        assert_eq!(stats.fuzzy, 1);
        assert_eq!(stats.untranslated, 1);
        assert_eq!(stats.obsolete, 1);
        assert_eq!(catalog.attention_indices(), vec![1, 2]);
    }

    #[test]
    fn test_plural_entries_not_queued_for_review() {
        let mut catalog = Catalog::new("messages", "de");
        catalog.insert(
            entry("{n} file").with_plural("{n} files", vec![String::new(), String::new()]),
        );
        catalog.insert(entry("Hello"));

        assert_eq!(catalog.attention_indices(), vec![1]);
        assert_eq!(catalog.stats().untranslated, 2);
    }

    #[test]
    fn test_header_nplurals() {
        let mut header = Header::default();
        assert_eq!(header.nplurals(), None);
        header.set("Plural-Forms", "nplurals=3; plural=(n==1 ? 0 : n%10>=2 ? 1 : 2);");
        assert_eq!(header.nplurals(), Some(3));
        header.set("Plural-Forms", "nplurals=0; plural=0;");
        assert_eq!(header.nplurals(), None);
    }

    #[test]
    fn test_header_roundtrip() {
        let mut header = Header::default();
        header.set("Language", "de");
        header.set("Content-Type", "text/plain; charset=UTF-8");
        header.set("Language", "fr");

        let parsed = Header::from_msgstr(&header.to_msgstr());
        assert_eq!(parsed.get("Language"), Some("fr"));
        assert_eq!(parsed.fields(), header.fields());
    }
}
