//! Merge a fresh extraction into an existing catalog.
//!
//! Human work is never lost here: entries whose key survives keep their
//! translation and review state, vanished entries are only marked obsolete.

use std::collections::HashMap;

use thiserror::Error;
use tracing::{debug, warn};

use super::{Catalog, DEFAULT_NPLURALS, Location, MessageEntry, MessageKey};
use crate::extract::ExtractedMessage;

/// A fresh entry rejected during reconciliation. Not fatal to the merge.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("skipped extracted entry #{index}{}: {reason}", location_suffix(.locations))]
pub struct SkippedEntry {
    /// Position of the entry in the extraction sequence.
    pub index: usize,
    pub locations: Vec<Location>,
    pub reason: String,
}

fn location_suffix(locations: &[Location]) -> String {
    match locations.first() {
        Some(location) => format!(" at {}", location),
        None => String::new(),
    }
}

/// What a reconciliation changed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Keys seen for the first time.
    pub added: usize,
    /// Keys already present and still in use.
    pub kept: usize,
    /// Previously obsolete keys that reappeared.
    pub revived: usize,
    /// Keys that disappeared from the source in this run.
    pub obsoleted: usize,
    pub skipped: Vec<SkippedEntry>,
}

/// Reconcile `catalog` in place against `fresh` messages.
///
/// Output order is first-seen order of the fresh extraction, followed by
/// obsolete entries in their prior relative order. A key appearing twice in
/// `fresh` merges the later locations into the first occurrence.
pub fn reconcile<I>(catalog: &mut Catalog, fresh: I) -> ReconcileReport
where
    I: IntoIterator<Item = ExtractedMessage>,
{
    let mut report = ReconcileReport::default();
    let nplurals = catalog.header.nplurals().unwrap_or(DEFAULT_NPLURALS);

    let previous_entries = catalog.take_entries();
    let previous_order: Vec<MessageKey> =
        previous_entries.iter().map(|e| e.key().clone()).collect();
    let mut previous: HashMap<MessageKey, MessageEntry> = previous_entries
        .into_iter()
        .map(|e| (e.key().clone(), e))
        .collect();

    for (index, message) in fresh.into_iter().enumerate() {
        let ExtractedMessage {
            msgid,
            context,
            plural,
            locations,
            comments,
        } = message;

        let key = MessageKey::new(msgid, context);

        if let Some(existing) = catalog.get_mut(&key) {
            debug!(key = %key, "merging duplicate occurrence");
            for location in locations {
                if !existing.locations.contains(&location) {
                    existing.locations.push(location);
                }
            }
            continue;
        }

        let entry = match previous.remove(&key) {
            Some(mut entry) => {
                if entry.obsolete {
                    report.revived += 1;
                } else {
                    report.kept += 1;
                }
                entry.obsolete = false;
                entry.locations = dedup(locations);
                entry.extracted_comments = comments;
                entry.set_plural_source(plural, nplurals);
                entry
            }
            None => match MessageEntry::new(key.msgid, key.context) {
                Ok(entry) => {
                    report.added += 1;
                    let mut entry = entry.with_locations(dedup(locations));
                    if let Some(plural) = plural {
                        entry = entry.with_plural(plural, vec![String::new(); nplurals]);
                    }
                    entry.extracted_comments = comments;
                    entry
                }
                Err(err) => {
                    let skipped = SkippedEntry {
                        index,
                        locations,
                        reason: err.to_string(),
                    };
                    warn!("{}", skipped);
                    report.skipped.push(skipped);
                    continue;
                }
            },
        };
        catalog.insert(entry);
    }

    for key in previous_order {
        if let Some(mut entry) = previous.remove(&key) {
            if !entry.obsolete {
                report.obsoleted += 1;
                entry.obsolete = true;
            }
            catalog.insert(entry);
        }
    }

    debug!(
        language = %catalog.language,
        added = report.added,
        kept = report.kept,
        revived = report.revived,
        obsoleted = report.obsoleted,
        skipped = report.skipped.len(),
        "reconciled catalog"
    );
    report
}

fn dedup(locations: Vec<Location>) -> Vec<Location> {
    let mut unique: Vec<Location> = Vec::with_capacity(locations.len());
    for location in locations {
        if !unique.contains(&location) {
            unique.push(location);
        }
    }
    unique
}
