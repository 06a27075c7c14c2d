use glob::Pattern;
use tracing::debug;

use crate::catalog::{Catalog, InvalidState, MessageEntry};
use crate::po::{CatalogSink, PersistenceError};

/// Where the session stands. Indices point into the catalog's entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewState {
    Idle,
    Presenting(usize),
    Edited(usize),
    Skipped(usize),
    Accepted(usize),
    Complete,
}

impl ReviewState {
    /// The entry an edit, accept or skip would apply to.
    fn current(self) -> Option<usize> {
        match self {
            ReviewState::Presenting(i) | ReviewState::Edited(i) => Some(i),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReviewSummary {
    /// Entries queued for review when the session started.
    pub queued: usize,
    pub presented: usize,
    pub edited: usize,
    pub accepted: usize,
    pub skipped: usize,
    /// Queued entries not presented yet.
    pub remaining: usize,
    pub saves: usize,
    pub aborted: bool,
}

/// Walks a reviewer through the entries that need attention.
///
/// The catalog is borrowed for the whole session. `save` writes it through
/// the sink and records a checkpoint; `abort` restores the last checkpoint,
/// so only saved work survives an abort.
///
/// An optional glob filter narrows which queued entries `next` presents.
/// Entries it hides stay queued and count as remaining.
pub struct ReviewSession<'a, S: CatalogSink> {
    catalog: &'a mut Catalog,
    sink: &'a mut S,
    queue: Vec<usize>,
    presented: Vec<bool>,
    filter: Option<Pattern>,
    state: ReviewState,
    checkpoint: Catalog,
    summary: ReviewSummary,
}

impl<'a, S: CatalogSink> ReviewSession<'a, S> {
    pub fn new(catalog: &'a mut Catalog, sink: &'a mut S) -> Self {
        let queue = catalog.attention_indices();
        let checkpoint = catalog.clone();
        let summary = ReviewSummary {
            queued: queue.len(),
            ..Default::default()
        };
        Self {
            catalog,
            sink,
            presented: vec![false; queue.len()],
            queue,
            filter: None,
            state: ReviewState::Idle,
            checkpoint,
            summary,
        }
    }

    pub fn state(&self) -> ReviewState {
        self.state
    }

    pub fn catalog(&self) -> &Catalog {
        &*self.catalog
    }

    /// The entry being presented, if any.
    pub fn current(&self) -> Option<&MessageEntry> {
        self.state
            .current()
            .and_then(|i| self.catalog.entries().get(i))
    }

    /// Number of entries presented so far (the current one included), and
    /// queue length.
    pub fn position(&self) -> (usize, usize) {
        (self.summary.presented, self.queue.len())
    }

    /// Whether the catalog differs from what was last saved (or loaded).
    pub fn has_unsaved_changes(&self) -> bool {
        *self.catalog != self.checkpoint
    }

    pub fn filter(&self) -> Option<&Pattern> {
        self.filter.as_ref()
    }

    /// Only present entries whose source or translation matches `filter`
    /// from now on. `None` shows every queued entry again.
    pub fn set_filter(&mut self, filter: Option<Pattern>) {
        debug!(filter = ?filter.as_ref().map(Pattern::as_str), "review filter");
        self.filter = filter;
    }

    /// Queued entries not presented yet that pass the current filter.
    pub fn pending_matches(&self) -> usize {
        (0..self.queue.len())
            .filter(|&slot| self.is_pending(slot))
            .count()
    }

    fn is_pending(&self, slot: usize) -> bool {
        if self.presented[slot] {
            return false;
        }
        let Some(filter) = &self.filter else {
            return true;
        };
        let entry = &self.catalog.entries()[self.queue[slot]];
        filter.matches(entry.msgid()) || filter.matches(entry.translation())
    }

    /// Move to the next entry needing attention. `Complete` is terminal.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> ReviewState {
        if self.state == ReviewState::Complete {
            return self.state;
        }
        self.state = match (0..self.queue.len()).find(|&slot| self.is_pending(slot)) {
            Some(slot) => {
                self.presented[slot] = true;
                self.summary.presented += 1;
                ReviewState::Presenting(self.queue[slot])
            }
            None => ReviewState::Complete,
        };
        self.state
    }

    /// Replace the current translation. Review status is not confirmed by
    /// an edit; an edit to empty text drops it.
    pub fn apply_edit(&mut self, text: impl Into<String>) -> Result<ReviewState, InvalidState> {
        let i = self.state.current().ok_or(InvalidState::NoCurrentEntry)?;
        let entry = &mut self.catalog.entries_mut()[i];
        entry.set_translation(text);
        entry.clear_reviewed();
        if matches!(self.state, ReviewState::Presenting(_)) {
            self.summary.edited += 1;
        }
        debug!(msgid = entry.msgid(), "edited");
        self.state = ReviewState::Edited(i);
        Ok(self.state)
    }

    /// Confirm the current translation.
    pub fn mark_reviewed(&mut self) -> Result<ReviewState, InvalidState> {
        let i = self.state.current().ok_or(InvalidState::NoCurrentEntry)?;
        self.catalog.entries_mut()[i].mark_reviewed()?;
        self.summary.accepted += 1;
        self.state = ReviewState::Accepted(i);
        Ok(self.state)
    }

    /// Attach a reviewer note to the current entry. Blank text removes it.
    /// The review status is untouched.
    pub fn set_note(&mut self, text: &str) -> Result<ReviewState, InvalidState> {
        let i = self.state.current().ok_or(InvalidState::NoCurrentEntry)?;
        self.catalog.entries_mut()[i].set_note(text);
        Ok(self.state)
    }

    /// Leave the current entry as it is and move past it.
    pub fn skip(&mut self) -> Result<ReviewState, InvalidState> {
        let i = self.state.current().ok_or(InvalidState::NoCurrentEntry)?;
        self.summary.skipped += 1;
        self.state = ReviewState::Skipped(i);
        Ok(self.state)
    }

    /// Persist the catalog and make the current contents the rollback point.
    pub fn save(&mut self) -> Result<(), PersistenceError> {
        self.sink.save(&*self.catalog)?;
        self.checkpoint = self.catalog.clone();
        self.summary.saves += 1;
        Ok(())
    }

    /// Cancel the session, rolling back everything since the last save.
    /// The session is complete afterwards.
    pub fn abort(&mut self) -> ReviewSummary {
        *self.catalog = self.checkpoint.clone();
        self.state = ReviewState::Complete;
        self.summary.aborted = true;
        self.summary()
    }

    /// End the session keeping in-memory changes. Saving is up to the caller.
    pub fn finish(self) -> ReviewSummary {
        self.summary()
    }

    pub fn summary(&self) -> ReviewSummary {
        ReviewSummary {
            remaining: self.queue.len() - self.summary.presented,
            ..self.summary
        }
    }
}
