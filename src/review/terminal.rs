//! Line-oriented review front-end.
//!
//! Reads one command per line and maps it onto [`ReviewSession`] events:
//!
//! | Command    | Effect                                     |
//! |------------|--------------------------------------------|
//! | `a`        | accept the translation (saved right away)  |
//! | `e <text>` | replace the translation (`\n` for newline) |
//! | `n <text>` | set the reviewer note (bare `n` clears it) |
//! | `f <glob>` | only show entries matching the glob        |
//! | `f`        | clear the filter                           |
//! | `s`        | skip to the next entry                     |
//! | `w`        | write the catalog                          |
//! | `q`        | write and stop reviewing                   |
//! | `x`        | stop, discarding changes since last write  |
//!
//! End of input behaves like `q`. If reading input or writing a prompt
//! fails, unsaved changes are written before the error is returned.

use std::io::{self, BufRead, Write};

use colored::Colorize;
use glob::Pattern;
use thiserror::Error;
use tracing::warn;

use super::session::{ReviewSession, ReviewState, ReviewSummary};
use crate::catalog::{Catalog, InvalidState};
use crate::po::{CatalogSink, PersistenceError};

const HELP: &str = "a = accept, e <text> = edit, n <text> = note, f <glob> = filter, \
s = skip, w = write, q = write and quit, x = abort";

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("terminal I/O failed: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Persistence(#[from] PersistenceError),
    #[error(transparent)]
    State(#[from] InvalidState),
}

/// Something that can take a human through a catalog.
pub trait Reviewer {
    fn review<S: CatalogSink>(
        &mut self,
        catalog: &mut Catalog,
        sink: &mut S,
    ) -> Result<ReviewSummary, ReviewError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Command {
    Accept,
    Edit(String),
    Note(String),
    Filter(Option<String>),
    Skip,
    Write,
    Quit,
    Abort,
    Help,
}

fn parse_command(line: &str) -> Command {
    let line = line.trim_end_matches(['\r', '\n']);
    let (name, rest) = line
        .trim_start()
        .split_once(' ')
        .unwrap_or((line.trim(), ""));
    match name {
        "a" => Command::Accept,
        "e" if !rest.trim().is_empty() => Command::Edit(rest.trim().replace("\\n", "\n")),
        "n" => Command::Note(rest.trim().to_string()),
        "f" if rest.trim().is_empty() => Command::Filter(None),
        "f" => Command::Filter(Some(rest.trim().to_string())),
        "s" => Command::Skip,
        "w" => Command::Write,
        "q" => Command::Quit,
        "x" => Command::Abort,
        _ => Command::Help,
    }
}

/// Reviewer reading commands from `input` and writing prompts to `output`.
pub struct TerminalReviewer<R, W> {
    input: R,
    output: W,
}

impl TerminalReviewer<io::StdinLock<'static>, io::Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn into_output(self) -> W {
        self.output
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line))
    }

    fn prompt(&mut self, text: &str) -> io::Result<()> {
        write!(self.output, "{}", text)?;
        self.output.flush()
    }

    fn present<S: CatalogSink>(&mut self, session: &ReviewSession<'_, S>) -> io::Result<()> {
        let Some(entry) = session.current() else {
            return Ok(());
        };
        let (position, total) = session.position();
        let language = &session.catalog().language;

        writeln!(self.output)?;
        write!(
            self.output,
            "{} {}",
            format!("[{}/{}]", position, total).bold(),
            language.cyan()
        )?;
        if let Some(location) = entry.locations.first() {
            write!(self.output, "  {}", location.to_string().dimmed())?;
        }
        writeln!(self.output)?;
        if let Some(context) = entry.context() {
            writeln!(self.output, "  context: {}", context)?;
        }
        for comment in &entry.extracted_comments {
            writeln!(self.output, "  comment: {}", comment)?;
        }
        if let Some(note) = entry.note() {
            writeln!(self.output, "  note:    {}", note.yellow())?;
        }
        writeln!(self.output, "  source:  {}", entry.msgid())?;
        if entry.is_translated() {
            write!(self.output, "  target:  {}", entry.translation())?;
            if entry.is_fuzzy() {
                write!(self.output, " {}", "(fuzzy)".yellow())?;
            }
            writeln!(self.output)?;
        } else {
            writeln!(self.output, "  target:  {}", "(untranslated)".red())?;
        }
        Ok(())
    }

    fn confirm_abort(&mut self) -> io::Result<bool> {
        self.prompt("Discard changes since the last write? [y/N] ")?;
        Ok(self
            .read_line()?
            .is_some_and(|answer| matches!(answer.trim(), "y" | "Y" | "yes")))
    }

    fn finish_message(&mut self, summary: &ReviewSummary) -> io::Result<()> {
        writeln!(
            self.output,
            "Reviewed {} of {} entries ({} edited, {} skipped).",
            summary.accepted, summary.queued, summary.edited, summary.skipped
        )
    }
}

/// How the command loop ended.
enum Ending {
    Finished,
    Aborted(ReviewSummary),
}

impl<R: BufRead, W: Write> TerminalReviewer<R, W> {
    fn drive<S: CatalogSink>(
        &mut self,
        session: &mut ReviewSession<'_, S>,
    ) -> Result<Ending, ReviewError> {
        writeln!(self.output, "{}", HELP.dimmed())?;

        'entries: loop {
            if session.next() == ReviewState::Complete {
                break;
            }
            self.present(session)?;

            loop {
                self.prompt("> ")?;
                let Some(line) = self.read_line()? else {
                    session.save()?;
                    break 'entries;
                };

                match parse_command(&line) {
                    Command::Accept => match session.mark_reviewed() {
                        Ok(_) => {
                            session.save()?;
                            continue 'entries;
                        }
                        Err(e) => writeln!(self.output, "{}", e.to_string().red())?,
                    },
                    Command::Edit(text) => {
                        session.apply_edit(text)?;
                        self.present(session)?;
                    }
                    Command::Note(text) => {
                        session.set_note(&text)?;
                        self.present(session)?;
                    }
                    Command::Filter(glob) => self.apply_filter(session, glob)?,
                    Command::Skip => {
                        session.skip()?;
                        continue 'entries;
                    }
                    Command::Write => {
                        session.save()?;
                        writeln!(self.output, "Saved.")?;
                    }
                    Command::Quit => {
                        session.save()?;
                        break 'entries;
                    }
                    Command::Abort => {
                        if !session.has_unsaved_changes() || self.confirm_abort()? {
                            let summary = session.abort();
                            writeln!(self.output, "Review aborted.")?;
                            return Ok(Ending::Aborted(summary));
                        }
                    }
                    Command::Help => writeln!(self.output, "{}", HELP)?,
                }
            }
        }

        if session.state() == ReviewState::Complete {
            session.save()?;
        }
        Ok(Ending::Finished)
    }

    /// Filters that match no remaining entry are refused so the session
    /// cannot complete behind the reviewer's back.
    fn apply_filter<S: CatalogSink>(
        &mut self,
        session: &mut ReviewSession<'_, S>,
        glob: Option<String>,
    ) -> io::Result<()> {
        let Some(glob) = glob else {
            session.set_filter(None);
            return writeln!(
                self.output,
                "Filter cleared, {} entries left.",
                session.pending_matches()
            );
        };
        let pattern = match Pattern::new(&glob) {
            Ok(pattern) => pattern,
            Err(e) => {
                let message = format!("invalid filter \"{}\": {}", glob, e);
                return writeln!(self.output, "{}", message.red());
            }
        };

        let previous = session.filter().cloned();
        session.set_filter(Some(pattern));
        match session.pending_matches() {
            0 => {
                session.set_filter(previous);
                let message = format!("No remaining entry matches \"{}\".", glob);
                writeln!(self.output, "{}", message.yellow())
            }
            n => writeln!(self.output, "Filter \"{}\": {} entries left.", glob, n),
        }
    }
}

impl<R: BufRead, W: Write> Reviewer for TerminalReviewer<R, W> {
    fn review<S: CatalogSink>(
        &mut self,
        catalog: &mut Catalog,
        sink: &mut S,
    ) -> Result<ReviewSummary, ReviewError> {
        let mut session = ReviewSession::new(catalog, sink);
        if session.summary().queued == 0 {
            writeln!(self.output, "Nothing to review.")?;
            return Ok(session.finish());
        }

        match self.drive(&mut session) {
            Ok(Ending::Aborted(summary)) => Ok(summary),
            Ok(Ending::Finished) => {
                let summary = session.finish();
                self.finish_message(&summary)?;
                Ok(summary)
            }
            Err(e) => {
                if session.has_unsaved_changes()
                    && let Err(save_error) = session.save()
                {
                    warn!("Could not save review progress: {}", save_error);
                }
                Err(e)
            }
        }
    }
}
