//! Human review of translations.
//!
//! ## Module Structure
//!
//! - `session`: the review state machine, free of any I/O
//! - `terminal`: a line-oriented front-end driving the session

mod session;
mod terminal;

pub use session::{ReviewSession, ReviewState, ReviewSummary};
pub use terminal::{ReviewError, Reviewer, TerminalReviewer};
