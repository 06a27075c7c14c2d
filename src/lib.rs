//! poflow - gettext localization workflow
//!
//! poflow extracts translatable strings from source files, merges them into
//! per-language PO catalogs without losing human work, fills gaps with
//! machine translation, walks a reviewer through what still needs attention
//! and compiles the result into MO files.
//!
//! ## Module Structure
//!
//! - `catalog`: message entries, catalogs and reconciliation
//! - `cli`: Command-line interface layer
//! - `config`: Configuration file loading and settings resolution
//! - `extract`: source scanning and keyword extraction
//! - `issues`: Issue type definitions and reporting
//! - `mo`: compiled MO output
//! - `po`: PO file parsing, writing and atomic persistence
//! - `review`: review state machine and terminal front-end
//! - `translate`: machine translation services
//! - `workflow`: the per-language pipeline

pub mod catalog;
pub mod cli;
pub mod config;
pub mod extract;
pub mod issues;
pub mod mo;
pub mod po;
pub mod review;
pub mod translate;
pub mod workflow;
