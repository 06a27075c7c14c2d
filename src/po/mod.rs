//! Raw catalog storage in the gettext PO format.
//!
//! ## Module Structure
//!
//! - `parser`: PO text to [`Catalog`]
//! - `writer`: [`Catalog`] to PO text, with line wrapping
//!
//! [`PoFile`] binds a catalog to its path on disk and is the
//! [`CatalogSink`] the review session saves through.

mod parser;
mod writer;

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
};

use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

use crate::catalog::Catalog;

pub use parser::{PoParseError, parse_po};
pub use writer::write_po;

/// Failure to read, parse or write a catalog file.
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("failed to read {}: {source}", path.display())]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        source: PoParseError,
    },
    #[error("failed to write {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Somewhere a catalog can be saved to.
pub trait CatalogSink {
    fn save(&mut self, catalog: &Catalog) -> Result<(), PersistenceError>;
}

/// A PO file on disk.
#[derive(Debug, Clone)]
pub struct PoFile {
    path: PathBuf,
    line_width: usize,
}

impl PoFile {
    pub fn new(path: impl Into<PathBuf>, line_width: usize) -> Self {
        Self {
            path: path.into(),
            line_width,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the catalog, or `None` if the file does not exist yet.
    pub fn load(&self, domain: &str, language: &str) -> Result<Option<Catalog>, PersistenceError> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(source) => {
                return Err(PersistenceError::Read {
                    path: self.path.clone(),
                    source,
                });
            }
        };
        let catalog =
            parse_po(&content, domain, language).map_err(|source| PersistenceError::Parse {
                path: self.path.clone(),
                source,
            })?;
        debug!(path = %self.path.display(), entries = catalog.len(), "loaded catalog");
        Ok(Some(catalog))
    }
}

impl CatalogSink for PoFile {
    fn save(&mut self, catalog: &Catalog) -> Result<(), PersistenceError> {
        write_atomic(&self.path, write_po(catalog, self.line_width).as_bytes())?;
        debug!(path = %self.path.display(), entries = catalog.len(), "saved catalog");
        Ok(())
    }
}

/// Replace `path` with `content` atomically.
///
/// The data goes to a temporary file in the same directory, is flushed and
/// synced, then renamed over the target. A failure at any point leaves the
/// previous file untouched.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<(), PersistenceError> {
    let write_err = |source: io::Error| PersistenceError::Write {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(write_err)?;

    let mut temp = NamedTempFile::new_in(dir).map_err(write_err)?;
    temp.write_all(content).map_err(write_err)?;
    temp.flush().map_err(write_err)?;
    temp.as_file().sync_all().map_err(write_err)?;
    temp.persist(path).map_err(|e| write_err(e.error))?;
    Ok(())
}
