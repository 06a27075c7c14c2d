use std::{fs, path::PathBuf};

use anyhow::{Context, Result};
use tracing::debug;

use crate::config::Settings;

/// Catalog files this tool generates for the configured languages that
/// currently exist on disk.
pub fn generated_files(settings: &Settings) -> Vec<PathBuf> {
    let mut candidates = vec![settings.template_path()];
    for lang in &settings.dest_lang {
        candidates.push(settings.po_path(lang));
        candidates.push(settings.mo_path(lang));
    }
    candidates.retain(|path| path.is_file());
    candidates
}

/// Delete `files`, then any directories left empty by it.
pub fn remove_files(files: &[PathBuf]) -> Result<usize> {
    for file in files {
        fs::remove_file(file)
            .with_context(|| format!("Failed to delete file: {}", file.display()))?;
        debug!("deleted {}", file.display());
    }
    // `<lang>/LC_MESSAGES` and `<lang>`; non-empty directories stay.
    for file in files {
        if let Some(messages_dir) = file.parent()
            && messages_dir.file_name().is_some_and(|n| n == "LC_MESSAGES")
            && fs::remove_dir(messages_dir).is_ok()
            && let Some(lang_dir) = messages_dir.parent()
        {
            let _ = fs::remove_dir(lang_dir);
        }
    }
    Ok(files.len())
}
