use std::path::{Path, PathBuf};

use glob::Pattern;
use tracing::{debug, warn};
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths or directory names.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?') || pattern.contains('[')
}

/// A file found under one of the input paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub path: PathBuf,
    /// Path relative to its input root, `/`-separated. Used for mapping rules.
    pub relative: String,
    /// Path shown in catalog locations, `/`-separated.
    pub display: String,
}

/// Result of scanning the input paths.
#[derive(Debug, Default)]
pub struct ScanResult {
    pub files: Vec<SourceFile>,
    pub skipped_count: usize,
}

/// Exclusion rules compiled once per scan.
struct Exclusions {
    literals: Vec<String>,
    globs: Vec<Pattern>,
}

impl Exclusions {
    fn new(patterns: &[String]) -> Self {
        let mut literals = Vec::new();
        let mut globs = Vec::new();
        for p in patterns {
            if is_glob_pattern(p) {
                match Pattern::new(p) {
                    Ok(pattern) => globs.push(pattern),
                    Err(e) => warn!("Invalid exclude pattern '{}': {}", p, e),
                }
            } else {
                literals.push(p.trim_end_matches('/').to_string());
            }
        }
        Self { literals, globs }
    }

    /// A relative path is excluded if it, or one of its components, matches.
    fn excludes(&self, relative: &str) -> bool {
        if relative.is_empty() {
            return false;
        }
        let components: Vec<&str> = relative.split('/').collect();

        let literal_hit = self.literals.iter().any(|literal| {
            relative == literal
                || relative.starts_with(&format!("{}/", literal))
                || components.iter().any(|c| c == literal)
        });

        literal_hit
            || self.globs.iter().any(|glob| {
                glob.matches(relative) || components.iter().any(|c| glob.matches(c))
            })
    }
}

fn to_slash(path: &Path) -> String {
    path.components()
        .filter_map(|c| match c {
            std::path::Component::CurDir => None,
            std::path::Component::RootDir => Some(String::new()),
            other => Some(other.as_os_str().to_string_lossy().into_owned()),
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.') && name != "." && name != ".."
}

/// Walk the input paths and list candidate source files in a stable order.
///
/// Hidden files and directories are never scanned. Input paths that are
/// files are taken as-is.
pub fn scan_sources(input_paths: &[PathBuf], exclude_patterns: &[String]) -> ScanResult {
    let exclusions = Exclusions::new(exclude_patterns);
    let mut result = ScanResult::default();

    for root in input_paths {
        if !root.exists() {
            warn!("Input path does not exist: {}", root.display());
            result.skipped_count += 1;
            continue;
        }

        if root.is_file() {
            let relative = root
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();
            result.files.push(SourceFile {
                path: root.clone(),
                relative,
                display: to_slash(root),
            });
            continue;
        }

        let walker = WalkDir::new(root)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| {
                entry.depth() == 0 || !is_hidden(&entry.file_name().to_string_lossy())
            });

        for entry in walker {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    result.skipped_count += 1;
                    warn!("Cannot access path: {}", e);
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }

            let path = entry.path();
            let relative = path.strip_prefix(root).map(to_slash).unwrap_or_default();
            if exclusions.excludes(&relative) {
                debug!("Excluded {}", relative);
                continue;
            }

            result.files.push(SourceFile {
                path: path.to_path_buf(),
                relative,
                display: to_slash(path),
            });
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    fn relatives(result: &ScanResult) -> Vec<&str> {
        result.files.iter().map(|f| f.relative.as_str()).collect()
    }

    #[test]
    fn test_scan_sorted_and_skips_hidden() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "b.py");
        touch(dir.path(), "a/x.py");
        touch(dir.path(), ".venv/lib.py");
        touch(dir.path(), ".hidden.py");

        let result = scan_sources(&[dir.path().to_path_buf()], &[]);
        assert_eq!(relatives(&result), vec!["a/x.py", "b.py"]);
    }

    #[test]
    fn test_literal_exclusion_matches_dir_names() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app/main.py");
        touch(dir.path(), "app/tests/test_main.py");
        touch(dir.path(), "build/gen.py");

        let result = scan_sources(
            &[dir.path().to_path_buf()],
            &["tests".to_string(), "build/".to_string()],
        );
        assert_eq!(relatives(&result), vec!["app/main.py"]);
    }

    #[test]
    fn test_glob_exclusion() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "app/main.py");
        touch(dir.path(), "app/main_test.py");

        let result = scan_sources(&[dir.path().to_path_buf()], &["*_test.py".to_string()]);
        assert_eq!(relatives(&result), vec!["app/main.py"]);
    }

    #[test]
    fn test_missing_input_counted() {
        let dir = tempdir().unwrap();
        let result = scan_sources(&[dir.path().join("nope")], &[]);
        assert!(result.files.is_empty());
        assert_eq!(result.skipped_count, 1);
    }

    #[test]
    fn test_file_input_path() {
        let dir = tempdir().unwrap();
        touch(dir.path(), "single.py");

        let result = scan_sources(&[dir.path().join("single.py")], &[]);
        assert_eq!(relatives(&result), vec!["single.py"]);
    }
}
