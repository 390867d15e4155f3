use std::{
    collections::BTreeSet,
    path::{Path, PathBuf},
};

use colored::Colorize;
use glob::glob;
use walkdir::WalkDir;

/// Check if a pattern contains glob wildcards (* or ?).
/// Patterns without wildcards are treated as literal paths.
fn is_glob_pattern(pattern: &str) -> bool {
    pattern.contains('*') || pattern.contains('?')
}

/// Result of resolving catalog arguments.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Existing catalog files, sorted and deduplicated.
    pub files: Vec<PathBuf>,
    /// Literal paths that do not exist (yet).
    pub missing: Vec<PathBuf>,
    pub skipped_count: usize,
}

/// Resolve catalog arguments relative to `base_dir`.
///
/// Each entry is a file, a directory (scanned recursively for `*.ts`) or a
/// glob pattern.
pub fn scan_catalogs(base_dir: &Path, patterns: &[String], verbose: bool) -> ScanResult {
    let mut files: BTreeSet<PathBuf> = BTreeSet::new();
    let mut result = ScanResult::default();

    for pattern in patterns {
        let full = base_dir.join(pattern);
        if is_glob_pattern(pattern) {
            match glob(&full.to_string_lossy()) {
                Ok(entries) => {
                    for entry in entries.flatten() {
                        if entry.is_dir() {
                            walk_dir(&entry, &mut files, &mut result.skipped_count, verbose);
                        } else if is_catalog_file(&entry) {
                            files.insert(entry);
                        }
                    }
                }
                Err(e) => {
                    if verbose {
                        eprintln!(
                            "{} Invalid glob pattern '{}': {}",
                            "warning:".bold().yellow(),
                            pattern,
                            e
                        );
                    }
                }
            }
        } else if full.is_dir() {
            walk_dir(&full, &mut files, &mut result.skipped_count, verbose);
        } else if full.is_file() {
            files.insert(full);
        } else {
            result.missing.push(full);
        }
    }

    result.files = files.into_iter().collect();
    result
}

fn walk_dir(dir: &Path, files: &mut BTreeSet<PathBuf>, skipped_count: &mut usize, verbose: bool) {
    for entry in WalkDir::new(dir) {
        let entry = match entry {
            Ok(e) => e,
            Err(e) => {
                *skipped_count += 1;
                if verbose {
                    eprintln!("{} Cannot access path: {}", "warning:".bold().yellow(), e);
                }
                continue;
            }
        };
        let path = entry.path();
        if path.is_file() && is_catalog_file(path) {
            files.insert(path.to_path_buf());
        }
    }
}

fn is_catalog_file(path: &Path) -> bool {
    path.extension().and_then(|e| e.to_str()) == Some("ts")
}
