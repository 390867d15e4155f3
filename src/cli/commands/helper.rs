//! Plumbing shared by the catalog commands: configuration, file resolution
//! and loading, language handling and result assembly.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;
use rayon::prelude::*;

use super::{CommandResult, CommandSummary};
use crate::config::{ConfigLoadResult, load_config};
use crate::core::catalog::{Catalog, LocationsMode, PhraseBook};
use crate::core::error::PipelineError;
use crate::core::file_scanner::{ScanResult, scan_catalogs};
use crate::core::parsers::{qph, ts};
use crate::issues::{Issue, LanguageChange, LanguageIssue, Severity};

pub fn finish(
    summary: CommandSummary,
    mut issues: Vec<Issue>,
    catalogs_checked: usize,
    exit_on_errors: bool,
) -> CommandResult {
    issues.sort();

    let parse_error_count = issues
        .iter()
        .filter(|i| matches!(i, Issue::ParseError(_)))
        .count();

    let mut error_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Error)
        .count();
    let warning_count = issues
        .iter()
        .filter(|i| i.severity() == Severity::Warning)
        .count();

    match summary {
        CommandSummary::Init(ref init) if init.error.is_some() => error_count += 1,
        CommandSummary::Lookup(ref lookup) if lookup.translation.is_none() => error_count += 1,
        _ => {}
    }

    CommandResult {
        summary,
        error_count,
        warning_count,
        exit_on_errors,
        issues,
        parse_error_count,
        catalogs_checked,
    }
}

/// Load `.tsctlrc.json` from the working directory upwards.
pub fn load_settings() -> Result<ConfigLoadResult> {
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    load_config(&cwd)
}

/// Catalog files named on the command line, or the config's `catalogs`
/// (relative to the config file) when none are given.
pub fn resolve_catalogs(args: &[String], settings: &ConfigLoadResult, verbose: bool) -> Result<ScanResult> {
    if args.is_empty() {
        return Ok(scan_catalogs(
            &settings.base_dir,
            &settings.config.catalogs,
            verbose,
        ));
    }
    let cwd = std::env::current_dir().context("Failed to get current directory")?;
    Ok(scan_catalogs(&cwd, args, verbose))
}

/// Phrase books from the command line, or from the config when none are given.
///
/// Glob patterns are expanded; a listed book that cannot be read is fatal.
pub fn load_phrase_books(args: &[String], settings: &ConfigLoadResult) -> Result<Vec<PhraseBook>> {
    let patterns: &[String] = if args.is_empty() {
        &settings.config.phrase_books
    } else {
        args
    };
    let base_dir = if args.is_empty() {
        settings.base_dir.clone()
    } else {
        std::env::current_dir().context("Failed to get current directory")?
    };

    let mut paths: Vec<PathBuf> = Vec::new();
    for pattern in patterns {
        let full = base_dir.join(pattern);
        if pattern.contains('*') || pattern.contains('?') {
            let entries = glob::glob(&full.to_string_lossy())
                .with_context(|| format!("Invalid phrase book pattern: \"{}\"", pattern))?;
            paths.extend(entries.flatten());
        } else {
            paths.push(full);
        }
    }

    let books = paths
        .par_iter()
        .map(|path| qph::load(path))
        .collect::<Result<Vec<_>, PipelineError>>()?;
    Ok(books)
}

/// A catalog as read from disk, with the diagnostics of reading it.
pub struct LoadedCatalog {
    pub path: PathBuf,
    pub catalog: Catalog,
    pub issues: Vec<Issue>,
}

/// Read `paths` in parallel.
///
/// Every failure is reported; the first one is returned so the exit status
/// reflects it.
pub fn load_catalogs(paths: &[PathBuf]) -> Result<Vec<LoadedCatalog>> {
    let results: Vec<Result<LoadedCatalog, PipelineError>> = paths
        .par_iter()
        .map(|path| {
            ts::load(path).map(|outcome| LoadedCatalog {
                path: path.clone(),
                catalog: outcome.catalog,
                issues: outcome.issues,
            })
        })
        .collect();

    let mut loaded = Vec::with_capacity(results.len());
    let mut first_error = None;
    for result in results {
        match result {
            Ok(catalog) => loaded.push(catalog),
            Err(err) if first_error.is_none() => first_error = Some(err),
            Err(err) => eprintln!("{} {}", "error:".bold().red(), err),
        }
    }

    match first_error {
        Some(err) => Err(err.into()),
        None => Ok(loaded),
    }
}

/// Language overrides applied to every catalog of a run.
#[derive(Debug, Default)]
pub struct LanguageSettings<'a> {
    pub source: Option<&'a str>,
    pub target: Option<&'a str>,
}

/// Settle the catalog's languages: an explicit target wins over the file,
/// a file without one gets the language in its name. A source language that
/// disagrees with the file is ignored.
pub fn settle_languages(
    catalog: &mut Catalog,
    path: &Path,
    languages: &LanguageSettings<'_>,
    issues: &mut Vec<Issue>,
) {
    let file_path = catalog.origin().to_string();

    match (languages.target, catalog.target_language.clone()) {
        (Some(requested), Some(current)) if requested != current => {
            issues.push(Issue::Language(LanguageIssue {
                file_path: file_path.clone(),
                change: LanguageChange::Changed {
                    from: current,
                    to: requested.to_string(),
                },
            }));
            issues.extend(catalog.set_target_language(requested).issues);
        }
        (Some(requested), None) => {
            issues.extend(catalog.set_target_language(requested).issues);
        }
        (None, None) => {
            if let Some(language) = ts::guess_language(path) {
                issues.push(Issue::Language(LanguageIssue {
                    file_path: file_path.clone(),
                    change: LanguageChange::Guessed {
                        language: language.clone(),
                    },
                }));
                issues.extend(catalog.set_target_language(&language).issues);
            }
        }
        _ => {}
    }

    match (languages.source, catalog.source_language.clone()) {
        (Some(requested), Some(file)) if requested != file => {
            issues.push(Issue::Language(LanguageIssue {
                file_path,
                change: LanguageChange::SourceMismatch {
                    file,
                    requested: requested.to_string(),
                },
            }));
        }
        (Some(requested), None) => catalog.source_language = Some(requested.to_string()),
        _ => {}
    }

    issues.extend(catalog.unknown_plural_rules());
}

/// Locations mode to write: explicit choice, else what the file used, else
/// the configured default.
pub fn locations_mode(
    requested: Option<LocationsMode>,
    catalog: &Catalog,
    configured: LocationsMode,
) -> LocationsMode {
    requested.unwrap_or(match catalog.locations_mode {
        Some(LocationsMode::Relative) => LocationsMode::Relative,
        Some(LocationsMode::Absolute) => LocationsMode::Absolute,
        Some(LocationsMode::None) | None => configured,
    })
}

/// Path relative to the working directory for display.
pub fn display_path(path: &Path) -> String {
    let relative = std::env::current_dir()
        .ok()
        .and_then(|cwd| path.strip_prefix(&cwd).ok().map(Path::to_path_buf));
    relative
        .unwrap_or_else(|| path.to_path_buf())
        .to_string_lossy()
        .into_owned()
}
