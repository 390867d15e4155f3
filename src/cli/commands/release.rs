use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::args::ReleaseCommand;
use super::{
    CommandResult, CommandSummary, ReleaseSummary, ReleasedArtifact,
    helper::{
        LanguageSettings, display_path, finish, load_catalogs, load_settings, resolve_catalogs,
        settle_languages,
    },
};
use crate::core::error::PipelineError;
use crate::core::release::{CompiledCatalog, Compiler, ObsoleteHandling, ReleaseOptions};
use crate::issues::Issue;
use crate::utils::atomic_write;

/// Extension of compiled artifacts.
pub const ARTIFACT_EXTENSION: &str = "qm";

/// Compile catalogs into lookup artifacts: one next to each catalog, or a
/// single combined one with `--output`.
pub fn release(cmd: ReleaseCommand) -> Result<CommandResult> {
    let settings = load_settings()?;
    let config = &settings.config;

    let mut options = ReleaseOptions::from(&config.release);
    options.id_based |= cmd.id_based;
    options.drop_unfinished |= cmd.no_unfinished;
    options.drop_identical_to_source |= cmd.remove_identical;
    if cmd.mark_untranslated.is_some() {
        options.mark_untranslated_prefix = cmd.mark_untranslated.clone();
    }
    if cmd.keep_obsolete {
        options.obsolete_handling = ObsoleteHandling::Keep;
    }

    let scan = resolve_catalogs(&cmd.catalogs, &settings, cmd.common.verbose)?;
    if let Some(missing) = scan.missing.first() {
        return Err(PipelineError::read(
            missing.clone(),
            io::Error::new(io::ErrorKind::NotFound, "no such catalog"),
        )
        .into());
    }
    if scan.files.is_empty() {
        anyhow::bail!("No catalogs to release. Pass catalog files or set 'catalogs' in the config.");
    }

    let mut loaded = load_catalogs(&scan.files)?;
    let catalogs_checked = loaded.len();
    let mut issues: Vec<Issue> = Vec::new();
    let languages = LanguageSettings::default();
    for entry in &mut loaded {
        issues.append(&mut entry.issues);
        settle_languages(&mut entry.catalog, &entry.path, &languages, &mut issues);
    }

    let mut artifacts = Vec::new();
    match &cmd.output {
        Some(output) => {
            let language = loaded
                .first()
                .and_then(|entry| entry.catalog.target_language.clone())
                .unwrap_or_default();
            let mut compiler = Compiler::new(language, options);
            for entry in &loaded {
                if !cmd.common.silent {
                    println!("Releasing '{}'...", display_path(&entry.path).bold());
                }
                compiler.add(&entry.catalog)?;
            }
            let (artifact, mut report) = compiler.finish();
            write_artifact(&artifact, output)?;
            issues.append(&mut report.issues);
            artifacts.push(ReleasedArtifact {
                path: output.clone(),
                sources: loaded.iter().map(|entry| entry.path.clone()).collect(),
                report,
            });
        }
        None => {
            for entry in &loaded {
                if !cmd.common.silent {
                    println!("Releasing '{}'...", display_path(&entry.path).bold());
                }
                let language = entry.catalog.target_language.clone().unwrap_or_default();
                let mut compiler = Compiler::new(language, options.clone());
                compiler.add(&entry.catalog)?;
                let (artifact, mut report) = compiler.finish();

                let output = entry.path.with_extension(ARTIFACT_EXTENSION);
                write_artifact(&artifact, &output)?;
                issues.append(&mut report.issues);
                artifacts.push(ReleasedArtifact {
                    path: output,
                    sources: vec![entry.path.clone()],
                    report,
                });
            }
        }
    }

    Ok(finish(
        CommandSummary::Release(ReleaseSummary { artifacts }),
        issues,
        catalogs_checked,
        true,
    ))
}

fn write_artifact(artifact: &CompiledCatalog, path: &Path) -> Result<()> {
    let bytes = artifact
        .to_bytes()
        .map_err(|e| PipelineError::write(path, io::Error::new(io::ErrorKind::InvalidData, e)))?;
    atomic_write(path, &bytes)
        .with_context(|| format!("Failed to write '{}'", display_path(path)))?;
    Ok(())
}

/// Read an artifact back; a malformed file is a read failure.
pub fn read_artifact(path: &Path) -> Result<CompiledCatalog> {
    let bytes = std::fs::read(path).map_err(|e| PipelineError::read(path, e))?;
    let artifact = CompiledCatalog::from_bytes(&bytes).map_err(|e| {
        PipelineError::read(
            PathBuf::from(path),
            io::Error::new(io::ErrorKind::InvalidData, e),
        )
    })?;
    Ok(artifact)
}
