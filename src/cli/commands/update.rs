use std::fs;

use anyhow::{Context, Result};
use colored::Colorize;

use super::super::args::UpdateCommand;
use super::{
    CommandResult, CommandSummary, UpdateSummary, UpdatedCatalog,
    helper::{
        LanguageSettings, LoadedCatalog, display_path, finish, load_catalogs, load_phrase_books,
        load_settings, locations_mode, resolve_catalogs, settle_languages,
    },
};
use crate::core::catalog::Catalog;
use crate::core::error::PipelineError;
use crate::core::heuristics::HeuristicChain;
use crate::core::merge::{MergeOptions, merge};
use crate::core::parsers::{extracted, ts};
use crate::issues::Issue;

/// Merge freshly extracted messages into each catalog and write it back.
///
/// Catalog paths that do not exist yet are created. Every catalog is merged
/// in memory first and only replaced on disk once the merge succeeded.
pub fn update(cmd: UpdateCommand) -> Result<CommandResult> {
    let settings = load_settings()?;
    let config = &settings.config;
    let verbose = cmd.common.verbose;

    let messages = extracted::load(&cmd.messages)?;
    let books = load_phrase_books(&cmd.phrase_books, &settings)?;

    let scan = resolve_catalogs(&cmd.catalogs, &settings, verbose)?;
    if scan.files.is_empty() && scan.missing.is_empty() {
        anyhow::bail!("No catalogs to update. Pass catalog files or set 'catalogs' in the config.");
    }

    let mut disabled = config.disabled_heuristics.clone();
    disabled.extend(cmd.disabled_heuristics.iter().copied());
    let options = MergeOptions {
        keep_obsolete: cmd.keep_obsolete || (config.keep_obsolete && !cmd.no_obsolete),
        no_obsolete: cmd.no_obsolete || (config.no_obsolete && !cmd.keep_obsolete),
        sort_contexts: config.sort_contexts && !cmd.no_sort,
        plural_only: cmd.plural_only,
        heuristics: HeuristicChain::new(&disabled, config.similarity_threshold),
    };
    let languages = LanguageSettings {
        source: cmd
            .source_language
            .as_deref()
            .or(config.source_language.as_deref()),
        target: cmd
            .target_language
            .as_deref()
            .or(config.target_language.as_deref()),
    };
    let drop_tags = config.drop_tags_regex()?;

    let mut loaded = load_catalogs(&scan.files)?;
    for path in scan.missing {
        let catalog = Catalog::new(path.to_string_lossy());
        loaded.push(LoadedCatalog {
            path,
            catalog,
            issues: Vec::new(),
        });
    }
    let catalogs_checked = loaded.len();

    let mut issues: Vec<Issue> = Vec::new();
    let mut updated = Vec::with_capacity(loaded.len());
    for entry in loaded {
        let LoadedCatalog {
            path,
            mut catalog,
            issues: read_issues,
        } = entry;
        let created = !path.exists();
        if !cmd.common.silent {
            println!("Updating '{}'...", display_path(&path).bold());
        }
        issues.extend(read_issues);
        settle_languages(&mut catalog, &path, &languages, &mut issues);

        let mut report = merge(&mut catalog, &messages, &books, &options);
        issues.append(&mut report.issues);

        let write_options = ts::WriteOptions {
            locations: locations_mode(cmd.locations, &catalog, config.locations),
            drop_tags: drop_tags.clone(),
        };
        if created && let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| PipelineError::write(parent, e))?;
        }
        ts::save(&catalog, &path, &write_options)
            .with_context(|| format!("Failed to update '{}'", display_path(&path)))?;

        updated.push(UpdatedCatalog {
            path,
            created,
            stats: catalog.stats(),
            report,
        });
    }

    Ok(finish(
        CommandSummary::Update(UpdateSummary {
            catalogs: updated,
            messages_found: messages.len(),
        }),
        issues,
        catalogs_checked,
        true,
    ))
}
