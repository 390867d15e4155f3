use anyhow::{Context, Result};
use colored::Colorize;

use super::super::args::TranslateCommand;
use super::{
    CommandResult, CommandSummary, TranslateSummary,
    helper::{
        LanguageSettings, display_path, finish, load_catalogs, load_phrase_books,
        load_settings, locations_mode, settle_languages,
    },
};
use crate::core::heuristics::{BatchOptions, batch_translate};
use crate::core::parsers::ts;
use crate::issues::Issue;

pub fn translate(cmd: TranslateCommand) -> Result<CommandResult> {
    let settings = load_settings()?;
    let config = &settings.config;
    let books = load_phrase_books(&cmd.phrase_books, &settings)?;

    let mut loaded = load_catalogs(std::slice::from_ref(&cmd.catalog))?;
    let Some(mut entry) = loaded.pop() else {
        anyhow::bail!("Failed to load '{}'", display_path(&cmd.catalog));
    };

    let mut issues: Vec<Issue> = std::mem::take(&mut entry.issues);
    settle_languages(
        &mut entry.catalog,
        &entry.path,
        &LanguageSettings::default(),
        &mut issues,
    );

    if !cmd.common.silent {
        println!("Translating '{}'...", display_path(&entry.path).bold());
    }
    let options = BatchOptions {
        retranslate: cmd.retranslate,
        mark_finished: cmd.mark_finished,
        use_history: !cmd.no_history,
    };
    let report = batch_translate(&mut entry.catalog, &books, &options);

    if report.touched > 0 {
        let write_options = ts::WriteOptions {
            locations: locations_mode(None, &entry.catalog, config.locations),
            drop_tags: config.drop_tags_regex()?,
        };
        ts::save(&entry.catalog, &entry.path, &write_options)
            .with_context(|| format!("Failed to update '{}'", display_path(&entry.path)))?;
    }

    Ok(finish(
        CommandSummary::Translate(TranslateSummary {
            path: entry.path,
            unit_count: entry.catalog.unit_count(),
            report,
        }),
        issues,
        1,
        true,
    ))
}
