use anyhow::Result;

use super::super::args::CheckCommand;
use super::{
    CommandResult, CommandSummary,
    helper::{
        LanguageSettings, finish, load_catalogs, load_phrase_books, load_settings,
        resolve_catalogs, settle_languages,
    },
};
use crate::core::error::PipelineError;
use crate::core::validate::validate_catalog;
use crate::issues::Issue;

/// Run the configured validators over every catalog. Advisory only: the
/// catalogs are not modified.
pub fn check(cmd: CheckCommand) -> Result<CommandResult> {
    let settings = load_settings()?;
    let books = load_phrase_books(&cmd.phrase_books, &settings)?;

    let scan = resolve_catalogs(&cmd.catalogs, &settings, cmd.common.verbose)?;
    if let Some(missing) = scan.missing.first() {
        return Err(PipelineError::read(
            missing.clone(),
            std::io::Error::new(std::io::ErrorKind::NotFound, "no such catalog"),
        )
        .into());
    }

    let mut loaded = load_catalogs(&scan.files)?;
    let mut all_issues: Vec<Issue> = Vec::new();
    for entry in &mut loaded {
        all_issues.append(&mut entry.issues);
        settle_languages(
            &mut entry.catalog,
            &entry.path,
            &LanguageSettings::default(),
            &mut all_issues,
        );
        all_issues.extend(validate_catalog(
            &entry.catalog,
            &books,
            settings.config.validators,
        ));
    }

    Ok(finish(CommandSummary::Check, all_issues, loaded.len(), true))
}
