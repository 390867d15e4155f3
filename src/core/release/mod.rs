//! Release compiler: catalogs in, compact lookup artifact out.

mod artifact;
mod key;

use std::collections::HashMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use artifact::{ArtifactError, CompiledCatalog, MAGIC, NotFound, VERSION};
pub use key::{ReleaseKey, elf_hash};

use crate::core::catalog::{Catalog, Status, TranslationUnit};
use crate::core::error::PipelineError;
use crate::issues::{
    DropReason, DroppedMessagesIssue, Issue, MessageRef, PluralFormMismatchIssue,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ObsoleteHandling {
    /// Leave obsolete units out.
    #[default]
    Drop,
    /// Compile obsolete units; vanished units are always left out.
    Keep,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReleaseOptions {
    /// Emit id-keyed messages only.
    pub id_based: bool,
    pub drop_unfinished: bool,
    pub drop_identical_to_source: bool,
    /// Fill untranslated forms with this prefix plus the source text.
    pub mark_untranslated_prefix: Option<String>,
    pub obsolete_handling: ObsoleteHandling,
}

#[derive(Debug, Default)]
pub struct ReleaseReport {
    pub finished: usize,
    pub unfinished: usize,
    pub untranslated_ignored: usize,
    pub dropped_missing_id: usize,
    pub dropped_identical: usize,
    pub dropped_unfinished: usize,
    pub dropped_obsolete: usize,
    /// Id-based messages whose context or disambiguation is not part of the key.
    pub excess_context: usize,
    /// Plural messages whose form count was fixed up in the artifact.
    pub plural_normalized: usize,
    pub issues: Vec<Issue>,
}

impl ReleaseReport {
    pub fn generated(&self) -> usize {
        self.finished + self.unfinished
    }
}

/// Compiles one or more catalogs of the same target language into one
/// artifact.
#[derive(Debug)]
pub struct Compiler {
    options: ReleaseOptions,
    artifact: CompiledCatalog,
    /// Which message produced each key, for collision reports.
    owners: HashMap<ReleaseKey, Owner>,
    report: ReleaseReport,
}

#[derive(Debug)]
struct Owner {
    identity: (String, String, Option<String>),
    description: String,
}

impl Owner {
    fn of(origin: &str, unit: &TranslationUnit) -> Self {
        Self {
            identity: (
                unit.context.clone(),
                unit.source.clone(),
                unit.disambiguation().map(String::from),
            ),
            description: format!("{}: {}/{}", origin, unit.context, unit.source),
        }
    }
}

impl Compiler {
    pub fn new(language: impl Into<String>, options: ReleaseOptions) -> Self {
        Self {
            options,
            artifact: CompiledCatalog::new(language),
            owners: HashMap::new(),
            report: ReleaseReport::default(),
        }
    }

    /// Add every eligible unit of `catalog`.
    ///
    /// Fails on a target language different from the artifact's, and on two
    /// distinct messages sharing a key. The same message appearing in several
    /// catalogs is compiled once.
    pub fn add(&mut self, catalog: &Catalog) -> Result<(), PipelineError> {
        let language = catalog.target_language.as_deref().unwrap_or_default();
        if language != self.artifact.language {
            return Err(PipelineError::Argument(format!(
                "'{}' targets '{}' but the artifact targets '{}'",
                catalog.origin(),
                language,
                self.artifact.language
            )));
        }

        let forms = catalog.plural_form_count();
        let origin = catalog.origin();
        let mut missing_id = 0;
        let mut excess_context = 0;

        for unit in catalog.units() {
            let finished = match unit.status {
                Status::Finished => true,
                Status::Unfinished => false,
                Status::Obsolete { was_finished } => {
                    if self.options.obsolete_handling == ObsoleteHandling::Drop {
                        self.report.dropped_obsolete += 1;
                        continue;
                    }
                    was_finished
                }
                Status::Vanished { .. } => {
                    self.report.dropped_obsolete += 1;
                    continue;
                }
            };

            let has_id = unit.id.as_deref().is_some_and(|id| !id.is_empty());
            if self.options.id_based {
                if !has_id {
                    missing_id += 1;
                    continue;
                }
                if !unit.context.is_empty() || unit.disambiguation().is_some() {
                    excess_context += 1;
                }
            }

            if !finished && self.options.drop_unfinished {
                self.report.dropped_unfinished += 1;
                continue;
            }

            let Some(translations) = self.translations(origin, unit, forms) else {
                self.report.untranslated_ignored += 1;
                continue;
            };

            if self.options.drop_identical_to_source && is_identical_to_source(unit, &translations)
            {
                self.report.dropped_identical += 1;
                continue;
            }

            let key = ReleaseKey::for_unit(unit);
            let owner = Owner::of(origin, unit);
            if let Some(first) = self.owners.get(&key) {
                if first.identity == owner.identity {
                    continue;
                }
                return Err(PipelineError::KeyCollision {
                    key: key.to_string(),
                    first: first.description.clone(),
                    second: owner.description,
                });
            }
            self.owners.insert(key.clone(), owner);
            self.artifact.insert(key, translations);
            if finished {
                self.report.finished += 1;
            } else {
                self.report.unfinished += 1;
            }
        }

        self.report.dropped_missing_id += missing_id;
        self.report.excess_context += excess_context;
        let drops = [
            (DropReason::MissingId, missing_id),
            (DropReason::ExcessContext, excess_context),
        ];
        for (reason, count) in drops {
            if count > 0 {
                self.report
                    .issues
                    .push(Issue::DroppedMessages(DroppedMessagesIssue {
                        file_path: origin.to_string(),
                        reason,
                        count,
                    }));
            }
        }
        Ok(())
    }

    /// Forms to emit, or `None` for an untranslated unit that is skipped.
    fn translations(
        &mut self,
        origin: &str,
        unit: &TranslationUnit,
        forms: usize,
    ) -> Option<Vec<String>> {
        let mut translations = unit.translations.clone();
        let expected = unit.expected_forms(forms);
        if translations.len() != expected {
            if unit.is_plural() {
                self.report
                    .issues
                    .push(Issue::PluralFormMismatch(PluralFormMismatchIssue {
                        message: MessageRef::new(origin, unit),
                        expected,
                        actual: translations.len(),
                    }));
            }
            self.report.plural_normalized += 1;
            translations.resize(expected, String::new());
        }

        match &self.options.mark_untranslated_prefix {
            Some(prefix) => {
                for (index, form) in translations.iter_mut().enumerate() {
                    if form.is_empty() {
                        let source = match (index, &unit.plural_source) {
                            (0, _) | (_, None) => &unit.source,
                            (_, Some(plural)) => plural,
                        };
                        *form = format!("{}{}", prefix, source);
                    }
                }
                Some(translations)
            }
            None if translations.iter().all(String::is_empty) => None,
            None => Some(translations),
        }
    }

    pub fn finish(self) -> (CompiledCatalog, ReleaseReport) {
        (self.artifact, self.report)
    }
}

fn is_identical_to_source(unit: &TranslationUnit, translations: &[String]) -> bool {
    translations.iter().enumerate().all(|(index, form)| {
        let source = match (index, &unit.plural_source) {
            (0, _) | (_, None) => &unit.source,
            (_, Some(plural)) => plural,
        };
        form == source
    })
}

/// Compile a single catalog.
pub fn compile(
    catalog: &Catalog,
    options: &ReleaseOptions,
) -> Result<(CompiledCatalog, ReleaseReport), PipelineError> {
    let language = catalog.target_language.clone().unwrap_or_default();
    let mut compiler = Compiler::new(language, options.clone());
    compiler.add(catalog)?;
    Ok(compiler.finish())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn unit(context: &str, source: &str, translation: &str, status: Status) -> TranslationUnit {
        let mut unit = TranslationUnit::new(context, source);
        unit.set_translation(translation);
        unit.status = status;
        unit
    }

    fn catalog(units: Vec<TranslationUnit>) -> Catalog {
        let mut catalog = Catalog::new("app_de.ts");
        catalog.target_language = Some("de".to_string());
        for unit in units {
            catalog.push(unit);
        }
        catalog
    }

    fn text_key(context: &str, source: &str) -> ReleaseKey {
        ReleaseKey::for_text(context, source, None)
    }

    #[test]
    fn test_default_options() {
        let catalog = catalog(vec![
            unit("Dialog", "Save", "Speichern", Status::Finished),
            unit("Dialog", "Open", "Öffnen", Status::Unfinished),
            unit("Dialog", "Close", "", Status::Unfinished),
            unit("Dialog", "Quit", "Beenden", Status::Obsolete { was_finished: true }),
        ]);
        let (artifact, report) = compile(&catalog, &ReleaseOptions::default()).unwrap();

        assert_eq!(artifact.len(), 2);
        assert_eq!(
            artifact.lookup(&text_key("Dialog", "Save"), None).unwrap(),
            "Speichern"
        );
        assert_eq!(report.finished, 1);
        assert_eq!(report.unfinished, 1);
        assert_eq!(report.untranslated_ignored, 1);
        assert_eq!(report.dropped_obsolete, 1);
    }

    #[test]
    fn test_compile_is_deterministic() {
        let catalog = catalog(vec![
            unit("B", "two", "zwei", Status::Finished),
            unit("A", "one", "eins", Status::Finished),
        ]);
        let options = ReleaseOptions::default();
        let first = compile(&catalog, &options).unwrap().0.to_bytes().unwrap();
        let second = compile(&catalog, &options).unwrap().0.to_bytes().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_key_collision_is_fatal() {
        let catalog = catalog(vec![
            unit("A", "ab", "x", Status::Finished),
            unit("A", "`r", "y", Status::Finished),
        ]);
        match compile(&catalog, &ReleaseOptions::default()) {
            Err(PipelineError::KeyCollision { first, second, .. }) => {
                assert_eq!(first, "app_de.ts: A/ab");
                assert_eq!(second, "app_de.ts: A/`r");
            }
            other => panic!("expected a key collision, got {other:?}"),
        }
    }

    #[test]
    fn test_drop_options() {
        let catalog = catalog(vec![
            unit("Dialog", "OK", "OK", Status::Finished),
            unit("Dialog", "Open", "Öffnen", Status::Unfinished),
            unit("Dialog", "Save", "Speichern", Status::Finished),
        ]);
        let options = ReleaseOptions {
            drop_unfinished: true,
            drop_identical_to_source: true,
            ..Default::default()
        };
        let (artifact, report) = compile(&catalog, &options).unwrap();
        assert_eq!(artifact.len(), 1);
        assert_eq!(report.dropped_identical, 1);
        assert_eq!(report.dropped_unfinished, 1);
    }

    #[test]
    fn test_mark_untranslated() {
        let mut files = TranslationUnit::new("Dialog", "%n file");
        files.plural_source = Some("%n files".to_string());
        files.translations = vec![String::new(), String::new()];
        let catalog = catalog(vec![unit("Dialog", "Close", "", Status::Unfinished), files]);

        let options = ReleaseOptions {
            mark_untranslated_prefix: Some("# ".to_string()),
            ..Default::default()
        };
        let (artifact, report) = compile(&catalog, &options).unwrap();
        assert_eq!(report.unfinished, 2);
        assert_eq!(
            artifact.lookup(&text_key("Dialog", "Close"), None).unwrap(),
            "# Close"
        );
        let key = text_key("Dialog", "%n file");
        assert_eq!(artifact.lookup(&key, Some(1)).unwrap(), "# %n file");
        assert_eq!(artifact.lookup(&key, Some(4)).unwrap(), "# %n files");
    }

    #[test]
    fn test_keep_obsolete_skips_vanished() {
        let catalog = catalog(vec![
            unit("A", "one", "eins", Status::Obsolete { was_finished: true }),
            unit("A", "two", "zwei", Status::Vanished { was_finished: true }),
        ]);
        let options = ReleaseOptions {
            obsolete_handling: ObsoleteHandling::Keep,
            ..Default::default()
        };
        let (artifact, report) = compile(&catalog, &options).unwrap();
        assert_eq!(artifact.len(), 1);
        assert_eq!(report.finished, 1);
        assert_eq!(report.dropped_obsolete, 1);
    }

    #[test]
    fn test_id_based() {
        let mut quit = unit("Main", "Quit", "Beenden", Status::Finished);
        quit.id = Some("main.quit".to_string());
        let catalog = catalog(vec![quit, unit("Main", "Open", "Öffnen", Status::Finished)]);

        let options = ReleaseOptions {
            id_based: true,
            ..Default::default()
        };
        let (artifact, report) = compile(&catalog, &options).unwrap();
        assert_eq!(artifact.len(), 1);
        assert_eq!(
            artifact
                .lookup(&ReleaseKey::Id("main.quit".to_string()), None)
                .unwrap(),
            "Beenden"
        );
        assert_eq!(report.dropped_missing_id, 1);
        assert_eq!(report.excess_context, 1);
        assert_eq!(report.issues.len(), 2);
    }

    #[test]
    fn test_plural_form_mismatch_is_normalized() {
        let mut catalog = catalog(vec![]);
        catalog.target_language = Some("ru".to_string());
        let mut files = TranslationUnit::new("Dialog", "%n file(s)");
        files.plural_source = Some("%n file(s)".to_string());
        files.translations = vec!["%n файл".to_string(), "%n файла".to_string()];
        files.status = Status::Finished;
        catalog.push(files);

        let (artifact, report) = compile(&catalog, &ReleaseOptions::default()).unwrap();
        assert_eq!(report.plural_normalized, 1);
        assert!(matches!(
            report.issues.as_slice(),
            [Issue::PluralFormMismatch(issue)] if issue.expected == 3 && issue.actual == 2
        ));
        let forms = artifact.forms(&text_key("Dialog", "%n file(s)")).unwrap();
        assert_eq!(forms.len(), 3);
        // The source catalog is untouched.
        assert_eq!(catalog.contexts[0].units[0].translations.len(), 2);
    }

    #[test]
    fn test_catalogs_must_share_language() {
        let german = catalog(vec![unit("A", "one", "eins", Status::Finished)]);
        let mut french = catalog(vec![unit("A", "one", "un", Status::Finished)]);
        french.target_language = Some("fr".to_string());

        let mut compiler = Compiler::new("de", ReleaseOptions::default());
        compiler.add(&german).unwrap();
        assert!(matches!(
            compiler.add(&french),
            Err(PipelineError::Argument(_))
        ));
    }
}
