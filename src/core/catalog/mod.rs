//! In-memory translation catalog.
//!
//! A [`Catalog`] is an ordered list of [`Context`]s, each holding the
//! [`TranslationUnit`]s of one logical scope, plus the language metadata the
//! plural engine needs. It is an explicit value: the merger borrows it
//! mutably, the release compiler borrows it immutably, and nothing keeps a
//! global copy.

mod context;
mod phrasebook;
mod unit;

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

pub use context::Context;
pub use phrasebook::{Phrase, PhraseBook};
pub use unit::{Location, MergeKey, Resize, Status, TranslationUnit};

use crate::core::numerus::{self, Numerus};
use crate::issues::{Issue, MessageRef, PluralTruncatedIssue, UnknownPluralRulesIssue};

/// TS format version written by this crate.
pub const FORMAT_VERSION: &str = "2.1";

/// How source locations are stored in a catalog file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LocationsMode {
    /// `filename` and `line` on every location.
    Absolute,
    /// File names only when they change, line numbers as deltas.
    Relative,
    /// No locations at all.
    None,
}

/// Per-status unit counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CatalogStats {
    pub finished: usize,
    pub unfinished: usize,
    pub obsolete: usize,
    pub vanished: usize,
}

/// Outcome of forcing every plural unit to the target language's form count.
#[derive(Debug, Default)]
pub struct FormSizing {
    pub resized: usize,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    pub source_language: Option<String>,
    pub target_language: Option<String>,
    pub format_version: String,
    pub default_codec: Option<String>,
    pub contexts: Vec<Context>,
    /// Catalog-level `extra-*` elements.
    pub extras: BTreeMap<String, String>,
    /// Locations mode the file was read with, if any.
    pub locations_mode: Option<LocationsMode>,
    origin: String,
}

impl Catalog {
    /// An empty catalog that will be written to (or was read from) `origin`.
    pub fn new(origin: impl Into<String>) -> Self {
        Self {
            source_language: None,
            target_language: None,
            format_version: FORMAT_VERSION.to_string(),
            default_codec: None,
            contexts: Vec::new(),
            extras: BTreeMap::new(),
            locations_mode: None,
            origin: origin.into(),
        }
    }

    /// Path used in diagnostics.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn set_origin(&mut self, origin: impl Into<String>) {
        self.origin = origin.into();
    }

    pub fn context(&self, name: &str) -> Option<&Context> {
        self.contexts.iter().find(|c| c.name == name)
    }

    pub fn context_index(&self, name: &str) -> Option<usize> {
        self.contexts.iter().position(|c| c.name == name)
    }

    /// Index of the context called `name`, appending an empty one if needed.
    pub fn ensure_context(&mut self, name: &str) -> usize {
        match self.context_index(name) {
            Some(index) => index,
            None => {
                self.contexts.push(Context::new(name));
                self.contexts.len() - 1
            }
        }
    }

    /// Append a unit to its context, creating the context if necessary.
    pub fn push(&mut self, unit: TranslationUnit) {
        let index = self.ensure_context(&unit.context);
        self.contexts[index].push(unit);
    }

    pub fn units(&self) -> impl Iterator<Item = &TranslationUnit> {
        self.contexts.iter().flat_map(|c| c.units.iter())
    }

    pub fn units_mut(&mut self) -> impl Iterator<Item = &mut TranslationUnit> {
        self.contexts.iter_mut().flat_map(|c| c.units.iter_mut())
    }

    pub fn unit_count(&self) -> usize {
        self.contexts.iter().map(|c| c.units.len()).sum()
    }

    pub fn stats(&self) -> CatalogStats {
        let mut stats = CatalogStats::default();
        for unit in self.units() {
            match unit.status {
                Status::Finished => stats.finished += 1,
                Status::Unfinished => stats.unfinished += 1,
                Status::Obsolete { .. } => stats.obsolete += 1,
                Status::Vanished { .. } => stats.vanished += 1,
            }
        }
        stats
    }

    /// Plural rule of the target language (universal fallback when unknown).
    pub fn numerus(&self) -> Numerus {
        numerus::resolve(self.target_language.as_deref().unwrap_or_default())
    }

    /// Diagnostic for a target language without plural rules, if any.
    pub fn unknown_plural_rules(&self) -> Option<Issue> {
        self.numerus().unknown.map(|unknown| {
            Issue::UnknownPluralRules(UnknownPluralRulesIssue {
                file_path: self.origin.clone(),
                language: unknown.language,
            })
        })
    }

    pub fn plural_form_count(&self) -> usize {
        self.numerus().rule.form_count()
    }

    /// Switch the target language and resize every plural unit to its form count.
    ///
    /// Truncating forms that hold text is lossy and reported as a warning.
    pub fn set_target_language(&mut self, language: &str) -> FormSizing {
        self.target_language = Some(language.to_string());
        self.normalize_plural_forms()
    }

    /// Resize plural units to the target language's form count and
    /// non-plural units to exactly one form.
    pub fn normalize_plural_forms(&mut self) -> FormSizing {
        let forms = self.plural_form_count();
        let origin = self.origin.clone();
        let mut sizing = FormSizing::default();

        for unit in self.units_mut() {
            let expected = unit.expected_forms(forms);
            match unit.resize_forms(expected) {
                Resize::Unchanged => {}
                Resize::Padded { .. } => sizing.resized += 1,
                Resize::Truncated { from, to, lost } => {
                    sizing.resized += 1;
                    if !lost.is_empty() {
                        sizing
                            .issues
                            .push(Issue::PluralTruncated(PluralTruncatedIssue {
                                message: MessageRef::new(&origin, unit),
                                from,
                                to,
                                lost,
                            }));
                    }
                }
            }
        }

        sizing
    }

    /// Order contexts by name; units keep their order.
    pub fn sort_contexts(&mut self) {
        self.contexts.sort_by(|a, b| a.name.cmp(&b.name));
    }

    /// Keep only units matching `keep`, dropping contexts left empty.
    /// Returns the number of removed units.
    pub fn retain_units<F>(&mut self, mut keep: F) -> usize
    where
        F: FnMut(&TranslationUnit) -> bool,
    {
        let before = self.unit_count();
        for context in &mut self.contexts {
            context.units.retain(|u| keep(u));
        }
        self.contexts.retain(|c| !c.is_empty());
        before - self.unit_count()
    }
}
