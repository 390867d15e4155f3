use std::collections::{BTreeMap, HashMap};

use rayon::prelude::*;

use crate::core::catalog::{Catalog, PhraseBook, Status, TranslationUnit};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Also overwrite units that are finished or already translated.
    pub retranslate: bool,
    /// Mark filled units finished instead of unfinished.
    pub mark_finished: bool,
    /// Reuse the catalog's own finished translations after the phrase books.
    pub use_history: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            retranslate: false,
            mark_finished: false,
            use_history: true,
        }
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    pub touched: usize,
    /// Units filled per phrase book name.
    pub from_books: BTreeMap<String, usize>,
    pub from_history: usize,
}

enum FillSource<'a> {
    Book(&'a str),
    History,
}

struct Fill<'a> {
    translations: Vec<String>,
    source: FillSource<'a>,
}

/// Fill untranslated units from phrase books (in priority order), then from
/// finished units of the same catalog.
///
/// Lookups run in parallel over a read-only view; results are applied in
/// catalog order afterwards.
pub fn batch_translate(
    catalog: &mut Catalog,
    books: &[PhraseBook],
    options: &BatchOptions,
) -> BatchReport {
    let forms = catalog.plural_form_count();
    let fills: Vec<Option<Fill<'_>>> = {
        let history = if options.use_history {
            finished_by_source(catalog)
        } else {
            HashMap::new()
        };
        let units: Vec<&TranslationUnit> = catalog.units().collect();
        units
            .par_iter()
            .map(|unit| find_fill(unit, books, &history, forms, options))
            .collect()
    };

    let mut report = BatchReport::default();
    let status = if options.mark_finished {
        Status::Finished
    } else {
        Status::Unfinished
    };
    for (unit, fill) in catalog.units_mut().zip(fills) {
        let Some(fill) = fill else { continue };
        unit.translations = fill.translations;
        unit.status = status;
        report.touched += 1;
        match fill.source {
            FillSource::Book(name) => *report.from_books.entry(name.to_string()).or_default() += 1,
            FillSource::History => report.from_history += 1,
        }
    }
    report
}

/// First finished, translated unit per source text, in catalog order.
fn finished_by_source(catalog: &Catalog) -> HashMap<String, (Option<String>, Vec<String>)> {
    let mut history = HashMap::new();
    for unit in catalog.units() {
        if unit.status.is_finished() && unit.has_translation() {
            history
                .entry(unit.source.clone())
                .or_insert_with(|| (unit.plural_source.clone(), unit.translations.clone()));
        }
    }
    history
}

fn find_fill<'a>(
    unit: &TranslationUnit,
    books: &'a [PhraseBook],
    history: &HashMap<String, (Option<String>, Vec<String>)>,
    forms: usize,
    options: &BatchOptions,
) -> Option<Fill<'a>> {
    if unit.status.is_stale() {
        return None;
    }
    if !options.retranslate && (unit.status.is_finished() || unit.has_translation()) {
        return None;
    }

    if !unit.is_plural() || forms == 1 {
        let found = books
            .iter()
            .find_map(|book| book.first_match(&unit.source).map(|p| (book, p)));
        if let Some((book, phrase)) = found {
            let translations = vec![phrase.target.clone()];
            if translations != unit.translations {
                return Some(Fill {
                    translations,
                    source: FillSource::Book(&book.name),
                });
            }
            return None;
        }
    }

    let (plural_source, translations) = history.get(&unit.source)?;
    if *plural_source != unit.plural_source
        || translations.len() != unit.translations.len()
        || *translations == unit.translations
    {
        return None;
    }
    Some(Fill {
        translations: translations.clone(),
        source: FillSource::History,
    })
}
