//! Advisory checks on translated messages.
//!
//! Every check is a pure function over a source text and its translations.
//! Findings never block a merge or a release; they surface through
//! `tsctl check`.

use std::collections::BTreeSet;
use std::sync::LazyLock;

use rayon::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::core::catalog::{Catalog, PhraseBook, TranslationUnit};
use crate::core::heuristics::phrase_suggestions;
use crate::issues::{Issue, MessageRef, ValidationIssue, ValidationKind};
use crate::utils::simplified;

static PLACE_MARKER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"%L?([1-9][0-9]?)").unwrap());

static NUMERUS_MARKER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"%L?n").unwrap());

/// Which checks run; all on by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Validators {
    pub accelerators: bool,
    pub punctuation: bool,
    pub place_markers: bool,
    pub phrase_matches: bool,
}

impl Default for Validators {
    fn default() -> Self {
        Self {
            accelerators: true,
            punctuation: true,
            place_markers: true,
            phrase_matches: true,
        }
    }
}

/// Class of the last character of a text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ending {
    None,
    FullStop,
    Interrobang,
    Colon,
    Ellipsis,
}

/// Number of mnemonic markers: `&` before a printable, non-space character.
///
/// `&&` is a literal ampersand and `&name;` an entity; neither counts.
pub fn accelerator_count(text: &str) -> usize {
    let chars: Vec<char> = text.chars().collect();
    let mut count = 0;
    let mut i = 0;
    while i < chars.len() {
        if chars[i] != '&' {
            i += 1;
            continue;
        }
        let Some(&next) = chars.get(i + 1) else { break };
        if next == '&' {
            i += 2;
            continue;
        }
        if !next.is_whitespace() && !next.is_control() {
            let word_end = chars[i + 1..]
                .iter()
                .position(|c| !c.is_ascii_alphabetic())
                .map_or(chars.len(), |p| i + 1 + p);
            let is_entity = word_end > i + 1 && chars.get(word_end) == Some(&';');
            if !is_entity {
                count += 1;
            }
        }
        i += 2;
    }
    count
}

/// Classify the final character of the whitespace-simplified text.
///
/// `greek` enables the Greek question mark `;`.
pub fn ending(text: &str, greek: bool) -> Ending {
    let text = simplified(text);
    let Some(last) = text.chars().last() else {
        return Ending::None;
    };
    match last {
        '.' if text.ends_with("...") => Ending::Ellipsis,
        '.' | '\u{589}' | '\u{6d4}' | '\u{3002}' => Ending::FullStop,
        '!' | '?' | '\u{a1}' | '\u{bf}' | '\u{1c3}' | '\u{37e}' | '\u{61f}' | '\u{203c}'
        | '\u{203d}' | '\u{2048}' | '\u{2049}' | '\u{2762}' | '\u{ff01}' | '\u{ff1f}' => {
            Ending::Interrobang
        }
        ';' if greek => Ending::Interrobang,
        ':' | '\u{ff1a}' => Ending::Colon,
        '\u{2026}' => Ending::Ellipsis,
        _ => Ending::None,
    }
}

/// Positional markers `%1`..`%99` (also `%L1`) used in a text.
pub fn place_markers(text: &str) -> BTreeSet<u32> {
    PLACE_MARKER_REGEX
        .captures_iter(text)
        .filter_map(|c| c[1].parse().ok())
        .collect()
}

pub fn has_numerus_marker(text: &str) -> bool {
    NUMERUS_MARKER_REGEX.is_match(text)
}

fn is_greek(language: Option<&str>) -> bool {
    language.is_some_and(|l| l.to_ascii_lowercase().starts_with("el"))
}

/// Catalog-wide settings the per-unit checks need.
#[derive(Debug, Clone, Copy)]
pub struct ValidationContext<'a> {
    pub validators: Validators,
    pub books: &'a [PhraseBook],
    pub greek_source: bool,
    pub greek_target: bool,
}

impl<'a> ValidationContext<'a> {
    pub fn for_catalog(catalog: &Catalog, books: &'a [PhraseBook], validators: Validators) -> Self {
        Self {
            validators,
            books,
            greek_source: is_greek(catalog.source_language.as_deref()),
            greek_target: is_greek(catalog.target_language.as_deref()),
        }
    }
}

/// Findings for one unit, at most one per kind.
pub fn check_unit(
    unit: &TranslationUnit,
    ctx: &ValidationContext<'_>,
) -> Vec<(ValidationKind, Option<String>)> {
    let mut findings = Vec::new();
    if unit.status.is_stale() || !unit.has_translation() {
        return findings;
    }
    let forms: Vec<&str> = unit
        .translations
        .iter()
        .map(String::as_str)
        .filter(|t| !t.is_empty())
        .collect();
    let checks = ctx.validators;

    if checks.accelerators {
        let expected = accelerator_count(&unit.source);
        let counts: Vec<usize> = forms.iter().map(|f| accelerator_count(f)).collect();
        if counts.iter().any(|&c| c < expected) {
            findings.push((ValidationKind::MissingAccelerator, None));
        } else if counts.iter().any(|&c| c > expected) {
            findings.push((ValidationKind::SuperfluousAccelerator, None));
        }
    }

    if checks.punctuation {
        let expected = ending(&unit.source, ctx.greek_source);
        if forms.iter().any(|f| ending(f, ctx.greek_target) != expected) {
            findings.push((ValidationKind::PunctuationDiffers, None));
        }
    }

    if checks.place_markers {
        if let Some(detail) = place_marker_difference(&unit.source, &forms) {
            findings.push((ValidationKind::PlaceMarkersDiffer, Some(detail)));
        }
        let uses_numerus = has_numerus_marker(&unit.source)
            || unit.plural_source.as_deref().is_some_and(has_numerus_marker);
        if unit.is_plural() && uses_numerus && !forms.iter().all(|f| has_numerus_marker(f)) {
            findings.push((ValidationKind::NumerusMarkerMissing, None));
        }
    }

    if checks.phrase_matches && !unit.status.is_finished() {
        let suggestions: Vec<_> = phrase_suggestions(&unit.source, ctx.books)
            .into_iter()
            .filter(|s| !s.phrase.target.is_empty())
            .collect();
        let used = suggestions
            .iter()
            .any(|s| forms.iter().any(|f| f.contains(s.phrase.target.as_str())));
        if let (Some(first), false) = (suggestions.first(), used) {
            findings.push((
                ValidationKind::IgnoredPhraseBook,
                Some(format!(
                    "phrase book '{}' suggests \"{}\"",
                    first.book, first.phrase.target
                )),
            ));
        }
    }

    findings
}

fn place_marker_difference(source: &str, forms: &[&str]) -> Option<String> {
    let expected = place_markers(source);
    forms.iter().find_map(|form| {
        let found = place_markers(form);
        if found == expected {
            return None;
        }
        let missing: Vec<String> = expected.difference(&found).map(|n| format!("%{}", n)).collect();
        let extra: Vec<String> = found.difference(&expected).map(|n| format!("%{}", n)).collect();
        let mut parts = Vec::new();
        if !missing.is_empty() {
            parts.push(format!("missing {}", missing.join(", ")));
        }
        if !extra.is_empty() {
            parts.push(format!("unexpected {}", extra.join(", ")));
        }
        Some(parts.join("; "))
    })
}

/// Run the enabled checks over every unit of a catalog, in parallel.
///
/// Results come back in catalog order.
pub fn validate_catalog(
    catalog: &Catalog,
    books: &[PhraseBook],
    validators: Validators,
) -> Vec<Issue> {
    let ctx = ValidationContext::for_catalog(catalog, books, validators);
    let origin = catalog.origin();
    let units: Vec<&TranslationUnit> = catalog.units().collect();

    units
        .par_iter()
        .flat_map_iter(|unit| {
            check_unit(unit, &ctx)
                .into_iter()
                .map(move |(kind, detail)| {
                    Issue::Validation(ValidationIssue {
                        message: MessageRef::new(origin, unit),
                        kind,
                        detail,
                    })
                })
        })
        .collect()
}
