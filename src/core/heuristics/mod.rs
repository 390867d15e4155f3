//! Translation reuse heuristics.
//!
//! When a message is new or its source text changed, an existing translation
//! of a similar message can often be reused. Each heuristic is a pure
//! strategy over a [`Query`] and a [`Pool`] of candidates; the
//! [`HeuristicChain`] runs them in a fixed order and takes the first hit.
//!
//! Suggestions are hints only: the caller never marks a unit finished
//! because a heuristic filled it.

mod batch;
mod number;
mod phrase_book;
mod same_text;
mod similar_text;

use clap::ValueEnum;
use enum_dispatch::enum_dispatch;
use serde::{Deserialize, Serialize};

pub use batch::{BatchOptions, BatchReport, batch_translate};
pub use number::NumberHeuristic;
pub use phrase_book::{PhraseSuggestion, phrase_suggestions};
pub use same_text::SameTextHeuristic;
pub use similar_text::{SimilarTextHeuristic, similarity};

use crate::core::catalog::{PhraseBook, TranslationUnit};

/// Default minimum normalized similarity for the similar-text heuristic.
pub const DEFAULT_SIMILARITY_THRESHOLD: f64 = 0.85;

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum HeuristicKind {
    Number,
    #[value(name = "sametext")]
    SameText,
    #[value(name = "similartext")]
    SimilarText,
}

impl std::fmt::Display for HeuristicKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HeuristicKind::Number => write!(f, "number"),
            HeuristicKind::SameText => write!(f, "same-text"),
            HeuristicKind::SimilarText => write!(f, "similar-text"),
        }
    }
}

/// A previously translated message a heuristic may reuse.
#[derive(Debug, Clone, Copy)]
pub struct Candidate<'a> {
    pub source: &'a str,
    pub disambiguation: Option<&'a str>,
    pub plural: bool,
    pub translations: &'a [String],
    pub finished: bool,
}

impl<'a> Candidate<'a> {
    pub fn from_unit(unit: &'a TranslationUnit) -> Self {
        Self {
            source: &unit.source,
            disambiguation: unit.disambiguation(),
            plural: unit.is_plural(),
            translations: &unit.translations,
            finished: unit.status.is_finished() || unit.status.revived().is_finished(),
        }
    }

    fn has_translation(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }

    fn suggest(&self, kind: HeuristicKind, translations: Vec<String>) -> Suggestion {
        Suggestion {
            kind,
            translations,
            old_source: self.source.to_string(),
            old_disambiguation: self.disambiguation.map(String::from),
        }
    }
}

/// The message a translation is wanted for.
#[derive(Debug, Clone, Copy)]
pub struct Query<'a> {
    pub source: &'a str,
    pub plural: bool,
    /// Number of forms the unit holds.
    pub forms: usize,
}

impl<'a> Query<'a> {
    pub fn for_unit(unit: &'a TranslationUnit, plural_forms: usize) -> Self {
        Self {
            source: &unit.source,
            plural: unit.is_plural(),
            forms: unit.expected_forms(plural_forms),
        }
    }

    /// Whether a candidate's translations can fill this query's forms.
    fn accepts(&self, candidate: &Candidate<'_>) -> bool {
        candidate.plural == self.plural
            && candidate.translations.len() == self.forms
            && candidate.has_translation()
    }

    /// Phrase book entries hold one form only.
    fn accepts_phrase(&self) -> bool {
        !self.plural || self.forms == 1
    }
}

/// Translations proposed by a heuristic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub kind: HeuristicKind,
    pub translations: Vec<String>,
    /// Source text the translations were made for.
    pub old_source: String,
    pub old_disambiguation: Option<String>,
}

/// Candidates a query is matched against.
#[derive(Debug, Default)]
pub struct Pool<'a> {
    /// Compared by the number and similar-text heuristics.
    pub nearby: &'a [Candidate<'a>],
    /// Searched for exact source matches, in catalog order.
    pub everywhere: &'a [Candidate<'a>],
    pub books: &'a [PhraseBook],
}

#[enum_dispatch]
pub trait Heuristic {
    fn kind(&self) -> HeuristicKind;

    fn suggest(&self, query: &Query<'_>, pool: &Pool<'_>) -> Option<Suggestion>;
}

#[enum_dispatch(Heuristic)]
#[derive(Debug, Clone)]
pub enum Strategy {
    Number(NumberHeuristic),
    SameText(SameTextHeuristic),
    SimilarText(SimilarTextHeuristic),
}

/// Heuristics in evaluation order: number, same text, similar text.
#[derive(Debug, Clone)]
pub struct HeuristicChain {
    strategies: Vec<Strategy>,
}

impl Default for HeuristicChain {
    fn default() -> Self {
        Self::new(&[], DEFAULT_SIMILARITY_THRESHOLD)
    }
}

impl HeuristicChain {
    pub fn new(disabled: &[HeuristicKind], similarity_threshold: f64) -> Self {
        let all: [Strategy; 3] = [
            NumberHeuristic.into(),
            SameTextHeuristic.into(),
            SimilarTextHeuristic::new(similarity_threshold).into(),
        ];
        let strategies = all
            .into_iter()
            .filter(|s| !disabled.contains(&s.kind()))
            .collect();
        Self { strategies }
    }

    pub fn is_empty(&self) -> bool {
        self.strategies.is_empty()
    }

    pub fn suggest(&self, query: &Query<'_>, pool: &Pool<'_>) -> Option<Suggestion> {
        self.strategies
            .iter()
            .find_map(|strategy| strategy.suggest(query, pool))
    }
}
