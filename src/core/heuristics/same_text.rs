use super::{Heuristic, HeuristicKind, Pool, Query, Suggestion};

/// Reuses the translation of an identical source text found elsewhere in the
/// catalog, then in the phrase books.
#[derive(Debug, Clone, Copy, Default)]
pub struct SameTextHeuristic;

impl Heuristic for SameTextHeuristic {
    fn kind(&self) -> HeuristicKind {
        HeuristicKind::SameText
    }

    fn suggest(&self, query: &Query<'_>, pool: &Pool<'_>) -> Option<Suggestion> {
        let mut matches = pool
            .everywhere
            .iter()
            .filter(|c| c.source == query.source && query.accepts(c));
        let first = matches.next();
        let chosen = match first {
            Some(c) if !c.finished => matches.find(|c| c.finished).or(first),
            other => other,
        };
        if let Some(candidate) = chosen {
            return Some(candidate.suggest(self.kind(), candidate.translations.to_vec()));
        }

        if !query.accepts_phrase() {
            return None;
        }
        pool.books
            .iter()
            .find_map(|book| book.first_match(query.source))
            .map(|phrase| Suggestion {
                kind: self.kind(),
                translations: vec![phrase.target.clone()],
                old_source: phrase.source.clone(),
                old_disambiguation: None,
            })
    }
}
