use crate::core::catalog::{Phrase, PhraseBook};

/// An exact phrase book entry for a source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PhraseSuggestion<'a> {
    pub book: &'a str,
    pub phrase: &'a Phrase,
}

/// Every exact match for `source`, books in priority order.
pub fn phrase_suggestions<'a>(source: &'a str, books: &'a [PhraseBook]) -> Vec<PhraseSuggestion<'a>> {
    books
        .iter()
        .flat_map(|book| {
            book.lookup(source).map(move |phrase| PhraseSuggestion {
                book: &book.name,
                phrase,
            })
        })
        .collect()
}
