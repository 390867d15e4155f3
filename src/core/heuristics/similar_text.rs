use super::{Heuristic, HeuristicKind, Pool, Query, Suggestion};

const EPSILON: f64 = 1e-9;

/// Reuses the translation of the single closest source text, if it is close
/// enough.
#[derive(Debug, Clone, Copy)]
pub struct SimilarTextHeuristic {
    threshold: f64,
}

impl SimilarTextHeuristic {
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }
}

impl Heuristic for SimilarTextHeuristic {
    fn kind(&self) -> HeuristicKind {
        HeuristicKind::SimilarText
    }

    fn suggest(&self, query: &Query<'_>, pool: &Pool<'_>) -> Option<Suggestion> {
        let mut best: Option<(f64, usize)> = None;
        let mut tied = false;

        for (index, candidate) in pool.nearby.iter().enumerate() {
            if !query.accepts(candidate) {
                continue;
            }
            let score = similarity(query.source, candidate.source);
            if score < self.threshold {
                continue;
            }
            match best {
                None => best = Some((score, index)),
                Some((top, _)) if score > top + EPSILON => {
                    best = Some((score, index));
                    tied = false;
                }
                Some((top, top_index)) if (score - top).abs() <= EPSILON => {
                    if candidate.translations != pool.nearby[top_index].translations {
                        tied = true;
                    }
                }
                Some(_) => {}
            }
        }

        if tied {
            return None;
        }
        let (_, index) = best?;
        let candidate = &pool.nearby[index];
        Some(candidate.suggest(self.kind(), candidate.translations.to_vec()))
    }
}

/// Normalized similarity in `[0, 1]`: `1 - distance / max(len)` over chars.
pub fn similarity(a: &str, b: &str) -> f64 {
    let longest = a.chars().count().max(b.chars().count());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(a, b) as f64 / longest as f64
}

fn levenshtein(a: &str, b: &str) -> usize {
    let a_chars = a.chars().collect::<Vec<_>>();
    let b_chars = b.chars().collect::<Vec<_>>();
    if a_chars.is_empty() {
        return b_chars.len();
    }
    if b_chars.is_empty() {
        return a_chars.len();
    }
    let mut prev = (0..=b_chars.len()).collect::<Vec<_>>();
    let mut curr = vec![0usize; b_chars.len() + 1];
    for (i, ac) in a_chars.iter().enumerate() {
        curr[0] = i + 1;
        for (j, bc) in b_chars.iter().enumerate() {
            let cost = usize::from(ac != bc);
            curr[j + 1] = (prev[j + 1] + 1).min(curr[j] + 1).min(prev[j] + cost);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b_chars.len()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::heuristics::{Candidate, DEFAULT_SIMILARITY_THRESHOLD};

    fn candidate<'a>(source: &'a str, translations: &'a [String]) -> Candidate<'a> {
        Candidate {
            source,
            disambiguation: None,
            plural: false,
            translations,
            finished: true,
        }
    }

    fn query(source: &str) -> Query<'_> {
        Query {
            source,
            plural: false,
            forms: 1,
        }
    }

    #[test]
    fn test_levenshtein() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "abc"), 3);
        assert_eq!(levenshtein("Größe", "Grösse"), 2);
        assert_eq!(similarity("", ""), 1.0);
        assert!((similarity("abcd", "abce") - 0.75).abs() < EPSILON);
    }

    #[test]
    fn test_accepts_close_text() {
        let translations = vec!["Die Datei konnte nicht gespeichert werden".to_string()];
        let pool = Pool {
            nearby: &[candidate("The file could not be saved", &translations)],
            ..Default::default()
        };
        let heuristic = SimilarTextHeuristic::new(DEFAULT_SIMILARITY_THRESHOLD);

        let suggestion = heuristic
            .suggest(&query("The file could not be saved."), &pool)
            .unwrap();
        assert_eq!(suggestion.kind, HeuristicKind::SimilarText);
        assert_eq!(suggestion.old_source, "The file could not be saved");

        assert!(heuristic.suggest(&query("Nothing to save"), &pool).is_none());
    }

    #[test]
    fn test_tie_yields_nothing() {
        let a = vec!["Datei öffnen".to_string()];
        let b = vec!["Datei laden".to_string()];
        let pool = Pool {
            nearby: &[candidate("Open files", &a), candidate("Open filer", &b)],
            ..Default::default()
        };
        let heuristic = SimilarTextHeuristic::new(0.8);
        assert!(heuristic.suggest(&query("Open filez"), &pool).is_none());
    }

    #[test]
    fn test_tie_with_same_translation_is_fine() {
        let a = vec!["Datei öffnen".to_string()];
        let b = vec!["Datei öffnen".to_string()];
        let pool = Pool {
            nearby: &[candidate("Open files", &a), candidate("Open filer", &b)],
            ..Default::default()
        };
        let heuristic = SimilarTextHeuristic::new(0.8);
        let suggestion = heuristic.suggest(&query("Open filez"), &pool).unwrap();
        assert_eq!(suggestion.translations, vec!["Datei öffnen"]);
    }
}
