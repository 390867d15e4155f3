use std::sync::LazyLock;

use regex::Regex;

use super::{Candidate, Heuristic, HeuristicKind, Pool, Query, Suggestion};

static NUMBER_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]+").unwrap());

/// Reuses a translation whose source differs only in its numbers.
///
/// "Page 1 of 10" translated as "Seite 1 von 10" yields "Seite 2 von 10"
/// for "Page 2 of 10".
#[derive(Debug, Clone, Copy, Default)]
pub struct NumberHeuristic;

impl Heuristic for NumberHeuristic {
    fn kind(&self) -> HeuristicKind {
        HeuristicKind::Number
    }

    fn suggest(&self, query: &Query<'_>, pool: &Pool<'_>) -> Option<Suggestion> {
        let new_runs = digit_runs(query.source);
        if new_runs.is_empty() {
            return None;
        }

        let mut found: Option<Suggestion> = None;
        for candidate in pool.nearby.iter().filter(|c| query.accepts(c)) {
            if candidate.source == query.source || !same_shape(candidate.source, query.source) {
                continue;
            }
            let Some(translations) = renumber(candidate, &new_runs) else {
                continue;
            };
            match &found {
                None => found = Some(candidate.suggest(self.kind(), translations)),
                Some(existing) if existing.translations == translations => {}
                Some(_) => return None,
            }
        }
        found
    }
}

fn digit_runs(text: &str) -> Vec<&str> {
    NUMBER_REGEX.find_iter(text).map(|m| m.as_str()).collect()
}

/// Whether both texts agree everywhere outside their digit runs.
///
/// Equal segment lists also mean equal run counts.
fn same_shape(a: &str, b: &str) -> bool {
    NUMBER_REGEX.split(a).eq(NUMBER_REGEX.split(b))
}

fn renumber(candidate: &Candidate<'_>, new_runs: &[&str]) -> Option<Vec<String>> {
    let old_runs = digit_runs(candidate.source);
    candidate
        .translations
        .iter()
        .map(|form| substitute(form, &old_runs, new_runs))
        .collect()
}

/// Replace the digit runs of `translation`, or `None` when a run cannot be
/// attributed to exactly one run of the old source.
fn substitute(translation: &str, old_runs: &[&str], new_runs: &[&str]) -> Option<String> {
    let mut result = String::with_capacity(translation.len());
    let mut last = 0;

    for (ordinal, run) in NUMBER_REGEX.find_iter(translation).enumerate() {
        let value = run.as_str();
        let index = if old_runs.get(ordinal) == Some(&value) {
            ordinal
        } else {
            let mut matches = old_runs.iter().enumerate().filter(|(_, old)| **old == value);
            match (matches.next(), matches.next()) {
                (Some((index, _)), None) => index,
                _ => return None,
            }
        };
        result.push_str(&translation[last..run.start()]);
        result.push_str(new_runs.get(index)?);
        last = run.end();
    }

    result.push_str(&translation[last..]);
    Some(result)
}
