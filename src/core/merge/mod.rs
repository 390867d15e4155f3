//! Catalog merging.
//!
//! Reconciles an existing catalog with a freshly extracted, ordered list of
//! messages. The pass runs in three steps:
//!
//! 1. resolve every message against the catalog as loaded (id across the
//!    whole catalog first, then `(source, disambiguation)` within the
//!    message's context);
//! 2. ask the heuristic chain for hints, in parallel over a read-only view;
//! 3. apply the results in extraction order and retire unvisited units.
//!
//! The catalog is borrowed exclusively for the whole pass; callers persist it
//! only after `merge` returns.


use std::collections::{BTreeMap, HashMap, HashSet};

use rayon::prelude::*;

use crate::core::catalog::{Catalog, MergeKey, PhraseBook, Status, TranslationUnit};
use crate::core::heuristics::{Candidate, HeuristicChain, HeuristicKind, Pool, Query, Suggestion};
use crate::core::parsers::extracted::ExtractedMessage;
use crate::issues::{DuplicateMessageIssue, Issue, MessageRef};

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Never move obsolete units to vanished or delete them.
    pub keep_obsolete: bool,
    /// Remove every obsolete and vanished unit after the pass.
    pub no_obsolete: bool,
    pub sort_contexts: bool,
    /// Only merge plural messages.
    pub plural_only: bool,
    pub heuristics: HeuristicChain,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            keep_obsolete: false,
            no_obsolete: false,
            sort_contexts: true,
            plural_only: false,
            heuristics: HeuristicChain::default(),
        }
    }
}

/// Counts of one merge pass plus the diagnostics it produced.
#[derive(Debug, Default)]
pub struct MergeReport {
    /// Distinct messages in the extraction.
    pub found: usize,
    pub new: usize,
    pub existing: usize,
    /// Id matches whose source text changed.
    pub source_changed: usize,
    /// Stale units found again in the sources.
    pub revived: usize,
    pub obsoleted: usize,
    pub vanished: usize,
    pub removed: usize,
    pub kept_obsolete: usize,
    /// Heuristic hints applied, per heuristic.
    pub hints: BTreeMap<HeuristicKind, usize>,
    pub duplicates: usize,
    /// Plural units resized to the target language's form count.
    pub resized: usize,
    pub issues: Vec<Issue>,
}

impl MergeReport {
    pub fn hint_count(&self) -> usize {
        self.hints.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Slot {
    context: usize,
    unit: usize,
}

#[derive(Debug, Clone, Copy)]
enum Action {
    /// Same key, same text.
    Refresh(Slot),
    /// Matched by id but the text changed.
    Retext(Slot),
    Create,
    /// Key already seen earlier in this pass, at message index `first`.
    Duplicate { first: usize },
}

/// Lookup tables over the catalog as loaded.
#[derive(Default)]
struct Index<'c> {
    /// Ids are unique across the catalog, whatever the context.
    ids: HashMap<&'c str, Slot>,
    /// Text keys of id-less units, per context.
    texts: Vec<HashMap<MergeKey, usize>>,
}

/// Merge `messages` into `catalog`.
///
/// Plural units of the loaded catalog are first resized to the target
/// language's form count, so hints and kept translations always fit.
pub fn merge(
    catalog: &mut Catalog,
    messages: &[ExtractedMessage],
    books: &[PhraseBook],
    options: &MergeOptions,
) -> MergeReport {
    let mut report = MergeReport::default();
    let sizing = catalog.normalize_plural_forms();
    report.resized = sizing.resized;
    report.issues.extend(sizing.issues);

    let messages: Vec<&ExtractedMessage> = messages
        .iter()
        .filter(|m| !options.plural_only || m.is_plural())
        .collect();
    let forms = catalog.plural_form_count();

    let actions = resolve(catalog, &messages);
    let visited = visited_slots(catalog, &actions);
    let hints = find_hints(catalog, &messages, &actions, &visited, books, options, forms);

    let origin = catalog.origin().to_string();
    let mut placed: Vec<Option<Slot>> = vec![None; messages.len()];
    let mut moved: HashSet<Slot> = HashSet::new();

    for (position, ((message, action), hint)) in
        messages.iter().zip(&actions).zip(hints).enumerate()
    {
        if let Some(kind) = hint.as_ref().map(|h| h.kind) {
            *report.hints.entry(kind).or_default() += 1;
        }
        match *action {
            Action::Refresh(slot) => {
                let slot = relocate(catalog, slot, &message.context, &mut moved);
                let unit = &mut catalog.contexts[slot.context].units[slot.unit];
                if refresh(unit, message) {
                    report.revived += 1;
                }
                report.existing += 1;
                placed[position] = Some(slot);
            }
            Action::Retext(slot) => {
                let slot = relocate(catalog, slot, &message.context, &mut moved);
                let unit = &mut catalog.contexts[slot.context].units[slot.unit];
                retext(unit, message, hint, forms);
                report.source_changed += 1;
                placed[position] = Some(slot);
            }
            Action::Create => {
                let unit = create(message, hint, forms);
                let context = catalog.ensure_context(&message.context);
                let unit = catalog.contexts[context].push(unit);
                report.new += 1;
                placed[position] = Some(Slot { context, unit });
            }
            Action::Duplicate { first } => {
                report.duplicates += 1;
                let Some(slot) = placed[first] else { continue };
                let unit = &mut catalog.contexts[slot.context].units[slot.unit];
                for location in message.catalog_locations() {
                    unit.add_location(location);
                }
                report
                    .issues
                    .push(Issue::DuplicateMessage(DuplicateMessageIssue {
                        message: MessageRef::new(&origin, unit),
                        duplicate_at: message.catalog_locations().into_iter().next(),
                    }));
            }
        }
    }
    report.found = report.new + report.existing + report.source_changed;

    retire_unvisited(catalog, &visited, &moved, options, &mut report);
    if options.no_obsolete {
        report.removed += catalog.retain_units(|u| !u.status.is_stale());
    } else {
        catalog.contexts.retain(|c| !c.is_empty());
    }
    if options.sort_contexts {
        catalog.sort_contexts();
    }

    report
}

fn message_key(message: &ExtractedMessage) -> MergeKey {
    match message.id() {
        Some(id) => MergeKey::Id(id.to_string()),
        None => MergeKey::text(&message.source, message.disambiguation()),
    }
}

fn build_index(catalog: &Catalog) -> Index<'_> {
    let mut index = Index::default();
    for (context, loaded) in catalog.contexts.iter().enumerate() {
        let mut texts = HashMap::new();
        for (unit, entry) in loaded.units.iter().enumerate() {
            match entry.id.as_deref().filter(|id| !id.is_empty()) {
                Some(id) => {
                    index.ids.entry(id).or_insert(Slot { context, unit });
                }
                None => {
                    texts.entry(entry.text_key()).or_insert(unit);
                }
            }
        }
        index.texts.push(texts);
    }
    index
}

/// Decide, per message, which unit it updates.
///
/// Each existing unit is claimed by at most one message; later messages with
/// the same key become duplicates.
fn resolve(catalog: &Catalog, messages: &[&ExtractedMessage]) -> Vec<Action> {
    let mut contexts: HashMap<&str, usize> = HashMap::new();
    for (position, context) in catalog.contexts.iter().enumerate() {
        contexts.entry(context.name.as_str()).or_insert(position);
    }
    let index = build_index(catalog);

    let mut claimed: HashMap<Slot, usize> = HashMap::new();
    let mut created: HashMap<(&str, MergeKey), usize> = HashMap::new();
    let mut actions = Vec::with_capacity(messages.len());

    for (position, message) in messages.iter().enumerate() {
        let slot = message
            .id()
            .and_then(|id| index.ids.get(id).copied())
            .or_else(|| {
                let context = *contexts.get(message.context.as_str())?;
                let key = MergeKey::text(&message.source, message.disambiguation());
                index.texts[context]
                    .get(&key)
                    .map(|&unit| Slot { context, unit })
            });

        let action = match slot {
            Some(slot) => match claimed.get(&slot) {
                Some(&first) => Action::Duplicate { first },
                None => {
                    claimed.insert(slot, position);
                    let unit = &catalog.contexts[slot.context].units[slot.unit];
                    if unit.source == message.source && unit.plural_source == message.plural_source
                    {
                        Action::Refresh(slot)
                    } else {
                        Action::Retext(slot)
                    }
                }
            },
            None => {
                let key = (message.context.as_str(), message_key(message));
                match created.get(&key) {
                    Some(&first) => Action::Duplicate { first },
                    None => {
                        created.insert(key, position);
                        Action::Create
                    }
                }
            }
        };
        actions.push(action);
    }

    actions
}

/// Per context, which units of the loaded catalog some message claimed.
fn visited_slots(catalog: &Catalog, actions: &[Action]) -> Vec<Vec<bool>> {
    let mut visited: Vec<Vec<bool>> = catalog
        .contexts
        .iter()
        .map(|c| vec![false; c.units.len()])
        .collect();
    for action in actions {
        if let Action::Refresh(slot) | Action::Retext(slot) = action {
            visited[slot.context][slot.unit] = true;
        }
    }
    visited
}

/// Heuristic hints for new and retexted messages.
///
/// New messages are compared with the units of their context that this pass
/// leaves behind, and looked up in the whole catalog and the phrase books.
/// A retexted unit is only compared with its own previous text.
fn find_hints(
    catalog: &Catalog,
    messages: &[&ExtractedMessage],
    actions: &[Action],
    visited: &[Vec<bool>],
    books: &[PhraseBook],
    options: &MergeOptions,
    forms: usize,
) -> Vec<Option<Suggestion>> {
    let chain = &options.heuristics;
    if chain.is_empty() {
        return vec![None; messages.len()];
    }

    let everywhere: Vec<Candidate<'_>> = catalog.units().map(Candidate::from_unit).collect();
    let nearby: Vec<Vec<Candidate<'_>>> = catalog
        .contexts
        .iter()
        .zip(visited)
        .map(|(context, seen)| {
            context
                .units
                .iter()
                .zip(seen)
                .filter(|(_, seen)| !**seen)
                .map(|(unit, _)| Candidate::from_unit(unit))
                .collect()
        })
        .collect();
    let context_of: HashMap<&str, usize> = catalog
        .contexts
        .iter()
        .enumerate()
        .rev()
        .map(|(position, context)| (context.name.as_str(), position))
        .collect();

    messages
        .par_iter()
        .zip(actions.par_iter())
        .map(|(message, action)| {
            let query = Query {
                source: &message.source,
                plural: message.is_plural(),
                forms: if message.is_plural() { forms.max(1) } else { 1 },
            };
            match *action {
                Action::Create => {
                    let pool = Pool {
                        nearby: context_of
                            .get(message.context.as_str())
                            .map(|&c| nearby[c].as_slice())
                            .unwrap_or_default(),
                        everywhere: &everywhere,
                        books,
                    };
                    chain.suggest(&query, &pool)
                }
                Action::Retext(slot) => {
                    let unit = &catalog.contexts[slot.context].units[slot.unit];
                    let previous = [Candidate::from_unit(unit)];
                    let pool = Pool {
                        nearby: &previous,
                        everywhere: &previous,
                        books: &[],
                    };
                    chain.suggest(&query, &pool)
                }
                Action::Refresh(_) | Action::Duplicate { .. } => None,
            }
        })
        .collect()
}

/// Move the unit at `slot` into `context` when an id match crossed contexts.
///
/// The original position is recorded in `moved` and dropped on retirement.
fn relocate(
    catalog: &mut Catalog,
    slot: Slot,
    context: &str,
    moved: &mut HashSet<Slot>,
) -> Slot {
    if catalog.contexts[slot.context].name == context {
        return slot;
    }
    let unit = catalog.contexts[slot.context].units[slot.unit].clone();
    moved.insert(slot);
    let target = catalog.ensure_context(context);
    let unit = catalog.contexts[target].push(unit);
    Slot {
        context: target,
        unit,
    }
}

fn update_metadata(unit: &mut TranslationUnit, message: &ExtractedMessage) {
    unit.replace_locations(&message.catalog_locations());
    unit.developer_comment = message.developer_comment.clone().unwrap_or_default();
    unit.disambiguation = message.disambiguation().map(String::from);
    if unit.id.is_none() {
        unit.id = message.id().map(String::from);
    }
}

/// Returns true when a stale unit was revived.
fn refresh(unit: &mut TranslationUnit, message: &ExtractedMessage) -> bool {
    update_metadata(unit, message);
    let stale = unit.status.is_stale();
    unit.status = unit.status.revived();
    stale
}

fn retext(
    unit: &mut TranslationUnit,
    message: &ExtractedMessage,
    hint: Option<Suggestion>,
    forms: usize,
) {
    let previous_source = std::mem::replace(&mut unit.source, message.source.clone());
    let previous_disambiguation = unit.disambiguation().map(String::from);
    if previous_source != unit.source {
        unit.old_source = Some(previous_source);
        unit.old_disambiguation = previous_disambiguation;
    }
    unit.plural_source = message.plural_source.clone();
    update_metadata(unit, message);

    match hint {
        Some(hint) => unit.translations = hint.translations,
        None => unit.translations = vec![String::new()],
    }
    unit.resize_forms(unit.expected_forms(forms));
    unit.status = Status::Unfinished;
}

fn create(message: &ExtractedMessage, hint: Option<Suggestion>, forms: usize) -> TranslationUnit {
    let mut unit = TranslationUnit::new(&message.context, &message.source);
    unit.plural_source = message.plural_source.clone();
    update_metadata(&mut unit, message);
    unit.translations = vec![String::new(); unit.expected_forms(forms)];

    if let Some(hint) = hint {
        unit.translations = hint.translations;
        if hint.old_source != unit.source {
            unit.old_source = Some(hint.old_source);
            unit.old_disambiguation = hint.old_disambiguation;
        }
    }
    unit
}

/// Move units no message claimed one step along the obsolete lifecycle.
fn retire_unvisited(
    catalog: &mut Catalog,
    visited: &[Vec<bool>],
    moved: &HashSet<Slot>,
    options: &MergeOptions,
    report: &mut MergeReport,
) {
    for (index, context) in catalog.contexts.iter_mut().enumerate() {
        let seen = visited.get(index).map(Vec::as_slice).unwrap_or_default();
        let mut position = 0;
        context.units.retain_mut(|unit| {
            let slot = Slot {
                context: index,
                unit: position,
            };
            // Units created in this pass sit past the end of `seen`.
            let was_seen = seen.get(position).copied().unwrap_or(true);
            position += 1;
            if moved.contains(&slot) {
                return false;
            }
            if was_seen {
                return true;
            }
            match unit.status {
                Status::Finished | Status::Unfinished => {
                    unit.status = unit.status.missed();
                    report.obsoleted += 1;
                    true
                }
                Status::Obsolete { .. } | Status::Vanished { .. } if options.keep_obsolete => {
                    report.kept_obsolete += 1;
                    true
                }
                Status::Obsolete { .. } => {
                    unit.status = unit.status.missed();
                    report.vanished += 1;
                    true
                }
                Status::Vanished { .. } => {
                    report.removed += 1;
                    false
                }
            }
        });
    }
}
