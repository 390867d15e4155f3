use std::collections::BTreeMap;

/// A place in the source tree a message was extracted from.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Location {
    pub file: String,
    /// 1-based line; `None` when the extractor could not tell.
    pub line: Option<u32>,
}

impl Location {
    pub fn new(file: impl Into<String>, line: Option<u32>) -> Self {
        Self {
            file: file.into(),
            line,
        }
    }
}

impl std::fmt::Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.line {
            Some(line) => write!(f, "{}:{}", self.file, line),
            None => write!(f, "{}", self.file),
        }
    }
}

/// Lifecycle state of a translation unit.
///
/// Stale states remember whether the unit was finished before it went
/// missing from the sources, so a revival restores exactly that state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Unfinished,
    Finished,
    /// Missing from the latest extraction.
    Obsolete { was_finished: bool },
    /// Missing from two consecutive extractions; eligible for deletion.
    Vanished { was_finished: bool },
}

impl Status {
    pub fn is_finished(self) -> bool {
        matches!(self, Status::Finished)
    }

    /// Obsolete or vanished.
    pub fn is_stale(self) -> bool {
        matches!(self, Status::Obsolete { .. } | Status::Vanished { .. })
    }

    /// State after the unit was found again in the sources.
    pub fn revived(self) -> Self {
        match self {
            Status::Obsolete { was_finished } | Status::Vanished { was_finished } => {
                if was_finished {
                    Status::Finished
                } else {
                    Status::Unfinished
                }
            }
            live => live,
        }
    }

    /// State after a merge pass that did not see the unit.
    pub fn missed(self) -> Self {
        match self {
            Status::Unfinished => Status::Obsolete {
                was_finished: false,
            },
            Status::Finished => Status::Obsolete { was_finished: true },
            Status::Obsolete { was_finished } | Status::Vanished { was_finished } => {
                Status::Vanished { was_finished }
            }
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Status::Unfinished => "unfinished",
            Status::Finished => "finished",
            Status::Obsolete { .. } => "obsolete",
            Status::Vanished { .. } => "vanished",
        }
    }
}

/// Identity of a unit inside its context.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MergeKey {
    Id(String),
    Text {
        source: String,
        disambiguation: Option<String>,
    },
}

impl MergeKey {
    pub fn text(source: &str, disambiguation: Option<&str>) -> Self {
        MergeKey::Text {
            source: source.to_string(),
            disambiguation: disambiguation.filter(|d| !d.is_empty()).map(String::from),
        }
    }
}

/// Result of forcing a unit to a number of plural forms.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resize {
    Unchanged,
    Padded { from: usize, to: usize },
    /// Forms were removed; `lost` holds the non-empty ones.
    Truncated {
        from: usize,
        to: usize,
        lost: Vec<String>,
    },
}

/// One translatable message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslationUnit {
    pub context: String,
    pub source: String,
    /// Present iff the message is plural.
    pub plural_source: Option<String>,
    pub disambiguation: Option<String>,
    pub id: Option<String>,
    pub translations: Vec<String>,
    pub status: Status,
    pub developer_comment: String,
    pub translator_comment: String,
    pub locations: Vec<Location>,
    /// Source text the current translation was derived from, when it differs.
    pub old_source: Option<String>,
    pub old_disambiguation: Option<String>,
    /// `extra-*` metadata, preserved verbatim.
    pub extras: BTreeMap<String, String>,
}

impl TranslationUnit {
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            plural_source: None,
            disambiguation: None,
            id: None,
            translations: vec![String::new()],
            status: Status::Unfinished,
            developer_comment: String::new(),
            translator_comment: String::new(),
            locations: Vec::new(),
            old_source: None,
            old_disambiguation: None,
            extras: BTreeMap::new(),
        }
    }

    pub fn is_plural(&self) -> bool {
        self.plural_source.is_some()
    }

    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref().filter(|d| !d.is_empty())
    }

    pub fn text_key(&self) -> MergeKey {
        MergeKey::text(&self.source, self.disambiguation())
    }

    /// The key the merger matches on: the id when present, else the text key.
    pub fn merge_key(&self) -> MergeKey {
        match self.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => MergeKey::Id(id.to_string()),
            None => self.text_key(),
        }
    }

    /// True when at least one form carries text.
    pub fn has_translation(&self) -> bool {
        self.translations.iter().any(|t| !t.is_empty())
    }

    pub fn translation(&self) -> &str {
        self.translations.first().map(String::as_str).unwrap_or("")
    }

    pub fn set_translation(&mut self, text: impl Into<String>) {
        let text = text.into();
        match self.translations.first_mut() {
            Some(first) => *first = text,
            None => self.translations.push(text),
        }
    }

    pub fn clear_translations(&mut self) {
        for form in &mut self.translations {
            form.clear();
        }
    }

    /// Add a location unless the unit already has it.
    pub fn add_location(&mut self, location: Location) {
        if !self.locations.contains(&location) {
            self.locations.push(location);
        }
    }

    pub fn replace_locations(&mut self, locations: &[Location]) {
        self.locations.clear();
        for location in locations {
            self.add_location(location.clone());
        }
    }

    pub fn first_location(&self) -> Option<&Location> {
        self.locations.first()
    }

    /// Number of forms this unit must hold given the target language's count.
    pub fn expected_forms(&self, plural_forms: usize) -> usize {
        if self.is_plural() { plural_forms.max(1) } else { 1 }
    }

    /// Pad with empty strings or truncate to `forms` entries.
    pub fn resize_forms(&mut self, forms: usize) -> Resize {
        let from = self.translations.len();
        if from == forms {
            return Resize::Unchanged;
        }
        if from < forms {
            self.translations.resize(forms, String::new());
            return Resize::Padded { from, to: forms };
        }
        let lost: Vec<String> = self
            .translations
            .drain(forms..)
            .filter(|t| !t.is_empty())
            .collect();
        Resize::Truncated {
            from,
            to: forms,
            lost,
        }
    }
}
