/// One phrase book entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Phrase {
    pub source: String,
    pub target: String,
    pub definition: String,
}

impl Phrase {
    pub fn new(
        source: impl Into<String>,
        target: impl Into<String>,
        definition: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            definition: definition.into(),
        }
    }
}

/// A reusable source → translation dictionary, independent of any catalog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhraseBook {
    /// Display name, usually the file stem.
    pub name: String,
    pub language: Option<String>,
    pub source_language: Option<String>,
    pub phrases: Vec<Phrase>,
}

impl PhraseBook {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Entries whose source equals `source` exactly, in book order.
    pub fn lookup<'a>(&'a self, source: &'a str) -> impl Iterator<Item = &'a Phrase> + 'a {
        self.phrases.iter().filter(move |p| p.source == source)
    }

    pub fn first_match(&self, source: &str) -> Option<&Phrase> {
        self.phrases
            .iter()
            .find(|p| p.source == source && !p.target.is_empty())
    }
}
