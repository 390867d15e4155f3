//! Extracted source messages, as handed over by a source-code scanner.
//!
//! The scanner writes a JSON array of messages:
//!
//! ```json
//! [
//!   {
//!     "context": "Dialog",
//!     "source": "Save %n file(s)",
//!     "pluralSource": "Save %n file(s)",
//!     "locations": [{ "file": "dialog.cpp", "line": 42 }]
//!   }
//! ]
//! ```

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::core::catalog::Location;
use crate::core::error::PipelineError;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExtractedLocation {
    pub file: String,
    #[serde(default)]
    pub line: Option<u32>,
}

/// One message occurrence found in the sources.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedMessage {
    pub context: String,
    pub source: String,
    #[serde(default)]
    pub plural_source: Option<String>,
    #[serde(default)]
    pub disambiguation: Option<String>,
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub developer_comment: Option<String>,
    #[serde(default)]
    pub locations: Vec<ExtractedLocation>,
}

impl ExtractedMessage {
    pub fn new(context: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            context: context.into(),
            source: source.into(),
            plural_source: None,
            disambiguation: None,
            id: None,
            developer_comment: None,
            locations: Vec::new(),
        }
    }

    pub fn with_location(mut self, file: &str, line: u32) -> Self {
        self.locations.push(ExtractedLocation {
            file: file.to_string(),
            line: Some(line),
        });
        self
    }

    pub fn is_plural(&self) -> bool {
        self.plural_source.is_some()
    }

    pub fn disambiguation(&self) -> Option<&str> {
        self.disambiguation.as_deref().filter(|d| !d.is_empty())
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }

    pub fn catalog_locations(&self) -> Vec<Location> {
        self.locations
            .iter()
            .map(|l| Location::new(l.file.clone(), l.line))
            .collect()
    }
}

/// Parse the JSON message list. Errors carry the JSON line and column.
pub fn parse(content: &str, origin: &str) -> Result<Vec<ExtractedMessage>, PipelineError> {
    serde_json::from_str(content).map_err(|e| PipelineError::Parse {
        path: origin.to_string(),
        line: e.line(),
        col: e.column(),
        message: e.to_string(),
        source_line: content
            .lines()
            .nth(e.line().saturating_sub(1))
            .map(String::from),
    })
}

pub fn load(path: &Path) -> Result<Vec<ExtractedMessage>, PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::read(path, e))?;
    parse(&content, &path.to_string_lossy())
}
