//! Diagnostic types produced by the pipeline.
//!
//! Every stage (reading, merging, validating, compiling) reports problems as
//! [`Issue`] values instead of printing them. Each issue is self-contained
//! with all information the reporter needs to display it.

use enum_dispatch::enum_dispatch;

use crate::core::catalog::{Location, TranslationUnit};

// ============================================================
// Severity and Rule
// ============================================================

/// Severity level of an issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Error,
    Warning,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Rule identifier for each issue type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rule {
    ParseError,
    Encoding,
    UnknownPluralRules,
    Language,
    DuplicateMessage,
    PluralTruncated,
    PluralFormMismatch,
    DroppedMessages,
    MissingAccelerator,
    SuperfluousAccelerator,
    PunctuationDiffers,
    PlaceMarkersDiffer,
    NumerusMarkerMissing,
    IgnoredPhraseBook,
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Rule::ParseError => write!(f, "parse-error"),
            Rule::Encoding => write!(f, "encoding"),
            Rule::UnknownPluralRules => write!(f, "unknown-plural-rules"),
            Rule::Language => write!(f, "language"),
            Rule::DuplicateMessage => write!(f, "duplicate-message"),
            Rule::PluralTruncated => write!(f, "plural-truncated"),
            Rule::PluralFormMismatch => write!(f, "plural-form-mismatch"),
            Rule::DroppedMessages => write!(f, "dropped-messages"),
            Rule::MissingAccelerator => write!(f, "missing-accelerator"),
            Rule::SuperfluousAccelerator => write!(f, "superfluous-accelerator"),
            Rule::PunctuationDiffers => write!(f, "punctuation"),
            Rule::PlaceMarkersDiffer => write!(f, "place-markers"),
            Rule::NumerusMarkerMissing => write!(f, "numerus-marker"),
            Rule::IgnoredPhraseBook => write!(f, "phrase-match"),
        }
    }
}

// ============================================================
// Message reference
// ============================================================

/// Points at one message of one catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRef {
    /// Catalog file the message belongs to.
    pub catalog: String,
    pub context: String,
    pub source: String,
    /// First source location of the message, if known.
    pub location: Option<Location>,
}

impl MessageRef {
    pub fn new(catalog: &str, unit: &TranslationUnit) -> Self {
        Self {
            catalog: catalog.to_string(),
            context: unit.context.clone(),
            source: unit.source.clone(),
            location: unit.first_location().cloned(),
        }
    }

    /// `file:line` of the source location, falling back to the catalog path.
    pub fn file_path(&self) -> &str {
        match &self.location {
            Some(location) => &location.file,
            None => &self.catalog,
        }
    }

    pub fn line(&self) -> usize {
        self.location
            .as_ref()
            .and_then(|l| l.line)
            .map(|l| l as usize)
            .unwrap_or(0)
    }
}

// ============================================================
// Issue Types - Files
// ============================================================

/// A catalog, phrase book or message file could not be parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseErrorIssue {
    pub file_path: String,
    pub line: usize,
    pub col: usize,
    pub error: String,
    /// The offending line, for caret display.
    pub source_line: Option<String>,
}

impl ParseErrorIssue {
    pub fn severity() -> Severity {
        Severity::Error
    }

    pub fn rule() -> Rule {
        Rule::ParseError
    }
}

/// Text could not be decoded with the file's codec.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodingIssue {
    pub file_path: String,
    pub line: usize,
    /// Codec the text was expected in.
    pub encoding: String,
    /// True when neither the codec nor UTF-8 worked and the message was dropped.
    pub skipped: bool,
}

impl EncodingIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::Encoding
    }
}

/// Target language has no plural rules; a single form is assumed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownPluralRulesIssue {
    pub file_path: String,
    pub language: String,
}

impl UnknownPluralRulesIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::UnknownPluralRules
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LanguageChange {
    /// Options overrode the language stored in the file.
    Changed { from: String, to: String },
    /// Language guessed from the file name.
    Guessed { language: String },
    /// Source language option disagrees with the file; the file wins.
    SourceMismatch { file: String, requested: String },
}

/// Informational note about catalog language handling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageIssue {
    pub file_path: String,
    pub change: LanguageChange,
}

impl LanguageIssue {
    pub fn severity() -> Severity {
        Severity::Info
    }

    pub fn rule() -> Rule {
        Rule::Language
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Id-based release of a message without id.
    MissingId,
    /// Id-based release dropped context/disambiguation data.
    ExcessContext,
}

/// Messages left out of (or reduced in) a compiled artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DroppedMessagesIssue {
    pub file_path: String,
    pub reason: DropReason,
    pub count: usize,
}

impl DroppedMessagesIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::DroppedMessages
    }
}

// ============================================================
// Issue Types - Messages
// ============================================================

/// Same key extracted more than once in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateMessageIssue {
    pub message: MessageRef,
    /// Location of the repeated definition.
    pub duplicate_at: Option<Location>,
}

impl DuplicateMessageIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::DuplicateMessage
    }
}

/// Plural forms holding text were cut off by a language change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralTruncatedIssue {
    pub message: MessageRef,
    pub from: usize,
    pub to: usize,
    pub lost: Vec<String>,
}

impl PluralTruncatedIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::PluralTruncated
    }
}

/// A plural message's form count does not match the target language.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PluralFormMismatchIssue {
    pub message: MessageRef,
    pub expected: usize,
    pub actual: usize,
}

impl PluralFormMismatchIssue {
    pub fn severity() -> Severity {
        Severity::Warning
    }

    pub fn rule() -> Rule {
        Rule::PluralFormMismatch
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationKind {
    MissingAccelerator,
    SuperfluousAccelerator,
    PunctuationDiffers,
    PlaceMarkersDiffer,
    NumerusMarkerMissing,
    IgnoredPhraseBook,
}

/// Advisory finding of the validation checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationIssue {
    pub message: MessageRef,
    pub kind: ValidationKind,
    /// Extra text for the note line (e.g. the expected phrase).
    pub detail: Option<String>,
}

impl ValidationIssue {
    pub fn severity(&self) -> Severity {
        match self.kind {
            ValidationKind::IgnoredPhraseBook => Severity::Info,
            _ => Severity::Warning,
        }
    }

    pub fn rule(&self) -> Rule {
        match self.kind {
            ValidationKind::MissingAccelerator => Rule::MissingAccelerator,
            ValidationKind::SuperfluousAccelerator => Rule::SuperfluousAccelerator,
            ValidationKind::PunctuationDiffers => Rule::PunctuationDiffers,
            ValidationKind::PlaceMarkersDiffer => Rule::PlaceMarkersDiffer,
            ValidationKind::NumerusMarkerMissing => Rule::NumerusMarkerMissing,
            ValidationKind::IgnoredPhraseBook => Rule::IgnoredPhraseBook,
        }
    }

    fn text(&self) -> &'static str {
        match self.kind {
            ValidationKind::MissingAccelerator => "accelerator possibly missing",
            ValidationKind::SuperfluousAccelerator => "accelerator possibly superfluous",
            ValidationKind::PunctuationDiffers => "terminal punctuation differs",
            ValidationKind::PlaceMarkersDiffer => "place markers differ",
            ValidationKind::NumerusMarkerMissing => "numerus marker %n missing",
            ValidationKind::IgnoredPhraseBook => "phrase book suggestion ignored",
        }
    }
}

// ============================================================
// Unified Issue Enum
// ============================================================

#[enum_dispatch(Report)]
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Issue {
    ParseError(ParseErrorIssue),
    Encoding(EncodingIssue),
    UnknownPluralRules(UnknownPluralRulesIssue),
    Language(LanguageIssue),
    DroppedMessages(DroppedMessagesIssue),
    DuplicateMessage(DuplicateMessageIssue),
    PluralTruncated(PluralTruncatedIssue),
    PluralFormMismatch(PluralFormMismatchIssue),
    Validation(ValidationIssue),
}

// ============================================================
// Report Trait (for CLI output)
// ============================================================

/// Location information for report output.
pub enum ReportLocation<'a> {
    /// A message inside a catalog.
    Message(&'a MessageRef),
    /// A position in a file, with the offending line when known.
    File {
        path: &'a str,
        line: usize,
        col: usize,
        source_line: Option<&'a str>,
    },
}

/// Trait for types that can be reported to CLI.
///
/// Implemented by all issue types; `enum_dispatch` forwards the calls on
/// [`Issue`] without dynamic dispatch.
#[enum_dispatch]
pub trait Report {
    fn location(&self) -> ReportLocation<'_>;

    /// Primary message to display.
    fn message(&self) -> String;

    fn report_severity(&self) -> Severity;

    fn report_rule(&self) -> Rule;

    /// Optional hint for fixing the issue.
    fn hint(&self) -> Option<&str> {
        None
    }

    /// Optional details for the "= note:" line.
    fn details(&self) -> Option<String> {
        None
    }
}

// ============================================================
// Report Implementations
// ============================================================

impl Report for ParseErrorIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
            line: self.line,
            col: self.col,
            source_line: self.source_line.as_deref(),
        }
    }

    fn message(&self) -> String {
        self.error.clone()
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for EncodingIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
            line: self.line,
            col: 1,
            source_line: None,
        }
    }

    fn message(&self) -> String {
        if self.skipped {
            format!("text is neither valid {} nor UTF-8", self.encoding)
        } else {
            format!("text is not valid {}, decoded as UTF-8", self.encoding)
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        self.skipped.then(|| "message skipped".to_string())
    }
}

impl Report for UnknownPluralRulesIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
            line: 0,
            col: 0,
            source_line: None,
        }
    }

    fn message(&self) -> String {
        if self.language.is_empty() {
            "no target language set".to_string()
        } else {
            format!("no plural rules for language '{}'", self.language)
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some("plural messages use a single form".to_string())
    }

    fn hint(&self) -> Option<&str> {
        Some("pass --target-language or set targetLanguage in .tsctlrc.json")
    }
}

impl Report for LanguageIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
            line: 0,
            col: 0,
            source_line: None,
        }
    }

    fn message(&self) -> String {
        match &self.change {
            LanguageChange::Changed { from, to } => {
                format!("target language changed from '{}' to '{}'", from, to)
            }
            LanguageChange::Guessed { language } => {
                format!("target language '{}' guessed from file name", language)
            }
            LanguageChange::SourceMismatch { file, requested } => format!(
                "source language '{}' disagrees with file's language '{}', ignoring",
                requested, file
            ),
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DroppedMessagesIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::File {
            path: &self.file_path,
            line: 0,
            col: 0,
            source_line: None,
        }
    }

    fn message(&self) -> String {
        match self.reason {
            DropReason::MissingId => {
                format!("dropped {} message(s) which had no id", self.count)
            }
            DropReason::ExcessContext => format!(
                "excess context/disambiguation dropped from {} message(s)",
                self.count
            ),
        }
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }
}

impl Report for DuplicateMessageIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.message)
    }

    fn message(&self) -> String {
        format!("duplicate message '{}'", self.message.source)
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        let at = self
            .duplicate_at
            .as_ref()
            .map(|l| format!(", repeated at {}", l))
            .unwrap_or_default();
        Some(format!("in context '{}'{}", self.message.context, at))
    }
}

impl Report for PluralTruncatedIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.message)
    }

    fn message(&self) -> String {
        format!(
            "plural forms of '{}' truncated from {} to {}",
            self.message.source, self.from, self.to
        )
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn details(&self) -> Option<String> {
        Some(format!("lost: {}", self.lost.join(" | ")))
    }
}

impl Report for PluralFormMismatchIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.message)
    }

    fn message(&self) -> String {
        format!(
            "'{}' has {} plural form(s), target language needs {}",
            self.message.source, self.actual, self.expected
        )
    }

    fn report_severity(&self) -> Severity {
        Self::severity()
    }

    fn report_rule(&self) -> Rule {
        Self::rule()
    }

    fn hint(&self) -> Option<&str> {
        Some("run `tsctl update` to resize plural messages")
    }
}

impl Report for ValidationIssue {
    fn location(&self) -> ReportLocation<'_> {
        ReportLocation::Message(&self.message)
    }

    fn message(&self) -> String {
        self.text().to_string()
    }

    fn report_severity(&self) -> Severity {
        self.severity()
    }

    fn report_rule(&self) -> Rule {
        self.rule()
    }

    fn details(&self) -> Option<String> {
        let base = format!("{}: \"{}\"", self.message.context, self.message.source);
        match &self.detail {
            Some(detail) => Some(format!("{} ({})", base, detail)),
            None => Some(base),
        }
    }
}

// ============================================================
// Ordering for Issue (for sorting in reports)
// ============================================================

impl Issue {
    pub fn severity(&self) -> Severity {
        self.report_severity()
    }

    pub fn rule(&self) -> Rule {
        self.report_rule()
    }

    /// (file, line) used to order issues in reports.
    pub fn sort_position(&self) -> (&str, usize, usize) {
        match self.location() {
            ReportLocation::Message(message) => (message.file_path(), message.line(), 0),
            ReportLocation::File {
                path, line, col, ..
            } => (path, line, col),
        }
    }
}

impl PartialOrd for Issue {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Issue {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.sort_position()
            .cmp(&other.sort_position())
            .then_with(|| self.rule().cmp(&other.rule()))
            .then_with(|| self.message().cmp(&other.message()))
    }
}
