use std::path::PathBuf;

use crate::core::catalog::CatalogStats;
use crate::core::heuristics::BatchReport;
use crate::core::merge::MergeReport;
use crate::core::release::ReleaseReport;
use crate::issues::Issue;

#[derive(Debug)]
pub enum CommandSummary {
    Update(UpdateSummary),
    Release(ReleaseSummary),
    Translate(TranslateSummary),
    Check,
    Lookup(LookupSummary),
    Init(InitSummary),
}

/// One catalog written by `update`.
#[derive(Debug)]
pub struct UpdatedCatalog {
    pub path: PathBuf,
    /// The file did not exist before this run.
    pub created: bool,
    pub report: MergeReport,
    pub stats: CatalogStats,
}

#[derive(Debug)]
pub struct UpdateSummary {
    pub catalogs: Vec<UpdatedCatalog>,
    pub messages_found: usize,
}

/// One artifact written by `release`.
#[derive(Debug)]
pub struct ReleasedArtifact {
    pub path: PathBuf,
    pub sources: Vec<PathBuf>,
    pub report: ReleaseReport,
}

#[derive(Debug)]
pub struct ReleaseSummary {
    pub artifacts: Vec<ReleasedArtifact>,
}

#[derive(Debug)]
pub struct TranslateSummary {
    pub path: PathBuf,
    pub report: BatchReport,
    pub unit_count: usize,
}

#[derive(Debug)]
pub struct LookupSummary {
    pub key: String,
    /// `None` when the artifact has no such message.
    pub translation: Option<String>,
}

#[derive(Debug)]
pub struct InitSummary {
    pub created: bool,
    pub error: Option<String>,
}

/// Result of running tsctl commands
pub struct CommandResult {
    pub summary: CommandSummary,
    pub error_count: usize,
    pub warning_count: usize,
    /// If true, exit code 1 should be returned when error_count > 0.
    pub exit_on_errors: bool,
    /// Diagnostics collected by the command, sorted.
    pub issues: Vec<Issue>,
    /// Number of files that failed to parse.
    pub parse_error_count: usize,
    /// Number of catalogs the command read.
    pub catalogs_checked: usize,
}
