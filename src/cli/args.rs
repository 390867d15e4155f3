//! CLI argument definitions using clap.
//!
//! ## Commands
//!
//! - `update`: Merge extracted messages into catalogs
//! - `release`: Compile catalogs into lookup artifacts
//! - `translate`: Fill untranslated messages from phrase books and history
//! - `check`: Run the validation checks on catalogs
//! - `lookup`: Query a compiled artifact
//! - `init`: Initialize the tsctl configuration file

use std::path::PathBuf;

use clap::{ArgGroup, Args, CommandFactory, Parser, Subcommand};

use crate::core::catalog::LocationsMode;
use crate::core::heuristics::HeuristicKind;

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
pub struct Arguments {
    #[command(subcommand)]
    pub command: Option<Command>,
}

impl Arguments {
    /// Check if a command was provided, otherwise print help and return None.
    pub fn with_command_or_help(self) -> Option<Self> {
        if self.command.is_none() {
            Self::command().print_help().ok();
            None
        } else {
            Some(self)
        }
    }

    fn common(&self) -> Option<&CommonArgs> {
        match &self.command {
            Some(Command::Update(cmd)) => Some(&cmd.common),
            Some(Command::Release(cmd)) => Some(&cmd.common),
            Some(Command::Translate(cmd)) => Some(&cmd.common),
            Some(Command::Check(cmd)) => Some(&cmd.common),
            Some(Command::Lookup(_)) | Some(Command::Init) | None => None,
        }
    }

    /// Get the verbose flag from the command's common args.
    pub fn verbose(&self) -> bool {
        self.common().is_some_and(|common| common.verbose)
    }

    pub fn silent(&self) -> bool {
        self.common().is_some_and(|common| common.silent)
    }
}

/// Common arguments shared by the catalog commands.
#[derive(Debug, Clone, Default, Args)]
pub struct CommonArgs {
    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Only print diagnostics, no progress or summaries
    #[arg(long, conflicts_with = "verbose")]
    pub silent: bool,
}

#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Catalogs to update; missing files are created (default: config `catalogs`)
    pub catalogs: Vec<String>,

    /// JSON file with the extracted messages
    #[arg(short, long)]
    pub messages: PathBuf,

    /// Source language of the catalogs (overrides config file)
    #[arg(long)]
    pub source_language: Option<String>,

    /// Target language of the catalogs (overrides file and config)
    #[arg(long)]
    pub target_language: Option<String>,

    /// Drop obsolete and vanished messages
    #[arg(long)]
    pub no_obsolete: bool,

    /// Keep missing messages obsolete instead of letting them vanish
    #[arg(long, conflicts_with = "no_obsolete")]
    pub keep_obsolete: bool,

    /// Keep contexts in file order instead of sorting them
    #[arg(long)]
    pub no_sort: bool,

    /// How source locations are written (overrides config file)
    #[arg(long, value_enum)]
    pub locations: Option<LocationsMode>,

    /// Heuristics not to use for new or changed messages.
    /// Can be specified multiple times: --disable-heuristic number --disable-heuristic sametext
    #[arg(long = "disable-heuristic", value_enum)]
    pub disabled_heuristics: Vec<HeuristicKind>,

    /// Phrase books (.qph) consulted for new messages
    #[arg(long = "phrase-book")]
    pub phrase_books: Vec<String>,

    /// Only merge plural messages
    #[arg(long)]
    pub plural_only: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct ReleaseCommand {
    /// Catalog files or directories (default: config `catalogs`)
    pub catalogs: Vec<String>,

    /// Write a single artifact here instead of one `.qm` next to each catalog
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Compile id-based messages only
    #[arg(long = "idbased")]
    pub id_based: bool,

    /// Leave unfinished translations out
    #[arg(long = "nounfinished")]
    pub no_unfinished: bool,

    /// Leave out translations identical to their source
    #[arg(long = "removeidentical")]
    pub remove_identical: bool,

    /// Emit untranslated messages as their source text behind this prefix
    #[arg(long = "markuntranslated", value_name = "PREFIX")]
    pub mark_untranslated: Option<String>,

    /// Compile obsolete messages too
    #[arg(long)]
    pub keep_obsolete: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct TranslateCommand {
    /// Catalog to translate in place
    pub catalog: PathBuf,

    /// Phrase books (.qph) to take translations from (default: config `phraseBooks`)
    #[arg(long = "phrase-book")]
    pub phrase_books: Vec<String>,

    /// Also replace existing translations
    #[arg(long)]
    pub retranslate: bool,

    /// Mark filled messages finished instead of unfinished
    #[arg(long)]
    pub mark_finished: bool,

    /// Do not reuse translations of other messages in the catalog
    #[arg(long)]
    pub no_history: bool,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
pub struct CheckCommand {
    /// Catalog files or directories (default: config `catalogs`)
    pub catalogs: Vec<String>,

    /// Phrase books (.qph) for the phrase-match check (default: config `phraseBooks`)
    #[arg(long = "phrase-book")]
    pub phrase_books: Vec<String>,

    #[command(flatten)]
    pub common: CommonArgs,
}

#[derive(Debug, Args)]
#[command(group(ArgGroup::new("key").required(true).args(["id", "source"])))]
pub struct LookupCommand {
    /// Compiled artifact to query
    pub artifact: PathBuf,

    /// Message id
    #[arg(long, conflicts_with_all = ["context", "source", "disambiguation"])]
    pub id: Option<String>,

    /// Message context
    #[arg(long, requires = "source")]
    pub context: Option<String>,

    /// Message source text
    #[arg(long, requires = "context")]
    pub source: Option<String>,

    #[arg(long, requires = "source")]
    pub disambiguation: Option<String>,

    /// Count selecting the plural form
    #[arg(short = 'n', long)]
    pub count: Option<u64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Merge extracted messages into catalogs
    Update(UpdateCommand),
    /// Compile catalogs into lookup artifacts
    Release(ReleaseCommand),
    /// Fill untranslated messages from phrase books and earlier translations
    Translate(TranslateCommand),
    /// Check translations for accelerator, punctuation and place marker problems
    Check(CheckCommand),
    /// Look a message up in a compiled artifact
    Lookup(LookupCommand),
    /// Initialize a new .tsctlrc.json configuration file
    Init,
}
