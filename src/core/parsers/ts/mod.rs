//! TS catalog files (Qt Linguist XML, format 2.x).

mod reader;
mod writer;


use std::fs;
use std::path::Path;

pub use reader::{ReadOutcome, parse};
pub use writer::{WriteOptions, to_xml};

use crate::core::catalog::Catalog;
use crate::core::error::PipelineError;
use crate::core::numerus::PluralRule;
use crate::utils::atomic_write;

/// Extra holding the plural source text when it differs from the source.
pub const EXTRA_PLURAL_SOURCE: &str = "plural-source";

/// Extra recording that a stale unit was unfinished before it went stale.
pub const EXTRA_PRIOR_STATE: &str = "prior-state";

/// Separates length variants inside one translation string.
pub const VARIANT_SEPARATOR: char = '\u{9c}';

/// Read and parse a catalog file.
pub fn load(path: &Path) -> Result<ReadOutcome, PipelineError> {
    let content = fs::read(path).map_err(|e| PipelineError::read(path, e))?;
    parse(&content, &path.to_string_lossy())
}

/// Serialize `catalog` and atomically replace `path` with it.
pub fn save(catalog: &Catalog, path: &Path, options: &WriteOptions) -> Result<(), PipelineError> {
    atomic_write(path, to_xml(catalog, options).as_bytes())
}

/// Target language encoded in a `name_ll.ts` / `name_ll_RR.ts` file name.
///
/// Only codes with known plural rules are accepted so that `app_main.ts`
/// does not yield a language.
pub fn guess_language(path: &Path) -> Option<String> {
    let stem = path.file_stem()?.to_str()?;
    let parts: Vec<&str> = stem.split('_').collect();
    if parts.len() < 2 {
        return None;
    }

    let is_language = |s: &str| {
        (2..=3).contains(&s.len()) && s.chars().all(|c| c.is_ascii_lowercase())
    };
    let is_region = |s: &str| s.len() == 2 && s.chars().all(|c| c.is_ascii_uppercase());

    let last = parts[parts.len() - 1];
    let before = parts[parts.len() - 2];
    let candidate = if is_region(last) && parts.len() >= 3 && is_language(before) {
        format!("{}_{}", before, last)
    } else if is_language(last) {
        last.to_string()
    } else {
        return None;
    };

    PluralRule::for_language(&candidate).map(|_| candidate)
}
