//! Core pipeline: catalog model, file formats and the merge, heuristic,
//! validation and release stages.
//!
//! Stages take an explicit [`catalog::Catalog`] and return reports; none of
//! them print. The CLI layer decides what to show.

pub mod catalog;
pub mod error;
pub mod file_scanner;
pub mod heuristics;
pub mod merge;
pub mod numerus;
pub mod parsers;
pub mod release;
pub mod validate;

pub use catalog::{Catalog, TranslationUnit};
pub use error::PipelineError;
