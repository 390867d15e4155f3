//! tsctl - Qt Linguist translation catalog pipeline
//!
//! tsctl is a CLI tool and library for maintaining `.ts` translation
//! catalogs: merging freshly extracted messages into them, filling
//! translations from phrase books and earlier work, validating translations,
//! and compiling catalogs into compact lookup artifacts.
//!
//! ## Module Structure
//!
//! - `cli`: Command-line interface layer (argument parsing, commands, output)
//! - `config`: Configuration file loading and parsing
//! - `core`: Catalog model, file formats and the pipeline stages
//! - `issues`: Diagnostic type definitions and reporting
//! - `utils`: Shared utility functions

pub mod cli;
pub mod config;
pub mod core;
pub mod issues;
pub mod utils;
