//! File parsers for catalogs, phrase books and extracted messages.
//!
//! - `ts`: TS catalog reader and writer (quick-xml)
//! - `qph`: phrase book reader
//! - `extracted`: JSON message list produced by a source scanner
//! - `codec`: text decoding for catalogs in legacy encodings

pub mod codec;
pub mod extracted;
pub mod qph;
pub mod ts;
