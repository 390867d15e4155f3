//! The compiled lookup artifact.
//!
//! Layout, all integers big-endian:
//!
//! ```text
//! "TSQM"  version:u8
//! language: u16 length + UTF-8
//! entry count: u32
//! entries, sorted by key:
//!     tag:u8 (0 = id, 1 = hash)
//!     id: u16 length + UTF-8  |  hash: u32
//!     form count: u8
//!     forms: u32 length + UTF-8 each
//! ```

use std::collections::BTreeMap;

use thiserror::Error;

use super::key::ReleaseKey;
use crate::core::numerus;

pub const MAGIC: &[u8; 4] = b"TSQM";
pub const VERSION: u8 = 1;

const TAG_ID: u8 = 0;
const TAG_HASH: u8 = 1;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ArtifactError {
    #[error("not a compiled catalog (bad magic)")]
    BadMagic,
    #[error("unsupported artifact version {0}")]
    UnsupportedVersion(u8),
    #[error("artifact truncated at byte {0}")]
    Truncated(usize),
    #[error("invalid UTF-8 at byte {0}")]
    InvalidUtf8(usize),
    #[error("unknown entry tag {tag} at byte {offset}")]
    UnknownTag { tag: u8, offset: usize },
    #[error("{0} too long to encode")]
    TooLong(&'static str),
}

/// Raised by lookups for keys the artifact does not contain. Callers fall
/// back to the source text.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("message not found: {key}")]
pub struct NotFound {
    pub key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompiledCatalog {
    pub language: String,
    entries: BTreeMap<ReleaseKey, Vec<String>>,
}

impl CompiledCatalog {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, key: &ReleaseKey) -> bool {
        self.entries.contains_key(key)
    }

    pub(super) fn insert(&mut self, key: ReleaseKey, forms: Vec<String>) {
        self.entries.insert(key, forms);
    }

    pub fn forms(&self, key: &ReleaseKey) -> Option<&[String]> {
        self.entries.get(key).map(Vec::as_slice)
    }

    /// Resolve `key`, picking the plural form for `count` when given.
    ///
    /// The category comes from the artifact's language and is clamped to the
    /// forms available.
    pub fn lookup(&self, key: &ReleaseKey, count: Option<u64>) -> Result<&str, NotFound> {
        let forms = self.entries.get(key).ok_or_else(|| NotFound {
            key: key.to_string(),
        })?;
        let category = count
            .map(|n| numerus::category_of(&self.language, n))
            .unwrap_or(0);
        forms
            .get(category.min(forms.len().saturating_sub(1)))
            .map(String::as_str)
            .ok_or_else(|| NotFound {
                key: key.to_string(),
            })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ArtifactError> {
        let mut out = Vec::new();
        out.extend_from_slice(MAGIC);
        out.push(VERSION);
        write_u16_str(&mut out, &self.language, "language")?;
        let count = u32::try_from(self.entries.len()).map_err(|_| ArtifactError::TooLong("catalog"))?;
        out.extend_from_slice(&count.to_be_bytes());

        for (key, forms) in &self.entries {
            match key {
                ReleaseKey::Id(id) => {
                    out.push(TAG_ID);
                    write_u16_str(&mut out, id, "id")?;
                }
                ReleaseKey::Hash(hash) => {
                    out.push(TAG_HASH);
                    out.extend_from_slice(&hash.to_be_bytes());
                }
            }
            let form_count = u8::try_from(forms.len()).map_err(|_| ArtifactError::TooLong("form list"))?;
            out.push(form_count);
            for form in forms {
                let len = u32::try_from(form.len()).map_err(|_| ArtifactError::TooLong("translation"))?;
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(form.as_bytes());
            }
        }
        Ok(out)
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ArtifactError> {
        let mut cursor = Cursor { bytes, offset: 0 };
        if cursor.take(MAGIC.len())? != MAGIC {
            return Err(ArtifactError::BadMagic);
        }
        let version = cursor.u8()?;
        if version != VERSION {
            return Err(ArtifactError::UnsupportedVersion(version));
        }
        let language_len = cursor.u16()? as usize;
        let mut catalog = CompiledCatalog::new(cursor.str(language_len)?);

        let count = cursor.u32()?;
        for _ in 0..count {
            let offset = cursor.offset;
            let key = match cursor.u8()? {
                TAG_ID => {
                    let len = cursor.u16()? as usize;
                    ReleaseKey::Id(cursor.str(len)?)
                }
                TAG_HASH => ReleaseKey::Hash(cursor.u32()?),
                tag => return Err(ArtifactError::UnknownTag { tag, offset }),
            };
            let form_count = cursor.u8()?;
            let mut forms = Vec::with_capacity(form_count as usize);
            for _ in 0..form_count {
                let len = cursor.u32()? as usize;
                forms.push(cursor.str(len)?);
            }
            catalog.entries.insert(key, forms);
        }
        Ok(catalog)
    }
}

fn write_u16_str(out: &mut Vec<u8>, text: &str, what: &'static str) -> Result<(), ArtifactError> {
    let len = u16::try_from(text.len()).map_err(|_| ArtifactError::TooLong(what))?;
    out.extend_from_slice(&len.to_be_bytes());
    out.extend_from_slice(text.as_bytes());
    Ok(())
}

struct Cursor<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Cursor<'a> {
    fn take(&mut self, len: usize) -> Result<&'a [u8], ArtifactError> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|&end| end <= self.bytes.len())
            .ok_or(ArtifactError::Truncated(self.offset))?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self) -> Result<[u8; N], ArtifactError> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    fn u8(&mut self) -> Result<u8, ArtifactError> {
        Ok(self.array::<1>()?[0])
    }

    fn u16(&mut self) -> Result<u16, ArtifactError> {
        Ok(u16::from_be_bytes(self.array()?))
    }

    fn u32(&mut self) -> Result<u32, ArtifactError> {
        Ok(u32::from_be_bytes(self.array()?))
    }

    fn str(&mut self, len: usize) -> Result<String, ArtifactError> {
        let start = self.offset;
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|_| ArtifactError::InvalidUtf8(start))
    }
}
