use crate::core::catalog::TranslationUnit;

/// Lookup key of a compiled message.
///
/// The variant order is the artifact's sort order: id entries first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ReleaseKey {
    Id(String),
    Hash(u32),
}

impl ReleaseKey {
    /// Key for a message without an id.
    pub fn for_text(context: &str, source: &str, disambiguation: Option<&str>) -> Self {
        let mut bytes = Vec::with_capacity(context.len() + source.len() + 2);
        bytes.extend_from_slice(context.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(source.as_bytes());
        bytes.push(0);
        bytes.extend_from_slice(disambiguation.unwrap_or_default().as_bytes());
        ReleaseKey::Hash(elf_hash(&bytes))
    }

    pub fn for_unit(unit: &TranslationUnit) -> Self {
        match unit.id.as_deref().filter(|id| !id.is_empty()) {
            Some(id) => ReleaseKey::Id(id.to_string()),
            None => Self::for_text(&unit.context, &unit.source, unit.disambiguation()),
        }
    }
}

impl std::fmt::Display for ReleaseKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReleaseKey::Id(id) => write!(f, "{}", id),
            ReleaseKey::Hash(hash) => write!(f, "0x{:08x}", hash),
        }
    }
}

/// 32-bit ELF hash. Never returns 0.
pub fn elf_hash(bytes: &[u8]) -> u32 {
    let mut h: u32 = 0;
    for &byte in bytes {
        h = (h << 4).wrapping_add(u32::from(byte));
        let g = h & 0xf000_0000;
        if g != 0 {
            h ^= g >> 24;
        }
        h &= !g;
    }
    if h == 0 { 1 } else { h }
}
