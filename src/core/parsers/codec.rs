use std::borrow::Cow;

use encoding_rs::{Encoding, UTF_8};

/// Outcome of decoding one piece of catalog text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoded {
    /// Valid in the declared codec.
    Text(String),
    /// Invalid in the declared codec but valid UTF-8.
    Utf8Fallback(String),
    /// Neither worked.
    Invalid,
}

/// Text codec a catalog file declares for its content.
#[derive(Debug, Clone, Copy)]
pub struct Codec {
    encoding: &'static Encoding,
}

impl Default for Codec {
    fn default() -> Self {
        Self { encoding: UTF_8 }
    }
}

impl Codec {
    /// Codec for a label like `ISO-8859-1` or `utf-8`; `None` when unknown.
    pub fn for_label(label: &str) -> Option<Self> {
        Encoding::for_label(label.trim().as_bytes()).map(|encoding| Self { encoding })
    }

    pub fn name(&self) -> &'static str {
        self.encoding.name()
    }

    pub fn is_utf8(&self) -> bool {
        self.encoding == UTF_8
    }

    pub fn decode(&self, raw: &[u8]) -> Decoded {
        if let Some(text) = self
            .encoding
            .decode_without_bom_handling_and_without_replacement(raw)
        {
            return Decoded::Text(text.into_owned());
        }
        if self.is_utf8() {
            return Decoded::Invalid;
        }
        match std::str::from_utf8(raw) {
            Ok(text) => Decoded::Utf8Fallback(text.to_string()),
            Err(_) => Decoded::Invalid,
        }
    }

    /// Lossy decode for markup (element names, attribute values).
    pub fn decode_lossy<'a>(&self, raw: &'a [u8]) -> Cow<'a, str> {
        let (text, _) = self.encoding.decode_without_bom_handling(raw);
        text
    }
}
