//! Qt phrase book files (`.qph`).

use std::fs;
use std::path::Path;

use quick_xml::Reader;
use quick_xml::events::Event;

use crate::core::catalog::{Phrase, PhraseBook};
use crate::core::error::PipelineError;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Field {
    Source,
    Target,
    Definition,
}

/// Parse phrase book XML. `name` becomes the book's display name.
pub fn parse(content: &str, name: &str, origin: &str) -> Result<PhraseBook, PipelineError> {
    let mut reader = Reader::from_str(content);
    let mut book = PhraseBook::new(name);
    let mut seen_root = false;
    let mut phrase: Option<Phrase> = None;
    let mut field: Option<Field> = None;

    let error = |reader: &Reader<&[u8]>, message: String| {
        PipelineError::parse_at(
            origin,
            content.as_bytes(),
            reader.buffer_position() as usize,
            message,
        )
    };

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => return Err(error(&reader, format!("parse error: {}", e))),
        };
        match event {
            Event::Start(e) => match e.name().as_ref() {
                b"QPH" if !seen_root => {
                    seen_root = true;
                    for attr in e.attributes().flatten() {
                        let value = attr
                            .unescape_value()
                            .map(|v| v.into_owned())
                            .unwrap_or_default();
                        match attr.key.as_ref() {
                            b"language" => book.language = Some(value).filter(|v| !v.is_empty()),
                            b"sourcelanguage" => {
                                book.source_language = Some(value).filter(|v| !v.is_empty())
                            }
                            _ => {}
                        }
                    }
                }
                b"phrase" if seen_root && phrase.is_none() => {
                    phrase = Some(Phrase::new("", "", ""));
                }
                b"source" if phrase.is_some() => field = Some(Field::Source),
                b"target" if phrase.is_some() => field = Some(Field::Target),
                b"definition" if phrase.is_some() => field = Some(Field::Definition),
                other => {
                    let tag = String::from_utf8_lossy(other).into_owned();
                    return Err(error(&reader, format!("unexpected tag <{}>", tag)));
                }
            },
            Event::Empty(e) => {
                if e.name().as_ref() == b"QPH" && !seen_root {
                    seen_root = true;
                }
            }
            Event::Text(text) => {
                if let (Some(current), Some(field)) = (phrase.as_mut(), field) {
                    let text = text
                        .unescape()
                        .map_err(|e| error(&reader, format!("bad text: {}", e)))?;
                    let slot = match field {
                        Field::Source => &mut current.source,
                        Field::Target => &mut current.target,
                        Field::Definition => &mut current.definition,
                    };
                    slot.push_str(&text);
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"phrase" => book.phrases.extend(phrase.take()),
                _ => field = None,
            },
            Event::Eof => break,
            _ => {}
        }
    }

    if !seen_root {
        return Err(error(&reader, "no <QPH> element found".to_string()));
    }
    Ok(book)
}

/// Load a phrase book; its name is the file stem.
pub fn load(path: &Path) -> Result<PhraseBook, PipelineError> {
    let content = fs::read_to_string(path).map_err(|e| PipelineError::read(path, e))?;
    let name = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    parse(&content, &name, &path.to_string_lossy())
}
