//! Pull parser for TS catalog files.
//!
//! quick-xml hands out raw bytes; text is decoded per element with the
//! file's declared codec so a single badly encoded message can be skipped
//! instead of failing the whole file.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};

use super::{EXTRA_PLURAL_SOURCE, EXTRA_PRIOR_STATE, VARIANT_SEPARATOR};
use crate::core::catalog::{Catalog, Location, LocationsMode, Status, TranslationUnit};
use crate::core::error::PipelineError;
use crate::core::parsers::codec::{Codec, Decoded};
use crate::issues::{EncodingIssue, Issue};

/// A parsed catalog plus the recoverable problems met while reading it.
#[derive(Debug)]
pub struct ReadOutcome {
    pub catalog: Catalog,
    pub issues: Vec<Issue>,
}

type Attrs = Vec<(String, String)>;

enum Node {
    /// Start tag, or a self-closing element when `empty` is set.
    Element {
        name: String,
        attrs: Attrs,
        empty: bool,
    },
    End,
    Text(Vec<u8>),
    CData(Vec<u8>),
    Eof,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TextHealth {
    Clean,
    Fallback,
    Invalid,
}

/// Parse TS XML from `content`. `origin` is used in diagnostics.
pub fn parse(content: &[u8], origin: &str) -> Result<ReadOutcome, PipelineError> {
    TsReader::new(content, origin).read()
}

struct TsReader<'a> {
    reader: Reader<&'a [u8]>,
    content: &'a [u8],
    origin: &'a str,
    codec: Codec,
    buf: Vec<u8>,
    issues: Vec<Issue>,
    health: TextHealth,
    current_line: HashMap<String, i64>,
    current_file: String,
    maybe_relative: bool,
    maybe_absolute: bool,
}

fn attr<'b>(attrs: &'b Attrs, name: &str) -> Option<&'b str> {
    attrs
        .iter()
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.as_str())
}

fn decode_start(codec: &Codec, start: &BytesStart<'_>) -> (String, Attrs) {
    let name = codec.decode_lossy(start.name().as_ref()).into_owned();
    let attrs = start
        .attributes()
        .flatten()
        .map(|a| {
            let key = codec.decode_lossy(a.key.as_ref()).into_owned();
            let raw = codec.decode_lossy(&a.value).into_owned();
            let value = match unescape(&raw) {
                Ok(value) => value.into_owned(),
                Err(_) => raw,
            };
            (key, value)
        })
        .collect();
    (name, attrs)
}

/// `<byte value="x1b"/>` holds one character as hex (`x` prefix) or decimal.
fn byte_value(value: &str) -> Option<char> {
    let n = match value.strip_prefix('x') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => value.parse::<u32>().ok()?,
    };
    if n == 0 { None } else { char::from_u32(n) }
}

impl<'a> TsReader<'a> {
    fn new(content: &'a [u8], origin: &'a str) -> Self {
        Self {
            reader: Reader::from_reader(content),
            content,
            origin,
            codec: Codec::default(),
            buf: Vec::new(),
            issues: Vec::new(),
            health: TextHealth::Clean,
            current_line: HashMap::new(),
            current_file: String::new(),
            maybe_relative: false,
            maybe_absolute: false,
        }
    }

    fn position(&self) -> usize {
        self.reader.buffer_position() as usize
    }

    fn error(&self, offset: usize, message: impl Into<String>) -> PipelineError {
        PipelineError::parse_at(self.origin, self.content, offset, message)
    }

    fn line_of(&self, offset: usize) -> usize {
        let offset = offset.min(self.content.len());
        self.content[..offset].iter().filter(|&&b| b == b'\n').count() + 1
    }

    fn next(&mut self) -> Result<Node, PipelineError> {
        loop {
            self.buf.clear();
            let event = match self.reader.read_event_into(&mut self.buf) {
                Ok(event) => event,
                Err(e) => {
                    let offset = self.reader.error_position() as usize;
                    return Err(PipelineError::parse_at(
                        self.origin,
                        self.content,
                        offset,
                        format!("parse error: {}", e),
                    ));
                }
            };
            let node = match event {
                Event::Start(e) => {
                    let (name, attrs) = decode_start(&self.codec, &e);
                    Node::Element {
                        name,
                        attrs,
                        empty: false,
                    }
                }
                Event::Empty(e) => {
                    let (name, attrs) = decode_start(&self.codec, &e);
                    Node::Element {
                        name,
                        attrs,
                        empty: true,
                    }
                }
                Event::End(_) => Node::End,
                Event::Text(e) => Node::Text(e.to_vec()),
                Event::CData(e) => Node::CData(e.to_vec()),
                Event::Decl(decl) => {
                    if let Some(Ok(label)) = decl.encoding()
                        && let Some(codec) =
                            Codec::for_label(&String::from_utf8_lossy(label.as_ref()))
                    {
                        self.codec = codec;
                    }
                    continue;
                }
                Event::Eof => Node::Eof,
                _ => continue,
            };
            return Ok(node);
        }
    }

    fn decode_text(&mut self, raw: &[u8], escaped: bool) -> String {
        let text = match self.codec.decode(raw) {
            Decoded::Text(text) => text,
            Decoded::Utf8Fallback(text) => {
                if self.health == TextHealth::Clean {
                    self.health = TextHealth::Fallback;
                }
                text
            }
            Decoded::Invalid => {
                self.health = TextHealth::Invalid;
                String::from_utf8_lossy(raw).into_owned()
            }
        };
        if !escaped {
            return text;
        }
        match unescape(&text) {
            Ok(unescaped) => unescaped.into_owned(),
            Err(_) => text,
        }
    }

    /// Whitespace between structural elements is insignificant.
    fn expect_whitespace(&mut self, raw: &[u8]) -> Result<(), PipelineError> {
        if raw.iter().all(u8::is_ascii_whitespace) {
            return Ok(());
        }
        let mut token = String::from_utf8_lossy(raw).trim().to_string();
        if token.chars().count() > 30 {
            token = token.chars().take(30).collect::<String>() + "[...]";
        }
        Err(self.error(
            self.position(),
            format!("unexpected characters '{}'", token),
        ))
    }

    fn unexpected_tag(&self, name: &str) -> PipelineError {
        self.error(self.position(), format!("unexpected tag <{}>", name))
    }

    /// Text content up to the matching end tag, expanding `<byte>` elements.
    fn read_contents(&mut self) -> Result<String, PipelineError> {
        let mut result = String::new();
        loop {
            match self.next()? {
                Node::End => return Ok(result),
                Node::Text(raw) => result.push_str(&self.decode_text(&raw, true)),
                Node::CData(raw) => result.push_str(&self.decode_text(&raw, false)),
                Node::Element { name, attrs, empty } if name == "byte" => {
                    result.extend(attr(&attrs, "value").and_then(byte_value));
                    if !empty {
                        self.skip_element()?;
                    }
                }
                Node::Element { name, .. } => return Err(self.unexpected_tag(&name)),
                Node::Eof => return Err(self.error(self.position(), "unexpected end of file")),
            }
        }
    }

    fn skip_element(&mut self) -> Result<(), PipelineError> {
        let mut depth = 1;
        while depth > 0 {
            match self.next()? {
                Node::Element { empty: false, .. } => depth += 1,
                Node::End => depth -= 1,
                Node::Eof => return Err(self.error(self.position(), "unexpected end of file")),
                _ => {}
            }
        }
        Ok(())
    }

    /// Contents of `<translation>`/`<numerusform>`, joining length variants.
    fn read_trans_contents(&mut self, attrs: &Attrs) -> Result<String, PipelineError> {
        if attr(attrs, "variants") != Some("yes") {
            return self.read_contents();
        }
        let mut result = String::new();
        loop {
            match self.next()? {
                Node::End => return Ok(result),
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element { name, empty, .. } if name == "lengthvariant" => {
                    if !result.is_empty() {
                        result.push(VARIANT_SEPARATOR);
                    }
                    result.push_str(&self.contents_of(empty)?);
                }
                Node::Element { name, .. } => return Err(self.unexpected_tag(&name)),
                Node::CData(_) | Node::Eof => {
                    return Err(self.error(self.position(), "malformed <translation>"));
                }
            }
        }
    }

    fn contents_of(&mut self, empty: bool) -> Result<String, PipelineError> {
        if empty {
            Ok(String::new())
        } else {
            self.read_contents()
        }
    }

    fn read(mut self) -> Result<ReadOutcome, PipelineError> {
        let mut catalog = Catalog::new(self.origin);
        let mut seen_root = false;

        loop {
            match self.next()? {
                Node::Eof => break,
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element { name, attrs, empty } if name == "TS" && !seen_root => {
                    seen_root = true;
                    Self::apply_ts_attrs(&mut catalog, &attrs);
                    if !empty {
                        self.read_ts(&mut catalog)?;
                    }
                }
                Node::Element { name, .. } => {
                    let offset = self.position();
                    let message = if seen_root {
                        format!("unexpected tag <{}>", name)
                    } else {
                        format!("unexpected root element <{}>, expected <TS>", name)
                    };
                    return Err(self.error(offset, message));
                }
                Node::End | Node::CData(_) => {
                    return Err(self.error(self.position(), "malformed document"));
                }
            }
        }

        if !seen_root {
            return Err(self.error(self.content.len(), "no <TS> element found"));
        }

        catalog.locations_mode = Some(if self.maybe_relative {
            LocationsMode::Relative
        } else if self.maybe_absolute {
            LocationsMode::Absolute
        } else {
            LocationsMode::None
        });

        Ok(ReadOutcome {
            catalog,
            issues: self.issues,
        })
    }

    fn apply_ts_attrs(catalog: &mut Catalog, attrs: &Attrs) {
        let non_empty = |name: &str| {
            attr(attrs, name)
                .filter(|v| !v.is_empty() && *v != "C")
                .map(String::from)
        };
        catalog.target_language = non_empty("language");
        catalog.source_language = non_empty("sourcelanguage");
        if let Some(version) = attr(attrs, "version") {
            catalog.format_version = version.to_string();
        }
    }

    fn read_ts(&mut self, catalog: &mut Catalog) -> Result<(), PipelineError> {
        loop {
            match self.next()? {
                Node::End => return Ok(()),
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element { name, empty, .. } if name == "defaultcodec" => {
                    let codec = self.contents_of(empty)?;
                    if !codec.is_empty() {
                        catalog.default_codec = Some(codec);
                    }
                }
                Node::Element { name, empty, .. } if name == "context" => {
                    if !empty {
                        self.read_context(catalog)?;
                    }
                }
                Node::Element { name, empty, .. } if name.starts_with("extra-") => {
                    let value = self.contents_of(empty)?;
                    catalog.extras.insert(name["extra-".len()..].to_string(), value);
                }
                Node::Element { name, .. } => return Err(self.unexpected_tag(&name)),
                Node::CData(_) | Node::Eof => {
                    return Err(self.error(self.position(), "malformed <TS> element"));
                }
            }
        }
    }

    fn read_context(&mut self, catalog: &mut Catalog) -> Result<(), PipelineError> {
        let mut name = String::new();
        let mut index: Option<usize> = None;

        loop {
            match self.next()? {
                Node::End => {
                    if index.is_none() {
                        catalog.ensure_context(&name);
                    }
                    return Ok(());
                }
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element { name: tag, empty, .. } if tag == "name" => {
                    name = self.contents_of(empty)?;
                    index = Some(catalog.ensure_context(&name));
                }
                Node::Element { name: tag, empty, .. } if tag == "comment" => {
                    let comment = self.contents_of(empty)?;
                    let i = *index.get_or_insert_with(|| catalog.ensure_context(&name));
                    catalog.contexts[i].comment = Some(comment).filter(|c| !c.is_empty());
                }
                Node::Element {
                    name: tag,
                    attrs,
                    empty,
                } if tag == "message" => {
                    let offset = self.position();
                    self.health = TextHealth::Clean;
                    let unit = self.read_message(&name, &attrs, empty)?;
                    let i = *index.get_or_insert_with(|| catalog.ensure_context(&name));
                    match self.health {
                        TextHealth::Clean => {
                            catalog.contexts[i].push(unit);
                        }
                        TextHealth::Fallback => {
                            self.encoding_issue(offset, false);
                            catalog.contexts[i].push(unit);
                        }
                        TextHealth::Invalid => self.encoding_issue(offset, true),
                    }
                }
                Node::Element { name: tag, .. } => return Err(self.unexpected_tag(&tag)),
                Node::CData(_) | Node::Eof => {
                    return Err(self.error(self.position(), "malformed <context> element"));
                }
            }
        }
    }

    fn encoding_issue(&mut self, offset: usize, skipped: bool) {
        let line = self.line_of(offset);
        self.issues.push(Issue::Encoding(EncodingIssue {
            file_path: self.origin.to_string(),
            line,
            encoding: self.codec.name().to_string(),
            skipped,
        }));
    }

    fn read_location(
        &mut self,
        attrs: &Attrs,
        unit: &mut TranslationUnit,
        message_file: &mut String,
    ) {
        self.maybe_absolute = true;
        let file = match attr(attrs, "filename").filter(|f| !f.is_empty()) {
            Some(file) => {
                if unit.locations.is_empty() {
                    self.current_file = file.to_string();
                }
                *message_file = file.to_string();
                file.to_string()
            }
            None => {
                self.maybe_relative = true;
                message_file.clone()
            }
        };

        let line = match attr(attrs, "line").filter(|l| !l.is_empty()) {
            None => None,
            Some(text) => {
                let Ok(value) = text.trim_start_matches('+').parse::<i64>() else {
                    return;
                };
                if text.starts_with('+') || text.starts_with('-') {
                    self.maybe_relative = true;
                    let current = self.current_line.entry(file.clone()).or_insert(0);
                    *current += value;
                    u32::try_from(*current).ok()
                } else {
                    u32::try_from(value).ok()
                }
            }
        };
        unit.locations.push(Location::new(file, line));
    }

    fn read_message(
        &mut self,
        context: &str,
        attrs: &Attrs,
        empty: bool,
    ) -> Result<TranslationUnit, PipelineError> {
        let mut unit = TranslationUnit::new(context, "");
        unit.id = attr(attrs, "id").filter(|id| !id.is_empty()).map(String::from);
        let plural = attr(attrs, "numerus") == Some("yes");
        let mut message_file = self.current_file.clone();
        let mut translation_type: Option<String> = None;

        while !empty {
            match self.next()? {
                Node::End => break,
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element {
                    name: tag,
                    attrs,
                    empty,
                } if tag == "location" => {
                    self.read_location(&attrs, &mut unit, &mut message_file);
                    if !empty {
                        self.read_contents()?;
                    }
                }
                Node::Element {
                    name: tag,
                    attrs,
                    empty,
                } if tag == "translation" => {
                    translation_type = attr(&attrs, "type").map(String::from);
                    unit.translations = match (plural, empty) {
                        (true, false) => self.read_numerus_forms()?,
                        (false, false) => vec![self.read_trans_contents(&attrs)?],
                        (true, true) => Vec::new(),
                        (false, true) => vec![String::new()],
                    };
                }
                Node::Element {
                    name: tag, empty, ..
                } => {
                    let value = self.contents_of(empty)?;
                    match tag.as_str() {
                        "source" => unit.source = value,
                        "oldsource" => unit.old_source = Some(value).filter(|v| !v.is_empty()),
                        "comment" => unit.disambiguation = Some(value).filter(|v| !v.is_empty()),
                        "oldcomment" => {
                            unit.old_disambiguation = Some(value).filter(|v| !v.is_empty())
                        }
                        "extracomment" => unit.developer_comment = value,
                        "translatorcomment" => unit.translator_comment = value,
                        "userdata" => {}
                        extra if extra.starts_with("extra-") => {
                            unit.extras.insert(extra["extra-".len()..].to_string(), value);
                        }
                        other => return Err(self.unexpected_tag(other)),
                    }
                }
                Node::CData(_) | Node::Eof => {
                    return Err(self.error(self.position(), "malformed <message> element"));
                }
            }
        }

        let was_finished = unit.extras.remove(EXTRA_PRIOR_STATE).as_deref() != Some("unfinished");
        unit.status = match translation_type.as_deref() {
            Some("unfinished") => Status::Unfinished,
            Some("obsolete") => Status::Obsolete { was_finished },
            Some("vanished") => Status::Vanished { was_finished },
            _ => Status::Finished,
        };

        let plural_source = unit.extras.remove(EXTRA_PLURAL_SOURCE);
        if plural {
            unit.plural_source = Some(plural_source.unwrap_or_else(|| unit.source.clone()));
        }

        Ok(unit)
    }

    fn read_numerus_forms(&mut self) -> Result<Vec<String>, PipelineError> {
        let mut forms = Vec::new();
        loop {
            match self.next()? {
                Node::End => return Ok(forms),
                Node::Text(raw) => self.expect_whitespace(&raw)?,
                Node::Element { name, attrs, empty } if name == "numerusform" => {
                    if empty {
                        forms.push(String::new());
                    } else {
                        forms.push(self.read_trans_contents(&attrs)?);
                    }
                }
                Node::Element { name, .. } => return Err(self.unexpected_tag(&name)),
                Node::CData(_) | Node::Eof => {
                    return Err(self.error(self.position(), "malformed <translation> element"));
                }
            }
        }
    }
}
