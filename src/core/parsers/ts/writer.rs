use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

use quick_xml::escape::escape;
use regex::Regex;

use super::{EXTRA_PLURAL_SOURCE, EXTRA_PRIOR_STATE, VARIANT_SEPARATOR};
use crate::core::catalog::{Catalog, FORMAT_VERSION, LocationsMode, Status, TranslationUnit};

/// Options controlling how a catalog is serialized.
#[derive(Debug, Clone)]
pub struct WriteOptions {
    pub locations: LocationsMode,
    /// Extras whose key matches are not written.
    pub drop_tags: Option<Regex>,
}

impl Default for WriteOptions {
    fn default() -> Self {
        Self {
            locations: LocationsMode::Absolute,
            drop_tags: None,
        }
    }
}

/// Element text with XML specials escaped and control characters as `<byte>`.
fn protect(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '"' => out.push_str("&quot;"),
            '&' => out.push_str("&amp;"),
            '>' => out.push_str("&gt;"),
            '<' => out.push_str("&lt;"),
            '\'' => out.push_str("&apos;"),
            c if (c as u32) < 0x20 && !matches!(c, '\r' | '\n' | '\t') => {
                let _ = write!(out, "<byte value=\"x{:x}\"/>", c as u32);
            }
            c => out.push(c),
        }
    }
    out
}

fn write_extras(
    out: &mut String,
    indent: &str,
    extras: &BTreeMap<String, String>,
    drops: Option<&Regex>,
) {
    for (key, value) in extras {
        if drops.is_some_and(|re| re.is_match(key)) {
            continue;
        }
        let _ = writeln!(
            out,
            "{}<extra-{}>{}</extra-{}>",
            indent,
            key,
            protect(value),
            key
        );
    }
}

fn write_variants(out: &mut String, indent: &str, text: &str) {
    if !text.contains(VARIANT_SEPARATOR) {
        out.push('>');
        out.push_str(&protect(text));
        return;
    }
    out.push_str(" variants=\"yes\">");
    for variant in text.split(VARIANT_SEPARATOR) {
        let _ = write!(
            out,
            "\n    {}<lengthvariant>{}</lengthvariant>",
            indent,
            protect(variant)
        );
    }
    let _ = write!(out, "\n{}", indent);
}

struct LocationWriter {
    mode: LocationsMode,
    current_line: HashMap<String, i64>,
    current_file: String,
}

impl LocationWriter {
    fn write(&mut self, out: &mut String, unit: &TranslationUnit) {
        if self.mode == LocationsMode::None {
            return;
        }
        let mut message_file = self.current_file.clone();
        for (i, location) in unit.locations.iter().enumerate() {
            let mut file = location.file.as_str();
            let mut line = String::new();
            if self.mode == LocationsMode::Relative {
                if let Some(ln) = location.line {
                    let current = self.current_line.entry(location.file.clone()).or_insert(0);
                    let delta = i64::from(ln) - *current;
                    if delta >= 0 {
                        line.push('+');
                    }
                    line.push_str(&delta.to_string());
                    *current = i64::from(ln);
                }
                if location.file != message_file {
                    if i == 0 {
                        self.current_file = location.file.clone();
                    }
                    message_file = location.file.clone();
                } else {
                    file = "";
                }
            } else if let Some(ln) = location.line {
                line = ln.to_string();
            }

            out.push_str("        <location");
            if !file.is_empty() {
                let _ = write!(out, " filename=\"{}\"", escape(file));
            }
            if !line.is_empty() {
                let _ = write!(out, " line=\"{}\"", line);
            }
            out.push_str("/>\n");
        }
    }
}

fn write_message(
    out: &mut String,
    unit: &TranslationUnit,
    locations: &mut LocationWriter,
    drops: Option<&Regex>,
) {
    out.push_str("    <message");
    if let Some(id) = &unit.id {
        let _ = write!(out, " id=\"{}\"", escape(id.as_str()));
    }
    if unit.is_plural() {
        out.push_str(" numerus=\"yes\"");
    }
    out.push_str(">\n");

    locations.write(out, unit);

    let _ = writeln!(out, "        <source>{}</source>", protect(&unit.source));
    let optional = [
        ("oldsource", unit.old_source.as_deref()),
        ("comment", unit.disambiguation()),
        ("oldcomment", unit.old_disambiguation.as_deref()),
        ("extracomment", Some(unit.developer_comment.as_str())),
        ("translatorcomment", Some(unit.translator_comment.as_str())),
    ];
    for (tag, value) in optional {
        if let Some(value) = value.filter(|v| !v.is_empty()) {
            let _ = writeln!(out, "        <{}>{}</{}>", tag, protect(value), tag);
        }
    }

    out.push_str("        <translation");
    match unit.status {
        Status::Finished => {}
        Status::Unfinished => out.push_str(" type=\"unfinished\""),
        Status::Obsolete { .. } => out.push_str(" type=\"obsolete\""),
        Status::Vanished { .. } => out.push_str(" type=\"vanished\""),
    }
    if unit.is_plural() {
        out.push('>');
        for form in &unit.translations {
            out.push_str("\n            <numerusform");
            write_variants(out, "            ", form);
            out.push_str("</numerusform>");
        }
        out.push_str("\n        ");
    } else {
        write_variants(out, "        ", unit.translation());
    }
    out.push_str("</translation>\n");

    write_extras(out, "        ", &unit.extras, drops);

    let mut internal = BTreeMap::new();
    if let Some(plural) = unit.plural_source.as_ref().filter(|p| **p != unit.source) {
        internal.insert(EXTRA_PLURAL_SOURCE.to_string(), plural.clone());
    }
    if matches!(
        unit.status,
        Status::Obsolete {
            was_finished: false
        } | Status::Vanished {
            was_finished: false
        }
    ) {
        internal.insert(EXTRA_PRIOR_STATE.to_string(), "unfinished".to_string());
    }
    write_extras(out, "        ", &internal, None);

    out.push_str("    </message>\n");
}

/// Serialize a catalog as TS XML. Contexts are written in catalog order.
pub fn to_xml(catalog: &Catalog, options: &WriteOptions) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"utf-8\"?>\n<!DOCTYPE TS>\n");

    let _ = write!(out, "<TS version=\"{}\"", FORMAT_VERSION);
    if let Some(language) = catalog.target_language.as_deref().filter(|l| !l.is_empty()) {
        let _ = write!(out, " language=\"{}\"", escape(language));
    }
    if let Some(language) = catalog.source_language.as_deref().filter(|l| !l.is_empty()) {
        let _ = write!(out, " sourcelanguage=\"{}\"", escape(language));
    }
    out.push_str(">\n");

    if let Some(codec) = catalog.default_codec.as_deref().filter(|c| !c.is_empty()) {
        let _ = writeln!(out, "<defaultcodec>{}</defaultcodec>", protect(codec));
    }
    let drops = options.drop_tags.as_ref();
    write_extras(&mut out, "    ", &catalog.extras, drops);

    let mut locations = LocationWriter {
        mode: options.locations,
        current_line: HashMap::new(),
        current_file: String::new(),
    };

    for context in &catalog.contexts {
        if context.units.is_empty() {
            continue;
        }
        out.push_str("<context>\n");
        let _ = writeln!(out, "    <name>{}</name>", protect(&context.name));
        if let Some(comment) = &context.comment {
            let _ = writeln!(out, "    <comment>{}</comment>", protect(comment));
        }
        for unit in &context.units {
            write_message(&mut out, unit, &mut locations, drops);
        }
        out.push_str("</context>\n");
    }

    out.push_str("</TS>\n");
    out
}
