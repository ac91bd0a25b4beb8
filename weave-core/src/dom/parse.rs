//! Markup Parsing
//!
//! Turns a markup string into an owned [`Markup`] forest, which the
//! document then inserts into its arena. Built on quick-xml with a few
//! HTML allowances: void elements need no closing tag, attributes may be
//! valueless, stray end tags are skipped, and named references resolve
//! against the HTML5 entity set (unknown names stay literal text).

use std::borrow::Cow;

use indexmap::IndexMap;
use quick_xml::escape::{resolve_html5_entity, unescape, unescape_with, EscapeError};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::MarkupError;

/// Elements that never have children or a closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track", "wbr",
];

pub fn is_void_element(tag: &str) -> bool {
    VOID_ELEMENTS.contains(&tag)
}

/// A parsed, not yet inserted, markup node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Markup {
    Element {
        tag: String,
        attributes: IndexMap<String, String>,
        children: Vec<Markup>,
    },
    Text(String),
    Comment(String),
}

struct Open {
    tag: String,
    attributes: IndexMap<String, String>,
    children: Vec<Markup>,
}

/// Parse a markup fragment into a forest.
pub fn parse_markup(markup: &str) -> Result<Vec<Markup>, MarkupError> {
    let mut reader = Reader::from_str(markup);
    reader.config_mut().check_end_names = false;

    let mut roots: Vec<Markup> = Vec::new();
    let mut stack: Vec<Open> = Vec::new();

    loop {
        match reader.read_event()? {
            Event::Start(start) => {
                let (tag, attributes) = element(&start)?;
                if is_void_element(&tag) {
                    push(&mut stack, &mut roots, Markup::Element { tag, attributes, children: Vec::new() });
                } else {
                    stack.push(Open { tag, attributes, children: Vec::new() });
                }
            }
            Event::Empty(start) => {
                let (tag, attributes) = element(&start)?;
                push(&mut stack, &mut roots, Markup::Element { tag, attributes, children: Vec::new() });
            }
            Event::End(end) => {
                let name = std::str::from_utf8(end.name().as_ref())?.to_ascii_lowercase();
                // Close up to the matching open element; unmatched ends are ignored.
                if let Some(depth) = stack.iter().rposition(|open| open.tag == name) {
                    while stack.len() > depth {
                        close(&mut stack, &mut roots);
                    }
                }
            }
            Event::Text(text) => {
                let raw = std::str::from_utf8(&text)?;
                push_text(&mut stack, &mut roots, &unescape(raw)?);
            }
            Event::CData(data) => {
                let raw = std::str::from_utf8(&data)?;
                push_text(&mut stack, &mut roots, raw);
            }
            Event::GeneralRef(reference) => {
                let resolved: Cow<'_, str> = match reference.resolve_char_ref()? {
                    Some(ch) => Cow::Owned(ch.to_string()),
                    None => resolve_entity(std::str::from_utf8(&reference)?),
                };
                push_text(&mut stack, &mut roots, &resolved);
            }
            Event::Comment(comment) => {
                let raw = std::str::from_utf8(&comment)?;
                push(&mut stack, &mut roots, Markup::Comment(raw.to_owned()));
            }
            Event::Eof => break,
            // Declarations, processing instructions and doctypes carry no content.
            _ => {}
        }
    }

    while !stack.is_empty() {
        close(&mut stack, &mut roots);
    }

    Ok(roots)
}

fn element(start: &BytesStart<'_>) -> Result<(String, IndexMap<String, String>), MarkupError> {
    let tag = std::str::from_utf8(start.name().as_ref())?.to_ascii_lowercase();

    let mut attributes = IndexMap::new();
    for attr in start.html_attributes() {
        let attr = attr?;
        let key = std::str::from_utf8(attr.key.as_ref())?.to_owned();
        let raw = std::str::from_utf8(&attr.value)?;
        let value = match unescape_with(raw, resolve_html5_entity) {
            Ok(value) => value.into_owned(),
            // Kept as written, like an unknown reference in text.
            Err(EscapeError::UnrecognizedEntity(..)) => raw.to_owned(),
            Err(error) => return Err(error.into()),
        };
        attributes.insert(key, value);
    }

    Ok((tag, attributes))
}

fn resolve_entity(name: &str) -> Cow<'_, str> {
    match resolve_html5_entity(name) {
        Some(entity) => Cow::Borrowed(entity),
        None => Cow::Owned(format!("&{name};")),
    }
}

fn push(stack: &mut [Open], roots: &mut Vec<Markup>, node: Markup) {
    match stack.last_mut() {
        Some(open) => open.children.push(node),
        None => roots.push(node),
    }
}

/// Append text, merging with a preceding text sibling.
fn push_text(stack: &mut [Open], roots: &mut Vec<Markup>, text: &str) {
    if text.is_empty() {
        return;
    }
    let siblings = match stack.last_mut() {
        Some(open) => &mut open.children,
        None => roots,
    };
    match siblings.last_mut() {
        Some(Markup::Text(existing)) => existing.push_str(text),
        _ => siblings.push(Markup::Text(text.to_owned())),
    }
}

fn close(stack: &mut Vec<Open>, roots: &mut Vec<Markup>) {
    if let Some(open) = stack.pop() {
        let node = Markup::Element {
            tag: open.tag,
            attributes: open.attributes,
            children: open.children,
        };
        push(stack, roots, node);
    }
}
