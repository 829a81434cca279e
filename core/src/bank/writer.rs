//! SC2Bank XML rendering
//!
//! ```text
//! <?xml version="1.0" encoding="UTF-8"?>
//! <!--Bank recovered from a replay-->
//! ...provenance comments...
//! <Bank version="1">
//!   <Section name="Stats">
//!     <Key name="wins">
//!       <wins int="12"/>
//!     </Key>
//!   </Section>
//!   <Signature value="0A1B..."/>
//! </Bank>
//! ```
//!
//! A value element is tagged with the name of the event carrying it and has
//! one attribute named after its kind.

use std::io::{self, Write};
use std::iter::Peekable;
use std::time::Duration;

use chrono::{DateTime, SecondsFormat, Utc};
use quick_xml::Writer;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use sc2bank_shared::format_duration;

use super::document::{BankDocument, BankNode};
use super::value::{BankValue, ValueKind};
use crate::replay::ReplaySession;

/// Tag of a value whose event name is not a usable element name
const FALLBACK_VALUE_TAG: &str = "Value";

/// Replay facts written as comments at the top of every bank file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankProvenance {
    pub recovered_at: DateTime<Utc>,
    pub title: String,
    pub version: String,
    pub loops: u64,
    pub duration: Duration,
}

impl BankProvenance {
    pub fn from_session(session: &ReplaySession, recovered_at: DateTime<Utc>) -> Self {
        let header = session.header();
        Self {
            recovered_at,
            title: session.details().title.clone(),
            version: header.version_string(),
            loops: header.loops,
            duration: header.duration(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Element {
    name: String,
    attrs: Vec<(&'static str, String)>,
    children: Vec<Element>,
}

impl Element {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.attrs.push((name, value.into()));
        self
    }

    /// Append a child, returning its index
    fn push(&mut self, child: Element) -> usize {
        self.children.push(child);
        self.children.len() - 1
    }

    fn write<W: Write>(&self, writer: &mut Writer<W>) -> io::Result<()> {
        let start = BytesStart::new(self.name.as_str())
            .with_attributes(self.attrs.iter().map(|(name, value)| (*name, value.as_str())));
        if self.children.is_empty() {
            return writer.write_event(Event::Empty(start));
        }
        writer.write_event(Event::Start(start))?;
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))
    }
}

/// A rendered bank: provenance comments and the `Bank` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankXml {
    comments: Vec<String>,
    root: Element,
}

impl BankXml {
    fn encode(&self, indent: usize) -> io::Result<Vec<u8>> {
        let mut writer = Writer::new_with_indent(Vec::new(), b' ', indent);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        for text in &self.comments {
            writer.write_event(Event::Comment(BytesText::from_escaped(comment_text(text))))?;
        }
        self.root.write(&mut writer)?;

        let mut out = writer.into_inner();
        out.push(b'\n');
        Ok(out)
    }

    pub fn to_xml(&self, indent: usize) -> io::Result<String> {
        let bytes = self.encode(indent)?;
        String::from_utf8(bytes).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))
    }

    /// Write the document, returning the number of bytes written.
    pub fn write_to<W: Write>(&self, writer: &mut W, indent: usize) -> io::Result<u64> {
        let bytes = self.encode(indent)?;
        writer.write_all(&bytes)?;
        Ok(bytes.len() as u64)
    }
}

/// Build the XML document of a bank.
pub fn render(bank: &BankDocument, provenance: &BankProvenance) -> BankXml {
    let mut root = Element::new("Bank").with_attr("version", "1");

    // Index in `root` of the open section or signature. Keys arriving
    // without one are written on the root itself. The open key is the
    // last child of that container.
    let mut container: Option<usize> = None;
    let mut key_open = false;

    let mut nodes = bank.nodes().iter().peekable();
    while let Some(node) = nodes.next() {
        match node {
            BankNode::Section { name } => {
                container = Some(root.push(Element::new("Section").with_attr("name", name)));
                key_open = false;
            }
            BankNode::Key { name, value } => {
                if container.is_none() {
                    tracing::debug!(bank = bank.name(), key = %name, "Key outside a section");
                }
                let mut key = Element::new("Key").with_attr("name", name);
                if let Some(el) = value.as_ref().and_then(|v| value_element(name, v, &mut nodes)) {
                    key.push(el);
                }
                container_mut(&mut root, container).push(key);
                key_open = true;
            }
            BankNode::Value { name, value } => {
                let parent = container_mut(&mut root, container);
                let Some(key) = parent.children.last_mut().filter(|_| key_open) else {
                    tracing::debug!(
                        bank = bank.name(),
                        value = %name,
                        "Skipping value outside a key"
                    );
                    continue;
                };
                if let Some(el) = value_element(name, value, &mut nodes) {
                    key.push(el);
                }
            }
            BankNode::Signature(bytes) => {
                let mut signature = Element::new("Signature");
                if !bytes.is_empty() {
                    signature = signature.with_attr("value", hex::encode_upper(bytes));
                }
                // Content after the signature nests under it
                container = Some(root.push(signature));
                key_open = false;
            }
        }
    }

    let comments = vec![
        "Bank recovered from a replay".to_string(),
        provenance
            .recovered_at
            .to_rfc3339_opts(SecondsFormat::Secs, true),
        format!("Title: {}", provenance.title),
        format!("Version: {}", provenance.version),
        format!("Loops: {}", provenance.loops),
        format!("Length: {}", format_duration(provenance.duration)),
        format!("Player: {}", bank.owner().toon_handle),
    ];
    BankXml { comments, root }
}

fn container_mut(root: &mut Element, container: Option<usize>) -> &mut Element {
    match container {
        Some(idx) if idx < root.children.len() => &mut root.children[idx],
        _ => root,
    }
}

/// Element for `value` of the event `name`. A deferred value takes the
/// name and payload of the value node right after it, consuming that node.
fn value_element<'a, I>(name: &str, value: &BankValue, rest: &mut Peekable<I>) -> Option<Element>
where
    I: Iterator<Item = &'a BankNode>,
{
    match value {
        BankValue::Inline { kind, data } => Some(inline_element(name, *kind, data)),
        BankValue::Deferred => match rest.peek() {
            Some(BankNode::Value {
                name,
                value: BankValue::Inline { kind, data },
            }) => {
                let el = inline_element(name, *kind, data);
                rest.next();
                Some(el)
            }
            _ => None,
        },
    }
}

fn inline_element(name: &str, kind: ValueKind, data: &str) -> Element {
    Element::new(value_tag(name)).with_attr(kind.name(), data)
}

fn value_tag(name: &str) -> &str {
    let mut chars = name.chars();
    let valid = chars
        .next()
        .is_some_and(|c| c.is_alphabetic() || c == '_')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid { name } else { FALLBACK_VALUE_TAG }
}

/// Comments may not contain `--` or end in `-`
fn comment_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if c == '-' && out.ends_with('-') {
            out.push(' ');
        }
        out.push(c);
    }
    if out.ends_with('-') {
        out.push(' ');
    }
    out
}
