// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! Minimal XML node tree the engine traverses.
//!
//! This is NOT a general XML codec --just enough structure for the matcher:
//! element name, attributes (insertion-ordered), child elements and text
//! content. Parsing and serialization go through `quick-xml`.
//!

use crate::{MatchError, Value, num::Num};
use indexmap::IndexMap;
use quick_xml::{
    Reader, Writer,
    events::{BytesEnd, BytesStart, BytesText, Event},
};
use std::io::Cursor;

/// One XML element: name, attributes, children and optional text content.
#[derive(Clone, Debug, PartialEq)]
pub struct XmlNode {
    /// Element (tag) name.
    pub name: String,
    /// Attributes in document order.
    pub attrs: IndexMap<String, String>,
    /// Child elements in document order.
    pub children: Vec<XmlNode>,
    /// Concatenated text content, `None` when the element has none.
    pub text: Option<String>,
}

impl XmlNode {
    /// Create a childless, attribute-less element.
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            attrs: IndexMap::new(),
            children: Vec::new(),
            text: None,
        }
    }

    /// Parse a document from a string, returning its root element.
    pub fn parse(input: &str) -> Result<Self, MatchError> {
        let mut reader = Reader::from_str(input);
        reader.trim_text(true);

        let mut stack: Vec<XmlNode> = Vec::new();
        let mut root: Option<XmlNode> = None;
        loop {
            match reader.read_event()? {
                Event::Start(e) => stack.push(node_from_start(&e)?),
                Event::Empty(e) => {
                    let node = node_from_start(&e)?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Text(e) => {
                    let s = e.unescape()?.into_owned();
                    if let Some(top) = stack.last_mut() {
                        match &mut top.text {
                            Some(t) => t.push_str(&s),
                            None if !s.is_empty() => top.text = Some(s),
                            None => (),
                        }
                    }
                }
                Event::End(_) => {
                    let node = stack.pop().ok_or_else(|| {
                        MatchError::Usage("unbalanced XML close tag".into())
                    })?;
                    attach(&mut stack, &mut root, node)?;
                }
                Event::Eof => break,
                // declarations, comments, PIs and CDATA wrappers are noise
                // as far as matching goes...
                _ => (),
            }
        }

        root.ok_or_else(|| MatchError::Usage("XML input has no root element".into()))
    }

    /// Serialize this element (and everything below it) back to a string.
    pub fn to_xml_string(&self) -> String {
        let mut writer = Writer::new(Cursor::new(Vec::new()));
        // writing into an in-memory buffer cannot fail...
        let _ = self.write(&mut writer);
        String::from_utf8_lossy(&writer.into_inner().into_inner()).into_owned()
    }

    fn write(&self, writer: &mut Writer<Cursor<Vec<u8>>>) -> Result<(), MatchError> {
        let mut start = BytesStart::new(self.name.as_str());
        for (k, v) in &self.attrs {
            start.push_attribute((k.as_str(), v.as_str()));
        }
        if self.children.is_empty() && self.text.is_none() {
            writer.write_event(Event::Empty(start))?;
            return Ok(());
        }
        writer.write_event(Event::Start(start))?;
        if let Some(text) = &self.text {
            writer.write_event(Event::Text(BytesText::new(text)))?;
        }
        for child in &self.children {
            child.write(writer)?;
        }
        writer.write_event(Event::End(BytesEnd::new(self.name.as_str())))?;
        Ok(())
    }

    /// Convert to the map shape the comparator actually walks:
    /// `{ name: content }` where content nests children, text lands under
    /// the `_` key when attributes are present, and attributes live under
    /// the `@` key.
    pub fn to_map(&self) -> IndexMap<String, Value> {
        let mut map = IndexMap::new();
        map.insert(self.name.clone(), self.content());
        map
    }

    // The value side of `to_map`, recursively.
    fn content(&self) -> Value {
        let inner = if self.children.is_empty() {
            match &self.text {
                Some(t) => text_value(t),
                None => Value::Null,
            }
        } else {
            // group repeated child names into lists, preserving order...
            let mut grouped: IndexMap<String, Vec<Value>> = IndexMap::new();
            for child in &self.children {
                grouped
                    .entry(child.name.clone())
                    .or_default()
                    .push(child.content());
            }
            let mut map = IndexMap::new();
            for (name, mut values) in grouped {
                if values.len() == 1 {
                    map.insert(name, values.remove(0));
                } else {
                    map.insert(name, Value::list_in_memory(values));
                }
            }
            Value::Map(map)
        };

        if self.attrs.is_empty() {
            inner
        } else {
            let attrs: IndexMap<String, Value> = self
                .attrs
                .iter()
                .map(|(k, v)| (k.clone(), Value::Str(v.clone())))
                .collect();
            let mut wrapped = IndexMap::new();
            wrapped.insert("_".to_string(), inner);
            wrapped.insert("@".to_string(), Value::Map(attrs));
            Value::Map(wrapped)
        }
    }
}

// XML text content is typed: numeric-looking text compares as a number,
// boolean-looking text as a boolean.
fn text_value(t: &str) -> Value {
    match t {
        "true" => Value::Bool(true),
        "false" => Value::Bool(false),
        _ => {
            if let Ok(x) = t.parse::<i64>() {
                Value::Num(Num::Int(x))
            } else if let Ok(x) = t.parse::<f64>() {
                Value::Num(Num::Float(x))
            } else {
                Value::Str(t.to_string())
            }
        }
    }
}

fn node_from_start(e: &BytesStart<'_>) -> Result<XmlNode, MatchError> {
    let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
    let mut node = XmlNode::new(name);
    for attr in e.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value()?.into_owned();
        node.attrs.insert(key, value);
    }
    Ok(node)
}

fn attach(
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> Result<(), MatchError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(MatchError::Usage("multiple XML root elements".into())),
    }
}
