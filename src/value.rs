// SPDX-License-Identifier: Apache-2.0

#![warn(missing_docs)]

//! The tagged value tree the engine traverses.
//!
//! Every input --parsed JSON, parsed XML, or a raw payload-- is classified
//! into one of nine [Kind]s on construction. Values are immutable once
//! built; all matching context (path, evaluator bindings) flows through the
//! recursion and is never stored inside a value.
//!

use crate::{MatchError, Num, store::Seq, xml::XmlNode};
use core::fmt;
use indexmap::IndexMap;
use tracing::debug;

/// The sentinel marker meaning "this path does not exist in actual".
pub const NOT_PRESENT: &str = "#notpresent";

/// Classification of a [Value].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Kind {
    /// JSON null or XML empty content.
    Null,
    /// A boolean.
    Boolean,
    /// Any numeric payload, see [Num].
    Number,
    /// A UTF-8 string.
    String,
    /// A raw byte array.
    Bytes,
    /// A sequence, possibly disk-backed, see [Seq].
    List,
    /// A string-keyed, insertion-ordered mapping.
    Map,
    /// A parsed XML element.
    Xml,
    /// The escape hatch for payloads from external collaborators.
    Other,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Kind::Null => "NULL",
            Kind::Boolean => "BOOLEAN",
            Kind::Number => "NUMBER",
            Kind::String => "STRING",
            Kind::Bytes => "BYTES",
            Kind::List => "LIST",
            Kind::Map => "MAP",
            Kind::Xml => "XML",
            Kind::Other => "OTHER",
        };
        write!(f, "{s}")
    }
}

/// A value under test (actual) or a specification value (expected).
#[derive(Clone, Debug)]
pub enum Value {
    /// Null / nil / unset.
    Null,
    /// A boolean.
    Bool(bool),
    /// A number, double or arbitrary-precision.
    Num(Num),
    /// A string. May carry matcher macros when used on the expected side.
    Str(String),
    /// Raw bytes.
    Bytes(Vec<u8>),
    /// A list, in-memory or disk-backed.
    List(Seq),
    /// A string-keyed map preserving insertion order.
    Map(IndexMap<String, Value>),
    /// An XML element.
    Xml(XmlNode),
    /// Anything the other variants cannot hold, as its display form.
    Other(String),
}

impl Value {
    /// Classify this value.
    pub fn kind(&self) -> Kind {
        match self {
            Value::Null => Kind::Null,
            Value::Bool(_) => Kind::Boolean,
            Value::Num(_) => Kind::Number,
            Value::Str(_) => Kind::String,
            Value::Bytes(_) => Kind::Bytes,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Xml(_) => Kind::Xml,
            Value::Other(_) => Kind::Other,
        }
    }

    /// Auto-parse hook applied by the top-level entry points: a string that
    /// is valid JSON (container or scalar literal) parses as JSON, one that
    /// looks like XML parses as XML, a leading `\` escapes the lookalike
    /// treatment, anything else is returned unchanged. Construction never
    /// fails.
    pub fn parse(input: &str) -> Value {
        if let Some(rest) = input.strip_prefix('\\') {
            return Value::Str(rest.to_string());
        }
        let trimmed = input.trim_start();
        if trimmed.starts_with('<') {
            match XmlNode::parse(input) {
                Ok(node) => return Value::Xml(node),
                Err(e) => debug!("XML lookalike failed to parse, kept as string: {e}"),
            }
        } else {
            match serde_json::from_str::<serde_json::Value>(input) {
                Ok(json) => return Value::from_json(&json),
                Err(e) => {
                    if trimmed.starts_with('{') || trimmed.starts_with('[') {
                        debug!("JSON lookalike failed to parse, kept as string: {e}");
                    }
                }
            }
        }
        Value::Str(input.to_string())
    }

    /// Wrap a parsed JSON tree. Arrays become in-memory lists; objects keep
    /// their insertion order.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(x) => Value::Bool(*x),
            serde_json::Value::Number(x) => Value::Num(Num::from(x)),
            serde_json::Value::String(x) => Value::Str(x.clone()),
            serde_json::Value::Array(xs) => {
                Value::list_in_memory(xs.iter().map(Value::from_json).collect())
            }
            serde_json::Value::Object(xs) => Value::Map(
                xs.iter()
                    .map(|(k, v)| (k.clone(), Value::from_json(v)))
                    .collect(),
            ),
        }
    }

    /// Project back onto a JSON tree, chiefly for the disk store's
    /// line-per-value format. Lossy at the edges: bytes become integer
    /// arrays, XML its string form, and arbitrary-precision numbers fall
    /// back to their decimal string when they exceed double range.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(x) => serde_json::Value::Bool(*x),
            Value::Num(x) => match x {
                Num::Int(i) => serde_json::Value::from(*i),
                Num::UInt(u) => serde_json::Value::from(*u),
                Num::Float(f) => serde_json::Number::from_f64(*f)
                    .map(serde_json::Value::Number)
                    .unwrap_or(serde_json::Value::Null),
                Num::Big(b) => {
                    use bigdecimal::ToPrimitive;
                    match b.to_f64().filter(|f| f.is_finite()) {
                        Some(f) if Num::Float(f).matches(x) => serde_json::Number::from_f64(f)
                            .map(serde_json::Value::Number)
                            .unwrap_or(serde_json::Value::Null),
                        _ => serde_json::Value::String(b.to_string()),
                    }
                }
            },
            Value::Str(x) => serde_json::Value::String(x.clone()),
            Value::Bytes(xs) => {
                serde_json::Value::Array(xs.iter().map(|b| serde_json::Value::from(*b)).collect())
            }
            Value::List(xs) => {
                let mut out = Vec::with_capacity(xs.len());
                for x in xs.iter() {
                    match x {
                        Ok(v) => out.push(v.to_json()),
                        Err(_) => out.push(serde_json::Value::Null),
                    }
                }
                serde_json::Value::Array(out)
            }
            Value::Map(xs) => serde_json::Value::Object(
                xs.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Value::Xml(x) => serde_json::Value::String(x.to_xml_string()),
            Value::Other(x) => serde_json::Value::String(x.clone()),
        }
    }

    /// An in-memory list.
    pub fn list_in_memory(values: Vec<Value>) -> Value {
        Value::List(Seq::in_memory(values))
    }

    /// A list backed per the spill policy: big collections land in a temp
    /// file, small ones on the heap.
    pub fn list(values: Vec<Value>) -> Result<Value, MatchError> {
        Ok(Value::List(Seq::from_values(values)?))
    }

    /// Return TRUE if this is null.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Return TRUE if this is a boolean.
    pub fn is_boolean(&self) -> bool {
        matches!(self, Value::Bool(_))
    }

    /// Return TRUE if this is a number.
    pub fn is_number(&self) -> bool {
        matches!(self, Value::Num(_))
    }

    /// Return TRUE if this is a string.
    pub fn is_string(&self) -> bool {
        matches!(self, Value::Str(_))
    }

    /// Return TRUE if this is a list.
    pub fn is_list(&self) -> bool {
        matches!(self, Value::List(_))
    }

    /// Return TRUE if this is a map.
    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Return TRUE if this is an XML element.
    pub fn is_xml(&self) -> bool {
        matches!(self, Value::Xml(_))
    }

    /// Return TRUE for the structured kinds that deep containment recurses
    /// into.
    pub fn is_map_or_list_or_xml(&self) -> bool {
        matches!(self, Value::Map(_) | Value::List(_) | Value::Xml(_))
    }

    /// Return TRUE iff this is the `#notpresent` sentinel.
    pub fn is_not_present(&self) -> bool {
        matches!(self, Value::Str(s) if s == NOT_PRESENT)
    }

    /// Return TRUE iff this is a string that denotes an array/object schema
    /// reference or an embedded expression; such strings must NOT be
    /// wrapped into singleton lists by the containment coercion rules.
    pub fn is_array_object_or_reference(&self) -> bool {
        match self {
            Value::Str(s) => {
                s.starts_with("#[")
                    || s.starts_with("##[")
                    || s.starts_with("#(")
                    || s.starts_with("##(")
                    || s == "#array"
                    || s == "##array"
                    || s == "#object"
                    || s == "##object"
            }
            _ => false,
        }
    }

    /// The string payload, when this is a string.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Str(s) => Some(s),
            _ => None,
        }
    }

    /// The sequence payload, when this is a list.
    pub fn as_seq(&self) -> Option<&Seq> {
        match self {
            Value::List(s) => Some(s),
            _ => None,
        }
    }

    /// The map payload, when this is a map.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    /// Number of list elements, when this is a list.
    pub fn list_size(&self) -> Option<usize> {
        self.as_seq().map(Seq::len)
    }

    /// The i-th list element, when this is a list. Disk-backed access can
    /// fail with an I/O error.
    pub fn list_element(&self, i: usize) -> Result<Value, MatchError> {
        match self.as_seq() {
            Some(seq) => seq.get(i),
            None => Err(MatchError::Usage("value is not a list".into())),
        }
    }

    /// Render for failure reports: JSON-canonical for tree values, the
    /// document form for XML, exact digits for arbitrary-precision numbers.
    pub fn render(&self) -> String {
        match self {
            Value::Null => "null".to_string(),
            Value::Bool(x) => x.to_string(),
            Value::Num(x) => x.to_string(),
            Value::Str(x) => serde_json::to_string(x).unwrap_or_else(|_| format!("'{x}'")),
            Value::Bytes(xs) => format!("({} bytes)", xs.len()),
            Value::List(xs) => {
                let mut parts = Vec::with_capacity(xs.len());
                for x in xs.iter() {
                    match x {
                        Ok(v) => parts.push(v.render()),
                        Err(_) => parts.push("<unreadable>".to_string()),
                    }
                }
                format!("[{}]", parts.join(","))
            }
            Value::Map(xs) => {
                let parts: Vec<String> = xs
                    .iter()
                    .map(|(k, v)| {
                        format!(
                            "{}:{}",
                            serde_json::to_string(k).unwrap_or_else(|_| format!("'{k}'")),
                            v.render()
                        )
                    })
                    .collect();
                format!("{{{}}}", parts.join(","))
            }
            Value::Xml(x) => x.to_xml_string(),
            Value::Other(x) => x.clone(),
        }
    }

    /// Script-style truthiness, used to judge `?` predicate results: null
    /// and empty strings/collections are falsy, zero is falsy, everything
    /// else is truthy.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(x) => *x,
            Value::Num(x) => x.as_f64() != 0.0,
            Value::Str(x) => !x.is_empty(),
            Value::Bytes(xs) => !xs.is_empty(),
            Value::List(xs) => !xs.is_empty(),
            Value::Map(xs) => !xs.is_empty(),
            Value::Xml(_) | Value::Other(_) => true,
        }
    }

    /// For readable failure output only: when both sides are maps, return a
    /// copy of this map whose key order mirrors `other`'s, followed by this
    /// value's extra keys. Any other combination returns `self` unchanged.
    pub fn sorted_like(&self, other: &Value) -> Value {
        let (Value::Map(this), Value::Map(that)) = (self, other) else {
            return self.clone();
        };
        let mut out: IndexMap<String, Value> = IndexMap::with_capacity(this.len());
        for key in that.keys() {
            if let Some(v) = this.get(key) {
                out.insert(key.clone(), v.clone());
            }
        }
        for (key, v) in this {
            if !out.contains_key(key) {
                out.insert(key.clone(), v.clone());
            }
        }
        Value::Map(out)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.render())
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Num(a), Value::Num(b)) => a.matches(b),
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Bytes(a), Value::Bytes(b)) => a == b,
            (Value::List(a), Value::List(b)) => {
                if a.len() != b.len() {
                    return false;
                }
                for i in 0..a.len() {
                    // a disk read failure compares as not-equal...
                    match (a.get(i), b.get(i)) {
                        (Ok(x), Ok(y)) if x == y => (),
                        _ => return false,
                    }
                }
                true
            }
            (Value::Map(a), Value::Map(b)) => {
                a.len() == b.len() && a.iter().all(|(k, v)| b.get(k) == Some(v))
            }
            (Value::Xml(a), Value::Xml(b)) => a == b,
            (Value::Other(a), Value::Other(b)) => a == b,
            _ => false,
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Num(Num::Int(value))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Num(Num::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Str(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Str(value)
    }
}
