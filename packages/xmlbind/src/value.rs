//! Input values accepted by field setters.

use std::fmt;

use crate::collection::Collection;
use crate::element::Leaf;
use crate::node::{Codec, Node};
use crate::payload::Payload;

/// A value handed to `set_value` / `add_value`.
///
/// `Null` resets a field. Scalars (`Bool`, `Int`, `Float`, `Text`) can be
/// stringified into a leaf. `List` is the bulk form for collections and
/// `Node` carries a finished node (a child for a group, or a replacement for
/// a nested payload slot).
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Absence of a value
    #[default]
    Null,
    /// Boolean value
    Bool(bool),
    /// Integer value
    Int(i64),
    /// Floating point value
    Float(f64),
    /// Text value
    Text(String),
    /// Several values at once
    List(Vec<Value>),
    /// A complete node
    Node(Box<Node>),
}

impl Value {
    /// Check if value is null
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Check if the value is a single scalar (bool, number or text).
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Text(_)
        )
    }

    /// Canonical text of a scalar, `None` for null, lists and nodes.
    ///
    /// Booleans become `"true"`/`"false"`, numbers use their shortest
    /// decimal form.
    #[must_use]
    pub fn to_text(&self) -> Option<String> {
        match self {
            Value::Bool(b) => Some(b.to_string()),
            Value::Int(i) => Some(i.to_string()),
            Value::Float(f) => Some(f.to_string()),
            Value::Text(s) => Some(s.clone()),
            Value::Null | Value::List(_) | Value::Node(_) => None,
        }
    }

    /// Short description of the value kind, for error messages.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "boolean",
            Value::Int(_) => "integer",
            Value::Float(_) => "float",
            Value::Text(_) => "text",
            Value::List(_) => "list",
            Value::Node(_) => "node",
        }
    }

    /// Flatten into individual items: `Null` gives none, `List` its
    /// elements, anything else itself.
    #[must_use]
    pub fn into_items(self) -> Vec<Value> {
        match self {
            Value::Null => Vec::new(),
            Value::List(items) => items,
            other => vec![other],
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Text(s) => write!(f, "'{s}'"),
            Value::List(items) => write!(f, "list of {}", items.len()),
            Value::Node(node) => write!(f, "node <{}>", node.tag_name()),
            scalar => write!(f, "{}", scalar.to_text().unwrap_or_default()),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<i32> for Value {
    fn from(i: i32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u32> for Value {
    fn from(i: u32) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<u16> for Value {
    fn from(i: u16) -> Self {
        Value::Int(i64::from(i))
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(opt: Option<T>) -> Self {
        opt.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Node(Box::new(node))
    }
}

impl From<Leaf> for Value {
    fn from(leaf: Leaf) -> Self {
        Value::Node(Box::new(Node::Leaf(leaf)))
    }
}

impl From<Collection> for Value {
    fn from(collection: Collection) -> Self {
        Value::Node(Box::new(Node::Collection(collection)))
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        Value::Node(Box::new(Node::Payload(Box::new(payload))))
    }
}
