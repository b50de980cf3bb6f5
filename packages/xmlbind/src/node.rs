//! The codec contract shared by every node kind.

use roxmltree::Node as XmlNode;

use crate::collection::Collection;
use crate::element::Leaf;
use crate::error::Result;
use crate::payload::Payload;
use crate::value::Value;
use crate::xml::Element;

/// Write-side capability: what a node is, and its DOM form.
pub trait Codec {
    /// Local tag name (without prefix).
    fn tag_name(&self) -> &str;

    /// The node holds non-empty content.
    fn is_defined(&self) -> bool;

    /// The node meets its type or business constraints.
    fn is_valid(&self) -> bool;

    /// Element form of the node.
    fn to_element(&self) -> Element;

    /// Append this node's output to a parent element.
    ///
    /// Default implementation appends [`Codec::to_element`]; groups append
    /// their children without a wrapper.
    fn append_to(&self, parent: &mut Element) {
        parent.push_child(self.to_element());
    }
}

/// Read-side capability: fill a node from a parsed element.
pub trait Parse {
    /// Read `node` into `self`.
    ///
    /// # Errors
    /// `Parser` on structural mismatch; `DataType`/`Constraint` when a value
    /// in the document is rejected by its field.
    fn parse_node(&mut self, node: XmlNode<'_, '_>) -> Result<()>;
}

/// Capability tag of a node, used by type-filtered groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    /// Leaf with the named constraint kind (`leaf`, `boolean`, ...).
    Leaf(&'static str),
    /// Line list.
    Lines,
    /// Name-filtered group.
    NameGroup,
    /// Type-filtered group.
    TypeGroup,
    /// Payload of the named concrete type.
    Payload(&'static str),
}

/// Any node that can sit in a payload field or a collection.
#[derive(Debug, Clone)]
pub enum Node {
    Leaf(Leaf),
    Collection(Collection),
    Payload(Box<Payload>),
}

impl Node {
    /// Capability tag of this node.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self {
            Node::Leaf(leaf) => Kind::Leaf(leaf.constraint().name()),
            Node::Collection(collection) => collection.kind(),
            Node::Payload(payload) => Kind::Payload(payload.kind_name()),
        }
    }

    /// Namespace URI the node's own name is bound to.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Node::Leaf(leaf) => leaf.name().namespace(),
            Node::Collection(collection) => collection.name().namespace(),
            Node::Payload(payload) => payload.namespace(),
        }
    }

    /// Whether an element with local name `tag` belongs to this node.
    ///
    /// Groups answer for their children's names, everything else for its
    /// own name.
    #[must_use]
    pub fn accepts(&self, tag: &str) -> bool {
        match self {
            Node::Collection(collection) => collection.accepts(tag),
            other => other.tag_name() == tag,
        }
    }

    /// Whether the node absorbs any number of matching elements.
    #[must_use]
    pub fn is_group(&self) -> bool {
        matches!(self, Node::Collection(collection) if collection.is_group())
    }

    /// Read one routed child element: a group absorbs it as a new member,
    /// anything else parses it as itself.
    pub fn parse_field(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        match self {
            Node::Collection(collection) if collection.is_group() => collection.absorb(node),
            other => other.parse_node(node),
        }
    }

    /// Forward a value to the node's `set_value`.
    ///
    /// Payload nodes take a payload of their own type or `Null`; anything
    /// else is a `DataType` error here. [`Payload::set`] handles the
    /// non-fatal path for nested payload slots.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        match self {
            Node::Leaf(leaf) => leaf.set_value(value),
            Node::Collection(collection) => collection.set_value(value),
            Node::Payload(payload) => payload.replace_with(value.into()),
        }
    }

    /// Forward a value to the node's `add_value`.
    pub fn add_value(&mut self, value: impl Into<Value>) -> Result<()> {
        match self {
            Node::Leaf(leaf) => leaf.add_value(value),
            Node::Collection(collection) => collection.add_value(value),
            Node::Payload(payload) => payload.replace_with(value.into()),
        }
    }

    /// Clear all value state, keeping structure.
    pub fn reset(&mut self) {
        match self {
            Node::Leaf(leaf) => leaf.reset(),
            Node::Collection(collection) => collection.reset(),
            Node::Payload(payload) => payload.reset(),
        }
    }

    /// Structural copy with all value state cleared.
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        match self {
            Node::Leaf(leaf) => Node::Leaf(leaf.clone_empty()),
            Node::Collection(collection) => Node::Collection(collection.clone_empty()),
            Node::Payload(payload) => Node::Payload(Box::new(payload.clone_empty())),
        }
    }

    #[must_use]
    pub fn as_leaf(&self) -> Option<&Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    pub fn as_leaf_mut(&mut self) -> Option<&mut Leaf> {
        match self {
            Node::Leaf(leaf) => Some(leaf),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    pub fn as_collection_mut(&mut self) -> Option<&mut Collection> {
        match self {
            Node::Collection(collection) => Some(collection),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            Node::Payload(payload) => Some(payload),
            _ => None,
        }
    }

    pub fn as_payload_mut(&mut self) -> Option<&mut Payload> {
        match self {
            Node::Payload(payload) => Some(payload),
            _ => None,
        }
    }

    /// Short description of the node kind, for diagnostics.
    #[must_use]
    pub fn describe(&self) -> &'static str {
        match self {
            Node::Leaf(_) => "leaf",
            Node::Collection(_) => "collection",
            Node::Payload(_) => "payload",
        }
    }
}

impl Codec for Node {
    fn tag_name(&self) -> &str {
        match self {
            Node::Leaf(leaf) => leaf.tag_name(),
            Node::Collection(collection) => collection.tag_name(),
            Node::Payload(payload) => payload.tag_name(),
        }
    }

    fn is_defined(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_defined(),
            Node::Collection(collection) => collection.is_defined(),
            Node::Payload(payload) => payload.is_defined(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            Node::Leaf(leaf) => leaf.is_valid(),
            Node::Collection(collection) => collection.is_valid(),
            Node::Payload(payload) => payload.is_valid(),
        }
    }

    fn to_element(&self) -> Element {
        match self {
            Node::Leaf(leaf) => leaf.to_element(),
            Node::Collection(collection) => collection.to_element(),
            Node::Payload(payload) => payload.to_element(),
        }
    }

    fn append_to(&self, parent: &mut Element) {
        match self {
            Node::Leaf(leaf) => leaf.append_to(parent),
            Node::Collection(collection) => collection.append_to(parent),
            Node::Payload(payload) => payload.append_to(parent),
        }
    }
}

impl Parse for Node {
    fn parse_node(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        match self {
            Node::Leaf(leaf) => leaf.parse_node(node),
            Node::Collection(collection) => collection.parse_node(node),
            Node::Payload(payload) => payload.parse_node(node),
        }
    }
}

impl From<Leaf> for Node {
    fn from(leaf: Leaf) -> Self {
        Node::Leaf(leaf)
    }
}

impl From<Collection> for Node {
    fn from(collection: Collection) -> Self {
        Node::Collection(collection)
    }
}

impl From<Payload> for Node {
    fn from(payload: Payload) -> Self {
        Node::Payload(Box::new(payload))
    }
}
