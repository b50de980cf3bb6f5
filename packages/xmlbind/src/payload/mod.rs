//! Payloads: composite nodes with a fixed, ordered set of fields.
//!
//! A concrete payload type is a [`PayloadKind`] marker. Its schema is built
//! once per instance by [`Payload::new`]; afterwards only field values change,
//! except nested payload fields, which can be swapped for another instance of
//! the same kind.
//!
//! Fields are addressed by alias first, then by tag name. Serialization
//! emits every valid field in schema order and skips the rest; parsing
//! routes each child element to the first still-empty field with the same
//! tag name.

mod rule;
mod schema;

use std::any::type_name;

use indexmap::IndexMap;
use roxmltree::{Document, Node as XmlNode};

pub use rule::Rule;
pub use schema::{Layout, PayloadKind, Schema};

use crate::collection::Collection;
use crate::config::SerializeOptions;
use crate::element::Leaf;
use crate::error::{BindError, Result};
use crate::name::QName;
use crate::node::{Codec, Node, Parse};
use crate::value::Value;
use crate::xml::{element_children, get_tag_name, namespace_scopes, write_document, Element};

/// Result of a payload-level `set`/`add`.
///
/// A value whose type does not fit a nested payload slot is not an error:
/// the field keeps its value and the call reports `Ignored`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Applied,
    Ignored(String),
}

impl Outcome {
    #[must_use]
    pub fn is_applied(&self) -> bool {
        matches!(self, Outcome::Applied)
    }
}

/// Composite node.
#[derive(Debug, Clone)]
pub struct Payload {
    name: QName,
    namespace: Option<&'static str>,
    kind: &'static str,
    layout: Layout,
    standalone: bool,
    rule: Rule,
    fields: IndexMap<String, Node>,
}

impl Payload {
    /// Build an empty instance of kind `K`.
    ///
    /// # Errors
    /// `Logic` when the schema is inconsistent: invalid names, duplicate
    /// aliases, a rule naming a field that does not exist, or a prefixed
    /// root or field whose prefix is never declared.
    pub fn new<K: PayloadKind>() -> Result<Self> {
        let name = QName::new(K::NAME)?;
        if K::NAMESPACE.is_some_and(str::is_empty) {
            return Err(BindError::Logic(format!(
                "empty namespace URI for <{name}>"
            )));
        }

        let mut schema = Schema::new(K::NAME);
        K::define(&mut schema)?;

        let payload = Self {
            name,
            namespace: K::NAMESPACE,
            kind: type_name::<K>(),
            layout: K::LAYOUT,
            standalone: K::STANDALONE,
            rule: K::rule(),
            fields: schema.into_fields(),
        };
        payload.check_schema()?;
        Ok(payload)
    }

    fn check_schema(&self) -> Result<()> {
        if let (Some(prefix), None) = (self.name.prefix(), self.namespace) {
            return Err(BindError::Logic(format!(
                "<{}> uses prefix '{prefix}' but declares no namespace",
                self.name
            )));
        }

        for name in self.rule.names() {
            if self.position(name).is_none() {
                return Err(BindError::Logic(format!(
                    "rule of <{}> refers to unknown field '{name}'",
                    self.name
                )));
            }
        }

        for field in self.fields.values() {
            let name = match field {
                Node::Leaf(leaf) => leaf.name(),
                Node::Collection(collection) => collection.name(),
                Node::Payload(_) => continue,
            };
            let Some(prefix) = name.prefix() else {
                continue;
            };
            if name.namespace().is_none() && self.name.prefix() != Some(prefix) {
                return Err(BindError::Logic(format!(
                    "<{name}> in <{}> uses undeclared prefix '{prefix}'",
                    self.name
                )));
            }
        }
        Ok(())
    }

    /// Parse a document into a fresh instance of kind `K`.
    ///
    /// # Examples
    /// ```
    /// use xmlbind::catalog::Note;
    /// use xmlbind::payload::Payload;
    ///
    /// let xml = r#"<note xmlns="urn:xmlbind:note"><subject>Hi</subject></note>"#;
    /// let note = Payload::from_xml::<Note>(xml).unwrap();
    /// assert_eq!(note.value("subject").unwrap(), "Hi");
    /// ```
    pub fn from_xml<K: PayloadKind>(xml: &str) -> Result<Self> {
        let mut payload = Self::new::<K>()?;
        payload.parse_str(xml)?;
        Ok(payload)
    }

    /// Root name of the payload.
    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Namespace URI of the root element.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace
    }

    /// Identity of the concrete kind.
    #[must_use]
    pub fn kind_name(&self) -> &'static str {
        self.kind
    }

    /// Whether this instance is of kind `K`.
    #[must_use]
    pub fn is_kind<K: PayloadKind>(&self) -> bool {
        self.kind == type_name::<K>()
    }

    #[must_use]
    pub fn layout(&self) -> Layout {
        self.layout
    }

    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.standalone
    }

    #[must_use]
    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields
            .get_index_of(name)
            .or_else(|| self.fields.values().position(|field| field.tag_name() == name))
    }

    fn not_found(&self, name: &str) -> BindError {
        BindError::NotFound {
            name: name.to_string(),
            payload: self.name.qualified().to_string(),
        }
    }

    /// Field by alias, or else by tag name. Nested payloads are not
    /// searched.
    ///
    /// # Errors
    /// `NotFound` when no field matches.
    pub fn get(&self, name: &str) -> Result<&Node> {
        self.fields
            .get(name)
            .or_else(|| self.fields.values().find(|field| field.tag_name() == name))
            .ok_or_else(|| self.not_found(name))
    }

    /// Mutable field by alias, or else by tag name.
    pub fn get_mut(&mut self, name: &str) -> Result<&mut Node> {
        match self.position(name) {
            Some(index) => Ok(&mut self.fields[index]),
            None => Err(self.not_found(name)),
        }
    }

    /// Whether a field answers to `name`.
    #[must_use]
    pub fn exists(&self, name: &str) -> bool {
        self.position(name).is_some()
    }

    /// Set a field's value.
    ///
    /// Leaves and collections forward to their own `set_value`. A nested
    /// payload field takes another payload of the same kind, which replaces
    /// it, or `Null`, which empties it; anything else leaves it unchanged
    /// and returns [`Outcome::Ignored`].
    ///
    /// # Errors
    /// `NotFound` for unknown fields; `DataType`/`Constraint` when a leaf or
    /// collection rejects the value.
    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> Result<Outcome> {
        self.dispatch(name, value.into(), false)
    }

    /// Add a value: appends to collections, overwrites leaves.
    pub fn add(&mut self, name: &str, value: impl Into<Value>) -> Result<Outcome> {
        self.dispatch(name, value.into(), true)
    }

    fn dispatch(&mut self, name: &str, value: Value, append: bool) -> Result<Outcome> {
        let outcome = match self.get_mut(name)? {
            Node::Payload(nested) => match nested.swap_in(value) {
                Ok(()) => Outcome::Applied,
                Err(found) => Outcome::Ignored(format!(
                    "field '{name}' holds a <{}> payload, got {found}",
                    nested.name
                )),
            },
            field if append => {
                field.add_value(value)?;
                Outcome::Applied
            }
            field => {
                field.set_value(value)?;
                Outcome::Applied
            }
        };

        if let Outcome::Ignored(reason) = &outcome {
            tracing::warn!(payload = %self.name, %reason, "Ignoring value of mismatched type");
        }
        Ok(outcome)
    }

    /// Empty a field. Unknown names are ignored.
    pub fn unset(&mut self, name: &str) {
        match self.position(name) {
            Some(index) => self.fields[index].reset(),
            None => tracing::debug!(payload = %self.name, field = name, "Unset of unknown field"),
        }
    }

    fn swap_in(&mut self, value: Value) -> std::result::Result<(), String> {
        match value {
            Value::Null => {
                self.reset();
                Ok(())
            }
            Value::Node(node) => match *node {
                Node::Payload(replacement) if replacement.kind == self.kind => {
                    *self = *replacement;
                    Ok(())
                }
                other => Err(format!("{} <{}>", other.describe(), other.tag_name())),
            },
            other => Err(format!("{} value", other.kind_name())),
        }
    }

    /// Replace this payload with `value`, as a nested field's `set_value`.
    ///
    /// # Errors
    /// `DataType` unless `value` is `Null` or a payload of the same kind.
    pub(crate) fn replace_with(&mut self, value: Value) -> Result<()> {
        self.swap_in(value).map_err(|found| {
            BindError::data_type(
                self.name.qualified(),
                found,
                format!("a <{}> payload", self.name),
            )
        })
    }

    /// Leaf field.
    ///
    /// # Errors
    /// `NotFound` for unknown fields, `DataType` if the field is not a leaf.
    pub fn leaf(&self, name: &str) -> Result<&Leaf> {
        let field = self.get(name)?;
        field.as_leaf().ok_or_else(|| mismatch(name, field, "a leaf"))
    }

    pub fn leaf_mut(&mut self, name: &str) -> Result<&mut Leaf> {
        match self.get_mut(name)? {
            Node::Leaf(leaf) => Ok(leaf),
            other => Err(mismatch(name, other, "a leaf")),
        }
    }

    pub fn collection(&self, name: &str) -> Result<&Collection> {
        let field = self.get(name)?;
        field
            .as_collection()
            .ok_or_else(|| mismatch(name, field, "a collection"))
    }

    pub fn collection_mut(&mut self, name: &str) -> Result<&mut Collection> {
        match self.get_mut(name)? {
            Node::Collection(collection) => Ok(collection),
            other => Err(mismatch(name, other, "a collection")),
        }
    }

    pub fn payload(&self, name: &str) -> Result<&Payload> {
        let field = self.get(name)?;
        field
            .as_payload()
            .ok_or_else(|| mismatch(name, field, "a payload"))
    }

    pub fn payload_mut(&mut self, name: &str) -> Result<&mut Payload> {
        match self.get_mut(name)? {
            Node::Payload(payload) => Ok(payload),
            other => Err(mismatch(name, other, "a payload")),
        }
    }

    /// Text of a leaf field, empty when unset.
    pub fn value(&self, name: &str) -> Result<&str> {
        self.leaf(name).map(Leaf::value)
    }

    /// Fields keyed by tag name, in schema order.
    pub fn iter(&self) -> Fields<'_> {
        Fields {
            inner: self.fields.values(),
        }
    }

    /// Fields keyed by alias, in schema order.
    pub fn aliases(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.fields.iter().map(|(alias, field)| (alias.as_str(), field))
    }

    /// Every field is valid, regardless of the payload's rule.
    #[must_use]
    pub fn fields_valid(&self) -> bool {
        self.fields.values().all(Codec::is_valid)
    }

    /// Clear every field, recursing into nested payloads.
    pub fn reset(&mut self) {
        for field in self.fields.values_mut() {
            field.reset();
        }
    }

    /// Same schema, no values.
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        Self {
            name: self.name.clone(),
            namespace: self.namespace,
            kind: self.kind,
            layout: self.layout,
            standalone: self.standalone,
            rule: self.rule.clone(),
            fields: self
                .fields
                .iter()
                .map(|(alias, field)| (alias.clone(), field.clone_empty()))
                .collect(),
        }
    }

    /// Serialize as a complete document.
    ///
    /// # Errors
    /// `Parser` when the kind cannot stand alone, or when `options.validate`
    /// is set and the payload is not valid; `Write` on writer failure.
    pub fn to_xml_string(&self, options: &SerializeOptions) -> Result<String> {
        if !self.standalone {
            return Err(BindError::Parser(format!(
                "<{}> can only be serialized inside another payload",
                self.name
            )));
        }
        if options.validate && !self.is_valid() {
            return Err(BindError::Parser(format!(
                "<{}> does not satisfy its rule {:?}",
                self.name, self.rule
            )));
        }
        write_document(&self.to_element(), options)
    }

    /// Serialize with default options.
    pub fn to_xml(&self) -> Result<String> {
        self.to_xml_string(&SerializeOptions::default())
    }

    /// Parse a document into this payload, replacing all values.
    ///
    /// # Errors
    /// `Xml` for malformed input; see [`Parse::parse_node`] otherwise.
    pub fn parse_str(&mut self, xml: &str) -> Result<()> {
        let document = Document::parse(xml)?;
        self.parse_node(document.root_element())
    }

    fn read_attributes(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        for attribute in node.attributes() {
            let name = attribute.name();
            match self.position(name).map(|index| &mut self.fields[index]) {
                Some(Node::Leaf(leaf)) => leaf.set_value(attribute.value())?,
                _ => tracing::warn!(
                    attribute = name,
                    payload = %self.name,
                    "Skipping unknown attribute"
                ),
            }
        }
        Ok(())
    }

    fn read_children(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        for scope in namespace_scopes(node) {
            for child in element_children(node).filter(|c| c.tag_name().namespace() == scope) {
                let tag = get_tag_name(child);
                let mut candidates = self
                    .fields
                    .values()
                    .enumerate()
                    .filter(|(_, field)| {
                        field.accepts(tag)
                            && field.namespace().map_or(true, |uri| Some(uri) == scope)
                    })
                    .map(|(index, _)| index)
                    .peekable();

                if candidates.peek().is_none() {
                    tracing::warn!(tag, payload = %self.name, "Skipping unknown element");
                    continue;
                }
                let Some(index) = candidates.find(|&index| {
                    let field = &self.fields[index];
                    field.is_group() || !field.is_defined()
                }) else {
                    return Err(BindError::Parser(format!(
                        "<{}> has no free field for another <{tag}>",
                        self.name
                    )));
                };

                tracing::debug!(tag, field = index, payload = %self.name, "Routing element");
                self.fields[index].parse_field(child)?;
            }
        }
        Ok(())
    }
}

fn mismatch(name: &str, field: &Node, expected: &str) -> BindError {
    BindError::data_type(name, field.describe(), expected)
}

impl Codec for Payload {
    fn tag_name(&self) -> &str {
        self.name.local()
    }

    fn is_defined(&self) -> bool {
        self.fields.values().any(Codec::is_defined)
    }

    fn is_valid(&self) -> bool {
        self.rule.evaluate(self)
    }

    fn to_element(&self) -> Element {
        let mut root = Element::new(self.name.qualified());
        if let Some(uri) = self.namespace {
            let declaration = match self.name.prefix() {
                Some(prefix) => format!("xmlns:{prefix}"),
                None => "xmlns".to_string(),
            };
            root.attributes.insert(declaration, uri.to_string());
        }

        for field in self.fields.values().filter(|field| field.is_valid()) {
            match (self.layout, field) {
                (Layout::Attributes, Node::Leaf(leaf)) => {
                    root.attributes
                        .insert(leaf.tag_name().to_string(), leaf.value().to_string());
                }
                _ => field.append_to(&mut root),
            }
        }
        root
    }
}

impl Parse for Payload {
    /// Check the root name, then read attributes (attribute layout) and
    /// child elements into an emptied copy. On error `self` is unchanged.
    fn parse_node(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        let tag = get_tag_name(node);
        if tag != self.name.local() {
            return Err(BindError::Parser(format!(
                "expected root <{}>, found <{tag}>",
                self.name.local()
            )));
        }

        let mut parsed = self.clone_empty();
        if parsed.layout == Layout::Attributes {
            parsed.read_attributes(node)?;
        }
        parsed.read_children(node)?;
        *self = parsed;
        Ok(())
    }
}

/// Iterator over a payload's fields keyed by tag name.
pub struct Fields<'a> {
    inner: indexmap::map::Values<'a, String, Node>,
}

impl<'a> Iterator for Fields<'a> {
    type Item = (&'a str, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next().map(|field| (field.tag_name(), field))
    }
}

impl<'a> IntoIterator for &'a Payload {
    type Item = (&'a str, &'a Node);
    type IntoIter = Fields<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
