//! Collection elements: ordered children sharing one container name.
//!
//! Three variants exist:
//!
//! - a **line list** holds raw strings and renders them as numbered
//!   `<line>` elements inside its container;
//! - a **name-filtered group** holds nodes whose tag names are in a fixed
//!   allow-list;
//! - a **type-filtered group** holds nodes whose [`Kind`] matches one of a
//!   fixed set of templates.
//!
//! Groups render their children directly into the parent, without a
//! wrapper element, unless they are marked [`Collection::contained`].

use roxmltree::Node as XmlNode;

use crate::config::{validate_xml_text, LINE_NUMBER_ATTRIBUTE, LINE_TAG};
use crate::element::{Constraint, Leaf};
use crate::error::{BindError, Result};
use crate::name::QName;
use crate::node::{Codec, Kind, Node, Parse};
use crate::value::Value;
use crate::xml::{collect_text, distinct_child_names, element_children, get_tag_name, Element};

/// One child of a collection.
#[derive(Debug, Clone)]
pub enum Item {
    Line(String),
    Node(Node),
}

impl Item {
    /// Line text, if this is a line.
    #[must_use]
    pub fn as_line(&self) -> Option<&str> {
        match self {
            Item::Line(line) => Some(line.as_str()),
            Item::Node(_) => None,
        }
    }

    /// Node, if this is a node.
    #[must_use]
    pub fn as_node(&self) -> Option<&Node> {
        match self {
            Item::Node(node) => Some(node),
            Item::Line(_) => None,
        }
    }

    fn is_defined(&self) -> bool {
        match self {
            Item::Line(line) => !line.is_empty(),
            Item::Node(node) => node.is_defined(),
        }
    }

    fn is_valid(&self) -> bool {
        match self {
            Item::Line(_) => true,
            Item::Node(node) => !node.is_defined() || node.is_valid(),
        }
    }
}

#[derive(Debug, Clone)]
enum Filter {
    Lines,
    /// Allowed names, plus the templates members of some names are read
    /// through.
    Names {
        allowed: Vec<QName>,
        templates: Vec<Node>,
    },
    Kinds(Vec<Node>),
}

/// Ordered collection of children.
#[derive(Debug, Clone)]
pub struct Collection {
    name: QName,
    filter: Filter,
    contained: bool,
    items: Vec<Item>,
}

impl Collection {
    /// Line list.
    ///
    /// # Examples
    /// ```
    /// use xmlbind::collection::Collection;
    /// use xmlbind::node::Codec;
    /// use xmlbind::xml::write_fragment;
    ///
    /// let mut text = Collection::lines("text").unwrap();
    /// text.set_value(vec!["first", "second"]).unwrap();
    /// assert_eq!(
    ///     write_fragment(&text.to_element(), false).unwrap(),
    ///     r#"<text><line number="1">first</line><line number="2">second</line></text>"#
    /// );
    /// ```
    pub fn lines(name: &str) -> Result<Self> {
        Ok(Self {
            name: QName::new(name)?,
            filter: Filter::Lines,
            contained: false,
            items: Vec::new(),
        })
    }

    /// Name-filtered group.
    ///
    /// Members without a template are plain leaves; see
    /// [`Collection::with_template`] for richer members.
    ///
    /// # Errors
    /// Returns `Logic` when `allowed` is empty or holds an invalid name.
    pub fn named<I, S>(name: &str, allowed: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let allowed = allowed
            .into_iter()
            .map(|tag| QName::new(tag.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        if allowed.is_empty() {
            return Err(BindError::Logic(format!(
                "group <{name}> needs at least one allowed tag name"
            )));
        }
        Ok(Self {
            name: QName::new(name)?,
            filter: Filter::Names {
                allowed,
                templates: Vec::new(),
            },
            contained: false,
            items: Vec::new(),
        })
    }

    /// Container group rebuilt from an element of unknown shape.
    ///
    /// Every distinct child name is allowed. Children with element content
    /// become nested generic groups, the rest plain leaves. Attributes of
    /// the element itself are not kept.
    ///
    /// # Errors
    /// `Logic` for names the binding cannot represent; member parse errors.
    pub fn generic(node: XmlNode<'_, '_>) -> Result<Self> {
        let tag = get_tag_name(node);
        if node.attributes().next().is_some() {
            tracing::warn!(tag, "Dropping attributes of generic container");
        }
        let mut allowed = distinct_child_names(node);
        if allowed.is_empty() {
            allowed.push(tag);
        }

        let mut group = Self::named(tag, &allowed)?.contained();
        for child in element_children(node) {
            group.absorb(child)?;
        }
        Ok(group)
    }

    /// Read members named like `template` through a copy of it.
    ///
    /// Without a template a name group only holds leaves and nested
    /// generic groups; payload members need one to survive a round trip.
    ///
    /// # Errors
    /// `Logic` when this is not a name group, the template's name is not
    /// allowed, or the name already has a template.
    ///
    /// # Examples
    /// ```
    /// use xmlbind::catalog::Link;
    /// use xmlbind::collection::Collection;
    /// use xmlbind::payload::Payload;
    ///
    /// let mut links = Collection::named("links", ["link"])
    ///     .unwrap()
    ///     .with_template(Payload::new::<Link>().unwrap())
    ///     .unwrap();
    /// let mut link = Payload::new::<Link>().unwrap();
    /// link.set("href", "https://example.org").unwrap();
    /// links.add_value(link).unwrap();
    /// assert_eq!(links.len(), 1);
    /// ```
    pub fn with_template(mut self, template: impl Into<Node>) -> Result<Self> {
        let template = template.into().clone_empty();
        let tag = template.tag_name().to_string();
        let Filter::Names { allowed, templates } = &mut self.filter else {
            return Err(BindError::Logic(format!(
                "<{}> is not a name group and takes no member templates",
                self.name
            )));
        };
        if !allowed.iter().any(|name| name.local() == tag) {
            return Err(BindError::Logic(format!(
                "template <{tag}> is not an allowed name of group <{}>",
                self.name
            )));
        }
        if templates.iter().any(|t| t.tag_name() == tag) {
            return Err(BindError::Logic(format!(
                "group <{}> already has a template for <{tag}>",
                self.name
            )));
        }
        templates.push(template);
        Ok(self)
    }

    /// Render inside a container element named after the group, and read
    /// from one. A contained group fills a single slot in a payload.
    #[must_use]
    pub fn contained(mut self) -> Self {
        self.contained = true;
        self
    }

    /// Whether the group renders inside its own container element.
    #[must_use]
    pub fn is_contained(&self) -> bool {
        self.contained || matches!(self.filter, Filter::Lines)
    }

    /// Type-filtered group. Each template fixes one allowed [`Kind`] and is
    /// the blueprint for members read from a document.
    ///
    /// # Errors
    /// Returns `Logic` when `templates` is empty.
    pub fn typed(name: &str, templates: Vec<Node>) -> Result<Self> {
        if templates.is_empty() {
            return Err(BindError::Logic(format!(
                "group <{name}> needs at least one allowed kind"
            )));
        }
        let templates = templates.iter().map(Node::clone_empty).collect();
        Ok(Self {
            name: QName::new(name)?,
            filter: Filter::Kinds(templates),
            contained: false,
            items: Vec::new(),
        })
    }

    /// Bind the container name to a namespace URI. The name must be prefixed.
    pub fn namespaced(mut self, uri: &str) -> Result<Self> {
        self.name = QName::namespaced(self.name.qualified(), uri)?;
        Ok(self)
    }

    /// Container name.
    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// Capability tag of this collection.
    #[must_use]
    pub fn kind(&self) -> Kind {
        match self.filter {
            Filter::Lines => Kind::Lines,
            Filter::Names { .. } => Kind::NameGroup,
            Filter::Kinds(_) => Kind::TypeGroup,
        }
    }

    /// Groups render and absorb members straight into their parent; line
    /// lists and contained groups own a container.
    #[must_use]
    pub fn is_group(&self) -> bool {
        !self.is_contained()
    }

    /// Kinds a type-filtered group accepts; empty for other variants.
    #[must_use]
    pub fn allowed_kinds(&self) -> Vec<Kind> {
        match &self.filter {
            Filter::Kinds(templates) => templates.iter().map(Node::kind).collect(),
            _ => Vec::new(),
        }
    }

    /// Whether an element named `tag` belongs to this collection.
    #[must_use]
    pub fn accepts(&self, tag: &str) -> bool {
        if self.is_contained() {
            return self.name.local() == tag;
        }
        self.accepts_member(tag)
    }

    fn accepts_member(&self, tag: &str) -> bool {
        match &self.filter {
            Filter::Lines => false,
            Filter::Names { allowed, .. } => allowed.iter().any(|name| name.local() == tag),
            Filter::Kinds(templates) => templates.iter().any(|t| t.tag_name() == tag),
        }
    }

    /// Number of children.
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Child at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Item> {
        self.items.get(index)
    }

    /// Mutable child at `index`.
    pub fn get_mut(&mut self, index: usize) -> Option<&mut Item> {
        self.items.get_mut(index)
    }

    /// Children in order.
    pub fn items(&self) -> impl Iterator<Item = &Item> {
        self.items.iter()
    }

    /// Lines of a line list, in order.
    pub fn lines_iter(&self) -> impl Iterator<Item = &str> {
        self.items.iter().filter_map(Item::as_line)
    }

    /// Node children of a group, in order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.items.iter().filter_map(Item::as_node)
    }

    /// Replace the child at `index`, or append when `index` is past the end.
    ///
    /// # Errors
    /// Same as [`Collection::add_value`]; the collection is unchanged on error.
    pub fn set(&mut self, index: usize, value: impl Into<Value>) -> Result<()> {
        let item = self.convert(value.into())?;
        match self.items.get_mut(index) {
            Some(slot) => *slot = item,
            None => self.items.push(item),
        }
        Ok(())
    }

    /// Remove the child at `index`, shifting later children left.
    pub fn delete(&mut self, index: usize) -> Option<Item> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    /// Replace all children with `value` (one item or a list).
    ///
    /// `Value::Null` clears the collection. Every item is checked before any
    /// is stored, so a rejected item leaves the previous children intact.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let items = value
            .into()
            .into_items()
            .into_iter()
            .map(|item| self.convert(item))
            .collect::<Result<Vec<_>>>()?;
        self.items = items;
        Ok(())
    }

    /// Append one item, or every item of a list.
    ///
    /// # Errors
    /// `DataType` when an item has the wrong shape, `Constraint` when a
    /// node's name or kind is not allowed.
    pub fn add_value(&mut self, value: impl Into<Value>) -> Result<()> {
        let items = value
            .into()
            .into_items()
            .into_iter()
            .map(|item| self.convert(item))
            .collect::<Result<Vec<_>>>()?;
        self.items.extend(items);
        Ok(())
    }

    /// Remove all children.
    pub fn reset(&mut self) {
        self.items.clear();
    }

    /// Copy with the same filter and no children.
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        Self {
            name: self.name.clone(),
            filter: self.filter.clone(),
            contained: self.contained,
            items: Vec::new(),
        }
    }

    fn convert(&self, value: Value) -> Result<Item> {
        let field = self.name.qualified();
        match (&self.filter, value) {
            (_, Value::List(_)) => Err(BindError::data_type(
                field,
                "nested list",
                "a single item",
            )),
            (Filter::Lines, value) => {
                let line = value.to_text().ok_or_else(|| {
                    BindError::data_type(field, value.to_string(), "a line of text")
                })?;
                validate_xml_text(field, &line)?;
                Ok(Item::Line(line))
            }
            (Filter::Names { allowed, templates }, Value::Node(node)) => {
                let tag = node.tag_name();
                if !allowed.iter().any(|name| name.local() == tag) {
                    return Err(BindError::constraint(
                        field,
                        format!("<{tag}>"),
                        format!("allowed names are {}", join_names(allowed)),
                    ));
                }
                let readable = match templates.iter().find(|t| t.tag_name() == tag) {
                    Some(template) => template.kind() == node.kind(),
                    None => match &*node {
                        Node::Leaf(_) => true,
                        Node::Collection(group) => {
                            group.contained && group.kind() == Kind::NameGroup
                        }
                        Node::Payload(_) => false,
                    },
                };
                if readable {
                    Ok(Item::Node(*node))
                } else {
                    Err(BindError::constraint(
                        field,
                        format!("{} <{tag}>", node.describe()),
                        "no member template of that kind for this name",
                    ))
                }
            }
            (Filter::Names { allowed, templates }, value) => match allowed.as_slice() {
                [only] if value.is_scalar() => {
                    let mut leaf = match templates.first() {
                        Some(Node::Leaf(template)) => template.clone_empty(),
                        Some(other) => {
                            return Err(BindError::data_type(
                                field,
                                value.to_string(),
                                format!("a {} <{}>", other.describe(), other.tag_name()),
                            ))
                        }
                        None => Leaf::constrained(only.clone(), Constraint::None),
                    };
                    leaf.set_value(value)?;
                    Ok(Item::Node(Node::Leaf(leaf)))
                }
                _ => Err(BindError::data_type(
                    field,
                    value.to_string(),
                    "a node with an allowed name",
                )),
            },
            (Filter::Kinds(templates), Value::Node(node)) => {
                let kind = node.kind();
                if templates.iter().any(|t| t.kind() == kind) {
                    Ok(Item::Node(*node))
                } else {
                    Err(BindError::constraint(
                        field,
                        format!("<{}>", node.tag_name()),
                        format!("{kind:?} is not an allowed kind"),
                    ))
                }
            }
            (Filter::Kinds(templates), value) => match templates.as_slice() {
                [Node::Leaf(template)] if value.is_scalar() => {
                    let mut leaf = template.clone_empty();
                    leaf.set_value(value)?;
                    Ok(Item::Node(Node::Leaf(leaf)))
                }
                _ => Err(BindError::data_type(
                    field,
                    value.to_string(),
                    "a node of an allowed kind",
                )),
            },
        }
    }

    /// Read one member element into a group.
    ///
    /// Name groups read a member through its name's template when there is
    /// one, as a nested generic group when it has element content, and as a
    /// plain leaf otherwise.
    ///
    /// # Errors
    /// `Parser` when the element's name is not accepted or, for line lists,
    /// always: lines are read through the container with
    /// [`Parse::parse_node`].
    pub fn absorb(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        let tag = get_tag_name(node);
        let member = match &self.filter {
            Filter::Lines => {
                return Err(BindError::Parser(format!(
                    "line list <{}> cannot absorb <{tag}>",
                    self.name
                )))
            }
            Filter::Names { allowed, templates } => {
                let name = allowed
                    .iter()
                    .find(|name| name.local() == tag)
                    .ok_or_else(|| self.rejected(tag))?;
                if let Some(template) = templates.iter().find(|t| t.tag_name() == tag) {
                    let mut member = template.clone_empty();
                    member.parse_node(node)?;
                    member
                } else if element_children(node).next().is_some() {
                    Node::Collection(Self::generic(node)?)
                } else {
                    let mut leaf = Leaf::constrained(name.clone(), Constraint::None);
                    leaf.parse_node(node)?;
                    Node::Leaf(leaf)
                }
            }
            Filter::Kinds(templates) => {
                let template = templates
                    .iter()
                    .find(|t| t.tag_name() == tag)
                    .ok_or_else(|| self.rejected(tag))?;
                let mut member = template.clone_empty();
                member.parse_node(node)?;
                member
            }
        };
        self.items.push(Item::Node(member));
        Ok(())
    }

    fn rejected(&self, tag: &str) -> BindError {
        BindError::Parser(format!("<{tag}> does not belong in group <{}>", self.name))
    }
}

fn join_names(names: &[QName]) -> String {
    names
        .iter()
        .map(QName::qualified)
        .collect::<Vec<_>>()
        .join(", ")
}

impl Codec for Collection {
    fn tag_name(&self) -> &str {
        self.name.local()
    }

    fn is_defined(&self) -> bool {
        self.items.iter().any(Item::is_defined)
    }

    fn is_valid(&self) -> bool {
        self.is_defined() && self.items.iter().all(Item::is_valid)
    }

    /// Container element. For groups this wraps the members, which is only
    /// used when a group is rendered on its own.
    fn to_element(&self) -> Element {
        let mut element = Element::new(self.name.qualified());
        if let Some((declaration, uri)) = self.name.declaration() {
            element.attributes.insert(declaration, uri.to_string());
        }
        match self.filter {
            Filter::Lines => {
                for (index, line) in self.lines_iter().enumerate() {
                    element.push_child(
                        Element::new(LINE_TAG)
                            .with_attribute(LINE_NUMBER_ATTRIBUTE, (index + 1).to_string())
                            .with_text(line),
                    );
                }
            }
            Filter::Names { .. } | Filter::Kinds(_) => self.append_members(&mut element),
        }
        element
    }

    fn append_to(&self, parent: &mut Element) {
        if self.is_group() {
            self.append_members(parent);
        } else {
            parent.push_child(self.to_element());
        }
    }
}

impl Collection {
    fn append_members(&self, parent: &mut Element) {
        for node in self.nodes().filter(|node| node.is_valid()) {
            node.append_to(parent);
        }
    }
}

impl Parse for Collection {
    /// Read the container element: `<line>` children for a line list,
    /// members for a group. Existing children are replaced.
    fn parse_node(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        let tag = get_tag_name(node);
        if tag != self.name.local() {
            return Err(BindError::Parser(format!(
                "expected <{}>, found <{tag}>",
                self.name.local()
            )));
        }

        let lines = matches!(self.filter, Filter::Lines);
        let mut parsed = self.clone_empty();
        for child in element_children(node) {
            if !lines {
                parsed.absorb(child)?;
            } else if get_tag_name(child) == LINE_TAG {
                parsed.items.push(Item::Line(collect_text(child)));
            } else {
                tracing::warn!(
                    tag = %get_tag_name(child),
                    list = %self.name,
                    "Skipping non-line element in line list"
                );
            }
        }
        *self = parsed;
        Ok(())
    }
}
