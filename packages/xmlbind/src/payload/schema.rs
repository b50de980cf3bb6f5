//! Definition-time description of a concrete payload type.

use indexmap::IndexMap;

use super::{Payload, Rule};
use crate::error::{BindError, Result};
use crate::node::{Codec, Node};

/// How a payload lays out its leaf fields.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Layout {
    /// Every field is a child element.
    #[default]
    Elements,
    /// Leaf fields are attributes of the payload's own element; other
    /// fields stay child elements.
    Attributes,
}

/// A concrete payload type.
///
/// Implementors are zero-sized marker types. [`Payload::new`] builds an
/// instance from the associated constants and [`PayloadKind::define`].
///
/// # Examples
/// ```
/// use xmlbind::element::Leaf;
/// use xmlbind::payload::{Payload, PayloadKind, Rule, Schema};
/// use xmlbind::{Codec, Result};
///
/// struct Contact;
///
/// impl PayloadKind for Contact {
///     const NAME: &'static str = "contact";
///
///     fn define(schema: &mut Schema) -> Result<()> {
///         schema
///             .field(Leaf::new("name")?)?
///             .aliased("mail", Leaf::pattern("email", r"^\S+@\S+$")?)?;
///         Ok(())
///     }
///
///     fn rule() -> Rule {
///         Rule::required(&["name"])
///     }
/// }
///
/// let mut contact = Payload::new::<Contact>().unwrap();
/// contact.set("name", "Ada").unwrap();
/// contact.set("mail", "ada@example.org").unwrap();
/// assert!(contact.is_valid());
/// ```
pub trait PayloadKind: 'static {
    /// Root tag, `local` or `prefix:local`.
    const NAME: &'static str;

    /// Namespace URI of the root element.
    const NAMESPACE: Option<&'static str> = None;

    const LAYOUT: Layout = Layout::Elements;

    /// Whether the kind can be serialized as a document of its own.
    const STANDALONE: bool = true;

    /// Register the fields, in document order.
    ///
    /// # Errors
    /// `Logic` for schema mistakes such as duplicate aliases.
    fn define(schema: &mut Schema) -> Result<()>;

    /// Business rule deciding [`Payload::is_valid`].
    fn rule() -> Rule {
        Rule::Fields
    }
}

/// Ordered field registry filled by [`PayloadKind::define`].
#[derive(Debug)]
pub struct Schema {
    payload: &'static str,
    fields: IndexMap<String, Node>,
}

impl Schema {
    pub(crate) fn new(payload: &'static str) -> Self {
        Self {
            payload,
            fields: IndexMap::new(),
        }
    }

    /// Register a field under `alias`, or under its own tag name.
    ///
    /// # Errors
    /// Returns `Logic` when the alias is already taken.
    pub fn create(&mut self, field: impl Into<Node>, alias: Option<&str>) -> Result<&mut Self> {
        let field = field.into();
        let alias = alias.unwrap_or_else(|| field.tag_name()).to_string();
        if self.fields.contains_key(&alias) {
            return Err(BindError::Logic(format!(
                "duplicate field alias '{alias}' in <{}>",
                self.payload
            )));
        }
        self.fields.insert(alias, field);
        Ok(self)
    }

    /// Register a field under its own tag name.
    pub fn field(&mut self, field: impl Into<Node>) -> Result<&mut Self> {
        self.create(field, None)
    }

    /// Register a field under an alias.
    pub fn aliased(&mut self, alias: &str, field: impl Into<Node>) -> Result<&mut Self> {
        self.create(field, Some(alias))
    }

    /// Register an empty nested payload of kind `K`.
    pub fn nested<K: PayloadKind>(&mut self, alias: Option<&str>) -> Result<&mut Self> {
        self.create(Payload::new::<K>()?, alias)
    }

    pub(crate) fn into_fields(self) -> IndexMap<String, Node> {
        self.fields
    }
}
