//! Leaf elements: one named field holding a single text value.
//!
//! A leaf carries an ordered attribute map and a [`Constraint`] fixed at
//! construction. Every value goes through the constraint before it is
//! stored, and a rejected value leaves the previous one in place, so the
//! stored text is always the canonical form of an accepted value.

pub mod address;
mod constraint;

use indexmap::IndexMap;
use roxmltree::Node as XmlNode;

pub use address::Padding;
pub use constraint::Constraint;

use crate::config::{is_ncname, validate_xml_text};
use crate::error::{BindError, Result};
use crate::name::QName;
use crate::node::{Codec, Parse};
use crate::value::Value;
use crate::xml::{collect_text, get_tag_name, Element};

/// Atomic named field.
#[derive(Debug, Clone)]
pub struct Leaf {
    name: QName,
    attributes: IndexMap<String, String>,
    text: String,
    constraint: Constraint,
}

impl Leaf {
    /// Create an unconstrained leaf.
    ///
    /// # Examples
    /// ```
    /// use xmlbind::element::Leaf;
    /// use xmlbind::node::Codec;
    ///
    /// let mut subject = Leaf::new("subject").unwrap();
    /// subject.set_value("Hello").unwrap();
    /// assert_eq!(subject.value(), "Hello");
    /// assert!(subject.is_defined());
    /// ```
    pub fn new(name: &str) -> Result<Self> {
        Ok(Self::constrained(QName::new(name)?, Constraint::None))
    }

    /// Create a leaf with an explicit name and constraint.
    #[must_use]
    pub fn constrained(name: QName, constraint: Constraint) -> Self {
        Self {
            name,
            attributes: IndexMap::new(),
            text: String::new(),
            constraint,
        }
    }

    /// Boolean leaf.
    pub fn boolean(name: &str) -> Result<Self> {
        Ok(Self::constrained(QName::new(name)?, Constraint::Boolean))
    }

    /// Unbounded integer leaf.
    pub fn integer(name: &str) -> Result<Self> {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::integer(None, None),
        ))
    }

    /// Integer leaf accepting `min..=max`; reversed bounds are swapped.
    pub fn integer_range(name: &str, min: i64, max: i64) -> Result<Self> {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::integer(Some(min), Some(max)),
        ))
    }

    /// Selection leaf.
    ///
    /// # Errors
    /// Returns `Logic` for an empty list of options.
    pub fn selection<I, S>(name: &str, options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::selection(options)?,
        ))
    }

    /// Fixed-length leaf.
    pub fn fixed_length(name: &str, length: usize) -> Result<Self> {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::fixed_length(length),
        ))
    }

    /// Pattern leaf.
    ///
    /// # Errors
    /// Returns `Logic` if the pattern does not compile.
    pub fn pattern(name: &str, pattern: &str) -> Result<Self> {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::pattern(pattern)?,
        ))
    }

    /// IP address leaf with a default output padding.
    pub fn ip_address(name: &str, padding: Padding) -> Result<Self> {
        Ok(Self::constrained(
            QName::new(name)?,
            Constraint::IpAddress(padding),
        ))
    }

    /// Bind the leaf to a namespace URI. The name must be prefixed.
    ///
    /// # Errors
    /// Returns `Logic` if the name has no prefix.
    pub fn namespaced(mut self, uri: &str) -> Result<Self> {
        self.name = QName::namespaced(self.name.qualified(), uri)?;
        Ok(self)
    }

    /// Full name of the leaf.
    #[must_use]
    pub fn name(&self) -> &QName {
        &self.name
    }

    /// The rule this leaf enforces.
    #[must_use]
    pub fn constraint(&self) -> &Constraint {
        &self.constraint
    }

    /// Stored text; empty when undefined.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.text
    }

    /// Stored text, `None` when undefined.
    #[must_use]
    pub fn get(&self) -> Option<&str> {
        (!self.text.is_empty()).then_some(self.text.as_str())
    }

    /// Stored value read back as a boolean.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self.text.as_str() {
            "true" => Some(true),
            "false" => Some(false),
            _ => None,
        }
    }

    /// Stored value read back as an integer.
    #[must_use]
    pub fn as_int(&self) -> Option<i64> {
        self.text.parse().ok()
    }

    /// Store a value. `Value::Null`, and any value whose accepted text is
    /// empty, returns the leaf to its freshly built state, attributes
    /// included.
    ///
    /// # Errors
    /// `DataType` or `Constraint` when the value is rejected; the previous
    /// value is kept.
    pub fn set_value(&mut self, value: impl Into<Value>) -> Result<()> {
        self.store(&value.into(), None)
    }

    /// Same as [`Leaf::set_value`]: a leaf holds one value.
    pub fn add_value(&mut self, value: impl Into<Value>) -> Result<()> {
        self.set_value(value)
    }

    /// Store an address using `padding` instead of the leaf's default.
    ///
    /// Only meaningful for address leaves; other kinds ignore `padding`.
    pub fn set_address(&mut self, value: impl Into<Value>, padding: Padding) -> Result<()> {
        self.store(&value.into(), Some(padding))
    }

    fn store(&mut self, value: &Value, padding: Option<Padding>) -> Result<()> {
        match self
            .constraint
            .apply(self.name.qualified(), value, padding)?
        {
            Some(text) if !text.is_empty() => self.text = text,
            _ => self.reset(),
        }
        Ok(())
    }

    /// Get an attribute.
    #[must_use]
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    /// Set an attribute, keeping its position if it already exists.
    ///
    /// # Errors
    /// Returns `Constraint` for names that are not plain XML names;
    /// attributes are never namespace-qualified. Returns `DataType` for
    /// values holding characters XML forbids.
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if !is_ncname(name) {
            return Err(BindError::constraint(
                self.name.qualified(),
                name,
                "attribute names must be unprefixed XML names",
            ));
        }
        let value = value.into();
        validate_xml_text(self.name.qualified(), &value)?;
        self.attributes.insert(name.to_string(), value);
        Ok(())
    }

    /// Remove an attribute, returning its value.
    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        self.attributes.shift_remove(name)
    }

    /// Attributes in insertion order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &str)> {
        self.attributes
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Clear text and attributes.
    pub fn reset(&mut self) {
        self.text.clear();
        self.attributes.clear();
    }

    /// Copy of this leaf with no value and no attributes.
    #[must_use]
    pub fn clone_empty(&self) -> Self {
        Self {
            name: self.name.clone(),
            attributes: IndexMap::new(),
            text: String::new(),
            constraint: self.constraint.clone(),
        }
    }
}

impl Codec for Leaf {
    fn tag_name(&self) -> &str {
        self.name.local()
    }

    fn is_defined(&self) -> bool {
        !self.text.is_empty()
    }

    fn is_valid(&self) -> bool {
        self.is_defined()
    }

    fn to_element(&self) -> Element {
        let mut element = Element::new(self.name.qualified());
        if let Some((declaration, uri)) = self.name.declaration() {
            element.attributes.insert(declaration, uri.to_string());
        }
        for (name, value) in &self.attributes {
            element.attributes.insert(name.clone(), value.clone());
        }
        element.with_text(self.text.as_str())
    }
}

impl Parse for Leaf {
    fn parse_node(&mut self, node: XmlNode<'_, '_>) -> Result<()> {
        let tag = get_tag_name(node);
        if tag != self.tag_name() {
            return Err(BindError::Parser(format!(
                "expected <{}>, found <{tag}>",
                self.tag_name()
            )));
        }

        // An empty element carries no value, not an empty one.
        let text = collect_text(node);
        self.set_value(if text.is_empty() {
            Value::Null
        } else {
            Value::Text(text)
        })?;
        self.attributes.clear();
        for attribute in node.attributes() {
            self.attributes
                .insert(attribute.name().to_string(), attribute.value().to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorCategory;
    use crate::xml::write_fragment;

    #[test]
    fn test_set_value_stringifies_scalars() {
        let mut leaf = Leaf::new("value").unwrap();
        leaf.set_value(42).unwrap();
        assert_eq!(leaf.value(), "42");
        leaf.set_value(true).unwrap();
        assert_eq!(leaf.value(), "true");
        leaf.set_value(2.5).unwrap();
        assert_eq!(leaf.value(), "2.5");
    }

    #[test]
    fn test_null_resets_and_is_idempotent() {
        let mut leaf = Leaf::new("value").unwrap();
        leaf.set_value("x").unwrap();
        leaf.set_value(Value::Null).unwrap();
        assert!(!leaf.is_defined());
        leaf.set_value(Value::Null).unwrap();
        assert_eq!(leaf.value(), "");
        assert_eq!(leaf.get(), None);
    }

    #[test]
    fn test_add_value_overwrites() {
        let mut leaf = Leaf::new("value").unwrap();
        leaf.add_value("one").unwrap();
        leaf.add_value("two").unwrap();
        assert_eq!(leaf.value(), "two");
    }

    #[test]
    fn test_non_scalar_is_data_type_error() {
        let mut leaf = Leaf::new("value").unwrap();
        let err = leaf.set_value(vec![1, 2]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DataType);
    }

    #[test]
    fn test_rejected_value_keeps_previous() {
        let mut country = Leaf::fixed_length("country", 3).unwrap();
        country.set_value("USA").unwrap();
        assert!(country.set_value("US").is_err());
        assert_eq!(country.value(), "USA");
        assert!(country.is_valid());
    }

    #[test]
    fn test_boolean_null_is_undefined_not_false() {
        let mut flag = Leaf::boolean("enabled").unwrap();
        flag.set_value(false).unwrap();
        assert_eq!(flag.as_bool(), Some(false));
        assert!(flag.is_defined());
        flag.set_value(Value::Null).unwrap();
        assert_eq!(flag.as_bool(), None);
        assert!(!flag.is_defined());
    }

    #[test]
    fn test_integer_range_boundaries() {
        let mut port = Leaf::integer_range("port", 1, 65535).unwrap();
        assert!(port.set_value(1).is_ok());
        assert!(port.set_value(65535).is_ok());
        assert!(port.set_value(0).is_err());
        assert!(port.set_value(65536).is_err());
        assert_eq!(port.as_int(), Some(65535));
    }

    #[test]
    fn test_ip_address_padding_modes() {
        let mut address = Leaf::ip_address("address", Padding::Unpadded).unwrap();
        address.set_value("192.168.001.010").unwrap();
        assert_eq!(address.value(), "192.168.1.10");
        address.set_address("127.0.0.1", Padding::Padded).unwrap();
        assert_eq!(address.value(), "127.000.000.001");
    }

    #[test]
    fn test_attributes_keep_order() {
        let mut leaf = Leaf::new("value").unwrap();
        leaf.set_attribute("b", "2").unwrap();
        leaf.set_attribute("a", "1").unwrap();
        leaf.set_attribute("b", "3").unwrap();
        let attrs: Vec<_> = leaf.attributes().collect();
        assert_eq!(attrs, vec![("b", "3"), ("a", "1")]);
        assert_eq!(leaf.remove_attribute("b").as_deref(), Some("3"));
        assert_eq!(leaf.attribute("b"), None);
        assert!(leaf.set_attribute("x:y", "1").is_err());
    }

    #[test]
    fn test_clone_empty_resets_value_and_attributes() {
        let mut leaf = Leaf::selection("category", ["NONE", "JUSTIFICATION"]).unwrap();
        leaf.set_value("NONE").unwrap();
        leaf.set_attribute("lang", "en").unwrap();
        let copy = leaf.clone_empty();
        assert!(!copy.is_defined());
        assert_eq!(copy.attributes().count(), 0);
        assert_eq!(copy.constraint().name(), "selection");
        assert_eq!(leaf.value(), "NONE");
    }

    #[test]
    fn test_to_element_namespaced_with_plain_attributes() {
        let mut leaf = Leaf::new("x:flag").unwrap().namespaced("urn:x").unwrap();
        leaf.set_value("on").unwrap();
        leaf.set_attribute("source", "user").unwrap();
        let xml = write_fragment(&leaf.to_element(), false).unwrap();
        assert_eq!(xml, r#"<x:flag xmlns:x="urn:x" source="user">on</x:flag>"#);
    }

    #[test]
    fn test_parse_node_round_trip() {
        let mut leaf = Leaf::integer("size").unwrap();
        leaf.set_value(12).unwrap();
        leaf.set_attribute("unit", "kb").unwrap();
        let xml = write_fragment(&leaf.to_element(), false).unwrap();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut parsed = leaf.clone_empty();
        parsed.parse_node(doc.root_element()).unwrap();
        assert_eq!(parsed.value(), "12");
        assert_eq!(parsed.attribute("unit"), Some("kb"));
    }

    #[test]
    fn test_parse_node_wrong_tag() {
        let doc = roxmltree::Document::parse("<other>1</other>").unwrap();
        let mut leaf = Leaf::new("size").unwrap();
        let err = leaf.parse_node(doc.root_element()).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parser);
    }

    #[test]
    fn test_forbidden_characters_are_rejected() {
        let mut leaf = Leaf::new("note").unwrap();
        leaf.set_value("ring").unwrap();
        let err = leaf.set_value("bell\u{7}").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DataType);
        assert_eq!(leaf.value(), "ring");

        let err = leaf.set_attribute("memo", "nul\0").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::DataType);
        assert_eq!(leaf.attribute("memo"), None);

        let mut code = Leaf::pattern("code", r"^.+$").unwrap();
        assert!(code.set_value("\u{1B}[0m").is_err());
    }

    #[test]
    fn test_accepted_empty_text_resets() {
        let mut digits = Leaf::pattern("d", r"^\d*$").unwrap();
        digits.set_value("12").unwrap();
        digits.set_attribute("unit", "kb").unwrap();
        digits.set_value("").unwrap();
        assert_eq!(digits.get(), None);
        assert_eq!(digits.attributes().count(), 0);
        assert!(!digits.is_valid());

        digits.set_value("7").unwrap();
        assert!(digits.is_valid());
    }

    #[test]
    fn test_whitespace_controls_round_trip() {
        let mut leaf = Leaf::new("memo").unwrap();
        leaf.set_value("a\r\nb\rc\td\n").unwrap();
        leaf.set_attribute("note", "line1\nline2\tend\r").unwrap();
        let xml = write_fragment(&leaf.to_element(), false).unwrap();

        let doc = roxmltree::Document::parse(&xml).unwrap();
        let mut parsed = leaf.clone_empty();
        parsed.parse_node(doc.root_element()).unwrap();
        assert_eq!(parsed.value(), "a\r\nb\rc\td\n");
        assert_eq!(parsed.attribute("note"), Some("line1\nline2\tend\r"));
    }
}
