//! Document loading through a [`Registry`].

use roxmltree::{Document, Node as XmlNode};

use super::Registry;
use crate::collection::Collection;
use crate::error::Result;
use crate::node::{Codec, Parse};
use crate::payload::Payload;
use crate::xml::{distinct_child_names, element_children, get_tag_name, Element};

/// A loaded document.
#[derive(Debug, Clone)]
pub enum Loaded {
    /// The root was a registered payload kind.
    Known(Payload),
    /// Unknown root, held as a name-filtered group of its children.
    /// Nested unknown elements are contained groups inside it.
    Generic(Collection),
}

impl Loaded {
    /// Local root name.
    #[must_use]
    pub fn tag_name(&self) -> &str {
        match self {
            Loaded::Known(payload) => payload.tag_name(),
            Loaded::Generic(group) => group.tag_name(),
        }
    }

    #[must_use]
    pub fn is_known(&self) -> bool {
        matches!(self, Loaded::Known(_))
    }

    #[must_use]
    pub fn as_payload(&self) -> Option<&Payload> {
        match self {
            Loaded::Known(payload) => Some(payload),
            Loaded::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn into_payload(self) -> Option<Payload> {
        match self {
            Loaded::Known(payload) => Some(payload),
            Loaded::Generic(_) => None,
        }
    }

    #[must_use]
    pub fn is_defined(&self) -> bool {
        match self {
            Loaded::Known(payload) => payload.is_defined(),
            Loaded::Generic(group) => group.is_defined(),
        }
    }

    #[must_use]
    pub fn is_valid(&self) -> bool {
        match self {
            Loaded::Known(payload) => payload.is_valid(),
            Loaded::Generic(group) => group.is_valid(),
        }
    }

    /// Element form; a generic group renders with its container.
    #[must_use]
    pub fn to_element(&self) -> Element {
        match self {
            Loaded::Known(payload) => payload.to_element(),
            Loaded::Generic(group) => group.to_element(),
        }
    }
}

/// Load a document, dispatching on its root tag.
///
/// # Examples
/// ```
/// use xmlbind::catalog;
/// use xmlbind::registry::load_document;
///
/// let registry = catalog::registry().unwrap();
/// let loaded = load_document(&registry, "<inventory><item>a</item></inventory>").unwrap();
/// assert!(!loaded.is_known());
/// assert_eq!(loaded.tag_name(), "inventory");
/// ```
///
/// # Errors
/// `Xml` for malformed input; parse errors of the selected payload.
pub fn load_document(registry: &Registry, xml: &str) -> Result<Loaded> {
    let document = Document::parse(xml)?;
    load_node(registry, document.root_element())
}

/// Load raw response bytes, which must be UTF-8.
///
/// # Errors
/// `Encoding` for invalid UTF-8, otherwise as [`load_document`].
pub fn load_response(registry: &Registry, bytes: &[u8]) -> Result<Loaded> {
    let xml = std::str::from_utf8(bytes)?;
    load_document(registry, xml)
}

fn load_node(registry: &Registry, node: XmlNode<'_, '_>) -> Result<Loaded> {
    let tag = get_tag_name(node);
    if let Some(mut payload) = registry.construct(tag)? {
        payload.parse_node(node)?;
        return Ok(Loaded::Known(payload));
    }

    tracing::debug!(tag, "No payload kind registered, loading generic group");
    generic_group(registry, node).map(Loaded::Generic)
}

/// Group named after the root that allows every distinct child name.
///
/// Children with a registered kind are parsed as payloads, unknown children
/// with element content become nested contained groups built the same way,
/// and the rest are plain leaves.
fn generic_group(registry: &Registry, node: XmlNode<'_, '_>) -> Result<Collection> {
    let tag = get_tag_name(node);
    let names = distinct_child_names(node);
    let allowed = if names.is_empty() { vec![tag] } else { names.clone() };

    let mut group = Collection::named(tag, &allowed)?;
    for name in names {
        if let Some(template) = registry.construct(name)? {
            group = group.with_template(template)?;
        }
    }

    for child in element_children(node) {
        let nested = !registry.has_kind(get_tag_name(child))
            && element_children(child).next().is_some();
        if nested {
            group.add_value(generic_group(registry, child)?.contained())?;
        } else {
            group.absorb(child)?;
        }
    }
    Ok(group)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog;
    use crate::error::ErrorCategory;
    use crate::xml::write_fragment;

    fn registry() -> Registry {
        catalog::registry().unwrap()
    }

    #[test]
    fn test_known_root() {
        let xml = r#"<note xmlns="urn:xmlbind:note"><subject>s</subject><category>NONE</category></note>"#;
        let loaded = load_document(&registry(), xml).unwrap();
        assert!(loaded.is_known());
        let note = loaded.into_payload().unwrap();
        assert_eq!(note.value("category").unwrap(), "NONE");
    }

    #[test]
    fn test_unknown_root_falls_back_to_group() {
        let xml = "<list><entry>a</entry><entry>b</entry><other>c</other></list>";
        let Loaded::Generic(group) = load_document(&registry(), xml).unwrap() else {
            panic!("expected a generic group");
        };
        assert_eq!(group.len(), 3);
        assert!(group.accepts("entry"));
        assert!(group.accepts("other"));
    }

    #[test]
    fn test_generic_group_holds_known_children() {
        let xml = r#"<batch><note xmlns="urn:xmlbind:note"><subject>s</subject></note></batch>"#;
        let Loaded::Generic(group) = load_document(&registry(), xml).unwrap() else {
            panic!("expected a generic group");
        };
        let first = group.nodes().next().unwrap();
        assert_eq!(first.as_payload().unwrap().value("subject").unwrap(), "s");
    }

    #[test]
    fn test_generic_group_holds_nested_unknown_children() {
        let xml = concat!(
            "<error><code>E1</code>",
            "<components><component>x</component><component>y</component></components>",
            "</error>"
        );
        let Loaded::Generic(group) = load_document(&registry(), xml).unwrap() else {
            panic!("expected a generic group");
        };
        assert_eq!(group.len(), 2);
        let components = group.nodes().nth(1).unwrap().as_collection().unwrap();
        assert_eq!(components.len(), 2);
        assert_eq!(write_fragment(&group.to_element(), false).unwrap(), xml);
    }

    #[test]
    fn test_generic_group_keeps_known_kinds_when_nested() {
        let xml = concat!(
            "<batch><day>",
            r#"<note xmlns="urn:xmlbind:note"><subject>s</subject></note>"#,
            "</day></batch>"
        );
        let Loaded::Generic(group) = load_document(&registry(), xml).unwrap() else {
            panic!("expected a generic group");
        };
        let day = group.nodes().next().unwrap().as_collection().unwrap();
        let note = day.nodes().next().unwrap().as_payload().unwrap();
        assert_eq!(note.value("subject").unwrap(), "s");
    }

    #[test]
    fn test_generic_group_accepts_unicode_names() {
        let loaded = load_document(&registry(), "<données><élément>x</élément></données>").unwrap();
        assert_eq!(loaded.tag_name(), "données");
        assert!(loaded.is_valid());
    }

    #[test]
    fn test_empty_unknown_root() {
        let loaded = load_document(&registry(), "<empty/>").unwrap();
        assert!(!loaded.is_defined());
        assert!(!loaded.is_valid());
    }

    #[test]
    fn test_load_response_rejects_invalid_utf8() {
        let err = load_response(&registry(), &[0x3c, 0xff, 0xfe]).unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parser);
    }

    #[test]
    fn test_malformed_document() {
        let err = load_document(&registry(), "<open>").unwrap_err();
        assert_eq!(err.category(), ErrorCategory::Parser);
    }
}
