//! Serialize an [`Element`] tree with quick-xml.

use std::borrow::Cow;
use std::fmt::Display;

use quick_xml::escape::escape;
use quick_xml::events::attributes::Attribute;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::name::QName;
use quick_xml::Writer;

use super::element::{Content, Element};
use crate::config::{SerializeOptions, INDENT_WIDTH, XML_VERSION};
use crate::error::{BindError, Result};

/// Write a complete document: XML declaration followed by `root`.
///
/// The declaration names `options.encoding`; the returned string itself is
/// always UTF-8.
///
/// # Examples
/// ```
/// use xmlbind::config::SerializeOptions;
/// use xmlbind::xml::{write_document, Element};
///
/// let root = Element::new("note").with_text("a < b");
/// let xml = write_document(&root, &SerializeOptions::default()).unwrap();
/// assert_eq!(xml, r#"<?xml version="1.0" encoding="UTF-8"?><note>a &lt; b</note>"#);
/// ```
pub fn write_document(root: &Element, options: &SerializeOptions) -> Result<String> {
    let mut writer = new_writer(options.indent);
    emit(
        &mut writer,
        Event::Decl(BytesDecl::new(XML_VERSION, Some(&options.encoding), None)),
    )?;
    write_element(&mut writer, root)?;
    finish(writer)
}

/// Write a single element without declaration.
pub fn write_fragment(element: &Element, indent: bool) -> Result<String> {
    let mut writer = new_writer(indent);
    write_element(&mut writer, element)?;
    finish(writer)
}

fn new_writer(indent: bool) -> Writer<Vec<u8>> {
    if indent {
        Writer::new_with_indent(Vec::new(), b' ', INDENT_WIDTH)
    } else {
        Writer::new(Vec::new())
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<()> {
    let mut start = BytesStart::new(element.name.as_str());
    for (name, value) in &element.attributes {
        start.push_attribute(Attribute {
            key: QName(name.as_bytes()),
            value: Cow::Owned(escape_attribute(value).into_bytes()),
        });
    }

    if element.children.is_empty() {
        return emit(writer, Event::Empty(start));
    }

    emit(writer, Event::Start(start))?;
    for child in &element.children {
        match child {
            Content::Element(nested) => write_element(writer, nested)?,
            Content::Text(text) => {
                emit(writer, Event::Text(BytesText::from_escaped(escape_text(text))))?;
            }
        }
    }
    emit(writer, Event::End(BytesEnd::new(element.name.as_str())))
}

/// Readers normalize raw tab, newline and carriage return in attribute
/// values to spaces, so they are written as character references.
fn escape_attribute(value: &str) -> String {
    escape(value)
        .replace('\t', "&#9;")
        .replace('\n', "&#10;")
        .replace('\r', "&#13;")
}

/// Readers turn a raw carriage return in text into a newline.
fn escape_text(text: &str) -> String {
    escape(text).replace('\r', "&#13;")
}

fn emit(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<()> {
    writer.write_event(event).map_err(write_error)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<String> {
    String::from_utf8(writer.into_inner()).map_err(write_error)
}

fn write_error(err: impl Display) -> BindError {
    BindError::Write(err.to_string())
}
