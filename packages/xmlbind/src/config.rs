//! Configuration constants, name validation and serialization options.

use regex::Regex;
use std::sync::LazyLock;

use crate::error::{BindError, Result};

/// XML version written in the declaration.
pub const XML_VERSION: &str = "1.0";

/// Encoding written in the declaration when the caller does not choose one.
pub const DEFAULT_ENCODING: &str = "UTF-8";

/// Tag of one rendered entry of a line-list field.
pub const LINE_TAG: &str = "line";

/// Attribute carrying the 1-based position of a rendered line.
pub const LINE_NUMBER_ATTRIBUTE: &str = "number";

/// Length used by a fixed-length field configured with length 0.
pub const DEFAULT_FIXED_LENGTH: usize = 1;

/// Spaces per nesting level when indented output is requested.
pub const INDENT_WIDTH: usize = 2;

/// Non-colonized XML name. Letters and digits may come from any script.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static NCNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[\p{L}_][\p{L}\p{M}\p{N}_.\-\x{B7}]*$").expect("valid regex")
});

/// Optionally prefixed XML name: `local` or `prefix:local`.
#[allow(clippy::expect_used)] // Static regex that is guaranteed to be valid
static QNAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^(?:[\p{L}_][\p{L}\p{M}\p{N}_.\-\x{B7}]*:)?[\p{L}_][\p{L}\p{M}\p{N}_.\-\x{B7}]*$",
    )
    .expect("valid regex")
});

/// Validate a tag name (`local` or `prefix:local`).
///
/// # Examples
/// ```
/// use xmlbind::config::validate_tag_name;
///
/// assert!(validate_tag_name("note").is_ok());
/// assert!(validate_tag_name("vnd:note").is_ok());
/// assert!(validate_tag_name("1note").is_err());
/// ```
pub fn validate_tag_name(name: &str) -> Result<()> {
    if QNAME_PATTERN.is_match(name) {
        Ok(())
    } else {
        Err(BindError::Logic(format!("'{name}' is not a valid tag name")))
    }
}

/// Check that a name is a plain (unprefixed) XML name.
///
/// Attribute names use this: attributes are never namespace-qualified.
#[must_use]
pub fn is_ncname(name: &str) -> bool {
    NCNAME_PATTERN.is_match(name)
}

/// Whether `c` may appear in an XML 1.0 document.
#[must_use]
pub fn is_xml_char(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n'
            | '\r'
            | '\u{20}'..='\u{D7FF}'
            | '\u{E000}'..='\u{FFFD}'
            | '\u{10000}'..='\u{10FFFF}'
    )
}

/// Check text bound for a document: text, attribute value or line.
///
/// # Errors
/// Returns `DataType` when `text` holds a character XML 1.0 forbids.
///
/// # Examples
/// ```
/// use xmlbind::config::validate_xml_text;
///
/// assert!(validate_xml_text("memo", "tab\tok").is_ok());
/// assert!(validate_xml_text("memo", "bell\u{7}").is_err());
/// ```
pub fn validate_xml_text(field: &str, text: &str) -> Result<()> {
    match text.chars().find(|c| !is_xml_char(*c)) {
        None => Ok(()),
        Some(c) => Err(BindError::data_type(
            field,
            text.escape_debug().to_string(),
            format!("text without the forbidden character {c:?}"),
        )),
    }
}

/// Options for turning a payload into a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SerializeOptions {
    /// Encoding named in the XML declaration.
    pub encoding: String,

    /// Indent nested elements instead of writing one line.
    pub indent: bool,

    /// Refuse to serialize a payload whose business rules do not hold.
    pub validate: bool,
}

impl SerializeOptions {
    /// Default options: UTF-8, compact, no validation gate.
    #[must_use]
    pub fn new() -> Self {
        Self {
            encoding: DEFAULT_ENCODING.to_string(),
            indent: false,
            validate: false,
        }
    }

    /// Set the declared encoding.
    #[must_use]
    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.encoding = encoding.into();
        self
    }

    /// Enable or disable indentation.
    #[must_use]
    pub fn with_indent(mut self, indent: bool) -> Self {
        self.indent = indent;
        self
    }

    /// Enable or disable the payload validity gate.
    #[must_use]
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }
}

impl Default for SerializeOptions {
    fn default() -> Self {
        Self::new()
    }
}
