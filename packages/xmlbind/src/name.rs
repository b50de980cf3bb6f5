//! Tag names with optional namespace.

use std::fmt;

use crate::config::validate_tag_name;
use crate::error::{BindError, Result};

/// Tag name of a node: local part, optional prefix and namespace URI.
///
/// A namespace URI can only be attached to a prefixed name, so the element
/// can declare `xmlns:prefix` on itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    qualified: String,
    prefix_len: usize,
    namespace: Option<String>,
}

impl QName {
    /// Create a name without namespace.
    ///
    /// # Errors
    /// Returns `Logic` if `name` is not a valid tag name.
    pub fn new(name: &str) -> Result<Self> {
        Self::build(name, None)
    }

    /// Create a name bound to a namespace URI; `name` must be `prefix:local`.
    ///
    /// # Examples
    /// ```
    /// use xmlbind::name::QName;
    ///
    /// let name = QName::namespaced("vnd:subject", "urn:example:vnd").unwrap();
    /// assert_eq!(name.local(), "subject");
    /// assert_eq!(name.prefix(), Some("vnd"));
    /// assert!(QName::namespaced("subject", "urn:example:vnd").is_err());
    /// ```
    pub fn namespaced(name: &str, namespace: &str) -> Result<Self> {
        Self::build(name, Some(namespace))
    }

    fn build(name: &str, namespace: Option<&str>) -> Result<Self> {
        validate_tag_name(name)?;
        let prefix_len = name.find(':').unwrap_or(0);

        let namespace = match namespace {
            Some(uri) if uri.is_empty() => {
                return Err(BindError::Logic(format!(
                    "empty namespace URI for <{name}>"
                )))
            }
            Some(_) if prefix_len == 0 => {
                return Err(BindError::Logic(format!(
                    "<{name}> has a namespace but no prefix; use 'prefix:{name}'"
                )))
            }
            other => other.map(str::to_string),
        };

        Ok(Self {
            qualified: name.to_string(),
            prefix_len,
            namespace,
        })
    }

    /// Local part of the name.
    #[must_use]
    pub fn local(&self) -> &str {
        if self.prefix_len == 0 {
            &self.qualified
        } else {
            &self.qualified[self.prefix_len + 1..]
        }
    }

    /// Prefix, if the name is prefixed.
    #[must_use]
    pub fn prefix(&self) -> Option<&str> {
        (self.prefix_len > 0).then(|| &self.qualified[..self.prefix_len])
    }

    /// The name as written in a document.
    #[must_use]
    pub fn qualified(&self) -> &str {
        &self.qualified
    }

    /// Namespace URI bound to the prefix.
    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// The `xmlns` declaration this element carries, if any.
    #[must_use]
    pub fn declaration(&self) -> Option<(String, &str)> {
        let uri = self.namespace.as_deref()?;
        let prefix = self.prefix()?;
        Some((format!("xmlns:{prefix}"), uri))
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.qualified)
    }
}
