//! Error types for the binding layer.
//!
//! Every failure falls into one of five categories: a value that cannot be
//! converted, a value that converts but breaks a field rule, a structural
//! mismatch between schema and document, an unknown field, or a bug in a
//! schema definition. `BindError` carries the detail, `ErrorCategory` the
//! coarse classification.

use thiserror::Error;

/// Main error type for the binding library.
#[derive(Debug, Error)]
pub enum BindError {
    /// Value cannot be converted to the representation the field requires.
    #[error("Cannot store {value} in <{field}>: expected {expected}")]
    DataType {
        field: String,
        value: String,
        expected: String,
    },

    /// Value converts fine but fails a field-specific rule.
    #[error("Value '{value}' rejected by <{field}>: {reason}")]
    Constraint {
        field: String,
        value: String,
        reason: String,
    },

    /// Schema and document do not line up, or a payload refused to serialize.
    #[error("Parser error: {0}")]
    Parser(String),

    /// Unknown field requested by name or alias.
    #[error("No field '{name}' in <{payload}>")]
    NotFound { name: String, payload: String },

    /// Schema-definition bug (duplicate alias, empty enumeration, ...).
    #[error("Schema definition error: {0}")]
    Logic(String),

    /// Input is not well-formed XML.
    #[error("XML parsing failed: {0}")]
    Xml(#[from] roxmltree::Error),

    /// Writing the XML output failed.
    #[error("XML writing failed: {0}")]
    Write(String),

    /// Response bytes are not valid UTF-8.
    #[error("Invalid UTF-8 in document: {0}")]
    Encoding(#[from] std::str::Utf8Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a [`BindError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    DataType,
    Constraint,
    Parser,
    NotFound,
    Logic,
    Io,
}

impl BindError {
    /// Build a `DataType` error.
    pub fn data_type(
        field: impl Into<String>,
        value: impl Into<String>,
        expected: impl Into<String>,
    ) -> Self {
        Self::DataType {
            field: field.into(),
            value: value.into(),
            expected: expected.into(),
        }
    }

    /// Build a `Constraint` error.
    pub fn constraint(
        field: impl Into<String>,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Constraint {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Classify the error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::DataType { .. } => ErrorCategory::DataType,
            Self::Constraint { .. } => ErrorCategory::Constraint,
            Self::Parser(_) | Self::Xml(_) | Self::Encoding(_) => ErrorCategory::Parser,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::Logic(_) => ErrorCategory::Logic,
            Self::Write(_) | Self::Io(_) => ErrorCategory::Io,
        }
    }
}

/// Result type alias for binding operations.
pub type Result<T> = std::result::Result<T, BindError>;
