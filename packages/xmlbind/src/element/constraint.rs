//! Construction-time rules attached to a leaf.

use std::fmt;

use regex::Regex;

use super::address::{format_address, parse_address, Padding};
use crate::config::{validate_xml_text, DEFAULT_FIXED_LENGTH};
use crate::error::{BindError, Result};
use crate::value::Value;

const TRUE_TOKENS: [&str; 4] = ["1", "true", "on", "yes"];
const FALSE_TOKENS: [&str; 5] = ["0", "false", "off", "no", ""];

/// The rule a leaf enforces on every value it accepts.
///
/// Fixed when the leaf is built and never changed afterwards.
#[derive(Debug, Clone)]
pub enum Constraint {
    /// Any scalar, stored as text.
    None,
    /// Lenient boolean coercion, stored as `true`/`false`.
    Boolean,
    /// Base-10 integer, optionally bounded (inclusive).
    Integer { min: Option<i64>, max: Option<i64> },
    /// Exact, case-sensitive membership in a list.
    Selection(Vec<String>),
    /// Exact length in characters.
    FixedLength(usize),
    /// Must match a regular expression.
    Pattern(Regex),
    /// IPv4 or IPv6 address, rendered with a default padding.
    IpAddress(Padding),
}

impl Constraint {
    /// Integer constraint. Bounds given in reverse order are swapped.
    #[must_use]
    pub fn integer(min: Option<i64>, max: Option<i64>) -> Self {
        match (min, max) {
            (Some(lo), Some(hi)) if lo > hi => Self::Integer {
                min: Some(hi),
                max: Some(lo),
            },
            _ => Self::Integer { min, max },
        }
    }

    /// Selection constraint.
    ///
    /// # Errors
    /// Returns `Logic` if `options` is empty.
    pub fn selection<I, S>(options: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let options: Vec<String> = options.into_iter().map(Into::into).collect();
        if options.is_empty() {
            return Err(BindError::Logic(
                "selection needs at least one allowed value".to_string(),
            ));
        }
        Ok(Self::Selection(options))
    }

    /// Fixed-length constraint. A length of 0 falls back to 1.
    #[must_use]
    pub fn fixed_length(length: usize) -> Self {
        if length == 0 {
            tracing::warn!(
                fallback = DEFAULT_FIXED_LENGTH,
                "Fixed length of 0 is not usable, falling back"
            );
            return Self::FixedLength(DEFAULT_FIXED_LENGTH);
        }
        Self::FixedLength(length)
    }

    /// Pattern constraint.
    ///
    /// # Errors
    /// Returns `Logic` if the pattern does not compile.
    pub fn pattern(pattern: &str) -> Result<Self> {
        Regex::new(pattern)
            .map(Self::Pattern)
            .map_err(|e| BindError::Logic(format!("invalid pattern '{pattern}': {e}")))
    }

    /// Name used for kind matching and diagnostics.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::None => "leaf",
            Self::Boolean => "boolean",
            Self::Integer { .. } => "integer",
            Self::Selection(_) => "selection",
            Self::FixedLength(_) => "fixed-length",
            Self::Pattern(_) => "pattern",
            Self::IpAddress(_) => "ip-address",
        }
    }

    /// Convert `value` to the canonical text this rule stores.
    ///
    /// `Ok(None)` means the value resets the field. `padding` overrides the
    /// default of an address constraint and is ignored otherwise.
    ///
    /// # Errors
    /// `DataType` when the value cannot be represented, `Constraint` when it
    /// can but breaks the rule.
    pub fn apply(
        &self,
        field: &str,
        value: &Value,
        padding: Option<Padding>,
    ) -> Result<Option<String>> {
        if value.is_null() {
            return Ok(None);
        }

        match self {
            Self::None => scalar_text(field, value, "a scalar").map(Some),
            Self::Boolean => coerce_bool(field, value).map(|b| Some(b.to_string())),
            Self::Integer { min, max } => {
                let number = coerce_int(field, value)?;
                if min.is_some_and(|lo| number < lo) || max.is_some_and(|hi| number > hi) {
                    return Err(BindError::constraint(
                        field,
                        number.to_string(),
                        format!("outside range {}", RangeDisplay(*min, *max)),
                    ));
                }
                Ok(Some(number.to_string()))
            }
            Self::Selection(options) => {
                let text = scalar_text(field, value, "a scalar")?;
                if options.iter().any(|option| *option == text) {
                    Ok(Some(text))
                } else {
                    Err(BindError::constraint(
                        field,
                        text,
                        format!("expected one of {}", options.join(", ")),
                    ))
                }
            }
            Self::FixedLength(length) => {
                let text = scalar_text(field, value, "a scalar")?;
                if text.chars().count() == *length {
                    Ok(Some(text))
                } else {
                    Err(BindError::constraint(
                        field,
                        text,
                        format!("expected exactly {length} characters"),
                    ))
                }
            }
            Self::Pattern(regex) => {
                let text = scalar_text(field, value, "a scalar")?;
                if regex.is_match(&text) {
                    Ok(Some(text))
                } else {
                    Err(BindError::constraint(
                        field,
                        text,
                        format!("does not match pattern {}", regex.as_str()),
                    ))
                }
            }
            Self::IpAddress(default_padding) => {
                let text = scalar_text(field, value, "an address")?;
                let address = parse_address(&text).ok_or_else(|| {
                    BindError::constraint(field, text.clone(), "not an IPv4 or IPv6 address")
                })?;
                Ok(Some(format_address(
                    address,
                    padding.unwrap_or(*default_padding),
                )))
            }
        }
    }
}

fn scalar_text(field: &str, value: &Value, expected: &str) -> Result<String> {
    let text = value
        .to_text()
        .ok_or_else(|| BindError::data_type(field, value.to_string(), expected))?;
    validate_xml_text(field, &text)?;
    Ok(text)
}

fn coerce_bool(field: &str, value: &Value) -> Result<bool> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Int(i) => Ok(*i != 0),
        Value::Float(f) => Ok(*f != 0.0 && !f.is_nan()),
        Value::Text(text) => {
            let token = text.trim().to_ascii_lowercase();
            if TRUE_TOKENS.contains(&token.as_str()) {
                Ok(true)
            } else if FALSE_TOKENS.contains(&token.as_str()) {
                Ok(false)
            } else {
                Err(BindError::constraint(field, text.clone(), "not a boolean"))
            }
        }
        other => Err(BindError::constraint(field, other.to_string(), "not a boolean")),
    }
}

fn coerce_int(field: &str, value: &Value) -> Result<i64> {
    match value {
        Value::Int(i) => Ok(*i),
        Value::Text(text) => text
            .trim()
            .parse()
            .map_err(|_| BindError::data_type(field, value.to_string(), "a base-10 integer")),
        other => Err(BindError::data_type(
            field,
            other.to_string(),
            "a base-10 integer",
        )),
    }
}

struct RangeDisplay(Option<i64>, Option<i64>);

impl fmt::Display for RangeDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.0, self.1) {
            (Some(lo), Some(hi)) => write!(f, "[{lo}, {hi}]"),
            (Some(lo), None) => write!(f, "[{lo}, ...)"),
            (None, Some(hi)) => write!(f, "(..., {hi}]"),
            (None, None) => write!(f, "(..., ...)"),
        }
    }
}
