//! Payload-level business rules.

use std::fmt;

use super::Payload;
use crate::node::Codec;

/// Predicate deciding whether a payload is valid as a whole.
///
/// Field names are aliases or tag names, resolved the same way as
/// [`Payload::get`]. A field "holds" when it is both defined and valid.
#[derive(Clone, Default)]
pub enum Rule {
    /// Every field is valid (the default).
    #[default]
    Fields,
    /// All named fields hold.
    Required(Vec<&'static str>),
    /// At least one named field holds.
    AnyOf(Vec<&'static str>),
    /// Exactly one named field holds.
    OneOf(Vec<&'static str>),
    /// The two fields never hold together.
    Excludes(&'static str, &'static str),
    /// If `when` holds, `then` must hold too.
    Requires {
        when: &'static str,
        then: &'static str,
    },
    /// Every sub-rule passes.
    All(Vec<Rule>),
    /// At least one sub-rule passes.
    Any(Vec<Rule>),
    /// Hand-written predicate.
    Custom(fn(&Payload) -> bool),
}

impl Rule {
    #[must_use]
    pub fn required(names: &[&'static str]) -> Self {
        Rule::Required(names.to_vec())
    }

    #[must_use]
    pub fn any_of(names: &[&'static str]) -> Self {
        Rule::AnyOf(names.to_vec())
    }

    #[must_use]
    pub fn one_of(names: &[&'static str]) -> Self {
        Rule::OneOf(names.to_vec())
    }

    /// Evaluate against the current field state.
    #[must_use]
    pub fn evaluate(&self, payload: &Payload) -> bool {
        match self {
            Rule::Fields => payload.fields_valid(),
            Rule::Required(names) => names.iter().all(|name| holds(payload, name)),
            Rule::AnyOf(names) => names.iter().any(|name| holds(payload, name)),
            Rule::OneOf(names) => names.iter().filter(|name| holds(payload, name)).count() == 1,
            Rule::Excludes(a, b) => !(holds(payload, a) && holds(payload, b)),
            Rule::Requires { when, then } => !holds(payload, when) || holds(payload, then),
            Rule::All(rules) => rules.iter().all(|rule| rule.evaluate(payload)),
            Rule::Any(rules) => rules.iter().any(|rule| rule.evaluate(payload)),
            Rule::Custom(predicate) => predicate(payload),
        }
    }

    /// Every field name the rule refers to.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        match self {
            Rule::Fields | Rule::Custom(_) => Vec::new(),
            Rule::Required(names) | Rule::AnyOf(names) | Rule::OneOf(names) => names.clone(),
            Rule::Excludes(a, b) => vec![*a, *b],
            Rule::Requires { when, then } => vec![*when, *then],
            Rule::All(rules) | Rule::Any(rules) => rules.iter().flat_map(Rule::names).collect(),
        }
    }
}

fn holds(payload: &Payload, name: &str) -> bool {
    payload
        .get(name)
        .is_ok_and(|field| field.is_defined() && field.is_valid())
}

impl fmt::Debug for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rule::Fields => write!(f, "Fields"),
            Rule::Required(names) => write!(f, "Required({names:?})"),
            Rule::AnyOf(names) => write!(f, "AnyOf({names:?})"),
            Rule::OneOf(names) => write!(f, "OneOf({names:?})"),
            Rule::Excludes(a, b) => write!(f, "Excludes({a:?}, {b:?})"),
            Rule::Requires { when, then } => write!(f, "Requires({when:?} => {then:?})"),
            Rule::All(rules) => f.debug_tuple("All").field(rules).finish(),
            Rule::Any(rules) => f.debug_tuple("Any").field(rules).finish(),
            Rule::Custom(_) => write!(f, "Custom(..)"),
        }
    }
}
