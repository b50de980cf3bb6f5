//! Registry mapping root tag names to payload constructors.

use std::collections::{HashMap, HashSet};

use crate::error::Result;
use crate::payload::{Payload, PayloadKind};

type Constructor = fn() -> Result<Payload>;

/// Explicit table of known payload kinds, keyed by local root name.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    constructors: HashMap<String, Constructor>,
}

impl Registry {
    /// Create a new empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register kind `K` under its root tag name.
    ///
    /// A later registration for the same name replaces the earlier one.
    pub fn register<K: PayloadKind>(&mut self) -> &mut Self {
        let tag = local_name(K::NAME).to_string();
        if self.constructors.insert(tag, Payload::new::<K>).is_some() {
            tracing::warn!(tag = local_name(K::NAME), "Replacing registered payload kind");
        }
        self
    }

    /// Check if a kind is registered for a tag.
    #[must_use]
    pub fn has_kind(&self, tag: &str) -> bool {
        self.constructors.contains_key(tag)
    }

    /// Return set of all registered tag names.
    #[must_use]
    pub fn registered_tags(&self) -> HashSet<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Build an empty payload for `tag`, or `None` if the tag is unknown.
    ///
    /// # Errors
    /// `Logic` if the registered kind's schema is broken.
    pub fn construct(&self, tag: &str) -> Result<Option<Payload>> {
        self.constructors
            .get(tag)
            .map(|constructor| constructor())
            .transpose()
    }
}

fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map_or(name, |(_, local)| local)
}
