//! The transport boundary.
//!
//! The core never talks to the network. A [`Transport`] implementation
//! supplied by the caller moves serialized payloads and raw responses.

use std::fmt;

use super::{load_response, Loaded, Registry};
use crate::error::Result;
use crate::payload::Payload;

/// Request method.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Sends a request and returns the raw response body.
pub trait Transport {
    /// # Errors
    /// Implementation-defined; typically `Io`.
    fn send(&self, method: Method, path: &str, body: Option<&str>) -> Result<Vec<u8>>;
}

/// Serialize `body`, send it, and load the response.
///
/// # Errors
/// Serialization errors of `body`, transport errors, and load errors of
/// the response.
pub fn fetch_and_load(
    transport: &impl Transport,
    registry: &Registry,
    method: Method,
    path: &str,
    body: Option<&Payload>,
) -> Result<Loaded> {
    let body = body.map(Payload::to_xml).transpose()?;
    tracing::debug!(%method, path, has_body = body.is_some(), "Sending request");
    let bytes = transport.send(method, path, body.as_deref())?;
    load_response(registry, &bytes)
}
