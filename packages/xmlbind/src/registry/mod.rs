//! Boundary dispatch: from raw documents to payloads.
//!
//! A [`Registry`] maps root tag names to payload constructors. The loader
//! looks the root element up in it; a known root becomes a typed
//! [`Payload`](crate::payload::Payload), anything else an untyped
//! name-filtered group holding the root's children.

mod core;
mod loader;
mod transport;

pub use core::Registry;
pub use loader::{load_document, load_response, Loaded};
pub use transport::{fetch_and_load, Method, Transport};
