//! xmlbind - Typed XML data binding.
//!
//! Schema-shaped payloads map a fixed tree of named fields onto XML
//! documents. Every field validates what it stores, payloads add business
//! rules on top, and documents survive a parse/serialize round trip.
//!
//! # Example
//!
//! ```
//! use xmlbind::catalog::Note;
//! use xmlbind::payload::Payload;
//! use xmlbind::Codec;
//!
//! let mut note = Payload::new::<Note>().unwrap();
//! note.set("subject", "Maintenance window").unwrap();
//! note.set("category", "NONE").unwrap();
//! assert!(!note.is_valid());
//!
//! note.add("text", "Saturday 02:00-04:00").unwrap();
//! assert!(note.is_valid());
//!
//! let xml = note.to_xml().unwrap();
//! let parsed = Payload::from_xml::<Note>(&xml).unwrap();
//! assert_eq!(parsed.to_xml().unwrap(), xml);
//! ```
//!
//! # Architecture
//!
//! - [`element`]: leaf fields and their constraints
//! - [`collection`]: line lists and filtered groups
//! - [`payload`]: composite payloads, schemas and business rules
//! - [`node`]: the codec contract shared by all of the above
//! - [`registry`]: root-tag dispatch for incoming documents
//! - [`catalog`]: sample payload kinds
//! - [`value`]: values accepted by setters
//! - [`config`]: constants, name validation and serialization options
//! - [`error`]: error types and Result alias
//! - [`xml`]: reading and writing helpers
//! - [`cli`]: command-line interface

pub mod catalog;
pub mod cli;
pub mod collection;
pub mod config;
pub mod element;
pub mod error;
pub mod name;
pub mod node;
pub mod payload;
pub mod registry;
pub mod value;
pub mod xml;

// Re-export commonly used items
pub use config::SerializeOptions;
pub use error::{BindError, ErrorCategory, Result};
pub use node::{Codec, Node, Parse};
pub use payload::{Outcome, Payload, PayloadKind};
pub use value::Value;
