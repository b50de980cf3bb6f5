//! Sample payload kinds covering every field kind.

use crate::collection::Collection;
use crate::element::{Leaf, Padding};
use crate::error::Result;
use crate::payload::{Layout, Payload, PayloadKind, Rule, Schema};
use crate::registry::Registry;

pub const NOTE_NAMESPACE: &str = "urn:xmlbind:note";
pub const HOST_NAMESPACE: &str = "urn:xmlbind:host";
pub const EXT_NAMESPACE: &str = "urn:xmlbind:ext";

/// Categories a note can be filed under.
pub const NOTE_CATEGORIES: [&str; 2] = ["NONE", "JUSTIFICATION"];

const HOSTNAME_PATTERN: &str =
    r"^[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?(\.[A-Za-z0-9]([A-Za-z0-9-]{0,61}[A-Za-z0-9])?)*$";
const FILENAME_PATTERN: &str = r"^[^/\\]+$";
const MIME_PATTERN: &str = r"^[\w.+-]+/[\w.+-]+$";
const MAX_ATTACHMENT_SIZE: i64 = 100 * 1024 * 1024;

/// A note: subject, category and a body of text lines or attachments.
///
/// Valid when `subject` and `category` are set and at least one of `text`
/// and `attachments` holds something.
pub struct Note;

impl PayloadKind for Note {
    const NAME: &'static str = "note";
    const NAMESPACE: Option<&'static str> = Some(NOTE_NAMESPACE);

    fn define(schema: &mut Schema) -> Result<()> {
        schema
            .field(Leaf::new("subject")?)?
            .field(Leaf::selection("category", NOTE_CATEGORIES)?)?
            .field(Collection::lines("text")?)?
            .field(Collection::typed(
                "attachments",
                vec![Payload::new::<Attachment>()?.into()],
            )?)?;
        Ok(())
    }

    fn rule() -> Rule {
        Rule::All(vec![
            Rule::required(&["subject", "category"]),
            Rule::any_of(&["text", "attachments"]),
        ])
    }
}

/// File attached to a note.
pub struct Attachment;

impl PayloadKind for Attachment {
    const NAME: &'static str = "attachment";

    fn define(schema: &mut Schema) -> Result<()> {
        schema
            .field(Leaf::pattern("filename", FILENAME_PATTERN)?)?
            .field(Leaf::integer_range("size", 0, MAX_ATTACHMENT_SIZE)?)?
            .field(Leaf::pattern("mime", MIME_PATTERN)?)?;
        Ok(())
    }

    fn rule() -> Rule {
        Rule::required(&["filename"])
    }
}

/// Reference link, written as attributes: `<link href="..." rel="..."/>`.
///
/// Exactly one of `href` and `target` must be set. Links only appear inside
/// other payloads.
pub struct Link;

impl PayloadKind for Link {
    const NAME: &'static str = "link";
    const LAYOUT: Layout = Layout::Attributes;
    const STANDALONE: bool = false;

    fn define(schema: &mut Schema) -> Result<()> {
        schema
            .field(Leaf::new("href")?)?
            .field(Leaf::new("target")?)?
            .field(Leaf::new("rel")?)?
            .field(Leaf::new("title")?)?;
        Ok(())
    }

    fn rule() -> Rule {
        Rule::one_of(&["href", "target"])
    }
}

/// Network host.
pub struct Host;

impl PayloadKind for Host {
    const NAME: &'static str = "host";
    const NAMESPACE: Option<&'static str> = Some(HOST_NAMESPACE);

    fn define(schema: &mut Schema) -> Result<()> {
        schema
            .field(Leaf::pattern("hostname", HOSTNAME_PATTERN)?)?
            .field(Leaf::ip_address("address", Padding::Unpadded)?)?
            .field(Leaf::fixed_length("country", 3)?)?
            .field(Leaf::boolean("enabled")?)?
            .field(Leaf::integer_range("port", 1, 65535)?)?
            .field(Collection::named("aliases", ["alias"])?)?
            .field(Leaf::boolean("ext:managed")?.namespaced(EXT_NAMESPACE)?)?
            .nested::<Link>(Some("homepage"))?;
        Ok(())
    }

    fn rule() -> Rule {
        Rule::All(vec![
            Rule::required(&["hostname"]),
            Rule::Requires {
                when: "port",
                then: "address",
            },
        ])
    }
}

/// Registry of every sample kind.
///
/// # Errors
/// `Logic` if any registered schema fails to build.
pub fn registry() -> Result<Registry> {
    let mut registry = Registry::new();
    registry
        .register::<Note>()
        .register::<Attachment>()
        .register::<Link>()
        .register::<Host>();

    for tag in registry.registered_tags() {
        registry.construct(tag)?;
    }
    Ok(registry)
}
