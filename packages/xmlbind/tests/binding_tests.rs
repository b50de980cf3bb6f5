//! End-to-end binding tests: round trips, idempotence and the documented
//! payload behaviours, run against the sample catalogue.

use pretty_assertions::assert_eq;

use xmlbind::catalog::{self, Attachment, Host, Link, Note};
use xmlbind::collection::Collection;
use xmlbind::element::{Leaf, Padding};
use xmlbind::node::{Codec, Node, Parse};
use xmlbind::payload::{Payload, PayloadKind, Schema};
use xmlbind::registry::{load_document, Loaded};
use xmlbind::xml::write_fragment;
use xmlbind::{ErrorCategory, Result, SerializeOptions, Value};

/// Bundle of reference links held in a name group.
struct Bag;

impl PayloadKind for Bag {
    const NAME: &'static str = "bag";

    fn define(schema: &mut Schema) -> Result<()> {
        schema.field(
            Collection::named("links", ["link"])?.with_template(Payload::new::<Link>()?)?,
        )?;
        Ok(())
    }
}

/// Meter readings held in a type-filtered group of integer leaves.
struct Gauge;

impl PayloadKind for Gauge {
    const NAME: &'static str = "gauge";

    fn define(schema: &mut Schema) -> Result<()> {
        schema
            .field(Leaf::new("label")?)?
            .field(Collection::typed(
                "readings",
                vec![Leaf::integer_range("reading", 0, 100)?.into()],
            )?)?;
        Ok(())
    }
}

fn reparse_leaf(leaf: &Leaf) -> Leaf {
    let xml = write_fragment(&leaf.to_element(), false).unwrap();
    let doc = roxmltree::Document::parse(&xml).unwrap();
    let mut parsed = leaf.clone_empty();
    parsed.parse_node(doc.root_element()).unwrap();
    parsed
}

fn populated_note() -> Payload {
    let mut note = Payload::new::<Note>().unwrap();
    note.set("subject", "Access request").unwrap();
    note.set("category", "JUSTIFICATION").unwrap();
    note.set("text", vec!["Needed for the audit.", "  indented & <escaped>  "])
        .unwrap();

    let mut attachment = Payload::new::<Attachment>().unwrap();
    attachment.set("filename", "audit.pdf").unwrap();
    attachment.set("size", 2048).unwrap();
    attachment.set("mime", "application/pdf").unwrap();
    note.add("attachments", attachment).unwrap();

    let mut second = Payload::new::<Attachment>().unwrap();
    second.set("filename", "scope.txt").unwrap();
    note.add("attachments", second).unwrap();
    note
}

fn populated_host() -> Payload {
    let mut host = Payload::new::<Host>().unwrap();
    host.set("hostname", "gw.example.org").unwrap();
    host.set("address", "2001:db8::1").unwrap();
    host.set("country", "NLD").unwrap();
    host.set("enabled", "yes").unwrap();
    host.set("port", 8443).unwrap();
    host.set("aliases", vec!["gw", "gateway"]).unwrap();
    host.set("managed", true).unwrap();
    host.leaf_mut("hostname")
        .unwrap()
        .set_attribute("source", "dns")
        .unwrap();
    let homepage = host.payload_mut("homepage").unwrap();
    homepage.set("target", "portal").unwrap();
    homepage.set("title", "Gateway \"portal\"").unwrap();
    host
}

// --- Round trip ---

#[test]
fn test_leaf_round_trip_keeps_text_and_attributes() {
    let mut leaf = Leaf::ip_address("address", Padding::Padded).unwrap();
    leaf.set_value("10.1.2.3").unwrap();
    leaf.set_attribute("scope", "lan").unwrap();
    leaf.set_attribute("note", "a \"quoted\" <value>").unwrap();

    let parsed = reparse_leaf(&leaf);
    assert_eq!(parsed.value(), "010.001.002.003");
    let attributes: Vec<_> = parsed.attributes().collect();
    assert_eq!(
        attributes,
        vec![("scope", "lan"), ("note", "a \"quoted\" <value>")]
    );
}

#[test]
fn test_line_list_round_trip_keeps_order() {
    let mut text = Collection::lines("text").unwrap();
    text.set_value(vec!["b", "a", " c "]).unwrap();
    let xml = write_fragment(&text.to_element(), false).unwrap();

    let doc = roxmltree::Document::parse(&xml).unwrap();
    let mut parsed = text.clone_empty();
    parsed.parse_node(doc.root_element()).unwrap();
    let lines: Vec<_> = parsed.lines_iter().collect();
    assert_eq!(lines, vec!["b", "a", " c "]);
}

#[test]
fn test_note_round_trip() {
    let note = populated_note();
    let xml = note.to_xml().unwrap();
    let parsed = Payload::from_xml::<Note>(&xml).unwrap();

    assert_eq!(parsed.to_xml().unwrap(), xml);
    assert_eq!(parsed.collection("attachments").unwrap().len(), 2);
    let lines: Vec<_> = parsed.collection("text").unwrap().lines_iter().collect();
    assert_eq!(lines, vec!["Needed for the audit.", "  indented & <escaped>  "]);
}

#[test]
fn test_host_round_trip() {
    let host = populated_host();
    let xml = host.to_xml().unwrap();
    let parsed = Payload::from_xml::<Host>(&xml).unwrap();

    assert_eq!(parsed.to_xml().unwrap(), xml);
    assert_eq!(
        parsed.leaf("hostname").unwrap().attribute("source"),
        Some("dns")
    );
    assert_eq!(
        parsed.payload("homepage").unwrap().value("title").unwrap(),
        "Gateway \"portal\""
    );
}

#[test]
fn test_indented_output_parses_back() {
    let note = populated_note();
    let options = SerializeOptions::new().with_indent(true);
    let xml = note.to_xml_string(&options).unwrap();
    assert!(xml.contains('\n'));

    let parsed = Payload::from_xml::<Note>(&xml).unwrap();
    assert_eq!(parsed.to_xml().unwrap(), note.to_xml().unwrap());
}

#[test]
fn test_declared_encoding() {
    let note = populated_note();
    let options = SerializeOptions::new().with_encoding("ISO-8859-1");
    let xml = note.to_xml_string(&options).unwrap();
    assert!(xml.starts_with(r#"<?xml version="1.0" encoding="ISO-8859-1"?>"#));
}

// --- Idempotence ---

#[test]
fn test_set_value_twice_equals_once() {
    let mut once = populated_host();
    let mut twice = populated_host();
    once.set("port", "22").unwrap();
    twice.set("port", "22").unwrap();
    twice.set("port", "22").unwrap();
    assert_eq!(once.to_xml().unwrap(), twice.to_xml().unwrap());
}

#[test]
fn test_null_restores_fresh_state() {
    let fresh = Payload::new::<Host>().unwrap();
    let mut host = populated_host();
    for (alias, _) in fresh.aliases() {
        host.set(alias, Value::Null).unwrap();
    }
    for (alias, field) in host.aliases() {
        assert!(!field.is_defined(), "{alias}");
    }
    assert_eq!(
        host.to_element(),
        fresh.to_element(),
    );
    assert!(host.leaf("hostname").unwrap().attribute("source").is_none());
}

// --- Validity monotonicity and boundaries ---

#[test]
fn test_accepted_value_stays_valid() {
    let mut port = Leaf::integer_range("port", 10, 20).unwrap();
    port.set_value(15).unwrap();
    assert!(port.is_valid());
    assert!(port.set_value(25).is_err());
    assert!(port.is_valid());
    assert_eq!(port.value(), "15");
}

#[test]
fn test_integer_boundaries_and_reversed_bounds() {
    for (min, max) in [(10, 20), (20, 10)] {
        let mut leaf = Leaf::integer_range("n", min, max).unwrap();
        assert!(leaf.set_value(10).is_ok());
        assert!(leaf.set_value(20).is_ok());
        assert_eq!(
            leaf.set_value(9).unwrap_err().category(),
            ErrorCategory::Constraint
        );
        assert_eq!(
            leaf.set_value(21).unwrap_err().category(),
            ErrorCategory::Constraint
        );
    }
}

// --- Examples ---

#[test]
fn test_fixed_length_country() {
    let mut host = Payload::new::<Host>().unwrap();
    host.set("country", "USA").unwrap();
    assert!(host.get("country").unwrap().is_valid());
    assert_eq!(host.value("country").unwrap(), "USA");

    let err = host.set("country", "US").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Constraint);
    assert_eq!(host.value("country").unwrap(), "USA");
}

#[test]
fn test_ip_padding_modes() {
    let mut host = Payload::new::<Host>().unwrap();
    host.set("address", "192.168.001.010").unwrap();
    assert_eq!(host.value("address").unwrap(), "192.168.1.10");

    host.leaf_mut("address")
        .unwrap()
        .set_address("127.0.0.1", Padding::Padded)
        .unwrap();
    assert_eq!(host.value("address").unwrap(), "127.000.000.001");
}

#[test]
fn test_note_validity_rule() {
    let mut note = Payload::new::<Note>().unwrap();
    note.set("subject", "Hello").unwrap();
    note.set("category", "NONE").unwrap();
    assert!(!note.is_valid());

    note.add("text", "first line").unwrap();
    assert!(note.is_valid());

    note.unset("category");
    assert!(!note.is_valid());
}

#[test]
fn test_clone_empty_of_populated_payload() {
    let note = populated_note();
    let empty = note.clone_empty();
    for (alias, field) in note.aliases() {
        let copy = empty.get(alias).unwrap();
        assert!(!copy.is_defined(), "{alias}");
        assert_eq!(copy.tag_name(), field.tag_name());
    }
    assert!(!empty.is_defined());
    assert!(note.is_defined());
}

#[test]
fn test_root_mismatch_is_parser_error() {
    let mut note = populated_note();
    let before = note.to_xml().unwrap();
    let err = note
        .parse_str(r#"<host xmlns="urn:xmlbind:host"><hostname>x</hostname></host>"#)
        .unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parser);
    assert_eq!(note.to_xml().unwrap(), before);
}

// --- Payload behaviour ---

#[test]
fn test_validated_serialization_requires_valid_payload() {
    let mut note = Payload::new::<Note>().unwrap();
    note.set("subject", "only a subject").unwrap();
    let validated = SerializeOptions::new().with_validation(true);

    assert!(note.to_xml().is_ok());
    let err = note.to_xml_string(&validated).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Parser);

    note.set("category", "NONE").unwrap();
    note.add("text", "now complete").unwrap();
    assert!(note.to_xml_string(&validated).is_ok());
}

#[test]
fn test_link_is_nested_only() {
    let mut link = Payload::new::<Link>().unwrap();
    link.set("href", "https://example.org").unwrap();
    assert_eq!(
        link.to_xml().unwrap_err().category(),
        ErrorCategory::Parser
    );
}

#[test]
fn test_mismatched_nested_set_is_not_an_error() {
    let mut host = populated_host();
    let outcome = host
        .set("homepage", Payload::new::<Note>().unwrap())
        .unwrap();
    assert!(!outcome.is_applied());
    assert_eq!(
        host.payload("homepage").unwrap().value("target").unwrap(),
        "portal"
    );
}

#[test]
fn test_iteration_keys_are_tag_names() {
    let host = Payload::new::<Host>().unwrap();
    let keys: Vec<_> = host.iter().map(|(key, _)| key).collect();
    assert_eq!(
        keys,
        vec!["hostname", "address", "country", "enabled", "port", "aliases", "managed", "link"]
    );
}

#[test]
fn test_unknown_field_lookup() {
    let mut host = Payload::new::<Host>().unwrap();
    assert_eq!(
        host.get("nonexistent").unwrap_err().category(),
        ErrorCategory::NotFound
    );
    assert_eq!(
        host.set("nonexistent", "x").unwrap_err().category(),
        ErrorCategory::NotFound
    );
    host.unset("nonexistent");
}

#[test]
fn test_rejected_value_from_document() {
    let xml = r#"<host xmlns="urn:xmlbind:host"><port>99999</port></host>"#;
    let err = Payload::from_xml::<Host>(xml).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Constraint);
}

#[test]
fn test_whitespace_controls_round_trip() {
    let mut host = populated_host();
    host.leaf_mut("hostname")
        .unwrap()
        .set_attribute("source", "dns\tcache\nsecondary\r")
        .unwrap();
    host.payload_mut("homepage")
        .unwrap()
        .set("title", "Gateway\n\tportal")
        .unwrap();

    let mut note = populated_note();
    note.set("subject", "line one\r\nline two\rend").unwrap();

    for payload in [host, note] {
        let xml = payload.to_xml().unwrap();
        let mut parsed = payload.clone_empty();
        parsed.parse_str(&xml).unwrap();
        assert_eq!(parsed.to_xml().unwrap(), xml);
    }
}

#[test]
fn test_whitespace_controls_keep_exact_values() {
    let mut host = populated_host();
    host.payload_mut("homepage")
        .unwrap()
        .set("title", "Gateway\n\tportal")
        .unwrap();
    let parsed = Payload::from_xml::<Host>(&host.to_xml().unwrap()).unwrap();
    assert_eq!(
        parsed.payload("homepage").unwrap().value("title").unwrap(),
        "Gateway\n\tportal"
    );
}

#[test]
fn test_forbidden_character_never_reaches_output() {
    let mut note = populated_note();
    let err = note.set("subject", "bell\u{7}").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::DataType);
    let err = note.add("text", "escape \u{1B}").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::DataType);

    let xml = note.to_xml().unwrap();
    assert!(Payload::from_xml::<Note>(&xml).is_ok());
}

#[test]
fn test_payload_members_of_name_group_round_trip() {
    let mut bag = Payload::new::<Bag>().unwrap();
    let mut link = Payload::new::<Link>().unwrap();
    link.set("href", "http://x").unwrap();
    bag.add("links", link).unwrap();
    let mut link = Payload::new::<Link>().unwrap();
    link.set("target", "home").unwrap();
    link.set("rel", "up").unwrap();
    bag.add("links", link).unwrap();

    let xml = bag.to_xml().unwrap();
    assert!(xml.ends_with(
        r#"<bag><link href="http://x"/><link target="home" rel="up"/></bag>"#
    ));

    let parsed = Payload::from_xml::<Bag>(&xml).unwrap();
    assert_eq!(parsed.collection("links").unwrap().len(), 2);
    assert_eq!(parsed.to_xml().unwrap(), xml);
}

#[test]
fn test_name_group_without_template_refuses_payloads() {
    let mut links = Collection::named("links", ["link"]).unwrap();
    let mut link = Payload::new::<Link>().unwrap();
    link.set("href", "http://x").unwrap();
    let err = links.add_value(link).unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Constraint);
}

#[test]
fn test_typed_leaf_group_round_trip() {
    let mut gauge = Payload::new::<Gauge>().unwrap();
    gauge.set("label", "tank").unwrap();
    gauge.add("readings", 10).unwrap();
    gauge.add("readings", 100).unwrap();
    assert!(gauge.add("readings", 101).is_err());

    let xml = gauge.to_xml().unwrap();
    assert!(xml.ends_with(
        "<gauge><label>tank</label><reading>10</reading><reading>100</reading></gauge>"
    ));

    let parsed = Payload::from_xml::<Gauge>(&xml).unwrap();
    let readings: Vec<_> = parsed
        .collection("readings")
        .unwrap()
        .nodes()
        .filter_map(Node::as_leaf)
        .map(Leaf::value)
        .collect();
    assert_eq!(readings, vec!["10", "100"]);
    assert_eq!(parsed.to_xml().unwrap(), xml);

    let err = Payload::from_xml::<Gauge>("<gauge><reading>500</reading></gauge>").unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Constraint);
}

// --- Boundary dispatch ---

#[test]
fn test_load_dispatches_on_root() {
    let registry = catalog::registry().unwrap();
    let xml = populated_host().to_xml().unwrap();

    let loaded = load_document(&registry, &xml).unwrap();
    let host = loaded.into_payload().unwrap();
    assert!(host.is_kind::<Host>());
    assert_eq!(host.to_xml().unwrap(), xml);
}

#[test]
fn test_load_unknown_root_as_group() {
    let registry = catalog::registry().unwrap();
    let xml = "<servers><server>a</server><server>b</server></servers>";

    let Loaded::Generic(group) = load_document(&registry, xml).unwrap() else {
        panic!("expected a generic group");
    };
    let names: Vec<_> = group
        .nodes()
        .filter_map(Node::as_leaf)
        .map(Leaf::value)
        .collect();
    assert_eq!(names, vec!["a", "b"]);
    assert_eq!(write_fragment(&group.to_element(), false).unwrap(), xml);
}

#[test]
fn test_load_unknown_root_with_nested_children() {
    let registry = catalog::registry().unwrap();
    let xml = concat!(
        "<error><code>E1</code>",
        "<components><component>x</component><component>y</component></components>",
        "<detail><where><line>3</line></where></detail>",
        "</error>"
    );

    let loaded = load_document(&registry, xml).unwrap();
    assert!(!loaded.is_known());
    assert!(loaded.is_valid());
    assert_eq!(write_fragment(&loaded.to_element(), false).unwrap(), xml);
}

#[test]
fn test_load_unknown_root_with_unicode_names() {
    let registry = catalog::registry().unwrap();
    let xml = "<données><élément>x</élément><élément>y</élément></données>";
    let loaded = load_document(&registry, xml).unwrap();
    assert_eq!(write_fragment(&loaded.to_element(), false).unwrap(), xml);
}
