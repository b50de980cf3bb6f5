//! Helpers for navigating roxmltree documents.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use xmlbind::xml::get_tag_name;
///
/// let xml = r#"<v:note xmlns:v="urn:v"><v:subject/></v:note>"#;
/// let doc = Document::parse(xml).unwrap();
/// assert_eq!(get_tag_name(doc.root_element()), "note");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

/// Distinct local names of the element children, in first-seen order.
pub fn distinct_child_names<'a>(node: Node<'a, '_>) -> Vec<&'a str> {
    let mut names: Vec<&'a str> = Vec::new();
    for child in element_children(node) {
        let name = get_tag_name(child);
        if !names.contains(&name) {
            names.push(name);
        }
    }
    names
}

/// Concatenate the direct text children of a node, untrimmed.
///
/// Whitespace is kept so leaf values survive a round trip; text inside
/// nested elements is not included.
pub fn collect_text(node: Node<'_, '_>) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect()
}

/// Distinct namespaces of the element children, in first-seen order.
///
/// Children without a namespace form their own scope (`None`), which always
/// comes first when present.
pub fn namespace_scopes<'a>(node: Node<'a, '_>) -> Vec<Option<&'a str>> {
    let mut scopes: Vec<Option<&'a str>> = Vec::new();
    for child in element_children(node) {
        let scope = child.tag_name().namespace();
        if !scopes.contains(&scope) {
            scopes.push(scope);
        }
    }
    if let Some(pos) = scopes.iter().position(Option::is_none) {
        let unqualified = scopes.remove(pos);
        scopes.insert(0, unqualified);
    }
    scopes
}
