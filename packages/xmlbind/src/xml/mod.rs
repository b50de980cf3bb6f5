//! XML plumbing: reading with roxmltree, an owned element tree for output,
//! and a quick-xml writer.

mod element;
mod utils;
mod writer;

pub use element::{Content, Element};
pub use utils::{
    collect_text, distinct_child_names, element_children, get_tag_name, namespace_scopes,
};
pub use writer::{write_document, write_fragment};
