//! Page manifests: the template layer's rendered output, as JSON.
//!
//! ```json
//! { "title": "Home",
//!   "body": [ { "tag": "div", "class": "accordion-block",
//!               "attrs": { "data-allow-multiple": "True" },
//!               "children": [ … ] } ] }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;

use super::dom::{Document, ElementId};
use super::error::PageError;

#[derive(Debug, Deserialize)]
pub struct PageManifest {
    #[serde(default)]
    pub title: String,
    pub body: Vec<NodeSpec>,
}

#[derive(Debug, Deserialize)]
pub struct NodeSpec {
    #[serde(default = "default_tag")]
    pub tag: String,
    /// Whitespace-separated class list.
    #[serde(default)]
    pub class: String,
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub children: Vec<NodeSpec>,
    /// Fixed height in rows (images, video embeds).
    #[serde(default)]
    pub height: Option<u16>,
}

fn default_tag() -> String {
    "div".to_string()
}

/// Read and decode a manifest file.
pub fn load(path: &Path) -> Result<Document, PageError> {
    let raw = std::fs::read_to_string(path).map_err(|source| PageError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse(&raw)
}

/// Decode a manifest from a JSON string.
pub fn parse(raw: &str) -> Result<Document, PageError> {
    let manifest: PageManifest = serde_json::from_str(raw)?;
    if manifest.body.is_empty() {
        return Err(PageError::EmptyBody);
    }
    let mut doc = Document::new(manifest.title);
    let body = doc.body();
    for node in &manifest.body {
        build(&mut doc, body, node);
    }
    Ok(doc)
}

fn build(doc: &mut Document, parent: ElementId, spec: &NodeSpec) {
    let id = doc.create_element(&spec.tag);
    for class in spec.class.split_whitespace() {
        doc.add_class(id, class);
    }
    for (k, v) in &spec.attrs {
        doc.set_attr(id, k, v.clone());
    }
    let el = doc.get_mut(id);
    el.text = spec.text.clone();
    el.height_hint = spec.height;
    doc.append_child(parent, id);
    for child in &spec.children {
        build(doc, id, child);
    }
}
