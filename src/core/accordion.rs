//! Expand/collapse panel groups, optionally exclusive.

use super::dom::{Document, ElementId};
use super::error::SetupError;

pub const ROOT_CLASS: &str = "accordion-block";
pub const ITEM_CLASS: &str = "accordion-item";
pub const HEADER_CLASS: &str = "accordion-header";
pub const BODY_CLASS: &str = "accordion-body";
pub const ALLOW_MULTIPLE_ATTR: &str = "data-allow-multiple";
/// Item-level mirror of the header's `aria-expanded`.
pub const EXPANDED_CLASS: &str = "expanded";
pub const EXPANDED_ATTR: &str = "aria-expanded";

#[derive(Debug, Clone)]
pub struct Panel {
    pub item: ElementId,
    pub header: ElementId,
    pub body: ElementId,
    expanded: bool,
}

impl Panel {
    pub fn expanded(&self) -> bool {
        self.expanded
    }
}

#[derive(Debug, Clone)]
pub struct AccordionGroup {
    pub root: ElementId,
    pub allow_multiple: bool,
    panels: Vec<Panel>,
}

impl AccordionGroup {
    /// Wire the accordion rooted at `root`.  Items without both a header and
    /// a body are left inert; a group with no usable item is rejected.
    pub fn from_element(doc: &mut Document, root: ElementId) -> Result<Self, SetupError> {
        let allow_multiple = doc.attr(root, ALLOW_MULTIPLE_ATTR) == Some("True");

        let mut panels = Vec::new();
        for item in doc.descendants_by_class(root, ITEM_CLASS) {
            // Items of a nested accordion belong to that accordion.
            if doc.closest_ancestor(item, ROOT_CLASS) != Some(root) {
                continue;
            }
            let (Some(header), Some(body)) = (
                doc.first_by_class(item, HEADER_CLASS),
                doc.first_by_class(item, BODY_CLASS),
            ) else {
                tracing::debug!(root, item, "accordion: item without header/body skipped");
                continue;
            };
            let expanded =
                doc.attr(header, EXPANDED_ATTR) == Some("true") || doc.has_class(item, EXPANDED_CLASS);
            panels.push(Panel {
                item,
                header,
                body,
                expanded,
            });
        }

        if panels.is_empty() {
            return Err(SetupError::MissingPart {
                widget: "accordion",
                root,
                part: ITEM_CLASS,
            });
        }

        let mut group = Self {
            root,
            allow_multiple,
            panels,
        };

        // Normalise the markup's initial state: keep only the first open
        // panel of an exclusive group.
        let mut seen_open = false;
        for i in 0..group.panels.len() {
            let mut open = group.panels[i].expanded;
            if open && !group.allow_multiple {
                open = !seen_open;
                seen_open = true;
            }
            group.set_expanded(doc, i, open);
        }
        Ok(group)
    }

    /// Flip `panel`.  In an exclusive group every other panel is closed
    /// first, within the same call.
    pub fn toggle(&mut self, doc: &mut Document, panel: usize) {
        if panel >= self.panels.len() {
            return;
        }
        if !self.allow_multiple {
            for i in 0..self.panels.len() {
                if i != panel {
                    self.set_expanded(doc, i, false);
                }
            }
        }
        let open = !self.panels[panel].expanded;
        self.set_expanded(doc, panel, open);
        tracing::debug!(root = self.root, panel, open, "accordion: toggled");
    }

    /// Set one panel's state and mirror it onto the markup.
    pub fn set_expanded(&mut self, doc: &mut Document, panel: usize, open: bool) {
        let Some(p) = self.panels.get_mut(panel) else {
            return;
        };
        p.expanded = open;
        doc.set_attr(p.header, EXPANDED_ATTR, if open { "true" } else { "false" });
        doc.set_class(p.item, EXPANDED_CLASS, open);
    }

    pub fn panels(&self) -> &[Panel] {
        &self.panels
    }

    pub fn expanded_count(&self) -> usize {
        self.panels.iter().filter(|p| p.expanded).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn accordion(doc: &mut Document, allow: Option<&str>, items: usize) -> ElementId {
        let root = doc.create_element("div");
        doc.add_class(root, ROOT_CLASS);
        if let Some(v) = allow {
            doc.set_attr(root, ALLOW_MULTIPLE_ATTR, v);
        }
        doc.append_child(doc.body(), root);
        for _ in 0..items {
            let item = doc.create_element("div");
            doc.add_class(item, ITEM_CLASS);
            doc.append_child(root, item);
            let header = doc.create_element("button");
            doc.add_class(header, HEADER_CLASS);
            doc.append_child(item, header);
            let body = doc.create_element("div");
            doc.add_class(body, BODY_CLASS);
            doc.append_child(item, body);
        }
        root
    }

    #[test]
    fn exclusive_group_swaps_open_panel() {
        let mut doc = Document::new("t");
        let root = accordion(&mut doc, None, 2);
        let mut group = AccordionGroup::from_element(&mut doc, root).unwrap();
        assert!(!group.allow_multiple);

        group.toggle(&mut doc, 0);
        assert!(group.panels()[0].expanded());
        assert!(!group.panels()[1].expanded());

        group.toggle(&mut doc, 1);
        assert!(!group.panels()[0].expanded());
        assert!(group.panels()[1].expanded());

        let (h0, i1) = (group.panels()[0].header, group.panels()[1].item);
        assert_eq!(doc.attr(h0, EXPANDED_ATTR), Some("false"));
        assert!(doc.has_class(i1, EXPANDED_CLASS));
    }

    #[test]
    fn allow_multiple_requires_exact_true() {
        let mut doc = Document::new("t");
        let a = accordion(&mut doc, Some("True"), 2);
        let b = accordion(&mut doc, Some("true"), 2);
        assert!(AccordionGroup::from_element(&mut doc, a).unwrap().allow_multiple);
        assert!(!AccordionGroup::from_element(&mut doc, b).unwrap().allow_multiple);
    }

    #[test]
    fn multi_group_keeps_panels_independent() {
        let mut doc = Document::new("t");
        let root = accordion(&mut doc, Some("True"), 3);
        let mut group = AccordionGroup::from_element(&mut doc, root).unwrap();
        group.toggle(&mut doc, 0);
        group.toggle(&mut doc, 2);
        assert_eq!(group.expanded_count(), 2);
        group.toggle(&mut doc, 0);
        assert_eq!(group.expanded_count(), 1);
    }

    #[test]
    fn single_panel_toggles_like_any_other() {
        let mut doc = Document::new("t");
        let root = accordion(&mut doc, None, 1);
        let mut group = AccordionGroup::from_element(&mut doc, root).unwrap();
        group.toggle(&mut doc, 0);
        assert_eq!(group.expanded_count(), 1);
        group.toggle(&mut doc, 0);
        assert_eq!(group.expanded_count(), 0);
        group.toggle(&mut doc, 9);
        assert_eq!(group.expanded_count(), 0);
    }

    #[test]
    fn empty_group_is_rejected() {
        let mut doc = Document::new("t");
        let root = accordion(&mut doc, None, 0);
        assert!(matches!(
            AccordionGroup::from_element(&mut doc, root),
            Err(SetupError::MissingPart { .. })
        ));
    }

    #[test]
    fn initial_markup_is_normalised_for_exclusive_groups() {
        let mut doc = Document::new("t");
        let root = accordion(&mut doc, None, 3);
        for item in doc.descendants_by_class(root, ITEM_CLASS) {
            doc.add_class(item, EXPANDED_CLASS);
        }
        let group = AccordionGroup::from_element(&mut doc, root).unwrap();
        assert_eq!(group.expanded_count(), 1);
        assert!(group.panels()[0].expanded());
    }

    proptest! {
        #[test]
        fn exclusive_group_never_has_two_open(toggles in prop::collection::vec(0usize..4, 0..40)) {
            let mut doc = Document::new("t");
            let root = accordion(&mut doc, None, 4);
            let mut group = AccordionGroup::from_element(&mut doc, root).unwrap();
            for t in toggles {
                group.toggle(&mut doc, t);
                prop_assert!(group.expanded_count() <= 1);
                let marked = group
                    .panels()
                    .iter()
                    .filter(|p| doc.has_class(p.item, EXPANDED_CLASS))
                    .count();
                prop_assert_eq!(marked, group.expanded_count());
            }
        }
    }
}
