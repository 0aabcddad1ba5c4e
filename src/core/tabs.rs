//! Single-active-tab groups.

use super::dom::{Document, ElementId};
use super::error::SetupError;

pub const ROOT_CLASS: &str = "tabs-block";
pub const TRIGGER_CLASS: &str = "tab-button";
pub const PANEL_CLASS: &str = "tab-panel";
pub const INDEX_ATTR: &str = "data-tab-index";
pub const ACTIVE_CLASS: &str = "active";

#[derive(Debug, Clone, Copy)]
pub struct Tab {
    pub index: usize,
    pub trigger: ElementId,
}

#[derive(Debug, Clone, Copy)]
pub struct TabPanel {
    pub index: usize,
    pub element: ElementId,
}

#[derive(Debug, Clone)]
pub struct TabGroup {
    pub root: ElementId,
    tabs: Vec<Tab>,
    panels: Vec<TabPanel>,
    /// Position in `tabs` of the active tab.
    active: usize,
}

impl TabGroup {
    /// Wire the tab group rooted at `root` and activate its initial tab
    /// (the one the markup already marks active, otherwise the first).
    pub fn from_element(doc: &mut Document, root: ElementId) -> Result<Self, SetupError> {
        let mut tabs = Vec::new();
        for trigger in doc.descendants_by_class(root, TRIGGER_CLASS) {
            if doc.closest_ancestor(trigger, ROOT_CLASS) != Some(root) {
                continue;
            }
            let raw = doc.attr(trigger, INDEX_ATTR);
            match parse_index(raw) {
                Some(index) => tabs.push(Tab { index, trigger }),
                None => {
                    let err = SetupError::BadAttribute {
                        widget: "tabs",
                        root,
                        attr: INDEX_ATTR,
                        value: raw.unwrap_or_default().to_string(),
                    };
                    tracing::warn!(%err, trigger, "tabs: trigger skipped");
                }
            }
        }
        if tabs.is_empty() {
            return Err(SetupError::MissingPart {
                widget: "tabs",
                root,
                part: TRIGGER_CLASS,
            });
        }

        let panels = doc
            .descendants_by_class(root, PANEL_CLASS)
            .into_iter()
            .filter(|&p| doc.closest_ancestor(p, ROOT_CLASS) == Some(root))
            .filter_map(|element| {
                parse_index(doc.attr(element, INDEX_ATTR)).map(|index| TabPanel { index, element })
            })
            .collect();

        let initial = tabs
            .iter()
            .position(|t| doc.has_class(t.trigger, ACTIVE_CLASS))
            .unwrap_or(0);

        let mut group = Self {
            root,
            tabs,
            panels,
            active: initial,
        };
        group.activate(doc, initial);
        Ok(group)
    }

    /// Make `tab` (a position in [`TabGroup::tabs`]) the only active tab and
    /// show the first panel with the same index, if any.
    pub fn activate(&mut self, doc: &mut Document, tab: usize) {
        let Some(chosen) = self.tabs.get(tab).copied() else {
            return;
        };
        self.active = tab;

        for t in &self.tabs {
            doc.remove_class(t.trigger, ACTIVE_CLASS);
        }
        for p in &self.panels {
            doc.remove_class(p.element, ACTIVE_CLASS);
        }

        doc.add_class(chosen.trigger, ACTIVE_CLASS);
        if let Some(panel) = self.panels.iter().find(|p| p.index == chosen.index) {
            doc.add_class(panel.element, ACTIVE_CLASS);
        }
        tracing::debug!(root = self.root, index = chosen.index, "tabs: activated");
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn panels(&self) -> &[TabPanel] {
        &self.panels
    }

    /// The `data-tab-index` of the active tab.
    pub fn active_index(&self) -> usize {
        self.tabs[self.active].index
    }

    /// The panel currently shown, if one matches the active index.
    pub fn shown_panel(&self) -> Option<&TabPanel> {
        let index = self.active_index();
        self.panels.iter().find(|p| p.index == index)
    }
}

fn parse_index(raw: Option<&str>) -> Option<usize> {
    raw.and_then(|s| s.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    /// `panel_indices` lets a test leave a trigger without a matching panel.
    fn tabs(doc: &mut Document, trigger_indices: &[&str], panel_indices: &[&str]) -> ElementId {
        let root = doc.create_element("div");
        doc.add_class(root, ROOT_CLASS);
        doc.append_child(doc.body(), root);
        let nav = doc.create_element("nav");
        doc.append_child(root, nav);
        for idx in trigger_indices {
            let b = doc.create_element("button");
            doc.add_class(b, TRIGGER_CLASS);
            doc.set_attr(b, INDEX_ATTR, *idx);
            doc.append_child(nav, b);
        }
        for idx in panel_indices {
            let p = doc.create_element("div");
            doc.add_class(p, PANEL_CLASS);
            doc.set_attr(p, INDEX_ATTR, *idx);
            doc.append_child(root, p);
        }
        root
    }

    fn active_markers(doc: &Document, group: &TabGroup) -> (usize, usize) {
        let triggers = group.tabs().iter().filter(|t| doc.has_class(t.trigger, ACTIVE_CLASS)).count();
        let panels = group.panels().iter().filter(|p| doc.has_class(p.element, ACTIVE_CLASS)).count();
        (triggers, panels)
    }

    #[test]
    fn first_tab_is_active_after_setup() {
        let mut doc = Document::new("t");
        let root = tabs(&mut doc, &["0", "1", "2"], &["0", "1", "2"]);
        let group = TabGroup::from_element(&mut doc, root).unwrap();
        assert_eq!(group.active_index(), 0);
        assert_eq!(active_markers(&doc, &group), (1, 1));
    }

    #[test]
    fn activation_moves_markers() {
        let mut doc = Document::new("t");
        let root = tabs(&mut doc, &["0", "1", "2"], &["0", "1", "2"]);
        let mut group = TabGroup::from_element(&mut doc, root).unwrap();
        group.activate(&mut doc, 2);
        assert_eq!(group.active_index(), 2);
        assert!(doc.has_class(group.panels()[2].element, ACTIVE_CLASS));
        assert!(!doc.has_class(group.panels()[0].element, ACTIVE_CLASS));
        assert_eq!(active_markers(&doc, &group), (1, 1));

        // Re-activating is idempotent and re-applies markers.
        doc.remove_class(group.tabs()[2].trigger, ACTIVE_CLASS);
        group.activate(&mut doc, 2);
        assert_eq!(active_markers(&doc, &group), (1, 1));
    }

    #[test]
    fn missing_panel_leaves_nothing_shown() {
        let mut doc = Document::new("t");
        let root = tabs(&mut doc, &["0", "5"], &["0"]);
        let mut group = TabGroup::from_element(&mut doc, root).unwrap();
        group.activate(&mut doc, 1);
        assert!(group.shown_panel().is_none());
        assert_eq!(active_markers(&doc, &group), (1, 0));
    }

    #[test]
    fn unparsable_indices_are_skipped() {
        let mut doc = Document::new("t");
        let root = tabs(&mut doc, &["x", "1"], &["1"]);
        let group = TabGroup::from_element(&mut doc, root).unwrap();
        assert_eq!(group.tabs().len(), 1);
        assert_eq!(group.active_index(), 1);

        let empty = tabs(&mut doc, &["nope"], &[]);
        assert!(TabGroup::from_element(&mut doc, empty).is_err());
    }

    proptest! {
        #[test]
        fn exactly_one_active_tab(seq in prop::collection::vec(0usize..5, 0..30)) {
            let mut doc = Document::new("t");
            let root = tabs(&mut doc, &["0", "1", "2", "3"], &["0", "1", "3"]);
            let mut group = TabGroup::from_element(&mut doc, root).unwrap();
            for t in seq {
                group.activate(&mut doc, t);
                let (triggers, panels) = active_markers(&doc, &group);
                prop_assert_eq!(triggers, 1);
                match group.shown_panel() {
                    Some(p) => {
                        prop_assert_eq!(p.index, group.active_index());
                        prop_assert_eq!(panels, 1);
                    }
                    None => prop_assert_eq!(panels, 0),
                }
            }
        }
    }
}
