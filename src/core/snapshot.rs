//! Serializable view of a page's markers, for `--dump` and tests.

use std::collections::BTreeMap;

use serde::Serialize;

use super::dom::ElementId;
use super::page::{Page, WidgetSummary};

#[derive(Debug, Serialize)]
pub struct ElementMarkers {
    pub id: ElementId,
    pub tag: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attrs: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub style: BTreeMap<String, String>,
}

#[derive(Debug, Serialize)]
pub struct PageSnapshot {
    pub title: String,
    pub scroll: f64,
    pub height: f64,
    pub viewer_open: bool,
    pub summary: WidgetSummary,
    /// Reveal targets still waiting to enter the viewport.
    pub watching: usize,
    pub revealed: usize,
    /// Expanded panel count per accordion.
    pub open_panels: Vec<usize>,
    /// `data-tab-index` of the shown panel per tab group.
    pub shown_tabs: Vec<Option<usize>>,
    /// Position of the displayed slide per carousel.
    pub active_slides: Vec<usize>,
    pub elements: Vec<ElementMarkers>,
}

impl PageSnapshot {
    /// Every element carrying at least one class, attribute or inline style,
    /// in document order.
    pub fn capture(page: &Page) -> Self {
        let doc = &page.doc;
        let elements = doc
            .document_order()
            .into_iter()
            .filter_map(|id| {
                let el = doc.get(id);
                if el.classes.is_empty() && el.attrs.is_empty() && el.style.is_empty() {
                    return None;
                }
                Some(ElementMarkers {
                    id,
                    tag: el.tag.clone(),
                    classes: el.classes.clone(),
                    attrs: el.attrs.clone(),
                    style: el.style.clone(),
                })
            })
            .collect();

        Self {
            title: doc.title.clone(),
            scroll: page.scroll(),
            height: page.height(),
            viewer_open: page.viewer.is_open(),
            summary: page.summary(),
            watching: page.observer.watched_count(),
            revealed: page.reveal.targets().iter().filter(|t| t.revealed()).count(),
            open_panels: page.accordions.iter().map(|a| a.expanded_count()).collect(),
            shown_tabs: page
                .tabs
                .iter()
                .map(|t| t.shown_panel().map(|p| p.index))
                .collect(),
            active_slides: page.carousels.iter().map(|c| c.active()).collect(),
            elements,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::manifest;
    use crate::core::timer::ManualScheduler;

    #[test]
    fn captures_marked_elements_only() {
        let doc = manifest::parse(
            r#"{ "title": "S", "body": [
                { "tag": "p", "text": "plain" },
                { "class": "accordion-block", "children": [
                    { "class": "accordion-item", "children": [
                        { "class": "accordion-header", "text": "H" },
                        { "class": "accordion-body", "text": "B" } ] } ] } ] }"#,
        )
        .unwrap();
        let mut sched = ManualScheduler::new();
        let page = Page::init(doc, 40, 10, &mut sched);

        let snap = PageSnapshot::capture(&page);
        assert_eq!(snap.summary.accordions, 1);
        assert!(snap.elements.iter().all(|e| e.tag != "p"));
        let header = snap
            .elements
            .iter()
            .find(|e| e.classes.iter().any(|c| c == "accordion-header"))
            .unwrap();
        assert_eq!(header.attrs.get("aria-expanded").map(String::as_str), Some("false"));

        let json = serde_json::to_value(&snap).unwrap();
        assert_eq!(json["title"], "S");
        assert_eq!(json["viewer_open"], false);
        assert_eq!(json["open_panels"], serde_json::json!([0]));
        assert_eq!(json["active_slides"], serde_json::json!([]));
    }
}
