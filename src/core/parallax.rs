//! Depth parallax: layers translate against the scroll position.

use super::dom::{Document, ElementId};
use super::error::SetupError;

pub const ROOT_CLASS: &str = "parallax-block";
pub const LAYER_CLASS: &str = "parallax-layer";
/// Coefficient added per layer: layer `n` moves at `(n + 1) × SPEED_STEP`.
pub const SPEED_STEP: f64 = 0.1;

#[derive(Debug, Clone, Copy)]
pub struct Layer {
    pub element: ElementId,
    pub coefficient: f64,
}

#[derive(Debug, Clone)]
pub struct Parallax {
    pub root: ElementId,
    pub layers: Vec<Layer>,
}

/// Vertical displacement of a layer for a given scroll position.
pub fn offset(scroll: f64, coefficient: f64) -> f64 {
    let y = -(scroll * coefficient);
    // Avoid rendering "-0".
    if y == 0.0 {
        0.0
    } else {
        y
    }
}

/// Inline `transform` value for a vertical translation.
pub fn translate_y(y: f64) -> String {
    format!("translateY({y:.2}px)")
}

/// Inverse of [`translate_y`], for consumers of the marker.
pub fn parse_translate_y(value: &str) -> Option<f64> {
    value
        .trim()
        .strip_prefix("translateY(")?
        .strip_suffix(')')?
        .trim_end_matches("px")
        .trim()
        .parse()
        .ok()
}

impl Parallax {
    pub fn from_element(doc: &Document, root: ElementId) -> Result<Self, SetupError> {
        let layers: Vec<Layer> = doc
            .descendants_by_class(root, LAYER_CLASS)
            .into_iter()
            // Layers of a nested block belong to that block.
            .filter(|&l| doc.closest_ancestor(l, ROOT_CLASS) == Some(root))
            .enumerate()
            .map(|(pos, element)| Layer {
                element,
                coefficient: (pos + 1) as f64 * SPEED_STEP,
            })
            .collect();
        if layers.is_empty() {
            return Err(SetupError::MissingPart {
                widget: "parallax",
                root,
                part: LAYER_CLASS,
            });
        }
        Ok(Self { root, layers })
    }

    /// Recompute every layer's translation from `scroll`.  Nothing is cached.
    pub fn apply(&self, doc: &mut Document, scroll: f64) {
        for layer in &self.layers {
            doc.set_style(layer.element, "transform", translate_y(offset(scroll, layer.coefficient)));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parallax(doc: &mut Document, layers: usize) -> ElementId {
        let root = doc.create_element("section");
        doc.add_class(root, ROOT_CLASS);
        doc.append_child(doc.body(), root);
        for _ in 0..layers {
            let l = doc.create_element("div");
            doc.add_class(l, LAYER_CLASS);
            doc.append_child(root, l);
        }
        root
    }

    #[test]
    fn coefficients_follow_layer_position() {
        let mut doc = Document::new("t");
        let root = parallax(&mut doc, 3);
        let p = Parallax::from_element(&doc, root).unwrap();
        let c: Vec<f64> = p.layers.iter().map(|l| l.coefficient).collect();
        assert!((c[0] - 0.1).abs() < 1e-9);
        assert!((c[2] - 0.3).abs() < 1e-9);
    }

    #[test]
    fn apply_is_a_pure_function_of_scroll() {
        let mut doc = Document::new("t");
        let root = parallax(&mut doc, 2);
        let p = Parallax::from_element(&doc, root).unwrap();

        p.apply(&mut doc, 100.0);
        let (l0, l1) = (p.layers[0].element, p.layers[1].element);
        assert_eq!(doc.style(l0, "transform"), Some("translateY(-10.00px)"));
        assert_eq!(doc.style(l1, "transform"), Some("translateY(-20.00px)"));

        p.apply(&mut doc, 0.0);
        p.apply(&mut doc, 0.0);
        assert_eq!(doc.style(l1, "transform"), Some("translateY(0.00px)"));

        p.apply(&mut doc, 100.0);
        assert_eq!(doc.style(l1, "transform"), Some("translateY(-20.00px)"));
    }

    #[test]
    fn marker_round_trips_through_parser() {
        assert_eq!(parse_translate_y("translateY(-12.50px)"), Some(-12.5));
        assert_eq!(parse_translate_y("scale(2)"), None);
    }

    #[test]
    fn nested_block_layers_are_not_claimed_by_outer() {
        let mut doc = Document::new("t");
        let outer = parallax(&mut doc, 1);
        let inner = doc.create_element("section");
        doc.add_class(inner, ROOT_CLASS);
        doc.append_child(outer, inner);
        for _ in 0..2 {
            let l = doc.create_element("div");
            doc.add_class(l, LAYER_CLASS);
            doc.append_child(inner, l);
        }

        let o = Parallax::from_element(&doc, outer).unwrap();
        assert_eq!(o.layers.len(), 1);
        let i = Parallax::from_element(&doc, inner).unwrap();
        assert_eq!(i.layers.len(), 2);
        assert!((i.layers[1].coefficient - 0.2).abs() < 1e-9);
    }

    #[test]
    fn block_without_layers_is_rejected() {
        let mut doc = Document::new("t");
        let root = parallax(&mut doc, 0);
        assert!(Parallax::from_element(&doc, root).is_err());
    }
}
