//! Nested `<svg>` flattening
//!
//! The rendering engine embeds vector logos as nested `<svg>` elements
//! positioned with `x`/`y`/`width`/`height`/`viewBox`. Standalone files
//! should not rely on nested viewports, so each one is rewritten as a `<g>`
//! carrying the equivalent `translate(..) scale(..)` transform.
//!
//! Nested roots are processed innermost/last first. A node whose viewport
//! attributes are missing or unreadable is left exactly as it is.

use lazy_static::lazy_static;
use regex::Regex;

use super::tree::{Element, SvgDocument, XmlNode};

/// Attributes consumed by the viewport and not carried over to the group
const DROPPED_ATTRIBUTES: [&str; 7] = ["x", "y", "width", "height", "viewBox", "fill", "overflow"];

lazy_static! {
    static ref VIEW_BOX: Regex = Regex::new(
        r"^\s*([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)\s+([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)\s+([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)\s+([-+]?\d*\.?\d+(?:[eE][-+]?\d+)?)\s*$"
    )
    .expect("viewBox pattern is valid");
}

/// `viewBox="minX minY width height"`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewBox {
    pub min_x: f64,
    pub min_y: f64,
    pub width: f64,
    pub height: f64,
}

/// Parse a viewBox made of exactly four space-separated numbers
pub fn parse_view_box(value: &str) -> Option<ViewBox> {
    let caps = VIEW_BOX.captures(value)?;
    let number = |i: usize| caps.get(i)?.as_str().parse::<f64>().ok();
    Some(ViewBox {
        min_x: number(1)?,
        min_y: number(2)?,
        width: number(3)?,
        height: number(4)?,
    })
}

/// Placement of a nested root inside its parent's coordinate system
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NestedViewport {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub view_box: ViewBox,
}

impl NestedViewport {
    /// Read the five viewport attributes; None if any is missing or bad
    pub fn from_element(element: &Element) -> Option<NestedViewport> {
        let viewport = NestedViewport {
            x: parse_length(element.attribute("x")?)?,
            y: parse_length(element.attribute("y")?)?,
            width: parse_length(element.attribute("width")?)?,
            height: parse_length(element.attribute("height")?)?,
            view_box: parse_view_box(element.attribute("viewBox")?)?,
        };
        let (scale_x, scale_y) = viewport.scale();
        let positive = viewport.view_box.width > 0.0 && viewport.view_box.height > 0.0;
        if positive && scale_x.is_finite() && scale_y.is_finite() {
            Some(viewport)
        } else {
            None
        }
    }

    pub fn scale(&self) -> (f64, f64) {
        (self.width / self.view_box.width, self.height / self.view_box.height)
    }

    pub fn translation(&self) -> (f64, f64) {
        let (scale_x, scale_y) = self.scale();
        (
            self.x - self.view_box.min_x * scale_x,
            self.y - self.view_box.min_y * scale_y,
        )
    }

    /// `translate(tx,ty) scale(sx,sy)` with three decimals
    pub fn transform(&self) -> String {
        let (tx, ty) = self.translation();
        let (sx, sy) = self.scale();
        format!("translate({:.3},{:.3}) scale({:.3},{:.3})", tx, ty, sx, sy)
    }
}

/// Plain number, optionally with a `px` unit
fn parse_length(value: &str) -> Option<f64> {
    let trimmed = value.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim_end();
    number.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// Outcome of a flattening pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FlattenReport {
    pub flattened: usize,
    pub skipped: usize,
}

/// Paths (child indices from the root) of every `<svg>` nested inside
/// another `<svg>`, in document order
pub fn nested_root_paths(root: &Element) -> Vec<Vec<usize>> {
    let mut paths = Vec::new();
    root.walk(&mut |path, element, svg_ancestors| {
        if element.is_svg_root() && svg_ancestors > 0 {
            paths.push(path.to_vec());
        }
    });
    paths
}

/// Flatten every nested root of the document, last one first
pub fn flatten_nested_svgs(document: &mut SvgDocument) -> FlattenReport {
    let mut paths = nested_root_paths(&document.root);
    paths.reverse();
    flatten_paths(&mut document.root, &paths)
}

/// Flatten the nested roots at `paths`, in the given order.
///
/// Each replacement swaps one node for one node, so paths collected before
/// the pass stay valid throughout it.
pub fn flatten_paths(root: &mut Element, paths: &[Vec<usize>]) -> FlattenReport {
    let mut report = FlattenReport::default();
    for path in paths {
        if flatten_at(root, path) {
            report.flattened += 1;
        } else {
            report.skipped += 1;
        }
    }
    if report.skipped > 0 {
        log::debug!("Left {} nested svg element(s) without usable viewport attributes", report.skipped);
    }
    report
}

/// Replace the nested root at `path` with an equivalent group.
/// Returns false (and changes nothing) when the node cannot be flattened.
pub fn flatten_at(root: &mut Element, path: &[usize]) -> bool {
    let Some(slot) = root.node_at_mut(path) else {
        return false;
    };
    let XmlNode::Element(svg) = &mut *slot else {
        return false;
    };
    if !svg.is_svg_root() {
        return false;
    }
    let Some(viewport) = NestedViewport::from_element(svg) else {
        return false;
    };

    let group = into_group(std::mem::replace(svg, Element::new("")), &viewport);
    *slot = XmlNode::Element(group);
    true
}

fn into_group(svg: Element, viewport: &NestedViewport) -> Element {
    let name = match svg.prefix() {
        Some(prefix) => format!("{}:g", prefix),
        None => "g".to_string(),
    };
    let mut group = Element::new(name);

    let mut transform = viewport.transform();
    if let Some(own) = svg.attribute("transform") {
        // An svg-level transform applies before its viewport placement
        transform = format!("{} {}", own.trim(), transform);
    }
    group.attributes.push(("transform".to_string(), transform));

    for (key, value) in svg.attributes {
        if key == "transform" || DROPPED_ATTRIBUTES.contains(&key.as_str()) {
            continue;
        }
        group.attributes.push((key, value));
    }
    group.children = svg.children;
    group
}

/// Insert comments right before the root element
pub fn prepend_comments(document: &mut SvgDocument, comments: &[String]) {
    for comment in comments {
        document.prolog.push(XmlNode::Comment(comment.clone()));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(markup: &str) -> Element {
        SvgDocument::parse(markup).unwrap().root
    }

    #[test]
    fn test_parse_view_box() {
        assert_eq!(
            parse_view_box("0 0 50 25"),
            Some(ViewBox { min_x: 0.0, min_y: 0.0, width: 50.0, height: 25.0 })
        );
        assert_eq!(parse_view_box(" -1.5 2 .5 1e2 ").map(|v| v.height), Some(100.0));
        assert!(parse_view_box("0,0,50,25").is_none());
        assert!(parse_view_box("0 0 50").is_none());
        assert!(parse_view_box("0 0 50 25 1").is_none());
        assert!(parse_view_box("a b c d").is_none());
    }

    #[test]
    fn test_transform_with_offset_view_box() {
        let svg = element(r#"<svg x="5" y="5" width="20" height="40" viewBox="10 10 10 10"/>"#);
        let viewport = NestedViewport::from_element(&svg).unwrap();
        assert_eq!(viewport.scale(), (2.0, 4.0));
        assert_eq!(viewport.translation(), (-15.0, -35.0));
        assert_eq!(viewport.transform(), "translate(-15.000,-35.000) scale(2.000,4.000)");
    }

    #[test]
    fn test_rejects_zero_view_box() {
        let svg = element(r#"<svg x="0" y="0" width="20" height="20" viewBox="0 0 0 10"/>"#);
        assert!(NestedViewport::from_element(&svg).is_none());
    }

    #[test]
    fn test_px_lengths() {
        let svg = element(r#"<svg x="1px" y="2" width="10px" height="10" viewBox="0 0 5 5"/>"#);
        assert!(NestedViewport::from_element(&svg).is_some());
        let svg = element(r#"<svg x="1em" y="2" width="10" height="10" viewBox="0 0 5 5"/>"#);
        assert!(NestedViewport::from_element(&svg).is_none());
    }

    #[test]
    fn test_group_keeps_other_attributes() {
        let mut root = element(
            r#"<svg><svg id="logo" class="brand" x="0" y="0" width="10" height="10" viewBox="0 0 10 10" fill="none" overflow="visible" transform="rotate(45)"><path d="M0 0"/></svg></svg>"#,
        );
        assert!(flatten_at(&mut root, &[0]));
        let group = root.element_at(&[0]).unwrap();
        assert_eq!(group.name, "g");
        assert_eq!(
            group.attributes,
            vec![
                ("transform".to_string(), "rotate(45) translate(0.000,0.000) scale(1.000,1.000)".to_string()),
                ("id".to_string(), "logo".to_string()),
                ("class".to_string(), "brand".to_string()),
            ]
        );
        assert_eq!(group.child_elements().next().unwrap().name, "path");
    }

    #[test]
    fn test_prefixed_nested_root_becomes_prefixed_group() {
        let mut root = element(
            r#"<svg:svg xmlns:svg="http://www.w3.org/2000/svg"><svg:svg x="0" y="0" width="4" height="4" viewBox="0 0 2 2"/></svg:svg>"#,
        );
        assert!(flatten_at(&mut root, &[0]));
        assert_eq!(root.element_at(&[0]).unwrap().name, "svg:g");
    }

    #[test]
    fn test_flatten_at_ignores_non_svg() {
        let mut root = element(r#"<svg><g/>text</svg>"#);
        assert!(!flatten_at(&mut root, &[0]));
        assert!(!flatten_at(&mut root, &[1]));
        assert!(!flatten_at(&mut root, &[7]));
        assert!(!flatten_at(&mut root, &[]));
    }

    #[test]
    fn test_nested_root_paths_in_document_order() {
        let root = element(r#"<svg><svg id="a"><svg id="b"/></svg><g><svg id="c"/></g></svg>"#);
        assert_eq!(nested_root_paths(&root), vec![vec![0], vec![0, 0], vec![1, 0]]);
    }

    #[test]
    fn test_inner_and_outer_both_flatten() {
        let mut doc = SvgDocument::parse(
            r#"<svg><svg x="0" y="0" width="20" height="20" viewBox="0 0 10 10"><svg x="1" y="1" width="2" height="2" viewBox="0 0 1 1"/></svg></svg>"#,
        )
        .unwrap();
        let report = flatten_nested_svgs(&mut doc);
        assert_eq!(report, FlattenReport { flattened: 2, skipped: 0 });
        assert!(nested_root_paths(&doc.root).is_empty());
        assert_eq!(
            doc.root.element_at(&[0, 0]).unwrap().attribute("transform"),
            Some("translate(1.000,1.000) scale(2.000,2.000)")
        );
    }
}
