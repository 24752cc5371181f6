//! Sizing of engine-inserted SVG roots
//!
//! The engine writes fixed `width`/`height` on the `<svg>` it appends. In
//! the page the preview should follow its container instead, so each
//! top-level root gets `width="100%"` and loses `height`. Nested roots
//! (embedded logos) keep their own geometry.

/// The part of a DOM element the sizing pass needs
pub trait SurfaceElement: Sized {
    /// Local tag name, lower case for SVG content
    fn tag_name(&self) -> String;
    fn parent_element(&self) -> Option<Self>;
    /// Every descendant `<svg>` element, in document order
    fn descendant_svgs(&self) -> Vec<Self>;
    fn set_attribute(&self, name: &str, value: &str);
    fn remove_attribute(&self, name: &str);
}

fn is_svg<E: SurfaceElement>(element: &E) -> bool {
    element.tag_name().eq_ignore_ascii_case("svg")
}

/// An `<svg>` with no `<svg>` ancestor
pub fn is_top_level_svg<E: SurfaceElement>(element: &E) -> bool {
    if !is_svg(element) {
        return false;
    }
    let mut current = element.parent_element();
    while let Some(ancestor) = current {
        if is_svg(&ancestor) {
            return false;
        }
        current = ancestor.parent_element();
    }
    true
}

/// Let the root follow its container's width
pub fn make_responsive<E: SurfaceElement>(element: &E) {
    element.remove_attribute("height");
    element.set_attribute("width", "100%");
}

/// Apply `make_responsive` to the inserted node and every top-level root
/// inside it. Returns how many elements were touched.
pub fn normalize_inserted<E: SurfaceElement>(added: &E) -> usize {
    let mut touched = 0;
    if is_top_level_svg(added) {
        make_responsive(added);
        touched += 1;
    }
    for svg in added.descendant_svgs() {
        if is_top_level_svg(&svg) {
            make_responsive(&svg);
            touched += 1;
        }
    }
    touched
}
