//! SVG post-processing for standalone export
//!
//! - `tree`: owned XML tree (quick-xml reader/writer)
//! - `flatten`: nested `<svg>` to `<g transform>` rewriting

pub mod flatten;
pub mod tree;

pub use flatten::{flatten_nested_svgs, nested_root_paths, parse_view_box, FlattenReport, NestedViewport, ViewBox};
pub use tree::{Element, SvgDocument, XmlNode};

use thiserror::Error;

/// Fatal errors while reading or writing markup
#[derive(Debug, Clone, Error, PartialEq)]
pub enum SvgError {
    /// Markup is not well-formed
    #[error("Invalid SVG markup: {0}")]
    Parse(String),

    /// No root element in the document
    #[error("SVG markup has no root element")]
    MissingRoot,

    /// Serialization failed
    #[error("Failed to write SVG: {0}")]
    Write(String),
}

/// Parse, flatten nested roots, add the given comments before the root and
/// serialize again
pub fn flatten_markup(markup: &str, comments: &[String]) -> Result<(String, FlattenReport), SvgError> {
    let mut document = SvgDocument::parse(markup)?;
    let report = flatten_nested_svgs(&mut document);
    flatten::prepend_comments(&mut document, comments);
    Ok((document.to_markup()?, report))
}
