//! Owned, mutable XML tree for SVG post-processing
//!
//! Built from quick-xml events and written back with the quick-xml writer.
//! Names are kept exactly as written (prefix included) and `xmlns`
//! declarations stay ordinary attributes, so a parse/serialize cycle keeps
//! the markup intact apart from whitespace inside tags and quoting style.

use std::borrow::Cow;

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::SvgError;

/// A node of the tree
#[derive(Debug, Clone, PartialEq)]
pub enum XmlNode {
    Element(Element),
    /// Unescaped character data
    Text(String),
    CData(String),
    Comment(String),
    /// Raw processing instruction body (`xml-stylesheet href="..."`)
    ProcessingInstruction(String),
}

/// An element with its attributes in document order
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Qualified name as written, e.g. `svg` or `svg:svg`
    pub name: String,
    /// (qualified name, unescaped value)
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        match self.name.rsplit_once(':') {
            Some((_, local)) => local,
            None => &self.name,
        }
    }

    /// Namespace prefix, if the name has one
    pub fn prefix(&self) -> Option<&str> {
        self.name.rsplit_once(':').map(|(prefix, _)| prefix)
    }

    pub fn is_svg_root(&self) -> bool {
        self.local_name() == "svg"
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set or replace an attribute, keeping its position if it exists
    pub fn set_attribute(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn remove_attribute(&mut self, name: &str) -> Option<String> {
        let index = self.attributes.iter().position(|(key, _)| key == name)?;
        Some(self.attributes.remove(index).1)
    }

    /// Child elements only
    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            XmlNode::Element(element) => Some(element),
            _ => None,
        })
    }

    /// Follow a path of child indices from this element
    pub fn element_at(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            match current.children.get(index)? {
                XmlNode::Element(element) => current = element,
                _ => return None,
            }
        }
        Some(current)
    }

    /// Node slot at a non-empty path, for in-place replacement
    pub fn node_at_mut(&mut self, path: &[usize]) -> Option<&mut XmlNode> {
        let (last, parents) = path.split_last()?;
        let mut current = self;
        for &index in parents {
            match current.children.get_mut(index)? {
                XmlNode::Element(element) => current = element,
                _ => return None,
            }
        }
        current.children.get_mut(*last)
    }

    /// Visit every descendant element depth-first in document order,
    /// passing its child-index path and the number of `svg` elements
    /// above it (this element counts when it is one).
    pub fn walk<F>(&self, visit: &mut F)
    where
        F: FnMut(&[usize], &Element, usize),
    {
        let mut path = Vec::new();
        let depth = usize::from(self.is_svg_root());
        walk_children(self, &mut path, depth, visit);
    }
}

fn walk_children<F>(element: &Element, path: &mut Vec<usize>, svg_depth: usize, visit: &mut F)
where
    F: FnMut(&[usize], &Element, usize),
{
    for (index, child) in element.children.iter().enumerate() {
        if let XmlNode::Element(child) = child {
            path.push(index);
            visit(path, child, svg_depth);
            let depth = svg_depth + usize::from(child.is_svg_root());
            walk_children(child, path, depth, visit);
            path.pop();
        }
    }
}

/// XML declaration fields
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDecl {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A parsed document: declaration, prolog nodes, one root, epilog nodes
#[derive(Debug, Clone, PartialEq)]
pub struct SvgDocument {
    pub decl: Option<XmlDecl>,
    /// Raw DOCTYPE body
    pub doctype: Option<String>,
    /// Comments and processing instructions before the root element
    pub prolog: Vec<XmlNode>,
    pub root: Element,
    /// Comments and processing instructions after the root element
    pub epilog: Vec<XmlNode>,
}

impl SvgDocument {
    /// Parse serialized markup
    pub fn parse(markup: &str) -> Result<SvgDocument, SvgError> {
        let mut reader = Reader::from_str(markup);
        reader.trim_text(false);

        let mut decl = None;
        let mut doctype = None;
        let mut prolog = Vec::new();
        let mut epilog = Vec::new();
        let mut root: Option<Element> = None;
        let mut stack: Vec<Element> = Vec::new();

        loop {
            let position = reader.buffer_position();
            let event = reader
                .read_event()
                .map_err(|e| SvgError::Parse(format!("at byte {}: {}", position, e)))?;

            match event {
                Event::Decl(ref d) => decl = Some(read_decl(d)?),
                Event::DocType(ref t) => doctype = Some(String::from_utf8_lossy(t).into_owned()),
                Event::Start(ref start) => stack.push(read_element(start)?),
                Event::Empty(ref start) => {
                    let element = read_element(start)?;
                    attach(XmlNode::Element(element), &mut stack, &mut root)?;
                }
                Event::End(ref end) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| SvgError::Parse("unbalanced end tag".to_string()))?;
                    if end.name().as_ref() != element.name.as_bytes() {
                        return Err(SvgError::Parse(format!(
                            "mismatched end tag </{}> for <{}>",
                            String::from_utf8_lossy(end.name().as_ref()),
                            element.name
                        )));
                    }
                    attach(XmlNode::Element(element), &mut stack, &mut root)?;
                }
                Event::Text(ref t) => {
                    let text = t
                        .unescape()
                        .map_err(|e| SvgError::Parse(format!("bad text: {}", e)))?
                        .into_owned();
                    // Whitespace outside the root element is dropped
                    if let Some(parent) = stack.last_mut() {
                        parent.children.push(XmlNode::Text(text));
                    } else if !text.trim().is_empty() {
                        return Err(SvgError::Parse("text outside the root element".to_string()));
                    }
                }
                Event::CData(ref c) => {
                    let text = String::from_utf8_lossy(c).into_owned();
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(XmlNode::CData(text)),
                        None => return Err(SvgError::Parse("CDATA outside the root element".to_string())),
                    }
                }
                Event::Comment(ref c) => {
                    let node = XmlNode::Comment(String::from_utf8_lossy(c).into_owned());
                    push_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
                }
                Event::PI(ref p) => {
                    let node = XmlNode::ProcessingInstruction(String::from_utf8_lossy(p).into_owned());
                    push_misc(node, &mut stack, &root, &mut prolog, &mut epilog);
                }
                Event::Eof => break,
            }
        }

        if !stack.is_empty() {
            return Err(SvgError::Parse(format!("unclosed element <{}>", stack[stack.len() - 1].name)));
        }
        let root = root.ok_or(SvgError::MissingRoot)?;

        Ok(SvgDocument {
            decl,
            doctype,
            prolog,
            root,
            epilog,
        })
    }

    /// Serialize back to markup
    pub fn to_markup(&self) -> Result<String, SvgError> {
        let mut writer = Writer::new(Vec::new());

        if let Some(decl) = &self.decl {
            let event = BytesDecl::new(&decl.version, decl.encoding.as_deref(), decl.standalone.as_deref());
            write(&mut writer, Event::Decl(event))?;
        }
        if let Some(doctype) = &self.doctype {
            write(&mut writer, Event::DocType(BytesText::from_escaped(doctype.as_str())))?;
        }
        for node in &self.prolog {
            write_node(&mut writer, node)?;
        }
        write_element(&mut writer, &self.root)?;
        for node in &self.epilog {
            write_node(&mut writer, node)?;
        }

        String::from_utf8(writer.into_inner()).map_err(|e| SvgError::Write(e.to_string()))
    }
}

fn read_decl(decl: &BytesDecl) -> Result<XmlDecl, SvgError> {
    let bad = |e: quick_xml::Error| SvgError::Parse(format!("bad XML declaration: {}", e));
    let version = decl.version().map_err(bad)?;
    let encoding = decl.encoding().transpose().map_err(bad)?;
    let standalone = decl.standalone().transpose().map_err(bad)?;
    Ok(XmlDecl {
        version: String::from_utf8_lossy(&version).into_owned(),
        encoding: encoding.map(|e| String::from_utf8_lossy(&e).into_owned()),
        standalone: standalone.map(|s| String::from_utf8_lossy(&s).into_owned()),
    })
}

fn read_element(start: &BytesStart) -> Result<Element, SvgError> {
    let mut element = Element::new(String::from_utf8_lossy(start.name().as_ref()).into_owned());
    for attr in start.attributes() {
        let attr = attr.map_err(|e| SvgError::Parse(format!("bad attribute on <{}>: {}", element.name, e)))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| SvgError::Parse(format!("bad value for '{}': {}", key, e)))?
            .into_owned();
        element.attributes.push((key, value));
    }
    Ok(element)
}

/// Attach a finished element to its parent, or make it the root
fn attach(node: XmlNode, stack: &mut [Element], root: &mut Option<Element>) -> Result<(), SvgError> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => match node {
            XmlNode::Element(element) if root.is_none() => *root = Some(element),
            XmlNode::Element(element) => {
                return Err(SvgError::Parse(format!("second root element <{}>", element.name)))
            }
            _ => {}
        },
    }
    Ok(())
}

fn push_misc(
    node: XmlNode,
    stack: &mut [Element],
    root: &Option<Element>,
    prolog: &mut Vec<XmlNode>,
    epilog: &mut Vec<XmlNode>,
) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None if root.is_none() => prolog.push(node),
        None => epilog.push(node),
    }
}

fn write(writer: &mut Writer<Vec<u8>>, event: Event) -> Result<(), SvgError> {
    writer
        .write_event(event)
        .map_err(|e| SvgError::Write(e.to_string()))
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> Result<(), SvgError> {
    match node {
        XmlNode::Element(element) => write_element(writer, element),
        XmlNode::Text(text) => write(writer, Event::Text(BytesText::new(text))),
        XmlNode::CData(text) => write(writer, Event::CData(BytesCData::new(text.as_str()))),
        XmlNode::Comment(text) => write(writer, Event::Comment(BytesText::from_escaped(text.as_str()))),
        XmlNode::ProcessingInstruction(body) => {
            write(writer, Event::PI(BytesText::from_escaped(body.as_str())))
        }
    }
}

fn write_element(writer: &mut Writer<Vec<u8>>, element: &Element) -> Result<(), SvgError> {
    let mut start = BytesStart::new(element.name.as_str());
    for (key, value) in &element.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if element.children.is_empty() {
        return write(writer, Event::Empty(start));
    }

    write(writer, Event::Start(start))?;
    for child in &element.children {
        write_node(writer, child)?;
    }
    write(writer, Event::End(BytesEnd::new(Cow::Borrowed(element.name.as_str()))))
}
