//! Part codec - generic XML tree decode/encode
//!
//! Parts are decoded into a schema-free tree (qualified tag, ordered attributes,
//! ordered children) so decoders and the exporter can walk and rewrite
//! arbitrary subtrees without dropping nodes they do not understand.

use crate::pptx::error::{PptxError, PptxResult};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};
use std::borrow::Cow;
use std::io::Write;

/// Child-index path from the root element to a descendant
pub type NodePath = Vec<usize>;

/// A child of an element
#[derive(Debug, Clone, PartialEq)]
pub enum XmlChild {
    Element(XmlNode),
    Text(String),
    Comment(String),
}

/// An element with its attributes and children
#[derive(Debug, Clone, PartialEq, Default)]
pub struct XmlNode {
    /// Qualified name, e.g. `p:sp`
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlChild>,
}

/// The `<?xml ...?>` declaration
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDeclaration {
    pub version: String,
    pub encoding: Option<String>,
    pub standalone: Option<String>,
}

/// A decoded XML part
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    pub declaration: Option<XmlDeclaration>,
    /// Markup between the declaration and the root element, kept verbatim
    pub prolog: String,
    pub root: XmlNode,
    /// Markup after the root element, kept verbatim
    pub epilog: String,
}

impl XmlNode {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Name without namespace prefix
    pub fn local_name(&self) -> &str {
        local_name(&self.name)
    }

    /// Check the local name, ignoring any prefix
    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local
    }

    /// Attribute value by qualified name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Set an attribute, keeping its position when it already exists
    pub fn set_attr(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, existing)) => *existing = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    /// Child elements in order
    pub fn elements(&self) -> impl Iterator<Item = &XmlNode> {
        self.children.iter().filter_map(|child| match child {
            XmlChild::Element(node) => Some(node),
            _ => None,
        })
    }

    /// Child elements with their index in `children`
    pub fn indexed_elements(&self) -> impl Iterator<Item = (usize, &XmlNode)> {
        self.children
            .iter()
            .enumerate()
            .filter_map(|(i, child)| match child {
                XmlChild::Element(node) => Some((i, node)),
                _ => None,
            })
    }

    /// First child element with the given local name
    pub fn child(&self, local: &str) -> Option<&XmlNode> {
        self.elements().find(|node| node.is(local))
    }

    pub fn child_mut(&mut self, local: &str) -> Option<&mut XmlNode> {
        self.children.iter_mut().find_map(|child| match child {
            XmlChild::Element(node) if node.is(local) => Some(node),
            _ => None,
        })
    }

    /// Follow a chain of child local names
    pub fn find(&self, locals: &[&str]) -> Option<&XmlNode> {
        locals
            .iter()
            .try_fold(self, |node, local| node.child(local))
    }

    pub fn find_mut(&mut self, locals: &[&str]) -> Option<&mut XmlNode> {
        let mut node = self;
        for local in locals {
            node = node.child_mut(local)?;
        }
        Some(node)
    }

    /// First descendant (depth-first, pre-order) with the given local name
    pub fn descendant(&self, local: &str) -> Option<&XmlNode> {
        for node in self.elements() {
            if node.is(local) {
                return Some(node);
            }
            if let Some(found) = node.descendant(local) {
                return Some(found);
            }
        }
        None
    }

    /// All descendants with the given local name, in document order
    pub fn descendants<'a>(&'a self, local: &str) -> Vec<&'a XmlNode> {
        let mut found = Vec::new();
        self.collect_descendants(local, &mut found);
        found
    }

    fn collect_descendants<'a>(&'a self, local: &str, found: &mut Vec<&'a XmlNode>) {
        for node in self.elements() {
            if node.is(local) {
                found.push(node);
            }
            node.collect_descendants(local, found);
        }
    }

    /// Visit every descendant with the given local name, in document order
    pub fn for_each_descendant_mut(&mut self, local: &str, visit: &mut dyn FnMut(&mut XmlNode)) {
        for child in &mut self.children {
            if let XmlChild::Element(node) = child {
                if node.is(local) {
                    visit(node);
                }
                node.for_each_descendant_mut(local, visit);
            }
        }
    }

    /// Concatenated text of this node's direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|child| match child {
                XmlChild::Text(text) => Some(text.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Replace all children with a single text child
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.children = vec![XmlChild::Text(text.into())];
    }

    /// Element at a child-index path below this node
    pub fn at_path(&self, path: &[usize]) -> Option<&XmlNode> {
        let mut node = self;
        for &index in path {
            node = match node.children.get(index)? {
                XmlChild::Element(child) => child,
                _ => return None,
            };
        }
        Some(node)
    }

    pub fn at_path_mut(&mut self, path: &[usize]) -> Option<&mut XmlNode> {
        let mut node = self;
        for &index in path {
            node = match node.children.get_mut(index)? {
                XmlChild::Element(child) => child,
                _ => return None,
            };
        }
        Some(node)
    }
}

/// Strip a namespace prefix from a qualified name
pub fn local_name(name: &str) -> &str {
    name.rsplit_once(':').map(|(_, local)| local).unwrap_or(name)
}

/// Decode a part's bytes into a tree
pub fn decode(part: &str, bytes: &[u8]) -> PptxResult<XmlDocument> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let content = std::str::from_utf8(bytes).map_err(|e| PptxError::malformed(part, e))?;

    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(false);

    let mut declaration = None;
    let mut prolog = String::new();
    let mut epilog = String::new();
    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| PptxError::malformed(part, format!("at byte {}: {}", reader.buffer_position(), e)))?;

        match event {
            Event::Decl(decl) => {
                declaration = Some(read_declaration(part, &decl)?);
            }
            Event::Start(start) => {
                stack.push(read_start(part, &start)?);
            }
            Event::Empty(start) => {
                let node = read_start(part, &start)?;
                attach(part, &mut stack, &mut root, node)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| PptxError::malformed(part, "unexpected closing tag"))?;
                attach(part, &mut stack, &mut root, node)?;
            }
            Event::Text(text) => match stack.last_mut() {
                Some(parent) => {
                    let text = text.unescape().map_err(|e| PptxError::malformed(part, e))?;
                    parent.children.push(XmlChild::Text(text.into_owned()));
                }
                None => outside_root(&root, &mut prolog, &mut epilog).push_str(&raw(&text)),
            },
            Event::CData(data) => {
                if let Some(parent) = stack.last_mut() {
                    let text = String::from_utf8_lossy(&data.into_inner()).into_owned();
                    parent.children.push(XmlChild::Text(text));
                }
            }
            Event::Comment(comment) => match stack.last_mut() {
                Some(parent) => parent.children.push(XmlChild::Comment(raw(&comment).into_owned())),
                None => {
                    let markup = format!("<!--{}-->", raw(&comment));
                    outside_root(&root, &mut prolog, &mut epilog).push_str(&markup);
                }
            },
            Event::PI(pi) if stack.is_empty() => {
                let markup = format!("<?{}?>", String::from_utf8_lossy(&*pi));
                outside_root(&root, &mut prolog, &mut epilog).push_str(&markup);
            }
            Event::DocType(doctype) if root.is_none() => {
                prolog.push_str(&format!("<!DOCTYPE {}>", raw(&doctype)));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(PptxError::malformed(part, "unclosed element at end of input"));
    }
    let root = root.ok_or_else(|| PptxError::malformed(part, "no root element"))?;

    Ok(XmlDocument {
        declaration,
        prolog,
        root,
        epilog,
    })
}

/// Markup outside the root goes before or after it
fn outside_root<'a>(root: &Option<XmlNode>, prolog: &'a mut String, epilog: &'a mut String) -> &'a mut String {
    if root.is_none() {
        prolog
    } else {
        epilog
    }
}

fn raw<'a>(text: &'a BytesText<'_>) -> Cow<'a, str> {
    String::from_utf8_lossy(text)
}

fn read_declaration(part: &str, decl: &BytesDecl<'_>) -> PptxResult<XmlDeclaration> {
    let version = decl.version().map_err(|e| PptxError::malformed(part, e))?;
    let encoding = match decl.encoding() {
        Some(value) => Some(value.map_err(|e| PptxError::malformed(part, e))?),
        None => None,
    };
    let standalone = match decl.standalone() {
        Some(value) => Some(value.map_err(|e| PptxError::malformed(part, e))?),
        None => None,
    };

    Ok(XmlDeclaration {
        version: String::from_utf8_lossy(&version).into_owned(),
        encoding: encoding.map(|v| String::from_utf8_lossy(&v).into_owned()),
        standalone: standalone.map(|v| String::from_utf8_lossy(&v).into_owned()),
    })
}

fn read_start(part: &str, start: &BytesStart<'_>) -> PptxResult<XmlNode> {
    let name = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = XmlNode::new(name);

    for attribute in start.attributes() {
        let attribute = attribute.map_err(|e| PptxError::malformed(part, e))?;
        let key = String::from_utf8_lossy(attribute.key.as_ref()).into_owned();
        let value = attribute
            .unescape_value()
            .map_err(|e| PptxError::malformed(part, e))?
            .into_owned();
        node.attributes.push((key, value));
    }

    Ok(node)
}

fn attach(
    part: &str,
    stack: &mut [XmlNode],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) -> PptxResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(XmlChild::Element(node)),
        None if root.is_none() => *root = Some(node),
        None => return Err(PptxError::malformed(part, "multiple root elements")),
    }
    Ok(())
}

/// Encode a tree back to bytes
pub fn encode(document: &XmlDocument) -> PptxResult<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());

    if let Some(decl) = &document.declaration {
        writer
            .write_event(Event::Decl(BytesDecl::new(
                &decl.version,
                decl.encoding.as_deref(),
                decl.standalone.as_deref(),
            )))
            .map_err(write_error)?;
    }
    writer.get_mut().write_all(document.prolog.as_bytes())?;
    write_node(&mut writer, &document.root)?;
    writer.get_mut().write_all(document.epilog.as_bytes())?;

    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &XmlNode) -> PptxResult<()> {
    let mut start = BytesStart::new(node.name.as_str());
    for (key, value) in &node.attributes {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children.is_empty() {
        return writer.write_event(Event::Empty(start)).map_err(write_error);
    }

    writer.write_event(Event::Start(start)).map_err(write_error)?;
    for child in &node.children {
        match child {
            XmlChild::Element(element) => write_node(writer, element)?,
            XmlChild::Text(text) => writer
                .write_event(Event::Text(BytesText::new(text)))
                .map_err(write_error)?,
            XmlChild::Comment(comment) => writer
                .write_event(Event::Comment(BytesText::from_escaped(comment.as_str())))
                .map_err(write_error)?,
        }
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.name.as_str())))
        .map_err(write_error)
}

fn write_error(err: impl std::fmt::Display) -> PptxError {
    PptxError::ExportFailed(format!("XML write error: {}", err))
}
