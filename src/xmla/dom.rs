//! Owned, namespace-resolved XML element tree.
//!
//! Responses are small enough (one rowset per request) that an owned tree is
//! simpler than streaming: handlers need random access to fields within a
//! row, and the tree is `Send + Sync` so rows can be held across awaits.
//!
//! A fresh reader is built for every document; nothing is pooled.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::{Namespace, ResolveResult};
use quick_xml::NsReader;

use crate::error::{XmlaError, XmlaResult};

/// A child of an element.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// An attribute, keyed by local name.
#[derive(Debug, Clone, PartialEq)]
pub struct Attribute {
    pub local_name: String,
    pub value: String,
}

/// An XML element with its namespace URI resolved.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Element {
    namespace: Option<String>,
    local_name: String,
    attributes: Vec<Attribute>,
    children: Vec<Node>,
}

impl Element {
    /// Create an element with no namespace.
    pub fn new(local_name: impl Into<String>) -> Self {
        Self {
            local_name: local_name.into(),
            ..Self::default()
        }
    }

    /// Set the namespace URI.
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Append a child element.
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Append a text node.
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.children.push(Node::Text(text.into()));
        self
    }

    /// Local name without prefix.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    /// Resolved namespace URI, if the element is in one.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Check local name and, when `ns` is given, namespace.
    pub fn is(&self, ns: Option<&str>, local_name: &str) -> bool {
        self.local_name == local_name && ns.map_or(true, |ns| self.namespace() == Some(ns))
    }

    /// Attribute value by local name.
    pub fn attribute(&self, local_name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|a| a.local_name == local_name)
            .map(|a| a.value.as_str())
    }

    /// All child nodes in document order.
    pub fn children(&self) -> &[Node] {
        &self.children
    }

    /// Child elements in document order, skipping text.
    pub fn elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Consume the element, yielding its child elements.
    pub fn into_elements(self) -> impl Iterator<Item = Element> {
        self.children.into_iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// Concatenated text of this element's direct text children.
    pub fn own_text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// Concatenated text of all descendants, in document order.
    pub fn text(&self) -> String {
        let mut buf = String::new();
        self.collect_text(&mut buf);
        buf
    }

    fn collect_text(&self, buf: &mut String) {
        for node in &self.children {
            match node {
                Node::Text(t) => buf.push_str(t),
                Node::Element(e) => e.collect_text(buf),
            }
        }
    }

    fn from_start(ns: ResolveResult<'_>, start: &BytesStart<'_>) -> XmlaResult<Self> {
        let namespace = match ns {
            ResolveResult::Bound(Namespace(uri)) => Some(String::from_utf8_lossy(uri).into_owned()),
            _ => None,
        };
        let local_name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(|e| XmlaError::Parse(e.to_string()))?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let value = attr
                .unescape_value()
                .map_err(|e| XmlaError::Parse(e.to_string()))?
                .into_owned();
            attributes.push(Attribute {
                local_name: String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned(),
                value,
            });
        }

        Ok(Self {
            namespace,
            local_name,
            attributes,
            children: Vec::new(),
        })
    }
}

/// Parse a complete document and return its root element.
///
/// Whitespace-only text between elements is dropped; all other text is kept
/// verbatim.
pub fn parse(xml: &[u8]) -> XmlaResult<Element> {
    let mut reader = NsReader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (ns, event) = reader
            .read_resolved_event_into(&mut buf)
            .map_err(|e| XmlaError::Parse(e.to_string()))?;

        match event {
            Event::Start(start) => {
                let element = Element::from_start(ns, &start)?;
                stack.push(element);
            }
            Event::Empty(start) => {
                let element = Element::from_start(ns, &start)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| XmlaError::Parse("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(text) => {
                let text = text
                    .unescape()
                    .map_err(|e| XmlaError::Parse(e.to_string()))?;
                push_text(&mut stack, text.into_owned())?;
            }
            Event::CData(data) => {
                push_text(&mut stack, String::from_utf8_lossy(&data).into_owned())?;
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !stack.is_empty() {
        return Err(XmlaError::Parse(format!(
            "document ended inside <{}>",
            stack.last().map(Element::local_name).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| XmlaError::Parse("document has no root element".to_string()))
}

fn attach(stack: &mut [Element], root: &mut Option<Element>, element: Element) -> XmlaResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(Node::Element(element)),
        None if root.is_none() => *root = Some(element),
        None => return Err(XmlaError::Parse("multiple root elements".to_string())),
    }
    Ok(())
}

fn push_text(stack: &mut [Element], text: String) -> XmlaResult<()> {
    if text.trim().is_empty() {
        return Ok(());
    }
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Text(text));
            Ok(())
        }
        None => Err(XmlaError::Parse("text outside of root element".to_string())),
    }
}

/// Render an element as indented pseudo-XML, for diagnostics only.
pub fn pretty_print(element: &Element) -> String {
    let mut out = String::new();
    pretty_print_into(element, "", &mut out);
    out
}

fn pretty_print_into(element: &Element, indent: &str, out: &mut String) {
    out.push_str(indent);
    out.push('<');
    out.push_str(&element.local_name);
    for attr in &element.attributes {
        out.push_str(&format!(" {}=\"{}\"", attr.local_name, attr.value));
    }
    out.push_str(">\n");

    let child_indent = format!("{indent}\t");
    for node in &element.children {
        match node {
            Node::Element(e) => pretty_print_into(e, &child_indent, out),
            Node::Text(t) => {
                out.push_str(&child_indent);
                out.push_str(t.trim());
                out.push('\n');
            }
        }
    }

    out.push_str(indent);
    out.push_str("</");
    out.push_str(&element.local_name);
    out.push_str(">\n");
}
