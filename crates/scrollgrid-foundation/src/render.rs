//! Structured render output.
//!
//! Templates produce [`RenderNode`] trees instead of evaluated markup
//! strings. The host walks the tree (or serialises it with
//! [`RenderNode::to_markup`]) and reconciles keyed children by their key.

use smallvec::SmallVec;
use std::fmt::Write as _;

/// Ordered attribute list. Most elements carry only a handful.
pub type Attributes = SmallVec<[(String, String); 4]>;

/// A node in the render tree.
#[derive(Clone, Debug, PartialEq)]
pub enum RenderNode {
    /// A structured element with attributes and children.
    Element(Element),
    /// Plain text; escaped on serialisation.
    Text(String),
    /// Pre-built markup produced by a markup template; emitted verbatim.
    Markup(String),
}

impl RenderNode {
    /// Creates a text node.
    pub fn text(value: impl Into<String>) -> Self {
        RenderNode::Text(value.into())
    }

    /// Creates a verbatim markup node.
    pub fn markup(value: impl Into<String>) -> Self {
        RenderNode::Markup(value.into())
    }

    /// Returns the element if this node is one.
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            RenderNode::Element(element) => Some(element),
            _ => None,
        }
    }

    /// Concatenated text content of this node and its descendants.
    ///
    /// Markup nodes contribute their raw source.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            RenderNode::Element(element) => {
                for child in &element.children {
                    child.collect_text(out);
                }
            }
            RenderNode::Text(text) | RenderNode::Markup(text) => out.push_str(text),
        }
    }

    /// Serialises the tree into markup.
    pub fn to_markup(&self) -> String {
        let mut out = String::new();
        self.write_markup(&mut out);
        out
    }

    pub(crate) fn write_markup(&self, out: &mut String) {
        match self {
            RenderNode::Element(element) => element.write_markup(out),
            RenderNode::Text(text) => out.push_str(&escape_html(text)),
            RenderNode::Markup(markup) => out.push_str(markup),
        }
    }
}

impl From<Element> for RenderNode {
    fn from(element: Element) -> Self {
        RenderNode::Element(element)
    }
}

/// A structured element.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Element {
    /// Tag name, e.g. `tr`.
    pub tag: String,

    /// Attributes in declaration order.
    pub attributes: Attributes,

    /// Reconciliation key. Rows are keyed by their index.
    pub key: Option<u64>,

    /// Child nodes.
    pub children: Vec<RenderNode>,
}

impl Element {
    /// Creates an empty element with the given tag.
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// Adds an attribute, replacing an existing one with the same name.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    /// Sets the reconciliation key.
    pub fn key(mut self, key: u64) -> Self {
        self.key = Some(key);
        self
    }

    /// Appends a child node.
    pub fn child(mut self, child: impl Into<RenderNode>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends several child nodes.
    pub fn children(mut self, children: impl IntoIterator<Item = RenderNode>) -> Self {
        self.children.extend(children);
        self
    }

    /// Looks up an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }

    fn write_markup(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.tag);
        for (name, value) in &self.attributes {
            // Writing into a String cannot fail.
            let _ = write!(out, " {}=\"{}\"", name, escape_html(value));
        }
        out.push('>');
        for child in &self.children {
            child.write_markup(out);
        }
        out.push_str("</");
        out.push_str(&self.tag);
        out.push('>');
    }
}

/// Escapes the five HTML-significant characters.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}
