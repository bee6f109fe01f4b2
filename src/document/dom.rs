//! Owned DOM tree
//!
//! The browser snapshot and the HTML parser both produce this tree. It owns
//! all of its data, so a snapshot can be shared across threads and read by
//! several extractors at once.

use scraper::Html;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Elements whose text never reaches the rendered page
const NON_RENDERED: &[&str] = &["head", "script", "style", "noscript", "template"];

/// Elements that start a new line in rendered text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "br", "dd", "div", "dl", "dt", "figcaption",
    "figure", "footer", "form", "h1", "h2", "h3", "h4", "h5", "h6", "header", "hr", "li", "main",
    "nav", "ol", "p", "pre", "section", "table", "td", "th", "tr", "ul",
];

/// A DOM node: either an element or a run of text
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    /// Element node
    Element(Element),
    /// Text node
    Text {
        /// Raw text content
        text: String,
    },
}

/// An element with its attributes and children
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Lower-case tag name
    pub tag: String,
    /// Attributes by name
    #[serde(default)]
    pub attrs: BTreeMap<String, String>,
    /// Child nodes in document order
    #[serde(default)]
    pub children: Vec<Node>,
}

/// Pre-order iterator over an element and all of its descendant elements
pub struct Elements<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Elements<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let el = self.stack.pop()?;
        for child in el.children.iter().rev() {
            if let Node::Element(child) = child {
                self.stack.push(child);
            }
        }
        Some(el)
    }
}

impl Element {
    /// Create an element with no attributes or children
    pub fn new<S: Into<String>>(tag: S) -> Self {
        Self {
            tag: tag.into().to_ascii_lowercase(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    /// Builder: add an attribute
    pub fn with_attr<K: Into<String>, V: Into<String>>(mut self, name: K, value: V) -> Self {
        self.attrs
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Builder: append a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Node::Element(child));
        self
    }

    /// Builder: append a text node
    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.children.push(Node::Text { text: text.into() });
        self
    }

    /// Parse an HTML document and return its `<html>` element
    pub fn parse_html(html: &str) -> Self {
        let document = Html::parse_document(html);
        let root = document.root_element();

        let mut nodes = Vec::new();
        let mut stack = vec![(*root, None)];
        while let Some((node, parent)) = stack.pop() {
            match node.value() {
                scraper::Node::Element(value) => {
                    let index = nodes.len();
                    let attrs = value
                        .attrs()
                        .map(|(name, v)| (name.to_ascii_lowercase(), v.to_string()))
                        .collect();
                    let mut el = Element::new(value.name());
                    el.attrs = attrs;
                    nodes.push((parent, Node::Element(el)));

                    let children: Vec<_> = node.children().collect();
                    stack.extend(children.into_iter().rev().map(|c| (c, Some(index))));
                }
                scraper::Node::Text(text) => nodes.push((
                    parent,
                    Node::Text {
                        text: (**text).to_string(),
                    },
                )),
                _ => {}
            }
        }

        // parents always precede children here
        assemble(nodes).unwrap_or_else(|_| Element::new("html"))
    }

    /// Attribute value by name
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs.get(name).map(String::as_str)
    }

    /// Whether the attribute is present (with any value)
    pub fn has_attr(&self, name: &str) -> bool {
        self.attrs.contains_key(name)
    }

    /// Whether the `class` attribute lists `class` (case-sensitive)
    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .map(|v| v.split_whitespace().any(|t| t == class))
            .unwrap_or(false)
    }

    /// Whether a whitespace-separated attribute contains `token`
    /// (ASCII case-insensitive), like `rel~="nofollow"`
    pub fn attr_has_token(&self, name: &str, token: &str) -> bool {
        self.attr(name)
            .map(|v| v.split_whitespace().any(|t| t.eq_ignore_ascii_case(token)))
            .unwrap_or(false)
    }

    /// Whether the attribute value contains `needle` (ASCII case-insensitive)
    pub fn attr_contains(&self, name: &str, needle: &str) -> bool {
        self.attr(name)
            .map(|v| contains_ignore_ascii_case(v, needle))
            .unwrap_or(false)
    }

    /// Whether this element is a `tag`
    pub fn is(&self, tag: &str) -> bool {
        self.tag == tag
    }

    /// This element and every descendant element, in document order
    pub fn elements(&self) -> Elements<'_> {
        Elements { stack: vec![self] }
    }

    /// Descendant elements only (excludes `self`)
    pub fn descendants(&self) -> impl Iterator<Item = &Element> {
        self.elements().skip(1)
    }

    /// All elements with the given tag, in document order
    pub fn find_all<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = &'a Element> + 'a {
        self.elements().filter(move |el| el.tag == tag)
    }

    /// First element with the given tag
    pub fn first(&self, tag: &str) -> Option<&Element> {
        self.elements().find(|el| el.tag == tag)
    }

    /// Concatenated text of all descendant text nodes (DOM `textContent`)
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<&Node> = self.children.iter().rev().collect();
        while let Some(node) = stack.pop() {
            match node {
                Node::Text { text } => out.push_str(text),
                Node::Element(el) => stack.extend(el.children.iter().rev()),
            }
        }
        out
    }

    /// Approximation of rendered text: skips non-rendered elements, breaks
    /// lines at block elements and collapses whitespace
    pub fn visible_text(&self) -> String {
        enum Step<'a> {
            Enter(&'a Element),
            Text(&'a str),
            BlockEnd,
        }

        let mut raw = String::new();
        let mut stack = vec![Step::Enter(self)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Text(text) => raw.push_str(text),
                Step::BlockEnd => raw.push('\n'),
                Step::Enter(el) => {
                    if NON_RENDERED.contains(&el.tag.as_str()) {
                        continue;
                    }
                    if BLOCK_ELEMENTS.contains(&el.tag.as_str()) {
                        raw.push('\n');
                        stack.push(Step::BlockEnd);
                    }
                    stack.extend(el.children.iter().rev().map(|child| match child {
                        Node::Text { text } => Step::Text(text),
                        Node::Element(c) => Step::Enter(c),
                    }));
                }
            }
        }

        raw.lines()
            .map(|line| line.split_whitespace().collect::<Vec<_>>().join(" "))
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// Tear deep trees down from a heap stack; the derived drop recurses per level.
impl Drop for Element {
    fn drop(&mut self) {
        let mut stack = std::mem::take(&mut self.children);
        while let Some(node) = stack.pop() {
            if let Node::Element(mut el) = node {
                stack.append(&mut el.children);
            }
        }
    }
}

/// Build a tree from a pre-order listing of `(parent index, node)` pairs.
/// Element entries carry no children; they are attached here.
pub(crate) fn assemble(nodes: Vec<(Option<usize>, Node)>) -> Result<Element, String> {
    let mut pending: Vec<Vec<Node>> = (0..nodes.len()).map(|_| Vec::new()).collect();
    let mut root = None;

    for (index, (parent, node)) in nodes.into_iter().enumerate().rev() {
        let node = match node {
            Node::Element(mut el) => {
                let mut children = std::mem::take(&mut pending[index]);
                children.reverse();
                el.children = children;
                Node::Element(el)
            }
            text => text,
        };

        match parent {
            Some(parent) if parent < index => pending[parent].push(node),
            Some(parent) => {
                return Err(format!(
                    "node {} points forward to parent {}",
                    index, parent
                ))
            }
            None => root = Some(node),
        }
    }

    match root {
        Some(Node::Element(el)) => Ok(el),
        _ => Err("no root element".to_string()),
    }
}

/// ASCII case-insensitive substring test
pub fn contains_ignore_ascii_case(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    haystack
        .to_ascii_lowercase()
        .contains(&needle.to_ascii_lowercase())
}
