//! A small owned XML element tree and its serializer.
//!
//! The tree keeps lxml-like semantics: an element owns its leading `text`,
//! its children in order, and each child carries the `tail` text that
//! follows it inside the parent. The body assembler relies on tails (line
//! text follows the empty `<lb/>` marker), so the serializer must emit
//! mixed-content elements verbatim while still indenting the purely
//! structural ones.

/// One element of the output tree. Built once, append-only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    pub name: String,
    /// Attributes in insertion order.
    pub attrs: Vec<(String, String)>,
    /// Text before the first child.
    pub text: Option<String>,
    pub children: Vec<Element>,
    /// Text following this element inside its parent.
    pub tail: Option<String>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Element {
        Element {
            name: name.into(),
            attrs: Vec::new(),
            text: None,
            children: Vec::new(),
            tail: None,
        }
    }

    /// Builder-style attribute setter.
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Element {
        self.attrs.push((name.into(), value.into()));
        self
    }

    /// Builder-style text setter.
    pub fn with_text(mut self, text: impl Into<String>) -> Element {
        self.text = Some(text.into());
        self
    }

    pub fn set_attr(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        if let Some(slot) = self.attrs.iter_mut().find(|(k, _)| *k == name) {
            slot.1 = value.into();
        } else {
            self.attrs.push((name, value.into()));
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Append a child, returning a mutable reference to it.
    pub fn push(&mut self, child: Element) -> &mut Element {
        self.children.push(child);
        self.children.last_mut().expect("just pushed")
    }

    pub fn last_child(&self) -> Option<&Element> {
        self.children.last()
    }

    pub fn last_child_mut(&mut self) -> Option<&mut Element> {
        self.children.last_mut()
    }

    /// First direct child with the given name.
    pub fn child(&self, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.name == name)
    }

    /// Depth-first iterator over this element and all descendants.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }

    /// All descendants (including self) with the given name, in document order.
    pub fn find_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.name == name)
    }

    /// Whether this element carries mixed content that must be emitted
    /// verbatim (significant text or child tails).
    fn is_mixed(&self) -> bool {
        self.text.is_some() || self.children.iter().any(|c| c.tail.is_some())
    }
}

pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<&'a Element> {
        let element = self.stack.pop()?;
        // Reverse push keeps document order
        for child in element.children.iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

/// Serialize a tree to a UTF-8 document with an XML declaration and
/// two-space indentation. Mixed-content subtrees are written inline.
pub fn serialize(root: &Element) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    write_element(&mut out, root, 0, false);
    out
}

fn write_element(out: &mut String, element: &Element, depth: usize, inline: bool) {
    if !inline {
        for _ in 0..depth {
            out.push_str("  ");
        }
    }

    out.push('<');
    out.push_str(&element.name);
    for (name, value) in &element.attrs {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape_xml(value));
        out.push('"');
    }

    if element.children.is_empty() && element.text.is_none() {
        out.push_str("/>");
        if !inline {
            out.push('\n');
        }
        return;
    }

    out.push('>');

    if element.is_mixed() || element.children.is_empty() {
        // Verbatim: text, then each child inline followed by its tail
        if let Some(ref text) = element.text {
            out.push_str(&escape_xml(text));
        }
        for child in &element.children {
            write_element(out, child, depth + 1, true);
            if let Some(ref tail) = child.tail {
                out.push_str(&escape_xml(tail));
            }
        }
    } else {
        out.push('\n');
        for child in &element.children {
            write_element(out, child, depth + 1, false);
        }
        for _ in 0..depth {
            out.push_str("  ");
        }
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
    if !inline {
        out.push('\n');
    }
}

pub fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
