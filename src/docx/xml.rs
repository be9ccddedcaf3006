//! Minimal owned XML tree over quick-xml events
//!
//! Only element structure and text are interpreted. Declarations, comments,
//! processing instructions and CDATA pass through untouched, so a parsed part
//! written back differs from the original only in text escaping.

use quick_xml::events::{BytesStart, BytesText, Event};
use quick_xml::{Reader, Writer};

use super::{DocxError, Result};

#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
    Other(Event<'static>),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub start: BytesStart<'static>,
    pub children: Vec<Node>,
    self_closing: bool,
}

impl Element {
    /// New empty element with a qualified name such as `w:t`
    pub fn new(qname: &str) -> Self {
        Self {
            start: BytesStart::new(qname.to_string()),
            children: Vec::new(),
            self_closing: true,
        }
    }

    pub fn with_attribute(mut self, key: &str, value: &str) -> Self {
        self.start.push_attribute((key, value));
        self
    }

    pub fn with_text(mut self, text: &str) -> Self {
        self.children.push(Node::Text(text.to_string()));
        self
    }

    /// Name without namespace prefix (`p` for `w:p`)
    pub fn local_name(&self) -> &[u8] {
        self.start.local_name().into_inner()
    }

    pub fn is(&self, local: &str) -> bool {
        self.local_name() == local.as_bytes()
    }

    /// Namespace prefix including the colon (`w:`), or empty
    pub fn prefix(&self) -> String {
        match self.start.name().prefix() {
            Some(p) => format!("{}:", String::from_utf8_lossy(p.into_inner())),
            None => String::new(),
        }
    }

    pub fn attribute(&self, local: &str) -> Option<String> {
        self.start
            .attributes()
            .flatten()
            .find(|a| a.key.local_name().into_inner() == local.as_bytes())
            .map(|a| String::from_utf8_lossy(&a.value).into_owned())
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_elements_mut(&mut self) -> impl Iterator<Item = &mut Element> {
        self.children.iter_mut().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    /// Concatenated direct text children
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|n| match n {
                Node::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect()
    }
}

/// Parse a whole XML part into its top-level nodes
pub fn parse(xml: &[u8]) -> Result<Vec<Node>> {
    let mut reader = Reader::from_reader(xml);
    reader.trim_text(false);

    let mut roots: Vec<Node> = Vec::new();
    let mut stack: Vec<Element> = Vec::new();
    let mut buf = Vec::new();

    loop {
        let node = match reader.read_event_into(&mut buf)? {
            Event::Start(e) => {
                stack.push(Element {
                    start: e.into_owned(),
                    children: Vec::new(),
                    self_closing: false,
                });
                None
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DocxError::Malformed("unbalanced end tag".to_string()))?;
                Some(Node::Element(element))
            }
            Event::Empty(e) => Some(Node::Element(Element {
                start: e.into_owned(),
                children: Vec::new(),
                self_closing: true,
            })),
            Event::Text(t) => Some(Node::Text(t.unescape()?.into_owned())),
            Event::Eof => break,
            other => Some(Node::Other(other.into_owned())),
        };

        if let Some(node) = node {
            match stack.last_mut() {
                Some(parent) => parent.children.push(node),
                None => roots.push(node),
            }
        }
        buf.clear();
    }

    if let Some(open) = stack.last() {
        return Err(DocxError::Malformed(format!(
            "unclosed element <{}>",
            String::from_utf8_lossy(open.start.name().into_inner())
        )));
    }
    Ok(roots)
}

/// Serialize top-level nodes back to bytes
pub fn write(nodes: &[Node]) -> Result<Vec<u8>> {
    let mut writer = Writer::new(Vec::new());
    for node in nodes {
        write_node(&mut writer, node)?;
    }
    Ok(writer.into_inner())
}

fn write_node(writer: &mut Writer<Vec<u8>>, node: &Node) -> Result<()> {
    match node {
        Node::Element(el) if el.self_closing && el.children.is_empty() => {
            writer.write_event(Event::Empty(el.start.borrow()))?;
        }
        Node::Element(el) => {
            writer.write_event(Event::Start(el.start.borrow()))?;
            for child in &el.children {
                write_node(writer, child)?;
            }
            writer.write_event(Event::End(el.start.to_end()))?;
        }
        Node::Text(t) => {
            writer.write_event(Event::Text(BytesText::new(t)))?;
        }
        Node::Other(event) => {
            writer.write_event(event.clone())?;
        }
    }
    Ok(())
}
