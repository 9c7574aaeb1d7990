//! Simple in-memory tree implementing [`DomNode`], used by the tests and as
//! the crate's default adaptor for callers without a host DOM.
//!
//! Identity is `Arc` pointer equality. The builder wires parent links when
//! `build` runs, so trees are constructed leaf-first without cycles.
//!
//! ```
//! use xpath1::simple_node::{attr, doc, elem, text};
//!
//! // <root><a id="x">hi</a></root>
//! let document = doc()
//!     .child(elem("a").attr(attr("id", "x")).child(text("hi")))
//!     .build();
//! ```

use std::fmt;
use std::sync::{Arc, RwLock, Weak};

use crate::consts::{XML_URI, XMLNS_URI};
use crate::model::{DomNode, NodeKind};

#[derive(Debug)]
struct Inner {
    kind: NodeKind,
    /// Qualified name: element/attribute name, PI target.
    name: Option<String>,
    ns_uri: Option<String>,
    value: Option<String>,
    html: bool,
    parent: RwLock<Option<Weak<Inner>>>,
    children: RwLock<Vec<SimpleNode>>,
    attributes: RwLock<Vec<SimpleNode>>,
}

/// An `Arc`-backed node handle.
#[derive(Clone)]
pub struct SimpleNode(Arc<Inner>);

impl PartialEq for SimpleNode {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}
impl Eq for SimpleNode {}

impl fmt::Debug for SimpleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleNode")
            .field("kind", &self.0.kind)
            .field("name", &self.0.name)
            .field("value", &self.0.value)
            .finish()
    }
}

impl SimpleNode {
    fn new(kind: NodeKind, name: Option<String>, ns_uri: Option<String>, value: Option<String>) -> Self {
        SimpleNode(Arc::new(Inner {
            kind,
            name,
            ns_uri,
            value,
            html: false,
            parent: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            attributes: RwLock::new(Vec::new()),
        }))
    }
}

pub struct SimpleNodeBuilder {
    node: SimpleNode,
    pending_children: Vec<SimpleNode>,
    pending_attrs: Vec<SimpleNode>,
}

impl SimpleNodeBuilder {
    fn new(node: SimpleNode) -> Self {
        Self {
            node,
            pending_children: Vec::new(),
            pending_attrs: Vec::new(),
        }
    }

    pub fn child(mut self, child: impl Into<SimpleNodeOrBuilder>) -> Self {
        self.pending_children.push(child.into().build());
        self
    }

    pub fn attr(mut self, attr: SimpleNode) -> Self {
        debug_assert!(attr.kind() == NodeKind::Attribute);
        self.pending_attrs.push(attr);
        self
    }

    /// Mark a document node as an HTML document.
    pub fn html(self) -> Self {
        debug_assert!(self.node.0.kind == NodeKind::Document);
        let inner = Inner {
            kind: self.node.0.kind,
            name: self.node.0.name.clone(),
            ns_uri: self.node.0.ns_uri.clone(),
            value: self.node.0.value.clone(),
            html: true,
            parent: RwLock::new(None),
            children: RwLock::new(Vec::new()),
            attributes: RwLock::new(Vec::new()),
        };
        Self {
            node: SimpleNode(Arc::new(inner)),
            pending_children: self.pending_children,
            pending_attrs: self.pending_attrs,
        }
    }

    pub fn build(self) -> SimpleNode {
        {
            let mut attrs = self.node.0.attributes.write().unwrap();
            for a in &self.pending_attrs {
                *a.0.parent.write().unwrap() = Some(Arc::downgrade(&self.node.0));
            }
            attrs.extend(self.pending_attrs);
        }
        {
            let mut children = self.node.0.children.write().unwrap();
            for c in &self.pending_children {
                *c.0.parent.write().unwrap() = Some(Arc::downgrade(&self.node.0));
            }
            children.extend(self.pending_children);
        }
        self.node
    }
}

pub enum SimpleNodeOrBuilder {
    Built(SimpleNode),
    Builder(SimpleNodeBuilder),
}

impl SimpleNodeOrBuilder {
    fn build(self) -> SimpleNode {
        match self {
            SimpleNodeOrBuilder::Built(n) => n,
            SimpleNodeOrBuilder::Builder(b) => b.build(),
        }
    }
}

impl From<SimpleNode> for SimpleNodeOrBuilder {
    fn from(n: SimpleNode) -> Self {
        SimpleNodeOrBuilder::Built(n)
    }
}

impl From<SimpleNodeBuilder> for SimpleNodeOrBuilder {
    fn from(b: SimpleNodeBuilder) -> Self {
        SimpleNodeOrBuilder::Builder(b)
    }
}

pub fn doc() -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(SimpleNode::new(NodeKind::Document, None, None, None))
}

pub fn fragment() -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(SimpleNode::new(NodeKind::DocumentFragment, None, None, None))
}

pub fn elem(name: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(SimpleNode::new(
        NodeKind::Element,
        Some(name.to_string()),
        None,
        None,
    ))
}

/// Element in a namespace; `name` may carry a prefix.
pub fn elem_ns(name: &str, uri: &str) -> SimpleNodeBuilder {
    SimpleNodeBuilder::new(SimpleNode::new(
        NodeKind::Element,
        Some(name.to_string()),
        Some(uri.to_string()),
        None,
    ))
}

pub fn attr(name: &str, value: &str) -> SimpleNode {
    // Reserved prefixes get their namespaces without an explicit declaration.
    let ns_uri = match name.split_once(':') {
        Some(("xml", _)) => Some(XML_URI.to_string()),
        Some(("xmlns", _)) => Some(XMLNS_URI.to_string()),
        _ if name == "xmlns" => Some(XMLNS_URI.to_string()),
        _ => None,
    };
    SimpleNode::new(
        NodeKind::Attribute,
        Some(name.to_string()),
        ns_uri,
        Some(value.to_string()),
    )
}

pub fn attr_ns(name: &str, uri: &str, value: &str) -> SimpleNode {
    SimpleNode::new(
        NodeKind::Attribute,
        Some(name.to_string()),
        Some(uri.to_string()),
        Some(value.to_string()),
    )
}

pub fn text(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::Text, None, None, Some(value.to_string()))
}

pub fn cdata(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::CData, None, None, Some(value.to_string()))
}

pub fn comment(value: &str) -> SimpleNode {
    SimpleNode::new(NodeKind::Comment, None, None, Some(value.to_string()))
}

pub fn pi(target: &str, data: &str) -> SimpleNode {
    SimpleNode::new(
        NodeKind::ProcessingInstruction,
        Some(target.to_string()),
        None,
        Some(data.to_string()),
    )
}

impl SimpleNode {
    fn position_in_parent(&self) -> Option<(SimpleNode, usize)> {
        let parent = self.parent()?;
        let idx = {
            let children = parent.0.children.read().unwrap();
            children.iter().position(|c| c == self)?
        };
        Some((parent, idx))
    }
}

impl DomNode for SimpleNode {
    fn kind(&self) -> NodeKind {
        self.0.kind
    }

    fn node_name(&self) -> String {
        match self.0.kind {
            NodeKind::Document => "#document".to_string(),
            NodeKind::DocumentFragment => "#document-fragment".to_string(),
            NodeKind::Text => "#text".to_string(),
            NodeKind::CData => "#cdata-section".to_string(),
            NodeKind::Comment => "#comment".to_string(),
            _ => self.0.name.clone().unwrap_or_default(),
        }
    }

    fn node_value(&self) -> Option<String> {
        self.0.value.clone()
    }

    fn local_name(&self) -> Option<String> {
        let name = self.0.name.as_ref()?;
        Some(match name.split_once(':') {
            Some((_, local)) => local.to_string(),
            None => name.clone(),
        })
    }

    fn prefix(&self) -> Option<String> {
        let name = self.0.name.as_ref()?;
        name.split_once(':').map(|(p, _)| p.to_string())
    }

    fn namespace_uri(&self) -> Option<String> {
        self.0.ns_uri.clone()
    }

    fn parent(&self) -> Option<Self> {
        self.0
            .parent
            .read()
            .unwrap()
            .as_ref()
            .and_then(Weak::upgrade)
            .map(SimpleNode)
    }

    fn first_child(&self) -> Option<Self> {
        self.0.children.read().unwrap().first().cloned()
    }

    fn next_sibling(&self) -> Option<Self> {
        if self.0.kind == NodeKind::Attribute {
            return None;
        }
        let (parent, idx) = self.position_in_parent()?;
        let children = parent.0.children.read().unwrap();
        children.get(idx + 1).cloned()
    }

    fn previous_sibling(&self) -> Option<Self> {
        if self.0.kind == NodeKind::Attribute {
            return None;
        }
        let (parent, idx) = self.position_in_parent()?;
        if idx == 0 {
            return None;
        }
        let children = parent.0.children.read().unwrap();
        children.get(idx - 1).cloned()
    }

    fn attributes(&self) -> Vec<Self> {
        self.0.attributes.read().unwrap().clone()
    }

    fn owner_document(&self) -> Option<Self> {
        let mut cur = self.clone();
        loop {
            let up = match cur.0.kind {
                NodeKind::Attribute => cur.owner_element(),
                _ => cur.parent(),
            };
            match up {
                Some(p) => cur = p,
                None => break,
            }
        }
        (cur.0.kind == NodeKind::Document && cur != *self).then_some(cur)
    }

    fn owner_element(&self) -> Option<Self> {
        if self.0.kind == NodeKind::Attribute {
            self.parent()
        } else {
            None
        }
    }

    fn get_attribute_ns(&self, uri: &str, local: &str) -> Option<String> {
        for a in self.0.attributes.read().unwrap().iter() {
            let a_uri = a.0.ns_uri.clone().unwrap_or_default();
            if a_uri == uri && a.local_name().as_deref() == Some(local) {
                return a.0.value.clone();
            }
        }
        None
    }

    fn is_html_document(&self) -> bool {
        self.0.html
    }
}
