//! Host document model: the read-only capability view the engine evaluates
//! against, plus the synthetic namespace nodes materialised by the
//! `namespace::` axis.
//!
//! The engine never mutates the host tree. Adapters implement [`DomNode`] for
//! their node handle; `PartialEq` must mean *same node* (identity), not
//! structural equality.

use core::fmt;

use crate::consts::XML_URI;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Element,
    Attribute,
    Text,
    CData,
    ProcessingInstruction,
    Comment,
    Document,
    DocumentType,
    DocumentFragment,
    /// Synthetic; never produced by a host adapter.
    Namespace,
}

/// Relative placement of two nodes as reported by a host with a native
/// `compareDocumentPosition`-style capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentPosition {
    Disconnected,
    /// The other node precedes this one.
    Preceding,
    /// The other node follows this one.
    Following,
    /// The other node contains this one.
    Contains,
    /// The other node is contained by this one.
    ContainedBy,
}

/// A name split into its expanded form: optional namespace URI plus local
/// part. Function and variable registries are keyed by this.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExpandedName {
    pub ns_uri: Option<String>,
    pub local: String,
}

impl ExpandedName {
    pub fn new(ns_uri: Option<String>, local: impl Into<String>) -> Self {
        Self {
            ns_uri,
            local: local.into(),
        }
    }

    pub fn local(local: impl Into<String>) -> Self {
        Self {
            ns_uri: None,
            local: local.into(),
        }
    }
}

impl fmt::Display for ExpandedName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.ns_uri {
            Some(uri) => write!(f, "{{{}}}{}", uri, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

/// Read-only view of a host DOM node.
///
/// Optional capabilities keep their defaults when the host cannot do better:
/// `element_by_id` falls back to a depth-first scan of `id` attributes,
/// `compare_position` to the engine's ancestry-walk comparator, and a host
/// without HTML detection is treated as XML.
pub trait DomNode: Clone + PartialEq + fmt::Debug {
    fn kind(&self) -> NodeKind;
    /// Qualified name as the DOM reports it (`nodeName`).
    fn node_name(&self) -> String;
    fn node_value(&self) -> Option<String>;
    fn local_name(&self) -> Option<String>;
    fn prefix(&self) -> Option<String>;
    fn namespace_uri(&self) -> Option<String>;

    fn parent(&self) -> Option<Self>;
    fn first_child(&self) -> Option<Self>;
    fn next_sibling(&self) -> Option<Self>;
    fn previous_sibling(&self) -> Option<Self>;
    /// Attribute nodes in list order. Empty for non-elements.
    fn attributes(&self) -> Vec<Self>;
    fn owner_document(&self) -> Option<Self>;
    /// Owning element of an attribute node.
    fn owner_element(&self) -> Option<Self>;

    /// Value of the attribute with the given namespace URI and local name,
    /// on an element. The empty URI matches attributes without a namespace.
    fn get_attribute_ns(&self, uri: &str, local: &str) -> Option<String>;

    /// Target of a processing instruction; the DOM exposes it as the node
    /// name.
    fn pi_target(&self) -> Option<String> {
        if self.kind() == NodeKind::ProcessingInstruction {
            Some(self.node_name())
        } else {
            None
        }
    }

    /// Locate an element by its `id`. The default walks the subtree and
    /// compares plain `id` attributes, which is what a DTD-less document
    /// gives us; hosts with a real id map should override.
    fn element_by_id(&self, id: &str) -> Option<Self> {
        let mut stack = vec![self.clone()];
        while let Some(n) = stack.pop() {
            if n.kind() == NodeKind::Element
                && n.attributes()
                    .iter()
                    .any(|a| a.node_name() == "id" && a.node_value().as_deref() == Some(id))
            {
                return Some(n);
            }
            let mut children = Vec::new();
            let mut c = n.first_child();
            while let Some(ch) = c {
                children.push(ch.clone());
                c = ch.next_sibling();
            }
            while let Some(ch) = children.pop() {
                stack.push(ch);
            }
        }
        None
    }

    /// Native document-position comparison, if the host has one.
    fn compare_position(&self, _other: &Self) -> Option<DocumentPosition> {
        None
    }

    /// True when this document node is an HTML document.
    fn is_html_document(&self) -> bool {
        false
    }
}

/// A namespace in-scope binding, materialised on demand while evaluating the
/// `namespace::` axis. Not part of the host tree; re-created per query.
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceNode<N> {
    /// Bound prefix; empty string for the default namespace.
    pub prefix: String,
    pub uri: String,
    /// Element this binding is in scope on.
    pub owner: N,
}

/// Node handle the evaluator works over: either a host node or a synthetic
/// namespace node.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeRef<N> {
    Dom(N),
    Namespace(NamespaceNode<N>),
}

impl<N: DomNode> NodeRef<N> {
    pub fn kind(&self) -> NodeKind {
        match self {
            NodeRef::Dom(n) => n.kind(),
            NodeRef::Namespace(_) => NodeKind::Namespace,
        }
    }

    pub fn as_dom(&self) -> Option<&N> {
        match self {
            NodeRef::Dom(n) => Some(n),
            NodeRef::Namespace(_) => None,
        }
    }

    /// Parent for traversal purposes: `parentNode`, or the owning element
    /// for attribute and namespace nodes.
    pub fn traversal_parent(&self) -> Option<NodeRef<N>> {
        match self {
            NodeRef::Dom(n) => match n.kind() {
                NodeKind::Attribute => n.owner_element().or_else(|| n.parent()).map(NodeRef::Dom),
                _ => n.parent().map(NodeRef::Dom),
            },
            NodeRef::Namespace(ns) => Some(NodeRef::Dom(ns.owner.clone())),
        }
    }

    pub fn node_name(&self) -> String {
        match self {
            NodeRef::Dom(n) => n.node_name(),
            NodeRef::Namespace(ns) => ns.prefix.clone(),
        }
    }

    /// Local part of the name, per the XPath data model: the target for
    /// processing instructions, the prefix for namespace nodes.
    pub fn local_name(&self) -> String {
        match self {
            NodeRef::Dom(n) => match n.kind() {
                NodeKind::Element | NodeKind::Attribute => n.local_name().unwrap_or_else(|| {
                    let name = n.node_name();
                    match name.split_once(':') {
                        Some((_, local)) => local.to_string(),
                        None => name,
                    }
                }),
                NodeKind::ProcessingInstruction => n.node_name(),
                _ => String::new(),
            },
            NodeRef::Namespace(ns) => ns.prefix.clone(),
        }
    }

    pub fn namespace_uri(&self) -> Option<String> {
        match self {
            NodeRef::Dom(n) => n.namespace_uri(),
            // Namespace nodes have no namespace of their own.
            NodeRef::Namespace(_) => None,
        }
    }

    /// Qualified name as `name()` reports it.
    pub fn qualified_name(&self) -> String {
        match self {
            NodeRef::Dom(n) => match n.kind() {
                NodeKind::Element
                | NodeKind::Attribute
                | NodeKind::ProcessingInstruction
                | NodeKind::DocumentType => n.node_name(),
                _ => String::new(),
            },
            NodeRef::Namespace(ns) => ns.prefix.clone(),
        }
    }

    /// XPath string value of the node.
    ///
    /// Containers concatenate the text of their descendants; attributes
    /// yield their value, namespace nodes their URI, everything else its
    /// node value.
    pub fn string_value(&self) -> String {
        match self {
            NodeRef::Namespace(ns) => ns.uri.clone(),
            NodeRef::Dom(n) => match n.kind() {
                NodeKind::Element | NodeKind::Document | NodeKind::DocumentFragment => {
                    let mut out = String::new();
                    collect_text(n, &mut out);
                    out
                }
                _ => n.node_value().unwrap_or_default(),
            },
        }
    }

    /// Document this node belongs to, if any.
    pub fn document(&self) -> Option<N> {
        let host = match self {
            NodeRef::Dom(n) => n.clone(),
            NodeRef::Namespace(ns) => ns.owner.clone(),
        };
        if host.kind() == NodeKind::Document {
            return Some(host);
        }
        if let Some(doc) = host.owner_document() {
            return Some(doc);
        }
        // Walk up; the topmost node stands in for a detached tree's document.
        let mut cur = host;
        loop {
            let up = match cur.kind() {
                NodeKind::Attribute => cur.owner_element().or_else(|| cur.parent()),
                _ => cur.parent(),
            };
            match up {
                Some(p) => cur = p,
                None => return Some(cur),
            }
        }
    }

    /// True when the owning document is an HTML document.
    pub fn in_html_document(&self) -> bool {
        self.document().map(|d| d.is_html_document()).unwrap_or(false)
    }

    /// True for the `xml` namespace node.
    pub fn is_xml_namespace(&self) -> bool {
        matches!(self, NodeRef::Namespace(ns) if ns.uri == XML_URI)
    }
}

fn collect_text<N: DomNode>(n: &N, out: &mut String) {
    let mut child = n.first_child();
    while let Some(c) = child {
        match c.kind() {
            NodeKind::Text | NodeKind::CData => {
                if let Some(v) = c.node_value() {
                    out.push_str(&v);
                }
            }
            NodeKind::Element => collect_text(&c, out),
            _ => {}
        }
        child = c.next_sibling();
    }
}
