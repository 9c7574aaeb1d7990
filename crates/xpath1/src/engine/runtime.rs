//! Evaluation runtime: error type, the evaluation context and the three
//! injection points (namespace, variable and function resolution).

use std::collections::HashMap;
use std::sync::Arc;

use crate::consts::{XML_URI, XMLNS_URI};
use crate::model::{DomNode, ExpandedName, NodeKind, NodeRef};
use crate::value::Value;

/// Errors observable to callers.
///
/// `InvalidExpression` (code 51) comes out of the lexer and parser,
/// `Type` (code 52) out of coercions and the result wrapper. Everything
/// else (unknown functions, undeclared variables, unresolvable prefixes,
/// arity mismatches, a missing context node) is a generic evaluation
/// error whose message names the offender.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Invalid expression: {0}")]
    InvalidExpression(String),
    #[error("Type error: {0}")]
    Type(String),
    #[error("{0}")]
    Evaluation(String),
}

impl Error {
    pub fn invalid_expression(msg: impl Into<String>) -> Self {
        Error::InvalidExpression(msg.into())
    }

    pub fn type_error(msg: impl Into<String>) -> Self {
        Error::Type(msg.into())
    }

    pub fn evaluation(msg: impl Into<String>) -> Self {
        Error::Evaluation(msg.into())
    }

    /// DOM-3 exception code, where one exists: 51 for invalid expressions,
    /// 52 for type errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            Error::InvalidExpression(_) => Some(51),
            Error::Type(_) => Some(52),
            Error::Evaluation(_) => None,
        }
    }
}

/// Resolves a namespace prefix to a URI, relative to a node.
pub trait NamespaceResolver<N: DomNode> {
    fn resolve(&self, prefix: &str, node: Option<&NodeRef<N>>) -> Option<String>;
}

/// Resolves a variable reference to its value.
pub trait VariableResolver<N: DomNode> {
    fn variable(&self, name: &ExpandedName) -> Option<Value<N>>;
}

pub type FunctionImpl<N> =
    Arc<dyn Fn(&Context<N>, &[Value<N>]) -> Result<Value<N>, Error> + Send + Sync>;

/// Resolves a function name and argument count to an implementation.
/// Resolution failures are reported as evaluation errors naming the
/// function.
pub trait FunctionResolver<N: DomNode> {
    fn function(&self, name: &ExpandedName, arity: usize) -> Result<FunctionImpl<N>, Error>;
}

/// Prefix bindings supplied as a plain map.
#[derive(Debug, Clone, Default)]
pub struct NamespaceMap {
    bindings: HashMap<String, String>,
}

impl NamespaceMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        Self {
            bindings: pairs
                .into_iter()
                .map(|(p, u)| (p.to_string(), u.to_string()))
                .collect(),
        }
    }

    pub fn bind(mut self, prefix: impl Into<String>, uri: impl Into<String>) -> Self {
        self.bindings.insert(prefix.into(), uri.into());
        self
    }
}

impl<N: DomNode> NamespaceResolver<N> for NamespaceMap {
    fn resolve(&self, prefix: &str, _node: Option<&NodeRef<N>>) -> Option<String> {
        self.bindings.get(prefix).cloned()
    }
}

/// The default namespace resolver: walks DOM ancestors looking for `xmlns`
/// and `xmlns:prefix` declarations, with the reserved `xml` and `xmlns`
/// prefixes hard-wired. A document context node is replaced by its root
/// element before the walk.
#[derive(Debug, Clone, Copy, Default)]
pub struct DomNamespaceResolver;

impl<N: DomNode> NamespaceResolver<N> for DomNamespaceResolver {
    fn resolve(&self, prefix: &str, node: Option<&NodeRef<N>>) -> Option<String> {
        match prefix {
            "xml" => return Some(XML_URI.to_string()),
            "xmlns" => return Some(XMLNS_URI.to_string()),
            _ => {}
        }
        let mut cur = match node? {
            NodeRef::Dom(n) if n.kind() == NodeKind::Document => {
                let mut child = n.first_child();
                let mut root = None;
                while let Some(c) = child {
                    if c.kind() == NodeKind::Element {
                        root = Some(c);
                        break;
                    }
                    child = c.next_sibling();
                }
                root
            }
            NodeRef::Dom(n) => Some(n.clone()),
            NodeRef::Namespace(ns) => Some(ns.owner.clone()),
        };
        let wanted = if prefix.is_empty() {
            "xmlns".to_string()
        } else {
            format!("xmlns:{prefix}")
        };
        while let Some(n) = cur {
            if n.kind() == NodeKind::Element {
                for attr in n.attributes() {
                    if attr.node_name() == wanted {
                        return attr.node_value();
                    }
                }
            }
            cur = match n.kind() {
                NodeKind::Attribute => n.owner_element().or_else(|| n.parent()),
                _ => n.parent(),
            };
        }
        None
    }
}

/// Variable bindings supplied as a plain map, keyed by expanded name.
pub struct VariableMap<N: DomNode> {
    bindings: HashMap<ExpandedName, Value<N>>,
}

impl<N: DomNode> Default for VariableMap<N> {
    fn default() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }
}

impl<N: DomNode> VariableMap<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind(mut self, name: impl Into<String>, value: Value<N>) -> Self {
        self.bindings.insert(ExpandedName::local(name), value);
        self
    }

    pub fn bind_ns(
        mut self,
        ns_uri: impl Into<String>,
        local: impl Into<String>,
        value: Value<N>,
    ) -> Self {
        self.bindings
            .insert(ExpandedName::new(Some(ns_uri.into()), local), value);
        self
    }
}

impl<N: DomNode> VariableResolver<N> for VariableMap<N> {
    fn variable(&self, name: &ExpandedName) -> Option<Value<N>> {
        self.bindings.get(name).cloned()
    }
}

/// An empty variable environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVariables;

impl<N: DomNode> VariableResolver<N> for NoVariables {
    fn variable(&self, _name: &ExpandedName) -> Option<Value<N>> {
        None
    }
}

type Overload<N> = (usize, Option<usize>, FunctionImpl<N>);

/// Function registry keyed by expanded name, each entry carrying one or
/// more (min, max) arity ranges. `max = None` means variadic.
pub struct FunctionRegistry<N: DomNode> {
    fns: HashMap<ExpandedName, Vec<Overload<N>>>,
}

impl<N: DomNode> Default for FunctionRegistry<N> {
    fn default() -> Self {
        Self {
            fns: HashMap::new(),
        }
    }
}

impl<N: DomNode> FunctionRegistry<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &mut self,
        name: ExpandedName,
        min_arity: usize,
        max_arity: Option<usize>,
        func: FunctionImpl<N>,
    ) {
        self.fns
            .entry(name)
            .or_default()
            .push((min_arity, max_arity, func));
    }

    /// Register a function without a namespace.
    pub fn register_local<F>(&mut self, local: &str, min_arity: usize, max_arity: Option<usize>, f: F)
    where
        F: 'static + Send + Sync + Fn(&Context<N>, &[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register(ExpandedName::local(local), min_arity, max_arity, Arc::new(f));
    }

    /// Register a function in a namespace.
    pub fn register_ns<F>(
        &mut self,
        ns_uri: &str,
        local: &str,
        min_arity: usize,
        max_arity: Option<usize>,
        f: F,
    ) where
        F: 'static + Send + Sync + Fn(&Context<N>, &[Value<N>]) -> Result<Value<N>, Error>,
    {
        self.register(
            ExpandedName::new(Some(ns_uri.to_string()), local),
            min_arity,
            max_arity,
            Arc::new(f),
        );
    }
}

impl<N: DomNode> FunctionResolver<N> for FunctionRegistry<N> {
    fn function(&self, name: &ExpandedName, arity: usize) -> Result<FunctionImpl<N>, Error> {
        let Some(cands) = self.fns.get(name) else {
            return Err(Error::evaluation(format!("unknown function: {name}()")));
        };
        for (min, max, f) in cands {
            if arity >= *min && max.map_or(true, |m| arity <= m) {
                return Ok(f.clone());
            }
        }
        Err(Error::evaluation(format!(
            "function {name}() does not accept {arity} argument(s)"
        )))
    }
}

/// The evaluation context: the tuple (node, position, size, resolvers,
/// flags). Immutable; the `with_*` extensions produce shallow copies with
/// selected fields replaced, so predicate loops never share state.
pub struct Context<N: DomNode> {
    pub node: Option<NodeRef<N>>,
    /// 1-based position of `node` within the current node list.
    pub position: usize,
    pub size: usize,
    pub variables: Arc<dyn VariableResolver<N>>,
    pub namespaces: Arc<dyn NamespaceResolver<N>>,
    pub functions: Arc<dyn FunctionResolver<N>>,
    /// Context node of the whole expression; QNames in variable and
    /// function position resolve against this, not the inner step node.
    pub expression_node: Option<NodeRef<N>>,
    /// Sentinel ancestor bounding parent/ancestor traversal.
    pub virtual_root: Option<N>,
    pub case_insensitive: bool,
    pub allow_any_namespace_for_no_prefix: bool,
}

impl<N: DomNode> Clone for Context<N> {
    fn clone(&self) -> Self {
        Self {
            node: self.node.clone(),
            position: self.position,
            size: self.size,
            variables: self.variables.clone(),
            namespaces: self.namespaces.clone(),
            functions: self.functions.clone(),
            expression_node: self.expression_node.clone(),
            virtual_root: self.virtual_root.clone(),
            case_insensitive: self.case_insensitive,
            allow_any_namespace_for_no_prefix: self.allow_any_namespace_for_no_prefix,
        }
    }
}

impl<N: DomNode + 'static> Context<N> {
    pub fn new(node: Option<NodeRef<N>>) -> Self {
        Self {
            expression_node: node.clone(),
            node,
            position: 1,
            size: 1,
            variables: Arc::new(NoVariables),
            namespaces: Arc::new(DomNamespaceResolver),
            functions: Arc::new(crate::engine::functions::default_registry::<N>()),
            virtual_root: None,
            case_insensitive: false,
            allow_any_namespace_for_no_prefix: false,
        }
    }
}

impl<N: DomNode> Context<N> {
    pub fn with_node(&self, node: NodeRef<N>) -> Self {
        let mut c = self.clone();
        c.node = Some(node);
        c
    }

    pub fn with_position(&self, position: usize, size: usize) -> Self {
        let mut c = self.clone();
        c.position = position;
        c.size = size;
        c
    }

    /// The context node, or the error mandated when a step needs one.
    pub fn require_node(&self) -> Result<&NodeRef<N>, Error> {
        self.node
            .as_ref()
            .ok_or_else(|| Error::evaluation("context node required"))
    }

    /// Split a lexical QName and resolve its prefix. A missing prefix maps
    /// to no namespace; an unknown prefix is an error naming it.
    pub fn resolve_qname(&self, qname: &str) -> Result<ExpandedName, Error> {
        match qname.split_once(':') {
            None => Ok(ExpandedName::local(qname)),
            Some((prefix, local)) => {
                let uri = self
                    .namespaces
                    .resolve(prefix, self.expression_node.as_ref())
                    .ok_or_else(|| {
                        Error::evaluation(format!("cannot resolve namespace prefix: {prefix}"))
                    })?;
                Ok(ExpandedName::new(Some(uri), local))
            }
        }
    }
}
