//! Public facade: compile once, evaluate anywhere.
//!
//! [`parse`] compiles an expression into a reusable [`XPath`]; evaluation
//! takes an [`EvalOptions`] naming the context node and any namespace,
//! variable or function bindings. The `select` family returns nodes in
//! document order.

use std::sync::Arc;

use crate::engine::evaluator;
use crate::engine::functions::default_registry;
use crate::engine::runtime::{
    Context, DomNamespaceResolver, Error, FunctionImpl, FunctionResolver, NamespaceMap,
    NamespaceResolver, NoVariables, VariableResolver,
};
use crate::model::{DomNode, ExpandedName, NodeRef};
use crate::nodeset::NodeSet;
use crate::parser::{self, ast::Expr};
use crate::value::Value;

/// A compiled XPath expression. Immutable and shareable across evaluations.
#[derive(Debug, Clone)]
pub struct XPath {
    root: Expr,
}

/// Compile an expression.
pub fn parse(expr: &str) -> Result<XPath, Error> {
    Ok(XPath {
        root: parser::parse(expr)?,
    })
}

impl XPath {
    pub fn evaluate<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<Value<N>, Error> {
        evaluator::evaluate(&self.root, &options.context())
    }

    pub fn evaluate_number<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<f64, Error> {
        self.evaluate(options)?.number()
    }

    pub fn evaluate_string<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<String, Error> {
        self.evaluate(options)?.string()
    }

    pub fn evaluate_boolean<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<bool, Error> {
        self.evaluate(options)?.boolean()
    }

    pub fn evaluate_node_set<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<NodeSet<N>, Error> {
        self.evaluate(options)?.into_node_set()
    }

    /// Matching nodes in document order.
    pub fn select<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<Vec<NodeRef<N>>, Error> {
        self.evaluate_node_set(options)?.to_vec()
    }

    /// First matching node in document order.
    pub fn select1<N: DomNode + 'static>(
        &self,
        options: &EvalOptions<N>,
    ) -> Result<Option<NodeRef<N>>, Error> {
        self.evaluate_node_set(options)?.first()
    }
}

/// Evaluation options; a builder over the context's injection points.
pub struct EvalOptions<N: DomNode> {
    node: Option<N>,
    namespaces: Option<Arc<dyn NamespaceResolver<N>>>,
    variables: Option<Arc<dyn VariableResolver<N>>>,
    functions: Option<Arc<dyn FunctionResolver<N>>>,
    virtual_root: Option<N>,
    allow_any_namespace_for_no_prefix: bool,
    is_html: Option<bool>,
}

impl<N: DomNode> Default for EvalOptions<N> {
    fn default() -> Self {
        Self {
            node: None,
            namespaces: None,
            variables: None,
            functions: None,
            virtual_root: None,
            allow_any_namespace_for_no_prefix: false,
            is_html: None,
        }
    }
}

impl<N: DomNode + 'static> EvalOptions<N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_node(mut self, node: N) -> Self {
        self.node = Some(node);
        self
    }

    pub fn with_namespaces(mut self, resolver: impl NamespaceResolver<N> + 'static) -> Self {
        self.namespaces = Some(Arc::new(resolver));
        self
    }

    pub fn with_variables(mut self, resolver: impl VariableResolver<N> + 'static) -> Self {
        self.variables = Some(Arc::new(resolver));
        self
    }

    /// Extra functions, consulted before the built-in library.
    pub fn with_functions(mut self, resolver: impl FunctionResolver<N> + 'static) -> Self {
        self.functions = Some(Arc::new(resolver));
        self
    }

    /// Sentinel ancestor bounding absolute paths and ancestor traversal.
    pub fn with_virtual_root(mut self, root: N) -> Self {
        self.virtual_root = Some(root);
        self
    }

    /// Let unprefixed name tests match nodes in any namespace.
    pub fn allow_any_namespace_for_no_prefix(mut self, allow: bool) -> Self {
        self.allow_any_namespace_for_no_prefix = allow;
        self
    }

    /// Force HTML mode: case-insensitive name tests and any-namespace
    /// matching for unprefixed tests. Unset, HTML mode follows the
    /// document's own reporting.
    pub fn html(mut self, is_html: bool) -> Self {
        self.is_html = Some(is_html);
        self
    }

    fn context(&self) -> Context<N> {
        let node = self.node.clone().map(NodeRef::Dom);
        let is_html = self.is_html.unwrap_or_else(|| {
            node.as_ref()
                .map(|n| n.in_html_document())
                .unwrap_or(false)
        });
        let functions: Arc<dyn FunctionResolver<N>> = match &self.functions {
            None => Arc::new(default_registry::<N>()),
            Some(user) => Arc::new(ChainedFunctions {
                first: user.clone(),
                fallback: Arc::new(default_registry::<N>()),
            }),
        };
        Context {
            expression_node: node.clone(),
            node,
            position: 1,
            size: 1,
            variables: self
                .variables
                .clone()
                .unwrap_or_else(|| Arc::new(NoVariables)),
            namespaces: self
                .namespaces
                .clone()
                .unwrap_or_else(|| Arc::new(DomNamespaceResolver)),
            functions,
            virtual_root: self.virtual_root.clone(),
            case_insensitive: is_html,
            allow_any_namespace_for_no_prefix: self.allow_any_namespace_for_no_prefix || is_html,
        }
    }
}

/// User functions first, built-ins as fallback.
struct ChainedFunctions<N: DomNode> {
    first: Arc<dyn FunctionResolver<N>>,
    fallback: Arc<dyn FunctionResolver<N>>,
}

impl<N: DomNode> FunctionResolver<N> for ChainedFunctions<N> {
    fn function(&self, name: &ExpandedName, arity: usize) -> Result<FunctionImpl<N>, Error> {
        self.first
            .function(name, arity)
            .or_else(|_| self.fallback.function(name, arity))
    }
}

/// Evaluate `expr` against `node` and return the matching nodes in
/// document order.
pub fn select<N: DomNode + 'static>(expr: &str, node: &N) -> Result<Vec<NodeRef<N>>, Error> {
    parse(expr)?.select(&EvalOptions::new().with_node(node.clone()))
}

/// Evaluate `expr` against `node` and return the first matching node.
pub fn select1<N: DomNode + 'static>(expr: &str, node: &N) -> Result<Option<NodeRef<N>>, Error> {
    parse(expr)?.select1(&EvalOptions::new().with_node(node.clone()))
}

/// Build a selector with fixed prefix bindings.
///
/// ```
/// use xpath1::simple_node::{doc, elem_ns};
/// let d = doc().child(elem_ns("x:r", "urn:demo")).build();
/// let sel = xpath1::use_namespaces([("p", "urn:demo")]);
/// assert_eq!(sel.select("//p:r", &d).unwrap().len(), 1);
/// ```
pub fn use_namespaces<'a>(pairs: impl IntoIterator<Item = (&'a str, &'a str)>) -> Selector {
    Selector {
        namespaces: NamespaceMap::from_pairs(pairs),
    }
}

/// Prefix-aware `select`/`select1`, produced by [`use_namespaces`].
pub struct Selector {
    namespaces: NamespaceMap,
}

impl Selector {
    pub fn select<N: DomNode + 'static>(
        &self,
        expr: &str,
        node: &N,
    ) -> Result<Vec<NodeRef<N>>, Error> {
        parse(expr)?.select(
            &EvalOptions::new()
                .with_node(node.clone())
                .with_namespaces(self.namespaces.clone()),
        )
    }

    pub fn select1<N: DomNode + 'static>(
        &self,
        expr: &str,
        node: &N,
    ) -> Result<Option<NodeRef<N>>, Error> {
        parse(expr)?.select1(
            &EvalOptions::new()
                .with_node(node.clone())
                .with_namespaces(self.namespaces.clone()),
        )
    }
}
