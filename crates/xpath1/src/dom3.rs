//! DOM Level 3 XPath adapter: `create_expression`, `create_ns_resolver`
//! and `evaluate`, returning [`XPathResult`] wrappers with the standard
//! result-type codes.

use std::sync::Arc;

use crate::engine::runtime::{DomNamespaceResolver, Error, NamespaceResolver};
use crate::model::{DomNode, NodeRef};
use crate::result::XPathResult;
use crate::xpath::{EvalOptions, XPath, parse};

/// A compiled expression bound to an optional namespace resolver, the
/// DOM-3 `XPathExpression` analog.
pub struct XPathExpression<N: DomNode> {
    xpath: XPath,
    resolver: Option<Arc<dyn NamespaceResolver<N>>>,
}

impl<N: DomNode + 'static> XPathExpression<N> {
    pub fn evaluate(&self, context: &N, result_type: u16) -> Result<XPathResult<N>, Error> {
        let mut options = EvalOptions::new().with_node(context.clone());
        if let Some(r) = &self.resolver {
            options = options.with_namespaces(SharedResolver(r.clone()));
        }
        let value = self.xpath.evaluate(&options)?;
        XPathResult::new(value, result_type)
    }
}

/// Compile an expression with an optional resolver, per
/// `document.createExpression`.
pub fn create_expression<N: DomNode + 'static>(
    expr: &str,
    resolver: Option<Arc<dyn NamespaceResolver<N>>>,
) -> Result<XPathExpression<N>, Error> {
    Ok(XPathExpression {
        xpath: parse(expr)?,
        resolver,
    })
}

/// Resolver that answers prefix lookups from the declarations in scope at
/// a fixed node, per `document.createNSResolver`.
pub fn create_ns_resolver<N: DomNode + 'static>(node: &N) -> Arc<dyn NamespaceResolver<N>> {
    Arc::new(NodeAnchoredResolver { node: node.clone() })
}

/// One-shot `document.evaluate`: parse, evaluate against the context node
/// and wrap as the requested result type (0–9).
pub fn evaluate<N: DomNode + 'static>(
    expr: &str,
    context: &N,
    resolver: Option<Arc<dyn NamespaceResolver<N>>>,
    result_type: u16,
) -> Result<XPathResult<N>, Error> {
    create_expression(expr, resolver)?.evaluate(context, result_type)
}

struct NodeAnchoredResolver<N: DomNode> {
    node: N,
}

impl<N: DomNode> NamespaceResolver<N> for NodeAnchoredResolver<N> {
    fn resolve(&self, prefix: &str, _node: Option<&NodeRef<N>>) -> Option<String> {
        DomNamespaceResolver.resolve(prefix, Some(&NodeRef::Dom(self.node.clone())))
    }
}

struct SharedResolver<N: DomNode>(Arc<dyn NamespaceResolver<N>>);

impl<N: DomNode> NamespaceResolver<N> for SharedResolver<N> {
    fn resolve(&self, prefix: &str, node: Option<&NodeRef<N>>) -> Option<String> {
        self.0.resolve(prefix, node)
    }
}
