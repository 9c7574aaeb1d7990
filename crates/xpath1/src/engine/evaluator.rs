//! Recursive AST interpreter: expression dispatch, path and step
//! evaluation, the thirteen axes, node tests and predicate application.

use smallvec::SmallVec;

use crate::consts::XML_URI;
use crate::engine::runtime::{Context, Error};
use crate::model::{DomNode, NamespaceNode, NodeKind, NodeRef};
use crate::nodeset::NodeSet;
use crate::parser::ast::{Axis, BinaryOp, Expr, LocationPath, NodeTest, PathExpr};
use crate::value::{self, CompareOp, Value};

/// Per-step node buffer; most steps stay small.
type NodeBuf<N> = SmallVec<[NodeRef<N>; 8]>;

/// Evaluate an expression in a context, yielding its typed value.
pub fn evaluate<N: DomNode>(expr: &Expr, ctx: &Context<N>) -> Result<Value<N>, Error> {
    match expr {
        Expr::Number(n) => Ok(Value::Number(*n)),
        Expr::Literal(s) => Ok(Value::String(s.clone())),
        Expr::Negate(inner) => Ok(Value::Number(-evaluate(inner, ctx)?.number()?)),
        Expr::Binary { op, left, right } => eval_binary(*op, left, right, ctx),
        Expr::VarRef(name) => {
            let resolved = ctx.resolve_qname(&name.to_string())?;
            ctx.variables
                .variable(&resolved)
                .ok_or_else(|| Error::evaluation(format!("undeclared variable: {name}")))
        }
        Expr::FunctionCall { name, args } => {
            let resolved = ctx.resolve_qname(&name.to_string())?;
            let mut evaluated = Vec::with_capacity(args.len());
            for a in args {
                evaluated.push(evaluate(a, ctx)?);
            }
            let f = ctx.functions.function(&resolved, evaluated.len())?;
            f(ctx, &evaluated)
        }
        Expr::Path(p) => eval_path(p, ctx),
    }
}

fn eval_binary<N: DomNode>(
    op: BinaryOp,
    left: &Expr,
    right: &Expr,
    ctx: &Context<N>,
) -> Result<Value<N>, Error> {
    match op {
        BinaryOp::Or => {
            if evaluate(left, ctx)?.boolean()? {
                return Ok(Value::Boolean(true));
            }
            Ok(Value::Boolean(evaluate(right, ctx)?.boolean()?))
        }
        BinaryOp::And => {
            if !evaluate(left, ctx)?.boolean()? {
                return Ok(Value::Boolean(false));
            }
            Ok(Value::Boolean(evaluate(right, ctx)?.boolean()?))
        }
        BinaryOp::Eq | BinaryOp::Ne | BinaryOp::Lt | BinaryOp::Le | BinaryOp::Gt | BinaryOp::Ge => {
            let cmp = match op {
                BinaryOp::Eq => CompareOp::Eq,
                BinaryOp::Ne => CompareOp::Ne,
                BinaryOp::Lt => CompareOp::Lt,
                BinaryOp::Le => CompareOp::Le,
                BinaryOp::Gt => CompareOp::Gt,
                _ => CompareOp::Ge,
            };
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            Ok(Value::Boolean(value::compare(cmp, &l, &r)?))
        }
        BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul | BinaryOp::Div | BinaryOp::Mod => {
            let l = evaluate(left, ctx)?.number()?;
            let r = evaluate(right, ctx)?.number()?;
            Ok(Value::Number(match op {
                BinaryOp::Add => l + r,
                BinaryOp::Sub => l - r,
                BinaryOp::Mul => l * r,
                BinaryOp::Div => l / r,
                _ => l % r,
            }))
        }
        BinaryOp::Union => {
            let l = evaluate(left, ctx)?;
            let r = evaluate(right, ctx)?;
            let mut set = l.into_node_set().map_err(|_| {
                Error::type_error("union operand is not a node-set")
            })?;
            let rs = r.into_node_set().map_err(|_| {
                Error::type_error("union operand is not a node-set")
            })?;
            set.add_vec(rs.unordered_vec());
            Ok(Value::NodeSet(set))
        }
    }
}

fn eval_path<N: DomNode>(p: &PathExpr, ctx: &Context<N>) -> Result<Value<N>, Error> {
    let start: Vec<NodeRef<N>> = match &p.filter {
        None => vec![ctx.require_node()?.clone()],
        Some(filter) => {
            let v = evaluate(filter, ctx)?;
            match v {
                Value::NodeSet(ns) => {
                    // Filter predicates run over the unsorted array, in
                    // forward orientation.
                    let mut arr = ns.unordered_vec();
                    for pred in &p.filter_predicates {
                        arr = apply_predicate(arr, pred, ctx)?;
                    }
                    arr
                }
                other => {
                    if p.filter_predicates.is_empty() && p.location_path.is_none() {
                        return Ok(other);
                    }
                    return Err(Error::type_error(format!(
                        "expected node-set, found {}",
                        other.type_name()
                    )));
                }
            }
        }
    };

    let Some(lp) = &p.location_path else {
        return Ok(Value::NodeSet(NodeSet::from_vec(start)));
    };

    let input = if lp.absolute {
        vec![resolve_root(&start, ctx)?]
    } else {
        start
    };
    let set = eval_location_path(lp, input, ctx)?;
    Ok(Value::NodeSet(set))
}

/// Root for an absolute path: the first start node's document, the virtual
/// root when one is set, or the top of the parent chain of a detached tree.
fn resolve_root<N: DomNode>(
    start: &[NodeRef<N>],
    ctx: &Context<N>,
) -> Result<NodeRef<N>, Error> {
    let first = start
        .first()
        .ok_or_else(|| Error::evaluation("context node required"))?;
    if first.kind() == NodeKind::Document {
        return Ok(first.clone());
    }
    if let Some(vr) = &ctx.virtual_root {
        return Ok(NodeRef::Dom(vr.clone()));
    }
    first
        .document()
        .map(NodeRef::Dom)
        .ok_or_else(|| Error::evaluation("cannot resolve the document root"))
}

fn eval_location_path<N: DomNode>(
    lp: &LocationPath,
    mut current: Vec<NodeRef<N>>,
    ctx: &Context<N>,
) -> Result<NodeSet<N>, Error> {
    for step in &lp.steps {
        let mut set = NodeSet::new();
        for node in &current {
            for candidate in axis_nodes(step.axis, node, ctx)? {
                if node_test_matches(&step.test, &candidate, ctx)? {
                    set.add(candidate);
                }
            }
        }
        // Predicates see the combined candidate list in axis orientation:
        // document order for forward axes, reversed for reverse axes.
        let mut candidates = set.to_vec()?;
        if step.axis.is_reverse() {
            candidates.reverse();
        }
        for pred in &step.predicates {
            candidates = apply_predicate(candidates, pred, ctx)?;
        }
        current = candidates;
    }
    Ok(NodeSet::from_vec(current))
}

/// Keep the candidates a predicate selects. A numeric predicate keeps the
/// node at that position; anything else is coerced to boolean.
fn apply_predicate<N: DomNode>(
    candidates: Vec<NodeRef<N>>,
    pred: &Expr,
    ctx: &Context<N>,
) -> Result<Vec<NodeRef<N>>, Error> {
    let size = candidates.len();
    let mut out = Vec::new();
    for (i, node) in candidates.into_iter().enumerate() {
        let local = ctx.with_node(node.clone()).with_position(i + 1, size);
        let keep = match evaluate(pred, &local)? {
            Value::Number(n) => (i + 1) as f64 == n,
            other => other.boolean()?,
        };
        if keep {
            out.push(node);
        }
    }
    Ok(out)
}

/// Generate the axis sequence for one context node, in axis order.
fn axis_nodes<N: DomNode>(
    axis: Axis,
    node: &NodeRef<N>,
    ctx: &Context<N>,
) -> Result<NodeBuf<N>, Error> {
    let mut out = NodeBuf::new();
    match axis {
        Axis::SelfAxis => out.push(node.clone()),
        Axis::Parent => {
            if !is_virtual_root(node, ctx) {
                if let Some(p) = node.traversal_parent() {
                    out.push(p);
                }
            }
        }
        Axis::Child => {
            if let NodeRef::Dom(n) = node {
                let mut child = n.first_child();
                while let Some(c) = child {
                    out.push(NodeRef::Dom(c.clone()));
                    child = c.next_sibling();
                }
            }
        }
        Axis::Attribute => {
            if let NodeRef::Dom(n) = node {
                for a in n.attributes() {
                    out.push(NodeRef::Dom(a));
                }
            }
        }
        Axis::Ancestor => push_ancestors(node, ctx, &mut out),
        Axis::AncestorOrSelf => {
            out.push(node.clone());
            push_ancestors(node, ctx, &mut out);
        }
        Axis::Descendant => {
            if let NodeRef::Dom(n) = node {
                push_subtree_children(n, &mut out);
            }
        }
        Axis::DescendantOrSelf => {
            out.push(node.clone());
            if let NodeRef::Dom(n) = node {
                push_subtree_children(n, &mut out);
            }
        }
        Axis::FollowingSibling => {
            if let NodeRef::Dom(n) = node {
                if !matches!(n.kind(), NodeKind::Attribute) {
                    let mut sib = n.next_sibling();
                    while let Some(s) = sib {
                        out.push(NodeRef::Dom(s.clone()));
                        sib = s.next_sibling();
                    }
                }
            }
        }
        Axis::PrecedingSibling => {
            if let NodeRef::Dom(n) = node {
                if !matches!(n.kind(), NodeKind::Attribute) {
                    let mut sib = n.previous_sibling();
                    while let Some(s) = sib {
                        out.push(NodeRef::Dom(s.clone()));
                        sib = s.previous_sibling();
                    }
                }
            }
        }
        Axis::Following => {
            let mut anchor = Some(node.clone());
            while let Some(a) = anchor {
                if let NodeRef::Dom(n) = &a {
                    let mut sib = n.next_sibling();
                    while let Some(s) = sib {
                        out.push(NodeRef::Dom(s.clone()));
                        push_subtree_children(&s, &mut out);
                        sib = s.next_sibling();
                    }
                }
                if is_virtual_root(&a, ctx) {
                    break;
                }
                anchor = a.traversal_parent();
            }
        }
        Axis::Preceding => {
            let mut anchor = Some(node.clone());
            while let Some(a) = anchor {
                if let NodeRef::Dom(n) = &a {
                    let mut sib = n.previous_sibling();
                    while let Some(s) = sib {
                        push_subtree_reverse(&s, &mut out);
                        sib = s.previous_sibling();
                    }
                }
                if is_virtual_root(&a, ctx) {
                    break;
                }
                anchor = a.traversal_parent();
            }
        }
        Axis::Namespace => {
            if let NodeRef::Dom(n) = node {
                if n.kind() == NodeKind::Element {
                    push_namespace_nodes(n, &mut out);
                }
            }
        }
    }
    Ok(out)
}

fn is_virtual_root<N: DomNode>(node: &NodeRef<N>, ctx: &Context<N>) -> bool {
    match (node, &ctx.virtual_root) {
        (NodeRef::Dom(n), Some(vr)) => n == vr,
        _ => false,
    }
}

/// Ancestor chain, nearest first, bounded by the virtual root (inclusive).
fn push_ancestors<N: DomNode>(node: &NodeRef<N>, ctx: &Context<N>, out: &mut NodeBuf<N>) {
    if is_virtual_root(node, ctx) {
        return;
    }
    let mut cur = node.traversal_parent();
    while let Some(p) = cur {
        out.push(p.clone());
        if is_virtual_root(&p, ctx) {
            break;
        }
        cur = p.traversal_parent();
    }
}

/// Pre-order walk of the children subtrees.
fn push_subtree_children<N: DomNode>(n: &N, out: &mut NodeBuf<N>) {
    let mut child = n.first_child();
    while let Some(c) = child {
        out.push(NodeRef::Dom(c.clone()));
        push_subtree_children(&c, out);
        child = c.next_sibling();
    }
}

/// Reverse pre-order (deepest-last-first) of a whole subtree including its
/// root; the generation order of the `preceding` axis.
fn push_subtree_reverse<N: DomNode>(n: &N, out: &mut NodeBuf<N>) {
    let mut children: Vec<N> = Vec::new();
    let mut child = n.first_child();
    while let Some(c) = child {
        children.push(c.clone());
        child = c.next_sibling();
    }
    for c in children.iter().rev() {
        push_subtree_reverse(c, out);
    }
    out.push(NodeRef::Dom(n.clone()));
}

/// Materialise the in-scope namespace nodes of an element: every `xmlns` /
/// `xmlns:*` declaration on the element or an ancestor, closest binding
/// winning per prefix, plus the implicit `xml` binding. An empty default
/// declaration undeclares the default namespace.
fn push_namespace_nodes<N: DomNode>(element: &N, out: &mut NodeBuf<N>) {
    let mut seen: Vec<(String, String)> = Vec::new();
    let mut hidden: Vec<String> = Vec::new();

    let mut cur = Some(element.clone());
    while let Some(n) = cur {
        if n.kind() == NodeKind::Element {
            for attr in n.attributes() {
                let name = attr.node_name();
                let prefix = if name == "xmlns" {
                    Some(String::new())
                } else {
                    name.strip_prefix("xmlns:").map(str::to_string)
                };
                let Some(prefix) = prefix else { continue };
                if seen.iter().any(|(p, _)| *p == prefix) || hidden.contains(&prefix) {
                    continue;
                }
                let uri = attr.node_value().unwrap_or_default();
                if uri.is_empty() {
                    // xmlns="" undeclares; shadows outer bindings too.
                    hidden.push(prefix);
                } else {
                    seen.push((prefix, uri));
                }
            }
        }
        cur = n.parent();
    }

    out.push(NodeRef::Namespace(NamespaceNode {
        prefix: "xml".to_string(),
        uri: XML_URI.to_string(),
        owner: element.clone(),
    }));
    seen.sort_by(|a, b| a.0.cmp(&b.0));
    for (prefix, uri) in seen {
        if prefix == "xml" {
            continue;
        }
        out.push(NodeRef::Namespace(NamespaceNode {
            prefix,
            uri,
            owner: element.clone(),
        }));
    }
}

/// Apply a node test to a candidate.
fn node_test_matches<N: DomNode>(
    test: &NodeTest,
    candidate: &NodeRef<N>,
    ctx: &Context<N>,
) -> Result<bool, Error> {
    let kind = candidate.kind();
    match test {
        NodeTest::Any => Ok(matches!(
            kind,
            NodeKind::Element | NodeKind::Attribute | NodeKind::Namespace
        )),
        NodeTest::Name(q) => {
            if !matches!(
                kind,
                NodeKind::Element | NodeKind::Attribute | NodeKind::Namespace
            ) {
                return Ok(false);
            }
            if !namespace_matches(q.prefix.as_deref(), candidate, ctx)? {
                return Ok(false);
            }
            let local = candidate.local_name();
            Ok(if ctx.case_insensitive {
                local.eq_ignore_ascii_case(&q.local)
            } else {
                local == q.local
            })
        }
        NodeTest::PrefixWildcard(prefix) => {
            if !matches!(
                kind,
                NodeKind::Element | NodeKind::Attribute | NodeKind::Namespace
            ) {
                return Ok(false);
            }
            namespace_matches(Some(prefix), candidate, ctx)
        }
        NodeTest::Comment => Ok(kind == NodeKind::Comment),
        NodeTest::Text => Ok(matches!(kind, NodeKind::Text | NodeKind::CData)),
        NodeTest::ProcessingInstruction(target) => {
            if kind != NodeKind::ProcessingInstruction {
                return Ok(false);
            }
            match target {
                None => Ok(true),
                Some(t) => {
                    let name = match candidate {
                        NodeRef::Dom(n) => n.pi_target(),
                        NodeRef::Namespace(_) => None,
                    };
                    Ok(name.as_deref() == Some(t.as_str()))
                }
            }
        }
        NodeTest::Node => Ok(matches!(
            kind,
            NodeKind::Element
                | NodeKind::Attribute
                | NodeKind::Text
                | NodeKind::CData
                | NodeKind::ProcessingInstruction
                | NodeKind::Comment
                | NodeKind::Document
        )),
    }
}

/// Does the candidate's namespace URI match the test's prefix (resolved
/// against the expression context node)?
fn namespace_matches<N: DomNode>(
    prefix: Option<&str>,
    candidate: &NodeRef<N>,
    ctx: &Context<N>,
) -> Result<bool, Error> {
    let candidate_uri = candidate.namespace_uri();
    match prefix {
        None => {
            if ctx.allow_any_namespace_for_no_prefix {
                Ok(true)
            } else {
                Ok(candidate_uri.is_none() || candidate_uri.as_deref() == Some(""))
            }
        }
        Some(p) => {
            let uri = ctx
                .namespaces
                .resolve(p, ctx.expression_node.as_ref())
                .ok_or_else(|| {
                    Error::evaluation(format!("cannot resolve namespace prefix: {p}"))
                })?;
            Ok(candidate_uri.as_deref() == Some(uri.as_str()))
        }
    }
}
