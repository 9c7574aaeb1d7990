//! Node-set functions: `last`, `position`, `count`, `id`, `local-name`,
//! `namespace-uri`, `name`, `sum`.

use crate::engine::functions::xml_whitespace_tokens;
use crate::engine::runtime::{Context, Error};
use crate::model::{DomNode, NodeRef};
use crate::nodeset::NodeSet;
use crate::value::{Value, string_to_number};

pub(super) fn last_fn<N: DomNode>(
    ctx: &Context<N>,
    _args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(ctx.size as f64))
}

pub(super) fn position_fn<N: DomNode>(
    ctx: &Context<N>,
    _args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(ctx.position as f64))
}

pub(super) fn count_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let ns = args[0].node_set()?;
    Ok(Value::Number(ns.size()? as f64))
}

pub(super) fn id_fn<N: DomNode>(ctx: &Context<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let mut tokens: Vec<String> = Vec::new();
    match &args[0] {
        Value::NodeSet(ns) => {
            for s in ns.string_values() {
                tokens.extend(xml_whitespace_tokens(&s).into_iter().map(str::to_string));
            }
        }
        other => {
            let s = other.string()?;
            tokens.extend(xml_whitespace_tokens(&s).into_iter().map(str::to_string));
        }
    }
    let doc = ctx
        .require_node()?
        .document()
        .ok_or_else(|| Error::evaluation("id() requires a document"))?;
    let mut out = NodeSet::new();
    for token in tokens {
        if let Some(found) = doc.element_by_id(&token) {
            out.add(NodeRef::Dom(found));
        }
    }
    Ok(Value::NodeSet(out))
}

/// First node in document order of the argument node-set, or of the
/// implicit `[context node]` when no argument is given.
fn subject_node<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Option<NodeRef<N>>, Error> {
    match args.first() {
        None => Ok(Some(ctx.require_node()?.clone())),
        Some(v) => v.node_set()?.first(),
    }
}

pub(super) fn local_name_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::String(
        subject_node(ctx, args)?
            .map(|n| n.local_name())
            .unwrap_or_default(),
    ))
}

pub(super) fn namespace_uri_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::String(
        subject_node(ctx, args)?
            .and_then(|n| n.namespace_uri())
            .unwrap_or_default(),
    ))
}

pub(super) fn name_fn<N: DomNode>(ctx: &Context<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::String(
        subject_node(ctx, args)?
            .map(|n| n.qualified_name())
            .unwrap_or_default(),
    ))
}

pub(super) fn sum_fn<N: DomNode>(_ctx: &Context<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let ns = args[0].node_set()?;
    let mut total = 0.0;
    for n in ns.to_vec()? {
        total += string_to_number(&n.string_value());
    }
    Ok(Value::Number(total))
}
