//! Boolean functions: `boolean`, `not`, `true`, `false`, `lang`.

use crate::consts::XML_URI;
use crate::engine::runtime::{Context, Error};
use crate::model::{DomNode, NodeKind, NodeRef};
use crate::value::Value;

pub(super) fn boolean_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(args[0].boolean()?))
}

pub(super) fn not_fn<N: DomNode>(_ctx: &Context<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(!args[0].boolean()?))
}

pub(super) fn true_fn<N: DomNode>(
    _ctx: &Context<N>,
    _args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(true))
}

pub(super) fn false_fn<N: DomNode>(
    _ctx: &Context<N>,
    _args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(false))
}

/// `lang(s)`: search the context node's ancestor-or-self chain for an
/// `xml:lang` attribute and match it against `s`, ignoring case, with a
/// country-code suffix (`en-US` matches `en`) allowed.
pub(super) fn lang_fn<N: DomNode>(ctx: &Context<N>, args: &[Value<N>]) -> Result<Value<N>, Error> {
    let wanted = args[0].string()?.to_ascii_lowercase();
    let mut cur = match ctx.require_node()? {
        NodeRef::Dom(n) => Some(n.clone()),
        NodeRef::Namespace(ns) => Some(ns.owner.clone()),
    };
    while let Some(n) = cur {
        if n.kind() == NodeKind::Element {
            if let Some(lang) = n.get_attribute_ns(XML_URI, "lang") {
                let lang = lang.to_ascii_lowercase();
                let matches =
                    lang == wanted || lang.starts_with(&format!("{wanted}-"));
                return Ok(Value::Boolean(matches));
            }
        }
        cur = match n.kind() {
            NodeKind::Attribute => n.owner_element().or_else(|| n.parent()),
            _ => n.parent(),
        };
    }
    Ok(Value::Boolean(false))
}
