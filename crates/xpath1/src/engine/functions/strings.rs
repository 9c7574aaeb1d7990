//! String functions.

use crate::engine::runtime::{Context, Error};
use crate::model::DomNode;
use crate::value::{Value, round_half_up};

/// String value of the context node, for the zero-argument forms.
fn context_string<N: DomNode>(ctx: &Context<N>) -> Result<String, Error> {
    Ok(ctx.require_node()?.string_value())
}

pub(super) fn string_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    match args.first() {
        None => Ok(Value::String(context_string(ctx)?)),
        Some(v) => Ok(Value::String(v.string()?)),
    }
}

pub(super) fn concat_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let mut out = String::new();
    for a in args {
        out.push_str(&a.string()?);
    }
    Ok(Value::String(out))
}

pub(super) fn starts_with_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(
        args[0].string()?.starts_with(&args[1].string()?),
    ))
}

pub(super) fn contains_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Boolean(args[0].string()?.contains(&args[1].string()?)))
}

pub(super) fn substring_before_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = args[0].string()?;
    let needle = args[1].string()?;
    Ok(Value::String(match s.find(&needle) {
        Some(i) => s[..i].to_string(),
        None => String::new(),
    }))
}

pub(super) fn substring_after_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = args[0].string()?;
    let needle = args[1].string()?;
    Ok(Value::String(match s.find(&needle) {
        Some(i) => s[i + needle.len()..].to_string(),
        None => String::new(),
    }))
}

/// 1-based `substring` with XPath's rounding: a character at position `p`
/// is kept when `p >= round(start)` and, with a length, when
/// `p < round(start) + round(length)`. NaN bounds keep nothing.
pub(super) fn substring_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = args[0].string()?;
    let start = round_half_up(args[1].number()?);
    let end = args
        .get(2)
        .map(|len| Ok::<f64, Error>(start + round_half_up(len.number()?)))
        .transpose()?;
    let mut out = String::new();
    for (i, c) in s.chars().enumerate() {
        let p = (i + 1) as f64;
        if p >= start && end.map_or(true, |e| p < e) {
            out.push(c);
        }
    }
    Ok(Value::String(out))
}

pub(super) fn string_length_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = match args.first() {
        None => context_string(ctx)?,
        Some(v) => v.string()?,
    };
    Ok(Value::Number(s.chars().count() as f64))
}

pub(super) fn normalize_space_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = match args.first() {
        None => context_string(ctx)?,
        Some(v) => v.string()?,
    };
    let tokens = crate::engine::functions::xml_whitespace_tokens(&s);
    Ok(Value::String(tokens.join(" ")))
}

/// Per-character mapping: each character of `from` maps to the character of
/// `to` at the same index, first occurrence winning; characters of `from`
/// beyond the length of `to` are deleted.
pub(super) fn translate_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    let s = args[0].string()?;
    let from: Vec<char> = args[1].string()?.chars().collect();
    let to: Vec<char> = args[2].string()?.chars().collect();
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match from.iter().position(|&f| f == c) {
            None => out.push(c),
            Some(i) => {
                if let Some(&r) = to.get(i) {
                    out.push(r);
                }
            }
        }
    }
    Ok(Value::String(out))
}
