//! Numeric functions: `number`, `floor`, `ceiling`, `round`.

use crate::engine::runtime::{Context, Error};
use crate::model::DomNode;
use crate::value::{Value, round_half_up, string_to_number};

pub(super) fn number_fn<N: DomNode>(
    ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    match args.first() {
        None => Ok(Value::Number(string_to_number(
            &ctx.require_node()?.string_value(),
        ))),
        Some(v) => Ok(Value::Number(v.number()?)),
    }
}

pub(super) fn floor_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(args[0].number()?.floor()))
}

pub(super) fn ceiling_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(args[0].number()?.ceil()))
}

pub(super) fn round_fn<N: DomNode>(
    _ctx: &Context<N>,
    args: &[Value<N>],
) -> Result<Value<N>, Error> {
    Ok(Value::Number(round_half_up(args[0].number()?)))
}
