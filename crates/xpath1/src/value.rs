//! The XPath 1.0 value algebra: a four-variant tagged value with the
//! coercion and comparison rules of the recommendation.
//!
//! Operator dispatch is by free functions over variant pairs rather than
//! methods on a class hierarchy; node-set comparisons are existential over
//! the contained nodes' string values.

use crate::engine::runtime::Error;
use crate::model::DomNode;
use crate::nodeset::NodeSet;

#[derive(Debug, Clone)]
pub enum Value<N: DomNode> {
    String(String),
    Number(f64),
    Boolean(bool),
    NodeSet(NodeSet<N>),
}

/// The six comparison operators of the algebra.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    fn numbers(self, l: f64, r: f64) -> bool {
        match self {
            CompareOp::Eq => l == r,
            CompareOp::Ne => l != r,
            CompareOp::Lt => l < r,
            CompareOp::Le => l <= r,
            CompareOp::Gt => l > r,
            CompareOp::Ge => l >= r,
        }
    }

    fn strings(self, l: &str, r: &str) -> bool {
        match self {
            CompareOp::Eq => l == r,
            CompareOp::Ne => l != r,
            // Relational comparisons never compare as strings in XPath 1.0;
            // both sides go through number() first.
            CompareOp::Lt => string_to_number(l) < string_to_number(r),
            CompareOp::Le => string_to_number(l) <= string_to_number(r),
            CompareOp::Gt => string_to_number(l) > string_to_number(r),
            CompareOp::Ge => string_to_number(l) >= string_to_number(r),
        }
    }

    fn is_equality(self) -> bool {
        matches!(self, CompareOp::Eq | CompareOp::Ne)
    }

    /// Mirror for swapped operands.
    fn flip(self) -> CompareOp {
        match self {
            CompareOp::Eq => CompareOp::Eq,
            CompareOp::Ne => CompareOp::Ne,
            CompareOp::Lt => CompareOp::Gt,
            CompareOp::Le => CompareOp::Ge,
            CompareOp::Gt => CompareOp::Lt,
            CompareOp::Ge => CompareOp::Le,
        }
    }
}

impl<N: DomNode> Value<N> {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::String(_) => "string",
            Value::Number(_) => "number",
            Value::Boolean(_) => "boolean",
            Value::NodeSet(_) => "node-set",
        }
    }

    /// Coerce to a string per XPath 1.0.
    pub fn string(&self) -> Result<String, Error> {
        match self {
            Value::String(s) => Ok(s.clone()),
            Value::Number(n) => Ok(number_to_string(*n)),
            Value::Boolean(b) => Ok(if *b { "true" } else { "false" }.to_string()),
            Value::NodeSet(ns) => ns.string_value(),
        }
    }

    /// Coerce to a number per XPath 1.0.
    pub fn number(&self) -> Result<f64, Error> {
        match self {
            Value::Number(n) => Ok(*n),
            Value::String(s) => Ok(string_to_number(s)),
            Value::Boolean(b) => Ok(if *b { 1.0 } else { 0.0 }),
            Value::NodeSet(ns) => Ok(string_to_number(&ns.string_value()?)),
        }
    }

    /// Coerce to a boolean per XPath 1.0.
    pub fn boolean(&self) -> Result<bool, Error> {
        match self {
            Value::Boolean(b) => Ok(*b),
            Value::Number(n) => Ok(*n != 0.0 && !n.is_nan()),
            Value::String(s) => Ok(!s.is_empty()),
            Value::NodeSet(ns) => Ok(!ns.is_empty()),
        }
    }

    /// The node-set behind this value; anything else is a type error.
    pub fn node_set(&self) -> Result<&NodeSet<N>, Error> {
        match self {
            Value::NodeSet(ns) => Ok(ns),
            other => Err(Error::type_error(format!(
                "cannot convert {} to a node-set",
                other.type_name()
            ))),
        }
    }

    pub fn into_node_set(self) -> Result<NodeSet<N>, Error> {
        match self {
            Value::NodeSet(ns) => Ok(ns),
            other => Err(Error::type_error(format!(
                "cannot convert {} to a node-set",
                other.type_name()
            ))),
        }
    }
}

/// Compare two values with XPath 1.0 semantics.
///
/// Node-set operands compare existentially. For scalar pairs the equality
/// coercion ladder is boolean, then number, then string; relational
/// operators always compare numerically.
pub fn compare<N: DomNode>(op: CompareOp, left: &Value<N>, right: &Value<N>) -> Result<bool, Error> {
    match (left, right) {
        (Value::NodeSet(l), Value::NodeSet(r)) => {
            let lv = l.string_values();
            let rv = r.string_values();
            for ls in &lv {
                for rs in &rv {
                    if op.strings(ls, rs) {
                        return Ok(true);
                    }
                }
            }
            Ok(false)
        }
        (Value::NodeSet(ns), other) => compare_node_set_scalar(op, ns, other),
        (other, Value::NodeSet(ns)) => compare_node_set_scalar(op.flip(), ns, other),
        (l, r) => {
            if op.is_equality() {
                if matches!(l, Value::Boolean(_)) || matches!(r, Value::Boolean(_)) {
                    Ok(op.numbers(
                        if l.boolean()? { 1.0 } else { 0.0 },
                        if r.boolean()? { 1.0 } else { 0.0 },
                    ))
                } else if matches!(l, Value::Number(_)) || matches!(r, Value::Number(_)) {
                    Ok(op.numbers(l.number()?, r.number()?))
                } else {
                    Ok(op.strings(&l.string()?, &r.string()?))
                }
            } else {
                Ok(op.numbers(l.number()?, r.number()?))
            }
        }
    }
}

fn compare_node_set_scalar<N: DomNode>(
    op: CompareOp,
    ns: &NodeSet<N>,
    scalar: &Value<N>,
) -> Result<bool, Error> {
    match scalar {
        Value::Boolean(b) => {
            let l = !ns.is_empty();
            Ok(op.numbers(l as u8 as f64, *b as u8 as f64))
        }
        Value::Number(r) => Ok(ns
            .string_values()
            .iter()
            .any(|s| op.numbers(string_to_number(s), *r))),
        Value::String(r) => {
            if op.is_equality() {
                Ok(ns.string_values().iter().any(|s| op.strings(s, r)))
            } else {
                let rn = string_to_number(r);
                Ok(ns
                    .string_values()
                    .iter()
                    .any(|s| op.numbers(string_to_number(s), rn)))
            }
        }
        Value::NodeSet(_) => unreachable!("handled by compare"),
    }
}

/// Format a number as XPath's `string()` does.
///
/// Integral values carry no decimal point, everything else uses the
/// shortest round-tripping decimal form with scientific notation expanded
/// (`1e-7` becomes `0.0000001`).
pub fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        return "NaN".to_string();
    }
    if n.is_infinite() {
        return if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if n == 0.0 {
        // Both zeroes print as plain "0".
        return "0".to_string();
    }
    // `Display` for f64 is the shortest round-trip form and never falls back
    // to an exponent.
    format!("{n}")
}

/// Parse a string as XPath's `number()` does.
///
/// Only an optional leading minus, decimal digits and at most one `.` are
/// accepted; hexadecimal and exponent forms are NaN.
pub fn string_to_number(s: &str) -> f64 {
    let t = s.trim_matches([' ', '\t', '\r', '\n']);
    if t.is_empty() {
        return f64::NAN;
    }
    let body = t.strip_prefix('-').unwrap_or(t);
    let mut digits = 0usize;
    let mut dots = 0usize;
    for c in body.chars() {
        if c.is_ascii_digit() {
            digits += 1;
        } else if c == '.' {
            dots += 1;
        } else {
            return f64::NAN;
        }
    }
    if digits == 0 || dots > 1 {
        return f64::NAN;
    }
    t.parse::<f64>().unwrap_or(f64::NAN)
}

/// `round()` as XPath defines it: the closest integer, ties toward
/// positive infinity.
pub fn round_half_up(n: f64) -> f64 {
    if n.is_nan() || n.is_infinite() {
        return n;
    }
    (n + 0.5).floor()
}
