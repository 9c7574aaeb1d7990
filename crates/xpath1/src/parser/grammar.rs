//! The XPath 1.0 grammar (W3C REC-xpath-19991116 §3) as data: terminals,
//! nonterminals and productions, each production paired with the reducer
//! that builds its AST value.
//!
//! The lexer has already disambiguated `*`, operator names, axis names,
//! function names and node types, which is what keeps this grammar LALR(1).

use crate::engine::runtime::Error;
use crate::lexer::TokenKind;
use crate::parser::ast::{Axis, BinaryOp, Expr, LocationPath, NodeTest, PathExpr, QName, Step};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub(crate) enum NonTerm {
    Start = 0,
    Expr,
    OrExpr,
    AndExpr,
    EqualityExpr,
    RelationalExpr,
    AdditiveExpr,
    MultiplicativeExpr,
    UnaryExpr,
    UnionExpr,
    PathExpr,
    FilterExpr,
    PrimaryExpr,
    VariableReference,
    FunctionCall,
    ArgumentList,
    LocationPath,
    AbsoluteLocationPath,
    RelativeLocationPath,
    Step_,
    AxisSpecifier,
    NodeTest_,
    Predicate,
    PredicateList,
}

pub(crate) const NONTERM_COUNT: usize = NonTerm::PredicateList as usize + 1;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub(crate) enum Sym {
    T(TokenKind),
    N(NonTerm),
}

/// Semantic value carried on the parser stack.
#[derive(Debug, Clone)]
pub(crate) enum SemVal {
    Token(String),
    Expr(Expr),
    Steps(Vec<Step>),
    Path(LocationPath),
    StepVal(Step),
    AxisVal(Axis),
    Test(NodeTest),
    Preds(Vec<Expr>),
    Args(Vec<Expr>),
}

pub(crate) struct Production {
    pub lhs: NonTerm,
    pub rhs: &'static [Sym],
    pub reduce: fn(Vec<SemVal>) -> Result<SemVal, Error>,
}

fn expr(v: SemVal) -> Expr {
    match v {
        SemVal::Expr(e) => e,
        other => unreachable!("expected expression value, found {other:?}"),
    }
}

fn token(v: SemVal) -> String {
    match v {
        SemVal::Token(t) => t,
        other => unreachable!("expected token value, found {other:?}"),
    }
}

fn steps(v: SemVal) -> Vec<Step> {
    match v {
        SemVal::Steps(s) => s,
        other => unreachable!("expected steps value, found {other:?}"),
    }
}

fn path(v: SemVal) -> LocationPath {
    match v {
        SemVal::Path(p) => p,
        other => unreachable!("expected path value, found {other:?}"),
    }
}

fn step(v: SemVal) -> Step {
    match v {
        SemVal::StepVal(s) => s,
        other => unreachable!("expected step value, found {other:?}"),
    }
}

fn axis(v: SemVal) -> Axis {
    match v {
        SemVal::AxisVal(a) => a,
        other => unreachable!("expected axis value, found {other:?}"),
    }
}

fn test(v: SemVal) -> NodeTest {
    match v {
        SemVal::Test(t) => t,
        other => unreachable!("expected node test value, found {other:?}"),
    }
}

fn preds(v: SemVal) -> Vec<Expr> {
    match v {
        SemVal::Preds(p) => p,
        other => unreachable!("expected predicates value, found {other:?}"),
    }
}

fn args(v: SemVal) -> Vec<Expr> {
    match v {
        SemVal::Args(a) => a,
        other => unreachable!("expected arguments value, found {other:?}"),
    }
}

fn r_pass(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(v.pop().expect("passthrough production has one symbol"))
}

fn r_paren(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(v.pop().expect("parenthesised expression has an inner value"))
}

fn binary(op: BinaryOp, mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let right = expr(v.pop().expect("binary rhs"));
    v.pop();
    let left = expr(v.pop().expect("binary lhs"));
    Ok(SemVal::Expr(Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }))
}

fn r_or(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Or, v)
}
fn r_and(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::And, v)
}
fn r_eq(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Eq, v)
}
fn r_ne(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Ne, v)
}
fn r_lt(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Lt, v)
}
fn r_gt(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Gt, v)
}
fn r_le(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Le, v)
}
fn r_ge(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Ge, v)
}
fn r_add(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Add, v)
}
fn r_sub(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Sub, v)
}
fn r_mul(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Mul, v)
}
fn r_div(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Div, v)
}
fn r_mod(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Mod, v)
}
fn r_union(v: Vec<SemVal>) -> Result<SemVal, Error> {
    binary(BinaryOp::Union, v)
}

fn r_negate(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let inner = expr(v.pop().expect("negation operand"));
    Ok(SemVal::Expr(Expr::Negate(Box::new(inner))))
}

fn r_path_from_location(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let lp = path(v.pop().expect("location path"));
    Ok(SemVal::Expr(Expr::Path(PathExpr {
        filter: None,
        filter_predicates: Vec::new(),
        location_path: Some(lp),
    })))
}

fn attach_location_path(filter: Expr, steps: Vec<Step>) -> Expr {
    let lp = LocationPath {
        absolute: false,
        steps,
    };
    match filter {
        Expr::Path(mut p) if p.filter.is_some() && p.location_path.is_none() => {
            p.location_path = Some(lp);
            Expr::Path(p)
        }
        other => Expr::Path(PathExpr {
            filter: Some(Box::new(other)),
            filter_predicates: Vec::new(),
            location_path: Some(lp),
        }),
    }
}

fn r_filter_slash(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let s = steps(v.pop().expect("relative path"));
    v.pop();
    let f = expr(v.pop().expect("filter expression"));
    Ok(SemVal::Expr(attach_location_path(f, s)))
}

fn r_filter_double_slash(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let s = steps(v.pop().expect("relative path"));
    v.pop();
    let f = expr(v.pop().expect("filter expression"));
    let mut all = vec![Step::descendant_or_self_node()];
    all.extend(s);
    Ok(SemVal::Expr(attach_location_path(f, all)))
}

fn r_filter_predicate(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let pred = expr(v.pop().expect("predicate expression"));
    let f = expr(v.pop().expect("filter expression"));
    let wrapped = match f {
        Expr::Path(mut p) if p.filter.is_some() && p.location_path.is_none() => {
            p.filter_predicates.push(pred);
            Expr::Path(p)
        }
        other => Expr::Path(PathExpr {
            filter: Some(Box::new(other)),
            filter_predicates: vec![pred],
            location_path: None,
        }),
    };
    Ok(SemVal::Expr(wrapped))
}

fn r_literal(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(SemVal::Expr(Expr::Literal(token(
        v.pop().expect("literal token"),
    ))))
}

fn r_number(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let t = token(v.pop().expect("number token"));
    let n = t
        .parse::<f64>()
        .map_err(|_| Error::invalid_expression(format!("malformed number: {t}")))?;
    Ok(SemVal::Expr(Expr::Number(n)))
}

fn r_var_ref(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let name = token(v.pop().expect("variable name"));
    Ok(SemVal::Expr(Expr::VarRef(QName::parse(&name))))
}

fn r_call_empty(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    v.pop();
    let name = token(v.pop().expect("function name"));
    Ok(SemVal::Expr(Expr::FunctionCall {
        name: QName::parse(&name),
        args: Vec::new(),
    }))
}

fn r_call_args(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    let a = args(v.pop().expect("argument list"));
    v.pop();
    let name = token(v.pop().expect("function name"));
    Ok(SemVal::Expr(Expr::FunctionCall {
        name: QName::parse(&name),
        args: a,
    }))
}

fn r_args_one(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(SemVal::Args(vec![expr(v.pop().expect("argument"))]))
}

fn r_args_push(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let e = expr(v.pop().expect("argument"));
    v.pop();
    let mut a = args(v.pop().expect("argument list"));
    a.push(e);
    Ok(SemVal::Args(a))
}

fn r_location_relative(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let s = steps(v.pop().expect("relative path"));
    Ok(SemVal::Path(LocationPath {
        absolute: false,
        steps: s,
    }))
}

fn r_root(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(SemVal::Path(LocationPath {
        absolute: true,
        steps: Vec::new(),
    }))
}

fn r_root_relative(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let s = steps(v.pop().expect("relative path"));
    Ok(SemVal::Path(LocationPath {
        absolute: true,
        steps: s,
    }))
}

fn r_root_double_slash(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let s = steps(v.pop().expect("relative path"));
    let mut all = vec![Step::descendant_or_self_node()];
    all.extend(s);
    Ok(SemVal::Path(LocationPath {
        absolute: true,
        steps: all,
    }))
}

fn r_steps_one(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(SemVal::Steps(vec![step(v.pop().expect("step"))]))
}

fn r_steps_slash(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let st = step(v.pop().expect("step"));
    v.pop();
    let mut s = steps(v.pop().expect("steps"));
    s.push(st);
    Ok(SemVal::Steps(s))
}

fn r_steps_double_slash(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let st = step(v.pop().expect("step"));
    v.pop();
    let mut s = steps(v.pop().expect("steps"));
    s.push(Step::descendant_or_self_node());
    s.push(st);
    Ok(SemVal::Steps(s))
}

fn r_step(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let t = test(v.pop().expect("node test"));
    let a = axis(v.pop().expect("axis"));
    Ok(SemVal::StepVal(Step {
        axis: a,
        test: t,
        predicates: Vec::new(),
    }))
}

fn r_step_predicates(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let p = preds(v.pop().expect("predicates"));
    let t = test(v.pop().expect("node test"));
    let a = axis(v.pop().expect("axis"));
    Ok(SemVal::StepVal(Step {
        axis: a,
        test: t,
        predicates: p,
    }))
}

fn r_step_self(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(SemVal::StepVal(Step {
        axis: Axis::SelfAxis,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }))
}

fn r_step_parent(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(SemVal::StepVal(Step {
        axis: Axis::Parent,
        test: NodeTest::Node,
        predicates: Vec::new(),
    }))
}

fn r_axis_named(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    let name = token(v.pop().expect("axis name"));
    let a = Axis::from_name(&name)
        .ok_or_else(|| Error::invalid_expression(format!("unknown axis name: {name}")))?;
    Ok(SemVal::AxisVal(a))
}

fn r_axis_attribute(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(SemVal::AxisVal(Axis::Attribute))
}

fn r_axis_default(_v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(SemVal::AxisVal(Axis::Child))
}

fn r_test_any(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    Ok(SemVal::Test(NodeTest::Any))
}

fn r_test_prefix_wildcard(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let prefix = token(v.pop().expect("prefix"));
    Ok(SemVal::Test(NodeTest::PrefixWildcard(prefix)))
}

fn r_test_name(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let name = token(v.pop().expect("name"));
    Ok(SemVal::Test(NodeTest::Name(QName::parse(&name))))
}

fn r_test_node_type(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    v.pop();
    let name = token(v.pop().expect("node type"));
    let t = match name.as_str() {
        "comment" => NodeTest::Comment,
        "text" => NodeTest::Text,
        "node" => NodeTest::Node,
        "processing-instruction" => NodeTest::ProcessingInstruction(None),
        other => {
            return Err(Error::invalid_expression(format!(
                "unknown node type: {other}"
            )));
        }
    };
    Ok(SemVal::Test(t))
}

fn r_test_pi_target(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    let target = token(v.pop().expect("target literal"));
    v.pop();
    let name = token(v.pop().expect("node type"));
    if name != "processing-instruction" {
        return Err(Error::invalid_expression(format!(
            "node type {name}() takes no argument"
        )));
    }
    Ok(SemVal::Test(NodeTest::ProcessingInstruction(Some(target))))
}

fn r_predicate(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    v.pop();
    let e = expr(v.pop().expect("predicate expression"));
    Ok(SemVal::Expr(e))
}

fn r_preds_one(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    Ok(SemVal::Preds(vec![expr(v.pop().expect("predicate"))]))
}

fn r_preds_push(mut v: Vec<SemVal>) -> Result<SemVal, Error> {
    let p = expr(v.pop().expect("predicate"));
    let mut list = preds(v.pop().expect("predicates"));
    list.push(p);
    Ok(SemVal::Preds(list))
}

use NonTerm::*;
use Sym::{N, T};
use crate::lexer::TokenKind as Tk;

/// Production 0 is the augmented start; its completion is the accept
/// action. Indices are referenced by the generated tables only.
pub(crate) static PRODUCTIONS: &[Production] = &[
    Production { lhs: Start, rhs: &[N(Expr)], reduce: r_pass },
    Production { lhs: Expr, rhs: &[N(OrExpr)], reduce: r_pass },
    Production { lhs: OrExpr, rhs: &[N(AndExpr)], reduce: r_pass },
    Production { lhs: OrExpr, rhs: &[N(OrExpr), T(Tk::Or), N(AndExpr)], reduce: r_or },
    Production { lhs: AndExpr, rhs: &[N(EqualityExpr)], reduce: r_pass },
    Production { lhs: AndExpr, rhs: &[N(AndExpr), T(Tk::And), N(EqualityExpr)], reduce: r_and },
    Production { lhs: EqualityExpr, rhs: &[N(RelationalExpr)], reduce: r_pass },
    Production { lhs: EqualityExpr, rhs: &[N(EqualityExpr), T(Tk::Equals), N(RelationalExpr)], reduce: r_eq },
    Production { lhs: EqualityExpr, rhs: &[N(EqualityExpr), T(Tk::NotEquals), N(RelationalExpr)], reduce: r_ne },
    Production { lhs: RelationalExpr, rhs: &[N(AdditiveExpr)], reduce: r_pass },
    Production { lhs: RelationalExpr, rhs: &[N(RelationalExpr), T(Tk::Less), N(AdditiveExpr)], reduce: r_lt },
    Production { lhs: RelationalExpr, rhs: &[N(RelationalExpr), T(Tk::Greater), N(AdditiveExpr)], reduce: r_gt },
    Production { lhs: RelationalExpr, rhs: &[N(RelationalExpr), T(Tk::LessOrEqual), N(AdditiveExpr)], reduce: r_le },
    Production { lhs: RelationalExpr, rhs: &[N(RelationalExpr), T(Tk::GreaterOrEqual), N(AdditiveExpr)], reduce: r_ge },
    Production { lhs: AdditiveExpr, rhs: &[N(MultiplicativeExpr)], reduce: r_pass },
    Production { lhs: AdditiveExpr, rhs: &[N(AdditiveExpr), T(Tk::Plus), N(MultiplicativeExpr)], reduce: r_add },
    Production { lhs: AdditiveExpr, rhs: &[N(AdditiveExpr), T(Tk::Minus), N(MultiplicativeExpr)], reduce: r_sub },
    Production { lhs: MultiplicativeExpr, rhs: &[N(UnaryExpr)], reduce: r_pass },
    Production { lhs: MultiplicativeExpr, rhs: &[N(MultiplicativeExpr), T(Tk::Multiply), N(UnaryExpr)], reduce: r_mul },
    Production { lhs: MultiplicativeExpr, rhs: &[N(MultiplicativeExpr), T(Tk::Div), N(UnaryExpr)], reduce: r_div },
    Production { lhs: MultiplicativeExpr, rhs: &[N(MultiplicativeExpr), T(Tk::Mod), N(UnaryExpr)], reduce: r_mod },
    Production { lhs: UnaryExpr, rhs: &[N(UnionExpr)], reduce: r_pass },
    Production { lhs: UnaryExpr, rhs: &[T(Tk::Minus), N(UnaryExpr)], reduce: r_negate },
    Production { lhs: UnionExpr, rhs: &[N(PathExpr)], reduce: r_pass },
    Production { lhs: UnionExpr, rhs: &[N(UnionExpr), T(Tk::Bar), N(PathExpr)], reduce: r_union },
    Production { lhs: PathExpr, rhs: &[N(LocationPath)], reduce: r_path_from_location },
    Production { lhs: PathExpr, rhs: &[N(FilterExpr)], reduce: r_pass },
    Production { lhs: PathExpr, rhs: &[N(FilterExpr), T(Tk::Slash), N(RelativeLocationPath)], reduce: r_filter_slash },
    Production { lhs: PathExpr, rhs: &[N(FilterExpr), T(Tk::DoubleSlash), N(RelativeLocationPath)], reduce: r_filter_double_slash },
    Production { lhs: FilterExpr, rhs: &[N(PrimaryExpr)], reduce: r_pass },
    Production { lhs: FilterExpr, rhs: &[N(FilterExpr), N(Predicate)], reduce: r_filter_predicate },
    Production { lhs: PrimaryExpr, rhs: &[N(VariableReference)], reduce: r_pass },
    Production { lhs: PrimaryExpr, rhs: &[T(Tk::LeftParen), N(Expr), T(Tk::RightParen)], reduce: r_paren },
    Production { lhs: PrimaryExpr, rhs: &[T(Tk::Literal)], reduce: r_literal },
    Production { lhs: PrimaryExpr, rhs: &[T(Tk::Number)], reduce: r_number },
    Production { lhs: PrimaryExpr, rhs: &[N(FunctionCall)], reduce: r_pass },
    Production { lhs: VariableReference, rhs: &[T(Tk::Dollar), T(Tk::QName)], reduce: r_var_ref },
    Production { lhs: FunctionCall, rhs: &[T(Tk::FunctionName), T(Tk::LeftParen), T(Tk::RightParen)], reduce: r_call_empty },
    Production { lhs: FunctionCall, rhs: &[T(Tk::FunctionName), T(Tk::LeftParen), N(ArgumentList), T(Tk::RightParen)], reduce: r_call_args },
    Production { lhs: ArgumentList, rhs: &[N(Expr)], reduce: r_args_one },
    Production { lhs: ArgumentList, rhs: &[N(ArgumentList), T(Tk::Comma), N(Expr)], reduce: r_args_push },
    Production { lhs: LocationPath, rhs: &[N(RelativeLocationPath)], reduce: r_location_relative },
    Production { lhs: LocationPath, rhs: &[N(AbsoluteLocationPath)], reduce: r_pass },
    Production { lhs: AbsoluteLocationPath, rhs: &[T(Tk::Slash)], reduce: r_root },
    Production { lhs: AbsoluteLocationPath, rhs: &[T(Tk::Slash), N(RelativeLocationPath)], reduce: r_root_relative },
    Production { lhs: AbsoluteLocationPath, rhs: &[T(Tk::DoubleSlash), N(RelativeLocationPath)], reduce: r_root_double_slash },
    Production { lhs: RelativeLocationPath, rhs: &[N(Step_)], reduce: r_steps_one },
    Production { lhs: RelativeLocationPath, rhs: &[N(RelativeLocationPath), T(Tk::Slash), N(Step_)], reduce: r_steps_slash },
    Production { lhs: RelativeLocationPath, rhs: &[N(RelativeLocationPath), T(Tk::DoubleSlash), N(Step_)], reduce: r_steps_double_slash },
    Production { lhs: Step_, rhs: &[N(AxisSpecifier), N(NodeTest_)], reduce: r_step },
    Production { lhs: Step_, rhs: &[N(AxisSpecifier), N(NodeTest_), N(PredicateList)], reduce: r_step_predicates },
    Production { lhs: Step_, rhs: &[T(Tk::Dot)], reduce: r_step_self },
    Production { lhs: Step_, rhs: &[T(Tk::DoubleDot)], reduce: r_step_parent },
    Production { lhs: AxisSpecifier, rhs: &[T(Tk::AxisName), T(Tk::DoubleColon)], reduce: r_axis_named },
    Production { lhs: AxisSpecifier, rhs: &[T(Tk::At)], reduce: r_axis_attribute },
    Production { lhs: AxisSpecifier, rhs: &[], reduce: r_axis_default },
    Production { lhs: NodeTest_, rhs: &[T(Tk::Star)], reduce: r_test_any },
    Production { lhs: NodeTest_, rhs: &[T(Tk::PrefixedWildcard)], reduce: r_test_prefix_wildcard },
    Production { lhs: NodeTest_, rhs: &[T(Tk::QName)], reduce: r_test_name },
    Production { lhs: NodeTest_, rhs: &[T(Tk::NodeType), T(Tk::LeftParen), T(Tk::RightParen)], reduce: r_test_node_type },
    Production { lhs: NodeTest_, rhs: &[T(Tk::NodeType), T(Tk::LeftParen), T(Tk::Literal), T(Tk::RightParen)], reduce: r_test_pi_target },
    Production { lhs: Predicate, rhs: &[T(Tk::LeftBracket), N(Expr), T(Tk::RightBracket)], reduce: r_predicate },
    Production { lhs: PredicateList, rhs: &[N(Predicate)], reduce: r_preds_one },
    Production { lhs: PredicateList, rhs: &[N(PredicateList), N(Predicate)], reduce: r_preds_push },
];
