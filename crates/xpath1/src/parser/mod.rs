//! Table-driven LALR(1) shift/reduce parser for XPath 1.0.
//!
//! The driver keeps a parallel stack of states and semantic values. Shift
//! pushes the lexeme; reduce pops the right-hand-side suffix, runs the
//! production's reducer and follows GOTO; accept returns the finished
//! expression; anything else is an invalid-expression diagnostic.

pub mod ast;
pub(crate) mod grammar;
pub(crate) mod tables;

use crate::engine::runtime::Error;
use crate::lexer::{self, TokenKind};
use crate::parser::ast::Expr;
use crate::parser::grammar::{PRODUCTIONS, SemVal};
use crate::parser::tables::{Action, tables};

/// Parse an expression into its AST.
pub fn parse(input: &str) -> Result<Expr, Error> {
    let tokens = lexer::tokenize(input)?;
    let t = tables();

    let mut states: Vec<u32> = vec![0];
    let mut values: Vec<SemVal> = Vec::new();
    let mut pos = 0usize;

    loop {
        let token = &tokens[pos];
        let state = *states.last().expect("state stack is never empty") as usize;
        match t.action[state][token.kind as usize] {
            Action::Shift(next) => {
                states.push(next);
                values.push(SemVal::Token(token.text.clone()));
                pos += 1;
            }
            Action::Reduce(p) => {
                let prod = &PRODUCTIONS[p as usize];
                let len = prod.rhs.len();
                let rhs_values = values.split_off(values.len() - len);
                states.truncate(states.len() - len);
                let value = (prod.reduce)(rhs_values)?;
                let top = *states.last().expect("state stack is never empty") as usize;
                let next = t.goto_[top][prod.lhs as usize]
                    .expect("GOTO is defined for every reachable reduction");
                states.push(next);
                values.push(value);
            }
            Action::Accept => {
                return match values.pop() {
                    Some(SemVal::Expr(e)) => Ok(e),
                    _ => Err(Error::invalid_expression("empty expression")),
                };
            }
            Action::Error => {
                let found = if token.kind == TokenKind::Eof {
                    "end of expression".to_string()
                } else {
                    format!("'{}'", token.text)
                };
                return Err(Error::invalid_expression(format!(
                    "unexpected {found} at token {pos}"
                )));
            }
        }
    }
}
