//! Embeddable XPath 1.0 engine.
//!
//! Expressions compile through a lexer and a table-driven LALR(1) parser
//! into an immutable AST, which a recursive evaluator runs against any
//! document tree implementing [`DomNode`]. Results are the four-variant
//! XPath value algebra, with node-sets kept duplicate-free and document
//! ordered by an AVL index.
//!
//! ```
//! use xpath1::simple_node::{attr, doc, elem};
//!
//! let document = doc()
//!     .child(
//!         elem("root")
//!             .child(elem("a").attr(attr("id", "x")).child(elem("b")).child(elem("b")))
//!             .child(elem("c")),
//!     )
//!     .build();
//!
//! let nodes = xpath1::select("//b", &document).unwrap();
//! assert_eq!(nodes.len(), 2);
//! ```

#![forbid(unsafe_code)]

pub mod chars;
pub mod consts;
pub mod dom3;
pub mod engine;
pub mod lexer;
pub mod model;
pub mod nodeset;
pub mod order;
pub mod parser;
pub mod result;
pub mod simple_node;
pub mod value;
mod xpath;

pub use engine::evaluator::evaluate;
pub use engine::runtime::{
    Context, DomNamespaceResolver, Error, FunctionRegistry, FunctionResolver, NamespaceMap,
    NamespaceResolver, NoVariables, VariableMap, VariableResolver,
};
pub use model::{DomNode, ExpandedName, NamespaceNode, NodeKind, NodeRef};
pub use nodeset::NodeSet;
pub use result::XPathResult;
pub use simple_node::SimpleNode;
pub use value::Value;
pub use xpath::{EvalOptions, Selector, XPath, parse, select, select1, use_namespaces};
