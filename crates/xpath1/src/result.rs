//! DOM-3 XPath result surface: a typed wrapper over an evaluated value
//! with the ten standard result types.
//!
//! Ordered node types materialise the document-ordered view of the
//! node-set; unordered types expose insertion order. Calling an accessor
//! that does not belong to the wrapper's type is the code-52 type error.

use crate::engine::runtime::Error;
use crate::model::{DomNode, NodeRef};
use crate::value::Value;

pub const ANY_TYPE: u16 = 0;
pub const NUMBER_TYPE: u16 = 1;
pub const STRING_TYPE: u16 = 2;
pub const BOOLEAN_TYPE: u16 = 3;
pub const UNORDERED_NODE_ITERATOR_TYPE: u16 = 4;
pub const ORDERED_NODE_ITERATOR_TYPE: u16 = 5;
pub const UNORDERED_NODE_SNAPSHOT_TYPE: u16 = 6;
pub const ORDERED_NODE_SNAPSHOT_TYPE: u16 = 7;
pub const ANY_UNORDERED_NODE_TYPE: u16 = 8;
pub const FIRST_ORDERED_NODE_TYPE: u16 = 9;

#[derive(Debug, Clone)]
pub struct XPathResult<N: DomNode> {
    result_type: u16,
    value: Value<N>,
    /// Materialised node list for the node-valued result types.
    nodes: Option<Vec<NodeRef<N>>>,
    cursor: usize,
}

impl<N: DomNode> XPathResult<N> {
    /// Wrap a value as the requested result type. `ANY_TYPE` selects the
    /// natural type of the value; requesting a node type for a non-node
    /// value is a type error, and a request outside `[0, 9]` is rejected.
    pub fn new(value: Value<N>, requested: u16) -> Result<Self, Error> {
        if requested > FIRST_ORDERED_NODE_TYPE {
            return Err(Error::evaluation(format!(
                "unknown result type: {requested}"
            )));
        }
        let result_type = if requested == ANY_TYPE {
            match &value {
                Value::Number(_) => NUMBER_TYPE,
                Value::String(_) => STRING_TYPE,
                Value::Boolean(_) => BOOLEAN_TYPE,
                Value::NodeSet(_) => UNORDERED_NODE_ITERATOR_TYPE,
            }
        } else {
            requested
        };
        let nodes = match result_type {
            UNORDERED_NODE_ITERATOR_TYPE
            | UNORDERED_NODE_SNAPSHOT_TYPE
            | ANY_UNORDERED_NODE_TYPE => Some(value.node_set()?.unordered_vec()),
            ORDERED_NODE_ITERATOR_TYPE | ORDERED_NODE_SNAPSHOT_TYPE | FIRST_ORDERED_NODE_TYPE => {
                Some(value.node_set()?.to_vec()?)
            }
            _ => None,
        };
        Ok(Self {
            result_type,
            value,
            nodes,
            cursor: 0,
        })
    }

    pub fn result_type(&self) -> u16 {
        self.result_type
    }

    pub fn number_value(&self) -> Result<f64, Error> {
        if self.result_type != NUMBER_TYPE {
            return Err(Error::type_error("result is not a number"));
        }
        self.value.number()
    }

    pub fn string_value(&self) -> Result<String, Error> {
        if self.result_type != STRING_TYPE {
            return Err(Error::type_error("result is not a string"));
        }
        self.value.string()
    }

    pub fn boolean_value(&self) -> Result<bool, Error> {
        if self.result_type != BOOLEAN_TYPE {
            return Err(Error::type_error("result is not a boolean"));
        }
        self.value.boolean()
    }

    /// Next node of an iterator result, or `None` when exhausted.
    pub fn iterate_next(&mut self) -> Result<Option<NodeRef<N>>, Error> {
        if !matches!(
            self.result_type,
            UNORDERED_NODE_ITERATOR_TYPE | ORDERED_NODE_ITERATOR_TYPE
        ) {
            return Err(Error::type_error("result is not an iterator"));
        }
        let nodes = self.nodes.as_ref().expect("node types carry a node list");
        let next = nodes.get(self.cursor).cloned();
        if next.is_some() {
            self.cursor += 1;
        }
        Ok(next)
    }

    pub fn snapshot_length(&self) -> Result<usize, Error> {
        if !matches!(
            self.result_type,
            UNORDERED_NODE_SNAPSHOT_TYPE | ORDERED_NODE_SNAPSHOT_TYPE
        ) {
            return Err(Error::type_error("result is not a snapshot"));
        }
        Ok(self.nodes.as_ref().expect("node types carry a node list").len())
    }

    pub fn snapshot_item(&self, index: usize) -> Result<Option<NodeRef<N>>, Error> {
        if !matches!(
            self.result_type,
            UNORDERED_NODE_SNAPSHOT_TYPE | ORDERED_NODE_SNAPSHOT_TYPE
        ) {
            return Err(Error::type_error("result is not a snapshot"));
        }
        Ok(self
            .nodes
            .as_ref()
            .expect("node types carry a node list")
            .get(index)
            .cloned())
    }

    /// The single node of a first/any-node result.
    pub fn single_node_value(&self) -> Result<Option<NodeRef<N>>, Error> {
        if !matches!(
            self.result_type,
            ANY_UNORDERED_NODE_TYPE | FIRST_ORDERED_NODE_TYPE
        ) {
            return Err(Error::type_error("result is not a single node"));
        }
        Ok(self
            .nodes
            .as_ref()
            .expect("node types carry a node list")
            .first()
            .cloned())
    }
}
