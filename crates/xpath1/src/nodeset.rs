//! Duplicate-free node collections with a document-ordered view.
//!
//! A node-set is an insertion list plus a lazily rebuilt index: an AVL tree
//! keyed by document order. Adding invalidates the index; the first sorted
//! access rebuilds it. The tree both deduplicates (insertion of an
//! identical node is a no-op) and sorts, and stays balanced under the
//! dominant access pattern of nodes arriving roughly in document order.

use std::sync::{Arc, RwLock};

use crate::engine::runtime::Error;
use crate::model::{DomNode, NodeRef};
use crate::order::document_order;

pub struct NodeSet<N: DomNode> {
    /// Insertion order; may contain duplicates until indexed.
    items: Vec<NodeRef<N>>,
    /// Cached document-ordered, deduplicated view.
    sorted: RwLock<Option<Arc<Vec<NodeRef<N>>>>>,
}

impl<N: DomNode> Default for NodeSet<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<N: DomNode> Clone for NodeSet<N> {
    fn clone(&self) -> Self {
        Self {
            items: self.items.clone(),
            sorted: RwLock::new(self.sorted.read().unwrap().clone()),
        }
    }
}

impl<N: DomNode> core::fmt::Debug for NodeSet<N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("NodeSet")
            .field("items", &self.items)
            .finish()
    }
}

impl<N: DomNode> NodeSet<N> {
    pub fn new() -> Self {
        Self {
            items: Vec::new(),
            sorted: RwLock::new(None),
        }
    }

    pub fn from_vec(items: Vec<NodeRef<N>>) -> Self {
        Self {
            items,
            sorted: RwLock::new(None),
        }
    }

    /// Append a node. Duplicates are tolerated here and collapse when the
    /// index is built.
    pub fn add(&mut self, node: NodeRef<N>) {
        self.items.push(node);
        *self.sorted.write().unwrap() = None;
    }

    pub fn add_vec(&mut self, nodes: Vec<NodeRef<N>>) {
        if nodes.is_empty() {
            return;
        }
        self.items.extend(nodes);
        *self.sorted.write().unwrap() = None;
    }

    /// True when the set holds no nodes at all.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Insertion-ordered view, first occurrence of each node.
    pub fn unordered_vec(&self) -> Vec<NodeRef<N>> {
        let mut out: Vec<NodeRef<N>> = Vec::with_capacity(self.items.len());
        for n in &self.items {
            if !out.contains(n) {
                out.push(n.clone());
            }
        }
        out
    }

    /// Number of distinct nodes.
    pub fn size(&self) -> Result<usize, Error> {
        Ok(self.indexed()?.len())
    }

    /// Nodes in document order.
    pub fn to_vec(&self) -> Result<Vec<NodeRef<N>>, Error> {
        Ok(self.indexed()?.as_ref().clone())
    }

    /// Lowest node in document order.
    pub fn first(&self) -> Result<Option<NodeRef<N>>, Error> {
        Ok(self.indexed()?.first().cloned())
    }

    /// XPath string value: the string value of the first node, or the empty
    /// string for an empty set.
    pub fn string_value(&self) -> Result<String, Error> {
        Ok(self
            .first()?
            .map(|n| n.string_value())
            .unwrap_or_default())
    }

    /// String values of all distinct nodes, for existential comparisons.
    pub fn string_values(&self) -> Vec<String> {
        self.unordered_vec()
            .iter()
            .map(|n| n.string_value())
            .collect()
    }

    fn indexed(&self) -> Result<Arc<Vec<NodeRef<N>>>, Error> {
        if let Some(cached) = self.sorted.read().unwrap().clone() {
            return Ok(cached);
        }
        let mut root: Option<Box<AvlNode<N>>> = None;
        for n in &self.items {
            root = Some(insert(root, n.clone())?);
        }
        let mut out = Vec::with_capacity(self.items.len());
        in_order(&root, &mut out);
        let out = Arc::new(out);
        *self.sorted.write().unwrap() = Some(out.clone());
        Ok(out)
    }
}

struct AvlNode<N: DomNode> {
    item: NodeRef<N>,
    left: Option<Box<AvlNode<N>>>,
    right: Option<Box<AvlNode<N>>>,
    depth: u32,
}

fn depth<N: DomNode>(node: &Option<Box<AvlNode<N>>>) -> u32 {
    node.as_ref().map(|n| n.depth).unwrap_or(0)
}

fn update_depth<N: DomNode>(node: &mut AvlNode<N>) {
    node.depth = 1 + depth(&node.left).max(depth(&node.right));
}

/// Insert keyed by document order, returning the new subtree root.
/// An identical node (comparator says equal) leaves the tree unchanged.
fn insert<N: DomNode>(
    node: Option<Box<AvlNode<N>>>,
    item: NodeRef<N>,
) -> Result<Box<AvlNode<N>>, Error> {
    let mut node = match node {
        None => {
            return Ok(Box::new(AvlNode {
                item,
                left: None,
                right: None,
                depth: 1,
            }));
        }
        Some(n) => n,
    };
    match document_order(&item, &node.item)? {
        core::cmp::Ordering::Equal => Ok(node),
        core::cmp::Ordering::Less => {
            node.left = Some(insert(node.left.take(), item)?);
            Ok(balance(node))
        }
        core::cmp::Ordering::Greater => {
            node.right = Some(insert(node.right.take(), item)?);
            Ok(balance(node))
        }
    }
}

fn balance<N: DomNode>(mut node: Box<AvlNode<N>>) -> Box<AvlNode<N>> {
    update_depth(&mut node);
    let left_depth = depth(&node.left);
    let right_depth = depth(&node.right);
    if left_depth > right_depth + 1 {
        // Left-right becomes left-left by pre-rotating the child.
        let left = node.left.take().expect("left subtree is deeper");
        let left = if depth(&left.right) > depth(&left.left) {
            rotate_left(left)
        } else {
            left
        };
        node.left = Some(left);
        rotate_right(node)
    } else if right_depth > left_depth + 1 {
        let right = node.right.take().expect("right subtree is deeper");
        let right = if depth(&right.left) > depth(&right.right) {
            rotate_right(right)
        } else {
            right
        };
        node.right = Some(right);
        rotate_left(node)
    } else {
        node
    }
}

fn rotate_right<N: DomNode>(mut node: Box<AvlNode<N>>) -> Box<AvlNode<N>> {
    let mut new_root = node.left.take().expect("rotation needs a left child");
    node.left = new_root.right.take();
    update_depth(&mut node);
    new_root.right = Some(node);
    update_depth(&mut new_root);
    new_root
}

fn rotate_left<N: DomNode>(mut node: Box<AvlNode<N>>) -> Box<AvlNode<N>> {
    let mut new_root = node.right.take().expect("rotation needs a right child");
    node.right = new_root.left.take();
    update_depth(&mut node);
    new_root.left = Some(node);
    update_depth(&mut new_root);
    new_root
}

fn in_order<N: DomNode>(node: &Option<Box<AvlNode<N>>>, out: &mut Vec<NodeRef<N>>) {
    if let Some(n) = node {
        in_order(&n.left, out);
        out.push(n.item.clone());
        in_order(&n.right, out);
    }
}
