//! Document-order comparison of arbitrary nodes.
//!
//! A host `compare_position` capability is honoured when present; otherwise
//! the comparator walks both nodes' ancestor chains to their divergence
//! point and orders the diverged pair as siblings, with attribute-like
//! nodes (namespace first, then attributes) preceding child nodes.

use core::cmp::Ordering;

use crate::engine::runtime::Error;
use crate::model::{DocumentPosition, DomNode, NodeKind, NodeRef};

/// Compare two nodes by document order. Identity compares equal; two nodes
/// whose order cannot be established (distinct detached trees on a host
/// without `compare_position`) are an error.
pub fn document_order<N: DomNode>(a: &NodeRef<N>, b: &NodeRef<N>) -> Result<Ordering, Error> {
    if a == b {
        return Ok(Ordering::Equal);
    }

    if let (NodeRef::Dom(l), NodeRef::Dom(r)) = (a, b) {
        if let Some(pos) = l.compare_position(r) {
            return Ok(match pos {
                // Disconnected trees have no defined order; any stable
                // answer will do.
                DocumentPosition::Disconnected => Ordering::Greater,
                DocumentPosition::Preceding | DocumentPosition::Contains => Ordering::Greater,
                DocumentPosition::Following | DocumentPosition::ContainedBy => Ordering::Less,
            });
        }
    }

    let pa = path_to_root(a);
    let pb = path_to_root(b);
    let shared = pa
        .iter()
        .zip(pb.iter())
        .take_while(|(x, y)| x == y)
        .count();
    if shared == 0 {
        return Err(Error::evaluation(
            "cannot establish document order between disconnected nodes",
        ));
    }
    // One chain a prefix of the other: the shallower node is an ancestor and
    // comes first.
    if shared == pa.len() {
        return Ok(Ordering::Less);
    }
    if shared == pb.len() {
        return Ok(Ordering::Greater);
    }
    let parent = &pa[shared - 1];
    sibling_order(parent, &pa[shared], &pb[shared])
}

fn path_to_root<N: DomNode>(n: &NodeRef<N>) -> Vec<NodeRef<N>> {
    let mut path = vec![n.clone()];
    let mut cur = n.clone();
    while let Some(p) = cur.traversal_parent() {
        path.push(p.clone());
        cur = p;
    }
    path.reverse();
    path
}

fn is_attribute_like(kind: NodeKind) -> bool {
    matches!(kind, NodeKind::Attribute | NodeKind::Namespace)
}

/// Order two distinct nodes that share `parent`.
fn sibling_order<N: DomNode>(
    parent: &NodeRef<N>,
    a: &NodeRef<N>,
    b: &NodeRef<N>,
) -> Result<Ordering, Error> {
    let (ka, kb) = (a.kind(), b.kind());

    if is_attribute_like(ka) != is_attribute_like(kb) {
        return Ok(if is_attribute_like(ka) {
            Ordering::Less
        } else {
            Ordering::Greater
        });
    }

    if is_attribute_like(ka) {
        // Namespace nodes precede attributes; the xml namespace node comes
        // first of all.
        if (ka == NodeKind::Namespace) != (kb == NodeKind::Namespace) {
            return Ok(if ka == NodeKind::Namespace {
                Ordering::Less
            } else {
                Ordering::Greater
            });
        }
        if ka == NodeKind::Namespace {
            if a.is_xml_namespace() {
                return Ok(Ordering::Less);
            }
            if b.is_xml_namespace() {
                return Ok(Ordering::Greater);
            }
            return Ok(a.node_name().cmp(&b.node_name()));
        }
        if let NodeRef::Dom(p) = parent {
            for attr in p.attributes() {
                let attr = NodeRef::Dom(attr);
                if &attr == a {
                    return Ok(Ordering::Less);
                }
                if &attr == b {
                    return Ok(Ordering::Greater);
                }
            }
        }
        return Err(Error::evaluation(
            "cannot establish document order between attributes",
        ));
    }

    if let NodeRef::Dom(p) = parent {
        let mut child = p.first_child();
        while let Some(c) = child {
            let c_ref = NodeRef::Dom(c.clone());
            if &c_ref == a {
                return Ok(Ordering::Less);
            }
            if &c_ref == b {
                return Ok(Ordering::Greater);
            }
            child = c.next_sibling();
        }
    }
    Err(Error::evaluation(
        "cannot establish document order between siblings",
    ))
}
