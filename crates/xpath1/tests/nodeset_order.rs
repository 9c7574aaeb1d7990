use rstest::rstest;
use xpath1::simple_node::{attr, doc, elem, text};
use xpath1::{DomNode, NodeRef, NodeSet, SimpleNode};

/// <r a="1" b="2"><x><y/></x><z>t</z></r>
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .attr(attr("a", "1"))
                .attr(attr("b", "2"))
                .child(elem("x").child(elem("y")))
                .child(elem("z").child(text("t"))),
        )
        .build()
}

/// Pre-order with attributes before children, the expected document order.
fn expected_order(d: &SimpleNode) -> Vec<NodeRef<SimpleNode>> {
    fn walk(n: &SimpleNode, out: &mut Vec<NodeRef<SimpleNode>>) {
        out.push(NodeRef::Dom(n.clone()));
        for a in n.attributes() {
            out.push(NodeRef::Dom(a));
        }
        let mut c = n.first_child();
        while let Some(ch) = c {
            walk(&ch, out);
            c = ch.next_sibling();
        }
    }
    let mut out = Vec::new();
    walk(d, &mut out);
    out
}

#[rstest]
fn sorts_into_document_order() {
    let d = sample();
    let expected = expected_order(&d);
    // Insert in a scrambled order.
    let mut set = NodeSet::new();
    for i in [5, 0, 3, 6, 1, 7, 2, 4] {
        set.add(expected[i].clone());
    }
    assert_eq!(set.to_vec().unwrap(), expected);
    assert_eq!(set.size().unwrap(), expected.len());
    assert_eq!(set.first().unwrap().unwrap(), expected[0]);
}

#[rstest]
fn duplicates_collapse() {
    let d = sample();
    let expected = expected_order(&d);
    let mut set = NodeSet::new();
    for _ in 0..3 {
        for n in &expected {
            set.add(n.clone());
        }
    }
    assert_eq!(set.size().unwrap(), expected.len());
    assert_eq!(set.to_vec().unwrap().len(), expected.len());
    // The insertion view also deduplicates.
    assert_eq!(set.unordered_vec().len(), expected.len());
}

#[rstest]
fn add_invalidates_the_index() {
    let d = sample();
    let expected = expected_order(&d);
    let mut set = NodeSet::new();
    set.add(expected[4].clone());
    assert_eq!(set.to_vec().unwrap().len(), 1);
    set.add(expected[1].clone());
    // The rebuilt view includes the new node, sorted.
    assert_eq!(
        set.to_vec().unwrap(),
        vec![expected[1].clone(), expected[4].clone()]
    );
}

#[rstest]
fn attributes_precede_children() {
    let d = sample();
    let r = d.first_child().unwrap();
    let attr_b = NodeRef::Dom(r.attributes()[1].clone());
    let first_child = NodeRef::Dom(r.first_child().unwrap());
    let mut set = NodeSet::new();
    set.add(first_child.clone());
    set.add(attr_b.clone());
    set.add(NodeRef::Dom(r.clone()));
    assert_eq!(
        set.to_vec().unwrap(),
        vec![NodeRef::Dom(r), attr_b, first_child]
    );
}

#[rstest]
fn empty_set_behaviour() {
    let set: NodeSet<SimpleNode> = NodeSet::new();
    assert!(set.is_empty());
    assert_eq!(set.size().unwrap(), 0);
    assert_eq!(set.first().unwrap(), None);
    assert_eq!(set.string_value().unwrap(), "");
}

#[rstest]
fn string_value_is_first_node() {
    let d = sample();
    let z = xpath1::select("//z", &d).unwrap();
    let mut set = NodeSet::new();
    set.add(z[0].clone());
    assert_eq!(set.string_value().unwrap(), "t");
}
