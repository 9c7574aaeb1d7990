use rstest::rstest;
use xpath1::simple_node::{attr, doc, elem, text};
use xpath1::{SimpleNode, select};

/// <r><item i="1"/><item i="2"/><item i="3"/><other/></r>
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("r")
                .child(elem("item").attr(attr("i", "1")))
                .child(elem("item").attr(attr("i", "2")))
                .child(elem("item").attr(attr("i", "3")))
                .child(elem("other")),
        )
        .build()
}

fn attr_i(node: &xpath1::NodeRef<SimpleNode>) -> String {
    match node {
        xpath1::NodeRef::Dom(n) => {
            use xpath1::DomNode;
            n.attributes()
                .first()
                .and_then(|a| a.node_value())
                .unwrap_or_default()
        }
        _ => unreachable!(),
    }
}

#[rstest]
fn numeric_predicate_equals_position_test() {
    let d = sample();
    let by_number = select("/r/item[2]", &d).unwrap();
    let by_position = select("/r/item[position()=2]", &d).unwrap();
    assert_eq!(by_number, by_position);
    assert_eq!(by_number.len(), 1);
    assert_eq!(attr_i(&by_number[0]), "2");
}

#[rstest]
fn first_and_last() {
    let d = sample();
    assert_eq!(attr_i(&select("/r/item[1]", &d).unwrap()[0]), "1");
    assert_eq!(attr_i(&select("/r/item[last()]", &d).unwrap()[0]), "3");
    assert_eq!(attr_i(&select("/r/item[last()-1]", &d).unwrap()[0]), "2");
}

#[rstest]
fn predicates_chain_left_to_right() {
    let d = sample();
    // Position recounts after each predicate.
    let nodes = select("/r/item[position()>1][1]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(attr_i(&nodes[0]), "2");
}

#[rstest]
fn boolean_predicates() {
    let d = sample();
    assert_eq!(select("/r/item[@i='2']", &d).unwrap().len(), 1);
    assert_eq!(select("/r/item[@i]", &d).unwrap().len(), 3);
    assert_eq!(select("/r/*[not(@i)]", &d).unwrap().len(), 1);
}

#[rstest]
fn reverse_axis_positions_count_backwards() {
    let d = doc()
        .child(elem("a").child(elem("b").child(elem("c").child(elem("d")))))
        .build();
    // ancestor::*[1] is the nearest ancestor.
    let nodes = select("//d/ancestor::*[1]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_name(), "c");
    let nodes = select("//d/ancestor::*[last()]", &d).unwrap();
    assert_eq!(nodes[0].node_name(), "a");
}

#[rstest]
fn preceding_sibling_positions() {
    let d = sample();
    let nodes = select("/r/other/preceding-sibling::item[1]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(attr_i(&nodes[0]), "3");
}

#[rstest]
fn nan_predicate_selects_nothing() {
    let d = sample();
    assert_eq!(
        select("/r/item[number('x')]", &d).unwrap().len(),
        0
    );
}

#[rstest]
fn predicate_over_string_value() {
    let d = doc()
        .child(
            elem("r")
                .child(elem("w").child(text("keep")))
                .child(elem("w").child(text("drop"))),
        )
        .build();
    let nodes = select("/r/w[.='keep']", &d).unwrap();
    assert_eq!(nodes.len(), 1);
}
