use rstest::rstest;
use xpath1::simple_node::{attr, doc, elem};
use xpath1::{EvalOptions, SimpleNode, parse, select};

/// The reference document: <root><a id="x"><b/><b/></a><c/></root>
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("root")
                .child(
                    elem("a")
                        .attr(attr("id", "x"))
                        .child(elem("b"))
                        .child(elem("b")),
                )
                .child(elem("c")),
        )
        .build()
}

fn opts(d: &SimpleNode) -> EvalOptions<SimpleNode> {
    EvalOptions::new().with_node(d.clone())
}

#[rstest]
fn count_of_descendants() {
    let d = sample();
    assert_eq!(parse("count(//b)").unwrap().evaluate_number(&opts(&d)).unwrap(), 2.0);
}

#[rstest]
fn positional_step() {
    let d = sample();
    let nodes = select("/root/a/b[2]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    let all = select("/root/a/b", &d).unwrap();
    assert_eq!(nodes[0], all[1]);
}

#[rstest]
fn attribute_string_value() {
    let d = sample();
    assert_eq!(
        parse("string(//a/@id)").unwrap().evaluate_string(&opts(&d)).unwrap(),
        "x"
    );
}

#[rstest]
fn following_from_a() {
    let d = sample();
    let nodes = select("//a/following::c", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].node_name(), "c");
}

#[rstest]
fn local_name_with_last() {
    let d = sample();
    let nodes = select("//*[local-name()='b'][position()=last()]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    let all = select("//b", &d).unwrap();
    assert_eq!(nodes[0], all[1]);
}

#[rstest]
fn union_is_a_set() {
    let d = sample();
    assert_eq!(select("//b | //b", &d).unwrap().len(), 2);
    assert_eq!(select("//a | //b | //c", &d).unwrap().len(), 4);
    // Union associates either way.
    let l = select("(//a | //b) | //c", &d).unwrap();
    let r = select("//a | (//b | //c)", &d).unwrap();
    assert_eq!(l, r);
}

#[rstest]
fn union_results_are_document_ordered() {
    let d = sample();
    let nodes = select("//c | //a/@id | //b", &d).unwrap();
    let names: Vec<String> = nodes.iter().map(|n| n.node_name()).collect();
    // The attribute precedes the children of its element.
    assert_eq!(names, vec!["id", "b", "b", "c"]);
}

#[rstest]
fn union_of_scalars_is_a_type_error() {
    let d = sample();
    let err = parse("1 | //b").unwrap().evaluate(&opts(&d)).unwrap_err();
    assert_eq!(err.code(), Some(52));
}

#[rstest]
fn filter_must_be_a_node_set_when_continued() {
    let d = sample();
    let err = parse("(1)[1]").unwrap().evaluate(&opts(&d)).unwrap_err();
    assert_eq!(err.code(), Some(52));
    let err = parse("concat('a','b')/c").unwrap().evaluate(&opts(&d)).unwrap_err();
    assert_eq!(err.code(), Some(52));
}

#[rstest]
fn parenthesised_set_predicate_is_global() {
    let d = sample();
    // (//b)[1] selects the first b of the whole set.
    let nodes = select("(//b)[1]", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    let all = select("//b", &d).unwrap();
    assert_eq!(nodes[0], all[0]);
}

#[rstest]
fn absolute_path_from_inner_node() {
    let d = sample();
    let b = select("//b", &d).unwrap()[0].clone();
    let b_host = match b {
        xpath1::NodeRef::Dom(ref n) => n.clone(),
        _ => unreachable!(),
    };
    // Absolute paths resolve to the document no matter the context node.
    let nodes = select("/root/c", &b_host).unwrap();
    assert_eq!(nodes.len(), 1);
}

#[rstest]
fn relative_path_without_context_fails() {
    let err = parse("a")
        .unwrap()
        .evaluate(&EvalOptions::<SimpleNode>::new())
        .unwrap_err();
    assert!(err.to_string().contains("context node"));
}

#[rstest]
fn scalar_expressions_need_no_context() {
    let o = EvalOptions::<SimpleNode>::new();
    assert_eq!(parse("1+2").unwrap().evaluate_number(&o).unwrap(), 3.0);
    assert_eq!(
        parse("concat('a', 'b', 'c')").unwrap().evaluate_string(&o).unwrap(),
        "abc"
    );
}

#[rstest]
fn virtual_root_bounds_ancestor_walk() {
    let d = sample();
    let a = match select("//a", &d).unwrap().remove(0) {
        xpath1::NodeRef::Dom(n) => n,
        _ => unreachable!(),
    };
    let b = match select("//b", &d).unwrap().remove(0) {
        xpath1::NodeRef::Dom(n) => n,
        _ => unreachable!(),
    };
    let o = EvalOptions::new().with_node(b.clone()).with_virtual_root(a.clone());
    // With a virtual root the ancestor walk stops at the sentinel.
    let up = parse("ancestor::*").unwrap().select(&o).unwrap();
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].node_name(), "a");
}
