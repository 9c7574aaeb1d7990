use rstest::rstest;
use xpath1::simple_node::{attr, doc, elem, elem_ns, pi, text};
use xpath1::{EvalOptions, SimpleNode, parse, select, use_namespaces};

/// <lib xml:lang="en"><book id="b1">3</book><book id="b2" xml:lang="de-AT">4</book></lib>
fn library() -> SimpleNode {
    doc()
        .child(
            elem("lib")
                .attr(attr("xml:lang", "en"))
                .child(elem("book").attr(attr("id", "b1")).child(text("3")))
                .child(
                    elem("book")
                        .attr(attr("id", "b2"))
                        .attr(attr("xml:lang", "de-AT"))
                        .child(text("4")),
                ),
        )
        .build()
}

fn opts(d: &SimpleNode) -> EvalOptions<SimpleNode> {
    EvalOptions::new().with_node(d.clone())
}

fn eval_number(expr: &str, d: &SimpleNode) -> f64 {
    parse(expr).unwrap().evaluate_number(&opts(d)).unwrap()
}

fn eval_string(expr: &str, d: &SimpleNode) -> String {
    parse(expr).unwrap().evaluate_string(&opts(d)).unwrap()
}

fn eval_bool(expr: &str, d: &SimpleNode) -> bool {
    parse(expr).unwrap().evaluate_boolean(&opts(d)).unwrap()
}

#[rstest]
fn count_and_sum() {
    let d = library();
    assert_eq!(eval_number("count(//book)", &d), 2.0);
    assert_eq!(eval_number("count(//missing)", &d), 0.0);
    assert_eq!(eval_number("sum(//book)", &d), 7.0);
    assert_eq!(eval_number("sum(//missing)", &d), 0.0);
    assert!(eval_number("sum(//book/@id)", &d).is_nan());
}

#[rstest]
fn id_lookup() {
    let d = library();
    let nodes = select("id('b2')", &d).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(eval_string("string(id('b2'))", &d), "4");
    // Whitespace-separated token list, unknown ids skipped.
    assert_eq!(select("id('b1  b2 nope')", &d).unwrap().len(), 2);
    // Node-set argument: each node's string value is a token list.
    assert_eq!(select("id(//book/@id)", &d).unwrap().len(), 2);
}

#[rstest]
fn names_of_nodes() {
    let d = doc()
        .child(elem_ns("p:root", "urn:demo").child(pi("style", "x")))
        .build();
    let sel = use_namespaces([("q", "urn:demo")]);
    assert!(sel.select1("/q:root", &d).unwrap().is_some());
    assert_eq!(eval_string("name(//*[1])", &d), "p:root");
    assert_eq!(eval_string("local-name(//*[1])", &d), "root");
    assert_eq!(eval_string("namespace-uri(//*[1])", &d), "urn:demo");
    assert_eq!(eval_string("name(//processing-instruction())", &d), "style");
    // Empty node-set: all three return the empty string.
    assert_eq!(eval_string("name(//missing)", &d), "");
    assert_eq!(eval_string("local-name(//missing)", &d), "");
    assert_eq!(eval_string("namespace-uri(//missing)", &d), "");
}

#[rstest]
fn zero_argument_forms_use_the_context_node() {
    let d = library();
    let books = select("//book[local-name() = 'book']", &d).unwrap();
    assert_eq!(books.len(), 2);
    let named = select("//*[name() = 'lib']", &d).unwrap();
    assert_eq!(named.len(), 1);
}

#[rstest]
fn lang_matches_ancestors_case_insensitively() {
    let d = library();
    assert!(!eval_bool("lang('en')", &d), "the document node has no language");
    assert_eq!(select("//lib[lang('en')]", &d).unwrap().len(), 1);
    assert_eq!(
        select("//book[@id='b1'][lang('en')]", &d).unwrap().len(),
        1,
        "xml:lang inherits"
    );
    // Inner xml:lang overrides; suffixes match the bare language.
    assert_eq!(select("//book[lang('de')]", &d).unwrap().len(), 1);
    assert_eq!(select("//book[lang('DE-at')]", &d).unwrap().len(), 1);
    assert_eq!(select("//book[lang('en')]", &d).unwrap().len(), 1);
    assert_eq!(select("//book[lang('fr')]", &d).unwrap().len(), 0);
}

#[rstest]
fn position_and_last_against_siblings() {
    let d = library();
    assert_eq!(select("//book[position() = 1]", &d).unwrap().len(), 1);
    assert_eq!(select("//book[position() = last()]", &d).unwrap().len(), 1);
    assert_eq!(select("//book[position() <= last()]", &d).unwrap().len(), 2);
}

#[rstest]
fn numeric_rounding_functions() {
    let d = library();
    assert_eq!(eval_number("floor(2.6)", &d), 2.0);
    assert_eq!(eval_number("floor(-2.6)", &d), -3.0);
    assert_eq!(eval_number("ceiling(2.1)", &d), 3.0);
    assert_eq!(eval_number("ceiling(-2.1)", &d), -2.0);
    assert_eq!(eval_number("round(2.5)", &d), 3.0);
    assert_eq!(eval_number("round(-2.5)", &d), -2.0);
    assert_eq!(eval_number("round(2.4)", &d), 2.0);
    assert!(eval_number("round(0 div 0)", &d).is_nan());
    assert_eq!(eval_number("round(1 div 0)", &d), f64::INFINITY);
}

#[rstest]
fn number_of_context_node() {
    let d = library();
    let books = select("//book[number() = 4]", &d).unwrap();
    assert_eq!(books.len(), 1);
}
