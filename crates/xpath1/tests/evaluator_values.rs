use rstest::rstest;
use xpath1::simple_node::{doc, elem, text};
use xpath1::value::{number_to_string, string_to_number};
use xpath1::{EvalOptions, SimpleNode, parse};

fn eval_string(expr: &str) -> String {
    parse(expr)
        .unwrap()
        .evaluate_string(&EvalOptions::<SimpleNode>::new())
        .unwrap()
}

fn eval_number(expr: &str) -> f64 {
    parse(expr)
        .unwrap()
        .evaluate_number(&EvalOptions::<SimpleNode>::new())
        .unwrap()
}

fn eval_bool(expr: &str) -> bool {
    parse(expr)
        .unwrap()
        .evaluate_boolean(&EvalOptions::<SimpleNode>::new())
        .unwrap()
}

#[rstest]
#[case("string(1)", "1")]
#[case("string(1.5)", "1.5")]
#[case("string(-0.5 * 0)", "0")]
#[case("string(1 div 8)", "0.125")]
#[case("string(1 div 0)", "Infinity")]
#[case("string(-1 div 0)", "-Infinity")]
#[case("string(0 div 0)", "NaN")]
#[case("string(true())", "true")]
#[case("string(1 = 2)", "false")]
#[case("string(0.0000001)", "0.0000001")]
#[case("string(1000000000000000000000)", "1000000000000000000000")]
fn number_and_boolean_to_string(#[case] expr: &str, #[case] expected: &str) {
    assert_eq!(eval_string(expr), expected);
}

#[rstest]
#[case("number('12')", 12.0)]
#[case("number(' 1.5 ')", 1.5)]
#[case("number('-3.')", -3.0)]
#[case("number('.5')", 0.5)]
#[case("number(true())", 1.0)]
#[case("number(false())", 0.0)]
fn to_number(#[case] expr: &str, #[case] expected: f64) {
    assert_eq!(eval_number(expr), expected);
}

#[rstest]
#[case("number('1.5e2')")]
#[case("number('0x10')")]
#[case("number('1.2.3')")]
#[case("number('+1')")]
#[case("number('')")]
#[case("number('abc')")]
fn non_decimal_strings_are_nan(#[case] expr: &str) {
    assert!(eval_number(expr).is_nan());
}

#[rstest]
fn arithmetic() {
    assert_eq!(eval_number("1+2*3"), 7.0);
    assert_eq!(eval_number("10 div 4"), 2.5);
    assert_eq!(eval_number("5 mod 2"), 1.0);
    assert_eq!(eval_number("-5 mod 2"), -1.0);
    assert_eq!(eval_number("5.5 mod 2"), 1.5);
    assert_eq!(eval_number("- 3 + 10"), 7.0);
    assert!(eval_number("0 div 0").is_nan());
}

#[rstest]
fn equality_coercion_ladder() {
    // A boolean operand coerces both sides to boolean.
    assert!(eval_bool("true() = 1"));
    assert!(eval_bool("'a' = true()"));
    assert!(eval_bool("false() = 0"));
    // A number operand coerces both sides to number.
    assert!(eval_bool("'4' = 4"));
    assert!(!eval_bool("'04' != 4"));
    // Otherwise strings compare as strings.
    assert!(eval_bool("'a' = 'a'"));
    assert!(!eval_bool("'a' = 'b'"));
}

#[rstest]
fn relational_operators_compare_numerically() {
    assert!(eval_bool("2 < 10"));
    assert!(eval_bool("'2' < '10'"));
    assert!(!eval_bool("'a' < 'b'"));
    assert!(eval_bool("3 >= 3"));
    assert!(!eval_bool("number('x') < 1"));
    assert!(!eval_bool("number('x') >= 1"));
}

#[rstest]
fn boolean_coercions() {
    assert!(eval_bool("boolean(1)"));
    assert!(!eval_bool("boolean(0)"));
    assert!(!eval_bool("boolean(number('x'))"));
    assert!(eval_bool("boolean('0')"));
    assert!(!eval_bool("boolean('')"));
}

#[rstest]
fn node_set_comparisons_are_existential() {
    // <r><v>1</v><v>5</v></r>
    let d = doc()
        .child(
            elem("r")
                .child(elem("v").child(text("1")))
                .child(elem("v").child(text("5"))),
        )
        .build();
    let o = EvalOptions::new().with_node(d.clone());
    let t = |e: &str| parse(e).unwrap().evaluate_boolean(&o).unwrap();
    assert!(t("//v = 5"));
    assert!(t("//v = 1"));
    assert!(!t("//v = 3"));
    // Both can hold at once over different nodes.
    assert!(t("//v < 2 and //v > 2"));
    assert!(t("//v = '1'"));
    assert!(t("//v != 1"), "some node differs from 1");
    // Empty node-sets compare false against scalars...
    assert!(!t("//missing = //missing"));
    // ...and equal to false as booleans.
    assert!(t("//missing = false()"));
}

#[rstest]
fn node_set_string_value_is_first_in_document_order() {
    let d = doc()
        .child(
            elem("r")
                .child(elem("v").child(text("first")))
                .child(elem("v").child(text("second"))),
        )
        .build();
    let o = EvalOptions::new().with_node(d.clone());
    assert_eq!(parse("string(//v)").unwrap().evaluate_string(&o).unwrap(), "first");
    assert_eq!(parse("//v").unwrap().evaluate_string(&o).unwrap(), "first");
}

#[rstest]
fn coercion_to_node_set_is_a_type_error() {
    let err = parse("count(1)")
        .unwrap()
        .evaluate(&EvalOptions::<SimpleNode>::new())
        .unwrap_err();
    assert_eq!(err.code(), Some(52));
    let err = parse("sum('x')")
        .unwrap()
        .evaluate(&EvalOptions::<SimpleNode>::new())
        .unwrap_err();
    assert_eq!(err.code(), Some(52));
}

#[rstest]
fn formatting_round_trips() {
    for n in [0.0, 1.0, -1.0, 0.5, -2.25, 1e-7, 1e21, 123456.789] {
        assert_eq!(string_to_number(&number_to_string(n)), n, "{n}");
    }
    assert_eq!(number_to_string(f64::NAN), "NaN");
    assert_eq!(number_to_string(f64::INFINITY), "Infinity");
    assert_eq!(number_to_string(f64::NEG_INFINITY), "-Infinity");
    assert_eq!(number_to_string(-0.0), "0");
}
