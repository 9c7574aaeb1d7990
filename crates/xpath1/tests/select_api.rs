use rstest::rstest;
use xpath1::simple_node::{attr, doc, elem, text};
use xpath1::{
    Context, Error, EvalOptions, ExpandedName, FunctionRegistry, SimpleNode, Value, VariableMap,
    parse, select, select1,
};

/// <todo><item done="yes">one</item><item>two</item></todo>
fn sample() -> SimpleNode {
    doc()
        .child(
            elem("todo")
                .child(elem("item").attr(attr("done", "yes")).child(text("one")))
                .child(elem("item").child(text("two"))),
        )
        .build()
}

#[rstest]
fn select_returns_document_order() {
    let d = sample();
    let items = select("//item", &d).unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].string_value(), "one");
}

#[rstest]
fn select1_returns_the_first_match() {
    let d = sample();
    let first = select1("//item", &d).unwrap().unwrap();
    assert_eq!(first.string_value(), "one");
    assert!(select1("//nothing", &d).unwrap().is_none());
}

#[rstest]
fn compiled_expression_is_reusable() {
    let d = sample();
    let xp = parse("count(//item)").unwrap();
    let o = EvalOptions::new().with_node(d.clone());
    assert_eq!(xp.evaluate_number(&o).unwrap(), 2.0);
    assert_eq!(xp.evaluate_number(&o).unwrap(), 2.0);
    assert_eq!(xp.evaluate_string(&o).unwrap(), "2");
    assert!(xp.evaluate_boolean(&o).unwrap());
}

#[rstest]
fn evaluate_node_set_rejects_scalars() {
    let d = sample();
    let o = EvalOptions::new().with_node(d.clone());
    let err = parse("1+1").unwrap().evaluate_node_set(&o).unwrap_err();
    assert_eq!(err.code(), Some(52));
}

#[rstest]
fn variables_resolve_through_the_map() {
    let d = sample();
    let vars = VariableMap::new()
        .bind("wanted", Value::String("two".to_string()))
        .bind("limit", Value::Number(1.0));
    let o = EvalOptions::new().with_node(d.clone()).with_variables(vars);
    let nodes = parse("//item[. = $wanted]").unwrap().select(&o).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].string_value(), "two");
    assert_eq!(
        parse("$limit + 1").unwrap().evaluate_number(&o).unwrap(),
        2.0
    );
}

#[rstest]
fn undeclared_variable_is_an_error() {
    let d = sample();
    let o = EvalOptions::new().with_node(d.clone());
    let err = parse("$nope").unwrap().evaluate(&o).unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[rstest]
fn custom_functions_extend_the_builtins() {
    fn shout(
        _ctx: &Context<SimpleNode>,
        args: &[Value<SimpleNode>],
    ) -> Result<Value<SimpleNode>, Error> {
        Ok(Value::String(args[0].string()?.to_uppercase()))
    }
    let mut reg: FunctionRegistry<SimpleNode> = FunctionRegistry::new();
    reg.register_local("shout", 1, Some(1), shout);

    let d = sample();
    let o = EvalOptions::new().with_node(d.clone()).with_functions(reg);
    assert_eq!(
        parse("shout(//item)").unwrap().evaluate_string(&o).unwrap(),
        "ONE"
    );
    // Built-ins still resolve.
    assert_eq!(parse("count(//item)").unwrap().evaluate_number(&o).unwrap(), 2.0);
}

#[rstest]
fn namespaced_variables() {
    let d = sample();
    let vars = VariableMap::new().bind_ns("urn:v", "x", Value::Number(5.0));
    let o = EvalOptions::new()
        .with_node(d.clone())
        .with_variables(vars)
        .with_namespaces(xpath1::NamespaceMap::from_pairs([("m", "urn:v")]));
    assert_eq!(parse("$m:x").unwrap().evaluate_number(&o).unwrap(), 5.0);
}

#[rstest]
fn expanded_name_formatting() {
    assert_eq!(ExpandedName::local("f").to_string(), "f");
    assert_eq!(
        ExpandedName::new(Some("urn:x".into()), "f").to_string(),
        "{urn:x}f"
    );
}
