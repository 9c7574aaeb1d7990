use rstest::rstest;
use xpath1::lexer::{TokenKind, tokenize};

fn kinds(input: &str) -> Vec<TokenKind> {
    tokenize(input)
        .unwrap()
        .into_iter()
        .map(|t| t.kind)
        .collect()
}

fn texts(input: &str) -> Vec<String> {
    tokenize(input).unwrap().into_iter().map(|t| t.text).collect()
}

use TokenKind::*;

#[rstest]
#[case("2*3", vec![Number, Multiply, Number, Eof])]
#[case("//*", vec![DoubleSlash, Star, Eof])]
#[case("@*", vec![At, Star, Eof])]
#[case("a div b", vec![QName, Div, QName, Eof])]
#[case("a and b or c", vec![QName, And, QName, Or, QName, Eof])]
#[case("$x + 1", vec![Dollar, QName, Plus, Number, Eof])]
#[case("child::div", vec![AxisName, DoubleColon, QName, Eof])]
#[case("ancestor-or-self::node()", vec![AxisName, DoubleColon, NodeType, LeftParen, RightParen, Eof])]
#[case("processing-instruction('t')", vec![NodeType, LeftParen, Literal, RightParen, Eof])]
#[case("foo:bar(1)", vec![FunctionName, LeftParen, Number, RightParen, Eof])]
#[case("foo:*", vec![PrefixedWildcard, Eof])]
#[case("foo:bar", vec![QName, Eof])]
#[case("a != b <= c", vec![QName, NotEquals, QName, LessOrEqual, QName, Eof])]
#[case(". .. .5 5. 1.5", vec![Dot, DoubleDot, Number, Number, Number, Eof])]
#[case("a[1]", vec![QName, LeftBracket, Number, RightBracket, Eof])]
fn token_kinds(#[case] input: &str, #[case] expected: Vec<TokenKind>) {
    assert_eq!(kinds(input), expected);
}

#[rstest]
fn multiply_versus_wildcard() {
    // After an operand `*` multiplies; after an operator it is a name test.
    assert_eq!(kinds("4 * 4"), vec![Number, Multiply, Number, Eof]);
    assert_eq!(kinds("* * *"), vec![Star, Multiply, Star, Eof]);
    assert_eq!(kinds("/ * * 4"), vec![Slash, Star, Multiply, Number, Eof]);
}

#[rstest]
fn operator_names_depend_on_context() {
    // First `div` starts the expression, so it is an element name.
    assert_eq!(kinds("div div div"), vec![QName, Div, QName, Eof]);
    assert_eq!(kinds("mod mod mod"), vec![QName, Mod, QName, Eof]);
    // After `(` an operator cannot appear.
    assert_eq!(kinds("(div)"), vec![LeftParen, QName, RightParen, Eof]);
}

#[rstest]
fn lexeme_content() {
    assert_eq!(texts("'hello world'"), vec!["hello world", ""]);
    assert_eq!(texts("\"it's\""), vec!["it's", ""]);
    assert_eq!(texts("foo:*"), vec!["foo", ""]);
    assert_eq!(texts("child::a"), vec!["child", "::", "a", ""]);
}

#[rstest]
#[case("'unterminated")]
#[case("\"unterminated")]
#[case("#")]
#[case("a ! b")]
#[case("a : b")]
fn lexical_errors(#[case] input: &str) {
    let err = tokenize(input).unwrap_err();
    assert_eq!(err.code(), Some(51), "{input} should be an invalid expression");
}

#[rstest]
fn unicode_names() {
    assert_eq!(kinds("héllo"), vec![QName, Eof]);
    assert_eq!(kinds("数据"), vec![QName, Eof]);
    assert_eq!(kinds("_a-b.c"), vec![QName, Eof]);
}
