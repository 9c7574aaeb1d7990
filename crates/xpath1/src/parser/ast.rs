//! AST for XPath 1.0 expressions. Immutable and shareable once built.

/// A lexical QName as written in the expression; the prefix is resolved
/// against the namespace resolver at evaluation time.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct QName {
    pub prefix: Option<String>,
    pub local: String,
}

impl QName {
    pub fn parse(s: &str) -> Self {
        match s.split_once(':') {
            Some((p, l)) => Self {
                prefix: Some(p.to_string()),
                local: l.to_string(),
            },
            None => Self {
                prefix: None,
                local: s.to_string(),
            },
        }
    }
}

impl core::fmt::Display for QName {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match &self.prefix {
            Some(p) => write!(f, "{}:{}", p, self.local),
            None => write!(f, "{}", self.local),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Or,
    And,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Union,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    Negate(Box<Expr>),
    Number(f64),
    Literal(String),
    VarRef(QName),
    FunctionCall {
        name: QName,
        args: Vec<Expr>,
    },
    Path(PathExpr),
}

/// A path expression: an optional filter primary with its predicates,
/// followed by an optional location path. All three parts are optional in
/// the grammar, never all absent at once.
#[derive(Debug, Clone, PartialEq)]
pub struct PathExpr {
    pub filter: Option<Box<Expr>>,
    pub filter_predicates: Vec<Expr>,
    pub location_path: Option<LocationPath>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LocationPath {
    pub absolute: bool,
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Step {
    pub axis: Axis,
    pub test: NodeTest,
    pub predicates: Vec<Expr>,
}

impl Step {
    /// The `descendant-or-self::node()` step `//` abbreviates.
    pub fn descendant_or_self_node() -> Self {
        Step {
            axis: Axis::DescendantOrSelf,
            test: NodeTest::Node,
            predicates: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    Ancestor,
    AncestorOrSelf,
    Attribute,
    Child,
    Descendant,
    DescendantOrSelf,
    Following,
    FollowingSibling,
    Namespace,
    Parent,
    Preceding,
    PrecedingSibling,
    SelfAxis,
}

impl Axis {
    pub fn from_name(name: &str) -> Option<Axis> {
        Some(match name {
            "ancestor" => Axis::Ancestor,
            "ancestor-or-self" => Axis::AncestorOrSelf,
            "attribute" => Axis::Attribute,
            "child" => Axis::Child,
            "descendant" => Axis::Descendant,
            "descendant-or-self" => Axis::DescendantOrSelf,
            "following" => Axis::Following,
            "following-sibling" => Axis::FollowingSibling,
            "namespace" => Axis::Namespace,
            "parent" => Axis::Parent,
            "preceding" => Axis::Preceding,
            "preceding-sibling" => Axis::PrecedingSibling,
            "self" => Axis::SelfAxis,
            _ => return None,
        })
    }

    /// Reverse axes enumerate away from the context node against document
    /// order; predicate positions count in that direction.
    pub fn is_reverse(self) -> bool {
        matches!(
            self,
            Axis::Ancestor
                | Axis::AncestorOrSelf
                | Axis::Parent
                | Axis::Preceding
                | Axis::PrecedingSibling
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeTest {
    /// `*`
    Any,
    /// `prefix:*`
    PrefixWildcard(String),
    /// `name` or `prefix:name`
    Name(QName),
    /// `comment()`
    Comment,
    /// `text()`, which also covers CDATA sections.
    Text,
    /// `processing-instruction()` with optional target literal.
    ProcessingInstruction(Option<String>),
    /// `node()`
    Node,
}
