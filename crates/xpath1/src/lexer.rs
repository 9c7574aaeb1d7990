//! Tokenizer for XPath 1.0 expressions.
//!
//! XPath's lexical grammar is context sensitive: `*` is a multiply operator
//! or a name-test wildcard, and the bare names `and` / `or` / `mod` / `div`
//! are operators or element names, depending on the previous token. A name
//! run is further classified by what follows it (`::` makes an axis name,
//! `(` a function name or node-type test, `:` a prefixed name or wildcard).

use crate::chars::{is_name_start, is_ncname_char};
use crate::engine::runtime::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum TokenKind {
    Eof = 0,
    Slash,
    DoubleSlash,
    Bar,
    Plus,
    Minus,
    Multiply,
    Div,
    Mod,
    And,
    Or,
    Equals,
    NotEquals,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    LeftParen,
    RightParen,
    LeftBracket,
    RightBracket,
    At,
    Comma,
    DoubleColon,
    Dot,
    DoubleDot,
    Dollar,
    /// Quoted string literal; the lexeme excludes the quotes.
    Literal,
    Number,
    /// Axis name before a `::`; the lexeme is the bare name.
    AxisName,
    /// `*` used as a name test.
    Star,
    /// `prefix:*`; the lexeme is the prefix.
    PrefixedWildcard,
    QName,
    /// `comment` | `text` | `node` | `processing-instruction` before `(`.
    NodeType,
    FunctionName,
}

pub const TOKEN_KIND_COUNT: usize = TokenKind::FunctionName as usize + 1;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }
}

/// True when, after `prev`, a `*` or an operator-name spelling must be read
/// as an operand (name test) rather than an operator. Mirrors the XPath 1.0
/// disambiguation rule: an operator cannot directly follow another operator
/// or an opening delimiter.
fn operand_expected(prev: Option<TokenKind>) -> bool {
    use TokenKind::*;
    match prev {
        None => true,
        Some(k) => matches!(
            k,
            At | DoubleColon
                | LeftParen
                | LeftBracket
                | Comma
                | Dollar
                | And
                | Or
                | Mod
                | Div
                | Multiply
                | Slash
                | DoubleSlash
                | Bar
                | Plus
                | Minus
                | Equals
                | NotEquals
                | Less
                | LessOrEqual
                | Greater
                | GreaterOrEqual
        ),
    }
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    prev: Option<TokenKind>,
}

/// Tokenize a whole expression, appending the EOF sentinel token.
pub fn tokenize(input: &str) -> Result<Vec<Token>, Error> {
    let mut chars: Vec<char> = input.chars().collect();
    // NUL sentinel so every lookahead is a plain index.
    chars.push('\0');
    let mut lexer = Lexer {
        chars,
        pos: 0,
        prev: None,
    };
    let mut tokens = Vec::new();
    loop {
        let tok = lexer.next_token()?;
        let done = tok.kind == TokenKind::Eof;
        lexer.prev = Some(tok.kind);
        tokens.push(tok);
        if done {
            return Ok(tokens);
        }
    }
}

impl Lexer {
    fn cur(&self) -> char {
        self.chars[self.pos]
    }

    fn peek(&self, ahead: usize) -> char {
        let i = self.pos + ahead;
        if i < self.chars.len() {
            self.chars[i]
        } else {
            '\0'
        }
    }

    fn skip_blanks(&mut self) {
        while matches!(self.cur(), ' ' | '\t' | '\r' | '\n') {
            self.pos += 1;
        }
    }

    /// Next non-blank character at or after `from`, without consuming.
    fn next_non_blank(&self, mut from: usize) -> char {
        while from < self.chars.len() && matches!(self.chars[from], ' ' | '\t' | '\r' | '\n') {
            from += 1;
        }
        if from < self.chars.len() {
            self.chars[from]
        } else {
            '\0'
        }
    }

    fn next_token(&mut self) -> Result<Token, Error> {
        use TokenKind::*;
        self.skip_blanks();
        let c = self.cur();
        match c {
            '\0' => Ok(Token::new(Eof, "")),
            '(' | ')' | '[' | ']' | '@' | ',' | '|' | '+' | '-' | '=' | '$' => {
                self.pos += 1;
                let kind = match c {
                    '(' => LeftParen,
                    ')' => RightParen,
                    '[' => LeftBracket,
                    ']' => RightBracket,
                    '@' => At,
                    ',' => Comma,
                    '|' => Bar,
                    '+' => Plus,
                    '-' => Minus,
                    '=' => Equals,
                    _ => Dollar,
                };
                Ok(Token::new(kind, c.to_string()))
            }
            '*' => {
                self.pos += 1;
                if operand_expected(self.prev) {
                    Ok(Token::new(Star, "*"))
                } else {
                    Ok(Token::new(Multiply, "*"))
                }
            }
            '/' => {
                self.pos += 1;
                if self.cur() == '/' {
                    self.pos += 1;
                    Ok(Token::new(DoubleSlash, "//"))
                } else {
                    Ok(Token::new(Slash, "/"))
                }
            }
            '!' => {
                if self.peek(1) == '=' {
                    self.pos += 2;
                    Ok(Token::new(NotEquals, "!="))
                } else {
                    Err(Error::invalid_expression("unexpected character '!'"))
                }
            }
            '<' => {
                self.pos += 1;
                if self.cur() == '=' {
                    self.pos += 1;
                    Ok(Token::new(LessOrEqual, "<="))
                } else {
                    Ok(Token::new(Less, "<"))
                }
            }
            '>' => {
                self.pos += 1;
                if self.cur() == '=' {
                    self.pos += 1;
                    Ok(Token::new(GreaterOrEqual, ">="))
                } else {
                    Ok(Token::new(Greater, ">"))
                }
            }
            ':' => {
                if self.peek(1) == ':' {
                    self.pos += 2;
                    Ok(Token::new(DoubleColon, "::"))
                } else {
                    Err(Error::invalid_expression("unexpected character ':'"))
                }
            }
            '"' | '\'' => self.literal(c),
            '.' => {
                if self.peek(1) == '.' {
                    self.pos += 2;
                    Ok(Token::new(DoubleDot, ".."))
                } else if self.peek(1).is_ascii_digit() {
                    self.number()
                } else {
                    self.pos += 1;
                    Ok(Token::new(Dot, "."))
                }
            }
            d if d.is_ascii_digit() => self.number(),
            s if is_name_start(s) => self.name(),
            other => Err(Error::invalid_expression(format!(
                "unexpected character '{other}'"
            ))),
        }
    }

    fn literal(&mut self, quote: char) -> Result<Token, Error> {
        self.pos += 1;
        let start = self.pos;
        while self.cur() != quote {
            if self.cur() == '\0' {
                return Err(Error::invalid_expression("unterminated string literal"));
            }
            self.pos += 1;
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        self.pos += 1;
        Ok(Token::new(TokenKind::Literal, text))
    }

    fn number(&mut self) -> Result<Token, Error> {
        let start = self.pos;
        while self.cur().is_ascii_digit() {
            self.pos += 1;
        }
        if self.cur() == '.' && self.peek(1) != '.' {
            self.pos += 1;
            while self.cur().is_ascii_digit() {
                self.pos += 1;
            }
        }
        let text: String = self.chars[start..self.pos].iter().collect();
        Ok(Token::new(TokenKind::Number, text))
    }

    fn ncname(&mut self) -> String {
        let start = self.pos;
        self.pos += 1;
        while is_ncname_char(self.cur()) {
            self.pos += 1;
        }
        self.chars[start..self.pos].iter().collect()
    }

    fn name(&mut self) -> Result<Token, Error> {
        use TokenKind::*;
        let first = self.ncname();

        // Operator spellings win wherever an operator may appear.
        if !operand_expected(self.prev) {
            let kind = match first.as_str() {
                "and" => Some(And),
                "or" => Some(Or),
                "mod" => Some(Mod),
                "div" => Some(Div),
                _ => None,
            };
            if let Some(kind) = kind {
                return Ok(Token::new(kind, first));
            }
        }

        if self.cur() == ':' && self.peek(1) == '*' {
            self.pos += 2;
            return Ok(Token::new(PrefixedWildcard, first));
        }
        if self.cur() == ':' && is_name_start(self.peek(1)) {
            self.pos += 1;
            let second = self.ncname();
            let qualified = format!("{first}:{second}");
            if self.next_non_blank(self.pos) == '(' {
                return Ok(Token::new(FunctionName, qualified));
            }
            return Ok(Token::new(QName, qualified));
        }
        if self.cur() == ':' && self.peek(1) == ':' {
            return Ok(Token::new(AxisName, first));
        }
        if self.next_non_blank(self.pos) == '(' {
            let kind = match first.as_str() {
                "comment" | "text" | "node" | "processing-instruction" => NodeType,
                _ => FunctionName,
            };
            return Ok(Token::new(kind, first));
        }
        Ok(Token::new(QName, first))
    }
}
