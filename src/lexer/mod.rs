use std::fmt;
use logos::Logos;
use crate::error::{XdResult, SourceLocation, lexer_error};

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\f]+")]
#[logos(skip r"//[^\n]*")]
pub enum Token {
    // 关键字
    #[token("exit")]
    Exit,
    #[token("let")]
    Let,
    #[token("fn")]
    Fn,
    #[token("if")]
    If,
    #[token("return")]
    Return,
    #[token("int")]
    Int,
    #[token("float")]
    Float,
    #[token("char")]
    Char,
    #[token("void")]
    Void,

    // 标识符
    #[regex(r"[a-zA-Z][a-zA-Z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),

    // 字面量，保留原始文本，由代码生成阶段转换
    #[regex(r"[0-9]+", |lex| lex.slice().to_string())]
    IntLiteral(String),

    #[regex(r"[0-9]+\.[0-9]*", |lex| lex.slice().to_string())]
    FloatLiteral(String),

    #[regex(r#""[^"\n]*""#, |lex| {
        let s = lex.slice();
        s[1..s.len()-1].to_string()
    })]
    StringLiteral(String),

    // 运算符
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<")]
    Lt,
    #[token("<=")]
    Le,
    #[token(">")]
    Gt,
    #[token(">=")]
    Ge,

    // 赋值运算符
    #[token("=")]
    Assign,
    #[token("+=")]
    AddAssign,
    #[token("-=")]
    SubAssign,
    #[token("*=")]
    MulAssign,
    #[token("/=")]
    DivAssign,

    // 分隔符
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    #[token("{")]
    LBrace,
    #[token("}")]
    RBrace,
    #[token(";")]
    Semicolon,

    // 换行（用于跟踪行号）
    #[regex(r"\r?\n")]
    Newline,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Exit => "exit",
            Token::Let => "let",
            Token::Fn => "fn",
            Token::If => "if",
            Token::Return => "return",
            Token::Int => "int",
            Token::Float => "float",
            Token::Char => "char",
            Token::Void => "void",
            Token::Identifier(name) => name.as_str(),
            Token::IntLiteral(text) | Token::FloatLiteral(text) => text.as_str(),
            Token::StringLiteral(text) => return write!(f, "\"{}\"", text),
            Token::Plus => "+",
            Token::Minus => "-",
            Token::Star => "*",
            Token::Slash => "/",
            Token::EqEq => "==",
            Token::NotEq => "!=",
            Token::Lt => "<",
            Token::Le => "<=",
            Token::Gt => ">",
            Token::Ge => ">=",
            Token::Assign => "=",
            Token::AddAssign => "+=",
            Token::SubAssign => "-=",
            Token::MulAssign => "*=",
            Token::DivAssign => "/=",
            Token::LParen => "(",
            Token::RParen => ")",
            Token::LBrace => "{",
            Token::RBrace => "}",
            Token::Semicolon => ";",
            Token::Newline => "\\n",
        };
        f.write_str(text)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TokenWithLocation {
    pub token: Token,
    pub loc: SourceLocation,
}

pub struct Lexer<'a> {
    source: &'a str,
    inner: logos::Lexer<'a, Token>,
    line: usize,
    line_start: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            inner: Token::lexer(source),
            line: 1,
            line_start: 0,
        }
    }

    fn location(&self, offset: usize) -> SourceLocation {
        let column = self.source[self.line_start..offset].chars().count() + 1;
        SourceLocation::new(self.line, column)
    }

    pub fn tokenize(&mut self) -> XdResult<Vec<TokenWithLocation>> {
        let mut tokens = Vec::new();

        while let Some(token_result) = self.inner.next() {
            let span = self.inner.span();
            match token_result {
                Ok(Token::Newline) => {
                    // 不保留换行token
                    self.line += 1;
                    self.line_start = span.end;
                }
                Ok(token) => {
                    let loc = self.location(span.start);
                    tokens.push(TokenWithLocation { token, loc });
                }
                Err(_) => {
                    let error_char = &self.source[span.clone()];
                    return Err(lexer_error(
                        self.location(span.start),
                        format!("Unexpected character: '{}'", error_char),
                    ));
                }
            }
        }

        log::trace!("lexed {} tokens", tokens.len());
        Ok(tokens)
    }
}

pub fn lex(source: &str) -> XdResult<Vec<TokenWithLocation>> {
    let mut lexer = Lexer::new(source);
    lexer.tokenize()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::XdError;

    fn kinds(source: &str) -> Vec<Token> {
        lex(source).unwrap().into_iter().map(|t| t.token).collect()
    }

    #[test]
    fn test_let_statement_tokens() {
        assert_eq!(
            kinds("let int x = 5;"),
            vec![
                Token::Let,
                Token::Int,
                Token::Identifier("x".to_string()),
                Token::Assign,
                Token::IntLiteral("5".to_string()),
                Token::Semicolon,
            ]
        );
    }

    #[test]
    fn test_longest_match_operators() {
        assert_eq!(
            kinds("== = <= < >= > += -= *= /= !="),
            vec![
                Token::EqEq,
                Token::Assign,
                Token::Le,
                Token::Lt,
                Token::Ge,
                Token::Gt,
                Token::AddAssign,
                Token::SubAssign,
                Token::MulAssign,
                Token::DivAssign,
                Token::NotEq,
            ]
        );
    }

    #[test]
    fn test_keywords_and_identifiers() {
        assert_eq!(
            kinds("fn iffy if letter let"),
            vec![
                Token::Fn,
                Token::Identifier("iffy".to_string()),
                Token::If,
                Token::Identifier("letter".to_string()),
                Token::Let,
            ]
        );
    }

    #[test]
    fn test_float_literal() {
        assert_eq!(
            kinds("3.25 7 1."),
            vec![
                Token::FloatLiteral("3.25".to_string()),
                Token::IntLiteral("7".to_string()),
                Token::FloatLiteral("1.".to_string()),
            ]
        );
    }

    #[test]
    fn test_locations_track_lines() {
        let tokens = lex("let int a = 1;\n  // comment\n  a = 2;").unwrap();
        assert_eq!(tokens[0].loc, SourceLocation::new(1, 1));
        assert_eq!(tokens[2].loc, SourceLocation::new(1, 9));
        let a = &tokens[6];
        assert_eq!(a.token, Token::Identifier("a".to_string()));
        assert_eq!(a.loc, SourceLocation::new(3, 3));
    }

    #[test]
    fn test_unknown_character() {
        let err = lex("let int x = 5 $;").unwrap_err();
        assert_eq!(
            err,
            XdError::Lexer {
                line: 1,
                column: 15,
                message: "Unexpected character: '$'".to_string(),
            }
        );
    }
}
