//! 解析辅助方法

use crate::lexer::{Token, TokenWithLocation};
use crate::error::{XdError, XdResult, SourceLocation, parser_error};
use super::Parser;

pub fn is_at_end(parser: &Parser) -> bool {
    parser.pos >= parser.tokens.len()
}

/// 向前查看，offset 为 0 时即当前令牌
pub fn peek(parser: &Parser, offset: usize) -> Option<&Token> {
    parser.tokens.get(parser.pos + offset).map(|t| &t.token)
}

/// 当前令牌的位置；到达末尾时取最后一个令牌的位置
pub fn current_loc(parser: &Parser) -> SourceLocation {
    parser.tokens.get(parser.pos)
        .or_else(|| parser.tokens.last())
        .map(|t| t.loc)
        .unwrap_or(SourceLocation::new(1, 1))
}

pub fn advance(parser: &mut Parser) -> XdResult<TokenWithLocation> {
    match parser.tokens.get(parser.pos) {
        Some(token) => {
            let token = token.clone();
            parser.pos += 1;
            Ok(token)
        }
        None => Err(error(parser, "unexpected end of input")),
    }
}

pub fn check(parser: &Parser, token: &Token) -> bool {
    peek(parser, 0) == Some(token)
}

/// 期望当前令牌为 token 并吃掉它，否则报告缺少的令牌
pub fn try_eat(parser: &mut Parser, token: &Token) -> XdResult<()> {
    if check(parser, token) {
        parser.pos += 1;
        return Ok(());
    }
    Err(error(parser, &format!("expected '{}', found {}", token, describe_current(parser))))
}

pub fn consume_identifier(parser: &mut Parser, message: &str) -> XdResult<String> {
    if let Some(Token::Identifier(name)) = peek(parser, 0) {
        let name = name.clone();
        parser.pos += 1;
        return Ok(name);
    }
    Err(error(parser, &format!("{}, found {}", message, describe_current(parser))))
}

/// 当前令牌的描述，用于错误信息
pub fn describe_current(parser: &Parser) -> String {
    match peek(parser, 0) {
        Some(token) => format!("'{}'", token),
        None => "end of input".to_string(),
    }
}

pub fn error(parser: &Parser, message: &str) -> XdError {
    parser_error(current_loc(parser), message)
}
