//! 语句解析

use crate::ast::*;
use crate::lexer::Token;
use crate::error::XdResult;
use super::Parser;

/// 解析单条语句
pub fn parse_statement(parser: &mut Parser) -> XdResult<Stmt> {
    match parser.peek(0) {
        Some(Token::Fn) => parse_function(parser),
        Some(Token::Let) => parse_let(parser),
        Some(Token::If) => parse_if(parser),
        Some(Token::Return) => parse_return(parser),
        Some(Token::Identifier(name)) => {
            // 向前看一个令牌区分赋值与调用
            let name = name.clone();
            match parser.peek(1) {
                Some(Token::Assign) => parse_assignment(parser),
                Some(Token::AddAssign | Token::SubAssign | Token::MulAssign | Token::DivAssign) => {
                    parse_compound_assignment(parser)
                }
                Some(Token::LParen) => Err(parser.error("function calls are not supported")),
                _ => Err(parser.error(&format!("expected '=' after identifier '{}'", name))),
            }
        }
        Some(token) => Err(parser.error(&format!("unexpected token '{}'", token))),
        None => Err(parser.error("unexpected end of input")),
    }
}

/// 解析 `{ Stmt* }`
pub fn parse_body(parser: &mut Parser) -> XdResult<Vec<Stmt>> {
    parser.try_eat(&Token::LBrace)?;

    let mut statements = Vec::new();
    while !parser.is_at_end() && !parser.check(&Token::RBrace) {
        statements.push(parser.parse_statement()?);
    }

    parser.try_eat(&Token::RBrace)?;
    Ok(statements)
}

/// 解析函数原型：返回类型、名称和参数列表
fn parse_prototype(parser: &mut Parser) -> XdResult<Prototype> {
    let loc = parser.current_loc();
    let return_type = parser.advance()?;
    let name = parser.consume_identifier("expected function name")?;

    parser.try_eat(&Token::LParen)?;

    // 参数按语句解析，参数个数即语句个数
    let mut args = Vec::new();
    while !parser.is_at_end() && !parser.check(&Token::RParen) {
        args.push(parser.parse_statement()?);
    }
    parser.try_eat(&Token::RParen)?;

    Ok(Prototype {
        name,
        return_type,
        arg_count: args.len(),
        args,
        loc,
    })
}

fn parse_function(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    parser.try_eat(&Token::Fn)?;

    let prototype = parse_prototype(parser)?;
    let body = parser.parse_body()?;

    Ok(Stmt::Function(Function { prototype, body, loc }))
}

fn parse_let(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    parser.try_eat(&Token::Let)?;

    if parser.is_at_end() {
        return Err(parser.error("expected type after 'let', found end of input"));
    }
    let type_token = parser.advance()?;
    let name = parser.consume_identifier("expected variable name")?;

    parser.try_eat(&Token::Assign)?;
    let initializer = parser.parse_expression()?;
    parser.try_eat(&Token::Semicolon)?;

    Ok(Stmt::Let(LetDecl {
        type_token,
        name,
        initializer,
        loc,
    }))
}

fn parse_assignment(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    let name = parser.consume_identifier("expected variable name")?;

    parser.try_eat(&Token::Assign)?;
    let value = parser.parse_expression()?;
    parser.try_eat(&Token::Semicolon)?;

    Ok(Stmt::Assignment(Assignment { name, value, loc }))
}

/// `x op= e` 展开为 `x = x op e`
fn parse_compound_assignment(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    let name = parser.consume_identifier("expected variable name")?;

    let op_loc = parser.current_loc();
    let op = match parser.advance()?.token {
        Token::AddAssign => BinaryOp::Add,
        Token::SubAssign => BinaryOp::Sub,
        Token::MulAssign => BinaryOp::Mul,
        Token::DivAssign => BinaryOp::Div,
        other => return Err(parser.error(&format!("expected compound assignment, found '{}'", other))),
    };

    let rhs = parser.parse_expression()?;
    parser.try_eat(&Token::Semicolon)?;

    let current = Expr::Primary(PrimaryExpr::Identifier(Identifier {
        name: name.clone(),
        loc,
    }));
    let value = Expr::Binary(BinaryExpr {
        op,
        left: Box::new(current),
        right: Box::new(rhs),
        loc: op_loc,
    });

    Ok(Stmt::Assignment(Assignment { name, value, loc }))
}

fn parse_if(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    parser.try_eat(&Token::If)?;

    parser.try_eat(&Token::LParen)?;
    let condition = parser.parse_expression()?;
    parser.try_eat(&Token::RParen)?;

    let body = parser.parse_body()?;

    Ok(Stmt::If(IfStmt { condition, body, loc }))
}

fn parse_return(parser: &mut Parser) -> XdResult<Stmt> {
    let loc = parser.current_loc();
    parser.try_eat(&Token::Return)?;

    let value = if parser.check(&Token::Semicolon) {
        None
    } else {
        Some(parser.parse_expression()?)
    };
    parser.try_eat(&Token::Semicolon)?;

    Ok(Stmt::Return(ReturnStmt { value, loc }))
}
