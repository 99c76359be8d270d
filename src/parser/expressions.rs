//! 表达式解析
//!
//! 从低到高：相等性、比较、加减、乘除、基本表达式。所有运算符左结合。

use crate::ast::*;
use crate::lexer::Token;
use crate::error::XdResult;
use super::Parser;
use super::utils::describe_current;

/// 单个表达式最多折叠的运算符个数，限制语法树深度
const MAX_EXPRESSION_NODES: usize = 1000;
/// 括号最大嵌套层数
const MAX_PAREN_DEPTH: usize = 128;

fn count_node(parser: &mut Parser) -> XdResult<()> {
    parser.expr_nodes += 1;
    if parser.expr_nodes > MAX_EXPRESSION_NODES {
        return Err(parser.error("expression is nested too deeply"));
    }
    Ok(())
}

/// 解析表达式（入口点）
pub fn parse_expression(parser: &mut Parser) -> XdResult<Expr> {
    parse_equality(parser)
}

/// 解析相等性表达式
pub fn parse_equality(parser: &mut Parser) -> XdResult<Expr> {
    let mut left = parse_comparison(parser)?;

    loop {
        let loc = parser.current_loc();
        let op = match parser.peek(0) {
            Some(Token::EqEq) => ComparisonOp::Eq,
            Some(Token::NotEq) => ComparisonOp::Ne,
            _ => break,
        };
        count_node(parser)?;
        parser.advance()?;
        let right = parse_comparison(parser)?;
        left = Expr::Comparison(ComparisonExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            loc,
        });
    }

    Ok(left)
}

/// 解析比较表达式
pub fn parse_comparison(parser: &mut Parser) -> XdResult<Expr> {
    let mut left = parse_term(parser)?;

    loop {
        let loc = parser.current_loc();
        let op = match parser.peek(0) {
            Some(Token::Lt) => ComparisonOp::Lt,
            Some(Token::Gt) => ComparisonOp::Gt,
            Some(Token::Le) => ComparisonOp::Le,
            Some(Token::Ge) => ComparisonOp::Ge,
            _ => break,
        };
        count_node(parser)?;
        parser.advance()?;
        let right = parse_term(parser)?;
        left = Expr::Comparison(ComparisonExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            loc,
        });
    }

    Ok(left)
}

/// 解析加减表达式
pub fn parse_term(parser: &mut Parser) -> XdResult<Expr> {
    let mut left = parse_factor(parser)?;

    loop {
        let loc = parser.current_loc();
        let op = match parser.peek(0) {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => break,
        };
        count_node(parser)?;
        parser.advance()?;
        let right = parse_factor(parser)?;
        left = Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            loc,
        });
    }

    Ok(left)
}

/// 解析乘除表达式
pub fn parse_factor(parser: &mut Parser) -> XdResult<Expr> {
    let mut left = parse_primary(parser)?;

    loop {
        let loc = parser.current_loc();
        let op = match parser.peek(0) {
            Some(Token::Star) => BinaryOp::Mul,
            Some(Token::Slash) => BinaryOp::Div,
            _ => break,
        };
        count_node(parser)?;
        parser.advance()?;
        let right = parse_primary(parser)?;
        left = Expr::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
            loc,
        });
    }

    Ok(left)
}

/// 解析基本表达式
pub fn parse_primary(parser: &mut Parser) -> XdResult<Expr> {
    let loc = parser.current_loc();

    let primary = match parser.peek(0) {
        Some(Token::IntLiteral(text)) => {
            let text = text.clone();
            parser.advance()?;
            PrimaryExpr::IntLiteral(Literal { text, loc })
        }
        Some(Token::FloatLiteral(text)) => {
            let text = text.clone();
            parser.advance()?;
            PrimaryExpr::FloatLiteral(Literal { text, loc })
        }
        Some(Token::Identifier(name)) => {
            let name = name.clone();
            parser.advance()?;
            PrimaryExpr::Identifier(Identifier { name, loc })
        }
        Some(Token::LParen) => {
            if parser.paren_depth >= MAX_PAREN_DEPTH {
                return Err(parser.error("expression is nested too deeply"));
            }
            count_node(parser)?;
            parser.advance()?;
            parser.paren_depth += 1;
            let inner = parse_expression(parser)?;
            parser.paren_depth -= 1;
            parser.try_eat(&Token::RParen)?;
            PrimaryExpr::Paren(Box::new(inner))
        }
        _ => {
            return Err(parser.error(&format!("expected expression, found {}", describe_current(parser))));
        }
    };

    Ok(Expr::Primary(primary))
}
