//! XD 语法分析器
//!
//! 本模块将词法分析器生成的令牌流解析为抽象语法树 (AST)。
//! 表达式采用优先级爬升，语句采用递归下降；遇到任何语法错误立即返回。

mod statements;
mod expressions;
mod utils;

use crate::lexer::{Token, TokenWithLocation};
use crate::ast::Program;
use crate::error::XdResult;

/// 语法分析器
pub struct Parser {
    /// 令牌流
    pub tokens: Vec<TokenWithLocation>,
    /// 当前解析位置
    pub pos: usize,
    /// 当前表达式中已折叠的运算符个数
    pub expr_nodes: usize,
    /// 当前括号嵌套层数
    pub paren_depth: usize,
}

impl Parser {
    /// 创建新的语法分析器
    pub fn new(tokens: Vec<TokenWithLocation>) -> Self {
        Self {
            tokens,
            pos: 0,
            expr_nodes: 0,
            paren_depth: 0,
        }
    }

    /// 解析整个程序
    pub fn parse(&mut self) -> XdResult<Program> {
        let mut statements = Vec::new();

        while !self.is_at_end() {
            statements.push(self.parse_statement()?);
        }

        Ok(Program { statements })
    }

    // 语句解析方法
    fn parse_statement(&mut self) -> XdResult<crate::ast::Stmt> {
        statements::parse_statement(self)
    }

    fn parse_body(&mut self) -> XdResult<Vec<crate::ast::Stmt>> {
        statements::parse_body(self)
    }

    // 表达式解析方法
    fn parse_expression(&mut self) -> XdResult<crate::ast::Expr> {
        // 每个完整表达式单独计数
        self.expr_nodes = 0;
        self.paren_depth = 0;
        expressions::parse_expression(self)
    }

    // 辅助方法
    fn is_at_end(&self) -> bool {
        utils::is_at_end(self)
    }

    fn peek(&self, offset: usize) -> Option<&Token> {
        utils::peek(self, offset)
    }

    fn current_loc(&self) -> crate::error::SourceLocation {
        utils::current_loc(self)
    }

    fn advance(&mut self) -> XdResult<TokenWithLocation> {
        utils::advance(self)
    }

    fn check(&self, token: &Token) -> bool {
        utils::check(self, token)
    }

    fn try_eat(&mut self, token: &Token) -> XdResult<()> {
        utils::try_eat(self, token)
    }

    fn consume_identifier(&mut self, message: &str) -> XdResult<String> {
        utils::consume_identifier(self, message)
    }

    fn error(&self, message: &str) -> crate::error::XdError {
        utils::error(self, message)
    }
}

/// 解析令牌流生成 AST
pub fn parse(tokens: Vec<TokenWithLocation>) -> XdResult<Program> {
    let mut parser = Parser::new(tokens);
    parser.parse()
}
