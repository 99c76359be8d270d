use std::fmt;
use crate::lexer::TokenWithLocation;
use crate::error::SourceLocation;

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Let(LetDecl),
    Function(Function),
    Assignment(Assignment),
    If(IfStmt),
    Return(ReturnStmt),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LetDecl {
    /// 声明的类型令牌，解析阶段不做检查
    pub type_token: TokenWithLocation,
    pub name: String,
    pub initializer: Expr,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Prototype {
    pub name: String,
    pub return_type: TokenWithLocation,
    pub arg_count: usize,
    pub args: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub prototype: Prototype,
    pub body: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub name: String,
    pub value: Expr,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct IfStmt {
    pub condition: Expr,
    pub body: Vec<Stmt>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ReturnStmt {
    pub value: Option<Expr>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Primary(PrimaryExpr),
    Binary(BinaryExpr),
    Comparison(ComparisonExpr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum PrimaryExpr {
    IntLiteral(Literal),
    FloatLiteral(Literal),
    Identifier(Identifier),
    Paren(Box<Expr>),
}

/// 数字字面量，保留源文本
#[derive(Debug, Clone, PartialEq)]
pub struct Literal {
    pub text: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Identifier {
    pub name: String,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ComparisonExpr {
    pub op: ComparisonOp,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub loc: SourceLocation,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

impl Expr {
    pub fn loc(&self) -> SourceLocation {
        match self {
            Expr::Primary(PrimaryExpr::IntLiteral(lit))
            | Expr::Primary(PrimaryExpr::FloatLiteral(lit)) => lit.loc,
            Expr::Primary(PrimaryExpr::Identifier(ident)) => ident.loc,
            Expr::Primary(PrimaryExpr::Paren(inner)) => inner.loc(),
            Expr::Binary(bin) => bin.loc,
            Expr::Comparison(cmp) => cmp.loc,
        }
    }

    /// 是否为字面量零（`0` 或 `0.0`）
    pub fn is_zero_literal(&self) -> bool {
        match self {
            Expr::Primary(PrimaryExpr::IntLiteral(lit)) => {
                lit.text.parse::<i64>().map_or(false, |v| v == 0)
            }
            Expr::Primary(PrimaryExpr::FloatLiteral(lit)) => {
                lit.text.parse::<f64>().map_or(false, |v| v == 0.0)
            }
            Expr::Primary(PrimaryExpr::Paren(inner)) => inner.is_zero_literal(),
            _ => false,
        }
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        };
        f.write_str(op)
    }
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let op = match self {
            ComparisonOp::Eq => "==",
            ComparisonOp::Ne => "!=",
            ComparisonOp::Lt => "<",
            ComparisonOp::Gt => ">",
            ComparisonOp::Le => "<=",
            ComparisonOp::Ge => ">=",
        };
        f.write_str(op)
    }
}

// 完全加括号的形式，便于观察优先级和结合性
impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Primary(PrimaryExpr::IntLiteral(lit))
            | Expr::Primary(PrimaryExpr::FloatLiteral(lit)) => write!(f, "{}", lit.text),
            Expr::Primary(PrimaryExpr::Identifier(ident)) => write!(f, "{}", ident.name),
            Expr::Primary(PrimaryExpr::Paren(inner)) => write!(f, "{}", inner),
            Expr::Binary(bin) => write!(f, "({} {} {})", bin.left, bin.op, bin.right),
            Expr::Comparison(cmp) => write!(f, "({} {} {})", cmp.left, cmp.op, cmp.right),
        }
    }
}

impl Stmt {
    /// 以缩进树形式输出语句（用于 `--ast`）
    pub fn write_tree(&self, out: &mut String, depth: usize) {
        let pad = "  ".repeat(depth);
        match self {
            Stmt::Let(decl) => {
                out.push_str(&format!("{}let {} {} = {}\n", pad, decl.type_token.token, decl.name, decl.initializer));
            }
            Stmt::Assignment(assign) => {
                out.push_str(&format!("{}{} = {}\n", pad, assign.name, assign.value));
            }
            Stmt::Return(ret) => match &ret.value {
                Some(value) => out.push_str(&format!("{}return {}\n", pad, value)),
                None => out.push_str(&format!("{}return\n", pad)),
            },
            Stmt::If(if_stmt) => {
                out.push_str(&format!("{}if {}\n", pad, if_stmt.condition));
                for stmt in &if_stmt.body {
                    stmt.write_tree(out, depth + 1);
                }
            }
            Stmt::Function(func) => {
                let proto = &func.prototype;
                out.push_str(&format!("{}fn {} {} ({} args)\n", pad, proto.return_type.token, proto.name, proto.arg_count));
                for stmt in &func.body {
                    stmt.write_tree(out, depth + 1);
                }
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = String::new();
        for stmt in &self.statements {
            stmt.write_tree(&mut out, 0);
        }
        f.write_str(&out)
    }
}
