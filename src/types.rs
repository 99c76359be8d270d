use std::fmt;
use crate::lexer::Token;

/// 源语言中可声明的类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Void,
    Int,
    Float,
    Char,
}

impl Type {
    /// 由类型关键字得到类型，其他令牌返回 None
    pub fn from_token(token: &Token) -> Option<Type> {
        match token {
            Token::Int => Some(Type::Int),
            Token::Float => Some(Type::Float),
            Token::Char => Some(Type::Char),
            Token::Void => Some(Type::Void),
            _ => None,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Void => write!(f, "void"),
            Type::Int => write!(f, "int"),
            Type::Float => write!(f, "float"),
            Type::Char => write!(f, "char"),
        }
    }
}
