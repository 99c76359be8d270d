use thiserror::Error;
use std::fmt;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum XdError {
    #[error("Lexer error at line {line}, column {column}: {message}")]
    Lexer { line: usize, column: usize, message: String },

    #[error("Parser error at line {line}, column {column}: {message}")]
    Parser { line: usize, column: usize, message: String },

    #[error("Code generation error at line {line}, column {column}: {message}")]
    CodeGen { line: usize, column: usize, message: String },

    #[error("Undefined variable '{name}' at line {line}, column {column}")]
    UndefinedVariable { name: String, line: usize, column: usize },

    #[error("Verification failed for function '{function}': {message}")]
    Verify { function: String, message: String },

    #[error("Compilation failed with {} error(s)", error_count(.0))]
    Diagnostics(Vec<Diagnostic>),

    #[error("Evaluation error: {0}")]
    Eval(String),

    #[error("IO error: {0}")]
    Io(String),
}

impl XdError {
    /// 致命错误会中止整个编译；其余错误只跳过所在的语句或函数
    pub fn is_fatal(&self) -> bool {
        !matches!(self, XdError::CodeGen { .. })
    }
}

pub type XdResult<T> = Result<T, XdError>;

fn error_count(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

impl SourceLocation {
    pub fn new(line: usize, column: usize) -> Self {
        Self { line, column }
    }
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

/// 代码生成阶段收集的诊断信息
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Error,
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl From<XdError> for Diagnostic {
    fn from(err: XdError) -> Self {
        Diagnostic::error(err.to_string())
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.severity {
            Severity::Warning => write!(f, "warning: {}", self.message),
            Severity::Error => write!(f, "error: {}", self.message),
        }
    }
}

pub fn lexer_error(loc: SourceLocation, message: impl Into<String>) -> XdError {
    XdError::Lexer {
        line: loc.line,
        column: loc.column,
        message: message.into(),
    }
}

pub fn parser_error(loc: SourceLocation, message: impl Into<String>) -> XdError {
    XdError::Parser {
        line: loc.line,
        column: loc.column,
        message: message.into(),
    }
}

pub fn codegen_error(loc: SourceLocation, message: impl Into<String>) -> XdError {
    XdError::CodeGen {
        line: loc.line,
        column: loc.column,
        message: message.into(),
    }
}
