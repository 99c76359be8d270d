pub mod error;
pub mod types;
pub mod ast;
pub mod lexer;
pub mod parser;
pub mod ir;
pub mod codegen;

use codegen::{CodegenOptions, IRGenerator};
use error::{Diagnostic, XdError, XdResult};

/// 一次成功编译的结果：模块和警告
#[derive(Debug)]
pub struct Compilation {
    pub module: ir::Module,
    pub warnings: Vec<Diagnostic>,
}

pub struct Compiler {
    options: CodegenOptions,
}

impl Compiler {
    pub fn new() -> Self {
        Self::with_options(CodegenOptions::default())
    }

    pub fn with_options(options: CodegenOptions) -> Self {
        Self { options }
    }

    /// 编译源码得到模块
    ///
    /// 代码生成阶段收集到任何错误时返回 `XdError::Diagnostics`，其中包含全部诊断信息。
    pub fn compile_module(&self, source: &str) -> XdResult<Compilation> {
        // 1. 词法分析
        let tokens = lexer::lex(source)?;

        // 2. 语法分析
        let ast = parser::parse(tokens)?;
        log::debug!("parsed {} top-level statement(s)", ast.statements.len());

        // 3. 代码生成，每次编译使用全新的上下文
        let lowered = IRGenerator::with_options(self.options.clone()).generate(&ast)?;

        if lowered.has_errors() {
            return Err(XdError::Diagnostics(lowered.diagnostics));
        }

        Ok(Compilation {
            module: lowered.module,
            warnings: lowered.diagnostics,
        })
    }

    /// 编译源码并返回文本形式的 IR
    pub fn compile(&self, source: &str) -> XdResult<String> {
        Ok(self.compile_module(source)?.module.to_string())
    }
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_to_text() {
        let ir = Compiler::new().compile("fn int main() { let int x = 5; return x; }").unwrap();
        assert!(ir.starts_with("; ModuleID = 'XD Compiler'\n"));
        assert!(ir.contains("define i32 @main() {"));
        assert!(ir.contains("%x = alloca i32"));
        assert!(ir.contains("store i32 5, ptr %x"));
        assert!(!ir.contains("target triple"));
    }

    #[test]
    fn test_target_triple_option() {
        let compiler = Compiler::with_options(CodegenOptions {
            module_name: "demo".to_string(),
            target_triple: Some("x86_64-unknown-linux-gnu".to_string()),
        });
        let ir = compiler.compile("let int x = 0;").unwrap();
        assert!(ir.starts_with("; ModuleID = 'demo'\n"));
        assert!(ir.contains("target triple = \"x86_64-unknown-linux-gnu\""));
    }

    #[test]
    fn test_missing_semicolon_fails() {
        let err = Compiler::new().compile("fn void f() { let int x = 1 }").unwrap_err();
        match err {
            XdError::Parser { message, .. } => assert_eq!(message, "expected ';', found '}'"),
            other => panic!("expected parser error, got {:?}", other),
        }
    }

    #[test]
    fn test_collected_errors_fail_the_run() {
        let err = Compiler::new()
            .compile("let char c = 1;\nfn int main() { return z; }")
            .unwrap_err();
        match &err {
            XdError::Diagnostics(diagnostics) => assert_eq!(diagnostics.len(), 2),
            other => panic!("expected diagnostics, got {:?}", other),
        }
        assert_eq!(err.to_string(), "Compilation failed with 2 error(s)");
    }

    #[test]
    fn test_warnings_do_not_fail_the_run() {
        let compilation = Compiler::new().compile_module("let int g = 3;").unwrap();
        assert_eq!(compilation.warnings.len(), 1);
        assert_eq!(compilation.module.globals[0].name, "g");
    }
}
