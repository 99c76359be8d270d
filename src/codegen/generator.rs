//! XD IR 代码生成器主模块
//!
//! 按源码顺序逐条生成顶层语句；函数外的 `let` 生成全局变量。

use crate::codegen::context::{IRGenerator, Lowered};
use crate::ast::*;
use crate::error::XdResult;

impl IRGenerator {
    /// 主入口：生成程序的模块
    ///
    /// 非致命错误记录在 `Lowered::diagnostics` 中，由调用方决定是否失败。
    pub fn generate(mut self, program: &Program) -> XdResult<Lowered> {
        for stmt in &program.statements {
            self.generate_statement(stmt)?;
        }

        log::debug!(
            "generated {} global(s) and {} function(s) with {} diagnostic(s)",
            self.module.globals.len(),
            self.module.functions.len(),
            self.diagnostics.len()
        );

        Ok(Lowered {
            module: self.module,
            diagnostics: self.diagnostics,
        })
    }
}
