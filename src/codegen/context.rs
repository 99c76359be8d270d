//! IR生成上下文和状态管理
use std::collections::HashMap;
use crate::error::{Diagnostic, SourceLocation, XdError, XdResult, codegen_error};
use crate::ir::{FunctionBuilder, IrType, Module, Value};

/// 代码生成选项
#[derive(Debug, Clone, PartialEq)]
pub struct CodegenOptions {
    pub module_name: String,
    pub target_triple: Option<String>,
}

impl Default for CodegenOptions {
    fn default() -> Self {
        Self {
            module_name: "XD Compiler".to_string(),
            target_triple: None,
        }
    }
}

/// 变量存储位置：栈槽或全局变量的地址及其声明类型
#[derive(Debug, Clone, PartialEq)]
pub struct VarSlot {
    pub ptr: Value,
    pub ty: IrType,
}

/// 生成结果：模块和收集到的诊断信息
#[derive(Debug)]
pub struct Lowered {
    pub module: Module,
    pub diagnostics: Vec<Diagnostic>,
}

impl Lowered {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.iter().any(|d| d.is_error())
    }
}

/// IR生成器核心上下文
///
/// 每次编译新建一个，`generate` 消耗它并返回模块。
pub struct IRGenerator {
    pub module: Module,
    pub globals: HashMap<String, VarSlot>,
    pub locals: HashMap<String, VarSlot>,
    /// 当前正在生成的函数；None 表示处于全局作用域
    pub current_function: Option<FunctionBuilder>,
    pub diagnostics: Vec<Diagnostic>,
}

impl IRGenerator {
    pub fn new() -> Self {
        Self::with_options(CodegenOptions::default())
    }

    pub fn with_options(options: CodegenOptions) -> Self {
        let mut module = Module::new(options.module_name);
        module.target_triple = options.target_triple;
        Self {
            module,
            globals: HashMap::new(),
            locals: HashMap::new(),
            current_function: None,
            diagnostics: Vec::new(),
        }
    }

    pub fn in_function(&self) -> bool {
        self.current_function.is_some()
    }

    /// 记录非致命错误
    pub fn report(&mut self, err: XdError) {
        log::debug!("{}", err);
        self.diagnostics.push(Diagnostic::from(err));
    }

    pub fn warn(&mut self, loc: SourceLocation, message: impl Into<String>) {
        let message = format!("line {}, column {}: {}", loc.line, loc.column, message.into());
        log::warn!("{}", message);
        self.diagnostics.push(Diagnostic::warning(message));
    }

    /// 当前函数的构建器
    pub fn builder(&mut self, loc: SourceLocation, what: &str) -> XdResult<&mut FunctionBuilder> {
        self.current_function
            .as_mut()
            .ok_or_else(|| codegen_error(loc, format!("{} outside of a function", what)))
    }

    /// 先查局部变量，再查全局变量
    pub fn lookup(&self, name: &str) -> Option<&VarSlot> {
        self.locals.get(name).or_else(|| self.globals.get(name))
    }
}

impl Default for IRGenerator {
    fn default() -> Self {
        Self::new()
    }
}
