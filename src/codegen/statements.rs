//! 语句代码生成（包含控制流结构）
use crate::codegen::context::IRGenerator;
use crate::ast::*;
use crate::error::{XdError, XdResult, codegen_error};
use crate::ir::IrType;

mod let_decl;
mod function;

impl IRGenerator {
    /// 生成语句块代码
    pub fn generate_block(&mut self, statements: &[Stmt]) -> XdResult<()> {
        for stmt in statements {
            self.generate_statement(stmt)?;
        }
        Ok(())
    }

    /// 生成单个语句代码
    ///
    /// 非致命错误在这里记录下来，只跳过当前语句；致命错误继续向上传播。
    pub fn generate_statement(&mut self, stmt: &Stmt) -> XdResult<()> {
        self.ensure_insertion_block();

        let result = match stmt {
            Stmt::Let(decl) => self.generate_let(decl),
            Stmt::Function(func) => self.generate_function(func),
            Stmt::Assignment(assign) => self.generate_assignment(assign),
            Stmt::If(if_stmt) => self.generate_if(if_stmt),
            Stmt::Return(ret) => self.generate_return(ret),
        };

        match result {
            Err(err) if !err.is_fatal() => {
                self.report(err);
                Ok(())
            }
            other => other,
        }
    }

    /// 终结指令之后的语句放入新的不可达块，保证每个块只有一条终结指令
    fn ensure_insertion_block(&mut self) {
        if let Some(builder) = self.current_function.as_mut() {
            if builder.is_terminated() {
                let block = builder.append_block("unreachable");
                builder.position_at_end(block);
            }
        }
    }

    /// 赋值只作用于当前函数的局部变量
    fn generate_assignment(&mut self, assign: &Assignment) -> XdResult<()> {
        if !self.in_function() {
            self.warn(assign.loc, format!(
                "assignment to '{}' at global scope has no effect", assign.name
            ));
            return Ok(());
        }

        let slot = self.locals.get(&assign.name).cloned().ok_or_else(|| {
            XdError::UndefinedVariable {
                name: assign.name.clone(),
                line: assign.loc.line,
                column: assign.loc.column,
            }
        })?;

        let value = self.generate_expression(&assign.value)?;
        if value.ty() != slot.ty {
            return Err(codegen_error(assign.loc, format!(
                "cannot assign a value of type {} to '{}' of type {}", value.ty(), assign.name, slot.ty
            )));
        }

        self.builder(assign.loc, "assignment")?.build_store(value, slot.ptr);
        Ok(())
    }

    /// if 语句：条件为真时进入 then 块，两条路径在 cont 块汇合
    fn generate_if(&mut self, if_stmt: &IfStmt) -> XdResult<()> {
        self.builder(if_stmt.loc, "if statement")?;

        let cond = self.generate_expression(&if_stmt.condition)?;
        let cond = self.to_condition(cond, if_stmt.condition.loc())?;

        let builder = self.builder(if_stmt.loc, "if statement")?;
        let then_block = builder.append_block("if.then");
        let cont_block = builder.append_block("if.cont");
        builder.build_cond_br(cond, then_block, cont_block);
        builder.position_at_end(then_block);

        self.generate_block(&if_stmt.body)?;

        let builder = self.builder(if_stmt.loc, "if statement")?;
        if !builder.is_terminated() {
            builder.build_br(cont_block);
        }
        builder.position_at_end(cont_block);
        Ok(())
    }

    fn generate_return(&mut self, ret: &ReturnStmt) -> XdResult<()> {
        let builder = self.builder(ret.loc, "return statement")?;
        let name = builder.name().to_string();
        let return_type = builder.return_type();

        match &ret.value {
            None if return_type == IrType::Void => {
                self.builder(ret.loc, "return statement")?.build_return(None);
                Ok(())
            }
            None => Err(codegen_error(ret.loc, format!(
                "function '{}' must return a value of type {}", name, return_type
            ))),
            Some(_) if return_type == IrType::Void => Err(codegen_error(ret.loc, format!(
                "void function '{}' cannot return a value", name
            ))),
            Some(expr) => {
                let value = self.generate_expression(expr)?;
                if value.ty() != return_type {
                    return Err(codegen_error(ret.loc, format!(
                        "function '{}' returns {}, found {}", name, return_type, value.ty()
                    )));
                }
                self.builder(ret.loc, "return statement")?.build_return(Some(value));
                Ok(())
            }
        }
    }
}
