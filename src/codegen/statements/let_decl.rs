//! 变量声明代码生成
//!
//! 全局作用域的声明生成零初始化的全局变量，函数内的声明在 entry 块分配栈槽。

use crate::codegen::context::{IRGenerator, VarSlot};
use crate::ast::*;
use crate::error::{XdResult, codegen_error};
use crate::ir::{Constant, GlobalVariable, IrType, Value};

impl IRGenerator {
    /// 生成变量声明代码
    pub fn generate_let(&mut self, decl: &LetDecl) -> XdResult<()> {
        let ty = self.resolve_type(&decl.type_token)?;
        if ty == IrType::Void {
            return Err(codegen_error(decl.loc, format!(
                "variable '{}' cannot have type void", decl.name
            )));
        }

        if self.in_function() {
            self.generate_local_let(decl, ty)
        } else {
            self.generate_global_let(decl, ty)
        }
    }

    fn generate_global_let(&mut self, decl: &LetDecl, ty: IrType) -> XdResult<()> {
        if self.module.get_global(&decl.name).is_some() || self.module.get_function(&decl.name).is_some() {
            return Err(codegen_error(decl.loc, format!("'{}' is already defined", decl.name)));
        }
        let initializer = Constant::zero(ty).ok_or_else(|| {
            codegen_error(decl.loc, format!("global '{}' of type {} has no zero value", decl.name, ty))
        })?;

        // 全局变量的初始化表达式不求值，始终以零初始化
        if !decl.initializer.is_zero_literal() {
            self.warn(decl.initializer.loc(), format!(
                "initializer of global '{}' is not evaluated; it starts as zero", decl.name
            ));
        }

        self.module.add_global(GlobalVariable {
            name: decl.name.clone(),
            ty,
            initializer,
            is_constant: false,
        });
        self.globals.insert(decl.name.clone(), VarSlot {
            ptr: Value::Global(decl.name.clone()),
            ty,
        });
        log::debug!("lowered global '{}' of type {}", decl.name, ty);
        Ok(())
    }

    fn generate_local_let(&mut self, decl: &LetDecl, ty: IrType) -> XdResult<()> {
        let ptr = self.builder(decl.loc, "local variable")?.build_entry_alloca(ty, &decl.name);

        // 先求值再登记，`let int x = x;` 读到的是之前的绑定
        let init = self.generate_expression(&decl.initializer).and_then(|value| {
            if value.ty() == ty {
                Ok(value)
            } else {
                Err(codegen_error(decl.initializer.loc(), format!(
                    "cannot initialize '{}' of type {} with a value of type {}", decl.name, ty, value.ty()
                )))
            }
        });

        // 同名变量直接覆盖旧的绑定
        self.locals.insert(decl.name.clone(), VarSlot { ptr: ptr.clone(), ty });

        let value = init?;
        self.builder(decl.loc, "local variable")?.build_store(value, ptr);
        Ok(())
    }
}
