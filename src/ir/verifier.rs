//! 结构校验器
//!
//! 检查每个基本块恰有一条位于末尾的终结指令、跳转目标存在、
//! 操作数类型与指令匹配、栈槽只在 entry 块中分配、寄存器先定义后使用。

use std::collections::HashMap;
use crate::error::{XdError, XdResult};
use super::*;

fn fail(function: &Function, message: impl Into<String>) -> XdError {
    XdError::Verify {
        function: function.name.clone(),
        message: message.into(),
    }
}

/// 校验单个函数
pub fn verify_function(module: &Module, function: &Function) -> XdResult<()> {
    if function.blocks.is_empty() {
        return Err(fail(function, "function has no basic blocks"));
    }

    // 收集寄存器定义和栈槽类型
    let mut registers: HashMap<&str, IrType> = HashMap::new();
    let mut slots: HashMap<&str, IrType> = HashMap::new();
    for block in &function.blocks {
        for inst in &block.instructions {
            let Some(dest) = inst.dest() else { continue };
            let ty = match inst {
                Instruction::Alloca { ty, .. } => {
                    slots.insert(dest, *ty);
                    IrType::Ptr
                }
                Instruction::Load { ty, .. } => *ty,
                Instruction::Binary { lhs, .. } => lhs.ty(),
                _ => IrType::I1,
            };
            if registers.insert(dest, ty).is_some() {
                return Err(fail(function, format!("register '%{}' is defined more than once", dest)));
            }
        }
    }

    let check_value = |value: &Value| -> XdResult<()> {
        match value {
            Value::Register { name, ty } => match registers.get(name.as_str()) {
                Some(defined) if defined == ty => Ok(()),
                Some(defined) => Err(fail(function, format!(
                    "register '%{}' used as {} but defined as {}", name, ty, defined
                ))),
                None => Err(fail(function, format!("use of undefined register '%{}'", name))),
            },
            Value::Global(name) if module.get_global(name).is_none() => {
                Err(fail(function, format!("use of undefined global '@{}'", name)))
            }
            _ => Ok(()),
        }
    };

    // 指针指向的栈槽或全局变量的类型
    let slot_type = |ptr: &Value| -> Option<IrType> {
        match ptr {
            Value::Register { name, .. } => slots.get(name.as_str()).copied(),
            Value::Global(name) => module.get_global(name).map(|g| g.ty),
            Value::Const(_) => None,
        }
    };

    let check_target = |target: &BlockId| -> XdResult<()> {
        if function.block(*target).is_none() {
            return Err(fail(function, format!("branch to unknown block #{}", target.0)));
        }
        Ok(())
    };

    for (index, block) in function.blocks.iter().enumerate() {
        let Some(last) = block.instructions.last() else {
            return Err(fail(function, format!("block '{}' is empty", block.label)));
        };
        if !last.is_terminator() {
            return Err(fail(function, format!("block '{}' does not end with a terminator", block.label)));
        }

        for (pos, inst) in block.instructions.iter().enumerate() {
            if inst.is_terminator() && pos + 1 != block.instructions.len() {
                return Err(fail(function, format!("terminator in the middle of block '{}'", block.label)));
            }
            for operand in inst.operands() {
                check_value(operand)?;
            }

            match inst {
                Instruction::Alloca { ty, dest } => {
                    if index != 0 {
                        return Err(fail(function, format!("alloca '%{}' outside the entry block", dest)));
                    }
                    if *ty == IrType::Void {
                        return Err(fail(function, format!("alloca '%{}' of void type", dest)));
                    }
                }
                Instruction::Load { ty, ptr, dest } => {
                    if ptr.ty() != IrType::Ptr {
                        return Err(fail(function, format!("load '%{}' from non-pointer", dest)));
                    }
                    if let Some(slot) = slot_type(ptr) {
                        if slot != *ty {
                            return Err(fail(function, format!("load '%{}' of {} from slot of {}", dest, ty, slot)));
                        }
                    }
                }
                Instruction::Store { value, ptr } => {
                    if ptr.ty() != IrType::Ptr {
                        return Err(fail(function, "store to non-pointer"));
                    }
                    if let Some(slot) = slot_type(ptr) {
                        if slot != value.ty() {
                            return Err(fail(function, format!("store of {} into slot {} of {}", value.ty(), ptr, slot)));
                        }
                    }
                }
                Instruction::Binary { op, lhs, rhs, dest } => {
                    if lhs.ty() != rhs.ty() {
                        return Err(fail(function, format!("operand types of '%{}' differ: {} and {}", dest, lhs.ty(), rhs.ty())));
                    }
                    let ok = if op.is_float() { lhs.ty().is_float() } else { lhs.ty() == IrType::I32 };
                    if !ok {
                        return Err(fail(function, format!("'{}' does not accept {} operands", op.name(), lhs.ty())));
                    }
                }
                Instruction::ICmp { lhs, rhs, dest, .. } => {
                    if lhs.ty() != rhs.ty() || !lhs.ty().is_integer() {
                        return Err(fail(function, format!("icmp '%{}' needs matching integer operands", dest)));
                    }
                }
                Instruction::FCmp { lhs, rhs, dest, .. } => {
                    if lhs.ty() != rhs.ty() || !lhs.ty().is_float() {
                        return Err(fail(function, format!("fcmp '%{}' needs matching float operands", dest)));
                    }
                }
                Instruction::Br { target } => check_target(target)?,
                Instruction::CondBr { cond, then_block, else_block } => {
                    if cond.ty() != IrType::I1 {
                        return Err(fail(function, format!("branch condition has type {}", cond.ty())));
                    }
                    check_target(then_block)?;
                    check_target(else_block)?;
                }
                Instruction::Ret { value } => {
                    let ty = value.as_ref().map_or(IrType::Void, |v| v.ty());
                    if ty != function.return_type {
                        return Err(fail(function, format!(
                            "return of {} in function returning {}", ty, function.return_type
                        )));
                    }
                }
            }
        }
    }

    Ok(())
}

/// 校验整个模块
pub fn verify_module(module: &Module) -> XdResult<()> {
    for function in &module.functions {
        verify_function(module, function)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i32) -> Value {
        Value::Const(Constant::Int(n))
    }

    fn message(result: XdResult<()>) -> String {
        match result {
            Err(XdError::Verify { message, .. }) => message,
            other => panic!("expected verify error, got {:?}", other),
        }
    }

    #[test]
    fn test_well_formed_function() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        let slot = builder.build_entry_alloca(IrType::I32, "x");
        builder.build_store(int(3), slot.clone());
        let value = builder.build_load(IrType::I32, slot);
        let cond = builder.build_icmp(IntPredicate::Sgt, value.clone(), int(0));
        let then_block = builder.append_block("then");
        let cont = builder.append_block("cont");
        builder.build_cond_br(cond, then_block, cont);
        builder.position_at_end(then_block);
        builder.build_br(cont);
        builder.position_at_end(cont);
        builder.build_return(Some(value));
        assert!(verify_function(&module, &builder.finish()).is_ok());
    }

    #[test]
    fn test_missing_terminator() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::Void, Vec::new());
        builder.build_entry_alloca(IrType::I32, "x");
        let msg = message(verify_function(&module, &builder.finish()));
        assert!(msg.contains("does not end with a terminator"), "{}", msg);
    }

    #[test]
    fn test_return_type_mismatch() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        builder.build_return(None);
        let msg = message(verify_function(&module, &builder.finish()));
        assert_eq!(msg, "return of void in function returning i32");
    }

    #[test]
    fn test_store_type_mismatch() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::Void, Vec::new());
        let slot = builder.build_entry_alloca(IrType::I32, "x");
        builder.build_store(Value::Const(Constant::Float(1.0)), slot);
        builder.build_return(None);
        let msg = message(verify_function(&module, &builder.finish()));
        assert!(msg.contains("store of float"), "{}", msg);
    }

    #[test]
    fn test_mixed_binary_operands() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::Void, Vec::new());
        builder.build_binary(BinaryOpcode::Add, int(1), Value::Const(Constant::Float(1.0)));
        builder.build_return(None);
        let msg = message(verify_function(&module, &builder.finish()));
        assert!(msg.contains("differ"), "{}", msg);
    }

    #[test]
    fn test_unknown_global() {
        let module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        let value = builder.build_load(IrType::I32, Value::Global("g".to_string()));
        builder.build_return(Some(value));
        let msg = message(verify_function(&module, &builder.finish()));
        assert_eq!(msg, "use of undefined global '@g'");
    }
}
