//! IR 解释器
//!
//! 直接执行生成的模块，用于 `xdc --run` 和测试中检查生成代码的语义。
//! 栈槽和全局变量未写入前读取视为错误。

use std::collections::HashMap;
use crate::error::{XdError, XdResult};
use super::*;

/// 单次调用最多执行的指令条数
const MAX_STEPS: usize = 1_000_000;

fn eval_error(message: impl Into<String>) -> XdError {
    XdError::Eval(message.into())
}

pub struct Interpreter<'m> {
    module: &'m Module,
    globals: HashMap<String, Constant>,
}

/// 一次调用的活动记录
struct Frame {
    slots: HashMap<String, Option<Constant>>,
    registers: HashMap<String, Constant>,
}

impl Frame {
    fn value(&self, value: &Value) -> XdResult<Constant> {
        match value {
            Value::Const(c) => Ok(*c),
            Value::Register { name, .. } => self.registers.get(name)
                .copied()
                .ok_or_else(|| eval_error(format!("register '%{}' has no value", name))),
            Value::Global(name) => Err(eval_error(format!("'@{}' used as a scalar", name))),
        }
    }
}

impl<'m> Interpreter<'m> {
    pub fn new(module: &'m Module) -> Self {
        let globals = module.globals.iter()
            .map(|g| (g.name.clone(), g.initializer))
            .collect();
        Self { module, globals }
    }

    /// 全局变量的当前值
    pub fn global(&self, name: &str) -> Option<Constant> {
        self.globals.get(name).copied()
    }

    /// 调用无参函数，返回其返回值（void 函数返回 None）
    pub fn call(&mut self, name: &str) -> XdResult<Option<Constant>> {
        let module = self.module;
        let function = module.get_function(name)
            .ok_or_else(|| eval_error(format!("no function named '{}'", name)))?;
        if !function.params.is_empty() {
            return Err(eval_error(format!("function '{}' takes parameters", name)));
        }
        log::debug!("evaluating function '{}'", name);

        let mut frame = Frame {
            slots: HashMap::new(),
            registers: HashMap::new(),
        };
        let mut block = BlockId(0);
        let mut steps = 0;

        loop {
            let current = function.block(block)
                .ok_or_else(|| eval_error(format!("branch to unknown block #{}", block.0)))?;

            let mut next = None;
            for inst in &current.instructions {
                steps += 1;
                if steps > MAX_STEPS {
                    return Err(eval_error(format!("step limit exceeded in '{}'", name)));
                }

                match inst {
                    Instruction::Alloca { dest, .. } => {
                        frame.slots.insert(dest.clone(), None);
                    }
                    Instruction::Load { dest, ptr, .. } => {
                        let value = self.load(&frame, ptr)?;
                        frame.registers.insert(dest.clone(), value);
                    }
                    Instruction::Store { value, ptr } => {
                        let value = frame.value(value)?;
                        self.store(&mut frame, ptr, value)?;
                    }
                    Instruction::Binary { dest, op, lhs, rhs } => {
                        let result = binary(*op, frame.value(lhs)?, frame.value(rhs)?)?;
                        frame.registers.insert(dest.clone(), result);
                    }
                    Instruction::ICmp { dest, pred, lhs, rhs } => {
                        let (a, b) = (as_int(frame.value(lhs)?)?, as_int(frame.value(rhs)?)?);
                        let result = match pred {
                            IntPredicate::Eq => a == b,
                            IntPredicate::Ne => a != b,
                            IntPredicate::Slt => a < b,
                            IntPredicate::Sgt => a > b,
                            IntPredicate::Sle => a <= b,
                            IntPredicate::Sge => a >= b,
                        };
                        frame.registers.insert(dest.clone(), Constant::Bool(result));
                    }
                    Instruction::FCmp { dest, pred, lhs, rhs } => {
                        let (a, b) = (as_float(frame.value(lhs)?)?, as_float(frame.value(rhs)?)?);
                        // 有序比较：任一操作数为 NaN 时结果为假
                        let result = match pred {
                            FloatPredicate::Oeq => a == b,
                            FloatPredicate::One => a < b || a > b,
                            FloatPredicate::Olt => a < b,
                            FloatPredicate::Ogt => a > b,
                            FloatPredicate::Ole => a <= b,
                            FloatPredicate::Oge => a >= b,
                        };
                        frame.registers.insert(dest.clone(), Constant::Bool(result));
                    }
                    Instruction::Br { target } => {
                        next = Some(*target);
                        break;
                    }
                    Instruction::CondBr { cond, then_block, else_block } => {
                        let taken = match frame.value(cond)? {
                            Constant::Bool(b) => b,
                            other => return Err(eval_error(format!("branch on non-boolean {}", other))),
                        };
                        next = Some(if taken { *then_block } else { *else_block });
                        break;
                    }
                    Instruction::Ret { value } => {
                        return value.as_ref().map(|v| frame.value(v)).transpose();
                    }
                }
            }

            block = next.ok_or_else(|| {
                eval_error(format!("block '{}' fell through without a terminator", current.label))
            })?;
        }
    }

    fn load(&self, frame: &Frame, ptr: &Value) -> XdResult<Constant> {
        match ptr {
            Value::Register { name, .. } => match frame.slots.get(name) {
                Some(Some(value)) => Ok(*value),
                Some(None) => Err(eval_error(format!("load from uninitialized slot '%{}'", name))),
                None => Err(eval_error(format!("'%{}' is not a stack slot", name))),
            },
            Value::Global(name) => self.global(name)
                .ok_or_else(|| eval_error(format!("no global named '@{}'", name))),
            Value::Const(c) => Err(eval_error(format!("load from constant {}", c))),
        }
    }

    fn store(&mut self, frame: &mut Frame, ptr: &Value, value: Constant) -> XdResult<()> {
        match ptr {
            Value::Register { name, .. } => match frame.slots.get_mut(name) {
                Some(slot) => {
                    *slot = Some(value);
                    Ok(())
                }
                None => Err(eval_error(format!("'%{}' is not a stack slot", name))),
            },
            Value::Global(name) => match self.globals.get_mut(name) {
                Some(slot) => {
                    *slot = value;
                    Ok(())
                }
                None => Err(eval_error(format!("no global named '@{}'", name))),
            },
            Value::Const(c) => Err(eval_error(format!("store to constant {}", c))),
        }
    }
}

fn as_int(value: Constant) -> XdResult<i32> {
    match value {
        Constant::Int(n) => Ok(n),
        Constant::Bool(b) => Ok(b as i32),
        Constant::Float(_) => Err(eval_error("expected integer operand, found float")),
    }
}

fn as_float(value: Constant) -> XdResult<f32> {
    match value {
        Constant::Float(v) => Ok(v),
        other => Err(eval_error(format!("expected float operand, found {}", other.ty()))),
    }
}

fn binary(op: BinaryOpcode, lhs: Constant, rhs: Constant) -> XdResult<Constant> {
    if op.is_float() {
        let (a, b) = (as_float(lhs)?, as_float(rhs)?);
        let result = match op {
            BinaryOpcode::FAdd => a + b,
            BinaryOpcode::FSub => a - b,
            BinaryOpcode::FMul => a * b,
            _ => a / b,
        };
        return Ok(Constant::Float(result));
    }

    let (a, b) = (as_int(lhs)?, as_int(rhs)?);
    let result = match op {
        BinaryOpcode::Add => a.wrapping_add(b),
        BinaryOpcode::Sub => a.wrapping_sub(b),
        BinaryOpcode::Mul => a.wrapping_mul(b),
        _ => {
            if b == 0 {
                return Err(eval_error("integer division by zero"));
            }
            a.wrapping_div(b)
        }
    };
    Ok(Constant::Int(result))
}

/// 在全新的全局状态上调用模块中的函数
pub fn run_function(module: &Module, name: &str) -> XdResult<Option<Constant>> {
    Interpreter::new(module).call(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn int(n: i32) -> Value {
        Value::Const(Constant::Int(n))
    }

    #[test]
    fn test_arithmetic_and_locals() {
        let mut module = Module::new("m");
        let mut builder = FunctionBuilder::new("main", IrType::I32, Vec::new());
        let slot = builder.build_entry_alloca(IrType::I32, "x");
        let product = builder.build_binary(BinaryOpcode::Mul, int(6), int(7));
        builder.build_store(product, slot.clone());
        let loaded = builder.build_load(IrType::I32, slot);
        let result = builder.build_binary(BinaryOpcode::SDiv, loaded, int(2));
        builder.build_return(Some(result));
        module.add_function(builder.finish());

        assert_eq!(run_function(&module, "main").unwrap(), Some(Constant::Int(21)));
    }

    #[test]
    fn test_branches_and_globals() {
        let mut module = Module::new("m");
        module.add_global(GlobalVariable {
            name: "g".to_string(),
            ty: IrType::I32,
            initializer: Constant::Int(0),
            is_constant: false,
        });

        let mut builder = FunctionBuilder::new("set", IrType::Void, Vec::new());
        let cond = builder.build_fcmp(
            FloatPredicate::Olt,
            Value::Const(Constant::Float(1.0)),
            Value::Const(Constant::Float(2.0)),
        );
        let then_block = builder.append_block("if.then");
        let cont = builder.append_block("if.cont");
        builder.build_cond_br(cond, then_block, cont);
        builder.position_at_end(then_block);
        builder.build_store(int(9), Value::Global("g".to_string()));
        builder.build_br(cont);
        builder.position_at_end(cont);
        builder.build_return(None);
        module.add_function(builder.finish());

        let mut interpreter = Interpreter::new(&module);
        assert_eq!(interpreter.call("set").unwrap(), None);
        assert_eq!(interpreter.global("g"), Some(Constant::Int(9)));
    }

    #[test]
    fn test_uninitialized_load() {
        let mut module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        let slot = builder.build_entry_alloca(IrType::I32, "x");
        let loaded = builder.build_load(IrType::I32, slot);
        builder.build_return(Some(loaded));
        module.add_function(builder.finish());

        let err = run_function(&module, "f").unwrap_err();
        assert_eq!(err, XdError::Eval("load from uninitialized slot '%x'".to_string()));
    }

    #[test]
    fn test_division_by_zero() {
        let mut module = Module::new("m");
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        let result = builder.build_binary(BinaryOpcode::SDiv, int(1), int(0));
        builder.build_return(Some(result));
        module.add_function(builder.finish());

        let err = run_function(&module, "f").unwrap_err();
        assert_eq!(err, XdError::Eval("integer division by zero".to_string()));
    }

    #[test]
    fn test_infinite_loop_hits_step_limit() {
        let mut module = Module::new("m");
        let mut builder = FunctionBuilder::new("spin", IrType::Void, Vec::new());
        let body = builder.append_block("loop");
        builder.build_br(body);
        builder.position_at_end(body);
        builder.build_br(body);
        module.add_function(builder.finish());

        let err = run_function(&module, "spin").unwrap_err();
        assert!(err.to_string().contains("step limit exceeded"));
    }
}
