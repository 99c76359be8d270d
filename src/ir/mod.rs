//! 后端代码对象模型
//!
//! 模块、函数、基本块和指令，序列化为 LLVM 文本 IR。
//! 生成器只通过 `FunctionBuilder` 创建指令，完成后交给 `verifier` 检查。

pub mod builder;
pub mod verifier;
pub mod eval;

use std::fmt;

pub use builder::FunctionBuilder;
pub use verifier::{verify_function, verify_module};

/// 后端标量类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IrType {
    Void,
    I1,
    I32,
    F32,
    Ptr,
}

impl IrType {
    pub fn is_integer(&self) -> bool {
        matches!(self, IrType::I1 | IrType::I32)
    }

    pub fn is_float(&self) -> bool {
        *self == IrType::F32
    }
}

impl fmt::Display for IrType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            IrType::Void => "void",
            IrType::I1 => "i1",
            IrType::I32 => "i32",
            IrType::F32 => "float",
            IrType::Ptr => "ptr",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Constant {
    Bool(bool),
    Int(i32),
    Float(f32),
}

impl Constant {
    pub fn ty(&self) -> IrType {
        match self {
            Constant::Bool(_) => IrType::I1,
            Constant::Int(_) => IrType::I32,
            Constant::Float(_) => IrType::F32,
        }
    }

    /// 类型的零值；void 和指针没有零值常量
    pub fn zero(ty: IrType) -> Option<Constant> {
        match ty {
            IrType::I1 => Some(Constant::Bool(false)),
            IrType::I32 => Some(Constant::Int(0)),
            IrType::F32 => Some(Constant::Float(0.0)),
            IrType::Void | IrType::Ptr => None,
        }
    }
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Bool(b) => write!(f, "{}", b),
            Constant::Int(n) => write!(f, "{}", n),
            // LLVM 要求 float 常量使用可精确表示的十六进制 double 形式
            Constant::Float(v) => write!(f, "0x{:016X}", (*v as f64).to_bits()),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Const(Constant),
    Register { name: String, ty: IrType },
    Global(String),
}

impl Value {
    pub fn ty(&self) -> IrType {
        match self {
            Value::Const(c) => c.ty(),
            Value::Register { ty, .. } => *ty,
            Value::Global(_) => IrType::Ptr,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Const(c) => write!(f, "{}", c),
            Value::Register { name, .. } => write!(f, "%{}", name),
            Value::Global(name) => write!(f, "@{}", name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOpcode {
    Add,
    Sub,
    Mul,
    SDiv,
    FAdd,
    FSub,
    FMul,
    FDiv,
}

impl BinaryOpcode {
    pub fn is_float(&self) -> bool {
        matches!(self, BinaryOpcode::FAdd | BinaryOpcode::FSub | BinaryOpcode::FMul | BinaryOpcode::FDiv)
    }

    pub fn name(&self) -> &'static str {
        match self {
            BinaryOpcode::Add => "add",
            BinaryOpcode::Sub => "sub",
            BinaryOpcode::Mul => "mul",
            BinaryOpcode::SDiv => "sdiv",
            BinaryOpcode::FAdd => "fadd",
            BinaryOpcode::FSub => "fsub",
            BinaryOpcode::FMul => "fmul",
            BinaryOpcode::FDiv => "fdiv",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IntPredicate {
    Eq,
    Ne,
    Slt,
    Sgt,
    Sle,
    Sge,
}

impl IntPredicate {
    pub fn name(&self) -> &'static str {
        match self {
            IntPredicate::Eq => "eq",
            IntPredicate::Ne => "ne",
            IntPredicate::Slt => "slt",
            IntPredicate::Sgt => "sgt",
            IntPredicate::Sle => "sle",
            IntPredicate::Sge => "sge",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloatPredicate {
    Oeq,
    One,
    Olt,
    Ogt,
    Ole,
    Oge,
}

impl FloatPredicate {
    pub fn name(&self) -> &'static str {
        match self {
            FloatPredicate::Oeq => "oeq",
            FloatPredicate::One => "one",
            FloatPredicate::Olt => "olt",
            FloatPredicate::Ogt => "ogt",
            FloatPredicate::Ole => "ole",
            FloatPredicate::Oge => "oge",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Alloca { dest: String, ty: IrType },
    Load { dest: String, ty: IrType, ptr: Value },
    Store { value: Value, ptr: Value },
    Binary { dest: String, op: BinaryOpcode, lhs: Value, rhs: Value },
    ICmp { dest: String, pred: IntPredicate, lhs: Value, rhs: Value },
    FCmp { dest: String, pred: FloatPredicate, lhs: Value, rhs: Value },
    Br { target: BlockId },
    CondBr { cond: Value, then_block: BlockId, else_block: BlockId },
    Ret { value: Option<Value> },
}

impl Instruction {
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Br { .. } | Instruction::CondBr { .. } | Instruction::Ret { .. })
    }

    /// 指令定义的寄存器名
    pub fn dest(&self) -> Option<&str> {
        match self {
            Instruction::Alloca { dest, .. }
            | Instruction::Load { dest, .. }
            | Instruction::Binary { dest, .. }
            | Instruction::ICmp { dest, .. }
            | Instruction::FCmp { dest, .. } => Some(dest.as_str()),
            _ => None,
        }
    }

    /// 指令使用的操作数
    pub fn operands(&self) -> Vec<&Value> {
        match self {
            Instruction::Alloca { .. } | Instruction::Br { .. } => vec![],
            Instruction::Load { ptr, .. } => vec![ptr],
            Instruction::Store { value, ptr } => vec![value, ptr],
            Instruction::Binary { lhs, rhs, .. }
            | Instruction::ICmp { lhs, rhs, .. }
            | Instruction::FCmp { lhs, rhs, .. } => vec![lhs, rhs],
            Instruction::CondBr { cond, .. } => vec![cond],
            Instruction::Ret { value } => value.iter().collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instruction>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            instructions: Vec::new(),
        }
    }

    pub fn terminator(&self) -> Option<&Instruction> {
        self.instructions.last().filter(|inst| inst.is_terminator())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: String,
    pub return_type: IrType,
    pub params: Vec<IrType>,
    pub blocks: Vec<BasicBlock>,
}

impl Function {
    pub fn block(&self, id: BlockId) -> Option<&BasicBlock> {
        self.blocks.get(id.0)
    }

    fn label(&self, id: BlockId) -> &str {
        self.blocks.get(id.0).map_or("<invalid>", |b| b.label.as_str())
    }

    fn write_instruction(&self, f: &mut fmt::Formatter<'_>, inst: &Instruction) -> fmt::Result {
        match inst {
            Instruction::Alloca { dest, ty } => write!(f, "%{} = alloca {}", dest, ty),
            Instruction::Load { dest, ty, ptr } => write!(f, "%{} = load {}, ptr {}", dest, ty, ptr),
            Instruction::Store { value, ptr } => write!(f, "store {} {}, ptr {}", value.ty(), value, ptr),
            Instruction::Binary { dest, op, lhs, rhs } => {
                write!(f, "%{} = {} {} {}, {}", dest, op.name(), lhs.ty(), lhs, rhs)
            }
            Instruction::ICmp { dest, pred, lhs, rhs } => {
                write!(f, "%{} = icmp {} {} {}, {}", dest, pred.name(), lhs.ty(), lhs, rhs)
            }
            Instruction::FCmp { dest, pred, lhs, rhs } => {
                write!(f, "%{} = fcmp {} {} {}, {}", dest, pred.name(), lhs.ty(), lhs, rhs)
            }
            Instruction::Br { target } => write!(f, "br label %{}", self.label(*target)),
            Instruction::CondBr { cond, then_block, else_block } => write!(
                f,
                "br i1 {}, label %{}, label %{}",
                cond,
                self.label(*then_block),
                self.label(*else_block)
            ),
            Instruction::Ret { value: Some(value) } => write!(f, "ret {} {}", value.ty(), value),
            Instruction::Ret { value: None } => write!(f, "ret void"),
        }
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter()
            .enumerate()
            .map(|(i, ty)| format!("{} %{}", ty, i))
            .collect();
        writeln!(f, "define {} @{}({}) {{", self.return_type, self.name, params.join(", "))?;
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            writeln!(f, "{}:", block.label)?;
            for inst in &block.instructions {
                f.write_str("  ")?;
                self.write_instruction(f, inst)?;
                writeln!(f)?;
            }
        }
        writeln!(f, "}}")
    }
}

/// 模块级可变全局变量，外部链接
#[derive(Debug, Clone, PartialEq)]
pub struct GlobalVariable {
    pub name: String,
    pub ty: IrType,
    pub initializer: Constant,
    pub is_constant: bool,
}

impl fmt::Display for GlobalVariable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = if self.is_constant { "constant" } else { "global" };
        write!(f, "@{} = {} {} {}", self.name, kind, self.ty, self.initializer)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Module {
    pub name: String,
    pub target_triple: Option<String>,
    pub globals: Vec<GlobalVariable>,
    pub functions: Vec<Function>,
}

impl Module {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            target_triple: None,
            globals: Vec::new(),
            functions: Vec::new(),
        }
    }

    pub fn add_global(&mut self, global: GlobalVariable) {
        self.globals.push(global);
    }

    pub fn add_function(&mut self, function: Function) {
        self.functions.push(function);
    }

    pub fn get_global(&self, name: &str) -> Option<&GlobalVariable> {
        self.globals.iter().find(|g| g.name == name)
    }

    pub fn get_function(&self, name: &str) -> Option<&Function> {
        self.functions.iter().find(|f| f.name == name)
    }
}

impl fmt::Display for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "; ModuleID = '{}'", self.name)?;
        writeln!(f, "source_filename = \"{}\"", self.name)?;
        if let Some(triple) = &self.target_triple {
            writeln!(f, "target triple = \"{}\"", triple)?;
        }
        if !self.globals.is_empty() {
            writeln!(f)?;
            for global in &self.globals {
                writeln!(f, "{}", global)?;
            }
        }
        for function in &self.functions {
            writeln!(f)?;
            write!(f, "{}", function)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_constant_is_hex() {
        assert_eq!(Constant::Float(1.5).to_string(), "0x3FF8000000000000");
        assert_eq!(Constant::Float(0.0).to_string(), "0x0000000000000000");
    }

    #[test]
    fn test_module_text() {
        let mut module = Module::new("XD Compiler");
        module.add_global(GlobalVariable {
            name: "x".to_string(),
            ty: IrType::I32,
            initializer: Constant::Int(0),
            is_constant: false,
        });

        let mut builder = FunctionBuilder::new("main", IrType::I32, Vec::new());
        let slot = builder.build_entry_alloca(IrType::I32, "y");
        builder.build_store(Value::Const(Constant::Int(5)), slot.clone());
        let loaded = builder.build_load(IrType::I32, slot);
        builder.build_return(Some(loaded));
        module.add_function(builder.finish());

        let expected = "\
; ModuleID = 'XD Compiler'
source_filename = \"XD Compiler\"

@x = global i32 0

define i32 @main() {
entry:
  %y = alloca i32
  store i32 5, ptr %y
  %t0 = load i32, ptr %y
  ret i32 %t0
}
";
        assert_eq!(module.to_string(), expected);
    }
}
