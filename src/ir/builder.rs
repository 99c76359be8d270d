//! 函数构建器：维护插入点并生成指令

use std::collections::HashSet;
use super::*;

pub struct FunctionBuilder {
    function: Function,
    insert_block: BlockId,
    // 函数内寄存器名与标签名共用同一命名空间
    used_names: HashSet<String>,
    temp_counter: usize,
}

impl FunctionBuilder {
    /// 创建函数对象及其 entry 块，插入点位于 entry 末尾
    pub fn new(name: &str, return_type: IrType, params: Vec<IrType>) -> Self {
        let mut used_names = HashSet::new();
        used_names.insert("entry".to_string());
        Self {
            function: Function {
                name: name.to_string(),
                return_type,
                params,
                blocks: vec![BasicBlock::new("entry")],
            },
            insert_block: BlockId(0),
            used_names,
            temp_counter: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.function.name
    }

    pub fn return_type(&self) -> IrType {
        self.function.return_type
    }

    fn unique_name(&mut self, hint: &str) -> String {
        let mut name = hint.to_string();
        let mut suffix = 0;
        while self.used_names.contains(&name) {
            suffix += 1;
            name = format!("{}{}", hint, suffix);
        }
        self.used_names.insert(name.clone());
        name
    }

    fn new_temp(&mut self) -> String {
        loop {
            let name = format!("t{}", self.temp_counter);
            self.temp_counter += 1;
            if self.used_names.insert(name.clone()) {
                return name;
            }
        }
    }

    fn push(&mut self, inst: Instruction) {
        self.function.blocks[self.insert_block.0].instructions.push(inst);
    }

    /// 追加新的基本块（不改变插入点）
    pub fn append_block(&mut self, prefix: &str) -> BlockId {
        let label = self.unique_name(prefix);
        self.function.blocks.push(BasicBlock::new(label));
        BlockId(self.function.blocks.len() - 1)
    }

    pub fn position_at_end(&mut self, block: BlockId) {
        self.insert_block = block;
    }

    /// 当前插入块是否已有终结指令
    pub fn is_terminated(&self) -> bool {
        self.function.blocks[self.insert_block.0].terminator().is_some()
    }

    /// 在 entry 块开头分配栈槽，保证局部变量在整个函数内可见
    pub fn build_entry_alloca(&mut self, ty: IrType, name: &str) -> Value {
        let dest = self.unique_name(name);
        let entry = &mut self.function.blocks[0].instructions;
        let pos = entry.iter()
            .take_while(|inst| matches!(inst, Instruction::Alloca { .. }))
            .count();
        entry.insert(pos, Instruction::Alloca { dest: dest.clone(), ty });
        Value::Register { name: dest, ty: IrType::Ptr }
    }

    pub fn build_load(&mut self, ty: IrType, ptr: Value) -> Value {
        let dest = self.new_temp();
        self.push(Instruction::Load { dest: dest.clone(), ty, ptr });
        Value::Register { name: dest, ty }
    }

    pub fn build_store(&mut self, value: Value, ptr: Value) {
        self.push(Instruction::Store { value, ptr });
    }

    pub fn build_binary(&mut self, op: BinaryOpcode, lhs: Value, rhs: Value) -> Value {
        let dest = self.new_temp();
        let ty = lhs.ty();
        self.push(Instruction::Binary { dest: dest.clone(), op, lhs, rhs });
        Value::Register { name: dest, ty }
    }

    pub fn build_icmp(&mut self, pred: IntPredicate, lhs: Value, rhs: Value) -> Value {
        let dest = self.new_temp();
        self.push(Instruction::ICmp { dest: dest.clone(), pred, lhs, rhs });
        Value::Register { name: dest, ty: IrType::I1 }
    }

    pub fn build_fcmp(&mut self, pred: FloatPredicate, lhs: Value, rhs: Value) -> Value {
        let dest = self.new_temp();
        self.push(Instruction::FCmp { dest: dest.clone(), pred, lhs, rhs });
        Value::Register { name: dest, ty: IrType::I1 }
    }

    pub fn build_br(&mut self, target: BlockId) {
        self.push(Instruction::Br { target });
    }

    pub fn build_cond_br(&mut self, cond: Value, then_block: BlockId, else_block: BlockId) {
        self.push(Instruction::CondBr { cond, then_block, else_block });
    }

    pub fn build_return(&mut self, value: Option<Value>) {
        self.push(Instruction::Ret { value });
    }

    pub fn finish(self) -> Function {
        self.function
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocas_stay_at_entry_start() {
        let mut builder = FunctionBuilder::new("f", IrType::Void, Vec::new());
        let a = builder.build_entry_alloca(IrType::I32, "a");
        builder.build_store(Value::Const(Constant::Int(1)), a);
        let b = builder.build_entry_alloca(IrType::F32, "b");
        builder.build_store(Value::Const(Constant::Float(2.0)), b);
        builder.build_return(None);

        let function = builder.finish();
        let entry = &function.blocks[0].instructions;
        assert!(matches!(entry[0], Instruction::Alloca { ref dest, .. } if dest == "a"));
        assert!(matches!(entry[1], Instruction::Alloca { ref dest, .. } if dest == "b"));
        assert!(matches!(entry[2], Instruction::Store { .. }));
        assert!(matches!(entry[4], Instruction::Ret { value: None }));
    }

    #[test]
    fn test_names_are_unique() {
        let mut builder = FunctionBuilder::new("f", IrType::Void, Vec::new());
        let first = builder.build_entry_alloca(IrType::I32, "x");
        let second = builder.build_entry_alloca(IrType::I32, "x");
        let shadow = builder.build_entry_alloca(IrType::I32, "entry");
        assert_eq!(first.to_string(), "%x");
        assert_eq!(second.to_string(), "%x1");
        assert_eq!(shadow.to_string(), "%entry1");

        let then_block = builder.append_block("if.then");
        let again = builder.append_block("if.then");
        let function = builder.finish();
        assert_eq!(function.blocks[then_block.0].label, "if.then");
        assert_eq!(function.blocks[again.0].label, "if.then1");
    }

    #[test]
    fn test_terminator_tracking() {
        let mut builder = FunctionBuilder::new("f", IrType::I32, Vec::new());
        assert!(!builder.is_terminated());
        let next = builder.append_block("next");
        builder.build_br(next);
        assert!(builder.is_terminated());
        builder.position_at_end(next);
        assert!(!builder.is_terminated());
    }
}
