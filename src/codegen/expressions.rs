//! 表达式代码生成
use crate::codegen::context::IRGenerator;
use crate::ast::*;
use crate::error::{SourceLocation, XdResult, codegen_error};
use crate::ir::{BinaryOpcode, Constant, FloatPredicate, IntPredicate, IrType, Value};

impl IRGenerator {
    /// 生成表达式代码，返回结果值
    pub fn generate_expression(&mut self, expr: &Expr) -> XdResult<Value> {
        match expr {
            Expr::Primary(primary) => self.generate_primary(primary),
            Expr::Binary(bin) => self.generate_binary(bin),
            Expr::Comparison(cmp) => self.generate_comparison(cmp),
        }
    }

    fn generate_primary(&mut self, primary: &PrimaryExpr) -> XdResult<Value> {
        match primary {
            PrimaryExpr::IntLiteral(lit) => {
                let value = lit.text.parse::<i32>().map_err(|_| {
                    codegen_error(lit.loc, format!("integer literal '{}' does not fit in i32", lit.text))
                })?;
                Ok(Value::Const(Constant::Int(value)))
            }
            PrimaryExpr::FloatLiteral(lit) => {
                let value = lit.text.parse::<f32>().map_err(|_| {
                    codegen_error(lit.loc, format!("invalid float literal '{}'", lit.text))
                })?;
                Ok(Value::Const(Constant::Float(value)))
            }
            PrimaryExpr::Identifier(ident) => self.generate_identifier(ident),
            PrimaryExpr::Paren(inner) => self.generate_expression(inner),
        }
    }

    /// 读取变量：局部变量优先，其次全局变量
    fn generate_identifier(&mut self, ident: &Identifier) -> XdResult<Value> {
        let slot = self.lookup(&ident.name)
            .cloned()
            .ok_or_else(|| codegen_error(ident.loc, format!("undefined variable '{}'", ident.name)))?;
        let builder = self.builder(ident.loc, "variable read")?;
        Ok(builder.build_load(slot.ty, slot.ptr))
    }

    fn generate_binary(&mut self, bin: &BinaryExpr) -> XdResult<Value> {
        let lhs = self.generate_expression(&bin.left)?;
        let rhs = self.generate_expression(&bin.right)?;

        let opcode = match (lhs.ty(), rhs.ty()) {
            (IrType::I32, IrType::I32) => match bin.op {
                BinaryOp::Add => BinaryOpcode::Add,
                BinaryOp::Sub => BinaryOpcode::Sub,
                BinaryOp::Mul => BinaryOpcode::Mul,
                BinaryOp::Div => BinaryOpcode::SDiv,
            },
            (IrType::F32, IrType::F32) => match bin.op {
                BinaryOp::Add => BinaryOpcode::FAdd,
                BinaryOp::Sub => BinaryOpcode::FSub,
                BinaryOp::Mul => BinaryOpcode::FMul,
                BinaryOp::Div => BinaryOpcode::FDiv,
            },
            (l, r) => {
                return Err(codegen_error(bin.loc, format!(
                    "invalid operand types for '{}': {} and {}", bin.op, l, r
                )));
            }
        };

        let builder = self.builder(bin.loc, "expression")?;
        Ok(builder.build_binary(opcode, lhs, rhs))
    }

    fn generate_comparison(&mut self, cmp: &ComparisonExpr) -> XdResult<Value> {
        let lhs = self.generate_expression(&cmp.left)?;
        let rhs = self.generate_expression(&cmp.right)?;

        match (lhs.ty(), rhs.ty()) {
            (l, r) if l == r && l.is_integer() => {
                let pred = match cmp.op {
                    ComparisonOp::Eq => IntPredicate::Eq,
                    ComparisonOp::Ne => IntPredicate::Ne,
                    ComparisonOp::Lt => IntPredicate::Slt,
                    ComparisonOp::Gt => IntPredicate::Sgt,
                    ComparisonOp::Le => IntPredicate::Sle,
                    ComparisonOp::Ge => IntPredicate::Sge,
                };
                Ok(self.builder(cmp.loc, "comparison")?.build_icmp(pred, lhs, rhs))
            }
            (IrType::F32, IrType::F32) => {
                let pred = match cmp.op {
                    ComparisonOp::Eq => FloatPredicate::Oeq,
                    ComparisonOp::Ne => FloatPredicate::One,
                    ComparisonOp::Lt => FloatPredicate::Olt,
                    ComparisonOp::Gt => FloatPredicate::Ogt,
                    ComparisonOp::Le => FloatPredicate::Ole,
                    ComparisonOp::Ge => FloatPredicate::Oge,
                };
                Ok(self.builder(cmp.loc, "comparison")?.build_fcmp(pred, lhs, rhs))
            }
            (l, r) => Err(codegen_error(cmp.loc, format!(
                "invalid operand types for '{}': {} and {}", cmp.op, l, r
            ))),
        }
    }

    /// 把条件值转换为 i1：整数与 0 比较，浮点数与 0.0 比较
    pub fn to_condition(&mut self, value: Value, loc: SourceLocation) -> XdResult<Value> {
        let builder = self.builder(loc, "condition")?;
        match value.ty() {
            IrType::I1 => Ok(value),
            IrType::I32 => Ok(builder.build_icmp(IntPredicate::Ne, value, Value::Const(Constant::Int(0)))),
            IrType::F32 => Ok(builder.build_fcmp(FloatPredicate::One, value, Value::Const(Constant::Float(0.0)))),
            other => Err(codegen_error(loc, format!("condition of type {} is not supported", other))),
        }
    }
}
