//! 类型转换
use crate::codegen::context::IRGenerator;
use crate::error::{XdResult, codegen_error};
use crate::ir::IrType;
use crate::lexer::TokenWithLocation;
use crate::types::Type;

impl IRGenerator {
    /// 将声明的类型令牌转换为后端类型
    pub fn resolve_type(&self, token: &TokenWithLocation) -> XdResult<IrType> {
        match Type::from_token(&token.token) {
            Some(ty) => self.type_to_ir(ty, token),
            None => Err(codegen_error(token.loc, format!("'{}' is not a type", token.token))),
        }
    }

    fn type_to_ir(&self, ty: Type, token: &TokenWithLocation) -> XdResult<IrType> {
        match ty {
            Type::Void => Ok(IrType::Void),
            Type::Int => Ok(IrType::I32),
            Type::Float => Ok(IrType::F32),
            Type::Char => Err(codegen_error(token.loc, format!("type '{}' is not supported", ty))),
        }
    }
}
