//! 函数代码生成

use crate::codegen::context::IRGenerator;
use crate::ast::Function;
use crate::error::{XdResult, codegen_error};
use crate::ir::{Constant, FunctionBuilder, Value, verify_function};

impl IRGenerator {
    /// 生成函数定义
    ///
    /// 参数不参与生成，签名总是无参。函数体结束时若当前块没有终结指令，
    /// 补一条返回零值（或 `ret void`）的指令，然后交给校验器检查。
    pub fn generate_function(&mut self, func: &Function) -> XdResult<()> {
        let proto = &func.prototype;

        if self.in_function() {
            return Err(codegen_error(func.loc, format!(
                "nested function '{}' is not supported", proto.name
            )));
        }
        if self.module.get_function(&proto.name).is_some() || self.module.get_global(&proto.name).is_some() {
            return Err(codegen_error(proto.loc, format!("'{}' is already defined", proto.name)));
        }

        let return_type = self.resolve_type(&proto.return_type)?;
        if proto.arg_count > 0 {
            self.warn(proto.loc, format!(
                "{} parameter(s) of function '{}' are ignored", proto.arg_count, proto.name
            ));
        }

        log::debug!("lowering function '{}' returning {}", proto.name, return_type);
        self.locals.clear();
        self.current_function = Some(FunctionBuilder::new(&proto.name, return_type, Vec::new()));

        let result = self.generate_block(&func.body);

        // 无论成败都回到全局作用域
        let builder = self.current_function.take();
        self.locals.clear();
        result?;

        if let Some(mut builder) = builder {
            if !builder.is_terminated() {
                let value = Constant::zero(return_type).map(Value::Const);
                builder.build_return(value);
            }
            let function = builder.finish();
            verify_function(&self.module, &function)?;
            self.module.add_function(function);
        }
        Ok(())
    }
}
