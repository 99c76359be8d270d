//! XD IR 代码生成器
//!
//! 本模块将 AST 转换为 `ir` 模块中的代码对象。
//! 按语句、表达式、类型拆分为多个子模块。

pub mod context;
mod types;
mod expressions;
mod statements;
mod generator;

// 公开 IRGenerator 作为代码生成器的入口
pub use context::{CodegenOptions, IRGenerator, Lowered, VarSlot};
