//! RV32F 指令解码
//!
//! 本模块把 32-bit 浮点指令字翻译成派发所需的 `FloatOp` + `FloatOperands`：
//! - `InstrDef`: 统一的指令定义，同时用于解码和冲突检测
//! - `TableDrivenDecoder`: 按定义表顺序匹配的解码器
//! - `DecodedFloat`: 解码结果

mod fields;
mod instr;
mod instr_def;
mod rv32f;

pub use fields::*;
pub use instr::DecodedFloat;
pub use instr_def::{ConflictInfo, InstrDef, TableDrivenDecoder};
pub use rv32f::{
    decode, is_fp_opcode, RoundingMode, Rv32fDecoder, RV32F_DECODER, RV32F_INSTRS, RV32F_OPCODES,
};

#[cfg(test)]
mod tests;
