//! 已解码的浮点指令

use std::fmt;

use super::rv32f::RoundingMode;
use crate::fpu::{FloatOp, FloatOperands};

/// 解码结果：原始编码 + 派发所需的操作与操作数
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodedFloat {
    /// 原始 32-bit 指令编码
    pub raw: u32,
    pub op: FloatOp,
    pub operands: FloatOperands,
}

impl DecodedFloat {
    pub fn rounding_mode(&self) -> RoundingMode {
        self.operands.rounding_mode()
    }
}

/// 按汇编语法显示，整数寄存器用 x 前缀，浮点寄存器用 f 前缀
impl fmt::Display for DecodedFloat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.operands;
        let m = self.op.mnemonic();
        match self.op.source_count() {
            3 => write!(f, "{} f{}, f{}, f{}, f{}", m, o.rd, o.rs1, o.rs2, o.rs3),
            1 if self.op.reads_int_source() => write!(f, "{} f{}, x{}", m, o.rd, o.rs1),
            1 if self.op.writes_return_reg() => write!(f, "{} x{}, f{}", m, o.rd, o.rs1),
            1 => write!(f, "{} f{}, f{}", m, o.rd, o.rs1),
            _ if self.op.writes_return_reg() => {
                write!(f, "{} x{}, f{}, f{}", m, o.rd, o.rs1, o.rs2)
            }
            _ => write!(f, "{} f{}, f{}, f{}", m, o.rd, o.rs1, o.rs2),
        }
    }
}
