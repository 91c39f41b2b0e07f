//! 指令定义结构
//!
//! 统一的指令定义，同时用于解码和冲突检测

use std::fmt;

use super::instr::DecodedFloat;
use crate::fpu::{FloatOp, FloatOperands};

/// 指令定义
///
/// 一处定义，两处使用：
/// - 解码：通过 mask/match 匹配后调用 decode 函数提取操作数
/// - 冲突检测：通过 mask/match 判断两条指令是否可能冲突
#[derive(Clone)]
pub struct InstrDef {
    /// 指令名称（用于调试和冲突报告）
    pub name: &'static str,
    /// 匹配掩码：哪些位需要检查
    pub mask: u32,
    /// 匹配值：这些位应该是什么
    pub match_val: u32,
    /// 对应的派发槽位
    pub op: FloatOp,
    /// 从原始编码提取操作数
    pub decode: fn(u32) -> FloatOperands,
}

impl InstrDef {
    pub const fn new(
        name: &'static str,
        mask: u32,
        match_val: u32,
        op: FloatOp,
        decode: fn(u32) -> FloatOperands,
    ) -> Self {
        Self {
            name,
            mask,
            match_val,
            op,
            decode,
        }
    }

    /// 检查指令是否匹配此定义
    #[inline]
    pub fn matches(&self, raw: u32) -> bool {
        (raw & self.mask) == self.match_val
    }

    #[inline]
    pub fn decode_instr(&self, raw: u32) -> DecodedFloat {
        DecodedFloat {
            raw,
            op: self.op,
            operands: (self.decode)(raw),
        }
    }

    /// 两个定义冲突当且仅当存在某个指令字同时匹配两者
    pub fn conflicts_with(&self, other: &InstrDef) -> bool {
        let common_mask = self.mask & other.mask;
        (self.match_val & common_mask) == (other.match_val & common_mask)
    }
}

impl fmt::Debug for InstrDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InstrDef")
            .field("name", &self.name)
            .field("mask", &format_args!("0x{:08X}", self.mask))
            .field("match_val", &format_args!("0x{:08X}", self.match_val))
            .field("op", &self.op)
            .finish()
    }
}

/// 冲突报告
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConflictInfo {
    pub first: &'static str,
    pub second: &'static str,
    /// 同时匹配两者的示例编码
    pub example_raw: u32,
}

impl fmt::Display for ConflictInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "冲突: {} 与 {} (示例: 0x{:08X})",
            self.first, self.second, self.example_raw
        )
    }
}

// ========== 类型掩码常量 ==========

/// R4-type 掩码：opcode[6:0] + fmt[26:25]
pub const R4_TYPE_MASK: u32 = 0x0600_007F;

/// FP R-type 掩码：opcode + funct7，funct3 为舍入模式
pub const FP_R_TYPE_MASK: u32 = 0xFE00_007F;

/// FP R-type 掩码：opcode + funct3 + funct7，funct3 选择具体操作
pub const FP_R_FUNCT3_MASK: u32 = 0xFE00_707F;

/// 单源 FP 掩码：opcode + rs2 + funct7
pub const FP_UNARY_MASK: u32 = 0xFFF0_007F;

/// 单源 FP 掩码：opcode + funct3 + rs2 + funct7
pub const FP_UNARY_FUNCT3_MASK: u32 = 0xFFF0_707F;

// ========== 辅助函数：构造 match 值 ==========

#[inline]
pub const fn r4_match(fmt: u32, opcode: u32) -> u32 {
    (fmt << 25) | opcode
}

#[inline]
pub const fn fp_r_match(funct7: u32, opcode: u32) -> u32 {
    (funct7 << 25) | opcode
}

#[inline]
pub const fn fp_r_funct3_match(funct7: u32, funct3: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (funct3 << 12) | opcode
}

#[inline]
pub const fn fp_unary_match(funct7: u32, rs2: u32, funct3: u32, opcode: u32) -> u32 {
    (funct7 << 25) | (rs2 << 20) | (funct3 << 12) | opcode
}

// ========== 表驱动解码器 ==========

/// 表驱动解码器
///
/// 按顺序扫描 `InstrDef` 表，第一个匹配的定义生效
#[derive(Clone, Copy)]
pub struct TableDrivenDecoder {
    name: &'static str,
    instrs: &'static [InstrDef],
}

impl TableDrivenDecoder {
    pub const fn new(name: &'static str, instrs: &'static [InstrDef]) -> Self {
        Self { name, instrs }
    }

    pub fn name(&self) -> &str {
        self.name
    }

    /// 获取指令定义表
    pub fn instrs(&self) -> &'static [InstrDef] {
        self.instrs
    }

    /// 尝试解码，不是表内指令返回 `None`
    pub fn decode(&self, raw: u32) -> Option<DecodedFloat> {
        self.instrs
            .iter()
            .find(|def| def.matches(raw))
            .map(|def| def.decode_instr(raw))
    }

    /// 检测表内两两冲突
    pub fn detect_conflicts(&self) -> Vec<ConflictInfo> {
        let mut conflicts = Vec::new();
        for (i, a) in self.instrs.iter().enumerate() {
            for b in self.instrs.iter().skip(i + 1) {
                if a.conflicts_with(b) {
                    conflicts.push(ConflictInfo {
                        first: a.name,
                        second: b.name,
                        example_raw: (a.match_val & a.mask) | (b.match_val & b.mask),
                    });
                }
            }
        }
        conflicts
    }
}

impl fmt::Debug for TableDrivenDecoder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TableDrivenDecoder")
            .field("name", &self.name)
            .field("instrs", &self.instrs.len())
            .finish()
    }
}
