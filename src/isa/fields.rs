//! 指令字段提取辅助函数
//!
//! 提供从 32-bit 浮点指令字中提取各字段的工具函数

/// 提取 opcode 字段 [6:0]
#[inline]
pub fn opcode(raw: u32) -> u32 {
    raw & 0x7F
}

/// 提取 rd 字段 [11:7]
#[inline]
pub fn rd(raw: u32) -> u8 {
    ((raw >> 7) & 0x1F) as u8
}

/// 提取 funct3 字段 [14:12]
#[inline]
pub fn funct3(raw: u32) -> u32 {
    (raw >> 12) & 0x7
}

/// 提取舍入模式 rm [14:12]，与 funct3 同位
#[inline]
pub fn rm(raw: u32) -> u8 {
    funct3(raw) as u8
}

/// 提取 rs1 字段 [19:15]
#[inline]
pub fn rs1(raw: u32) -> u8 {
    ((raw >> 15) & 0x1F) as u8
}

/// 提取 rs2 字段 [24:20]
#[inline]
pub fn rs2(raw: u32) -> u8 {
    ((raw >> 20) & 0x1F) as u8
}

/// 提取格式 fmt [26:25]，单精度为 00
#[inline]
pub fn fmt(raw: u32) -> u8 {
    ((raw >> 25) & 0x3) as u8
}

/// 提取 rs3 字段 [31:27] (R4-type)
#[inline]
pub fn rs3(raw: u32) -> u8 {
    ((raw >> 27) & 0x1F) as u8
}

/// 提取 funct7 字段 [31:25]
#[inline]
pub fn funct7(raw: u32) -> u32 {
    (raw >> 25) & 0x7F
}

// ========== F 扩展 opcode ==========

/// LOAD-FP opcode (FLW)，不在陷入范围内
pub const OP_LOAD_FP: u32 = 0b0000111;
/// STORE-FP opcode (FSW)，不在陷入范围内
pub const OP_STORE_FP: u32 = 0b0100111;
pub const OP_MADD: u32 = 0b1000011;
pub const OP_MSUB: u32 = 0b1000111;
pub const OP_NMSUB: u32 = 0b1001011;
pub const OP_NMADD: u32 = 0b1001111;
/// OP-FP opcode (浮点运算)
pub const OP_FP: u32 = 0b1010011;
