//! RV32F 扩展（单精度浮点）解码表
//!
//! 只收录需要陷入模拟的 24 个计算指令；FLW/FSW 由整数核心按普通访存处理，不在表内。

use std::fmt;

use crate::fpu::{FloatOp, FloatOperands};
use crate::isa::fields::*;
use crate::isa::instr::DecodedFloat;
use crate::isa::instr_def::*;

// ========== funct7 编码 ==========

pub const FADD_S: u32 = 0b0000000;
pub const FSUB_S: u32 = 0b0000100;
pub const FMUL_S: u32 = 0b0001000;
pub const FDIV_S: u32 = 0b0001100;
pub const FSQRT_S: u32 = 0b0101100;
pub const FSGNJ_S: u32 = 0b0010000; // funct3 区分 FSGNJ/FSGNJN/FSGNJX
pub const FMINMAX_S: u32 = 0b0010100; // funct3 区分 FMIN/FMAX
pub const FCVT_W_S: u32 = 0b1100000; // rs2 区分 FCVT.W.S / FCVT.WU.S
pub const FMV_X_W: u32 = 0b1110000; // 也包括 FCLASS.S
pub const FCMP_S: u32 = 0b1010000; // funct3 区分 FEQ/FLT/FLE
pub const FCVT_S_W: u32 = 0b1101000; // rs2 区分 FCVT.S.W / FCVT.S.WU
pub const FMV_W_X: u32 = 0b1111000;

/// 单精度 fmt
const FMT_S: u32 = 0b00;

// ========== 舍入模式 ==========

/// 舍入模式
///
/// 只用于显示，模拟运算一律按 round-to-nearest-even
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RoundingMode {
    /// 向最近偶数舍入
    Rne = 0b000,
    /// 向零舍入
    Rtz = 0b001,
    /// 向负无穷舍入
    Rdn = 0b010,
    /// 向正无穷舍入
    Rup = 0b011,
    /// 向最近舍入，远离零
    Rmm = 0b100,
    /// 使用 frm CSR 中的舍入模式
    Dyn = 0b111,
}

impl From<u8> for RoundingMode {
    fn from(val: u8) -> Self {
        match val & 0x7 {
            0b000 => RoundingMode::Rne,
            0b001 => RoundingMode::Rtz,
            0b010 => RoundingMode::Rdn,
            0b011 => RoundingMode::Rup,
            0b100 => RoundingMode::Rmm,
            // 101/110 保留，按 dyn 显示
            _ => RoundingMode::Dyn,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoundingMode::Rne => "rne",
            RoundingMode::Rtz => "rtz",
            RoundingMode::Rdn => "rdn",
            RoundingMode::Rup => "rup",
            RoundingMode::Rmm => "rmm",
            RoundingMode::Dyn => "dyn",
        };
        f.write_str(s)
    }
}

// ========== 操作数提取 ==========

fn r4_operands(raw: u32) -> FloatOperands {
    FloatOperands::new(rs1(raw), rs2(raw), rd(raw))
        .with_rs3(rs3(raw))
        .with_rm(rm(raw))
}

fn r_operands(raw: u32) -> FloatOperands {
    FloatOperands::new(rs1(raw), rs2(raw), rd(raw)).with_rm(rm(raw))
}

/// funct3 是操作码的一部分，没有舍入模式
fn r_funct3_operands(raw: u32) -> FloatOperands {
    FloatOperands::new(rs1(raw), rs2(raw), rd(raw))
}

fn unary_operands(raw: u32) -> FloatOperands {
    FloatOperands::new(rs1(raw), 0, rd(raw)).with_rm(rm(raw))
}

fn unary_funct3_operands(raw: u32) -> FloatOperands {
    FloatOperands::new(rs1(raw), 0, rd(raw))
}

// ========== RV32F 指令定义表 ==========

/// RV32F 指令定义表，按派发槽位排列
pub static RV32F_INSTRS: &[InstrDef] = &[
    // ========== 算术运算 ==========
    InstrDef::new("FADD.S", FP_R_TYPE_MASK, fp_r_match(FADD_S, OP_FP), FloatOp::FaddS, r_operands),
    InstrDef::new("FSUB.S", FP_R_TYPE_MASK, fp_r_match(FSUB_S, OP_FP), FloatOp::FsubS, r_operands),
    InstrDef::new("FMUL.S", FP_R_TYPE_MASK, fp_r_match(FMUL_S, OP_FP), FloatOp::FmulS, r_operands),
    InstrDef::new("FDIV.S", FP_R_TYPE_MASK, fp_r_match(FDIV_S, OP_FP), FloatOp::FdivS, r_operands),
    // FSQRT.S (rs2 must be 0)
    InstrDef::new("FSQRT.S", FP_UNARY_MASK, fp_r_match(FSQRT_S, OP_FP), FloatOp::FsqrtS, unary_operands),

    // ========== 最小/最大 ==========
    InstrDef::new("FMIN.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FMINMAX_S, 0b000, OP_FP), FloatOp::FminS, r_funct3_operands),
    InstrDef::new("FMAX.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FMINMAX_S, 0b001, OP_FP), FloatOp::FmaxS, r_funct3_operands),

    // ========== 融合乘加 (R4-type) ==========
    InstrDef::new("FMADD.S", R4_TYPE_MASK, r4_match(FMT_S, OP_MADD), FloatOp::FmaddS, r4_operands),
    InstrDef::new("FMSUB.S", R4_TYPE_MASK, r4_match(FMT_S, OP_MSUB), FloatOp::FmsubS, r4_operands),
    InstrDef::new("FNMADD.S", R4_TYPE_MASK, r4_match(FMT_S, OP_NMADD), FloatOp::FnmaddS, r4_operands),
    InstrDef::new("FNMSUB.S", R4_TYPE_MASK, r4_match(FMT_S, OP_NMSUB), FloatOp::FnmsubS, r4_operands),

    // ========== 符号注入 ==========
    InstrDef::new("FSGNJ.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FSGNJ_S, 0b000, OP_FP), FloatOp::FsgnjS, r_funct3_operands),
    InstrDef::new("FSGNJN.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FSGNJ_S, 0b001, OP_FP), FloatOp::FsgnjnS, r_funct3_operands),
    InstrDef::new("FSGNJX.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FSGNJ_S, 0b010, OP_FP), FloatOp::FsgnjxS, r_funct3_operands),

    // ========== 比较 ==========
    InstrDef::new("FEQ.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FCMP_S, 0b010, OP_FP), FloatOp::FeqS, r_funct3_operands),
    InstrDef::new("FLT.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FCMP_S, 0b001, OP_FP), FloatOp::FltS, r_funct3_operands),
    InstrDef::new("FLE.S", FP_R_FUNCT3_MASK, fp_r_funct3_match(FCMP_S, 0b000, OP_FP), FloatOp::FleS, r_funct3_operands),

    // ========== 类型转换 ==========
    InstrDef::new("FCVT.W.S", FP_UNARY_MASK, fp_unary_match(FCVT_W_S, 0, 0, OP_FP), FloatOp::FcvtWS, unary_operands),
    InstrDef::new("FCVT.WU.S", FP_UNARY_MASK, fp_unary_match(FCVT_W_S, 1, 0, OP_FP), FloatOp::FcvtWuS, unary_operands),
    InstrDef::new("FCVT.S.W", FP_UNARY_MASK, fp_unary_match(FCVT_S_W, 0, 0, OP_FP), FloatOp::FcvtSW, unary_operands),
    InstrDef::new("FCVT.S.WU", FP_UNARY_MASK, fp_unary_match(FCVT_S_W, 1, 0, OP_FP), FloatOp::FcvtSWu, unary_operands),

    // ========== 移动与分类 ==========
    InstrDef::new("FMV.X.W", FP_UNARY_FUNCT3_MASK, fp_unary_match(FMV_X_W, 0, 0b000, OP_FP), FloatOp::FmvXW, unary_funct3_operands),
    InstrDef::new("FMV.W.X", FP_UNARY_FUNCT3_MASK, fp_unary_match(FMV_W_X, 0, 0b000, OP_FP), FloatOp::FmvWX, unary_funct3_operands),
    InstrDef::new("FCLASS.S", FP_UNARY_FUNCT3_MASK, fp_unary_match(FMV_X_W, 0, 0b001, OP_FP), FloatOp::FclassS, unary_funct3_operands),
];

/// RV32F 计算指令使用的 opcode
pub static RV32F_OPCODES: [u32; 5] = [OP_MADD, OP_MSUB, OP_NMSUB, OP_NMADD, OP_FP];

// ========== 解码器实例 ==========

/// RV32F 解码器
pub static RV32F_DECODER: TableDrivenDecoder = TableDrivenDecoder::new("RV32F", RV32F_INSTRS);

/// 兼容性别名
pub type Rv32fDecoder = TableDrivenDecoder;

/// opcode 是否属于 F 扩展（含 FLW/FSW）
pub fn is_fp_opcode(raw: u32) -> bool {
    let op = opcode(raw);
    op == OP_LOAD_FP || op == OP_STORE_FP || RV32F_OPCODES.contains(&op)
}

/// 使用 RV32F 解码器解码，不是可陷入的浮点计算指令时返回 `None`
pub fn decode(raw: u32) -> Option<DecodedFloat> {
    RV32F_DECODER.decode(raw)
}
