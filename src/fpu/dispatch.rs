//! 派发表
//!
//! `FloatOp` 的判别值就是派发槽位。所有处理函数共用一个签名，
//! 不同元数的操作通过 `FloatOperands` 中被忽略的字段统一。

use std::fmt;
use std::str::FromStr;

use super::handlers;
use super::{FloatOperands, FpuCore};
use crate::error::{FpuError, FpuResult};

/// RV32F 操作，判别值即派发表下标
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FloatOp {
    FaddS = 0,
    FsubS = 1,
    FmulS = 2,
    FdivS = 3,
    FsqrtS = 4,
    FminS = 5,
    FmaxS = 6,
    FmaddS = 7,
    FmsubS = 8,
    FnmaddS = 9,
    FnmsubS = 10,
    FsgnjS = 11,
    FsgnjnS = 12,
    FsgnjxS = 13,
    FeqS = 14,
    FltS = 15,
    FleS = 16,
    FcvtWS = 17,
    FcvtWuS = 18,
    FcvtSW = 19,
    FcvtSWu = 20,
    FmvXW = 21,
    FmvWX = 22,
    FclassS = 23,
}

impl FloatOp {
    /// 操作数量
    pub const COUNT: usize = 24;

    /// 按槽位排列的所有操作
    pub const ALL: [FloatOp; FloatOp::COUNT] = [
        FloatOp::FaddS,
        FloatOp::FsubS,
        FloatOp::FmulS,
        FloatOp::FdivS,
        FloatOp::FsqrtS,
        FloatOp::FminS,
        FloatOp::FmaxS,
        FloatOp::FmaddS,
        FloatOp::FmsubS,
        FloatOp::FnmaddS,
        FloatOp::FnmsubS,
        FloatOp::FsgnjS,
        FloatOp::FsgnjnS,
        FloatOp::FsgnjxS,
        FloatOp::FeqS,
        FloatOp::FltS,
        FloatOp::FleS,
        FloatOp::FcvtWS,
        FloatOp::FcvtWuS,
        FloatOp::FcvtSW,
        FloatOp::FcvtSWu,
        FloatOp::FmvXW,
        FloatOp::FmvWX,
        FloatOp::FclassS,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 汇编助记符
    pub const fn mnemonic(self) -> &'static str {
        match self {
            FloatOp::FaddS => "fadd.s",
            FloatOp::FsubS => "fsub.s",
            FloatOp::FmulS => "fmul.s",
            FloatOp::FdivS => "fdiv.s",
            FloatOp::FsqrtS => "fsqrt.s",
            FloatOp::FminS => "fmin.s",
            FloatOp::FmaxS => "fmax.s",
            FloatOp::FmaddS => "fmadd.s",
            FloatOp::FmsubS => "fmsub.s",
            FloatOp::FnmaddS => "fnmadd.s",
            FloatOp::FnmsubS => "fnmsub.s",
            FloatOp::FsgnjS => "fsgnj.s",
            FloatOp::FsgnjnS => "fsgnjn.s",
            FloatOp::FsgnjxS => "fsgnjx.s",
            FloatOp::FeqS => "feq.s",
            FloatOp::FltS => "flt.s",
            FloatOp::FleS => "fle.s",
            FloatOp::FcvtWS => "fcvt.w.s",
            FloatOp::FcvtWuS => "fcvt.wu.s",
            FloatOp::FcvtSW => "fcvt.s.w",
            FloatOp::FcvtSWu => "fcvt.s.wu",
            FloatOp::FmvXW => "fmv.x.w",
            FloatOp::FmvWX => "fmv.w.x",
            FloatOp::FclassS => "fclass.s",
        }
    }

    /// 结果是否写入固定返回寄存器 a0（否则写 f[rd]）
    pub const fn writes_return_reg(self) -> bool {
        matches!(
            self,
            FloatOp::FeqS
                | FloatOp::FltS
                | FloatOp::FleS
                | FloatOp::FcvtWS
                | FloatOp::FcvtWuS
                | FloatOp::FmvXW
                | FloatOp::FclassS
        )
    }

    /// 源操作数是否来自整数寄存器
    pub const fn reads_int_source(self) -> bool {
        matches!(self, FloatOp::FcvtSW | FloatOp::FcvtSWu | FloatOp::FmvWX)
    }

    /// 有效源操作数个数
    pub const fn source_count(self) -> usize {
        match self {
            FloatOp::FmaddS | FloatOp::FmsubS | FloatOp::FnmaddS | FloatOp::FnmsubS => 3,
            FloatOp::FsqrtS
            | FloatOp::FcvtWS
            | FloatOp::FcvtWuS
            | FloatOp::FcvtSW
            | FloatOp::FcvtSWu
            | FloatOp::FmvXW
            | FloatOp::FmvWX
            | FloatOp::FclassS => 1,
            _ => 2,
        }
    }
}

impl fmt::Display for FloatOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

impl TryFrom<usize> for FloatOp {
    type Error = FpuError;

    fn try_from(index: usize) -> Result<Self, Self::Error> {
        Self::from_index(index).ok_or(FpuError::OpIndex(index))
    }
}

/// 按助记符解析，大小写不敏感，`.s` 后缀可省略
impl FromStr for FloatOp {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|op| {
                let m = op.mnemonic();
                m == lower || m.strip_suffix(".s") == Some(lower.as_str())
            })
            .ok_or_else(|| format!("unknown RV32F operation '{}'", s))
    }
}

/// 统一的处理函数签名
pub type FloatHandler = fn(&mut FpuCore, &FloatOperands) -> FpuResult<()>;

/// 24 项派发表
///
/// 裸机 ELF 目标上放入 `.float_dispatch_table` 段，外部加载器可以直接按下标索引。
#[cfg_attr(target_os = "none", unsafe(link_section = ".float_dispatch_table"))]
pub static FLOAT_DISPATCH_TABLE: [FloatHandler; FloatOp::COUNT] = [
    handlers::fadd_s,
    handlers::fsub_s,
    handlers::fmul_s,
    handlers::fdiv_s,
    handlers::fsqrt_s,
    handlers::fmin_s,
    handlers::fmax_s,
    handlers::fmadd_s,
    handlers::fmsub_s,
    handlers::fnmadd_s,
    handlers::fnmsub_s,
    handlers::fsgnj_s,
    handlers::fsgnjn_s,
    handlers::fsgnjx_s,
    handlers::feq_s,
    handlers::flt_s,
    handlers::fle_s,
    handlers::fcvt_w_s,
    handlers::fcvt_wu_s,
    handlers::fcvt_s_w,
    handlers::fcvt_s_wu,
    handlers::fmv_x_w,
    handlers::fmv_w_x,
    handlers::fclass_s,
];

/// 查表执行一个操作
pub fn dispatch(core: &mut FpuCore, op: FloatOp, operands: &FloatOperands) -> FpuResult<()> {
    tracing::trace!(
        op = op.mnemonic(),
        slot = op.index(),
        rs1 = operands.rs1,
        rs2 = operands.rs2,
        rs3 = operands.rs3,
        rd = operands.rd,
        rm = operands.rm,
        "dispatch"
    );
    let handler = FLOAT_DISPATCH_TABLE[op.index()];
    handler(core, operands)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slots_match_discriminants() {
        for (i, op) in FloatOp::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
            assert_eq!(FloatOp::from_index(i), Some(*op));
        }
        assert_eq!(FloatOp::from_index(24), None);
        assert_eq!(FloatOp::try_from(99usize), Err(FpuError::OpIndex(99)));
    }

    #[test]
    fn test_table_entries_are_distinct_handlers() {
        for i in 0..FloatOp::COUNT {
            for j in (i + 1)..FloatOp::COUNT {
                assert!(
                    !std::ptr::fn_addr_eq(FLOAT_DISPATCH_TABLE[i], FLOAT_DISPATCH_TABLE[j]),
                    "slots {} and {} share a handler",
                    i,
                    j
                );
            }
        }
    }

    #[test]
    fn test_parse_mnemonic() {
        assert_eq!("fadd.s".parse::<FloatOp>(), Ok(FloatOp::FaddS));
        assert_eq!("FMADD".parse::<FloatOp>(), Ok(FloatOp::FmaddS));
        assert_eq!("fcvt.wu.s".parse::<FloatOp>(), Ok(FloatOp::FcvtWuS));
        assert_eq!("fmv.w.x".parse::<FloatOp>(), Ok(FloatOp::FmvWX));
        assert!("fadd.d".parse::<FloatOp>().is_err());
    }

    #[test]
    fn test_operand_shape() {
        assert_eq!(FloatOp::FnmsubS.source_count(), 3);
        assert_eq!(FloatOp::FclassS.source_count(), 1);
        assert_eq!(FloatOp::FminS.source_count(), 2);
        assert!(FloatOp::FeqS.writes_return_reg());
        assert!(FloatOp::FmvXW.writes_return_reg());
        assert!(!FloatOp::FmvWX.writes_return_reg());
        assert!(FloatOp::FcvtSWu.reads_int_source());
    }

    #[test]
    fn test_dispatch_routes_by_slot() {
        let mut core = FpuCore::new();
        core.write_fp_f32(1, 6.0).unwrap();
        core.write_fp_f32(2, 3.0).unwrap();
        let ops = FloatOperands::new(1, 2, 3);

        dispatch(&mut core, FloatOp::FsubS, &ops).unwrap();
        assert_eq!(core.read_fp_f32(3).unwrap(), 3.0);
        dispatch(&mut core, FloatOp::FdivS, &ops).unwrap();
        assert_eq!(core.read_fp_f32(3).unwrap(), 2.0);
        dispatch(&mut core, FloatOp::FltS, &ops).unwrap();
        assert_eq!(core.read_reg(10).unwrap(), 0);
    }
}
