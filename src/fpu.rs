//! 软件浮点单元
//!
//! 本模块定义每个模拟 hart 独占的浮点上下文 `FpuCore`：
//! 内存映射寄存器文件 + 可注入的算术原语。
//! 24 个 RV32F 操作通过派发表 [`FLOAT_DISPATCH_TABLE`] 执行。
//!
//! # 示例
//!
//! ```
//! use rv32f_runtime::fpu::{FloatOp, FloatOperands, FpuCore};
//!
//! let mut core = FpuCore::new();
//! core.write_fp_f32(1, 1.5).unwrap();
//! core.write_fp_f32(2, 2.25).unwrap();
//! core.execute(FloatOp::FaddS, &FloatOperands::new(1, 2, 3)).unwrap();
//! assert_eq!(core.read_fp_f32(3).unwrap(), 3.75);
//! ```

use std::fmt;

use crate::error::FpuResult;
use crate::isa::RoundingMode;

mod builder;
pub mod classify;
mod dispatch;
mod handlers;
pub mod primitives;
mod regfile;
pub mod sqrt;


pub use builder::FpuBuilder;
pub use classify::{fclass, FloatClass};
pub use dispatch::{dispatch, FloatHandler, FloatOp, FLOAT_DISPATCH_TABLE};
pub use primitives::{ExceptionFlags, FloatPrimitives, HostFloat, SoftFloat};
pub use regfile::{
    MemoryMap, RegisterFile, FLOAT_BASE, FLOAT_STRIDE, INT_BASE, INT_STRIDE, MAX_STRIDE, NUM_REGS,
};
pub use sqrt::sqrt_approx;

/// 比较/转换/分类/fmv.x.w 的结果固定写入 a0
pub const RETURN_REG: u8 = 10;

/// 规范 NaN（Canonical NaN）
pub const CANONICAL_NAN: u32 = 0x7FC0_0000;

pub(crate) const SIGN_MASK: u32 = 0x8000_0000;
pub(crate) const MAGNITUDE_MASK: u32 = 0x7FFF_FFFF;

#[inline]
pub(crate) fn is_nan_bits(bits: u32) -> bool {
    bits & 0x7F80_0000 == 0x7F80_0000 && bits & 0x007F_FFFF != 0
}

/// 处理函数的统一参数
///
/// 不需要的字段由处理函数忽略：比较不看 `rd`，移动/分类不看 `rm`，
/// 只有融合乘加使用 `rs3`。
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct FloatOperands {
    pub rs1: u8,
    pub rs2: u8,
    pub rs3: u8,
    pub rd: u8,
    /// 舍入模式字段，接受但不生效
    pub rm: u8,
}

impl FloatOperands {
    pub const fn new(rs1: u8, rs2: u8, rd: u8) -> Self {
        Self { rs1, rs2, rs3: 0, rd, rm: 0 }
    }

    pub const fn with_rs3(mut self, rs3: u8) -> Self {
        self.rs3 = rs3;
        self
    }

    pub const fn with_rm(mut self, rm: u8) -> Self {
        self.rm = rm;
        self
    }

    pub fn rounding_mode(&self) -> RoundingMode {
        RoundingMode::from(self.rm)
    }
}

/// 单个 hart 的浮点上下文
///
/// 设计约定：
/// - 状态不依赖全局变量，多个 `FpuCore` 可以并存
/// - 处理函数只写一个目标寄存器，从不修改源寄存器
/// - 原语累积的异常标志只供外部观察，核心从不读取
pub struct FpuCore {
    pub(crate) regs: RegisterFile,
    pub(crate) prims: Box<dyn FloatPrimitives>,
}

impl FpuCore {
    /// 默认内存映射 + `SoftFloat` 原语
    pub fn new() -> Self {
        Self::with_parts(RegisterFile::with_default_map(), Box::new(SoftFloat::new()))
    }

    pub(crate) fn with_parts(regs: RegisterFile, prims: Box<dyn FloatPrimitives>) -> Self {
        Self { regs, prims }
    }

    /// 经派发表执行一个操作
    pub fn execute(&mut self, op: FloatOp, operands: &FloatOperands) -> FpuResult<()> {
        dispatch(self, op, operands)
    }

    /// 按原始派发下标执行，下标越界返回 `FpuError::OpIndex`
    pub fn execute_index(&mut self, index: usize, operands: &FloatOperands) -> FpuResult<FloatOp> {
        let op = FloatOp::try_from(index)?;
        dispatch(self, op, operands)?;
        Ok(op)
    }

    pub fn read_fp(&self, reg: u8) -> FpuResult<u32> {
        self.regs.read_float_bits(reg)
    }

    pub fn write_fp(&mut self, reg: u8, bits: u32) -> FpuResult<()> {
        self.regs.write_float_bits(reg, bits)
    }

    pub fn read_fp_f32(&self, reg: u8) -> FpuResult<f32> {
        self.regs.read_float(reg)
    }

    pub fn write_fp_f32(&mut self, reg: u8, value: f32) -> FpuResult<()> {
        self.regs.write_float(reg, value)
    }

    pub fn read_reg(&self, reg: u8) -> FpuResult<u32> {
        self.regs.read_int(reg)
    }

    pub fn write_reg(&mut self, reg: u8, value: u32) -> FpuResult<()> {
        self.regs.write_int(reg, value)
    }

    pub fn regs(&self) -> &RegisterFile {
        &self.regs
    }

    pub fn memory_map(&self) -> &MemoryMap {
        self.regs.memory_map()
    }

    /// 原语实现名称
    pub fn primitives_name(&self) -> &str {
        self.prims.name()
    }

    /// 原语累积的异常标志
    pub fn exception_flags(&self) -> ExceptionFlags {
        self.prims.exception_flags()
    }

    /// 清空寄存器文件（异常标志保持不变）
    pub fn reset_registers(&mut self) {
        self.regs.reset();
    }
}

impl Default for FpuCore {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for FpuCore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FpuCore")
            .field("memory_map", self.regs.memory_map())
            .field("primitives", &self.prims.name())
            .field("exception_flags", &self.prims.exception_flags())
            .finish()
    }
}
