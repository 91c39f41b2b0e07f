//! RV32F operation handlers
//!
//! 每个函数对应一个 RV32F 操作：从寄存器文件读源操作数，
//! 通过原语计算，写回恰好一个目标寄存器。舍入模式字段一律忽略。

use std::cmp::Ordering;

use super::classify::fclass;
use super::primitives::FloatPrimitives;
use super::sqrt::sqrt_approx;
use super::{is_nan_bits, FloatOperands, FpuCore, CANONICAL_NAN, MAGNITUDE_MASK, RETURN_REG, SIGN_MASK};
use crate::error::FpuResult;

#[inline]
fn negate(value: f32) -> f32 {
    f32::from_bits(value.to_bits() ^ SIGN_MASK)
}

#[inline]
fn bool_to_reg(value: bool) -> u32 {
    if value { 1 } else { 0 }
}

/// f[rd] = op(f[rs1], f[rs2])
fn binary(
    core: &mut FpuCore,
    ops: &FloatOperands,
    op: impl FnOnce(&mut dyn FloatPrimitives, f32, f32) -> f32,
) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let b = core.regs.read_float(ops.rs2)?;
    let result = op(&mut *core.prims, a, b);
    core.regs.write_float(ops.rd, result)
}

/// f[rd] = op(f[rs1], f[rs2], f[rs3])
fn ternary(
    core: &mut FpuCore,
    ops: &FloatOperands,
    op: impl FnOnce(&mut dyn FloatPrimitives, f32, f32, f32) -> f32,
) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let b = core.regs.read_float(ops.rs2)?;
    let c = core.regs.read_float(ops.rs3)?;
    let result = op(&mut *core.prims, a, b, c);
    core.regs.write_float(ops.rd, result)
}

/// f[rd] = op(bits(f[rs1]), bits(f[rs2]))，只做位运算
fn bitwise(core: &mut FpuCore, ops: &FloatOperands, op: impl FnOnce(u32, u32) -> u32) -> FpuResult<()> {
    let a = core.regs.read_float_bits(ops.rs1)?;
    let b = core.regs.read_float_bits(ops.rs2)?;
    core.regs.write_float_bits(ops.rd, op(a, b))
}

/// x[a0] = op(f[rs1], f[rs2])
fn compare(
    core: &mut FpuCore,
    ops: &FloatOperands,
    op: impl FnOnce(&mut dyn FloatPrimitives, f32, f32) -> bool,
) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let b = core.regs.read_float(ops.rs2)?;
    let result = op(&mut *core.prims, a, b);
    core.regs.write_int(RETURN_REG, bool_to_reg(result))
}

/// NaN 规则：两个都是 NaN 写规范 NaN，只有一个是 NaN 写另一个，
/// 否则由原语比较选择：比较结果等于 `pick_first_when` 时选 rs1，否则选 rs2。
fn min_max(core: &mut FpuCore, ops: &FloatOperands, pick_first_when: Ordering) -> FpuResult<()> {
    let a_bits = core.regs.read_float_bits(ops.rs1)?;
    let b_bits = core.regs.read_float_bits(ops.rs2)?;

    let result = match (is_nan_bits(a_bits), is_nan_bits(b_bits)) {
        (true, true) => CANONICAL_NAN,
        (true, false) => b_bits,
        (false, true) => a_bits,
        (false, false) => {
            let ord = core
                .prims
                .compare_signaling(f32::from_bits(a_bits), f32::from_bits(b_bits));
            if ord == Some(pick_first_when) { a_bits } else { b_bits }
        }
    };

    core.regs.write_float_bits(ops.rd, result)
}

// ========== Arithmetic ==========

pub fn fadd_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    binary(core, ops, |p, a, b| p.add(a, b))
}

pub fn fsub_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    binary(core, ops, |p, a, b| p.sub(a, b))
}

pub fn fmul_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    binary(core, ops, |p, a, b| p.mul(a, b))
}

pub fn fdiv_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    binary(core, ops, |p, a, b| p.div(a, b))
}

pub fn fsqrt_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let result = sqrt_approx(&mut *core.prims, a);
    core.regs.write_float(ops.rd, result)
}

// ========== Min/Max ==========

pub fn fmin_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    min_max(core, ops, Ordering::Less)
}

pub fn fmax_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    min_max(core, ops, Ordering::Greater)
}

// ========== Fused Multiply-Add ==========
// 乘积先单独舍入，再与加数运算，两次舍入

pub fn fmadd_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // a * b + c
    ternary(core, ops, |p, a, b, c| {
        let product = p.mul(a, b);
        p.add(product, c)
    })
}

pub fn fmsub_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // a * b - c
    ternary(core, ops, |p, a, b, c| {
        let product = p.mul(a, b);
        p.sub(product, c)
    })
}

pub fn fnmadd_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // -(a * b) - c
    ternary(core, ops, |p, a, b, c| {
        let product = p.mul(a, b);
        p.sub(negate(product), c)
    })
}

pub fn fnmsub_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // -(a * b) + c
    ternary(core, ops, |p, a, b, c| {
        let product = p.mul(a, b);
        p.add(negate(product), c)
    })
}

// ========== Sign Injection ==========

pub fn fsgnj_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // rs1 的绝对值，rs2 的符号
    bitwise(core, ops, |a, b| (a & MAGNITUDE_MASK) | (b & SIGN_MASK))
}

pub fn fsgnjn_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // rs1 的绝对值，rs2 符号取反
    bitwise(core, ops, |a, b| (a & MAGNITUDE_MASK) | (!b & SIGN_MASK))
}

pub fn fsgnjx_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    // rs1 的值，符号位异或
    bitwise(core, ops, |a, b| a ^ (b & SIGN_MASK))
}

// ========== Compare ==========

pub fn feq_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    compare(core, ops, |p, a, b| p.is_equal(a, b))
}

pub fn flt_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    compare(core, ops, |p, a, b| p.is_less(a, b))
}

pub fn fle_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    compare(core, ops, |p, a, b| p.is_less_or_equal(a, b))
}

// ========== Conversion ==========

pub fn fcvt_w_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let result = core.prims.f32_to_i32(a);
    core.regs.write_int(RETURN_REG, result as u32)
}

pub fn fcvt_wu_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let a = core.regs.read_float(ops.rs1)?;
    let result = core.prims.f32_to_u32(a);
    core.regs.write_int(RETURN_REG, result)
}

pub fn fcvt_s_w(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let a = core.regs.read_int(ops.rs1)? as i32;
    let result = core.prims.i32_to_f32(a);
    core.regs.write_float(ops.rd, result)
}

pub fn fcvt_s_wu(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let a = core.regs.read_int(ops.rs1)?;
    let result = core.prims.u32_to_f32(a);
    core.regs.write_float(ops.rd, result)
}

// ========== Move ==========
// 只搬运位模式，NaN 载荷和 -0 保持不变

pub fn fmv_x_w(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let bits = core.regs.read_float_bits(ops.rs1)?;
    core.regs.write_int(RETURN_REG, bits)
}

pub fn fmv_w_x(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let bits = core.regs.read_int(ops.rs1)?;
    core.regs.write_float_bits(ops.rd, bits)
}

// ========== Classification ==========

pub fn fclass_s(core: &mut FpuCore, ops: &FloatOperands) -> FpuResult<()> {
    let bits = core.regs.read_float_bits(ops.rs1)?;
    core.regs.write_int(RETURN_REG, fclass(bits))
}
