//! 单精度算术原语
//!
//! 处理函数只通过 [`FloatPrimitives`] 访问 IEEE-754 运算，任何符合
//! round-to-nearest-even 语义的实现都可以注入：
//!
//! - [`SoftFloat`]: 基于 `simple-soft-float`，累积异常标志
//! - [`HostFloat`]: 直接使用宿主 `f32` 运算，不记录标志

use std::cmp::Ordering;
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use simple_soft_float::{F32, FPState, RoundingMode, StatusFlags};

use super::{is_nan_bits, SIGN_MASK};

/// 浮点异常标志（fflags 布局）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct ExceptionFlags(u32);

impl ExceptionFlags {
    /// 不精确
    pub const NX: Self = Self(1 << 0);
    /// 下溢
    pub const UF: Self = Self(1 << 1);
    /// 上溢
    pub const OF: Self = Self(1 << 2);
    /// 除以零
    pub const DZ: Self = Self(1 << 3);
    /// 无效操作
    pub const NV: Self = Self(1 << 4);

    pub const fn empty() -> Self {
        Self(0)
    }

    pub const fn bits(self) -> u32 {
        self.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }
}

impl BitOr for ExceptionFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExceptionFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<StatusFlags> for ExceptionFlags {
    fn from(flags: StatusFlags) -> Self {
        let mut bits = Self::empty();
        if flags.contains(StatusFlags::INVALID_OPERATION) {
            bits |= Self::NV;
        }
        if flags.contains(StatusFlags::DIVISION_BY_ZERO) {
            bits |= Self::DZ;
        }
        if flags.contains(StatusFlags::OVERFLOW) {
            bits |= Self::OF;
        }
        if flags.contains(StatusFlags::UNDERFLOW) {
            bits |= Self::UF;
        }
        if flags.contains(StatusFlags::INEXACT) {
            bits |= Self::NX;
        }
        bits
    }
}

impl fmt::Display for ExceptionFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names = [
            (Self::NV, "NV"),
            (Self::DZ, "DZ"),
            (Self::OF, "OF"),
            (Self::UF, "UF"),
            (Self::NX, "NX"),
        ];
        let set: Vec<&str> = names
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| *name)
            .collect();
        if set.is_empty() {
            write!(f, "-")
        } else {
            write!(f, "{}", set.join("|"))
        }
    }
}

/// 单精度算术原语
///
/// 比较返回 `None` 表示无序（至少一个操作数为 NaN）。
/// 浮点转整数按截断处理，越界或 NaN 时饱和：
/// NaN 与正溢出取最大值，负溢出取最小值。
///
/// 要求 `Send`：每个 hart 的 `FpuCore` 可以移到独立线程上运行。
pub trait FloatPrimitives: Send {
    /// 实现名称
    fn name(&self) -> &str;

    fn add(&mut self, a: f32, b: f32) -> f32;
    fn sub(&mut self, a: f32, b: f32) -> f32;
    fn mul(&mut self, a: f32, b: f32) -> f32;
    fn div(&mut self, a: f32, b: f32) -> f32;

    /// 安静比较，只有 signaling NaN 会触发无效操作
    fn compare_quiet(&mut self, a: f32, b: f32) -> Option<Ordering>;
    /// 信号比较，任何 NaN 都会触发无效操作
    fn compare_signaling(&mut self, a: f32, b: f32) -> Option<Ordering>;

    fn f32_to_i32(&mut self, a: f32) -> i32;
    fn f32_to_u32(&mut self, a: f32) -> u32;
    fn i32_to_f32(&mut self, a: i32) -> f32;
    fn u32_to_f32(&mut self, a: u32) -> f32;

    /// 累积的异常标志
    fn exception_flags(&self) -> ExceptionFlags {
        ExceptionFlags::empty()
    }

    fn is_equal(&mut self, a: f32, b: f32) -> bool {
        self.compare_quiet(a, b) == Some(Ordering::Equal)
    }

    fn is_less(&mut self, a: f32, b: f32) -> bool {
        self.compare_signaling(a, b) == Some(Ordering::Less)
    }

    fn is_less_or_equal(&mut self, a: f32, b: f32) -> bool {
        matches!(
            self.compare_signaling(a, b),
            Some(Ordering::Less | Ordering::Equal)
        )
    }
}

#[inline]
fn saturate_i32(bits: u32) -> i32 {
    if is_nan_bits(bits) || bits & SIGN_MASK == 0 {
        i32::MAX
    } else {
        i32::MIN
    }
}

#[inline]
fn saturate_u32(bits: u32) -> u32 {
    if is_nan_bits(bits) || bits & SIGN_MASK == 0 {
        u32::MAX
    } else {
        0
    }
}

/// 基于 `simple-soft-float` 的实现
///
/// 运算固定使用 round-to-nearest-even，转整数使用向零舍入。
/// 每次运算产生的异常标志都会累积到 `flags`，核心从不读取或清除它。
#[derive(Debug, Default, Clone)]
pub struct SoftFloat {
    flags: ExceptionFlags,
}

impl SoftFloat {
    pub fn new() -> Self {
        Self::default()
    }

    fn run<T>(&mut self, op: impl FnOnce(&mut FPState) -> T) -> T {
        let mut fp_state = FPState::default();
        let result = op(&mut fp_state);
        self.flags |= ExceptionFlags::from(fp_state.status_flags);
        result
    }

    fn arith(&mut self, a: f32, b: f32, op: impl FnOnce(&F32, &F32, &mut FPState) -> F32) -> f32 {
        let a = F32::from_bits(a.to_bits());
        let b = F32::from_bits(b.to_bits());
        let result = self.run(|st| op(&a, &b, st));
        f32::from_bits(result.into_bits())
    }
}

const RNE: RoundingMode = RoundingMode::TiesToEven;
const RTZ: RoundingMode = RoundingMode::TowardZero;

impl FloatPrimitives for SoftFloat {
    fn name(&self) -> &str {
        "simple-soft-float"
    }

    fn add(&mut self, a: f32, b: f32) -> f32 {
        self.arith(a, b, |a, b, st| a.add(b, Some(RNE), Some(st)))
    }

    fn sub(&mut self, a: f32, b: f32) -> f32 {
        self.arith(a, b, |a, b, st| a.sub(b, Some(RNE), Some(st)))
    }

    fn mul(&mut self, a: f32, b: f32) -> f32 {
        self.arith(a, b, |a, b, st| a.mul(b, Some(RNE), Some(st)))
    }

    fn div(&mut self, a: f32, b: f32) -> f32 {
        self.arith(a, b, |a, b, st| a.div(b, Some(RNE), Some(st)))
    }

    fn compare_quiet(&mut self, a: f32, b: f32) -> Option<Ordering> {
        let a = F32::from_bits(a.to_bits());
        let b = F32::from_bits(b.to_bits());
        self.run(|st| a.compare_quiet(&b, Some(st)))
    }

    fn compare_signaling(&mut self, a: f32, b: f32) -> Option<Ordering> {
        let a = F32::from_bits(a.to_bits());
        let b = F32::from_bits(b.to_bits());
        self.run(|st| a.compare_signaling(&b, Some(st)))
    }

    fn f32_to_i32(&mut self, a: f32) -> i32 {
        let bits = a.to_bits();
        let value = F32::from_bits(bits);
        self.run(|st| value.to_i32(true, Some(RTZ), Some(st)))
            .unwrap_or_else(|| saturate_i32(bits))
    }

    fn f32_to_u32(&mut self, a: f32) -> u32 {
        let bits = a.to_bits();
        let value = F32::from_bits(bits);
        self.run(|st| value.to_u32(true, Some(RTZ), Some(st)))
            .unwrap_or_else(|| saturate_u32(bits))
    }

    fn i32_to_f32(&mut self, a: i32) -> f32 {
        let result = self.run(|st| F32::from_i32(a, Some(RNE), Some(st)));
        f32::from_bits(result.into_bits())
    }

    fn u32_to_f32(&mut self, a: u32) -> f32 {
        let result = self.run(|st| F32::from_u32(a, Some(RNE), Some(st)));
        f32::from_bits(result.into_bits())
    }

    fn exception_flags(&self) -> ExceptionFlags {
        self.flags
    }
}

/// 宿主 `f32` 实现
#[derive(Debug, Default, Clone, Copy)]
pub struct HostFloat;

impl FloatPrimitives for HostFloat {
    fn name(&self) -> &str {
        "host-f32"
    }

    fn add(&mut self, a: f32, b: f32) -> f32 {
        a + b
    }

    fn sub(&mut self, a: f32, b: f32) -> f32 {
        a - b
    }

    fn mul(&mut self, a: f32, b: f32) -> f32 {
        a * b
    }

    fn div(&mut self, a: f32, b: f32) -> f32 {
        a / b
    }

    fn compare_quiet(&mut self, a: f32, b: f32) -> Option<Ordering> {
        a.partial_cmp(&b)
    }

    fn compare_signaling(&mut self, a: f32, b: f32) -> Option<Ordering> {
        a.partial_cmp(&b)
    }

    fn f32_to_i32(&mut self, a: f32) -> i32 {
        // `as` 把 NaN 转成 0，这里统一成饱和到最大值
        if a.is_nan() { i32::MAX } else { a as i32 }
    }

    fn f32_to_u32(&mut self, a: f32) -> u32 {
        if a.is_nan() { u32::MAX } else { a as u32 }
    }

    fn i32_to_f32(&mut self, a: i32) -> f32 {
        a as f32
    }

    fn u32_to_f32(&mut self, a: u32) -> f32 {
        a as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn backends() -> Vec<Box<dyn FloatPrimitives>> {
        vec![Box::new(SoftFloat::new()), Box::new(HostFloat)]
    }

    #[test]
    fn test_basic_arithmetic() {
        for mut p in backends() {
            assert_eq!(p.add(1.0, 2.0), 3.0, "{}", p.name());
            assert_eq!(p.sub(5.0, 3.0), 2.0, "{}", p.name());
            assert_eq!(p.mul(3.0, 4.0), 12.0, "{}", p.name());
            assert_eq!(p.div(10.0, 4.0), 2.5, "{}", p.name());
        }
    }

    #[test]
    fn test_round_to_nearest_even() {
        // 1 + 2^-24 正好落在两个可表示值中间，舍入到偶数 1.0
        let half_ulp = f32::from_bits(0x3380_0000);
        for mut p in backends() {
            assert_eq!(p.add(1.0, half_ulp).to_bits(), 0x3F80_0000, "{}", p.name());
        }
    }

    #[test]
    fn test_compare_unordered() {
        for mut p in backends() {
            assert_eq!(p.compare_quiet(f32::NAN, 1.0), None);
            assert_eq!(p.compare_signaling(1.0, f32::NAN), None);
            assert!(!p.is_equal(f32::NAN, f32::NAN));
            assert!(!p.is_less(f32::NAN, 1.0));
            assert!(!p.is_less_or_equal(1.0, f32::NAN));
            assert!(p.is_less_or_equal(1.0, 1.0));
            assert!(p.is_equal(0.0, -0.0));
        }
    }

    #[test]
    fn test_conversions_truncate_and_saturate() {
        for mut p in backends() {
            assert_eq!(p.f32_to_i32(42.7), 42, "{}", p.name());
            assert_eq!(p.f32_to_i32(-42.7), -42, "{}", p.name());
            assert_eq!(p.f32_to_i32(3.0e10), i32::MAX, "{}", p.name());
            assert_eq!(p.f32_to_i32(-3.0e10), i32::MIN, "{}", p.name());
            assert_eq!(p.f32_to_i32(f32::NAN), i32::MAX, "{}", p.name());
            assert_eq!(p.f32_to_i32(f32::NEG_INFINITY), i32::MIN, "{}", p.name());

            assert_eq!(p.f32_to_u32(7.9), 7, "{}", p.name());
            assert_eq!(p.f32_to_u32(-5.0), 0, "{}", p.name());
            assert_eq!(p.f32_to_u32(1.0e10), u32::MAX, "{}", p.name());
            assert_eq!(p.f32_to_u32(f32::NAN), u32::MAX, "{}", p.name());

            assert_eq!(p.i32_to_f32(-7), -7.0, "{}", p.name());
            assert_eq!(p.u32_to_f32(u32::MAX), 4_294_967_296.0, "{}", p.name());
        }
    }

    #[test]
    fn test_soft_float_accumulates_flags() {
        let mut p = SoftFloat::new();
        assert!(p.exception_flags().is_empty());

        let _ = p.div(1.0, 0.0);
        assert!(p.exception_flags().contains(ExceptionFlags::DZ));

        let _ = p.div(1.0, 3.0);
        let flags = p.exception_flags();
        assert!(flags.contains(ExceptionFlags::DZ));
        assert!(flags.contains(ExceptionFlags::NX));

        let _ = p.compare_signaling(f32::NAN, 1.0);
        assert!(p.exception_flags().contains(ExceptionFlags::NV));
    }

    #[test]
    fn test_host_float_has_no_flags() {
        let mut p = HostFloat;
        let _ = p.div(1.0, 0.0);
        assert!(p.exception_flags().is_empty());
    }

    #[test]
    fn test_flags_display() {
        assert_eq!(ExceptionFlags::empty().to_string(), "-");
        assert_eq!((ExceptionFlags::NV | ExceptionFlags::NX).to_string(), "NV|NX");
    }
}
