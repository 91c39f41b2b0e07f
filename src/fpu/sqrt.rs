//! Newton-Raphson 平方根近似
//!
//! 只使用原语中的 add/div/mul，迭代次数固定为 10。
//! 结果不是正确舍入的平方根，对大数或很小的数收敛不充分。

use super::primitives::FloatPrimitives;
use super::classify::is_zero_bits;
use super::{is_nan_bits, SIGN_MASK};

/// 固定迭代次数
pub const SQRT_ITERATIONS: usize = 10;

/// 平方根近似
///
/// - 0（含 -0）和 NaN 原样返回
/// - 负数返回原语计算的 `0/0`
/// - 其余从 `guess = x` 开始迭代 `guess = (guess + x / guess) * 0.5`
///
/// `+inf` 在第一次迭代时得到 `inf / inf`，因此结果为 NaN。
pub fn sqrt_approx(prims: &mut dyn FloatPrimitives, x: f32) -> f32 {
    let bits = x.to_bits();
    if is_zero_bits(bits) || is_nan_bits(bits) {
        return x;
    }
    if bits & SIGN_MASK != 0 {
        return prims.div(0.0, 0.0);
    }

    let mut guess = x;
    for _ in 0..SQRT_ITERATIONS {
        let quotient = prims.div(x, guess);
        let sum = prims.add(guess, quotient);
        guess = prims.mul(sum, 0.5);
    }
    guess
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpu::primitives::{HostFloat, SoftFloat};

    #[test]
    fn test_converges_for_representative_inputs() {
        let mut p = SoftFloat::new();
        for (x, expected) in [(4.0f32, 2.0f32), (16.0, 4.0), (100.0, 10.0), (0.25, 0.5), (2.0, std::f32::consts::SQRT_2)] {
            let r = sqrt_approx(&mut p, x);
            assert!((r - expected).abs() < 1e-5, "sqrt({}) = {}", x, r);
        }
    }

    #[test]
    fn test_zero_is_returned_unchanged() {
        let mut p = SoftFloat::new();
        assert_eq!(sqrt_approx(&mut p, 0.0).to_bits(), 0.0f32.to_bits());
        assert_eq!(sqrt_approx(&mut p, -0.0).to_bits(), (-0.0f32).to_bits());
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn test_negative_yields_nan() {
        let mut p = SoftFloat::new();
        let r = sqrt_approx(&mut p, -1.0);
        assert!(r != r);
        assert!(sqrt_approx(&mut p, f32::NEG_INFINITY).is_nan());
    }

    #[test]
    fn test_nan_passes_through_with_payload() {
        let mut p = HostFloat;
        let snan = f32::from_bits(0x7F80_0001);
        assert_eq!(sqrt_approx(&mut p, snan).to_bits(), 0x7F80_0001);
    }

    #[test]
    fn test_positive_infinity_is_not_a_fixed_point() {
        let mut p = SoftFloat::new();
        assert!(sqrt_approx(&mut p, f32::INFINITY).is_nan());
    }
}
