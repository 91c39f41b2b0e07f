//! fclass.s 分类

use super::{MAGNITUDE_MASK, SIGN_MASK};

/// RISC-V 浮点类别，判别值即 fclass 结果中的位号
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FloatClass {
    NegInfinity = 0,
    NegNormal = 1,
    NegSubnormal = 2,
    NegZero = 3,
    PosZero = 4,
    PosSubnormal = 5,
    PosNormal = 6,
    PosInfinity = 7,
    SignalingNan = 8,
    QuietNan = 9,
}

impl FloatClass {
    /// 按符号/指数/尾数字段对位模式分类
    pub fn of(bits: u32) -> Self {
        let negative = bits & SIGN_MASK != 0;
        let exp = (bits >> 23) & 0xFF;
        let frac = bits & 0x007F_FFFF;

        match (exp, frac) {
            (0xFF, 0) if negative => FloatClass::NegInfinity,
            (0xFF, 0) => FloatClass::PosInfinity,
            // 尾数最高位区分 quiet / signaling
            (0xFF, f) if f & 0x0040_0000 != 0 => FloatClass::QuietNan,
            (0xFF, _) => FloatClass::SignalingNan,
            (0, 0) if negative => FloatClass::NegZero,
            (0, 0) => FloatClass::PosZero,
            (0, _) if negative => FloatClass::NegSubnormal,
            (0, _) => FloatClass::PosSubnormal,
            _ if negative => FloatClass::NegNormal,
            _ => FloatClass::PosNormal,
        }
    }

    /// one-hot 掩码
    pub fn mask(self) -> u32 {
        1 << self as u32
    }

    pub fn is_nan(self) -> bool {
        matches!(self, FloatClass::SignalingNan | FloatClass::QuietNan)
    }
}

/// fclass.s 的 10 位 one-hot 结果
#[inline]
pub fn fclass(bits: u32) -> u32 {
    FloatClass::of(bits).mask()
}

/// 去掉符号位后是否为 0
#[inline]
pub fn is_zero_bits(bits: u32) -> bool {
    bits & MAGNITUDE_MASK == 0
}
