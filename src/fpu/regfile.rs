//! 内存映射寄存器文件
//!
//! 32 个浮点寄存器和 32 个整数寄存器分别映射到两个互不重叠的地址窗口：
//!
//! - 浮点寄存器 `f[i]` 位于 `float_base + i * float_stride`（默认 `0xC000_0000`，步长 4）
//! - 整数寄存器 `x[i]` 位于 `int_base + i * int_stride`（默认 `0xA000_0000`，步长 16）
//!
//! 两个步长不同，整数窗口每个槽只使用低 4 字节。

use std::fmt;

use crate::error::{FpuError, FpuResult, RegisterBank};
use crate::memory::{FlatMemory, Memory};

/// 每组寄存器的数量
pub const NUM_REGS: usize = 32;

/// 浮点寄存器窗口默认基址
pub const FLOAT_BASE: u32 = 0xC000_0000;
/// 浮点寄存器步长（字节）
pub const FLOAT_STRIDE: u32 = 4;
/// 整数寄存器窗口默认基址
pub const INT_BASE: u32 = 0xA000_0000;
/// 整数寄存器步长（字节）
pub const INT_STRIDE: u32 = 16;
/// 允许的最大步长
pub const MAX_STRIDE: u32 = 4096;

/// 寄存器地址布局
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoryMap {
    pub float_base: u32,
    pub float_stride: u32,
    pub int_base: u32,
    pub int_stride: u32,
}

impl Default for MemoryMap {
    fn default() -> Self {
        Self {
            float_base: FLOAT_BASE,
            float_stride: FLOAT_STRIDE,
            int_base: INT_BASE,
            int_stride: INT_STRIDE,
        }
    }
}

impl MemoryMap {
    /// `f[index]` 的地址
    #[inline]
    pub fn float_addr(&self, index: u8) -> u32 {
        self.float_base
            .wrapping_add(u32::from(index).wrapping_mul(self.float_stride))
    }

    /// `x[index]` 的地址
    #[inline]
    pub fn int_addr(&self, index: u8) -> u32 {
        self.int_base
            .wrapping_add(u32::from(index).wrapping_mul(self.int_stride))
    }

    /// 浮点窗口字节数，截止到 `f31` 的最后一个字节
    pub fn float_window_size(&self) -> u64 {
        window_size(self.float_stride)
    }

    /// 整数窗口字节数，截止到 `x31` 的最后一个字节
    pub fn int_window_size(&self) -> u64 {
        window_size(self.int_stride)
    }

    /// 检查布局是否合法
    ///
    /// 步长必须是 4 的倍数，取值在 4 到 [`MAX_STRIDE`] 之间。
    /// 窗口不能越过 32 位地址空间，两个窗口也不能重叠。
    pub fn validate(&self) -> FpuResult<()> {
        for (name, stride) in [("float", self.float_stride), ("integer", self.int_stride)] {
            if stride < 4 || stride % 4 != 0 {
                return Err(FpuError::MemoryMap(format!(
                    "{} stride {} must be a non-zero multiple of 4",
                    name, stride
                )));
            }
            if stride > MAX_STRIDE {
                return Err(FpuError::MemoryMap(format!(
                    "{} stride {} exceeds the maximum of {}",
                    name, stride, MAX_STRIDE
                )));
            }
        }

        let float_end = u64::from(self.float_base) + self.float_window_size();
        let int_end = u64::from(self.int_base) + self.int_window_size();
        if float_end > 1 << 32 || int_end > 1 << 32 {
            return Err(FpuError::MemoryMap(
                "register window exceeds the 32-bit address space".to_string(),
            ));
        }

        let float_start = u64::from(self.float_base);
        let int_start = u64::from(self.int_base);
        if float_start < int_end && int_start < float_end {
            return Err(FpuError::MemoryMap(format!(
                "float window 0x{:08x}..0x{:09x} overlaps integer window 0x{:08x}..0x{:09x}",
                float_start, float_end, int_start, int_end
            )));
        }

        Ok(())
    }
}

#[inline]
fn window_size(stride: u32) -> u64 {
    (NUM_REGS as u64 - 1) * u64::from(stride) + 4
}

/// 每个模拟 hart 独占的寄存器文件
#[derive(Debug, Clone)]
pub struct RegisterFile {
    map: MemoryMap,
    float_window: FlatMemory,
    int_window: FlatMemory,
}

impl RegisterFile {
    /// 按给定布局创建寄存器文件，所有寄存器初始为 0
    ///
    /// 先校验布局，非法时返回 `FpuError::MemoryMap`，不分配窗口。
    pub fn new(map: MemoryMap) -> FpuResult<Self> {
        map.validate()?;
        Ok(Self::allocate(map))
    }

    /// 默认布局，总是合法
    pub fn with_default_map() -> Self {
        Self::allocate(MemoryMap::default())
    }

    fn allocate(map: MemoryMap) -> Self {
        Self {
            map,
            float_window: FlatMemory::new(map.float_window_size() as usize, map.float_base),
            int_window: FlatMemory::new(map.int_window_size() as usize, map.int_base),
        }
    }

    pub fn memory_map(&self) -> &MemoryMap {
        &self.map
    }

    #[inline]
    fn check_index(bank: RegisterBank, index: u8) -> FpuResult<()> {
        if (index as usize) < NUM_REGS {
            Ok(())
        } else {
            Err(FpuError::RegisterIndex { bank, index })
        }
    }

    /// 读取 `f[index]` 的原始位模式
    pub fn read_float_bits(&self, index: u8) -> FpuResult<u32> {
        Self::check_index(RegisterBank::Float, index)?;
        Ok(self.float_window.load32(self.map.float_addr(index))?)
    }

    /// 写入 `f[index]` 的原始位模式
    pub fn write_float_bits(&mut self, index: u8, bits: u32) -> FpuResult<()> {
        Self::check_index(RegisterBank::Float, index)?;
        self.float_window.store32(self.map.float_addr(index), bits)?;
        Ok(())
    }

    pub fn read_float(&self, index: u8) -> FpuResult<f32> {
        self.read_float_bits(index).map(f32::from_bits)
    }

    pub fn write_float(&mut self, index: u8, value: f32) -> FpuResult<()> {
        self.write_float_bits(index, value.to_bits())
    }

    /// 读取 `x[index]`
    pub fn read_int(&self, index: u8) -> FpuResult<u32> {
        Self::check_index(RegisterBank::Integer, index)?;
        Ok(self.int_window.load32(self.map.int_addr(index))?)
    }

    /// 写入 `x[index]`
    pub fn write_int(&mut self, index: u8, value: u32) -> FpuResult<()> {
        Self::check_index(RegisterBank::Integer, index)?;
        self.int_window.store32(self.map.int_addr(index), value)?;
        Ok(())
    }

    /// 所有寄存器清零
    pub fn reset(&mut self) {
        self.float_window.clear();
        self.int_window.clear();
    }
}

impl fmt::Display for RegisterFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "─── Float Registers (f0-f31) ──────────────────────────────────")?;
        for i in 0..NUM_REGS as u8 {
            let bits = self.read_float_bits(i).map_err(|_| fmt::Error)?;
            write!(f, "f{:<2}: 0x{:08x} ({:>14e})", i, bits, f32::from_bits(bits))?;
            if i % 2 == 1 {
                writeln!(f)?;
            } else {
                write!(f, "  ")?;
            }
        }
        writeln!(f, "─── Integer Registers (x0-x31) ────────────────────────────────")?;
        for i in 0..NUM_REGS as u8 {
            let value = self.read_int(i).map_err(|_| fmt::Error)?;
            write!(f, "x{:<2}: 0x{:08x}", i, value)?;
            if i % 4 == 3 {
                writeln!(f)?;
            } else {
                write!(f, "  ")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_addressing_formulas() {
        let map = MemoryMap::default();
        assert_eq!(map.float_addr(0), 0xC000_0000);
        assert_eq!(map.float_addr(1), 0xC000_0004);
        assert_eq!(map.float_addr(31), 0xC000_007C);
        assert_eq!(map.int_addr(0), 0xA000_0000);
        assert_eq!(map.int_addr(1), 0xA000_0010);
        assert_eq!(map.int_addr(10), 0xA000_00A0);
        assert_eq!(map.int_addr(31), 0xA000_01F0);
    }

    #[test]
    fn test_float_and_int_banks_are_disjoint() {
        let mut regs = RegisterFile::with_default_map();
        regs.write_float_bits(4, 0xDEAD_BEEF).unwrap();
        regs.write_int(4, 0x1234_5678).unwrap();
        assert_eq!(regs.read_float_bits(4).unwrap(), 0xDEAD_BEEF);
        assert_eq!(regs.read_int(4).unwrap(), 0x1234_5678);
        // 相邻寄存器不受影响
        assert_eq!(regs.read_float_bits(5).unwrap(), 0);
        assert_eq!(regs.read_int(5).unwrap(), 0);
    }

    #[test]
    fn test_float_view_matches_bits() {
        let mut regs = RegisterFile::with_default_map();
        regs.write_float(2, -1.5).unwrap();
        assert_eq!(regs.read_float_bits(2).unwrap(), (-1.5f32).to_bits());
        assert_eq!(regs.read_float(2).unwrap(), -1.5);
    }

    #[test]
    fn test_index_out_of_range() {
        let mut regs = RegisterFile::with_default_map();
        assert_eq!(
            regs.read_float(32),
            Err(FpuError::RegisterIndex { bank: RegisterBank::Float, index: 32 })
        );
        assert_eq!(
            regs.write_int(200, 1),
            Err(FpuError::RegisterIndex { bank: RegisterBank::Integer, index: 200 })
        );
    }

    #[test]
    fn test_validate_rejects_bad_layouts() {
        assert!(MemoryMap::default().validate().is_ok());

        let bad_stride = MemoryMap { float_stride: 6, ..MemoryMap::default() };
        assert!(matches!(bad_stride.validate(), Err(FpuError::MemoryMap(_))));

        let overlapping = MemoryMap {
            float_base: 0xA000_0100,
            ..MemoryMap::default()
        };
        assert!(matches!(overlapping.validate(), Err(FpuError::MemoryMap(_))));

        let wraps = MemoryMap {
            float_base: 0xFFFF_FFF0,
            ..MemoryMap::default()
        };
        assert!(matches!(wraps.validate(), Err(FpuError::MemoryMap(_))));
    }

    #[test]
    fn test_stride_upper_bound() {
        let at_limit = MemoryMap {
            float_base: 0x0000_0000,
            float_stride: MAX_STRIDE,
            ..MemoryMap::default()
        };
        assert!(at_limit.validate().is_ok());

        let too_wide = MemoryMap { int_stride: MAX_STRIDE + 4, ..MemoryMap::default() };
        assert!(matches!(too_wide.validate(), Err(FpuError::MemoryMap(_))));
    }

    #[test]
    fn test_new_rejects_invalid_map_without_allocating() {
        let huge = MemoryMap { float_stride: u32::MAX, ..MemoryMap::default() };
        assert!(matches!(RegisterFile::new(huge), Err(FpuError::MemoryMap(_))));

        let unaligned = MemoryMap { int_stride: 6, ..MemoryMap::default() };
        assert!(matches!(RegisterFile::new(unaligned), Err(FpuError::MemoryMap(_))));
    }

    #[test]
    fn test_window_ends_at_last_register() {
        let map = MemoryMap::default();
        assert_eq!(map.float_window_size(), 31 * 4 + 4);
        assert_eq!(map.int_window_size(), 31 * 16 + 4);

        let regs = RegisterFile::with_default_map();
        assert_eq!(regs.float_window.size(), 128);
        assert_eq!(regs.float_window.base_addr(), FLOAT_BASE);
        assert_eq!(regs.int_window.size(), 500);
        assert_eq!(regs.int_window.base_addr(), INT_BASE);
    }

    #[test]
    fn test_custom_strides() {
        let map = MemoryMap {
            float_base: 0x1000,
            float_stride: 8,
            int_base: 0x2000,
            int_stride: 4,
        };
        assert!(map.validate().is_ok());
        let mut regs = RegisterFile::new(map).unwrap();
        regs.write_float_bits(31, 7).unwrap();
        regs.write_int(31, 9).unwrap();
        assert_eq!(map.float_addr(31), 0x1000 + 31 * 8);
        assert_eq!(regs.read_float_bits(31).unwrap(), 7);
        assert_eq!(regs.read_int(31).unwrap(), 9);
    }

    #[test]
    fn test_register_dump() {
        let mut regs = RegisterFile::with_default_map();
        regs.write_float(3, 1.0).unwrap();
        regs.write_int(10, 0xCAFE).unwrap();
        let dump = regs.to_string();
        assert!(dump.contains("f3 : 0x3f800000"));
        assert!(dump.contains("x10: 0x0000cafe"));
        assert_eq!(dump.lines().count(), 2 + 16 + 8);
    }

    #[test]
    fn test_reset() {
        let mut regs = RegisterFile::with_default_map();
        regs.write_float(0, 1.0).unwrap();
        regs.write_int(10, 1).unwrap();
        regs.reset();
        assert_eq!(regs.read_float_bits(0).unwrap(), 0);
        assert_eq!(regs.read_int(10).unwrap(), 0);
    }
}
