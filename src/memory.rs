//! 寄存器窗口的内存抽象
//!
//! 浮点/整数寄存器都映射到一段地址窗口上，本模块提供
//! 32-bit 粒度的统一访问接口 `Memory` 以及线性窗口实现 `FlatMemory`。

use thiserror::Error;

/// 访存粒度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessSize {
    Word,
}

impl AccessSize {
    pub fn bytes(self) -> usize {
        match self {
            AccessSize::Word => 4,
        }
    }
}

/// 内存访问错误
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MemError {
    /// 地址未按访问粒度对齐
    #[error("Unaligned {access:?} access at 0x{addr:08x}")]
    Unaligned { addr: u32, access: AccessSize },
    /// 地址越界（未映射到当前窗口）
    #[error("Out-of-range {access:?} access at 0x{addr:08x} (region=0x{base:08x}, {size} bytes)")]
    OutOfRange { addr: u32, access: AccessSize, base: u32, size: usize },
}

pub type MemResult<T> = Result<T, MemError>;

/// 寄存器窗口的访存接口
pub trait Memory {
    /// 从指定地址读取 32 位数据（小端序）
    fn load32(&self, addr: u32) -> MemResult<u32>;

    /// 向指定地址写入 32 位数据（小端序）
    fn store32(&mut self, addr: u32, value: u32) -> MemResult<()>;
}

/// 线性地址窗口
///
/// 使用 `Vec<u8>` 存储一段从 `base_addr` 开始的地址空间。
#[derive(Debug, Clone)]
pub struct FlatMemory {
    data: Vec<u8>,
    base_addr: u32,
}

impl FlatMemory {
    /// 创建一个指定大小的窗口
    ///
    /// # 示例
    ///
    /// ```
    /// use rv32f_runtime::memory::{FlatMemory, Memory};
    ///
    /// let mut window = FlatMemory::new(128, 0xC000_0000);
    /// window.store32(0xC000_0004, 0x3F80_0000).unwrap();
    /// assert_eq!(window.load32(0xC000_0004).unwrap(), 0x3F80_0000);
    /// ```
    pub fn new(size: usize, base_addr: u32) -> Self {
        FlatMemory {
            data: vec![0; size],
            base_addr,
        }
    }

    pub fn base_addr(&self) -> u32 {
        self.base_addr
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// 窗口是否覆盖 `addr`
    pub fn contains(&self, addr: u32) -> bool {
        addr.checked_sub(self.base_addr)
            .is_some_and(|offset| (offset as usize) < self.data.len())
    }

    fn out_of_range(&self, addr: u32, access: AccessSize) -> MemError {
        MemError::OutOfRange {
            addr,
            access,
            base: self.base_addr,
            size: self.data.len(),
        }
    }

    fn word_index(&self, addr: u32) -> MemResult<usize> {
        let access = AccessSize::Word;
        if addr % 4 != 0 {
            return Err(MemError::Unaligned { addr, access });
        }
        let relative = addr
            .checked_sub(self.base_addr)
            .ok_or_else(|| self.out_of_range(addr, access))? as usize;
        let end = relative
            .checked_add(access.bytes())
            .ok_or_else(|| self.out_of_range(addr, access))?;
        if end > self.data.len() {
            return Err(self.out_of_range(addr, access));
        }
        Ok(relative)
    }

    /// 将整个窗口清零
    pub fn clear(&mut self) {
        self.data.fill(0);
    }
}

impl Memory for FlatMemory {
    fn load32(&self, addr: u32) -> MemResult<u32> {
        let idx = self.word_index(addr)?;
        Ok(u32::from_le_bytes([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ]))
    }

    fn store32(&mut self, addr: u32, value: u32) -> MemResult<()> {
        let idx = self.word_index(addr)?;
        self.data[idx..idx + 4].copy_from_slice(&value.to_le_bytes());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_little_endian_layout() {
        let mut mem = FlatMemory::new(64, 0xA000_0000);
        mem.store32(0xA000_0010, 0x78AB_CDEF).unwrap();
        assert_eq!(mem.load32(0xA000_0010).unwrap(), 0x78AB_CDEF);
        assert_eq!(mem.data[0x10], 0xEF);
        assert_eq!(mem.data[0x13], 0x78);
    }

    #[test]
    fn test_unaligned_word() {
        let mem = FlatMemory::new(64, 0);
        let err = mem.load32(2).unwrap_err();
        assert!(matches!(err, MemError::Unaligned { addr: 2, .. }));
    }

    #[test]
    fn test_below_and_past_window() {
        let mut mem = FlatMemory::new(16, 0x1000);
        assert!(matches!(mem.load32(0x0FFC), Err(MemError::OutOfRange { .. })));
        assert!(matches!(mem.store32(0x1010, 1), Err(MemError::OutOfRange { .. })));
        assert!(mem.store32(0x100C, 1).is_ok());
    }

    #[test]
    fn test_contains_and_clear() {
        let mut mem = FlatMemory::new(16, 0x1000);
        assert!(mem.contains(0x1000));
        assert!(mem.contains(0x100F));
        assert!(!mem.contains(0x1010));
        assert!(!mem.contains(0x0FFF));

        mem.store32(0x1004, 0xFFFF_FFFF).unwrap();
        mem.clear();
        assert_eq!(mem.load32(0x1004).unwrap(), 0);
    }
}
