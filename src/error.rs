//! 错误类型

use std::fmt;

use thiserror::Error;

use crate::memory::MemError;

/// 寄存器组
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegisterBank {
    Float,
    Integer,
}

impl fmt::Display for RegisterBank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RegisterBank::Float => write!(f, "float"),
            RegisterBank::Integer => write!(f, "integer"),
        }
    }
}

/// 软件浮点单元的错误
///
/// NaN 不是错误；这里只有解码层违反前置条件（寄存器号/操作号越界）
/// 以及内存映射配置错误。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FpuError {
    /// 寄存器号不在 0..32
    #[error("{bank} register index {index} out of range (0..32)")]
    RegisterIndex { bank: RegisterBank, index: u8 },
    /// 派发表下标不在 0..24
    #[error("dispatch index {0} out of range (0..24)")]
    OpIndex(usize),
    /// 寄存器窗口访问失败
    #[error("register window access failed: {0}")]
    Memory(#[from] MemError),
    /// 内存映射配置非法
    #[error("invalid memory map: {0}")]
    MemoryMap(String),
}

pub type FpuResult<T> = Result<T, FpuError>;

/// 运行时（陷入层/ELF 检查）的错误
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("ELF parse error: {0}")]
    ElfParse(String),
    #[error(transparent)]
    Fpu(#[from] FpuError),
}

pub type RuntimeResult<T> = Result<T, RuntimeError>;
