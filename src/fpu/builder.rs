//! FPU 构建器
//!
//! 统一配置寄存器文件的内存映射和算术原语实现。
//!
//! # 示例
//!
//! ```
//! use rv32f_runtime::fpu::{FpuBuilder, MemoryMap};
//!
//! let core = FpuBuilder::new()
//!     .with_memory_map(MemoryMap::default())
//!     .with_host_primitives()
//!     .build()
//!     .expect("默认映射合法");
//! assert_eq!(core.primitives_name(), "host-f32");
//! ```

use super::primitives::{FloatPrimitives, HostFloat, SoftFloat};
use super::regfile::{MemoryMap, RegisterFile};
use super::FpuCore;
use crate::error::FpuResult;

/// FPU 构建器
///
/// 未指定原语时使用 `SoftFloat`。
pub struct FpuBuilder {
    map: MemoryMap,
    prims: Option<Box<dyn FloatPrimitives>>,
}

impl FpuBuilder {
    pub fn new() -> Self {
        Self {
            map: MemoryMap::default(),
            prims: None,
        }
    }

    /// 自定义寄存器窗口的基址与步长
    pub fn with_memory_map(mut self, map: MemoryMap) -> Self {
        self.map = map;
        self
    }

    /// 注入任意原语实现
    pub fn with_primitives(mut self, prims: Box<dyn FloatPrimitives>) -> Self {
        self.prims = Some(prims);
        self
    }

    /// 使用宿主 f32 运算
    pub fn with_host_primitives(self) -> Self {
        self.with_primitives(Box::new(HostFloat))
    }

    /// 使用 IEEE-754 软浮点
    pub fn with_soft_primitives(self) -> Self {
        self.with_primitives(Box::new(SoftFloat::new()))
    }

    /// 构建 FPU 核心
    ///
    /// 内存映射非法（步长不对齐、窗口越界或两组寄存器重叠）时返回 `Err`
    pub fn build(self) -> FpuResult<FpuCore> {
        let regs = RegisterFile::new(self.map)?;

        let prims = self
            .prims
            .unwrap_or_else(|| Box::new(SoftFloat::new()));
        tracing::debug!(
            float_base = format_args!("0x{:08x}", self.map.float_base),
            int_base = format_args!("0x{:08x}", self.map.int_base),
            primitives = prims.name(),
            "fpu core built"
        );

        Ok(FpuCore::with_parts(regs, prims))
    }
}

impl Default for FpuBuilder {
    fn default() -> Self {
        Self::new()
    }
}
