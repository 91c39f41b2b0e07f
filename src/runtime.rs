//! 陷入层运行时
//!
//! 目标核心只实现整数指令集，遇到 F 扩展计算指令时陷入到这里：
//! 解码指令字，经派发表执行，并统计每种操作被模拟的次数。
//!
//! # 示例
//!
//! ```
//! use rv32f_runtime::fpu::FloatOp;
//! use rv32f_runtime::runtime::{FloatRuntime, RuntimeConfig};
//!
//! let mut rt = FloatRuntime::from_config(RuntimeConfig::default()).unwrap();
//! rt.core_mut().write_fp_f32(2, 1.5).unwrap();
//! rt.core_mut().write_fp_f32(3, 2.0).unwrap();
//!
//! // fadd.s f1, f2, f3
//! assert_eq!(rt.trap(0x003100D3).unwrap(), Some(FloatOp::FaddS));
//! assert_eq!(rt.core().read_fp_f32(1).unwrap(), 3.5);
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::RuntimeResult;
use crate::fpu::{FloatOp, FpuBuilder, FpuCore, MemoryMap};
use crate::isa::{self, DecodedFloat};

/// 算术原语后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PrimitiveBackend {
    /// simple-soft-float，累积异常标志
    #[default]
    Soft,
    /// 宿主 f32
    Host,
}

impl FromStr for PrimitiveBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "soft" | "softfloat" => Ok(PrimitiveBackend::Soft),
            "host" | "native" => Ok(PrimitiveBackend::Host),
            other => Err(format!("unknown backend '{}', expected soft or host", other)),
        }
    }
}

impl fmt::Display for PrimitiveBackend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PrimitiveBackend::Soft => write!(f, "soft"),
            PrimitiveBackend::Host => write!(f, "host"),
        }
    }
}

/// 运行时配置
#[derive(Debug, Clone, Default)]
pub struct RuntimeConfig {
    /// 寄存器窗口布局
    pub memory_map: MemoryMap,
    /// 算术原语后端
    pub backend: PrimitiveBackend,
    /// 是否输出每次陷入的详细信息
    pub verbose: bool,
}

impl RuntimeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_memory_map(mut self, map: MemoryMap) -> Self {
        self.memory_map = map;
        self
    }

    pub fn with_backend(mut self, backend: PrimitiveBackend) -> Self {
        self.backend = backend;
        self
    }

    /// 启用详细输出
    pub fn with_verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }
}

/// 每种操作的模拟次数
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmulationStats {
    per_op: [u64; FloatOp::COUNT],
    /// 不属于可陷入浮点计算指令、原样放行的指令字
    pub not_trapped: u64,
}

impl EmulationStats {
    pub fn record(&mut self, op: FloatOp) {
        self.per_op[op.index()] += 1;
    }

    pub fn count(&self, op: FloatOp) -> u64 {
        self.per_op[op.index()]
    }

    /// 已模拟的指令总数
    pub fn total(&self) -> u64 {
        self.per_op.iter().sum()
    }

    /// 次数非零的操作
    pub fn iter(&self) -> impl Iterator<Item = (FloatOp, u64)> + '_ {
        FloatOp::ALL
            .iter()
            .map(|op| (*op, self.per_op[op.index()]))
            .filter(|(_, n)| *n > 0)
    }
}

impl fmt::Display for EmulationStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "emulated: {}, not trapped: {}", self.total(), self.not_trapped)?;
        for (op, n) in self.iter() {
            writeln!(f, "  {:<10} {}", op.mnemonic(), n)?;
        }
        Ok(())
    }
}

/// 单个 hart 的浮点陷入运行时
#[derive(Debug)]
pub struct FloatRuntime {
    core: FpuCore,
    config: RuntimeConfig,
    stats: EmulationStats,
}

impl FloatRuntime {
    /// 从配置创建运行时
    pub fn from_config(config: RuntimeConfig) -> RuntimeResult<Self> {
        let builder = FpuBuilder::new().with_memory_map(config.memory_map);
        let builder = match config.backend {
            PrimitiveBackend::Soft => builder.with_soft_primitives(),
            PrimitiveBackend::Host => builder.with_host_primitives(),
        };
        let core = builder.build()?;

        if config.verbose {
            tracing::info!(backend = %config.backend, primitives = core.primitives_name(), "float runtime ready");
        }

        Ok(Self {
            core,
            config,
            stats: EmulationStats::default(),
        })
    }

    /// 处理一次陷入
    ///
    /// 返回被模拟的操作；不是可陷入的浮点计算指令时返回 `Ok(None)`，寄存器不变。
    pub fn trap(&mut self, raw: u32) -> RuntimeResult<Option<FloatOp>> {
        let Some(decoded) = isa::decode(raw) else {
            tracing::debug!(raw = format_args!("0x{:08x}", raw), "not an emulated float instruction");
            self.stats.not_trapped += 1;
            return Ok(None);
        };

        self.emulate(&decoded)?;
        Ok(Some(decoded.op))
    }

    /// 执行已解码的指令
    pub fn emulate(&mut self, decoded: &DecodedFloat) -> RuntimeResult<()> {
        tracing::debug!(
            raw = format_args!("0x{:08x}", decoded.raw),
            instr = %decoded,
            rm = %decoded.rounding_mode(),
            "trap"
        );
        self.core.execute(decoded.op, &decoded.operands)?;
        self.stats.record(decoded.op);

        if self.config.verbose {
            tracing::info!(instr = %decoded, "emulated");
        }
        Ok(())
    }

    /// 依次陷入一串指令字，返回被模拟的条数
    pub fn run_words(&mut self, words: &[u32]) -> RuntimeResult<usize> {
        let mut emulated = 0;
        for &raw in words {
            if self.trap(raw)?.is_some() {
                emulated += 1;
            }
        }
        Ok(emulated)
    }

    pub fn core(&self) -> &FpuCore {
        &self.core
    }

    pub fn core_mut(&mut self) -> &mut FpuCore {
        &mut self.core
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn stats(&self) -> &EmulationStats {
        &self.stats
    }

    /// 清空寄存器和统计
    pub fn reset(&mut self) {
        self.core.reset_registers();
        self.stats = EmulationStats::default();
    }
}
