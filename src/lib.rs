//! rv32f_runtime: RV32F 软件浮点模拟层
//!
//! 面向只实现整数指令集的 RISC-V 合规测试目标：
//! 拦截 F 扩展计算指令，在软件中得到 IEEE-754 单精度结果。
//!
//! # 模块结构
//!
//! - `fpu`: 寄存器文件、算术原语、24 个操作处理函数与派发表
//! - `isa`: RV32F 指令解码
//! - `runtime`: 陷入层（解码 + 派发 + 统计）
//! - `loader`: ELF 检查
//! - `memory`: 寄存器窗口的内存抽象
//! - `error`: 错误类型

pub mod error;
pub mod fpu;
pub mod isa;
pub mod loader;
pub mod memory;
pub mod runtime;

pub use error::{FpuError, FpuResult, RuntimeError, RuntimeResult};
pub use fpu::{FloatOp, FloatOperands, FpuBuilder, FpuCore};
pub use runtime::{FloatRuntime, RuntimeConfig};
