//! rv32f_runtime 命令行入口
//!
//! - `exec`: 对给定操作数执行单个 RV32F 操作
//! - `decode`: 解码指令字并在新的运行时中陷入执行
//! - `scan`: 检查 ELF 中的浮点指令和派发表段

use std::error::Error;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use rv32f_runtime::fpu::{FloatOp, FloatOperands, RETURN_REG};
use rv32f_runtime::isa;
use rv32f_runtime::loader::ElfInfo;
use rv32f_runtime::runtime::{FloatRuntime, PrimitiveBackend, RuntimeConfig};

#[derive(Parser, Debug)]
#[command(
    name = "rv32f_runtime_cli",
    version,
    about = "Software RV32F emulation for integer-only RISC-V targets"
)]
struct Cli {
    /// Arithmetic backend: soft (simple-soft-float) or host (native f32)
    #[arg(long, default_value = "soft")]
    backend: PrimitiveBackend,

    /// Log every trap (same as RUST_LOG=debug)
    #[arg(short, long)]
    verbose: bool,

    /// Print all float and integer registers after exec/decode
    #[arg(long)]
    dump_regs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one operation. Float operands go to f1, f2, f3; integer operands to x1.
    Exec {
        /// Mnemonic, e.g. fadd.s or fmadd
        op: FloatOp,

        /// Operand values: decimal/float literals or 0x-prefixed raw bits
        #[arg(allow_hyphen_values = true)]
        values: Vec<String>,
    },

    /// Decode and trap instruction words (hex)
    Decode {
        #[arg(required = true)]
        words: Vec<String>,
    },

    /// List RV32F instructions in an ELF's executable segments
    Scan {
        /// ELF file path
        elf: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config = RuntimeConfig::new()
        .with_backend(cli.backend)
        .with_verbose(cli.verbose);

    match cli.command {
        Commands::Exec { op, values } => cmd_exec(config, op, &values, cli.dump_regs),
        Commands::Decode { words } => cmd_decode(config, &words, cli.dump_regs),
        Commands::Scan { elf } => cmd_scan(&elf),
    }
}

// ========== exec ==========

/// 浮点字面量或 0x 开头的原始位模式
fn parse_float_arg(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("bad bit pattern '{}': {}", s, e));
    }
    s.parse::<f32>()
        .map(f32::to_bits)
        .map_err(|e| format!("bad float '{}': {}", s, e))
}

/// 十进制（可为负）或 0x 开头的十六进制整数
fn parse_int_arg(s: &str) -> Result<u32, String> {
    if let Some(hex) = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")) {
        return u32::from_str_radix(hex, 16).map_err(|e| format!("bad integer '{}': {}", s, e));
    }
    let v: i64 = s.parse().map_err(|e| format!("bad integer '{}': {}", s, e))?;
    if v < i64::from(i32::MIN) || v > i64::from(u32::MAX) {
        return Err(format!("integer '{}' does not fit in 32 bits", s));
    }
    Ok(v as u32)
}

fn cmd_exec(
    config: RuntimeConfig,
    op: FloatOp,
    values: &[String],
    dump_regs: bool,
) -> Result<(), Box<dyn Error>> {
    if values.len() != op.source_count() {
        return Err(format!(
            "{} takes {} operand(s), got {}",
            op,
            op.source_count(),
            values.len()
        )
        .into());
    }

    let mut rt = FloatRuntime::from_config(config)?;
    let core = rt.core_mut();

    if op.reads_int_source() {
        core.write_reg(1, parse_int_arg(&values[0])?)?;
    } else {
        for (i, v) in values.iter().enumerate() {
            core.write_fp(i as u8 + 1, parse_float_arg(v)?)?;
        }
    }

    let operands = FloatOperands::new(1, 2, 0).with_rs3(3);
    core.execute(op, &operands)?;

    if op.writes_return_reg() {
        let value = core.read_reg(RETURN_REG)?;
        println!("{} -> x{} = 0x{:08x} ({})", op, RETURN_REG, value, value as i32);
    } else {
        let bits = core.read_fp(0)?;
        println!("{} -> f0 = 0x{:08x} ({:e})", op, bits, f32::from_bits(bits));
    }
    println!("flags: {}", core.exception_flags());
    if dump_regs {
        print!("{}", core.regs());
    }
    Ok(())
}

// ========== decode ==========

fn parse_word(s: &str) -> Result<u32, String> {
    let hex = s.strip_prefix("0x").or_else(|| s.strip_prefix("0X")).unwrap_or(s);
    u32::from_str_radix(hex, 16).map_err(|e| format!("bad instruction word '{}': {}", s, e))
}

fn cmd_decode(config: RuntimeConfig, words: &[String], dump_regs: bool) -> Result<(), Box<dyn Error>> {
    let mut rt = FloatRuntime::from_config(config)?;

    for w in words {
        let raw = parse_word(w)?;
        let Some(decoded) = isa::decode(raw) else {
            let kind = if isa::is_fp_opcode(raw) { "load/store or reserved FP encoding" } else { "not an F instruction" };
            println!("0x{:08x}: {} (not trapped)", raw, kind);
            continue;
        };

        rt.emulate(&decoded)?;
        let core = rt.core();
        let effect = if decoded.op.writes_return_reg() {
            format!("x{} = 0x{:08x}", RETURN_REG, core.read_reg(RETURN_REG)?)
        } else {
            let bits = core.read_fp(decoded.operands.rd)?;
            format!("f{} = 0x{:08x} ({:e})", decoded.operands.rd, bits, f32::from_bits(bits))
        };
        println!(
            "0x{:08x}: {:<28} rm={}  {}",
            raw,
            decoded.to_string(),
            decoded.rounding_mode(),
            effect
        );
    }

    print!("{}", rt.stats());
    if dump_regs {
        print!("{}", rt.core().regs());
    }
    Ok(())
}

// ========== scan ==========

fn cmd_scan(path: &str) -> Result<(), Box<dyn Error>> {
    let info = ElfInfo::parse(path)?;

    println!("entry: 0x{:08x}", info.entry);
    for seg in &info.segments {
        println!(
            "segment: 0x{:08x} file={} mem={}",
            seg.vaddr,
            seg.data.len(),
            seg.mem_size
        );
    }
    match info.dispatch_table {
        Some(table) => println!(
            "dispatch table: 0x{:08x} ({} bytes, offset 0x{:x})",
            table.addr, table.size, table.offset
        ),
        None => println!("dispatch table: not present"),
    }

    let sites = info.float_instructions();
    println!("float instructions: {}", sites.len());
    let mut counts = [0usize; FloatOp::COUNT];
    for site in &sites {
        println!("  {}", site);
        counts[site.decoded.op.index()] += 1;
    }
    for op in FloatOp::ALL {
        if counts[op.index()] > 0 {
            println!("  {:<10} {}", op.mnemonic(), counts[op.index()]);
        }
    }
    Ok(())
}
