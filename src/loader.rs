//! ELF 检查
//!
//! 解析 32 位 RISC-V ELF，收集可执行段，定位 `.float_dispatch_table` 段，
//! 并列出可执行段中所有需要陷入模拟的 RV32F 指令。

use std::fmt;
use std::fs;
use std::path::Path;

use elf::abi::{EM_RISCV, PF_X, PT_LOAD};
use elf::endian::AnyEndian;
use elf::ElfBytes;

use crate::error::{RuntimeError, RuntimeResult};
use crate::isa::{self, DecodedFloat};

/// 派发表所在段名
pub const DISPATCH_SECTION: &str = ".float_dispatch_table";

/// 可执行程序段
#[derive(Debug, Clone)]
pub struct ElfSegment {
    /// 虚拟地址
    pub vaddr: u32,
    /// 内存中的大小
    pub mem_size: usize,
    /// 段数据（文件中的部分）
    pub data: Vec<u8>,
}

impl ElfSegment {
    /// 按 4 字节对齐切分的指令字及其地址
    pub fn words(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        self.data.chunks_exact(4).enumerate().map(|(i, chunk)| {
            let word = u32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]);
            (self.vaddr.wrapping_add((i * 4) as u32), word)
        })
    }
}

/// 段头信息
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SectionInfo {
    pub addr: u32,
    pub offset: u64,
    pub size: u64,
}

/// 可执行段中的一条 RV32F 指令
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FloatSite {
    pub addr: u32,
    pub decoded: DecodedFloat,
}

impl fmt::Display for FloatSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:08x}: {:08x}  {}", self.addr, self.decoded.raw, self.decoded)
    }
}

/// ELF 文件解析结果
#[derive(Debug, Clone)]
pub struct ElfInfo {
    /// 入口点地址
    pub entry: u32,
    /// 可执行的 PT_LOAD 段
    pub segments: Vec<ElfSegment>,
    /// `.float_dispatch_table` 段（若存在）
    pub dispatch_table: Option<SectionInfo>,
}

impl ElfInfo {
    /// 解析 ELF 文件
    pub fn parse<P: AsRef<Path>>(path: P) -> RuntimeResult<Self> {
        let data = fs::read(path.as_ref())?;
        let info = Self::parse_bytes(&data)?;
        tracing::info!(
            path = %path.as_ref().display(),
            entry = format_args!("0x{:08x}", info.entry),
            segments = info.segments.len(),
            "ELF loaded"
        );
        Ok(info)
    }

    /// 从字节数组解析 ELF（使用 elf crate）
    pub fn parse_bytes(data: &[u8]) -> RuntimeResult<Self> {
        let elf_file = ElfBytes::<AnyEndian>::minimal_parse(data)
            .map_err(|e| RuntimeError::ElfParse(format!("Failed to parse ELF: {}", e)))?;

        let header = &elf_file.ehdr;

        if header.e_machine != EM_RISCV {
            return Err(RuntimeError::ElfParse(format!(
                "Not a RISC-V ELF (machine type: 0x{:x}, expected 0x{:x})",
                header.e_machine, EM_RISCV
            )));
        }
        if header.class != elf::file::Class::ELF32 {
            return Err(RuntimeError::ElfParse("Only 32-bit ELF is supported".into()));
        }
        if header.endianness != AnyEndian::Little {
            return Err(RuntimeError::ElfParse("Only little-endian ELF is supported".into()));
        }

        let mut segments = Vec::new();
        if let Some(phdrs) = elf_file.segments() {
            for phdr in phdrs {
                // 只关心可执行的 PT_LOAD 段
                if phdr.p_type != PT_LOAD || phdr.p_flags & PF_X == 0 {
                    continue;
                }
                let data = elf_file
                    .segment_data(&phdr)
                    .map_err(|e| RuntimeError::ElfParse(format!("Failed to read segment data: {}", e)))?
                    .to_vec();
                tracing::debug!(
                    vaddr = format_args!("0x{:08x}", phdr.p_vaddr),
                    size = data.len(),
                    "executable segment"
                );
                segments.push(ElfSegment {
                    vaddr: phdr.p_vaddr as u32,
                    mem_size: phdr.p_memsz as usize,
                    data,
                });
            }
        }

        let dispatch_table = elf_file
            .section_header_by_name(DISPATCH_SECTION)
            .map_err(|e| RuntimeError::ElfParse(format!("Failed to read section headers: {}", e)))?
            .map(|shdr| SectionInfo {
                addr: shdr.sh_addr as u32,
                offset: shdr.sh_offset,
                size: shdr.sh_size,
            });

        Ok(ElfInfo {
            entry: header.e_entry as u32,
            segments,
            dispatch_table,
        })
    }

    /// 列出可执行段中所有可陷入的 RV32F 指令
    pub fn float_instructions(&self) -> Vec<FloatSite> {
        self.segments
            .iter()
            .flat_map(|seg| seg.words())
            .filter_map(|(addr, raw)| isa::decode(raw).map(|decoded| FloatSite { addr, decoded }))
            .collect()
    }

    /// 所有可执行段中的指令字
    pub fn words(&self) -> Vec<u32> {
        self.segments
            .iter()
            .flat_map(|seg| seg.words().map(|(_, w)| w))
            .collect()
    }
}
