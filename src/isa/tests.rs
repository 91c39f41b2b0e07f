//! ISA 模块测试

use proptest::prelude::*;

use super::*;
use crate::fpu::{FloatOp, FloatOperands};

fn op_of(raw: u32) -> FloatOp {
    decode(raw)
        .unwrap_or_else(|| panic!("0x{:08X} should decode", raw))
        .op
}

#[test]
fn test_decode_every_operation() {
    // 固定 rd=1, rs1=2, rs2=3（rs3=4）
    let cases: [(u32, FloatOp); 24] = [
        (0x003100D3, FloatOp::FaddS),
        (0x083100D3, FloatOp::FsubS),
        (0x103100D3, FloatOp::FmulS),
        (0x183100D3, FloatOp::FdivS),
        (0x580100D3, FloatOp::FsqrtS),
        (0x283100D3, FloatOp::FminS),
        (0x283110D3, FloatOp::FmaxS),
        (0x203100C3, FloatOp::FmaddS),
        (0x203100C7, FloatOp::FmsubS),
        (0x203100CF, FloatOp::FnmaddS),
        (0x203100CB, FloatOp::FnmsubS),
        (0x203100D3, FloatOp::FsgnjS),
        (0x203110D3, FloatOp::FsgnjnS),
        (0x203120D3, FloatOp::FsgnjxS),
        (0xA03120D3, FloatOp::FeqS),
        (0xA03110D3, FloatOp::FltS),
        (0xA03100D3, FloatOp::FleS),
        (0xC00100D3, FloatOp::FcvtWS),
        (0xC01100D3, FloatOp::FcvtWuS),
        (0xD00100D3, FloatOp::FcvtSW),
        (0xD01100D3, FloatOp::FcvtSWu),
        (0xE00100D3, FloatOp::FmvXW),
        (0xF00100D3, FloatOp::FmvWX),
        (0xE00110D3, FloatOp::FclassS),
    ];
    for (raw, expected) in cases {
        assert_eq!(op_of(raw), expected, "0x{:08X}", raw);
    }
}

#[test]
fn test_table_covers_all_slots_once() {
    assert_eq!(RV32F_INSTRS.len(), FloatOp::COUNT);
    assert_eq!(RV32F_DECODER.instrs().len(), FloatOp::COUNT);
    for op in FloatOp::ALL {
        let count = RV32F_INSTRS.iter().filter(|d| d.op == op).count();
        assert_eq!(count, 1, "{} defined {} times", op, count);
    }
}

#[test]
fn test_table_has_no_conflicts() {
    let conflicts = RV32F_DECODER.detect_conflicts();
    assert!(conflicts.is_empty(), "{:?}", conflicts);
}

#[test]
fn test_table_names_match_mnemonics() {
    for def in RV32F_INSTRS {
        assert_eq!(def.name.to_ascii_lowercase(), def.op.mnemonic());
    }
}

#[test]
fn test_decode_rejects_non_single_precision() {
    // fadd.d f1, f2, f3
    assert!(decode(0x023100D3).is_none());
    // fmadd.d
    assert!(decode(0x223100C3).is_none());
    // fsqrt.s 的 rs2 必须为 0
    assert!(decode(0x581100D3).is_none());
    // addi x1, x0, 42
    assert!(decode(0x02A00093).is_none());
    // fmin.s 的 funct3 = 010 未定义
    assert!(decode(0x283120D3).is_none());
}

#[test]
fn test_decode_operands() {
    let d = decode(0x203100C3).unwrap();
    assert_eq!(d.operands, FloatOperands::new(2, 3, 1).with_rs3(4));

    // fsgnjn 的 funct3 不当作舍入模式
    let d = decode(0x203110D3).unwrap();
    assert_eq!(d.operands.rm, 0);

    // fcvt.s.w f1, x2
    let d = decode(0xD00100D3).unwrap();
    assert_eq!(d.operands, FloatOperands::new(2, 0, 1));
}

#[test]
fn test_decoded_display() {
    assert_eq!(decode(0x003100D3).unwrap().to_string(), "fadd.s f1, f2, f3");
    assert_eq!(decode(0x203100C3).unwrap().to_string(), "fmadd.s f1, f2, f3, f4");
    assert_eq!(decode(0xA03120D3).unwrap().to_string(), "feq.s x1, f2, f3");
    assert_eq!(decode(0xE00110D3).unwrap().to_string(), "fclass.s x1, f2");
    assert_eq!(decode(0xD00100D3).unwrap().to_string(), "fcvt.s.w f1, x2");
    assert_eq!(decode(0x580100D3).unwrap().to_string(), "fsqrt.s f1, f2");
}

proptest! {
    #[test]
    fn prop_register_fields_survive_decode(rd in 0u32..32, rs1 in 0u32..32, rs2 in 0u32..32, rm in 0u32..5) {
        // funct7 = 0000000
        let raw = (rs2 << 20) | (rs1 << 15) | (rm << 12) | (rd << 7) | OP_FP;
        let d = decode(raw).unwrap();
        prop_assert_eq!(d.op, FloatOp::FaddS);
        prop_assert_eq!(u32::from(d.operands.rd), rd);
        prop_assert_eq!(u32::from(d.operands.rs1), rs1);
        prop_assert_eq!(u32::from(d.operands.rs2), rs2);
        prop_assert_eq!(u32::from(d.operands.rm), rm);
    }

    #[test]
    fn prop_decoded_words_are_fp_opcodes(raw in any::<u32>()) {
        if decode(raw).is_some() {
            prop_assert!(is_fp_opcode(raw));
        }
    }
}
