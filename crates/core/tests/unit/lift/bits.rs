//! Bit Manipulation Lifting Tests.
//!
//! Single-bit set/clear on GPRs and bit-addressable memory, the masked merge of the
//! two-operand bit instructions, BCMP's explicit flag writes, and the byte-field forms.

use crate::common::builder::{bit_pair, short};
use crate::common::harness::TestContext;
use c166_core::il::{BinOp, Expr, IlOp, UnOp, Width};
use c166_core::isa::flags::{Flag, FlagWrite};
use c166_core::isa::opcodes::*;
use c166_core::isa::registers::Reg;
use pretty_assertions::assert_eq;
use rstest::rstest;

const AT: u64 = 0x1000;
const ALL: Option<FlagWrite> = Some(FlagWrite::All);

fn lift(bytes: &[u8]) -> Vec<IlOp> {
    TestContext::new().lift(bytes, AT).unwrap()
}

fn w(value: u64) -> Expr {
    Expr::konst(value, Width::Word)
}

fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, Width::Word, lhs, rhs)
}

fn word(reg: Reg) -> Expr {
    Expr::reg(reg, Width::Word)
}

/// `(cell >> pos) & 1`.
fn bit(cell: Expr, pos: u64) -> Expr {
    bin(BinOp::And, bin(BinOp::Lsr, cell, w(pos)), w(1))
}

// ══════════════════════════════════════════════════════════
// 1. BSET / BCLR
// ══════════════════════════════════════════════════════════

#[test]
fn bset_on_a_gpr() {
    // bset r3.2
    assert_eq!(
        lift(&short(BSET | 0x20, 0xF3)),
        vec![IlOp::SetReg {
            reg: Reg::R3,
            width: Width::Word,
            value: bin(BinOp::Or, word(Reg::R3), w(0x4)),
            flags: ALL,
        }]
    );
}

#[test]
fn bclr_in_bit_addressable_ram() {
    // bclr 0xfd20.2
    let cell = Expr::ptr(0xFD20);
    assert_eq!(
        lift(&short(BCLR | 0x20, 0x10)),
        vec![IlOp::Store {
            addr: cell.clone(),
            width: Width::Word,
            value: bin(BinOp::And, Expr::load(cell, Width::Word), w(0xFFFB)),
            flags: ALL,
        }]
    );
}

#[rstest]
#[case(0, 0x0001)]
#[case(7, 0x0080)]
#[case(15, 0x8000)]
fn bit_position_comes_from_the_opcode(#[case] pos: u8, #[case] mask: u64) {
    let ops = lift(&short(BSET | (pos << 4), 0xF0));
    let IlOp::SetReg { value, .. } = &ops[0] else {
        panic!("expected a register write, got {ops:?}");
    };
    assert_eq!(*value, bin(BinOp::Or, word(Reg::R0), w(mask)));
}

#[test]
fn sfr_bit_under_register_bank() {
    let ctx = TestContext::new();
    ctx.store.set_register_bank(AT, 0);
    let ops = ctx.lift(&short(BSET, 0x80), AT).unwrap();
    let IlOp::Store { addr, .. } = &ops[0] else {
        panic!("expected a store, got {ops:?}");
    };
    assert_eq!(*addr, Expr::ptr(0xF100));
}

// ══════════════════════════════════════════════════════════
// 2. Two-operand bit instructions
// ══════════════════════════════════════════════════════════

fn merged(z: Reg, z_pos: u64, value: Expr) -> IlOp {
    IlOp::SetReg {
        reg: z,
        width: Width::Word,
        value: bin(
            BinOp::Or,
            bin(BinOp::Shl, value, w(z_pos)),
            bin(BinOp::And, word(z), w(!(1u64 << z_pos) & 0xFFFF)),
        ),
        flags: ALL,
    }
}

#[test]
fn bmov_copies_the_source_bit() {
    // bmov r2.5, r1.3
    assert_eq!(
        lift(&bit_pair(BMOV, 0xF2, 5, 0xF1, 3)),
        vec![merged(Reg::R2, 5, bit(word(Reg::R1), 3))]
    );
}

#[rstest]
#[case::band(BAND, BinOp::And)]
#[case::bor(BOR, BinOp::Or)]
#[case::bxor(BXOR, BinOp::Xor)]
fn logical_bit_ops_combine_both_bits(#[case] op: u8, #[case] combine: BinOp) {
    let value = bin(combine, bit(word(Reg::R1), 3), bit(word(Reg::R2), 5));
    assert_eq!(
        lift(&bit_pair(op, 0xF2, 5, 0xF1, 3)),
        vec![merged(Reg::R2, 5, value)]
    );
}

#[test]
fn bmovn_inverts_the_source_bit() {
    let inverted = bin(
        BinOp::And,
        Expr::unary(
            UnOp::Not,
            Width::Word,
            bin(BinOp::Lsr, word(Reg::R1), w(3)),
        ),
        w(1),
    );
    assert_eq!(
        lift(&bit_pair(BMOVN, 0xF2, 5, 0xF1, 3)),
        vec![merged(Reg::R2, 5, inverted)]
    );
}

#[test]
fn bcmp_writes_every_flag() {
    let ops = lift(&bit_pair(BCMP, 0xF2, 5, 0xF1, 3));
    let flags: Vec<Flag> = ops
        .iter()
        .map(|op| match op {
            IlOp::SetFlag { flag, .. } => *flag,
            other => panic!("unexpected {other:?}"),
        })
        .collect();
    assert_eq!(flags, vec![Flag::E, Flag::Z, Flag::V, Flag::C, Flag::N]);

    let q = bit(word(Reg::R1), 3);
    let z = bit(word(Reg::R2), 5);
    assert_eq!(
        ops[0],
        IlOp::SetFlag {
            flag: Flag::E,
            value: w(0),
        }
    );
    assert_eq!(
        ops[3],
        IlOp::SetFlag {
            flag: Flag::C,
            value: bin(BinOp::And, q, z),
        }
    );
}

// ══════════════════════════════════════════════════════════
// 3. Bit fields
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::bfldl(BFLDL)]
#[case::bfldh(BFLDH)]
fn field_on_a_gpr_is_unimplemented(#[case] op: u8) {
    assert_eq!(lift(&[op, 0xF1, 0xF0, 0x0A]), vec![IlOp::Unimplemented]);
}

#[rstest]
#[case::bfldl(BFLDL, 0xFD20)]
#[case::bfldh(BFLDH, 0xFD21)]
fn field_in_memory_reports_the_touched_byte(#[case] op: u8, #[case] byte: u64) {
    assert_eq!(
        lift(&[op, 0x10, 0xF0, 0x0A]),
        vec![IlOp::UnimplementedMemRef {
            width: Width::Byte,
            addr: Expr::ptr(byte),
        }]
    );
}
