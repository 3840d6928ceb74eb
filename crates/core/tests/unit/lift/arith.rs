//! Arithmetic Lifting Tests.
//!
//! The regular two-operand block in all five operand forms, the carry-folding families,
//! the compare-and-step group, and the single-operand NEG/CPL/PRIOR.

use crate::common::builder::{nibbles, wide};
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

fn word(reg: Reg) -> Expr {
    Expr::reg(reg, Width::Word)
}

fn konst(value: u64) -> Expr {
    Expr::konst(value, Width::Word)
}

fn set_word(reg: Reg, value: Expr) -> IlOp {
    IlOp::SetReg {
        reg,
        width: Width::Word,
        value,
        flags: None,
    }
}

fn flagged(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, Width::Word, lhs, rhs).with_flags(ALL)
}

// ══════════════════════════════════════════════════════════
// 1. Register operands
// ══════════════════════════════════════════════════════════

#[rstest]
#[case::add(ADD_RR, BinOp::Add)]
#[case::sub(SUB_RR, BinOp::Sub)]
#[case::and(AND_RR, BinOp::And)]
#[case::or(OR_RR, BinOp::Or)]
#[case::xor(XOR_RR, BinOp::Xor)]
fn register_register(#[case] op: u8, #[case] bin: BinOp) {
    assert_eq!(
        lift(&nibbles(op, 1, 2)),
        vec![set_word(Reg::R1, flagged(bin, word(Reg::R1), word(Reg::R2)))]
    );
}

#[test]
fn byte_form_uses_byte_registers() {
    let rl1 = Reg::byte(2);
    let rh1 = Reg::byte(3);
    assert_eq!(
        lift(&nibbles(ADD_RR | 1, 2, 3)),
        vec![IlOp::SetReg {
            reg: rl1,
            width: Width::Byte,
            value: Expr::binary(
                BinOp::Add,
                Width::Byte,
                Expr::reg(rl1, Width::Byte),
                Expr::reg(rh1, Width::Byte),
            )
            .with_flags(ALL),
            flags: None,
        }]
    );
}

#[rstest]
#[case::addc(ADDC_RR, BinOp::Add)]
#[case::subc(SUBC_RR, BinOp::Sub)]
fn carry_families_fold_in_the_carry(#[case] op: u8, #[case] bin: BinOp) {
    let expected = Expr::binary(
        bin,
        Width::Word,
        Expr::binary(bin, Width::Word, word(Reg::R1), word(Reg::R2)),
        Expr::zx(Width::Word, Expr::Flag(Flag::C)),
    )
    .with_flags(ALL);
    assert_eq!(lift(&nibbles(op, 1, 2)), vec![set_word(Reg::R1, expected)]);
}

#[test]
fn cmp_only_computes_flags() {
    assert_eq!(
        lift(&nibbles(CMP_RR, 1, 2)),
        vec![IlOp::Compute(flagged(BinOp::Sub, word(Reg::R1), word(Reg::R2)))]
    );
}

// ══════════════════════════════════════════════════════════
// 2. Memory, immediate and indirect operands
// ══════════════════════════════════════════════════════════

#[test]
fn reg_mem_loads_the_translated_address() {
    let ctx = TestContext::new();
    ctx.store.set_default_dpp([0, 1, 2, 3]);
    let load = Expr::load(Expr::ptr(0x8010), Width::Word);
    assert_eq!(
        ctx.lift(&wide(ADD_REG_MEM, 0xF1, 0x8010), AT).unwrap(),
        vec![set_word(Reg::R1, flagged(BinOp::Add, word(Reg::R1), load))]
    );
}

#[test]
fn mem_reg_stores_back_to_memory() {
    let load = Expr::load(Expr::ptr(0x10), Width::Word);
    assert_eq!(
        lift(&wide(ADD_MEM_REG, 0xF1, 0x0010)),
        vec![IlOp::Store {
            addr: Expr::ptr(0x10),
            width: Width::Word,
            value: flagged(BinOp::Add, load, word(Reg::R1)),
            flags: None,
        }]
    );
}

#[test]
fn reg_imm_on_an_sfr() {
    let sfr = Expr::ptr(0xFE10);
    assert_eq!(
        lift(&wide(ADD_REG_IMM, 0x08, 0x1234)),
        vec![IlOp::Store {
            addr: sfr.clone(),
            width: Width::Word,
            value: flagged(BinOp::Add, Expr::load(sfr, Width::Word), konst(0x1234)),
            flags: None,
        }]
    );
}

#[test]
fn constant_sfr_reads_fold() {
    // ZEROS reads as zero instead of a load.
    let ops = lift(&wide(OR_RR | 0x06, 0x8E, 0x0001));
    let IlOp::Store { value, .. } = &ops[0] else {
        panic!("expected a store, got {ops:?}");
    };
    assert_eq!(*value, flagged(BinOp::Or, konst(0), konst(1)));
}

#[test]
fn byte_immediate_comes_from_byte_two() {
    let rl2 = Reg::byte(4);
    assert_eq!(
        lift(&wide(ADD_REG_IMM | 1, 0xF4, 0xAB12)),
        vec![IlOp::SetReg {
            reg: rl2,
            width: Width::Byte,
            value: Expr::binary(
                BinOp::Add,
                Width::Byte,
                Expr::reg(rl2, Width::Byte),
                Expr::konst(0x12, Width::Byte),
            )
            .with_flags(ALL),
            flags: None,
        }]
    );
}

#[test]
fn data3_immediate() {
    assert_eq!(
        lift(&nibbles(SUB_RR | 0x08, 3, 0x5)),
        vec![set_word(Reg::R3, flagged(BinOp::Sub, word(Reg::R3), konst(5)))]
    );
}

#[test]
fn indirect_operand_without_increment() {
    let ops = lift(&nibbles(ADD_R_IND, 3, 0x9));
    assert_eq!(ops.len(), 1);
    let IlOp::SetReg { reg, value, .. } = &ops[0] else {
        panic!("expected a register write, got {ops:?}");
    };
    assert_eq!(*reg, Reg::R3);
    assert!(matches!(value, Expr::Binary { rhs, .. } if matches!(**rhs, Expr::Load { .. })));
}

#[rstest]
#[case::word(ADD_R_IND, 2)]
#[case::byte(ADD_R_IND | 1, 1)]
fn post_increment_steps_by_operand_size(#[case] op: u8, #[case] step: u64) {
    let ops = lift(&nibbles(op, 3, 0xD));
    assert_eq!(ops.len(), 2);
    assert_eq!(
        ops[1],
        set_word(
            Reg::R1,
            Expr::binary(BinOp::Add, Width::Word, word(Reg::R1), konst(step))
        )
    );
}

// ══════════════════════════════════════════════════════════
// 3. Compare-and-step
// ══════════════════════════════════════════════════════════

#[test]
fn cmpi1_compares_then_increments() {
    assert_eq!(
        lift(&nibbles(CMPI1_IMM4, 3, 4)),
        vec![
            IlOp::Compute(flagged(BinOp::Sub, word(Reg::R4), konst(3))),
            set_word(
                Reg::R4,
                Expr::binary(BinOp::Add, Width::Word, word(Reg::R4), konst(1))
            ),
        ]
    );
}

#[rstest]
#[case::cmpi2(CMPI2_IMM4 | 0x06, BinOp::Add, 2)]
#[case::cmpd1(CMPD1_IMM4 | 0x06, BinOp::Sub, 1)]
#[case::cmpd2(CMPD2_IMM4 | 0x06, BinOp::Sub, 2)]
fn step_direction_and_size(#[case] op: u8, #[case] bin: BinOp, #[case] amount: u64) {
    let ops = lift(&wide(op, 0xF4, 0x0100));
    assert_eq!(
        ops[0],
        IlOp::Compute(flagged(BinOp::Sub, word(Reg::R4), konst(0x100)))
    );
    assert_eq!(
        ops[1],
        set_word(
            Reg::R4,
            Expr::binary(bin, Width::Word, word(Reg::R4), konst(amount))
        )
    );
}

#[test]
fn compare_against_memory() {
    let ops = lift(&wide(CMPD2_IMM4 | 0x02, 0xF4, 0x0020));
    assert_eq!(
        ops[0],
        IlOp::Compute(flagged(
            BinOp::Sub,
            word(Reg::R4),
            Expr::load(Expr::ptr(0x20), Width::Word)
        ))
    );
}

// ══════════════════════════════════════════════════════════
// 4. Single-operand families
// ══════════════════════════════════════════════════════════

#[test]
fn neg_carries_flags_on_the_expression() {
    assert_eq!(
        lift(&nibbles(NEG, 5, 0)),
        vec![set_word(
            Reg::R5,
            Expr::unary(UnOp::Neg, Width::Word, word(Reg::R5)).with_flags(ALL)
        )]
    );
}

#[test]
fn cplb_complements_a_byte_register() {
    let rh2 = Reg::byte(5);
    assert_eq!(
        lift(&nibbles(CPLB, 5, 0)),
        vec![IlOp::SetReg {
            reg: rh2,
            width: Width::Byte,
            value: Expr::unary(UnOp::Not, Width::Byte, Expr::reg(rh2, Width::Byte))
                .with_flags(ALL),
            flags: None,
        }]
    );
}

#[test]
fn prior_is_an_unmodelled_write() {
    assert_eq!(
        lift(&nibbles(PRIOR, 2, 3)),
        vec![IlOp::SetReg {
            reg: Reg::R2,
            width: Width::Word,
            value: Expr::Unimplemented,
            flags: ALL,
        }]
    );
}
