//! Opcode Table Unit Tests.
//!
//! Checks the static descriptor table: the regular arithmetic block, the nibble-encoded
//! families, the holes, and the per-family flag policies.

use c166_core::il::Width;
use c166_core::isa::family::{Family, Form, known_opcodes, lookup};
use c166_core::isa::flags::FlagWrite;
use c166_core::isa::opcodes::*;
use rstest::rstest;

// ══════════════════════════════════════════════════════════
// 1. Table integrity
// ══════════════════════════════════════════════════════════

#[test]
fn every_entry_is_indexed_by_its_own_opcode() {
    for info in known_opcodes() {
        assert_eq!(lookup(info.opcode), Some(info));
        assert!(
            matches!(info.length(), 2 | 4),
            "{:#04x} has length {}",
            info.opcode,
            info.length()
        );
    }
}

#[test]
fn known_opcodes_are_in_byte_order() {
    let ops: Vec<u8> = known_opcodes().map(|i| i.opcode).collect();
    let mut sorted = ops.clone();
    sorted.sort_unstable();
    assert_eq!(ops, sorted);
}

#[rstest]
#[case(0x8B)]
#[case(0x3B)]
#[case(0x44)]
#[case(0x45)]
fn holes_are_unknown(#[case] opcode: u8) {
    assert_eq!(lookup(opcode), None);
}

// ══════════════════════════════════════════════════════════
// 2. Regular arithmetic block
// ══════════════════════════════════════════════════════════

#[test]
fn arithmetic_block_forms_follow_low_nibble() {
    let forms = [
        Form::RegReg,
        Form::RegMem,
        Form::MemReg,
        Form::RegImm,
        Form::RegIndirect,
    ];
    for hi in 0..8u8 {
        for lo in 0..=9u8 {
            let op = (hi << 4) | lo;
            let Some(info) = lookup(op) else {
                // CMP has no mem,reg form.
                assert_eq!(op & 0xFE, 0x44, "unexpected hole at {op:#04x}");
                continue;
            };
            assert_eq!(info.form, forms[(lo >> 1) as usize], "{op:#04x}");
            let expected = if lo & 1 == 1 { Width::Byte } else { Width::Word };
            assert_eq!(info.width, expected, "{op:#04x}");
        }
    }
}

#[rstest]
#[case(ADD_RR, Family::Add, "add")]
#[case(ADDC_RR, Family::Addc, "addc")]
#[case(SUB_RR, Family::Sub, "sub")]
#[case(SUBC_RR, Family::Subc, "subc")]
#[case(CMP_RR, Family::Cmp, "cmp")]
#[case(XOR_RR, Family::Xor, "xor")]
#[case(AND_RR, Family::And, "and")]
#[case(OR_RR, Family::Or, "or")]
fn arithmetic_families_by_high_nibble(
    #[case] op: u8,
    #[case] family: Family,
    #[case] mnemonic: &str,
) {
    let word = lookup(op).unwrap();
    assert_eq!(word.family, family);
    assert_eq!(word.mnemonic, mnemonic);

    let byte = lookup(op | 1).unwrap();
    assert_eq!(byte.family, family);
    assert_eq!(byte.mnemonic, format!("{mnemonic}b"));
}

// ══════════════════════════════════════════════════════════
// 3. Nibble-encoded families
// ══════════════════════════════════════════════════════════

#[test]
fn low_nibble_families_cover_every_high_nibble() {
    for hi in 0..16u8 {
        let base = hi << 4;
        assert_eq!(lookup(base | 0xD).unwrap().family, Family::Jmpr);
        assert_eq!(lookup(base | 0xE).unwrap().family, Family::Bclr);
        assert_eq!(lookup(base | 0xF).unwrap().family, Family::Bset);
    }
}

#[rstest]
#[case(MOV_RR, Family::Mov, Form::RegReg, 2)]
#[case(MOV_REG_MEM, Family::Mov, Form::RegMem, 4)]
#[case(MOV_R_DISP, Family::Mov, Form::RegDisp, 4)]
#[case(MOV_DISP_R, Family::Mov, Form::DispReg, 4)]
#[case(MOV_PREDEC, Family::Mov, Form::PreDec, 2)]
#[case(MOV_POSTINC, Family::Mov, Form::PostInc, 2)]
#[case(MOVBZ_RR, Family::Movbz, Form::WordByte, 2)]
#[case(MOVBS_MEM_REG, Family::Movbs, Form::MemReg, 4)]
#[case(MUL, Family::Mul, Form::RegReg, 2)]
#[case(DIVLU, Family::Divlu, Form::Single, 2)]
#[case(SHL_IMM, Family::Shl, Form::RegData4, 2)]
#[case(BFLDH, Family::Bfldh, Form::BitField, 4)]
#[case(JNBS, Family::Jnbs, Form::BitRel, 4)]
#[case(RETP, Family::Retp, Form::ShortReg, 2)]
#[case(PCALL, Family::Pcall, Form::RegCaddr, 4)]
#[case(NOP, Family::Nop, Form::Implied, 2)]
#[case(EINIT, Family::Einit, Form::System, 4)]
#[case(EXT_ATOMIC, Family::ExtAtomic, Form::ExtCount, 2)]
#[case(EXT_IMM, Family::ExtImm, Form::ExtImm, 4)]
#[case(EXT_REG, Family::ExtReg, Form::ExtReg, 2)]
fn descriptors(
    #[case] op: u8,
    #[case] family: Family,
    #[case] form: Form,
    #[case] length: usize,
) {
    let info = lookup(op).unwrap();
    assert_eq!(info.family, family);
    assert_eq!(info.form, form);
    assert_eq!(info.length(), length);
}

// ══════════════════════════════════════════════════════════
// 4. Flag policies
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(ADD_RR, Some(FlagWrite::All))]
#[case(BSET, Some(FlagWrite::All))]
#[case(JB, Some(FlagWrite::Zero))]
#[case(MOV_RR, Some(FlagWrite::Ezn))]
#[case(POP, Some(FlagWrite::Ezn))]
#[case(SCXT_IMM, None)]
#[case(JMPR, None)]
#[case(NOP, None)]
fn flag_policy(#[case] op: u8, #[case] policy: Option<FlagWrite>) {
    assert_eq!(lookup(op).unwrap().flag_write(), policy);
}

#[test]
fn branch_families_are_flagged() {
    for info in known_opcodes() {
        let expected = matches!(
            info.form,
            Form::Rel8 | Form::CondCaddr | Form::SegCaddr | Form::CondInd | Form::RegCaddr
        ) || matches!(
            info.family,
            Family::Jb
                | Family::Jbc
                | Family::Jnb
                | Family::Jnbs
                | Family::Trap
                | Family::Ret
                | Family::Rets
                | Family::Reti
                | Family::Retp
        );
        assert_eq!(info.family.is_branch(), expected, "{}", info.mnemonic);
    }
}
