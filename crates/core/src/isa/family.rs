//! Data-driven opcode descriptors.
//!
//! Every opcode byte maps to at most one [`OpcodeInfo`], built once at compile time:
//! 1. **Family:** the semantic group (ADD, MOV, JMPR, ...), which fixes the flag-write policy.
//! 2. **Form:** the operand layout, which fixes the encoded length.
//! 3. **Width:** byte or word operands.
//!
//! The classifier, the lifter and the text renderer all dispatch from this one table, so the
//! three can never disagree on instruction length.

use crate::il::Width;
use crate::isa::flags::FlagWrite;

/// Semantic instruction family.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[allow(missing_docs)]
pub enum Family {
    Add,
    Addc,
    Sub,
    Subc,
    Cmp,
    Xor,
    And,
    Or,
    Cmpd1,
    Cmpd2,
    Cmpi1,
    Cmpi2,
    Neg,
    Cpl,
    Mul,
    Mulu,
    Div,
    Divu,
    Divl,
    Divlu,
    Prior,
    Rol,
    Ror,
    Shl,
    Shr,
    Ashr,
    Bclr,
    Bset,
    Band,
    Bor,
    Bxor,
    Bmov,
    Bmovn,
    Bcmp,
    Bfldh,
    Bfldl,
    Jb,
    Jbc,
    Jnb,
    Jnbs,
    Jmpr,
    Jmpa,
    Jmps,
    Jmpi,
    Callr,
    Calla,
    Calls,
    Calli,
    Pcall,
    Trap,
    Ret,
    Reti,
    Rets,
    Retp,
    Mov,
    Movbs,
    Movbz,
    Scxt,
    Push,
    Pop,
    Nop,
    Idle,
    Pwrdn,
    Srst,
    Srvwdt,
    Diswdt,
    Einit,
    /// `atomic` / `extr`.
    ExtAtomic,
    /// `exts` / `extp` / `extsr` / `extpr` with an immediate.
    ExtImm,
    /// `exts` / `extp` / `extsr` / `extpr` with a register.
    ExtReg,
}

impl Family {
    /// Flags updated by every instruction of the family.
    pub const fn flag_write(self) -> Option<FlagWrite> {
        match self {
            Self::Add
            | Self::Addc
            | Self::Sub
            | Self::Subc
            | Self::Cmp
            | Self::Xor
            | Self::And
            | Self::Or
            | Self::Cmpd1
            | Self::Cmpd2
            | Self::Cmpi1
            | Self::Cmpi2
            | Self::Neg
            | Self::Cpl
            | Self::Mul
            | Self::Mulu
            | Self::Div
            | Self::Divu
            | Self::Divl
            | Self::Divlu
            | Self::Prior
            | Self::Rol
            | Self::Ror
            | Self::Shl
            | Self::Shr
            | Self::Ashr
            | Self::Bclr
            | Self::Bset
            | Self::Band
            | Self::Bor
            | Self::Bxor
            | Self::Bmov
            | Self::Bmovn
            | Self::Bcmp
            | Self::Bfldh
            | Self::Bfldl => Some(FlagWrite::All),
            Self::Jb | Self::Jbc | Self::Jnb | Self::Jnbs => Some(FlagWrite::Zero),
            Self::Mov | Self::Movbs | Self::Movbz | Self::Push | Self::Pop => Some(FlagWrite::Ezn),
            _ => None,
        }
    }

    /// True for the families that transfer control.
    pub const fn is_branch(self) -> bool {
        matches!(
            self,
            Self::Jb
                | Self::Jbc
                | Self::Jnb
                | Self::Jnbs
                | Self::Jmpr
                | Self::Jmpa
                | Self::Jmps
                | Self::Jmpi
                | Self::Callr
                | Self::Calla
                | Self::Calls
                | Self::Calli
                | Self::Pcall
                | Self::Trap
                | Self::Ret
                | Self::Reti
                | Self::Rets
                | Self::Retp
        )
    }
}

/// Operand layout of an encoding.
///
/// `n`/`m` are the high/low nibbles of byte 1 unless noted otherwise; `reg` is an 8-bit
/// register-short-address and `mem` a 16-bit memory operand in bytes 2-3.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Form {
    /// `Rn, Rm`.
    RegReg,
    /// `Rn, [Rwi]` / `Rn, [Rwi+]` / `Rn, #data3`.
    RegIndirect,
    /// `reg, #data16` (`#data8` in byte 2 for byte forms).
    RegImm,
    /// `reg, mem`.
    RegMem,
    /// `mem, reg`.
    MemReg,
    /// `Rn, #data4` with the register in the low nibble and the immediate in the high one.
    RegData4,
    /// `Rw, mem` with the register in the low nibble.
    RwMem,
    /// `Rw, #data16` with the register in the low nibble.
    RwImm16,
    /// Single register in the high nibble.
    Single,
    /// Single register-short-address in byte 1.
    ShortReg,
    /// `bitoff.q`, bit position in the opcode's high nibble.
    BitOff,
    /// `bitaddrZ.z, bitaddrQ.q`.
    BitPair,
    /// `bitoff, #mask8, #data8`.
    BitField,
    /// `bitaddr.q, rel`.
    BitRel,
    /// `Rwn, Rbm` with the word register in the low nibble.
    WordByte,
    /// `[Rn], mem` with the register in the low nibble.
    IndMem,
    /// `mem, [Rn]` with the register in the low nibble.
    MemInd,
    /// `[-Rm], Rn`.
    PreDec,
    /// `Rn, [Rm+]`.
    PostInc,
    /// `Rn, [Rm]`.
    RegInd,
    /// `[Rm], Rn`.
    IndReg,
    /// `[Rn], [Rm]`.
    IndInd,
    /// `[Rn+], [Rm]`.
    IncInd,
    /// `[Rn], [Rm+]`.
    IndInc,
    /// `Rn, [Rm+#data16]`.
    RegDisp,
    /// `[Rm+#data16], Rn`.
    DispReg,
    /// Signed word displacement in byte 1.
    Rel8,
    /// `cc, caddr`, condition in the high nibble of byte 1.
    CondCaddr,
    /// `seg, caddr`.
    SegCaddr,
    /// `cc, [Rwn]`.
    CondInd,
    /// `reg, caddr`.
    RegCaddr,
    /// `#trap7`.
    Trap7,
    /// No operands.
    Implied,
    /// No operands, four-byte protected encoding.
    System,
    /// `#irang2` count only.
    ExtCount,
    /// `#pag10` / `#seg8`, `#irang2`.
    ExtImm,
    /// `Rwm, #irang2`.
    ExtReg,
}

impl Form {
    /// Encoded length in bytes.
    pub const fn length(self) -> usize {
        match self {
            Self::RegImm
            | Self::RegMem
            | Self::MemReg
            | Self::RwMem
            | Self::RwImm16
            | Self::BitPair
            | Self::BitField
            | Self::BitRel
            | Self::IndMem
            | Self::MemInd
            | Self::RegDisp
            | Self::DispReg
            | Self::CondCaddr
            | Self::SegCaddr
            | Self::RegCaddr
            | Self::System
            | Self::ExtImm => 4,
            _ => 2,
        }
    }
}

/// Everything statically known about one opcode byte.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct OpcodeInfo {
    /// Opcode byte.
    pub opcode: u8,
    /// Semantic family.
    pub family: Family,
    /// Operand layout.
    pub form: Form,
    /// Operand width.
    pub width: Width,
    /// Assembler mnemonic (the extension families refine theirs from byte 1).
    pub mnemonic: &'static str,
}

impl OpcodeInfo {
    /// Encoded length in bytes.
    pub const fn length(&self) -> usize {
        self.form.length()
    }

    /// Flags written by this opcode.
    pub const fn flag_write(&self) -> Option<FlagWrite> {
        self.family.flag_write()
    }

    /// True for byte-width operands.
    pub const fn is_byte(&self) -> bool {
        matches!(self.width, Width::Byte)
    }
}

const fn entry(
    opcode: u8,
    family: Family,
    form: Form,
    width: Width,
    mnemonic: &'static str,
) -> Option<OpcodeInfo> {
    Some(OpcodeInfo {
        opcode,
        family,
        form,
        width,
        mnemonic,
    })
}

/// Families of the regular `0x00..=0x79` arithmetic block, indexed by the opcode's high nibble.
const ARITH_FAMILIES: [Family; 8] = [
    Family::Add,
    Family::Addc,
    Family::Sub,
    Family::Subc,
    Family::Cmp,
    Family::Xor,
    Family::And,
    Family::Or,
];

const ARITH_WORD_NAMES: [&str; 8] = ["add", "addc", "sub", "subc", "cmp", "xor", "and", "or"];

const ARITH_BYTE_NAMES: [&str; 8] = [
    "addb", "addcb", "subb", "subcb", "cmpb", "xorb", "andb", "orb",
];

/// Operand forms of the arithmetic block, indexed by `low_nibble >> 1`.
const ARITH_FORMS: [Form; 5] = [
    Form::RegReg,
    Form::RegMem,
    Form::MemReg,
    Form::RegImm,
    Form::RegIndirect,
];

const fn arith(op: u8) -> Option<OpcodeInfo> {
    let hi = (op >> 4) as usize;
    let lo = op & 0xF;
    let form = ARITH_FORMS[(lo >> 1) as usize];
    // CMP has no mem,reg form.
    if matches!(ARITH_FAMILIES[hi], Family::Cmp) && matches!(form, Form::MemReg) {
        return None;
    }
    if lo & 1 == 1 {
        entry(op, ARITH_FAMILIES[hi], form, Width::Byte, ARITH_BYTE_NAMES[hi])
    } else {
        entry(op, ARITH_FAMILIES[hi], form, Width::Word, ARITH_WORD_NAMES[hi])
    }
}

const fn describe(op: u8) -> Option<OpcodeInfo> {
    use Family as F;
    use Form as M;
    use Width::{Byte as B, Word as W};

    let lo = op & 0xF;
    if op < 0x80 && lo <= 9 {
        return arith(op);
    }
    match lo {
        0xD => return entry(op, F::Jmpr, M::Rel8, W, "jmpr"),
        0xE => return entry(op, F::Bclr, M::BitOff, W, "bclr"),
        0xF => return entry(op, F::Bset, M::BitOff, W, "bset"),
        _ => {}
    }

    match op {
        // Compare and increment/decrement.
        0x80 => entry(op, F::Cmpi1, M::RegData4, W, "cmpi1"),
        0x82 => entry(op, F::Cmpi1, M::RwMem, W, "cmpi1"),
        0x86 => entry(op, F::Cmpi1, M::RwImm16, W, "cmpi1"),
        0x90 => entry(op, F::Cmpi2, M::RegData4, W, "cmpi2"),
        0x92 => entry(op, F::Cmpi2, M::RwMem, W, "cmpi2"),
        0x96 => entry(op, F::Cmpi2, M::RwImm16, W, "cmpi2"),
        0xA0 => entry(op, F::Cmpd1, M::RegData4, W, "cmpd1"),
        0xA2 => entry(op, F::Cmpd1, M::RwMem, W, "cmpd1"),
        0xA6 => entry(op, F::Cmpd1, M::RwImm16, W, "cmpd1"),
        0xB0 => entry(op, F::Cmpd2, M::RegData4, W, "cmpd2"),
        0xB2 => entry(op, F::Cmpd2, M::RwMem, W, "cmpd2"),
        0xB6 => entry(op, F::Cmpd2, M::RwImm16, W, "cmpd2"),

        // Unary.
        0x81 => entry(op, F::Neg, M::Single, W, "neg"),
        0x91 => entry(op, F::Cpl, M::Single, W, "cpl"),
        0xA1 => entry(op, F::Neg, M::Single, B, "negb"),
        0xB1 => entry(op, F::Cpl, M::Single, B, "cplb"),

        // Multiply, divide, prioritize.
        0x0B => entry(op, F::Mul, M::RegReg, W, "mul"),
        0x1B => entry(op, F::Mulu, M::RegReg, W, "mulu"),
        0x2B => entry(op, F::Prior, M::RegReg, W, "prior"),
        0x4B => entry(op, F::Div, M::Single, W, "div"),
        0x5B => entry(op, F::Divu, M::Single, W, "divu"),
        0x6B => entry(op, F::Divl, M::Single, W, "divl"),
        0x7B => entry(op, F::Divlu, M::Single, W, "divlu"),

        // Shifts and rotates.
        0x0C => entry(op, F::Rol, M::RegReg, W, "rol"),
        0x1C => entry(op, F::Rol, M::RegData4, W, "rol"),
        0x2C => entry(op, F::Ror, M::RegReg, W, "ror"),
        0x3C => entry(op, F::Ror, M::RegData4, W, "ror"),
        0x4C => entry(op, F::Shl, M::RegReg, W, "shl"),
        0x5C => entry(op, F::Shl, M::RegData4, W, "shl"),
        0x6C => entry(op, F::Shr, M::RegReg, W, "shr"),
        0x7C => entry(op, F::Shr, M::RegData4, W, "shr"),
        0xAC => entry(op, F::Ashr, M::RegReg, W, "ashr"),
        0xBC => entry(op, F::Ashr, M::RegData4, W, "ashr"),

        // Bit manipulation.
        0x0A => entry(op, F::Bfldl, M::BitField, W, "bfldl"),
        0x1A => entry(op, F::Bfldh, M::BitField, W, "bfldh"),
        0x2A => entry(op, F::Bcmp, M::BitPair, W, "bcmp"),
        0x3A => entry(op, F::Bmovn, M::BitPair, W, "bmovn"),
        0x4A => entry(op, F::Bmov, M::BitPair, W, "bmov"),
        0x5A => entry(op, F::Bor, M::BitPair, W, "bor"),
        0x6A => entry(op, F::Band, M::BitPair, W, "band"),
        0x7A => entry(op, F::Bxor, M::BitPair, W, "bxor"),

        // Control transfer.
        0x8A => entry(op, F::Jb, M::BitRel, W, "jb"),
        0x9A => entry(op, F::Jnb, M::BitRel, W, "jnb"),
        0xAA => entry(op, F::Jbc, M::BitRel, W, "jbc"),
        0xBA => entry(op, F::Jnbs, M::BitRel, W, "jnbs"),
        0xCA => entry(op, F::Calla, M::CondCaddr, W, "calla"),
        0xDA => entry(op, F::Calls, M::SegCaddr, W, "calls"),
        0xEA => entry(op, F::Jmpa, M::CondCaddr, W, "jmpa"),
        0xFA => entry(op, F::Jmps, M::SegCaddr, W, "jmps"),
        0x9B => entry(op, F::Trap, M::Trap7, W, "trap"),
        0xAB => entry(op, F::Calli, M::CondInd, W, "calli"),
        0xBB => entry(op, F::Callr, M::Rel8, W, "callr"),
        0xCB => entry(op, F::Ret, M::Implied, W, "ret"),
        0xDB => entry(op, F::Rets, M::Implied, W, "rets"),
        0xEB => entry(op, F::Retp, M::ShortReg, W, "retp"),
        0xFB => entry(op, F::Reti, M::Implied, W, "reti"),
        0x9C => entry(op, F::Jmpi, M::CondInd, W, "jmpi"),
        0xE2 => entry(op, F::Pcall, M::RegCaddr, W, "pcall"),

        // Zero/sign-extending byte moves.
        0xC0 => entry(op, F::Movbz, M::WordByte, B, "movbz"),
        0xC2 => entry(op, F::Movbz, M::RegMem, B, "movbz"),
        0xC5 => entry(op, F::Movbz, M::MemReg, B, "movbz"),
        0xD0 => entry(op, F::Movbs, M::WordByte, B, "movbs"),
        0xD2 => entry(op, F::Movbs, M::RegMem, B, "movbs"),
        0xD5 => entry(op, F::Movbs, M::MemReg, B, "movbs"),

        // Moves.
        0xE0 => entry(op, F::Mov, M::RegData4, W, "mov"),
        0xE1 => entry(op, F::Mov, M::RegData4, B, "movb"),
        0xF0 => entry(op, F::Mov, M::RegReg, W, "mov"),
        0xF1 => entry(op, F::Mov, M::RegReg, B, "movb"),
        0xE6 => entry(op, F::Mov, M::RegImm, W, "mov"),
        0xE7 => entry(op, F::Mov, M::RegImm, B, "movb"),
        0xF2 => entry(op, F::Mov, M::RegMem, W, "mov"),
        0xF3 => entry(op, F::Mov, M::RegMem, B, "movb"),
        0xF6 => entry(op, F::Mov, M::MemReg, W, "mov"),
        0xF7 => entry(op, F::Mov, M::MemReg, B, "movb"),
        0x84 => entry(op, F::Mov, M::IndMem, W, "mov"),
        0xA4 => entry(op, F::Mov, M::IndMem, B, "movb"),
        0x94 => entry(op, F::Mov, M::MemInd, W, "mov"),
        0xB4 => entry(op, F::Mov, M::MemInd, B, "movb"),
        0xC4 => entry(op, F::Mov, M::DispReg, W, "mov"),
        0xE4 => entry(op, F::Mov, M::DispReg, B, "movb"),
        0xD4 => entry(op, F::Mov, M::RegDisp, W, "mov"),
        0xF4 => entry(op, F::Mov, M::RegDisp, B, "movb"),
        0x88 => entry(op, F::Mov, M::PreDec, W, "mov"),
        0x89 => entry(op, F::Mov, M::PreDec, B, "movb"),
        0x98 => entry(op, F::Mov, M::PostInc, W, "mov"),
        0x99 => entry(op, F::Mov, M::PostInc, B, "movb"),
        0xA8 => entry(op, F::Mov, M::RegInd, W, "mov"),
        0xA9 => entry(op, F::Mov, M::RegInd, B, "movb"),
        0xB8 => entry(op, F::Mov, M::IndReg, W, "mov"),
        0xB9 => entry(op, F::Mov, M::IndReg, B, "movb"),
        0xC8 => entry(op, F::Mov, M::IndInd, W, "mov"),
        0xC9 => entry(op, F::Mov, M::IndInd, B, "movb"),
        0xD8 => entry(op, F::Mov, M::IncInd, W, "mov"),
        0xD9 => entry(op, F::Mov, M::IncInd, B, "movb"),
        0xE8 => entry(op, F::Mov, M::IndInc, W, "mov"),
        0xE9 => entry(op, F::Mov, M::IndInc, B, "movb"),

        // Stack and context.
        0xC6 => entry(op, F::Scxt, M::RegImm, W, "scxt"),
        0xD6 => entry(op, F::Scxt, M::RegMem, W, "scxt"),
        0xEC => entry(op, F::Push, M::ShortReg, W, "push"),
        0xFC => entry(op, F::Pop, M::ShortReg, W, "pop"),

        // System.
        0xCC => entry(op, F::Nop, M::Implied, W, "nop"),
        0x87 => entry(op, F::Idle, M::System, W, "idle"),
        0x97 => entry(op, F::Pwrdn, M::System, W, "pwrdn"),
        0xA5 => entry(op, F::Diswdt, M::System, W, "diswdt"),
        0xA7 => entry(op, F::Srvwdt, M::System, W, "srvwdt"),
        0xB5 => entry(op, F::Einit, M::System, W, "einit"),
        0xB7 => entry(op, F::Srst, M::System, W, "srst"),

        // Extension.
        0xD1 => entry(op, F::ExtAtomic, M::ExtCount, W, "atomic"),
        0xD7 => entry(op, F::ExtImm, M::ExtImm, W, "exts"),
        0xDC => entry(op, F::ExtReg, M::ExtReg, W, "exts"),

        _ => None,
    }
}

const fn build_table() -> [Option<OpcodeInfo>; 256] {
    let mut table = [None; 256];
    let mut op = 0;
    while op < 256 {
        table[op] = describe(op as u8);
        op += 1;
    }
    table
}

static OPCODE_TABLE: [Option<OpcodeInfo>; 256] = build_table();

/// Looks up the descriptor of an opcode byte.
///
/// # Arguments
///
/// * `opcode` - First byte of the instruction.
///
/// # Returns
///
/// The descriptor, or `None` if the byte is not part of the instruction set.
#[inline]
pub fn lookup(opcode: u8) -> Option<&'static OpcodeInfo> {
    OPCODE_TABLE[opcode as usize].as_ref()
}

/// Iterates over every recognised opcode in byte order.
pub fn known_opcodes() -> impl Iterator<Item = &'static OpcodeInfo> {
    OPCODE_TABLE.iter().filter_map(Option::as_ref)
}
