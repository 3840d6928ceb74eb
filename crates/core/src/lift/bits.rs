//! Bit manipulation.
//!
//! Every bit operand is a 16-bit cell (a GPR or a word in one of the bit-addressable areas)
//! plus a bit position. Single-bit results are merged back into the destination cell with a
//! mask, so the IR only ever reads and writes whole words.

use super::{Site, read_short, write_short};
use crate::il::{BinOp, Expr, IlOp, UnOp, Width};
use crate::isa::family::Family;
use crate::isa::flags::Flag;
use crate::isa::instruction::InstructionBits;
use crate::resolve::ShortTarget;

fn word(value: u64) -> Expr {
    Expr::konst(value, Width::Word)
}

fn bin(op: BinOp, lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(op, Width::Word, lhs, rhs)
}

/// `(cell >> pos) & 1`.
fn bit_of(cell: Expr, pos: u8) -> Expr {
    bin(BinOp::And, bin(BinOp::Lsr, cell, word(u64::from(pos))), word(1))
}

/// `cell & !(1 << pos)`.
pub(super) fn clear_bit(cell: Expr, pos: u8) -> Expr {
    bin(BinOp::And, cell, word(!(1u64 << pos) & Width::Word.mask()))
}

/// `cell | (1 << pos)`.
pub(super) fn set_bit(cell: Expr, pos: u8) -> Expr {
    bin(BinOp::Or, cell, word(1u64 << pos))
}

/// BSET/BCLR `bitoff.n`, with the bit position in the opcode's high nibble.
pub(super) fn lift_single(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let cell = site.bit_cell(w.byte1());
    let pos = w.opcode_high();
    let current = read_short(cell, Width::Word);

    let value = if site.info.family == Family::Bclr {
        clear_bit(current, pos)
    } else {
        set_bit(current, pos)
    };
    ops.push(write_short(cell, Width::Word, value, site.flags()));
}

/// Source (`q`) and destination (`z`) cells and positions of a two-operand bit instruction.
struct BitPair {
    q: ShortTarget,
    q_pos: u8,
    z: ShortTarget,
    z_pos: u8,
}

impl BitPair {
    fn decode(site: &Site<'_>) -> Self {
        let w = site.w;
        Self {
            q: site.bit_cell(w.byte1()),
            q_pos: w.q_pos(),
            z: site.bit_cell(w.byte2()),
            z_pos: w.z_pos(),
        }
    }

    fn q_bit(&self) -> Expr {
        bit_of(read_short(self.q, Width::Word), self.q_pos)
    }

    fn z_bit(&self) -> Expr {
        bit_of(read_short(self.z, Width::Word), self.z_pos)
    }
}

/// BAND/BOR/BXOR/BMOV/BMOVN `bitaddrZ.z, bitaddrQ.q`.
pub(super) fn lift_pair(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let pair = BitPair::decode(site);

    let bit = match site.info.family {
        Family::Band => bin(BinOp::And, pair.q_bit(), pair.z_bit()),
        Family::Bor => bin(BinOp::Or, pair.q_bit(), pair.z_bit()),
        Family::Bxor => bin(BinOp::Xor, pair.q_bit(), pair.z_bit()),
        Family::Bmovn => {
            let q = read_short(pair.q, Width::Word);
            let shifted = bin(BinOp::Lsr, q, word(u64::from(pair.q_pos)));
            bin(
                BinOp::And,
                Expr::unary(UnOp::Not, Width::Word, shifted),
                word(1),
            )
        }
        _ => pair.q_bit(),
    };

    let merged = bin(
        BinOp::Or,
        bin(BinOp::Shl, bit, word(u64::from(pair.z_pos))),
        clear_bit(read_short(pair.z, Width::Word), pair.z_pos),
    );
    ops.push(write_short(pair.z, Width::Word, merged, site.flags()));
}

/// BCMP: compares the two bits and derives every flag from them.
pub(super) fn lift_compare(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let pair = BitPair::decode(site);
    let (q, z) = (pair.q_bit(), pair.z_bit());

    ops.push(IlOp::SetFlag {
        flag: Flag::E,
        value: word(0),
    });
    ops.push(IlOp::SetFlag {
        flag: Flag::Z,
        value: Expr::unary(UnOp::Not, Width::Word, bin(BinOp::Or, q.clone(), z.clone())),
    });
    ops.push(IlOp::SetFlag {
        flag: Flag::V,
        value: bin(BinOp::Or, q.clone(), z.clone()),
    });
    ops.push(IlOp::SetFlag {
        flag: Flag::C,
        value: bin(BinOp::And, q.clone(), z.clone()),
    });
    ops.push(IlOp::SetFlag {
        flag: Flag::N,
        value: bin(BinOp::Xor, q, z),
    });
}

/// BFLDH/BFLDL: only the touched byte is reported.
pub(super) fn lift_field(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    match site.bit_cell(site.w.byte1()) {
        ShortTarget::Gpr(_) => ops.push(IlOp::Unimplemented),
        ShortTarget::Mem(addr) => {
            let byte = if site.info.family == Family::Bfldh {
                addr + 1
            } else {
                addr
            };
            ops.push(IlOp::UnimplementedMemRef {
                width: Width::Byte,
                addr: Expr::ptr(u64::from(byte)),
            });
        }
    }
}
