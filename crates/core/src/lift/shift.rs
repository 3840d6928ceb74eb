//! Shifts and rotates.

use super::Site;
use crate::il::{BinOp, Expr, IlOp, Width};
use crate::isa::family::{Family, Form};
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;

/// ROL/ROR/SHL/SHR/ASHR in the `Rwn, Rwm` and `Rwn, #data4` forms.
///
/// The register form shifts `Rwn` (high nibble) by `Rwm`; the immediate form shifts the
/// register in the low nibble by the count in the high nibble.
pub(super) fn lift(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let op = match site.info.family {
        Family::Rol => BinOp::Rol,
        Family::Ror => BinOp::Ror,
        Family::Shl => BinOp::Shl,
        Family::Shr => BinOp::Lsr,
        _ => BinOp::Asr,
    };
    let (reg, amount) = if site.info.form == Form::RegData4 {
        (
            Reg::word(w.n_low()),
            Expr::konst(u64::from(w.n_high()), Width::Byte),
        )
    } else {
        (
            Reg::word(w.n_high()),
            Expr::reg(Reg::word(w.n_low()), Width::Word),
        )
    };

    ops.push(IlOp::SetReg {
        reg,
        width: Width::Word,
        value: Expr::binary(op, Width::Word, Expr::reg(reg, Width::Word), amount),
        flags: site.flags(),
    });
}
