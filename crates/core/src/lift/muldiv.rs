//! Multiply and divide.
//!
//! Results land in the MDH:MDL register pair, which is memory mapped, so every effect is a
//! store to a constant SFR address.

use super::Site;
use crate::common::constants::{MD, MDH, MDL};
use crate::il::{BinOp, Expr, IlOp, Width};
use crate::isa::family::Family;
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;

/// MUL/MULU: `MD = Rwn * Rwm`.
pub(super) fn lift_multiply(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let op = if site.info.family == Family::Mul {
        BinOp::MulS
    } else {
        BinOp::MulU
    };
    let product = Expr::binary(
        op,
        Width::Long,
        Expr::reg(Reg::word(w.n_high()), Width::Word),
        Expr::reg(Reg::word(w.n_low()), Width::Word),
    )
    .with_flags(site.flags());

    ops.push(IlOp::Store {
        addr: Expr::ptr(u64::from(MD)),
        width: Width::Long,
        value: product,
        flags: None,
    });
}

/// DIV/DIVU divide MDL, DIVL/DIVLU divide the whole MD pair; quotient to MDL, remainder to
/// MDH.
pub(super) fn lift_divide(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let divisor = Expr::reg(Reg::word(site.w.n_high()), Width::Word);
    let (div, rem) = match site.info.family {
        Family::Div | Family::Divl => (BinOp::DivS, BinOp::ModS),
        _ => (BinOp::DivU, BinOp::ModU),
    };
    let dividend = match site.info.family {
        Family::Divl | Family::Divlu => Expr::load(Expr::ptr(u64::from(MD)), Width::Long),
        _ => Expr::load(Expr::ptr(u64::from(MDL)), Width::Word),
    };

    let quotient = Expr::binary(div, Width::Word, dividend.clone(), divisor.clone())
        .with_flags(site.flags());
    let remainder =
        Expr::binary(rem, Width::Word, dividend, divisor).with_flags(site.flags());

    ops.push(IlOp::Store {
        addr: Expr::ptr(u64::from(MDL)),
        width: Width::Word,
        value: quotient,
        flags: None,
    });
    ops.push(IlOp::Store {
        addr: Expr::ptr(u64::from(MDH)),
        width: Width::Word,
        value: remainder,
        flags: None,
    });
}
