//! Control transfer.
//!
//! Targets come from the same helpers the classifier uses, so a lifted branch always agrees
//! with the classified shape. Direct jumps prefer a host label and fall back to a constant
//! pointer; conditional transfers need labels for both the target and the fall-through.

use super::bits::{clear_bit, set_bit};
use super::{Site, read_short, write_short};
use crate::common::LiftError;
use crate::common::constants::SEGMENT_MASK;
use crate::il::{BinOp, Expr, IlOp, Width};
use crate::isa::decode::{
    bit_rel_target, caddr_target, cond_high, rel_target, seg_target, trap_target,
};
use crate::isa::family::Family;
use crate::isa::flags::{Condition, Flag, FlagCondition};
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;

/// Boolean expression testing a condition code.
///
/// `cc_net` has no single host flag condition and becomes `!Z && !E`.
fn condition_expr(cond: Condition) -> Expr {
    cond.flag_condition().map_or_else(
        || {
            Expr::bool_and(
                Expr::bool_not(Expr::Flag(Flag::Z)),
                Expr::bool_not(Expr::Flag(Flag::E)),
            )
        },
        Expr::Condition,
    )
}

/// `Goto` when the host has a label for `target`, otherwise a constant-pointer jump.
fn direct_jump(site: &Site<'_>, target: u64) -> IlOp {
    site.labels
        .label_for(target)
        .map_or_else(|| IlOp::Jump(Expr::ptr(target)), IlOp::Goto)
}

/// `If cond then target else fall-through`.
fn branch_if(site: &Site<'_>, cond: Expr, target: u64) -> Result<IlOp, LiftError> {
    Ok(IlOp::If {
        cond,
        then: site.label(target)?,
        otherwise: site.label(site.next())?,
    })
}

/// `(addr & 0xFF0000) | zx(Rwn)`: an indirect target inside the current segment.
fn segment_relative(site: &Site<'_>, rw: u8) -> Expr {
    Expr::binary(
        BinOp::Or,
        Width::Addr,
        Expr::konst(site.addr & SEGMENT_MASK, Width::Addr),
        Expr::zx(Width::Addr, Expr::reg(Reg::word(rw), Width::Word)),
    )
}

/// JB/JBC/JNB/JNBS `bitaddr.q, rel`.
///
/// The bit test writes Z; JBC clears and JNBS sets the tested bit after the test.
pub(super) fn lift_bit_branch(site: &Site<'_>, ops: &mut Vec<IlOp>) -> Result<(), LiftError> {
    let w = site.w;
    let family = site.info.family;
    let cell = site.bit_cell(w.byte1());
    let pos = w.q_pos();
    let mask = Expr::konst(1u64 << pos, Width::Word);

    ops.push(IlOp::Compute(
        Expr::binary(BinOp::And, Width::Word, read_short(cell, Width::Word), mask)
            .with_flags(site.flags()),
    ));
    match family {
        Family::Jbc => ops.push(write_short(
            cell,
            Width::Word,
            clear_bit(read_short(cell, Width::Word), pos),
            None,
        )),
        Family::Jnbs => ops.push(write_short(
            cell,
            Width::Word,
            set_bit(read_short(cell, Width::Word), pos),
            None,
        )),
        _ => {}
    }

    let cond = if matches!(family, Family::Jb | Family::Jbc) {
        FlagCondition::Ne
    } else {
        FlagCondition::E
    };
    ops.push(branch_if(site, Expr::Condition(cond), bit_rel_target(site.addr, w))?);
    Ok(())
}

/// JMPR/JMPA/JMPS/JMPI.
pub(super) fn lift_jump(site: &Site<'_>, ops: &mut Vec<IlOp>) -> Result<(), LiftError> {
    let w = site.w;
    let (cond, target) = match site.info.family {
        Family::Jmpr => (Condition::from_bits(w.opcode_high()), rel_target(site.addr, w)),
        Family::Jmpa => (cond_high(w), caddr_target(site.addr, w)),
        Family::Jmps => (Condition::Uc, seg_target(w)),
        _ => {
            if !cond_high(w).is_unconditional() {
                return Err(site.unsupported("conditional indirect transfer"));
            }
            ops.push(IlOp::Jump(segment_relative(site, w.n_low())));
            return Ok(());
        }
    };

    if cond.is_unconditional() {
        ops.push(direct_jump(site, target));
    } else {
        ops.push(branch_if(site, condition_expr(cond), target)?);
    }
    Ok(())
}

/// CALLR/CALLA/CALLS/CALLI and TRAP.
///
/// A conditional CALLA is a two-way branch between the callee and the fall-through.
pub(super) fn lift_call(site: &Site<'_>, ops: &mut Vec<IlOp>) -> Result<(), LiftError> {
    let w = site.w;
    let op = match site.info.family {
        Family::Callr => IlOp::Call(Expr::ptr(rel_target(site.addr, w))),
        Family::Calls => IlOp::Call(Expr::ptr(seg_target(w))),
        Family::Trap => IlOp::Call(Expr::ptr(trap_target(site.addr, w))),
        Family::Calla => {
            let cond = cond_high(w);
            let target = caddr_target(site.addr, w);
            if cond.is_unconditional() {
                IlOp::Call(Expr::ptr(target))
            } else {
                branch_if(site, condition_expr(cond), target)?
            }
        }
        _ => {
            if !cond_high(w).is_unconditional() {
                return Err(site.unsupported("conditional indirect transfer"));
            }
            IlOp::Call(segment_relative(site, w.n_low()))
        }
    };
    ops.push(op);
    Ok(())
}

/// RET/RETI/RETS/RETP return through the link register.
pub(super) fn lift_return(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let link = site.config.link_register.unwrap_or(Reg::VIRTUAL_LR);
    ops.push(IlOp::Return(Expr::reg(link, Width::Addr)));
}
