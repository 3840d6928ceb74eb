//! System stack traffic: PUSH, POP and SCXT.

use super::{Site, read_short, write_short};
use crate::il::{Expr, IlOp, Width};
use crate::isa::family::{Family, Form};
use crate::isa::instruction::InstructionBits;

/// PUSH/POP `reg` and SCXT `reg, #data16` / `reg, mem`.
///
/// SCXT saves the old register value before loading the new one.
pub(super) fn lift(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let target = site.short(w.byte1());

    match site.info.family {
        Family::Push => ops.push(IlOp::Push {
            width: Width::Word,
            value: read_short(target, Width::Word),
        }),
        Family::Pop => ops.push(write_short(
            target,
            Width::Word,
            Expr::Pop(Width::Word),
            site.flags(),
        )),
        _ => {
            let value = if site.info.form == Form::RegImm {
                Expr::konst(u64::from(w.data16()), Width::Word)
            } else {
                Expr::load(site.mem_operand(), Width::Word)
            };
            ops.push(IlOp::Push {
                width: Width::Word,
                value: read_short(target, Width::Word),
            });
            ops.push(write_short(target, Width::Word, value, site.flags()));
        }
    }
}
