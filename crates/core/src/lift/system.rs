//! NOP and the protected system-control instructions.

use super::Site;
use crate::il::IlOp;
use crate::isa::family::Family;

/// PWRDN never returns; IDLE, SRST and the watchdog/init controls are left unmodelled.
pub(super) fn lift(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    ops.push(match site.info.family {
        Family::Nop => IlOp::Nop,
        Family::Pwrdn => IlOp::NoReturn,
        _ => IlOp::Unimplemented,
    });
}
