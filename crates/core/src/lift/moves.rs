//! Data movement.
//!
//! Every MOV/MOVB write updates E, Z and N. Pointer registers are always word GPRs; the data
//! register follows the opcode's width. `[-SP]` and `[SP+]` are the compiler's push and pop
//! idioms and lift to stack operations.

use super::{Site, read_short, step_register, write_short};
use crate::il::{Expr, IlOp, Width};
use crate::isa::family::{Family, Form};
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;

fn set(reg: Reg, site: &Site<'_>, value: Expr) -> IlOp {
    IlOp::SetReg {
        reg,
        width: site.width(),
        value,
        flags: site.flags(),
    }
}

fn store(addr: Expr, site: &Site<'_>, value: Expr) -> IlOp {
    IlOp::Store {
        addr,
        width: site.width(),
        value,
        flags: site.flags(),
    }
}

/// True when `[-Rm]`/`[Rm+]` is a word access through the stack pointer.
fn is_stack_access(site: &Site<'_>, rm: u8) -> bool {
    site.width() == Width::Word && Reg::word(rm) == site.config.stack_pointer
}

/// MOV/MOVB in all sixteen operand forms.
pub(super) fn lift_mov(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let width = site.width();
    let (n, m) = (w.n_high(), w.n_low());
    let step = width.bytes() as i8;

    match site.info.form {
        Form::RegData4 => {
            ops.push(set(site.gpr(m), site, Expr::konst(u64::from(n), width)));
        }
        Form::RegReg => {
            ops.push(set(site.gpr(n), site, Expr::reg(site.gpr(m), width)));
        }
        Form::RegImm => {
            let imm = if site.info.is_byte() {
                u64::from(w.byte2())
            } else {
                u64::from(w.data16())
            };
            ops.push(write_short(
                site.short(w.byte1()),
                width,
                Expr::konst(imm, width),
                site.flags(),
            ));
        }
        Form::RegMem => {
            ops.push(write_short(
                site.short(w.byte1()),
                width,
                Expr::load(site.mem_operand(), width),
                site.flags(),
            ));
        }
        Form::MemReg => {
            let value = read_short(site.short(w.byte1()), width);
            ops.push(store(site.mem_operand(), site, value));
        }
        Form::IndMem => {
            let value = Expr::load(site.mem_operand(), width);
            ops.push(store(site.indirect(m, None), site, value));
        }
        Form::MemInd => {
            let value = Expr::load(site.indirect(m, None), width);
            ops.push(store(site.mem_operand(), site, value));
        }
        Form::PreDec => {
            let value = Expr::reg(site.gpr(n), width);
            if is_stack_access(site, m) {
                ops.push(IlOp::Push { width, value });
            } else {
                ops.push(step_register(Reg::word(m), Width::Word, -step));
                ops.push(store(site.indirect(m, None), site, value));
            }
        }
        Form::PostInc => {
            if is_stack_access(site, m) {
                ops.push(set(site.gpr(n), site, Expr::Pop(width)));
            } else {
                let value = Expr::load(site.indirect(m, None), width);
                ops.push(set(site.gpr(n), site, value));
                ops.push(step_register(Reg::word(m), Width::Word, step));
            }
        }
        Form::RegInd => {
            let value = Expr::load(site.indirect(m, None), width);
            ops.push(set(site.gpr(n), site, value));
        }
        Form::IndReg => {
            let value = Expr::reg(site.gpr(n), width);
            ops.push(store(site.indirect(m, None), site, value));
        }
        Form::IndInd | Form::IncInd | Form::IndInc => {
            let value = Expr::load(site.indirect(m, None), width);
            ops.push(store(site.indirect(n, None), site, value));
            match site.info.form {
                Form::IncInd => ops.push(step_register(Reg::word(n), Width::Word, step)),
                Form::IndInc => ops.push(step_register(Reg::word(m), Width::Word, step)),
                _ => {}
            }
        }
        Form::DispReg => {
            let value = Expr::reg(site.gpr(n), width);
            ops.push(store(site.indirect(m, Some(w.data16())), site, value));
        }
        Form::RegDisp => {
            let value = Expr::load(site.indirect(m, Some(w.data16())), width);
            ops.push(set(site.gpr(n), site, value));
        }
        _ => ops.push(IlOp::Unimplemented),
    }
}

/// MOVBS/MOVBZ: a byte source widened to a word destination.
pub(super) fn lift_extend(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let widen = |value: Expr| {
        if site.info.family == Family::Movbs {
            Expr::sx(Width::Word, value)
        } else {
            Expr::zx(Width::Word, value)
        }
    };

    let op = match site.info.form {
        Form::WordByte => IlOp::SetReg {
            reg: Reg::word(w.n_low()),
            width: Width::Word,
            value: widen(Expr::reg(Reg::byte(w.n_high()), Width::Byte)),
            flags: site.flags(),
        },
        Form::RegMem => write_short(
            site.short(w.byte1()),
            Width::Word,
            widen(Expr::load(site.mem_operand(), Width::Byte)),
            site.flags(),
        ),
        Form::MemReg => IlOp::Store {
            addr: site.mem_operand(),
            width: Width::Word,
            value: widen(read_short(site.short(w.byte1()), Width::Byte)),
            flags: site.flags(),
        },
        _ => IlOp::Unimplemented,
    };
    ops.push(op);
}
