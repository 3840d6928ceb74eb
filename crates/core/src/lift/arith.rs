//! Arithmetic and logic families.
//!
//! The eight two-operand families of the regular `0x00..=0x79` block share one routine: the
//! opcode table supplies the operand form and width, [`AluOp`] supplies the operator.

use super::{Site, read_short, step_register, write_short};
use crate::il::{BinOp, Expr, IlOp, UnOp, Width};
use crate::isa::family::{Family, Form};
use crate::isa::flags::{Flag, FlagWrite};
use crate::isa::instruction::InstructionBits;
use crate::isa::registers::Reg;
use crate::resolve::ShortTarget;

/// `[Rwi]` operand-mode selector.
const MODE_INDIRECT: u8 = 0b10;
/// `[Rwi+]` operand-mode selector.
const MODE_POST_INCREMENT: u8 = 0b11;

/// Operator of the regular arithmetic block.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum AluOp {
    Add,
    AddCarry,
    Sub,
    SubBorrow,
    And,
    Or,
    Xor,
    Compare,
}

impl AluOp {
    const fn from_family(family: Family) -> Option<Self> {
        Some(match family {
            Family::Add => Self::Add,
            Family::Addc => Self::AddCarry,
            Family::Sub => Self::Sub,
            Family::Subc => Self::SubBorrow,
            Family::And => Self::And,
            Family::Or => Self::Or,
            Family::Xor => Self::Xor,
            Family::Cmp => Self::Compare,
            _ => return None,
        })
    }

    const fn bin_op(self) -> BinOp {
        match self {
            Self::Add | Self::AddCarry => BinOp::Add,
            Self::Sub | Self::SubBorrow | Self::Compare => BinOp::Sub,
            Self::And => BinOp::And,
            Self::Or => BinOp::Or,
            Self::Xor => BinOp::Xor,
        }
    }

    /// `lhs op rhs`, folding the carry in for ADDC/SUBC.
    fn apply(self, width: Width, lhs: Expr, rhs: Expr, flags: Option<FlagWrite>) -> Expr {
        let op = self.bin_op();
        let value = match self {
            Self::AddCarry | Self::SubBorrow => Expr::binary(
                op,
                width,
                Expr::binary(op, width, lhs, rhs),
                Expr::zx(width, Expr::Flag(Flag::C)),
            ),
            _ => Expr::binary(op, width, lhs, rhs),
        };
        value.with_flags(flags)
    }
}

/// Where the result of a two-operand instruction goes.
enum Destination {
    Register(Reg),
    Short(ShortTarget),
    Memory(Expr),
}

impl Destination {
    fn write(self, width: Width, value: Expr) -> IlOp {
        match self {
            Self::Register(reg) => IlOp::SetReg {
                reg,
                width,
                value,
                flags: None,
            },
            Self::Short(target) => write_short(target, width, value, None),
            Self::Memory(addr) => IlOp::Store {
                addr,
                width,
                value,
                flags: None,
            },
        }
    }
}

/// Decoded operands of a two-operand instruction.
struct Operands {
    dst: Destination,
    lhs: Expr,
    rhs: Expr,
    /// Side effect that follows the operation (`[Rwi+]` increment).
    post: Option<IlOp>,
}

fn operands(site: &Site<'_>) -> Option<Operands> {
    let w = site.w;
    let width = site.width();

    let operands = match site.info.form {
        Form::RegReg => {
            let rn = site.gpr(w.n_high());
            Operands {
                dst: Destination::Register(rn),
                lhs: Expr::reg(rn, width),
                rhs: Expr::reg(site.gpr(w.n_low()), width),
                post: None,
            }
        }
        Form::RegIndirect => {
            let rn = site.gpr(w.n_high());
            let rwi = w.rwi();
            let (rhs, post) = match w.rwi_mode() {
                MODE_INDIRECT => (Expr::load(site.indirect(rwi, None), width), None),
                MODE_POST_INCREMENT => (
                    Expr::load(site.indirect(rwi, None), width),
                    Some(step_register(
                        Reg::word(rwi),
                        Width::Word,
                        width.bytes() as i8,
                    )),
                ),
                _ => (Expr::konst(u64::from(w.data3()), width), None),
            };
            Operands {
                dst: Destination::Register(rn),
                lhs: Expr::reg(rn, width),
                rhs,
                post,
            }
        }
        Form::RegImm => {
            let target = site.short(w.byte1());
            let imm = if site.info.is_byte() {
                u64::from(w.byte2())
            } else {
                u64::from(w.data16())
            };
            Operands {
                dst: Destination::Short(target),
                lhs: read_short(target, width),
                rhs: Expr::konst(imm, width),
                post: None,
            }
        }
        Form::RegMem => {
            let target = site.short(w.byte1());
            Operands {
                dst: Destination::Short(target),
                lhs: read_short(target, width),
                rhs: Expr::load(site.mem_operand(), width),
                post: None,
            }
        }
        Form::MemReg => {
            let mem = site.mem_operand();
            Operands {
                lhs: Expr::load(mem.clone(), width),
                dst: Destination::Memory(mem),
                rhs: read_short(site.short(w.byte1()), width),
                post: None,
            }
        }
        _ => return None,
    };
    Some(operands)
}

/// ADD/ADDC/SUB/SUBC/AND/OR/XOR/CMP and their byte forms.
///
/// CMP evaluates the subtraction for its flags only.
pub(super) fn lift_binary(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let (Some(op), Some(operands)) = (AluOp::from_family(site.info.family), operands(site))
    else {
        ops.push(IlOp::Unimplemented);
        return;
    };

    let width = site.width();
    let value = op.apply(width, operands.lhs, operands.rhs, site.flags());
    if op == AluOp::Compare {
        ops.push(IlOp::Compute(value));
    } else {
        ops.push(operands.dst.write(width, value));
    }
    ops.extend(operands.post);
}

/// CMPD1/CMPD2/CMPI1/CMPI2: compare, then step the register by 1 or 2.
pub(super) fn lift_compare_step(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let w = site.w;
    let rw = Reg::word(w.n_low());
    let rhs = match site.info.form {
        Form::RegData4 => Expr::konst(u64::from(w.n_high()), Width::Word),
        Form::RwMem => Expr::load(site.mem_operand(), Width::Word),
        _ => Expr::konst(u64::from(w.data16()), Width::Word),
    };
    let step = match site.info.family {
        Family::Cmpi1 => 1,
        Family::Cmpi2 => 2,
        Family::Cmpd1 => -1,
        _ => -2,
    };

    ops.push(IlOp::Compute(
        Expr::binary(BinOp::Sub, Width::Word, Expr::reg(rw, Width::Word), rhs)
            .with_flags(site.flags()),
    ));
    ops.push(step_register(rw, Width::Word, step));
}

/// NEG/NEGB/CPL/CPLB on the register in the high nibble.
pub(super) fn lift_unary(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    let width = site.width();
    let reg = site.gpr(site.w.n_high());
    let op = if site.info.family == Family::Neg {
        UnOp::Neg
    } else {
        UnOp::Not
    };
    ops.push(IlOp::SetReg {
        reg,
        width,
        value: Expr::unary(op, width, Expr::reg(reg, width)).with_flags(site.flags()),
        flags: None,
    });
}

/// PRIOR: the normalization count is not modelled, only the write to `Rwn` and the flags.
pub(super) fn lift_prior(site: &Site<'_>, ops: &mut Vec<IlOp>) {
    ops.push(IlOp::SetReg {
        reg: Reg::word(site.w.n_high()),
        width: Width::Word,
        value: Expr::Unimplemented,
        flags: site.flags(),
    });
}
