//! Intermediate representation emitted by the lifter.
//!
//! The IR is a small expression tree in the style of a low-level IL:
//! 1. **Expressions:** register reads, constants, memory loads, arithmetic with optional
//!    flag effects, sign/zero extension, flag reads and flag conditions.
//! 2. **Operations:** register/memory writes, stack traffic, control transfer and explicit
//!    "unrepresented effect" markers for behaviour that is not modelled.
//! 3. **Labels:** the host owns basic-block labels; the lifter asks for them through the
//!    [`LabelLookup`] seam.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::isa::flags::{Flag, FlagCondition, FlagWrite};
use crate::isa::registers::Reg;

/// Operand width in bytes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Width {
    /// One byte.
    Byte,
    /// Two bytes (the native word).
    Word,
    /// Three bytes (a physical address).
    Addr,
    /// Four bytes (the MDH:MDL pair).
    Long,
}

impl Width {
    /// Size in bytes.
    pub const fn bytes(self) -> u8 {
        match self {
            Self::Byte => 1,
            Self::Word => 2,
            Self::Addr => 3,
            Self::Long => 4,
        }
    }

    /// Mask selecting the low `bytes()` bytes of a value.
    pub const fn mask(self) -> u64 {
        match self {
            Self::Byte => 0xFF,
            Self::Word => 0xFFFF,
            Self::Addr => 0xFF_FFFF,
            Self::Long => 0xFFFF_FFFF,
        }
    }
}

/// Binary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinOp {
    /// Addition.
    Add,
    /// Subtraction.
    Sub,
    /// Bitwise and.
    And,
    /// Bitwise or.
    Or,
    /// Bitwise exclusive or.
    Xor,
    /// Logical shift left.
    Shl,
    /// Logical shift right.
    Lsr,
    /// Arithmetic shift right.
    Asr,
    /// Rotate left.
    Rol,
    /// Rotate right.
    Ror,
    /// Signed multiply.
    MulS,
    /// Unsigned multiply.
    MulU,
    /// Signed divide.
    DivS,
    /// Unsigned divide.
    DivU,
    /// Signed remainder.
    ModS,
    /// Unsigned remainder.
    ModU,
}

impl BinOp {
    /// Lower-case operator name used by the IR printer.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Sub => "sub",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Shl => "lsl",
            Self::Lsr => "lsr",
            Self::Asr => "asr",
            Self::Rol => "rol",
            Self::Ror => "ror",
            Self::MulS => "muls",
            Self::MulU => "mulu",
            Self::DivS => "divs",
            Self::DivU => "divu",
            Self::ModS => "mods",
            Self::ModU => "modu",
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnOp {
    /// Two's complement negation.
    Neg,
    /// Bitwise complement.
    Not,
}

/// An IR expression.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Expr {
    /// Register read.
    Reg {
        /// Register id.
        reg: Reg,
        /// Read width.
        width: Width,
    },
    /// Integer constant.
    Const {
        /// Value, already truncated to `width`.
        value: u64,
        /// Constant width.
        width: Width,
    },
    /// Constant pointer into the 24-bit physical address space.
    ConstPtr(u64),
    /// Memory load.
    Load {
        /// Address expression.
        addr: Box<Expr>,
        /// Load width.
        width: Width,
    },
    /// Binary arithmetic or logic, optionally updating flags.
    Binary {
        /// Operator.
        op: BinOp,
        /// Operation width.
        width: Width,
        /// Left operand.
        lhs: Box<Expr>,
        /// Right operand.
        rhs: Box<Expr>,
        /// Flags written by the operation.
        flags: Option<FlagWrite>,
    },
    /// Unary arithmetic or logic, optionally updating flags.
    Unary {
        /// Operator.
        op: UnOp,
        /// Operation width.
        width: Width,
        /// Operand.
        operand: Box<Expr>,
        /// Flags written by the operation.
        flags: Option<FlagWrite>,
    },
    /// Sign extension of the operand to `width`.
    SignExtend {
        /// Result width.
        width: Width,
        /// Narrower operand.
        operand: Box<Expr>,
    },
    /// Zero extension of the operand to `width`.
    ZeroExtend {
        /// Result width.
        width: Width,
        /// Narrower operand.
        operand: Box<Expr>,
    },
    /// Pop a value off the system stack.
    Pop(Width),
    /// Read one condition flag.
    Flag(Flag),
    /// Evaluate a host flag condition.
    Condition(FlagCondition),
    /// Logical conjunction of two boolean expressions.
    BoolAnd(Box<Expr>, Box<Expr>),
    /// Logical negation of a boolean expression.
    BoolNot(Box<Expr>),
    /// Value of an effect that is not modelled.
    Unimplemented,
}

impl Expr {
    /// Register read.
    pub const fn reg(reg: Reg, width: Width) -> Self {
        Self::Reg { reg, width }
    }

    /// Constant truncated to `width`.
    pub const fn konst(value: u64, width: Width) -> Self {
        Self::Const {
            value: value & width.mask(),
            width,
        }
    }

    /// Constant pointer.
    pub const fn ptr(addr: u64) -> Self {
        Self::ConstPtr(addr)
    }

    /// Memory load of `width` bytes at `addr`.
    pub fn load(addr: Self, width: Width) -> Self {
        Self::Load {
            addr: Box::new(addr),
            width,
        }
    }

    /// Binary operation without flag effects.
    pub fn binary(op: BinOp, width: Width, lhs: Self, rhs: Self) -> Self {
        Self::Binary {
            op,
            width,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
            flags: None,
        }
    }

    /// Unary operation without flag effects.
    pub fn unary(op: UnOp, width: Width, operand: Self) -> Self {
        Self::Unary {
            op,
            width,
            operand: Box::new(operand),
            flags: None,
        }
    }

    /// Sign extension to `width`.
    pub fn sx(width: Width, operand: Self) -> Self {
        Self::SignExtend {
            width,
            operand: Box::new(operand),
        }
    }

    /// Zero extension to `width`.
    pub fn zx(width: Width, operand: Self) -> Self {
        Self::ZeroExtend {
            width,
            operand: Box::new(operand),
        }
    }

    /// Logical conjunction.
    pub fn bool_and(lhs: Self, rhs: Self) -> Self {
        Self::BoolAnd(Box::new(lhs), Box::new(rhs))
    }

    /// Logical negation.
    pub fn bool_not(operand: Self) -> Self {
        Self::BoolNot(Box::new(operand))
    }

    /// Attaches a flag-write policy to an arithmetic expression.
    ///
    /// Expressions that cannot carry flags are returned unchanged.
    pub fn with_flags(self, policy: Option<FlagWrite>) -> Self {
        match self {
            Self::Binary {
                op,
                width,
                lhs,
                rhs,
                ..
            } => Self::Binary {
                op,
                width,
                lhs,
                rhs,
                flags: policy,
            },
            Self::Unary {
                op, width, operand, ..
            } => Self::Unary {
                op,
                width,
                operand,
                flags: policy,
            },
            other => other,
        }
    }
}

/// Host basic-block label.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Label(pub u64);

/// One IR operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IlOp {
    /// Register write.
    SetReg {
        /// Destination register.
        reg: Reg,
        /// Write width.
        width: Width,
        /// Value written.
        value: Expr,
        /// Flags derived from the written value.
        flags: Option<FlagWrite>,
    },
    /// Memory write.
    Store {
        /// Address expression.
        addr: Expr,
        /// Store width.
        width: Width,
        /// Value written.
        value: Expr,
        /// Flags derived from the written value.
        flags: Option<FlagWrite>,
    },
    /// Explicit flag write.
    SetFlag {
        /// Flag written.
        flag: Flag,
        /// New value.
        value: Expr,
    },
    /// Push onto the system stack.
    Push {
        /// Push width.
        width: Width,
        /// Value pushed.
        value: Expr,
    },
    /// Expression evaluated only for its flag effects.
    Compute(Expr),
    /// Jump to a computed or constant address.
    Jump(Expr),
    /// Jump to a host label.
    Goto(Label),
    /// Call.
    Call(Expr),
    /// Return to the address held by the expression.
    Return(Expr),
    /// Conditional branch between two host labels.
    If {
        /// Boolean condition.
        cond: Expr,
        /// Label taken when the condition holds.
        then: Label,
        /// Label taken otherwise.
        otherwise: Label,
    },
    /// Execution does not continue past this point.
    NoReturn,
    /// No operation.
    Nop,
    /// The instruction has an effect that is not modelled.
    Unimplemented,
    /// Unmodelled write to memory at `addr`.
    UnimplementedMemRef {
        /// Width of the touched cell.
        width: Width,
        /// Address expression.
        addr: Expr,
    },
}

/// Label lookup provided by the host.
///
/// The lifter resolves both the taken target and the fall-through of a conditional branch
/// through this trait; a missing label is a host-side invariant violation.
pub trait LabelLookup {
    /// Returns the label of the basic block starting at `addr`, if the host created one.
    fn label_for(&self, addr: u64) -> Option<Label>;
}

/// Label lookup that never finds a label.
///
/// Useful for linear disassembly, where direct jumps degrade to constant-pointer jumps.
#[derive(Clone, Copy, Debug, Default)]
pub struct NoLabels;

impl LabelLookup for NoLabels {
    fn label_for(&self, _addr: u64) -> Option<Label> {
        None
    }
}

/// Sequence of IR operations appended by the lifter.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IlFunction {
    ops: Vec<IlOp>,
}

impl IlFunction {
    /// Creates an empty function.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends every operation of one instruction.
    pub fn extend(&mut self, ops: impl IntoIterator<Item = IlOp>) {
        self.ops.extend(ops);
    }

    /// Operations appended so far.
    pub fn ops(&self) -> &[IlOp] {
        &self.ops
    }

    /// Number of operations.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True if nothing has been appended.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Drops every operation.
    pub fn clear(&mut self) {
        self.ops.clear();
    }
}

// ── Printing ─────────────────────────────────────────────────

fn flag_suffix(flags: Option<FlagWrite>) -> String {
    flags.map(|f| format!(" @{}", f.name())).unwrap_or_default()
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reg { reg, .. } => write!(f, "{}", reg.name()),
            Self::Const { value, .. } => write!(f, "{value:#x}"),
            Self::ConstPtr(addr) => write!(f, "&{addr:#x}"),
            Self::Load { addr, width } => write!(f, "[{addr}].{}", width.bytes()),
            Self::Binary {
                op,
                width,
                lhs,
                rhs,
                flags,
            } => write!(
                f,
                "{}.{}({lhs}, {rhs}){}",
                op.name(),
                width.bytes(),
                flag_suffix(*flags)
            ),
            Self::Unary {
                op,
                width,
                operand,
                flags,
            } => {
                let name = match op {
                    UnOp::Neg => "neg",
                    UnOp::Not => "not",
                };
                write!(
                    f,
                    "{name}.{}({operand}){}",
                    width.bytes(),
                    flag_suffix(*flags)
                )
            }
            Self::SignExtend { width, operand } => write!(f, "sx.{}({operand})", width.bytes()),
            Self::ZeroExtend { width, operand } => write!(f, "zx.{}({operand})", width.bytes()),
            Self::Pop(width) => write!(f, "pop.{}", width.bytes()),
            Self::Flag(flag) => write!(f, "flag:{}", flag.name()),
            Self::Condition(cond) => write!(f, "cond:{cond:?}"),
            Self::BoolAnd(lhs, rhs) => write!(f, "({lhs} && {rhs})"),
            Self::BoolNot(operand) => write!(f, "!{operand}"),
            Self::Unimplemented => f.write_str("unimplemented"),
        }
    }
}

impl fmt::Display for IlOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SetReg {
                reg, value, flags, ..
            } => write!(f, "{} = {value}{}", reg.name(), flag_suffix(*flags)),
            Self::Store {
                addr,
                width,
                value,
                flags,
            } => write!(
                f,
                "[{addr}].{} = {value}{}",
                width.bytes(),
                flag_suffix(*flags)
            ),
            Self::SetFlag { flag, value } => write!(f, "flag:{} = {value}", flag.name()),
            Self::Push { value, .. } => write!(f, "push({value})"),
            Self::Compute(expr) => write!(f, "{expr}"),
            Self::Jump(target) => write!(f, "jump({target})"),
            Self::Goto(label) => write!(f, "goto L{}", label.0),
            Self::Call(target) => write!(f, "call({target})"),
            Self::Return(target) => write!(f, "return({target})"),
            Self::If {
                cond,
                then,
                otherwise,
            } => write!(f, "if ({cond}) then L{} else L{}", then.0, otherwise.0),
            Self::NoReturn => f.write_str("noreturn"),
            Self::Nop => f.write_str("nop"),
            Self::Unimplemented => f.write_str("unimplemented"),
            Self::UnimplementedMemRef { width, addr } => {
                write!(f, "unimplemented [{addr}].{}", width.bytes())
            }
        }
    }
}
