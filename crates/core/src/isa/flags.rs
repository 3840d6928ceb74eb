//! Condition flags, flag-write policies and condition codes.
//!
//! The PSW carries five condition flags. Each instruction family declares which of them it
//! writes, and conditional branches select a 4-bit condition code that maps onto a host
//! flag condition.

use serde::{Deserialize, Serialize};
use tracing::debug;

/// One PSW condition flag.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Flag {
    /// Negative result.
    N,
    /// Carry / borrow.
    C,
    /// Overflow.
    V,
    /// Zero result.
    Z,
    /// End-of-table (result equals the most negative value).
    E,
}

impl Flag {
    /// Every flag, in PSW bit order.
    pub const ALL: [Self; 5] = [Self::N, Self::C, Self::V, Self::Z, Self::E];

    /// Lower-case flag name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::N => "n",
            Self::C => "c",
            Self::V => "v",
            Self::Z => "z",
            Self::E => "e",
        }
    }
}

/// Which flags an instruction family updates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagWrite {
    /// All five flags.
    All,
    /// Only Z.
    Zero,
    /// E, Z and N (data movement).
    Ezn,
}

impl FlagWrite {
    /// Flags written under this policy.
    pub const fn flags(self) -> &'static [Flag] {
        match self {
            Self::All => &Flag::ALL,
            Self::Zero => &[Flag::Z],
            Self::Ezn => &[Flag::E, Flag::Z, Flag::N],
        }
    }

    /// Short host-facing name of the flag group.
    pub const fn name(self) -> &'static str {
        match self {
            Self::All => "*",
            Self::Zero => "z",
            Self::Ezn => "ezn",
        }
    }
}

/// Host flag condition a branch can test.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlagCondition {
    /// Equal (Z set).
    E,
    /// Not equal (Z clear).
    Ne,
    /// Overflow.
    O,
    /// No overflow.
    No,
    /// Negative.
    Neg,
    /// Positive or zero.
    Pos,
    /// Unsigned less than.
    Ult,
    /// Unsigned less or equal.
    Ule,
    /// Unsigned greater or equal.
    Uge,
    /// Unsigned greater than.
    Ugt,
    /// Signed less than.
    Slt,
    /// Signed less or equal.
    Sle,
    /// Signed greater or equal.
    Sge,
    /// Signed greater than.
    Sgt,
}

impl FlagCondition {
    /// Flags the host must read to evaluate this condition.
    pub const fn required_flags(self) -> &'static [Flag] {
        match self {
            Self::E | Self::Ne => &[Flag::Z],
            Self::O | Self::No => &[Flag::V],
            Self::Neg | Self::Pos => &[Flag::N],
            Self::Ult | Self::Uge => &[Flag::C],
            Self::Ule | Self::Ugt => &[Flag::C, Flag::Z],
            Self::Slt | Self::Sge => &[Flag::N, Flag::V],
            Self::Sle | Self::Sgt => &[Flag::Z, Flag::N, Flag::V],
        }
    }
}

/// 4-bit condition code carried by conditional jumps and calls.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Condition {
    /// Unconditional.
    Uc,
    /// Not equal and not end-of-table.
    Net,
    /// Zero / equal.
    Z,
    /// Not zero / not equal.
    Nz,
    /// Overflow.
    V,
    /// No overflow.
    Nv,
    /// Negative.
    N,
    /// Not negative.
    Nn,
    /// Unsigned less than (carry).
    Ult,
    /// Unsigned greater or equal (no carry).
    Uge,
    /// Signed greater than.
    Sgt,
    /// Signed less or equal.
    Sle,
    /// Signed less than.
    Slt,
    /// Signed greater or equal.
    Sge,
    /// Unsigned greater than.
    Ugt,
    /// Unsigned less or equal.
    Ule,
}

impl Condition {
    /// Decodes a 4-bit condition field; only the low nibble is read.
    pub const fn from_bits(bits: u8) -> Self {
        match bits & 0xF {
            0x0 => Self::Uc,
            0x1 => Self::Net,
            0x2 => Self::Z,
            0x3 => Self::Nz,
            0x4 => Self::V,
            0x5 => Self::Nv,
            0x6 => Self::N,
            0x7 => Self::Nn,
            0x8 => Self::Ult,
            0x9 => Self::Uge,
            0xA => Self::Sgt,
            0xB => Self::Sle,
            0xC => Self::Slt,
            0xD => Self::Sge,
            0xE => Self::Ugt,
            _ => Self::Ule,
        }
    }

    /// Assembler spelling of the condition (`cc_uc`, `cc_z`, ...).
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uc => "cc_uc",
            Self::Net => "cc_net",
            Self::Z => "cc_z",
            Self::Nz => "cc_nz",
            Self::V => "cc_v",
            Self::Nv => "cc_nv",
            Self::N => "cc_n",
            Self::Nn => "cc_nn",
            Self::Ult => "cc_ult",
            Self::Uge => "cc_uge",
            Self::Sgt => "cc_sgt",
            Self::Sle => "cc_sle",
            Self::Slt => "cc_slt",
            Self::Sge => "cc_sge",
            Self::Ugt => "cc_ugt",
            Self::Ule => "cc_ule",
        }
    }

    /// True for `cc_uc`, which collapses a conditional transfer to an unconditional one.
    pub const fn is_unconditional(self) -> bool {
        matches!(self, Self::Uc)
    }

    /// Host flag condition tested by this code.
    ///
    /// `cc_uc` and `cc_net` have no single-condition equivalent and return `None`; the
    /// lifter expresses `cc_net` as a compound flag expression instead.
    pub fn flag_condition(self) -> Option<FlagCondition> {
        let cond = match self {
            Self::Z => FlagCondition::E,
            Self::Nz => FlagCondition::Ne,
            Self::V => FlagCondition::O,
            Self::Nv => FlagCondition::No,
            Self::N => FlagCondition::Neg,
            Self::Nn => FlagCondition::Pos,
            Self::Ult => FlagCondition::Ult,
            Self::Uge => FlagCondition::Uge,
            Self::Sgt => FlagCondition::Sgt,
            Self::Sle => FlagCondition::Sle,
            Self::Slt => FlagCondition::Slt,
            Self::Sge => FlagCondition::Sge,
            Self::Ugt => FlagCondition::Ugt,
            Self::Ule => FlagCondition::Ule,
            Self::Uc | Self::Net => {
                debug!(condition = self.name(), "no single flag condition for code");
                return None;
            }
        };
        Some(cond)
    }
}
