//! Opcode Classifier.
//!
//! Maps an instruction's bytes to its length and control-flow shape. The function is pure:
//! it never consults the extension-state store, because no override changes how long an
//! instruction is or where a branch goes.
//!
//! # Branch targets
//!
//! - `jmpr`/`callr`: `addr + 2*sx(byte1) + 2`.
//! - `jb`/`jbc`/`jnb`/`jnbs`: `addr + 2*sx(byte2) + 4`.
//! - `jmpa`/`calla`: `(addr & 0xFF0000) + caddr` (same segment).
//! - `jmps`/`calls`: `(seg << 16) | caddr`.
//! - `trap`: `(addr & 0xFF0000) + 4*trap7`.

use tracing::debug;

use crate::common::LiftError;
use crate::common::constants::{SEGMENT_MASK, SEGMENT_SHIFT};
use crate::isa::family::{self, Family, OpcodeInfo};
use crate::isa::flags::Condition;
use crate::isa::instruction::{InstructionBits, pack};

/// Width of one relative-displacement step in bytes.
const REL_STEP: i64 = 2;

/// Mask selecting the trap number from byte 1 once shifted down by one.
const TRAP7_MASK: u8 = 0x7F;

/// Bytes per trap-vector slot.
const TRAP_VECTOR_STRIDE: u64 = 4;

/// Control-flow shape of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BranchShape {
    /// Falls through to `addr + length`.
    None,
    /// Always transfers to the target.
    Unconditional(u64),
    /// Transfers to `target` when the condition holds, otherwise to `fallthrough`.
    Conditional {
        /// Taken target.
        target: u64,
        /// Next sequential instruction (`addr + length`).
        fallthrough: u64,
    },
    /// Calls the target and returns to `addr + length`.
    Call(u64),
    /// Returns from the current routine.
    Return,
    /// Transfers through a register whose value is unknown statically.
    IndirectUnresolved,
}

/// Length and control-flow shape of one instruction.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InstructionInfo {
    /// Encoded length in bytes (2 or 4).
    pub length: usize,
    /// Control-flow shape.
    pub branch: BranchShape,
}

/// Looks up the descriptor of the instruction at `addr` and packs its bytes.
///
/// Shared by the classifier, the lifter and the renderer so that the three agree on which
/// opcodes exist and how many bytes each needs.
///
/// # Arguments
///
/// * `bytes` - Bytes starting at the instruction; may be longer than the instruction.
/// * `addr` - Address of the first byte.
///
/// # Returns
///
/// The static descriptor and the packed instruction word.
pub fn fetch(bytes: &[u8], addr: u64) -> Result<(&'static OpcodeInfo, u32), LiftError> {
    let Some(&opcode) = bytes.first() else {
        return Err(LiftError::Truncated {
            addr,
            needed: 2,
            available: 0,
        });
    };
    let info = family::lookup(opcode).ok_or(LiftError::UnknownOpcode { addr, opcode })?;
    let needed = info.length();
    if bytes.len() < needed {
        return Err(LiftError::Truncated {
            addr,
            needed,
            available: bytes.len(),
        });
    }
    Ok((info, pack(&bytes[..needed])))
}

/// Classifies the instruction at `addr`.
///
/// # Arguments
///
/// * `bytes` - Bytes starting at the instruction.
/// * `addr` - Address of the first byte.
///
/// # Returns
///
/// The instruction's length and branch shape, or an error for unknown opcodes, short
/// buffers and the explicitly unsupported conditional-indirect and `pcall` forms.
pub fn classify(bytes: &[u8], addr: u64) -> Result<InstructionInfo, LiftError> {
    let (info, w) = fetch(bytes, addr)?;
    let length = info.length();
    let next = addr.wrapping_add(length as u64);

    let branch = match info.family {
        Family::Jmpr => {
            let target = rel_target(addr, w);
            conditional(Condition::from_bits(w.opcode_high()), target, next)
        }
        Family::Jmpa => conditional(cond_high(w), caddr_target(addr, w), next),
        Family::Calla => {
            let target = caddr_target(addr, w);
            if cond_high(w).is_unconditional() {
                BranchShape::Call(target)
            } else {
                BranchShape::Conditional {
                    target,
                    fallthrough: next,
                }
            }
        }
        Family::Jmps => BranchShape::Unconditional(seg_target(w)),
        Family::Calls => BranchShape::Call(seg_target(w)),
        Family::Callr => BranchShape::Call(rel_target(addr, w)),
        Family::Trap => BranchShape::Call(trap_target(addr, w)),
        Family::Jb | Family::Jbc | Family::Jnb | Family::Jnbs => BranchShape::Conditional {
            target: bit_rel_target(addr, w),
            fallthrough: next,
        },
        Family::Jmpi | Family::Calli => {
            if !cond_high(w).is_unconditional() {
                debug!(addr, mnemonic = info.mnemonic, "conditional indirect transfer");
                return Err(LiftError::UnsupportedVariant {
                    addr,
                    mnemonic: info.mnemonic,
                    detail: "conditional indirect transfer",
                });
            }
            BranchShape::IndirectUnresolved
        }
        Family::Pcall => {
            debug!(addr, "pcall is not modelled");
            return Err(LiftError::UnsupportedVariant {
                addr,
                mnemonic: info.mnemonic,
                detail: "pcall is not modelled",
            });
        }
        Family::Ret | Family::Reti | Family::Rets | Family::Retp => BranchShape::Return,
        _ => BranchShape::None,
    };

    Ok(InstructionInfo { length, branch })
}

fn conditional(cond: Condition, target: u64, fallthrough: u64) -> BranchShape {
    if cond.is_unconditional() {
        BranchShape::Unconditional(target)
    } else {
        BranchShape::Conditional {
            target,
            fallthrough,
        }
    }
}

// ── Target helpers (shared with the lifter and renderer) ─────

/// Condition code in the high nibble of byte 1.
#[inline]
pub fn cond_high(w: u32) -> Condition {
    Condition::from_bits(w.n_high())
}

/// Target of `jmpr`/`callr`.
#[inline]
pub fn rel_target(addr: u64, w: u32) -> u64 {
    addr.wrapping_add_signed(w.rel8() * REL_STEP).wrapping_add(2)
}

/// Target of the `jb` family.
#[inline]
pub fn bit_rel_target(addr: u64, w: u32) -> u64 {
    addr.wrapping_add_signed(w.bit_rel8() * REL_STEP)
        .wrapping_add(4)
}

/// Target of `jmpa`/`calla`, inside the current segment.
#[inline]
pub fn caddr_target(addr: u64, w: u32) -> u64 {
    (addr & SEGMENT_MASK) + u64::from(w.data16())
}

/// Target of `jmps`/`calls`.
#[inline]
pub fn seg_target(w: u32) -> u64 {
    (u64::from(w.byte1()) << SEGMENT_SHIFT) | u64::from(w.data16())
}

/// Trap number of `trap #trap7`.
#[inline]
pub fn trap7(w: u32) -> u8 {
    (w.byte1() >> 1) & TRAP7_MASK
}

/// Vector address of `trap #trap7`.
#[inline]
pub fn trap_target(addr: u64, w: u32) -> u64 {
    (addr & SEGMENT_MASK) + u64::from(trap7(w)) * TRAP_VECTOR_STRIDE
}
