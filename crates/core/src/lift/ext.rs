//! Extension instructions.
//!
//! ATOMIC/EXTR/EXTS/EXTP and their register forms have no data effect of their own. Their
//! effect is on how the following `#irang2` instructions resolve operands, which the lifter
//! records in the extension store once the instruction has lifted.

use super::Site;
use crate::il::IlOp;
use crate::isa::family::{Family, OpcodeInfo};
use crate::isa::instruction::InstructionBits;
use crate::state::ExtensionStore;

/// `ATOMIC` / `EXTS` sub-opcode.
const SUBOP_PLAIN: u8 = 0b00;
/// `EXTP` sub-opcode.
const SUBOP_PAGE: u8 = 0b01;
/// `EXTR` / `EXTSR` sub-opcode.
const SUBOP_REG: u8 = 0b10;
/// `EXTPR` sub-opcode.
const SUBOP_PAGE_REG: u8 = 0b11;

/// The sequence lifts to an unrepresented effect.
pub(super) fn lift(_site: &Site<'_>, ops: &mut Vec<IlOp>) {
    ops.push(IlOp::Unimplemented);
}

/// Addressing override an extension instruction establishes for its successors.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(super) struct Override {
    register_bank: bool,
    segment: Option<u32>,
    page: Option<u32>,
    /// Instructions covered after the first one.
    span: u8,
}

impl Override {
    /// Writes the override at `at`, the address of the first covered instruction.
    pub(super) fn record(&self, store: &ExtensionStore, at: u64) {
        if self.register_bank {
            store.set_register_bank(at, self.span);
        }
        if let Some(segment) = self.segment {
            store.set_segment(at, segment, self.span);
        }
        if let Some(page) = self.page {
            store.set_page(at, page, self.span);
        }
    }

    const fn is_empty(&self) -> bool {
        !self.register_bank && self.segment.is_none() && self.page.is_none()
    }
}

/// Decodes the override of an extension instruction; `None` for every other opcode and for
/// forms whose operand is only known at runtime (ATOMIC, register-sourced EXTS/EXTP).
pub(super) fn decode_override(info: &OpcodeInfo, w: u32) -> Option<Override> {
    let subop = w.ext_subop();
    let mut extension = Override {
        span: w.ext_count() - 1,
        ..Override::default()
    };

    match info.family {
        // ATOMIC only locks out interrupts, so only EXTR switches the register bank.
        Family::ExtAtomic => extension.register_bank = subop == SUBOP_REG,
        Family::ExtImm => {
            extension.register_bank = matches!(subop, SUBOP_REG | SUBOP_PAGE_REG);
            match subop {
                SUBOP_PLAIN | SUBOP_REG => extension.segment = Some(u32::from(w.byte2())),
                SUBOP_PAGE | SUBOP_PAGE_REG => extension.page = Some(u32::from(w.page10())),
                _ => {}
            }
        }
        Family::ExtReg => extension.register_bank = matches!(subop, SUBOP_REG | SUBOP_PAGE_REG),
        _ => return None,
    }

    (!extension.is_empty()).then_some(extension)
}
