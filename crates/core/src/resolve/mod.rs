//! Address and Operand Resolver.
//!
//! Translates encoded operands into registers or physical addresses under the extension
//! state recorded for the instruction's own address:
//! 1. **Register-short addresses:** `0x00..=0xEF` name a word in the SFR window (the extended
//!    window under a register-bank override); `0xF0..=0xFF` name a GPR of the current bank.
//! 2. **Bit offsets:** the same split, with `0x00..=0x7F` addressing the bit-addressable RAM.
//! 3. **Memory operands:** the top two bits pick a data page pointer unless a page or segment
//!    override replaces the translation. Precedence is page, segment, custom DPP, default DPP.
//! 4. **Register-indirect operands:** an IR computation over the register's runtime value.
//!    Here a segment override wins over a page override, and without either the DPP is read
//!    at runtime.
//!
//! The resolver only reads the store.

use crate::common::constants::{
    BIT_ESFR_BASE, BIT_RAM_BASE, BIT_RAM_LIMIT, BIT_SFR_BASE, DPP_SELECT_MASK, DPP0, ESFR_BASE,
    ONES, PAGE_OFFSET_MASK, PAGE_SHIFT, SEGMENT_SHIFT, SFR_BASE, SHORT_SFR_LIMIT, ZEROS,
};
use crate::il::{BinOp, Expr, Width};
use crate::isa::registers::Reg;
use crate::state::{ExtensionState, ExtensionStore, page_vector};

/// Mask of the register nibble of a GPR short address.
const GPR_NIBBLE_MASK: u8 = 0xF;

/// Mask of the SFR index of a bit offset in the SFR bit area.
const BIT_SFR_INDEX_MASK: u32 = 0x7F;

/// What a register-short address or bit offset denotes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ShortTarget {
    /// GPR of the current register bank, by 4-bit index.
    Gpr(u8),
    /// Memory-mapped register word at a physical address.
    Mem(u32),
}

impl ShortTarget {
    /// Register id for a GPR target at the given operand width.
    pub const fn as_reg(self, width: Width) -> Option<Reg> {
        match self {
            Self::Gpr(n) => Some(if matches!(width, Width::Byte) {
                Reg::byte(n)
            } else {
                Reg::word(n)
            }),
            Self::Mem(_) => None,
        }
    }
}

/// Value of a constant SFR (`ZEROS`, `ONES`), if `addr` is one.
pub const fn constant_register(addr: u32) -> Option<u16> {
    match addr {
        ZEROS => Some(0x0000),
        ONES => Some(0xFFFF),
        _ => None,
    }
}

/// Read-only view of the extension store used to resolve operands.
#[derive(Clone, Copy, Debug)]
pub struct Resolver<'a> {
    store: &'a ExtensionStore,
}

impl<'a> Resolver<'a> {
    /// Creates a resolver over `store`.
    pub const fn new(store: &'a ExtensionStore) -> Self {
        Self { store }
    }

    /// Resolves an 8-bit register-short address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the instruction carrying the operand.
    /// * `code` - The short address.
    pub fn resolve_register_short(&self, addr: u64, code: u8) -> ShortTarget {
        if u32::from(code) > SHORT_SFR_LIMIT {
            return ShortTarget::Gpr(code & GPR_NIBBLE_MASK);
        }
        let base = if self.store.query_register_bank(addr) {
            ESFR_BASE
        } else {
            SFR_BASE
        };
        ShortTarget::Mem(base + 2 * u32::from(code))
    }

    /// Resolves an 8-bit bit offset to the word holding the bit.
    pub fn resolve_bit_offset(&self, addr: u64, bitoff: u8) -> ShortTarget {
        let off = u32::from(bitoff);
        if off <= BIT_RAM_LIMIT {
            ShortTarget::Mem(BIT_RAM_BASE + 2 * off)
        } else if off <= SHORT_SFR_LIMIT {
            let base = if self.store.query_register_bank(addr) {
                BIT_ESFR_BASE
            } else {
                BIT_SFR_BASE
            };
            ShortTarget::Mem(base + 2 * (off & BIT_SFR_INDEX_MASK))
        } else {
            ShortTarget::Gpr(bitoff & GPR_NIBBLE_MASK)
        }
    }

    /// Translates a 16-bit memory operand into a physical address.
    ///
    /// # Arguments
    ///
    /// * `addr` - Address of the instruction carrying the operand.
    /// * `mem` - The raw 16-bit operand.
    ///
    /// # Returns
    ///
    /// The 24-bit physical address.
    pub fn resolve_memory_operand(&self, addr: u64, mem: u16) -> u64 {
        let state = self.store.get(addr);
        translate(&state, self.store.default_dpp(), mem)
    }

    /// Builds the address expression of a register-indirect operand `[Rw]` or `[Rw+#disp]`.
    ///
    /// Segment and page overrides apply as constants, segment first. Without one, the data
    /// page pointer is selected at runtime by the top bits of the offset, so the expression
    /// loads it from the DPP SFRs.
    pub fn resolve_indirect(&self, addr: u64, rw: Reg, disp: Option<u16>) -> Expr {
        let state = self.store.get(addr);
        let offset = match disp {
            None => Expr::reg(rw, Width::Word),
            Some(d) => Expr::binary(
                BinOp::And,
                Width::Word,
                Expr::binary(
                    BinOp::Add,
                    Width::Word,
                    Expr::reg(rw, Width::Word),
                    Expr::konst(u64::from(d), Width::Word),
                ),
                Expr::konst(0xFFFF, Width::Word),
            ),
        };

        if let Some(segment) = state.segment() {
            return or_addr(shifted_const(segment, SEGMENT_SHIFT), offset);
        }
        if let Some(page) = state.page() {
            return or_addr(
                shifted_const(page, PAGE_SHIFT),
                and_const(offset, PAGE_OFFSET_MASK),
            );
        }

        // DPPn lives at DPP0 + 2*n, n = offset[15:14].
        let slot = Expr::binary(
            BinOp::Lsr,
            Width::Word,
            and_const(offset.clone(), DPP_SELECT_MASK),
            Expr::konst(u64::from(PAGE_SHIFT), Width::Byte),
        );
        let dpp_addr = Expr::binary(
            BinOp::Add,
            Width::Addr,
            Expr::ptr(u64::from(DPP0)),
            Expr::binary(
                BinOp::Shl,
                Width::Word,
                slot,
                Expr::konst(1, Width::Byte),
            ),
        );
        let page_base = Expr::binary(
            BinOp::Shl,
            Width::Addr,
            Expr::load(dpp_addr, Width::Word),
            Expr::konst(u64::from(PAGE_SHIFT), Width::Byte),
        );
        or_addr(page_base, and_const(offset, PAGE_OFFSET_MASK))
    }
}

/// Applies the page > segment > custom DPP > default DPP precedence to a memory operand.
///
/// Page and DPP numbers are 10 bits and segments 8 bits, so the result stays inside the
/// 24-bit address space.
pub fn translate(state: &ExtensionState, default_dpp: [u32; 4], mem: u16) -> u64 {
    let mem = u32::from(mem);
    let in_page = u64::from(mem & PAGE_OFFSET_MASK);
    if let Some(page) = state.page() {
        return (u64::from(page) << PAGE_SHIFT) | in_page;
    }
    if let Some(segment) = state.segment() {
        return (u64::from(segment) << SEGMENT_SHIFT) | u64::from(mem);
    }
    let slot = ((mem & DPP_SELECT_MASK) >> PAGE_SHIFT) as usize;
    let dpp = state
        .custom_dpp()
        .unwrap_or_else(|| page_vector(default_dpp));
    (u64::from(dpp[slot]) << PAGE_SHIFT) | in_page
}

fn shifted_const(value: u32, shift: u32) -> Expr {
    Expr::binary(
        BinOp::Shl,
        Width::Addr,
        Expr::konst(u64::from(value), Width::Addr),
        Expr::konst(u64::from(shift), Width::Byte),
    )
}

fn and_const(expr: Expr, mask: u32) -> Expr {
    Expr::binary(
        BinOp::And,
        Width::Word,
        expr,
        Expr::konst(u64::from(mask), Width::Word),
    )
}

fn or_addr(lhs: Expr, rhs: Expr) -> Expr {
    Expr::binary(BinOp::Or, Width::Addr, lhs, rhs)
}
