//! Physical Address Constants.
//!
//! This module defines the fixed physical addresses the resolver and lifter target. It includes:
//! 1. **SFR Areas:** Bases of the standard and extended special-function-register windows.
//! 2. **Bit Areas:** Bases of the bit-addressable RAM and SFR regions.
//! 3. **Named SFRs:** Data page pointers, multiply/divide registers and constant registers.
//! 4. **Address Layout:** Page and segment geometry of the 16 MiB address space.

/// Base address of the standard SFR window (short addresses `0x00..=0xEF`).
pub const SFR_BASE: u32 = 0xFE00;

/// Base address of the extended SFR window, selected under a register-bank override.
pub const ESFR_BASE: u32 = 0xF000;

/// Base address of the bit-addressable internal RAM (bit offsets `0x00..=0x7F`).
pub const BIT_RAM_BASE: u32 = 0xFD00;

/// Base address of the bit-addressable standard SFRs (bit offsets `0x80..=0xEF`).
pub const BIT_SFR_BASE: u32 = 0xFF00;

/// Base address of the bit-addressable extended SFRs, selected under a register-bank override.
pub const BIT_ESFR_BASE: u32 = 0xF100;

/// Largest short address or bit offset that still denotes a memory-mapped register.
pub const SHORT_SFR_LIMIT: u32 = 0xEF;

/// Largest bit offset that denotes a word in the bit-addressable RAM.
pub const BIT_RAM_LIMIT: u32 = 0x7F;

/// Physical address of DPP0; DPP1..DPP3 follow at 2-byte strides.
pub const DPP0: u32 = 0xFE00;

/// Physical address of the 32-bit multiply/divide register pair (MDH:MDL).
pub const MD: u32 = 0xFE0C;

/// Physical address of the high word of the multiply/divide register.
pub const MDH: u32 = 0xFE0C;

/// Physical address of the low word of the multiply/divide register.
pub const MDL: u32 = 0xFE0E;

/// Read-only SFR that always reads as `0x0000`.
pub const ZEROS: u32 = 0xFF1C;

/// Read-only SFR that always reads as `0xFFFF`.
pub const ONES: u32 = 0xFF1E;

/// Number of bits a page number is shifted by to form a physical address (16 KiB pages).
pub const PAGE_SHIFT: u32 = 14;

/// Mask selecting the in-page offset of a 16-bit operand.
pub const PAGE_OFFSET_MASK: u32 = 0x3FFF;

/// Mask selecting the DPP slot bits (top two bits) of a 16-bit operand.
pub const DPP_SELECT_MASK: u32 = 0xC000;

/// Number of bits a segment number is shifted by to form a physical address (64 KiB segments).
pub const SEGMENT_SHIFT: u32 = 16;

/// Mask selecting the segment bits of a 24-bit code address.
pub const SEGMENT_MASK: u64 = 0xFF_0000;

/// Mask selecting the significant bits of a page number.
pub const PAGE10_MASK: u32 = 0x3FF;

/// Mask selecting the significant bits of a segment number.
pub const SEGMENT8_MASK: u32 = 0xFF;
