//! Instruction encoding and bit-field extraction utilities.
//!
//! Instructions are 2 or 4 bytes. The decoder packs the bytes little-endian into a `u32`
//! (byte 0 in bits 0-7, byte 3 in bits 24-31) and every field is a shift-and-mask on that
//! word. Fields of a 2-byte instruction live entirely in the low half, so the upper bytes of
//! a short encoding are simply never read.

/// Bit mask for one byte of the packed word.
pub const BYTE_MASK: u32 = 0xFF;
/// Bit mask for a 4-bit register or immediate field.
pub const NIBBLE_MASK: u32 = 0xF;
/// Bit shift of byte 1 (register pair / short address / displacement).
pub const BYTE1_SHIFT: u32 = 8;
/// Bit shift of byte 2 (low byte of the 16-bit operand).
pub const BYTE2_SHIFT: u32 = 16;
/// Bit shift of byte 3 (high byte of the 16-bit operand).
pub const BYTE3_SHIFT: u32 = 24;
/// Bit shift of the high nibble of byte 1.
pub const N_HIGH_SHIFT: u32 = 12;
/// Bit mask for the 3-bit immediate of the `#data3` operand form.
pub const DATA3_MASK: u32 = 0x7;
/// Bit mask for the indirect register index of the `[Rwi]` operand form.
pub const RWI_MASK: u32 = 0x3;
/// Bit shift of the two-bit operand-mode selector of the `[Rwi]`/`#data3` forms.
pub const RWI_MODE_SHIFT: u32 = 10;
/// Bit shift of the extension-instruction count field.
pub const EXT_COUNT_SHIFT: u32 = 12;
/// Bit shift of the extension-instruction sub-opcode.
pub const EXT_SUBOP_SHIFT: u32 = 14;

/// Packs up to four instruction bytes little-endian into a `u32`.
///
/// Missing bytes read as zero; callers check the available length against the opcode's
/// length before trusting fields from the upper half.
///
/// # Arguments
///
/// * `bytes` - Instruction bytes starting at the opcode.
///
/// # Returns
///
/// The packed instruction word.
#[inline(always)]
pub fn pack(bytes: &[u8]) -> u32 {
    bytes
        .iter()
        .take(4)
        .enumerate()
        .fold(0, |acc, (i, b)| acc | (u32::from(*b) << (8 * i)))
}

/// Sign-extends an 8-bit displacement.
#[inline(always)]
pub const fn sign_extend8(value: u8) -> i64 {
    value as i8 as i64
}

/// Trait for extracting instruction fields from a packed instruction word.
///
/// Field names follow the assembler manual: `n`/`m` are register nibbles of byte 1,
/// `data16`/`mem` the little-endian operand in bytes 2-3, `q`/`z` the bit positions of
/// the two-operand bit instructions.
pub trait InstructionBits {
    /// Opcode byte (byte 0).
    fn opcode(&self) -> u8;
    /// High nibble of the opcode byte (bit position of BCLR/BSET, condition of JMPR).
    fn opcode_high(&self) -> u8;
    /// Byte 1 (short register address, bit offset, segment or displacement).
    fn byte1(&self) -> u8;
    /// Byte 2.
    fn byte2(&self) -> u8;
    /// Byte 3.
    fn byte3(&self) -> u8;
    /// High nibble of byte 1 (first register operand in `nm` encodings).
    fn n_high(&self) -> u8;
    /// Low nibble of byte 1 (second register operand in `nm` encodings).
    fn n_low(&self) -> u8;
    /// 3-bit immediate of the `#data3` form.
    fn data3(&self) -> u8;
    /// Indirect register index of the `[Rwi]` form (selects `r0..r3`).
    fn rwi(&self) -> u8;
    /// Operand-mode selector of the `[Rwi]`/`[Rwi+]`/`#data3` forms.
    fn rwi_mode(&self) -> u8;
    /// 16-bit little-endian operand in bytes 2-3.
    fn data16(&self) -> u16;
    /// Signed 8-bit displacement in byte 1 (JMPR, CALLR).
    fn rel8(&self) -> i64;
    /// Signed 8-bit displacement in byte 2 (JB family).
    fn bit_rel8(&self) -> i64;
    /// Source bit position (high nibble of byte 3).
    fn q_pos(&self) -> u8;
    /// Destination bit position (low nibble of byte 3).
    fn z_pos(&self) -> u8;
    /// Number of instructions an extension instruction covers (1..=4).
    fn ext_count(&self) -> u8;
    /// Extension-instruction sub-opcode (bits 7-6 of byte 1).
    fn ext_subop(&self) -> u8;
    /// 10-bit page number of the immediate EXTP forms.
    fn page10(&self) -> u16;
}

impl InstructionBits for u32 {
    #[inline(always)]
    fn opcode(&self) -> u8 {
        (self & BYTE_MASK) as u8
    }

    #[inline(always)]
    fn opcode_high(&self) -> u8 {
        ((self >> 4) & NIBBLE_MASK) as u8
    }

    #[inline(always)]
    fn byte1(&self) -> u8 {
        ((self >> BYTE1_SHIFT) & BYTE_MASK) as u8
    }

    #[inline(always)]
    fn byte2(&self) -> u8 {
        ((self >> BYTE2_SHIFT) & BYTE_MASK) as u8
    }

    #[inline(always)]
    fn byte3(&self) -> u8 {
        ((self >> BYTE3_SHIFT) & BYTE_MASK) as u8
    }

    #[inline(always)]
    fn n_high(&self) -> u8 {
        ((self >> N_HIGH_SHIFT) & NIBBLE_MASK) as u8
    }

    #[inline(always)]
    fn n_low(&self) -> u8 {
        ((self >> BYTE1_SHIFT) & NIBBLE_MASK) as u8
    }

    #[inline(always)]
    fn data3(&self) -> u8 {
        ((self >> BYTE1_SHIFT) & DATA3_MASK) as u8
    }

    #[inline(always)]
    fn rwi(&self) -> u8 {
        ((self >> BYTE1_SHIFT) & RWI_MASK) as u8
    }

    #[inline(always)]
    fn rwi_mode(&self) -> u8 {
        ((self >> RWI_MODE_SHIFT) & 0x3) as u8
    }

    #[inline(always)]
    fn data16(&self) -> u16 {
        (self >> BYTE2_SHIFT) as u16
    }

    #[inline(always)]
    fn rel8(&self) -> i64 {
        sign_extend8(self.byte1())
    }

    #[inline(always)]
    fn bit_rel8(&self) -> i64 {
        sign_extend8(self.byte2())
    }

    #[inline(always)]
    fn q_pos(&self) -> u8 {
        ((self >> 28) & NIBBLE_MASK) as u8
    }

    #[inline(always)]
    fn z_pos(&self) -> u8 {
        ((self >> BYTE3_SHIFT) & NIBBLE_MASK) as u8
    }

    #[inline(always)]
    fn ext_count(&self) -> u8 {
        (((self >> EXT_COUNT_SHIFT) & 0x3) + 1) as u8
    }

    #[inline(always)]
    fn ext_subop(&self) -> u8 {
        ((self >> EXT_SUBOP_SHIFT) & 0x3) as u8
    }

    #[inline(always)]
    fn page10(&self) -> u16 {
        (u16::from(self.byte3() & 0x3) << 8) | u16::from(self.byte2())
    }
}
