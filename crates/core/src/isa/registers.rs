//! Register file model.
//!
//! Register ids share one small integer space:
//! 1. **GPRs:** `0..=15` are the word registers `r0..r15`.
//! 2. **Byte registers:** `16..=31` are `rl0, rh0, .., rl7, rh7`, aliasing bytes of `r0..r7`.
//! 3. **System registers:** `32..=37` are `csp, cpucon1, cpucon2, psw, cp` and the virtual
//!    link register used to model return addresses.

use serde::{Deserialize, Serialize};

/// A register id in the lifter's register space.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Reg(pub u8);

/// Offset added to a 4-bit register field to name a byte register.
pub const BYTE_REG_OFFSET: u8 = 16;

/// Number of word GPRs.
pub const GPR_COUNT: u8 = 16;

/// Size of a code or data address in bytes (24-bit physical space).
pub const ADDRESS_SIZE: usize = 3;

/// Natural integer width in bytes.
pub const DEFAULT_INTEGER_SIZE: usize = 2;

/// Minimum instruction alignment in bytes.
pub const INSTRUCTION_ALIGNMENT: usize = 2;

/// Longest instruction encoding in bytes.
pub const MAX_INSTRUCTION_LENGTH: usize = 4;

/// Register names indexed by id.
const NAMES: [&str; 38] = [
    "r0", "r1", "r2", "r3", "r4", "r5", "r6", "r7", "r8", "r9", "r10", "r11", "r12", "r13",
    "r14", "r15", "rl0", "rh0", "rl1", "rh1", "rl2", "rh2", "rl3", "rh3", "rl4", "rh4", "rl5",
    "rh5", "rl6", "rh6", "rl7", "rh7", "csp", "cpucon1", "cpucon2", "psw", "cp", "lr",
];

impl Reg {
    /// Word register `r0`.
    pub const R0: Self = Self(0);
    /// Word register `r1`.
    pub const R1: Self = Self(1);
    /// Word register `r2`.
    pub const R2: Self = Self(2);
    /// Word register `r3`.
    pub const R3: Self = Self(3);
    /// Word register `r4`.
    pub const R4: Self = Self(4);
    /// Word register `r5`.
    pub const R5: Self = Self(5);
    /// Word register `r6`.
    pub const R6: Self = Self(6);
    /// Word register `r7`.
    pub const R7: Self = Self(7);
    /// Word register `r8`.
    pub const R8: Self = Self(8);
    /// Word register `r9`.
    pub const R9: Self = Self(9);
    /// Word register `r10`.
    pub const R10: Self = Self(10);
    /// Word register `r11`.
    pub const R11: Self = Self(11);
    /// Word register `r12`.
    pub const R12: Self = Self(12);
    /// Word register `r13`.
    pub const R13: Self = Self(13);
    /// Word register `r14`.
    pub const R14: Self = Self(14);
    /// Word register `r15`.
    pub const R15: Self = Self(15);
    /// Code segment pointer.
    pub const CSP: Self = Self(32);
    /// CPU control register 1.
    pub const CPUCON1: Self = Self(33);
    /// CPU control register 2.
    pub const CPUCON2: Self = Self(34);
    /// Processor status word.
    pub const PSW: Self = Self(35);
    /// Context pointer.
    pub const CP: Self = Self(36);
    /// Virtual link register holding the modelled return address.
    pub const VIRTUAL_LR: Self = Self(37);

    /// Word register `rN` for a 4-bit field value.
    #[inline(always)]
    pub const fn word(n: u8) -> Self {
        Self(n & 0xF)
    }

    /// Byte register `rlN`/`rhN` for a 4-bit field value (`0 -> rl0`, `1 -> rh0`, ...).
    #[inline(always)]
    pub const fn byte(n: u8) -> Self {
        Self((n & 0xF) + BYTE_REG_OFFSET)
    }

    /// Returns the lower-case assembler name, or `"r??"` for ids outside the register file.
    pub fn name(self) -> &'static str {
        NAMES.get(self.0 as usize).copied().unwrap_or("r??")
    }

    /// True for `r0..r15`.
    pub const fn is_gpr(self) -> bool {
        self.0 < GPR_COUNT
    }

    /// True for the byte sub-registers.
    pub const fn is_byte(self) -> bool {
        self.0 >= BYTE_REG_OFFSET && self.0 < BYTE_REG_OFFSET + 16
    }

    /// Describes where this register lives inside its full-width parent.
    pub const fn info(self) -> RegisterInfo {
        if self.is_byte() {
            let idx = self.0 - BYTE_REG_OFFSET;
            RegisterInfo {
                full_width: Self(idx / 2),
                offset: idx % 2,
                size: 1,
            }
        } else {
            RegisterInfo {
                full_width: self,
                offset: 0,
                size: 2,
            }
        }
    }
}

/// Placement of a register inside its full-width parent.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RegisterInfo {
    /// Full-width register containing this one.
    pub full_width: Reg,
    /// Byte offset inside the parent.
    pub offset: u8,
    /// Size in bytes.
    pub size: u8,
}

/// Every register id, in id order.
pub fn all_registers() -> impl Iterator<Item = Reg> {
    (0..NAMES.len() as u8).map(Reg)
}

/// System registers the host treats as global across functions.
pub const GLOBAL_REGISTERS: [Reg; 6] = [
    Reg::CSP,
    Reg::CPUCON1,
    Reg::CPUCON2,
    Reg::PSW,
    Reg::CP,
    Reg::VIRTUAL_LR,
];
