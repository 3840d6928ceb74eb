//! Extension-state tracking.
//!
//! The C166 extension instructions (EXTR, EXTS, EXTP and their combinations) change how the
//! next one to four instructions resolve addresses. This module records those overrides per
//! instruction address:
//! 1. **State:** [`ExtensionKind`] bits plus the override values of one site.
//! 2. **Store:** [`ExtensionStore`], the mutex-guarded table with set/query/propagate.
//! 3. **Codec:** The fixed-size record format used to persist the table.

use std::fmt;
use std::ops::{BitOr, BitOrAssign};

use serde::{Deserialize, Serialize};

use crate::common::constants::{PAGE10_MASK, SEGMENT8_MASK};

/// Persisted-blob record encoding.
pub mod codec;

mod store;

pub use store::ExtensionStore;

/// Set of overrides active at one instruction site.
///
/// Bits combine: a register-bank and a page override can be active at the same address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ExtensionKind(u8);

impl ExtensionKind {
    /// No override.
    pub const NONE: Self = Self(0x00);
    /// Register-bank override: short addresses select the extended SFR window.
    pub const REGISTER_BANK: Self = Self(0x01);
    /// Segment override for memory operands.
    pub const SEGMENT: Self = Self(0x02);
    /// Page override for memory operands.
    pub const PAGE: Self = Self(0x04);
    /// Per-site replacement of the four data page pointers.
    pub const CUSTOM_DPP: Self = Self(0x10);

    /// Builds a kind from its persisted bit pattern, keeping unknown bits.
    pub const fn from_bits(bits: u8) -> Self {
        Self(bits)
    }

    /// Persisted bit pattern.
    pub const fn bits(self) -> u8 {
        self.0
    }

    /// True if every bit of `other` is set.
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// True if no bit is set.
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }

    /// Bits set in both.
    pub const fn intersection(self, other: Self) -> Self {
        Self(self.0 & other.0)
    }

    /// Overrides carried forward by propagation (everything except custom DPPs).
    pub const fn propagating(self) -> Self {
        self.intersection(Self(
            Self::REGISTER_BANK.0 | Self::SEGMENT.0 | Self::PAGE.0,
        ))
    }
}

impl BitOr for ExtensionKind {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for ExtensionKind {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Debug for ExtensionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_empty() {
            return f.write_str("NONE");
        }
        let names = [
            (Self::REGISTER_BANK, "REGISTER_BANK"),
            (Self::SEGMENT, "SEGMENT"),
            (Self::PAGE, "PAGE"),
            (Self::CUSTOM_DPP, "CUSTOM_DPP"),
        ];
        let mut first = true;
        for (kind, name) in names {
            if self.contains(kind) {
                if !first {
                    f.write_str(" | ")?;
                }
                f.write_str(name)?;
                first = false;
            }
        }
        let unknown = self.0 & !0x17;
        if unknown != 0 {
            if !first {
                f.write_str(" | ")?;
            }
            write!(f, "{unknown:#04x}")?;
        }
        Ok(())
    }
}

/// Override state of one instruction site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtensionState {
    /// Active overrides.
    pub kind: ExtensionKind,
    /// Instructions after this one that the override still covers.
    pub remaining: u8,
    /// Page number, valid with [`ExtensionKind::PAGE`].
    pub page10: u32,
    /// Segment number, valid with [`ExtensionKind::SEGMENT`].
    pub segment8: u32,
    /// Data page pointers, valid with [`ExtensionKind::CUSTOM_DPP`].
    pub dpp: [u32; 4],
}

impl ExtensionState {
    /// True if no override is active.
    pub const fn is_default(&self) -> bool {
        self.kind.is_empty()
    }

    /// Page override, if active.
    pub const fn page(&self) -> Option<u32> {
        if self.kind.contains(ExtensionKind::PAGE) {
            Some(self.page10 & PAGE10_MASK)
        } else {
            None
        }
    }

    /// Segment override, if active.
    pub const fn segment(&self) -> Option<u32> {
        if self.kind.contains(ExtensionKind::SEGMENT) {
            Some(self.segment8 & SEGMENT8_MASK)
        } else {
            None
        }
    }

    /// True under a register-bank override.
    pub const fn register_bank(&self) -> bool {
        self.kind.contains(ExtensionKind::REGISTER_BANK)
    }

    /// Custom DPP vector, if active.
    pub const fn custom_dpp(&self) -> Option<[u32; 4]> {
        if self.kind.contains(ExtensionKind::CUSTOM_DPP) {
            Some(page_vector(self.dpp))
        } else {
            None
        }
    }
}

/// Limits each DPP entry to a 10-bit page number.
pub const fn page_vector(dpp: [u32; 4]) -> [u32; 4] {
    [
        dpp[0] & PAGE10_MASK,
        dpp[1] & PAGE10_MASK,
        dpp[2] & PAGE10_MASK,
        dpp[3] & PAGE10_MASK,
    ]
}
