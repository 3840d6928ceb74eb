//! CPU-variant configuration.
//!
//! The supported toolchain variants differ only in which register is the stack pointer,
//! whether a virtual link register models return addresses, and the calling convention.
//! This module provides:
//! 1. **Defaults:** The reset-time DPP vector.
//! 2. **Variants:** [`CpuVariant`] and the per-variant [`CallingConvention`] tables.
//! 3. **Configuration:** [`CpuConfig`], built from a variant or deserialized from JSON.
//!
//! # Example
//!
//! ```
//! use c166_core::config::{CpuConfig, CpuVariant};
//! use c166_core::isa::registers::Reg;
//!
//! let cfg = CpuConfig::from_json(r#"{ "variant": "TaskingV2" }"#).unwrap();
//! assert_eq!(cfg.variant, CpuVariant::TaskingV2);
//! assert_eq!(cfg.stack_pointer, Reg::R0);
//! assert_eq!(cfg.link_register, Some(Reg::VIRTUAL_LR));
//! ```

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::common::ConfigError;
use crate::isa::registers::Reg;

/// Default configuration constants.
mod defaults {
    /// DPP0..DPP3 after reset.
    ///
    /// Every data page pointer resets to page 0, so untranslated operands land in the
    /// first 64 KiB until firmware reprograms them.
    pub const DEFAULT_DPP: [u32; 4] = [0, 0, 0, 0];
}

/// Toolchain/CPU variant.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub enum CpuVariant {
    /// Tasking VX toolchain; R15 is the stack pointer.
    #[default]
    TaskingVx,
    /// Tasking classic toolchain; R0 is the stack pointer.
    TaskingClassic,
    /// Tasking V2 toolchain; R0 is the stack pointer and returns go through a virtual link
    /// register.
    TaskingV2,
}

impl CpuVariant {
    /// Every variant.
    pub const ALL: [Self; 3] = [Self::TaskingVx, Self::TaskingClassic, Self::TaskingV2];

    /// Architecture name as registered with a host.
    pub const fn arch_name(self) -> &'static str {
        match self {
            Self::TaskingVx => "c166tvx",
            Self::TaskingClassic => "c166tc",
            Self::TaskingV2 => "c166v2",
        }
    }

    /// Stack-pointer register.
    pub const fn stack_pointer(self) -> Reg {
        match self {
            Self::TaskingVx => Reg::R15,
            Self::TaskingClassic | Self::TaskingV2 => Reg::R0,
        }
    }

    /// Link register, for the variants that model one.
    pub const fn link_register(self) -> Option<Reg> {
        match self {
            Self::TaskingV2 => Some(Reg::VIRTUAL_LR),
            Self::TaskingVx | Self::TaskingClassic => None,
        }
    }

    /// Default calling convention.
    pub fn calling_convention(self) -> CallingConvention {
        match self {
            Self::TaskingVx => CallingConvention::tasking_vx(),
            Self::TaskingClassic => CallingConvention::tasking_classic(),
            Self::TaskingV2 => CallingConvention::tasking_v2(),
        }
    }
}

impl fmt::Display for CpuVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.arch_name())
    }
}

impl FromStr for CpuVariant {
    type Err = ConfigError;

    /// Accepts the architecture names (`c166tvx`) and the short forms (`vx`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "vx" | "c166tvx" | "taskingvx" => Ok(Self::TaskingVx),
            "classic" | "c166tc" | "taskingclassic" => Ok(Self::TaskingClassic),
            "v2" | "c166v2" | "taskingv2" => Ok(Self::TaskingV2),
            _ => Err(ConfigError::UnknownVariant(s.to_owned())),
        }
    }
}

/// Register-usage convention a host applies at call sites.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallingConvention {
    /// Convention name (`c166-vx`, ...).
    pub name: String,
    /// Integer argument registers, in order.
    pub argument_registers: Vec<Reg>,
    /// Registers preserved across calls.
    pub callee_saved: Vec<Reg>,
    /// Registers a call may clobber.
    pub caller_saved: Vec<Reg>,
    /// Integer return register.
    pub return_register: Reg,
    /// High word of a 32-bit return value, if the convention splits one.
    pub high_return_register: Option<Reg>,
}

/// Word register `rN` followed by its two byte halves, for `N < 8`.
fn with_halves(regs: &[u8]) -> Vec<Reg> {
    regs.iter()
        .flat_map(|&n| {
            if n < 8 {
                vec![Reg::word(n), Reg::byte(2 * n), Reg::byte(2 * n + 1)]
            } else {
                vec![Reg::word(n)]
            }
        })
        .collect()
}

impl CallingConvention {
    /// Tasking VX: arguments in R2-R5, result in R2.
    pub fn tasking_vx() -> Self {
        Self {
            name: "c166-vx".to_owned(),
            argument_registers: vec![Reg::R2, Reg::R3, Reg::R4, Reg::R5],
            callee_saved: with_halves(&[0, 1, 6, 7, 8, 9, 10]),
            caller_saved: with_halves(&[2, 3, 4, 5, 11, 12, 13, 14]),
            return_register: Reg::R2,
            high_return_register: None,
        }
    }

    /// Tasking classic: arguments in R12-R15, result in R4:R5.
    pub fn tasking_classic() -> Self {
        Self {
            name: "c166-classic".to_owned(),
            argument_registers: vec![Reg::R12, Reg::R13, Reg::R14, Reg::R15],
            callee_saved: with_halves(&[6, 7, 8, 9, 10]),
            caller_saved: with_halves(&[1, 2, 3, 4, 5, 10, 11]),
            return_register: Reg::R4,
            high_return_register: Some(Reg::R5),
        }
    }

    /// Tasking V2: arguments in R8-R12, R13-R15 preserved, result in R4:R5.
    pub fn tasking_v2() -> Self {
        Self {
            name: "c166-v2".to_owned(),
            argument_registers: vec![Reg::R8, Reg::R9, Reg::R10, Reg::R11, Reg::R12],
            callee_saved: vec![Reg::R13, Reg::R14, Reg::R15],
            caller_saved: with_halves(&[1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12]),
            return_register: Reg::R4,
            high_return_register: Some(Reg::R5),
        }
    }
}

/// Decoder/lifter configuration.
///
/// Deserializes from a document naming the variant plus optional overrides:
///
/// ```json
/// { "variant": "TaskingClassic", "stack_pointer": 15, "default_dpp": [0, 1, 2, 3] }
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "ConfigFile")]
pub struct CpuConfig {
    /// Selected variant.
    pub variant: CpuVariant,
    /// Register used by PUSH/POP and the `[-R]`/`[R+]` stack idioms.
    pub stack_pointer: Reg,
    /// Register holding return addresses, if the variant models one.
    pub link_register: Option<Reg>,
    /// Calling convention handed to the host.
    pub calling_convention: CallingConvention,
    /// Initial default DPP vector of the extension store.
    pub default_dpp: [u32; 4],
}

/// On-disk shape of [`CpuConfig`]; unset fields come from the variant.
#[derive(Debug, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    variant: CpuVariant,
    #[serde(default)]
    stack_pointer: Option<Reg>,
    #[serde(default)]
    link_register: Option<Reg>,
    #[serde(default)]
    calling_convention: Option<CallingConvention>,
    #[serde(default = "ConfigFile::default_dpp")]
    default_dpp: [u32; 4],
}

impl ConfigFile {
    const fn default_dpp() -> [u32; 4] {
        defaults::DEFAULT_DPP
    }
}

impl From<ConfigFile> for CpuConfig {
    fn from(file: ConfigFile) -> Self {
        let base = Self::for_variant(file.variant);
        Self {
            variant: file.variant,
            stack_pointer: file.stack_pointer.unwrap_or(base.stack_pointer),
            link_register: file.link_register.or(base.link_register),
            calling_convention: file
                .calling_convention
                .unwrap_or(base.calling_convention),
            default_dpp: file.default_dpp,
        }
    }
}

impl CpuConfig {
    /// Configuration of a variant with the reset DPP vector.
    pub fn for_variant(variant: CpuVariant) -> Self {
        Self {
            variant,
            stack_pointer: variant.stack_pointer(),
            link_register: variant.link_register(),
            calling_convention: variant.calling_convention(),
            default_dpp: defaults::DEFAULT_DPP,
        }
    }

    /// Parses a JSON configuration document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] if the document does not match the schema.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }
}

impl Default for CpuConfig {
    fn default() -> Self {
        Self::for_variant(CpuVariant::default())
    }
}
