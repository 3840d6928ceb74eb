//! Failure taxonomy for decoding, lifting and persisted state.
//!
//! Every failure in this crate is local to one instruction or one store operation. It provides:
//! 1. **Lift Errors:** Unknown opcodes, unmodelled variants, missing labels and short buffers.
//! 2. **State Errors:** Rejection of a malformed persisted blob.
//! 3. **Config Errors:** JSON parse failures for [`CpuConfig`](crate::config::CpuConfig).
//!
//! None of these are fatal; callers degrade the offending instruction to "unrepresented"
//! and carry on decoding its neighbours.

use thiserror::Error;

/// Per-instruction failure raised by the classifier, lifter or renderer.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LiftError {
    /// The opcode byte is not part of the instruction set.
    #[error("unknown opcode {opcode:#04x} at {addr:#x}")]
    UnknownOpcode {
        /// Address of the instruction.
        addr: u64,
        /// First byte of the instruction.
        opcode: u8,
    },

    /// The opcode is known but this conditional or indirect form is not modelled.
    #[error("unsupported {mnemonic} variant at {addr:#x}: {detail}")]
    UnsupportedVariant {
        /// Address of the instruction.
        addr: u64,
        /// Mnemonic of the family.
        mnemonic: &'static str,
        /// What about the encoding is unsupported.
        detail: &'static str,
    },

    /// The host has no label for a branch target the lifter needs to reference.
    #[error("no label for branch target {target:#x} of instruction at {addr:#x}")]
    UnresolvedLabel {
        /// Address of the branching instruction.
        addr: u64,
        /// Target (or fall-through) address that had no label.
        target: u64,
    },

    /// Fewer bytes are available than the instruction needs.
    #[error("instruction at {addr:#x} needs {needed} bytes, {available} available")]
    Truncated {
        /// Address of the instruction.
        addr: u64,
        /// Bytes required by the encoding.
        needed: usize,
        /// Bytes supplied by the caller.
        available: usize,
    },
}

/// Failure raised while restoring the extension-state table.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum StateError {
    /// The blob length is not a whole number of records; nothing was loaded.
    #[error("persisted state of {len} bytes is not a multiple of the {record_size}-byte record")]
    MalformedPersistedState {
        /// Length of the rejected blob.
        len: usize,
        /// Size of one `(address, state)` record.
        record_size: usize,
    },
}

/// Failure raised while loading a CPU configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The JSON document did not match the configuration schema.
    #[error("invalid configuration: {0}")]
    Parse(#[from] serde_json::Error),

    /// The variant name is not one of the supported toolchains.
    #[error("unknown cpu variant `{0}` (expected vx, classic or v2)")]
    UnknownVariant(String),
}

impl LiftError {
    /// Returns the address of the instruction that failed.
    pub const fn addr(&self) -> u64 {
        match self {
            Self::UnknownOpcode { addr, .. }
            | Self::UnsupportedVariant { addr, .. }
            | Self::UnresolvedLabel { addr, .. }
            | Self::Truncated { addr, .. } => *addr,
        }
    }
}
