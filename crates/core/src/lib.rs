//! C166/ST10 decoder, semantic lifter and disassembler.
//!
//! This crate turns C166-family machine code into three per-instruction outputs:
//! 1. **Classification:** Instruction length and control-flow shape ([`isa::decode`]).
//! 2. **Lifting:** A sequence of IR operations for dataflow analysis ([`lift`], [`il`]).
//! 3. **Disassembly:** A display token stream ([`isa::disasm`]).
//!
//! The ISA's extension instructions (EXTP, EXTS, EXTR and friends) change how the *following*
//! instructions compute addresses. That effect is recorded in an [`ExtensionStore`] keyed by
//! instruction address, propagated instruction-by-instruction by the lifter, and consulted by
//! the [`resolve`] module. The store is an owned object handed to every call, so independent
//! analyses can run against isolated stores.

/// Common types and constants (errors, SFR addresses, record sizes).
pub mod common;
/// CPU-variant configuration (stack pointer, link register, calling convention).
pub mod config;
/// IR vocabulary emitted by the lifter and the host label-lookup seam.
pub mod il;
/// Instruction set (extractors, opcode table, registers, flags, classifier, disassembler).
pub mod isa;
/// Semantic lifter: one routine per instruction family.
pub mod lift;
/// Address and operand resolution under the active extension state.
pub mod resolve;
/// Extension-state store, propagation rule and persisted blob codec.
pub mod state;

/// Root configuration type; use `CpuConfig::default()` or deserialize from JSON.
pub use crate::config::CpuConfig;
/// Lifting entry point; borrows a store and a configuration.
pub use crate::lift::Lifter;
/// Address-keyed extension-state table shared by lifter, resolver and renderer.
pub use crate::state::ExtensionStore;
