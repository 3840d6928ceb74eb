//! C166 Instruction Set Architecture.
//!
//! Contains the opcode map, register and flag model, the length/branch classifier and the
//! text renderer.
//!
//! # Layers
//!
//! * `instruction`: Bit-field extractors over the packed instruction word.
//! * `opcodes` / `family`: Opcode constants and the per-opcode descriptor table.
//! * `registers` / `flags`: Register ids, names, aliasing; flags and condition codes.
//! * `decode`: Length and control-flow shape.
//! * `disasm`: Display tokens.

/// Instruction length and branch-shape classifier.
pub mod decode;

/// Token-based disassembler.
pub mod disasm;

/// Per-opcode family, operand form and width descriptors.
pub mod family;

/// Condition flags, flag-write policies and condition codes.
pub mod flags;

/// Instruction packing and bit-field extraction.
pub mod instruction;

/// Opcode byte constants.
pub mod opcodes;

/// Register ids, names and sub-register aliasing.
pub mod registers;
