//! Common utilities and types used throughout the decoder.
//!
//! This module provides building blocks shared by every component. It includes:
//! 1. **Constants:** Physical addresses of the SFRs and bit areas the resolver targets.
//! 2. **Error Handling:** The per-instruction failure taxonomy and persisted-state errors.

/// Physical address constants (SFR bases, DPP registers, multiply/divide registers).
pub mod constants;

/// Error types for decoding, lifting, configuration and persisted state.
pub mod error;

pub use error::{ConfigError, LiftError, StateError};
