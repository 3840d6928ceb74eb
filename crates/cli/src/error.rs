//! Failures surfaced by the `c166dis` binary.

use std::io;
use std::path::PathBuf;

use c166_core::common::{ConfigError, StateError};
use thiserror::Error;

/// Top-level CLI failure; every variant maps to exit code 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// A file could not be read or written.
    #[error("{path}: {source}")]
    Io {
        /// File involved.
        path: PathBuf,
        /// Underlying error.
        source: io::Error,
    },

    /// Writing the listing failed.
    #[error("output: {0}")]
    Output(#[from] io::Error),

    /// The image looked like an ELF file but could not be parsed.
    #[error("invalid ELF image: {0}")]
    Elf(#[from] object::Error),

    /// The ELF image has no executable section to walk.
    #[error("ELF image has no executable sections")]
    NoCode,

    /// A persisted extension-state blob was rejected.
    #[error(transparent)]
    State(#[from] StateError),

    /// The summary report could not be encoded.
    #[error("summary: {0}")]
    Report(#[from] serde_json::Error),

    /// The configuration file or variant name was invalid.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl CliError {
    /// Wraps an I/O error with the path it concerns.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
