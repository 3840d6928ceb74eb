//! Input images.
//!
//! An image is either a raw binary loaded at a caller-chosen base address or an ELF file,
//! in which case every executable section is decoded at its link address.

use std::fs;
use std::path::Path;

use object::{Object, ObjectSection, SectionKind};
use tracing::debug;

use crate::error::CliError;

/// ELF identification bytes.
const ELF_MAGIC: &[u8; 4] = b"\x7fELF";

/// Contiguous block of code at a load address.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Region {
    /// Section name, or `raw` for plain binaries.
    pub name: String,
    /// Address of the first byte.
    pub base: u64,
    /// Code bytes.
    pub bytes: Vec<u8>,
}

impl Region {
    /// One past the last address of the region.
    pub fn end(&self) -> u64 {
        self.base.wrapping_add(self.bytes.len() as u64)
    }

    /// True if `addr` falls inside the region.
    pub fn contains(&self, addr: u64) -> bool {
        addr >= self.base && addr < self.end()
    }
}

/// Reads `path` and splits it into code regions.
///
/// # Errors
///
/// Fails if the file cannot be read, or is an ELF file that does not parse or carries no
/// executable section.
pub fn load(path: &Path, base: u64) -> Result<Vec<Region>, CliError> {
    let data = fs::read(path).map_err(|e| CliError::io(path, e))?;
    parse(&data, base)
}

/// Splits an in-memory image into code regions.
///
/// # Errors
///
/// See [`load`].
pub fn parse(data: &[u8], base: u64) -> Result<Vec<Region>, CliError> {
    if !data.starts_with(ELF_MAGIC) {
        debug!(len = data.len(), base, "raw image");
        return Ok(vec![Region {
            name: "raw".to_owned(),
            base,
            bytes: data.to_vec(),
        }]);
    }

    let file = object::File::parse(data)?;
    let mut regions = Vec::new();
    for section in file.sections() {
        if section.kind() != SectionKind::Text {
            continue;
        }
        let name = section.name().unwrap_or("?").to_owned();
        let bytes = section.data()?.to_vec();
        debug!(%name, addr = section.address(), len = bytes.len(), "code section");
        regions.push(Region {
            name,
            base: section.address(),
            bytes,
        });
    }

    if regions.is_empty() {
        return Err(CliError::NoCode);
    }
    Ok(regions)
}
