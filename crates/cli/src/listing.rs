//! Linear sweep over code regions.
//!
//! Each instruction is rendered under the extension state recorded at its address and then
//! lifted, which carries pending EXTP/EXTS/EXTR overrides on to the next instruction. The
//! lift runs even without `--ir` so the listing reflects those overrides.

use std::io::Write;

use c166_core::Lifter;
use c166_core::il::{IlFunction, Label, LabelLookup};
use c166_core::isa::disasm::{disassemble, to_text};
use c166_core::isa::registers::INSTRUCTION_ALIGNMENT;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::CliError;
use crate::image::Region;

/// Column width of the hex-bytes field.
const BYTES_COLUMN: usize = 12;

/// Every address inside a loaded region is a potential block start.
#[derive(Clone, Copy, Debug)]
pub struct RegionLabels<'a>(pub &'a [Region]);

impl LabelLookup for RegionLabels<'_> {
    fn label_for(&self, addr: u64) -> Option<Label> {
        self.0
            .iter()
            .any(|r| r.contains(addr))
            .then_some(Label(addr))
    }
}

/// Counters reported after a sweep.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Instructions decoded.
    pub instructions: usize,
    /// Slots that did not decode.
    pub undecoded: usize,
    /// Instructions whose lift failed.
    pub lift_failures: usize,
}

impl Summary {
    /// Adds another region's counters.
    pub const fn merge(&mut self, other: Self) {
        self.instructions += other.instructions;
        self.undecoded += other.undecoded;
        self.lift_failures += other.lift_failures;
    }
}

/// Writes the listing of one region.
///
/// # Errors
///
/// Only failures to write `out` are returned; decode and lift failures are reported inline.
pub fn write_region(
    out: &mut impl Write,
    region: &Region,
    lifter: &Lifter<'_>,
    labels: &dyn LabelLookup,
    show_ir: bool,
) -> Result<Summary, CliError> {
    let mut summary = Summary::default();
    let mut il = IlFunction::new();
    let mut offset = 0usize;

    writeln!(out, "; {} @ {:#x}", region.name, region.base)?;
    while offset < region.bytes.len() {
        let addr = region.base + offset as u64;
        let bytes = &region.bytes[offset..];

        let (tokens, len) = match disassemble(bytes, addr, lifter.store()) {
            Ok(decoded) => decoded,
            Err(e) => {
                debug!(addr, error = %e, "undecodable slot");
                let len = INSTRUCTION_ALIGNMENT.min(bytes.len());
                writeln!(
                    out,
                    "{addr:06x}  {:<BYTES_COLUMN$}.byte {}",
                    hex(&bytes[..len]),
                    hex(&bytes[..len])
                )?;
                summary.undecoded += 1;
                offset += len;
                continue;
            }
        };

        writeln!(
            out,
            "{addr:06x}  {:<BYTES_COLUMN$}{}",
            hex(&bytes[..len]),
            to_text(&tokens)
        )?;
        summary.instructions += 1;

        il.clear();
        match lifter.lift(bytes, addr, labels, &mut il) {
            Ok(_) if show_ir => {
                for op in il.ops() {
                    writeln!(out, "{:8}{op}", "")?;
                }
            }
            Ok(_) => {}
            Err(e) => {
                warn!(addr, error = %e, "lift failed");
                // Keep pending overrides flowing past the failed instruction.
                lifter.store().propagate(addr, len);
                summary.lift_failures += 1;
                if show_ir {
                    writeln!(out, "{:8}; {e}", "")?;
                }
            }
        }
        offset += len;
    }
    Ok(summary)
}

fn hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{b:02x}"))
        .collect::<Vec<_>>()
        .join(" ")
}
