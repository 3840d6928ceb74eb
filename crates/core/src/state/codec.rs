//! Fixed-size record format of the persisted extension-state table.
//!
//! Each record is 34 bytes, little-endian, with no header or version:
//!
//! | Offset | Size | Field       |
//! |--------|------|-------------|
//! | 0      | 8    | address     |
//! | 8      | 1    | kind bits   |
//! | 9      | 1    | remaining   |
//! | 10     | 4    | page10      |
//! | 14     | 4    | segment8    |
//! | 18     | 16   | dpp0..dpp3  |

use super::{ExtensionKind, ExtensionState};
use crate::common::StateError;

/// Size of one `(address, state)` record in bytes.
pub const RECORD_SIZE: usize = 34;

const ADDR_OFFSET: usize = 0;
const KIND_OFFSET: usize = 8;
const REMAINING_OFFSET: usize = 9;
const PAGE_OFFSET: usize = 10;
const SEGMENT_OFFSET: usize = 14;
const DPP_OFFSET: usize = 18;

/// Appends one record to `out`.
pub fn encode_record(addr: u64, state: &ExtensionState, out: &mut Vec<u8>) {
    out.extend_from_slice(&addr.to_le_bytes());
    out.push(state.kind.bits());
    out.push(state.remaining);
    out.extend_from_slice(&state.page10.to_le_bytes());
    out.extend_from_slice(&state.segment8.to_le_bytes());
    for dpp in state.dpp {
        out.extend_from_slice(&dpp.to_le_bytes());
    }
}

/// Decodes one record.
///
/// # Arguments
///
/// * `record` - A slice of at least [`RECORD_SIZE`] bytes; trailing bytes are ignored.
///
/// # Returns
///
/// The address and state, or `None` if the slice is too short.
pub fn decode_record(record: &[u8]) -> Option<(u64, ExtensionState)> {
    if record.len() < RECORD_SIZE {
        return None;
    }
    let addr = u64::from_le_bytes(array(record, ADDR_OFFSET));
    let mut dpp = [0u32; 4];
    for (i, slot) in dpp.iter_mut().enumerate() {
        *slot = u32::from_le_bytes(array(record, DPP_OFFSET + 4 * i));
    }
    let state = ExtensionState {
        kind: ExtensionKind::from_bits(record[KIND_OFFSET]),
        remaining: record[REMAINING_OFFSET],
        page10: u32::from_le_bytes(array(record, PAGE_OFFSET)),
        segment8: u32::from_le_bytes(array(record, SEGMENT_OFFSET)),
        dpp,
    };
    Some((addr, state))
}

/// Decodes a whole blob.
///
/// # Errors
///
/// Fails without decoding anything if the length is not a multiple of [`RECORD_SIZE`].
pub fn decode_records(bytes: &[u8]) -> Result<Vec<(u64, ExtensionState)>, StateError> {
    if bytes.len() % RECORD_SIZE != 0 {
        return Err(StateError::MalformedPersistedState {
            len: bytes.len(),
            record_size: RECORD_SIZE,
        });
    }
    Ok(bytes
        .chunks_exact(RECORD_SIZE)
        .filter_map(decode_record)
        .collect())
}

fn array<const N: usize>(record: &[u8], offset: usize) -> [u8; N] {
    let mut out = [0u8; N];
    out.copy_from_slice(&record[offset..offset + N]);
    out
}
