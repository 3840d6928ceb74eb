//! Address-keyed extension-state table.
//!
//! One mutex guards the whole table. Every public method takes the lock for exactly one
//! point operation, so two calls never observe a common snapshot; concurrent decoders that
//! race on overlapping spans see whichever write landed last.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError, RwLock};

use tracing::trace;

use super::codec::{self, RECORD_SIZE};
use super::{ExtensionKind, ExtensionState, page_vector};
use crate::common::StateError;
use crate::common::constants::{PAGE10_MASK, SEGMENT8_MASK};
use crate::isa::registers::INSTRUCTION_ALIGNMENT;

/// Concurrent table of pending addressing overrides, keyed by instruction address.
#[derive(Debug, Default)]
pub struct ExtensionStore {
    table: Mutex<HashMap<u64, ExtensionState>>,
    /// Written once before decoding starts (single writer); the lock only makes a late
    /// write memory-safe, not ordered against concurrent decoders.
    default_dpp: RwLock<[u32; 4]>,
}

impl ExtensionStore {
    /// Creates an empty store with an all-zero default DPP vector (the reset value).
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store with the given default DPP vector.
    pub fn with_default_dpp(dpp: [u32; 4]) -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
            default_dpp: RwLock::new(page_vector(dpp)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<u64, ExtensionState>> {
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // ── Overrides ────────────────────────────────────────────

    /// Records a page override at `addr` covering `span` further instructions.
    ///
    /// An existing entry keeps its other override bits. Only the low 10 bits of `page10`
    /// are kept.
    pub fn set_page(&self, addr: u64, page10: u32, span: u8) {
        let page10 = page10 & PAGE10_MASK;
        let mut table = self.lock();
        let entry = table.entry(addr).or_default();
        entry.kind |= ExtensionKind::PAGE;
        entry.page10 = page10;
        entry.remaining = span;
        trace!(addr, page10, span, "set page override");
    }

    /// Records a segment override at `addr` covering `span` further instructions.
    ///
    /// Only the low 8 bits of `segment8` are kept.
    pub fn set_segment(&self, addr: u64, segment8: u32, span: u8) {
        let segment8 = segment8 & SEGMENT8_MASK;
        let mut table = self.lock();
        let entry = table.entry(addr).or_default();
        entry.kind |= ExtensionKind::SEGMENT;
        entry.segment8 = segment8;
        entry.remaining = span;
        trace!(addr, segment8, span, "set segment override");
    }

    /// Records a register-bank override at `addr` covering `span` further instructions.
    pub fn set_register_bank(&self, addr: u64, span: u8) {
        let mut table = self.lock();
        let entry = table.entry(addr).or_default();
        entry.kind |= ExtensionKind::REGISTER_BANK;
        entry.remaining = span;
        trace!(addr, span, "set register-bank override");
    }

    /// Replaces the entry at `addr` with a custom DPP vector.
    ///
    /// Unlike the other setters this drops any override already recorded at `addr`.
    pub fn set_custom_dpp(&self, addr: u64, dpp: [u32; 4]) {
        let dpp = page_vector(dpp);
        let mut table = self.lock();
        let entry = table.entry(addr).or_default();
        entry.kind = ExtensionKind::CUSTOM_DPP;
        entry.dpp = dpp;
        trace!(addr, ?dpp, "set custom dpp");
    }

    /// Applies a custom DPP vector to every 2-byte slot in `[start, end]`.
    ///
    /// Slots carrying a register-bank, segment or page override are left untouched.
    pub fn set_custom_dpp_range(&self, start: u64, end: u64, dpp: [u32; 4]) {
        let dpp = page_vector(dpp);
        let mut table = self.lock();
        let mut skipped = 0usize;
        for addr in (start..=end).step_by(INSTRUCTION_ALIGNMENT) {
            let entry = table.entry(addr).or_default();
            if entry.kind.propagating().is_empty() {
                entry.kind = ExtensionKind::CUSTOM_DPP;
                entry.dpp = dpp;
            } else {
                skipped += 1;
            }
        }
        trace!(start, end, ?dpp, skipped, "set custom dpp range");
    }

    // ── Queries ──────────────────────────────────────────────

    /// Page override at `addr`, if any.
    pub fn query_page(&self, addr: u64) -> Option<u32> {
        self.lock().get(&addr).and_then(ExtensionState::page)
    }

    /// Segment override at `addr`, if any.
    pub fn query_segment(&self, addr: u64) -> Option<u32> {
        self.lock().get(&addr).and_then(ExtensionState::segment)
    }

    /// True if a register-bank override is active at `addr`.
    pub fn query_register_bank(&self, addr: u64) -> bool {
        self.lock()
            .get(&addr)
            .is_some_and(ExtensionState::register_bank)
    }

    /// Custom DPP vector at `addr`, if any.
    pub fn query_custom_dpp(&self, addr: u64) -> Option<[u32; 4]> {
        self.lock().get(&addr).and_then(ExtensionState::custom_dpp)
    }

    /// Copy of the state at `addr`; all-default if nothing is recorded.
    pub fn get(&self, addr: u64) -> ExtensionState {
        self.lock().get(&addr).copied().unwrap_or_default()
    }

    /// Number of recorded sites.
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// True if no site is recorded.
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Forgets every recorded site.
    pub fn clear(&self) {
        self.lock().clear();
    }

    /// Snapshot of every recorded site, sorted by address.
    pub fn entries(&self) -> Vec<(u64, ExtensionState)> {
        let mut entries: Vec<_> = self.lock().iter().map(|(a, s)| (*a, *s)).collect();
        entries.sort_unstable_by_key(|(addr, _)| *addr);
        entries
    }

    // ── Default DPP vector ───────────────────────────────────

    /// Default DPP vector used where no custom vector is recorded.
    pub fn default_dpp(&self) -> [u32; 4] {
        *self
            .default_dpp
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Replaces the default DPP vector. Each entry keeps its low 10 bits.
    ///
    /// # Preconditions
    ///
    /// Call at most once, from one thread, before any decoding starts. The lock does not
    /// order this write against running decoders: one calling concurrently may observe
    /// either vector, even within a single instruction.
    pub fn set_default_dpp(&self, dpp: [u32; 4]) {
        *self
            .default_dpp
            .write()
            .unwrap_or_else(PoisonError::into_inner) = page_vector(dpp);
        trace!(?dpp, "set default dpp");
    }

    // ── Propagation ──────────────────────────────────────────

    /// Carries the override at `addr` forward to the next instruction at `addr + len`.
    ///
    /// Runs after every lifted instruction. When the entry at `addr` has `remaining > 0`,
    /// each active register-bank, segment and page override is re-applied at `addr + len`
    /// with `remaining - 1`. Custom DPP vectors are per-site and are not carried.
    pub fn propagate(&self, addr: u64, len: usize) {
        let mut table = self.lock();
        let Some(current) = table.get(&addr).copied() else {
            return;
        };
        let carried = current.kind.propagating();
        if carried.is_empty() || current.remaining == 0 {
            return;
        }

        let next = addr.wrapping_add(len as u64);
        let entry = table.entry(next).or_default();
        entry.kind |= carried;
        if carried.contains(ExtensionKind::PAGE) {
            entry.page10 = current.page10;
        }
        if carried.contains(ExtensionKind::SEGMENT) {
            entry.segment8 = current.segment8;
        }
        entry.remaining = current.remaining - 1;
        trace!(
            from = addr,
            to = next,
            kind = ?carried,
            remaining = entry.remaining,
            "propagate override"
        );
    }

    // ── Operator range overrides ─────────────────────────────

    /// Applies a page override to every slot in `[start, start + length)`.
    pub fn apply_page_range(&self, start: u64, length: u64, page10: u32) {
        for addr in slots(start, length) {
            self.set_page(addr, page10, 0);
        }
    }

    /// Applies a segment override to every slot in `[start, start + length)`.
    pub fn apply_segment_range(&self, start: u64, length: u64, segment8: u32) {
        for addr in slots(start, length) {
            self.set_segment(addr, segment8, 0);
        }
    }

    /// Applies a register-bank override to every slot in `[start, start + length)`.
    pub fn apply_register_bank_range(&self, start: u64, length: u64) {
        for addr in slots(start, length) {
            self.set_register_bank(addr, 0);
        }
    }

    /// Applies a custom DPP vector to every free slot in `[start, start + length)`.
    pub fn apply_custom_dpp_range(&self, start: u64, length: u64, dpp: [u32; 4]) {
        if length == 0 {
            return;
        }
        self.set_custom_dpp_range(start, start.saturating_add(length - 1), dpp);
    }

    // ── Persistence ──────────────────────────────────────────

    /// Encodes the table as a flat sequence of fixed-size records, sorted by address.
    pub fn serialize(&self) -> Vec<u8> {
        let entries = self.entries();
        let mut out = Vec::with_capacity(entries.len() * RECORD_SIZE);
        for (addr, state) in &entries {
            codec::encode_record(*addr, state, &mut out);
        }
        out
    }

    /// Replaces the table with the records in `bytes`.
    ///
    /// # Errors
    ///
    /// Returns [`StateError::MalformedPersistedState`] if `bytes` is not a whole number of
    /// records; the table is left unchanged in that case.
    pub fn deserialize(&self, bytes: &[u8]) -> Result<(), StateError> {
        let decoded = codec::decode_records(bytes)?;
        let mut table = self.lock();
        table.clear();
        table.extend(decoded);
        trace!(sites = table.len(), "restored extension state");
        Ok(())
    }
}

fn slots(start: u64, length: u64) -> impl Iterator<Item = u64> {
    (start..start.saturating_add(length)).step_by(INSTRUCTION_ALIGNMENT)
}
