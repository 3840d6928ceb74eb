//! Persistence Unit Tests.
//!
//! The extension table survives a save/restore cycle through the flat 34-byte record
//! format; malformed blobs are rejected without touching the live table.

use c166_core::ExtensionStore;
use c166_core::common::StateError;
use c166_core::state::codec::{RECORD_SIZE, encode_record};
use c166_core::state::{ExtensionKind, ExtensionState};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

// ══════════════════════════════════════════════════════════
// 1. Blob format
// ══════════════════════════════════════════════════════════

#[test]
fn empty_table_serializes_to_nothing() {
    let store = ExtensionStore::new();
    assert!(store.serialize().is_empty());

    let restored = ExtensionStore::new();
    restored.deserialize(&[]).unwrap();
    assert!(restored.is_empty());
}

#[test]
fn one_entry_is_one_record() {
    let store = ExtensionStore::new();
    store.set_page(0x0012_3456, 0x203, 2);
    store.set_register_bank(0x0012_3456, 2);

    let blob = store.serialize();
    assert_eq!(blob.len(), RECORD_SIZE);
    assert_eq!(&blob[0..8], &0x0012_3456u64.to_le_bytes());
    assert_eq!(blob[8], 0x05);
    assert_eq!(blob[9], 2);
    assert_eq!(&blob[10..14], &[0x03, 0x02, 0x00, 0x00]);
    assert_eq!(&blob[14..18], &[0; 4]);
    assert_eq!(&blob[18..34], &[0; 16]);
}

#[test]
fn records_are_written_in_address_order() {
    let store = ExtensionStore::new();
    store.set_segment(0x200, 1, 0);
    store.set_segment(0x100, 2, 0);

    let blob = store.serialize();
    assert_eq!(blob.len(), 2 * RECORD_SIZE);
    assert_eq!(&blob[0..8], &0x100u64.to_le_bytes());
    assert_eq!(&blob[RECORD_SIZE..RECORD_SIZE + 8], &0x200u64.to_le_bytes());
}

// ══════════════════════════════════════════════════════════
// 2. Restore
// ══════════════════════════════════════════════════════════

#[test]
fn restore_reproduces_every_query() {
    let store = ExtensionStore::new();
    store.set_page(0x100, 7, 1);
    store.set_segment(0x104, 0x12, 0);
    store.set_register_bank(0x104, 0);
    store.set_custom_dpp(0x108, [1, 2, 3, 4]);

    let restored = ExtensionStore::new();
    restored.deserialize(&store.serialize()).unwrap();

    assert_eq!(restored.entries(), store.entries());
    assert_eq!(restored.query_page(0x100), Some(7));
    assert_eq!(restored.query_segment(0x104), Some(0x12));
    assert!(restored.query_register_bank(0x104));
    assert_eq!(restored.query_custom_dpp(0x108), Some([1, 2, 3, 4]));
    assert_eq!(restored.get(0x10C), ExtensionState::default());
}

#[test]
fn restore_replaces_rather_than_merges() {
    let saved = ExtensionStore::new();
    saved.set_page(0x100, 7, 0);

    let live = ExtensionStore::new();
    live.set_segment(0x200, 1, 0);
    live.deserialize(&saved.serialize()).unwrap();

    assert_eq!(live.len(), 1);
    assert_eq!(live.query_segment(0x200), None);
    assert_eq!(live.query_page(0x100), Some(7));
}

#[test]
fn unknown_kind_bits_survive() {
    let mut blob = vec![0u8; RECORD_SIZE];
    blob[8] = 0x80 | ExtensionKind::PAGE.bits();
    blob[10] = 4;

    let store = ExtensionStore::new();
    store.deserialize(&blob).unwrap();
    assert_eq!(store.query_page(0), Some(4));
    assert_eq!(store.serialize(), blob);
}

#[test]
fn ragged_blob_is_rejected_and_table_kept() {
    let store = ExtensionStore::new();
    store.set_page(0x100, 7, 0);

    let err = store.deserialize(&[0u8; RECORD_SIZE + 1]).unwrap_err();
    assert_eq!(
        err,
        StateError::MalformedPersistedState {
            len: 35,
            record_size: 34,
        }
    );
    assert_eq!(store.len(), 1);
    assert_eq!(store.query_page(0x100), Some(7));
}

// ══════════════════════════════════════════════════════════
// 3. Round trip
// ══════════════════════════════════════════════════════════

fn any_state() -> impl Strategy<Value = ExtensionState> {
    (
        any::<u8>(),
        any::<u8>(),
        0u32..0x400,
        0u32..0x100,
        any::<[u32; 4]>(),
    )
        .prop_map(|(kind, remaining, page10, segment8, dpp)| ExtensionState {
            kind: ExtensionKind::from_bits(kind),
            remaining,
            page10,
            segment8,
            dpp,
        })
}

proptest! {
    #[test]
    fn save_then_restore_is_identity(
        entries in prop::collection::btree_map(any::<u64>(), any_state(), 0..16),
        probe in any::<u64>(),
    ) {
        let blob = {
            let mut out = Vec::new();
            for (addr, state) in &entries {
                encode_record(*addr, state, &mut out);
            }
            out
        };

        let store = ExtensionStore::new();
        store.deserialize(&blob).unwrap();
        prop_assert_eq!(store.serialize(), blob);

        let expected = entries.get(&probe).copied().unwrap_or_default();
        prop_assert_eq!(store.get(probe), expected);
    }
}
