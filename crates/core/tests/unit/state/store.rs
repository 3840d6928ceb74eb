//! Extension Store Unit Tests.
//!
//! Covers the point setters (OR-merge versus replace), queries on empty sites, the bulk
//! custom-DPP edit that never clobbers an active override, operator range overrides and
//! the default DPP vector.

use c166_core::ExtensionStore;
use c166_core::state::{ExtensionKind, ExtensionState};
use pretty_assertions::assert_eq;
use rstest::rstest;

const DPP: [u32; 4] = [4, 5, 6, 7];

// ══════════════════════════════════════════════════════════
// 1. Empty sites
// ══════════════════════════════════════════════════════════

#[test]
fn absent_entry_means_no_override() {
    let store = ExtensionStore::new();
    assert_eq!(store.get(0x1234), ExtensionState::default());
    assert!(store.get(0x1234).is_default());
    assert_eq!(store.query_page(0x1234), None);
    assert_eq!(store.query_segment(0x1234), None);
    assert!(!store.query_register_bank(0x1234));
    assert_eq!(store.query_custom_dpp(0x1234), None);
    assert!(store.is_empty());
}

// ══════════════════════════════════════════════════════════
// 2. Point setters
// ══════════════════════════════════════════════════════════

#[test]
fn set_page_records_value_and_span() {
    let store = ExtensionStore::new();
    store.set_page(0x100, 0x3FF, 2);

    let state = store.get(0x100);
    assert_eq!(state.kind, ExtensionKind::PAGE);
    assert_eq!(state.page10, 0x3FF);
    assert_eq!(state.remaining, 2);
    assert_eq!(store.query_page(0x100), Some(0x3FF));
    assert_eq!(store.len(), 1);
}

#[test]
fn setters_or_merge_into_existing_entry() {
    let store = ExtensionStore::new();
    store.set_register_bank(0x100, 3);
    store.set_segment(0x100, 0x12, 1);

    let state = store.get(0x100);
    assert!(state.kind.contains(ExtensionKind::REGISTER_BANK));
    assert!(state.kind.contains(ExtensionKind::SEGMENT));
    assert!(store.query_register_bank(0x100));
    assert_eq!(store.query_segment(0x100), Some(0x12));
    // The latest span wins.
    assert_eq!(state.remaining, 1);
}

#[test]
fn setters_are_idempotent() {
    let store = ExtensionStore::new();
    store.set_page(0x100, 7, 1);
    let once = store.get(0x100);
    store.set_page(0x100, 7, 1);
    assert_eq!(store.get(0x100), once);
    assert_eq!(store.len(), 1);
}

#[test]
fn set_custom_dpp_replaces_the_entry() {
    let store = ExtensionStore::new();
    store.set_page(0x100, 7, 1);
    store.set_custom_dpp(0x100, DPP);

    assert_eq!(store.get(0x100).kind, ExtensionKind::CUSTOM_DPP);
    assert_eq!(store.query_page(0x100), None);
    assert_eq!(store.query_custom_dpp(0x100), Some(DPP));
}

// ══════════════════════════════════════════════════════════
// 3. Bulk custom-DPP edit
// ══════════════════════════════════════════════════════════

#[test]
fn dpp_range_skips_sites_with_active_overrides() {
    let store = ExtensionStore::new();
    store.set_segment(0x102, 1, 0);
    store.set_custom_dpp_range(0x100, 0x106, DPP);

    assert_eq!(store.query_custom_dpp(0x100), Some(DPP));
    assert_eq!(store.query_custom_dpp(0x102), None);
    assert_eq!(store.query_segment(0x102), Some(1));
    assert_eq!(store.query_custom_dpp(0x104), Some(DPP));
    assert_eq!(store.query_custom_dpp(0x106), Some(DPP));
    assert_eq!(store.query_custom_dpp(0x108), None);
}

#[test]
fn dpp_range_touches_only_instruction_slots() {
    let store = ExtensionStore::new();
    store.set_custom_dpp_range(0x100, 0x104, DPP);
    assert_eq!(store.query_custom_dpp(0x101), None);
    assert_eq!(store.query_custom_dpp(0x103), None);
    assert_eq!(store.len(), 3);
}

#[test]
fn dpp_range_replaces_prior_custom_dpp() {
    let store = ExtensionStore::new();
    store.set_custom_dpp(0x100, [1, 1, 1, 1]);
    store.set_custom_dpp_range(0x100, 0x100, DPP);
    assert_eq!(store.query_custom_dpp(0x100), Some(DPP));
}

// ══════════════════════════════════════════════════════════
// 4. Operator range overrides
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(0, 0)]
#[case(1, 1)]
#[case(2, 1)]
#[case(6, 3)]
#[case(7, 4)]
fn page_range_covers_every_slot(#[case] length: u64, #[case] slots: usize) {
    let store = ExtensionStore::new();
    store.apply_page_range(0x200, length, 9);
    assert_eq!(store.len(), slots);
    for (addr, state) in store.entries() {
        assert_eq!(state.page(), Some(9), "{addr:#x}");
        assert_eq!(state.remaining, 0);
    }
}

#[test]
fn segment_and_bank_ranges() {
    let store = ExtensionStore::new();
    store.apply_segment_range(0x300, 4, 0x20);
    store.apply_register_bank_range(0x302, 4);

    assert_eq!(store.query_segment(0x300), Some(0x20));
    assert!(!store.query_register_bank(0x300));
    assert_eq!(store.query_segment(0x302), Some(0x20));
    assert!(store.query_register_bank(0x302));
    assert!(store.query_register_bank(0x304));
    assert_eq!(store.query_segment(0x304), None);
}

#[test]
fn dpp_range_by_length() {
    let store = ExtensionStore::new();
    store.apply_custom_dpp_range(0x400, 0, DPP);
    assert!(store.is_empty());

    store.apply_custom_dpp_range(0x400, 4, DPP);
    assert_eq!(store.query_custom_dpp(0x400), Some(DPP));
    assert_eq!(store.query_custom_dpp(0x402), Some(DPP));
    assert_eq!(store.query_custom_dpp(0x404), None);
}

// ══════════════════════════════════════════════════════════
// 5. Default DPP vector and housekeeping
// ══════════════════════════════════════════════════════════

#[test]
fn default_dpp_is_separate_from_the_table() {
    let store = ExtensionStore::with_default_dpp([0, 1, 2, 3]);
    assert_eq!(store.default_dpp(), [0, 1, 2, 3]);
    store.set_default_dpp(DPP);
    assert_eq!(store.default_dpp(), DPP);
    assert!(store.is_empty());
    assert_eq!(ExtensionStore::new().default_dpp(), [0; 4]);
}

#[test]
fn stored_values_keep_only_their_architectural_bits() {
    let store = ExtensionStore::with_default_dpp([0x401, 0, 0, 0]);
    assert_eq!(store.default_dpp(), [1, 0, 0, 0]);
    store.set_default_dpp([0xFFFF, 0x3FF, 0, 0]);
    assert_eq!(store.default_dpp(), [0x3FF, 0x3FF, 0, 0]);

    store.set_page(0x100, 0x7FF, 0);
    store.set_segment(0x100, 0x1FF, 0);
    let state = store.get(0x100);
    assert_eq!(state.page10, 0x3FF);
    assert_eq!(state.segment8, 0xFF);

    store.set_custom_dpp(0x200, [0x400, 0x401, 0x3FF, 0x1_0000]);
    assert_eq!(store.query_custom_dpp(0x200), Some([0, 1, 0x3FF, 0]));

    store.set_custom_dpp_range(0x300, 0x302, [0x800, 0, 0, 0]);
    assert_eq!(store.query_custom_dpp(0x302), Some([0; 4]));
}

#[test]
fn entries_are_sorted_and_clear_empties() {
    let store = ExtensionStore::new();
    store.set_page(0x300, 1, 0);
    store.set_page(0x100, 2, 0);
    store.set_page(0x200, 3, 0);

    let addrs: Vec<u64> = store.entries().into_iter().map(|(a, _)| a).collect();
    assert_eq!(addrs, vec![0x100, 0x200, 0x300]);

    store.clear();
    assert!(store.is_empty());
    assert_eq!(store.query_page(0x100), None);
}

#[test]
fn kind_bits_display() {
    let kind = ExtensionKind::PAGE | ExtensionKind::REGISTER_BANK;
    assert_eq!(kind.bits(), 0x05);
    assert_eq!(ExtensionKind::from_bits(0x05), kind);
    assert!(kind.contains(ExtensionKind::PAGE));
    assert!(!kind.contains(ExtensionKind::SEGMENT));
    assert!(ExtensionKind::NONE.is_empty());
    assert_eq!(
        (kind | ExtensionKind::CUSTOM_DPP).propagating(),
        kind
    );
}
