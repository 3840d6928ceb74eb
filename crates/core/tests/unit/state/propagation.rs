//! Propagation Unit Tests.
//!
//! An override recorded with span `n` must reach exactly the next `n` sequential
//! instructions. These tests drive the rule directly through the store and end to end
//! through the lifter with real EXTP sequences.

use crate::common::builder::{extp, exts, nop, Program};
use crate::common::harness::TestContext;
use c166_core::ExtensionStore;
use c166_core::state::ExtensionKind;
use pretty_assertions::assert_eq;
use rstest::rstest;

const A: u64 = 0x4000;

// ══════════════════════════════════════════════════════════
// 1. Store-level rule
// ══════════════════════════════════════════════════════════

#[test]
fn page_override_walks_span_instructions() {
    let store = ExtensionStore::new();
    store.set_page(A, 3, 2);

    store.propagate(A, 2);
    store.propagate(A + 2, 2);
    store.propagate(A + 4, 2);

    assert_eq!(store.query_page(A), Some(3));
    assert_eq!(store.query_page(A + 2), Some(3));
    assert_eq!(store.query_page(A + 4), Some(3));
    assert_eq!(store.query_page(A + 6), None);
    assert_eq!(store.get(A + 2).remaining, 1);
    assert_eq!(store.get(A + 4).remaining, 0);
}

#[test]
fn exhausted_span_carries_nothing() {
    let store = ExtensionStore::new();
    store.set_page(A, 3, 0);
    store.propagate(A, 2);
    assert_eq!(store.len(), 1);
    assert_eq!(store.query_page(A + 2), None);
}

#[test]
fn propagation_from_empty_site_is_a_no_op() {
    let store = ExtensionStore::new();
    store.propagate(A, 2);
    assert!(store.is_empty());
}

#[test]
fn next_site_follows_instruction_length() {
    let store = ExtensionStore::new();
    store.set_segment(A, 1, 1);
    store.propagate(A, 4);
    assert_eq!(store.query_segment(A + 2), None);
    assert_eq!(store.query_segment(A + 4), Some(1));
}

#[test]
fn custom_dpp_is_not_carried() {
    let store = ExtensionStore::new();
    store.set_custom_dpp(A, [1, 2, 3, 4]);
    store.set_page(A, 3, 1);
    store.propagate(A, 2);

    assert_eq!(store.query_custom_dpp(A), Some([1, 2, 3, 4]));
    assert_eq!(store.query_custom_dpp(A + 2), None);
    assert_eq!(store.query_page(A + 2), Some(3));
}

#[test]
fn bank_and_segment_travel_together() {
    let store = ExtensionStore::new();
    store.set_register_bank(A, 1);
    store.set_segment(A, 0x12, 1);
    store.propagate(A, 2);

    let carried = store.get(A + 2);
    assert_eq!(
        carried.kind,
        ExtensionKind::REGISTER_BANK | ExtensionKind::SEGMENT
    );
    assert_eq!(carried.segment(), Some(0x12));
    assert_eq!(carried.remaining, 0);
}

#[test]
fn carried_override_keeps_the_next_sites_dpp() {
    let store = ExtensionStore::new();
    store.set_custom_dpp(A + 2, [9, 9, 9, 9]);
    store.set_page(A, 3, 1);
    store.propagate(A, 2);

    let next = store.get(A + 2);
    assert_eq!(next.page(), Some(3));
    assert_eq!(next.custom_dpp(), Some([9, 9, 9, 9]));
}

// ══════════════════════════════════════════════════════════
// 2. End to end through the lifter
// ══════════════════════════════════════════════════════════

#[rstest]
#[case(1)]
#[case(2)]
#[case(3)]
#[case(4)]
fn extp_covers_exactly_count_instructions(#[case] count: u8) {
    let ctx = TestContext::new();
    let program = Program::at(0).push(extp(7, count)).nops(5);
    ctx.run(&program);

    let nops = &program.addresses()[1..];
    for (i, &addr) in nops.iter().enumerate() {
        let expected = (i < usize::from(count)).then_some(7);
        assert_eq!(ctx.store.query_page(addr), expected, "nop {i} at {addr:#x}");
    }
    assert_eq!(ctx.store.query_page(0), None);
}

#[test]
fn nested_extp_takes_over_mid_sequence() {
    let ctx = TestContext::new();
    let program = Program::at(0)
        .push(extp(3, 4))
        .push(nop())
        .push(extp(5, 1))
        .nops(2);
    ctx.run(&program);

    assert_eq!(ctx.store.query_page(4), Some(3));
    assert_eq!(ctx.store.query_page(6), Some(3));
    assert_eq!(ctx.store.query_page(10), Some(5));
    assert_eq!(ctx.store.query_page(12), None);
}

#[test]
fn exts_then_extp_merge_at_the_shared_site() {
    let ctx = TestContext::new();
    let program = Program::at(0x100)
        .push(exts(0x12, 2))
        .push(extp(3, 1))
        .nops(2);
    ctx.run(&program);

    // exts covers 0x104 (the extp) and 0x108; the extp adds its page at 0x108.
    assert_eq!(ctx.store.query_segment(0x104), Some(0x12));
    assert_eq!(ctx.store.query_segment(0x108), Some(0x12));
    assert_eq!(ctx.store.query_page(0x108), Some(3));
    assert_eq!(ctx.store.query_segment(0x10A), None);
    assert_eq!(ctx.store.query_page(0x10A), None);
}

#[test]
fn relifting_is_stable() {
    let ctx = TestContext::new();
    let program = Program::at(0).push(extp(3, 2)).nops(3);
    ctx.run(&program);
    let first = ctx.store.entries();
    ctx.run(&program);
    assert_eq!(ctx.store.entries(), first);
}
