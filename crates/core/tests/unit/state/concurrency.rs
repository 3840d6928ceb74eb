//! Concurrency Tests.
//!
//! One store is shared by lifters running on several threads. Every operation is
//! linearizable, so writers on disjoint address ranges never observe or clobber each other.

use std::thread;

use crate::common::builder::{extp, Program};
use crate::common::mocks::EveryAddress;
use c166_core::il::IlFunction;
use c166_core::{CpuConfig, ExtensionStore, Lifter};

const THREADS: u64 = 8;
const SITES: u64 = 64;

fn assert_send_sync<T: Send + Sync>() {}

#[test]
fn store_and_config_are_shareable() {
    assert_send_sync::<ExtensionStore>();
    assert_send_sync::<CpuConfig>();
}

#[test]
fn disjoint_writers_do_not_interfere() {
    let store = ExtensionStore::new();
    thread::scope(|s| {
        for t in 0..THREADS {
            let store = &store;
            s.spawn(move || {
                let base = t * 0x1_0000;
                for i in 0..SITES {
                    store.set_page(base + 2 * i, t as u32, 0);
                    store.set_register_bank(base + 2 * i, 0);
                }
            });
        }
    });

    assert_eq!(store.len(), (THREADS * SITES) as usize);
    for t in 0..THREADS {
        for i in 0..SITES {
            let addr = t * 0x1_0000 + 2 * i;
            assert_eq!(store.query_page(addr), Some(t as u32));
            assert!(store.query_register_bank(addr));
        }
    }
}

#[test]
fn concurrent_lifters_share_one_store() {
    let store = ExtensionStore::new();
    let config = CpuConfig::default();
    let programs: Vec<Program> = (0..THREADS)
        .map(|t| Program::at(t * 0x1_0000).push(extp(t as u16, 3)).nops(4))
        .collect();

    thread::scope(|s| {
        for program in &programs {
            let lifter = Lifter::new(&store, &config);
            s.spawn(move || {
                let mut il = IlFunction::new();
                for &addr in program.addresses() {
                    lifter
                        .lift(program.bytes_at(addr), addr, &EveryAddress, &mut il)
                        .unwrap();
                }
            });
        }
    });

    for (t, program) in programs.iter().enumerate() {
        let nops = &program.addresses()[1..];
        for &addr in &nops[..3] {
            assert_eq!(store.query_page(addr), Some(t as u32), "{addr:#x}");
        }
        assert_eq!(store.query_page(nops[3]), None);
    }
}

#[test]
fn readers_see_whole_entries() {
    let store = ExtensionStore::new();
    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..256u32 {
                store.set_custom_dpp(0x100, [i, i, i, i]);
            }
        });
        s.spawn(|| {
            for _ in 0..256 {
                if let Some(dpp) = store.query_custom_dpp(0x100) {
                    assert!(dpp.iter().all(|&d| d == dpp[0]), "torn read {dpp:?}");
                }
            }
        });
    });
}
