//! Property-based tests for the dictionary invariants.
//!
//! Differential testing against `BTreeMap` as an oracle, over both facades
//! and mixed operation sequences.

use std::collections::BTreeMap;

use dadict::{Dictionary, MltNl, SglBl, SglNlBl, SglPlain};
use proptest::prelude::*;

// ============================================================================
//  Strategies
// ============================================================================

/// NUL-free keys drawn from a small alphabet so that branching and shared
/// prefixes actually occur.
fn key() -> impl Strategy<Value = Vec<u8>> {
    prop::collection::vec(prop::sample::select(b"ABCDab".to_vec()), 0..=10)
}

fn unique_kvs(max: usize) -> impl Strategy<Value = Vec<(Vec<u8>, u32)>> {
    prop::collection::btree_map(key(), 0u32..(1 << 20), 0..=max)
        .prop_map(|map| map.into_iter().collect::<Vec<_>>())
        .prop_shuffle()
}

#[derive(Debug, Clone)]
enum Op {
    Insert(Vec<u8>, u32),
    Remove(Vec<u8>),
    Search(Vec<u8>),
}

fn operations(max: usize) -> impl Strategy<Value = Vec<Op>> {
    prop::collection::vec(
        prop_oneof![
            3 => (key(), 0u32..(1 << 20)).prop_map(|(k, v)| Op::Insert(k, v)),
            2 => key().prop_map(Op::Remove),
            2 => key().prop_map(Op::Search),
        ],
        0..=max,
    )
}

// ============================================================================
//  Properties
// ============================================================================

proptest! {
    #[test]
    fn round_trip_against_oracle(kvs in unique_kvs(64)) {
        let mut dict = SglPlain::new();
        for (key, value) in &kvs {
            prop_assert!(dict.insert(key, *value));
        }

        for (key, value) in &kvs {
            prop_assert_eq!(dict.search(key), Some(*value));
        }

        let mut enumerated: Vec<(Vec<u8>, u32)> = dict
            .enumerate()
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect();
        enumerated.sort();
        let mut expected = kvs.clone();
        expected.sort();
        prop_assert_eq!(enumerated, expected);
    }

    #[test]
    fn mixed_operations_match_oracle(ops in operations(128)) {
        let mut dict = SglNlBl::new();
        let mut oracle = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let inserted = dict.insert(&key, value);
                    let expected = !oracle.contains_key(&key);
                    prop_assert_eq!(inserted, expected);
                    oracle.entry(key).or_insert(value);
                },
                Op::Remove(key) => {
                    prop_assert_eq!(dict.remove(&key), oracle.remove(&key));
                },
                Op::Search(key) => {
                    prop_assert_eq!(dict.search(&key), oracle.get(&key).copied());
                },
            }
            prop_assert_eq!(dict.stat().num_keys, oracle.len());
        }

        let enumerated: Vec<(Vec<u8>, u32)> = dict
            .enumerate()
            .into_iter()
            .map(|kv| (kv.key, kv.value))
            .collect();
        let expected: Vec<(Vec<u8>, u32)> =
            oracle.into_iter().collect();
        // Canonical enumeration order is lexicographic over key bytes.
        prop_assert_eq!(enumerated, expected);
    }

    #[test]
    fn mlt_mixed_operations_match_oracle(ops in operations(96)) {
        let mut dict = MltNl::new();
        let mut oracle = BTreeMap::new();

        for op in ops {
            match op {
                Op::Insert(key, value) => {
                    let inserted = dict.insert(&key, value);
                    prop_assert_eq!(inserted, !oracle.contains_key(&key));
                    oracle.entry(key).or_insert(value);
                },
                Op::Remove(key) => {
                    prop_assert_eq!(dict.remove(&key), oracle.remove(&key));
                },
                Op::Search(key) => {
                    prop_assert_eq!(dict.search(&key), oracle.get(&key).copied());
                },
            }
        }

        for (key, value) in &oracle {
            prop_assert_eq!(dict.search(key), Some(*value));
        }
        prop_assert_eq!(dict.enumerate().len(), oracle.len());
    }

    #[test]
    fn serialization_preserves_behavior(kvs in unique_kvs(48)) {
        let mut dict = SglBl::new();
        for (key, value) in &kvs {
            dict.insert(key, *value);
        }

        let mut buf = Vec::new();
        dict.write_to(&mut buf).unwrap();
        prop_assert_eq!(dict.stat().size_in_bytes, buf.len());

        let mut restored = SglBl::read_from(&mut buf.as_slice()).unwrap();
        prop_assert_eq!(restored.enumerate(), dict.enumerate());

        // The reconstructed dictionary supports further mutation.
        for (key, _) in &kvs {
            prop_assert!(restored.remove(key).is_some());
        }
        prop_assert_eq!(restored.stat().num_keys, 0);
    }

    #[test]
    fn pack_is_idempotent_on_queries(kvs in unique_kvs(64), deletions in 0usize..32) {
        let mut dict = SglPlain::new();
        for (key, value) in &kvs {
            dict.insert(key, *value);
        }
        for (key, _) in kvs.iter().take(deletions) {
            dict.remove(key);
        }
        let live: Vec<_> = kvs.iter().skip(deletions.min(kvs.len())).collect();

        dict.pack();
        let emps_after_first = dict.stat().bc_emps;
        for (key, value) in &live {
            prop_assert_eq!(dict.search(key), Some(*value));
        }

        dict.pack();
        prop_assert!(dict.stat().bc_emps <= emps_after_first);
        for (key, value) in &live {
            prop_assert_eq!(dict.search(key), Some(*value));
        }
    }

    #[test]
    fn rebuild_never_grows_the_array(kvs in unique_kvs(64)) {
        let mut dict = SglPlain::new();
        for (key, value) in &kvs {
            dict.insert(key, *value);
        }
        for (key, _) in kvs.iter().step_by(3) {
            dict.remove(key);
        }

        let before = dict.stat();
        dict.rebuild();
        let after = dict.stat();

        prop_assert_eq!(after.num_keys, before.num_keys);
        prop_assert_eq!(after.num_nodes, before.num_nodes);
        prop_assert!(after.bc_size <= before.bc_size);
        prop_assert_eq!(after.tail_emps, 0);
        prop_assert_eq!(dict.enumerate().len(), after.num_keys);
    }
}
