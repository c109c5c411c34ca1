use std::collections::HashSet;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Generates unique random uppercase keys with values, in shuffled order.
pub fn make_kvs(seed: u64, count: usize, max_len: usize) -> Vec<(Vec<u8>, u32)> {
    let mut rng = StdRng::seed_from_u64(seed);
    let mut seen = HashSet::new();
    let mut kvs = Vec::with_capacity(count);

    for value in 0..count as u32 {
        let len = rng.gen_range(1..=max_len);
        let key: Vec<u8> = (0..len).map(|_| rng.gen_range(b'A'..=b'Z')).collect();
        if seen.insert(key.clone()) {
            kvs.push((key, value));
        }
    }
    kvs
}

/// Asserts two stat reports match, ignoring vector capacities (which a
/// deserialized dictionary does not reproduce).
#[allow(dead_code)]
pub fn assert_stat_equivalent(lhs: &dadict::Stat, rhs: &dadict::Stat) {
    assert_eq!(lhs.num_keys, rhs.num_keys);
    assert_eq!(lhs.num_tries, rhs.num_tries);
    assert_eq!(lhs.num_nodes, rhs.num_nodes);
    assert_eq!(lhs.bc_size, rhs.bc_size);
    assert_eq!(lhs.bc_emps, rhs.bc_emps);
    assert_eq!(lhs.tail_size, rhs.tail_size);
    assert_eq!(lhs.tail_emps, rhs.tail_emps);
    assert_eq!(lhs.size_in_bytes, rhs.size_in_bytes);
}

/// Splits `kvs` into (kept, deleted) halves, alternating.
pub fn split_halves(kvs: &[(Vec<u8>, u32)]) -> (Vec<(Vec<u8>, u32)>, Vec<(Vec<u8>, u32)>) {
    let mut keep = Vec::with_capacity(kvs.len() / 2 + 1);
    let mut drop = Vec::with_capacity(kvs.len() / 2 + 1);
    for (i, kv) in kvs.iter().enumerate() {
        if i % 2 == 0 {
            keep.push(kv.clone());
        } else {
            drop.push(kv.clone());
        }
    }
    (keep, drop)
}
