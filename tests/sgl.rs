//! Single-trie dictionary drill over every flavor: insert, search,
//! enumerate, delete, serialize, pack, rebuild.

mod common;

use dadict::{Dictionary, SglBl, SglNl, SglNlBl, SglPlain};
use paste::paste;

const NUM_KEYS: usize = 1 << 14;
const KEY_LENGTH: usize = 50;

macro_rules! sgl_drill_tests {
    ($($flavor:ident => $ty:ty: $seed:expr),* $(,)?) => {$(paste! {
        #[test]
        fn [<drill_ $flavor>]() {
            let kvs = common::make_kvs($seed, NUM_KEYS, KEY_LENGTH);
            let mut dict = <$ty>::new();

            for (key, value) in &kvs {
                assert!(dict.insert(key, *value));
            }
            for (key, value) in &kvs {
                assert_eq!(dict.search(key), Some(*value), "missing {key:?}");
            }
            assert_eq!(dict.stat().num_keys, kvs.len());
            assert_eq!(dict.enumerate().len(), kvs.len());

            let (keep, drop) = common::split_halves(&kvs);
            for (key, value) in &drop {
                assert_eq!(dict.remove(key), Some(*value));
            }
            for (key, _) in &drop {
                assert_eq!(dict.search(key), None);
            }
            for (key, value) in &keep {
                assert_eq!(dict.search(key), Some(*value));
            }

            let mut buf = Vec::new();
            dict.write_to(&mut buf).unwrap();
            assert_eq!(dict.stat().size_in_bytes, buf.len());

            let mut dict = <$ty>::read_from(&mut buf.as_slice()).unwrap();
            dict.pack();
            for (key, _) in &drop {
                assert_eq!(dict.search(key), None);
            }
            for (key, value) in &keep {
                assert_eq!(dict.search(key), Some(*value));
            }
            assert_eq!(dict.stat().num_keys, keep.len());

            let mut dict = <$ty>::read_from(&mut buf.as_slice()).unwrap();
            dict.rebuild();
            for (key, _) in &drop {
                assert_eq!(dict.search(key), None);
            }
            for (key, value) in &keep {
                assert_eq!(dict.search(key), Some(*value));
            }
            assert_eq!(dict.stat().num_keys, keep.len());
            dict.shrink();
            assert_eq!(dict.stat().num_keys, keep.len());
        }
    })*};
}

sgl_drill_tests! {
    sgl => SglPlain: 0x5eed,
    sgl_nl => SglNl: 0x5eee,
    sgl_bl => SglBl: 0x5eef,
    sgl_nl_bl => SglNlBl: 0x5ef0,
}

#[test]
fn aho_corasick_classic_key_set() {
    let mut dict = SglPlain::new();
    assert!(dict.insert(b"he", 1));
    assert!(dict.insert(b"she", 2));
    assert!(dict.insert(b"his", 3));
    assert!(dict.insert(b"hers", 4));

    assert_eq!(dict.search(b"he"), Some(1));
    assert_eq!(dict.search(b"she"), Some(2));
    assert_eq!(dict.search(b"his"), Some(3));
    assert_eq!(dict.search(b"hers"), Some(4));
    assert_eq!(dict.search(b"her"), None);
    assert_eq!(dict.search(b"h"), None);

    let mut keys: Vec<Vec<u8>> = dict.enumerate().into_iter().map(|kv| kv.key).collect();
    keys.sort();
    assert_eq!(keys, vec![b"he".to_vec(), b"hers".to_vec(), b"his".to_vec(), b"she".to_vec()]);
}

#[test]
fn diverging_keys_share_one_branch_node() {
    let mut dict = SglPlain::new();
    assert!(dict.insert(b"quicksand", 1));
    assert!(dict.insert(b"quickstep", 2));

    // Root, the six chain nodes for "quicks", and the two leaves.
    let stat = dict.stat();
    assert_eq!(stat.num_nodes, 9);
    assert!(stat.tail_emps >= 5);
    assert_eq!(dict.search(b"quicksand"), Some(1));
    assert_eq!(dict.search(b"quickstep"), Some(2));
    assert_eq!(dict.search(b"quicks"), None);
}

#[test]
fn chain_collapse_after_deleting_an_extension() {
    let mut dict = SglPlain::new();
    assert!(dict.insert(b"a", 1));
    assert!(dict.insert(b"ab", 2));
    assert_eq!(dict.remove(b"ab"), Some(2));

    assert_eq!(dict.search(b"a"), Some(1));
    assert_eq!(dict.search(b"ab"), None);

    let kvs = dict.enumerate();
    assert_eq!(kvs.len(), 1);
    assert_eq!(kvs[0].key, b"a");
    assert_eq!(kvs[0].value, 1);
}

#[test]
fn delete_half_then_pack_scenario() {
    let kvs = common::make_kvs(42, NUM_KEYS, KEY_LENGTH);
    let mut dict = SglNlBl::new();
    for (key, value) in &kvs {
        assert!(dict.insert(key, *value));
    }
    let (keep, drop) = common::split_halves(&kvs);
    for (key, _) in &drop {
        assert!(dict.remove(key).is_some());
    }

    dict.pack();

    for (key, value) in &keep {
        assert_eq!(dict.search(key), Some(*value));
    }
    for (key, _) in &drop {
        assert_eq!(dict.search(key), None);
    }
    assert_eq!(dict.stat().num_keys, keep.len());
    assert_eq!(dict.stat().tail_emps, 0);

    // Round-trip the packed dictionary.
    let mut buf = Vec::new();
    dict.write_to(&mut buf).unwrap();
    assert_eq!(dict.stat().size_in_bytes, buf.len());
    let restored = SglNlBl::read_from(&mut buf.as_slice()).unwrap();
    common::assert_stat_equivalent(&restored.stat(), &dict.stat());
    assert_eq!(restored.enumerate(), dict.enumerate());
}

#[test]
fn enumerate_is_in_canonical_order() {
    let mut dict = SglPlain::new();
    for key in [b"b".as_slice(), b"ba", b"a", b"ab", b"aa"] {
        assert!(dict.insert(key, key.len() as u32));
    }
    let keys: Vec<Vec<u8>> = dict.enumerate().into_iter().map(|kv| kv.key).collect();
    // Terminal edge first at every node makes the order lexicographic.
    assert_eq!(
        keys,
        vec![b"a".to_vec(), b"aa".to_vec(), b"ab".to_vec(), b"b".to_vec(), b"ba".to_vec()]
    );
}

#[test]
fn ratio_singles_is_a_fraction() {
    let kvs = common::make_kvs(7, 512, 12);
    let mut dict = SglPlain::new();
    for (key, value) in &kvs {
        assert!(dict.insert(key, *value));
    }
    let ratio = dict.ratio_singles();
    assert!((0.0..=1.0).contains(&ratio));
}

#[test]
#[should_panic(expected = "31 bits")]
fn wide_values_are_rejected() {
    let mut dict = SglPlain::new();
    dict.insert(b"key", 1 << 31);
}

#[test]
fn truncated_stream_is_an_error() {
    let mut dict = SglPlain::new();
    assert!(dict.insert(b"key", 1));
    let mut buf = Vec::new();
    dict.write_to(&mut buf).unwrap();
    buf.truncate(buf.len() - 3);
    assert!(SglPlain::read_from(&mut buf.as_slice()).is_err());
}
