//! Dictionary facades over the raw engine.
//!
//! Both facades share one contract ([`Dictionary`]) and differ in how they
//! address values: [`DictionarySgl`] keeps every key in a single trie,
//! [`DictionaryMlt`] splits the key space at prefix boundaries into many
//! independent suffix subtries so rearrangement can run per subtrie in
//! parallel.

mod mlt;
mod sgl;

use std::io::{self, Write};

pub use mlt::DictionaryMlt;
pub use sgl::DictionarySgl;

use crate::cells::{Block, BlockLink};

/// One enumerated entry: a key and its stored value.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct KvPair {
    /// The key bytes, as inserted (no terminator).
    pub key: Vec<u8>,
    /// The stored value.
    pub value: u32,
}

/// Structural counters of a dictionary, as reported by
/// [`Dictionary::stat`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stat {
    /// Number of stored keys.
    pub num_keys: usize,
    /// Number of live tries (1 for SGL; prefix + live suffixes for MLT).
    pub num_tries: usize,
    /// Occupied slots across all tries.
    pub num_nodes: usize,
    /// Allocated slots across all tries.
    pub bc_size: usize,
    /// Slot capacity across all tries.
    pub bc_capa: usize,
    /// Empty slots across all tries.
    pub bc_emps: usize,
    /// Tail bytes across all tries.
    pub tail_size: usize,
    /// Tail capacity across all tries.
    pub tail_capa: usize,
    /// Dead tail bytes across all tries.
    pub tail_emps: usize,
    /// Exact byte length a [`Dictionary::write_to`] call would produce.
    pub size_in_bytes: usize,
}

/// The shared contract of the dictionary flavors.
///
/// Keys are byte strings without interior `0x00` bytes; values are 31-bit
/// unsigned integers (the top bit is reserved).
pub trait Dictionary {
    /// Short flavor name for diagnostics.
    fn name(&self) -> &'static str;

    /// Looks up `key`, returning its value when present.
    fn search(&self, key: &[u8]) -> Option<u32>;

    /// Inserts `key` with `value`. Returns `false` (without changing
    /// anything) when the key is already present.
    ///
    /// # Panics
    ///
    /// Panics when `value` has its top bit set.
    fn insert(&mut self, key: &[u8], value: u32) -> bool;

    /// Removes `key`, returning the value it held.
    fn remove(&mut self, key: &[u8]) -> Option<u32>;

    /// Returns every stored pair in canonical order: the terminator edge
    /// first, then labels ascending, depth first.
    fn enumerate(&self) -> Vec<KvPair>;

    /// In-place consolidation of slots and tail bytes.
    fn pack(&mut self);

    /// Out-of-place reconstruction into a dense layout.
    fn rebuild(&mut self);

    /// Releases spare vector capacity.
    fn shrink(&mut self);

    /// Structural counters. `size_in_bytes` equals the byte length of
    /// [`Dictionary::write_to`]'s output.
    fn stat(&self) -> Stat;

    /// Fraction of occupied nodes with exactly one child. Not constant
    /// time.
    fn ratio_singles(&self) -> f64;

    /// Serializes the dictionary to `sink`.
    fn write_to(&self, sink: &mut dyn Write) -> io::Result<()>;
}

/// Asserts the caller contract on stored values.
#[inline]
pub(crate) fn check_value(value: u32) {
    assert!(
        value >> 31 == 0,
        "dictionary values must fit in 31 bits, got {value:#x}"
    );
}

/// Single trie, plain freelist, no node links.
pub type SglPlain = DictionarySgl<Block, false>;
/// Single trie with node links.
pub type SglNl = DictionarySgl<Block, true>;
/// Single trie with block links.
pub type SglBl = DictionarySgl<BlockLink, false>;
/// Single trie with node links and block links.
pub type SglNlBl = DictionarySgl<BlockLink, true>;

/// Prefix/suffix split, plain freelist, no node links.
pub type MltPlain = DictionaryMlt<Block, false>;
/// Prefix/suffix split with node links.
pub type MltNl = DictionaryMlt<Block, true>;
/// Prefix/suffix split with block links.
pub type MltBl = DictionaryMlt<BlockLink, false>;
/// Prefix/suffix split with node links and block links.
pub type MltNlBl = DictionaryMlt<BlockLink, true>;
