#![deny(missing_docs, unsafe_code, deprecated_in_future)]

//! Dynamic double-array trie dictionaries.
//!
//! A double-array trie encodes a trie in two parallel integer arrays, `base`
//! and `check`: the child of node `p` along edge label `c` lives at slot
//! `base(p) XOR c`, and that slot's `check` points back at `p`. Terminal
//! suffixes that branch nowhere are spilled into a byte pool (the "tail")
//! instead of occupying one slot per byte. This crate maintains that
//! representation under arbitrary insertion and deletion, and offers two
//! rearrangement passes that undo the fragmentation mutation leaves behind:
//! an in-place *pack* and an out-of-place *rebuild*.
//!
//! Two dictionary facades share one engine:
//!
//!  - [`DictionarySgl`]: a single global trie.
//!  - [`DictionaryMlt`]: a shallow prefix subtrie whose leaves select one of
//!    many independent suffix subtries, so rearrangement parallelizes across
//!    subtries.
//!
//! Each comes in four flavors, toggling per-node sibling links (faster child
//! enumeration) and per-block freelist links (faster empty-slot search).
//!
//! # References
//!
//!  - Aoe, J. (1989). An efficient digital search algorithm by using a
//!    double-array structure. IEEE Transactions on Software Engineering,
//!    15(9), 1066-1077. [Link to PDF][Aoe paper]
//!  - Kanda, S., Fuketa, M., Morita, K., & Aoe, J. (2018). Practical
//!    rearrangement methods for dynamic double-array dictionaries.
//!    Software: Practice and Experience, 48(1), 65-83.
//!
//! [Aoe paper]: https://doi.org/10.1109/32.31365

mod cells;
mod query;
mod tail;

pub mod codec;
pub mod dict;
pub mod raw;

pub use cells::{Block, BlockLink, BlockRecord, NodeLink, BLOCK_LEN, INVALID, NOT_FOUND, ROOT};
pub use dict::{
    Dictionary, DictionaryMlt, DictionarySgl, KvPair, MltBl, MltNl, MltNlBl, MltPlain, SglBl,
    SglNl, SglNlBl, SglPlain, Stat,
};
pub use query::{Edge, Query};
