//! The single-trie dictionary.

use std::io::{self, Read, Write};

use crate::cells::{Block, BlockRecord, ROOT};
use crate::codec::{read_u64, write_u64, DecodeError};
use crate::query::Query;
use crate::raw::SuffixTrie;

use super::{check_value, Dictionary, KvPair, Stat};

/// A dictionary backed by one global trie.
///
/// `B` selects the freelist flavor and `NL` toggles per-node sibling links;
/// see the [flavor aliases](crate::dict) for the usual combinations.
pub struct DictionarySgl<B: BlockRecord = Block, const NL: bool = false> {
    trie: SuffixTrie<B, NL>,
    num_keys: u64,
}

impl<B: BlockRecord, const NL: bool> DictionarySgl<B, NL> {
    /// Creates an empty dictionary.
    pub fn new() -> Self {
        DictionarySgl {
            trie: SuffixTrie::new(),
            num_keys: 0,
        }
    }

    /// Reconstructs a dictionary previously serialized with
    /// [`Dictionary::write_to`].
    pub fn read_from<R: Read>(source: &mut R) -> Result<Self, DecodeError> {
        let trie = SuffixTrie::read_from(source)?;
        let num_keys = read_u64(source)?;
        Ok(DictionarySgl { trie, num_keys })
    }
}

impl<B: BlockRecord, const NL: bool> Default for DictionarySgl<B, NL> {
    fn default() -> Self {
        Self::new()
    }
}

impl<B: BlockRecord, const NL: bool> Dictionary for DictionarySgl<B, NL> {
    fn name(&self) -> &'static str {
        "DictionarySGL"
    }

    fn search(&self, key: &[u8]) -> Option<u32> {
        let mut query = Query::new(key);
        if !self.trie.search_key(&mut query) {
            return None;
        }
        Some(query.value())
    }

    fn insert(&mut self, key: &[u8], value: u32) -> bool {
        check_value(value);

        let mut query = Query::new(key);
        query.set_value(value);
        if !self.trie.insert_key(&mut query) {
            return false;
        }
        self.num_keys += 1;
        true
    }

    fn remove(&mut self, key: &[u8]) -> Option<u32> {
        let mut query = Query::new(key);
        if !self.trie.delete_key(&mut query) {
            return None;
        }
        self.num_keys -= 1;
        Some(query.value())
    }

    fn enumerate(&self) -> Vec<KvPair> {
        if self.trie.is_empty() {
            return Vec::new();
        }
        let mut kvs = Vec::with_capacity(self.num_keys as usize);
        let mut prefix = Vec::new();
        self.trie.enumerate(ROOT, &mut prefix, &mut kvs);
        kvs
    }

    fn pack(&mut self) {
        self.trie.pack_bc();
        self.trie.pack_tail();
    }

    fn rebuild(&mut self) {
        self.trie.rebuild();
    }

    fn shrink(&mut self) {
        self.trie.shrink();
    }

    fn stat(&self) -> Stat {
        Stat {
            num_keys: self.num_keys as usize,
            num_tries: 1,
            num_nodes: self.trie.num_nodes() as usize,
            bc_size: self.trie.bc_size() as usize,
            bc_capa: self.trie.bc_capa() as usize,
            bc_emps: self.trie.bc_emps() as usize,
            tail_size: self.trie.tail_size() as usize,
            tail_capa: self.trie.tail_capa() as usize,
            tail_emps: self.trie.tail_emps() as usize,
            size_in_bytes: self.trie.size_in_bytes() + 8,
        }
    }

    fn ratio_singles(&self) -> f64 {
        f64::from(self.trie.num_singles()) / f64::from(self.trie.num_nodes())
    }

    fn write_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        self.trie.write_to(sink)?;
        write_u64(sink, self.num_keys)
    }
}
